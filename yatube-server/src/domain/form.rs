use std::collections::BTreeMap;
use std::path::Path;

use validator::{Validate, ValidationErrors};

use super::Group;

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp"];

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";
pub const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";
pub const IMAGE_TOO_LARGE: &str = "The uploaded image must not exceed 5 MiB.";

/// Field name to list of messages, in stable field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn replace(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), vec![message.into()]);
    }

    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.0.get(field)
    }

    /// Messages for one field, empty when the field is clean.
    pub fn messages(&self, field: &str) -> Vec<String> {
        self.0.get(field).cloned().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }
}

pub fn merge_validation_errors(into: &mut FieldErrors, errors: &ValidationErrors) {
    for (field, field_errors) in errors.field_errors() {
        for err in field_errors.iter() {
            let message = err
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| err.code.to_string());
            into.add(field.to_string(), message);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Lowercased extension of the client-side file name.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }

    fn is_image(&self) -> bool {
        self.extension()
            .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
    }
}

/// Raw post submission as it arrives from the create/edit form.
///
/// Anything the client sends besides these fields (an `author`, for example)
/// never reaches this type.
#[derive(Debug, Clone, Default, Validate)]
pub struct PostForm {
    #[validate(length(min = 1, message = "This field is required."))]
    pub text: String,
    pub group: String,
    pub image: Option<Upload>,
}

/// Text values of a submission, kept for redisplaying a rejected form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFormValues {
    pub text: String,
    pub group: String,
}

/// A submission that passed validation and is ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<Upload>,
}

impl PostForm {
    pub fn values(&self) -> PostFormValues {
        PostFormValues {
            text: self.text.clone(),
            group: self.group.clone(),
        }
    }

    /// Validates the submission against the available groups.
    pub fn clean(mut self, groups: &[Group]) -> Result<PostDraft, FieldErrors> {
        self.text = self.text.trim().to_string();

        let mut errors = FieldErrors::new();
        if let Err(e) = self.validate() {
            merge_validation_errors(&mut errors, &e);
        }

        let group_id = match self.group.trim() {
            "" => None,
            raw => match raw.parse::<i64>() {
                Ok(id) if groups.iter().any(|g| g.id == id) => Some(id),
                _ => {
                    errors.add("group", INVALID_CHOICE);
                    None
                }
            },
        };

        if let Some(upload) = &self.image {
            if !upload.is_image() {
                errors.add("image", INVALID_IMAGE);
            } else if upload.bytes.len() > MAX_IMAGE_BYTES {
                errors.add("image", IMAGE_TOO_LARGE);
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(PostDraft {
            text: self.text,
            group_id,
            image: self.image,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups() -> Vec<Group> {
        vec![Group {
            id: 3,
            title: "Rust".to_string(),
            slug: "rust".to_string(),
            description: String::new(),
        }]
    }

    fn form(text: &str, group: &str) -> PostForm {
        PostForm {
            text: text.to_string(),
            group: group.to_string(),
            image: None,
        }
    }

    #[test]
    fn valid_submission_becomes_draft() {
        let draft = form("  hello  ", "3").clean(&groups()).unwrap();
        assert_eq!(draft.text, "hello");
        assert_eq!(draft.group_id, Some(3));
        assert!(draft.image.is_none());
    }

    #[test]
    fn empty_group_means_no_group() {
        let draft = form("hello", "").clean(&groups()).unwrap();
        assert_eq!(draft.group_id, None);
    }

    #[test]
    fn whitespace_text_is_required() {
        let errors = form("   \n ", "").clean(&groups()).unwrap_err();
        assert_eq!(errors.messages("text"), vec![REQUIRED.to_string()]);
        assert!(errors.get("group").is_none());
    }

    #[test]
    fn unknown_or_garbage_group_is_invalid_choice() {
        for raw in ["42", "rust", "-1"] {
            let errors = form("hello", raw).clean(&groups()).unwrap_err();
            assert_eq!(errors.messages("group"), vec![INVALID_CHOICE.to_string()]);
        }
    }

    #[test]
    fn errors_accumulate_across_fields() {
        let mut submission = form("", "99");
        submission.image = Some(Upload {
            filename: "notes.txt".to_string(),
            bytes: b"plain".to_vec(),
        });
        let errors = submission.clean(&groups()).unwrap_err();
        let fields: Vec<&String> = errors.iter().map(|(field, _)| field).collect();
        assert_eq!(fields, vec!["group", "image", "text"]);
    }

    #[test]
    fn image_extension_is_case_insensitive() {
        let mut submission = form("hello", "");
        submission.image = Some(Upload {
            filename: "Photo.JPG".to_string(),
            bytes: vec![0x00, 0x80, 0x80, 0x00],
        });
        let draft = submission.clean(&groups()).unwrap();
        assert_eq!(draft.image.unwrap().extension().as_deref(), Some("jpg"));
    }

    #[test]
    fn oversized_image_is_rejected() {
        let mut submission = form("hello", "");
        submission.image = Some(Upload {
            filename: "big.png".to_string(),
            bytes: vec![0; MAX_IMAGE_BYTES + 1],
        });
        let errors = submission.clean(&groups()).unwrap_err();
        assert_eq!(errors.messages("image"), vec![IMAGE_TOO_LARGE.to_string()]);
    }
}
