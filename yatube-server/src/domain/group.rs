use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateGroupRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(min = 1, max = 100), custom(function = "validate_slug"))]
    pub slug: String,

    pub description: String,
}

fn validate_slug(slug: &str) -> Result<(), validator::ValidationError> {
    if slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        Ok(())
    } else {
        Err(validator::ValidationError::new("slug"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(title: &str, slug: &str) -> CreateGroupRequest {
        CreateGroupRequest {
            title: title.to_string(),
            slug: slug.to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn slug_allows_letters_digits_and_dashes() {
        assert!(request("Rust", "rust-lang_2").validate().is_ok());
    }

    #[test]
    fn slug_rejects_spaces_and_slashes() {
        assert!(request("Rust", "rust lang").validate().is_err());
        assert!(request("Rust", "rust/lang").validate().is_err());
    }

    #[test]
    fn title_is_capped_at_200_chars() {
        assert!(request(&"x".repeat(201), "x").validate().is_err());
    }
}
