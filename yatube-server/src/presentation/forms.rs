use crate::domain::form::MAX_IMAGE_BYTES;
use crate::domain::{DomainError, PostForm, Upload};
use actix_multipart::{Field, Multipart};
use futures::TryStreamExt;

// Slack over the image limit for the text fields of the same request
const MAX_FIELD_BYTES: usize = MAX_IMAGE_BYTES + 64 * 1024;

async fn read_field(field: &mut Field) -> Result<Vec<u8>, DomainError> {
    let mut data = Vec::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|e| DomainError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        if data.len() + chunk.len() > MAX_FIELD_BYTES {
            return Err(DomainError::BadRequest("Upload is too large".to_string()));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

/// Reads a create/edit submission. Fields other than `text`, `group` and
/// `image` are drained and dropped.
pub async fn read_post_form(mut payload: Multipart) -> Result<PostForm, DomainError> {
    let mut form = PostForm::default();

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| DomainError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let (name, filename) = match field.content_disposition() {
            Some(cd) => (
                cd.get_name().unwrap_or_default().to_string(),
                cd.get_filename().map(str::to_string),
            ),
            None => (String::new(), None),
        };

        let data = read_field(&mut field).await?;

        match name.as_str() {
            "text" => form.text = String::from_utf8_lossy(&data).into_owned(),
            "group" => form.group = String::from_utf8_lossy(&data).into_owned(),
            "image" => {
                // An empty file input still sends a part with no file name
                if let Some(filename) = filename.filter(|f| !f.is_empty()) {
                    if !data.is_empty() {
                        form.image = Some(Upload {
                            filename,
                            bytes: data,
                        });
                    }
                }
            }
            other => tracing::debug!("Ignoring form field {:?}", other),
        }
    }

    Ok(form)
}
