use crate::domain::{DomainError, Upload};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Stores uploaded post images below the media root.
pub struct MediaStorage {
    root: PathBuf,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes the upload to `posts/<uuid>.<ext>` and returns that relative path.
    pub async fn save_post_image(&self, upload: &Upload) -> Result<String, DomainError> {
        let extension = upload.extension().unwrap_or_else(|| "bin".to_string());
        let relative = format!("posts/{}.{}", Uuid::new_v4(), extension);
        let target = self.root.join(&relative);

        if let Some(dir) = target.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        tokio::fs::write(&target, &upload.bytes).await?;

        tracing::info!(
            "Stored image {} ({} bytes) as {}",
            upload.filename,
            upload.bytes.len(),
            relative
        );
        Ok(relative)
    }
}
