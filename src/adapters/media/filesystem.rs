//! Filesystem storage adapter for uploaded profile photos
//!
//! Files are stored flat in a base directory as `{public_id}.{ext}`, where
//! `public_id` is a random UUID. The HTTP layer serves the directory at the
//! configured public base URL.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::ports::{MediaStorage, MediaUpload, StorageError, StoredMedia};

/// Filesystem-based media storage
pub struct FsMediaStorage {
    base_dir: PathBuf,
    public_base_url: String,
    max_bytes: usize,
}

impl FsMediaStorage {
    /// Create new filesystem storage.
    ///
    /// `public_base_url` is the URL prefix the directory is served under,
    /// e.g. `http://localhost:8080/media`.
    pub fn new(
        base_dir: impl AsRef<Path>,
        public_base_url: impl Into<String>,
        max_bytes: usize,
    ) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            max_bytes,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn validate(&self, upload: &MediaUpload) -> Result<(), StorageError> {
        if upload.bytes.is_empty() {
            return Err(StorageError::Rejected("file is empty".to_string()));
        }
        if upload.bytes.len() > self.max_bytes {
            return Err(StorageError::Rejected(format!(
                "file exceeds {} bytes",
                self.max_bytes
            )));
        }
        if let Some(content_type) = &upload.content_type {
            if !content_type.starts_with("image/") {
                return Err(StorageError::Rejected(format!(
                    "unsupported content type {}",
                    content_type
                )));
            }
        }
        Ok(())
    }
}

/// Pick a safe file extension from the client file name or content type.
fn extension_for(upload: &MediaUpload) -> String {
    let from_name = upload
        .file_name
        .as_deref()
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    if let Some(ext) = from_name {
        return ext;
    }

    match upload.content_type.as_deref() {
        Some("image/png") => "png",
        Some("image/jpeg") => "jpg",
        Some("image/gif") => "gif",
        Some("image/webp") => "webp",
        _ => "bin",
    }
    .to_string()
}

/// Public ids are generated by `upload`; anything else could escape the base dir.
fn is_valid_public_id(public_id: &str) -> bool {
    !public_id.is_empty()
        && public_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[async_trait]
impl MediaStorage for FsMediaStorage {
    async fn upload(&self, upload: MediaUpload) -> Result<StoredMedia, StorageError> {
        self.validate(&upload)?;

        fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| StorageError::IoError(format!("Failed to create directory: {}", e)))?;

        let public_id = uuid::Uuid::new_v4().simple().to_string();
        let file_name = format!("{}.{}", public_id, extension_for(&upload));
        let file_path = self.base_dir.join(&file_name);

        // Write through a temporary file so readers never see a partial image
        let temp_path = self.base_dir.join(format!("{}.tmp", public_id));
        fs::write(&temp_path, &upload.bytes).await.map_err(|e| {
            StorageError::IoError(format!("Failed to write temporary file: {}", e))
        })?;
        fs::rename(&temp_path, &file_path)
            .await
            .map_err(|e| StorageError::IoError(format!("Failed to rename file: {}", e)))?;

        tracing::debug!(public_id = %public_id, bytes = upload.bytes.len(), "Stored media upload");

        Ok(StoredMedia {
            url: format!("{}/{}", self.public_base_url, file_name),
            public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<(), StorageError> {
        if !is_valid_public_id(public_id) {
            return Err(StorageError::Rejected(format!(
                "invalid public id {}",
                public_id
            )));
        }

        let mut entries = match fs::read_dir(&self.base_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(StorageError::IoError(format!(
                    "Failed to read media directory: {}",
                    e
                )))
            }
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::IoError(format!("Failed to read media directory: {}", e)))?
        {
            let path = entry.path();
            if path.file_stem().and_then(|s| s.to_str()) == Some(public_id) {
                fs::remove_file(&path)
                    .await
                    .map_err(|e| StorageError::IoError(format!("Failed to delete file: {}", e)))?;
            }
        }

        Ok(())
    }
}
