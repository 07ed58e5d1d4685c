//! MediaStorage port for uploaded profile assets.

use async_trait::async_trait;

/// Errors that can occur during media storage operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Asset not found
    NotFound(String),
    /// Upload rejected before storing (size, type)
    Rejected(String),
    /// IO error
    IoError(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Media not found: {}", msg),
            Self::Rejected(msg) => write!(f, "Upload rejected: {}", msg),
            Self::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

/// A file received from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUpload {
    /// Client-side file name, used only for its extension.
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Where an uploaded asset ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMedia {
    /// Identifier accepted by `delete`. Equals the URL's last path segment
    /// without extension.
    pub public_id: String,
    /// Public URL clients load the asset from.
    pub url: String,
}

/// Binary asset storage for profile photos
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Store an asset and return its public location
    async fn upload(&self, upload: MediaUpload) -> Result<StoredMedia, StorageError>;

    /// Remove an asset by public id. Deleting a missing asset is not an error.
    async fn delete(&self, public_id: &str) -> Result<(), StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_storage_is_object_safe() {
        fn _accepts_dyn(_storage: &dyn MediaStorage) {}
    }

    #[test]
    fn storage_error_display() {
        assert_eq!(
            StorageError::Rejected("file too large".to_string()).to_string(),
            "Upload rejected: file too large"
        );
    }
}
