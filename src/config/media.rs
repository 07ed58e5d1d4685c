//! Media storage configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Profile photo storage
#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    /// Directory uploaded files are written to
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,

    /// URL prefix the storage directory is served under
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    /// Largest accepted upload in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl MediaConfig {
    /// Validate media configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.public_base_url.is_empty() {
            return Err(ValidationError::MissingRequired("MEDIA_PUBLIC_BASE_URL"));
        }
        if self.max_upload_bytes == 0 {
            return Err(ValidationError::InvalidUploadLimit);
        }
        Ok(())
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            public_base_url: default_public_base_url(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("./uploads")
}

fn default_public_base_url() -> String {
    "http://localhost:8080/media".to_string()
}

fn default_max_upload_bytes() -> usize {
    5 * 1024 * 1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_config_defaults() {
        let config = MediaConfig::default();
        assert_eq!(config.storage_dir, PathBuf::from("./uploads"));
        assert_eq!(config.max_upload_bytes, 5_242_880);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_zero_upload_limit() {
        let config = MediaConfig {
            max_upload_bytes: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidUploadLimit));
    }
}
