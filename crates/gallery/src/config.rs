use std::time::Duration;

use bizdir_core::config::{env_or, ConfigError};
use bizdir_core::upload::{UploadConstraints, DEFAULT_MAX_FILES, DEFAULT_MAX_FILE_BYTES};

/// How long a success message stays visible (milliseconds).
pub const DEFAULT_SUCCESS_TTL_MS: u64 = 3000;

/// Tunables for an [`ImageManager`](crate::engine::ImageManager).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryConfig {
    /// Limits checked before any upload reaches the gateway.
    pub constraints: UploadConstraints,
    /// Delay after which a success message clears itself.
    pub success_ttl: Duration,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            constraints: UploadConstraints::default(),
            success_ttl: Duration::from_millis(DEFAULT_SUCCESS_TTL_MS),
        }
    }
}

impl GalleryConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default   |
    /// |----------------------------|-----------|
    /// | `BIZDIR_MAX_UPLOAD_FILES`  | `10`      |
    /// | `BIZDIR_MAX_UPLOAD_BYTES`  | `5242880` |
    /// | `BIZDIR_SUCCESS_TTL_MS`    | `3000`    |
    ///
    /// Allowed MIME types are not configurable from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let max_files: usize = env_or("BIZDIR_MAX_UPLOAD_FILES", DEFAULT_MAX_FILES)?;
        let max_file_bytes: u64 = env_or("BIZDIR_MAX_UPLOAD_BYTES", DEFAULT_MAX_FILE_BYTES)?;
        let success_ttl_ms: u64 = env_or("BIZDIR_SUCCESS_TTL_MS", DEFAULT_SUCCESS_TTL_MS)?;

        Ok(Self {
            constraints: UploadConstraints {
                max_files,
                max_file_bytes,
                ..UploadConstraints::default()
            },
            success_ttl: Duration::from_millis(success_ttl_ms),
        })
    }
}
