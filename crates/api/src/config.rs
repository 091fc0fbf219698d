use bizdir_core::config::{env_or, env_string_or, ConfigError};
use bizdir_core::upload::{UploadConstraints, DEFAULT_MAX_FILES, DEFAULT_MAX_FILE_BYTES};

/// Multipart framing allowance on top of the raw file bytes of a batch.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Limits re-checked server-side on every upload.
    pub upload: UploadConstraints,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                 |
    /// |---------------------------|-------------------------|
    /// | `HOST`                    | `0.0.0.0`               |
    /// | `PORT`                    | `3000`                  |
    /// | `CORS_ORIGINS`            | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                    |
    /// | `BIZDIR_MAX_UPLOAD_FILES` | `10`                    |
    /// | `BIZDIR_MAX_UPLOAD_BYTES` | `5242880`               |
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env_string_or("HOST", "0.0.0.0");
        let port: u16 = env_or("PORT", 3000)?;

        let cors_origins: Vec<String> = env_string_or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", 30)?;
        let max_files: usize = env_or("BIZDIR_MAX_UPLOAD_FILES", DEFAULT_MAX_FILES)?;
        let max_file_bytes: u64 = env_or("BIZDIR_MAX_UPLOAD_BYTES", DEFAULT_MAX_FILE_BYTES)?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            upload: UploadConstraints {
                max_files,
                max_file_bytes,
                ..UploadConstraints::default()
            },
        })
    }

    /// Largest request body accepted, sized for one full upload batch.
    pub fn max_body_bytes(&self) -> usize {
        let file_bytes = usize::try_from(self.upload.max_file_bytes).unwrap_or(usize::MAX);
        self.upload
            .max_files
            .saturating_mul(file_bytes)
            .saturating_add(MULTIPART_OVERHEAD_BYTES)
    }
}
