use std::time::Duration;

use bizdir_core::config::{env_or, env_string_or, ConfigError};

/// Default API root of the business directory backend.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api/v1";

/// Default transport timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for [`HttpAssetGateway`](crate::api::HttpAssetGateway).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// API root, e.g. `http://localhost:3000/api/v1`.
    pub base_url: String,
    /// Per-request timeout enforced by the HTTP client.
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                        |
    /// |---------------------------|--------------------------------|
    /// | `BIZDIR_API_URL`          | `http://localhost:3000/api/v1` |
    /// | `BIZDIR_API_TIMEOUT_SECS` | `30`                           |
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = env_string_or("BIZDIR_API_URL", DEFAULT_BASE_URL);
        let timeout_secs: u64 = env_or("BIZDIR_API_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}
