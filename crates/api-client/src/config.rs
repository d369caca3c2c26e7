use std::time::Duration;

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ENV_API_URL: &str = "MONETA_API_URL";
const ENV_API_TOKEN: &str = "MONETA_API_TOKEN";

/// Connection settings for [`crate::ApiClient`].
///
/// The token is optional on purpose: the client constructs fine without
/// one, and every request fails fast with a missing-token error until it
/// is configured. That keeps startup independent of credential delivery.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, api_token: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Reads `MONETA_API_URL` and `MONETA_API_TOKEN` from the environment.
    /// Returns `None` when no base URL is set.
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var(ENV_API_URL).ok()?;
        let api_token = std::env::var(ENV_API_TOKEN).ok().filter(|t| !t.is_empty());
        Some(Self::new(base_url, api_token))
    }
}
