//! Endpoint configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{AiError, Result};

/// Environment variable naming the endpoint base URL.
pub const CHAT_URL_ENV: &str = "BULLETIN_CHAT_URL";

/// Environment variable bounding a whole exchange, in seconds. Unset means
/// no overall deadline, which long generations need.
pub const CHAT_TIMEOUT_ENV: &str = "BULLETIN_CHAT_TIMEOUT_SECS";

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_API_NAME: &str = "chat";

/// Where and how to reach the inference endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Base URL of the endpoint, without a trailing slash.
    pub base_url: String,

    /// Name of the exposed inference route.
    #[serde(default = "default_api_name")]
    pub api_name: String,

    /// Bound on establishing the connection.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: Duration,

    /// Optional bound on the whole exchange, including generation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<Duration>,
}

fn default_api_name() -> String {
    DEFAULT_API_NAME.to_string()
}

fn default_connect_timeout() -> Duration {
    DEFAULT_CONNECT_TIMEOUT
}

impl EndpointConfig {
    /// Create a config for a base URL. Trailing slashes are trimmed so URL
    /// assembly stays predictable.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_name: default_api_name(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: None,
        }
    }

    /// Read the config from the environment. A missing URL is a
    /// configuration error; a malformed timeout is reported rather than
    /// silently ignored.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var(CHAT_URL_ENV)
            .map_err(|_| AiError::Configuration(format!("{CHAT_URL_ENV} is not set")))?;
        if base_url.trim().is_empty() {
            return Err(AiError::Configuration(format!("{CHAT_URL_ENV} is empty")));
        }
        let mut config = Self::new(base_url);
        if let Ok(raw) = std::env::var(CHAT_TIMEOUT_ENV) {
            let secs: u64 = raw.parse().map_err(|_| {
                AiError::Configuration(format!(
                    "{CHAT_TIMEOUT_ENV}={raw} is not a whole number of seconds"
                ))
            })?;
            config.request_timeout = Some(Duration::from_secs(secs));
        }
        Ok(config)
    }

    /// Set the inference route name.
    pub fn with_api_name(mut self, api_name: impl Into<String>) -> Self {
        self.api_name = api_name.into();
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Bound the whole exchange.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// URL that opens a call: `{base}/call/{api_name}`.
    pub(crate) fn call_url(&self) -> String {
        format!("{}/call/{}", self.base_url, self.api_name)
    }

    /// URL of the event feed for an accepted call.
    pub(crate) fn events_url(&self, event_id: &str) -> String {
        format!("{}/{}", self.call_url(), event_id)
    }
}
