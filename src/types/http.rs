//! Client configuration types.
//!
//! `ClientConfig` and its builder configure the behavior shared by the async
//! and blocking facades: where requests go, which headers they carry by
//! default, and how some server answers are interpreted.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::defaults;

/// How `delete` treats a 404 for the target id.
///
/// Whether deleting an already-deleted resource is an error depends on server
/// policy, so callers choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingOnDelete {
    /// Surface `ApiError::NotFound`.
    #[default]
    Error,
    /// Return a deletion record with `deleted == false`.
    Acknowledge,
}

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL every request path is joined onto.
    pub base_url: String,
    /// Default per-request timeout, handed to the transport.
    #[serde(with = "duration_option_serde")]
    pub timeout: Option<Duration>,
    /// Headers sent with every request (lowest precedence).
    pub headers: HashMap<String, String>,
    /// User agent
    pub user_agent: Option<String>,
    pub missing_on_delete: MissingOnDelete,
    /// Maximum error-body characters kept in error messages.
    pub error_body_sample: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::http::BASE_URL.to_string(),
            timeout: Some(defaults::http::REQUEST_TIMEOUT),
            headers: HashMap::new(),
            user_agent: Some(defaults::http::USER_AGENT.to_string()),
            missing_on_delete: MissingOnDelete::Error,
            error_body_sample: defaults::http::ERROR_BODY_SAMPLE,
        }
    }
}

impl ClientConfig {
    /// Returns a builder for constructing `ClientConfig`
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Default configuration overridden by `SKILLS_BASE_URL` and
    /// `SKILLS_TIMEOUT_SECS` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(defaults::env::BASE_URL) {
            let url = url.trim();
            if !url.is_empty() {
                config.base_url = url.to_string();
            }
        }
        if let Ok(raw) = std::env::var(defaults::env::TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(0) => config.timeout = None,
                Ok(secs) => config.timeout = Some(Duration::from_secs(secs)),
                Err(_) => tracing::warn!(
                    target: "skills_client::config",
                    value = %raw,
                    "ignoring unparsable {}",
                    defaults::env::TIMEOUT_SECS
                ),
            }
        }
        config
    }
}

/// Builder for `ClientConfig`
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    base_url: Option<String>,
    timeout: Option<Option<Duration>>,
    headers: HashMap<String, String>,
    user_agent: Option<Option<String>>,
    missing_on_delete: Option<MissingOnDelete>,
    error_body_sample: Option<usize>,
}

impl ClientConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = Some(timeout);
        self
    }
    pub fn header<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }
    pub fn user_agent<S: Into<String>>(mut self, user_agent: Option<S>) -> Self {
        self.user_agent = Some(user_agent.map(|s| s.into()));
        self
    }
    pub fn missing_on_delete(mut self, policy: MissingOnDelete) -> Self {
        self.missing_on_delete = Some(policy);
        self
    }
    pub fn error_body_sample(mut self, chars: usize) -> Self {
        self.error_body_sample = Some(chars);
        self
    }

    /// Build the configuration
    pub fn build(self) -> ClientConfig {
        let defaults = ClientConfig::default();
        ClientConfig {
            base_url: self.base_url.unwrap_or(defaults.base_url),
            timeout: self.timeout.unwrap_or(defaults.timeout),
            headers: self.headers,
            user_agent: self.user_agent.unwrap_or(defaults.user_agent),
            missing_on_delete: self.missing_on_delete.unwrap_or(defaults.missing_on_delete),
            error_body_sample: self.error_body_sample.unwrap_or(defaults.error_body_sample),
        }
    }
}

// Helper module for Duration serialization
mod duration_option_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => d.as_secs().serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs: Option<u64> = Option::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
