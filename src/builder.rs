//! Client Builder
//!
//! One builder configures both facades:
//!
//! ```rust,ignore
//! let client = ClientBuilder::new()
//!     .api_key("sk-...")
//!     .base_url("https://api.example.com/v1")
//!     .missing_on_delete(MissingOnDelete::Acknowledge)
//!     .http_debug(true)
//!     .build()?;
//! ```

use secrecy::SecretString;
use std::sync::Arc;
use std::time::Duration;

use crate::blocking::BlockingClient;
use crate::client::Client;
use crate::defaults;
use crate::error::{ApiError, ErrorContext, Result};
use crate::execution::core::ClientCore;
use crate::execution::interceptor::{HttpInterceptor, LoggingInterceptor};
use crate::execution::reqwest_transport::{BlockingReqwestTransport, ReqwestTransport};
use crate::execution::transport::{BlockingHttpTransport, HttpTransport};
use crate::types::{ClientConfig, MissingOnDelete};

/// Builder for [`Client`] and [`BlockingClient`].
#[derive(Clone, Default)]
pub struct ClientBuilder {
    config: ClientConfig,
    api_key: Option<SecretString>,
    interceptors: Vec<Arc<dyn HttpInterceptor>>,
    http_debug: bool,
    http_client: Option<reqwest::Client>,
    transport: Option<Arc<dyn HttpTransport>>,
    blocking_transport: Option<Arc<dyn BlockingHttpTransport>>,
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("config", &self.config)
            .field("has_api_key", &self.api_key.is_some())
            .field("interceptors", &self.interceptors.len())
            .field("http_debug", &self.http_debug)
            .finish_non_exhaustive()
    }
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration from the environment (`SKILLS_BASE_URL`,
    /// `SKILLS_TIMEOUT_SECS`) and the API key from `SKILLS_API_KEY`.
    pub fn from_env() -> Self {
        let mut builder = Self::new().config(ClientConfig::from_env());
        if let Ok(key) = std::env::var(defaults::env::API_KEY) {
            if !key.trim().is_empty() {
                builder = builder.api_key(key.trim());
            }
        }
        builder
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the API key sent as a bearer token by the bundled transports.
    pub fn api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.api_key = Some(SecretString::from(api_key.into()));
        self
    }

    /// Set the base URL
    pub fn base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Set the default request timeout; `None` disables it.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Add a header sent with every request.
    pub fn header<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.config.headers.insert(key.into(), value.into());
        self
    }

    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    pub fn missing_on_delete(mut self, policy: MissingOnDelete) -> Self {
        self.config.missing_on_delete = policy;
        self
    }

    /// Add a custom HTTP interceptor; interceptors run in insertion order.
    pub fn with_http_interceptor(mut self, interceptor: Arc<dyn HttpInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Enable a built-in logging interceptor for HTTP debugging (no sensitive data).
    pub fn http_debug(mut self, enabled: bool) -> Self {
        self.http_debug = enabled;
        self
    }

    /// Set custom HTTP client for the async reqwest transport.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Use a custom async transport instead of reqwest.
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use a custom blocking transport instead of reqwest.
    pub fn with_blocking_transport(mut self, transport: Arc<dyn BlockingHttpTransport>) -> Self {
        self.blocking_transport = Some(transport);
        self
    }

    fn core(&self) -> Result<ClientCore> {
        let mut interceptors = self.interceptors.clone();
        if self.http_debug {
            interceptors.push(Arc::new(LoggingInterceptor));
        }
        ClientCore::new(self.config.clone(), interceptors)
    }

    /// Build the async client.
    pub fn build(self) -> Result<Client> {
        let core = self.core()?;
        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => {
                let reqwest = match self.http_client {
                    Some(client) => ReqwestTransport::with_client(client),
                    None => ReqwestTransport::new().map_err(build_error)?,
                };
                Arc::new(match self.api_key {
                    Some(key) => reqwest.with_api_key(key),
                    None => reqwest,
                })
            }
        };
        Ok(Client::from_parts(core, transport))
    }

    /// Build the blocking client.
    ///
    /// With the bundled reqwest transport this must not be called from
    /// inside an async runtime.
    pub fn build_blocking(self) -> Result<BlockingClient> {
        let core = self.core()?;
        let transport: Arc<dyn BlockingHttpTransport> = match self.blocking_transport {
            Some(transport) => transport,
            None => {
                let reqwest = BlockingReqwestTransport::new().map_err(build_error)?;
                Arc::new(match self.api_key {
                    Some(key) => reqwest.with_api_key(key),
                    None => reqwest,
                })
            }
        };
        Ok(BlockingClient::from_parts(core, transport))
    }
}

fn build_error(err: crate::error::TransportError) -> ApiError {
    ApiError::transport(ErrorContext::new("client.build"), err)
}
