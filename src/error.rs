//! Error Handling
//!
//! `ApiError` is the only error type surfaced by the client facades. Every
//! variant raised after request validation carries an [`ErrorContext`] naming
//! the operation and the offending resource, so a failure can be diagnosed
//! without looking at transport internals.
//!
//! Transport collaborators report failures as [`TransportError`]; the
//! execution core wraps them with context.
//!
//! ```rust,ignore
//! match client.skills().retrieve("skl_missing").await {
//!     Err(e) if e.is_not_found() => println!("gone: {e}"),
//!     other => { other?; }
//! }
//! ```

use std::fmt;

use reqwest::header::HeaderMap;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Operation and resource an error belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Dotted operation name, e.g. `skills.versions.retrieve`.
    pub operation: &'static str,
    /// Resource path the operation targeted, e.g. `skl_1/versions/2`.
    pub resource: Option<String>,
}

impl ErrorContext {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            resource: None,
        }
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.resource {
            Some(resource) => write!(f, "{}({})", self.operation, resource),
            None => f.write_str(self.operation),
        }
    }
}

/// Status, request id and a bounded body sample of a failed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusDetails {
    pub status: u16,
    pub request_id: Option<String>,
    pub body: String,
}

impl fmt::Display for StatusDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "http {}", self.status)?;
        if let Some(id) = &self.request_id {
            write!(f, " request_id={id}")?;
        }
        if !self.body.is_empty() {
            write!(f, " body_sample={}", self.body)?;
        }
        Ok(())
    }
}

/// Coarse error grouping for presentation and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller passed an unusable argument; nothing was sent.
    Validation,
    /// The server answered with a payload of the wrong shape.
    Decode,
    /// 4xx answers other than rate limiting.
    Client,
    RateLimit,
    Server,
    Network,
    Cancelled,
}

/// Errors returned by every client operation.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required identifier was empty. Raised before any transport call.
    #[error("{operation}: expected a non-empty value for `{param}`")]
    InvalidArgument {
        operation: &'static str,
        param: &'static str,
    },

    /// The request could not be built (bad header value, unreadable file,
    /// unserializable field).
    #[error("{context}: invalid request: {message}")]
    InvalidRequest {
        context: ErrorContext,
        message: String,
    },

    /// The response body does not match the expected shape.
    #[error("{context}: failed to decode response: {message}")]
    Decode {
        context: ErrorContext,
        message: String,
    },

    #[error("{context}: not found ({details})")]
    NotFound {
        context: ErrorContext,
        details: StatusDetails,
    },

    #[error("{context}: conflict ({details})")]
    Conflict {
        context: ErrorContext,
        details: StatusDetails,
    },

    #[error("{context}: rate limited ({details})")]
    RateLimited {
        context: ErrorContext,
        /// Raw `Retry-After` header, when the server sent one.
        retry_after: Option<String>,
        details: StatusDetails,
    },

    #[error("{context}: server error ({details})")]
    Server {
        context: ErrorContext,
        details: StatusDetails,
    },

    /// Any other non-2xx status.
    #[error("{context}: unexpected status ({details})")]
    Status {
        context: ErrorContext,
        details: StatusDetails,
    },

    /// Connection, I/O or timeout failure reported by the transport.
    #[error("{context}: transport error: {message}")]
    Transport {
        context: ErrorContext,
        message: String,
        timeout: bool,
    },

    /// The caller aborted the operation through a cancel handle.
    #[error("{context}: cancelled")]
    Cancelled { context: ErrorContext },
}

impl ApiError {
    pub fn invalid_argument(operation: &'static str, param: &'static str) -> Self {
        Self::InvalidArgument { operation, param }
    }

    pub fn invalid_request(context: ErrorContext, message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            context,
            message: message.into(),
        }
    }

    pub fn decode(context: ErrorContext, message: impl Into<String>) -> Self {
        Self::Decode {
            context,
            message: message.into(),
        }
    }

    pub fn transport(context: ErrorContext, err: TransportError) -> Self {
        Self::Transport {
            context,
            message: err.message,
            timeout: err.timeout,
        }
    }

    pub fn cancelled(context: ErrorContext) -> Self {
        Self::Cancelled { context }
    }

    /// HTTP status for status-derived errors.
    pub fn status_code(&self) -> Option<u16> {
        self.details().map(|d| d.status)
    }

    /// Server request id for status-derived errors.
    pub fn request_id(&self) -> Option<&str> {
        self.details().and_then(|d| d.request_id.as_deref())
    }

    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Self::InvalidArgument { .. } => None,
            Self::InvalidRequest { context, .. }
            | Self::Decode { context, .. }
            | Self::NotFound { context, .. }
            | Self::Conflict { context, .. }
            | Self::RateLimited { context, .. }
            | Self::Server { context, .. }
            | Self::Status { context, .. }
            | Self::Transport { context, .. }
            | Self::Cancelled { context } => Some(context),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidArgument { .. } | Self::InvalidRequest { .. } => ErrorCategory::Validation,
            Self::Decode { .. } => ErrorCategory::Decode,
            Self::NotFound { .. } | Self::Conflict { .. } | Self::Status { .. } => {
                ErrorCategory::Client
            }
            Self::RateLimited { .. } => ErrorCategory::RateLimit,
            Self::Server { .. } => ErrorCategory::Server,
            Self::Transport { .. } => ErrorCategory::Network,
            Self::Cancelled { .. } => ErrorCategory::Cancelled,
        }
    }

    /// Whether a retry could plausibly succeed.
    ///
    /// Advisory only: this crate never retries; the transport collaborator
    /// owns that policy.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::RateLimit | ErrorCategory::Server | ErrorCategory::Network
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    fn details(&self) -> Option<&StatusDetails> {
        match self {
            Self::NotFound { details, .. }
            | Self::Conflict { details, .. }
            | Self::RateLimited { details, .. }
            | Self::Server { details, .. }
            | Self::Status { details, .. } => Some(details),
            _ => None,
        }
    }
}

/// Failure reported by a transport collaborator.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    /// The collaborator gave up because a deadline passed.
    pub timeout: bool,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timeout: false,
        }
    }

    pub fn timed_out(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timeout: true,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self {
            timeout: err.is_timeout(),
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self {
            timeout: err.kind() == std::io::ErrorKind::TimedOut,
            message: err.to_string(),
        }
    }
}

const REQUEST_ID_HEADERS: [&str; 3] = ["x-request-id", "request-id", "x-trace-id"];

/// Map a non-2xx response onto the error taxonomy.
///
/// `body_text` is truncated to `sample_limit` characters.
pub fn classify_http_error(
    context: ErrorContext,
    status: u16,
    headers: &HeaderMap,
    body_text: &str,
    sample_limit: usize,
) -> ApiError {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
    };
    let details = StatusDetails {
        status,
        request_id: REQUEST_ID_HEADERS.iter().find_map(|k| header_value(k)),
        body: body_text.chars().take(sample_limit).collect(),
    };

    match status {
        404 => ApiError::NotFound { context, details },
        409 => ApiError::Conflict { context, details },
        429 => ApiError::RateLimited {
            context,
            retry_after: header_value("retry-after"),
            details,
        },
        500..=599 => ApiError::Server { context, details },
        _ => ApiError::Status { context, details },
    }
}
