//! Default Configuration Values
//!
//! Centralizes the default values used by both client facades.

use std::time::Duration;

/// HTTP defaults
pub mod http {
    use super::*;

    /// Default API base URL.
    pub const BASE_URL: &str = "https://api.openai.com/v1";

    /// Default request timeout.
    ///
    /// Skill uploads can carry whole directories, so this is generous.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

    /// Default connection timeout for the bundled reqwest collaborators.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Default User-Agent string.
    pub const USER_AGENT: &str = concat!("skills-client/", env!("CARGO_PKG_VERSION"));

    /// Accept header for JSON endpoints.
    pub const ACCEPT_JSON: &str = "application/json";

    /// Accept header for binary content endpoints.
    pub const ACCEPT_BINARY: &str = "application/binary";

    /// Maximum number of error-body characters kept in an error message.
    pub const ERROR_BODY_SAMPLE: usize = 512;
}

/// Upload defaults
pub mod upload {
    /// Filename used for parts that carry no name of their own.
    pub const FILENAME: &str = "upload";

    /// Content type used when none is given and none can be guessed.
    pub const CONTENT_TYPE: &str = "application/octet-stream";

    /// Multipart field name for uploaded files.
    pub const FILES_FIELD: &str = "files";
}

/// Streaming defaults
pub mod streaming {
    /// Upper bound of a single blocking content read.
    pub const MAX_READ_CHUNK: usize = 64 * 1024;
}

/// Environment variables read by `ClientConfig::from_env`.
pub mod env {
    pub const BASE_URL: &str = "SKILLS_BASE_URL";
    pub const TIMEOUT_SECS: &str = "SKILLS_TIMEOUT_SECS";
    pub const API_KEY: &str = "SKILLS_API_KEY";
}
