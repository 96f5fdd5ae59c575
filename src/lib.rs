//! skills-client
//!
//! Typed client for the Skills API: skills, their immutable versions and
//! their binary content, through symmetric async ([`Client`]) and blocking
//! ([`BlockingClient`]) facades.
//!
//! - Cursor pagination with lazy item sequences ([`Pager`], [`PageIter`])
//! - Three response projections: parsed model, [`RawResponse`],
//!   [`StreamedResponse`]
//! - Multipart uploads for directories and archives ([`FileSet`])
//! - Pluggable transports and interceptors
//!
//! ```rust,ignore
//! use skills_client::prelude::*;
//!
//! let client = Client::builder().api_key("sk-...").build()?;
//! let skill = client
//!     .skills()
//!     .create(SkillCreateParams::new().files(FileSet::from_dir("./my-skill")?))
//!     .await?;
//! let mut archive = client.skills().content().retrieve(&skill.id).await?;
//! while let Some(chunk) = archive.next_chunk().await {
//!     let _bytes = chunk?;
//! }
//! ```
#![deny(unsafe_code)]

pub mod blocking;
pub mod builder;
pub mod client;
pub mod defaults;
pub mod error;
pub mod execution;
pub mod pagination;
pub mod resources;
pub mod response;
pub mod types;
pub mod utils;

pub use blocking::BlockingClient;
pub use builder::ClientBuilder;
pub use client::Client;
pub use error::{ApiError, ErrorCategory, ErrorContext, Result, TransportError};
pub use execution::{
    BlockingHttpTransport, ByteStream, HttpInterceptor, HttpTransport, LoggingInterceptor,
    MultipartBody, PendingCall, RequestBody, RequestContext, TransportRequest, TransportResponse,
};
pub use pagination::{Cursor, CursorItem, CursorPage, ListCall, PageIter, Pager};
pub use response::{Envelope, Projection, RawResponse, StreamedResponse};
pub use types::{
    ClientConfig, ClientConfigBuilder, DeletedSkill, DeletedSkillVersion, FileSet, ListParams,
    MissingOnDelete, Skill, SkillCreateParams, SkillUpdateParams, SkillVersion, SortOrder,
    UploadFile, VERSION_LATEST, VersionCreateParams,
};
pub use utils::cancel::CancelHandle;

/// Common imports.
pub mod prelude {
    pub use crate::blocking::BlockingClient;
    pub use crate::builder::ClientBuilder;
    pub use crate::client::Client;
    pub use crate::error::{ApiError, Result};
    pub use crate::pagination::{CursorPage, ListCall};
    pub use crate::response::{Envelope, Projection, RawResponse, StreamedResponse};
    pub use crate::types::{
        FileSet, ListParams, MissingOnDelete, Skill, SkillCreateParams, SkillUpdateParams,
        SkillVersion, SortOrder, UploadFile, VersionCreateParams,
    };
    pub use crate::utils::cancel::CancelHandle;
}
