//! Resource operation sets.
//!
//! Resources are generic over the facade: the same `Skills<C>` builds the
//! requests for [`Client`](crate::Client) and
//! [`BlockingClient`](crate::BlockingClient); only executing the returned
//! call differs.

pub mod content;
pub mod skills;
pub mod versions;

pub use content::{ContentCall, SkillContent, VersionContent};
pub use skills::Skills;
pub use versions::Versions;

use crate::error::{ErrorContext, Result};
use crate::execution::request::{ApiRequest, require_id};
use crate::utils::url::encode_segment;

pub(crate) fn skill_path(skill_id: &str) -> String {
    format!("/skills/{}", encode_segment(skill_id))
}

pub(crate) fn versions_path(skill_id: &str) -> String {
    format!("{}/versions", skill_path(skill_id))
}

pub(crate) fn version_path(skill_id: &str, version: &str) -> String {
    format!("{}/{}", versions_path(skill_id), encode_segment(version))
}

/// Validate `skill_id` and build a request scoped to it.
pub(crate) fn skill_request(
    operation: &'static str,
    skill_id: &str,
    build: impl FnOnce(String, ErrorContext) -> Result<ApiRequest>,
) -> Result<ApiRequest> {
    require_id(operation, "skill_id", skill_id)?;
    let context = ErrorContext::new(operation).with_resource(skill_id);
    build(skill_path(skill_id), context)
}

/// Validate both ids and build a request scoped to one version.
pub(crate) fn version_request(
    operation: &'static str,
    skill_id: &str,
    version: &str,
    build: impl FnOnce(String, ErrorContext) -> Result<ApiRequest>,
) -> Result<ApiRequest> {
    require_id(operation, "skill_id", skill_id)?;
    require_id(operation, "version", version)?;
    let context =
        ErrorContext::new(operation).with_resource(format!("{skill_id}/versions/{version}"));
    build(version_path(skill_id, version), context)
}
