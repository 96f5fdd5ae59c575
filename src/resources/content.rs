//! Binary content of skills and versions.
//!
//! Content calls always stream: the archive is handed to the caller chunk
//! by chunk and never buffered by the client.

use std::time::Duration;

use super::{skill_request, version_request};
use crate::execution::call::PendingCall;
use crate::execution::request::ApiRequest;
use crate::utils::cancel::CancelHandle;

/// A binary download waiting to be started.
#[must_use = "calls do nothing until sent"]
pub struct ContentCall<C> {
    pub(crate) inner: PendingCall<C, ()>,
}

impl<C> ContentCall<C> {
    fn new(inner: PendingCall<C, ()>) -> Self {
        Self { inner }
    }

    pub fn header(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(self.inner.header(name, value))
    }

    pub fn query(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(self.inner.query(name, value))
    }

    pub fn timeout(self, timeout: Duration) -> Self {
        Self::new(self.inner.timeout(timeout))
    }

    /// Abort the download, including reads of an already started body.
    pub fn with_cancel(self, handle: CancelHandle) -> Self {
        Self::new(self.inner.with_cancel(handle))
    }

    pub fn request(&self) -> std::result::Result<&ApiRequest, &crate::error::ApiError> {
        self.inner.request()
    }
}

/// `/skills/{skill_id}/content`
#[derive(Debug, Clone)]
pub struct SkillContent<C> {
    client: C,
}

impl<C: Clone> SkillContent<C> {
    pub(crate) fn new(client: C) -> Self {
        Self { client }
    }

    /// Download the skill's default-version archive.
    pub fn retrieve(&self, skill_id: &str) -> ContentCall<C> {
        let request = skill_request("skills.content.retrieve", skill_id, |path, ctx| {
            Ok(ApiRequest::get(format!("{path}/content"), ctx).binary())
        });
        ContentCall::new(PendingCall::new(self.client.clone(), request))
    }
}

/// `/skills/{skill_id}/versions/{version}/content`
#[derive(Debug, Clone)]
pub struct VersionContent<C> {
    client: C,
}

impl<C: Clone> VersionContent<C> {
    pub(crate) fn new(client: C) -> Self {
        Self { client }
    }

    pub fn retrieve(&self, skill_id: &str, version: &str) -> ContentCall<C> {
        let request = version_request(
            "skills.versions.content.retrieve",
            skill_id,
            version,
            |path, ctx| Ok(ApiRequest::get(format!("{path}/content"), ctx).binary()),
        );
        ContentCall::new(PendingCall::new(self.client.clone(), request))
    }
}
