//! Skill versions resource, nested under a skill.

use super::content::VersionContent;
use super::{skill_request, version_request, versions_path};
use crate::execution::call::PendingCall;
use crate::execution::request::ApiRequest;
use crate::pagination::ListCall;
use crate::types::{
    DeletedSkillVersion, ListParams, Skill, SkillUpdateParams, SkillVersion, VersionCreateParams,
};

/// Operations on `/skills/{skill_id}/versions`.
#[derive(Debug, Clone)]
pub struct Versions<C> {
    client: C,
}

impl<C: Clone> Versions<C> {
    pub(crate) fn new(client: C) -> Self {
        Self { client }
    }

    /// Upload a new version of a skill.
    pub fn create(&self, skill_id: &str, params: VersionCreateParams) -> PendingCall<C, SkillVersion> {
        let request = skill_request("skills.versions.create", skill_id, |_, ctx| {
            let request = ApiRequest::post(versions_path(skill_id), ctx).json(&params)?;
            Ok(request.files(params.files.into_parts()))
        });
        PendingCall::new(self.client.clone(), request)
    }

    /// Retrieve one version; `"latest"` resolves server-side.
    pub fn retrieve(&self, skill_id: &str, version: &str) -> PendingCall<C, SkillVersion> {
        let request = version_request("skills.versions.retrieve", skill_id, version, |path, ctx| {
            Ok(ApiRequest::get(path, ctx))
        });
        PendingCall::new(self.client.clone(), request)
    }

    /// Make `version` the skill's default. Versions are immutable otherwise,
    /// so this goes through the skill update endpoint and returns the skill.
    pub fn set_default(&self, skill_id: &str, version: &str) -> PendingCall<C, Skill> {
        let request = version_request("skills.versions.set_default", skill_id, version, |_, ctx| {
            let path = super::skill_path(skill_id);
            ApiRequest::post(path, ctx).json(&SkillUpdateParams::new().default_version(version))
        });
        PendingCall::new(self.client.clone(), request)
    }

    pub fn list(&self, skill_id: &str, params: ListParams) -> ListCall<C, SkillVersion> {
        let request = skill_request("skills.versions.list", skill_id, |_, ctx| {
            Ok(ApiRequest::get(versions_path(skill_id), ctx))
        });
        ListCall::new(self.client.clone(), request, params)
    }

    /// Delete a version. A missing version follows the client's
    /// `MissingOnDelete` policy.
    pub fn delete(&self, skill_id: &str, version: &str) -> PendingCall<C, DeletedSkillVersion> {
        let request = version_request("skills.versions.delete", skill_id, version, |path, ctx| {
            Ok(ApiRequest::delete(path, ctx))
        });
        PendingCall::new(self.client.clone(), request)
            .or_missing(version, DeletedSkillVersion::missing)
    }

    pub fn content(&self) -> VersionContent<C> {
        VersionContent::new(self.client.clone())
    }
}
