//! Skills resource.

use super::content::SkillContent;
use super::versions::Versions;
use super::skill_request;
use crate::error::ErrorContext;
use crate::execution::call::PendingCall;
use crate::execution::request::ApiRequest;
use crate::pagination::ListCall;
use crate::types::{DeletedSkill, ListParams, Skill, SkillCreateParams, SkillUpdateParams};

/// Operations on `/skills`.
#[derive(Debug, Clone)]
pub struct Skills<C> {
    client: C,
}

impl<C: Clone> Skills<C> {
    pub(crate) fn new(client: C) -> Self {
        Self { client }
    }

    /// Create a skill from uploaded files (a directory or a zip).
    pub fn create(&self, params: SkillCreateParams) -> PendingCall<C, Skill> {
        let request = ApiRequest::post("/skills", ErrorContext::new("skills.create"))
            .json(&params)
            .map(|request| request.files(params.files.into_parts()));
        PendingCall::new(self.client.clone(), request)
    }

    pub fn retrieve(&self, skill_id: &str) -> PendingCall<C, Skill> {
        let request = skill_request("skills.retrieve", skill_id, |path, ctx| {
            Ok(ApiRequest::get(path, ctx))
        });
        PendingCall::new(self.client.clone(), request)
    }

    /// Update a skill; only fields set in `params` are sent.
    pub fn update(&self, skill_id: &str, params: SkillUpdateParams) -> PendingCall<C, Skill> {
        let request = skill_request("skills.update", skill_id, |path, ctx| {
            ApiRequest::post(path, ctx).json(&params)
        });
        PendingCall::new(self.client.clone(), request)
    }

    pub fn list(&self, params: ListParams) -> ListCall<C, Skill> {
        let request = Ok(ApiRequest::get("/skills", ErrorContext::new("skills.list")));
        ListCall::new(self.client.clone(), request, params)
    }

    /// Delete a skill. A missing skill follows the client's
    /// `MissingOnDelete` policy.
    pub fn delete(&self, skill_id: &str) -> PendingCall<C, DeletedSkill> {
        let request = skill_request("skills.delete", skill_id, |path, ctx| {
            Ok(ApiRequest::delete(path, ctx))
        });
        PendingCall::new(self.client.clone(), request).or_missing(skill_id, DeletedSkill::missing)
    }

    pub fn versions(&self) -> Versions<C> {
        Versions::new(self.client.clone())
    }

    pub fn content(&self) -> SkillContent<C> {
        SkillContent::new(self.client.clone())
    }
}
