//! Skill records and request parameters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::files::FileSet;
use crate::pagination::CursorItem;

/// A skill as returned by the API (`object: "skill"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    /// Unique identifier for the skill.
    pub id: String,
    /// Unix timestamp (seconds) for when the skill was created.
    pub created_at: i64,
    pub name: String,
    pub description: String,
    /// Version served when callers do not pin one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<String>,
    pub object: String,
}

impl Skill {
    pub fn created_at_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created_at, 0)
    }
}

impl CursorItem for Skill {
    fn cursor_id(&self) -> &str {
        &self.id
    }
}

/// Deletion acknowledgment for a skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedSkill {
    pub id: String,
    pub deleted: bool,
    pub object: String,
}

impl DeletedSkill {
    pub(crate) fn missing(id: &str) -> Self {
        Self {
            id: id.to_string(),
            deleted: false,
            object: "skill.deleted".to_string(),
        }
    }
}

/// Parameters for `skills().create`.
///
/// Skills carry no scalar creation fields; everything comes from the
/// uploaded files (a directory of files or a single zip).
#[derive(Debug, Clone, Default, Serialize)]
pub struct SkillCreateParams {
    #[serde(skip)]
    pub files: FileSet,
}

impl SkillCreateParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(mut self, files: impl Into<FileSet>) -> Self {
        self.files = files.into();
        self
    }
}

/// Parameters for `skills().update`. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SkillUpdateParams {
    /// Skill version number to set as default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_version: Option<String>,
}

impl SkillUpdateParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_version(mut self, version: impl Into<String>) -> Self {
        self.default_version = Some(version.into());
        self
    }
}
