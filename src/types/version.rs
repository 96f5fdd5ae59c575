//! Skill version records and request parameters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::files::FileSet;
use crate::pagination::CursorItem;

/// Reserved version alias resolved by the server to the newest version.
pub const VERSION_LATEST: &str = "latest";

/// A skill version (`object: "skill.version"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillVersion {
    pub id: String,
    pub created_at: i64,
    pub name: String,
    pub description: String,
    /// Identifier of the skill this version belongs to.
    pub skill_id: String,
    /// Version number, ordered by the server only.
    pub version: String,
    pub object: String,
}

impl SkillVersion {
    pub fn created_at_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created_at, 0)
    }
}

impl CursorItem for SkillVersion {
    fn cursor_id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedSkillVersion {
    pub id: String,
    pub deleted: bool,
    pub object: String,
    pub version: String,
}

impl DeletedSkillVersion {
    /// Record for a version the server did not know. Its `ver_…` id is
    /// unknown, so `id` is left empty.
    pub(crate) fn missing(version: &str) -> Self {
        Self {
            id: String::new(),
            deleted: false,
            object: "skill.version.deleted".to_string(),
            version: version.to_string(),
        }
    }
}

/// Parameters for `versions().create`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VersionCreateParams {
    /// Whether to make this version the skill default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,
    #[serde(skip)]
    pub files: FileSet,
}

impl VersionCreateParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_default(mut self, default: bool) -> Self {
        self.default = Some(default);
        self
    }

    pub fn files(mut self, files: impl Into<FileSet>) -> Self {
        self.files = files.into();
        self
    }
}
