//! Type Definitions
//!
//! Wire records, request parameters and client configuration.

pub mod files;
pub mod http;
pub mod list;
pub mod skill;
pub mod version;

pub use files::{FileSet, UploadFile};
pub use http::{ClientConfig, ClientConfigBuilder, MissingOnDelete};
pub use list::{ListParams, SortOrder};
pub use skill::{DeletedSkill, Skill, SkillCreateParams, SkillUpdateParams};
pub use version::{DeletedSkillVersion, SkillVersion, VERSION_LATEST, VersionCreateParams};
