//! Persistence capability for résumé documents.
//!
//! The reconciler only ever talks to this trait. Two implementations exist:
//! [`pg::PgStore`] runs server-side against PostgreSQL, [`http::HttpStore`]
//! runs client-side against the HTTP API. Ownership (caller must own the
//! target résumé) is enforced per call by the implementation, never by the
//! reconciler.

pub mod http;
pub mod pg;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::resume::{
    EducationItem, EducationPatch, ExperienceItem, ExperiencePatch, NewResume, ProjectItem,
    ProjectPatch, Resume, ResumePatch, SkillGroup, SkillGroupPatch,
};

/// The four child collections a résumé owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChildKind {
    Education,
    Experience,
    Skills,
    Projects,
}

impl ChildKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChildKind::Education => "education",
            ChildKind::Experience => "experience",
            ChildKind::Skills => "skills",
            ChildKind::Projects => "projects",
        }
    }
}

impl std::fmt::Display for ChildKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field payload for creating a child. The item's unassigned id and its
/// edit-state flag stay off the wire; a fresh identifier is assigned on
/// insert.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChildFields {
    Education(EducationItem),
    Experience(ExperienceItem),
    Skills(SkillGroup),
    Projects(ProjectItem),
}

impl ChildFields {
    pub fn kind(&self) -> ChildKind {
        match self {
            ChildFields::Education(_) => ChildKind::Education,
            ChildFields::Experience(_) => ChildKind::Experience,
            ChildFields::Skills(_) => ChildKind::Skills,
            ChildFields::Projects(_) => ChildKind::Projects,
        }
    }
}

/// Partial update of a single child, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChildPatch {
    Education(EducationPatch),
    Experience(ExperiencePatch),
    Skills(SkillGroupPatch),
    Projects(ProjectPatch),
}

impl ChildPatch {
    pub fn kind(&self) -> ChildKind {
        match self {
            ChildPatch::Education(_) => ChildKind::Education,
            ChildPatch::Experience(_) => ChildKind::Experience,
            ChildPatch::Skills(_) => ChildKind::Skills,
            ChildPatch::Projects(_) => ChildKind::Projects,
        }
    }
}

/// Error taxonomy of the persistence layer. `NotAuthorized` and `NotFound`
/// are surfaced to the user; anything else is treated as transient and
/// aborts the save cycle at the failing call.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not authorized")]
    NotAuthorized,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("slug already taken: {0}")]
    SlugTaken(String),

    /// The addressed kind and the patch variant disagree. Rejected before
    /// any call is made, since the ownership check resolves through the
    /// addressed kind's table.
    #[error("patch kind {patch} does not match addressed kind {kind}")]
    KindMismatch { kind: ChildKind, patch: ChildKind },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("transport error: {0}")]
    Transport(#[source] anyhow::Error),
}

/// CRUD capability over résumé documents and their children.
///
/// Identifiers are opaque strings; the empty string means "unassigned" and
/// is never a valid argument to `update_child` or `delete_child`.
#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// Public read path; `None` when the slug is unknown.
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Resume>, StoreError>;

    async fn create_resume(&self, new: &NewResume) -> Result<Resume, StoreError>;

    /// Applies the patch and returns the complete document, children refreshed.
    async fn update_resume(&self, slug: &str, patch: &ResumePatch) -> Result<Resume, StoreError>;

    async fn delete_resume(&self, slug: &str) -> Result<(), StoreError>;

    /// Inserts a child under the given résumé and returns its assigned id.
    async fn create_child(&self, slug: &str, fields: &ChildFields) -> Result<String, StoreError>;

    async fn update_child(
        &self,
        kind: ChildKind,
        id: &str,
        patch: &ChildPatch,
    ) -> Result<(), StoreError>;

    async fn delete_child(&self, kind: ChildKind, id: &str) -> Result<(), StoreError>;

    /// Slug owned by the calling user, if any.
    async fn slug_for_user(&self) -> Result<Option<String>, StoreError>;
}
