//! Résumé document model — one root record plus four ordered child
//! collections (education, experience, skill groups, projects).
//!
//! Child identifiers are opaque strings assigned by the store. The empty
//! string is a reserved sentinel meaning "not yet persisted": such an item
//! must be created on save, never updated or deleted by id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Transient per-item edit marker. Belongs to the edit session, never to the
/// store: deletion is deferred until the next save cycle runs, and the flag
/// travels on the wire only while set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditState {
    #[default]
    Unmarked,
    Deleted,
}

impl EditState {
    pub fn is_unmarked(&self) -> bool {
        matches!(self, EditState::Unmarked)
    }
}

/// Full résumé document as returned by the store: root scalar fields plus
/// all child collections, refreshed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Resume {
    /// User-chosen unique key, also served as a subdomain. Immutable.
    pub slug: String,
    pub user_id: Uuid,
    pub pre_name: String,
    pub last_name: String,
    pub email: String,
    pub telephone: Option<String>,
    pub city_and_country: Option<String>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub website: Option<String>,
    pub objective: Option<String>,
    pub domain: Option<String>,
    pub impressum: Option<String>,
    /// Base64-encoded image payload.
    pub avatar: Option<String>,
    pub extracurricular: Vec<String>,
    /// Section names that start on a fresh page when rendered.
    pub new_page_before: Vec<String>,
    #[sqlx(skip)]
    #[serde(default)]
    pub education: Vec<EducationItem>,
    #[sqlx(skip)]
    #[serde(default)]
    pub experience: Vec<ExperienceItem>,
    #[sqlx(skip)]
    #[serde(default)]
    pub skills: Vec<SkillGroup>,
    #[sqlx(skip)]
    #[serde(default)]
    pub projects: Vec<ProjectItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct EducationItem {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub degree: String,
    pub field_of_study: String,
    pub university: String,
    pub city_and_country: String,
    #[sqlx(rename = "from_date")]
    pub from: String,
    #[sqlx(rename = "to_date")]
    pub to: String,
    pub expected: Option<String>,
    pub grade_point_average: Option<String>,
    pub thesis: Option<String>,
    pub thesis_grade: Option<String>,
    #[serde(default, skip_serializing_if = "EditState::is_unmarked")]
    #[sqlx(skip)]
    pub edit_state: EditState,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ExperienceItem {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub position: String,
    pub company: String,
    pub city_and_country: String,
    #[sqlx(rename = "from_date")]
    pub from: String,
    #[sqlx(rename = "to_date")]
    pub to: String,
    /// Bullet points, compared element-wise when diffing.
    pub infos: Vec<String>,
    #[serde(default, skip_serializing_if = "EditState::is_unmarked")]
    #[sqlx(skip)]
    pub edit_state: EditState,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SkillGroup {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub field: String,
    pub entities: Vec<String>,
    #[serde(default, skip_serializing_if = "EditState::is_unmarked")]
    #[sqlx(skip)]
    pub edit_state: EditState,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ProjectItem {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub github: Option<String>,
    pub demo: Option<String>,
    #[serde(default, skip_serializing_if = "EditState::is_unmarked")]
    #[sqlx(skip)]
    pub edit_state: EditState,
}

/// Root fields for creating a fresh résumé. Child collections start empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewResume {
    pub slug: String,
    pub pre_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub telephone: Option<String>,
    #[serde(default)]
    pub city_and_country: Option<String>,
    #[serde(default)]
    pub github: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub objective: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub impressum: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub extracurricular: Vec<String>,
    #[serde(default)]
    pub new_page_before: Vec<String>,
}

/// Partial update of root scalar fields. `None` means "leave unchanged";
/// a field can never be set back to null through a patch (edited nulls are
/// normalized to unset before transmission).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_and_country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impressum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracurricular: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_page_before: Option<Vec<String>>,
}

impl ResumePatch {
    pub fn is_empty(&self) -> bool {
        self.pre_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.telephone.is_none()
            && self.city_and_country.is_none()
            && self.github.is_none()
            && self.linkedin.is_none()
            && self.website.is_none()
            && self.objective.is_none()
            && self.domain.is_none()
            && self.impressum.is_none()
            && self.avatar.is_none()
            && self.extracurricular.is_none()
            && self.new_page_before.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_of_study: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub university: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_and_country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade_point_average: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thesis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thesis_grade: Option<String>,
}

impl EducationPatch {
    pub fn is_empty(&self) -> bool {
        self.degree.is_none()
            && self.field_of_study.is_none()
            && self.university.is_none()
            && self.city_and_country.is_none()
            && self.from.is_none()
            && self.to.is_none()
            && self.expected.is_none()
            && self.grade_point_average.is_none()
            && self.thesis.is_none()
            && self.thesis_grade.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperiencePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_and_country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infos: Option<Vec<String>>,
}

impl ExperiencePatch {
    pub fn is_empty(&self) -> bool {
        self.position.is_none()
            && self.company.is_none()
            && self.city_and_country.is_none()
            && self.from.is_none()
            && self.to.is_none()
            && self.infos.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillGroupPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<String>>,
}

impl SkillGroupPatch {
    pub fn is_empty(&self) -> bool {
        self.field.is_none() && self.entities.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo: Option<String>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.image.is_none()
            && self.github.is_none()
            && self.demo.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_state_travels_only_while_set() {
        let mut item = SkillGroup {
            id: "s1".into(),
            field: "Languages".into(),
            entities: vec!["Rust".into()],
            edit_state: EditState::Unmarked,
        };
        let unmarked = serde_json::to_value(&item).unwrap();
        assert!(unmarked.get("edit_state").is_none());

        item.edit_state = EditState::Deleted;
        let deleted = serde_json::to_value(&item).unwrap();
        assert_eq!(deleted["edit_state"], "deleted");
    }

    #[test]
    fn test_edit_state_defaults_to_unmarked_on_the_wire() {
        let item: SkillGroup = serde_json::from_value(serde_json::json!({
            "id": "s1",
            "field": "Languages",
            "entities": ["Rust"]
        }))
        .unwrap();
        assert_eq!(item.edit_state, EditState::Unmarked);
    }

    #[test]
    fn test_unassigned_id_stays_off_the_wire() {
        let draft = EducationItem {
            degree: "BSc".into(),
            ..Default::default()
        };
        let value = serde_json::to_value(&draft).unwrap();
        assert!(
            value.get("id").is_none(),
            "a create payload must not carry the sentinel id"
        );

        let persisted = EducationItem {
            id: "e1".into(),
            ..draft
        };
        let value = serde_json::to_value(&persisted).unwrap();
        assert_eq!(value["id"], "e1");
    }

    #[test]
    fn test_patch_serialization_omits_unchanged_fields() {
        let patch = EducationPatch {
            degree: Some("MSc".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, serde_json::json!({ "degree": "MSc" }));
    }

    #[test]
    fn test_empty_patches_report_empty() {
        assert!(ResumePatch::default().is_empty());
        assert!(EducationPatch::default().is_empty());
        assert!(ExperiencePatch::default().is_empty());
        assert!(SkillGroupPatch::default().is_empty());
        assert!(ProjectPatch::default().is_empty());
    }
}
