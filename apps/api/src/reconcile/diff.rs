//! Field-level diffs between an edited record and its last-fetched copy.
//!
//! Comparison is structural: array-valued fields (bullet points, skill
//! entities, root tag lists) are compared element-wise through `PartialEq`,
//! never by serialization. Identifier, edit-state flag, parent key, and
//! server timestamps are excluded from every diff. Edited `null`s are
//! normalized to unset, so a patch can never clear a field remotely.

use crate::models::resume::{
    EducationItem, EducationPatch, EditState, ExperienceItem, ExperiencePatch, ProjectItem,
    ProjectPatch, Resume, ResumePatch, SkillGroup, SkillGroupPatch,
};
use crate::reconcile::plan::ChildEntity;

/// The edited value, if it differs from the original.
fn changed<T: PartialEq + Clone>(original: &T, edited: &T) -> Option<T> {
    (edited != original).then(|| edited.clone())
}

/// Like [`changed`] for nullable fields: an edited `None` is normalized to
/// unset and never transmitted, even when the original holds a value.
fn changed_opt<T: PartialEq + Clone>(original: &Option<T>, edited: &Option<T>) -> Option<T> {
    match edited {
        Some(value) if original.as_ref() != Some(value) => Some(value.clone()),
        _ => None,
    }
}

/// Diff of the root scalar and array fields. Slug, owner, children, and
/// timestamps are not part of the patch.
pub fn diff_resume(original: &Resume, edited: &Resume) -> ResumePatch {
    ResumePatch {
        pre_name: changed(&original.pre_name, &edited.pre_name),
        last_name: changed(&original.last_name, &edited.last_name),
        email: changed(&original.email, &edited.email),
        telephone: changed_opt(&original.telephone, &edited.telephone),
        city_and_country: changed_opt(&original.city_and_country, &edited.city_and_country),
        github: changed_opt(&original.github, &edited.github),
        linkedin: changed_opt(&original.linkedin, &edited.linkedin),
        website: changed_opt(&original.website, &edited.website),
        objective: changed_opt(&original.objective, &edited.objective),
        domain: changed_opt(&original.domain, &edited.domain),
        impressum: changed_opt(&original.impressum, &edited.impressum),
        avatar: changed_opt(&original.avatar, &edited.avatar),
        extracurricular: changed(&original.extracurricular, &edited.extracurricular),
        new_page_before: changed(&original.new_page_before, &edited.new_page_before),
    }
}

impl ChildEntity for EducationItem {
    type Patch = EducationPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn edit_state(&self) -> EditState {
        self.edit_state
    }

    fn diff_against(&self, original: &Self) -> Option<EducationPatch> {
        let patch = EducationPatch {
            degree: changed(&original.degree, &self.degree),
            field_of_study: changed(&original.field_of_study, &self.field_of_study),
            university: changed(&original.university, &self.university),
            city_and_country: changed(&original.city_and_country, &self.city_and_country),
            from: changed(&original.from, &self.from),
            to: changed(&original.to, &self.to),
            expected: changed_opt(&original.expected, &self.expected),
            grade_point_average: changed_opt(&original.grade_point_average, &self.grade_point_average),
            thesis: changed_opt(&original.thesis, &self.thesis),
            thesis_grade: changed_opt(&original.thesis_grade, &self.thesis_grade),
        };
        (!patch.is_empty()).then_some(patch)
    }
}

impl ChildEntity for ExperienceItem {
    type Patch = ExperiencePatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn edit_state(&self) -> EditState {
        self.edit_state
    }

    fn diff_against(&self, original: &Self) -> Option<ExperiencePatch> {
        let patch = ExperiencePatch {
            position: changed(&original.position, &self.position),
            company: changed(&original.company, &self.company),
            city_and_country: changed(&original.city_and_country, &self.city_and_country),
            from: changed(&original.from, &self.from),
            to: changed(&original.to, &self.to),
            infos: changed(&original.infos, &self.infos),
        };
        (!patch.is_empty()).then_some(patch)
    }
}

impl ChildEntity for SkillGroup {
    type Patch = SkillGroupPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn edit_state(&self) -> EditState {
        self.edit_state
    }

    fn diff_against(&self, original: &Self) -> Option<SkillGroupPatch> {
        let patch = SkillGroupPatch {
            field: changed(&original.field, &self.field),
            entities: changed(&original.entities, &self.entities),
        };
        (!patch.is_empty()).then_some(patch)
    }
}

impl ChildEntity for ProjectItem {
    type Patch = ProjectPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn edit_state(&self) -> EditState {
        self.edit_state
    }

    fn diff_against(&self, original: &Self) -> Option<ProjectPatch> {
        let patch = ProjectPatch {
            name: changed(&original.name, &self.name),
            description: changed(&original.description, &self.description),
            image: changed_opt(&original.image, &self.image),
            github: changed_opt(&original.github, &self.github),
            demo: changed_opt(&original.demo, &self.demo),
        };
        (!patch.is_empty()).then_some(patch)
    }
}
