//! Shared fixtures for unit tests.

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use crate::models::resume::{
    EducationItem, ExperienceItem, ProjectItem, Resume, SkillGroup,
};

/// A fully populated document with one item per child collection and fixed
/// timestamps, as a last-fetched snapshot would look.
pub(crate) fn sample_resume(slug: &str) -> Resume {
    let fetched_at = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
    Resume {
        slug: slug.to_string(),
        user_id: Uuid::from_u128(7),
        pre_name: "Alice".into(),
        last_name: "Zimmermann".into(),
        email: "alice@example.com".into(),
        telephone: Some("+41 00 000 00 00".into()),
        city_and_country: Some("Zurich, Switzerland".into()),
        github: Some("alicez".into()),
        linkedin: None,
        website: None,
        objective: Some("Backend engineering".into()),
        domain: None,
        impressum: None,
        avatar: None,
        extracurricular: vec!["Volunteer mentor".into()],
        new_page_before: vec![],
        education: vec![EducationItem {
            id: "edu-1".into(),
            degree: "BSc".into(),
            field_of_study: "Computer Science".into(),
            university: "ETH".into(),
            city_and_country: "Zurich, Switzerland".into(),
            from: "2018".into(),
            to: "2021".into(),
            ..Default::default()
        }],
        experience: vec![ExperienceItem {
            id: "exp-1".into(),
            position: "Software Engineer".into(),
            company: "Acme".into(),
            city_and_country: "Zurich, Switzerland".into(),
            from: "2021".into(),
            to: "present".into(),
            infos: vec!["Shipped the billing service".into()],
            ..Default::default()
        }],
        skills: vec![SkillGroup {
            id: "skl-1".into(),
            field: "Languages".into(),
            entities: vec!["Rust".into(), "SQL".into()],
            ..Default::default()
        }],
        projects: vec![ProjectItem {
            id: "prj-1".into(),
            name: "vitae".into(),
            description: "This very site".into(),
            ..Default::default()
        }],
        created_at: fetched_at,
        updated_at: fetched_at,
    }
}
