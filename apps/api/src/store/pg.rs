//! PostgreSQL-backed implementation of [`ResumeStore`].
//!
//! Every mutation re-checks ownership against the `resumes.user_id` column
//! before touching data. The caller identity is bound at construction time;
//! a store without a caller can only use the public read path.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::resume::{
    EducationItem, EducationPatch, ExperienceItem, ExperiencePatch, NewResume, ProjectItem,
    ProjectPatch, Resume, ResumePatch, SkillGroup, SkillGroupPatch,
};
use crate::store::{ChildFields, ChildKind, ChildPatch, ResumeStore, StoreError};

impl ChildKind {
    /// Table backing this child collection.
    fn table(&self) -> &'static str {
        match self {
            ChildKind::Education => "education",
            ChildKind::Experience => "experience",
            ChildKind::Skills => "skill_groups",
            ChildKind::Projects => "projects",
        }
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    caller: Option<Uuid>,
}

impl PgStore {
    /// Store without a caller identity. Mutations fail with `NotAuthorized`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool, caller: None }
    }

    /// Store acting on behalf of a user.
    pub fn with_caller(pool: PgPool, user_id: Uuid) -> Self {
        Self {
            pool,
            caller: Some(user_id),
        }
    }

    fn caller(&self) -> Result<Uuid, StoreError> {
        self.caller.ok_or(StoreError::NotAuthorized)
    }

    /// Fails unless the résumé exists and is owned by the caller.
    async fn require_owned(&self, slug: &str) -> Result<(), StoreError> {
        let caller = self.caller()?;
        let owner: Option<Uuid> = sqlx::query_scalar("SELECT user_id FROM resumes WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        match owner {
            None => Err(StoreError::NotFound(format!("resume '{slug}'"))),
            Some(o) if o == caller => Ok(()),
            Some(_) => Err(StoreError::NotAuthorized),
        }
    }

    /// Resolves a child id to its parent slug, enforcing ownership.
    async fn require_owned_child(&self, kind: ChildKind, id: &str) -> Result<String, StoreError> {
        let caller = self.caller()?;
        let sql = format!(
            "SELECT r.user_id, c.resume_slug FROM {} c \
             JOIN resumes r ON r.slug = c.resume_slug WHERE c.id = $1",
            kind.table()
        );
        let row: Option<(Uuid, String)> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            None => Err(StoreError::NotFound(format!("{kind} item '{id}'"))),
            Some((owner, slug)) if owner == caller => Ok(slug),
            Some(_) => Err(StoreError::NotAuthorized),
        }
    }

    async fn attach_children(&self, resume: &mut Resume) -> Result<(), StoreError> {
        resume.education = sqlx::query_as::<_, EducationItem>(
            "SELECT * FROM education WHERE resume_slug = $1 ORDER BY created_at, id",
        )
        .bind(&resume.slug)
        .fetch_all(&self.pool)
        .await?;

        resume.experience = sqlx::query_as::<_, ExperienceItem>(
            "SELECT * FROM experience WHERE resume_slug = $1 ORDER BY created_at, id",
        )
        .bind(&resume.slug)
        .fetch_all(&self.pool)
        .await?;

        resume.skills = sqlx::query_as::<_, SkillGroup>(
            "SELECT * FROM skill_groups WHERE resume_slug = $1 ORDER BY created_at, id",
        )
        .bind(&resume.slug)
        .fetch_all(&self.pool)
        .await?;

        resume.projects = sqlx::query_as::<_, ProjectItem>(
            "SELECT * FROM projects WHERE resume_slug = $1 ORDER BY created_at, id",
        )
        .bind(&resume.slug)
        .fetch_all(&self.pool)
        .await?;

        Ok(())
    }

    async fn create_education(&self, slug: &str, e: &EducationItem) -> Result<String, StoreError> {
        let id: String = sqlx::query_scalar(
            r#"
            INSERT INTO education
                (resume_slug, degree, field_of_study, university, city_and_country,
                 from_date, to_date, expected, grade_point_average, thesis, thesis_grade)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            "#,
        )
        .bind(slug)
        .bind(&e.degree)
        .bind(&e.field_of_study)
        .bind(&e.university)
        .bind(&e.city_and_country)
        .bind(&e.from)
        .bind(&e.to)
        .bind(&e.expected)
        .bind(&e.grade_point_average)
        .bind(&e.thesis)
        .bind(&e.thesis_grade)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn create_experience(
        &self,
        slug: &str,
        e: &ExperienceItem,
    ) -> Result<String, StoreError> {
        let id: String = sqlx::query_scalar(
            r#"
            INSERT INTO experience
                (resume_slug, "position", company, city_and_country, from_date, to_date, infos)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(slug)
        .bind(&e.position)
        .bind(&e.company)
        .bind(&e.city_and_country)
        .bind(&e.from)
        .bind(&e.to)
        .bind(&e.infos)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn create_skill_group(&self, slug: &str, s: &SkillGroup) -> Result<String, StoreError> {
        let id: String = sqlx::query_scalar(
            "INSERT INTO skill_groups (resume_slug, field, entities) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(slug)
        .bind(&s.field)
        .bind(&s.entities)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn create_project(&self, slug: &str, p: &ProjectItem) -> Result<String, StoreError> {
        let id: String = sqlx::query_scalar(
            r#"
            INSERT INTO projects (resume_slug, name, description, image, github, demo)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(slug)
        .bind(&p.name)
        .bind(&p.description)
        .bind(&p.image)
        .bind(&p.github)
        .bind(&p.demo)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update_education(&self, id: &str, p: &EducationPatch) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE education SET
                degree = COALESCE($2, degree),
                field_of_study = COALESCE($3, field_of_study),
                university = COALESCE($4, university),
                city_and_country = COALESCE($5, city_and_country),
                from_date = COALESCE($6, from_date),
                to_date = COALESCE($7, to_date),
                expected = COALESCE($8, expected),
                grade_point_average = COALESCE($9, grade_point_average),
                thesis = COALESCE($10, thesis),
                thesis_grade = COALESCE($11, thesis_grade)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&p.degree)
        .bind(&p.field_of_study)
        .bind(&p.university)
        .bind(&p.city_and_country)
        .bind(&p.from)
        .bind(&p.to)
        .bind(&p.expected)
        .bind(&p.grade_point_average)
        .bind(&p.thesis)
        .bind(&p.thesis_grade)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_experience(&self, id: &str, p: &ExperiencePatch) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE experience SET
                "position" = COALESCE($2, "position"),
                company = COALESCE($3, company),
                city_and_country = COALESCE($4, city_and_country),
                from_date = COALESCE($5, from_date),
                to_date = COALESCE($6, to_date),
                infos = COALESCE($7, infos)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&p.position)
        .bind(&p.company)
        .bind(&p.city_and_country)
        .bind(&p.from)
        .bind(&p.to)
        .bind(&p.infos)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_skill_group(&self, id: &str, p: &SkillGroupPatch) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE skill_groups SET
                field = COALESCE($2, field),
                entities = COALESCE($3, entities)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&p.field)
        .bind(&p.entities)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_project(&self, id: &str, p: &ProjectPatch) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE projects SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                image = COALESCE($4, image),
                github = COALESCE($5, github),
                demo = COALESCE($6, demo)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&p.name)
        .bind(&p.description)
        .bind(&p.image)
        .bind(&p.github)
        .bind(&p.demo)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ResumeStore for PgStore {
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Resume>, StoreError> {
        let resume: Option<Resume> = sqlx::query_as("SELECT * FROM resumes WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        match resume {
            None => Ok(None),
            Some(mut resume) => {
                self.attach_children(&mut resume).await?;
                Ok(Some(resume))
            }
        }
    }

    async fn create_resume(&self, new: &NewResume) -> Result<Resume, StoreError> {
        let caller = self.caller()?;
        let mut resume: Resume = sqlx::query_as(
            r#"
            INSERT INTO resumes
                (slug, user_id, pre_name, last_name, email, telephone, city_and_country,
                 github, linkedin, website, objective, domain, impressum, avatar,
                 extracurricular, new_page_before)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING *
            "#,
        )
        .bind(&new.slug)
        .bind(caller)
        .bind(&new.pre_name)
        .bind(&new.last_name)
        .bind(&new.email)
        .bind(&new.telephone)
        .bind(&new.city_and_country)
        .bind(&new.github)
        .bind(&new.linkedin)
        .bind(&new.website)
        .bind(&new.objective)
        .bind(&new.domain)
        .bind(&new.impressum)
        .bind(&new.avatar)
        .bind(&new.extracurricular)
        .bind(&new.new_page_before)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::SlugTaken(new.slug.clone())
            }
            _ => StoreError::Database(e),
        })?;
        self.attach_children(&mut resume).await?;
        info!("Created resume '{}' for user {caller}", resume.slug);
        Ok(resume)
    }

    async fn update_resume(&self, slug: &str, patch: &ResumePatch) -> Result<Resume, StoreError> {
        self.require_owned(slug).await?;
        let mut resume: Resume = sqlx::query_as(
            r#"
            UPDATE resumes SET
                pre_name = COALESCE($2, pre_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                telephone = COALESCE($5, telephone),
                city_and_country = COALESCE($6, city_and_country),
                github = COALESCE($7, github),
                linkedin = COALESCE($8, linkedin),
                website = COALESCE($9, website),
                objective = COALESCE($10, objective),
                domain = COALESCE($11, domain),
                impressum = COALESCE($12, impressum),
                avatar = COALESCE($13, avatar),
                extracurricular = COALESCE($14, extracurricular),
                new_page_before = COALESCE($15, new_page_before),
                updated_at = now()
            WHERE slug = $1
            RETURNING *
            "#,
        )
        .bind(slug)
        .bind(&patch.pre_name)
        .bind(&patch.last_name)
        .bind(&patch.email)
        .bind(&patch.telephone)
        .bind(&patch.city_and_country)
        .bind(&patch.github)
        .bind(&patch.linkedin)
        .bind(&patch.website)
        .bind(&patch.objective)
        .bind(&patch.domain)
        .bind(&patch.impressum)
        .bind(&patch.avatar)
        .bind(&patch.extracurricular)
        .bind(&patch.new_page_before)
        .fetch_one(&self.pool)
        .await?;
        self.attach_children(&mut resume).await?;
        Ok(resume)
    }

    async fn delete_resume(&self, slug: &str) -> Result<(), StoreError> {
        self.require_owned(slug).await?;
        // children cascade
        sqlx::query("DELETE FROM resumes WHERE slug = $1")
            .bind(slug)
            .execute(&self.pool)
            .await?;
        info!("Deleted resume '{slug}'");
        Ok(())
    }

    async fn create_child(&self, slug: &str, fields: &ChildFields) -> Result<String, StoreError> {
        self.require_owned(slug).await?;
        let id = match fields {
            ChildFields::Education(e) => self.create_education(slug, e).await?,
            ChildFields::Experience(e) => self.create_experience(slug, e).await?,
            ChildFields::Skills(s) => self.create_skill_group(slug, s).await?,
            ChildFields::Projects(p) => self.create_project(slug, p).await?,
        };
        info!("Created {} item {id} under '{slug}'", fields.kind());
        Ok(id)
    }

    async fn update_child(
        &self,
        kind: ChildKind,
        id: &str,
        patch: &ChildPatch,
    ) -> Result<(), StoreError> {
        // Ownership resolves through the addressed kind's table; a patch of
        // another kind would update a row that check never saw.
        if patch.kind() != kind {
            return Err(StoreError::KindMismatch {
                kind,
                patch: patch.kind(),
            });
        }
        self.require_owned_child(kind, id).await?;
        match patch {
            ChildPatch::Education(p) => self.update_education(id, p).await,
            ChildPatch::Experience(p) => self.update_experience(id, p).await,
            ChildPatch::Skills(p) => self.update_skill_group(id, p).await,
            ChildPatch::Projects(p) => self.update_project(id, p).await,
        }
    }

    async fn delete_child(&self, kind: ChildKind, id: &str) -> Result<(), StoreError> {
        self.require_owned_child(kind, id).await?;
        let sql = format!("DELETE FROM {} WHERE id = $1", kind.table());
        sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        info!("Deleted {kind} item {id}");
        Ok(())
    }

    async fn slug_for_user(&self) -> Result<Option<String>, StoreError> {
        let caller = self.caller()?;
        let slug: Option<String> = sqlx::query_scalar(
            "SELECT slug FROM resumes WHERE user_id = $1 ORDER BY created_at LIMIT 1",
        )
        .bind(caller)
        .fetch_optional(&self.pool)
        .await?;
        Ok(slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    #[tokio::test]
    async fn test_update_child_rejects_mismatched_patch_kind() {
        // Lazy pool: the mismatch is rejected before any query runs, so no
        // database is needed.
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        let store = PgStore::with_caller(pool, Uuid::new_v4());

        let patch = ChildPatch::Projects(ProjectPatch::default());
        let err = store
            .update_child(ChildKind::Education, "e1", &patch)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::KindMismatch {
                kind: ChildKind::Education,
                patch: ChildKind::Projects,
            }
        ));
    }
}
