//! Résumé CRUD and save-cycle handlers.
//!
//! There is no session layer here: the caller identity arrives as an
//! explicit `user_id` query parameter and every mutation is re-checked
//! against the owning résumé by the store.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{NewResume, Resume, ResumePatch};
use crate::reconcile::Reconciler;
use crate::slug::{slug_from_host, validate_slug};
use crate::state::AppState;
use crate::store::pg::PgStore;
use crate::store::{ChildFields, ChildKind, ChildPatch, ResumeStore};

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct HostQuery {
    pub host: String,
}

/// Both snapshots of one save cycle, as held by the editor.
#[derive(Debug, Deserialize)]
pub struct SaveCycleRequest {
    pub original: Resume,
    pub edited: Resume,
}

#[derive(Serialize)]
pub struct SlugResponse {
    pub slug: Option<String>,
}

/// GET /api/v1/resumes/:slug — public read path.
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Resume>, AppError> {
    let store = PgStore::new(state.db.clone());
    let resume = store
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("resume '{slug}'")))?;
    Ok(Json(resume))
}

/// GET /api/v1/resolve?host=alice.example.com — public subdomain lookup.
pub async fn handle_resolve_host(
    State(state): State<AppState>,
    Query(params): Query<HostQuery>,
) -> Json<SlugResponse> {
    let slug = slug_from_host(&params.host, &state.config.root_domain);
    Json(SlugResponse {
        slug: slug.map(str::to_string),
    })
}

/// POST /api/v1/resumes
pub async fn handle_create_resume(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
    Json(new): Json<NewResume>,
) -> Result<(StatusCode, Json<Resume>), AppError> {
    validate_slug(&new.slug)?;
    let store = PgStore::with_caller(state.db.clone(), params.user_id);
    let resume = store.create_resume(&new).await?;
    Ok((StatusCode::CREATED, Json(resume)))
}

/// PATCH /api/v1/resumes/:slug
pub async fn handle_update_resume(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<UserIdQuery>,
    Json(patch): Json<ResumePatch>,
) -> Result<Json<Resume>, AppError> {
    let store = PgStore::with_caller(state.db.clone(), params.user_id);
    let resume = store.update_resume(&slug, &patch).await?;
    Ok(Json(resume))
}

/// DELETE /api/v1/resumes/:slug
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    let store = PgStore::with_caller(state.db.clone(), params.user_id);
    store.delete_resume(&slug).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/resumes/:slug/save — runs one reconciliation cycle
/// server-side. The gate in app state spans all handlers, so overlapping
/// saves for the same slug are rejected with 409.
pub async fn handle_save_cycle(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<UserIdQuery>,
    Json(req): Json<SaveCycleRequest>,
) -> Result<Json<Resume>, AppError> {
    if req.original.slug != slug || req.edited.slug != slug {
        return Err(AppError::Validation(
            "snapshot slugs do not match the path".to_string(),
        ));
    }
    let store = PgStore::with_caller(state.db.clone(), params.user_id);
    let reconciler = Reconciler::with_gate(store, state.save_gate.clone());
    let saved = reconciler.save(&req.original, &req.edited).await?;
    Ok(Json(saved))
}

/// POST /api/v1/resumes/:slug/:kind
pub async fn handle_create_child(
    State(state): State<AppState>,
    Path((slug, kind)): Path<(String, ChildKind)>,
    Query(params): Query<UserIdQuery>,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let fields = parse_child_fields(kind, payload)?;
    let store = PgStore::with_caller(state.db.clone(), params.user_id);
    let id = store.create_child(&slug, &fields).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// PATCH /api/v1/children/:kind/:id
pub async fn handle_update_child(
    State(state): State<AppState>,
    Path((kind, id)): Path<(ChildKind, String)>,
    Query(params): Query<UserIdQuery>,
    Json(payload): Json<Value>,
) -> Result<StatusCode, AppError> {
    let patch = parse_child_patch(kind, payload)?;
    let store = PgStore::with_caller(state.db.clone(), params.user_id);
    store.update_child(kind, &id, &patch).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/children/:kind/:id
pub async fn handle_delete_child(
    State(state): State<AppState>,
    Path((kind, id)): Path<(ChildKind, String)>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    let store = PgStore::with_caller(state.db.clone(), params.user_id);
    store.delete_child(kind, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/me/slug
pub async fn handle_slug_for_user(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<SlugResponse>, AppError> {
    let store = PgStore::with_caller(state.db.clone(), params.user_id);
    let slug = store.slug_for_user().await?;
    Ok(Json(SlugResponse { slug }))
}

/// The child routes carry the kind in the path, so the JSON body is parsed
/// into the matching concrete type here instead of an untagged enum.
fn parse_child_fields(kind: ChildKind, payload: Value) -> Result<ChildFields, AppError> {
    let fields = match kind {
        ChildKind::Education => ChildFields::Education(from_value(payload)?),
        ChildKind::Experience => ChildFields::Experience(from_value(payload)?),
        ChildKind::Skills => ChildFields::Skills(from_value(payload)?),
        ChildKind::Projects => ChildFields::Projects(from_value(payload)?),
    };
    Ok(fields)
}

fn parse_child_patch(kind: ChildKind, payload: Value) -> Result<ChildPatch, AppError> {
    let patch = match kind {
        ChildKind::Education => ChildPatch::Education(from_value(payload)?),
        ChildKind::Experience => ChildPatch::Experience(from_value(payload)?),
        ChildKind::Skills => ChildPatch::Skills(from_value(payload)?),
        ChildKind::Projects => ChildPatch::Projects(from_value(payload)?),
    };
    Ok(patch)
}

fn from_value<T: serde::de::DeserializeOwned>(payload: Value) -> Result<T, AppError> {
    serde_json::from_value(payload).map_err(|e| AppError::Validation(format!("invalid payload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::EducationPatch;

    #[test]
    fn test_child_fields_parse_by_kind() {
        let payload = json!({
            "degree": "BSc",
            "field_of_study": "CS",
            "university": "ETH",
            "city_and_country": "Zurich",
            "from": "2018",
            "to": "2021"
        });
        let fields = parse_child_fields(ChildKind::Education, payload).unwrap();
        match fields {
            ChildFields::Education(e) => {
                assert_eq!(e.degree, "BSc");
                assert_eq!(e.id, "", "id defaults to the unassigned sentinel");
            }
            other => panic!("wrong kind: {other:?}"),
        }
    }

    #[test]
    fn test_child_fields_reject_wrong_shape() {
        // An education payload posted to the skills route is invalid.
        let payload = json!({ "degree": "BSc" });
        let err = parse_child_fields(ChildKind::Skills, payload).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_child_patch_allows_partial_payload() {
        let payload = json!({ "degree": "MSc" });
        let patch = parse_child_patch(ChildKind::Education, payload).unwrap();
        assert_eq!(
            patch,
            ChildPatch::Education(EducationPatch {
                degree: Some("MSc".into()),
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_empty_child_patch_is_valid_and_empty() {
        let patch = parse_child_patch(ChildKind::Projects, json!({})).unwrap();
        match patch {
            ChildPatch::Projects(p) => assert!(p.is_empty()),
            other => panic!("wrong kind: {other:?}"),
        }
    }
}
