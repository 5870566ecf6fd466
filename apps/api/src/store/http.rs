//! HTTP client implementation of [`ResumeStore`] over the `/api/v1` routes.
//!
//! This is what an editor frontend links against: the reconciler drives the
//! same capability trait whether the store is local Postgres or a remote API.

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use uuid::Uuid;

use crate::models::resume::{NewResume, Resume, ResumePatch};
use crate::store::{ChildFields, ChildKind, ChildPatch, ResumeStore, StoreError};

#[derive(Clone)]
pub struct HttpStore {
    client: Client,
    base_url: String,
    caller: Option<Uuid>,
}

#[derive(Deserialize)]
struct CreatedChild {
    id: String,
}

#[derive(Deserialize)]
struct SlugResponse {
    slug: Option<String>,
}

/// The server's `{"error":{"code","message"}}` body.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

fn envelope_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

impl HttpStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            caller: None,
        }
    }

    pub fn with_caller(base_url: impl Into<String>, user_id: Uuid) -> Self {
        Self {
            caller: Some(user_id),
            ..Self::new(base_url)
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Caller identity travels as an explicit query parameter, mirroring the
    /// server's extractors. Requests without it fail ownership checks there.
    fn user_query(&self) -> Vec<(&'static str, String)> {
        self.caller
            .map(|u| vec![("user_id", u.to_string())])
            .unwrap_or_default()
    }

    /// Maps an error status onto the store taxonomy, reading the error
    /// envelope where the status alone is ambiguous.
    async fn check(resp: Response) -> Result<Response, StoreError> {
        match resp.status() {
            s if s.is_success() => Ok(resp),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(StoreError::NotAuthorized),
            StatusCode::NOT_FOUND => {
                let body = resp.text().await.unwrap_or_default();
                Err(StoreError::NotFound(envelope_message(&body)))
            }
            StatusCode::CONFLICT => {
                // 409 covers both a taken slug and an in-flight save; only
                // the envelope code tells them apart.
                let body = resp.text().await.unwrap_or_default();
                match serde_json::from_str::<ErrorEnvelope>(&body) {
                    Ok(e) if e.error.code == "CONFLICT" => {
                        Err(StoreError::SlugTaken(e.error.message))
                    }
                    Ok(e) => Err(StoreError::Transport(anyhow!(
                        "HTTP 409 {}: {}",
                        e.error.code,
                        e.error.message
                    ))),
                    Err(_) => Err(StoreError::SlugTaken(body)),
                }
            }
            s => {
                let body = resp.text().await.unwrap_or_default();
                Err(StoreError::Transport(anyhow!("HTTP {s}: {body}")))
            }
        }
    }
}

fn transport(e: reqwest::Error) -> StoreError {
    StoreError::Transport(e.into())
}

#[async_trait]
impl ResumeStore for HttpStore {
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Resume>, StoreError> {
        let resp = self
            .client
            .get(self.url(&format!("/api/v1/resumes/{slug}")))
            .send()
            .await
            .map_err(transport)?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = Self::check(resp).await?;
        Ok(Some(resp.json().await.map_err(transport)?))
    }

    async fn create_resume(&self, new: &NewResume) -> Result<Resume, StoreError> {
        let resp = self
            .client
            .post(self.url("/api/v1/resumes"))
            .query(&self.user_query())
            .json(new)
            .send()
            .await
            .map_err(transport)?;
        let resp = Self::check(resp).await?;
        resp.json().await.map_err(transport)
    }

    async fn update_resume(&self, slug: &str, patch: &ResumePatch) -> Result<Resume, StoreError> {
        let resp = self
            .client
            .patch(self.url(&format!("/api/v1/resumes/{slug}")))
            .query(&self.user_query())
            .json(patch)
            .send()
            .await
            .map_err(transport)?;
        let resp = Self::check(resp).await?;
        resp.json().await.map_err(transport)
    }

    async fn delete_resume(&self, slug: &str) -> Result<(), StoreError> {
        let resp = self
            .client
            .delete(self.url(&format!("/api/v1/resumes/{slug}")))
            .query(&self.user_query())
            .send()
            .await
            .map_err(transport)?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn create_child(&self, slug: &str, fields: &ChildFields) -> Result<String, StoreError> {
        let kind = fields.kind();
        let resp = self
            .client
            .post(self.url(&format!("/api/v1/resumes/{slug}/{kind}")))
            .query(&self.user_query())
            .json(fields)
            .send()
            .await
            .map_err(transport)?;
        let resp = Self::check(resp).await?;
        let created: CreatedChild = resp.json().await.map_err(transport)?;
        Ok(created.id)
    }

    async fn update_child(
        &self,
        kind: ChildKind,
        id: &str,
        patch: &ChildPatch,
    ) -> Result<(), StoreError> {
        if patch.kind() != kind {
            return Err(StoreError::KindMismatch {
                kind,
                patch: patch.kind(),
            });
        }
        let resp = self
            .client
            .patch(self.url(&format!("/api/v1/children/{kind}/{id}")))
            .query(&self.user_query())
            .json(patch)
            .send()
            .await
            .map_err(transport)?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn delete_child(&self, kind: ChildKind, id: &str) -> Result<(), StoreError> {
        let resp = self
            .client
            .delete(self.url(&format!("/api/v1/children/{kind}/{id}")))
            .query(&self.user_query())
            .send()
            .await
            .map_err(transport)?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn slug_for_user(&self) -> Result<Option<String>, StoreError> {
        let resp = self
            .client
            .get(self.url("/api/v1/me/slug"))
            .query(&self.user_query())
            .send()
            .await
            .map_err(transport)?;
        let resp = Self::check(resp).await?;
        let body: SlugResponse = resp.json().await.map_err(transport)?;
        Ok(body.slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::ProjectPatch;

    /// Builds a response as the server would send it, without a server.
    fn synthetic(status: u16, body: &str) -> Response {
        http::Response::builder()
            .status(status)
            .body(body.to_string())
            .unwrap()
            .into()
    }

    #[tokio::test]
    async fn test_check_passes_success_through() {
        assert!(HttpStore::check(synthetic(200, "{}")).await.is_ok());
    }

    #[tokio::test]
    async fn test_check_maps_auth_statuses_to_not_authorized() {
        for status in [401, 403] {
            let err = HttpStore::check(synthetic(status, "")).await.unwrap_err();
            assert!(
                matches!(err, StoreError::NotAuthorized),
                "status {status} must map to NotAuthorized, got {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_check_maps_404_to_not_found_with_envelope_message() {
        let body = r#"{"error":{"code":"NOT_FOUND","message":"resume 'alice'"}}"#;
        let err = HttpStore::check(synthetic(404, body)).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(ref what) if what == "resume 'alice'"));
    }

    #[tokio::test]
    async fn test_check_maps_conflict_code_to_slug_taken() {
        let body = r#"{"error":{"code":"CONFLICT","message":"slug 'alice' is taken"}}"#;
        let err = HttpStore::check(synthetic(409, body)).await.unwrap_err();
        assert!(matches!(err, StoreError::SlugTaken(ref msg) if msg == "slug 'alice' is taken"));
    }

    #[tokio::test]
    async fn test_check_keeps_in_flight_conflict_out_of_slug_taken() {
        let body =
            r#"{"error":{"code":"SAVE_IN_FLIGHT","message":"A save for 'alice' is already running"}}"#;
        let err = HttpStore::check(synthetic(409, body)).await.unwrap_err();
        match err {
            StoreError::Transport(e) => assert!(e.to_string().contains("SAVE_IN_FLIGHT")),
            other => panic!("expected a transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_check_maps_server_errors_to_transport() {
        let err = HttpStore::check(synthetic(500, "boom")).await.unwrap_err();
        assert!(matches!(err, StoreError::Transport(_)));
    }

    #[tokio::test]
    async fn test_update_child_rejects_mismatched_patch_kind() {
        // Rejected before any request is made, so no server is needed.
        let store = HttpStore::new("http://localhost:8080");
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

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let store = HttpStore::new("http://localhost:8080/");
        assert_eq!(
            store.url("/api/v1/resumes/alice"),
            "http://localhost:8080/api/v1/resumes/alice"
        );
    }

    #[test]
    fn test_user_query_empty_without_caller() {
        let store = HttpStore::new("http://localhost:8080");
        assert!(store.user_query().is_empty());
    }

    #[test]
    fn test_user_query_carries_caller() {
        let user = Uuid::new_v4();
        let store = HttpStore::with_caller("http://localhost:8080", user);
        assert_eq!(store.user_query(), vec![("user_id", user.to_string())]);
    }
}
