use sqlx::PgPool;

use crate::config::Config;
use crate::reconcile::SaveGate;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// Per-document in-flight marker shared by all save handlers, so two
    /// concurrent saves of the same slug never interleave.
    pub save_gate: SaveGate,
}
