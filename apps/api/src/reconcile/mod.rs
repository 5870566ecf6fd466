//! Save-cycle reconciliation.
//!
//! A save cycle compares the edited in-memory document against the
//! last-fetched snapshot and issues the minimal set of store calls: per
//! child collection first deletions, then creates, then updates; finally a
//! single root update that also refreshes the whole document. If nothing
//! changed anywhere, no call is made and the original snapshot is returned
//! untouched.
//!
//! At most one cycle may be in flight per document. Calls are issued and
//! awaited sequentially; a failing call aborts the remainder of the cycle
//! with no rollback, leaving the store as the source of truth for the next
//! load.

pub mod diff;
pub mod plan;

pub use diff::diff_resume;
pub use plan::{plan, ChildEntity, ChildOp};

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tracing::{debug, info};

use crate::models::resume::Resume;
use crate::store::{ChildFields, ChildKind, ChildPatch, ResumeStore, StoreError};

#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A save cycle for this document is already in flight; retry once it
    /// resolves. The rejected cycle made no remote call.
    #[error("a save for '{0}' is already in flight")]
    SaveInFlight(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Tracks which documents currently have a save cycle in flight. Cheap to
/// clone and shared across callers, so concurrent saves of the same slug
/// can never interleave their remote calls.
#[derive(Clone, Default)]
pub struct SaveGate(Arc<Mutex<HashSet<String>>>);

impl SaveGate {
    /// Claims the slug for one cycle. `None` when a cycle already holds it.
    fn try_begin(&self, slug: &str) -> Option<SaveToken> {
        let mut held = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        held.insert(slug.to_string()).then(|| SaveToken {
            slug: slug.to_string(),
            gate: self.clone(),
        })
    }
}

/// Releases the slug when the cycle ends, on success and on failure alike.
struct SaveToken {
    slug: String,
    gate: SaveGate,
}

impl Drop for SaveToken {
    fn drop(&mut self) {
        let mut held = self.gate.0.lock().unwrap_or_else(PoisonError::into_inner);
        held.remove(&self.slug);
    }
}

/// Orchestrates save cycles against a [`ResumeStore`].
pub struct Reconciler<S> {
    store: S,
    gate: SaveGate,
}

impl<S: ResumeStore> Reconciler<S> {
    pub fn new(store: S) -> Self {
        Self::with_gate(store, SaveGate::default())
    }

    /// Shares an externally owned gate, e.g. one held in server state so the
    /// per-document guard spans independently constructed reconcilers.
    pub fn with_gate(store: S, gate: SaveGate) -> Self {
        Self { store, gate }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs one save cycle and returns the authoritative post-save document,
    /// or the unchanged `original` when there was nothing to do.
    pub async fn save(&self, original: &Resume, edited: &Resume) -> Result<Resume, ReconcileError> {
        let slug = original.slug.as_str();
        let _token = self
            .gate
            .try_begin(slug)
            .ok_or_else(|| ReconcileError::SaveInFlight(slug.to_string()))?;

        let mut touched = false;
        touched |= self
            .apply(
                slug,
                ChildKind::Education,
                &original.education,
                &edited.education,
                ChildFields::Education,
                ChildPatch::Education,
            )
            .await?;
        touched |= self
            .apply(
                slug,
                ChildKind::Experience,
                &original.experience,
                &edited.experience,
                ChildFields::Experience,
                ChildPatch::Experience,
            )
            .await?;
        touched |= self
            .apply(
                slug,
                ChildKind::Skills,
                &original.skills,
                &edited.skills,
                ChildFields::Skills,
                ChildPatch::Skills,
            )
            .await?;
        touched |= self
            .apply(
                slug,
                ChildKind::Projects,
                &original.projects,
                &edited.projects,
                ChildFields::Projects,
                ChildPatch::Projects,
            )
            .await?;

        let root = diff::diff_resume(original, edited);
        if !touched && root.is_empty() {
            debug!("save cycle for '{slug}': no changes, no calls issued");
            return Ok(original.clone());
        }

        // The returned document carries the ids assigned to newly created
        // children; it becomes the next original and edited snapshot.
        let saved = self.store.update_resume(slug, &root).await?;
        info!("save cycle for '{slug}' complete");
        Ok(saved)
    }

    /// Plans and executes the operations for one child collection, in order.
    /// Returns whether any call was issued.
    async fn apply<E, W, P>(
        &self,
        slug: &str,
        kind: ChildKind,
        original: &[E],
        edited: &[E],
        wrap_fields: W,
        wrap_patch: P,
    ) -> Result<bool, StoreError>
    where
        E: ChildEntity,
        W: Fn(E) -> ChildFields + Send + Sync,
        P: Fn(E::Patch) -> ChildPatch + Send + Sync,
    {
        let ops = plan::plan(original, edited);
        let touched = !ops.is_empty();
        for op in ops {
            match op {
                ChildOp::Delete(id) => self.store.delete_child(kind, &id).await?,
                ChildOp::Create(item) => {
                    // The assigned id is picked up from the refreshed document
                    // returned by the root update at the end of the cycle.
                    self.store.create_child(slug, &wrap_fields(item)).await?;
                }
                ChildOp::Update(id, patch) => {
                    self.store.update_child(kind, &id, &wrap_patch(patch)).await?
                }
            }
        }
        Ok(touched)
    }
}
