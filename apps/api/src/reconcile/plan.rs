//! Save planning — partitions an edited child collection into the remote
//! operations needed to bring persisted state in line with it.
//!
//! Classification per item, by identifier and edit-state flag:
//! - deleted + non-empty id  -> delete remotely
//! - deleted + empty id      -> discard locally, never existed server-side
//! - empty id                -> create
//! - non-empty id            -> update, only when the field diff is non-empty
//!
//! Within one collection, deletions run first, then creates, then updates.

use crate::models::resume::EditState;

/// A child record the planner can classify and diff. Identifier, edit-state
/// flag, and the parent key are excluded from the diff by construction.
pub trait ChildEntity: Clone + Default {
    type Patch: Clone + PartialEq + std::fmt::Debug;

    fn id(&self) -> &str;

    fn edit_state(&self) -> EditState;

    /// Field-level diff against the last-fetched copy. `None` when no field
    /// differs, so a no-op update never reaches the wire.
    fn diff_against(&self, original: &Self) -> Option<Self::Patch>;
}

/// One remote operation against a child collection.
#[derive(Debug, Clone, PartialEq)]
pub enum ChildOp<E: ChildEntity> {
    Delete(String),
    Create(E),
    Update(String, E::Patch),
}

/// Plans the operations for one collection, in execution order.
pub fn plan<E: ChildEntity>(original: &[E], edited: &[E]) -> Vec<ChildOp<E>> {
    let mut deletes = Vec::new();
    let mut creates = Vec::new();
    let mut updates = Vec::new();

    for item in edited {
        match (item.id().is_empty(), item.edit_state()) {
            // Never persisted and already withdrawn: nothing to do anywhere.
            (true, EditState::Deleted) => {}
            (false, EditState::Deleted) => deletes.push(ChildOp::Delete(item.id().to_string())),
            (true, EditState::Unmarked) => creates.push(ChildOp::Create(item.clone())),
            (false, EditState::Unmarked) => {
                let baseline = original.iter().find(|o| o.id() == item.id());
                // An id the snapshot does not know (drift) diffs against an
                // empty baseline so no local edit is silently dropped.
                let fallback = E::default();
                let baseline = baseline.unwrap_or(&fallback);
                if let Some(patch) = item.diff_against(baseline) {
                    updates.push(ChildOp::Update(item.id().to_string(), patch));
                }
            }
        }
    }

    deletes.extend(creates);
    deletes.extend(updates);
    deletes
}
