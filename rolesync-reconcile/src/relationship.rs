//! Diff-then-apply for one set-valued relationship.

use crate::error::{InformationalNote, ItemError, TransportError};
use crate::orchestrator::Orchestrator;
use rolesync_diff::{ChangeSet, KeyedItem, OpKind, Operation};
use rolesync_model::{ApiResponse, Relationship};
use std::collections::BTreeSet;
use std::fmt;
use std::future::Future;
use tracing::{debug, info};

/// Result of reconciling one relationship.
#[derive(Debug, Clone)]
pub struct RelationshipOutcome<T> {
    pub relationship: Relationship,
    /// The relationship as it now stands remotely, as far as we know.
    /// Persist this even when `failures` is non-empty.
    pub baseline: Vec<T>,
    pub notes: Vec<InformationalNote>,
    pub failures: Vec<ItemError>,
}

impl<T> RelationshipOutcome<T> {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Diffs `state` against `plan` and applies the changes one call at a time.
pub async fn reconcile_relationship<T, F, Fut>(
    orchestrator: &Orchestrator,
    relationship: Relationship,
    state: &[T],
    plan: &[T],
    call: F,
) -> RelationshipOutcome<T>
where
    T: KeyedItem + Clone + fmt::Display,
    F: FnMut(Operation<T>) -> Fut,
    Fut: Future<Output = Result<ApiResponse, TransportError>>,
{
    let changes = ChangeSet::between(state, plan);
    if changes.is_empty() {
        debug!(%relationship, "no changes");
        return RelationshipOutcome {
            relationship,
            baseline: state.to_vec(),
            notes: Vec::new(),
            failures: Vec::new(),
        };
    }

    info!(
        %relationship,
        add = changes.to_add.len(),
        remove = changes.to_remove.len(),
        "reconciling relationship"
    );

    let operations = changes.into_operations(|item, _| item.clone());
    let outcome = orchestrator
        .apply(operations, |item: &T| item.to_string(), call)
        .await;

    RelationshipOutcome {
        relationship,
        baseline: apply_to_baseline(state, &outcome.applied),
        notes: outcome.notes,
        failures: outcome.failures,
    }
}

/// Folds successfully applied operations into the previous baseline.
///
/// Removed keys drop out; added items are appended unless their key is
/// already present. Items whose operation failed keep their old status.
pub fn apply_to_baseline<T>(state: &[T], applied: &[Operation<T>]) -> Vec<T>
where
    T: KeyedItem + Clone,
{
    let removed: BTreeSet<T::Key> = applied
        .iter()
        .filter(|op| op.kind == OpKind::Remove)
        .map(|op| op.payload.key())
        .collect();

    let mut baseline: Vec<T> = state
        .iter()
        .filter(|item| !removed.contains(&item.key()))
        .cloned()
        .collect();
    let mut present: BTreeSet<T::Key> = baseline.iter().map(KeyedItem::key).collect();

    for op in applied.iter().filter(|op| op.kind == OpKind::Add) {
        if present.insert(op.payload.key()) {
            baseline.push(op.payload.clone());
        }
    }

    baseline
}
