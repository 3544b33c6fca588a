//! Per-item apply with partial-failure semantics.
//!
//! The governance API has no bulk endpoint, so every operation is one call,
//! issued strictly one after another. A failed item never stops the batch;
//! the caller gets every success back (to persist as the new baseline) plus
//! every failure. There is no rollback and no retry here: the next
//! reconciliation re-diffs against the persisted baseline and only retries
//! what is still outstanding.

use crate::error::{BatchError, InformationalNote, ItemError, TransportError};
use rolesync_diff::Operation;
use rolesync_model::ApiResponse;
use std::collections::BTreeSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

type CodePredicate = dyn Fn(&str) -> bool + Send + Sync;

/// Decides which non-zero response codes mean "already in desired state".
#[derive(Clone)]
pub struct InformationalPolicy {
    predicate: Arc<CodePredicate>,
}

impl InformationalPolicy {
    /// No code is informational.
    pub fn none() -> Self {
        Self::predicate(|_| false)
    }

    /// The listed codes are informational.
    pub fn codes(codes: impl IntoIterator<Item = String>) -> Self {
        let codes: BTreeSet<String> = codes.into_iter().collect();
        Self::predicate(move |code| codes.contains(code))
    }

    pub fn predicate(predicate: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    #[must_use]
    pub fn is_informational(&self, code: &str) -> bool {
        (self.predicate)(code)
    }
}

impl Default for InformationalPolicy {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Debug for InformationalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InformationalPolicy").finish_non_exhaustive()
    }
}

/// What happened to each operation of a batch.
#[derive(Debug, Clone)]
pub struct BatchOutcome<P> {
    /// Operations that took effect, including informational ones.
    pub applied: Vec<Operation<P>>,
    pub notes: Vec<InformationalNote>,
    pub failures: Vec<ItemError>,
    /// Operations never attempted because the batch was cancelled.
    pub skipped: Vec<Operation<P>>,
}

impl<P> Default for BatchOutcome<P> {
    fn default() -> Self {
        Self {
            applied: Vec::new(),
            notes: Vec::new(),
            failures: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

impl<P> BatchOutcome<P> {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Splits into the successes to persist and the aggregate error.
    pub fn into_result(self) -> (Vec<Operation<P>>, Result<(), BatchError>) {
        let result = BatchError::new(self.failures).into_result();
        (self.applied, result)
    }
}

/// Applies operations one external call at a time.
#[derive(Debug, Clone, Default)]
pub struct Orchestrator {
    informational: InformationalPolicy,
    cancel: CancellationToken,
}

impl Orchestrator {
    pub fn new(informational: InformationalPolicy) -> Self {
        Self {
            informational,
            cancel: CancellationToken::new(),
        }
    }

    /// Uses a caller-owned token; cancelling it stops the batch between items.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn informational(&self) -> &InformationalPolicy {
        &self.informational
    }

    /// Issues one `call` per operation and classifies each outcome.
    ///
    /// `identity_of` names an item in notes and error messages.
    pub async fn apply<P, F, Fut>(
        &self,
        operations: Vec<Operation<P>>,
        identity_of: impl Fn(&P) -> String,
        mut call: F,
    ) -> BatchOutcome<P>
    where
        P: Clone,
        F: FnMut(Operation<P>) -> Fut,
        Fut: Future<Output = Result<ApiResponse, TransportError>>,
    {
        let mut outcome = BatchOutcome::default();
        let total = operations.len();

        for op in operations {
            let identity = identity_of(&op.payload);

            if self.cancel.is_cancelled() {
                outcome
                    .failures
                    .push(ItemError::cancelled(identity, op.kind));
                outcome.skipped.push(op);
                continue;
            }

            debug!(operation = %op.kind, item = %identity, "applying change");

            match call(op.clone()).await {
                Err(err) => {
                    warn!(operation = %op.kind, item = %identity, "change failed: {err}");
                    outcome
                        .failures
                        .push(ItemError::transport(identity, op.kind, &err));
                }
                Ok(response) => match response.failure_code() {
                    None => outcome.applied.push(op),
                    Some(code) if self.informational.is_informational(code) => {
                        info!(
                            operation = %op.kind,
                            item = %identity,
                            code,
                            "change already satisfied: {}",
                            response.message()
                        );
                        outcome.notes.push(InformationalNote {
                            identity,
                            operation: Some(op.kind),
                            code: code.to_string(),
                            message: response.message().to_string(),
                        });
                        outcome.applied.push(op);
                    }
                    Some(code) => {
                        warn!(
                            operation = %op.kind,
                            item = %identity,
                            code,
                            "change rejected: {}",
                            response.message()
                        );
                        outcome.failures.push(ItemError::application(
                            identity,
                            op.kind,
                            code,
                            response.message(),
                        ));
                    }
                },
            }
        }

        if !outcome.skipped.is_empty() {
            warn!(
                skipped = outcome.skipped.len(),
                total, "batch cancelled before completion"
            );
        }
        debug!(
            applied = outcome.applied.len(),
            failed = outcome.failures.len(),
            total,
            "batch finished"
        );
        outcome
    }
}
