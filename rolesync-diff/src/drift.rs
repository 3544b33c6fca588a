//! Read-time drift detection for tracked relationships.
//!
//! Drift means the relationship was changed outside of rolesync (direct API
//! or UI edit). Only loss of a locally tracked item counts: extra remote
//! items are never flagged. Drift is not auto-resolved; the operator has to
//! re-import the role.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

/// A single divergence between local and remote relationship state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriftError {
    /// The number of distinct members differs.
    #[error("{relationship}: {local} tracked locally but {remote} found remotely")]
    CountMismatch {
        relationship: String,
        local: usize,
        remote: usize,
    },

    /// A locally tracked member no longer exists remotely.
    #[error("{relationship}: {item} is tracked locally but missing remotely")]
    MissingRemotely { relationship: String, item: String },
}

/// All drift found during one read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriftReport {
    errors: Vec<DriftError>,
}

impl DriftReport {
    /// Returns true if no drift was detected.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the individual drift errors.
    #[must_use]
    pub fn errors(&self) -> &[DriftError] {
        &self.errors
    }

    /// Appends another report's findings.
    pub fn extend(&mut self, other: DriftReport) {
        self.errors.extend(other.errors);
    }

    /// Converts a non-empty report into an error.
    pub fn into_result(self) -> Result<(), DriftReport> {
        if self.is_clean() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for DriftReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "relationship drift detected ({} issue(s)); re-import the role to resync",
            self.errors.len()
        )?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for DriftReport {}

/// Compares a tracked local collection against the authoritative remote one.
///
/// `local == None` or an empty local collection is untracked and never
/// checked. The count check and the per-key check run independently, so a
/// same-sized remote set that swapped a member still reports the missing key.
pub fn detect_drift<T, K>(
    relationship: &str,
    remote: &[T],
    local: Option<&[T]>,
    key_of: impl Fn(&T) -> K,
) -> DriftReport
where
    T: fmt::Display,
    K: Ord,
{
    let mut report = DriftReport::default();
    let Some(local) = local.filter(|items| !items.is_empty()) else {
        return report;
    };

    let remote_keys: BTreeSet<K> = remote.iter().map(&key_of).collect();
    let local_index: BTreeMap<K, &T> = local.iter().map(|item| (key_of(item), item)).collect();

    if local_index.len() != remote_keys.len() {
        report.errors.push(DriftError::CountMismatch {
            relationship: relationship.to_string(),
            local: local_index.len(),
            remote: remote_keys.len(),
        });
    }

    for (key, item) in &local_index {
        if !remote_keys.contains(key) {
            report.errors.push(DriftError::MissingRemotely {
                relationship: relationship.to_string(),
                item: item.to_string(),
            });
        }
    }

    report
}
