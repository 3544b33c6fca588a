//! Error types for the reconcile layer.
//!
//! Per-item failures ([`ItemError`]) never abort a batch; they are collected
//! into a [`BatchError`]. Extraction and drift errors are fatal to the
//! operation that raised them.

use rolesync_diff::{DriftReport, ExtractionError, OpKind};
use std::fmt;
use thiserror::Error;

/// Result type for reconcile operations.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Errors surfaced by role reconciliation.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A state or plan collection could not be decoded.
    #[error("malformed collection: {0}")]
    Extraction(#[from] ExtractionError),

    /// Tracked relationships diverged from the remote role.
    #[error(transparent)]
    Drift(#[from] DriftReport),

    /// One or more relationship changes failed.
    #[error(transparent)]
    Batch(#[from] BatchError),

    /// A non-item API call failed at the transport level.
    #[error("API request failed: {0}")]
    Api(#[from] TransportError),

    /// A non-item API call was rejected.
    #[error("{operation} rejected: [{code}] {message}")]
    Rejected {
        operation: String,
        code: String,
        message: String,
    },

    /// The role does not exist remotely.
    #[error("role not found: {0}")]
    RoleNotFound(String),

    /// Role names cannot change in place.
    #[error("role name is immutable: {from} -> {to}")]
    RoleRenamed { from: String, to: String },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Cancelled before any change was made.
    #[error("reconciliation cancelled")]
    Cancelled,
}

/// A single external call failed before producing an API response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    /// HTTP status, if a response was received.
    pub status: Option<u16>,
    pub message: String,
}

impl TransportError {
    /// A non-2xx response.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    /// No usable response (connection, timeout, decode).
    pub fn connection(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "HTTP {status}: {}", self.message),
            None => write!(f, "transport error: {}", self.message),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::status(status.as_u16(), err.to_string()),
            None => Self::connection(err.to_string()),
        }
    }
}

/// Why a single relationship change failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemFailureKind {
    /// Network or non-2xx HTTP failure.
    Transport { status: Option<u16> },
    /// The API answered with a hard error code.
    Application { code: String },
    /// Not attempted because the batch was cancelled.
    Cancelled,
}

impl fmt::Display for ItemFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemFailureKind::Transport { status: Some(status) } => write!(f, "HTTP {status}"),
            ItemFailureKind::Transport { status: None } => write!(f, "transport"),
            ItemFailureKind::Application { code } => write!(f, "error code {code}"),
            ItemFailureKind::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A failed relationship change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} {identity} failed ({kind}): {message}")]
pub struct ItemError {
    pub identity: String,
    pub operation: OpKind,
    pub kind: ItemFailureKind,
    pub message: String,
}

impl ItemError {
    pub fn transport(identity: String, operation: OpKind, err: &TransportError) -> Self {
        Self {
            identity,
            operation,
            kind: ItemFailureKind::Transport { status: err.status },
            message: err.message.clone(),
        }
    }

    pub fn application(
        identity: String,
        operation: OpKind,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            identity,
            operation,
            kind: ItemFailureKind::Application { code: code.into() },
            message: message.into(),
        }
    }

    pub fn cancelled(identity: String, operation: OpKind) -> Self {
        Self {
            identity,
            operation,
            kind: ItemFailureKind::Cancelled,
            message: "not attempted".to_string(),
        }
    }
}

/// An "already in desired state" answer. Counted as success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InformationalNote {
    pub identity: String,
    /// The relationship change, or `None` for whole-role calls.
    pub operation: Option<OpKind>,
    pub code: String,
    pub message: String,
}

impl fmt::Display for InformationalNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(operation) = self.operation {
            write!(f, "{operation} ")?;
        }
        write!(f, "{}: [{}] {}", self.identity, self.code, self.message)
    }
}

/// Every item-level failure from one reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchError {
    failures: Vec<ItemError>,
}

impl BatchError {
    pub fn new(failures: Vec<ItemError>) -> Self {
        Self { failures }
    }

    #[must_use]
    pub fn failures(&self) -> &[ItemError] {
        &self.failures
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn extend(&mut self, failures: impl IntoIterator<Item = ItemError>) {
        self.failures.extend(failures);
    }

    /// `Ok(())` when nothing failed.
    pub fn into_result(self) -> Result<(), BatchError> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} relationship change(s) failed", self.failures.len())?;
        for failure in &self.failures {
            write!(f, "\n  - {failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for BatchError {}
