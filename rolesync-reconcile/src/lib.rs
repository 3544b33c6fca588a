//! Role relationship reconciliation against an identity-governance platform.
//!
//! The platform exposes no bulk endpoints: every owner, entitlement, child
//! role and user membership is added or removed with its own call. This crate
//! diffs the last-known state of a role against the desired plan, issues one
//! call per change, and reports every success and failure so that partial
//! progress can be persisted.
//!
//! - [`orchestrator`]: sequential per-item apply with failure classification
//! - [`relationship`]: diff-then-apply for one relationship
//! - [`role`]: create, update, read and import of whole roles
//! - [`api`]: the [`GovernanceApi`] seam and its HTTP implementation
//!
//! ```no_run
//! use rolesync_reconcile::{HttpGovernanceApi, ReconcileConfig, RoleReconciler};
//!
//! # async fn run() -> Result<(), rolesync_reconcile::ReconcileError> {
//! let config = ReconcileConfig::load("rolesync.toml")?;
//! let api = HttpGovernanceApi::new(config.api.clone())?;
//! let reconciler = RoleReconciler::new(api, &config);
//!
//! let role = reconciler.import("APP_ADMIN").await?;
//! let refreshed = reconciler.read(&role).await?;
//! # let _ = refreshed;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod relationship;
pub mod role;

pub use api::{GovernanceApi, HttpGovernanceApi};
pub use config::{ApiConfig, ReconcileConfig};
pub use error::{
    BatchError, InformationalNote, ItemError, ItemFailureKind, ReconcileError, ReconcileResult,
    TransportError,
};
pub use orchestrator::{BatchOutcome, InformationalPolicy, Orchestrator};
pub use relationship::{RelationshipOutcome, apply_to_baseline, reconcile_relationship};
pub use role::{RoleApply, RoleReconciler, decode_role};
