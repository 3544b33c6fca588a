//! Keyed collection diffing for rolesync.
//!
//! This crate holds the relationship-agnostic core of reconciliation:
//!
//! - [`KeyedItem`]: an item reducible to a comparable identity key
//! - [`ChangeSet<T>`]: the `{to_add, to_remove}` result of diffing two collections
//! - [`process_changes`]: decodes raw JSON collections and emits tagged [`Operation`]s
//! - [`detect_drift`]: flags locally tracked items missing from the remote side
//!
//! Everything here is pure and synchronous. Applying operations against an
//! external API lives in `rolesync-reconcile`.
//!
//! # Example
//!
//! ```
//! use rolesync_diff::{ChangeSet, KeyedItem};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Owner { name: String, rank: u8 }
//!
//! impl KeyedItem for Owner {
//!     type Key = (String, u8);
//!     fn key(&self) -> Self::Key { (self.name.clone(), self.rank) }
//! }
//!
//! let old = vec![Owner { name: "alice".into(), rank: 1 }];
//! let new = vec![
//!     Owner { name: "alice".into(), rank: 1 },
//!     Owner { name: "bob".into(), rank: 2 },
//! ];
//!
//! let changes = ChangeSet::between(&old, &new);
//! assert_eq!(changes.to_add, vec![Owner { name: "bob".into(), rank: 2 }]);
//! assert!(changes.to_remove.is_empty());
//! ```

mod change;
mod drift;
mod error;
mod keyed;

pub use change::{ChangeSet, OpKind, Operation, diff_by, extract_items, process_changes};
pub use drift::{DriftError, DriftReport, detect_drift};
pub use error::{CollectionSide, DiffResult, ExtractionError};
pub use keyed::KeyedItem;
