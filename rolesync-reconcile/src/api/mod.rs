//! Governance platform API access.
//!
//! [`GovernanceApi`] is the seam the reconciler talks through;
//! [`HttpGovernanceApi`] is the REST implementation.

pub mod governance;
pub mod http;

pub use governance::GovernanceApi;
pub use http::HttpGovernanceApi;
