use crate::items::{ChildRole, RoleEntitlement, RoleOwner, RoleUser};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The set-valued relationships of a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    Owners,
    Entitlements,
    ChildRoles,
    Users,
}

impl Relationship {
    /// All relationships, in the order they are reconciled.
    pub const ALL: [Relationship; 4] = [
        Relationship::Owners,
        Relationship::Entitlements,
        Relationship::ChildRoles,
        Relationship::Users,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Relationship::Owners => "owners",
            Relationship::Entitlements => "entitlements",
            Relationship::ChildRoles => "child roles",
            Relationship::Users => "users",
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A role as tracked locally (prior state or desired plan).
///
/// Relationship fields are `None` when untracked: an untracked relationship
/// is never diffed and never checked for drift. `Some(vec![])` means the
/// relationship is tracked and should be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub role_name: String,
    pub role_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requestor: Option<String>,
    #[serde(default)]
    pub owners: Option<Vec<RoleOwner>>,
    #[serde(default)]
    pub entitlements: Option<Vec<RoleEntitlement>>,
    #[serde(default)]
    pub child_roles: Option<Vec<ChildRole>>,
    #[serde(default)]
    pub users: Option<Vec<RoleUser>>,
}

impl RoleDefinition {
    /// Creates a role with every relationship untracked.
    pub fn new(role_name: impl Into<String>, role_type: impl Into<String>) -> Self {
        Self {
            role_name: role_name.into(),
            role_type: role_type.into(),
            description: None,
            requestor: None,
            owners: None,
            entitlements: None,
            child_roles: None,
            users: None,
        }
    }

    pub fn with_owners(mut self, owners: Vec<RoleOwner>) -> Self {
        self.owners = Some(owners);
        self
    }

    pub fn with_entitlements(mut self, entitlements: Vec<RoleEntitlement>) -> Self {
        self.entitlements = Some(entitlements);
        self
    }

    pub fn with_child_roles(mut self, child_roles: Vec<ChildRole>) -> Self {
        self.child_roles = Some(child_roles);
        self
    }

    pub fn with_users(mut self, users: Vec<RoleUser>) -> Self {
        self.users = Some(users);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns true if the relationship is tracked.
    #[must_use]
    pub fn tracks(&self, relationship: Relationship) -> bool {
        match relationship {
            Relationship::Owners => self.owners.is_some(),
            Relationship::Entitlements => self.entitlements.is_some(),
            Relationship::ChildRoles => self.child_roles.is_some(),
            Relationship::Users => self.users.is_some(),
        }
    }

    /// Returns true if any non-relationship field differs from `other`.
    #[must_use]
    pub fn attributes_differ(&self, other: &RoleDefinition) -> bool {
        self.role_type != other.role_type || self.description != other.description
    }
}
