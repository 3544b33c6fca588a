//! Relationship members.
//!
//! Field names are snake_case in tracked state; the aliases accept the
//! camelCase spelling the governance API uses in role details.

use rolesync_diff::KeyedItem;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An owner of a role at a given rank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleOwner {
    #[serde(alias = "ownerName")]
    pub owner_name: String,
    pub rank: String,
}

impl RoleOwner {
    pub fn new(owner_name: impl Into<String>, rank: impl Into<String>) -> Self {
        Self {
            owner_name: owner_name.into(),
            rank: rank.into(),
        }
    }
}

impl KeyedItem for RoleOwner {
    type Key = (String, String);

    fn key(&self) -> Self::Key {
        (self.owner_name.clone(), self.rank.clone())
    }
}

impl fmt::Display for RoleOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "owner {} (rank {})", self.owner_name, self.rank)
    }
}

/// An entitlement value granted by a role on an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleEntitlement {
    #[serde(alias = "entitlementValue")]
    pub entitlement_value: String,
    #[serde(alias = "entitlementType", alias = "entitlementtype")]
    pub entitlement_type: String,
    pub endpoint: String,
}

impl RoleEntitlement {
    pub fn new(
        entitlement_value: impl Into<String>,
        entitlement_type: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            entitlement_value: entitlement_value.into(),
            entitlement_type: entitlement_type.into(),
            endpoint: endpoint.into(),
        }
    }
}

impl KeyedItem for RoleEntitlement {
    type Key = (String, String, String);

    fn key(&self) -> Self::Key {
        (
            self.entitlement_value.clone(),
            self.entitlement_type.clone(),
            self.endpoint.clone(),
        )
    }
}

impl fmt::Display for RoleEntitlement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "entitlement {} ({} on {})",
            self.entitlement_value, self.entitlement_type, self.endpoint
        )
    }
}

/// A role nested under another role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChildRole {
    #[serde(alias = "roleName", alias = "rolename")]
    pub role_name: String,
}

impl ChildRole {
    pub fn new(role_name: impl Into<String>) -> Self {
        Self {
            role_name: role_name.into(),
        }
    }
}

impl KeyedItem for ChildRole {
    type Key = String;

    fn key(&self) -> Self::Key {
        self.role_name.clone()
    }
}

impl fmt::Display for ChildRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "child role {}", self.role_name)
    }
}

/// A user holding a role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleUser {
    #[serde(alias = "username", alias = "userName")]
    pub user_name: String,
}

impl RoleUser {
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
        }
    }
}

impl KeyedItem for RoleUser {
    type Key = String;

    fn key(&self) -> Self::Key {
        self.user_name.clone()
    }
}

impl fmt::Display for RoleUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user {}", self.user_name)
    }
}
