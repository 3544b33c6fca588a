//! Governance API request and response bodies.

use crate::items::{ChildRole, RoleEntitlement, RoleOwner, RoleUser};
use crate::role::RoleDefinition;
use rolesync_diff::OpKind;
use serde::{Deserialize, Deserializer, Serialize};

/// Status envelope returned by every governance API call.
///
/// `errorCode` is `"0"` (or absent) on success. Some deployments send it as
/// a number, so both forms are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(
        rename = "errorCode",
        default,
        deserialize_with = "code_as_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl ApiResponse {
    /// A successful response.
    pub fn ok() -> Self {
        Self {
            error_code: Some("0".to_string()),
            msg: Some("Success".to_string()),
        }
    }

    /// A response carrying an error code.
    pub fn with_code(code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            error_code: Some(code.into()),
            msg: Some(msg.into()),
        }
    }

    /// Returns the error code, or `None` if the call succeeded.
    #[must_use]
    pub fn failure_code(&self) -> Option<&str> {
        match self.error_code.as_deref().map(str::trim) {
            None | Some("") | Some("0") => None,
            Some(code) => Some(code),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        self.msg.as_deref().unwrap_or_default()
    }
}

fn code_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Text(String),
        Number(i64),
    }

    Ok(Option::<Code>::deserialize(deserializer)?.map(|code| match code {
        Code::Text(text) => text,
        Code::Number(number) => number.to_string(),
    }))
}

/// Adds or removes one owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerChange {
    #[serde(rename = "ownerName")]
    pub owner_name: String,
    pub rank: String,
    #[serde(rename = "updatetype")]
    pub update_type: OpKind,
}

impl OwnerChange {
    pub fn new(owner: &RoleOwner, kind: OpKind) -> Self {
        Self {
            owner_name: owner.owner_name.clone(),
            rank: owner.rank.clone(),
            update_type: kind,
        }
    }
}

/// Adds or removes one entitlement value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementChange {
    #[serde(rename = "entitlement_value")]
    pub entitlement_value: String,
    #[serde(rename = "entitlementtype")]
    pub entitlement_type: String,
    pub endpoint: String,
    #[serde(rename = "updatetype")]
    pub update_type: OpKind,
}

impl EntitlementChange {
    pub fn new(entitlement: &RoleEntitlement, kind: OpKind) -> Self {
        Self {
            entitlement_value: entitlement.entitlement_value.clone(),
            entitlement_type: entitlement.entitlement_type.clone(),
            endpoint: entitlement.endpoint.clone(),
            update_type: kind,
        }
    }
}

/// Adds or removes one child role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildRoleChange {
    #[serde(rename = "roleName")]
    pub role_name: String,
    #[serde(rename = "updatetype")]
    pub update_type: OpKind,
}

impl ChildRoleChange {
    pub fn new(child: &ChildRole, kind: OpKind) -> Self {
        Self {
            role_name: child.role_name.clone(),
            update_type: kind,
        }
    }
}

/// `POST /api/createrole`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRoleRequest {
    #[serde(rename = "rolename")]
    pub role_name: String,
    #[serde(rename = "roletype")]
    pub role_type: String,
    pub requestor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "owner", default, skip_serializing_if = "Vec::is_empty")]
    pub owners: Vec<OwnerChange>,
}

impl CreateRoleRequest {
    /// Builds the create call for a role; owners travel with the create.
    pub fn from_definition(role: &RoleDefinition, requestor: &str) -> Self {
        Self {
            role_name: role.role_name.clone(),
            role_type: role.role_type.clone(),
            requestor: requestor.to_string(),
            description: role.description.clone(),
            owners: role
                .owners
                .iter()
                .flatten()
                .map(|owner| OwnerChange::new(owner, OpKind::Add))
                .collect(),
        }
    }
}

/// `POST /api/updaterole`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRoleRequest {
    #[serde(rename = "rolename")]
    pub role_name: String,
    pub requestor: String,
    #[serde(rename = "roletype", default, skip_serializing_if = "Option::is_none")]
    pub role_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "owner", default, skip_serializing_if = "Vec::is_empty")]
    pub owners: Vec<OwnerChange>,
    #[serde(rename = "entitlementvalues", default, skip_serializing_if = "Vec::is_empty")]
    pub entitlements: Vec<EntitlementChange>,
    #[serde(rename = "childRoles", default, skip_serializing_if = "Vec::is_empty")]
    pub child_roles: Vec<ChildRoleChange>,
}

impl UpdateRoleRequest {
    pub fn new(role_name: impl Into<String>, requestor: impl Into<String>) -> Self {
        Self {
            role_name: role_name.into(),
            requestor: requestor.into(),
            ..Default::default()
        }
    }

    /// Carries the role's scalar attributes.
    pub fn with_attributes(mut self, role: &RoleDefinition) -> Self {
        self.role_type = Some(role.role_type.clone());
        self.description = role.description.clone();
        self
    }

    pub fn with_owner(mut self, change: OwnerChange) -> Self {
        self.owners.push(change);
        self
    }

    pub fn with_entitlement(mut self, change: EntitlementChange) -> Self {
        self.entitlements.push(change);
        self
    }

    pub fn with_child_role(mut self, change: ChildRoleChange) -> Self {
        self.child_roles.push(change);
        self
    }
}

/// `POST /api/adduserrole` and `POST /api/removeuserrole`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRoleRequest {
    #[serde(rename = "username")]
    pub user_name: String,
    #[serde(rename = "rolename")]
    pub role_name: String,
    pub requestor: String,
}

impl UserRoleRequest {
    pub fn new(user: &RoleUser, role_name: &str, requestor: &str) -> Self {
        Self {
            user_name: user.user_name.clone(),
            role_name: role_name.to_string(),
            requestor: requestor.to_string(),
        }
    }
}

/// `POST /api/getroles`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRoleRequest {
    #[serde(rename = "rolename")]
    pub role_name: String,
}

/// Response to [`GetRoleRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRolesResponse {
    #[serde(flatten)]
    pub status: ApiResponse,
    #[serde(rename = "roledetails", default)]
    pub roles: Vec<RemoteRole>,
}

/// A role as the governance platform reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRole {
    #[serde(alias = "rolename", alias = "roleName")]
    pub role_name: String,
    #[serde(default, alias = "roletype", alias = "roleType")]
    pub role_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "owner", alias = "owners", default)]
    pub owners: Vec<RoleOwner>,
    #[serde(rename = "entitlementdetails", alias = "entitlements", default)]
    pub entitlements: Vec<RoleEntitlement>,
    #[serde(rename = "childroles", alias = "childRoles", default)]
    pub child_roles: Vec<ChildRole>,
    #[serde(default)]
    pub users: Vec<RoleUser>,
}

impl RemoteRole {
    /// Adopts the remote role with every relationship tracked.
    pub fn into_definition(self, requestor: Option<String>) -> RoleDefinition {
        RoleDefinition {
            role_name: self.role_name,
            role_type: self.role_type,
            description: self.description.filter(|d| !d.is_empty()),
            requestor,
            owners: Some(self.owners),
            entitlements: Some(self.entitlements),
            child_roles: Some(self.child_roles),
            users: Some(self.users),
        }
    }
}
