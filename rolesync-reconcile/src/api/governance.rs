//! Governance API abstraction trait.

use crate::error::TransportError;
use async_trait::async_trait;
use rolesync_model::{
    ApiResponse, CreateRoleRequest, GetRoleRequest, GetRolesResponse, UpdateRoleRequest,
    UserRoleRequest,
};
use std::sync::Arc;

/// The role endpoints the reconciler needs.
///
/// Each method is one external call. `Err` means no usable response
/// (connection failure or non-2xx status); application-level failures come
/// back as `Ok` with a non-zero `errorCode`.
#[async_trait]
pub trait GovernanceApi: Send + Sync {
    /// Creates a role together with its initial owners.
    async fn create_role(&self, request: &CreateRoleRequest) -> Result<ApiResponse, TransportError>;

    /// Updates attributes, owners, entitlements or child roles of a role.
    async fn update_role(&self, request: &UpdateRoleRequest) -> Result<ApiResponse, TransportError>;

    /// Assigns the role to a user.
    async fn add_user_to_role(&self, request: &UserRoleRequest)
    -> Result<ApiResponse, TransportError>;

    /// Revokes the role from a user.
    async fn remove_user_from_role(
        &self,
        request: &UserRoleRequest,
    ) -> Result<ApiResponse, TransportError>;

    /// Fetches role details.
    async fn get_role(&self, request: &GetRoleRequest) -> Result<GetRolesResponse, TransportError>;
}

#[async_trait]
impl<T: GovernanceApi + ?Sized> GovernanceApi for Arc<T> {
    async fn create_role(&self, request: &CreateRoleRequest) -> Result<ApiResponse, TransportError> {
        (**self).create_role(request).await
    }

    async fn update_role(&self, request: &UpdateRoleRequest) -> Result<ApiResponse, TransportError> {
        (**self).update_role(request).await
    }

    async fn add_user_to_role(
        &self,
        request: &UserRoleRequest,
    ) -> Result<ApiResponse, TransportError> {
        (**self).add_user_to_role(request).await
    }

    async fn remove_user_from_role(
        &self,
        request: &UserRoleRequest,
    ) -> Result<ApiResponse, TransportError> {
        (**self).remove_user_from_role(request).await
    }

    async fn get_role(&self, request: &GetRoleRequest) -> Result<GetRolesResponse, TransportError> {
        (**self).get_role(request).await
    }
}
