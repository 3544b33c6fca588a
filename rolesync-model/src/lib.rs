//! Role model for rolesync.
//!
//! - [`RoleOwner`], [`RoleEntitlement`], [`ChildRole`], [`RoleUser`]: the
//!   members of a role's set-valued relationships, each a [`KeyedItem`]
//! - [`RoleDefinition`]: the locally tracked role
//! - [`Relationship`]: names the four relationship kinds
//! - request / response DTOs for the governance REST API
//!
//! [`KeyedItem`]: rolesync_diff::KeyedItem

mod items;
mod role;
mod wire;

pub use items::{ChildRole, RoleEntitlement, RoleOwner, RoleUser};
pub use role::{Relationship, RoleDefinition};
pub use wire::{
    ApiResponse, ChildRoleChange, CreateRoleRequest, EntitlementChange, GetRoleRequest,
    GetRolesResponse, OwnerChange, RemoteRole, UpdateRoleRequest, UserRoleRequest,
};
