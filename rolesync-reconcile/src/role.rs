//! Role lifecycle: create, update, read and import.
//!
//! A role's relationships are mutated through separate calls, so create and
//! update are multi-step and can partially fail. Whatever was applied is
//! always returned in [`RoleApply::state`] so the next pass only retries the
//! outstanding items.

use crate::api::GovernanceApi;
use crate::config::ReconcileConfig;
use crate::error::{BatchError, InformationalNote, ReconcileError, ReconcileResult};
use crate::orchestrator::Orchestrator;
use crate::relationship::{RelationshipOutcome, reconcile_relationship};
use rolesync_diff::{CollectionSide, KeyedItem, OpKind, Operation, detect_drift, extract_items};
use rolesync_model::{
    ApiResponse, ChildRole, ChildRoleChange, CreateRoleRequest, EntitlementChange, GetRoleRequest,
    OwnerChange, Relationship, RemoteRole, RoleDefinition, RoleEntitlement, RoleOwner, RoleUser,
    UpdateRoleRequest, UserRoleRequest,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Result of a create or update.
#[derive(Debug, Clone)]
pub struct RoleApply {
    /// The new baseline. Persist it even when `failures` is non-empty.
    pub state: RoleDefinition,
    pub notes: Vec<InformationalNote>,
    pub failures: BatchError,
}

impl RoleApply {
    fn new(state: RoleDefinition) -> Self {
        Self {
            state,
            notes: Vec::new(),
            failures: BatchError::default(),
        }
    }

    fn absorb<T>(&mut self, outcome: RelationshipOutcome<T>) -> Vec<T> {
        self.notes.extend(outcome.notes);
        self.failures.extend(outcome.failures);
        outcome.baseline
    }

    /// True if every requested change was applied.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Splits into the state to persist and the aggregate error, if any.
    pub fn into_result(self) -> (RoleDefinition, ReconcileResult<()>) {
        (self.state, self.failures.into_result().map_err(ReconcileError::from))
    }
}

/// Reconciles roles against the governance platform.
pub struct RoleReconciler<A> {
    api: A,
    orchestrator: Orchestrator,
    requestor: String,
    not_found_codes: BTreeSet<String>,
}

impl<A: GovernanceApi> RoleReconciler<A> {
    pub fn new(api: A, config: &ReconcileConfig) -> Self {
        Self {
            api,
            orchestrator: Orchestrator::new(config.informational_policy()),
            requestor: config.requestor.clone(),
            not_found_codes: config.not_found_codes.iter().cloned().collect(),
        }
    }

    /// Replaces the orchestrator (e.g. to attach a cancellation token).
    pub fn with_orchestrator(mut self, orchestrator: Orchestrator) -> Self {
        self.orchestrator = orchestrator;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    fn requestor_for<'a>(&'a self, role: &'a RoleDefinition) -> &'a str {
        role.requestor.as_deref().unwrap_or(&self.requestor)
    }

    /// Creates a role, then adds entitlements and child roles, then users.
    ///
    /// Fails outright only if the role itself cannot be created. Later
    /// per-item failures are reported in the returned [`RoleApply`].
    ///
    /// An informational answer to the create (the role already exists) means
    /// the owners sent with it may not have been applied, so owners are left
    /// untracked in that case.
    pub async fn create(&self, plan: &RoleDefinition) -> ReconcileResult<RoleApply> {
        if self.orchestrator.is_cancelled() {
            return Err(ReconcileError::Cancelled);
        }

        let role = plan.role_name.as_str();
        let requestor = self.requestor_for(plan);
        info!(role, "Creating role");

        let response = self
            .api
            .create_role(&CreateRoleRequest::from_definition(plan, requestor))
            .await?;
        let note = self.check_response(&response, &format!("role {role}"), "create role")?;

        let mut apply = RoleApply::new(RoleDefinition {
            entitlements: None,
            child_roles: None,
            users: None,
            ..plan.clone()
        });
        if note.is_some() {
            apply.state.owners = None;
        }
        apply.notes.extend(note);

        if let Some(entitlements) = &plan.entitlements {
            let outcome = self.reconcile_entitlements(role, requestor, &[], entitlements).await;
            apply.state.entitlements = Some(apply.absorb(outcome));
        }
        if let Some(child_roles) = &plan.child_roles {
            let outcome = self.reconcile_child_roles(role, requestor, &[], child_roles).await;
            apply.state.child_roles = Some(apply.absorb(outcome));
        }
        if let Some(users) = &plan.users {
            let outcome = self.reconcile_users(role, requestor, &[], users).await;
            apply.state.users = Some(apply.absorb(outcome));
        }

        if !apply.is_complete() {
            warn!(
                role,
                failed = apply.failures.failures().len(),
                "Role created with partial relationships"
            );
        }
        Ok(apply)
    }

    /// Moves a role from `state` to `plan`.
    ///
    /// Relationships untracked in the plan stop being tracked and are left
    /// untouched remotely. A relationship tracked in the plan but not in the
    /// state is diffed against an empty baseline.
    pub async fn update(
        &self,
        state: &RoleDefinition,
        plan: &RoleDefinition,
    ) -> ReconcileResult<RoleApply> {
        if state.role_name != plan.role_name {
            return Err(ReconcileError::RoleRenamed {
                from: state.role_name.clone(),
                to: plan.role_name.clone(),
            });
        }

        let role = plan.role_name.as_str();
        let requestor = self.requestor_for(plan);
        let mut next = state.clone();
        let mut notes = Vec::new();

        if plan.attributes_differ(state) {
            info!(role, "Updating role attributes");
            let request = UpdateRoleRequest::new(role, requestor).with_attributes(plan);
            let response = self.api.update_role(&request).await?;
            notes.extend(self.check_response(
                &response,
                &format!("attributes of role {role}"),
                "update role",
            )?);
            next.role_type = plan.role_type.clone();
            next.description = plan.description.clone();
        }
        next.requestor = plan.requestor.clone();

        let mut apply = RoleApply::new(next);
        apply.notes = notes;

        apply.state.owners = match &plan.owners {
            Some(desired) => {
                let current = state.owners.as_deref().unwrap_or_default();
                let outcome = self.reconcile_owners(role, requestor, current, desired).await;
                Some(apply.absorb(outcome))
            }
            None => None,
        };
        apply.state.entitlements = match &plan.entitlements {
            Some(desired) => {
                let current = state.entitlements.as_deref().unwrap_or_default();
                let outcome = self.reconcile_entitlements(role, requestor, current, desired).await;
                Some(apply.absorb(outcome))
            }
            None => None,
        };
        apply.state.child_roles = match &plan.child_roles {
            Some(desired) => {
                let current = state.child_roles.as_deref().unwrap_or_default();
                let outcome = self.reconcile_child_roles(role, requestor, current, desired).await;
                Some(apply.absorb(outcome))
            }
            None => None,
        };
        apply.state.users = match &plan.users {
            Some(desired) => {
                let current = state.users.as_deref().unwrap_or_default();
                let outcome = self.reconcile_users(role, requestor, current, desired).await;
                Some(apply.absorb(outcome))
            }
            None => None,
        };

        if !apply.is_complete() {
            warn!(
                role,
                failed = apply.failures.failures().len(),
                "Role updated with failures"
            );
        }
        Ok(apply)
    }

    /// Decodes raw state and plan documents, then runs [`update`](Self::update).
    ///
    /// Malformed relationship collections fail before any call is made.
    pub async fn update_json(&self, state: &Value, plan: &Value) -> ReconcileResult<RoleApply> {
        let state = decode_role(state, CollectionSide::Old)?;
        let plan = decode_role(plan, CollectionSide::New)?;
        self.update(&state, &plan).await
    }

    /// Refreshes `state` from the platform, failing on relationship drift.
    ///
    /// Only tracked relationships are checked. Remote members that are not
    /// tracked locally are ignored, so tracked lists are kept as they are.
    pub async fn read(&self, state: &RoleDefinition) -> ReconcileResult<RoleDefinition> {
        let remote = self.fetch(&state.role_name).await?;

        let mut report = detect_drift(
            Relationship::Owners.as_str(),
            &remote.owners,
            state.owners.as_deref(),
            RoleOwner::key,
        );
        report.extend(detect_drift(
            Relationship::Entitlements.as_str(),
            &remote.entitlements,
            state.entitlements.as_deref(),
            RoleEntitlement::key,
        ));
        report.extend(detect_drift(
            Relationship::ChildRoles.as_str(),
            &remote.child_roles,
            state.child_roles.as_deref(),
            ChildRole::key,
        ));
        report.extend(detect_drift(
            Relationship::Users.as_str(),
            &remote.users,
            state.users.as_deref(),
            RoleUser::key,
        ));

        if !report.is_clean() {
            warn!(
                role = %state.role_name,
                issues = report.errors().len(),
                "Relationship drift detected"
            );
            return Err(report.into());
        }

        let mut refreshed = state.clone();
        if !remote.role_type.is_empty() {
            refreshed.role_type = remote.role_type;
        }
        refreshed.description = remote.description.filter(|d| !d.is_empty());
        Ok(refreshed)
    }

    /// Adopts the remote role as the new baseline, tracking every relationship.
    pub async fn import(&self, role_name: &str) -> ReconcileResult<RoleDefinition> {
        let remote = self.fetch(role_name).await?;
        info!(role = role_name, "Imported role");
        Ok(remote.into_definition(None))
    }

    async fn fetch(&self, role_name: &str) -> ReconcileResult<RemoteRole> {
        let response = self
            .api
            .get_role(&GetRoleRequest {
                role_name: role_name.to_string(),
            })
            .await?;

        if let Some(code) = response.status.failure_code() {
            debug!(role = role_name, code, "Role lookup failed: {}", response.status.message());
            if self.not_found_codes.contains(code) {
                return Err(ReconcileError::RoleNotFound(role_name.to_string()));
            }
            return Err(ReconcileError::Rejected {
                operation: format!("get role ({role_name})"),
                code: code.to_string(),
                message: response.status.message().to_string(),
            });
        }

        response
            .roles
            .into_iter()
            .find(|remote| remote.role_name == role_name)
            .ok_or_else(|| ReconcileError::RoleNotFound(role_name.to_string()))
    }

    /// Classifies the answer to a non-item call.
    fn check_response(
        &self,
        response: &ApiResponse,
        identity: &str,
        action: &str,
    ) -> ReconcileResult<Option<InformationalNote>> {
        let Some(code) = response.failure_code() else {
            return Ok(None);
        };

        if self.orchestrator.informational().is_informational(code) {
            info!(code, "{action} already satisfied: {}", response.message());
            return Ok(Some(InformationalNote {
                identity: identity.to_string(),
                operation: None,
                code: code.to_string(),
                message: response.message().to_string(),
            }));
        }

        Err(ReconcileError::Rejected {
            operation: format!("{action} ({identity})"),
            code: code.to_string(),
            message: response.message().to_string(),
        })
    }

    async fn reconcile_owners(
        &self,
        role: &str,
        requestor: &str,
        current: &[RoleOwner],
        desired: &[RoleOwner],
    ) -> RelationshipOutcome<RoleOwner> {
        let api = &self.api;
        reconcile_relationship(
            &self.orchestrator,
            Relationship::Owners,
            current,
            desired,
            |op: Operation<RoleOwner>| {
                let request = UpdateRoleRequest::new(role, requestor)
                    .with_owner(OwnerChange::new(&op.payload, op.kind));
                async move { api.update_role(&request).await }
            },
        )
        .await
    }

    async fn reconcile_entitlements(
        &self,
        role: &str,
        requestor: &str,
        current: &[RoleEntitlement],
        desired: &[RoleEntitlement],
    ) -> RelationshipOutcome<RoleEntitlement> {
        let api = &self.api;
        reconcile_relationship(
            &self.orchestrator,
            Relationship::Entitlements,
            current,
            desired,
            |op: Operation<RoleEntitlement>| {
                let request = UpdateRoleRequest::new(role, requestor)
                    .with_entitlement(EntitlementChange::new(&op.payload, op.kind));
                async move { api.update_role(&request).await }
            },
        )
        .await
    }

    async fn reconcile_child_roles(
        &self,
        role: &str,
        requestor: &str,
        current: &[ChildRole],
        desired: &[ChildRole],
    ) -> RelationshipOutcome<ChildRole> {
        let api = &self.api;
        reconcile_relationship(
            &self.orchestrator,
            Relationship::ChildRoles,
            current,
            desired,
            |op: Operation<ChildRole>| {
                let request = UpdateRoleRequest::new(role, requestor)
                    .with_child_role(ChildRoleChange::new(&op.payload, op.kind));
                async move { api.update_role(&request).await }
            },
        )
        .await
    }

    async fn reconcile_users(
        &self,
        role: &str,
        requestor: &str,
        current: &[RoleUser],
        desired: &[RoleUser],
    ) -> RelationshipOutcome<RoleUser> {
        let api = &self.api;
        reconcile_relationship(
            &self.orchestrator,
            Relationship::Users,
            current,
            desired,
            |op: Operation<RoleUser>| {
                let request = UserRoleRequest::new(&op.payload, role, requestor);
                async move {
                    match op.kind {
                        OpKind::Add => api.add_user_to_role(&request).await,
                        OpKind::Remove => api.remove_user_from_role(&request).await,
                    }
                }
            },
        )
        .await
    }
}

/// Decodes a role document (state or plan) into a [`RoleDefinition`].
///
/// Absent or `null` relationship fields are untracked.
pub fn decode_role(document: &Value, side: CollectionSide) -> ReconcileResult<RoleDefinition> {
    let text = |field: &str| document.get(field).and_then(Value::as_str).map(str::to_string);

    let role_name = text("role_name").ok_or_else(|| {
        <serde_json::Error as serde::de::Error>::missing_field("role_name")
    })?;

    Ok(RoleDefinition {
        role_name,
        role_type: text("role_type").unwrap_or_default(),
        description: text("description"),
        requestor: text("requestor"),
        owners: tracked(document, "owners", side)?,
        entitlements: tracked(document, "entitlements", side)?,
        child_roles: tracked(document, "child_roles", side)?,
        users: tracked(document, "users", side)?,
    })
}

fn tracked<T: DeserializeOwned>(
    document: &Value,
    field: &str,
    side: CollectionSide,
) -> ReconcileResult<Option<Vec<T>>> {
    match document.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => Ok(Some(extract_items(Some(value), side)?)),
    }
}
