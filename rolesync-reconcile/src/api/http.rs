//! REST implementation of [`GovernanceApi`].
//!
//! Every call carries a bearer token obtained from the login endpoint. A 401
//! answer triggers exactly one re-login and one retry of the same request;
//! any other non-2xx status is returned as a [`TransportError`].

use super::governance::GovernanceApi;
use crate::config::ApiConfig;
use crate::error::{ReconcileError, ReconcileResult, TransportError};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use rolesync_model::{
    ApiResponse, CreateRoleRequest, GetRoleRequest, GetRolesResponse, UpdateRoleRequest,
    UserRoleRequest,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

const LOGIN_PATH: &str = "/api/login";
const CREATE_ROLE_PATH: &str = "/api/createrole";
const UPDATE_ROLE_PATH: &str = "/api/updaterole";
const ADD_USER_ROLE_PATH: &str = "/api/adduserrole";
const REMOVE_USER_ROLE_PATH: &str = "/api/removeuserrole";
const GET_ROLES_PATH: &str = "/api/getroles";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
}

/// Governance API client over HTTP.
pub struct HttpGovernanceApi {
    config: ApiConfig,
    client: Client,
    token: Arc<RwLock<Option<String>>>,
}

impl HttpGovernanceApi {
    /// Creates a client. No request is made until the first call.
    pub fn new(config: ApiConfig) -> ReconcileResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ReconcileError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            config,
            client,
            token: Arc::new(RwLock::new(None)),
        })
    }

    /// Sets an existing access token (e.g. one cached by the caller).
    pub async fn set_token(&self, token: impl Into<String>) {
        *self.token.write().await = Some(token.into());
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Logs in and caches a fresh access token.
    pub async fn login(&self) -> Result<String, TransportError> {
        debug!("Requesting governance API access token");

        let response = self
            .client
            .post(self.url(LOGIN_PATH))
            .json(&LoginRequest {
                username: &self.config.username,
                password: &self.config.password,
            })
            .send()
            .await
            .map_err(|e| TransportError::connection(format!("login failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error = response.text().await.unwrap_or_default();
            return Err(TransportError::status(status, format!("login failed: {error}")));
        }

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| TransportError::connection(format!("failed to parse login response: {e}")))?;

        *self.token.write().await = Some(login.access_token.clone());
        info!("Governance API authentication successful");

        Ok(login.access_token)
    }

    /// Returns the cached token, logging in if there is none.
    async fn access_token(&self) -> Result<String, TransportError> {
        let cached = self.token.read().await.clone();
        match cached {
            Some(token) => Ok(token),
            None => self.login().await,
        }
    }

    async fn send<B>(&self, path: &str, body: &B, token: &str) -> Result<Response, TransportError>
    where
        B: Serialize + Sync + ?Sized,
    {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::connection(format!("{path} failed: {e}")))
    }

    /// POSTs `body` and decodes the answer, re-authenticating once on 401.
    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, TransportError>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned + Send,
    {
        let token = self.access_token().await?;
        let mut response = self.send(path, body, &token).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            info!(path, "Access token rejected, re-authenticating");
            let token = self.login().await?;
            response = self.send(path, body, &token).await?;
        }

        let status = response.status();
        if !status.is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(TransportError::status(status.as_u16(), format!("{path}: {error}")));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| TransportError::connection(format!("failed to parse {path} response: {e}")))
    }
}

#[async_trait]
impl GovernanceApi for HttpGovernanceApi {
    async fn create_role(&self, request: &CreateRoleRequest) -> Result<ApiResponse, TransportError> {
        debug!("Creating role {}", request.role_name);
        self.post(CREATE_ROLE_PATH, request).await
    }

    async fn update_role(&self, request: &UpdateRoleRequest) -> Result<ApiResponse, TransportError> {
        debug!("Updating role {}", request.role_name);
        self.post(UPDATE_ROLE_PATH, request).await
    }

    async fn add_user_to_role(
        &self,
        request: &UserRoleRequest,
    ) -> Result<ApiResponse, TransportError> {
        debug!("Adding user {} to role {}", request.user_name, request.role_name);
        self.post(ADD_USER_ROLE_PATH, request).await
    }

    async fn remove_user_from_role(
        &self,
        request: &UserRoleRequest,
    ) -> Result<ApiResponse, TransportError> {
        debug!("Removing user {} from role {}", request.user_name, request.role_name);
        self.post(REMOVE_USER_ROLE_PATH, request).await
    }

    async fn get_role(&self, request: &GetRoleRequest) -> Result<GetRolesResponse, TransportError> {
        debug!("Fetching role {}", request.role_name);
        self.post(GET_ROLES_PATH, request).await
    }
}
