//! Reconciler configuration.
//!
//! Loaded from TOML:
//!
//! ```toml
//! requestor = "admin"
//! informational_codes = ["1"]
//! not_found_codes = ["404"]
//!
//! [api]
//! base_url = "https://tenant.example.com/ECM"
//! username = "admin"
//! password = "secret"
//! timeout_secs = 60
//! ```

use crate::error::{ReconcileError, ReconcileResult};
use crate::orchestrator::InformationalPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Governance API connection settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL, without a trailing `/api`.
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/ECM".to_string(),
            username: String::new(),
            password: String::new(),
            timeout_secs: 60,
        }
    }
}

impl ApiConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Top-level reconciler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    pub api: ApiConfig,
    /// Requestor recorded on mutations when the role does not name one.
    pub requestor: String,
    /// Response codes meaning "already in the desired state".
    pub informational_codes: Vec<String>,
    /// Role lookup codes meaning "no such role". Any other failure code is a
    /// rejection, never a reason to forget the role.
    pub not_found_codes: Vec<String>,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            requestor: "admin".to_string(),
            informational_codes: Vec::new(),
            not_found_codes: Vec::new(),
        }
    }
}

impl ReconcileConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> ReconcileResult<Self> {
        let config: ReconcileConfig =
            toml::from_str(source).map_err(|e| ReconcileError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> ReconcileResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| ReconcileError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> ReconcileResult<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(ReconcileError::Config("api.base_url is empty".to_string()));
        }
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            return Err(ReconcileError::Config(format!(
                "api.base_url must be an http(s) URL: {}",
                self.api.base_url
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(ReconcileError::Config("api.timeout_secs must be > 0".to_string()));
        }
        if self.requestor.trim().is_empty() {
            return Err(ReconcileError::Config("requestor is empty".to_string()));
        }
        Ok(())
    }

    /// Builds the informational policy from `informational_codes`.
    #[must_use]
    pub fn informational_policy(&self) -> InformationalPolicy {
        InformationalPolicy::codes(self.informational_codes.iter().cloned())
    }
}
