//! Configuration module
//!
//! Handles loading and managing configuration.

mod env;
mod file;

pub use env::EnvConfig;
pub use file::ConfigFile;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::k8s::{DEFAULT_NAMESPACE, KUBECONFIG_SUFFIX};
use crate::models::{ResourceRef, SecretRef};

/// Application configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Namespace all listings run in
    pub namespace: String,

    /// Explicit kubeconfig path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig used when not running in a cluster
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_kubeconfig: Option<PathBuf>,

    /// Custom resource listed as workload clusters
    pub resource: ResourceRef,

    /// Replace resolved credentials with a kubeconfig Secret
    pub secret_override: SecretOverride,

    /// Name suffix identifying kubeconfig Secrets
    pub kubeconfig_suffix: String,

    /// Objects per list request; unset issues one unbounded request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            kubeconfig: None,
            fallback_kubeconfig: None,
            resource: ResourceRef::capi_clusters(),
            secret_override: SecretOverride::default(),
            kubeconfig_suffix: KUBECONFIG_SUFFIX.to_string(),
            page_size: None,
        }
    }
}

impl AppConfig {
    /// Check values that would otherwise fail late at request time
    pub fn validate(&self) -> Result<()> {
        if self.namespace.trim().is_empty() {
            anyhow::bail!("namespace must not be empty");
        }
        if self.resource.version.is_empty() || self.resource.plural.is_empty() {
            anyhow::bail!("resource version and plural must be set: {:?}", self.resource);
        }
        if self.resource.group.is_empty() {
            anyhow::bail!("resource group must be set for a custom resource");
        }
        if self.kubeconfig_suffix.is_empty() {
            anyhow::bail!("kubeconfig_suffix must not be empty");
        }
        if self.secret_override.enabled {
            let secret = &self.secret_override.secret;
            if secret.name.is_empty() || secret.namespace.is_empty() || secret.key.is_empty() {
                anyhow::bail!("secret_override requires namespace, name and key: {secret}");
            }
        }
        if self.page_size == Some(0) {
            anyhow::bail!("page_size must be greater than zero");
        }
        Ok(())
    }
}

/// Kubeconfig Secret override settings
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretOverride {
    /// Fetch the Secret and use its kubeconfig instead
    pub enabled: bool,

    #[serde(flatten)]
    pub secret: SecretRef,
}
