//! Credential source models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Namespace holding the management cluster kubeconfig Secret
pub const DEFAULT_SECRET_NAMESPACE: &str = "default";

/// Name of the management cluster kubeconfig Secret
pub const DEFAULT_SECRET_NAME: &str = "management-prod-cluster-kubeconfig";

/// Data key holding the kubeconfig bytes. CAPI writes "value".
pub const DEFAULT_SECRET_KEY: &str = "value";

/// Where the credentials used by the gateway came from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CredentialSource {
    /// Kubeconfig document read from a local file
    KubeconfigFile(PathBuf),

    /// Service-account token and CA bundle mounted into the pod
    InCluster,

    /// Kubeconfig bytes stored in a Secret data field
    Secret(SecretRef),
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::KubeconfigFile(path) => write!(f, "kubeconfig {}", path.display()),
            CredentialSource::InCluster => write!(f, "in-cluster service account"),
            CredentialSource::Secret(secret) => write!(f, "secret {secret}"),
        }
    }
}

/// Reference to a kubeconfig stored in a Secret
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretRef {
    /// Namespace of the Secret
    pub namespace: String,

    /// Secret name
    pub name: String,

    /// Data key holding the kubeconfig bytes
    pub key: String,
}

impl SecretRef {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            key: key.into(),
        }
    }
}

impl Default for SecretRef {
    fn default() -> Self {
        Self::new(DEFAULT_SECRET_NAMESPACE, DEFAULT_SECRET_NAME, DEFAULT_SECRET_KEY)
    }
}

impl fmt::Display for SecretRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}[{}]", self.namespace, self.name, self.key)
    }
}
