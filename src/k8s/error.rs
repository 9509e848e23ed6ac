//! Gateway errors

use thiserror::Error;

/// Errors raised while resolving credentials or listing resources
#[derive(Error, Debug)]
pub enum GatewayError {
    /// No explicit kubeconfig, no in-cluster context, no fallback
    #[error("no usable credentials: {0}")]
    CredentialResolution(String),

    /// Kubeconfig document missing, unreadable or malformed
    #[error("failed to build client config: {0}")]
    ConfigBuild(String),

    #[error("failed to create Kubernetes client: {0}")]
    ClientConstruction(#[source] kube::Error),

    #[error("kubeconfig secret {namespace}/{name}: {reason}")]
    SecretLookup {
        namespace: String,
        name: String,
        reason: String,
    },

    #[error("failed to list {resource}: {source}")]
    List {
        resource: String,
        #[source]
        source: kube::Error,
    },

    /// Server handed back the continue token it was just given
    #[error("listing {resource} did not advance: continue token {token:?} repeated")]
    StalledPagination { resource: String, token: String },
}

impl GatewayError {
    pub fn list(resource: impl Into<String>, source: kube::Error) -> Self {
        GatewayError::List {
            resource: resource.into(),
            source,
        }
    }

    /// True when the API server answered 404 (e.g. CRD not installed)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            GatewayError::List {
                source: kube::Error::Api(e),
                ..
            } if e.code == 404
        )
    }
}
