//! Credential resolution
//!
//! Picks one credential source per invocation:
//!
//! 1. an explicit kubeconfig path, when given and non-empty
//! 2. the in-cluster service account
//! 3. a fallback kubeconfig path, when configured
//!
//! The result can then be swapped for a kubeconfig stored in a Secret
//! with [`override_from_secret`].

use std::fmt::Display;
use std::path::{Path, PathBuf};

use k8s_openapi::api::core::v1::Secret;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config};
use tracing::{debug, info};

use super::GatewayError;
use crate::models::{CredentialSource, SecretRef};

/// Inputs to credential resolution
#[derive(Clone, Debug, Default)]
pub struct CredentialOptions {
    /// Explicit kubeconfig path; `None` or empty means "not given"
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig used when in-cluster credentials are unavailable
    pub fallback_kubeconfig: Option<PathBuf>,
}

impl CredentialOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kubeconfig(mut self, path: impl Into<PathBuf>) -> Self {
        self.kubeconfig = Some(path.into());
        self
    }

    pub fn with_fallback(mut self, path: impl Into<PathBuf>) -> Self {
        self.fallback_kubeconfig = Some(path.into());
        self
    }
}

/// A client config together with where it came from
#[derive(Clone, Debug)]
pub struct ResolvedCredentials {
    pub config: Config,
    pub source: CredentialSource,
}

/// Resolve credentials using the pod's service account for step 2
pub async fn resolve_credentials(
    options: &CredentialOptions,
) -> Result<ResolvedCredentials, GatewayError> {
    resolve_with(options, Config::incluster).await
}

/// Resolve credentials with a caller-supplied in-cluster loader
pub async fn resolve_with<F, E>(
    options: &CredentialOptions,
    in_cluster: F,
) -> Result<ResolvedCredentials, GatewayError>
where
    F: FnOnce() -> Result<Config, E>,
    E: Display,
{
    if let Some(path) = non_empty(options.kubeconfig.as_deref()) {
        debug!("Using explicit kubeconfig {}", path.display());
        return from_file(path).await;
    }

    let in_cluster_err = match in_cluster() {
        Ok(config) => {
            debug!("Using in-cluster service account");
            return Ok(ResolvedCredentials {
                config,
                source: CredentialSource::InCluster,
            });
        }
        Err(e) => e.to_string(),
    };

    if let Some(path) = non_empty(options.fallback_kubeconfig.as_deref()) {
        info!(
            "In-cluster config unavailable ({}), falling back to {}",
            in_cluster_err,
            path.display()
        );
        return from_file(path).await;
    }

    Err(GatewayError::CredentialResolution(format!(
        "no kubeconfig path given and in-cluster config unavailable: {in_cluster_err}"
    )))
}

/// Replace `config` with the kubeconfig stored in `secret`.
///
/// The Secret is read with a client built from `config`.
pub async fn override_from_secret(
    config: Config,
    secret: &SecretRef,
) -> Result<ResolvedCredentials, GatewayError> {
    let client = Client::try_from(config).map_err(GatewayError::ClientConstruction)?;
    let secrets: Api<Secret> = Api::namespaced(client, &secret.namespace);

    let lookup_err = |reason: String| GatewayError::SecretLookup {
        namespace: secret.namespace.clone(),
        name: secret.name.clone(),
        reason,
    };

    let found = secrets
        .get(&secret.name)
        .await
        .map_err(|e| lookup_err(e.to_string()))?;

    let bytes = found
        .data
        .as_ref()
        .and_then(|data| data.get(&secret.key))
        .ok_or_else(|| lookup_err(format!("key \"{}\" not found", secret.key)))?;

    info!("Using kubeconfig from secret {}", secret);
    let config = from_bytes(&bytes.0).await?;
    Ok(ResolvedCredentials {
        config,
        source: CredentialSource::Secret(secret.clone()),
    })
}

/// Build a config from kubeconfig bytes (YAML or JSON)
pub async fn from_bytes(bytes: &[u8]) -> Result<Config, GatewayError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| GatewayError::ConfigBuild(format!("kubeconfig is not UTF-8: {e}")))?;
    let kubeconfig =
        Kubeconfig::from_yaml(text).map_err(|e| GatewayError::ConfigBuild(e.to_string()))?;
    from_kubeconfig(kubeconfig).await
}

/// Load `path`, which may be a `KUBECONFIG`-style list of files.
///
/// Files are merged in order; the first one to set a value wins.
async fn from_file(path: &Path) -> Result<ResolvedCredentials, GatewayError> {
    let mut merged: Option<Kubeconfig> = None;
    for file in std::env::split_paths(path.as_os_str()).filter(|p| !p.as_os_str().is_empty()) {
        let next = Kubeconfig::read_from(&file)
            .map_err(|e| GatewayError::ConfigBuild(format!("{}: {e}", file.display())))?;
        merged = Some(match merged {
            Some(kubeconfig) => kubeconfig
                .merge(next)
                .map_err(|e| GatewayError::ConfigBuild(format!("{}: {e}", file.display())))?,
            None => next,
        });
    }

    let kubeconfig = merged.ok_or_else(|| {
        GatewayError::ConfigBuild(format!("no kubeconfig files in {}", path.display()))
    })?;
    let config = from_kubeconfig(kubeconfig).await?;
    Ok(ResolvedCredentials {
        config,
        source: CredentialSource::KubeconfigFile(path.to_path_buf()),
    })
}

async fn from_kubeconfig(kubeconfig: Kubeconfig) -> Result<Config, GatewayError> {
    Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|e| GatewayError::ConfigBuild(e.to_string()))
}

fn non_empty(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.as_os_str().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::k8s::stub::{self, secret_body, StubApiServer};
    use tempfile::tempdir;

    fn no_in_cluster() -> Result<Config, String> {
        Err("KUBERNETES_SERVICE_HOST not set".to_string())
    }

    fn write_kubeconfig(dir: &Path, name: &str, server: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, stub::kubeconfig_yaml(server)).unwrap();
        path
    }


    #[tokio::test]
    async fn test_explicit_path_wins_over_in_cluster() {
        let dir = tempdir().unwrap();
        let path = write_kubeconfig(dir.path(), "mgmt.yaml", "https://10.0.0.1:6443");
        let options = CredentialOptions::new().with_kubeconfig(&path);

        let resolved = resolve_with(&options, || Config::incluster()).await.unwrap();
        assert_eq!(resolved.source, CredentialSource::KubeconfigFile(path));
        assert_eq!(resolved.config.cluster_url.host(), Some("10.0.0.1"));
    }

    #[tokio::test]
    async fn test_in_cluster_used_when_no_path() {
        let options = CredentialOptions::new().with_kubeconfig("");
        let resolved = resolve_with(&options, || {
            Ok::<_, String>(Config::new("https://10.96.0.1".parse().unwrap()))
        })
        .await
        .unwrap();
        assert_eq!(resolved.source, CredentialSource::InCluster);
        assert_eq!(resolved.config.cluster_url.host(), Some("10.96.0.1"));
    }

    #[tokio::test]
    async fn test_no_credentials_fails() {
        let err = resolve_with(&CredentialOptions::new(), no_in_cluster)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::CredentialResolution(_)));
        assert!(err.to_string().contains("KUBERNETES_SERVICE_HOST not set"));
    }

    #[tokio::test]
    async fn test_fallback_used_when_in_cluster_unavailable() {
        let dir = tempdir().unwrap();
        let path = write_kubeconfig(dir.path(), "fallback.yaml", "https://192.168.1.10:6443");
        let options = CredentialOptions::new().with_fallback(&path);

        let resolved = resolve_with(&options, no_in_cluster).await.unwrap();
        assert_eq!(resolved.source, CredentialSource::KubeconfigFile(path));
        assert_eq!(resolved.config.cluster_url.host(), Some("192.168.1.10"));
    }

    #[tokio::test]
    async fn test_resolution_is_deterministic() {
        let dir = tempdir().unwrap();
        let path = write_kubeconfig(dir.path(), "mgmt.yaml", "https://10.0.0.1:6443");
        let options = CredentialOptions::new().with_kubeconfig(&path);

        let first = resolve_with(&options, no_in_cluster).await.unwrap();
        let second = resolve_with(&options, no_in_cluster).await.unwrap();
        assert_eq!(first.source, second.source);
        assert_eq!(first.config.cluster_url, second.config.cluster_url);
        assert_eq!(first.config.default_namespace, second.config.default_namespace);
    }

    #[tokio::test]
    async fn test_missing_file_is_config_build_error() {
        let dir = tempdir().unwrap();
        let options = CredentialOptions::new().with_kubeconfig(dir.path().join("missing.yaml"));

        let err = resolve_with(&options, no_in_cluster).await.unwrap_err();
        assert!(matches!(err, GatewayError::ConfigBuild(_)));
    }

    #[tokio::test]
    async fn test_kubeconfig_path_list_is_merged() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("config");
        std::fs::write(
            &first,
            stub::kubeconfig_yaml("https://10.0.0.1:6443")
                .replace("current-context: stub", "current-context: mgmt"),
        )
        .unwrap();
        let second = dir.path().join("mgmt");
        std::fs::write(
            &second,
            r#"apiVersion: v1
kind: Config
clusters:
- name: mgmt
  cluster:
    server: https://mgmt.example.com:6443
contexts:
- name: mgmt
  context:
    cluster: mgmt
    user: mgmt
users:
- name: mgmt
  user: {}
current-context: mgmt
"#,
        )
        .unwrap();

        let joined = std::env::join_paths([&first, &second]).unwrap();
        let options = CredentialOptions::new().with_kubeconfig(&joined);

        let resolved = resolve_with(&options, no_in_cluster).await.unwrap();
        assert_eq!(resolved.config.cluster_url.host(), Some("mgmt.example.com"));
        assert_eq!(
            resolved.source,
            CredentialSource::KubeconfigFile(PathBuf::from(joined))
        );
    }

    #[tokio::test]
    async fn test_missing_file_in_path_list_fails() {
        let dir = tempdir().unwrap();
        let path = write_kubeconfig(dir.path(), "config", "https://10.0.0.1:6443");
        let joined = std::env::join_paths([path, dir.path().join("missing")]).unwrap();
        let options = CredentialOptions::new().with_kubeconfig(joined);

        let err = resolve_with(&options, no_in_cluster).await.unwrap_err();
        assert!(matches!(err, GatewayError::ConfigBuild(ref msg) if msg.contains("missing")));
    }

    #[tokio::test]
    async fn test_malformed_bytes_are_config_build_error() {
        let err = from_bytes(b"clusters: [not: a: kubeconfig").await.unwrap_err();
        assert!(matches!(err, GatewayError::ConfigBuild(_)));

        let err = from_bytes(&[0xff, 0xfe, 0x00]).await.unwrap_err();
        assert!(matches!(err, GatewayError::ConfigBuild(_)));
    }

    #[tokio::test]
    async fn test_override_from_secret() {
        let embedded = stub::kubeconfig_yaml("https://mgmt.example.com:6443");
        let body = secret_body("value", &embedded);
        let server = StubApiServer::start(move |path| {
            if path.starts_with("/api/v1/namespaces/default/secrets/management-prod-cluster-kubeconfig") {
                (200, body.clone())
            } else {
                (404, stub::status_body(404, "NotFound", "not found"))
            }
        })
        .await;

        let resolved = override_from_secret(server.config().await, &SecretRef::default())
            .await
            .unwrap();
        assert_eq!(resolved.config.cluster_url.host(), Some("mgmt.example.com"));
        assert_eq!(resolved.source, CredentialSource::Secret(SecretRef::default()));
    }

    #[tokio::test]
    async fn test_override_honours_configured_key() {
        let embedded = stub::kubeconfig_yaml("https://mgmt.example.com:6443");
        let body = secret_body("kubeconfig", &embedded);
        let server = StubApiServer::start(move |_| (200, body.clone())).await;

        let secret = SecretRef {
            key: "kubeconfig".to_string(),
            ..SecretRef::default()
        };
        let resolved = override_from_secret(server.config().await, &secret)
            .await
            .unwrap();
        assert_eq!(resolved.config.cluster_url.host(), Some("mgmt.example.com"));

        let err = override_from_secret(server.config().await, &SecretRef::default())
            .await
            .unwrap_err();
        match err {
            GatewayError::SecretLookup { reason, .. } => {
                assert_eq!(reason, "key \"value\" not found")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_override_missing_secret() {
        let server = StubApiServer::start(|_| {
            (
                404,
                stub::status_body(
                    404,
                    "NotFound",
                    "secrets \"management-prod-cluster-kubeconfig\" not found",
                ),
            )
        })
        .await;

        let err = override_from_secret(server.config().await, &SecretRef::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::SecretLookup { .. }));
    }
}
