//! Cluster access gateway
//!
//! Read-only listing of CAPI workload clusters, kubeconfig Secrets and
//! Ingresses within one namespace.

use std::fmt::Debug;

use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::api::networking::v1::Ingress;
use kube::{
    api::{Api, DynamicObject, ListParams},
    Client, Config, Resource,
};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::credentials::{self, CredentialOptions, ResolvedCredentials};
use super::GatewayError;
use crate::config::AppConfig;
use crate::models::{CredentialSource, Listing, ResourceRef};

/// Namespace used when none is configured
pub const DEFAULT_NAMESPACE: &str = "default";

/// Suffix CAPI uses for workload cluster kubeconfig Secrets
pub const KUBECONFIG_SUFFIX: &str = "-kubeconfig";

/// Gateway to a single namespace of a management cluster
#[derive(Clone)]
pub struct ClusterGateway {
    client: Client,
    namespace: String,
    resource: ResourceRef,
    kubeconfig_suffix: String,
    page_size: Option<u32>,
    source: Option<CredentialSource>,
}

impl ClusterGateway {
    /// Wrap an existing client with CAPI defaults
    pub fn new(client: Client, namespace: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
            resource: ResourceRef::capi_clusters(),
            kubeconfig_suffix: KUBECONFIG_SUFFIX.to_string(),
            page_size: None,
            source: None,
        }
    }

    /// Create gateway with custom config
    pub fn with_config(config: Config, namespace: impl Into<String>) -> Result<Self, GatewayError> {
        let client = Client::try_from(config).map_err(GatewayError::ClientConstruction)?;
        Ok(Self::new(client, namespace))
    }

    /// Resolve credentials as configured and build the gateway
    pub async fn connect(app: &AppConfig) -> Result<Self, GatewayError> {
        let mut options = CredentialOptions::new();
        if let Some(path) = &app.kubeconfig {
            options = options.with_kubeconfig(path);
        }
        if let Some(path) = &app.fallback_kubeconfig {
            options = options.with_fallback(path);
        }
        let mut resolved = credentials::resolve_credentials(&options).await?;

        if app.secret_override.enabled {
            resolved =
                credentials::override_from_secret(resolved.config, &app.secret_override.secret)
                    .await?;
        }

        Self::from_resolved(resolved, app)
    }

    /// Build the gateway from already resolved credentials
    pub fn from_resolved(
        resolved: ResolvedCredentials,
        app: &AppConfig,
    ) -> Result<Self, GatewayError> {
        info!(
            "Connecting to {} using {}",
            resolved.config.cluster_url, resolved.source
        );

        let mut gateway = Self::with_config(resolved.config, &app.namespace)?
            .with_resource(app.resource.clone())
            .with_kubeconfig_suffix(&app.kubeconfig_suffix);
        if let Some(limit) = app.page_size {
            gateway = gateway.with_page_size(limit);
        }
        gateway.source = Some(resolved.source);
        Ok(gateway)
    }

    /// Target a different custom resource for workload clusters
    pub fn with_resource(mut self, resource: ResourceRef) -> Self {
        self.resource = resource;
        self
    }

    pub fn with_kubeconfig_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.kubeconfig_suffix = suffix.into();
        self
    }

    /// Page through results `limit` objects at a time
    pub fn with_page_size(mut self, limit: u32) -> Self {
        self.page_size = Some(limit);
        self
    }

    /// Get the namespace
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Where the credentials came from, when resolved by the gateway
    pub fn source(&self) -> Option<&CredentialSource> {
        self.source.as_ref()
    }

    /// List names of workload cluster objects
    pub async fn list_workload_clusters(&self) -> Result<Listing, GatewayError> {
        let ar = self.resource.api_resource();
        let api: Api<DynamicObject> =
            Api::namespaced_with(self.client.clone(), &self.namespace, &ar);
        let label = self.resource.to_string();
        debug!(
            "Listing {} {} in {}",
            self.resource.api_version(),
            self.resource.plural,
            self.namespace
        );

        let names = self.list_names(&api, &label).await?;
        for name in &names {
            debug!("Cluster: {}", name);
        }
        Ok(Listing::new(label, &self.namespace, names))
    }

    /// List names of Secrets ending with the kubeconfig suffix
    pub async fn list_kubeconfig_secrets(&self) -> Result<Listing, GatewayError> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), &self.namespace);
        let names = self.list_names(&api, "secrets").await?;
        let total = names.len();

        let names = filter_by_suffix(names, &self.kubeconfig_suffix);
        debug!(
            "{}/{} secrets end with {:?}",
            names.len(),
            total,
            self.kubeconfig_suffix
        );
        Ok(Listing::new("secrets", &self.namespace, names))
    }

    /// List names of Ingresses
    pub async fn list_ingresses(&self) -> Result<Listing, GatewayError> {
        let api: Api<Ingress> = Api::namespaced(self.client.clone(), &self.namespace);
        let names = self.list_names(&api, "ingresses.v1.networking.k8s.io").await?;
        Ok(Listing::new(
            "ingresses.v1.networking.k8s.io",
            &self.namespace,
            names,
        ))
    }

    /// Collect `metadata.name` of every object, following continue tokens
    async fn list_names<K>(&self, api: &Api<K>, label: &str) -> Result<Vec<String>, GatewayError>
    where
        K: Resource + Clone + DeserializeOwned + Debug,
    {
        let mut params = ListParams::default();
        if let Some(limit) = self.page_size {
            params = params.limit(limit);
        }

        let mut names = Vec::new();
        let mut previous: Option<String> = None;
        loop {
            let page = api.list(&params).await.map_err(|e| {
                warn!("Failed to list {} in {}: {}", label, self.namespace, e);
                GatewayError::list(label, e)
            })?;

            names.extend(page.items.iter().filter_map(|obj| obj.meta().name.clone()));

            let Some(token) = page.metadata.continue_.filter(|token| !token.is_empty()) else {
                break;
            };
            if previous.as_deref() == Some(token.as_str()) {
                warn!("Continue token for {} repeated, giving up", label);
                return Err(GatewayError::StalledPagination {
                    resource: label.to_string(),
                    token,
                });
            }

            debug!("Fetching next page of {} ({} so far)", label, names.len());
            params = params.continue_token(&token);
            previous = Some(token);
        }

        Ok(names)
    }
}

/// Keep names ending with `suffix` (case-sensitive), order preserved
pub fn filter_by_suffix(names: Vec<String>, suffix: &str) -> Vec<String> {
    names
        .into_iter()
        .filter(|name| name.ends_with(suffix))
        .collect()
}
