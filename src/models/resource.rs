//! Custom resource coordinates
//!
//! Identifies the resource type the gateway lists as workload clusters.

use kube::api::{ApiResource, GroupVersionKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cluster API group served by CAPI providers
pub const CAPI_GROUP: &str = "cluster.x-k8s.io";

/// Cluster API version targeted by default
pub const CAPI_VERSION: &str = "v1beta1";

/// (group, version, plural) triple plus kind for a custom resource.
///
/// The coordinates are taken as-is from configuration and never checked
/// against API discovery. A cluster serving a different version of the
/// type answers with 404 at list time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    /// API group (e.g. "cluster.x-k8s.io")
    pub group: String,

    /// API version (e.g. "v1beta1")
    pub version: String,

    /// Plural resource name used in the URL path
    pub plural: String,

    /// Kind of the objects returned
    pub kind: String,
}

impl ResourceRef {
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        plural: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            plural: plural.into(),
            kind: kind.into(),
        }
    }

    /// Cluster API `Cluster` objects
    pub fn capi_clusters() -> Self {
        Self::new(CAPI_GROUP, CAPI_VERSION, "clusters", "Cluster")
    }

    /// "group/version", or just "version" for the core group
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// Build the dynamic API resource used by `Api<DynamicObject>`
    pub fn api_resource(&self) -> ApiResource {
        let gvk = GroupVersionKind::gvk(&self.group, &self.version, &self.kind);
        ApiResource::from_gvk_with_plural(&gvk, &self.plural)
    }
}

impl Default for ResourceRef {
    fn default() -> Self {
        Self::capi_clusters()
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}.{}", self.plural, self.version)
        } else {
            write!(f, "{}.{}.{}", self.plural, self.version, self.group)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capi_defaults() {
        let resource = ResourceRef::default();
        assert_eq!(resource.group, "cluster.x-k8s.io");
        assert_eq!(resource.version, "v1beta1");
        assert_eq!(resource.plural, "clusters");
        assert_eq!(resource.api_version(), "cluster.x-k8s.io/v1beta1");
    }

    #[test]
    fn test_api_resource_uses_configured_plural() {
        let resource = ResourceRef::new(
            "infrastructure.cluster.x-k8s.io",
            "v1beta2",
            "dockerclusters",
            "DockerCluster",
        );
        let ar = resource.api_resource();
        assert_eq!(ar.group, "infrastructure.cluster.x-k8s.io");
        assert_eq!(ar.version, "v1beta2");
        assert_eq!(ar.plural, "dockerclusters");
        assert_eq!(ar.kind, "DockerCluster");
        assert_eq!(ar.api_version, "infrastructure.cluster.x-k8s.io/v1beta2");
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ResourceRef::capi_clusters().to_string(),
            "clusters.v1beta1.cluster.x-k8s.io"
        );
        assert_eq!(
            ResourceRef::new("", "v1", "secrets", "Secret").to_string(),
            "secrets.v1"
        );
    }
}
