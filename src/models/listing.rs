//! Listing results

use serde::{Deserialize, Serialize};

/// Names returned by one listing operation, in server order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// What was listed (e.g. "clusters.v1beta1.cluster.x-k8s.io")
    pub resource: String,

    /// Namespace the list was issued in
    pub namespace: String,

    /// Object names
    pub names: Vec<String>,
}

impl Listing {
    pub fn new(
        resource: impl Into<String>,
        namespace: impl Into<String>,
        names: Vec<String>,
    ) -> Self {
        Self {
            resource: resource.into(),
            namespace: namespace.into(),
            names,
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
