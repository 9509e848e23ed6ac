//! Kubernetes access module
//!
//! Credential resolution and read-only listing against the management cluster.

mod client;
pub mod credentials;
mod error;
#[cfg(test)]
pub(crate) mod stub;

pub use client::{ClusterGateway, DEFAULT_NAMESPACE, KUBECONFIG_SUFFIX};
pub use error::GatewayError;
