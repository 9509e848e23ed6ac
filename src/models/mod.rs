//! Data models for the cluster access gateway
//!
//! Resource coordinates, credential sources and listing results.

mod credential;
mod listing;
mod resource;

pub use credential::{CredentialSource, SecretRef};
pub use listing::Listing;
pub use resource::ResourceRef;
