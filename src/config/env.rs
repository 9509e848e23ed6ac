//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;
use std::path::PathBuf;

use super::AppConfig;

/// Environment variable prefix
const ENV_PREFIX: &str = "CAPI_GATEWAY";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Namespace from CAPI_GATEWAY_NAMESPACE
    pub namespace: Option<String>,
    /// Config file from CAPI_GATEWAY_CONFIG
    pub config_file: Option<String>,
    /// Secret data key from CAPI_GATEWAY_SECRET_KEY
    pub secret_key: Option<String>,
    /// Page size from CAPI_GATEWAY_PAGE_SIZE
    pub page_size: Option<u32>,
    /// Log level from CAPI_GATEWAY_LOG
    pub log_level: Option<String>,
    /// Kubeconfig path list from KUBECONFIG, merged at resolution time
    pub kubeconfig: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            namespace: get_env("NAMESPACE"),
            config_file: get_env("CONFIG"),
            secret_key: get_env("SECRET_KEY"),
            page_size: get_env_parse("PAGE_SIZE"),
            log_level: get_env("LOG"),
            kubeconfig: env::var("KUBECONFIG").ok().filter(|v| !v.is_empty()),
        }
    }

    /// Overlay the variables that are set onto `config`
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(namespace) = &self.namespace {
            config.namespace = namespace.clone();
        }
        if let Some(key) = &self.secret_key {
            config.secret_override.secret.key = key.clone();
        }
        if let Some(page_size) = self.page_size {
            config.page_size = Some(page_size);
        }
        if let Some(kubeconfig) = &self.kubeconfig {
            config.kubeconfig = Some(PathBuf::from(kubeconfig));
        }
    }

    /// Print current environment configuration
    pub fn print_summary(&self) {
        println!("Environment Configuration:");
        println!("  {}_NAMESPACE:   {:?}", ENV_PREFIX, self.namespace);
        println!("  {}_CONFIG:      {:?}", ENV_PREFIX, self.config_file);
        println!("  {}_SECRET_KEY:  {:?}", ENV_PREFIX, self.secret_key);
        println!("  {}_PAGE_SIZE:   {:?}", ENV_PREFIX, self.page_size);
        println!("  {}_LOG:         {:?}", ENV_PREFIX, self.log_level);
        println!("  KUBECONFIG:               {:?}", self.kubeconfig);
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.parse().ok())
}
