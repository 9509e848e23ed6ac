//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Read-only access to Cluster API management clusters
#[derive(Parser, Debug)]
#[command(name = "capi-gateway")]
#[command(author = "hephaex@gmail.com")]
#[command(version = "0.1.0")]
#[command(about = "List CAPI workload clusters, kubeconfig secrets and ingresses")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to a kubeconfig file (default: in-cluster service account)
    #[arg(long, global = true)]
    pub kubeconfig: Option<PathBuf>,

    /// Namespace to list in
    #[arg(short, long, global = true)]
    pub namespace: Option<String>,

    /// Configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (plain, table, json, json-pretty)
    #[arg(short, long, global = true, default_value = "plain")]
    pub format: String,

    /// Replace credentials with the kubeconfig stored in the management Secret
    #[arg(long, global = true)]
    pub from_secret: bool,

    /// Secret data key holding the kubeconfig
    #[arg(long, global = true)]
    pub secret_key: Option<String>,

    /// Objects per list request
    #[arg(long, global = true)]
    pub page_size: Option<u32>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List workload clusters
    Clusters(ClustersArgs),

    /// List secrets whose name ends with the kubeconfig suffix
    Secrets,

    /// List ingresses
    Ingresses,

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for clusters command
#[derive(Parser, Debug)]
pub struct ClustersArgs {
    /// API group of the cluster resource
    #[arg(long)]
    pub group: Option<String>,

    /// API version of the cluster resource
    #[arg(long = "api-version")]
    pub api_version: Option<String>,

    /// Plural resource name
    #[arg(long)]
    pub plural: Option<String>,

    /// Resource kind
    #[arg(long)]
    pub kind: Option<String>,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show {
        /// Show environment variables instead
        #[arg(long)]
        env: bool,
    },

    /// Write an example configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "./capi-gateway.yaml")]
        output: String,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}
