//! capi-gateway - read-only access to Cluster API management clusters
//!
//! Resolves credentials for a management cluster and lists what lives in
//! one of its namespaces.
//!
//! ## Features
//!
//! - Credentials from an explicit kubeconfig, the in-cluster service
//!   account, or a kubeconfig stored in a Secret
//! - Workload cluster listing for any CAPI group/version
//! - Kubeconfig Secret and Ingress listing
//! - Paginated list requests
//! - Multiple output formats (plain, table, JSON)
//!
//! ## Usage
//!
//! ```bash
//! # List workload clusters using the in-cluster service account
//! capi-gateway clusters
//!
//! # Use a local kubeconfig and another namespace
//! capi-gateway --kubeconfig ~/.kube/mgmt.yaml -n capi-system clusters
//!
//! # Use the kubeconfig stored in the management Secret
//! capi-gateway --from-secret secrets
//!
//! # Write an example configuration file
//! capi-gateway config init
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

mod cli;
mod config;
mod k8s;
mod models;
mod output;
mod utils;

use cli::Args;
use config::{AppConfig, ConfigFile, EnvConfig};
use k8s::ClusterGateway;
use models::{Listing, ResourceRef};
use output::{ListingFormatter, OutputFormat};
use utils::{init_logger, LogLevel};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let env = EnvConfig::load();

    init_logger(LogLevel::resolve(args.verbose, env.log_level.as_deref()));

    match args.command {
        cli::Command::Clusters(ref clusters_args) => {
            let mut config = effective_config(&args, &env)?;
            config.resource = resource_from_args(&config.resource, clusters_args);
            config.validate()?;
            let gateway = connect(&config).await?;
            let listing = gateway.list_workload_clusters().await.map_err(|e| {
                let hint = if e.is_not_found() {
                    format!(" (is the {} CRD installed?)", config.resource)
                } else {
                    String::new()
                };
                anyhow::Error::new(e).context(format!("Failed to list workload clusters{hint}"))
            })?;
            print_listing(&args, &listing)?;
        }
        cli::Command::Secrets => {
            let config = effective_config(&args, &env)?;
            let gateway = connect(&config).await?;
            let listing = gateway
                .list_kubeconfig_secrets()
                .await
                .context("Failed to list kubeconfig secrets")?;
            print_listing(&args, &listing)?;
        }
        cli::Command::Ingresses => {
            let config = effective_config(&args, &env)?;
            let gateway = connect(&config).await?;
            let listing = gateway
                .list_ingresses()
                .await
                .context("Failed to list ingresses")?;
            print_listing(&args, &listing)?;
        }
        cli::Command::Config(ref config_args) => {
            manage_config(&args, &env, config_args)?;
        }
    }

    Ok(())
}

/// Defaults < config file < environment < command line
fn effective_config(args: &Args, env: &EnvConfig) -> Result<AppConfig> {
    let file = match args
        .config
        .clone()
        .or_else(|| env.config_file.as_ref().map(Into::into))
    {
        Some(path) => ConfigFile::load(&path)?,
        None => ConfigFile::load_default()?,
    };

    let mut config = file.gateway;
    env.apply_to(&mut config);

    if let Some(kubeconfig) = &args.kubeconfig {
        config.kubeconfig = Some(kubeconfig.clone());
    }
    if let Some(namespace) = &args.namespace {
        config.namespace = namespace.clone();
    }
    if args.from_secret {
        config.secret_override.enabled = true;
    }
    if let Some(key) = &args.secret_key {
        config.secret_override.secret.key = key.clone();
    }
    if let Some(page_size) = args.page_size {
        config.page_size = Some(page_size);
    }

    config.validate()?;
    debug!("Effective configuration: {:?}", config);
    Ok(config)
}

fn resource_from_args(base: &ResourceRef, args: &cli::ClustersArgs) -> ResourceRef {
    ResourceRef::new(
        args.group.clone().unwrap_or_else(|| base.group.clone()),
        args.api_version.clone().unwrap_or_else(|| base.version.clone()),
        args.plural.clone().unwrap_or_else(|| base.plural.clone()),
        args.kind.clone().unwrap_or_else(|| base.kind.clone()),
    )
}

async fn connect(config: &AppConfig) -> Result<ClusterGateway> {
    let gateway = ClusterGateway::connect(config)
        .await
        .context("Failed to connect to the management cluster")?;
    if let Some(source) = gateway.source() {
        debug!("Credentials from {}", source);
    }
    Ok(gateway)
}

fn print_listing(args: &Args, listing: &Listing) -> Result<()> {
    let format = OutputFormat::from_str(&args.format)
        .ok_or_else(|| anyhow::anyhow!("Unknown output format: {}", args.format))?;
    if listing.is_empty() {
        debug!("No {} found in {}", listing.resource, listing.namespace);
    }
    let output = ListingFormatter::new(format).format(listing)?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

fn manage_config(args: &Args, env: &EnvConfig, config_args: &cli::ConfigArgs) -> Result<()> {
    use std::path::Path;

    match &config_args.action {
        cli::ConfigAction::Init { output, force } => {
            let path = Path::new(output);
            if path.exists() && !force {
                anyhow::bail!(
                    "Configuration file already exists: {output}. Use --force to overwrite."
                );
            }

            ConfigFile::example().save(path)?;
            println!("✓ Configuration file created: {output}");
        }

        cli::ConfigAction::Show { env: show_env } => {
            if *show_env {
                env.print_summary();
            } else {
                let file = ConfigFile {
                    gateway: effective_config(args, env)?,
                    ..ConfigFile::default()
                };
                let output = if args.format.starts_with("json") {
                    serde_json::to_string_pretty(&file)?
                } else {
                    serde_yaml::to_string(&file)?
                };
                println!("{output}");
            }
        }
    }

    Ok(())
}
