//! # infra-cli
//!
//! CLI for provisioning and verifying the k3s test cluster by hand.
//!
//! ## Commands
//!
//! - `apply`: Provision the cluster module in place
//! - `outputs`: Print the module's outputs
//! - `verify`: Run the output checks the test suite runs
//! - `probe`: Check the master node accepts SSH and k3s API connections
//! - `destroy`: Tear the cluster down
//!
//! ## Example
//!
//! ```bash
//! # Provision with a generated name (printed on success)
//! infra-cli --dir terraform apply
//!
//! # Check outputs against what was applied
//! infra-cli --dir terraform verify --cluster-name k3s-test-a1B2c3
//!
//! # Tear down (needs the same variables)
//! infra-cli --dir terraform destroy --cluster-name k3s-test-a1B2c3
//! ```

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::{apply, destroy, outputs, probe, verify, Context};
use infra_harness::SuiteConfig;

/// CLI for provisioning and verifying the k3s test cluster.
#[derive(Parser, Debug)]
#[command(name = "infra-cli")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Suite configuration file (default: $K3S_INFRA_CONFIG, else built-in defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Terraform module directory (default: <module_root>/<module_dir> from the config)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Provision the cluster module in place
    Apply {
        /// Cluster name (generated as k3s-test-<id> if omitted)
        #[arg(long)]
        cluster_name: Option<String>,

        /// Project tag
        #[arg(long, default_value = "k3s-test")]
        project_name: String,
    },

    /// Print the module's outputs
    Outputs {
        /// Print as JSON instead of name = value lines
        #[arg(long)]
        json: bool,
    },

    /// Check outputs against the applied cluster name, region and instance type
    Verify {
        /// Cluster name the module was applied with
        #[arg(long)]
        cluster_name: String,
    },

    /// Check the master node accepts TCP connections on the configured ports
    Probe {
        /// Host to probe (default: the master_node_ip output)
        #[arg(long)]
        host: Option<String>,
    },

    /// Tear the cluster down
    Destroy {
        /// Cluster name the module was applied with
        #[arg(long)]
        cluster_name: String,

        /// Project tag the module was applied with
        #[arg(long, default_value = "k3s-test")]
        project_name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    infra_harness::logging::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SuiteConfig::from_file(path)?,
        None => SuiteConfig::load()?,
    };

    let dir = match cli.dir {
        Some(dir) => dir,
        None => {
            let cwd = std::env::current_dir().context("Failed to read working directory")?;
            config
                .module_root_from(&cwd)
                .join(&config.terraform.module_dir)
        }
    };

    tracing::debug!(dir = %dir.display(), binary = %config.terraform.binary, "Resolved module");
    let ctx = Context::new(config, dir);

    match cli.command {
        Commands::Apply {
            cluster_name,
            project_name,
        } => {
            apply::run(&ctx, cluster_name.as_deref(), &project_name).await?;
        }
        Commands::Outputs { json } => {
            outputs::run(&ctx, json).await?;
        }
        Commands::Verify { cluster_name } => {
            verify::run(&ctx, &cluster_name).await?;
        }
        Commands::Probe { host } => {
            probe::run(&ctx, host.as_deref()).await?;
        }
        Commands::Destroy {
            cluster_name,
            project_name,
        } => {
            destroy::run(&ctx, &cluster_name, &project_name).await?;
        }
    }

    Ok(())
}
