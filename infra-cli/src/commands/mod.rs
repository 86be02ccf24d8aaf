//! CLI command implementations.

pub mod apply;
pub mod destroy;
pub mod outputs;
pub mod probe;
pub mod verify;

use std::path::PathBuf;

use infra_core::vars::SSH_PUBLIC_KEY_TF_VAR;
use infra_core::VarSet;
use infra_harness::{SuiteConfig, TerraformOptions};

/// Shared state for every command.
#[derive(Debug, Clone)]
pub struct Context {
    /// Suite configuration.
    pub config: SuiteConfig,
    /// Module directory terraform runs in.
    pub dir: PathBuf,
}

impl Context {
    /// Create a new context.
    pub fn new(config: SuiteConfig, dir: PathBuf) -> Self {
        Self { config, dir }
    }

    /// Options without variables (outputs, probe).
    pub fn options(&self) -> TerraformOptions {
        TerraformOptions::from_config(&self.dir, &self.config)
    }

    /// Options carrying the cluster variables and SSH key (apply, destroy).
    pub fn cluster_options(&self, cluster_name: &str, project_name: &str) -> TerraformOptions {
        let vars = self.config.cluster_vars(cluster_name, project_name);
        self.options()
            .vars(VarSet::from(&vars))
            .env(SSH_PUBLIC_KEY_TF_VAR, &self.config.ssh_public_key())
    }
}
