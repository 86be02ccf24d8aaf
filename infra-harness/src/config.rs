//! Configuration loading for the test suite.
//!
//! Configuration is loaded from a TOML file named by `K3S_INFRA_CONFIG`;
//! without it every value falls back to the defaults the k3s module is
//! tested with (single t3.micro worker in us-west-2).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use infra_core::ClusterVars;

/// Env var naming the config file.
pub const CONFIG_ENV: &str = "K3S_INFRA_CONFIG";

/// Key used when the SSH public key env var is unset. Terraform only needs a
/// syntactically valid key; nobody logs in with it.
pub const PLACEHOLDER_SSH_KEY: &str = "ssh-rsa AAAAB3NzaC1yc2EAAAADAQABAAABAQC... k3s-infra-test";

/// Root configuration for the suite.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Terraform invocation settings.
    pub terraform: TerraformConfig,
    /// Cluster variables.
    pub cluster: ClusterConfig,
    /// Connectivity probe settings.
    pub connectivity: ConnectivityConfig,
}

/// Terraform invocation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct TerraformConfig {
    /// Terraform binary (default: `terraform` on PATH).
    #[serde(default = "default_binary")]
    pub binary: String,
    /// Directory copied to a temp dir per test (default: `../..`).
    #[serde(default = "default_module_root")]
    pub module_root: PathBuf,
    /// Module directory inside `module_root` (default: `terraform`).
    #[serde(default = "default_module_dir")]
    pub module_dir: String,
    /// Retries for known-transient failures (default: 3).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Seconds between retries (default: 5).
    #[serde(default = "default_time_between_retries_secs")]
    pub time_between_retries_secs: u64,
    /// Pass `-no-color` to terraform (default: true).
    #[serde(default = "default_true")]
    pub no_color: bool,
}

/// Cluster variables passed to the k3s module.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterConfig {
    /// AWS region the module deploys to (default: us-west-2).
    #[serde(default = "default_region")]
    pub region: String,
    /// Environment tag (default: test).
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Instance type (default: t3.micro).
    #[serde(default = "default_instance_type")]
    pub instance_type: String,
    /// Desired workers (default: 1).
    #[serde(default = "default_worker_count")]
    pub worker_count: u32,
    /// Autoscaling minimum (default: 1).
    #[serde(default = "default_worker_min_count")]
    pub worker_min_count: u32,
    /// Autoscaling maximum (default: 2).
    #[serde(default = "default_worker_max_count")]
    pub worker_max_count: u32,
    /// Install monitoring (default: false).
    #[serde(default)]
    pub enable_monitoring: bool,
    /// Install ArgoCD (default: false).
    #[serde(default)]
    pub enable_argocd: bool,
    /// Env var holding the SSH public key (default: K3S_TEST_SSH_PUBLIC_KEY).
    #[serde(default = "default_ssh_public_key_env")]
    pub ssh_public_key_env: String,
}

/// Connectivity probe settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectivityConfig {
    /// Ports probed on the master node (default: 22 and 6443).
    #[serde(default = "default_ports")]
    pub ports: Vec<u16>,
    /// Per-attempt connect timeout in seconds (default: 5).
    #[serde(default = "default_connect_timeout_secs")]
    pub timeout_secs: u64,
    /// Attempts per port (default: 30).
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    /// Seconds between attempts (default: 10).
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

// Default value functions
fn default_binary() -> String {
    "terraform".to_string()
}

fn default_module_root() -> PathBuf {
    PathBuf::from("../..")
}

fn default_module_dir() -> String {
    "terraform".to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_time_between_retries_secs() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

fn default_region() -> String {
    "us-west-2".to_string()
}

fn default_environment() -> String {
    "test".to_string()
}

fn default_instance_type() -> String {
    "t3.micro".to_string()
}

fn default_worker_count() -> u32 {
    1
}

fn default_worker_min_count() -> u32 {
    1
}

fn default_worker_max_count() -> u32 {
    2
}

fn default_ssh_public_key_env() -> String {
    "K3S_TEST_SSH_PUBLIC_KEY".to_string()
}

fn default_ports() -> Vec<u16> {
    vec![22, 6443]
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_attempts() -> u32 {
    30
}

fn default_interval_secs() -> u64 {
    10
}

impl Default for TerraformConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            module_root: default_module_root(),
            module_dir: default_module_dir(),
            max_retries: default_max_retries(),
            time_between_retries_secs: default_time_between_retries_secs(),
            no_color: default_true(),
        }
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            environment: default_environment(),
            instance_type: default_instance_type(),
            worker_count: default_worker_count(),
            worker_min_count: default_worker_min_count(),
            worker_max_count: default_worker_max_count(),
            enable_monitoring: false,
            enable_argocd: false,
            ssh_public_key_env: default_ssh_public_key_env(),
        }
    }
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            ports: default_ports(),
            timeout_secs: default_connect_timeout_secs(),
            attempts: default_attempts(),
            interval_secs: default_interval_secs(),
        }
    }
}

impl SuiteConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load from the file named by `K3S_INFRA_CONFIG`, or use defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    /// Resolve the module directory against `base` (relative roots only).
    pub fn module_root_from(&self, base: &Path) -> PathBuf {
        if self.terraform.module_root.is_absolute() {
            self.terraform.module_root.clone()
        } else {
            base.join(&self.terraform.module_root)
        }
    }

    /// SSH public key from the configured env var, or the placeholder.
    pub fn ssh_public_key(&self) -> String {
        std::env::var(&self.cluster.ssh_public_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .unwrap_or_else(|| PLACEHOLDER_SSH_KEY.to_string())
    }

    /// Cluster variables for a test cluster with the configured sizing.
    pub fn cluster_vars(&self, cluster_name: &str, project_name: &str) -> ClusterVars {
        let c = &self.cluster;
        ClusterVars::new(cluster_name, project_name)
            .environment(&c.environment)
            .instance_type(&c.instance_type)
            .workers(c.worker_count, c.worker_min_count, c.worker_max_count)
            .monitoring(c.enable_monitoring)
            .argocd(c.enable_argocd)
    }

    /// Time between terraform retries.
    pub fn time_between_retries(&self) -> Duration {
        Duration::from_secs(self.terraform.time_between_retries_secs)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
}
