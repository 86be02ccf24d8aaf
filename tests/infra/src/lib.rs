//! # infra-tests
//!
//! Integration suite for the k3s cluster terraform module.
//!
//! Every scenario provisions its own copy of the module under a generated
//! name and destroys it on every exit path:
//! - `scenarios::cluster` - Apply, check the headline outputs, probe the master node
//! - `scenarios::outputs` - Apply, check every declared output
//! - `scenarios::fixture` - Full lifecycle against a local module with static outputs
//!
//! Live scenarios need AWS credentials and are ignored by default:
//!
//! ```bash
//! K3S_TEST_SSH_PUBLIC_KEY="$(cat ~/.ssh/id_ed25519.pub)" \
//!     cargo test -p infra-tests -- --ignored
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::path::{Path, PathBuf};

use infra_harness::assertions::ExpectedCluster;
use infra_harness::{HarnessError, Stack, SuiteConfig};

pub mod scenarios;

/// Directory of this crate; relative `module_root` paths resolve against it.
pub fn manifest_dir() -> &'static Path {
    Path::new(env!("CARGO_MANIFEST_DIR"))
}

/// Directory holding the local fixture modules.
pub fn fixtures_dir() -> PathBuf {
    manifest_dir().join("fixtures")
}

/// Suite configuration from `K3S_INFRA_CONFIG`, or defaults.
pub fn suite_config() -> Result<SuiteConfig, HarnessError> {
    Ok(SuiteConfig::load()?)
}

/// Configuration pointing at the static-outputs fixture module.
pub fn fixture_config() -> Result<SuiteConfig, HarnessError> {
    let mut config = suite_config()?;
    config.terraform.module_root = fixtures_dir();
    config.terraform.module_dir = "static-outputs".into();
    Ok(config)
}

/// A cluster stack to be provisioned by one test case.
#[derive(Debug, Clone)]
pub struct TestCluster {
    /// Generated cluster name (`<prefix>-<id>`).
    pub name: String,
    /// Unapplied stack over a private copy of the module.
    pub stack: Stack,
    /// What the outputs should report once applied.
    pub expected: ExpectedCluster,
}

/// Copy the module and configure it for a freshly named cluster.
///
/// `prefix` doubles as the project tag, so `k3s-output-test` yields a
/// cluster named `k3s-output-test-<id>` in project `k3s-output-test`.
pub fn test_cluster(config: &SuiteConfig, prefix: &str) -> Result<TestCluster, HarnessError> {
    let name = infra_core::unique_name(prefix);
    let vars = config.cluster_vars(&name, prefix);
    let stack = Stack::for_cluster(config, manifest_dir(), &vars)?;

    tracing::info!(cluster = %name, dir = %stack.terraform_dir().display(), "prepared test cluster");

    let expected = ExpectedCluster {
        name: name.clone(),
        region: config.cluster.region.clone(),
        instance_type: config.cluster.instance_type.clone(),
    };

    Ok(TestCluster {
        name,
        stack,
        expected,
    })
}
