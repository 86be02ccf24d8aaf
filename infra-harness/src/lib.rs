//! # infra-harness
//!
//! Terraform lifecycle harness for the k3s infrastructure test suite.
//!
//! This crate drives the `terraform` CLI against per-test copies of the
//! cluster module:
//! - [`workdir`] - Temp working copies so parallel tests never share state
//! - [`terraform`] - init/apply/output/destroy with transient-error retries
//! - [`stack`] - [`Stack`] handle and [`with_stack`] scoped teardown
//! - [`assertions`] - Pass/fail checks over cluster outputs
//! - [`connectivity`] - TCP reachability probes for cluster nodes
//! - [`config`] - TOML suite configuration
//! - [`logging`] - Tracing subscriber setup

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod assertions;
pub mod config;
pub mod connectivity;
mod error;
pub mod logging;
pub mod stack;
pub mod terraform;
pub mod workdir;

pub use config::{ConfigError, SuiteConfig};
pub use error::HarnessError;
pub use stack::{with_stack, Stack};
pub use terraform::TerraformOptions;
