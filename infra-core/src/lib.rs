//! # infra-core
//!
//! Pure logic for the k3s infrastructure test suite (no I/O, instant tests).
//!
//! This crate holds everything the suite needs that does not touch a
//! process, a socket or the filesystem:
//! - [`unique_id`] / [`unique_name`] - Collision-free resource names for parallel tests
//! - [`validate`] - Predicates over output values (IP shape, DNS suffix, id prefixes)
//! - [`VarSet`] / [`ClusterVars`] - Terraform variable sets and their `-var` rendering
//! - [`OutputSet`] / [`ClusterOutputs`] - Parsed `terraform output -json`
//! - [`CoreError`] - Error types
//!
//! Running terraform itself lives in `infra-harness`, which feeds these types.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
pub mod outputs;
pub mod unique;
pub mod validate;
pub mod vars;

pub use error::CoreError;
pub use outputs::{ClusterOutputs, OutputSet, OutputValue};
pub use unique::{unique_id, unique_id_lower, unique_name, UNIQUE_ID_LEN};
pub use vars::{ClusterVars, EnvVars, VarSet, VarValue};
