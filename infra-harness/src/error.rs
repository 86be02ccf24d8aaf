//! Error types for infra-harness.

use std::path::PathBuf;

use infra_core::CoreError;

use crate::config::ConfigError;

/// Errors that can occur while driving terraform.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// Terraform exited non-zero and the failure was not retryable.
    #[error("terraform {command} failed: exit={exit_code}, stderr={stderr}")]
    CommandFailed {
        /// Subcommand that failed (init, apply, destroy, output).
        command: String,
        /// Exit code (-1 if killed by a signal).
        exit_code: i32,
        /// Standard output.
        stdout: String,
        /// Standard error output.
        stderr: String,
    },

    /// A retryable failure kept recurring until the retry budget ran out.
    #[error("terraform {command} still failing after {attempts} attempts: {stderr}")]
    RetriesExhausted {
        /// Subcommand that failed.
        command: String,
        /// Total attempts made.
        attempts: u32,
        /// Standard error of the last attempt.
        stderr: String,
    },

    /// The terraform module directory does not exist.
    #[error("terraform module not found: {0}")]
    ModuleNotFound(PathBuf),

    /// Destroy failed after the test body succeeded.
    #[error("teardown failed: {0}")]
    Teardown(String),

    /// Reading outputs failed.
    #[error("output error: {0}")]
    Core(#[from] CoreError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error (spawning terraform, copying the module).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
