//! Terraform CLI wrapper.
//!
//! Shells out to `terraform` with `tokio::process::Command`, one function per
//! lifecycle verb. Failures whose output matches a known-transient pattern
//! (provider registry hiccups, plugin handshake timeouts, eventual
//! consistency) are retried; anything else fails fast.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use infra_core::{EnvVars, OutputSet, VarSet};

use crate::config::SuiteConfig;
use crate::HarnessError;

/// Default retry budget for transient failures.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default pause between retries.
pub const DEFAULT_TIME_BETWEEN_RETRIES: Duration = Duration::from_secs(5);

/// Known-transient terraform failures: output substring -> reason logged on retry.
pub fn default_retryable_errors() -> BTreeMap<String, String> {
    const NETWORK: &str = "Failed to retrieve plugin due to transient network error.";
    [
        ("read: connection reset by peer", "Failed to reach helm charts repository."),
        ("transport is closing", "Failed to reach Kubernetes API."),
        ("unable to verify signature", NETWORK),
        ("unable to verify checksum", NETWORK),
        ("no provider exists with the given name", NETWORK),
        ("registry service is unreachable", NETWORK),
        ("Error installing provider", NETWORK),
        ("Failed to query available provider packages", NETWORK),
        ("timeout while waiting for plugin to start", NETWORK),
        ("timed out waiting for server handshake", NETWORK),
        ("could not query provider registry for", NETWORK),
        (
            "Provider produced inconsistent result after apply",
            "Provider eventual consistency error.",
        ),
    ]
    .into_iter()
    .map(|(pattern, reason)| (pattern.to_string(), reason.to_string()))
    .collect()
}

/// How to run terraform against one working directory.
#[derive(Debug, Clone)]
pub struct TerraformOptions {
    /// Directory holding the module (usually a temp copy).
    pub terraform_dir: PathBuf,
    /// Terraform binary.
    pub binary: String,
    /// `-var` arguments for apply and destroy.
    pub vars: VarSet,
    /// Environment for every invocation.
    pub env_vars: EnvVars,
    /// Output substring -> reason; matching failures are retried.
    pub retryable_errors: BTreeMap<String, String>,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Pause between attempts.
    pub time_between_retries: Duration,
    /// Pass `-no-color`.
    pub no_color: bool,
}

impl TerraformOptions {
    /// Options for `terraform_dir` with no vars and no retries.
    pub fn new(terraform_dir: impl Into<PathBuf>) -> Self {
        Self {
            terraform_dir: terraform_dir.into(),
            binary: "terraform".into(),
            vars: VarSet::new(),
            env_vars: EnvVars::new(),
            retryable_errors: BTreeMap::new(),
            max_retries: 0,
            time_between_retries: Duration::ZERO,
            no_color: true,
        }
    }

    /// Options with binary and retry policy taken from the suite config.
    pub fn from_config(terraform_dir: impl Into<PathBuf>, config: &SuiteConfig) -> Self {
        Self::new(terraform_dir)
            .binary(&config.terraform.binary)
            .with_default_retryable_errors()
            .retries(config.terraform.max_retries, config.time_between_retries())
            .no_color(config.terraform.no_color)
    }

    /// Set the terraform binary.
    pub fn binary(mut self, binary: &str) -> Self {
        self.binary = binary.into();
        self
    }

    /// Set the variable set.
    pub fn vars(mut self, vars: VarSet) -> Self {
        self.vars = vars;
        self
    }

    /// Add an environment variable.
    pub fn env(mut self, name: &str, value: &str) -> Self {
        self.env_vars.insert(name.into(), value.into());
        self
    }

    /// Install the default retryable-error table, 3 retries 5s apart.
    pub fn with_default_retryable_errors(mut self) -> Self {
        self.retryable_errors.extend(default_retryable_errors());
        self.max_retries = DEFAULT_MAX_RETRIES;
        self.time_between_retries = DEFAULT_TIME_BETWEEN_RETRIES;
        self
    }

    /// Override the retry budget.
    pub fn retries(mut self, max_retries: u32, time_between: Duration) -> Self {
        self.max_retries = max_retries;
        self.time_between_retries = time_between;
        self
    }

    /// Toggle `-no-color`.
    pub fn no_color(mut self, no_color: bool) -> Self {
        self.no_color = no_color;
        self
    }

    /// Reason for retrying, if `output` matches a retryable pattern.
    pub fn retry_reason(&self, output: &str) -> Option<&str> {
        self.retryable_errors
            .iter()
            .find(|(pattern, _)| output.contains(pattern.as_str()))
            .map(|(_, reason)| reason.as_str())
    }
}

/// Result of one terraform invocation.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
    /// Exit code (0 = success, -1 if killed by a signal).
    pub exit_code: i32,
}

impl CommandResult {
    /// Returns true if the command succeeded (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

// ============================================================================
// Argument builders
// ============================================================================

/// `init -upgrade=false -input=false`
pub fn init_args(options: &TerraformOptions) -> Vec<String> {
    let mut args = vec!["init".into(), "-upgrade=false".into(), "-input=false".into()];
    push_no_color(&mut args, options);
    args
}

/// `apply -input=false -auto-approve -lock=false <vars>`
pub fn apply_args(options: &TerraformOptions) -> Vec<String> {
    let mut args = vec![
        "apply".into(),
        "-input=false".into(),
        "-auto-approve".into(),
        "-lock=false".into(),
    ];
    push_no_color(&mut args, options);
    args.extend(options.vars.to_args());
    args
}

/// `destroy -auto-approve -input=false -lock=false <vars>`
pub fn destroy_args(options: &TerraformOptions) -> Vec<String> {
    let mut args = vec![
        "destroy".into(),
        "-auto-approve".into(),
        "-input=false".into(),
        "-lock=false".into(),
    ];
    push_no_color(&mut args, options);
    args.extend(options.vars.to_args());
    args
}

/// `output -json` (always colorless; the JSON must parse)
pub fn output_args() -> Vec<String> {
    vec!["output".into(), "-no-color".into(), "-json".into()]
}

fn push_no_color(args: &mut Vec<String>, options: &TerraformOptions) {
    if options.no_color {
        args.push("-no-color".into());
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Run `terraform init`.
pub async fn init(options: &TerraformOptions) -> Result<CommandResult, HarnessError> {
    run_with_retry(options, &init_args(options)).await
}

/// Run `terraform apply`.
pub async fn apply(options: &TerraformOptions) -> Result<CommandResult, HarnessError> {
    run_with_retry(options, &apply_args(options)).await
}

/// Run `terraform init` followed by `terraform apply`.
pub async fn init_and_apply(options: &TerraformOptions) -> Result<CommandResult, HarnessError> {
    ensure_module_dir(&options.terraform_dir)?;
    init(options).await?;
    apply(options).await
}

/// Run `terraform destroy`.
pub async fn destroy(options: &TerraformOptions) -> Result<CommandResult, HarnessError> {
    run_with_retry(options, &destroy_args(options)).await
}

/// Read every output with `terraform output -json`.
pub async fn output_all(options: &TerraformOptions) -> Result<OutputSet, HarnessError> {
    let result = run_with_retry(options, &output_args()).await?;
    Ok(OutputSet::from_json(&result.stdout)?)
}

fn ensure_module_dir(dir: &Path) -> Result<(), HarnessError> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(HarnessError::ModuleNotFound(dir.to_path_buf()))
    }
}

// ============================================================================
// Execution
// ============================================================================

/// Run terraform once, returning the raw result regardless of exit code.
pub async fn run(options: &TerraformOptions, args: &[String]) -> Result<CommandResult, HarnessError> {
    tracing::debug!(
        dir = %options.terraform_dir.display(),
        "running {} {}",
        options.binary,
        args.join(" ")
    );

    let output = tokio::process::Command::new(&options.binary)
        .args(args)
        .current_dir(&options.terraform_dir)
        .env("TF_IN_AUTOMATION", "1")
        .envs(&options.env_vars)
        .kill_on_drop(true)
        .output()
        .await?;

    Ok(CommandResult {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code().unwrap_or(-1),
    })
}

/// Run terraform, retrying failures that match a retryable pattern.
pub async fn run_with_retry(
    options: &TerraformOptions,
    args: &[String],
) -> Result<CommandResult, HarnessError> {
    let command = args.first().cloned().unwrap_or_default();
    let max_attempts = options.max_retries + 1;
    let mut attempt = 0;

    loop {
        attempt += 1;
        let result = run(options, args).await?;
        if result.success() {
            tracing::debug!("terraform {} succeeded on attempt {}", command, attempt);
            return Ok(result);
        }

        let combined = format!("{}\n{}", result.stdout, result.stderr);
        let Some(reason) = options.retry_reason(&combined) else {
            return Err(HarnessError::CommandFailed {
                command,
                exit_code: result.exit_code,
                stdout: result.stdout,
                stderr: result.stderr,
            });
        };

        if attempt >= max_attempts {
            return Err(HarnessError::RetriesExhausted {
                command,
                attempts: attempt,
                stderr: result.stderr,
            });
        }

        tracing::warn!(
            "terraform {} failed (attempt {}/{}): {} Retrying in {:?}",
            command,
            attempt,
            max_attempts,
            reason,
            options.time_between_retries
        );
        tokio::time::sleep(options.time_between_retries).await;
    }
}
