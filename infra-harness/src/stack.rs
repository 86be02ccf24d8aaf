//! Provisioned stack handle and scoped teardown.
//!
//! [`with_stack`] is the only way the suite provisions infrastructure:
//! apply, run the test body, destroy. Destroy runs on every exit path,
//! including a failed apply (partial resources) and a panicking assertion.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::FutureExt;
use infra_core::vars::SSH_PUBLIC_KEY_TF_VAR;
use infra_core::{ClusterOutputs, ClusterVars, OutputSet, VarSet};
use tempfile::TempDir;

use crate::config::SuiteConfig;
use crate::terraform::{self, TerraformOptions};
use crate::workdir::copy_module_to_temp;
use crate::HarnessError;

struct StackInner {
    options: TerraformOptions,
    /// Keeps the working copy alive until the last handle is dropped.
    _workdir: Option<TempDir>,
}

/// Handle to one provisioned (or about to be provisioned) module copy.
///
/// Cheap to clone; the working copy is removed when the last clone drops.
#[derive(Clone)]
pub struct Stack {
    inner: Arc<StackInner>,
}

impl std::fmt::Debug for Stack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stack")
            .field("terraform_dir", &self.inner.options.terraform_dir)
            .finish()
    }
}

impl Stack {
    /// Stack over an existing directory (not removed on drop).
    pub fn new(options: TerraformOptions) -> Self {
        Self {
            inner: Arc::new(StackInner {
                options,
                _workdir: None,
            }),
        }
    }

    /// Stack that owns its temp working copy.
    pub fn with_workdir(options: TerraformOptions, workdir: TempDir) -> Self {
        Self {
            inner: Arc::new(StackInner {
                options,
                _workdir: Some(workdir),
            }),
        }
    }

    /// Copy the k3s module to a temp dir and configure it for `vars`.
    ///
    /// `base` anchors a relative `module_root` (the test crate's manifest
    /// dir, or the CLI's working directory). The SSH public key is forwarded
    /// as `TF_VAR_ssh_public_key`.
    pub fn for_cluster(
        config: &SuiteConfig,
        base: &Path,
        vars: &ClusterVars,
    ) -> Result<Self, HarnessError> {
        let root = config.module_root_from(base);
        let (workdir, module_dir) =
            copy_module_to_temp(&root, &config.terraform.module_dir)?.into_parts();

        let options = TerraformOptions::from_config(module_dir, config)
            .vars(VarSet::from(vars))
            .env(SSH_PUBLIC_KEY_TF_VAR, &config.ssh_public_key());

        Ok(Self::with_workdir(options, workdir))
    }

    /// Terraform options this stack runs with.
    pub fn options(&self) -> &TerraformOptions {
        &self.inner.options
    }

    /// Directory terraform runs in.
    pub fn terraform_dir(&self) -> &PathBuf {
        &self.inner.options.terraform_dir
    }

    /// Read every output once.
    pub async fn outputs(&self) -> Result<OutputSet, HarnessError> {
        terraform::output_all(self.options()).await
    }

    /// Read one scalar output.
    pub async fn output(&self, name: &str) -> Result<String, HarnessError> {
        Ok(self.outputs().await?.string(name)?)
    }

    /// Read one list output.
    pub async fn output_list(&self, name: &str) -> Result<Vec<String>, HarnessError> {
        Ok(self.outputs().await?.list(name)?)
    }

    /// Read one map output.
    pub async fn output_map(
        &self,
        name: &str,
    ) -> Result<std::collections::BTreeMap<String, String>, HarnessError> {
        Ok(self.outputs().await?.map(name)?)
    }

    /// Read the k3s module's outputs as a typed snapshot.
    pub async fn cluster_outputs(&self) -> Result<ClusterOutputs, HarnessError> {
        let outputs = self.outputs().await?;
        Ok(ClusterOutputs::try_from(&outputs)?)
    }
}

/// Apply `stack`, run `body`, then destroy.
///
/// - Apply fails: destroy still runs (to clean partial resources), the apply
///   error is returned.
/// - Body panics: destroy runs, then the panic resumes.
/// - Body returns: destroy runs; a destroy failure becomes
///   [`HarnessError::Teardown`].
pub async fn with_stack<F, Fut, T>(stack: Stack, body: F) -> Result<T, HarnessError>
where
    F: FnOnce(Stack) -> Fut,
    Fut: Future<Output = T>,
{
    tracing::info!("applying {}", stack.terraform_dir().display());
    if let Err(e) = terraform::init_and_apply(stack.options()).await {
        tracing::warn!("apply failed, destroying partial resources: {}", e);
        if let Err(destroy_err) = terraform::destroy(stack.options()).await {
            tracing::warn!("destroy after failed apply also failed: {}", destroy_err);
        }
        return Err(e);
    }

    // The closure runs inside the guarded future so a panic before its
    // first await still reaches destroy.
    let handle = stack.clone();
    let outcome = AssertUnwindSafe(async move { body(handle).await })
        .catch_unwind()
        .await;

    tracing::info!("destroying {}", stack.terraform_dir().display());
    let destroyed = terraform::destroy(stack.options()).await;

    match outcome {
        Ok(value) => match destroyed {
            Ok(_) => Ok(value),
            Err(e) => Err(HarnessError::Teardown(e.to_string())),
        },
        Err(panic) => {
            if let Err(e) = destroyed {
                tracing::warn!("destroy after failed test also failed: {}", e);
            }
            std::panic::resume_unwind(panic)
        }
    }
}
