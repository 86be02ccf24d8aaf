//! Tear the cluster down.

use anyhow::{Context as _, Result};

use super::Context;
use infra_harness::terraform;

/// Run the destroy command.
pub async fn run(ctx: &Context, cluster_name: &str, project_name: &str) -> Result<()> {
    println!("Destroying {} in {}", cluster_name, ctx.dir.display());
    let options = ctx.cluster_options(cluster_name, project_name);
    terraform::destroy(&options)
        .await
        .context("terraform destroy failed")?;

    println!("Cluster {} destroyed.", cluster_name);
    Ok(())
}
