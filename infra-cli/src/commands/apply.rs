//! Provision the cluster module.

use anyhow::{Context as _, Result};

use super::Context;
use infra_harness::terraform;

/// Run the apply command.
pub async fn run(ctx: &Context, cluster_name: Option<&str>, project_name: &str) -> Result<()> {
    let cluster_name = match cluster_name {
        Some(name) => name.to_string(),
        None => infra_core::unique_name("k3s-test"),
    };

    println!("Applying {} in {}", cluster_name, ctx.dir.display());
    let options = ctx.cluster_options(&cluster_name, project_name);
    terraform::init_and_apply(&options)
        .await
        .context("terraform apply failed")?;

    println!();
    println!("Cluster {} provisioned.", cluster_name);
    println!();
    println!("Verify with:  infra-cli verify --cluster-name {}", cluster_name);
    println!(
        "Destroy with: infra-cli destroy --cluster-name {} --project-name {}",
        cluster_name, project_name
    );

    Ok(())
}
