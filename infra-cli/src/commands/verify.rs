//! Run the output checks against an applied cluster.

use anyhow::{Context as _, Result};

use super::Context;
use infra_core::ClusterOutputs;
use infra_harness::assertions::{verify_cluster_outputs, ExpectedCluster};
use infra_harness::terraform;

/// Run the verify command.
pub async fn run(ctx: &Context, cluster_name: &str) -> Result<()> {
    let outputs = terraform::output_all(&ctx.options())
        .await
        .context("Failed to read outputs. Has the module been applied?")?;
    let outputs = ClusterOutputs::try_from(&outputs)?;

    let expected = ExpectedCluster {
        name: cluster_name.to_string(),
        region: ctx.config.cluster.region.clone(),
        instance_type: ctx.config.cluster.instance_type.clone(),
    };

    let report = verify_cluster_outputs(&outputs, &expected);
    println!("{}", report);

    if !report.passed() {
        anyhow::bail!("{} output check(s) failed", report.failures().len());
    }
    Ok(())
}
