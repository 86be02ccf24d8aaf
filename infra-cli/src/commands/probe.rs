//! Check the master node accepts connections.

use anyhow::{Context as _, Result};

use super::Context;
use infra_harness::assertions::assert_reachable;
use infra_harness::connectivity::{probe_ports, ProbeConfig};
use infra_harness::terraform;

/// Run the probe command.
pub async fn run(ctx: &Context, host: Option<&str>) -> Result<()> {
    let host = match host {
        Some(h) => h.to_string(),
        None => terraform::output_all(&ctx.options())
            .await
            .context("Failed to read outputs. Has the module been applied?")?
            .string("master_node_ip")?,
    };

    let connectivity = &ctx.config.connectivity;
    println!("Probing {} on ports {:?}", host, connectivity.ports);

    let results = probe_ports(&host, &connectivity.ports, ProbeConfig::from(connectivity)).await;

    let mut unreachable = 0;
    for probe in &results {
        let result = assert_reachable(probe);
        if !result.passed {
            unreachable += 1;
        }
        println!("{}", result);
    }

    if unreachable > 0 {
        anyhow::bail!("{} port(s) unreachable on {}", unreachable, host);
    }
    Ok(())
}
