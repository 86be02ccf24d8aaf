//! Print the module's outputs.

use anyhow::{Context as _, Result};

use super::Context;
use infra_harness::terraform;

/// Run the outputs command.
pub async fn run(ctx: &Context, json: bool) -> Result<()> {
    let outputs = terraform::output_all(&ctx.options())
        .await
        .context("Failed to read outputs. Has the module been applied?")?;

    if outputs.is_empty() {
        println!("No outputs.");
        return Ok(());
    }

    if json {
        let mut map = serde_json::Map::new();
        for name in outputs.names() {
            map.insert(name.to_string(), outputs.get(name)?.value.clone());
        }
        println!("{}", serde_json::to_string_pretty(&map)?);
        return Ok(());
    }

    for name in outputs.names() {
        let output = outputs.get(name)?;
        let display = if output.sensitive {
            "<sensitive>".to_string()
        } else {
            match &output.value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            }
        };
        println!("{} = {}", name, display);
    }

    Ok(())
}
