//! `dropwatch config`: print the effective configuration.

use anyhow::{Context, Result};

use crate::domain::models::Config;

pub fn execute(config: Config, json_mode: bool) -> Result<()> {
    let redacted = config.redacted();
    let rendered = if json_mode {
        serde_json::to_string_pretty(&redacted).context("Failed to render configuration")?
    } else {
        serde_yaml::to_string(&redacted).context("Failed to render configuration")?
    };
    println!("{rendered}");
    Ok(())
}
