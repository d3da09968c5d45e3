//! Command-line interface.

pub mod commands;
pub mod output;
pub mod types;

use anyhow::Result;
use console::style;
use std::path::Path;

use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;

pub use types::{Cli, Commands};

/// Load configuration from `path`, or from the project-local hierarchy.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

/// Print an error the way the selected output mode expects and exit.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let chain: Vec<String> = err.chain().skip(1).map(ToString::to_string).collect();
        let body = serde_json::json!({
            "error": err.to_string(),
            "causes": chain,
        });
        eprintln!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("{} {}", style("error:").red().bold(), err);
        for cause in err.chain().skip(1) {
            eprintln!("  {} {}", style("caused by:").dim(), cause);
        }
    }
    std::process::exit(1);
}
