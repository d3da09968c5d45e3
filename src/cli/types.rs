//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::{check::CheckArgs, serve::ServeArgs};

#[derive(Parser, Debug)]
#[command(name = "dropwatch")]
#[command(about = "Dropwatch - watches public sources and announces a model launch once", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .dropwatch/config.yaml + .dropwatch/local.yaml)
    #[arg(short, long, global = true, env = "DROPWATCH_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the scheduler and the HTTP API until interrupted
    Serve(ServeArgs),

    /// Run one check against every source and print the result
    Check(CheckArgs),

    /// Print the effective configuration with secrets redacted
    Config,
}
