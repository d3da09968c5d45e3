//! Dropwatch CLI entry point.

use clap::Parser;

use dropwatch::cli::{handle_error, load_config, Cli, Commands};
use dropwatch::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    // Long-running mode logs as configured; one-shot commands stay quiet.
    let log_config = match cli.command {
        Commands::Serve(_) => LogConfig::from(&config.logging),
        _ => LogConfig::for_cli(&config.logging),
    };
    let _logger = match LoggerImpl::init(&log_config) {
        Ok(logger) => logger,
        Err(err) => handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Serve(args) => dropwatch::cli::commands::serve::execute(args, config, cli.json).await,
        Commands::Check(args) => dropwatch::cli::commands::check::execute(args, config, cli.json).await,
        Commands::Config => dropwatch::cli::commands::config::execute(config, cli.json),
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
