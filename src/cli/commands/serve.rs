//! `dropwatch serve`: scheduler plus HTTP API.

use anyhow::{anyhow, Result};
use clap::Args;
use console::style;
use serde::Serialize;
use std::sync::Arc;

use crate::adapters::http::StatusHttpServer;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::AppContext;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Host to bind to (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides server.port)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Skip the check normally run at startup
    #[arg(long)]
    pub no_startup_check: bool,
}

impl ServeArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.no_startup_check {
            config.schedule.run_on_startup = false;
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ServeBanner {
    pub listen: String,
    pub interval_secs: u64,
    pub sources: Vec<String>,
    pub push_enabled: bool,
    pub trigger_enabled: bool,
}

impl CommandOutput for ServeBanner {
    fn to_human(&self) -> String {
        let yes_no = |on: bool| if on { style("on").green() } else { style("off").dim() };
        [
            format!("{} listening on http://{}", style("dropwatch").bold().cyan(), self.listen),
            format!("  checking every {}s: {}", self.interval_secs, self.sources.join(", ")),
            format!("  push notifications: {}", yes_no(self.push_enabled)),
            format!("  POST /trigger: {}", yes_no(self.trigger_enabled)),
        ]
        .join("\n")
    }
}

pub async fn execute(args: ServeArgs, mut config: Config, json_mode: bool) -> Result<()> {
    args.apply(&mut config);

    let context = AppContext::build(config).await?;
    let state = context.http_state();
    let server = StatusHttpServer::new(context.config.server.clone(), state);

    let banner = ServeBanner {
        listen: server.addr()?.to_string(),
        interval_secs: context.config.schedule.interval_secs,
        sources: context
            .aggregator
            .adapter_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
        push_enabled: context.notifier.push_enabled(),
        trigger_enabled: context
            .config
            .server
            .trigger_token
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty()),
    };
    output(&banner, json_mode);

    let scheduler = Arc::clone(&context.scheduler).spawn();

    let served = server.serve_with_shutdown(shutdown_signal()).await;

    scheduler.shutdown().await;
    // An announcement started just before shutdown is allowed to finish.
    context.scheduler.wait_for_notifications().await;

    served.map_err(|e| anyhow!("HTTP server failed: {e}"))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        return;
    }
    tracing::info!("shutdown requested");
}
