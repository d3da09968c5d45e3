//! `dropwatch check`: one aggregate run, printed.

use anyhow::Result;
use chrono::Utc;
use clap::Args;
use serde::Serialize;

use crate::cli::output::{create_spinner_with_message, output, CommandOutput, ProgressBarExt, TableFormatter};
use crate::domain::models::{CheckResult, Config, NotifySummary, StatusSnapshot};
use crate::infrastructure::AppContext;
use crate::services::aggregator::reduce;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Show every source's own result
    #[arg(long)]
    pub per_source: bool,

    /// Send the announcement if the target is found
    #[arg(long)]
    pub notify: bool,
}

#[derive(Debug, Serialize)]
pub struct SourceRow {
    pub adapter: String,
    #[serde(flatten)]
    pub result: CheckResult,
}

#[derive(Debug, Serialize)]
pub struct CheckOutput {
    #[serde(flatten)]
    pub snapshot: StatusSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<SourceRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<NotifySummary>,
}

impl CommandOutput for CheckOutput {
    fn to_human(&self) -> String {
        let formatter = TableFormatter::new();
        let mut sections = vec![formatter.format_snapshot(&self.snapshot)];

        if let Some(sources) = &self.sources {
            let rows: Vec<(String, CheckResult)> = sources
                .iter()
                .map(|row| (row.adapter.clone(), row.result.clone()))
                .collect();
            sections.push(formatter.format_sources(&rows));
        }

        if let Some(summary) = &self.notification {
            let mut line = String::from("Announcement sent.");
            if let Some(push) = summary.push {
                line.push_str(&format!(
                    " Push: {} sent, {} failed, {} removed.",
                    push.sent, push.failed, push.removed
                ));
            }
            if let Some(delivered) = summary.topic_delivered {
                line.push_str(if delivered { " Topic: delivered." } else { " Topic: failed." });
            }
            sections.push(line);
        }

        sections.join("\n\n")
    }
}

pub async fn execute(args: CheckArgs, config: Config, json_mode: bool) -> Result<()> {
    let context = AppContext::build(config).await?;

    let spinner = create_spinner_with_message(
        format!("Checking {} sources...", context.aggregator.adapter_names().len()),
        json_mode,
    );

    let (result, sources) = if args.per_source {
        let rows = context.aggregator.check_each().await;
        let result = reduce(rows.iter().map(|(_, r)| r.clone()));
        let rows = rows
            .into_iter()
            .map(|(adapter, result)| SourceRow { adapter, result })
            .collect();
        (result, Some(rows))
    } else {
        (context.aggregator.check_all_sources().await, None)
    };

    if result.found {
        spinner.finish_success("Target found");
    } else {
        spinner.finish_warning("Target not found");
    }

    let notification = if args.notify && result.found {
        context
            .notifier
            .notify_target_dropped(result.model.as_deref(), result.source.as_deref())
            .await
    } else {
        None
    };

    let out = CheckOutput {
        snapshot: StatusSnapshot::from_result(result, Utc::now()),
        sources,
        notification,
    };
    output(&out, json_mode);
    Ok(())
}
