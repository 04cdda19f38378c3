mod bootstrap_helpers;
mod cli_args;
mod event_context;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use mdt_action::action::{build_translation_action, ActionOutcome};
use mdt_action::process_runner::TokioProcessRunner;

use crate::bootstrap_helpers::{init_tracing, render_workflow_error};
use crate::cli_args::Cli;
use crate::event_context::{build_action_config, build_action_context};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(error = %format!("{error:#}"), "markdown-translation failed");
            eprintln!("{}", render_workflow_error(&error));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = build_action_config(&cli)?;
    let context = build_action_context(&cli)?;
    let runner = Arc::new(TokioProcessRunner::new(cli.workspace.clone()));
    let action = build_translation_action(&config, runner)?;

    match action.run(&context).await? {
        ActionOutcome::UsagePosted { pr, comment_id } => {
            tracing::info!(pr, comment_id, "usage reply posted");
        }
        ActionOutcome::Ignored(reason) => {
            tracing::info!(reason = ?reason, "nothing to do for this event");
        }
        ActionOutcome::Executed {
            pr,
            results,
            skipped_lines,
        } => {
            for outcome in &results {
                tracing::info!(
                    pr,
                    command = outcome.command.as_str(),
                    input = %outcome.input,
                    output = %outcome.output,
                    commit = ?outcome.commit,
                    "command completed"
                );
            }
            tracing::info!(pr, commands = results.len(), skipped_lines, "comment processed");
        }
    }
    Ok(())
}
