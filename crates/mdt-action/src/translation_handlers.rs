//! `extract` and `compose` handlers.
//!
//! Both handlers mutate the same checked-out working tree, so each holds the
//! workspace lock for its whole body while the executor still starts them
//! together.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use mdt_commands::command::{Command, CommandName, ComposeParameters, ExtractParameters, PrNumber};
use mdt_commands::command_executor::CommandExecutor;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::git_client::{CommitOutcome, GitClient};
use crate::pr_checkout_client::PrCheckoutClient;
use crate::xliff_client::XliffClient;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Summary of one executed command.
pub struct HandlerOutcome {
    pub command: CommandName,
    pub pr: PrNumber,
    pub input: String,
    pub output: String,
    pub commit: CommitOutcome,
}

pub struct TranslationHandlers {
    checkout: PrCheckoutClient,
    git: GitClient,
    xliff: XliffClient,
    workspace_lock: Mutex<()>,
}

impl TranslationHandlers {
    pub fn new(checkout: PrCheckoutClient, git: GitClient, xliff: XliffClient) -> Self {
        Self {
            checkout,
            git,
            xliff,
            workspace_lock: Mutex::new(()),
        }
    }

    /// Registers a handler for every supported command name.
    pub fn register(self: Arc<Self>, executor: &mut CommandExecutor<HandlerOutcome>) {
        for name in CommandName::ALL {
            let handlers = self.clone();
            executor.add_handler(name, move |command| {
                let handlers = handlers.clone();
                async move { handlers.handle(command).await }
            });
        }
    }

    pub async fn handle(&self, command: Command) -> Result<HandlerOutcome> {
        match command {
            Command::Extract(parameters) => self.extract(parameters).await,
            Command::Compose(parameters) => self.compose(parameters).await,
        }
    }

    async fn extract(&self, parameters: ExtractParameters) -> Result<HandlerOutcome> {
        let pr = require_pr(CommandName::Extract, parameters.pr)?;
        let _workspace = self.workspace_lock.lock().await;
        tracing::info!(
            pr,
            input = %parameters.input,
            output = %parameters.output,
            "running extract"
        );
        self.checkout.checkout_pr(pr).await?;
        self.xliff
            .extract(
                &parameters.input,
                &parameters.output,
                parameters.source_locale.as_deref(),
                parameters.target_locale.as_deref(),
            )
            .await?;
        let commit = self
            .publish(CommandName::Extract, &parameters.input, &parameters.output)
            .await?;
        Ok(HandlerOutcome {
            command: CommandName::Extract,
            pr,
            input: parameters.input,
            output: parameters.output,
            commit,
        })
    }

    async fn compose(&self, parameters: ComposeParameters) -> Result<HandlerOutcome> {
        let pr = require_pr(CommandName::Compose, parameters.pr)?;
        let _workspace = self.workspace_lock.lock().await;
        tracing::info!(
            pr,
            input = %parameters.input,
            output = %parameters.output,
            "running compose"
        );
        self.checkout.checkout_pr(pr).await?;
        self.xliff
            .compose(&parameters.input, &parameters.output)
            .await?;
        let commit = self
            .publish(CommandName::Compose, &parameters.input, &parameters.output)
            .await?;
        Ok(HandlerOutcome {
            command: CommandName::Compose,
            pr,
            input: parameters.input,
            output: parameters.output,
            commit,
        })
    }

    async fn publish(&self, name: CommandName, input: &str, output: &str) -> Result<CommitOutcome> {
        self.git.add(output).await?;
        let commit = self
            .git
            .commit(&format!("markdown-translation: {name} {input} -> {output}"))
            .await?;
        if commit == CommitOutcome::Committed {
            self.git.push(None, None).await?;
        }
        Ok(commit)
    }
}

fn require_pr(name: CommandName, pr: Option<PrNumber>) -> Result<PrNumber> {
    pr.ok_or_else(|| anyhow!("{name} command is missing the pull request number"))
}
