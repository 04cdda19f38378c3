//! Event routing for the markdown-translation action.
//!
//! `pull_request` events get a usage reply, `issue_comment` events on pull
//! requests are authorized, parsed and dispatched, anything else is a
//! workflow configuration error.

use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};
use mdt_commands::authorization::AuthorizationPolicy;
use mdt_commands::command::PrNumber;
use mdt_commands::command_executor::CommandExecutor;
use mdt_commands::command_parser::CommandParser;
use mdt_commands::event_payload::{EventPayload, RepoRef, TriggerEvent};
use mdt_commands::usage::render_usage;
use thiserror::Error;

use crate::authorization_gate::authorize_comment;
use crate::git_client::GitClient;
use crate::github_api_client::{GithubApi, GithubApiClient};
use crate::pr_checkout_client::PrCheckoutClient;
use crate::process_runner::ProcessRunner;
use crate::translation_handlers::{HandlerOutcome, TranslationHandlers};
use crate::xliff_client::XliffClient;

pub const ACTION_TRIGGER_USAGE: &str = "action intended to be ran on triggers:\n\
issue_comment(types:[created, edited]), pull_request(types:[opened])";

const PULL_REQUEST_OPENED_ACTION: &str = "opened";
const COMMENT_ACTIONS: [&str; 2] = ["created", "edited"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("{event_name} not implemented\n{}", ACTION_TRIGGER_USAGE)]
    UnsupportedEvent { event_name: String },
    #[error("issue_comment event payload is missing the comment")]
    MissingComment,
}

#[derive(Debug, Clone)]
/// Workflow context of one triggering event.
pub struct ActionContext {
    pub event_name: String,
    pub repo: RepoRef,
    pub actor: String,
    pub payload: EventPayload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Enumerates events that were recognized but required no work.
pub enum IgnoredReason {
    PullRequestAction { action: String },
    MissingPullRequestContext,
    CommentAction { action: String },
    MissingIssue,
    NotAPullRequest { issue_number: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome<R> {
    UsagePosted {
        pr: PrNumber,
        comment_id: u64,
    },
    Ignored(IgnoredReason),
    Executed {
        pr: PrNumber,
        results: Vec<R>,
        skipped_lines: usize,
    },
}

#[derive(Clone)]
/// Settings read once at startup.
pub struct ActionConfig {
    pub github_token: String,
    pub github_api_base: String,
    pub policy: AuthorizationPolicy,
    pub git_user_name: String,
    pub git_user_email: String,
    pub source_locale: String,
    pub target_locale: String,
    pub install_docs_tool: bool,
    pub request_timeout_ms: u64,
    pub retry_max_attempts: usize,
    pub retry_base_delay_ms: u64,
}

impl fmt::Debug for ActionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionConfig")
            .field("github_token", &"<redacted>")
            .field("github_api_base", &self.github_api_base)
            .field("policy", &self.policy)
            .field("git_user_name", &self.git_user_name)
            .field("git_user_email", &self.git_user_email)
            .field("source_locale", &self.source_locale)
            .field("target_locale", &self.target_locale)
            .field("install_docs_tool", &self.install_docs_tool)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("retry_max_attempts", &self.retry_max_attempts)
            .field("retry_base_delay_ms", &self.retry_base_delay_ms)
            .finish()
    }
}

pub struct Action<R> {
    github: Arc<dyn GithubApi>,
    policy: AuthorizationPolicy,
    parser: CommandParser,
    executor: CommandExecutor<R>,
}

impl<R: Send + 'static> Action<R> {
    /// Fails when `executor` lacks a handler for any supported command.
    pub fn new(
        github: Arc<dyn GithubApi>,
        policy: AuthorizationPolicy,
        executor: CommandExecutor<R>,
    ) -> Result<Self> {
        executor.ensure_complete()?;
        Ok(Self {
            github,
            policy,
            parser: CommandParser::default(),
            executor,
        })
    }

    pub fn with_parser(mut self, parser: CommandParser) -> Self {
        self.parser = parser;
        self
    }

    pub async fn run(&self, context: &ActionContext) -> Result<ActionOutcome<R>> {
        tracing::debug!(event = %context.event_name, repo = %context.repo, "triggered");
        match TriggerEvent::from_event_name(&context.event_name) {
            TriggerEvent::PullRequest => self.handle_pull_request(context).await,
            TriggerEvent::IssueComment => self.handle_issue_comment(context).await,
            TriggerEvent::Unsupported(event_name) => {
                Err(ActionError::UnsupportedEvent { event_name }.into())
            }
        }
    }

    async fn handle_pull_request(&self, context: &ActionContext) -> Result<ActionOutcome<R>> {
        let payload = &context.payload;
        if let Some(action) = payload.action.as_deref() {
            if action != PULL_REQUEST_OPENED_ACTION {
                tracing::debug!(action, "ignoring pull_request action");
                return Ok(ActionOutcome::Ignored(IgnoredReason::PullRequestAction {
                    action: action.to_string(),
                }));
            }
        }
        let (Some(repository), Some(pull_request)) =
            (payload.repository.as_ref(), payload.pull_request.as_ref())
        else {
            tracing::debug!("pull_request payload lacks repository or pull request");
            return Ok(ActionOutcome::Ignored(
                IgnoredReason::MissingPullRequestContext,
            ));
        };

        let repo = repository.repo_ref();
        let response = self
            .github
            .create_issue_comment(&repo, pull_request.number, &render_usage(self.parser.keyword()))
            .await
            .with_context(|| format!("failed to post usage on {repo}#{}", pull_request.number))?;
        tracing::info!(pr = pull_request.number, comment_id = response.id, "posted usage");
        Ok(ActionOutcome::UsagePosted {
            pr: pull_request.number,
            comment_id: response.id,
        })
    }

    async fn handle_issue_comment(&self, context: &ActionContext) -> Result<ActionOutcome<R>> {
        let payload = &context.payload;
        if let Some(action) = payload.action.as_deref() {
            if !COMMENT_ACTIONS.contains(&action) {
                tracing::debug!(action, "ignoring issue_comment action");
                return Ok(ActionOutcome::Ignored(IgnoredReason::CommentAction {
                    action: action.to_string(),
                }));
            }
        }
        let Some(issue) = payload.issue.as_ref() else {
            tracing::warn!("issue_comment payload lacks the issue");
            return Ok(ActionOutcome::Ignored(IgnoredReason::MissingIssue));
        };
        if !issue.is_pull_request() {
            tracing::info!(issue = issue.number, "comment is not on a pull request; skipping");
            return Ok(ActionOutcome::Ignored(IgnoredReason::NotAPullRequest {
                issue_number: issue.number,
            }));
        }
        let Some(comment) = payload.comment.as_ref() else {
            return Err(ActionError::MissingComment.into());
        };

        authorize_comment(
            self.github.as_ref(),
            &self.policy,
            &context.repo,
            &context.actor,
            comment.author_association,
        )
        .await?;

        let pr = issue.number;
        let report = self
            .parser
            .parse_with_report(comment.body.as_deref().unwrap_or_default());
        tracing::info!(
            pr,
            commands = report.commands.len(),
            skipped_lines = report.skipped_lines,
            rejected = report.rejections.len(),
            "parsed comment"
        );
        let commands = report
            .commands
            .into_iter()
            .map(|command| command.with_pr(pr))
            .collect::<Vec<_>>();
        for command in &commands {
            tracing::debug!(
                command = %command.name(),
                parameters = ?command.parameters(),
                "dispatching command"
            );
        }
        let results = self.executor.execute(commands).await?;
        Ok(ActionOutcome::Executed {
            pr,
            results,
            skipped_lines: report.skipped_lines,
        })
    }
}

/// Assembles the action with the real GitHub client and translation handlers.
pub fn build_translation_action(
    config: &ActionConfig,
    runner: Arc<dyn ProcessRunner>,
) -> Result<Action<HandlerOutcome>> {
    let github = GithubApiClient::new(
        &config.github_api_base,
        &config.github_token,
        config.request_timeout_ms,
        config.retry_max_attempts,
        config.retry_base_delay_ms,
    )?;
    let handlers = Arc::new(TranslationHandlers::new(
        PrCheckoutClient::new(runner.clone(), Some(config.github_token.clone())),
        GitClient::new(
            runner.clone(),
            config.git_user_name.clone(),
            config.git_user_email.clone(),
        ),
        XliffClient::new(runner, config.install_docs_tool)
            .with_default_locales(config.source_locale.clone(), config.target_locale.clone()),
    ));
    let mut executor = CommandExecutor::new();
    handlers.register(&mut executor);
    Action::new(Arc::new(github), config.policy.clone(), executor)
}
