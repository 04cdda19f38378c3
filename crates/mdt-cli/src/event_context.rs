use std::path::Path;

use anyhow::{anyhow, Context, Result};
use mdt_action::action::{ActionConfig, ActionContext};
use mdt_commands::authorization::AuthorizationPolicy;
use mdt_commands::event_payload::{EventPayload, RepoRef};

use crate::cli_args::Cli;

pub(crate) fn load_event_payload(path: &Path) -> Result<EventPayload> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read event payload {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse event payload {}", path.display()))
}

pub(crate) fn build_action_context(cli: &Cli) -> Result<ActionContext> {
    let repo = RepoRef::parse(&cli.repository).map_err(|error| anyhow!(error))?;
    Ok(ActionContext {
        event_name: cli.event_name.trim().to_string(),
        repo,
        actor: cli.actor.trim().to_string(),
        payload: load_event_payload(&cli.event_path)?,
    })
}

pub(crate) fn build_action_config(cli: &Cli) -> Result<ActionConfig> {
    let policy = AuthorizationPolicy::from_associations_json(cli.allowed_associations.as_deref())
        .context("invalid allowed associations configuration")?;
    Ok(ActionConfig {
        github_token: cli.github_token.clone(),
        github_api_base: cli.github_api_base.clone(),
        policy,
        git_user_name: cli.git_user_name.clone(),
        git_user_email: cli.git_user_email.clone(),
        source_locale: cli.source_locale.clone(),
        target_locale: cli.target_locale.clone(),
        install_docs_tool: cli.install_docs_tool,
        request_timeout_ms: cli.request_timeout_ms,
        retry_max_attempts: cli.retry_max_attempts,
        retry_base_delay_ms: cli.retry_base_delay_ms,
    })
}
