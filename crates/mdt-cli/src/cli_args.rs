use std::fmt;
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use mdt_action::git_client::{DEFAULT_GIT_USER_EMAIL, DEFAULT_GIT_USER_NAME};
use mdt_commands::usage::{DEFAULT_SOURCE_LOCALE, DEFAULT_TARGET_LOCALE};

fn parse_positive_usize(value: &str) -> Result<usize, String> {
    let parsed = value
        .parse::<usize>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

#[derive(Parser)]
#[command(
    name = "markdown-translation",
    about = "Runs markdown-translation pull-request comment commands inside a GitHub workflow",
    version
)]
pub(crate) struct Cli {
    #[arg(
        long = "github-token",
        env = "GITHUB_TOKEN",
        hide_env_values = true,
        help = "GitHub token used for API access and pull-request checkout"
    )]
    pub(crate) github_token: String,

    #[arg(
        long = "allowed-associations",
        env = "MARKDOWN_TRANSLATION_ASSOCIATIONS",
        help = "JSON array of comment author associations allowed to run commands (default [\"OWNER\"])"
    )]
    pub(crate) allowed_associations: Option<String>,

    #[arg(
        long = "github-api-base",
        env = "GITHUB_API_URL",
        default_value = "https://api.github.com",
        help = "GitHub API base URL"
    )]
    pub(crate) github_api_base: String,

    #[arg(
        long = "event-name",
        env = "GITHUB_EVENT_NAME",
        help = "Name of the workflow event that triggered the run"
    )]
    pub(crate) event_name: String,

    #[arg(
        long = "event-path",
        env = "GITHUB_EVENT_PATH",
        help = "Path to the JSON webhook payload of the triggering event"
    )]
    pub(crate) event_path: PathBuf,

    #[arg(
        long = "repository",
        env = "GITHUB_REPOSITORY",
        help = "Repository in owner/repo format"
    )]
    pub(crate) repository: String,

    #[arg(
        long = "actor",
        env = "GITHUB_ACTOR",
        help = "Login of the user that triggered the workflow"
    )]
    pub(crate) actor: String,

    #[arg(
        long = "workspace",
        env = "GITHUB_WORKSPACE",
        help = "Working tree used for checkout, conversion and commits"
    )]
    pub(crate) workspace: Option<PathBuf>,

    #[arg(
        long = "git-user-name",
        env = "MARKDOWN_TRANSLATION_GIT_USER_NAME",
        default_value = DEFAULT_GIT_USER_NAME,
        help = "Committer name for translation commits"
    )]
    pub(crate) git_user_name: String,

    #[arg(
        long = "git-user-email",
        env = "MARKDOWN_TRANSLATION_GIT_USER_EMAIL",
        default_value = DEFAULT_GIT_USER_EMAIL,
        help = "Committer email for translation commits"
    )]
    pub(crate) git_user_email: String,

    #[arg(
        long = "source-locale",
        env = "MARKDOWN_TRANSLATION_SOURCE_LOCALE",
        default_value = DEFAULT_SOURCE_LOCALE,
        help = "Source language locale used by extract when the command omits it"
    )]
    pub(crate) source_locale: String,

    #[arg(
        long = "target-locale",
        env = "MARKDOWN_TRANSLATION_TARGET_LOCALE",
        default_value = DEFAULT_TARGET_LOCALE,
        help = "Target language locale used by extract when the command omits it"
    )]
    pub(crate) target_locale: String,

    #[arg(
        long = "install-docs-tool",
        env = "MARKDOWN_TRANSLATION_INSTALL_DOCS_TOOL",
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Install @doc-tools/docs globally with npm before the first conversion"
    )]
    pub(crate) install_docs_tool: bool,

    #[arg(
        long = "request-timeout-ms",
        env = "MARKDOWN_TRANSLATION_REQUEST_TIMEOUT_MS",
        default_value_t = 30_000,
        value_parser = parse_positive_u64,
        help = "Timeout for each GitHub API request in milliseconds"
    )]
    pub(crate) request_timeout_ms: u64,

    #[arg(
        long = "retry-max-attempts",
        env = "MARKDOWN_TRANSLATION_RETRY_MAX_ATTEMPTS",
        default_value_t = 3,
        value_parser = parse_positive_usize,
        help = "Maximum attempts for retryable GitHub API failures"
    )]
    pub(crate) retry_max_attempts: usize,

    #[arg(
        long = "retry-base-delay-ms",
        env = "MARKDOWN_TRANSLATION_RETRY_BASE_DELAY_MS",
        default_value_t = 500,
        value_parser = parse_positive_u64,
        help = "Base delay for exponential GitHub API retry backoff"
    )]
    pub(crate) retry_base_delay_ms: u64,

    #[arg(
        long = "log-level",
        env = "MARKDOWN_TRANSLATION_LOG_LEVEL",
        default_value = "info",
        help = "Default log level when RUST_LOG is unset"
    )]
    pub(crate) log_level: String,
}

impl fmt::Debug for Cli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cli")
            .field("github_token", &"<redacted>")
            .field("allowed_associations", &self.allowed_associations)
            .field("github_api_base", &self.github_api_base)
            .field("event_name", &self.event_name)
            .field("event_path", &self.event_path)
            .field("repository", &self.repository)
            .field("actor", &self.actor)
            .field("workspace", &self.workspace)
            .field("git_user_name", &self.git_user_name)
            .field("git_user_email", &self.git_user_email)
            .field("source_locale", &self.source_locale)
            .field("target_locale", &self.target_locale)
            .field("install_docs_tool", &self.install_docs_tool)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("retry_max_attempts", &self.retry_max_attempts)
            .field("retry_base_delay_ms", &self.retry_base_delay_ms)
            .field("log_level", &self.log_level)
            .finish()
    }
}
