//! GitHub Action runtime for markdown-translation pull-request commands.
//!
//! Wires the comment command language to its collaborators: the GitHub REST
//! API, `gh` pull-request checkout, `git`, and the `yfm` xliff converter.

pub mod action;
pub mod authorization_gate;
pub mod git_client;
pub mod github_api_client;
pub mod pr_checkout_client;
pub mod process_runner;
pub mod translation_handlers;
pub mod xliff_client;

pub use action::{
    build_translation_action, Action, ActionConfig, ActionContext, ActionError, ActionOutcome,
    IgnoredReason,
};
pub use github_api_client::{GithubApi, GithubApiClient, GithubCommentCreateResponse};
pub use process_runner::{ProcessOutput, ProcessRunner, ProcessSpec, TokioProcessRunner};
pub use translation_handlers::{HandlerOutcome, TranslationHandlers};

#[cfg(test)]
mod test_support;
