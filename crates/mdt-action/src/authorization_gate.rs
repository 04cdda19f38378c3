use anyhow::{Context, Result};
use mdt_commands::authorization::{AuthorAssociation, AuthorizationDecision, AuthorizationPolicy};
use mdt_commands::event_payload::RepoRef;

use crate::github_api_client::GithubApi;

/// Fetches the actor's permission and enforces both authorization factors.
///
/// Nothing is cached: every call performs a fresh permission lookup.
pub async fn authorize_comment(
    github: &dyn GithubApi,
    policy: &AuthorizationPolicy,
    repo: &RepoRef,
    actor: &str,
    association: AuthorAssociation,
) -> Result<AuthorizationDecision> {
    let permission = github
        .collaborator_permission(repo, actor)
        .await
        .with_context(|| format!("failed to resolve permission of '{actor}' on {repo}"))?;
    let decision = policy.evaluate(permission, association);
    tracing::info!(
        actor,
        permission = %permission,
        association = %association,
        permitted = decision.is_permitted(),
        "authorization evaluated"
    );
    policy.enforce(actor, &decision)?;
    Ok(decision)
}
