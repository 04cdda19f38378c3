use std::fmt;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use mdt_commands::authorization::PermissionLevel;
use mdt_commands::event_payload::RepoRef;
use mdt_commands::github_transport_helpers::{
    is_retryable_github_status, is_retryable_transport_error, parse_retry_after, retry_delay,
    truncate_for_error,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

const ACTION_USER_AGENT: &str = "markdown-translation-action";
const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";
const ERROR_BODY_MAX_CHARS: usize = 800;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GithubCommentCreateResponse {
    pub id: u64,
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct CollaboratorPermissionResponse {
    permission: PermissionLevel,
}

#[async_trait]
/// GitHub operations the action depends on.
pub trait GithubApi: Send + Sync {
    async fn collaborator_permission(
        &self,
        repo: &RepoRef,
        username: &str,
    ) -> Result<PermissionLevel>;

    async fn create_issue_comment(
        &self,
        repo: &RepoRef,
        issue_number: u64,
        body: &str,
    ) -> Result<GithubCommentCreateResponse>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GithubOperation {
    PermissionLookup,
    CommentCreation,
}

impl fmt::Display for GithubOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermissionLookup => f.write_str("collaborator permission lookup"),
            Self::CommentCreation => f.write_str("issue comment creation"),
        }
    }
}

fn github_headers(token: &str) -> Result<HeaderMap> {
    let mut authorization = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
        .context("github token is not a valid header value")?;
    authorization.set_sensitive(true);
    Ok(HeaderMap::from_iter([
        (USER_AGENT, HeaderValue::from_static(ACTION_USER_AGENT)),
        (ACCEPT, HeaderValue::from_static(GITHUB_MEDIA_TYPE)),
        (
            HeaderName::from_static("x-github-api-version"),
            HeaderValue::from_static(GITHUB_API_VERSION),
        ),
        (AUTHORIZATION, authorization),
    ]))
}

/// REST client for the permission lookup and the usage reply.
#[derive(Clone)]
pub struct GithubApiClient {
    http: reqwest::Client,
    api_base: String,
    retry_max_attempts: usize,
    retry_base_delay_ms: u64,
}

impl GithubApiClient {
    pub fn new(
        api_base: &str,
        token: &str,
        request_timeout_ms: u64,
        retry_max_attempts: usize,
        retry_base_delay_ms: u64,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .default_headers(github_headers(token)?)
            .timeout(Duration::from_millis(request_timeout_ms.max(1)))
            .build()
            .context("failed to build github http client")?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            retry_max_attempts: retry_max_attempts.max(1),
            retry_base_delay_ms: retry_base_delay_ms.max(1),
        })
    }

    fn repo_url(&self, repo: &RepoRef, path: &str) -> String {
        format!("{}/repos/{}/{}/{path}", self.api_base, repo.owner, repo.name)
    }

    /// Sends the request built by `request`, retrying rate limits, server
    /// errors and transient transport failures until attempts run out.
    async fn send<T, F>(&self, operation: GithubOperation, request: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut attempt = 0_usize;
        loop {
            attempt += 1;
            let exhausted = attempt >= self.retry_max_attempts;
            let retry_after = match request().send().await {
                Ok(response) if response.status().is_success() => {
                    return response
                        .json::<T>()
                        .await
                        .with_context(|| format!("failed to decode github {operation} response"));
                }
                Ok(response) => {
                    let status = response.status().as_u16();
                    let retry_after = parse_retry_after(response.headers());
                    if exhausted || !is_retryable_github_status(status) {
                        let body = response.text().await.unwrap_or_default();
                        bail!(
                            "github {operation} failed with status {status}: {}",
                            truncate_for_error(&body, ERROR_BODY_MAX_CHARS)
                        );
                    }
                    tracing::warn!(%operation, status, attempt, "github rejected request; retrying");
                    retry_after
                }
                Err(error) => {
                    if exhausted || !is_retryable_transport_error(&error) {
                        return Err(error)
                            .with_context(|| format!("github {operation} request failed"));
                    }
                    tracing::warn!(%operation, attempt, %error, "github request failed; retrying");
                    None
                }
            };
            tokio::time::sleep(retry_delay(self.retry_base_delay_ms, attempt, retry_after)).await;
        }
    }
}

#[async_trait]
impl GithubApi for GithubApiClient {
    async fn collaborator_permission(
        &self,
        repo: &RepoRef,
        username: &str,
    ) -> Result<PermissionLevel> {
        let url = self.repo_url(repo, &format!("collaborators/{username}/permission"));
        let response: CollaboratorPermissionResponse = self
            .send(GithubOperation::PermissionLookup, || self.http.get(&url))
            .await?;
        Ok(response.permission)
    }

    async fn create_issue_comment(
        &self,
        repo: &RepoRef,
        issue_number: u64,
        body: &str,
    ) -> Result<GithubCommentCreateResponse> {
        let url = self.repo_url(repo, &format!("issues/{issue_number}/comments"));
        let payload = json!({ "body": body });
        self.send(GithubOperation::CommentCreation, || {
            self.http.post(&url).json(&payload)
        })
        .await
    }
}
