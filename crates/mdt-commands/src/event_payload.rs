use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::authorization::AuthorAssociation;

pub const PULL_REQUEST_EVENT: &str = "pull_request";
pub const ISSUE_COMMENT_EVENT: &str = "issue_comment";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Enumerates the workflow trigger events the action reacts to.
pub enum TriggerEvent {
    PullRequest,
    IssueComment,
    Unsupported(String),
}

impl TriggerEvent {
    pub fn from_event_name(event_name: &str) -> Self {
        match event_name {
            PULL_REQUEST_EVENT => Self::PullRequest,
            ISSUE_COMMENT_EVENT => Self::IssueComment,
            other => Self::Unsupported(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Repository coordinates in `owner/name` form.
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        let (owner, name) = trimmed
            .split_once('/')
            .ok_or_else(|| format!("invalid repository '{raw}', expected owner/repo"))?;
        let owner = owner.trim();
        let name = name.trim();
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(format!("invalid repository '{raw}', expected owner/repo"));
        }
        Ok(Self::new(owner, name))
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GithubUser {
    pub login: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GithubRepository {
    pub name: String,
    pub owner: GithubUser,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl GithubRepository {
    pub fn repo_ref(&self) -> RepoRef {
        RepoRef::new(self.owner.login.clone(), self.name.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GithubPullRequest {
    pub number: u64,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GithubIssue {
    pub number: u64,
    #[serde(default)]
    pub title: Option<String>,
    /// Present only when the issue is a pull request.
    #[serde(default)]
    pub pull_request: Option<Value>,
}

impl GithubIssue {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request
            .as_ref()
            .is_some_and(|value| !value.is_null())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GithubIssueComment {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub body: Option<String>,
    pub author_association: AuthorAssociation,
    #[serde(default)]
    pub user: Option<GithubUser>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
/// Subset of a GitHub webhook payload consumed by the action.
pub struct EventPayload {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub repository: Option<GithubRepository>,
    #[serde(default)]
    pub pull_request: Option<GithubPullRequest>,
    #[serde(default)]
    pub issue: Option<GithubIssue>,
    #[serde(default)]
    pub comment: Option<GithubIssueComment>,
}
