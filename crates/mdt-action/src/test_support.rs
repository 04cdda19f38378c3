use std::sync::Mutex;

use async_trait::async_trait;
use mdt_commands::authorization::PermissionLevel;
use mdt_commands::event_payload::RepoRef;

use crate::github_api_client::{GithubApi, GithubCommentCreateResponse};
use crate::process_runner::{ProcessOutput, ProcessRunner, ProcessSpec};

#[derive(Default)]
/// Records every invocation and answers with scripted outputs.
pub(crate) struct RecordingRunner {
    specs: Mutex<Vec<ProcessSpec>>,
    scripted: Mutex<Vec<(String, ProcessOutput)>>,
}

impl RecordingRunner {
    /// Answers invocations whose command line starts with `prefix` with `output`.
    pub(crate) fn script(&self, prefix: &str, output: ProcessOutput) {
        self.scripted
            .lock()
            .expect("scripted lock")
            .push((prefix.to_string(), output));
    }

    pub(crate) fn specs(&self) -> Vec<ProcessSpec> {
        self.specs.lock().expect("specs lock").clone()
    }

    pub(crate) fn command_lines(&self) -> Vec<String> {
        self.specs()
            .iter()
            .map(ProcessSpec::command_line)
            .collect()
    }
}

pub(crate) fn failed_output(exit_code: i32, stdout: &str, stderr: &str) -> ProcessOutput {
    ProcessOutput {
        exit_code: Some(exit_code),
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
    }
}

#[async_trait]
impl ProcessRunner for RecordingRunner {
    async fn run(&self, spec: &ProcessSpec) -> anyhow::Result<ProcessOutput> {
        self.specs.lock().expect("specs lock").push(spec.clone());
        let command_line = spec.command_line();
        let scripted = self
            .scripted
            .lock()
            .expect("scripted lock")
            .iter()
            .find(|(prefix, _)| command_line.starts_with(prefix.as_str()))
            .map(|(_, output)| output.clone());
        Ok(scripted.unwrap_or(ProcessOutput {
            exit_code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
        }))
    }
}

/// In-memory GitHub API: fixed permission, recorded lookups and comments.
pub(crate) struct FakeGithub {
    permission: PermissionLevel,
    permission_lookups: Mutex<Vec<String>>,
    comments: Mutex<Vec<(u64, String)>>,
}

impl FakeGithub {
    pub(crate) fn new(permission: PermissionLevel) -> Self {
        Self {
            permission,
            permission_lookups: Mutex::new(Vec::new()),
            comments: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn lookup_count(&self) -> usize {
        self.permission_lookups.lock().expect("lookups lock").len()
    }

    pub(crate) fn comments(&self) -> Vec<(u64, String)> {
        self.comments.lock().expect("comments lock").clone()
    }
}

#[async_trait]
impl GithubApi for FakeGithub {
    async fn collaborator_permission(
        &self,
        _repo: &RepoRef,
        username: &str,
    ) -> anyhow::Result<PermissionLevel> {
        self.permission_lookups
            .lock()
            .expect("lookups lock")
            .push(username.to_string());
        Ok(self.permission)
    }

    async fn create_issue_comment(
        &self,
        _repo: &RepoRef,
        issue_number: u64,
        body: &str,
    ) -> anyhow::Result<GithubCommentCreateResponse> {
        let mut comments = self.comments.lock().expect("comments lock");
        comments.push((issue_number, body.to_string()));
        Ok(GithubCommentCreateResponse {
            id: comments.len() as u64,
            html_url: None,
        })
    }
}
