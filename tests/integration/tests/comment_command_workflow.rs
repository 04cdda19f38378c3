use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use httpmock::prelude::*;
use mdt_action::{
    build_translation_action, ActionConfig, ActionContext, ActionOutcome, IgnoredReason,
    ProcessOutput, ProcessRunner, ProcessSpec,
};
use mdt_commands::{AuthorizationError, AuthorizationPolicy, CommandName, EventPayload, RepoRef};
use serde_json::json;

#[derive(Default)]
struct ScriptedRunner {
    invocations: Mutex<Vec<ProcessSpec>>,
}

impl ScriptedRunner {
    fn command_lines(&self) -> Vec<String> {
        self.invocations
            .lock()
            .expect("invocations lock")
            .iter()
            .map(ProcessSpec::command_line)
            .collect()
    }
}

#[async_trait]
impl ProcessRunner for ScriptedRunner {
    async fn run(&self, spec: &ProcessSpec) -> anyhow::Result<ProcessOutput> {
        self.invocations
            .lock()
            .expect("invocations lock")
            .push(spec.clone());
        Ok(ProcessOutput {
            exit_code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}

fn config(base_url: &str, associations: Option<&str>) -> ActionConfig {
    ActionConfig {
        github_token: "test-token".to_string(),
        github_api_base: base_url.to_string(),
        policy: AuthorizationPolicy::from_associations_json(associations).expect("policy"),
        git_user_name: "bot".to_string(),
        git_user_email: "bot@example.com".to_string(),
        source_locale: "ru-RU".to_string(),
        target_locale: "en-US".to_string(),
        install_docs_tool: false,
        request_timeout_ms: 3_000,
        retry_max_attempts: 1,
        retry_base_delay_ms: 1,
    }
}

fn context(event_name: &str, payload: serde_json::Value) -> ActionContext {
    ActionContext {
        event_name: event_name.to_string(),
        repo: RepoRef::new("owner", "repo"),
        actor: "alice".to_string(),
        payload: serde_json::from_value::<EventPayload>(payload).expect("payload"),
    }
}

fn pr_comment(body: &str, association: &str) -> serde_json::Value {
    json!({
        "action": "created",
        "issue": { "number": 31, "pull_request": { "url": "https://example.test/pulls/31" } },
        "comment": { "id": 1, "body": body, "author_association": association },
        "repository": { "name": "repo", "owner": { "login": "owner" } }
    })
}

fn mock_permission<'a>(server: &'a MockServer, permission: &str) -> httpmock::Mock<'a> {
    let permission = permission.to_string();
    server.mock(move |when, then| {
        when.method(GET)
            .path("/repos/owner/repo/collaborators/alice/permission");
        then.status(200)
            .json_body(json!({ "permission": permission }));
    })
}

#[tokio::test]
async fn integration_pull_request_opened_posts_usage_comment() {
    let server = MockServer::start();
    let comment = server.mock(|when, then| {
        when.method(POST)
            .path("/repos/owner/repo/issues/12/comments")
            .body_includes("markdown-translation extract documentation documentation-xliff");
        then.status(201).json_body(json!({ "id": 77, "html_url": null }));
    });
    let runner = Arc::new(ScriptedRunner::default());
    let action = build_translation_action(&config(&server.base_url(), None), runner.clone())
        .expect("action");

    let outcome = action
        .run(&context(
            "pull_request",
            json!({
                "action": "opened",
                "pull_request": { "number": 12 },
                "repository": { "name": "repo", "owner": { "login": "owner" } }
            }),
        ))
        .await
        .expect("usage posted");

    assert_eq!(outcome, ActionOutcome::UsagePosted { pr: 12, comment_id: 77 });
    comment.assert();
    assert!(runner.command_lines().is_empty());
}

#[tokio::test]
async fn integration_authorized_comment_runs_extract_and_compose_for_the_pr() {
    let server = MockServer::start();
    let permission = mock_permission(&server, "admin");
    let runner = Arc::new(ScriptedRunner::default());
    let action = build_translation_action(&config(&server.base_url(), None), runner.clone())
        .expect("action");

    let body = "Translating the guide.\n\n\
markdown-translation extract docs docs-xliff\n\
markdown-translation compose docs-xliff docs-en\n";
    let outcome = action
        .run(&context("issue_comment", pr_comment(body, "OWNER")))
        .await
        .expect("executed");

    let ActionOutcome::Executed {
        pr,
        results,
        skipped_lines,
    } = outcome
    else {
        panic!("expected executed outcome");
    };
    assert_eq!(pr, 31);
    assert_eq!(skipped_lines, 1);
    assert_eq!(
        results
            .iter()
            .map(|outcome| (outcome.command, outcome.pr))
            .collect::<Vec<_>>(),
        vec![(CommandName::Extract, 31), (CommandName::Compose, 31)]
    );
    permission.assert_calls(1);

    let lines = runner.command_lines();
    assert!(lines.contains(
        &"yfm xliff extract --input docs --output docs-xliff --sll ru-RU --tll en-US".to_string()
    ));
    assert!(lines.contains(&"yfm xliff compose --input docs-xliff --output docs-en".to_string()));
    assert_eq!(
        lines
            .iter()
            .filter(|line| line.as_str() == "gh pr checkout 31")
            .count(),
        2
    );
}

#[tokio::test]
async fn integration_configured_association_allow_list_is_enforced() {
    let server = MockServer::start();
    let _permission = mock_permission(&server, "write");
    let runner = Arc::new(ScriptedRunner::default());

    let owner_only = build_translation_action(&config(&server.base_url(), None), runner.clone())
        .expect("action");
    let error = owner_only
        .run(&context(
            "issue_comment",
            pr_comment("markdown-translation extract docs out", "MEMBER"),
        ))
        .await
        .expect_err("member rejected by default policy");
    assert!(matches!(
        error.downcast_ref::<AuthorizationError>(),
        Some(AuthorizationError::AssociationNotAllowed { .. })
    ));
    assert!(runner.command_lines().is_empty());

    let members = build_translation_action(
        &config(&server.base_url(), Some(r#"["OWNER","MEMBER"]"#)),
        runner.clone(),
    )
    .expect("action");
    members
        .run(&context(
            "issue_comment",
            pr_comment("markdown-translation extract docs out", "MEMBER"),
        ))
        .await
        .expect("member allowed");
    assert!(runner
        .command_lines()
        .contains(&"gh pr checkout 31".to_string()));
}

#[tokio::test]
async fn integration_insufficient_permission_blocks_all_commands() {
    let server = MockServer::start();
    let _permission = mock_permission(&server, "read");
    let runner = Arc::new(ScriptedRunner::default());
    let action = build_translation_action(&config(&server.base_url(), None), runner.clone())
        .expect("action");

    let error = action
        .run(&context(
            "issue_comment",
            pr_comment(
                "markdown-translation extract a b\nmarkdown-translation compose c d",
                "OWNER",
            ),
        ))
        .await
        .expect_err("read permission rejected");
    assert!(matches!(
        error.downcast_ref::<AuthorizationError>(),
        Some(AuthorizationError::InsufficientPermission { .. })
    ));
    assert!(runner.command_lines().is_empty());
}

#[tokio::test]
async fn integration_plain_issue_comment_makes_no_api_calls() {
    let server = MockServer::start();
    let permission = mock_permission(&server, "admin");
    let runner = Arc::new(ScriptedRunner::default());
    let action = build_translation_action(&config(&server.base_url(), None), runner.clone())
        .expect("action");

    let outcome = action
        .run(&context(
            "issue_comment",
            json!({
                "issue": { "number": 3 },
                "comment": {
                    "body": "markdown-translation extract docs out",
                    "author_association": "OWNER"
                }
            }),
        ))
        .await
        .expect("no-op");
    assert_eq!(
        outcome,
        ActionOutcome::Ignored(IgnoredReason::NotAPullRequest { issue_number: 3 })
    );
    permission.assert_calls(0);
    assert!(runner.command_lines().is_empty());
}
