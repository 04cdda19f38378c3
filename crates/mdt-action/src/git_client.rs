use std::sync::Arc;

use anyhow::{bail, Result};
use serde::Serialize;
use tokio::sync::OnceCell;

use crate::process_runner::{ensure_success, run_checked, ProcessRunner, ProcessSpec};

pub const DEFAULT_GIT_USER_NAME: &str = "github-actions[bot]";
pub const DEFAULT_GIT_USER_EMAIL: &str = "41898282+github-actions[bot]@users.noreply.github.com";

const NOTHING_TO_COMMIT_MARKERS: [&str; 2] = ["nothing to commit", "nothing added to commit"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitOutcome {
    Committed,
    NothingToCommit,
}

/// Stages, commits and pushes through the `git` binary.
pub struct GitClient {
    runner: Arc<dyn ProcessRunner>,
    user_name: String,
    user_email: String,
    configured: OnceCell<()>,
}

impl GitClient {
    pub fn new(
        runner: Arc<dyn ProcessRunner>,
        user_name: impl Into<String>,
        user_email: impl Into<String>,
    ) -> Self {
        Self {
            runner,
            user_name: user_name.into(),
            user_email: user_email.into(),
            configured: OnceCell::new(),
        }
    }

    async fn ensure_configured(&self) -> Result<()> {
        self.configured
            .get_or_try_init(|| async {
                run_checked(
                    self.runner.as_ref(),
                    &ProcessSpec::new("git").args(["config", "user.name", self.user_name.as_str()]),
                )
                .await?;
                run_checked(
                    self.runner.as_ref(),
                    &ProcessSpec::new("git").args(["config", "user.email", self.user_email.as_str()]),
                )
                .await?;
                Ok::<(), anyhow::Error>(())
            })
            .await?;
        Ok(())
    }

    pub async fn add(&self, pattern: &str) -> Result<()> {
        if pattern.trim().is_empty() {
            bail!("specify files pattern");
        }
        self.ensure_configured().await?;
        run_checked(
            self.runner.as_ref(),
            &ProcessSpec::new("git").args(["add", "--", pattern]),
        )
        .await?;
        Ok(())
    }

    /// Commits staged changes. An empty change set is reported, not failed.
    pub async fn commit(&self, message: &str) -> Result<CommitOutcome> {
        if message.trim().is_empty() {
            bail!("specify commit message");
        }
        self.ensure_configured().await?;
        let spec = ProcessSpec::new("git").args(["commit", "-m", message]);
        let output = self.runner.run(&spec).await?;
        if output.success() {
            return Ok(CommitOutcome::Committed);
        }
        let combined = output.combined_output();
        if NOTHING_TO_COMMIT_MARKERS
            .iter()
            .any(|marker| combined.contains(marker))
        {
            tracing::info!("git commit skipped: nothing to commit");
            return Ok(CommitOutcome::NothingToCommit);
        }
        ensure_success(&spec, output)?;
        Ok(CommitOutcome::Committed)
    }

    /// Pushes to the tracked upstream, or to `remote refspec` when both are given.
    pub async fn push(&self, remote: Option<&str>, refspec: Option<&str>) -> Result<()> {
        self.ensure_configured().await?;
        let remote = remote.filter(|value| !value.is_empty());
        let refspec = refspec.filter(|value| !value.is_empty());
        let spec = match (remote, refspec) {
            (None, None) => ProcessSpec::new("git").arg("push"),
            (Some(remote), Some(refspec)) => {
                ProcessSpec::new("git").args(["push", remote, refspec])
            }
            _ => bail!("specify both remote and refspec"),
        };
        run_checked(self.runner.as_ref(), &spec).await?;
        Ok(())
    }
}
