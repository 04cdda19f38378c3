use std::sync::Arc;

use anyhow::{bail, Result};

use crate::process_runner::{run_checked, ProcessRunner, ProcessSpec};

/// Checks out pull-request branches with the GitHub CLI.
///
/// The token is handed to the `gh` child process only.
pub struct PrCheckoutClient {
    runner: Arc<dyn ProcessRunner>,
    token: Option<String>,
}

impl PrCheckoutClient {
    pub fn new(runner: Arc<dyn ProcessRunner>, token: Option<String>) -> Self {
        Self {
            runner,
            token: token.filter(|token| !token.trim().is_empty()),
        }
    }

    pub async fn checkout_pr(&self, pr_number: u64) -> Result<()> {
        if pr_number == 0 {
            bail!("specify pr number");
        }
        let mut spec = ProcessSpec::new("gh").args(["pr", "checkout"]).arg(pr_number.to_string());
        if let Some(token) = self.token.as_ref() {
            spec = spec.env("GH_TOKEN", token.trim());
        }
        run_checked(self.runner.as_ref(), &spec).await?;
        Ok(())
    }
}
