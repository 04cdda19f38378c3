use std::sync::Arc;

use anyhow::{bail, Result};
use mdt_commands::usage::{DEFAULT_SOURCE_LOCALE, DEFAULT_TARGET_LOCALE};
use tokio::sync::OnceCell;

use crate::process_runner::{run_checked, ProcessRunner, ProcessSpec};

pub const DOCS_TOOL_PACKAGE: &str = "@doc-tools/docs";

/// Converts between markdown and xliff/skeleton pairs with the `yfm` CLI.
pub struct XliffClient {
    runner: Arc<dyn ProcessRunner>,
    install_tool: bool,
    source_locale: String,
    target_locale: String,
    installed: OnceCell<()>,
}

impl XliffClient {
    pub fn new(runner: Arc<dyn ProcessRunner>, install_tool: bool) -> Self {
        Self {
            runner,
            install_tool,
            source_locale: DEFAULT_SOURCE_LOCALE.to_string(),
            target_locale: DEFAULT_TARGET_LOCALE.to_string(),
            installed: OnceCell::new(),
        }
    }

    pub fn with_default_locales(
        mut self,
        source_locale: impl Into<String>,
        target_locale: impl Into<String>,
    ) -> Self {
        self.source_locale = source_locale.into();
        self.target_locale = target_locale.into();
        self
    }

    async fn ensure_installed(&self) -> Result<()> {
        if !self.install_tool {
            return Ok(());
        }
        self.installed
            .get_or_try_init(|| async {
                run_checked(
                    self.runner.as_ref(),
                    &ProcessSpec::new("npm").args(["install", DOCS_TOOL_PACKAGE, "-g"]),
                )
                .await?;
                Ok::<(), anyhow::Error>(())
            })
            .await?;
        Ok(())
    }

    pub async fn extract(
        &self,
        input: &str,
        output: &str,
        source_locale: Option<&str>,
        target_locale: Option<&str>,
    ) -> Result<()> {
        ensure_paths(input, output)?;
        self.ensure_installed().await?;
        let source_locale = source_locale
            .filter(|locale| !locale.is_empty())
            .unwrap_or(self.source_locale.as_str());
        let target_locale = target_locale
            .filter(|locale| !locale.is_empty())
            .unwrap_or(self.target_locale.as_str());
        let spec = ProcessSpec::new("yfm").args([
            "xliff",
            "extract",
            "--input",
            input,
            "--output",
            output,
            "--sll",
            source_locale,
            "--tll",
            target_locale,
        ]);
        run_checked(self.runner.as_ref(), &spec).await?;
        Ok(())
    }

    pub async fn compose(&self, input: &str, output: &str) -> Result<()> {
        ensure_paths(input, output)?;
        self.ensure_installed().await?;
        let spec = ProcessSpec::new("yfm").args([
            "xliff", "compose", "--input", input, "--output", output,
        ]);
        run_checked(self.runner.as_ref(), &spec).await?;
        Ok(())
    }
}

fn ensure_paths(input: &str, output: &str) -> Result<()> {
    if input.trim().is_empty() || output.trim().is_empty() {
        bail!("specify input and output");
    }
    Ok(())
}
