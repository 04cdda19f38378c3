use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use mdt_commands::github_transport_helpers::truncate_for_error;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// External program invocation: program, arguments and extra child environment.
pub struct ProcessSpec {
    pub program: String,
    pub args: Vec<String>,
    pub envs: Vec<(String, String)>,
}

impl ProcessSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Command line for logs and errors; environment values are never rendered.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

#[async_trait]
/// Runs external programs; implementations must not go through a shell.
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, spec: &ProcessSpec) -> Result<ProcessOutput>;
}

/// Runs `spec` and fails unless the process exits with status 0.
pub async fn run_checked(runner: &dyn ProcessRunner, spec: &ProcessSpec) -> Result<ProcessOutput> {
    let output = runner.run(spec).await?;
    ensure_success(spec, output)
}

/// Converts a non-zero exit into an error carrying the command line and stderr.
pub fn ensure_success(spec: &ProcessSpec, output: ProcessOutput) -> Result<ProcessOutput> {
    if !output.success() {
        bail!(
            "`{}` failed with exit code {}: {}",
            spec.command_line(),
            output
                .exit_code
                .map(|code| code.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            truncate_for_error(output.stderr.trim(), 600)
        );
    }
    Ok(output)
}

#[derive(Debug, Clone, Default)]
pub struct TokioProcessRunner {
    working_dir: Option<PathBuf>,
}

impl TokioProcessRunner {
    pub fn new(working_dir: Option<PathBuf>) -> Self {
        Self { working_dir }
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, spec: &ProcessSpec) -> Result<ProcessOutput> {
        tracing::info!(command = %spec.command_line(), "running process");
        let mut command = tokio::process::Command::new(&spec.program);
        command.args(&spec.args);
        command.envs(spec.envs.iter().map(|(key, value)| (key, value)));
        if let Some(working_dir) = self.working_dir.as_ref() {
            command.current_dir(working_dir);
        }
        command.stdin(Stdio::null());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());
        let output = command
            .output()
            .await
            .with_context(|| format!("failed to execute `{}`", spec.command_line()))?;
        let output = ProcessOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };
        tracing::debug!(
            command = %spec.command_line(),
            exit_code = ?output.exit_code,
            "process finished"
        );
        Ok(output)
    }
}
