use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use futures_util::future::{try_join_all, BoxFuture};
use thiserror::Error;

use crate::command::{Command, CommandName};

/// Asynchronous handler bound to one command name.
pub type CommandHandler<R> = Arc<dyn Fn(Command) -> BoxFuture<'static, Result<R>> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Enumerates registry construction problems.
pub enum RegistryError {
    #[error("no handler registered for command(s): {}", render_command_names(.missing))]
    MissingHandlers { missing: Vec<CommandName> },
}

fn render_command_names(names: &[CommandName]) -> String {
    names
        .iter()
        .map(CommandName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Dispatch table from command name to handler.
pub struct CommandExecutor<R> {
    handlers: BTreeMap<CommandName, CommandHandler<R>>,
}

impl<R> Default for CommandExecutor<R> {
    fn default() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }
}

impl<R> std::fmt::Debug for CommandExecutor<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandExecutor")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<R: Send + 'static> CommandExecutor<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `name`; a later registration replaces an earlier one.
    pub fn add_handler<F, Fut>(&mut self, name: CommandName, handler: F) -> &mut Self
    where
        F: Fn(Command) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R>> + Send + 'static,
    {
        let handler: CommandHandler<R> =
            Arc::new(move |command| -> BoxFuture<'static, Result<R>> { Box::pin(handler(command)) });
        if self.handlers.insert(name, handler).is_some() {
            tracing::debug!(command = name.as_str(), "replaced command handler");
        }
        self
    }

    pub fn registered_names(&self) -> Vec<CommandName> {
        self.handlers.keys().copied().collect()
    }

    pub fn missing_handlers(&self) -> Vec<CommandName> {
        CommandName::ALL
            .into_iter()
            .filter(|name| !self.handlers.contains_key(name))
            .collect()
    }

    /// Fails when any supported command name has no registered handler.
    pub fn ensure_complete(&self) -> std::result::Result<(), RegistryError> {
        let missing = self.missing_handlers();
        if missing.is_empty() {
            return Ok(());
        }
        Err(RegistryError::MissingHandlers { missing })
    }

    /// Runs every command with a registered handler concurrently.
    ///
    /// Commands without a handler are dropped. Results follow the order of the
    /// dispatched commands. The first handler failure fails the whole batch and
    /// the remaining handlers are abandoned.
    pub async fn execute(&self, commands: Vec<Command>) -> Result<Vec<R>> {
        let mut dispatched = Vec::with_capacity(commands.len());
        for command in commands {
            let name = command.name();
            match self.handlers.get(&name) {
                Some(handler) => {
                    tracing::debug!(command = name.as_str(), "dispatching command");
                    dispatched.push(handler(command));
                }
                None => {
                    tracing::debug!(
                        command = name.as_str(),
                        "dropping command without registered handler"
                    );
                }
            }
        }
        try_join_all(dispatched).await
    }
}
