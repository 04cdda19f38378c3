//! Comment command language for the markdown-translation pull-request bot.
//! This crate provides the command grammar, the dispatch registry, the
//! two-factor authorization policy, and the GitHub payload shapes consumed by
//! the action runtime.

pub mod authorization;
pub mod command;
pub mod command_executor;
pub mod command_parser;
pub mod event_payload;
pub mod github_transport_helpers;
pub mod usage;

pub use authorization::{
    AuthorizationDecision, AuthorizationError, AuthorizationPolicy, AuthorAssociation, ConfigError,
    PermissionLevel,
};
pub use command::{Command, CommandName, ComposeParameters, ExtractParameters, PrNumber};
pub use command_executor::{CommandExecutor, CommandHandler, RegistryError};
pub use command_parser::{CommandParser, CommandRejection, ParseReport, COMMAND_KEYWORD};
pub use event_payload::{EventPayload, RepoRef, TriggerEvent};
