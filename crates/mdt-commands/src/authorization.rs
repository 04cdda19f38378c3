//! Two-factor authorization policy for comment-triggered commands.
//!
//! A commenter is permitted only when the actor's repository permission and
//! the comment author's association both belong to their allow-sets.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Repository collaborator permission tier as reported by the GitHub API.
pub enum PermissionLevel {
    Admin,
    Maintain,
    Write,
    Triage,
    Read,
    None,
    #[serde(other)]
    Unknown,
}

impl PermissionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Maintain => "maintain",
            Self::Write => "write",
            Self::Triage => "triage",
            Self::Read => "read",
            Self::None => "none",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
/// Relationship of a comment author to the repository.
pub enum AuthorAssociation {
    Owner,
    Member,
    Collaborator,
    Contributor,
    FirstTimeContributor,
    FirstTimer,
    Mannequin,
    None,
    #[serde(other)]
    Unknown,
}

impl AuthorAssociation {
    const KNOWN: [AuthorAssociation; 8] = [
        Self::Owner,
        Self::Member,
        Self::Collaborator,
        Self::Contributor,
        Self::FirstTimeContributor,
        Self::FirstTimer,
        Self::Mannequin,
        Self::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "OWNER",
            Self::Member => "MEMBER",
            Self::Collaborator => "COLLABORATOR",
            Self::Contributor => "CONTRIBUTOR",
            Self::FirstTimeContributor => "FIRST_TIME_CONTRIBUTOR",
            Self::FirstTimer => "FIRST_TIMER",
            Self::Mannequin => "MANNEQUIN",
            Self::None => "NONE",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Case-insensitive lookup used for configuration values.
    pub fn from_config_value(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_uppercase();
        Self::KNOWN
            .into_iter()
            .find(|association| association.as_str() == normalized)
    }
}

impl fmt::Display for AuthorAssociation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Enumerates fatal configuration errors.
pub enum ConfigError {
    #[error("allowed associations must be a JSON array of strings, got '{raw}': {message}")]
    MalformedAssociations { raw: String, message: String },
    #[error("unknown comment author association '{value}'")]
    UnknownAssociation { value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Enumerates authorization rejections; each aborts the comment run.
pub enum AuthorizationError {
    #[error("user '{actor}' has '{permission}' permission; one of [{allowed}] is required")]
    InsufficientPermission {
        actor: String,
        permission: PermissionLevel,
        allowed: String,
    },
    #[error("comment author association '{association}' is not allowed; expected one of [{allowed}]")]
    AssociationNotAllowed {
        association: AuthorAssociation,
        allowed: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Outcome of evaluating both authorization factors.
pub struct AuthorizationDecision {
    pub permission: PermissionLevel,
    pub association: AuthorAssociation,
    pub permission_allowed: bool,
    pub association_allowed: bool,
}

impl AuthorizationDecision {
    pub fn is_permitted(&self) -> bool {
        self.permission_allowed && self.association_allowed
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationPolicy {
    allowed_permissions: BTreeSet<PermissionLevel>,
    allowed_associations: BTreeSet<AuthorAssociation>,
}

impl Default for AuthorizationPolicy {
    fn default() -> Self {
        Self::new([AuthorAssociation::Owner])
    }
}

impl AuthorizationPolicy {
    pub const DEFAULT_PERMISSIONS: [PermissionLevel; 2] =
        [PermissionLevel::Admin, PermissionLevel::Write];

    pub fn new(associations: impl IntoIterator<Item = AuthorAssociation>) -> Self {
        Self {
            allowed_permissions: Self::DEFAULT_PERMISSIONS.into_iter().collect(),
            allowed_associations: associations.into_iter().collect(),
        }
    }

    /// Builds a policy from the JSON association list, e.g. `["OWNER","MEMBER"]`.
    /// A missing or blank value selects the `OWNER`-only default.
    pub fn from_associations_json(raw: Option<&str>) -> Result<Self, ConfigError> {
        let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Ok(Self::default());
        };
        let values = serde_json::from_str::<Vec<String>>(raw).map_err(|error| {
            ConfigError::MalformedAssociations {
                raw: raw.to_string(),
                message: error.to_string(),
            }
        })?;
        let associations = values
            .iter()
            .map(|value| {
                AuthorAssociation::from_config_value(value).ok_or_else(|| {
                    ConfigError::UnknownAssociation {
                        value: value.clone(),
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if associations.is_empty() {
            tracing::warn!("allowed associations list is empty; every comment will be rejected");
        }
        Ok(Self::new(associations))
    }

    pub fn allowed_permissions(&self) -> impl Iterator<Item = PermissionLevel> + '_ {
        self.allowed_permissions.iter().copied()
    }

    pub fn allowed_associations(&self) -> impl Iterator<Item = AuthorAssociation> + '_ {
        self.allowed_associations.iter().copied()
    }

    pub fn evaluate(
        &self,
        permission: PermissionLevel,
        association: AuthorAssociation,
    ) -> AuthorizationDecision {
        AuthorizationDecision {
            permission,
            association,
            permission_allowed: self.allowed_permissions.contains(&permission),
            association_allowed: self.allowed_associations.contains(&association),
        }
    }

    /// Converts a decision into the error reported to the user. The
    /// permission factor is reported first when both fail.
    pub fn enforce(
        &self,
        actor: &str,
        decision: &AuthorizationDecision,
    ) -> Result<(), AuthorizationError> {
        if !decision.permission_allowed {
            return Err(AuthorizationError::InsufficientPermission {
                actor: actor.to_string(),
                permission: decision.permission,
                allowed: join_labels(self.allowed_permissions().map(|level| level.as_str())),
            });
        }
        if !decision.association_allowed {
            return Err(AuthorizationError::AssociationNotAllowed {
                association: decision.association,
                allowed: join_labels(self.allowed_associations().map(|value| value.as_str())),
            });
        }
        Ok(())
    }
}

fn join_labels<'a>(labels: impl Iterator<Item = &'a str>) -> String {
    labels.collect::<Vec<_>>().join(", ")
}
