use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Pull-request number injected into parsed commands by the action.
pub type PrNumber = u64;

pub const PARAMETER_PR: &str = "pr";
pub const PARAMETER_INPUT: &str = "input";
pub const PARAMETER_OUTPUT: &str = "output";
pub const PARAMETER_SOURCE_LOCALE: &str = "sll";
pub const PARAMETER_TARGET_LOCALE: &str = "tll";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Closed set of command names recognized after the comment keyword.
pub enum CommandName {
    Extract,
    Compose,
}

impl CommandName {
    pub const ALL: [CommandName; 2] = [CommandName::Extract, CommandName::Compose];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Extract => "extract",
            Self::Compose => "compose",
        }
    }

    /// Exact, case-sensitive match against the supported command tokens.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == token)
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Parameters of `extract`: markdown folder in, xliff/skeleton folder out.
pub struct ExtractParameters {
    pub pr: Option<PrNumber>,
    pub input: String,
    pub output: String,
    pub source_locale: Option<String>,
    pub target_locale: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Parameters of `compose`: xliff/skeleton folder in, markdown folder out.
pub struct ComposeParameters {
    pub pr: Option<PrNumber>,
    pub input: String,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", content = "parameters", rename_all = "lowercase")]
/// One command extracted from a single comment line.
pub enum Command {
    Extract(ExtractParameters),
    Compose(ComposeParameters),
}

impl Command {
    pub fn extract(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self::Extract(ExtractParameters {
            pr: None,
            input: input.into(),
            output: output.into(),
            source_locale: None,
            target_locale: None,
        })
    }

    pub fn compose(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self::Compose(ComposeParameters {
            pr: None,
            input: input.into(),
            output: output.into(),
        })
    }

    pub fn name(&self) -> CommandName {
        match self {
            Self::Extract(_) => CommandName::Extract,
            Self::Compose(_) => CommandName::Compose,
        }
    }

    pub fn input(&self) -> &str {
        match self {
            Self::Extract(parameters) => &parameters.input,
            Self::Compose(parameters) => &parameters.input,
        }
    }

    pub fn output(&self) -> &str {
        match self {
            Self::Extract(parameters) => &parameters.output,
            Self::Compose(parameters) => &parameters.output,
        }
    }

    pub fn pr(&self) -> Option<PrNumber> {
        match self {
            Self::Extract(parameters) => parameters.pr,
            Self::Compose(parameters) => parameters.pr,
        }
    }

    /// Returns the command with the pull-request number bound to it.
    pub fn with_pr(mut self, pr: PrNumber) -> Self {
        match &mut self {
            Self::Extract(parameters) => parameters.pr = Some(pr),
            Self::Compose(parameters) => parameters.pr = Some(pr),
        }
        self
    }

    /// Flat name-to-value view of the parameters, logged before dispatch.
    pub fn parameters(&self) -> BTreeMap<&'static str, String> {
        let mut parameters = BTreeMap::new();
        if let Some(pr) = self.pr() {
            parameters.insert(PARAMETER_PR, pr.to_string());
        }
        parameters.insert(PARAMETER_INPUT, self.input().to_string());
        parameters.insert(PARAMETER_OUTPUT, self.output().to_string());
        if let Self::Extract(extract) = self {
            if let Some(locale) = extract.source_locale.as_ref() {
                parameters.insert(PARAMETER_SOURCE_LOCALE, locale.clone());
            }
            if let Some(locale) = extract.target_locale.as_ref() {
                parameters.insert(PARAMETER_TARGET_LOCALE, locale.clone());
            }
        }
        parameters
    }
}

#[cfg(test)]
mod tests {
    use super::{Command, CommandName, PARAMETER_INPUT, PARAMETER_OUTPUT, PARAMETER_PR};

    #[test]
    fn unit_command_name_from_token_is_exact_and_case_sensitive() {
        assert_eq!(CommandName::from_token("extract"), Some(CommandName::Extract));
        assert_eq!(CommandName::from_token("compose"), Some(CommandName::Compose));
        assert_eq!(CommandName::from_token("Extract"), None);
        assert_eq!(CommandName::from_token("unknown"), None);
        assert_eq!(CommandName::from_token(""), None);
    }

    #[test]
    fn functional_with_pr_injects_pr_into_parameter_view() {
        let command = Command::extract("docs", "docs-xliff");
        assert!(!command.parameters().contains_key(PARAMETER_PR));

        let command = command.with_pr(17);
        let parameters = command.parameters();
        assert_eq!(parameters.get(PARAMETER_PR).map(String::as_str), Some("17"));
        assert_eq!(
            parameters.get(PARAMETER_INPUT).map(String::as_str),
            Some("docs")
        );
        assert_eq!(
            parameters.get(PARAMETER_OUTPUT).map(String::as_str),
            Some("docs-xliff")
        );
        assert_eq!(parameters.len(), 3);
    }

    #[test]
    fn regression_with_pr_replaces_previous_pr_value() {
        let command = Command::compose("a", "b").with_pr(1).with_pr(2);
        assert_eq!(command.pr(), Some(2));
        assert_eq!(command.name(), CommandName::Compose);
    }

    #[test]
    fn integration_command_serializes_as_tagged_name_and_parameters() {
        let value = serde_json::to_value(Command::compose("in", "out").with_pr(3))
            .expect("serialize command");
        assert_eq!(value["name"], "compose");
        assert_eq!(value["parameters"]["input"], "in");
        assert_eq!(value["parameters"]["pr"], 3);
    }
}
