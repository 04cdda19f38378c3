use crate::command::{Command, CommandName, ComposeParameters, ExtractParameters};

/// Keyword every command line must start with.
pub const COMMAND_KEYWORD: &str = "markdown-translation";

const MIN_COMMAND_TOKENS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Enumerates reasons a keyword line was not turned into a command.
pub enum CommandRejectionReason {
    TooFewTokens { found: usize },
    UnknownCommand { token: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A line that carried the command keyword but did not satisfy the grammar.
pub struct CommandRejection {
    /// 1-based line number within the comment body.
    pub line_number: usize,
    pub reason: CommandRejectionReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Parse result plus diagnostics about lines that produced no command.
pub struct ParseReport {
    pub commands: Vec<Command>,
    /// Non-blank lines that did not yield a command, prose included.
    pub skipped_lines: usize,
    pub rejections: Vec<CommandRejection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LineOutcome {
    Prose,
    Command(Command),
    Rejected(CommandRejectionReason),
}

#[derive(Debug, Clone)]
/// Extracts commands embedded in free-form comment text.
pub struct CommandParser {
    keyword: String,
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new(COMMAND_KEYWORD)
    }
}

impl CommandParser {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
        }
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Returns commands in body order. Lines outside the grammar are skipped.
    pub fn parse(&self, text: &str) -> Vec<Command> {
        self.parse_with_report(text).commands
    }

    pub fn parse_with_report(&self, text: &str) -> ParseReport {
        let mut report = ParseReport::default();
        for (index, line) in text.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            match self.parse_line(line) {
                LineOutcome::Command(command) => report.commands.push(command),
                LineOutcome::Prose => report.skipped_lines += 1,
                LineOutcome::Rejected(reason) => {
                    tracing::debug!(
                        line_number = index + 1,
                        reason = ?reason,
                        "rejected command line"
                    );
                    report.skipped_lines += 1;
                    report.rejections.push(CommandRejection {
                        line_number: index + 1,
                        reason,
                    });
                }
            }
        }
        report
    }

    fn parse_line(&self, line: &str) -> LineOutcome {
        let tokens = line
            .split(' ')
            .filter(|token| !token.is_empty())
            .collect::<Vec<_>>();
        if tokens.first().copied() != Some(self.keyword.as_str()) {
            return LineOutcome::Prose;
        }
        if tokens.len() < MIN_COMMAND_TOKENS {
            return LineOutcome::Rejected(CommandRejectionReason::TooFewTokens {
                found: tokens.len(),
            });
        }
        let Some(name) = CommandName::from_token(tokens[1]) else {
            return LineOutcome::Rejected(CommandRejectionReason::UnknownCommand {
                token: tokens[1].to_string(),
            });
        };

        let input = tokens[2].to_string();
        let output = tokens[3].to_string();
        let optional = |index: usize| tokens.get(index).map(|token| token.to_string());
        let command = match name {
            CommandName::Extract => Command::Extract(ExtractParameters {
                pr: None,
                input,
                output,
                source_locale: optional(4),
                target_locale: optional(5),
            }),
            CommandName::Compose => Command::Compose(ComposeParameters {
                pr: None,
                input,
                output,
            }),
        };
        LineOutcome::Command(command)
    }
}

#[cfg(test)]
mod tests {
    use super::{CommandParser, CommandRejection, CommandRejectionReason, COMMAND_KEYWORD};
    use crate::command::{Command, CommandName, PARAMETER_INPUT, PARAMETER_OUTPUT};

    #[test]
    fn unit_parse_extract_command() {
        let parsed = CommandParser::default()
            .parse("markdown-translation extract input_folder output_folder");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name(), CommandName::Extract);
        let parameters = parsed[0].parameters();
        assert_eq!(parameters[PARAMETER_INPUT], "input_folder");
        assert_eq!(parameters[PARAMETER_OUTPUT], "output_folder");
        assert_eq!(parsed[0].pr(), None);
    }

    #[test]
    fn unit_parse_compose_command() {
        let parsed = CommandParser::default()
            .parse("markdown-translation compose input_folder output_folder");
        assert_eq!(parsed, vec![Command::compose("input_folder", "output_folder")]);
    }

    #[test]
    fn unit_parse_returns_empty_for_empty_and_blank_text() {
        let parser = CommandParser::default();
        assert!(parser.parse("").is_empty());
        assert!(parser.parse("\n\n   \n").is_empty());
    }

    #[test]
    fn unit_parse_rejects_unknown_command_and_wrong_keyword() {
        let parser = CommandParser::default();
        assert!(parser
            .parse("markdown-translation unknown input_folder output_folder")
            .is_empty());
        assert!(parser
            .parse("markdown-shmarkdown extract input_folder output_folder")
            .is_empty());
        assert!(parser
            .parse("Markdown-Translation extract input_folder output_folder")
            .is_empty());
    }

    #[test]
    fn unit_parse_rejects_lines_with_fewer_than_four_tokens() {
        let parser = CommandParser::default();
        assert!(parser.parse("markdown-translation extract docs").is_empty());
        assert!(parser.parse("markdown-translation extract").is_empty());
        assert!(parser.parse("markdown-translation").is_empty());
    }

    #[test]
    fn functional_parse_collapses_repeated_spaces_between_tokens() {
        let parsed =
            CommandParser::default().parse("  markdown-translation   extract  docs    docs-xliff ");
        assert_eq!(parsed, vec![Command::extract("docs", "docs-xliff")]);
    }

    #[test]
    fn functional_parse_multiple_commands_in_body_order() {
        let comment = "\
markdown-translation extract input_folder output_folder

markdown-translation compose input_folder output_folder";
        let parsed = CommandParser::default().parse(comment);
        assert_eq!(
            parsed.iter().map(Command::name).collect::<Vec<_>>(),
            vec![CommandName::Extract, CommandName::Compose]
        );
    }

    #[test]
    fn functional_parse_command_from_multiline_comment_with_prose() {
        let comment = "\
Hello there, everyone!

Paragaph with `inline code` and [link](somewhere.md \"title\")

markdown-translation extract input_folder output_folder

content after markdown-translation command";
        let parsed = CommandParser::default().parse(comment);
        assert_eq!(parsed, vec![Command::extract("input_folder", "output_folder")]);
    }

    #[test]
    fn functional_parse_extract_reads_optional_locale_tokens() {
        let parsed =
            CommandParser::default().parse("markdown-translation extract docs out en-US de-DE");
        match &parsed[0] {
            Command::Extract(parameters) => {
                assert_eq!(parameters.source_locale.as_deref(), Some("en-US"));
                assert_eq!(parameters.target_locale.as_deref(), Some("de-DE"));
            }
            other => panic!("expected extract, got {other:?}"),
        }

        let parsed = CommandParser::default().parse("markdown-translation compose in out extra");
        assert_eq!(parsed, vec![Command::compose("in", "out")]);
    }

    #[test]
    fn integration_parse_continues_after_rejected_lines() {
        let comment = "\
markdown-translation unknown a b
markdown-translation extract a
markdown-shmarkdown extract a b
markdown-translation compose x y
plain text
markdown-translation extract c d";
        let parsed = CommandParser::default().parse(comment);
        assert_eq!(
            parsed,
            vec![Command::compose("x", "y"), Command::extract("c", "d")]
        );
    }

    #[test]
    fn integration_parse_with_report_counts_skipped_lines_and_rejections() {
        let comment = "\
intro

markdown-translation unknown a b
markdown-translation extract a
markdown-translation compose x y";
        let report = CommandParser::default().parse_with_report(comment);
        assert_eq!(report.commands, vec![Command::compose("x", "y")]);
        assert_eq!(report.skipped_lines, 3);
        assert_eq!(
            report.rejections,
            vec![
                CommandRejection {
                    line_number: 3,
                    reason: CommandRejectionReason::UnknownCommand {
                        token: "unknown".to_string(),
                    },
                },
                CommandRejection {
                    line_number: 4,
                    reason: CommandRejectionReason::TooFewTokens { found: 3 },
                },
            ]
        );
    }

    #[test]
    fn regression_parse_accepts_crlf_line_endings() {
        let comment = "markdown-translation extract a b\r\nmarkdown-translation compose c d\r\n";
        let parsed = CommandParser::default().parse(comment);
        assert_eq!(
            parsed,
            vec![Command::extract("a", "b"), Command::compose("c", "d")]
        );
    }

    #[test]
    fn regression_custom_keyword_replaces_default() {
        let parser = CommandParser::new("docs-bot");
        assert_eq!(parser.keyword(), "docs-bot");
        assert!(parser
            .parse(&format!("{COMMAND_KEYWORD} extract a b"))
            .is_empty());
        assert_eq!(parser.parse("docs-bot extract a b").len(), 1);
    }
}
