use crate::command::CommandName;
use crate::command_parser::COMMAND_KEYWORD;

pub const DEFAULT_SOURCE_LOCALE: &str = "ru-RU";
pub const DEFAULT_TARGET_LOCALE: &str = "en-US";

/// Usage reply posted when a pull request is opened.
pub fn render_usage(keyword: &str) -> String {
    let commands = CommandName::ALL
        .iter()
        .map(|name| format!("- `{name}`"))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "#### {keyword}\n\n\
Every command starts on its own line with the `{keyword}` prefix, followed by the command name and its parameters.\n\
Tokens are separated by spaces. Other text may surround command lines in the same comment.\n\n\
Commands run only when the comment author has `admin` or `write` repository permission \
and one of the author associations allowed by the workflow configuration.\n\n\
Commands:\n\n{commands}\n\n\
##### extract\n\n\
Extracts xliff and skeleton files from the markdown under **input_folder** into **output_folder**.\n\n\
Parameters (paths are relative to the repository root):\n\n\
- input_folder (**required**): folder with markdown files\n\
- output_folder (**required**): folder for extracted xliff and skeleton files\n\
- source locale (optional, default `{DEFAULT_SOURCE_LOCALE}`)\n\
- target locale (optional, default `{DEFAULT_TARGET_LOCALE}`)\n\n\
Example: `{keyword} extract documentation documentation-xliff`\n\n\
##### compose\n\n\
Composes the xliff and skeleton files under **input_folder** back into markdown in **output_folder**.\n\n\
Parameters (paths are relative to the repository root):\n\n\
- input_folder (**required**): folder with xliff and skeleton files\n\
- output_folder (**required**): folder for composed markdown\n\n\
Example: `{keyword} compose documentation-xliff documentation-translated`\n"
    )
}

pub fn default_usage() -> String {
    render_usage(COMMAND_KEYWORD)
}
