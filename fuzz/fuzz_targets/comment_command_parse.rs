#![no_main]

use libfuzzer_sys::fuzz_target;
use mdt_commands::{CommandParser, COMMAND_KEYWORD};

fuzz_target!(|data: &[u8]| {
    let body = String::from_utf8_lossy(data);
    let report = CommandParser::default().parse_with_report(&body);
    let non_blank_lines = body.lines().filter(|line| !line.is_empty()).count();
    assert_eq!(report.commands.len() + report.skipped_lines, non_blank_lines);
    assert!(report.rejections.len() <= report.skipped_lines);
    for command in &report.commands {
        assert!(command.pr().is_none());
        assert!(!command.input().is_empty());
        assert!(!command.output().is_empty());
        assert!(!command.input().contains(' '));
    }
    assert!(body.contains(COMMAND_KEYWORD) || report.commands.is_empty());
});
