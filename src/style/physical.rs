//! Rules that only need the raw text of each line.

use crate::config::StyleConfig;
use crate::core::{StyleRule, StyleViolation};

pub fn check_physical_lines(source: &str, config: &StyleConfig) -> Vec<StyleViolation> {
    let indent_char = file_indent_char(source);
    let mut violations = Vec::new();

    for (index, line) in source.lines().enumerate() {
        let line_no = index + 1;
        violations.extend(check_line_length(line, line_no, config.max_line_length));
        violations.extend(check_trailing_whitespace(line, line_no));
        violations.extend(check_indentation(line, line_no, indent_char));
    }

    violations
}

/// Physical lines that carry any characters at all.
pub fn checkable_lines(source: &str) -> usize {
    source.lines().filter(|line| !line.is_empty()).count()
}

fn check_line_length(line: &str, line_no: usize, max: usize) -> Option<StyleViolation> {
    let length = line.chars().count();
    (length > max).then(|| StyleViolation {
        rule: StyleRule::LineTooLong,
        line: line_no,
        column: max + 1,
        message: format!("line too long ({length} > {max} characters)"),
    })
}

fn check_trailing_whitespace(line: &str, line_no: usize) -> Option<StyleViolation> {
    let trimmed = line.trim_end_matches([' ', '\t']);
    if trimmed.len() == line.len() {
        return None;
    }

    if trimmed.is_empty() {
        Some(StyleViolation {
            rule: StyleRule::WhitespaceOnBlankLine,
            line: line_no,
            column: 1,
            message: "whitespace on blank line".to_string(),
        })
    } else {
        Some(StyleViolation {
            rule: StyleRule::TrailingWhitespace,
            line: line_no,
            column: trimmed.chars().count() + 1,
            message: "trailing whitespace".to_string(),
        })
    }
}

fn leading_whitespace(line: &str) -> &str {
    let end = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    &line[..end]
}

/// Indentation character of the first indented code line, if any.
fn file_indent_char(source: &str) -> Option<char> {
    source
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(leading_whitespace)
        .find(|indent| !indent.is_empty())
        .and_then(|indent| indent.chars().next())
}

fn check_indentation(line: &str, line_no: usize, file_char: Option<char>) -> Option<StyleViolation> {
    if line.trim().is_empty() {
        return None;
    }
    let indent = leading_whitespace(line);
    if indent.is_empty() {
        return None;
    }

    if indent.contains(' ') && indent.contains('\t') {
        return Some(StyleViolation {
            rule: StyleRule::MixedIndentation,
            line: line_no,
            column: 1,
            message: "indentation contains mixed spaces and tabs".to_string(),
        });
    }

    let this_char = indent.chars().next()?;
    match file_char {
        Some(expected) if expected != this_char => Some(StyleViolation {
            rule: StyleRule::InconsistentIndentation,
            line: line_no,
            column: 1,
            message: format!(
                "indentation uses {} but the file indents with {}",
                indent_name(this_char),
                indent_name(expected)
            ),
        }),
        _ => None,
    }
}

fn indent_name(c: char) -> &'static str {
    if c == '\t' {
        "tabs"
    } else {
        "spaces"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(source: &str, max: usize) -> Vec<(StyleRule, usize)> {
        check_physical_lines(source, &StyleConfig { max_line_length: max })
            .into_iter()
            .map(|v| (v.rule, v.line))
            .collect()
    }

    #[test]
    fn test_line_length_counts_characters() {
        let long = format!("x = '{}'\n", "é".repeat(80));
        assert_eq!(rules(&long, 79), vec![(StyleRule::LineTooLong, 1)]);
        assert!(rules(&long, 99).is_empty());
        // 79 exactly is fine
        let exact = format!("{}\n", "a".repeat(79));
        assert!(rules(&exact, 79).is_empty());
    }

    #[test]
    fn test_trailing_whitespace_variants() {
        let source = "x = 1 \n    \ny = 2\t\n";
        assert_eq!(
            rules(source, 79),
            vec![
                (StyleRule::TrailingWhitespace, 1),
                (StyleRule::WhitespaceOnBlankLine, 2),
                (StyleRule::TrailingWhitespace, 3),
            ]
        );
    }

    #[test]
    fn test_mixed_indentation_within_line() {
        let source = "if x:\n \tpass\n";
        assert_eq!(rules(source, 79), vec![(StyleRule::MixedIndentation, 2)]);
    }

    #[test]
    fn test_inconsistent_indentation_across_lines() {
        let source = "if x:\n    a = 1\nif y:\n\tb = 2\n";
        assert_eq!(rules(source, 79), vec![(StyleRule::InconsistentIndentation, 4)]);
    }

    #[test]
    fn test_crlf_is_not_trailing_whitespace() {
        assert!(rules("x = 1\r\ny = 2\r\n", 79).is_empty());
    }

    #[test]
    fn test_checkable_lines_skip_empty() {
        assert_eq!(checkable_lines("a\n\n  \nb\n"), 3);
        assert_eq!(checkable_lines(""), 0);
    }
}
