//! Reassembling normalized lines into a canonical block

use crate::core::scanner::{ScanState, Step};
use crate::core::vocab::{self, DELIMITER};

/// Join normalized lines into a block.
///
/// A line where a quoted or bracketed value is directly followed by another
/// recognized key is broken in two. Trailing blank lines are dropped and a
/// non-empty block always ends with exactly one line break.
pub fn rebuild<S: AsRef<str>>(lines: &[S]) -> String {
    let mut block = String::new();
    for line in lines {
        for piece in enforce_breaks(line.as_ref()) {
            block.push_str(piece);
            block.push('\n');
        }
    }

    let trimmed = block.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}\n", trimmed)
    }
}

/// Full note text from a rebuilt block and the original body
pub fn assemble(block: &str, body: &str) -> String {
    format!("{DELIMITER}\n{block}{DELIMITER}\n{body}")
}

/// Break a line in front of every known key that directly follows the end
/// of a quoted string or a list, at the top level.
pub(crate) fn enforce_breaks(line: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut state = ScanState::new();
    let mut start = 0;
    // Set when the last significant character closed a value
    let mut after_value = false;

    for (i, ch) in line.char_indices() {
        if after_value
            && state.at_top_level()
            && i > start
            && vocab::known_key_at(&line[i..]).is_some()
        {
            pieces.push(line[start..i].trim_end());
            start = i;
            after_value = false;
        }

        let step = state.advance(ch);
        after_value = match step {
            Step::QuoteClose => state.bracket_depth == 0,
            Step::BracketClose => state.bracket_depth == 0 && !state.in_quotes,
            Step::Plain(' ' | '\t') => after_value,
            _ => false,
        };
    }

    pieces.push(&line[start..]);
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rebuild_joins_and_terminates() {
        assert_eq!(rebuild(&["type: thread", "status: draft"]), "type: thread\nstatus: draft\n");
    }

    #[test]
    fn test_rebuild_trims_trailing_blank_lines() {
        assert_eq!(rebuild(&["type: thread", "", "  "]), "type: thread\n");
        assert_eq!(rebuild(&["a: 1", "", "b: 2"]), "a: 1\n\nb: 2\n");
    }

    #[test]
    fn test_rebuild_empty_block() {
        let empty: [&str; 0] = [];
        assert_eq!(rebuild(&empty), "");
        assert_eq!(rebuild(&[""]), "");
    }

    #[test]
    fn test_breaks_after_closed_values() {
        assert_eq!(
            enforce_breaks(r#"- "x"status: done"#),
            vec![r#"- "x""#, "status: done"]
        );
        assert_eq!(
            enforce_breaks(r#"  - [a] tags: ["b"]title: "c""#),
            vec!["  - [a]", r#"tags: ["b"]"#, r#"title: "c""#]
        );
    }

    #[test]
    fn test_no_break_inside_values() {
        let line = r#"summary: "quoted "inner" status: x""#;
        assert_eq!(enforce_breaks(line), vec![line]);
        let line = r#"tags: ["a", "b" status: c]"#;
        assert_eq!(enforce_breaks(line), vec![line]);
    }

    #[test]
    fn test_no_break_after_plain_text() {
        let line = "summary: plain status: x";
        assert_eq!(enforce_breaks(line), vec![line]);
    }

    #[test]
    fn test_escaped_quote_in_token_does_not_close() {
        let line = r#"tags: ["a\"status: b"]"#;
        assert_eq!(enforce_breaks(line), vec![line]);
    }

    #[test]
    fn test_assemble() {
        assert_eq!(assemble("title: x\n", "Body\n"), "---\ntitle: x\n---\nBody\n");
        assert_eq!(assemble("", "Body"), "---\n---\nBody");
    }
}
