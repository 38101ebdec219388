//! Splitting lines that glue several `key: value` pairs together
//!
//! `topics: ["Networking"]status: "done"` becomes two lines. A split point
//! is only ever taken at the top level of the value: never inside a quoted
//! string, never inside an open `[` list.

use crate::core::field::FieldLine;
use crate::core::scanner::ScanState;
use crate::core::vocab;

/// Split one raw line into one line per `key: value` pair.
///
/// Lines that are not `key: value` at all come back unchanged. Remainders
/// are re-scanned from a worklist until no further split point exists.
pub fn split_pairs(line: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pending = line;

    loop {
        let Some(field) = FieldLine::parse(pending) else {
            lines.push(pending.to_string());
            break;
        };
        let Some(cut) = find_split(field.value) else {
            lines.push(pending.to_string());
            break;
        };

        let head_len = pending.len() - field.value.len();
        lines.push(pending[..head_len + cut].trim_end().to_string());
        pending = field.value[cut..].trim_start();
    }

    lines
}

/// Byte offset in `value` where the next recognized key starts.
///
/// The candidate must sit at the top level and must not continue a word.
/// Offset 0 is a valid split: the key in front of it is already consumed.
pub(crate) fn find_split(value: &str) -> Option<usize> {
    let mut state = ScanState::new();
    let mut prev: Option<char> = None;

    for (i, ch) in value.char_indices() {
        if state.at_top_level()
            && !prev.is_some_and(is_word_char)
            && vocab::known_key_at(&value[i..]).is_some()
        {
            return Some(i);
        }
        state.advance(ch);
        prev = Some(ch);
    }

    None
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_glued_keys() {
        assert_eq!(
            split_pairs(r#"topics: ["Networking"]status: "done""#),
            vec![r#"topics: ["Networking"]"#, r#"status: "done""#]
        );
    }

    #[test]
    fn test_more_than_two_pairs() {
        assert_eq!(
            split_pairs(r#"type: thread status: draft level: "advanced""#),
            vec!["type: thread", "status: draft", r#"level: "advanced""#]
        );
    }

    #[test]
    fn test_keeps_indent_of_first_pair() {
        assert_eq!(
            split_pairs("  title: x   tags: [\"a\"]"),
            vec!["  title: x", "tags: [\"a\"]"]
        );
    }

    #[test]
    fn test_never_splits_inside_quotes() {
        let line = r#"summary: "Setup notes status: pending review""#;
        assert_eq!(split_pairs(line), vec![line]);
    }

    #[test]
    fn test_never_splits_inside_brackets() {
        let line = r#"tags: [a, status: b, "c"]"#;
        assert_eq!(split_pairs(line), vec![line]);
    }

    #[test]
    fn test_escaped_quote_keeps_string_open() {
        let line = r#"summary: "say \"hi\" status: later""#;
        assert_eq!(split_pairs(line), vec![line]);
    }

    #[test]
    fn test_unknown_keys_are_not_split_points() {
        let line = "summary: see author: someone";
        assert_eq!(split_pairs(line), vec![line]);
    }

    #[test]
    fn test_key_must_start_a_word() {
        let line = "summary: substatus: odd";
        assert_eq!(split_pairs(line), vec![line]);
    }

    #[test]
    fn test_key_at_start_of_value_is_split() {
        assert_eq!(
            split_pairs("summary: status: draft"),
            vec!["summary:", "status: draft"]
        );
        assert_eq!(
            split_pairs("level:tags: [\"a\"]"),
            vec!["level:", r#"tags: ["a"]"#]
        );
    }

    #[test]
    fn test_non_field_lines_pass_through() {
        assert_eq!(split_pairs(""), vec![""]);
        assert_eq!(split_pairs("  - Networking"), vec!["  - Networking"]);
        assert_eq!(split_pairs("topics:"), vec!["topics:"]);
    }

    #[test]
    fn test_split_after_glued_delimiter_fragment() {
        assert_eq!(
            split_pairs(r#"title: "x"---tags: ["a"]"#),
            vec![r#"title: "x"---"#, r#"tags: ["a"]"#]
        );
    }
}
