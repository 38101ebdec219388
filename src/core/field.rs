//! `key: value` line grammar

use once_cell::sync::Lazy;
use regex::Regex;

static FIELD_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)([A-Za-z_][\w-]*)\s*:\s*(.*)$").expect("valid field regex"));

/// One physical line read as a `key: value` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLine<'a> {
    /// Leading whitespace before the key
    pub indent: &'a str,
    pub key: &'a str,
    /// Everything up to the start of the value, colon and blanks included
    pub head: &'a str,
    /// Remainder of the line after the first colon and the blanks following it
    pub value: &'a str,
}

impl<'a> FieldLine<'a> {
    /// Parse a line, returning `None` for blank lines, list items and anything
    /// else that does not start with an identifier and a colon.
    pub fn parse(line: &'a str) -> Option<Self> {
        let caps = FIELD_LINE.captures(line)?;
        let indent = caps.get(1)?.as_str();
        let key = caps.get(2)?.as_str();
        let value = caps.get(3)?;
        Some(Self {
            indent,
            key,
            head: &line[..value.start()],
            value: value.as_str(),
        })
    }

    /// Key with no inline value: a multi-line list or mapping follows
    pub fn is_bare(&self) -> bool {
        self.value.trim().is_empty()
    }
}
