//! Character scanner tracking quotes, escapes and sequence brackets
//!
//! All context-sensitive decisions in the engine ("is this colon inside a
//! string?", "is this comma inside a list?") go through [`ScanState`] so the
//! splitter, the sequence normalizer and the rebuilder agree on what
//! "top level" means.

/// What a single character did to the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Backslash that escapes the next character
    EscapeStart,
    /// Character consumed by a pending escape
    Escaped(char),
    QuoteOpen,
    QuoteClose,
    BracketOpen,
    BracketClose,
    Plain(char),
}

/// Scanner state carried across a line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanState {
    pub in_quotes: bool,
    pub escape_pending: bool,
    pub bracket_depth: usize,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outside every quoted string and sequence bracket, with no escape pending
    pub fn at_top_level(&self) -> bool {
        !self.in_quotes && !self.escape_pending && self.bracket_depth == 0
    }

    /// Feed one character. Brackets only count outside quotes and a stray
    /// closing bracket never drives the depth below zero.
    pub fn advance(&mut self, ch: char) -> Step {
        if self.escape_pending {
            self.escape_pending = false;
            return Step::Escaped(ch);
        }
        match ch {
            '\\' => {
                self.escape_pending = true;
                Step::EscapeStart
            }
            '"' => {
                self.in_quotes = !self.in_quotes;
                if self.in_quotes {
                    Step::QuoteOpen
                } else {
                    Step::QuoteClose
                }
            }
            '[' if !self.in_quotes => {
                self.bracket_depth += 1;
                Step::BracketOpen
            }
            ']' if !self.in_quotes => {
                self.bracket_depth = self.bracket_depth.saturating_sub(1);
                Step::BracketClose
            }
            other => Step::Plain(other),
        }
    }
}

/// Every complete double-quoted span in `text`, in order.
///
/// Escaped characters inside a span are kept literally (`\"` becomes `"`).
/// Brackets play no part, so spans are recovered from broken or duplicated
/// list fragments as well. A span left open at the end of the text is ignored.
pub fn quoted_spans(text: &str) -> Vec<String> {
    let mut state = ScanState::new();
    let mut spans = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        let inside = state.in_quotes;
        match state.advance(ch) {
            Step::QuoteOpen => current.clear(),
            Step::QuoteClose => spans.push(std::mem::take(&mut current)),
            Step::EscapeStart => {}
            Step::Escaped(c) | Step::Plain(c) if inside => current.push(c),
            _ => {}
        }
    }

    spans
}

/// Inverse of the escaping [`quoted_spans`] understands
pub fn escape_quoted(token: &str) -> String {
    let mut escaped = String::with_capacity(token.len() + 2);
    for ch in token.chars() {
        if ch == '"' || ch == '\\' {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Drop one level of backslash escaping
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some(next) => out.push(next),
                None => out.push(ch),
            }
        } else {
            out.push(ch);
        }
    }
    out
}
