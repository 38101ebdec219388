//! Field normalizers and the ordered rule list that dispatches to them
//!
//! Every line coming out of the splitter is offered to [`RULES`] in order;
//! the first rule whose predicate matches decides the line's fate. Lines no
//! rule claims pass through verbatim.

use crate::core::field::FieldLine;
use crate::core::locator::is_close_line;
use crate::core::scanner::{self, escape_quoted};
use crate::core::vocab::{self, DELIMITER, TITLE_KEY};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::HashSet;

/// What a rule did with a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    /// Line to emit, rewritten or not
    Line(String),
    /// Unrecoverable junk, removed from the block
    Dropped,
    /// Kept verbatim because nothing could be recovered; needs a human
    Review(String),
}

/// Line classification rules, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    /// Single-line list fields (`topics`, `tags`, `platforms`)
    Sequence,
    /// Delimiter fragments stuck in the middle of a line
    StrayDelimiter,
    /// Slug-shaped titles
    Title,
}

/// Evaluation order. Sequence fields win over stray delimiters so that a
/// list value containing `---` is rebuilt rather than truncated.
pub const RULES: [Rule; 3] = [Rule::Sequence, Rule::StrayDelimiter, Rule::Title];

impl Rule {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sequence => "sequence",
            Self::StrayDelimiter => "stray-delimiter",
            Self::Title => "title",
        }
    }

    pub fn matches(&self, line: &str) -> bool {
        match self {
            Self::Sequence => FieldLine::parse(line).is_some_and(|f| vocab::is_sequence_key(f.key)),
            Self::StrayDelimiter => line.contains(DELIMITER) && line.trim() != DELIMITER,
            Self::Title => FieldLine::parse(line).is_some_and(|f| f.key == TITLE_KEY),
        }
    }

    pub fn apply(&self, line: &str) -> Normalized {
        match self {
            Self::Sequence => normalize_sequence_line(line),
            Self::StrayDelimiter => strip_stray_delimiter(line),
            Self::Title => normalize_title_line(line),
        }
    }
}

/// Run a line through the first matching rule
pub fn normalize_line(line: &str) -> (Option<Rule>, Normalized) {
    match RULES.iter().find(|rule| rule.matches(line)) {
        Some(rule) => (Some(*rule), rule.apply(line)),
        None => (None, Normalized::Line(line.to_string())),
    }
}

/// A sequence line left as written must not end in the delimiter, or the
/// next read would take it for a glued close
fn normalize_sequence_line(line: &str) -> Normalized {
    match rewrite_sequence_line(line) {
        Normalized::Line(out) | Normalized::Review(out) if is_close_line(&out) => {
            strip_stray_delimiter(&out)
        }
        other => other,
    }
}

fn rewrite_sequence_line(line: &str) -> Normalized {
    let Some(field) = FieldLine::parse(line) else {
        return Normalized::Line(line.to_string());
    };
    // Multi-line `- item` lists continue below a bare key
    if field.is_bare() {
        return Normalized::Line(line.to_string());
    }

    match sequence_tokens(field.value) {
        Some(tokens) => Normalized::Line(format_sequence(field.indent, field.key, &tokens)),
        None if field.value.chars().any(char::is_alphanumeric) => {
            Normalized::Review(line.to_string())
        }
        None => Normalized::Line(line.to_string()),
    }
}

/// Recover the list items of a sequence value.
///
/// Returns `None` when no usable token survives.
pub fn sequence_tokens(value: &str) -> Option<Vec<String>> {
    let value = value.trim();
    let inner = unwrap_quoted_list(value).map_or(Cow::Borrowed(value), Cow::Owned);

    let raw = if inner.contains('"') {
        scanner::quoted_spans(&inner)
    } else {
        bare_items(&inner)
    };

    let mut seen = HashSet::new();
    let tokens: Vec<String> = raw
        .into_iter()
        .filter(|token| is_meaningful(token))
        .filter(|token| seen.insert(token.clone()))
        .collect();

    (!tokens.is_empty()).then_some(tokens)
}

/// `"[\"a\", \"b\"]"` → `["a", "b"]`
fn unwrap_quoted_list(value: &str) -> Option<String> {
    let inner = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))?
        .trim();
    (inner.starts_with('[') && inner.ends_with(']')).then(|| scanner::unescape(inner))
}

/// Items of an unquoted list: `[a, 'b']` or `a, b`
fn bare_items(value: &str) -> Vec<String> {
    let items = match (value.find('['), value.rfind(']')) {
        (Some(open), Some(close)) if open < close => &value[open + 1..close],
        _ => value,
    };
    items
        .split(',')
        .map(|item| item.trim().trim_matches(['"', '\'']).to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Tokens made only of punctuation are debris from broken brackets and quotes
fn is_meaningful(token: &str) -> bool {
    !matches!(token.trim(), "[" | "]" | "\"" | "'") && token.chars().any(char::is_alphanumeric)
}

pub fn format_sequence(indent: &str, key: &str, tokens: &[String]) -> String {
    let items: Vec<String> = tokens
        .iter()
        .map(|token| format!("\"{}\"", escape_quoted(token)))
        .collect();
    format!("{}{}: [{}]", indent, key, items.join(", "))
}

fn strip_stray_delimiter(line: &str) -> Normalized {
    let Some(idx) = line.find(DELIMITER) else {
        return Normalized::Line(line.to_string());
    };
    let left = line[..idx].trim_end();
    if left.contains(':') {
        Normalized::Line(left.to_string())
    } else {
        Normalized::Dropped
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quoting {
    Double,
    Single,
    Bare,
}

impl Quoting {
    fn mark(&self) -> &'static str {
        match self {
            Self::Double => "\"",
            Self::Single => "'",
            Self::Bare => "",
        }
    }

    fn split(value: &str) -> Option<(Self, &str)> {
        for (quoting, mark) in [(Self::Double, '"'), (Self::Single, '\'')] {
            if let Some(inner) = value
                .strip_prefix(mark)
                .and_then(|v| v.strip_suffix(mark))
            {
                return Some((quoting, inner));
            }
        }
        // Stray quotes in an otherwise bare value: not a shape we rewrite
        (!value.contains(['"', '\''])).then_some((Self::Bare, value))
    }
}

fn normalize_title_line(line: &str) -> Normalized {
    let Some(field) = FieldLine::parse(line) else {
        return Normalized::Line(line.to_string());
    };
    let value = field.value.trim_end();
    let Some((quoting, raw)) = Quoting::split(value) else {
        return Normalized::Line(line.to_string());
    };

    match humanize_title(raw) {
        Some(title) => {
            let mark = quoting.mark();
            Normalized::Line(format!("{}{}{}{}", field.head, mark, title, mark))
        }
        None => Normalized::Line(line.to_string()),
    }
}

/// Turn a slug into a sentence-cased phrase with canonical acronyms.
///
/// `real-time-communications-ios` → `Real time communications iOS`.
/// Returns `None` for values that already read as text (contain a space) or
/// do not look like a slug (no hyphen or underscore).
pub fn humanize_title(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.contains(' ') || !raw.contains(['-', '_']) {
        return None;
    }

    let words: Vec<String> = raw
        .split(['-', '_'])
        .filter(|token| !token.is_empty())
        .enumerate()
        .map(|(i, token)| match vocab::acronym(token) {
            Some(canonical) => canonical.to_string(),
            None if i == 0 => capitalize(&token.to_lowercase()),
            None => token.to_lowercase(),
        })
        .collect();

    if words.is_empty() {
        return None;
    }
    let title = words.join(" ");
    (title != raw).then_some(title)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
