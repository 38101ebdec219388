//! Locating the front matter block inside a note
//!
//! A block opens with a delimiter line at the very start of the text. The
//! close is either a line holding only the delimiter or, for damaged notes,
//! the delimiter glued to the end of the last field (`title: "foo"---`).
//! A block that is never closed is not a block: the note is left alone.

use crate::core::vocab::DELIMITER;
use std::borrow::Cow;

/// A located block and the untouched remainder of the note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located<'a> {
    /// Text between the delimiters, exclusive of both
    pub frontmatter: Cow<'a, str>,
    /// Everything after the closing delimiter line, byte for byte
    pub body: &'a str,
    /// The close was recovered from a delimiter glued to a field value
    pub glued_close: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Close<'l> {
    Exact,
    /// Delimiter glued to the end of a field; carries the field part
    Glued(&'l str),
}

fn classify_close(line: &str) -> Option<Close<'_>> {
    let line = line.trim_end_matches(['\n', '\r']);
    if line.trim() == DELIMITER {
        return Some(Close::Exact);
    }
    let idx = line.find(DELIMITER)?;
    (&line[idx..] == DELIMITER).then(|| Close::Glued(line[..idx].trim_end()))
}

/// Whether `line` would end a block when written back to a note
pub(crate) fn is_close_line(line: &str) -> bool {
    classify_close(line).is_some()
}

/// Split a note into its front matter block and body.
///
/// Returns `None` when the note does not open with a delimiter line or when
/// the block is never closed.
pub fn locate(text: &str) -> Option<Located<'_>> {
    let first = text.split_inclusive('\n').next()?;
    if !text.starts_with(DELIMITER) || first.trim() != DELIMITER {
        return None;
    }
    fast_path(text).or_else(|| tolerant_path(text, first.len()))
}

/// Well-formed notes: `---\n` + block + `\n---\n` + body.
///
/// Rejected when a line of the candidate block would already close it under
/// the tolerant rules, otherwise a glued close would pull the body into the
/// block up to the next horizontal rule.
fn fast_path(text: &str) -> Option<Located<'_>> {
    let rest = text.strip_prefix("---\n")?;
    let end = rest.find("\n---\n")?;
    let frontmatter = &rest[..end];
    if frontmatter.lines().any(|line| classify_close(line).is_some()) {
        return None;
    }
    Some(Located {
        frontmatter: Cow::Borrowed(frontmatter),
        body: &rest[end + "\n---\n".len()..],
        glued_close: false,
    })
}

fn tolerant_path(text: &str, opening_len: usize) -> Option<Located<'_>> {
    let mut offset = opening_len;
    let mut frontmatter = String::new();

    for raw in text[opening_len..].split_inclusive('\n') {
        offset += raw.len();
        match classify_close(raw) {
            Some(Close::Exact) => {
                return Some(Located {
                    frontmatter: Cow::Owned(frontmatter),
                    body: &text[offset..],
                    glued_close: false,
                });
            }
            Some(Close::Glued(field)) => {
                frontmatter.push_str(field);
                frontmatter.push('\n');
                return Some(Located {
                    frontmatter: Cow::Owned(frontmatter),
                    body: &text[offset..],
                    glued_close: true,
                });
            }
            None => frontmatter.push_str(raw),
        }
    }

    None
}
