//! Note model
//!
//! A [`Document`] owns the full raw text of one note as read from disk. It
//! is never edited in place: repair produces a complete replacement text.

use crate::core::locator::{locate, Located};
use crate::core::repair::{repair, Repair};
use crate::error::{MatterFixError, Result};
use std::path::{Path, PathBuf};

/// A markdown note and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    path: Option<PathBuf>,
    text: String,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            path: None,
            text: text.into(),
        }
    }

    /// Attach the path the note was read from
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Front matter block and body, if the note has a closed block
    pub fn locate(&self) -> Option<Located<'_>> {
        locate(&self.text)
    }

    pub fn has_front_matter(&self) -> bool {
        self.locate().is_some()
    }

    /// Body text; the whole note when there is no block
    pub fn body(&self) -> &str {
        self.locate().map_or(self.text.as_str(), |located| located.body)
    }

    /// Repaired replacement text, or `None` if nothing needs to change
    pub fn repair(&self) -> Option<Repair> {
        repair(&self.text)
    }

    /// Read the located block as a YAML mapping.
    ///
    /// `Ok(None)` when there is no block or the block is empty.
    pub fn parse_front_matter(&self) -> Result<Option<serde_yaml::Mapping>> {
        let Some(located) = self.locate() else {
            return Ok(None);
        };
        let path = self.path.clone().unwrap_or_default();

        match serde_yaml::from_str::<serde_yaml::Value>(&located.frontmatter) {
            Ok(serde_yaml::Value::Mapping(map)) => Ok(Some(map)),
            Ok(serde_yaml::Value::Null) => Ok(None),
            Ok(other) => Err(MatterFixError::invalid_front_matter(
                path,
                format!("expected a mapping, found {}", value_kind(&other)),
            )),
            Err(e) => Err(MatterFixError::invalid_front_matter(path, e.to_string())),
        }
    }
}

fn value_kind(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "a boolean",
        serde_yaml::Value::Number(_) => "a number",
        serde_yaml::Value::String(_) => "a string",
        serde_yaml::Value::Sequence(_) => "a sequence",
        serde_yaml::Value::Mapping(_) => "a mapping",
        serde_yaml::Value::Tagged(_) => "a tagged value",
    }
}
