//! Document-level repair: locate, split, normalize, rebuild, compare
//!
//! This is the engine's single entry point. It is a pure function over text:
//! no paths, no I/O, no state shared between notes.

use crate::core::locator::locate;
use crate::core::normalize::{normalize_line, Normalized, Rule};
use crate::core::rebuild::{assemble, rebuild};
use crate::core::splitter::split_pairs;
use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeMap;

/// Upper bound on clean passes over one block. A second pass only has work
/// when the rebuilder separated keys the first pass left on one line.
const MAX_PASSES: usize = 4;

/// What a repair did to a note's front matter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepairReport {
    /// The closing delimiter had to be recovered from a field line
    pub glued_close: bool,
    /// Lines added by separating glued `key: value` pairs
    pub split_lines: usize,
    /// Junk lines removed from the block
    pub dropped_lines: Vec<String>,
    /// Lines kept verbatim that need manual review
    pub review_lines: Vec<String>,
    /// How many lines each rule rewrote
    pub rules_applied: BTreeMap<String, usize>,
}

impl RepairReport {
    pub fn is_lossy(&self) -> bool {
        !self.dropped_lines.is_empty()
    }

    fn record(&mut self, rule: Rule) {
        *self.rules_applied.entry(rule.name().to_string()).or_insert(0) += 1;
    }
}

/// A repaired note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repair {
    /// Complete replacement text
    pub text: String,
    pub report: RepairReport,
}

/// Repair a note's front matter.
///
/// Returns `Some` only when the result differs from `original`; a note
/// without a locatable block, or one that is already canonical, yields `None`.
pub fn repair(original: &str) -> Option<Repair> {
    let located = locate(original)?;
    let mut report = RepairReport {
        glued_close: located.glued_close,
        ..Default::default()
    };

    let block = clean_block(&located.frontmatter, &mut report);
    let text = assemble(&block, located.body);

    if text == original {
        return None;
    }
    Some(Repair { text, report })
}

/// Repair a note, returning only the replacement text
pub fn process(original: &str) -> Option<String> {
    repair(original).map(|repair| repair.text)
}

/// Clean a block until it stops changing
pub fn clean_block(frontmatter: &str, report: &mut RepairReport) -> String {
    let mut block = clean_pass(frontmatter, report);
    for pass in 1..MAX_PASSES {
        let next = clean_pass(&block, report);
        if next == block {
            break;
        }
        debug!("front matter still changing after pass {}", pass);
        block = next;
    }
    block
}

fn clean_pass(frontmatter: &str, report: &mut RepairReport) -> String {
    let mut out: Vec<String> = Vec::new();

    for raw in frontmatter.lines() {
        let candidates = split_pairs(raw);
        report.split_lines += candidates.len() - 1;

        for candidate in candidates {
            let (rule, normalized) = normalize_line(&candidate);
            match normalized {
                Normalized::Line(line) => {
                    if let Some(rule) = rule.filter(|_| line != candidate) {
                        report.record(rule);
                    }
                    out.push(line);
                }
                Normalized::Dropped => {
                    warn!("dropping unrecoverable front matter line: {:?}", candidate);
                    report.dropped_lines.push(candidate);
                }
                Normalized::Review(line) => {
                    if !report.review_lines.contains(&line) {
                        warn!("front matter line needs review: {:?}", line);
                        report.review_lines.push(line.clone());
                    }
                    out.push(line);
                }
            }
        }
    }

    rebuild(&out)
}
