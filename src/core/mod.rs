//! Front matter repair engine
//!
//! - `locator`: finds the block, including glued closing delimiters
//! - `splitter`: separates `key: value` pairs glued onto one line
//! - `normalize`: ordered rules for lists, titles and stray delimiters
//! - `rebuild`: reassembles a canonical block
//! - `repair`: ties the pieces together for one note

pub mod document;
pub mod field;
pub mod locator;
pub mod normalize;
pub mod rebuild;
pub mod repair;
pub mod scanner;
pub mod splitter;
pub mod vocab;

pub use document::Document;
pub use field::FieldLine;
pub use locator::{locate, Located};
pub use normalize::{humanize_title, normalize_line, sequence_tokens, Normalized, Rule, RULES};
pub use rebuild::rebuild;
pub use repair::{clean_block, process, repair, Repair, RepairReport};
pub use scanner::{quoted_spans, ScanState};
pub use splitter::split_pairs;
