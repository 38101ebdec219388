//! matterfix: tolerant repair of corrupted YAML front matter in markdown notes
//!
//! Notes in a long-lived vault pick up damage from scripted edits: closing
//! delimiters glued onto the last field, several `key: value` pairs on one
//! line, list values serialized as quoted JSON strings, slug titles. This
//! library finds the block even when it is malformed, rewrites it into a
//! canonical form and leaves the body byte-for-byte intact.
//!
//! # Quick Start
//!
//! ```rust
//! use matterfix::process;
//!
//! let note = "---\ntopics: \"[\\\"Networking\\\"]\"status: done---\n# Body\n";
//! let repaired = process(note).unwrap();
//! assert_eq!(repaired, "---\ntopics: [\"Networking\"]\nstatus: done\n---\n# Body\n");
//!
//! // Canonical notes are left alone
//! assert_eq!(process(&repaired), None);
//! ```
//!
//! ## Batch Operations
//!
//! ```rust,no_run
//! use matterfix::{BatchRunner, FileResolver, NoteReader, NoteWriter, Result, WriteOptions};
//!
//! fn main() -> Result<()> {
//!     let files = FileResolver::new().resolve_paths(&["vault/"])?;
//!
//!     let runner = BatchRunner::new(NoteReader::new(), NoteWriter::new(), WriteOptions::default());
//!     let report = runner.run_resolved(&files)?;
//!     println!("{} notes repaired", report.repaired);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`core`]: the pure text engine (locate, split, normalize, rebuild)
//! - [`io`]: finding, reading and writing notes
//! - [`batch`]: the parallel driver tying the two together
//! - [`error`]: error types for the I/O side; the engine itself never fails

// Public API exports
pub use crate::error::{ErrorSeverity, MatterFixError, Result};

// Core types
pub use crate::core::{process, repair, Document, Repair, RepairReport};

// IO types
pub use crate::io::{
    BackupOptions, FileResolver, NoteReader, NoteWriter, OutputOptions, ReaderConfig,
    ResolvedFile, ResolverConfig, WriteOptions, WriteResult, WriterConfig,
};

pub use crate::batch::{BatchReport, BatchRunner, FileOutcome, FileStatus};

pub mod batch;
pub mod core;
pub mod error;
pub mod io;

/// Convenience functions for common operations
pub mod convenience {
    //! One-call helpers with default reader and writer settings

    use crate::{Document, NoteReader, NoteWriter, RepairReport, Result};
    use std::path::Path;

    /// Read a note from a file
    pub fn read_document<P: AsRef<Path>>(path: P) -> Result<Document> {
        NoteReader::new().read_file(path)
    }

    /// Repair a single note in place.
    ///
    /// Returns the repair report when the file was rewritten.
    pub fn repair_file<P: AsRef<Path>>(path: P) -> Result<Option<RepairReport>> {
        let path = path.as_ref();
        let document = read_document(path)?;
        let Some(repair) = document.repair() else {
            return Ok(None);
        };
        NoteWriter::new().write_text(path, document.text(), &repair.text, None)?;
        Ok(Some(repair.report))
    }

    /// Check whether a note's front matter parses as a YAML mapping
    pub fn validate_file<P: AsRef<Path>>(path: P) -> Result<()> {
        read_document(path)?.parse_front_matter().map(|_| ())
    }
}
