//! Parallel batch driver
//!
//! Every note is owned by exactly one worker for the whole read, repair and
//! write cycle. Workers share only the read-only reader, writer and options.
//! A failing note becomes a [`FileStatus::Failed`] outcome and the batch
//! carries on.

use crate::core::RepairReport;
use crate::error::{ErrorSeverity, MatterFixError, Result};
use crate::io::{output_path, NoteReader, NoteWriter, ResolvedFile, WriteOptions};
use log::{debug, error, info, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// What happened to one note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// Front matter was rewritten (or would be, on a dry run)
    Repaired,
    /// Front matter was already canonical
    Unchanged,
    /// No closed front matter block
    Skipped,
    /// Reading or writing failed
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<RepairReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileOutcome {
    fn new(path: &Path, status: FileStatus) -> Self {
        Self {
            path: path.to_path_buf(),
            status,
            report: None,
            output_path: None,
            backup_path: None,
            diff: None,
            error: None,
        }
    }

    fn failed(path: &Path, err: &MatterFixError) -> Self {
        match err.severity() {
            ErrorSeverity::High | ErrorSeverity::Critical => {
                error!("{}: {}", path.display(), err)
            }
            ErrorSeverity::Low | ErrorSeverity::Medium => warn!("{}: {}", path.display(), err),
        }
        Self {
            error: Some(err.to_string()),
            ..Self::new(path, FileStatus::Failed)
        }
    }
}

/// Totals for one batch run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub scanned: usize,
    pub repaired: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Junk lines removed across all notes
    pub dropped_lines: usize,
    /// Lines flagged for manual review across all notes
    pub review_lines: usize,
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    fn from_outcomes(outcomes: Vec<FileOutcome>) -> Self {
        let mut report = Self {
            scanned: outcomes.len(),
            ..Default::default()
        };

        for outcome in &outcomes {
            match outcome.status {
                FileStatus::Repaired => report.repaired += 1,
                FileStatus::Unchanged => report.unchanged += 1,
                FileStatus::Skipped => report.skipped += 1,
                FileStatus::Failed => report.failed += 1,
            }
            if let Some(ref repair) = outcome.report {
                report.dropped_lines += repair.dropped_lines.len();
                report.review_lines += repair.review_lines.len();
            }
        }

        report.outcomes = outcomes;
        report
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Outcomes with the given status, in input order
    pub fn with_status(&self, status: FileStatus) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(move |o| o.status == status)
    }
}

/// Runs repair over many notes on a thread pool
#[derive(Debug, Clone)]
pub struct BatchRunner {
    reader: NoteReader,
    writer: NoteWriter,
    options: WriteOptions,
    jobs: Option<usize>,
}

impl BatchRunner {
    pub fn new(reader: NoteReader, writer: NoteWriter, options: WriteOptions) -> Self {
        Self {
            reader,
            writer,
            options,
            jobs: None,
        }
    }

    /// Limit the pool to `jobs` workers; zero means one per CPU
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = (jobs > 0).then_some(jobs);
        self
    }

    /// Process every file, placing output copies by file name.
    /// Outcomes keep the order of `files`.
    pub fn run(&self, files: &[PathBuf]) -> Result<BatchReport> {
        let files: Vec<ResolvedFile> = files.iter().map(ResolvedFile::named).collect();
        self.run_resolved(&files)
    }

    /// Process resolved notes, placing output copies at their relative path.
    ///
    /// Notes that would land on the same output file are all failed
    /// instead of overwriting each other.
    pub fn run_resolved(&self, files: &[ResolvedFile]) -> Result<BatchReport> {
        let clashes = self.output_clashes(files);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs.unwrap_or(0))
            .build()?;

        debug!(
            "processing {} notes on {} workers",
            files.len(),
            pool.current_num_threads()
        );

        let outcomes: Vec<FileOutcome> = pool.install(|| {
            files
                .par_iter()
                .map(|file| match clashes.get(&file.path) {
                    Some(err) => FileOutcome::failed(&file.path, err),
                    None => self.process_file(file),
                })
                .collect()
        });

        let report = BatchReport::from_outcomes(outcomes);
        info!(
            "scanned {} notes: {} repaired, {} unchanged, {} skipped, {} failed",
            report.scanned, report.repaired, report.unchanged, report.skipped, report.failed
        );
        Ok(report)
    }

    /// Notes sharing an output file, keyed by note path
    fn output_clashes(&self, files: &[ResolvedFile]) -> HashMap<PathBuf, MatterFixError> {
        let mut targets: HashMap<PathBuf, Vec<&Path>> = HashMap::new();
        for file in files {
            // Unplaceable notes fail on their own when written
            let target = output_path(&file.path, Some(file.relative.as_path()), &self.options);
            if let Ok(target) = target {
                targets.entry(target).or_default().push(&file.path);
            }
        }

        let mut clashes = HashMap::new();
        for (target, sources) in targets.into_iter().filter(|(_, s)| s.len() > 1) {
            for source in &sources {
                let err = MatterFixError::validation(format!(
                    "{} notes would be written to {}",
                    sources.len(),
                    target.display()
                ));
                clashes.insert(source.to_path_buf(), err);
            }
        }
        clashes
    }

    /// Read, repair and write one note
    pub fn process_file(&self, file: &ResolvedFile) -> FileOutcome {
        let path = file.path();
        debug!("processing {}", path.display());

        let document = match self.reader.read_file(path) {
            Ok(document) => document,
            Err(err) => return FileOutcome::failed(path, &err),
        };

        let Some(repair) = document.repair() else {
            let status = if document.has_front_matter() {
                FileStatus::Unchanged
            } else {
                FileStatus::Skipped
            };
            return FileOutcome::new(path, status);
        };

        match self.writer.write_text_as(
            path,
            Some(file.relative.as_path()),
            document.text(),
            &repair.text,
            Some(&self.options),
        ) {
            Ok(result) => {
                if self.options.dry_run {
                    info!("would repair {}", path.display());
                } else {
                    info!("repaired {}", path.display());
                }
                FileOutcome {
                    report: Some(repair.report),
                    output_path: result.output_path,
                    backup_path: result.backup_path,
                    diff: result.diff,
                    ..FileOutcome::new(path, FileStatus::Repaired)
                }
            }
            Err(err) => FileOutcome::failed(path, &err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::OutputOptions;
    use std::fs;
    use tempfile::TempDir;

    fn runner(options: WriteOptions) -> BatchRunner {
        BatchRunner::new(NoteReader::new(), NoteWriter::new(), options).with_jobs(2)
    }

    #[test]
    fn test_outcome_per_status() {
        let temp_dir = TempDir::new().unwrap();
        let glued = temp_dir.path().join("glued.md");
        let clean = temp_dir.path().join("clean.md");
        let plain = temp_dir.path().join("plain.md");
        let missing = temp_dir.path().join("missing.md");
        fs::write(&glued, "---\ntitle: \"foo\"---\nBody\n").unwrap();
        fs::write(&clean, "---\ntitle: \"Foo\"\n---\nBody\n").unwrap();
        fs::write(&plain, "# No front matter\n").unwrap();

        let files = vec![glued.clone(), clean, plain, missing];
        let report = runner(WriteOptions::default()).run(&files).unwrap();

        let statuses: Vec<FileStatus> = report.outcomes.iter().map(|o| o.status).collect();
        assert_eq!(
            statuses,
            vec![
                FileStatus::Repaired,
                FileStatus::Unchanged,
                FileStatus::Skipped,
                FileStatus::Failed
            ]
        );
        assert_eq!(report.scanned, 4);
        assert_eq!(report.repaired, 1);
        assert!(report.has_failures());
        assert_eq!(
            fs::read_to_string(&glued).unwrap(),
            "---\ntitle: \"foo\"\n---\nBody\n"
        );
        assert_eq!(report.with_status(FileStatus::Failed).count(), 1);
    }

    #[test]
    fn test_dry_run_keeps_files() {
        let temp_dir = TempDir::new().unwrap();
        let note = temp_dir.path().join("note.md");
        let original = "---\ntype: x\n]]---[[\n---\nBody\n";
        fs::write(&note, original).unwrap();

        let options = WriteOptions {
            dry_run: true,
            ..Default::default()
        };
        let report = runner(options).run(&[note.clone()]).unwrap();

        assert_eq!(report.repaired, 1);
        assert_eq!(report.dropped_lines, 1);
        assert!(report.outcomes[0].diff.as_deref().unwrap().contains("-]]---[["));
        assert_eq!(fs::read_to_string(&note).unwrap(), original);
    }

    #[test]
    fn test_output_clash_fails_both_notes() {
        let temp_dir = TempDir::new().unwrap();
        let out_dir = temp_dir.path().join("out");
        let first = temp_dir.path().join("A/note.md");
        let second = temp_dir.path().join("B/note.md");
        let other = temp_dir.path().join("B/other.md");
        for path in [&first, &second, &other] {
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "---\ntitle: \"foo\"---\nBody\n").unwrap();
        }

        let options = WriteOptions {
            output: Some(OutputOptions::Directory(out_dir.clone())),
            ..Default::default()
        };
        let report = runner(options).run(&[first, second, other]).unwrap();

        let statuses: Vec<FileStatus> = report.outcomes.iter().map(|o| o.status).collect();
        assert_eq!(
            statuses,
            vec![FileStatus::Failed, FileStatus::Failed, FileStatus::Repaired]
        );
        assert!(report.outcomes[0]
            .error
            .as_deref()
            .unwrap()
            .contains("2 notes would be written to"));
        assert!(!out_dir.join("note.md").exists());
        assert!(out_dir.join("other.md").exists());
    }

    #[test]
    fn test_resolved_notes_keep_relative_output_path() {
        let temp_dir = TempDir::new().unwrap();
        let out_dir = temp_dir.path().join("out");
        let files: Vec<ResolvedFile> = ["A/note.md", "B/note.md"]
            .iter()
            .map(|relative| {
                let path = temp_dir.path().join(relative);
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(&path, "---\ntitle: \"foo\"---\nBody\n").unwrap();
                ResolvedFile {
                    path,
                    relative: PathBuf::from(relative),
                }
            })
            .collect();

        let options = WriteOptions {
            output: Some(OutputOptions::Directory(out_dir.clone())),
            ..Default::default()
        };
        let report = runner(options).run_resolved(&files).unwrap();

        assert_eq!(report.repaired, 2);
        assert_eq!(report.outcomes[1].output_path, Some(out_dir.join("B/note.md")));
        for relative in ["A/note.md", "B/note.md"] {
            assert_eq!(
                fs::read_to_string(out_dir.join(relative)).unwrap(),
                "---\ntitle: \"foo\"\n---\nBody\n"
            );
        }
    }

    #[test]
    fn test_report_serializes() {
        let report = BatchReport::from_outcomes(vec![FileOutcome::new(
            Path::new("a.md"),
            FileStatus::Skipped,
        )]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["skipped"], 1);
        assert_eq!(json["outcomes"][0]["status"], "skipped");
        assert!(json["outcomes"][0].get("error").is_none());
    }

    #[test]
    fn test_with_jobs_zero_uses_default_pool() {
        let runner = runner(WriteOptions::default()).with_jobs(0);
        assert_eq!(runner.jobs, None);
        assert_eq!(runner.run(&[]).unwrap().scanned, 0);
    }
}
