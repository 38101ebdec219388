//! CLI command handlers that bridge CLI arguments to library operations

use crate::cli_bin::args::*;
use log::{debug, info, warn};
use matterfix::batch::{BatchReport, BatchRunner, FileStatus};
use matterfix::error::{MatterFixError, Result};
use matterfix::io::{
    FileResolver, NoteReader, NoteWriter, OutputOptions, ReaderConfig, ResolvedFile,
    ResolverConfig, WriteOptions as LibWriteOptions, WriterConfig,
};
use std::path::PathBuf;

/// Execute the fix command
pub fn fix_command(args: FixArgs) -> Result<()> {
    debug!("Executing fix command with args: {:?}", args);

    let files = resolve_files(&args.files)?;
    if files.is_empty() {
        warn!("No files found to process");
        return Ok(());
    }

    let runner = BatchRunner::new(
        create_reader(&args.files),
        create_writer(&args.write_options),
        create_write_options(&args.write_options),
    )
    .with_jobs(args.files.jobs);
    let report = runner.run_resolved(&files)?;

    match args.format {
        ReportFormat::Human => {
            for outcome in report.with_status(FileStatus::Repaired) {
                if args.write_options.dry_run {
                    if let Some(ref diff) = outcome.diff {
                        println!("{}", diff);
                    }
                } else {
                    println!("repaired: {}", outcome.path.display());
                }
            }
            output_failures(&report);
            output_summary(&report);
        }
        ReportFormat::Json => output_json(&report)?,
    }

    if report.has_failures() {
        return Err(MatterFixError::validation(format!(
            "{} files could not be processed",
            report.failed
        )));
    }
    Ok(())
}

/// Execute the check command
pub fn check_command(args: CheckArgs) -> Result<()> {
    debug!("Executing check command with args: {:?}", args);

    let files = resolve_files(&args.files)?;
    if files.is_empty() {
        warn!("No files found to process");
        return Ok(());
    }

    let options = LibWriteOptions {
        dry_run: true,
        ..Default::default()
    };
    let runner = BatchRunner::new(create_reader(&args.files), NoteWriter::new(), options)
        .with_jobs(args.files.jobs);
    let report = runner.run_resolved(&files)?;

    match args.format {
        ReportFormat::Human => {
            for outcome in report.with_status(FileStatus::Repaired) {
                println!("{}", outcome.path.display());
                if args.diff {
                    if let Some(ref diff) = outcome.diff {
                        println!("{}", diff);
                    }
                }
            }
            output_failures(&report);
        }
        ReportFormat::Json => output_json(&report)?,
    }

    if report.repaired > 0 || report.has_failures() {
        return Err(MatterFixError::validation(format!(
            "{} of {} notes need repair, {} could not be read",
            report.repaired, report.scanned, report.failed
        )));
    }

    info!("All {} notes are clean", report.scanned);
    Ok(())
}

/// Execute the validate command
pub fn validate_command(args: ValidateArgs) -> Result<()> {
    debug!("Executing validate command");

    let files = resolve_files(&args.files)?;
    if files.is_empty() {
        warn!("No files found to process");
        return Ok(());
    }

    let reader = create_reader(&args.files);
    let mut validation_results = Vec::new();
    let mut error_count = 0;

    for ResolvedFile { path: file, .. } in files {
        debug!("Validating file: {}", file.display());

        let result = reader
            .read_file(&file)
            .and_then(|document| document.parse_front_matter().map(|_| ()));

        if let Err(ref error) = result {
            if args.fail_fast {
                return Err(MatterFixError::validation(format!(
                    "Validation failed for {}: {}",
                    file.display(),
                    error
                )));
            }
            error_count += 1;
        }
        validation_results.push((file, result));
    }

    output_validation_results(&validation_results, args.format)?;

    if error_count > 0 {
        return Err(MatterFixError::validation(format!(
            "{} files failed validation",
            error_count
        )));
    }

    info!("All {} files passed validation", validation_results.len());
    Ok(())
}

fn resolve_files(file_options: &CommonFileOptions) -> Result<Vec<ResolvedFile>> {
    let defaults = ResolverConfig::default();
    let config = ResolverConfig {
        follow_links: file_options.follow_links,
        max_depth: file_options.max_depth,
        include_hidden: file_options.include_hidden,
        include_extensions: if file_options.extensions.is_empty() {
            defaults.include_extensions
        } else {
            file_options
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect()
        },
        exclude_dirs: if file_options.exclude_dirs.is_empty() {
            defaults.exclude_dirs
        } else {
            file_options.exclude_dirs.clone()
        },
        exclude_patterns: file_options.exclude_patterns.clone(),
    };

    FileResolver::with_config(config).resolve_paths(&file_options.files)
}

fn create_reader(file_options: &CommonFileOptions) -> NoteReader {
    let max_file_size = match file_options.max_file_size {
        Some(0) => None,
        Some(limit) => Some(limit),
        None => ReaderConfig::default().max_file_size,
    };

    NoteReader::with_config(ReaderConfig { max_file_size })
}

/// Backup settings live here only; per-run options leave them to the writer

fn create_writer(write_options: &WriteOptions) -> NoteWriter {
    let config = WriterConfig {
        backup_enabled: write_options.backup_suffix.is_some() || write_options.backup_dir.is_some(),
        backup_suffix: write_options.backup_suffix.clone(),
        backup_dir: write_options.backup_dir.clone(),
        atomic_writes: !write_options.no_atomic,
    };

    NoteWriter::with_config(config)
}

fn create_write_options(write_options: &WriteOptions) -> LibWriteOptions {
    let output = match write_options.output_dir {
        Some(ref output_dir) => OutputOptions::Directory(output_dir.clone()),
        None => OutputOptions::InPlace,
    };

    LibWriteOptions {
        backup: None,
        output: Some(output),
        dry_run: write_options.dry_run,
    }
}

fn output_failures(report: &BatchReport) {
    for outcome in report.with_status(FileStatus::Failed) {
        eprintln!(
            "failed: {}: {}",
            outcome.path.display(),
            outcome.error.as_deref().unwrap_or("unknown error")
        );
    }
}

fn output_summary(report: &BatchReport) {
    println!(
        "{} scanned, {} repaired, {} unchanged, {} without front matter, {} failed",
        report.scanned, report.repaired, report.unchanged, report.skipped, report.failed
    );
    if report.dropped_lines > 0 {
        println!("{} unrecoverable lines dropped", report.dropped_lines);
    }

    let flagged: Vec<_> = report
        .outcomes
        .iter()
        .filter_map(|o| o.report.as_ref().map(|r| (&o.path, &r.review_lines)))
        .filter(|(_, lines)| !lines.is_empty())
        .collect();
    if !flagged.is_empty() {
        println!("{} lines need review:", report.review_lines);
        for (path, lines) in flagged {
            for line in lines {
                println!("  {}: {}", path.display(), line);
            }
        }
    }
}

fn output_json(report: &BatchReport) -> Result<()> {
    let output = serde_json::to_string_pretty(report)
        .map_err(|e| MatterFixError::validation(e.to_string()))?;
    println!("{}", output);
    Ok(())
}

fn output_validation_results(
    results: &[(PathBuf, Result<()>)],
    format: ReportFormat,
) -> Result<()> {
    match format {
        ReportFormat::Human => {
            for (path, result) in results {
                match result {
                    Ok(()) => println!("{}: ✓ OK", path.display()),
                    Err(error) => println!("{}: ✗ ERROR - {}", path.display(), error),
                }
            }
        }
        ReportFormat::Json => {
            let json_results: Vec<serde_json::Value> = results
                .iter()
                .map(|(path, result)| {
                    serde_json::json!({
                        "file": path.to_string_lossy(),
                        "valid": result.is_ok(),
                        "error": result.as_ref().err().map(|e| e.to_string()),
                    })
                })
                .collect();

            let output = serde_json::to_string_pretty(&json_results)
                .map_err(|e| MatterFixError::validation(e.to_string()))?;
            println!("{}", output);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn fix_args(args: &[&str]) -> FixArgs {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Fix(fix_args) => fix_args,
            _ => panic!("Expected Fix command"),
        }
    }

    #[test]
    fn test_reader_size_limit() {
        let args = fix_args(&["matterfix", "fix", "--max-file-size", "2048", "vault/"]);
        assert_eq!(create_reader(&args.files).config().max_file_size, Some(2048));

        let args = fix_args(&["matterfix", "fix", "--max-file-size", "0", "vault/"]);
        assert_eq!(create_reader(&args.files).config().max_file_size, None);

        let args = fix_args(&["matterfix", "fix", "vault/"]);
        assert_eq!(
            create_reader(&args.files).config().max_file_size,
            ReaderConfig::default().max_file_size
        );
    }

    #[test]
    fn test_backups_configured_on_writer_only() {
        let args = fix_args(&[
            "matterfix",
            "fix",
            "--backup-dir",
            "saved",
            "--output-dir",
            "out",
            "vault/",
        ]);

        let writer = create_writer(&args.write_options);
        assert!(writer.config().backup_enabled);
        assert_eq!(writer.config().backup_dir, Some(PathBuf::from("saved")));

        let options = create_write_options(&args.write_options);
        assert!(options.backup.is_none());
        assert!(matches!(
            options.output,
            Some(OutputOptions::Directory(ref dir)) if dir == &PathBuf::from("out")
        ));
    }
}
