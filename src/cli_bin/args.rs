//! Command-line argument definitions and parsing

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Main CLI application
#[derive(Parser)]
#[command(
    name = "matterfix",
    version,
    about = "Repair corrupted YAML front matter across a vault of markdown notes",
    long_about = "matterfix locates front matter blocks even when their delimiters are \
                  damaged, separates glued key/value pairs, normalizes list and title \
                  fields and rewrites each block in canonical form. Note bodies are never \
                  touched."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Repair front matter in place
    Fix(FixArgs),
    /// List notes whose front matter would be repaired (exits non-zero if any)
    Check(CheckArgs),
    /// Check that each front matter block parses as a YAML mapping
    Validate(ValidateArgs),
}

/// Common options for file operations
#[derive(Args, Debug, Clone)]
pub struct CommonFileOptions {
    /// Files or directories to process
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Follow symbolic links when processing directories
    #[arg(long)]
    pub follow_links: bool,

    /// Maximum depth for directory recursion
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Include hidden files and directories (starting with .)
    #[arg(long)]
    pub include_hidden: bool,

    /// Only process files with these extensions
    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Skip directories with this name (default: Templates, backups)
    #[arg(long = "exclude", value_name = "DIR")]
    pub exclude_dirs: Vec<String>,

    /// Skip files whose path matches this glob pattern
    #[arg(long = "exclude-pattern", value_name = "PATTERN")]
    pub exclude_patterns: Vec<String>,

    /// Skip notes larger than this many bytes (default: 10 MiB, 0 for no limit)
    #[arg(long, value_name = "BYTES")]
    pub max_file_size: Option<usize>,

    /// Number of worker threads (default: one per CPU)
    #[arg(short, long, value_name = "N", default_value_t = 0)]
    pub jobs: usize,
}

/// Common options for write operations
#[derive(Args, Debug, Clone, Default)]
pub struct WriteOptions {
    /// Preview changes without modifying files (show diff)
    #[arg(long)]
    pub dry_run: bool,

    /// Create backup files with this suffix
    #[arg(long, value_name = "SUFFIX")]
    pub backup_suffix: Option<String>,

    /// Create backup files in this directory
    #[arg(long, value_name = "DIR")]
    pub backup_dir: Option<PathBuf>,

    /// Write repaired files to this directory
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Write files directly instead of through a temporary file
    #[arg(long)]
    pub no_atomic: bool,
}

/// Arguments for the fix command
#[derive(Args, Debug)]
pub struct FixArgs {
    #[command(flatten)]
    pub files: CommonFileOptions,

    #[command(flatten)]
    pub write_options: WriteOptions,

    /// Output format for the summary
    #[arg(long, value_enum, default_value = "human")]
    pub format: ReportFormat,
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub files: CommonFileOptions,

    /// Print the diff for each note that would change
    #[arg(long)]
    pub diff: bool,

    /// Output format for the results
    #[arg(long, value_enum, default_value = "human")]
    pub format: ReportFormat,
}

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub files: CommonFileOptions,

    /// Exit with non-zero code on first validation error
    #[arg(long)]
    pub fail_fast: bool,

    /// Output format for validation results
    #[arg(long, value_enum, default_value = "human")]
    pub format: ReportFormat,
}

/// Output formats for reports
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parsing() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_fix_command() {
        let args = vec!["matterfix", "fix", "vault/"];
        let cli = Cli::try_parse_from(args).unwrap();

        if let Commands::Fix(fix_args) = cli.command {
            assert_eq!(fix_args.files.files, vec![PathBuf::from("vault/")]);
            assert_eq!(fix_args.files.jobs, 0);
            assert!(!fix_args.write_options.dry_run);
            assert_eq!(fix_args.format, ReportFormat::Human);
        } else {
            panic!("Expected Fix command");
        }
    }

    #[test]
    fn test_write_options() {
        let args = vec![
            "matterfix",
            "fix",
            "--dry-run",
            "--backup-suffix",
            ".bak",
            "--no-atomic",
            "--format",
            "json",
            "note.md",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        if let Commands::Fix(fix_args) = cli.command {
            assert!(fix_args.write_options.dry_run);
            assert!(fix_args.write_options.no_atomic);
            assert_eq!(fix_args.write_options.backup_suffix, Some(".bak".to_string()));
            assert_eq!(fix_args.format, ReportFormat::Json);
        } else {
            panic!("Expected Fix command");
        }
    }

    #[test]
    fn test_exclusions_and_jobs() {
        let args = vec![
            "matterfix",
            "check",
            "--exclude",
            "Archive",
            "--exclude-pattern",
            "*.draft.md",
            "-j",
            "4",
            "vault/",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        if let Commands::Check(check_args) = cli.command {
            assert_eq!(check_args.files.exclude_dirs, vec!["Archive".to_string()]);
            assert_eq!(check_args.files.exclude_patterns, vec!["*.draft.md".to_string()]);
            assert_eq!(check_args.files.jobs, 4);
            assert_eq!(check_args.files.max_file_size, None);
        } else {
            panic!("Expected Check command");
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["matterfix", "validate", "note.md", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(Cli::try_parse_from(["matterfix", "-v", "-q", "validate", "note.md"]).is_err());
    }

    #[test]
    fn test_paths_required() {
        assert!(Cli::try_parse_from(["matterfix", "fix"]).is_err());
    }
}
