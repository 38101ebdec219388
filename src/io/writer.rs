//! Writing repaired notes with atomic replacement, backups and previews
//!
//! The writer never formats anything itself: it receives the complete
//! replacement text from the repair engine and only decides where and how it
//! lands on disk.

use crate::error::{MatterFixError, Result};
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;

/// Configuration for the note writer
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Create backup files before writing
    pub backup_enabled: bool,
    /// Backup file suffix (e.g., ".bak")
    pub backup_suffix: Option<String>,
    /// Backup directory (if None, backups go in same directory)
    pub backup_dir: Option<PathBuf>,
    /// Use atomic writes (write to temp file first, then rename)
    pub atomic_writes: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            backup_enabled: false,
            backup_suffix: None,
            backup_dir: None,
            atomic_writes: true,
        }
    }
}

/// Note writer
#[derive(Debug, Clone, Default)]
pub struct NoteWriter {
    config: WriterConfig,
}

/// Write operation options for individual operations
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Override backup settings for this operation
    pub backup: Option<BackupOptions>,
    /// Override output settings for this operation
    pub output: Option<OutputOptions>,
    /// Dry run - generate diff without writing
    pub dry_run: bool,
}

/// Backup options
#[derive(Debug, Clone)]
pub struct BackupOptions {
    /// Enable backup for this operation
    pub enabled: bool,
    /// Backup suffix
    pub suffix: Option<String>,
    /// Backup directory
    pub directory: Option<PathBuf>,
}

/// Output options
#[derive(Debug, Clone)]
pub enum OutputOptions {
    /// Write to the original file (default)
    InPlace,
    /// Write to a directory, preserving the note's relative path
    Directory(PathBuf),
}

/// Result of a write operation
#[derive(Debug)]
pub struct WriteResult {
    /// Whether the file was actually modified
    pub modified: bool,
    /// Path where the content was written
    pub output_path: Option<PathBuf>,
    /// Path of backup file if created
    pub backup_path: Option<PathBuf>,
    /// Diff showing changes (for dry-run)
    pub diff: Option<String>,
}

impl NoteWriter {
    /// Create a new writer with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new writer with custom configuration
    pub fn with_config(config: WriterConfig) -> Self {
        Self { config }
    }

    /// Replace the note at `path`, whose current text is `original`, with `new_text`
    pub fn write_text<P: AsRef<Path>>(
        &self,
        path: P,
        original: &str,
        new_text: &str,
        options: Option<&WriteOptions>,
    ) -> Result<WriteResult> {
        self.write_text_as(path.as_ref(), None, original, new_text, options)
    }

    /// Like [`write_text`](Self::write_text), placing the note at `relative`
    /// below an output directory instead of at its bare file name
    pub fn write_text_as(
        &self,
        path: &Path,
        relative: Option<&Path>,
        original: &str,
        new_text: &str,
        options: Option<&WriteOptions>,
    ) -> Result<WriteResult> {
        let default_options = WriteOptions::default();
        let options = options.unwrap_or(&default_options);
        let content_changed = original != new_text;
        let target_path = output_path(path, relative, options)?;

        if options.dry_run {
            return Ok(WriteResult {
                modified: content_changed,
                output_path: Some(target_path),
                backup_path: None,
                diff: generate_diff(original, new_text, path),
            });
        }

        // A copy into an output directory is always written
        let needs_write = content_changed || target_path != path;
        self.write_to_file(&target_path, new_text, options, needs_write)
    }

    /// Write content to a specific file path
    fn write_to_file(
        &self,
        path: &Path,
        content: &str,
        options: &WriteOptions,
        content_changed: bool,
    ) -> Result<WriteResult> {
        let mut result = WriteResult {
            modified: content_changed,
            output_path: Some(path.to_path_buf()),
            backup_path: None,
            diff: None,
        };

        if !content_changed {
            return Ok(result);
        }

        if self.should_create_backup(options) && path.exists() {
            result.backup_path = Some(self.create_backup(path, options)?);
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(MatterFixError::Io)?;
            }
        }

        if self.config.atomic_writes {
            self.write_atomic(path, content)?;
        } else {
            fs::write(path, content).map_err(MatterFixError::Io)?;
        }

        Ok(result)
    }

    /// Check if backup should be created
    fn should_create_backup(&self, options: &WriteOptions) -> bool {
        match options.backup {
            Some(ref backup_opts) => backup_opts.enabled,
            None => self.config.backup_enabled,
        }
    }

    /// Create a backup file
    fn create_backup(&self, original_path: &Path, options: &WriteOptions) -> Result<PathBuf> {
        let (suffix, directory) = match options.backup {
            Some(ref backup_opts) => (backup_opts.suffix.as_deref(), backup_opts.directory.as_ref()),
            None => (self.config.backup_suffix.as_deref(), self.config.backup_dir.as_ref()),
        };
        let suffix = suffix.unwrap_or(".bak");

        let filename = original_path.file_name().ok_or_else(|| {
            MatterFixError::backup_error("Could not extract filename for backup".to_string())
        })?;
        let backup_name = format!("{}{}", filename.to_string_lossy(), suffix);

        let backup_path = match directory {
            Some(dir) => {
                fs::create_dir_all(dir).map_err(|e| {
                    MatterFixError::backup_error(format!("Could not create backup directory: {}", e))
                })?;
                dir.join(backup_name)
            }
            None => original_path.with_file_name(backup_name),
        };

        fs::copy(original_path, &backup_path)
            .map_err(|e| MatterFixError::backup_error(format!("Failed to create backup: {}", e)))?;

        Ok(backup_path)
    }

    /// Write file atomically using temporary file
    fn write_atomic(&self, path: &Path, content: &str) -> Result<()> {
        let parent_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp_file = NamedTempFile::new_in(parent_dir).map_err(MatterFixError::Io)?;

        temp_file
            .write_all(content.as_bytes())
            .map_err(MatterFixError::Io)?;
        temp_file.flush().map_err(MatterFixError::Io)?;

        // Keep the note's permissions rather than the temp file's 0600
        if let Ok(metadata) = fs::metadata(path) {
            fs::set_permissions(temp_file.path(), metadata.permissions())
                .map_err(MatterFixError::Io)?;
        }

        temp_file.persist(path).map_err(|e| {
            MatterFixError::Io(std::io::Error::other(format!(
                "Failed to persist temporary file: {}",
                e
            )))
        })?;

        Ok(())
    }

    /// Get writer configuration
    pub fn config(&self) -> &WriterConfig {
        &self.config
    }
}

/// Where a note at `path` lands under `options`.
///
/// `relative` must stay below the output directory; absolute paths and `..`
/// components are refused.
pub fn output_path(
    path: &Path,
    relative: Option<&Path>,
    options: &WriteOptions,
) -> Result<PathBuf> {
    let target_dir = match options.output.as_ref() {
        Some(OutputOptions::Directory(dir)) => dir,
        Some(OutputOptions::InPlace) | None => return Ok(path.to_path_buf()),
    };

    let relative = match relative {
        Some(relative) => relative,
        None => path.file_name().map(Path::new).ok_or_else(|| {
            MatterFixError::path_resolution(format!(
                "Could not extract filename from {}",
                path.display()
            ))
        })?,
    };
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes || relative.as_os_str().is_empty() {
        return Err(MatterFixError::path_resolution(format!(
            "Output path {} leaves {}",
            relative.display(),
            target_dir.display()
        )));
    }

    Ok(target_dir.join(relative))
}

/// Line diff between old and new content, `None` when identical
pub fn generate_diff(old_content: &str, new_content: &str, path: &Path) -> Option<String> {
    if old_content == new_content {
        return None;
    }

    let old_lines: Vec<&str> = old_content.lines().collect();
    let new_lines: Vec<&str> = new_content.lines().collect();

    let mut diff_lines = Vec::new();
    diff_lines.push(format!("--- {}", path.display()));
    diff_lines.push(format!("+++ {}", path.display()));

    // Find common prefix and suffix to minimize diff size
    let common_prefix = old_lines
        .iter()
        .zip(new_lines.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let old_rest = &old_lines[common_prefix..];
    let new_rest = &new_lines[common_prefix..];

    let common_suffix = old_rest
        .iter()
        .rev()
        .zip(new_rest.iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let old_middle = &old_rest[..old_rest.len() - common_suffix];
    let new_middle = &new_rest[..new_rest.len() - common_suffix];

    if old_middle.is_empty() && new_middle.is_empty() {
        // Only line terminators differ
        diff_lines.push("@@ line endings @@".to_string());
        return Some(diff_lines.join("\n"));
    }

    diff_lines.push(format!(
        "@@ -{},{} +{},{} @@",
        common_prefix + 1,
        old_middle.len(),
        common_prefix + 1,
        new_middle.len()
    ));
    diff_lines.extend(old_middle.iter().map(|line| format!("-{}", line)));
    diff_lines.extend(new_middle.iter().map(|line| format!("+{}", line)));

    Some(diff_lines.join("\n"))
}
