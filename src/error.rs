//! Error types for the matterfix library
//!
//! The repair engine itself never fails: malformed front matter is its input,
//! not an error. Everything here belongs to the I/O layer around it (reading
//! and writing notes, walking directories, validating blocks as YAML).

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for all library operations
#[derive(Error, Debug)]
pub enum MatterFixError {
    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Regular expression errors from exclude patterns
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Worker pool could not be started
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// File not found or invalid path
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Path exists but is not a regular file
    #[error("Invalid file format: {path} (expected a text note)")]
    InvalidFileFormat { path: PathBuf },

    /// Front matter could not be read as a YAML mapping
    #[error("Invalid front matter in {path}: {reason}")]
    InvalidFrontMatter { path: PathBuf, reason: String },

    /// Path resolution errors
    #[error("Path resolution error: {reason}")]
    PathResolution { reason: String },

    /// Backup operation errors
    #[error("Backup error: {reason}")]
    BackupError { reason: String },

    /// Permission errors
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Generic validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, MatterFixError>;

impl MatterFixError {
    /// Create a new file not found error
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a new invalid file format error
    pub fn invalid_file_format(path: impl Into<PathBuf>) -> Self {
        Self::InvalidFileFormat { path: path.into() }
    }

    /// Create a new invalid front matter error
    pub fn invalid_front_matter(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidFrontMatter {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a new path resolution error
    pub fn path_resolution(reason: impl Into<String>) -> Self {
        Self::PathResolution {
            reason: reason.into(),
        }
    }

    /// Create a new backup error
    pub fn backup_error(reason: impl Into<String>) -> Self {
        Self::BackupError {
            reason: reason.into(),
        }
    }

    /// Create a new permission denied error
    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        Self::PermissionDenied { path: path.into() }
    }

    /// Create a new validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Get the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::FileNotFound { .. } | Self::PermissionDenied { .. } | Self::ThreadPool(_) => {
                ErrorSeverity::Critical
            }
            Self::InvalidFrontMatter { .. } | Self::BackupError { .. } => ErrorSeverity::High,
            Self::Validation { .. } | Self::PathResolution { .. } => ErrorSeverity::Low,
            _ => ErrorSeverity::Medium,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}
