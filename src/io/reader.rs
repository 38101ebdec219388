//! Reading notes from disk

use crate::core::Document;
use crate::error::{MatterFixError, Result};
use std::fs;
use std::path::Path;

/// Configuration for the note reader
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Maximum file size to read (in bytes)
    pub max_file_size: Option<usize>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_file_size: Some(10 * 1024 * 1024), // 10MB default limit
        }
    }
}

/// Note reader
#[derive(Debug, Clone, Default)]
pub struct NoteReader {
    config: ReaderConfig,
}

impl NoteReader {
    /// Create a new reader with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new reader with custom configuration
    pub fn with_config(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Read a note from a file path
    pub fn read_file<P: AsRef<Path>>(&self, path: P) -> Result<Document> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(MatterFixError::file_not_found(path));
        }

        if !path.is_file() {
            return Err(MatterFixError::invalid_file_format(path));
        }

        if let Some(max_size) = self.config.max_file_size {
            let metadata = fs::metadata(path).map_err(MatterFixError::Io)?;

            if metadata.len() as usize > max_size {
                return Err(MatterFixError::validation(format!(
                    "File too large: {} ({} bytes, limit: {} bytes)",
                    path.display(),
                    metadata.len(),
                    max_size
                )));
            }
        }

        let text = fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => MatterFixError::permission_denied(path),
            _ => MatterFixError::Io(e),
        })?;

        Ok(Document::new(text).with_path(path))
    }

    /// Get reader configuration
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }
}

/// Check if a path points to a markdown file
pub fn is_markdown_file<P: AsRef<Path>>(path: P) -> bool {
    match path.as_ref().extension() {
        Some(ext) => {
            let ext_str = ext.to_string_lossy().to_lowercase();
            matches!(
                ext_str.as_str(),
                "md" | "markdown" | "mdown" | "mkd" | "mkdn"
            )
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_file(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".md").unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_read_file_with_front_matter() {
        let file = create_test_file(b"---\ntitle: Test\n---\n# Hello World\n");
        let doc = NoteReader::new().read_file(file.path()).unwrap();

        assert!(doc.has_front_matter());
        assert_eq!(doc.body(), "# Hello World\n");
        assert_eq!(doc.path(), Some(file.path()));
    }

    #[test]
    fn test_read_missing_file() {
        let result = NoteReader::new().read_file("/nonexistent/note.md");
        assert!(matches!(
            result.unwrap_err(),
            MatterFixError::FileNotFound { .. }
        ));
    }

    #[test]
    fn test_read_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = NoteReader::new().read_file(dir.path());
        assert!(matches!(
            result.unwrap_err(),
            MatterFixError::InvalidFileFormat { .. }
        ));
    }

    #[test]
    fn test_file_size_limit() {
        let file = create_test_file(&[b'a'; 64]);
        let reader = NoteReader::with_config(ReaderConfig {
            max_file_size: Some(16),
        });
        assert!(matches!(
            reader.read_file(file.path()).unwrap_err(),
            MatterFixError::Validation { .. }
        ));
        assert_eq!(reader.config().max_file_size, Some(16));
    }

    #[test]
    fn test_invalid_utf8_is_io_error() {
        let file = create_test_file(&[0x2d, 0x2d, 0x2d, 0x0a, 0xff, 0xfe]);
        assert!(matches!(
            NoteReader::new().read_file(file.path()).unwrap_err(),
            MatterFixError::Io(_)
        ));
    }

    #[test]
    fn test_is_markdown_file() {
        assert!(is_markdown_file("test.md"));
        assert!(is_markdown_file("test.MD"));
        assert!(is_markdown_file("test.markdown"));
        assert!(!is_markdown_file("test.txt"));
        assert!(!is_markdown_file("test"));
    }
}
