//! Collecting the notes a run should touch
//!
//! Paths given on the command line may be files or directories. Directories
//! are walked recursively; excluded directories such as `Templates` are pruned
//! whole so nothing beneath them is ever read.

use crate::error::{MatterFixError, Result};
use crate::io::reader::is_markdown_file;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Configuration for file resolution
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Follow symbolic links
    pub follow_links: bool,
    /// Maximum recursion depth for directory traversal
    pub max_depth: Option<usize>,
    /// Include hidden files and directories (starting with .)
    pub include_hidden: bool,
    /// File extensions to include (if empty, any markdown extension)
    pub include_extensions: Vec<String>,
    /// Directory names pruned wherever they occur
    pub exclude_dirs: Vec<String>,
    /// Patterns to exclude (glob-style, matched against the full path)
    pub exclude_patterns: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            follow_links: false,
            max_depth: None,
            include_hidden: false,
            include_extensions: vec!["md".to_string()],
            exclude_dirs: vec!["Templates".to_string(), "backups".to_string()],
            exclude_patterns: Vec::new(),
        }
    }
}

/// File resolver for handling multiple files and directories
#[derive(Debug, Clone, Default)]
pub struct FileResolver {
    config: ResolverConfig,
}

/// A note selected for processing
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ResolvedFile {
    pub path: PathBuf,
    /// Path below the root it was found under; the file name when the note
    /// was named directly
    pub relative: PathBuf,
}

impl FileResolver {
    /// Create a new resolver with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new resolver with custom configuration
    pub fn with_config(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// Resolve paths to a sorted, de-duplicated list of notes.
    ///
    /// A note reachable from several arguments keeps the relative path of
    /// the first one that reached it.
    pub fn resolve_paths<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<ResolvedFile>> {
        let patterns = self.compile_patterns()?;
        let mut resolved: BTreeMap<PathBuf, PathBuf> = BTreeMap::new();

        for path in paths {
            let path = path.as_ref();
            if path.is_file() {
                // Explicitly named files skip directory pruning but not the filters
                if self.accepts_file(path, &patterns) {
                    let file = ResolvedFile::named(path);
                    resolved.entry(file.path).or_insert(file.relative);
                }
            } else if path.is_dir() {
                for file in self.traverse_directory(path, &patterns)? {
                    resolved.entry(file.path).or_insert(file.relative);
                }
            } else {
                return Err(MatterFixError::file_not_found(path));
            }
        }

        Ok(resolved
            .into_iter()
            .map(|(path, relative)| ResolvedFile { path, relative })
            .collect())
    }

    /// Walk a directory, pruning excluded subtrees
    fn traverse_directory(&self, root: &Path, patterns: &[Regex]) -> Result<Vec<ResolvedFile>> {
        let mut files = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(self.config.follow_links)
            .max_depth(self.config.max_depth.unwrap_or(usize::MAX))
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.prunes(entry));

        for entry in walker {
            let entry = entry.map_err(|e| {
                MatterFixError::path_resolution(format!("Error traversing directory: {}", e))
            })?;

            if entry.file_type().is_file() && self.accepts_file(entry.path(), patterns) {
                let relative = entry
                    .path()
                    .strip_prefix(root)
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|_| PathBuf::from(entry.file_name()));
                files.push(ResolvedFile {
                    path: entry.into_path(),
                    relative,
                });
            }
        }

        Ok(files)
    }

    /// Whether a walked entry (and everything below it) is skipped
    fn prunes(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        if !self.config.include_hidden && name.starts_with('.') {
            return true;
        }
        entry.file_type().is_dir() && self.config.exclude_dirs.iter().any(|dir| *dir == name)
    }

    fn accepts_file(&self, path: &Path, patterns: &[Regex]) -> bool {
        let extension_ok = if self.config.include_extensions.is_empty() {
            is_markdown_file(path)
        } else {
            path.extension()
                .map(|ext| ext.to_string_lossy().to_lowercase())
                .is_some_and(|ext| self.config.include_extensions.contains(&ext))
        };

        extension_ok && !is_excluded(path, patterns)
    }

    fn compile_patterns(&self) -> Result<Vec<Regex>> {
        self.config
            .exclude_patterns
            .iter()
            .map(|pattern| glob_to_regex(pattern))
            .collect()
    }

    /// Get the resolver configuration
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }
}

impl ResolvedFile {
    /// A note named directly, placed by its file name alone
    pub fn named<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let relative = path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| path.clone());
        Self { path, relative }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Whether `path` matches any compiled exclude pattern
pub fn is_excluded(path: &Path, patterns: &[Regex]) -> bool {
    let path_str = path.to_string_lossy();
    patterns.iter().any(|regex| regex.is_match(&path_str))
}

/// Convert a simple glob (`*` and `?`) into an anchored regex
fn glob_to_regex(pattern: &str) -> Result<Regex> {
    let mut regex_pattern = String::from("^");
    for ch in pattern.chars() {
        match ch {
            '*' => regex_pattern.push_str(".*"),
            '?' => regex_pattern.push('.'),
            other => regex_pattern.push_str(&regex::escape(&other.to_string())),
        }
    }
    regex_pattern.push('$');
    Ok(Regex::new(&regex_pattern)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_vault(dir: &Path) {
        fs::write(dir.join("a.md"), "# A").unwrap();
        fs::write(dir.join("readme.txt"), "Not markdown").unwrap();
        fs::write(dir.join(".hidden.md"), "# Hidden").unwrap();

        fs::create_dir_all(dir.join("Notes/Deep")).unwrap();
        fs::write(dir.join("Notes/b.md"), "# B").unwrap();
        fs::write(dir.join("Notes/Deep/c.md"), "# C").unwrap();

        fs::create_dir_all(dir.join("Templates")).unwrap();
        fs::write(dir.join("Templates/t.md"), "# T").unwrap();
        fs::create_dir_all(dir.join("Notes/backups")).unwrap();
        fs::write(dir.join("Notes/backups/old.md"), "# Old").unwrap();
        fs::create_dir_all(dir.join(".obsidian")).unwrap();
        fs::write(dir.join(".obsidian/workspace.md"), "# W").unwrap();
    }

    fn relative(root: &Path, files: &[ResolvedFile]) -> Vec<String> {
        files
            .iter()
            .map(|f| {
                f.path()
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_resolve_directory_prunes_excluded() {
        let temp_dir = TempDir::new().unwrap();
        create_vault(temp_dir.path());

        let resolved = FileResolver::new().resolve_paths(&[temp_dir.path()]).unwrap();
        assert_eq!(
            relative(temp_dir.path(), &resolved),
            vec!["Notes/Deep/c.md", "Notes/b.md", "a.md"]
        );
    }

    #[test]
    fn test_include_hidden() {
        let temp_dir = TempDir::new().unwrap();
        create_vault(temp_dir.path());

        let resolver = FileResolver::with_config(ResolverConfig {
            include_hidden: true,
            ..Default::default()
        });
        let resolved = relative(temp_dir.path(), &resolver.resolve_paths(&[temp_dir.path()]).unwrap());
        assert!(resolved.contains(&".hidden.md".to_string()));
        assert!(resolved.contains(&".obsidian/workspace.md".to_string()));
        assert!(!resolved.contains(&"Templates/t.md".to_string()));
    }

    #[test]
    fn test_max_depth() {
        let temp_dir = TempDir::new().unwrap();
        create_vault(temp_dir.path());

        let resolver = FileResolver::with_config(ResolverConfig {
            max_depth: Some(1),
            ..Default::default()
        });
        let resolved = resolver.resolve_paths(&[temp_dir.path()]).unwrap();
        assert_eq!(relative(temp_dir.path(), &resolved), vec!["a.md"]);
    }

    #[test]
    fn test_exclude_patterns() {
        let temp_dir = TempDir::new().unwrap();
        create_vault(temp_dir.path());

        let resolver = FileResolver::with_config(ResolverConfig {
            exclude_patterns: vec!["*/Deep/*".to_string()],
            ..Default::default()
        });
        let resolved = resolver.resolve_paths(&[temp_dir.path()]).unwrap();
        assert_eq!(relative(temp_dir.path(), &resolved), vec!["Notes/b.md", "a.md"]);
    }

    #[test]
    fn test_explicit_file_and_duplicates() {
        let temp_dir = TempDir::new().unwrap();
        create_vault(temp_dir.path());
        let note = temp_dir.path().join("a.md");

        let resolved = FileResolver::new()
            .resolve_paths(&[note.clone(), note.clone(), temp_dir.path().join("readme.txt")])
            .unwrap();
        assert_eq!(resolved, vec![ResolvedFile::named(&note)]);
        assert_eq!(resolved[0].relative, PathBuf::from("a.md"));
    }

    #[test]
    fn test_relative_paths_follow_the_root() {
        let temp_dir = TempDir::new().unwrap();
        create_vault(temp_dir.path());

        let resolved = FileResolver::new()
            .resolve_paths(&[temp_dir.path().join("Notes"), temp_dir.path().to_path_buf()])
            .unwrap();
        let relatives: Vec<_> = resolved.iter().map(|f| f.relative.clone()).collect();
        assert_eq!(
            relatives,
            vec![
                PathBuf::from("Deep/c.md"),
                PathBuf::from("b.md"),
                PathBuf::from("a.md"),
            ]
        );
    }

    #[test]
    fn test_missing_path() {
        let result = FileResolver::new().resolve_paths(&["/nonexistent/vault"]);
        assert!(matches!(
            result.unwrap_err(),
            MatterFixError::FileNotFound { .. }
        ));
    }

    #[test]
    fn test_glob_to_regex() {
        let regex = glob_to_regex("*.draft.md").unwrap();
        assert!(regex.is_match("notes/idea.draft.md"));
        assert!(!regex.is_match("notes/idea.md"));

        let regex = glob_to_regex("note?.md").unwrap();
        assert!(regex.is_match("note1.md"));
        assert!(!regex.is_match("note10.md"));
        assert!(is_excluded(Path::new("note1.md"), &[regex]));
    }
}
