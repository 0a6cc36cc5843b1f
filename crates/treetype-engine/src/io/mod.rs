use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::document::SnippetDocument;
use crate::language::Language;

pub const DEFAULT_MIN_LINES: usize = 5;
pub const DEFAULT_WARN_LINES: usize = 200;
pub const DEFAULT_OUTPUT_ROOT: &str = "snippets";

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("Not a file: {0}")]
    NotAFile(PathBuf),
    #[error("Unsupported file extension: {0}")]
    UnsupportedExtension(PathBuf),
    #[error("{path} has {lines} lines, at least {min} are required")]
    TooShort {
        path: PathBuf,
        lines: usize,
        min: usize,
    },
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to serialize document for {path}: {source}")]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Directory not found: {0}")]
    InvalidDir(PathBuf),
}

/// Line-count thresholds for accepting a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLimits {
    pub min_lines: usize,
    /// Longer files are accepted with a warning.
    pub warn_lines: usize,
}

impl Default for SourceLimits {
    fn default() -> Self {
        SourceLimits {
            min_lines: DEFAULT_MIN_LINES,
            warn_lines: DEFAULT_WARN_LINES,
        }
    }
}

/// A source file that passed the input checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub language: Language,
    pub text: String,
}

impl SourceFile {
    pub fn line_count(&self) -> usize {
        self.text.lines().count()
    }
}

/// Reads a source file, deriving its language from the extension.
pub fn load_source(path: &Path, limits: &SourceLimits) -> Result<SourceFile, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(IoError::NotAFile(path.to_path_buf()));
    }
    let language = Language::from_path(path)
        .ok_or_else(|| IoError::UnsupportedExtension(path.to_path_buf()))?;

    // Non-UTF-8 content surfaces here as InvalidData
    let text = fs::read_to_string(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let lines = text.lines().count();
    if lines < limits.min_lines {
        return Err(IoError::TooShort {
            path: path.to_path_buf(),
            lines,
            min: limits.min_lines,
        });
    }
    if lines > limits.warn_lines {
        log::warn!(
            "{} has {lines} lines (more than {}); encoding anyway",
            path.display(),
            limits.warn_lines
        );
    }

    Ok(SourceFile {
        path: path.to_path_buf(),
        language,
        text,
    })
}

/// `<output_root>/<language>/<file_stem>.json`
pub fn default_output_path(output_root: &Path, source: &Path, language: Language) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "snippet".to_string());
    output_root
        .join(language.name())
        .join(format!("{stem}.json"))
}

/// Writes the document as pretty JSON, replacing `destination` atomically.
///
/// The JSON goes to a temporary file next to the destination first; if
/// anything fails the temporary file is dropped and the destination is left
/// untouched.
pub fn write_document(document: &SnippetDocument, destination: &Path) -> Result<(), IoError> {
    let json = document.to_json().map_err(|source| IoError::Serialize {
        path: destination.to_path_buf(),
        source,
    })?;

    let write_err = |source| IoError::Write {
        path: destination.to_path_buf(),
        source,
    };

    let parent = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(write_err)?;

    let mut temp = NamedTempFile::new_in(parent).map_err(write_err)?;
    temp.write_all(json.as_bytes()).map_err(write_err)?;
    temp.write_all(b"\n").map_err(write_err)?;
    temp.as_file().sync_all().map_err(write_err)?;
    temp.persist(destination).map_err(|e| write_err(e.error))?;

    log::debug!("wrote {}", destination.display());
    Ok(())
}

/// Finds every file under `root` with a supported extension, sorted.
pub fn scan_source_files(root: &Path) -> Result<Vec<PathBuf>, IoError> {
    if !root.is_dir() {
        return Err(IoError::InvalidDir(root.to_path_buf()));
    }

    let mut files = Vec::new();
    scan_directory_recursive(root, &mut files)?;
    files.sort();
    Ok(files)
}

fn scan_directory_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), IoError> {
    let read_err = |source| IoError::Read {
        path: dir.to_path_buf(),
        source,
    };
    let entries = fs::read_dir(dir).map_err(read_err)?;

    for entry in entries {
        let path = entry.map_err(read_err)?.path();

        if path.is_dir() {
            scan_directory_recursive(&path, files)?;
        } else if Language::from_path(&path).is_some() {
            files.push(path);
        }
    }

    Ok(())
}
