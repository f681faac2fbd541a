//! Load project files from paths, directories and glob patterns

use crate::language::LanguageFamily;
use crate::session::ProjectFile;
use log::{debug, warn};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Directories never descended into
pub const SKIPPED_DIRS: &[&str] = &["node_modules", ".git", "dist", "build", "target"];

#[derive(Error, Debug)]
pub enum LoadError {
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
    #[error("Invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },
    #[error("Path does not exist: {0}")]
    NotFound(PathBuf),
}

/// Whether a file has an analyzable extension
pub fn is_source_file(path: &Path) -> bool {
    path.to_str().and_then(LanguageFamily::from_path).is_some()
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

/// Expand inputs into source file paths, deduplicated in input order.
///
/// Directories are walked recursively; anything that is neither a file nor
/// a directory is treated as a glob pattern.
pub fn collect_paths(inputs: &[String]) -> Result<Vec<PathBuf>, LoadError> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();
    let mut push = |path: PathBuf| {
        if seen.insert(path.clone()) {
            files.push(path);
        }
    };

    for input in inputs {
        let path = Path::new(input);
        if path.is_file() {
            if is_source_file(path) {
                push(path.to_path_buf());
            }
        } else if path.is_dir() {
            let walker = WalkDir::new(path)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| !is_skipped_dir(e));
            for entry in walker.filter_map(|e| e.ok()) {
                if entry.file_type().is_file() && is_source_file(entry.path()) {
                    push(entry.into_path());
                }
            }
        } else if glob::Pattern::escape(input) != *input {
            let matches = glob::glob(input).map_err(|source| LoadError::Pattern {
                pattern: input.clone(),
                source,
            })?;
            for entry in matches.flatten() {
                if entry.is_file() && is_source_file(&entry) {
                    push(entry);
                }
            }
        } else {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }
    }

    Ok(files)
}

/// Read one file into a snapshot
pub fn load_file(path: &Path) -> Result<ProjectFile, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(ProjectFile::new(display_path(path), content))
}

/// Expand inputs and read every matching file.
///
/// Files that cannot be read as UTF-8 text are skipped with a warning.
pub fn load_files(inputs: &[String]) -> Result<Vec<ProjectFile>, LoadError> {
    let paths = collect_paths(inputs)?;
    debug!("Loading {} files", paths.len());

    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        match load_file(path) {
            Ok(file) => files.push(file),
            Err(e) => warn!("{}; skipping", e),
        }
    }
    Ok(files)
}

/// Write snapshots back to disk
pub fn write_files(files: &[ProjectFile]) -> Result<(), LoadError> {
    for file in files {
        let path = Path::new(&file.path);
        fs::write(path, &file.content).map_err(|source| LoadError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Wrote {}", file.path);
    }
    Ok(())
}

/// Path as used in diagnostics, with forward slashes
pub fn display_path(path: &Path) -> String {
    let s = path.to_string_lossy();
    let s = s.strip_prefix("./").unwrap_or(&s);
    s.replace('\\', "/")
}
