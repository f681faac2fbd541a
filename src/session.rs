//! Project files and per-project diagnostic sessions

use crate::diagnostic::{Diagnostic, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A file snapshot supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub path: String,
    pub content: String,
}

impl ProjectFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Error and warning totals of a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCount {
    pub errors: usize,
    pub warnings: usize,
}

/// The result of one analysis pass over a project.
///
/// `errors` only holds error-severity diagnostics, `warnings` holds the
/// warning and info ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugSession {
    pub id: String,
    pub project_id: String,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    pub fixed_count: usize,
    pub last_analyzed: DateTime<Utc>,
    pub is_analyzing: bool,
}

impl DebugSession {
    /// Create a session, splitting diagnostics by severity
    pub fn new(project_id: &str, diagnostics: Vec<Diagnostic>) -> Self {
        let (errors, warnings) = diagnostics
            .into_iter()
            .partition(|d| d.severity == Severity::Error);

        Self {
            id: Uuid::new_v4().to_string(),
            project_id: project_id.to_string(),
            errors,
            warnings,
            fixed_count: 0,
            last_analyzed: Utc::now(),
            is_analyzing: false,
        }
    }

    /// An empty session for a project whose first analysis is in flight
    pub fn pending(project_id: &str) -> Self {
        Self {
            is_analyzing: true,
            ..Self::new(project_id, Vec::new())
        }
    }

    /// Find a diagnostic by id in either list
    pub fn find(&self, id: &str) -> Option<&Diagnostic> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .find(|d| d.id == id)
    }

    /// Remove a diagnostic by id, returning it
    pub fn remove(&mut self, id: &str) -> Option<Diagnostic> {
        if let Some(pos) = self.errors.iter().position(|d| d.id == id) {
            return Some(self.errors.remove(pos));
        }
        let pos = self.warnings.iter().position(|d| d.id == id)?;
        Some(self.warnings.remove(pos))
    }

    /// All diagnostics, errors first
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.errors.iter().chain(self.warnings.iter())
    }

    /// Diagnostics that carry an auto-applicable fix
    pub fn fixable(&self) -> Vec<Diagnostic> {
        self.diagnostics()
            .filter(|d| d.auto_fixable && d.fix.is_some())
            .cloned()
            .collect()
    }

    pub fn error_count(&self) -> ErrorCount {
        ErrorCount {
            errors: self.errors.len(),
            warnings: self.warnings.len(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}
