//! Diagnostic types for analysis results

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity level for diagnostics
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,
    /// Warning - potential issue
    #[default]
    Warning,
    /// Error - definite problem
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" | "hint" | "note" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" | "err" => Ok(Severity::Error),
            _ => Err(()),
        }
    }
}

/// What kind of problem a diagnostic describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Code that will not parse
    Syntax,
    /// Code that parses but fails when executed
    Runtime,
    /// Type-level smells
    Type,
    /// Conventions enforced by common linters
    #[default]
    Lint,
    /// Suspicious control flow
    Logic,
    /// Formatting and idiom
    Style,
}

impl Category {
    /// Severity a finding of this category carries unless a rule overrides it.
    pub fn default_severity(self) -> Severity {
        match self {
            Category::Syntax | Category::Runtime => Severity::Error,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Syntax => write!(f, "syntax"),
            Category::Runtime => write!(f, "runtime"),
            Category::Type => write!(f, "type"),
            Category::Lint => write!(f, "lint"),
            Category::Logic => write!(f, "logic"),
            Category::Style => write!(f, "style"),
        }
    }
}

/// A single line-scoped text edit.
///
/// An empty `new_text` deletes the whole line at `line`; otherwise the first
/// occurrence of `old_text` on that line is replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextChange {
    /// Path of the file to edit
    pub file: String,
    /// Text to look for on the line
    pub old_text: String,
    /// Replacement text, empty for a line deletion
    pub new_text: String,
    /// Line number (1-based)
    pub line: usize,
}

impl TextChange {
    /// Replace `old_text` with `new_text` on `line`
    pub fn replace(file: &str, line: usize, old_text: &str, new_text: &str) -> Self {
        Self {
            file: file.to_string(),
            old_text: old_text.to_string(),
            new_text: new_text.to_string(),
            line,
        }
    }

    /// Delete `line` entirely
    pub fn delete_line(file: &str, line: usize, old_text: &str) -> Self {
        Self::replace(file, line, old_text, "")
    }

    pub fn is_line_deletion(&self) -> bool {
        self.new_text.is_empty()
    }
}

/// A suggested fix: ordered text edits plus a description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fix {
    /// Description of the fix
    pub description: String,
    /// Edits, applied in order
    pub changes: Vec<TextChange>,
}

impl Fix {
    pub fn new(description: &str, changes: Vec<TextChange>) -> Self {
        Self {
            description: description.to_string(),
            changes,
        }
    }

    /// Whether any edit removes a whole line
    pub fn deletes_line(&self) -> bool {
        self.changes.iter().any(TextChange::is_line_deletion)
    }
}

/// One reported issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// Unique within one session
    pub id: String,
    /// Rule that produced this diagnostic
    pub rule_id: String,
    /// File path as supplied by the caller
    pub file: String,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based, in characters)
    pub column: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_column: Option<usize>,
    /// Human-readable message
    pub message: String,
    pub severity: Severity,
    pub category: Category,
    /// Whether `fix` can be applied mechanically
    pub auto_fixable: bool,
    /// Suggested fix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<Fix>,
}

impl Diagnostic {
    /// Create a diagnostic whose severity follows its category.
    ///
    /// The id is derived from the position and rule, so two findings of the
    /// same rule at different offsets never collide.
    pub fn new(
        rule_id: &str,
        category: Category,
        message: &str,
        file: &str,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            id: format!("{}:{}:{}:{}", file, line, column, rule_id),
            rule_id: rule_id.to_string(),
            file: file.to_string(),
            line,
            column,
            end_line: None,
            end_column: None,
            message: message.to_string(),
            severity: category.default_severity(),
            category,
            auto_fixable: false,
            fix: None,
        }
    }

    /// Replace the id, for findings without a stable match offset
    pub fn with_id(mut self, id: String) -> Self {
        self.id = id;
        self
    }

    /// Override the category-derived severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Record where the highlighted region ends
    pub fn with_end(mut self, end_line: usize, end_column: usize) -> Self {
        self.end_line = Some(end_line);
        self.end_column = Some(end_column);
        self
    }

    /// Attach an auto-applicable fix
    pub fn with_fix(mut self, fix: Fix) -> Self {
        self.auto_fixable = true;
        self.fix = Some(fix);
        self
    }

    /// Check if this diagnostic has a fix
    pub fn has_fix(&self) -> bool {
        self.fix.is_some()
    }

    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Check if this is a warning
    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}
