//! Output formatters for analysis sessions

mod json;
mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;

use crate::diagnostic::Diagnostic;
use crate::session::DebugSession;

/// Output formatter trait
pub trait OutputFormatter: Send + Sync {
    /// Format a whole session
    fn format(&self, session: &DebugSession) -> String;

    /// Format a single diagnostic
    fn format_diagnostic(&self, diagnostic: &Diagnostic) -> String;
}
