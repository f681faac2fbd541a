//! Human-readable text output formatter

use super::OutputFormatter;
use crate::diagnostic::{Diagnostic, Severity};
use crate::session::DebugSession;
use colored::*;
use std::collections::BTreeMap;

/// Text formatter with optional color support
pub struct TextFormatter {
    /// Enable colored output
    pub colored: bool,

    /// Show fix descriptions
    pub show_fixes: bool,

    /// Show the summary line
    pub show_stats: bool,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self {
            colored: true,
            show_fixes: true,
            show_stats: true,
        }
    }
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable colors
    pub fn without_color(mut self) -> Self {
        self.colored = false;
        self
    }

    fn paint(&self, s: String, style: fn(ColoredString) -> ColoredString) -> String {
        if self.colored {
            style(s.normal()).to_string()
        } else {
            s
        }
    }

    fn severity_str(&self, severity: Severity) -> ColoredString {
        let s = format!("{}", severity);
        if !self.colored {
            return s.normal();
        }
        match severity {
            Severity::Error => s.red().bold(),
            Severity::Warning => s.yellow().bold(),
            Severity::Info => s.blue(),
        }
    }

    fn summary(&self, session: &DebugSession) -> String {
        let errors = session.errors.len();
        let warnings = session.warnings.iter().filter(|d| d.is_warning()).count();
        let infos = session.warnings.len() - warnings;
        let total = errors + warnings + infos;

        if total == 0 {
            return self.paint("No problems found".to_string(), |s| s.green());
        }

        let mut counts = Vec::new();
        if errors > 0 {
            counts.push(self.paint(plural(errors, "error"), |s| s.red()));
        }
        if warnings > 0 {
            counts.push(self.paint(plural(warnings, "warning"), |s| s.yellow()));
        }
        if infos > 0 {
            counts.push(self.paint(plural(infos, "info"), |s| s.blue()));
        }

        let mut line = format!("{}: {}", plural(total, "problem"), counts.join(", "));
        let fixable = session.diagnostics().filter(|d| d.auto_fixable).count();
        if fixable > 0 {
            line.push_str(&format!(" ({} auto-fixable)", fixable));
        }
        line
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, session: &DebugSession) -> String {
        let mut output = String::new();

        let mut by_file: BTreeMap<&str, Vec<&Diagnostic>> = BTreeMap::new();
        for diag in session.diagnostics() {
            by_file.entry(diag.file.as_str()).or_default().push(diag);
        }

        for (file, mut diagnostics) in by_file {
            diagnostics.sort_by_key(|d| (d.line, d.column));

            if self.colored {
                output.push_str(&format!("{}\n", file.underline()));
            } else {
                output.push_str(&format!("{}\n", file));
            }
            for diag in diagnostics {
                output.push_str(&self.format_diagnostic(diag));
            }
            output.push('\n');
        }

        if self.show_stats {
            output.push_str(&self.summary(session));
            output.push('\n');
        }

        output
    }

    fn format_diagnostic(&self, diag: &Diagnostic) -> String {
        let mut output = format!(
            "  {}:{}:{}: {}[{}]: {}\n",
            diag.file,
            diag.line,
            diag.column,
            self.severity_str(diag.severity),
            self.paint(diag.rule_id.clone(), |s| s.cyan()),
            diag.message
        );

        if self.show_fixes {
            if let Some(fix) = diag.fix.as_ref().filter(|_| diag.auto_fixable) {
                output.push_str(&format!(
                    "    {} fix available: {}\n",
                    self.paint("=".to_string(), |s| s.green()),
                    fix.description
                ));
            }
        }

        output
    }
}
