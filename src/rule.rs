//! Rule definition and line matching

use crate::diagnostic::{Category, Diagnostic, Fix, TextChange};
use regex::Regex;

/// How a rule's fix edits the offending line
#[derive(Debug, Clone, Copy)]
pub enum FixAction {
    /// Replace the first occurrence of `old` on the line with `new`
    Replace {
        old: &'static str,
        new: &'static str,
    },
    /// Replace the whole matched text with the result of a function of
    /// `(matched_text, focus_text)`
    RewriteMatch(fn(&str, &str) -> String),
    /// Insert text right after the focus text
    AppendToFocus(&'static str),
    /// Remove the entire line
    DeleteLine,
}

/// Suggested fix for a rule violation
#[derive(Debug, Clone, Copy)]
pub struct FixSuggestion {
    pub action: FixAction,
    pub description: &'static str,
}

impl FixSuggestion {
    /// Build the concrete fix for one match
    pub fn build(&self, file: &str, line: usize, matched: &str, focus: &str) -> Fix {
        let change = match self.action {
            FixAction::Replace { old, new } => TextChange::replace(file, line, old, new),
            FixAction::RewriteMatch(rewrite) => {
                TextChange::replace(file, line, matched, &rewrite(matched, focus))
            }
            FixAction::AppendToFocus(suffix) => {
                TextChange::replace(file, line, focus, &format!("{}{}", focus, suffix))
            }
            FixAction::DeleteLine => TextChange::delete_line(file, line, matched),
        };
        Fix::new(self.description, vec![change])
    }
}

/// A line-level pattern rule.
///
/// When the pattern has a first capture group, that group is the "focus":
/// the reported column points at it and `{match}` in the message expands to
/// it. Otherwise the whole match is the focus.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Unique rule identifier (e.g., "no-var")
    pub id: &'static str,
    pub category: Category,
    /// Message template
    pub message: &'static str,
    pattern: Regex,
    /// Vetoes a match when it matches the matched text
    unless: Option<Regex>,
    /// Accepts the character right after a match; end of line always passes
    followed_by: Option<fn(char) -> bool>,
    pub fix: Option<FixSuggestion>,
}

impl Rule {
    /// Create a rule from a static pattern.
    ///
    /// Panics if the pattern does not compile; rule tables are fixed at
    /// build time and covered by tests.
    pub fn new(id: &'static str, category: Category, pattern: &str, message: &'static str) -> Self {
        Self {
            id,
            category,
            message,
            pattern: Regex::new(pattern).unwrap(),
            unless: None,
            followed_by: None,
            fix: None,
        }
    }

    /// Ignore matches whose text matches `pattern`
    pub fn unless(mut self, pattern: &str) -> Self {
        self.unless = Some(Regex::new(pattern).unwrap());
        self
    }

    /// Require the next character to satisfy `accept`.
    ///
    /// The character is checked but not consumed, so it can still start the
    /// next match. Fixes see it as part of the matched text.
    pub fn followed_by(mut self, accept: fn(char) -> bool) -> Self {
        self.followed_by = Some(accept);
        self
    }

    /// Attach an auto-fix
    pub fn with_fix(mut self, action: FixAction, description: &'static str) -> Self {
        self.fix = Some(FixSuggestion {
            action,
            description,
        });
        self
    }

    pub fn is_fixable(&self) -> bool {
        self.fix.is_some()
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Check one physical line, returning a diagnostic per match
    pub fn check_line(&self, file: &str, line_number: usize, line: &str) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        for caps in self.pattern.captures_iter(line) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            if let Some(unless) = &self.unless {
                if unless.is_match(whole.as_str()) {
                    continue;
                }
            }
            let mut matched = whole.as_str();
            if let Some(accept) = self.followed_by {
                if let Some(next) = line[whole.end()..].chars().next() {
                    if !accept(next) {
                        continue;
                    }
                    matched = &line[whole.start()..whole.end() + next.len_utf8()];
                }
            }
            let focus = caps.get(1).unwrap_or(whole);

            let column = line[..focus.start()].chars().count() + 1;
            let end_column = column + focus.as_str().chars().count();
            let message = self.message.replace("{match}", focus.as_str());

            let mut diag =
                Diagnostic::new(self.id, self.category, &message, file, line_number, column)
                    .with_end(line_number, end_column);
            if let Some(fix) = &self.fix {
                diag = diag.with_fix(fix.build(file, line_number, matched, focus.as_str()));
            }
            diagnostics.push(diag);
        }

        diagnostics
    }
}
