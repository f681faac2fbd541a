//! Multi-line heuristic detectors
//!
//! These run over the whole file content instead of single lines. Their
//! severities are fixed rather than derived from the category.

use crate::diagnostic::{Category, Diagnostic, Fix, Severity, TextChange};
use crate::language::LanguageFamily;
use regex::Regex;
use std::sync::LazyLock;

pub const TODO_COMMENT: &str = "todo-comment";
pub const EMPTY_CATCH: &str = "empty-catch";
pub const ASYNC_WITHOUT_AWAIT: &str = "async-without-await";

static TODO_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?m)(?://|/\*|<!--|^[\t ]*\*)[\t ]*((?:TODO|FIXME|HACK|XXX)\b)",
        r"[:\t ]*(.*?)[\t ]*(?:\*/|-->)?[\t ]*\r?$",
    ))
    .unwrap()
});

static EMPTY_CATCH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bcatch\s*(?:\(\s*([A-Za-z_$][\w$]*)?[^)]*\))?\s*\{\s*\}").unwrap()
});

static ASYNC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\basync\s+function\s*\*?\s*[\w$]*\s*\([^)]*\)[^{;]*\{",
        r"|\basync\s*\([^)]*\)[^{;=]*=>\s*\{",
        r"|\basync\s+[A-Za-z_$][\w$]*\s*=>\s*\{",
        r"|\basync\s+[A-Za-z_$][\w$]*\s*\([^)]*\)[^{;=]*\{",
    ))
    .unwrap()
});

static AWAIT_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bawait\b").unwrap());

/// Hands out synthetic ids for findings that lack a per-line match offset
#[derive(Debug, Default)]
pub struct HeuristicIds {
    next: usize,
}

impl HeuristicIds {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self, file: &str, line: usize, rule_id: &str) -> String {
        self.next += 1;
        format!("{}:{}:{}#{}", file, line, rule_id, self.next)
    }
}

/// Byte offset to 1-based line/column conversion
struct LineIndex<'a> {
    content: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(content: &'a str) -> Self {
        let mut starts = vec![0];
        starts.extend(content.match_indices('\n').map(|(i, _)| i + 1));
        Self { content, starts }
    }

    fn position(&self, offset: usize) -> (usize, usize) {
        let line_idx = match self.starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let column = self.content[self.starts[line_idx]..offset].chars().count() + 1;
        (line_idx + 1, column)
    }
}

/// Run every heuristic that applies to `family`, in a fixed order: TODO
/// markers, then empty catch blocks, then async functions without await.
pub fn detect(
    file: &str,
    content: &str,
    family: LanguageFamily,
    ids: &mut HeuristicIds,
) -> Vec<Diagnostic> {
    let index = LineIndex::new(content);
    let mut diagnostics = todo_markers(file, content, &index, ids);

    if family == LanguageFamily::JavaScript {
        diagnostics.extend(empty_catches(file, content, &index, ids));
        diagnostics.extend(async_without_await(file, content, &index, ids));
    }

    diagnostics
}

fn todo_markers(
    file: &str,
    content: &str,
    index: &LineIndex<'_>,
    ids: &mut HeuristicIds,
) -> Vec<Diagnostic> {
    TODO_PATTERN
        .captures_iter(content)
        .filter_map(|caps| {
            let marker = caps.get(1)?;
            let text = caps.get(2).map_or("", |m| m.as_str());
            let (line, column) = index.position(marker.start());
            let message = if text.is_empty() {
                format!("{} comment", marker.as_str())
            } else {
                format!("{}: {}", marker.as_str(), text)
            };

            let diag = Diagnostic::new(TODO_COMMENT, Category::Lint, &message, file, line, column)
                .with_severity(Severity::Info)
                .with_id(ids.next(file, line, TODO_COMMENT));
            Some(diag)
        })
        .collect()
}

fn empty_catches(
    file: &str,
    content: &str,
    index: &LineIndex<'_>,
    ids: &mut HeuristicIds,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for caps in EMPTY_CATCH_PATTERN.captures_iter(content) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let binding = caps.get(1).map(|m| m.as_str());
        let (line, column) = index.position(whole.start());
        let (end_line, end_column) = index.position(whole.end());

        let fix = empty_catch_fix(file, content, index, whole.start(), whole.end(), binding);
        let diag = Diagnostic::new(
            EMPTY_CATCH,
            Category::Logic,
            "Empty catch block swallows the error",
            file,
            line,
            column,
        )
        .with_severity(Severity::Warning)
        .with_end(end_line, end_column)
        .with_id(ids.next(file, line, EMPTY_CATCH))
        .with_fix(fix);
        diagnostics.push(diag);
    }

    diagnostics
}

/// Build the edits that make an empty catch block log its error.
///
/// Only the line holding the opening brace is rewritten; the closing brace
/// stays where it is. A catch without a binding gets `(error)`.
fn empty_catch_fix(
    file: &str,
    content: &str,
    index: &LineIndex<'_>,
    start: usize,
    end: usize,
    binding: Option<&str>,
) -> Fix {
    let matched = &content[start..end];
    let brace = start + matched.rfind('{').unwrap_or(0);
    let (catch_line, _) = index.position(start);
    let (brace_line, _) = index.position(brace);
    let name = binding.unwrap_or("error");
    let log = format!("console.error({});", name);
    let mut changes = Vec::new();

    if !matched.contains('\n') {
        let head = matched[..brace - start].trim_end();
        let head = if binding.is_none() {
            "catch (error)".to_string()
        } else {
            head.to_string()
        };
        changes.push(TextChange::replace(
            file,
            catch_line,
            matched,
            &format!("{} {{ {} }}", head, log),
        ));
        return Fix::new("Log the caught error", changes);
    }

    if binding.is_none() && brace_line != catch_line {
        changes.push(TextChange::replace(file, catch_line, "catch", "catch (error)"));
    }

    // The part of the match on the brace line, up to and including the brace
    let segment_start = start.max(index.starts[brace_line - 1]);
    let segment = &content[segment_start..=brace];
    let rewritten = if binding.is_none() && brace_line == catch_line {
        segment.replacen("catch", "catch (error)", 1)
    } else {
        segment.to_string()
    };
    changes.push(TextChange::replace(
        file,
        brace_line,
        segment,
        &format!("{} {}", rewritten, log),
    ));

    Fix::new("Log the caught error", changes)
}

fn async_without_await(
    file: &str,
    content: &str,
    index: &LineIndex<'_>,
    ids: &mut HeuristicIds,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for head in ASYNC_PATTERN.find_iter(content) {
        let open = head.end() - 1;
        let Some(close) = matching_brace(content, open) else {
            continue;
        };
        if AWAIT_PATTERN.is_match(&content[open + 1..close]) {
            continue;
        }

        let (line, column) = index.position(head.start());
        let diag = Diagnostic::new(
            ASYNC_WITHOUT_AWAIT,
            Category::Logic,
            "Async function has no 'await' expression",
            file,
            line,
            column,
        )
        .with_severity(Severity::Warning)
        .with_id(ids.next(file, line, ASYNC_WITHOUT_AWAIT));
        diagnostics.push(diag);
    }

    diagnostics
}

/// Find the brace closing the one at `open` by counting nesting depth
fn matching_brace(content: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, byte) in content.as_bytes()[open..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}
