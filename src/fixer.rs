//! Auto-fix system for applying diagnostic fixes to file snapshots
//!
//! Content is edited as a vector of lines. Batches are applied from the
//! bottom of each file to the top so that a line deletion never shifts the
//! line numbers of fixes that are still pending.

use crate::diagnostic::{Diagnostic, Fix, TextChange};
use crate::session::ProjectFile;
use log::{debug, warn};

/// Apply every change of a fix, returning the edited file set.
///
/// Files named by no change are returned untouched.
pub fn apply_fix_to_files(files: &[ProjectFile], fix: &Fix) -> Vec<ProjectFile> {
    let mut files = files.to_vec();

    for change in &fix.changes {
        let Some(file) = files.iter_mut().find(|f| f.path == change.file) else {
            warn!("Skipping change for missing file {}", change.file);
            continue;
        };

        let mut lines: Vec<String> = file.content.split('\n').map(String::from).collect();
        if apply_change(&mut lines, change) {
            file.content = lines.join("\n");
        }
    }

    files
}

/// Apply one change to a file's lines. Returns false when nothing changed.
pub fn apply_change(lines: &mut Vec<String>, change: &TextChange) -> bool {
    if change.line == 0 || change.line > lines.len() {
        warn!(
            "Skipping change at {}:{}: line out of range",
            change.file, change.line
        );
        return false;
    }

    let idx = change.line - 1;

    if change.is_line_deletion() {
        lines.remove(idx);
        debug!("Deleted {}:{}", change.file, change.line);
        return true;
    }

    if !lines[idx].contains(change.old_text.as_str()) {
        debug!(
            "'{}' not found at {}:{}",
            change.old_text, change.file, change.line
        );
        return false;
    }

    lines[idx] = lines[idx].replacen(change.old_text.as_str(), &change.new_text, 1);
    debug!("Rewrote {}:{}", change.file, change.line);
    true
}

/// Sort fixable diagnostics into application order.
///
/// By the last line each fix edits, descending; on the same line in-line
/// replacements go before line deletions. The sort is stable, so ties keep
/// their report order.
pub fn fix_order(diagnostics: &mut [Diagnostic]) {
    diagnostics.sort_by(|a, b| {
        last_edited_line(b)
            .cmp(&last_edited_line(a))
            .then_with(|| deletes_line(a).cmp(&deletes_line(b)))
    });
}

/// Bottom-most line a fix touches, falling back to the reported line
fn last_edited_line(diag: &Diagnostic) -> usize {
    diag.fix
        .as_ref()
        .and_then(|fix| fix.changes.iter().map(|c| c.line).max())
        .unwrap_or(diag.line)
}

fn deletes_line(diag: &Diagnostic) -> bool {
    diag.fix.as_ref().is_some_and(Fix::deletes_line)
}

/// Apply a batch of fixes in bottom-to-top order
pub fn apply_in_order(files: &[ProjectFile], diagnostics: &[Diagnostic]) -> Vec<ProjectFile> {
    let mut ordered: Vec<Diagnostic> = diagnostics
        .iter()
        .filter(|d| d.auto_fixable && d.fix.is_some())
        .cloned()
        .collect();
    fix_order(&mut ordered);

    let mut current = files.to_vec();
    for diag in &ordered {
        if let Some(fix) = &diag.fix {
            current = apply_fix_to_files(&current, fix);
        }
    }
    current
}

/// Generate a unified diff between two versions of a file
pub fn unified_diff(path: &str, original: &str, modified: &str) -> String {
    let mut diff = String::new();

    let original_lines: Vec<&str> = original.lines().collect();
    let modified_lines: Vec<&str> = modified.lines().collect();

    diff.push_str(&format!("--- a/{}\n", path));
    diff.push_str(&format!("+++ b/{}\n", path));

    // Common prefix and suffix frame a single hunk
    let prefix = original_lines
        .iter()
        .zip(&modified_lines)
        .take_while(|(o, m)| o == m)
        .count();
    let suffix = original_lines[prefix..]
        .iter()
        .rev()
        .zip(modified_lines[prefix..].iter().rev())
        .take_while(|(o, m)| o == m)
        .count();

    let removed = &original_lines[prefix..original_lines.len() - suffix];
    let added = &modified_lines[prefix..modified_lines.len() - suffix];
    if removed.is_empty() && added.is_empty() {
        return diff;
    }

    let context_before = prefix.min(1);
    let context_after = suffix.min(1);
    let start = prefix - context_before;

    diff.push_str(&format!(
        "@@ -{},{} +{},{} @@\n",
        start + 1,
        context_before + removed.len() + context_after,
        start + 1,
        context_before + added.len() + context_after
    ));
    for line in &original_lines[start..prefix] {
        diff.push_str(&format!(" {}\n", line));
    }
    for line in removed {
        diff.push_str(&format!("-{}\n", line));
    }
    for line in added {
        diff.push_str(&format!("+{}\n", line));
    }
    let tail = original_lines.len() - suffix;
    for line in &original_lines[tail..tail + context_after] {
        diff.push_str(&format!(" {}\n", line));
    }

    diff
}
