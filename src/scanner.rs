//! Bracket balance scanner
//!
//! A single left-to-right pass over the source that tracks open delimiters
//! while skipping string literals and comments. It never stops early: every
//! problem is reported and scanning continues.

use crate::diagnostic::{Category, Diagnostic};

pub const UNEXPECTED_CLOSING: &str = "unexpected-closing-bracket";
pub const MISMATCHED: &str = "mismatched-brackets";
pub const UNCLOSED: &str = "unclosed-bracket";

/// An opening delimiter waiting for its closer
#[derive(Debug, Clone, Copy)]
struct OpenBracket {
    ch: char,
    line: usize,
    column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    /// Inside a string delimited by the given quote
    Str(char),
    LineComment,
    BlockComment,
}

fn closer_for(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

/// Scan `content` for unbalanced delimiters.
///
/// Unclosed openers are reported after the pass, outermost first. Single and
/// double quoted strings end at a line break even when unterminated, so an
/// apostrophe in JSX text only hides the rest of its own line, unless the
/// break is escaped with a backslash. Template literals may span lines.
pub fn scan(content: &str, file_path: &str) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut stack: Vec<OpenBracket> = Vec::new();
    let mut state = State::Code;
    let mut escaped = false;
    let mut line = 1;
    let mut column = 0;

    let mut chars = content.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\n' {
            line += 1;
            column = 0;
            // A backslash before the break continues the string
            let continued = escaped && matches!(state, State::Str(_));
            escaped = false;
            if !continued
                && matches!(state, State::LineComment | State::Str('\'') | State::Str('"'))
            {
                state = State::Code;
            }
            continue;
        }
        column += 1;
        if ch == '\r' && escaped {
            continue;
        }

        match state {
            State::LineComment => {}
            State::BlockComment => {
                if ch == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    column += 1;
                    state = State::Code;
                }
            }
            State::Str(quote) => {
                if escaped {
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if ch == quote {
                    state = State::Code;
                }
            }
            State::Code => match ch {
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    column += 1;
                    state = State::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    column += 1;
                    state = State::BlockComment;
                }
                '\'' | '"' | '`' => state = State::Str(ch),
                '(' | '[' | '{' => stack.push(OpenBracket { ch, line, column }),
                ')' | ']' | '}' => match stack.pop() {
                    None => diagnostics.push(Diagnostic::new(
                        UNEXPECTED_CLOSING,
                        Category::Syntax,
                        &format!("Unexpected closing bracket '{}'", ch),
                        file_path,
                        line,
                        column,
                    )),
                    Some(open) if closer_for(open.ch) != ch => {
                        diagnostics.push(Diagnostic::new(
                            MISMATCHED,
                            Category::Syntax,
                            &format!(
                                "Mismatched brackets: '{}' opened at {}:{} is closed by '{}'",
                                open.ch, open.line, open.column, ch
                            ),
                            file_path,
                            line,
                            column,
                        ))
                    }
                    Some(_) => {}
                },
                _ => {}
            },
        }
    }

    for open in stack {
        diagnostics.push(Diagnostic::new(
            UNCLOSED,
            Category::Syntax,
            &format!(
                "Unclosed bracket '{}', expected '{}'",
                open.ch,
                closer_for(open.ch)
            ),
            file_path,
            open.line,
            open.column,
        ));
    }

    diagnostics
}
