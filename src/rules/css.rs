//! Rules for `css`, `scss` and `less` files

use crate::diagnostic::Category;
use crate::rule::{FixAction, Rule};

fn drop_unit(matched: &str, focus: &str) -> String {
    matched.replacen(focus, "0", 1)
}

fn collapse_semicolons(_matched: &str, _focus: &str) -> String {
    ";".to_string()
}

pub(super) fn rules() -> Vec<Rule> {
    vec![
        Rule::new(
            "no-important",
            Category::Style,
            r"!\s*important\b",
            "Avoid !important; increase selector specificity instead",
        ),
        Rule::new(
            "zero-units",
            Category::Style,
            r"(?:^|[\s:,(])(0(?:px|em|rem|pt|vh|vw))",
            "Unit on zero value '{match}' is unnecessary",
        )
        .followed_by(|c| c.is_whitespace() || matches!(c, ';' | ',' | ')' | '!'))
        .with_fix(FixAction::RewriteMatch(drop_unit), "Remove the unit"),
        Rule::new(
            "css-double-semicolon",
            Category::Style,
            r";\s*;",
            "Unnecessary semicolon",
        )
        .with_fix(
            FixAction::RewriteMatch(collapse_semicolons),
            "Remove extra semicolon",
        ),
        Rule::new(
            "invalid-hex-color",
            Category::Syntax,
            r":[^;{}]*?(#(?:[0-9a-fA-F]{1,2}|[0-9a-fA-F]{5}|[0-9a-fA-F]{7}))\b",
            "Invalid hex color '{match}'",
        ),
        Rule::new(
            "vendor-prefix",
            Category::Style,
            r"(?:^|[\s{;])(-(?:webkit|moz|ms|o)-[a-z-]+)\s*:",
            "Vendor-prefixed property '{match}'; let an autoprefixer add it",
        ),
    ]
}
