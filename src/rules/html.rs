//! Rules for `html` and `htm` files

use crate::diagnostic::Category;
use crate::rule::{FixAction, Rule};

pub(super) fn rules() -> Vec<Rule> {
    vec![
        Rule::new(
            "img-alt",
            Category::Lint,
            r"(?i)(<img)\b[^>]*",
            "Image missing alt attribute",
        )
        .unless(r"(?i)\balt\s*=")
        .with_fix(
            FixAction::Replace {
                old: "<img",
                new: r#"<img alt="""#,
            },
            "Add an empty alt attribute",
        ),
        Rule::new(
            "html-lang",
            Category::Lint,
            r"(?i)(<html)\b[^>]*",
            "Missing lang attribute on <html>",
        )
        .unless(r"(?i)\blang\s*=")
        .with_fix(
            FixAction::Replace {
                old: "<html",
                new: r#"<html lang="en""#,
            },
            "Declare the document language",
        ),
        Rule::new(
            "no-inline-style",
            Category::Style,
            r#"\s(style)\s*=\s*["']"#,
            "Avoid inline styles; move them to a stylesheet",
        ),
        Rule::new(
            "no-deprecated-tag",
            Category::Style,
            r"(?i)<(center|font|marquee|blink)\b",
            "Deprecated HTML tag <{match}>",
        ),
        Rule::new(
            "target-blank-rel",
            Category::Lint,
            r#"(?i)<a\b[^>]*?(target\s*=\s*["']_blank["'])[^>]*"#,
            "Links with target=\"_blank\" should set rel=\"noopener noreferrer\"",
        )
        .unless(r"(?i)\brel\s*=")
        .with_fix(
            FixAction::AppendToFocus(r#" rel="noopener noreferrer""#),
            "Add rel=\"noopener noreferrer\"",
        ),
    ]
}
