//! Rules for `js`, `jsx`, `ts` and `tsx` files

use crate::diagnostic::Category;
use crate::rule::{FixAction, Rule};

fn var_to_const(matched: &str, _focus: &str) -> String {
    matched.replacen("var", "const", 1)
}

fn strict_equality(matched: &str, focus: &str) -> String {
    let strict = if focus == "!=" { "!==" } else { "===" };
    matched.replacen(focus, strict, 1)
}

fn single_semicolon(matched: &str, focus: &str) -> String {
    matched.replacen(focus, ";", 1)
}

pub(super) fn rules() -> Vec<Rule> {
    vec![
        Rule::new(
            "no-var",
            Category::Style,
            r"\b(var)\s+[A-Za-z_$\[{]",
            "Unexpected var, use const or let instead",
        )
        .with_fix(FixAction::RewriteMatch(var_to_const), "Replace var with const"),
        Rule::new(
            "eqeqeq",
            Category::Lint,
            r"(?:^|[^=!<>])(==|!=)",
            "Expected strict equality instead of '{match}'",
        )
        .followed_by(|c| c != '=')
        .with_fix(
            FixAction::RewriteMatch(strict_equality),
            "Use strict equality",
        ),
        Rule::new(
            "no-console",
            Category::Lint,
            r"\b(console\.(?:log|debug|info)\s*\()",
            "Unexpected console statement '{match}'",
        )
        .with_fix(FixAction::DeleteLine, "Remove console statement"),
        Rule::new(
            "no-debugger",
            Category::Lint,
            r"\bdebugger\b\s*;?",
            "Unexpected debugger statement",
        )
        .with_fix(FixAction::DeleteLine, "Remove debugger statement"),
        Rule::new(
            "no-alert",
            Category::Lint,
            r"\balert\s*\(",
            "Unexpected alert(); use a UI notification instead",
        ),
        Rule::new(
            "no-eval",
            Category::Logic,
            r"\beval\s*\(",
            "eval() can execute arbitrary code",
        ),
        Rule::new(
            "no-explicit-any",
            Category::Type,
            r":\s*any\b|<any>|\bas\s+any\b",
            "Unexpected any; specify a more precise type",
        ),
        Rule::new(
            "const-no-init",
            Category::Syntax,
            r"\bconst\s+([A-Za-z_$][\w$]*)\s*;",
            "Missing initializer in const declaration of '{match}'",
        ),
        Rule::new(
            "no-require-in-browser",
            Category::Runtime,
            r#"\brequire\s*\(\s*['"]"#,
            "require is not defined in browser modules; use import",
        ),
        Rule::new(
            "no-double-semicolon",
            Category::Style,
            r"[^(;\s]\s*(;;)",
            "Unnecessary semicolon",
        )
        .with_fix(
            FixAction::RewriteMatch(single_semicolon),
            "Remove extra semicolon",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: &str) -> Rule {
        rules().into_iter().find(|r| r.id == id).unwrap()
    }

    #[test]
    fn test_no_var() {
        let diags = rule("no-var").check_line("a.js", 1, "var x = 1;");
        assert_eq!(diags.len(), 1);
        let change = &diags[0].fix.as_ref().unwrap().changes[0];
        assert_eq!(change.old_text, "var x");
        assert_eq!(change.new_text, "const x");

        assert!(rule("no-var").check_line("a.js", 1, "const variance = 2;").is_empty());
    }

    #[test]
    fn test_eqeqeq() {
        let r = rule("eqeqeq");
        let diags = r.check_line("a.js", 2, "if (x == 1) { y(); }");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].column, 7);
        let change = &diags[0].fix.as_ref().unwrap().changes[0];
        assert_eq!(change.old_text, " == ");
        assert_eq!(change.new_text, " === ");

        let diags = r.check_line("a.js", 1, "if (a!=b) {}");
        assert_eq!(diags[0].fix.as_ref().unwrap().changes[0].new_text, "a!==b");

        assert_eq!(r.check_line("a.js", 1, "if (a==b==c) {}").len(), 2);

        assert!(r.check_line("a.js", 1, "a === b && c !== d").is_empty());
        assert!(r.check_line("a.js", 1, "a <= b; c >= d; f = () => 1").is_empty());
    }

    #[test]
    fn test_no_console_deletes_line() {
        let diags = rule("no-console").check_line("a.js", 3, "  console.log('hi');");
        assert_eq!(diags[0].message, "Unexpected console statement 'console.log('");
        assert!(diags[0].fix.as_ref().unwrap().deletes_line());

        assert!(rule("no-console")
            .check_line("a.js", 3, "console.error(err);")
            .is_empty());
    }

    #[test]
    fn test_const_without_initializer() {
        let diags = rule("const-no-init").check_line("a.ts", 1, "const total;");
        assert_eq!(diags[0].message, "Missing initializer in const declaration of 'total'");
        assert!(diags[0].is_error());
    }

    #[test]
    fn test_double_semicolon() {
        let r = rule("no-double-semicolon");
        let diags = r.check_line("a.js", 1, "run();;");
        let change = &diags[0].fix.as_ref().unwrap().changes[0];
        assert_eq!(change.old_text, ");;");
        assert_eq!(change.new_text, ");");

        assert!(r.check_line("a.js", 1, "for (;;) {}").is_empty());
    }

    #[test]
    fn test_require_is_runtime_error() {
        let diags = rule("no-require-in-browser").check_line("a.js", 1, "const fs = require('fs');");
        assert!(diags[0].is_error());
    }
}
