//! Built-in rule tables, one per language family
//!
//! Rules are evaluated in declaration order, so the order of each table is
//! part of the output contract.

mod css;
mod html;
mod javascript;

use crate::language::LanguageFamily;
use crate::rule::Rule;
use std::sync::LazyLock;

static JAVASCRIPT_RULES: LazyLock<Vec<Rule>> = LazyLock::new(javascript::rules);
static HTML_RULES: LazyLock<Vec<Rule>> = LazyLock::new(html::rules);
static CSS_RULES: LazyLock<Vec<Rule>> = LazyLock::new(css::rules);

/// Rules for a language family, in evaluation order
pub fn rules_for(family: LanguageFamily) -> &'static [Rule] {
    match family {
        LanguageFamily::JavaScript => JAVASCRIPT_RULES.as_slice(),
        LanguageFamily::Html => HTML_RULES.as_slice(),
        LanguageFamily::Css => CSS_RULES.as_slice(),
    }
}

/// Every built-in rule with its family
pub fn all_rules() -> impl Iterator<Item = (LanguageFamily, &'static Rule)> {
    LanguageFamily::ALL
        .into_iter()
        .flat_map(|family| rules_for(family).iter().map(move |rule| (family, rule)))
}
