//! File classification by extension
//!
//! The mapping matches the formatter's so that both tools agree on which
//! rules apply to a file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Language family a file belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageFamily {
    /// `js`, `jsx`, `ts`, `tsx`
    JavaScript,
    /// `html`, `htm`
    Html,
    /// `css`, `scss`, `less`
    Css,
}

impl LanguageFamily {
    pub const ALL: [LanguageFamily; 3] = [
        LanguageFamily::JavaScript,
        LanguageFamily::Html,
        LanguageFamily::Css,
    ];

    /// Classify a file extension (case-insensitive, without the dot)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "js" | "jsx" | "ts" | "tsx" => Some(LanguageFamily::JavaScript),
            "html" | "htm" => Some(LanguageFamily::Html),
            "css" | "scss" | "less" => Some(LanguageFamily::Css),
            _ => None,
        }
    }

    /// Classify a path; `None` means no rules apply
    pub fn from_path(path: &str) -> Option<Self> {
        let ext = Path::new(path).extension()?.to_str()?;
        Self::from_extension(ext)
    }

    /// Extensions belonging to this family
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            LanguageFamily::JavaScript => &["js", "jsx", "ts", "tsx"],
            LanguageFamily::Html => &["html", "htm"],
            LanguageFamily::Css => &["css", "scss", "less"],
        }
    }

    /// Whether the bracket scanner runs on files of this family
    pub fn scans_brackets(self) -> bool {
        self == LanguageFamily::JavaScript
    }
}

impl fmt::Display for LanguageFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LanguageFamily::JavaScript => write!(f, "javascript"),
            LanguageFamily::Html => write!(f, "html"),
            LanguageFamily::Css => write!(f, "css"),
        }
    }
}

/// Every extension the engine analyzes
pub fn known_extensions() -> impl Iterator<Item = &'static str> {
    LanguageFamily::ALL
        .iter()
        .flat_map(|family| family.extensions().iter().copied())
}
