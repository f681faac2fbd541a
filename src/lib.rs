//! codemedic - diagnostics and auto-fix engine for web sources
//!
//! Analyzes JavaScript/TypeScript, HTML and CSS snapshots with a bracket
//! scanner, per-language pattern rules and a few structural heuristics,
//! then applies mechanical fixes bottom-to-top.
//!
//! # Architecture
//!
//! ```text
//! files -> Analyzer (rules + scanner + heuristics) -> DebugSession
//!       -> DebugService (store, fixes, debounce) -> subscribers
//! ```
//!
//! # Example
//!
//! ```
//! use codemedic::{DebugService, ProjectFile};
//!
//! let service = DebugService::default();
//! let files = vec![ProjectFile::new("app.js", "var x = 1;\n")];
//!
//! let session = service.analyze_files("demo", &files);
//! assert_eq!(session.warnings[0].rule_id, "no-var");
//!
//! let fixed = service.apply_all_fixes("demo", &files);
//! assert_eq!(fixed[0].content, "const x = 1;\n");
//! ```

pub mod config;
pub mod diagnostic;
pub mod engine;
pub mod fixer;
pub mod heuristics;
pub mod language;
pub mod loader;
pub mod notifier;
pub mod output;
pub mod rule;
pub mod rules;
pub mod scanner;
pub mod scheduler;
pub mod service;
pub mod session;
pub mod watch;

// Re-export main types
pub use config::{Config, ConfigError};
pub use diagnostic::{Category, Diagnostic, Fix, Severity, TextChange};
pub use engine::{analyze_file, Analyzer};
pub use language::LanguageFamily;
pub use notifier::Subscription;
pub use output::{JsonFormatter, OutputFormatter, TextFormatter};
pub use rule::Rule;
pub use service::DebugService;
pub use session::{DebugSession, ErrorCount, ProjectFile};
pub use watch::{WatchError, Watcher};
