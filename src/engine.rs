//! Core analysis engine
//!
//! Routes each file to its language family, runs the line rules, the
//! bracket scanner and the heuristics, then applies the configured rule
//! filters and severity overrides.

use crate::config::Config;
use crate::diagnostic::Diagnostic;
use crate::heuristics::{self, HeuristicIds};
use crate::language::LanguageFamily;
use crate::rules;
use crate::scanner;
use crate::session::ProjectFile;
use globset::{Glob, GlobMatcher};
use log::{debug, warn};
use rayon::prelude::*;
use std::sync::OnceLock;

/// The analysis engine
pub struct Analyzer {
    /// Configuration
    config: Config,

    /// Compiled per-file ignores
    per_file: Vec<(GlobMatcher, Vec<String>)>,

    /// Worker pool for multi-file analysis, built on first use
    pool: OnceLock<Option<rayon::ThreadPool>>,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Analyzer {
    /// Create a new engine with configuration.
    ///
    /// Per-file patterns that fail to compile are skipped with a warning.
    pub fn new(config: Config) -> Self {
        let mut per_file = Vec::new();
        for (pattern, rule_ids) in &config.rules.per_file {
            match Glob::new(pattern) {
                Ok(glob) => per_file.push((glob.compile_matcher(), rule_ids.clone())),
                Err(e) => warn!("Ignoring per-file pattern '{}': {}", pattern, e),
            }
        }

        Self {
            config,
            per_file,
            pool: OnceLock::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Analyze files; results keep input order
    pub fn analyze(&self, files: &[ProjectFile]) -> Vec<Diagnostic> {
        let pool = if files.len() > 1 { self.pool() } else { None };
        let per_file: Vec<Vec<Diagnostic>> = match pool {
            Some(pool) => {
                pool.install(|| files.par_iter().map(|f| self.analyze_file(f)).collect())
            }
            None => files.iter().map(|f| self.analyze_file(f)).collect(),
        };
        per_file.into_iter().flatten().collect()
    }

    /// Analyze a single file.
    ///
    /// Order: line rules top-to-bottom (table order within a line), then
    /// bracket findings, then heuristics.
    pub fn analyze_file(&self, file: &ProjectFile) -> Vec<Diagnostic> {
        let Some(family) = LanguageFamily::from_path(&file.path) else {
            debug!("Skipping unclassified file {}", file.path);
            return Vec::new();
        };

        let path = file.path.as_str();
        let table = rules::rules_for(family);
        let mut diagnostics = Vec::new();

        for (idx, line) in file.content.split('\n').enumerate() {
            for rule in table {
                if self.is_active(rule.id, path) {
                    diagnostics.extend(rule.check_line(path, idx + 1, line));
                }
            }
        }

        if family.scans_brackets() {
            diagnostics.extend(scanner::scan(&file.content, path));
        }

        let mut ids = HeuristicIds::new();
        diagnostics.extend(heuristics::detect(path, &file.content, family, &mut ids));

        let mut diagnostics: Vec<Diagnostic> = diagnostics
            .into_iter()
            .filter(|d| self.is_active(&d.rule_id, path))
            .collect();

        for diag in &mut diagnostics {
            if let Some(severity) = self.config.severity_override(&diag.rule_id) {
                diag.severity = severity;
            }
        }

        debug!(
            "Analyzed {} ({}): {} diagnostics",
            path,
            family,
            diagnostics.len()
        );
        diagnostics
    }

    fn pool(&self) -> Option<&rayon::ThreadPool> {
        self.pool
            .get_or_init(|| {
                if !self.config.engine.parallel {
                    return None;
                }
                let threads = if self.config.engine.jobs > 0 {
                    self.config.engine.jobs
                } else {
                    num_cpus::get()
                };
                match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                    Ok(pool) => Some(pool),
                    Err(e) => {
                        warn!("Falling back to sequential analysis: {}", e);
                        None
                    }
                }
            })
            .as_ref()
    }

    /// Whether a rule reports for this file
    fn is_active(&self, rule_id: &str, path: &str) -> bool {
        if !self.config.is_rule_enabled(rule_id) {
            return false;
        }
        !self
            .per_file
            .iter()
            .any(|(matcher, ids)| matcher.is_match(path) && ids.iter().any(|id| id == rule_id))
    }
}

/// Analyze a single file with the default configuration
pub fn analyze_file(file: &ProjectFile) -> Vec<Diagnostic> {
    Analyzer::default().analyze_file(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::{Category, Severity};

    fn ids(diags: &[Diagnostic]) -> Vec<&str> {
        diags.iter().map(|d| d.rule_id.as_str()).collect()
    }

    #[test]
    fn test_scenario_app_js() {
        let file = ProjectFile::new("app.js", "var x = 1;\nif (x == 1) { console.log('hi'); }");
        let diags = analyze_file(&file);

        assert_eq!(ids(&diags), vec!["no-var", "eqeqeq", "no-console"]);
        assert_eq!(diags[0].line, 1);
        assert_eq!(diags[1].line, 2);
        assert_eq!(diags[2].line, 2);
        assert!(diags.iter().all(|d| d.severity == Severity::Warning));
        assert!(diags.iter().all(|d| d.auto_fixable));
    }

    #[test]
    fn test_scenario_index_html() {
        let file = ProjectFile::new("index.html", r#"<img src="x.png">"#);
        let diags = analyze_file(&file);

        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "Image missing alt attribute");
        assert_eq!(diags[0].category, Category::Lint);
        assert_eq!(diags[0].severity, Severity::Warning);
        assert!(diags[0].auto_fixable);
    }

    #[test]
    fn test_unknown_extension_is_skipped() {
        let file = ProjectFile::new("notes.md", "var x == 1; (");
        assert!(analyze_file(&file).is_empty());
    }

    #[test]
    fn test_brackets_only_for_javascript() {
        let css = ProjectFile::new("a.css", ".a { color: red;");
        assert!(analyze_file(&css).is_empty());

        let js = ProjectFile::new("a.js", "function f() {");
        assert_eq!(ids(&analyze_file(&js)), vec![scanner::UNCLOSED]);
    }

    #[test]
    fn test_order_rules_then_brackets_then_heuristics() {
        let file = ProjectFile::new("a.js", "// TODO later\nvar a = (1;\n");
        assert_eq!(
            ids(&analyze_file(&file)),
            vec!["no-var", scanner::UNCLOSED, heuristics::TODO_COMMENT]
        );
    }

    #[test]
    fn test_rule_fires_inside_comment() {
        let file = ProjectFile::new("a.js", "// var x = 1");
        assert_eq!(ids(&analyze_file(&file)), vec!["no-var"]);
    }

    #[test]
    fn test_deterministic_output() {
        let files = vec![
            ProjectFile::new("a.js", "var a = 1;\nif (a == 2) {}\n"),
            ProjectFile::new("b.css", "a { margin: 0px !important; }"),
        ];
        let analyzer = Analyzer::default();
        let first: Vec<_> = analyzer.analyze(&files).into_iter().map(|d| d.id).collect();
        let second: Vec<_> = analyzer.analyze(&files).into_iter().map(|d| d.id).collect();
        assert_eq!(first, second);
        assert!(first[0].starts_with("a.js"));
        assert!(first.last().unwrap().starts_with("b.css"));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let files: Vec<_> = (0..16)
            .map(|i| ProjectFile::new(format!("f{}.js", i), "var a = 1;\nif (a == 1) {}\n"))
            .collect();

        let mut sequential = Config::default();
        sequential.engine.parallel = false;
        let mut parallel = Config::default();
        parallel.engine.jobs = 4;

        let a = Analyzer::new(sequential).analyze(&files);
        let b = Analyzer::new(parallel).analyze(&files);
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn test_disabled_and_overridden_rules() {
        let mut config = Config::default();
        config.rules.disabled.push("no-console".to_string());
        config
            .rules
            .severity
            .insert("no-var".to_string(), Severity::Error);
        let analyzer = Analyzer::new(config);

        let file = ProjectFile::new("app.js", "var x = 1;\nconsole.log(x);");
        let diags = analyzer.analyze_file(&file);
        assert_eq!(ids(&diags), vec!["no-var"]);
        assert_eq!(diags[0].severity, Severity::Error);
    }

    #[test]
    fn test_per_file_ignores() {
        let mut config = Config::default();
        config
            .rules
            .per_file
            .insert("legacy/**".to_string(), vec!["no-var".to_string()]);
        let analyzer = Analyzer::new(config);

        let legacy = ProjectFile::new("legacy/old.js", "var x = 1;");
        let fresh = ProjectFile::new("src/new.js", "var x = 1;");
        assert!(analyzer.analyze_file(&legacy).is_empty());
        assert_eq!(analyzer.analyze_file(&fresh).len(), 1);
    }
}
