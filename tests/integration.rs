//! Integration tests driving the public service API

use codemedic::config::Config;
use codemedic::diagnostic::Severity;
use codemedic::{analyze_file, DebugService, DebugSession, ProjectFile};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const APP_JS: &str = "var x = 1;\nif (x == 1) { console.log('hi'); }";

fn app_js() -> Vec<ProjectFile> {
    vec![ProjectFile::new("app.js", APP_JS)]
}

fn rule_ids(session: &DebugSession) -> Vec<String> {
    session.diagnostics().map(|d| d.rule_id.clone()).collect()
}

/// Subscribe a listener that records every published session
fn record(service: &DebugService) -> Arc<Mutex<Vec<DebugSession>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    service.subscribe(move |session| sink.lock().unwrap().push(session.clone()));
    seen
}

#[test]
fn test_app_js_diagnostics_and_fixes() {
    let service = DebugService::default();
    let session = service.analyze_files("p1", &app_js());

    assert!(session.errors.is_empty());
    assert_eq!(rule_ids(&session), vec!["no-var", "eqeqeq", "no-console"]);
    let lines: Vec<_> = session.warnings.iter().map(|d| d.line).collect();
    assert_eq!(lines, vec![1, 2, 2]);
    assert!(session
        .warnings
        .iter()
        .all(|d| d.severity == Severity::Warning && d.auto_fixable));

    let fixed = service.apply_all_fixes("p1", &app_js());
    assert_eq!(fixed[0].content, "const x = 1;");

    let session = service.get_session("p1").unwrap();
    assert_eq!(session.fixed_count, 3);
    assert!(session.is_clean());
}

#[test]
fn test_img_alt_fix() {
    let files = vec![ProjectFile::new("index.html", r#"<img src="x.png">"#)];
    let service = DebugService::default();
    let session = service.analyze_files("site", &files);

    assert_eq!(session.warnings.len(), 1);
    let diag = &session.warnings[0];
    assert_eq!(diag.message, "Image missing alt attribute");

    let fixed = service.apply_fix("site", &diag.id, &files).unwrap();
    assert_eq!(fixed[0].content, r#"<img alt="" src="x.png">"#);
}

#[test]
fn test_bracket_properties() {
    let unclosed = analyze_file(&ProjectFile::new("a.js", "(a, (b)"));
    assert_eq!(unclosed.len(), 1);
    assert_eq!(unclosed[0].rule_id, "unclosed-bracket");
    assert_eq!(unclosed[0].column, 1);

    let stray = analyze_file(&ProjectFile::new("b.js", ")"));
    assert_eq!(stray.len(), 1);
    assert_eq!(stray[0].rule_id, "unexpected-closing-bracket");

    let balanced = analyze_file(&ProjectFile::new(
        "c.js",
        "function f(a) {\n  return [a, { b: (a) }];\n}\n",
    ));
    assert!(balanced.is_empty());
}

#[test]
fn test_apply_all_fixes_is_line_shift_safe() {
    let content = "var a = 1;\nconsole.log(a);\nvar b = 2;\nconsole.debug(b);\nif (a == b) {}\n";
    let files = vec![ProjectFile::new("shift.js", content)];
    let service = DebugService::default();
    service.analyze_files("p1", &files);

    let fixed = service.apply_all_fixes("p1", &files);
    assert_eq!(
        fixed[0].content,
        "const a = 1;\nconst b = 2;\nif (a === b) {}\n"
    );

    let again = DebugService::default().analyze_files("p1", &fixed);
    assert!(again.is_clean(), "unexpected: {:?}", rule_ids(&again));
}

#[test]
fn test_overlapping_fixes_on_one_line() {
    let files = vec![ProjectFile::new("a.css", "a { margin: 0px;; }")];
    let service = DebugService::default();
    let session = service.analyze_files("p1", &files);
    assert_eq!(rule_ids(&session), vec!["zero-units", "css-double-semicolon"]);

    let fixed = service.apply_all_fixes("p1", &files);
    assert_eq!(fixed[0].content, "a { margin: 0; }");
}

#[test]
fn test_empty_catch_fix() {
    let files = vec![ProjectFile::new("a.js", "try { run(); } catch (e) {}")];
    let service = DebugService::default();
    let session = service.analyze_files("p1", &files);
    assert_eq!(rule_ids(&session), vec!["empty-catch"]);

    let fixed = service.apply_all_fixes("p1", &files);
    assert_eq!(fixed[0].content, "try { run(); } catch (e) { console.error(e); }");
    assert!(analyze_file(&fixed[0]).is_empty());
}

#[test]
fn test_apply_all_fixes_notifies_once() {
    let service = DebugService::default();
    service.analyze_files("p1", &app_js());
    let seen = record(&service);

    service.apply_all_fixes("p1", &app_js());

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].fixed_count, 3);
}

#[test]
fn test_apply_fix_notifies_and_rejects_unknown() {
    let service = DebugService::default();
    let session = service.analyze_files("p1", &app_js());
    let seen = record(&service);

    assert!(service.apply_fix("p1", "app.js:9:9:nope", &app_js()).is_none());
    assert!(seen.lock().unwrap().is_empty());

    let id = session.warnings[1].id.clone();
    let fixed = service.apply_fix("p1", &id, &app_js()).unwrap();
    assert_eq!(
        fixed[0].content,
        "var x = 1;\nif (x === 1) { console.log('hi'); }"
    );
    assert_eq!(seen.lock().unwrap().len(), 1);
    assert_eq!(service.get_error_count("p1").warnings, 2);
}

#[test]
fn test_apply_all_fixes_without_session() {
    let service = DebugService::default();
    let seen = record(&service);
    assert_eq!(service.apply_all_fixes("p1", &app_js()), app_js());
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn test_clear_round_trip() {
    let service = DebugService::default();
    let session = service.analyze_files("p1", &app_js());
    service.apply_fix("p1", &session.warnings[0].id, &app_js());
    assert_eq!(service.get_session("p1").unwrap().fixed_count, 1);

    service.clear_session("p1");
    assert!(service.get_session("p1").is_none());
    assert_eq!(service.get_error_count("p1").errors, 0);
    assert_eq!(service.get_error_count("p1").warnings, 0);

    let session = service.analyze_files("p1", &app_js());
    assert_eq!(session.fixed_count, 0);
    assert_eq!(session.warnings.len(), 3);
}

#[test]
fn test_clear_keeps_subscriptions() {
    let service = DebugService::default();
    let seen = record(&service);
    service.analyze_files("p1", &app_js());
    service.clear_session("p1");
    service.analyze_files("p1", &app_js());
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[test]
fn test_projects_are_isolated() {
    let service = DebugService::default();
    service.analyze_files("p1", &app_js());
    service.analyze_files("p2", &[ProjectFile::new("ok.js", "const a = 1;\n")]);

    assert_eq!(service.get_error_count("p1").warnings, 3);
    assert!(service.get_session("p2").unwrap().is_clean());

    service.clear_session("p2");
    assert!(service.get_session("p1").is_some());
}

#[test]
fn test_panicking_listener_does_not_block_others() {
    let service = DebugService::default();
    service.subscribe(|_| panic!("listener failure"));
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    service.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let session = service.analyze_files("p1", &app_js());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(service.get_session("p1"), Some(session));
}

#[test]
fn test_unsubscribe_stops_delivery() {
    let service = DebugService::default();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let subscription = service.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    service.analyze_files("p1", &app_js());
    subscription.unsubscribe();
    service.analyze_files("p1", &app_js());

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_severity_override_moves_to_errors() {
    let mut config = Config::default();
    config
        .rules
        .severity
        .insert("no-var".to_string(), Severity::Error);
    let service = DebugService::new(config);

    let session = service.analyze_files("p1", &app_js());
    assert_eq!(session.errors.len(), 1);
    assert_eq!(session.errors[0].rule_id, "no-var");
    assert_eq!(session.warnings.len(), 2);
}

#[test]
fn test_concurrent_analyses_publish_the_stored_session_last() {
    let service = Arc::new(DebugService::default());
    let seen = record(&service);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let service = Arc::clone(&service);
            std::thread::spawn(move || {
                let content = "var a = 1;\n".repeat(i + 1);
                service.analyze_files("p1", &[ProjectFile::new("a.js", content)]);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let seen = seen.lock().unwrap();
    assert!(!seen.is_empty());
    assert!(seen.iter().all(|s| !s.is_analyzing));
    assert_eq!(service.get_session("p1").as_ref(), seen.last());
}

#[test]
fn test_empty_catch_with_brace_on_next_line() {
    let content = "try { go(); } catch\n{} console.log(1);\nfunction f() {\n  return 1;\n}";
    let files = vec![ProjectFile::new("a.js", content)];
    let service = DebugService::default();
    let session = service.analyze_files("p1", &files);
    assert_eq!(rule_ids(&session), vec!["no-console", "empty-catch"]);

    let fixed = service.apply_all_fixes("p1", &files);
    assert_eq!(
        fixed[0].content,
        "try { go(); } catch (error)\nfunction f() {\n  return 1;\n}"
    );
}

#[test]
fn test_repeated_zero_units_are_all_fixed() {
    let files = vec![ProjectFile::new("a.css", "a { margin: 0px 0px; }")];
    let service = DebugService::default();
    let session = service.analyze_files("p1", &files);
    assert_eq!(rule_ids(&session), vec!["zero-units", "zero-units"]);

    let fixed = service.apply_all_fixes("p1", &files);
    assert_eq!(fixed[0].content, "a { margin: 0 0; }");
    assert!(analyze_file(&fixed[0]).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_debounce_runs_latest_snapshot_once() {
    let service = Arc::new(DebugService::default());
    let seen = record(&service);
    let delay = Duration::from_millis(500);

    let first = vec![ProjectFile::new("a.js", "var first = 1;")];
    let second = vec![ProjectFile::new("b.js", "const second = 2;")];

    assert!(service.schedule_analysis_with_delay("p1", first, delay));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(service.schedule_analysis_with_delay("p1", second, delay));
    assert_eq!(service.pending_analyses(), vec!["p1"]);

    tokio::time::sleep(Duration::from_millis(1000)).await;

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].is_clean());
    assert!(!service.has_pending("p1"));
    assert_eq!(service.get_session("p1").as_ref(), seen.first());
}

#[tokio::test(start_paused = true)]
async fn test_schedule_uses_configured_debounce() {
    let mut config = Config::default();
    config.engine.debounce_ms = 50;
    let service = Arc::new(DebugService::new(config));

    service.schedule_analysis("p1", app_js());
    tokio::time::sleep(Duration::from_millis(40)).await;
    assert!(service.get_session("p1").is_none());

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(service.get_error_count("p1").warnings, 3);
}

#[tokio::test(start_paused = true)]
async fn test_clear_cancels_pending_analysis() {
    let service = Arc::new(DebugService::default());
    let seen = record(&service);

    service.schedule_analysis("p1", app_js());
    assert!(service.has_pending("p1"));
    service.clear_session("p1");
    assert!(!service.has_pending("p1"));

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(service.get_session("p1").is_none());
    assert!(seen.lock().unwrap().is_empty());
}
