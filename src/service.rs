//! The debug service: session store, fix application and notification
//!
//! A `DebugService` is an explicit value, usually shared behind an `Arc`.
//! Sessions and pending analyses are keyed by project id; every session
//! replacement or fix is pushed to all subscribers.

use crate::config::Config;
use crate::diagnostic::Diagnostic;
use crate::engine::Analyzer;
use crate::fixer;
use crate::notifier::{Notifier, Subscription};
use crate::scheduler::Scheduler;
use crate::session::{DebugSession, ErrorCount, ProjectFile};
use dashmap::DashMap;
use log::{debug, info};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Analysis generations of one project
#[derive(Debug, Default, Clone, Copy)]
struct Generation {
    /// Last generation handed out
    started: u64,
    /// Newest generation whose result was stored
    committed: u64,
}

/// Diagnostics and auto-fix service
pub struct DebugService {
    analyzer: Analyzer,
    sessions: DashMap<String, DebugSession>,
    generations: DashMap<String, Generation>,
    notifier: Notifier,
    /// Held across every store-and-publish so subscribers see commit order
    publishing: Mutex<()>,
    scheduler: Scheduler,
    debounce: Duration,
}

impl Default for DebugService {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl DebugService {
    pub fn new(config: Config) -> Self {
        let debounce = config.engine.debounce();
        Self {
            analyzer: Analyzer::new(config),
            sessions: DashMap::new(),
            generations: DashMap::new(),
            notifier: Notifier::new(),
            publishing: Mutex::new(()),
            scheduler: Scheduler::new(),
            debounce,
        }
    }

    pub fn config(&self) -> &Config {
        self.analyzer.config()
    }

    /// Analyze a project now, store the session and notify subscribers.
    ///
    /// If another analysis of the same project started later, the result is
    /// returned but neither stored nor published. Listeners must not call
    /// back into methods that store sessions.
    pub fn analyze_files(&self, project_id: &str, files: &[ProjectFile]) -> DebugSession {
        let generation = self.begin_analysis(project_id);
        debug!(
            "Analyzing project {} ({} files, generation {})",
            project_id,
            files.len(),
            generation
        );

        let diagnostics = self.analyzer.analyze(files);
        self.finish_analysis(project_id, generation, DebugSession::new(project_id, diagnostics))
    }

    /// Debounced `analyze_files` using the configured delay
    pub fn schedule_analysis(self: &Arc<Self>, project_id: &str, files: Vec<ProjectFile>) -> bool {
        self.schedule_analysis_with_delay(project_id, files, self.debounce)
    }

    /// Debounced `analyze_files`.
    ///
    /// Replaces any pending analysis of the project; only the latest
    /// snapshot is analyzed once `delay` passes without another call. Must
    /// be called inside a tokio runtime; returns false otherwise.
    pub fn schedule_analysis_with_delay(
        self: &Arc<Self>,
        project_id: &str,
        files: Vec<ProjectFile>,
        delay: Duration,
    ) -> bool {
        let service = Arc::downgrade(self);
        let owned_id = project_id.to_string();
        self.scheduler.schedule(project_id, delay, move || {
            if let Some(service) = service.upgrade() {
                service.analyze_files(&owned_id, &files);
            }
        })
    }

    /// Whether an analysis is waiting for its quiet period
    pub fn has_pending(&self, project_id: &str) -> bool {
        self.scheduler.is_pending(project_id)
    }

    /// Projects with a pending analysis, sorted
    pub fn pending_analyses(&self) -> Vec<String> {
        self.scheduler.pending()
    }

    /// Apply the fix of one diagnostic.
    ///
    /// Returns `None`, changing nothing, when the project has no session or
    /// the diagnostic is unknown or has no fix.
    pub fn apply_fix(
        &self,
        project_id: &str,
        error_id: &str,
        files: &[ProjectFile],
    ) -> Option<Vec<ProjectFile>> {
        let fix = {
            let session = self.sessions.get(project_id)?;
            session.find(error_id)?.fix.clone()?
        };

        let result = fixer::apply_fix_to_files(files, &fix);
        debug!("Applied fix '{}' to {}", fix.description, error_id);

        let _order = self.publish_lock();
        let updated = self.sessions.get_mut(project_id).map(|mut session| {
            if session.remove(error_id).is_some() {
                session.fixed_count += 1;
            }
            session.clone()
        });
        if let Some(session) = updated {
            self.notifier.publish(&session);
        }

        Some(result)
    }

    /// Apply every auto-fixable diagnostic, bottom of each file first.
    ///
    /// Subscribers are notified once after the whole batch. Without a
    /// session the input is returned unchanged.
    pub fn apply_all_fixes(&self, project_id: &str, files: &[ProjectFile]) -> Vec<ProjectFile> {
        let Some(fixable) = self.sessions.get(project_id).map(|s| s.fixable()) else {
            return files.to_vec();
        };

        let result = fixer::apply_in_order(files, &fixable);
        debug!("Applied {} fixes to project {}", fixable.len(), project_id);

        let _order = self.publish_lock();
        let updated = self.sessions.get_mut(project_id).map(|mut session| {
            for diag in &fixable {
                if session.remove(&diag.id).is_some() {
                    session.fixed_count += 1;
                }
            }
            session.clone()
        });
        if let Some(session) = updated {
            self.notifier.publish(&session);
        }

        result
    }

    /// Current session of a project
    pub fn get_session(&self, project_id: &str) -> Option<DebugSession> {
        self.sessions.get(project_id).map(|s| s.clone())
    }

    /// Error and warning totals, zero without a session
    pub fn get_error_count(&self, project_id: &str) -> ErrorCount {
        self.sessions
            .get(project_id)
            .map(|s| s.error_count())
            .unwrap_or_default()
    }

    /// Diagnostics of a project, errors first
    pub fn diagnostics(&self, project_id: &str) -> Vec<Diagnostic> {
        self.sessions
            .get(project_id)
            .map(|s| s.diagnostics().cloned().collect())
            .unwrap_or_default()
    }

    /// Forget a project's session and cancel its pending analysis.
    ///
    /// Subscriptions are left alone. Analyses already running when this is
    /// called are discarded.
    pub fn clear_session(&self, project_id: &str) {
        self.scheduler.cancel(project_id);
        if let Some(mut generation) = self.generations.get_mut(project_id) {
            generation.committed = generation.started;
        }
        if self.sessions.remove(project_id).is_some() {
            debug!("Cleared session of {}", project_id);
        }
    }

    /// Receive every published session
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&DebugSession) + Send + Sync + 'static,
    {
        self.notifier.subscribe(listener)
    }

    /// Take the next generation and mark the project as analyzing
    fn begin_analysis(&self, project_id: &str) -> u64 {
        let generation = {
            let mut entry = self.generations.entry(project_id.to_string()).or_default();
            entry.started += 1;
            entry.started
        };

        match self.sessions.get_mut(project_id) {
            Some(mut session) => session.is_analyzing = true,
            None => {
                self.sessions
                    .insert(project_id.to_string(), DebugSession::pending(project_id));
            }
        }
        generation
    }

    /// Store and publish a finished analysis if it is still the newest
    fn finish_analysis(
        &self,
        project_id: &str,
        generation: u64,
        session: DebugSession,
    ) -> DebugSession {
        let _order = self.publish_lock();
        match self.commit_analysis(project_id, generation, session.clone()) {
            Some(stored) => {
                info!(
                    "Project {}: {} errors, {} warnings",
                    project_id,
                    stored.errors.len(),
                    stored.warnings.len()
                );
                self.notifier.publish(&stored);
                stored
            }
            None => {
                debug!(
                    "Discarding stale analysis of {} (generation {})",
                    project_id, generation
                );
                session
            }
        }
    }

    /// Store a finished analysis only if no later one was started or stored
    fn commit_analysis(
        &self,
        project_id: &str,
        generation: u64,
        mut session: DebugSession,
    ) -> Option<DebugSession> {
        {
            let mut entry = self.generations.entry(project_id.to_string()).or_default();
            if generation <= entry.committed || generation < entry.started {
                return None;
            }
            entry.committed = generation;
        }
        session.is_analyzing = false;
        self.sessions.insert(project_id.to_string(), session.clone());
        Some(session)
    }

    fn publish_lock(&self) -> MutexGuard<'_, ()> {
        // Listener panics are caught before they can poison the lock
        self.publishing.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn app_js() -> Vec<ProjectFile> {
        vec![ProjectFile::new(
            "app.js",
            "var x = 1;\nif (x == 1) { console.log('hi'); }",
        )]
    }

    #[test]
    fn test_service_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DebugService>();
    }

    #[test]
    fn test_analyze_stores_and_notifies() {
        let service = DebugService::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        service.subscribe(move |session| {
            assert!(!session.is_analyzing);
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let session = service.analyze_files("p1", &app_js());
        assert_eq!(session.warnings.len(), 3);
        assert_eq!(service.get_session("p1"), Some(session));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_pending_session_while_analyzing() {
        let service = DebugService::default();
        let generation = service.begin_analysis("p1");
        let pending = service.get_session("p1").unwrap();
        assert!(pending.is_analyzing);
        assert!(pending.is_clean());

        service.commit_analysis("p1", generation, DebugSession::new("p1", Vec::new()));
        assert!(!service.get_session("p1").unwrap().is_analyzing);
    }

    #[test]
    fn test_last_started_analysis_wins() {
        let service = DebugService::default();
        let older = service.begin_analysis("p1");
        let newer = service.begin_analysis("p1");

        let stored = service
            .commit_analysis("p1", newer, DebugSession::new("p1", Vec::new()))
            .unwrap();
        assert!(!stored.is_analyzing);

        assert!(service
            .commit_analysis("p1", older, DebugSession::new("p1", Vec::new()))
            .is_none());
        assert_eq!(service.get_session("p1").unwrap().id, stored.id);
    }

    #[test]
    fn test_older_result_dropped_while_newer_runs() {
        let service = DebugService::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        service.subscribe(move |session| {
            sink.lock().unwrap().push((session.is_analyzing, session.warnings.len()))
        });

        let older = service.begin_analysis("p1");
        let newer = service.begin_analysis("p1");

        let stale = DebugSession::new("p1", service.analyzer.analyze(&app_js()));
        let returned = service.finish_analysis("p1", older, stale);
        assert_eq!(returned.warnings.len(), 3);
        assert!(seen.lock().unwrap().is_empty());
        let pending = service.get_session("p1").unwrap();
        assert!(pending.is_analyzing);
        assert!(pending.is_clean());

        service.finish_analysis("p1", newer, DebugSession::new("p1", Vec::new()));
        assert_eq!(*seen.lock().unwrap(), vec![(false, 0)]);
        assert!(!service.get_session("p1").unwrap().is_analyzing);
    }

    #[test]
    fn test_clear_discards_in_flight_analysis() {
        let service = DebugService::default();
        let generation = service.begin_analysis("p1");
        service.clear_session("p1");

        assert!(service
            .commit_analysis("p1", generation, DebugSession::new("p1", Vec::new()))
            .is_none());
        assert!(service.get_session("p1").is_none());
    }

    #[test]
    fn test_apply_fix_unknown_ids() {
        let service = DebugService::default();
        assert!(service.apply_fix("p1", "nope", &app_js()).is_none());

        service.analyze_files("p1", &app_js());
        assert!(service.apply_fix("p1", "nope", &app_js()).is_none());
        assert_eq!(service.get_session("p1").unwrap().fixed_count, 0);
    }

    #[test]
    fn test_apply_fix_updates_session() {
        let service = DebugService::default();
        let session = service.analyze_files("p1", &app_js());
        let target = session.warnings[0].id.clone();

        let files = service.apply_fix("p1", &target, &app_js()).unwrap();
        assert!(files[0].content.starts_with("const x = 1;"));

        let session = service.get_session("p1").unwrap();
        assert_eq!(session.fixed_count, 1);
        assert!(session.find(&target).is_none());
        assert_eq!(service.get_error_count("p1").warnings, 2);
    }

    #[test]
    fn test_error_count_without_session() {
        let service = DebugService::default();
        assert_eq!(service.get_error_count("none"), ErrorCount::default());
        assert!(service.diagnostics("none").is_empty());
    }
}
