//! File watcher feeding the analysis scheduler
//!
//! Raw filesystem events are filtered down to source files outside the
//! skipped directories. Coalescing bursts is left to the scheduler.

use crate::loader::{is_source_file, SKIPPED_DIRS};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as _};
use std::path::{Component, Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Watcher error: {0}")]
    Notify(#[from] notify::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Watch event
#[derive(Debug, Clone)]
pub struct WatchEvent {
    /// Changed file paths
    pub paths: Vec<PathBuf>,
    /// Event kind
    pub kind: WatchEventKind,
}

/// Kind of watch event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEventKind {
    Modified,
    Created,
    Deleted,
}

impl WatchEventKind {
    fn from_notify(kind: &EventKind) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(Self::Created),
            EventKind::Modify(_) => Some(Self::Modified),
            EventKind::Remove(_) => Some(Self::Deleted),
            _ => None,
        }
    }
}

/// Recursive watcher over one project root
pub struct Watcher {
    _watcher: RecommendedWatcher,
    receiver: Receiver<Result<Event, notify::Error>>,
    root: PathBuf,
}

impl Watcher {
    /// Start watching a directory
    pub fn new(root: &Path) -> Result<Self, WatchError> {
        let root = root.canonicalize()?;
        let (tx, rx) = mpsc::channel();

        let mut watcher = notify::recommended_watcher(tx)?;
        watcher.watch(&root, RecursiveMode::Recursive)?;

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
            root,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Block until a relevant change arrives. `None` once the watcher is
    /// gone.
    pub fn wait(&self) -> Option<Result<WatchEvent, WatchError>> {
        loop {
            let event = self.receiver.recv().ok()?;
            if let Some(result) = self.filter(event) {
                return Some(result);
            }
        }
    }

    /// Like [`Watcher::wait`] but gives up after `timeout`
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<WatchEvent, WatchError>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(event) => self.filter(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    fn filter(&self, event: Result<Event, notify::Error>) -> Option<Result<WatchEvent, WatchError>> {
        let event = match event {
            Ok(event) => event,
            Err(e) => return Some(Err(e.into())),
        };
        let kind = WatchEventKind::from_notify(&event.kind)?;

        let paths: Vec<PathBuf> = event
            .paths
            .into_iter()
            .filter(|p| self.is_relevant(p))
            .collect();

        if paths.is_empty() {
            None
        } else {
            Some(Ok(WatchEvent { paths, kind }))
        }
    }

    /// Source file under the root and outside skipped directories
    fn is_relevant(&self, path: &Path) -> bool {
        let Ok(relative) = path.strip_prefix(&self.root) else {
            return false;
        };
        let skipped = relative.components().any(|c| match c {
            Component::Normal(name) => name.to_str().is_some_and(|n| SKIPPED_DIRS.contains(&n)),
            _ => false,
        });
        !skipped && is_source_file(path)
    }
}
