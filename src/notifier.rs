//! Subscriber registry for session updates
//!
//! Listeners receive the whole session after every change, in subscription
//! order. A panicking listener is logged and skipped; the others still run.

use crate::session::DebugSession;
use log::error;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

/// Callback invoked with every published session
pub type Listener = Arc<dyn Fn(&DebugSession) + Send + Sync>;

type ListenerList = RwLock<Vec<(u64, Listener)>>;

/// Ordered listener list
#[derive(Default)]
pub struct Notifier {
    listeners: Arc<ListenerList>,
    next_id: AtomicU64,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&DebugSession) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        match self.listeners.write() {
            Ok(mut listeners) => listeners.push((id, Arc::new(listener))),
            Err(poisoned) => poisoned.into_inner().push((id, Arc::new(listener))),
        }

        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver a session to every listener.
    ///
    /// The list is copied first so listeners may subscribe or unsubscribe
    /// while being called.
    pub fn publish(&self, session: &DebugSession) {
        for (id, listener) in self.snapshot() {
            let result = panic::catch_unwind(AssertUnwindSafe(|| listener(session)));
            if let Err(payload) = result {
                error!(
                    "Listener {} panicked on session {} of project {}: {}",
                    id,
                    session.id,
                    session.project_id,
                    panic_message(payload.as_ref())
                );
            }
        }
    }

    fn snapshot(&self) -> Vec<(u64, Listener)> {
        match self.listeners.read() {
            Ok(listeners) => listeners.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

/// Handle returned by [`Notifier::subscribe`].
///
/// Dropping the handle keeps the listener registered; call
/// [`Subscription::unsubscribe`] to remove it.
#[derive(Debug, Clone)]
pub struct Subscription {
    id: u64,
    listeners: Weak<ListenerList>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Remove the listener. Returns false if it was already gone.
    pub fn unsubscribe(&self) -> bool {
        let Some(listeners) = self.listeners.upgrade() else {
            return false;
        };
        let mut listeners = match listeners.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let before = listeners.len();
        listeners.retain(|(id, _)| *id != self.id);
        listeners.len() != before
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
