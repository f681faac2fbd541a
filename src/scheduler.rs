//! Debounced analysis scheduling
//!
//! One pending slot per key. Scheduling again replaces the slot and aborts
//! the previous timer, so only the last call within the quiet period runs.

use dashmap::DashMap;
use log::{debug, error};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;

struct Slot {
    generation: u64,
    handle: Option<AbortHandle>,
}

impl Slot {
    fn cancel(self) {
        if let Some(handle) = self.handle {
            handle.abort();
        }
    }
}

/// Arena of replaceable delayed jobs keyed by name
#[derive(Default)]
pub struct Scheduler {
    slots: Arc<DashMap<String, Slot>>,
    next_generation: AtomicU64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `job` after `delay` unless the key is rescheduled or cancelled
    /// first.
    ///
    /// Must be called from within a tokio runtime. Returns false, without
    /// touching any pending job, when there is none.
    pub fn schedule<F>(&self, key: &str, delay: Duration, job: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                error!("Cannot schedule '{}' outside a tokio runtime: {}", key, e);
                return false;
            }
        };

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
        let previous = self.slots.insert(
            key.to_string(),
            Slot {
                generation,
                handle: None,
            },
        );
        if let Some(previous) = previous {
            debug!("Rescheduling '{}'", key);
            previous.cancel();
        }

        let slots = Arc::clone(&self.slots);
        let owned_key = key.to_string();
        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            // Only the job still owning the slot may fire
            let fired = slots
                .remove_if(&owned_key, |_, slot| slot.generation == generation)
                .is_some();
            if fired {
                debug!("Running scheduled job '{}'", owned_key);
                job();
            }
        });

        if let Some(mut slot) = self.slots.get_mut(key) {
            if slot.generation == generation {
                slot.handle = Some(task.abort_handle());
            }
        }
        true
    }

    /// Drop the pending job for a key. Returns true if one was pending.
    pub fn cancel(&self, key: &str) -> bool {
        match self.slots.remove(key) {
            Some((_, slot)) => {
                debug!("Cancelled scheduled job '{}'", key);
                slot.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    /// Keys with a pending job, sorted
    pub fn pending(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.slots.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        for entry in self.slots.iter() {
            if let Some(handle) = &entry.value().handle {
                handle.abort();
            }
        }
    }
}
