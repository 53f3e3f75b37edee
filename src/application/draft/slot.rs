//! Single-slot debounce timer.

use std::sync::Mutex;

use tokio::task::JoinHandle;

use crate::util::lock::mutex_lock;

const SOURCE: &str = "application::draft::slot";

/// Holds at most one pending timer task. Arming aborts the previous one.
///
/// The task only covers the waiting part of an autosave; once it fires it
/// hands the save off to a detached task, so aborting never cuts a request
/// in half.
#[derive(Debug, Default)]
pub(crate) struct AutosaveSlot {
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl AutosaveSlot {
    pub(crate) fn arm(&self, handle: JoinHandle<()>) {
        let previous = mutex_lock(&self.pending, SOURCE, "arm").replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Abort the pending timer. Returns whether one was still waiting.
    pub(crate) fn cancel(&self) -> bool {
        match mutex_lock(&self.pending, SOURCE, "cancel").take() {
            Some(handle) => {
                let waiting = !handle.is_finished();
                handle.abort();
                waiting
            }
            None => false,
        }
    }

    pub(crate) fn is_armed(&self) -> bool {
        mutex_lock(&self.pending, SOURCE, "is_armed")
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for AutosaveSlot {
    fn drop(&mut self) {
        let pending = match self.pending.get_mut() {
            Ok(pending) => pending.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = pending {
            handle.abort();
        }
    }
}
