use std::collections::HashMap;
use std::sync::mpsc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use formfill_logging::formfill_trace;

use crate::{EngineEvent, TimerSlot};

/// Cancellable timers on a tokio runtime. Scheduling into a slot cancels
/// whatever is still pending there, so the last scheduled timer wins.
pub struct TimerScheduler {
    runtime: Handle,
    events: mpsc::Sender<EngineEvent>,
    pending: HashMap<TimerSlot, JoinHandle<()>>,
}

impl TimerScheduler {
    pub fn new(runtime: Handle, events: mpsc::Sender<EngineEvent>) -> Self {
        Self {
            runtime,
            events,
            pending: HashMap::new(),
        }
    }

    pub fn schedule(&mut self, slot: TimerSlot, tag: u64, delay: Duration) {
        self.pending.retain(|_, task| !task.is_finished());
        if let Some(previous) = self.pending.remove(&slot) {
            formfill_trace!("cancelling pending timer {:?}", slot);
            previous.abort();
        }

        let events = self.events.clone();
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(EngineEvent::TimerFired { slot, tag });
        });
        self.pending.insert(slot, task);
    }

    pub fn cancel(&mut self, slot: TimerSlot) -> bool {
        match self.pending.remove(&slot) {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.values().filter(|task| !task.is_finished()).count()
    }
}
