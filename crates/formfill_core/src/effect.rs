use std::time::Duration;

use crate::{RequestId, ResumeFile};

/// Identifies a pending timer. Search debounces replace each other; each
/// overlay click gets its own timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKey {
    /// Debounce for the location search. `token` must match the latest one
    /// handed out for the firing to count.
    LocationSearch { token: u64 },
    /// Visual delay after an overlay button click.
    OverlayCompletion { click: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ScheduleTimer {
        timer: TimerKey,
        delay: Duration,
    },
    SearchLocations {
        request_id: RequestId,
        text: String,
        captcha_response: String,
    },
    UploadResume {
        request_id: RequestId,
        file: ResumeFile,
        account_id: String,
    },
    AbortUpload {
        request_id: RequestId,
    },
}

/// Result of routing one message into a component.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Outcome {
    pub effects: Vec<Effect>,
    /// Whether anything visible changed.
    pub changed: bool,
}

impl Outcome {
    pub fn ignored() -> Self {
        Self::default()
    }

    pub fn changed() -> Self {
        Self {
            effects: Vec::new(),
            changed: true,
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}
