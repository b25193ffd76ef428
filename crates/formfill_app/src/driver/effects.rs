use std::collections::HashSet;
use std::time::Duration;

use formfill_core::{
    decode_resume_reply, decode_search_reply, Effect, Msg, RequestId, ResumeFile, SearchOutcome,
    TimerKey, UploadOutcome,
};
use formfill_engine::{EngineEvent, EngineHandle, ResumeUploadRequest, TimerSlot};
use formfill_logging::{formfill_debug, formfill_info, formfill_warn};

const LOCATION_SEARCH_SLOT: &str = "location-search";
const OVERLAY_COMPLETION_SLOT: &str = "overlay-completion";

/// Work the engine has been asked for and has not reported back on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Outstanding {
    Search(RequestId),
    Upload(RequestId),
    Timer(TimerSlot, u64),
}

/// Executes core effects on the engine and turns engine events back into
/// messages.
pub struct EffectRunner {
    engine: EngineHandle,
    outstanding: HashSet<Outstanding>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self {
            engine,
            outstanding: HashSet::new(),
        }
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ScheduleTimer { timer, delay } => {
                    let (slot, tag) = timer_slot(timer);
                    // The engine replaces whatever was pending in the slot.
                    self.outstanding
                        .retain(|work| !matches!(work, Outstanding::Timer(pending, _) if *pending == slot));
                    self.outstanding.insert(Outstanding::Timer(slot, tag));
                    self.engine.schedule(slot, tag, delay);
                }
                Effect::SearchLocations {
                    request_id,
                    text,
                    captcha_response,
                } => {
                    formfill_info!("SearchLocations request_id={} text_len={}", request_id, text.len());
                    self.outstanding.insert(Outstanding::Search(request_id));
                    self.engine.search(request_id, text, captcha_response);
                }
                Effect::UploadResume {
                    request_id,
                    file,
                    account_id,
                } => {
                    formfill_info!("UploadResume request_id={} size={}", request_id, file.size);
                    self.outstanding.insert(Outstanding::Upload(request_id));
                    self.engine.upload(request_id, upload_request(file, account_id));
                }
                Effect::AbortUpload { request_id } => {
                    formfill_debug!("AbortUpload request_id={}", request_id);
                    self.outstanding.remove(&Outstanding::Upload(request_id));
                    self.engine.abort_upload(request_id);
                }
            }
        }
    }

    /// True once every request and timer has reported back.
    pub fn is_idle(&self) -> bool {
        self.outstanding.is_empty()
    }

    /// Waits for the next engine event and maps it to a message.
    pub fn next_msg(&mut self, timeout: Duration) -> Option<Msg> {
        let event = self.engine.recv_timeout(timeout)?;
        let settled = match &event {
            EngineEvent::SearchFinished { request_id, .. } => Outstanding::Search(*request_id),
            EngineEvent::UploadFinished { request_id, .. } => Outstanding::Upload(*request_id),
            EngineEvent::TimerFired { slot, tag } => Outstanding::Timer(*slot, *tag),
        };
        self.outstanding.remove(&settled);
        Some(event_to_msg(event).unwrap_or(Msg::NoOp))
    }
}

pub(crate) fn timer_slot(timer: TimerKey) -> (TimerSlot, u64) {
    match timer {
        TimerKey::LocationSearch { token } => (TimerSlot::new(LOCATION_SEARCH_SLOT, 0), token),
        TimerKey::OverlayCompletion { click } => {
            (TimerSlot::new(OVERLAY_COMPLETION_SLOT, click), click)
        }
    }
}

pub(crate) fn timer_key(slot: TimerSlot, tag: u64) -> Option<TimerKey> {
    match slot.name {
        LOCATION_SEARCH_SLOT => Some(TimerKey::LocationSearch { token: tag }),
        OVERLAY_COMPLETION_SLOT => Some(TimerKey::OverlayCompletion { click: tag }),
        _ => None,
    }
}

fn upload_request(file: ResumeFile, account_id: String) -> ResumeUploadRequest {
    ResumeUploadRequest {
        file_name: file.name,
        path: file.path,
        account_id,
    }
}

pub(crate) fn event_to_msg(event: EngineEvent) -> Option<Msg> {
    match event {
        EngineEvent::SearchFinished { request_id, result } => {
            let outcome = match result {
                Ok(reply) => decode_search_reply(reply.status, &reply.body),
                Err(err) => {
                    formfill_warn!("Location search {} failed: {}", request_id, err);
                    SearchOutcome::NoData
                }
            };
            Some(Msg::SearchCompleted {
                request_id,
                outcome,
            })
        }
        EngineEvent::UploadFinished { request_id, result } => {
            let outcome = match result {
                Ok(reply) => decode_resume_reply(reply.status, &reply.body),
                Err(err) => {
                    formfill_warn!("Resume upload {} failed: {}", request_id, err);
                    UploadOutcome::Failed
                }
            };
            Some(Msg::ResumeUploadCompleted {
                request_id,
                outcome,
            })
        }
        EngineEvent::TimerFired { slot, tag } => timer_key(slot, tag).map(Msg::TimerFired),
    }
}
