use serde_json::Value;

use crate::{RequestId, ResumeFile, SearchOutcome, TimerKey, UploadOutcome};

/// Keys the location input reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Enter,
    Other,
}

/// Body of a cross-origin message, either still serialized or already
/// structured by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum MessagePayload {
    Text(String),
    Structured(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Text input event on the location field.
    LocationInput(String),
    /// Key pressed while the location field has focus.
    LocationKeyDown(Key),
    /// Mouse press on the rendered option at this index.
    LocationOptionPressed(usize),
    /// Focus left the location field.
    LocationBlur { onto_option: bool },
    /// Verification token to attach to location searches.
    CaptchaSolved(String),
    /// User changed a form field. Typing into the location input arrives as
    /// `LocationInput`; the browser-level change event still comes here.
    FieldChanged { name: String, value: String },
    /// User pasted into a form field.
    FieldPasted { name: String, value: String },
    /// Resume file input changed; `None` when the selection was cleared.
    ResumeSelected(Option<ResumeFile>),
    /// A scheduled timer elapsed.
    TimerFired(TimerKey),
    /// Location search finished.
    SearchCompleted {
        request_id: RequestId,
        outcome: SearchOutcome,
    },
    /// Resume upload finished.
    ResumeUploadCompleted {
        request_id: RequestId,
        outcome: UploadOutcome,
    },
    /// User clicked the autofill overlay button.
    OverlayClicked,
    /// Message received from another window.
    AutofillMessage {
        origin: String,
        payload: MessagePayload,
    },
    /// Prefill profile delivered directly by the autofill provider.
    PrefillDataReceived(Option<Value>),
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
