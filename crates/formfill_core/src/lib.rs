//! Formfill core: pure state machines for the job-application form
//! widgets and the view-model they project.
mod autocomplete;
mod country;
mod effect;
pub mod fields;
mod links;
mod message;
mod msg;
mod overlay;
mod resume;
mod search;
mod state;
mod update;
mod view_model;

pub use autocomplete::{DropdownState, LocationAutocomplete, SEARCH_DELAY};
pub use country::country_name;
pub use effect::{Effect, TimerKey};
pub use fields::{FieldEvent, FormField, FormFields};
pub use links::{classify_links, LinkBucket, ProfileLink};
pub use message::{decode_message, is_trusted_origin, AutofillMethod, MessageError, MESSAGE_ORIGIN};
pub use msg::{Key, MessagePayload, Msg};
pub use overlay::{
    apply_prefill, text_kernel_location, AutofillOverlay, ButtonState, PrefillData,
    OVERLAY_COMPLETION_DELAY,
};
pub use resume::{
    apply_profile, decode_resume_reply, ResumeFile, ResumeProfile, ResumeUpload, UploadOutcome,
    UploadStatus, MAX_FILE_SIZE, PAYLOAD_TOO_LARGE_BODY,
};
pub use search::{
    decode_search_reply, is_valid_search_query, LocationRecord, SearchOutcome,
    LOCATION_MAX_SEARCH_LENGTH,
};
pub use state::{AppState, RequestId, RequestIds};
pub use update::update;
pub use view_model::{AppViewModel, FieldView, LocationOptionView, LocationView, OverlayView};
