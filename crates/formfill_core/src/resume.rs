use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;

use formfill_logging::{formfill_debug, formfill_info, formfill_warn};

use crate::effect::Outcome;
use crate::fields::{self, FormFields};
use crate::links::{classify_links, LinkBucket, ProfileLink};
use crate::state::RequestIds;
use crate::{Effect, RequestId};

/// Largest resume accepted for upload, in bytes.
pub const MAX_FILE_SIZE: u64 = 100 * 1000 * 1000;

/// Body the parse endpoint sends with a 400 when the upload was too big.
pub const PAYLOAD_TOO_LARGE_BODY: &str = "PayloadTooLargeError";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeFile {
    pub name: String,
    pub size: u64,
    pub path: PathBuf,
}

/// Candidate values extracted from a resume. Only ever a suggestion.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeProfile {
    pub position: Option<String>,
    pub phone: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub location: Option<Value>,
    pub links: Option<Vec<ProfileLink>>,
    pub resume_storage_id: Option<String>,
}

impl ResumeProfile {
    fn location_name(&self) -> Option<&str> {
        self.location
            .as_ref()
            .and_then(|location| location.get("name"))
            .and_then(Value::as_str)
    }

    fn location_json(&self) -> Option<String> {
        self.location
            .as_ref()
            .filter(|location| !location.is_null())
            .map(Value::to_string)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    Parsed(ResumeProfile),
    PayloadTooLarge,
    Failed,
}

/// Interprets a parse endpoint reply.
pub fn decode_resume_reply(status: u16, body: &str) -> UploadOutcome {
    match status {
        200 => match serde_json::from_str::<Option<ResumeProfile>>(body) {
            Ok(Some(profile)) => UploadOutcome::Parsed(profile),
            Ok(None) => UploadOutcome::Failed,
            Err(err) => {
                formfill_warn!("resume parse body rejected: {}", err);
                UploadOutcome::Failed
            }
        },
        400 if body == PAYLOAD_TOO_LARGE_BODY => UploadOutcome::PayloadTooLarge,
        _ => {
            formfill_debug!("resume parse returned status {}", status);
            UploadOutcome::Failed
        }
    }
}

/// Which upload indicator is visible. At most one is shown at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadStatus {
    #[default]
    Idle,
    Working,
    Succeeded,
    Failed,
    Oversize,
}

/// Resume upload widget: size check, single in-flight upload, and merging
/// the parsed profile into untouched fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResumeUpload {
    status: UploadStatus,
    in_flight: Option<RequestId>,
}

impl ResumeUpload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    pub fn in_flight(&self) -> Option<RequestId> {
        self.in_flight
    }

    pub(crate) fn on_selected(
        &mut self,
        form: &FormFields,
        ids: &mut RequestIds,
        file: Option<ResumeFile>,
    ) -> Outcome {
        let previous = self.status;
        self.status = UploadStatus::Idle;
        let Some(file) = file.filter(|file| file.size > 0) else {
            return Outcome {
                effects: Vec::new(),
                changed: previous != UploadStatus::Idle,
            };
        };
        if file.size > MAX_FILE_SIZE {
            formfill_info!("resume {} rejected locally: {} bytes", file.name, file.size);
            self.status = UploadStatus::Oversize;
            return Outcome::changed();
        }

        // An earlier upload still running is superseded by this one.
        let mut outcome = Outcome::changed();
        if let Some(request_id) = self.in_flight.take() {
            outcome.effects.push(Effect::AbortUpload { request_id });
        }
        let request_id = ids.next_id();
        self.in_flight = Some(request_id);
        self.status = UploadStatus::Working;
        outcome.effects.push(Effect::UploadResume {
            request_id,
            file,
            account_id: form.value(fields::ACCOUNT_ID).unwrap_or_default().to_string(),
        });
        outcome
    }

    pub(crate) fn on_completed(
        &mut self,
        form: &mut FormFields,
        request_id: RequestId,
        outcome: UploadOutcome,
    ) -> Outcome {
        if self.in_flight != Some(request_id) {
            formfill_debug!("dropping stale resume upload result request_id={}", request_id);
            return Outcome::ignored();
        }
        self.in_flight = None;
        self.status = match outcome {
            UploadOutcome::Parsed(profile) => {
                apply_profile(form, &profile);
                UploadStatus::Succeeded
            }
            UploadOutcome::PayloadTooLarge => UploadStatus::Oversize,
            UploadOutcome::Failed => UploadStatus::Failed,
        };
        Outcome::changed()
    }
}

/// Merges a parsed resume into every field the user has not touched.
pub fn apply_profile(form: &mut FormFields, profile: &ResumeProfile) {
    form.fill_untouched(fields::ORG, profile.position.as_deref());
    form.fill_untouched(fields::PHONE, profile.phone.as_deref());
    form.fill_untouched(fields::NAME, profile.name.as_deref());
    form.fill_untouched(fields::EMAIL, profile.email.as_deref());
    form.fill_untouched(fields::LOCATION, profile.location_name());
    form.fill_untouched(fields::SELECTED_LOCATION, profile.location_json().as_deref());

    let found = classify_links(profile.links.as_deref().unwrap_or_default());
    for bucket in LinkBucket::ALL {
        let url = found.get(&bucket).and_then(Option::as_deref);
        form.fill_untouched(bucket.field_name(), url);
    }

    if let Some(storage_id) = profile
        .resume_storage_id
        .as_deref()
        .filter(|id| !id.is_empty())
    {
        form.fill_untouched(fields::RESUME_STORAGE_ID, Some(storage_id));
    }
}
