use crate::autocomplete::LocationAutocomplete;
use crate::effect::Outcome;
use crate::fields::FormFields;
use crate::overlay::AutofillOverlay;
use crate::resume::ResumeUpload;
use crate::view_model::{AppViewModel, FieldView, LocationOptionView, LocationView, OverlayView};
use crate::{fields, Effect};

pub type RequestId = u64;

/// Hands out monotonically increasing request ids.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestIds {
    last: RequestId,
}

impl RequestIds {
    pub fn next_id(&mut self) -> RequestId {
        self.last += 1;
        self.last
    }
}

/// Page state: the form plus one instance of each widget.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub(crate) form: FormFields,
    pub(crate) location: LocationAutocomplete,
    pub(crate) resume: ResumeUpload,
    pub(crate) overlay: AutofillOverlay,
    pub(crate) captcha_response: String,
    pub(crate) ids: RequestIds,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_form(FormFields::standard())
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_form(form: FormFields) -> Self {
        Self {
            form,
            location: LocationAutocomplete::new(),
            resume: ResumeUpload::new(),
            overlay: AutofillOverlay::new(),
            captcha_response: String::new(),
            ids: RequestIds::default(),
            dirty: false,
        }
    }

    pub fn form(&self) -> &FormFields {
        &self.form
    }

    pub fn location(&self) -> &LocationAutocomplete {
        &self.location
    }

    pub fn resume(&self) -> &ResumeUpload {
        &self.resume
    }

    pub fn overlay(&self) -> &AutofillOverlay {
        &self.overlay
    }

    pub fn view(&self) -> AppViewModel {
        let active = self.location.active();
        let options = self
            .location
            .results()
            .iter()
            .enumerate()
            .map(|(index, record)| LocationOptionView {
                id: format!("location-{index}"),
                label: record.label(),
                active: active == Some(index),
            })
            .collect();

        AppViewModel {
            location: LocationView {
                input: self.form.value(fields::LOCATION).unwrap_or_default().to_string(),
                selected: self
                    .form
                    .value(fields::SELECTED_LOCATION)
                    .unwrap_or_default()
                    .to_string(),
                dropdown: self.location.dropdown(),
                options,
            },
            resume: self.resume.status(),
            overlay: OverlayView {
                button: self.overlay.button(),
                masked: self.overlay.masked(),
            },
            fields: self
                .form
                .iter()
                .map(|(name, field)| FieldView {
                    name: name.to_string(),
                    value: field.value.clone(),
                    touched: field.touched,
                })
                .collect(),
            dirty: self.dirty,
        }
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn absorb(&mut self, outcome: Outcome) -> Vec<Effect> {
        if outcome.changed {
            self.dirty = true;
        }
        outcome.effects
    }
}
