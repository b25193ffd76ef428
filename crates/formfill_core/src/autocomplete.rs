use std::time::Duration;

use formfill_logging::{formfill_debug, formfill_trace};

use crate::effect::Outcome;
use crate::fields::{self, FormFields};
use crate::search::{is_valid_search_query, LocationRecord, SearchOutcome};
use crate::state::RequestIds;
use crate::{Effect, Key, RequestId, TimerKey};

/// Quiet period after the last keystroke before a search is issued.
pub const SEARCH_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropdownState {
    #[default]
    Closed,
    Loading,
    ShowingResults,
    NoResults,
}

/// Search-as-you-type location picker.
///
/// The visible text lives in the `location` form field and the committed
/// record in `selectedLocation`; this type owns only the transient search
/// state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LocationAutocomplete {
    dropdown: DropdownState,
    results: Vec<LocationRecord>,
    active: Option<usize>,
    debounce_token: u64,
    in_flight: Option<RequestId>,
}

impl LocationAutocomplete {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dropdown(&self) -> DropdownState {
        self.dropdown
    }

    pub fn results(&self) -> &[LocationRecord] {
        &self.results
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub(crate) fn on_input(&mut self, form: &mut FormFields, text: String) -> Outcome {
        form.set_programmatic(fields::LOCATION, text);
        if self.dropdown == DropdownState::Closed {
            self.dropdown = DropdownState::Loading;
        }
        Outcome::changed().with_effect(self.restart_debounce())
    }

    pub(crate) fn on_key(&mut self, form: &mut FormFields, key: Key) -> Outcome {
        match key {
            Key::ArrowLeft | Key::ArrowRight => Outcome::ignored(),
            Key::ArrowDown => self.move_active(|active, count| match active {
                Some(index) if index + 1 < count => index + 1,
                _ => 0,
            }),
            Key::ArrowUp => self.move_active(|active, count| match active {
                Some(index) if index > 0 => index - 1,
                _ => count - 1,
            }),
            Key::Enter => match self.active {
                Some(index) => self.commit(form, index),
                None => Outcome::ignored(),
            },
            Key::Other => Outcome {
                effects: vec![self.restart_debounce()],
                changed: false,
            },
        }
    }

    pub(crate) fn on_option_pressed(&mut self, form: &mut FormFields, index: usize) -> Outcome {
        self.commit(form, index)
    }

    /// Leaving the widget while it is open discards both the typed text
    /// and any earlier selection.
    pub(crate) fn on_blur(&mut self, form: &mut FormFields, onto_option: bool) -> Outcome {
        if onto_option || self.dropdown == DropdownState::Closed {
            return Outcome::ignored();
        }
        self.close();
        form.set_programmatic(fields::LOCATION, "");
        form.set_programmatic(fields::SELECTED_LOCATION, "");
        Outcome::changed()
    }

    pub(crate) fn on_debounce_elapsed(
        &mut self,
        form: &FormFields,
        ids: &mut RequestIds,
        token: u64,
        captcha_response: &str,
    ) -> Outcome {
        if token != self.debounce_token {
            formfill_trace!("stale search debounce token={} current={}", token, self.debounce_token);
            return Outcome::ignored();
        }
        // Only typing opens the dropdown; a keystroke after it closed must
        // not bring it back.
        if self.dropdown == DropdownState::Closed {
            formfill_trace!("debounce elapsed with dropdown closed; no search");
            return Outcome::ignored();
        }
        self.results.clear();
        self.active = None;
        self.in_flight = None;

        let text = form.value(fields::LOCATION).unwrap_or_default().to_string();
        if !is_valid_search_query(&text) {
            self.dropdown = DropdownState::NoResults;
            return Outcome::changed();
        }

        let request_id = ids.next_id();
        self.in_flight = Some(request_id);
        self.dropdown = DropdownState::Loading;
        formfill_debug!("location search request_id={} text_len={}", request_id, text.len());
        Outcome::changed().with_effect(Effect::SearchLocations {
            request_id,
            text,
            captcha_response: captcha_response.to_string(),
        })
    }

    pub(crate) fn on_search_completed(
        &mut self,
        request_id: RequestId,
        outcome: SearchOutcome,
    ) -> Outcome {
        if self.in_flight != Some(request_id) {
            formfill_debug!("dropping stale location search result request_id={}", request_id);
            return Outcome::ignored();
        }
        self.in_flight = None;
        self.active = None;
        match outcome {
            SearchOutcome::Records(records) if !records.is_empty() => {
                self.results = records;
                self.dropdown = DropdownState::ShowingResults;
            }
            _ => {
                self.results.clear();
                self.dropdown = DropdownState::NoResults;
            }
        }
        Outcome::changed()
    }

    fn move_active(&mut self, next: impl Fn(Option<usize>, usize) -> usize) -> Outcome {
        let count = self.results.len();
        if count == 0 {
            return Outcome::ignored();
        }
        self.active = Some(next(self.active, count));
        Outcome::changed()
    }

    fn commit(&mut self, form: &mut FormFields, index: usize) -> Outcome {
        let Some(record) = self.results.get(index) else {
            return Outcome::ignored();
        };
        form.set_programmatic(fields::LOCATION, record.label());
        form.set_programmatic(fields::SELECTED_LOCATION, record.to_json());
        self.close();
        Outcome::changed()
    }

    /// Closes the dropdown and drops interest in pending timers and
    /// requests.
    fn close(&mut self) {
        self.dropdown = DropdownState::Closed;
        self.results.clear();
        self.active = None;
        self.in_flight = None;
        self.debounce_token += 1;
    }

    fn restart_debounce(&mut self) -> Effect {
        self.debounce_token += 1;
        Effect::ScheduleTimer {
            timer: TimerKey::LocationSearch {
                token: self.debounce_token,
            },
            delay: SEARCH_DELAY,
        }
    }
}
