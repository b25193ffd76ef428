use std::time::Duration;

use serde_json::{json, Map, Value};

use formfill_logging::{formfill_debug, formfill_info};

use crate::country::country_name;
use crate::effect::Outcome;
use crate::fields::{self, FormFields};
use crate::message::AutofillMethod;
use crate::{Effect, TimerKey};

/// Visual delay between a click and the button reporting completion.
pub const OVERLAY_COMPLETION_DELAY: Duration = Duration::from_millis(300);

/// Version marker stamped on normalized prefill data.
const PREFILL_VERSION: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    #[default]
    Loading,
    Ready,
    Completed,
}

/// Converts the provider's `{locationName, country}` into the location
/// record shape used by the form. Unknown country codes only lose the name.
pub fn text_kernel_location(location: Option<&Value>) -> Option<Value> {
    let location = location?;
    let non_empty = |key: &str| {
        location
            .get(key)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    };
    let location_name = non_empty("locationName");
    let country = non_empty("country").map(str::to_uppercase);
    if location_name.is_none() && country.is_none() {
        return None;
    }

    let name = location_name
        .map(str::to_string)
        .or_else(|| country.as_deref().and_then(country_name).map(str::to_string));

    let mut record = Map::new();
    if let Some(name) = name {
        record.insert("name".to_string(), Value::String(name));
    }
    if let Some(code) = country {
        record.insert(
            "address".to_string(),
            json!({ "country": { "code": code } }),
        );
    }
    Some(Value::Object(record))
}

/// Names a country-only location after its region, so the stored profile
/// carries the same name as the derived location.
fn fill_location_name(location: &mut Map<String, Value>) {
    let has_name = location
        .get("locationName")
        .and_then(Value::as_str)
        .is_some_and(|name| !name.is_empty());
    if has_name {
        return;
    }
    let name = location
        .get("country")
        .and_then(Value::as_str)
        .and_then(country_name);
    if let Some(name) = name {
        location.insert("locationName".to_string(), Value::String(name.to_string()));
    }
}

/// Prefill profile with the derived location attached.
#[derive(Debug, Clone, PartialEq)]
pub struct PrefillData {
    raw: Map<String, Value>,
}

impl PrefillData {
    /// Normalizes a delivered profile. Anything but a JSON object is
    /// rejected.
    pub fn normalize(data: Value) -> Option<Self> {
        let Value::Object(mut original) = data else {
            return None;
        };
        if let Some(Value::Object(location)) = original.get_mut("location") {
            fill_location_name(location);
        }
        let location = text_kernel_location(original.get("location"));

        let mut raw = Map::new();
        for (key, value) in original {
            if key != "textKernelLocation" {
                raw.insert(key, value);
            }
        }
        if let Some(location) = location {
            raw.insert("textKernelLocation".to_string(), location);
        }
        raw.insert("_v".to_string(), Value::from(PREFILL_VERSION));
        Some(Self { raw })
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.raw.get(key).and_then(Value::as_str)
    }

    pub fn full_name(&self) -> String {
        let first = self.str_field("firstName").unwrap_or_default();
        let last = self.str_field("lastName").unwrap_or_default();
        format!("{first} {last}").trim().to_string()
    }

    pub fn email(&self) -> Option<String> {
        self.str_field("emailAddress").map(str::to_lowercase)
    }

    pub fn text_kernel_location(&self) -> Option<&Value> {
        self.raw.get("textKernelLocation")
    }

    /// Company of the first position flagged as current.
    pub fn current_company(&self) -> Option<&str> {
        let positions = self.raw.get("positions")?.as_array()?;
        let current = positions
            .iter()
            .find(|position| position.get("isCurrent").and_then(Value::as_bool) == Some(true))?;
        current
            .get("companyName")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .or_else(|| {
                current
                    .get("company")
                    .and_then(|company| company.get("name"))
                    .and_then(Value::as_str)
            })
    }

    pub fn to_json(&self) -> String {
        Value::Object(self.raw.clone()).to_string()
    }
}

/// Writes prefill values into blank, untouched fields.
pub fn apply_prefill(form: &mut FormFields, data: &PrefillData) {
    let location = data.text_kernel_location();
    let suggestions: [(&str, Option<String>); 8] = [
        (fields::NAME, Some(data.full_name())),
        (fields::EMAIL, data.email()),
        (fields::PHONE, data.str_field("phoneNumber").map(str::to_string)),
        (
            fields::URL_LINKEDIN,
            data.str_field("publicProfileUrl").map(str::to_string),
        ),
        (fields::LINKEDIN_DATA, Some(data.to_json())),
        (
            fields::LOCATION,
            location
                .and_then(|location| location.get("name"))
                .and_then(Value::as_str)
                .map(str::to_string),
        ),
        (fields::SELECTED_LOCATION, location.map(Value::to_string)),
        (fields::ORG, data.current_company().map(str::to_string)),
    ];
    for (name, value) in suggestions {
        form.fill_if_blank(name, value.as_deref());
    }
}

/// Third-party autofill button.
///
/// Whether the user opted in and whether data has arrived are tracked
/// separately. The form is filled when a click settles with data held, or
/// when data arrives after the user opted in.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AutofillOverlay {
    button: ButtonState,
    masked: bool,
    opted_in: bool,
    data: Option<PrefillData>,
    clicks: u64,
}

impl AutofillOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn button(&self) -> ButtonState {
        self.button
    }

    pub fn masked(&self) -> bool {
        self.masked
    }

    pub fn opted_in(&self) -> bool {
        self.opted_in
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    pub(crate) fn on_click(&mut self) -> Outcome {
        if self.button == ButtonState::Completed {
            return Outcome::ignored();
        }
        self.clicks += 1;
        self.button = ButtonState::Loading;
        Outcome::changed().with_effect(Effect::ScheduleTimer {
            timer: TimerKey::OverlayCompletion { click: self.clicks },
            delay: OVERLAY_COMPLETION_DELAY,
        })
    }

    pub(crate) fn on_click_settled(&mut self, form: &mut FormFields, click: u64) -> Outcome {
        formfill_debug!("overlay click {} settled, data held: {}", click, self.has_data());
        self.opted_in = true;
        self.button = ButtonState::Completed;
        if let Some(data) = &self.data {
            apply_prefill(form, data);
        }
        Outcome::changed()
    }

    pub(crate) fn on_message(&mut self, method: AutofillMethod) -> Outcome {
        match method {
            // Consent only; filling waits for a click or for data to arrive.
            AutofillMethod::OAuth => {
                self.opted_in = true;
                Outcome::ignored()
            }
            AutofillMethod::Ready => {
                if self.button != ButtonState::Completed {
                    self.button = ButtonState::Ready;
                }
                self.masked = true;
                Outcome::changed()
            }
            AutofillMethod::Unknown(method) => {
                formfill_debug!("ignoring autofill message method {}", method);
                Outcome::ignored()
            }
        }
    }

    pub(crate) fn on_data(&mut self, form: &mut FormFields, data: Option<Value>) -> Outcome {
        if self.data.is_some() {
            formfill_debug!("prefill data already held; ignoring redelivery");
            return Outcome::ignored();
        }
        let Some(data) = data.and_then(PrefillData::normalize) else {
            return Outcome::ignored();
        };
        formfill_info!("prefill data received, opted in: {}", self.opted_in);
        self.masked = false;
        if self.opted_in {
            apply_prefill(form, &data);
            self.button = ButtonState::Completed;
        } else {
            self.button = ButtonState::Ready;
        }
        self.data = Some(data);
        Outcome::changed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_name_is_preferred_over_country() {
        let location = json!({"locationName": "Greater Boston", "country": "us"});
        assert_eq!(
            text_kernel_location(Some(&location)),
            Some(json!({"name": "Greater Boston", "address": {"country": {"code": "US"}}}))
        );
    }

    #[test]
    fn country_only_resolves_region_name() {
        let location = json!({"country": "de"});
        assert_eq!(
            text_kernel_location(Some(&location)),
            Some(json!({"name": "Germany", "address": {"country": {"code": "DE"}}}))
        );
    }

    #[test]
    fn unknown_country_keeps_code_without_name() {
        let location = json!({"country": "zz"});
        let record = text_kernel_location(Some(&location)).unwrap();
        assert_eq!(record.to_string(), r#"{"address":{"country":{"code":"ZZ"}}}"#);
    }

    #[test]
    fn empty_location_is_absent() {
        assert_eq!(text_kernel_location(Some(&json!({}))), None);
        assert_eq!(text_kernel_location(None), None);
    }

    #[test]
    fn normalize_appends_location_and_version() {
        let data = PrefillData::normalize(json!({
            "firstName": "Ada",
            "location": {"locationName": "London"}
        }))
        .unwrap();
        assert_eq!(
            data.to_json(),
            r#"{"firstName":"Ada","location":{"locationName":"London"},"textKernelLocation":{"name":"London"},"_v":3}"#
        );
        assert!(PrefillData::normalize(json!("profile")).is_none());
    }

    #[test]
    fn country_only_location_is_named_in_stored_profile() {
        let data = PrefillData::normalize(json!({"location": {"country": "fr"}})).unwrap();
        assert_eq!(
            data.to_json(),
            r#"{"location":{"country":"fr","locationName":"France"},"textKernelLocation":{"name":"France","address":{"country":{"code":"FR"}}},"_v":3}"#
        );

        let unknown = PrefillData::normalize(json!({"location": {"country": "zz"}})).unwrap();
        assert!(!unknown.to_json().contains("locationName"));
    }

    #[test]
    fn current_company_falls_back_to_nested_name() {
        let data = PrefillData::normalize(json!({
            "positions": [
                {"isCurrent": false, "companyName": "Old Co"},
                {"isCurrent": true, "company": {"name": "New Co"}}
            ]
        }))
        .unwrap();
        assert_eq!(data.current_company(), Some("New Co"));
    }

    #[test]
    fn full_name_omits_missing_parts() {
        let data = PrefillData::normalize(json!({"lastName": "Lovelace"})).unwrap();
        assert_eq!(data.full_name(), "Lovelace");
    }
}
