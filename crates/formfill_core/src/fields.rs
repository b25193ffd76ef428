use std::collections::BTreeMap;

use formfill_logging::formfill_trace;

pub const ORG: &str = "org";
pub const PHONE: &str = "phone";
pub const NAME: &str = "name";
pub const EMAIL: &str = "email";
pub const LOCATION: &str = "location";
pub const SELECTED_LOCATION: &str = "selectedLocation";
pub const RESUME_STORAGE_ID: &str = "resumeStorageId";
pub const LINKEDIN_DATA: &str = "linkedInData";
pub const ACCOUNT_ID: &str = "accountId";
pub const URL_LINKEDIN: &str = "urls[LinkedIn]";
pub const URL_TWITTER: &str = "urls[Twitter]";
pub const URL_QUORA: &str = "urls[Quora]";
pub const URL_GITHUB: &str = "urls[GitHub]";
pub const URL_OTHER: &str = "urls[Other]";

/// Inputs whose user edits are recorded as "touched".
pub const TRACKED_FIELDS: [&str; 10] = [
    ORG,
    PHONE,
    NAME,
    EMAIL,
    LOCATION,
    URL_LINKEDIN,
    URL_TWITTER,
    URL_QUORA,
    URL_GITHUB,
    URL_OTHER,
];

/// Every input of the standard application form.
pub const STANDARD_FIELDS: [&str; 14] = [
    ORG,
    PHONE,
    NAME,
    EMAIL,
    LOCATION,
    SELECTED_LOCATION,
    RESUME_STORAGE_ID,
    LINKEDIN_DATA,
    ACCOUNT_ID,
    URL_LINKEDIN,
    URL_TWITTER,
    URL_QUORA,
    URL_GITHUB,
    URL_OTHER,
];

/// How the user modified a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEvent {
    Change,
    Paste,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormField {
    pub value: String,
    pub tracked: bool,
    pub touched: bool,
}

/// The named inputs present on the page.
///
/// Writes made through [`FormFields::set_programmatic`] or the fill helpers
/// never mark a field touched; only user events do, and only for tracked
/// fields. Once touched, a field stays touched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormFields {
    fields: BTreeMap<String, FormField>,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard application form with its tracked fields registered.
    pub fn standard() -> Self {
        let mut form = Self::new();
        for name in STANDARD_FIELDS {
            form.add_field(name);
        }
        for name in TRACKED_FIELDS {
            form.track(name);
        }
        form
    }

    /// Adds an empty field; existing fields are left as they are.
    pub fn add_field(&mut self, name: impl Into<String>) {
        self.fields.entry(name.into()).or_default();
    }

    /// Registers an existing field for touch tracking.
    pub fn track(&mut self, name: &str) -> bool {
        match self.fields.get_mut(name) {
            Some(field) => {
                field.tracked = true;
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|field| field.value.as_str())
    }

    pub fn is_touched(&self, name: &str) -> bool {
        self.fields.get(name).is_some_and(|field| field.touched)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormField)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    /// Applies a user edit. Returns `false` if the field does not exist.
    pub fn apply_user_event(&mut self, name: &str, value: String, event: FieldEvent) -> bool {
        match self.fields.get_mut(name) {
            Some(field) => {
                field.value = value;
                if field.tracked && !field.touched {
                    formfill_trace!("field {} touched by {:?}", name, event);
                    field.touched = true;
                }
                true
            }
            None => false,
        }
    }

    /// Writes a value without recording a touch.
    pub fn set_programmatic(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.fields.get_mut(name) {
            Some(field) => {
                field.value = value.into();
                true
            }
            None => false,
        }
    }

    /// Writes `suggestion` (trimmed, or empty when absent) unless the field
    /// is missing or touched. Returns whether a write happened.
    pub fn fill_untouched(&mut self, name: &str, suggestion: Option<&str>) -> bool {
        let Some(field) = self.fields.get_mut(name) else {
            return false;
        };
        if field.touched {
            return false;
        }
        field.value = suggestion.map(str::trim).unwrap_or_default().to_string();
        true
    }

    /// Writes a trimmed, non-blank `suggestion` into a field that exists,
    /// is untouched and currently empty. Returns whether a write happened.
    pub fn fill_if_blank(&mut self, name: &str, suggestion: Option<&str>) -> bool {
        let Some(value) = suggestion.map(str::trim).filter(|value| !value.is_empty()) else {
            return false;
        };
        let Some(field) = self.fields.get_mut(name) else {
            return false;
        };
        if field.touched || !field.value.is_empty() {
            return false;
        }
        field.value = value.to_string();
        true
    }
}
