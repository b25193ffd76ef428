use crate::{ButtonState, DropdownState, UploadStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub location: LocationView,
    pub resume: UploadStatus,
    pub overlay: OverlayView,
    pub fields: Vec<FieldView>,
    pub dirty: bool,
}

impl AppViewModel {
    pub fn field(&self, name: &str) -> Option<&FieldView> {
        self.fields.iter().find(|field| field.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationView {
    pub input: String,
    /// Serialized record stored in the hidden selection field.
    pub selected: String,
    pub dropdown: DropdownState,
    pub options: Vec<LocationOptionView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationOptionView {
    pub id: String,
    pub label: String,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayView {
    pub button: ButtonState,
    pub masked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    pub name: String,
    pub value: String,
    pub touched: bool,
}
