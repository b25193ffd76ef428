use std::fmt::Write;

use formfill_core::{AppViewModel, ButtonState, DropdownState, UploadStatus};

/// Plain-text rendering of the page, one widget per block.
pub fn render(view: &AppViewModel) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "location: {:?} [{}]",
        view.location.input,
        dropdown_label(view.location.dropdown)
    );
    for option in &view.location.options {
        let marker = if option.active { '>' } else { ' ' };
        let _ = writeln!(out, "  {marker} {} ({})", option.label, option.id);
    }
    if !view.location.selected.is_empty() {
        let _ = writeln!(out, "selected: {}", view.location.selected);
    }

    let _ = writeln!(out, "resume: {}", upload_label(view.resume));

    let masked = if view.overlay.masked { " (masked)" } else { "" };
    let _ = writeln!(out, "autofill: {}{masked}", button_label(view.overlay.button));

    out.push_str("fields:\n");
    for field in &view.fields {
        let touched = if field.touched { " *" } else { "" };
        let _ = writeln!(out, "  {} = {:?}{touched}", field.name, field.value);
    }
    out
}

fn dropdown_label(state: DropdownState) -> &'static str {
    match state {
        DropdownState::Closed => "closed",
        DropdownState::Loading => "loading",
        DropdownState::ShowingResults => "results",
        DropdownState::NoResults => "no results",
    }
}

fn upload_label(status: UploadStatus) -> &'static str {
    match status {
        UploadStatus::Idle => "idle",
        UploadStatus::Working => "uploading",
        UploadStatus::Succeeded => "parsed",
        UploadStatus::Failed => "could not be parsed",
        UploadStatus::Oversize => "file too large",
    }
}

fn button_label(state: ButtonState) -> &'static str {
    match state {
        ButtonState::Loading => "loading",
        ButtonState::Ready => "ready",
        ButtonState::Completed => "completed",
    }
}
