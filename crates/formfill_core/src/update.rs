use formfill_logging::formfill_warn;

use crate::effect::Outcome;
use crate::fields::FieldEvent;
use crate::message::{decode_message, MessageError};
use crate::{AppState, Effect, Msg, TimerKey};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let outcome = {
        let AppState {
            form,
            location,
            resume,
            overlay,
            captcha_response,
            ids,
            ..
        } = &mut state;

        match msg {
            Msg::LocationInput(text) => location.on_input(form, text),
            Msg::LocationKeyDown(key) => location.on_key(form, key),
            Msg::LocationOptionPressed(index) => location.on_option_pressed(form, index),
            Msg::LocationBlur { onto_option } => location.on_blur(form, onto_option),
            Msg::CaptchaSolved(token) => {
                *captcha_response = token;
                Outcome::ignored()
            }
            Msg::FieldChanged { name, value } => {
                user_edit(form.apply_user_event(&name, value, FieldEvent::Change))
            }
            Msg::FieldPasted { name, value } => {
                user_edit(form.apply_user_event(&name, value, FieldEvent::Paste))
            }
            Msg::ResumeSelected(file) => resume.on_selected(form, ids, file),
            Msg::TimerFired(TimerKey::LocationSearch { token }) => {
                location.on_debounce_elapsed(form, ids, token, captcha_response)
            }
            Msg::TimerFired(TimerKey::OverlayCompletion { click }) => {
                overlay.on_click_settled(form, click)
            }
            Msg::SearchCompleted {
                request_id,
                outcome,
            } => location.on_search_completed(request_id, outcome),
            Msg::ResumeUploadCompleted {
                request_id,
                outcome,
            } => resume.on_completed(form, request_id, outcome),
            Msg::OverlayClicked => overlay.on_click(),
            Msg::AutofillMessage { origin, payload } => match decode_message(&origin, &payload) {
                Ok(method) => overlay.on_message(method),
                Err(err @ MessageError::UntrustedOrigin(_)) => {
                    formfill_warn!("{}", err);
                    Outcome::ignored()
                }
                Err(err) => {
                    formfill_warn!("dropping autofill message: {}", err);
                    Outcome::ignored()
                }
            },
            Msg::PrefillDataReceived(data) => overlay.on_data(form, data),
            Msg::Tick | Msg::NoOp => Outcome::ignored(),
        }
    };

    let effects = state.absorb(outcome);
    (state, effects)
}

fn user_edit(applied: bool) -> Outcome {
    if applied {
        Outcome::changed()
    } else {
        Outcome::ignored()
    }
}
