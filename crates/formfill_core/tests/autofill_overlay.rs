use std::sync::Once;

use formfill_core::{
    fields, update, AppState, ButtonState, Effect, MessagePayload, Msg, TimerKey,
    MESSAGE_ORIGIN, OVERLAY_COMPLETION_DELAY,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(formfill_logging::initialize_for_tests);
}

fn message(origin: &str, body: &str) -> Msg {
    Msg::AutofillMessage {
        origin: origin.to_string(),
        payload: MessagePayload::Text(body.to_string()),
    }
}

fn profile() -> serde_json::Value {
    json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "emailAddress": "ADA@Example.COM",
        "phoneNumber": " +44 20 7946 0000 ",
        "publicProfileUrl": "https://www.linkedin.com/in/ada",
        "location": {"country": "gb"},
        "positions": [{"isCurrent": true, "companyName": "Analytical Engines"}]
    })
}

fn click_and_settle(state: AppState) -> AppState {
    let (state, effects) = update(state, Msg::OverlayClicked);
    let timer = match effects.as_slice() {
        [Effect::ScheduleTimer { timer, delay }] => {
            assert_eq!(*delay, OVERLAY_COMPLETION_DELAY);
            *timer
        }
        other => panic!("unexpected effects {other:?}"),
    };
    assert_eq!(state.overlay().button(), ButtonState::Loading);
    let (state, _) = update(state, Msg::TimerFired(timer));
    state
}

fn value(state: &AppState, name: &str) -> String {
    state.form().value(name).unwrap_or_default().to_string()
}

#[test]
fn data_then_click_fills_form() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::PrefillDataReceived(Some(profile())));
    assert_eq!(state.overlay().button(), ButtonState::Ready);
    assert_eq!(value(&state, fields::NAME), "");

    let state = click_and_settle(state);
    assert_eq!(state.overlay().button(), ButtonState::Completed);
    assert_eq!(value(&state, fields::NAME), "Ada Lovelace");
    assert_eq!(value(&state, fields::EMAIL), "ada@example.com");
    assert_eq!(value(&state, fields::PHONE), "+44 20 7946 0000");
    assert_eq!(value(&state, fields::URL_LINKEDIN), "https://www.linkedin.com/in/ada");
    assert_eq!(value(&state, fields::ORG), "Analytical Engines");
    assert_eq!(value(&state, fields::LOCATION), "United Kingdom");
    assert_eq!(
        value(&state, fields::SELECTED_LOCATION),
        r#"{"name":"United Kingdom","address":{"country":{"code":"GB"}}}"#
    );
    let stored: serde_json::Value =
        serde_json::from_str(&value(&state, fields::LINKEDIN_DATA)).unwrap();
    assert_eq!(stored["_v"], json!(3));
    assert_eq!(stored["textKernelLocation"]["name"], json!("United Kingdom"));
    assert_eq!(stored["location"]["locationName"], json!("United Kingdom"));
}

#[test]
fn click_without_data_completes_and_fills_on_arrival() {
    init_logging();
    let state = click_and_settle(AppState::new());
    assert_eq!(state.overlay().button(), ButtonState::Completed);
    assert_eq!(value(&state, fields::NAME), "");

    let (state, _) = update(state, Msg::PrefillDataReceived(Some(profile())));
    assert_eq!(state.overlay().button(), ButtonState::Completed);
    assert_eq!(value(&state, fields::NAME), "Ada Lovelace");
}

#[test]
fn completed_button_ignores_further_clicks() {
    init_logging();
    let state = click_and_settle(AppState::new());
    let (state, effects) = update(state, Msg::OverlayClicked);
    assert!(effects.is_empty());
    assert_eq!(state.overlay().button(), ButtonState::Completed);
}

#[test]
fn each_click_gets_its_own_timer() {
    init_logging();
    let (state, first) = update(AppState::new(), Msg::OverlayClicked);
    let (_, second) = update(state, Msg::OverlayClicked);
    assert!(matches!(
        first[0],
        Effect::ScheduleTimer { timer: TimerKey::OverlayCompletion { click: 1 }, .. }
    ));
    assert!(matches!(
        second[0],
        Effect::ScheduleTimer { timer: TimerKey::OverlayCompletion { click: 2 }, .. }
    ));
}

#[test]
fn prefill_never_overwrites_existing_values() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::FieldChanged {
            name: fields::EMAIL.into(),
            value: "me@home.org".into(),
        },
    );
    let (state, _) = update(
        state,
        Msg::FieldChanged {
            name: fields::NAME.into(),
            value: String::new(),
        },
    );
    let (state, _) = update(state, Msg::PrefillDataReceived(Some(profile())));
    let state = click_and_settle(state);

    assert_eq!(value(&state, fields::EMAIL), "me@home.org");
    assert_eq!(value(&state, fields::NAME), "");
    assert_eq!(value(&state, fields::PHONE), "+44 20 7946 0000");
}

#[test]
fn oauth_message_opts_in_and_ready_masks() {
    init_logging();
    let (state, _) = update(AppState::new(), message(MESSAGE_ORIGIN, r#"{"method":"ready"}"#));
    assert_eq!(state.overlay().button(), ButtonState::Ready);
    assert!(state.overlay().masked());

    let (state, _) = update(state, message(MESSAGE_ORIGIN, r#"{"method":"awliOAuth"}"#));
    assert!(state.overlay().opted_in());

    let (state, _) = update(state, Msg::PrefillDataReceived(Some(profile())));
    assert!(!state.overlay().masked());
    assert_eq!(state.overlay().button(), ButtonState::Completed);
    assert_eq!(value(&state, fields::NAME), "Ada Lovelace");
}

#[test]
fn untrusted_or_malformed_messages_are_ignored() {
    init_logging();
    let before = AppState::new();
    let (state, _) = update(
        before.clone(),
        message("https://evil.example", r#"{"method":"awliOAuth"}"#),
    );
    assert_eq!(state, before);

    let (state, _) = update(state, message(MESSAGE_ORIGIN, "{not json"));
    assert_eq!(state, before);

    let (state, _) = update(
        state,
        Msg::AutofillMessage {
            origin: MESSAGE_ORIGIN.into(),
            payload: MessagePayload::Structured(json!({"method": "resize"})),
        },
    );
    assert_eq!(state, before);
}

#[test]
fn only_first_delivery_is_kept() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::PrefillDataReceived(None));
    assert!(!state.overlay().has_data());

    let (state, _) = update(state, Msg::PrefillDataReceived(Some(profile())));
    let (state, _) = update(
        state,
        Msg::PrefillDataReceived(Some(json!({"firstName": "Grace"}))),
    );
    let state = click_and_settle(state);
    assert_eq!(value(&state, fields::NAME), "Ada Lovelace");
}

#[test]
fn ready_message_does_not_revert_completed_button() {
    init_logging();
    let state = click_and_settle(AppState::new());
    let (state, _) = update(state, message(MESSAGE_ORIGIN, r#"{"method":"ready"}"#));
    assert_eq!(state.overlay().button(), ButtonState::Completed);
    assert!(state.overlay().masked());
}

#[test]
fn oauth_after_data_waits_for_click() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::PrefillDataReceived(Some(profile())));
    let (state, effects) = update(state, message(MESSAGE_ORIGIN, r#"{"method":"awliOAuth"}"#));
    assert!(effects.is_empty());
    assert!(state.overlay().opted_in());
    assert_eq!(state.overlay().button(), ButtonState::Ready);
    assert_eq!(value(&state, fields::NAME), "");

    let state = click_and_settle(state);
    assert_eq!(state.overlay().button(), ButtonState::Completed);
    assert_eq!(value(&state, fields::NAME), "Ada Lovelace");
}
