use serde_json::Value;

use formfill_logging::formfill_debug;

/// Longest query, in characters, sent to the search endpoint.
pub const LOCATION_MAX_SEARCH_LENGTH: usize = 100;

/// One entry of a location search response, kept verbatim so the
/// selection can be stored exactly as received.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRecord(Value);

impl LocationRecord {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Display name of the record, empty if the record has none.
    pub fn label(&self) -> String {
        match self.0.get("name") {
            Some(Value::String(name)) => name.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    /// Compact JSON serialization with the original key order.
    pub fn to_json(&self) -> String {
        self.0.to_string()
    }

    pub fn value(&self) -> &Value {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Records(Vec<LocationRecord>),
    NoData,
}

/// Length is measured in UTF-16 code units, as the browser input reports it.
pub fn is_valid_search_query(text: &str) -> bool {
    !text.is_empty() && text.encode_utf16().count() <= LOCATION_MAX_SEARCH_LENGTH
}

/// Interprets a search endpoint reply. Anything but a 200 carrying a JSON
/// array is "no data".
pub fn decode_search_reply(status: u16, body: &str) -> SearchOutcome {
    if status != 200 {
        formfill_debug!("location search returned status {}", status);
        return SearchOutcome::NoData;
    }
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(items)) => {
            SearchOutcome::Records(items.into_iter().map(LocationRecord::new).collect())
        }
        Ok(_) => SearchOutcome::NoData,
        Err(err) => {
            formfill_debug!("location search body is not JSON: {}", err);
            SearchOutcome::NoData
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_bounds_are_inclusive_at_limit() {
        assert!(!is_valid_search_query(""));
        assert!(is_valid_search_query("a"));
        assert!(is_valid_search_query(&"x".repeat(100)));
        assert!(!is_valid_search_query(&"x".repeat(101)));
        assert!(is_valid_search_query(&"é".repeat(100)));
    }

    #[test]
    fn astral_characters_count_as_two_units() {
        assert!(is_valid_search_query(&"🌍".repeat(50)));
        assert!(!is_valid_search_query(&"🌍".repeat(51)));
    }

    #[test]
    fn array_body_becomes_records() {
        let outcome = decode_search_reply(200, r#"[{"name":"San Francisco, CA","id":7}]"#);
        let SearchOutcome::Records(records) = outcome else {
            panic!("expected records");
        };
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].label(), "San Francisco, CA");
        assert_eq!(records[0].to_json(), r#"{"name":"San Francisco, CA","id":7}"#);
    }

    #[test]
    fn key_order_is_preserved_in_serialization() {
        let body = r#"[{"zeta":1,"name":"Oslo","alpha":{"b":2,"a":1}}]"#;
        let SearchOutcome::Records(records) = decode_search_reply(200, body) else {
            panic!("expected records");
        };
        assert_eq!(records[0].to_json(), r#"{"zeta":1,"name":"Oslo","alpha":{"b":2,"a":1}}"#);
    }

    #[test]
    fn malformed_or_failed_replies_are_no_data() {
        assert_eq!(decode_search_reply(200, "not json"), SearchOutcome::NoData);
        assert_eq!(decode_search_reply(200, "null"), SearchOutcome::NoData);
        assert_eq!(decode_search_reply(200, r#"{"name":"x"}"#), SearchOutcome::NoData);
        assert_eq!(decode_search_reply(500, "[]"), SearchOutcome::NoData);
        assert_eq!(decode_search_reply(403, r#"[{"name":"x"}]"#), SearchOutcome::NoData);
    }

    #[test]
    fn missing_name_renders_empty_label() {
        let record = LocationRecord::new(serde_json::json!({"id": 3}));
        assert_eq!(record.label(), "");
    }
}
