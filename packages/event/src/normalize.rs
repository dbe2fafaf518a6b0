//! Record-by-record decoding of event feed payloads.
//!
//! A feed is expected to be a JSON array. Each element is decoded on its
//! own so that one broken record is logged and skipped instead of
//! discarding the whole batch.

use roadwatch_event_models::Event;

use crate::EventError;

/// Decodes a feed payload into events, skipping malformed records.
///
/// # Errors
///
/// Returns [`EventError::InvalidPayload`] if `payload` is not an array.
pub fn parse_events(payload: serde_json::Value) -> Result<Vec<Event>, EventError> {
    let records = match payload {
        serde_json::Value::Array(records) => records,
        other => {
            return Err(EventError::InvalidPayload {
                message: format!("expected an array of events, got {}", value_kind(&other)),
            });
        }
    };

    let total = records.len();
    let mut events = Vec::with_capacity(total);

    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<Event>(record) {
            Ok(event) => {
                if !event.is_locatable() {
                    log::warn!("Event {} has no usable coordinates", event.id);
                }
                events.push(event);
            }
            Err(e) => log::warn!("Skipping malformed event record #{index}: {e}"),
        }
    }

    if events.len() < total {
        log::warn!("Decoded {} of {total} event records", events.len());
    }

    Ok(events)
}

/// Parses `text` as JSON and decodes it with [`parse_events`].
///
/// # Errors
///
/// Returns [`EventError::Json`] if `text` is not JSON, or
/// [`EventError::InvalidPayload`] if it is not an array.
pub fn parse_events_str(text: &str) -> Result<Vec<Event>, EventError> {
    parse_events(serde_json::from_str(text)?)
}

const fn value_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
