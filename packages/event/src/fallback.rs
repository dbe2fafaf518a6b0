//! Bundled event dataset used when the live feed is unavailable.

use roadwatch_event_models::Event;

use crate::normalize;

const FALLBACK_EVENTS_JSON: &str = include_str!("../data/fallback_events.json");

/// Returns the bundled fallback events.
///
/// # Panics
///
/// Panics if the embedded dataset is not a JSON array.
#[must_use]
pub fn fallback_events() -> Vec<Event> {
    normalize::parse_events_str(FALLBACK_EVENTS_JSON)
        .unwrap_or_else(|e| panic!("Failed to parse bundled fallback events: {e}"))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use roadwatch_event_models::EventKind;

    use super::*;

    #[test]
    fn loads_every_bundled_event() {
        let events = fallback_events();
        assert_eq!(events.len(), 12);
        assert!(events.iter().all(Event::is_locatable));
    }

    #[test]
    fn event_ids_are_unique() {
        let mut seen = BTreeSet::new();
        for event in fallback_events() {
            assert!(seen.insert(event.id.clone()), "Duplicate event ID: {}", event.id);
        }
    }

    #[test]
    fn covers_every_alert_kind() {
        let kinds: BTreeSet<EventKind> = fallback_events().iter().map(|e| e.kind).collect();
        for kind in EventKind::alert_kinds() {
            assert!(kinds.contains(kind), "no fallback event of kind {kind}");
        }
    }
}
