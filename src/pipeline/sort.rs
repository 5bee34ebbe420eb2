//! Display ordering for the final catalog.

use crate::models::Event;

/// Plays with at least one showtime first, then alphabetically by lowercased
/// title. Stable, so equal keys keep their input order.
pub fn sort(mut events: Vec<Event>) -> Vec<Event> {
    events.sort_by_cached_key(|event| {
        (
            !event.has_showtimes(),
            event.title.as_deref().unwrap_or_default().to_lowercase(),
        )
    });
    events
}
