//! Suggested departure time for an event.

use chrono::{Duration, NaiveTime};

/// `event_time - (travel + buffer)` as `HH:MM`.
///
/// Returns `None` when the event has no clock time (all-day events) or the
/// travel duration is unknown. The subtraction wraps around midnight, so an
/// early event can yield a time on the previous day with no marker; overnight
/// trips are reported as if they left the same day.
pub fn departure_time(
    event_time: Option<&str>,
    travel_minutes: Option<u32>,
    buffer_minutes: u32,
) -> Option<String> {
    let event = NaiveTime::parse_from_str(event_time?.trim(), "%H:%M").ok()?;
    let lead = Duration::minutes(i64::from(travel_minutes?) + i64::from(buffer_minutes));
    let (departure, _) = event.overflowing_sub_signed(lead);
    Some(departure.format("%H:%M").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_day() {
        assert_eq!(departure_time(Some("09:00"), Some(50), 10).as_deref(), Some("08:00"));
        assert_eq!(departure_time(Some("14:30"), Some(25), 5).as_deref(), Some("14:00"));
    }

    #[test]
    fn test_wraps_to_previous_day() {
        assert_eq!(departure_time(Some("00:10"), Some(30), 10).as_deref(), Some("23:30"));
    }

    #[test]
    fn test_missing_inputs() {
        assert_eq!(departure_time(None, Some(30), 10), None);
        assert_eq!(departure_time(Some("09:00"), None, 10), None);
        assert_eq!(departure_time(Some("all-day"), Some(30), 10), None);
        assert_eq!(departure_time(Some("2025-12-15"), Some(30), 10), None);
    }

    #[test]
    fn test_zero_buffer() {
        assert_eq!(departure_time(Some("10:00"), Some(60), 0).as_deref(), Some("09:00"));
    }
}
