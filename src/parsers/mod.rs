//! Pure parsers over tool and model text.

pub mod departure;
pub mod duration;
pub mod events;
pub mod period;
pub mod places;

pub use departure::departure_time;
pub use duration::parse_duration_minutes;
pub use events::{parse_events, CalendarEvent};
pub use period::{parse_period, Period};
pub use places::{parse_places, PlaceHit};
