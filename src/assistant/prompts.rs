//! Prompt text for the extraction and synthesis calls.

use chrono::{DateTime, Local};

pub(crate) const CLASSIFY_INTENT: &str = "\
Classify the user's latest message into exactly one intent:
- check_schedule: asking about calendar events or the schedule
- create_event: asking to add or book a calendar event
- search_place: looking for a place, restaurant or business
- get_directions: asking how to get somewhere or how long it takes
- general: anything else

Answer with the intent label only.";

pub(crate) fn extract_period(now: DateTime<Local>) -> String {
    format!(
        "Today is {today}. Which period is the user asking about?\n\
         Answer with one of: today, tomorrow, week, next_week, last_week.\n\
         For a specific date or range answer with dates as YYYY-MM-DD \
         (one date, or start and end separated by a space).\n\
         Answer with the period only.",
        today = now.format("%Y-%m-%d (%A)")
    )
}

pub(crate) fn extract_event(now: DateTime<Local>) -> String {
    format!(
        "Today is {today}. Extract the event the user wants to create.\n\
         Respond with a JSON object only:\n\
         {{\"title\": string, \"date\": \"YYYY-MM-DD\", \"start_time\": \"HH:MM\", \
         \"end_time\": \"HH:MM\" or null, \"location\": string or null}}\n\
         Resolve relative dates like \"tomorrow\" against today. \
         Use null for anything the user did not say.",
        today = now.format("%Y-%m-%d (%A)")
    )
}

pub(crate) const EXTRACT_SEARCH_QUERY: &str = "\
Extract the place search query from the user's message (for example \
\"cafe near Gangnam Station\"). Answer with the query only.";

pub(crate) const EXTRACT_ROUTE: &str = "\
Extract the route the user is asking about.
Respond with a JSON object only:
{\"origin\": string or null, \"destination\": string or null, \"mode\": \"driving\" | \"walking\" | \"bicycling\" | \"transit\" or null}
Use null for anything the user did not say.";

pub(crate) fn system(now: DateTime<Local>) -> String {
    format!(
        "You are a personal concierge assistant that manages the user's calendar, \
         finds places and plans routes.\n\
         Current date and time: {now}.\n\n\
         Rules:\n\
         - Do not use markdown. No asterisks, pound signs or backticks.\n\
         - Write plain text; emojis are welcome for structure.\n\
         - Reply in the same language the user writes in.\n\
         - Only state facts found in the context below. If something failed, say so plainly.",
        now = now.format("%Y-%m-%d %H:%M (%A)")
    )
}
