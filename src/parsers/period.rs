//! Schedule period requested by the user.

use std::{fmt, sync::LazyLock};

use chrono::NaiveDate;
use concierge_mcp::ToolArgs;
use regex::Regex;
use serde::{Deserialize, Serialize};

static DATE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").ok());

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    Today,
    Tomorrow,
    Week,
    NextWeek,
    LastWeek,
    Range { start: NaiveDate, end: NaiveDate },
}

impl Period {
    /// Events tool arguments for this period.
    pub fn to_args(&self) -> ToolArgs {
        match self {
            Period::Range { start, end } => ToolArgs::new()
                .with("start_date", start.format("%Y-%m-%d").to_string())
                .with("end_date", end.format("%Y-%m-%d").to_string()),
            shortcut => ToolArgs::new().with("period", shortcut.to_string()),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Today => f.write_str("today"),
            Period::Tomorrow => f.write_str("tomorrow"),
            Period::Week => f.write_str("week"),
            Period::NextWeek => f.write_str("next_week"),
            Period::LastWeek => f.write_str("last_week"),
            Period::Range { start, end } => write!(f, "{start} to {end}"),
        }
    }
}

/// Read a period from free model output.
///
/// Explicit `YYYY-MM-DD` dates win (one date is a one-day range), then the
/// shortcut keywords. Anything else is `today`.
pub fn parse_period(text: &str) -> Period {
    let dates: Vec<NaiveDate> = DATE
        .as_ref()
        .map(|re| {
            re.find_iter(text)
                .filter_map(|m| NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d").ok())
                .collect()
        })
        .unwrap_or_default();

    match dates.as_slice() {
        [single] => {
            return Period::Range {
                start: *single,
                end: *single,
            }
        }
        [a, b, ..] => {
            return Period::Range {
                start: *a.min(b),
                end: *a.max(b),
            }
        }
        [] => {}
    }

    let lowered = text.to_lowercase().replace(' ', "_");
    if lowered.contains("next_week") {
        Period::NextWeek
    } else if lowered.contains("last_week") {
        Period::LastWeek
    } else if lowered.contains("tomorrow") {
        Period::Tomorrow
    } else if lowered.contains("today") {
        Period::Today
    } else if lowered.contains("week") {
        Period::Week
    } else {
        Period::Today
    }
}
