//! Travel duration extraction from directions output.

use std::sync::LazyLock;

use regex::Regex;

struct DurationPattern {
    regex: Regex,
    kind: PatternKind,
}

#[derive(Clone, Copy)]
enum PatternKind {
    HoursAndMinutes,
    Hours,
    Minutes,
}

/// Ordered: compound forms before their single-unit prefixes.
static PATTERNS: LazyLock<Vec<DurationPattern>> = LazyLock::new(|| {
    [
        (r"(?i)(\d+)\s*hours?\s*(\d+)\s*min", PatternKind::HoursAndMinutes),
        (r"(\d+)\s*시간\s*(\d+)\s*분", PatternKind::HoursAndMinutes),
        (r"(?i)(\d+)\s*(?:hours?|hrs?)\b", PatternKind::Hours),
        (r"(\d+)\s*시간", PatternKind::Hours),
        (r"(?i)(\d+)\s*min", PatternKind::Minutes),
        (r"(\d+)\s*분", PatternKind::Minutes),
    ]
    .into_iter()
    .filter_map(|(pattern, kind)| {
        Regex::new(pattern)
            .ok()
            .map(|regex| DurationPattern { regex, kind })
    })
    .collect()
});

/// Parse a travel duration in minutes.
///
/// When the text carries a `Duration:` line only that line is scanned, since
/// directions output also lists per-step distances and times.
pub fn parse_duration_minutes(text: &str) -> Option<u32> {
    let scope = text
        .lines()
        .find(|line| line.trim_start().to_lowercase().starts_with("duration"))
        .unwrap_or(text);

    PATTERNS.iter().find_map(|p| {
        let caps = p.regex.captures(scope)?;
        let number = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
        match p.kind {
            PatternKind::HoursAndMinutes => number(1)?.checked_mul(60)?.checked_add(number(2)?),
            PatternKind::Hours => number(1)?.checked_mul(60),
            PatternKind::Minutes => number(1),
        }
    })
}
