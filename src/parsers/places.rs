//! Place hits from the search tool output.
//!
//! ```text
//! Search results for 'cafe':
//! 1. Blue Bottle
//!    123 Main St
//!    Rating: 4.5
//! ```

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static NUMBERED: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\.\s+(.+?)\s*$").ok());

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceHit {
    pub name: String,
    pub address: Option<String>,
    pub rating: Option<String>,
}

pub fn parse_places(text: &str) -> Vec<PlaceHit> {
    let Some(numbered) = NUMBERED.as_ref() else {
        return Vec::new();
    };

    let mut hits: Vec<PlaceHit> = Vec::new();
    for line in text.lines() {
        if let Some(caps) = numbered.captures(line) {
            hits.push(PlaceHit {
                name: caps[1].to_string(),
                address: None,
                rating: None,
            });
            continue;
        }

        let Some(current) = hits.last_mut() else {
            continue;
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rating) = trimmed.strip_prefix("Rating:") {
            let rating = rating.trim();
            if !rating.is_empty() && rating != "N/A" {
                current.rating = Some(rating.to_string());
            }
        } else if current.address.is_none() && trimmed != "No address" {
            current.address = Some(trimmed.to_string());
        }
    }
    hits
}
