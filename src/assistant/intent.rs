//! Intent labels and classifier output mapping.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    CheckSchedule,
    CreateEvent,
    SearchPlace,
    GetDirections,
    #[default]
    General,
}

impl Intent {
    /// Matching order when several labels appear in one answer.
    const PRIORITY: [Intent; 4] = [
        Intent::CreateEvent,
        Intent::CheckSchedule,
        Intent::SearchPlace,
        Intent::GetDirections,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::CheckSchedule => "check_schedule",
            Intent::CreateEvent => "create_event",
            Intent::SearchPlace => "search_place",
            Intent::GetDirections => "get_directions",
            Intent::General => "general",
        }
    }

    /// Map free classifier output to an intent.
    ///
    /// Case-insensitive substring match, first label in priority order wins.
    pub fn from_classifier_output(text: &str) -> Self {
        let lowered = text.to_lowercase();
        Self::PRIORITY
            .into_iter()
            .find(|intent| lowered.contains(intent.as_str()))
            .unwrap_or(Intent::General)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_labels() {
        assert_eq!(Intent::from_classifier_output("check_schedule"), Intent::CheckSchedule);
        assert_eq!(Intent::from_classifier_output("search_place"), Intent::SearchPlace);
        assert_eq!(Intent::from_classifier_output("get_directions"), Intent::GetDirections);
        assert_eq!(Intent::from_classifier_output("general"), Intent::General);
    }

    #[test]
    fn test_create_event_beats_other_labels() {
        assert_eq!(
            Intent::from_classifier_output("check_schedule or maybe create_event"),
            Intent::CreateEvent
        );
        assert_eq!(
            Intent::from_classifier_output("get_directions, search_place"),
            Intent::SearchPlace
        );
    }

    #[test]
    fn test_case_and_noise() {
        assert_eq!(
            Intent::from_classifier_output("Intent: CHECK_SCHEDULE."),
            Intent::CheckSchedule
        );
        assert_eq!(Intent::from_classifier_output("I am not sure"), Intent::General);
        assert_eq!(Intent::from_classifier_output(""), Intent::General);
    }
}
