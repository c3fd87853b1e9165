use std::collections::BTreeMap;

use crate::taxonomy::FRAME_PATTERNS;

/// Per-frame presence flags (0 or 1) for a single text.
pub type FrameCounts = BTreeMap<&'static str, u8>;

/// Flags each narrative frame whose phrases appear as whole words in `text`.
///
/// Frames are independent, so one article can raise several. Repeated hits
/// within a frame still count once.
pub fn count_frames(text: &str) -> FrameCounts {
    FRAME_PATTERNS
        .iter()
        .map(|(frame, pattern)| (*frame, u8::from(pattern.is_match(text))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_frames_hits_expected_frames() {
        let text = "The war caused civilian displacement and humanitarian aid deliveries \
                    amid new economic sanctions.";
        let scores = count_frames(text);
        assert_eq!(scores["Conflict & War"], 1);
        assert_eq!(scores["Humanitarian Impact"], 1);
        assert_eq!(scores["Sanctions & Pressure"], 1);
        assert_eq!(scores["Terrorism & Security"], 0);
        assert_eq!(scores["Climate & Environment"], 0);
    }

    #[test]
    fn test_every_frame_is_reported() {
        let scores = count_frames("");
        assert_eq!(scores.len(), 6);
        assert!(scores.values().all(|v| *v == 0));
    }

    #[test]
    fn test_substrings_inside_words_do_not_match() {
        // "war" inside "award", "software", "warden"; "embargo" inside "embargoed"
        let scores = count_frames("The software award went to a prison warden; results were embargoed.");
        assert_eq!(scores["Conflict & War"], 0);
        assert_eq!(scores["Sanctions & Pressure"], 0);
    }

    #[test]
    fn test_matching_ignores_case() {
        let scores = count_frames("Analysts warn the new AI Model could worsen CO2 EMISSIONS.");
        assert_eq!(scores["Technology"], 1);
        assert_eq!(scores["Climate & Environment"], 1);
    }

    #[test]
    fn test_repeated_hits_count_once() {
        let scores = count_frames("war war war, troops and shelling");
        assert_eq!(scores["Conflict & War"], 1);
    }

    #[test]
    fn test_count_frames_is_idempotent() {
        let text = "Troops crossed the frontline after the embargo.";
        assert_eq!(count_frames(text), count_frames(text));
    }
}
