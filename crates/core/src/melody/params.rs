//! Musical parameter derivation from external mood suggestions.
//!
//! The sentiment collaborator hands over key/mode/tempo suggestions;
//! this module turns them into concrete `MelodyParams`, letting explicit
//! caller overrides win.

use serde::{Deserialize, Serialize};

use crate::types::MelodyParams;

/// Suggestions from the external sentiment/mood analyzer, consumed
/// verbatim. All fields have neutral defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoodSuggestions {
    /// Overall sentiment in [-1, 1]
    pub overall_sentiment: f64,
    /// Emotional energy in [0, 1]; interpolates the tempo range
    pub arousal: f64,
    /// Strongest emotions first
    pub dominant_emotions: Vec<String>,
    /// "major" or "minor"
    pub mode: String,
    /// Tempo bounds in BPM; arousal picks a point inside
    pub tempo_range: (u32, u32),
    /// Suggested vocal register ("low", "middle", "high")
    pub register: String,
    pub key: String,
    pub time_signature: String,
}

impl Default for MoodSuggestions {
    fn default() -> Self {
        MoodSuggestions {
            overall_sentiment: 0.0,
            arousal: 0.5,
            dominant_emotions: Vec::new(),
            mode: "major".to_string(),
            tempo_range: (80, 120),
            register: "middle".to_string(),
            key: "C".to_string(),
            time_signature: "4/4".to_string(),
        }
    }
}

/// Explicit parameter overrides; any `Some` wins over the suggestion.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ParamOverrides {
    pub title: Option<String>,
    pub key: Option<String>,
    pub tempo: Option<u32>,
    pub time_signature: Option<String>,
}

/// Relative-minor mapping for when the mood calls for minor.
fn minor_key_for(key: &str) -> &str {
    match key {
        "C" => "Am",
        "G" => "Em",
        "F" | "D" => "Dm",
        other => other,
    }
}

/// Tempo at `arousal` within the suggested range, linearly interpolated.
pub fn tempo_for_arousal(range: (u32, u32), arousal: f64) -> u32 {
    let (lo, hi) = if range.0 <= range.1 {
        range
    } else {
        (range.1, range.0)
    };
    let t = arousal.clamp(0.0, 1.0);
    (lo as f64 + t * (hi - lo) as f64).round() as u32
}

/// Derive melody parameters from mood suggestions plus overrides.
pub fn derive_params(mood: &MoodSuggestions, overrides: &ParamOverrides) -> MelodyParams {
    let suggested_key = if mood.mode.eq_ignore_ascii_case("minor") && !mood.key.ends_with('m') {
        minor_key_for(&mood.key).to_string()
    } else {
        mood.key.clone()
    };

    MelodyParams {
        title: overrides
            .title
            .clone()
            .unwrap_or_else(|| "Untitled Melody".to_string()),
        time_signature: overrides
            .time_signature
            .clone()
            .unwrap_or_else(|| mood.time_signature.clone()),
        default_note_length: "1/8".to_string(),
        tempo: overrides
            .tempo
            .unwrap_or_else(|| tempo_for_arousal(mood.tempo_range, mood.arousal)),
        key: overrides.key.clone().unwrap_or(suggested_key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tempo_interpolation() {
        assert_eq!(tempo_for_arousal((80, 120), 0.0), 80);
        assert_eq!(tempo_for_arousal((80, 120), 1.0), 120);
        assert_eq!(tempo_for_arousal((80, 120), 0.5), 100);
        // Out-of-range arousal clamps
        assert_eq!(tempo_for_arousal((80, 120), 2.0), 120);
        // Reversed range still works
        assert_eq!(tempo_for_arousal((120, 80), 0.0), 80);
    }

    #[test]
    fn test_defaults() {
        let params = derive_params(&MoodSuggestions::default(), &ParamOverrides::default());
        assert_eq!(params.key, "C");
        assert_eq!(params.time_signature, "4/4");
        assert_eq!(params.tempo, 100);
        assert_eq!(params.default_note_length, "1/8");
    }

    #[test]
    fn test_minor_mode_maps_key() {
        let mood = MoodSuggestions {
            mode: "minor".to_string(),
            key: "G".to_string(),
            ..MoodSuggestions::default()
        };
        let params = derive_params(&mood, &ParamOverrides::default());
        assert_eq!(params.key, "Em");
    }

    #[test]
    fn test_minor_key_passthrough() {
        let mood = MoodSuggestions {
            mode: "minor".to_string(),
            key: "Am".to_string(),
            ..MoodSuggestions::default()
        };
        let params = derive_params(&mood, &ParamOverrides::default());
        assert_eq!(params.key, "Am");
    }

    #[test]
    fn test_overrides_win() {
        let overrides = ParamOverrides {
            title: Some("My Song".to_string()),
            key: Some("F".to_string()),
            tempo: Some(66),
            time_signature: Some("3/4".to_string()),
        };
        let params = derive_params(&MoodSuggestions::default(), &overrides);
        assert_eq!(params.title, "My Song");
        assert_eq!(params.key, "F");
        assert_eq!(params.tempo, 66);
        assert_eq!(params.time_signature, "3/4");
    }
}
