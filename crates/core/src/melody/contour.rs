//! Pitch contour shapes.
//!
//! Each line gets one of four shapes mapped over a 0-6 scale-degree
//! range, with seeded jitter per step and a one-degree lift on stressed
//! syllables. First lines open upward, last lines always fall, and the
//! mood biases everything in between.

use serde::{Deserialize, Serialize};

use crate::melody::params::MoodSuggestions;
use crate::rng::SeededRng;

/// Highest scale degree the contour may reach.
const MAX_DEGREE: i32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContourShape {
    /// Rise to the middle, fall to the end
    Arch,
    Descending,
    Ascending,
    /// Rise to mid-line, then hold
    Wave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoodBias {
    Positive,
    Negative,
    Neutral,
}

const POSITIVE_EMOTIONS: [&str; 6] = ["joy", "happiness", "excitement", "love", "hope", "wonder"];
const NEGATIVE_EMOTIONS: [&str; 6] = ["sadness", "grief", "sorrow", "fear", "anger", "longing"];

impl MoodBias {
    /// Read the contour bias off the external mood suggestions.
    pub fn from_mood(mood: &MoodSuggestions) -> Self {
        if let Some(first) = mood.dominant_emotions.first() {
            let lower = first.to_lowercase();
            if POSITIVE_EMOTIONS.contains(&lower.as_str()) {
                return MoodBias::Positive;
            }
            if NEGATIVE_EMOTIONS.contains(&lower.as_str()) {
                return MoodBias::Negative;
            }
        }
        if mood.overall_sentiment > 0.2 {
            MoodBias::Positive
        } else if mood.overall_sentiment < -0.2 {
            MoodBias::Negative
        } else {
            MoodBias::Neutral
        }
    }
}

/// Pick a contour shape for a line.
///
/// The final line always descends toward rest; the first line opens
/// upward; interior lines lean with the mood.
pub fn choose_shape(
    line_index: usize,
    line_count: usize,
    bias: MoodBias,
    rng: &mut SeededRng,
) -> ContourShape {
    if line_count > 0 && line_index + 1 == line_count {
        return ContourShape::Descending;
    }
    if line_index == 0 {
        return *rng.pick(&[ContourShape::Ascending, ContourShape::Arch]);
    }
    let weighted: &[ContourShape] = match bias {
        MoodBias::Positive => &[
            ContourShape::Ascending,
            ContourShape::Ascending,
            ContourShape::Arch,
            ContourShape::Wave,
        ],
        MoodBias::Negative => &[
            ContourShape::Descending,
            ContourShape::Descending,
            ContourShape::Wave,
            ContourShape::Arch,
        ],
        MoodBias::Neutral => &[
            ContourShape::Arch,
            ContourShape::Ascending,
            ContourShape::Descending,
            ContourShape::Wave,
        ],
    };
    *rng.pick(weighted)
}

/// The shape's base curve at position t in [0, 1], in degrees.
fn curve(shape: ContourShape, t: f64) -> f64 {
    match shape {
        ContourShape::Arch => 5.0 * (std::f64::consts::PI * t).sin(),
        ContourShape::Descending => 5.0 * (1.0 - t),
        ContourShape::Ascending => 5.0 * t,
        ContourShape::Wave => 4.0 * (2.0 * t).min(1.0),
    }
}

/// Scale degrees (0-6) for each syllable of a line.
///
/// `stresses` holds the per-syllable stress levels; stressed syllables
/// sit one degree higher, clamped to the range.
pub fn line_degrees(
    shape: ContourShape,
    stresses: &[u8],
    rng: &mut SeededRng,
) -> Vec<i32> {
    let n = stresses.len();
    (0..n)
        .map(|i| {
            let t = if n > 1 { i as f64 / (n - 1) as f64 } else { 0.0 };
            let base = curve(shape, t).round() as i32;
            let jitter = rng.range_i32(-1, 2);
            let lift = if stresses[i] > 0 { 1 } else { 0 };
            (base + jitter + lift).clamp(0, MAX_DEGREE)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_line_always_descends() {
        for seed in 0..20 {
            let mut rng = SeededRng::new(seed);
            assert_eq!(
                choose_shape(3, 4, MoodBias::Positive, &mut rng),
                ContourShape::Descending
            );
        }
    }

    #[test]
    fn test_first_line_opens_upward() {
        for seed in 0..20 {
            let mut rng = SeededRng::new(seed);
            let shape = choose_shape(0, 4, MoodBias::Neutral, &mut rng);
            assert!(matches!(shape, ContourShape::Ascending | ContourShape::Arch));
        }
    }

    #[test]
    fn test_degrees_in_range() {
        let mut rng = SeededRng::new(42);
        let stresses = vec![0u8, 1, 0, 1, 0, 1, 0, 1];
        for shape in [
            ContourShape::Arch,
            ContourShape::Descending,
            ContourShape::Ascending,
            ContourShape::Wave,
        ] {
            let degrees = line_degrees(shape, &stresses, &mut rng);
            assert_eq!(degrees.len(), 8);
            assert!(degrees.iter().all(|&d| (0..=6).contains(&d)));
        }
    }

    #[test]
    fn test_ascending_trends_upward() {
        let mut rng = SeededRng::new(3);
        let stresses = vec![0u8; 10];
        let degrees = line_degrees(ContourShape::Ascending, &stresses, &mut rng);
        assert!(degrees.last().unwrap() > degrees.first().unwrap());
    }

    #[test]
    fn test_descending_trends_downward() {
        let mut rng = SeededRng::new(3);
        let stresses = vec![0u8; 10];
        let degrees = line_degrees(ContourShape::Descending, &stresses, &mut rng);
        assert!(degrees.last().unwrap() < degrees.first().unwrap());
    }

    #[test]
    fn test_single_syllable_line() {
        let mut rng = SeededRng::new(5);
        let degrees = line_degrees(ContourShape::Arch, &[1], &mut rng);
        assert_eq!(degrees.len(), 1);
    }

    #[test]
    fn test_deterministic() {
        let stresses = vec![0u8, 1, 0, 1];
        let mut a = SeededRng::new(11);
        let mut b = SeededRng::new(11);
        assert_eq!(
            line_degrees(ContourShape::Wave, &stresses, &mut a),
            line_degrees(ContourShape::Wave, &stresses, &mut b)
        );
    }

    #[test]
    fn test_mood_bias_from_emotions() {
        let mut mood = MoodSuggestions::default();
        mood.dominant_emotions = vec!["Joy".to_string()];
        assert_eq!(MoodBias::from_mood(&mood), MoodBias::Positive);

        mood.dominant_emotions = vec!["sorrow".to_string()];
        assert_eq!(MoodBias::from_mood(&mood), MoodBias::Negative);

        mood.dominant_emotions.clear();
        mood.overall_sentiment = -0.6;
        assert_eq!(MoodBias::from_mood(&mood), MoodBias::Negative);

        mood.overall_sentiment = 0.0;
        assert_eq!(MoodBias::from_mood(&mood), MoodBias::Neutral);
    }
}
