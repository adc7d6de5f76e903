//! Style presets: folk, classical, pop, hymn.
//!
//! A preset fixes the time signature, clamps the tempo, narrows melodic
//! intervals to the style's preferred sizes, and reshapes durations.
//! Styling randomness is seeded from the melody's own shape, so one
//! melody always styles the same way.

use serde::{Deserialize, Serialize};

use crate::melody::generate::pack_measures;
use crate::melody::pitch::{diatonic_index, from_diatonic_index, shape_seed};
use crate::rng::SeededRng;
use crate::types::Melody;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StylePreset {
    Folk,
    Classical,
    Pop,
    Hymn,
}

impl StylePreset {
    /// Parse a style name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "folk" => Some(StylePreset::Folk),
            "classical" => Some(StylePreset::Classical),
            "pop" => Some(StylePreset::Pop),
            "hymn" => Some(StylePreset::Hymn),
            _ => None,
        }
    }

    fn time_signature(self) -> &'static str {
        match self {
            StylePreset::Folk => "4/4",
            StylePreset::Classical => "3/4",
            StylePreset::Pop => "4/4",
            StylePreset::Hymn => "4/4",
        }
    }

    fn tempo_range(self) -> (u32, u32) {
        match self {
            StylePreset::Folk => (90, 140),
            StylePreset::Classical => (60, 100),
            StylePreset::Pop => (100, 130),
            StylePreset::Hymn => (70, 100),
        }
    }

    /// Preferred scale-degree interval sizes (diatonic steps).
    fn preferred_intervals(self) -> &'static [i32] {
        match self {
            StylePreset::Folk => &[1, 2, 3],
            StylePreset::Classical => &[1, 2, 3, 4],
            StylePreset::Pop => &[1, 2],
            StylePreset::Hymn => &[1, 2, 3],
        }
    }

    fn max_interval(self) -> i32 {
        *self
            .preferred_intervals()
            .iter()
            .max()
            .expect("preset has intervals")
    }
}

/// Apply a style preset to a melody, returning a new melody.
pub fn apply_style(melody: &Melody, preset: StylePreset) -> Melody {
    let mut rng = SeededRng::new(shape_seed(melody));

    let mut params = melody.params.clone();
    params.time_signature = preset.time_signature().to_string();
    let (lo, hi) = preset.tempo_range();
    params.tempo = params.tempo.clamp(lo, hi);

    // Flatten, transform in sequence, repack under the new signature
    let mut notes: Vec<crate::types::Note> =
        melody.measures.iter().flatten().cloned().collect();
    let lyrics: Vec<String> = melody.lyrics.iter().flatten().cloned().collect();

    narrow_intervals(&mut notes, preset, &mut rng);
    reshape_durations(&mut notes, preset, &mut rng);

    let capacity = params.measure_eighths().unwrap_or(8) as f64;
    let (measures, lyric_rows) = pack_measures(notes, lyrics, capacity);

    Melody {
        params,
        measures,
        lyrics: lyric_rows,
    }
}

/// Pull oversized leaps back toward the previous note.
fn narrow_intervals(
    notes: &mut [crate::types::Note],
    preset: StylePreset,
    rng: &mut SeededRng,
) {
    let max = preset.max_interval();
    let mut prev_index: Option<i32> = None;

    for note in notes.iter_mut() {
        let Some(current) = diatonic_index(note) else {
            continue; // rests pass through
        };
        if let Some(prev) = prev_index {
            let interval = current - prev;
            if interval.abs() > max {
                let step = *rng.pick(preset.preferred_intervals());
                let pulled = prev + interval.signum() * step;
                let (pitch, octave) = from_diatonic_index(pulled);
                note.pitch = pitch;
                note.octave = octave;
                prev_index = Some(pulled);
                continue;
            }
        }
        prev_index = Some(current);
    }
}

/// Reshape durations per the preset's rule table.
fn reshape_durations(
    notes: &mut [crate::types::Note],
    preset: StylePreset,
    rng: &mut SeededRng,
) {
    for note in notes.iter_mut() {
        if note.is_rest() {
            continue;
        }
        note.duration = match preset {
            StylePreset::Folk => note.duration.clamp(2.0, 4.0),
            StylePreset::Classical => {
                if rng.chance(0.15) {
                    (note.duration * 2.0).min(4.0)
                } else if rng.chance(0.15) {
                    (note.duration / 2.0).max(0.5)
                } else {
                    note.duration
                }
            }
            StylePreset::Pop => note.duration.min(2.0),
            StylePreset::Hymn => {
                let floored = note.duration.max(2.0);
                if rng.chance(0.25) {
                    4.0
                } else {
                    floored
                }
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MelodyParams, Note};

    fn melody_with(notes: Vec<Note>, tempo: u32) -> Melody {
        let lyrics = vec![vec![String::new(); notes.len()]];
        Melody {
            params: MelodyParams {
                title: "Test".into(),
                time_signature: "4/4".into(),
                default_note_length: "1/8".into(),
                tempo,
                key: "C".into(),
            },
            measures: vec![notes],
            lyrics,
        }
    }

    #[test]
    fn test_tempo_clamps_to_range() {
        let melody = melody_with(vec![Note::new('C', 0, 2.0)], 200);
        let styled = apply_style(&melody, StylePreset::Hymn);
        assert_eq!(styled.params.tempo, 100);

        let slow = melody_with(vec![Note::new('C', 0, 2.0)], 40);
        let styled = apply_style(&slow, StylePreset::Folk);
        assert_eq!(styled.params.tempo, 90);
    }

    #[test]
    fn test_classical_sets_three_four() {
        let melody = melody_with(vec![Note::new('C', 0, 2.0)], 80);
        let styled = apply_style(&melody, StylePreset::Classical);
        assert_eq!(styled.params.time_signature, "3/4");
    }

    #[test]
    fn test_pop_caps_durations() {
        let melody = melody_with(
            vec![Note::new('C', 0, 4.0), Note::new('D', 0, 3.0), Note::new('E', 0, 1.0)],
            110,
        );
        let styled = apply_style(&melody, StylePreset::Pop);
        for note in styled.flat_notes() {
            assert!(note.duration <= 2.0);
        }
    }

    #[test]
    fn test_folk_clamps_durations() {
        let melody = melody_with(
            vec![Note::new('C', 0, 0.5), Note::new('D', 0, 4.0)],
            100,
        );
        let styled = apply_style(&melody, StylePreset::Folk);
        for note in styled.flat_notes() {
            assert!(note.duration >= 2.0 && note.duration <= 4.0);
        }
    }

    #[test]
    fn test_hymn_floors_durations() {
        let melody = melody_with(
            vec![Note::new('C', 0, 0.5), Note::new('D', 0, 1.0)],
            80,
        );
        let styled = apply_style(&melody, StylePreset::Hymn);
        for note in styled.flat_notes() {
            assert!(note.duration >= 2.0);
        }
    }

    #[test]
    fn test_wide_leap_narrowed() {
        // C0 to B1 is a 13-step leap; pop allows at most 2
        let melody = melody_with(
            vec![Note::new('C', 0, 2.0), Note::new('B', 1, 2.0)],
            110,
        );
        let styled = apply_style(&melody, StylePreset::Pop);
        let notes = styled.flat_notes();
        let a = diatonic_index(notes[0]).unwrap();
        let b = diatonic_index(notes[1]).unwrap();
        assert!((b - a).abs() <= 2);
    }

    #[test]
    fn test_styling_deterministic_per_melody() {
        let melody = melody_with(
            vec![
                Note::new('C', 0, 1.0),
                Note::new('A', 1, 2.0),
                Note::new('D', 0, 0.5),
            ],
            95,
        );
        let a = apply_style(&melody, StylePreset::Classical);
        let b = apply_style(&melody, StylePreset::Classical);
        assert_eq!(a, b);
    }

    #[test]
    fn test_original_untouched() {
        let melody = melody_with(vec![Note::new('C', 0, 0.5)], 100);
        let _ = apply_style(&melody, StylePreset::Folk);
        assert!((melody.measures[0][0].duration - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rests_pass_through() {
        let melody = melody_with(
            vec![Note::new('C', 0, 2.0), Note::rest(0.5), Note::new('D', 0, 2.0)],
            100,
        );
        let styled = apply_style(&melody, StylePreset::Folk);
        let rest = styled
            .flat_notes()
            .into_iter()
            .find(|n| n.is_rest())
            .expect("rest survives");
        assert!((rest.duration - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(StylePreset::from_name("FOLK"), Some(StylePreset::Folk));
        assert_eq!(StylePreset::from_name("ska"), None);
    }
}
