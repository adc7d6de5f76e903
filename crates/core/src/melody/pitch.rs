//! Pitch arithmetic shared by the style and variation engines.
//!
//! Two coordinate systems: diatonic indices (letter steps, 7 per
//! octave) for interval work, and absolute semitones (12 per octave)
//! for transposition and inversion. Non-diatonic semitones snap down to
//! the nearest natural letter, since notes carry no accidentals — the
//! key signature supplies them at render time.

use crate::types::{Melody, Note};

/// Letter order within an octave.
const LETTERS: [char; 7] = ['C', 'D', 'E', 'F', 'G', 'A', 'B'];

/// Semitone offset of each natural letter from C.
const LETTER_SEMITONES: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];

/// Natural letter for each pitch class (sharps snap down).
const PITCH_CLASS_LETTERS: [char; 12] =
    ['C', 'C', 'D', 'D', 'E', 'F', 'F', 'G', 'G', 'A', 'A', 'B'];

/// Index of a letter in C..B order, if valid.
pub fn letter_index(pitch: char) -> Option<usize> {
    LETTERS.iter().position(|&l| l == pitch.to_ascii_uppercase())
}

/// Diatonic index of a note: letter steps above middle C.
pub fn diatonic_index(note: &Note) -> Option<i32> {
    letter_index(note.pitch).map(|li| li as i32 + 7 * note.octave)
}

/// Rebuild (pitch, octave) from a diatonic index.
pub fn from_diatonic_index(index: i32) -> (char, i32) {
    let octave = index.div_euclid(7);
    let letter = LETTERS[index.rem_euclid(7) as usize];
    (letter, octave)
}

/// Absolute semitone value of a note (middle C = 0).
pub fn semitone_value(note: &Note) -> Option<i32> {
    letter_index(note.pitch).map(|li| LETTER_SEMITONES[li] + 12 * note.octave)
}

/// Rebuild (pitch, octave) from an absolute semitone value.
pub fn from_semitone_value(semitones: i32) -> (char, i32) {
    let octave = semitones.div_euclid(12);
    let pc = semitones.rem_euclid(12) as usize;
    (PITCH_CLASS_LETTERS[pc], octave)
}

/// Deterministic seed derived from a melody's own shape.
///
/// Styling and ornamentation randomize per melody, not per call, so the
/// same melody always styles the same way.
pub fn shape_seed(melody: &Melody) -> u32 {
    let mut seed: u32 = 0x811c_9dc5;
    for note in melody.measures.iter().flatten() {
        seed = seed
            .wrapping_mul(31)
            .wrapping_add(note.pitch as u32)
            .wrapping_add((note.octave + 4) as u32)
            .wrapping_add((note.duration * 2.0) as u32);
    }
    seed.wrapping_add(melody.note_count() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MelodyParams, Note};

    #[test]
    fn test_diatonic_roundtrip() {
        for octave in -2..3 {
            for letter in LETTERS {
                let note = Note::new(letter, octave, 1.0);
                let idx = diatonic_index(&note).unwrap();
                assert_eq!(from_diatonic_index(idx), (letter, octave));
            }
        }
    }

    #[test]
    fn test_semitone_roundtrip() {
        let note = Note::new('A', -1, 1.0);
        let semis = semitone_value(&note).unwrap();
        assert_eq!(semis, -3);
        assert_eq!(from_semitone_value(semis), ('A', -1));
    }

    #[test]
    fn test_semitone_snap_down() {
        // 1 semitone above C has no natural letter; snaps to C
        assert_eq!(from_semitone_value(1), ('C', 0));
        assert_eq!(from_semitone_value(6), ('F', 0));
        assert_eq!(from_semitone_value(-2), ('A', -1));
    }

    #[test]
    fn test_rest_has_no_value() {
        assert!(diatonic_index(&Note::rest(1.0)).is_none());
        assert!(semitone_value(&Note::rest(1.0)).is_none());
    }

    #[test]
    fn test_shape_seed_stable() {
        let melody = Melody {
            params: MelodyParams {
                title: "t".into(),
                time_signature: "4/4".into(),
                default_note_length: "1/8".into(),
                tempo: 100,
                key: "C".into(),
            },
            measures: vec![vec![Note::new('C', 0, 2.0), Note::new('E', 0, 2.0)]],
            lyrics: vec![vec!["a".into(), "b".into()]],
        };
        assert_eq!(shape_seed(&melody), shape_seed(&melody.clone()));

        let mut other = melody.clone();
        other.measures[0][0].pitch = 'D';
        assert_ne!(shape_seed(&melody), shape_seed(&other));
    }
}
