//! Cadence generation and validation.
//!
//! Scale-degree tables are fixed per supported key; the cadence test
//! vectors depend on their literal values. Octave offsets follow the
//! letter wrap: degrees that pass B move up one octave.

use serde::{Deserialize, Serialize};

use crate::types::Note;

/// Keys with a scale-degree table (major and natural minor).
pub const SUPPORTED_KEYS: [&str; 7] = ["C", "G", "D", "F", "Am", "Em", "Dm"];

/// Duration of a cadence's final note, in default-note-length units.
const FINAL_DURATION: f64 = 4.0;

/// Duration of approach and middle cadence notes.
const APPROACH_DURATION: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CadenceType {
    /// Leading-tone, dominant, tonic — the full stop
    Perfect,
    /// Supertonic, leading-tone, dominant — an open comma
    Half,
    /// Leading-tone, dominant, submediant — tension unresolved
    Deceptive,
    /// Submediant, subdominant, tonic — the "amen" close
    Plagal,
}

impl CadenceType {
    /// Parse a cadence name; anything unrecognized falls back to perfect.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "half" => CadenceType::Half,
            "deceptive" => CadenceType::Deceptive,
            "plagal" => CadenceType::Plagal,
            _ => CadenceType::Perfect,
        }
    }

    /// Scale degrees (0-based) of the 3-note sequence.
    fn degrees(self) -> [usize; 3] {
        match self {
            CadenceType::Perfect => [6, 4, 0],
            CadenceType::Half => [1, 6, 4],
            CadenceType::Deceptive => [6, 4, 5],
            CadenceType::Plagal => [5, 3, 0],
        }
    }

    /// The scale degree the cadence must land on.
    pub fn resolution_degree(self) -> usize {
        match self {
            CadenceType::Perfect | CadenceType::Plagal => 0,
            CadenceType::Half => 4,
            CadenceType::Deceptive => 5,
        }
    }
}

/// Diatonic scale degrees for a key: seven (pitch letter, octave) pairs
/// from the tonic upward. Minor keys use the natural minor scale.
pub fn scale_degrees(key: &str) -> Option<[(char, i32); 7]> {
    let table = match key {
        "C" => [('C', 0), ('D', 0), ('E', 0), ('F', 0), ('G', 0), ('A', 0), ('B', 0)],
        "G" => [('G', 0), ('A', 0), ('B', 0), ('C', 1), ('D', 1), ('E', 1), ('F', 1)],
        "D" => [('D', 0), ('E', 0), ('F', 0), ('G', 0), ('A', 0), ('B', 0), ('C', 1)],
        "F" => [('F', 0), ('G', 0), ('A', 0), ('B', 0), ('C', 1), ('D', 1), ('E', 1)],
        "Am" => [('A', 0), ('B', 0), ('C', 1), ('D', 1), ('E', 1), ('F', 1), ('G', 1)],
        "Em" => [('E', 0), ('F', 0), ('G', 0), ('A', 0), ('B', 0), ('C', 1), ('D', 1)],
        "Dm" => [('D', 0), ('E', 0), ('F', 0), ('G', 0), ('A', 0), ('B', 0), ('C', 1)],
        _ => return None,
    };
    Some(table)
}

/// Degrees of the dominant triad, used when a half cadence picks its
/// landing tone.
pub const DOMINANT_TRIAD: [usize; 3] = [4, 6, 1];

/// The (pitch, octave) of one scale degree, falling back to C for an
/// unknown key so downstream composition stays total.
pub fn degree_note(key: &str, degree: usize) -> (char, i32) {
    let table = scale_degrees(key).unwrap_or_else(|| scale_degrees("C").expect("C is supported"));
    table[degree % 7]
}

/// Generate the 3-note sequence for a cadence.
pub fn generate_cadence(cadence: CadenceType, key: &str) -> Vec<Note> {
    let degrees = cadence.degrees();
    degrees
        .iter()
        .enumerate()
        .map(|(i, &d)| {
            let (pitch, octave) = degree_note(key, d);
            let duration = if i == degrees.len() - 1 {
                FINAL_DURATION
            } else {
                APPROACH_DURATION
            };
            Note::new(pitch, octave, duration)
        })
        .collect()
}

/// The 2-note short form: the cadence's defining (middle, final) pair.
pub fn generate_short_cadence(cadence: CadenceType, key: &str) -> Vec<Note> {
    generate_cadence(cadence, key).split_off(1)
}

/// Soft validation report for a cadence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CadenceReport {
    pub valid: bool,
    pub issues: Vec<String>,
}

/// Check a note sequence against a cadence's resolution requirements.
///
/// Never fails: problems come back as a list of issues.
pub fn validate_cadence(notes: &[Note], cadence: CadenceType, key: &str) -> CadenceReport {
    let mut issues = Vec::new();

    match notes.last() {
        None => issues.push("cadence has no notes".to_string()),
        Some(final_note) => {
            let (expected, _) = degree_note(key, cadence.resolution_degree());
            if final_note.pitch != expected {
                issues.push(format!(
                    "final note {} does not resolve to expected {expected}",
                    final_note.pitch
                ));
            }
            if final_note.duration < 2.0 {
                issues.push(format!(
                    "final duration {} is too short for a resolution",
                    final_note.duration
                ));
            }
        }
    }

    CadenceReport {
        valid: issues.is_empty(),
        issues,
    }
}

/// Which cadence a line at this stanza position takes.
///
/// Stanza-ending lines resolve fully; the second-to-last line of a
/// longer stanza defers with a deceptive cadence; an odd-indexed line
/// 50-75% through a longer stanza takes a plagal turn for variety;
/// everything else rests on a half cadence.
pub fn cadence_for_position(line_index: usize, stanza_lines: usize) -> CadenceType {
    if stanza_lines == 0 || line_index + 1 >= stanza_lines {
        return CadenceType::Perfect;
    }
    if stanza_lines >= 4 {
        if line_index + 2 == stanza_lines {
            return CadenceType::Deceptive;
        }
        let position = line_index as f64 / (stanza_lines - 1) as f64;
        if (0.5..=0.75).contains(&position) && line_index % 2 == 1 {
            return CadenceType::Plagal;
        }
    }
    CadenceType::Half
}
