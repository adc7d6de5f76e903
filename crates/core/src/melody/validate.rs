//! Soft structural validation of a melody.
//!
//! Reports problems instead of failing, so callers can decide whether
//! to warn, regenerate, or accept.

use serde::{Deserialize, Serialize};

use crate::types::{measure_eighths, Melody};

/// Validation outcome: never an error, always a report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MelodyReport {
    pub valid: bool,
    pub issues: Vec<String>,
}

/// Check a melody's structural sanity.
pub fn validate_melody(melody: &Melody) -> MelodyReport {
    let mut issues = Vec::new();

    if melody.measures.is_empty() {
        issues.push("melody has no measures".to_string());
    }
    if melody.params.tempo == 0 {
        issues.push("tempo is zero".to_string());
    }

    let capacity = measure_eighths(&melody.params.time_signature);
    if capacity.is_none() {
        issues.push(format!(
            "unsupported time signature {:?}",
            melody.params.time_signature
        ));
    }

    if melody.lyrics.len() != melody.measures.len() {
        issues.push(format!(
            "lyric rows ({}) do not match measures ({})",
            melody.lyrics.len(),
            melody.measures.len()
        ));
    } else {
        for (i, (measure, row)) in melody.measures.iter().zip(melody.lyrics.iter()).enumerate()
        {
            if measure.len() != row.len() {
                issues.push(format!(
                    "measure {i}: {} notes but {} lyric slots",
                    measure.len(),
                    row.len()
                ));
            }
        }
    }

    for (i, measure) in melody.measures.iter().enumerate() {
        if measure.is_empty() {
            issues.push(format!("measure {i} is empty"));
        }
        for note in measure {
            if note.duration <= 0.0 {
                issues.push(format!("measure {i}: non-positive duration {}", note.duration));
            }
            if !note.is_rest() && !('A'..='G').contains(&note.pitch) {
                issues.push(format!("measure {i}: invalid pitch {:?}", note.pitch));
            }
        }
        if let Some(capacity) = capacity {
            let fill: f64 = measure.iter().map(|n| n.duration).sum();
            if measure.len() > 1 && fill > capacity as f64 + 1e-9 {
                issues.push(format!(
                    "measure {i}: {fill} units exceeds capacity {capacity}"
                ));
            }
        }
    }

    MelodyReport {
        valid: issues.is_empty(),
        issues,
    }
}
