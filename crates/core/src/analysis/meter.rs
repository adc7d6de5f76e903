//! Metrical foot detection from stress patterns.
//!
//! Canonical feet are tiled to the observed length and compared by
//! normalized edit distance. The literal foot strings are load-bearing:
//! meter test vectors depend on them.

use serde::{Deserialize, Serialize};

use crate::analysis::distance::edit_similarity;

/// Canonical foot patterns ('0' unstressed, '1' stressed).
pub const FOOT_PATTERNS: &[(&str, &str)] = &[
    ("iamb", "01"),
    ("trochee", "10"),
    ("anapest", "001"),
    ("dactyl", "100"),
    ("spondee", "11"),
];

/// Minimum similarity for a foot pattern to count as a match.
const MATCH_THRESHOLD: f64 = 0.3;

/// Result of matching one line's stress pattern against the foot table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeterAnalysis {
    /// Foot name, or "irregular" when nothing matched
    pub meter: String,
    /// Match confidence in [0, 1]
    pub confidence: f64,
    /// Number of feet in the best match
    pub feet: usize,
    /// Classical line-length name (monometer..octameter)
    pub line_length: String,
}

/// Dominant meter across several lines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DominantMeter {
    pub meter: String,
    /// Mean confidence of matching lines, weighted by the matching fraction
    pub regularity: f64,
}

#[derive(Debug, Clone)]
struct FootMatch {
    meter: &'static str,
    score: f64,
    feet: usize,
}

/// Classify the meter of a single stress pattern.
///
/// Secondary stress counts as stressed for matching purposes. Patterns
/// shorter than 4 syllables are discounted: two syllables match some
/// foot trivially.
pub fn detect_meter(stress_pattern: &str) -> MeterAnalysis {
    let observed: String = stress_pattern
        .chars()
        .map(|c| if c == '2' { '1' } else { c })
        .collect();

    if observed.is_empty() {
        return MeterAnalysis {
            meter: "irregular".to_string(),
            confidence: 0.0,
            feet: 0,
            line_length: String::new(),
        };
    }

    let mut best_per_foot: Vec<FootMatch> = Vec::new();
    for &(name, pattern) in FOOT_PATTERNS {
        if let Some(m) = best_tiling(&observed, name, pattern) {
            best_per_foot.push(m);
        }
    }

    if best_per_foot.is_empty() {
        let feet = observed.len().div_ceil(2);
        return MeterAnalysis {
            meter: "irregular".to_string(),
            confidence: 0.0,
            feet,
            line_length: line_length_name(feet),
        };
    }

    best_per_foot.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
    let best = &best_per_foot[0];
    let runner_up = best_per_foot.get(1).map_or(0.0, |m| m.score);

    let mut confidence = best.score + 0.5 * (best.score - runner_up);
    if observed.len() < 4 {
        confidence *= 0.7;
    }
    let confidence = confidence.clamp(0.0, 1.0);

    MeterAnalysis {
        meter: best.meter.to_string(),
        confidence,
        feet: best.feet,
        line_length: line_length_name(best.feet),
    }
}

/// Best score for one foot tiled to floor and ceiling repetition counts.
fn best_tiling(observed: &str, name: &'static str, pattern: &str) -> Option<FootMatch> {
    let flen = pattern.len();
    let floor = (observed.len() / flen).max(1);
    let ceil = observed.len().div_ceil(flen).max(1);

    let mut best: Option<FootMatch> = None;
    for count in [floor, ceil] {
        let tiled = pattern.repeat(count);
        let score = edit_similarity(observed, &tiled);
        if score >= MATCH_THRESHOLD && best.as_ref().map_or(true, |b| score > b.score) {
            best = Some(FootMatch {
                meter: name,
                score,
                feet: count,
            });
        }
    }
    best
}

/// Classical name for a line of `feet` feet, clamped to 1..=8.
pub fn line_length_name(feet: usize) -> String {
    const NAMES: [&str; 8] = [
        "monometer",
        "dimeter",
        "trimeter",
        "tetrameter",
        "pentameter",
        "hexameter",
        "heptameter",
        "octameter",
    ];
    NAMES[feet.clamp(1, 8) - 1].to_string()
}

/// Find the dominant meter across several stress patterns.
///
/// Picks the most frequent per-line meter name, then averages the
/// confidence of lines sharing it, weighted by the fraction of lines
/// that match.
pub fn dominant_meter(stress_patterns: &[String]) -> DominantMeter {
    let analyses: Vec<MeterAnalysis> =
        stress_patterns.iter().map(|p| detect_meter(p)).collect();

    let named: Vec<&MeterAnalysis> = analyses
        .iter()
        .filter(|a| a.meter != "irregular")
        .collect();
    if named.is_empty() {
        return DominantMeter {
            meter: "irregular".to_string(),
            regularity: 0.0,
        };
    }

    let mut counts: Vec<(&str, usize)> = Vec::new();
    for a in &named {
        match counts.iter_mut().find(|(name, _)| *name == a.meter) {
            Some((_, n)) => *n += 1,
            None => counts.push((a.meter.as_str(), 1)),
        }
    }
    let (winner, count) = counts
        .into_iter()
        .max_by_key(|&(_, n)| n)
        .expect("non-empty counts");

    let matching: Vec<&&MeterAnalysis> =
        named.iter().filter(|a| a.meter == winner).collect();
    let mean_confidence: f64 =
        matching.iter().map(|a| a.confidence).sum::<f64>() / matching.len() as f64;
    let fraction = count as f64 / analyses.len() as f64;

    DominantMeter {
        meter: winner.to_string(),
        regularity: mean_confidence * fraction,
    }
}
