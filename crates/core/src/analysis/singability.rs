//! Phonetic singability scoring.
//!
//! Scores how comfortably each syllable sustains on a held note: open
//! vowels score high, dense consonant clusters penalize. The openness
//! and cluster tables are fixed constants; scoring vectors depend on
//! their literal values.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::lexicon;
use crate::types::{Syllable, SyllabifiedWord};

lazy_static! {
    /// Vowel openness: open vowels near 1.0, closed vowels near 0.3.
    static ref VOWEL_OPENNESS: HashMap<&'static str, f64> = {
        let mut m = HashMap::new();
        m.insert("AA", 1.0);
        m.insert("AE", 0.9);
        m.insert("AW", 0.95);
        m.insert("AY", 0.95);
        m.insert("AO", 0.9);
        m.insert("OW", 0.8);
        m.insert("OY", 0.85);
        m.insert("EY", 0.75);
        m.insert("AH", 0.7);
        m.insert("EH", 0.7);
        m.insert("ER", 0.5);
        m.insert("IH", 0.45);
        m.insert("UH", 0.4);
        m.insert("IY", 0.35);
        m.insert("UW", 0.3);
        m
    };

    /// Consonant clusters that are hard to articulate mid-song.
    static ref DIFFICULT_CLUSTERS: Vec<&'static [&'static str]> = vec![
        &["S", "T", "R"][..],
        &["S", "K", "R"][..],
        &["S", "P", "L"][..],
        &["S", "P", "R"][..],
        &["NG", "K", "TH"][..],
        &["NG", "TH", "S"][..],
        &["K", "S", "T"][..],
        &["K", "T", "S"][..],
        &["L", "F", "TH"][..],
        &["TH", "S"][..],
        &["DH", "Z"][..],
        &["S", "K", "S"][..],
    ];
}

/// Sonorant consonants that sustain acceptably as a coda.
const SONORANTS: [&str; 5] = ["L", "M", "N", "NG", "R"];

/// Openness default for vowels missing from the table.
const DEFAULT_OPENNESS: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemKind {
    ConsonantCluster,
    ClosedVowel,
    HardTransition,
}

/// A flagged difficulty in one word.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SingabilityProblem {
    pub word: String,
    pub kind: ProblemKind,
    pub severity: Severity,
}

/// Singability result for a line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SingabilityScore {
    /// Overall score in [0, 1]
    pub score: f64,
    /// Mean per-syllable sustainability before problem penalties
    pub mean_sustainability: f64,
    pub problems: Vec<SingabilityProblem>,
}

impl SingabilityScore {
    /// The explicit zero result for degenerate input.
    pub fn zero() -> Self {
        SingabilityScore {
            score: 0.0,
            mean_sustainability: 0.0,
            problems: Vec::new(),
        }
    }
}

/// Sound-pattern counts supplied by an external analyzer.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SoundPatterns {
    pub alliteration: usize,
    pub assonance: usize,
    pub consonance: usize,
}

/// Openness of a syllable: its first vowel phoneme's table score.
pub fn vowel_openness(syllable: &Syllable) -> f64 {
    syllable
        .phonemes
        .iter()
        .find(|p| lexicon::is_vowel(p))
        .map(|p| {
            VOWEL_OPENNESS
                .get(lexicon::strip_stress(p))
                .copied()
                .unwrap_or(DEFAULT_OPENNESS)
        })
        .unwrap_or(DEFAULT_OPENNESS)
}

/// Penalty for the syllable's consonant density, in [0, 1].
///
/// Driven by the longest run of consecutive consonants, plus a surcharge
/// per recognized difficult cluster.
pub fn cluster_penalty(syllable: &Syllable) -> f64 {
    let mut longest = 0usize;
    let mut run = 0usize;
    for p in &syllable.phonemes {
        if lexicon::is_vowel(p) {
            run = 0;
        } else {
            run += 1;
            longest = longest.max(run);
        }
    }

    let mut penalty: f64 = match longest {
        0 | 1 => 0.0,
        2 => 0.2,
        3 => 0.5,
        _ => 0.8,
    };

    for cluster in DIFFICULT_CLUSTERS.iter() {
        if contains_subsequence(&syllable.phonemes, cluster) {
            penalty += 0.1;
        }
    }
    penalty.min(1.0)
}

fn contains_subsequence(phonemes: &[String], cluster: &[&str]) -> bool {
    if cluster.len() > phonemes.len() {
        return false;
    }
    phonemes
        .windows(cluster.len())
        .any(|w| w.iter().zip(cluster.iter()).all(|(a, b)| a == b))
}

/// How well one syllable sustains on a held note, in [0, 1].
pub fn sustainability(syllable: &Syllable) -> f64 {
    let openness = vowel_openness(syllable);
    let coda_bonus = if syllable.is_open {
        0.15
    } else if syllable
        .phonemes
        .last()
        .is_some_and(|p| SONORANTS.contains(&p.as_str()))
    {
        0.1
    } else {
        0.0
    };
    (openness + coda_bonus - 0.3 * cluster_penalty(syllable)).clamp(0.0, 1.0)
}

/// Flag the difficulties in one word.
pub fn word_problems(word: &SyllabifiedWord) -> Vec<SingabilityProblem> {
    let mut problems = Vec::new();

    for syllable in &word.syllables {
        let cluster = cluster_penalty(syllable);
        if cluster >= 0.5 {
            problems.push(SingabilityProblem {
                word: word.word.clone(),
                kind: ProblemKind::ConsonantCluster,
                severity: if cluster >= 0.7 {
                    Severity::High
                } else {
                    Severity::Medium
                },
            });
        }

        let openness = vowel_openness(syllable);
        if openness <= 0.35 {
            problems.push(SingabilityProblem {
                word: word.word.clone(),
                kind: ProblemKind::ClosedVowel,
                severity: if openness <= 0.3 {
                    Severity::Medium
                } else {
                    Severity::Low
                },
            });
        }
    }

    // Closed syllable running into a consonant-heavy onset
    for pair in word.syllables.windows(2) {
        let leading_consonants = pair[1]
            .phonemes
            .iter()
            .take_while(|p| !lexicon::is_vowel(p))
            .count();
        if !pair[0].is_open && leading_consonants >= 2 {
            problems.push(SingabilityProblem {
                word: word.word.clone(),
                kind: ProblemKind::HardTransition,
                severity: Severity::Low,
            });
        }
    }

    problems
}

/// Score a whole line of syllabified words.
pub fn score_line(words: &[SyllabifiedWord]) -> SingabilityScore {
    let syllables: Vec<&Syllable> = words.iter().flat_map(|w| w.syllables.iter()).collect();
    if syllables.is_empty() {
        return SingabilityScore::zero();
    }

    let mean_sustainability =
        syllables.iter().map(|s| sustainability(s)).sum::<f64>() / syllables.len() as f64;

    let problems: Vec<SingabilityProblem> =
        words.iter().flat_map(|w| word_problems(w)).collect();
    let penalty: f64 = problems
        .iter()
        .map(|p| match p.severity {
            Severity::High => 0.15,
            Severity::Medium => 0.08,
            Severity::Low => 0.03,
        })
        .sum::<f64>()
        .min(0.5);

    SingabilityScore {
        score: (mean_sustainability - penalty).clamp(0.0, 1.0),
        mean_sustainability,
        problems,
    }
}

/// Fold external sound-pattern counts into a line score.
///
/// Alliteration and assonance make a line easier to sing, heavy
/// consonance harder; the combined impact is bounded to ±0.2.
pub fn adjust_for_sound_patterns(score: f64, patterns: &SoundPatterns) -> f64 {
    let adjustment = 0.04 * patterns.alliteration as f64 + 0.04 * patterns.assonance as f64
        - 0.03 * patterns.consonance as f64;
    (score + adjustment.clamp(-0.2, 0.2)).clamp(0.0, 1.0)
}
