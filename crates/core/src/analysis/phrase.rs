//! Phrase boundary detection: where a singer can breathe inside a line.
//!
//! Three passes (punctuation, conjunctions, semantic word classes) merge
//! by position with the strongest mark winning, then an overlong-segment
//! pass inserts extra weak boundaries, and the line's last word always
//! carries a strong boundary.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::text::tokenize::tokenize_words;

lazy_static! {
    static ref COORDINATING: HashSet<&'static str> = {
        ["and", "but", "or", "nor", "for", "so", "yet"]
            .into_iter()
            .collect()
    };

    static ref SUBORDINATING: HashSet<&'static str> = {
        [
            "after", "although", "as", "because", "before", "if", "since",
            "though", "unless", "until", "when", "where", "while",
        ]
        .into_iter()
        .collect()
    };

    static ref PREPOSITIONS: HashSet<&'static str> = {
        [
            "above", "across", "against", "among", "at", "below", "beneath",
            "beside", "between", "beyond", "by", "down", "during", "from",
            "in", "into", "of", "on", "over", "through", "toward", "under",
            "upon", "with", "within", "without",
        ]
        .into_iter()
        .collect()
    };

    static ref RELATIVE_PRONOUNS: HashSet<&'static str> = {
        ["that", "which", "who", "whom", "whose"].into_iter().collect()
    };

    static ref ARTICLES_DETERMINERS: HashSet<&'static str> = {
        [
            "a", "an", "the", "this", "that", "these", "those", "my", "your",
            "his", "her", "its", "our", "their", "each", "every", "some", "no",
        ]
        .into_iter()
        .collect()
    };
}

/// Segments longer than this (estimated syllables) get extra boundaries.
const MAX_SEGMENT_SYLLABLES: usize = 12;

/// Running syllable count at which an overlong segment is split.
const SPLIT_AT_SYLLABLES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryStrength {
    Weak,
    Medium,
    Strong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryKind {
    Punctuation,
    Conjunction,
    Semantic,
    Length,
    Implicit,
}

/// A breathing point after the word at `word_index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseBoundary {
    pub word_index: usize,
    pub strength: BoundaryStrength,
    pub kind: BoundaryKind,
}

/// Detect all phrase boundaries in a line.
pub fn detect_boundaries(line: &str) -> Vec<PhraseBoundary> {
    let words = tokenize_words(line);
    if words.is_empty() {
        return Vec::new();
    }
    let last = words.len() - 1;

    let mut found: Vec<PhraseBoundary> = Vec::new();
    found.extend(punctuation_boundaries(line, &words));
    found.extend(conjunction_boundaries(&words));
    found.extend(semantic_boundaries(&words));

    let mut merged = merge_by_position(found);
    insert_length_boundaries(&words, &mut merged, last);

    // Every line ends on a breath
    if !merged.iter().any(|b| b.word_index == last) {
        merged.push(PhraseBoundary {
            word_index: last,
            strength: BoundaryStrength::Strong,
            kind: BoundaryKind::Implicit,
        });
    }
    merged.sort_by_key(|b| b.word_index);
    merged
}

/// Char→strength table for punctuation marks.
fn punctuation_strength(ch: char) -> Option<BoundaryStrength> {
    match ch {
        '.' | '!' | '?' | ';' => Some(BoundaryStrength::Strong),
        ':' | '\u{2014}' | '\u{2013}' => Some(BoundaryStrength::Medium),
        ',' | '-' => Some(BoundaryStrength::Weak),
        _ => None,
    }
}

/// Boundaries at punctuation marks, attached to the word each mark follows.
fn punctuation_boundaries(line: &str, words: &[String]) -> Vec<PhraseBoundary> {
    // Character spans of the whitespace-separated chunks, paired with the
    // index of the word each chunk produced (hyphen-only chunks produce none).
    let mut spans: Vec<(usize, usize)> = Vec::new(); // (start, word_index)
    let mut chunk_start: Option<usize> = None;
    let mut word_idx = 0usize;
    let chars: Vec<char> = line.chars().collect();
    for (i, &c) in chars.iter().enumerate().chain([(chars.len(), &' ')]) {
        if c.is_whitespace() {
            if let Some(start) = chunk_start.take() {
                let chunk: String = chars[start..i].iter().collect();
                if chunk.chars().any(|c| c.is_alphanumeric()) && word_idx < words.len() {
                    spans.push((start, word_idx));
                    word_idx += 1;
                }
            }
        } else if chunk_start.is_none() {
            chunk_start = Some(i);
        }
    }

    let mut boundaries = Vec::new();
    for (pos, ch) in chars.iter().enumerate() {
        let Some(strength) = punctuation_strength(*ch) else {
            continue;
        };
        // Interior hyphens bind compounds, they are not boundaries
        if *ch == '-'
            && pos > 0
            && pos + 1 < chars.len()
            && chars[pos - 1].is_alphanumeric()
            && chars[pos + 1].is_alphanumeric()
        {
            continue;
        }
        let word_index = spans
            .iter()
            .take_while(|(start, _)| *start <= pos)
            .last()
            .map(|(_, wi)| *wi);
        if let Some(word_index) = word_index {
            boundaries.push(PhraseBoundary {
                word_index,
                strength,
                kind: BoundaryKind::Punctuation,
            });
        }
    }
    boundaries
}

/// Medium boundaries before conjunctions (never at the line start).
fn conjunction_boundaries(words: &[String]) -> Vec<PhraseBoundary> {
    words
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, w)| {
            let lw = w.to_lowercase();
            COORDINATING.contains(lw.as_str()) || SUBORDINATING.contains(lw.as_str())
        })
        .map(|(i, _)| PhraseBoundary {
            word_index: i - 1,
            strength: BoundaryStrength::Medium,
            kind: BoundaryKind::Conjunction,
        })
        .collect()
}

/// Weak boundaries before prepositions (with enough preceding material)
/// and before relative pronouns.
fn semantic_boundaries(words: &[String]) -> Vec<PhraseBoundary> {
    let mut boundaries = Vec::new();
    let mut syllables_before = 0usize;
    for (i, word) in words.iter().enumerate() {
        let lw = word.to_lowercase();
        if i > 0 {
            if PREPOSITIONS.contains(lw.as_str()) && syllables_before >= 3 {
                boundaries.push(PhraseBoundary {
                    word_index: i - 1,
                    strength: BoundaryStrength::Weak,
                    kind: BoundaryKind::Semantic,
                });
            } else if RELATIVE_PRONOUNS.contains(lw.as_str()) {
                boundaries.push(PhraseBoundary {
                    word_index: i - 1,
                    strength: BoundaryStrength::Weak,
                    kind: BoundaryKind::Semantic,
                });
            }
        }
        syllables_before += estimate_syllables(word);
    }
    boundaries
}

/// Keep the strongest boundary at each position.
fn merge_by_position(found: Vec<PhraseBoundary>) -> Vec<PhraseBoundary> {
    let mut merged: Vec<PhraseBoundary> = Vec::new();
    for b in found {
        match merged.iter_mut().find(|m| m.word_index == b.word_index) {
            Some(existing) => {
                if b.strength > existing.strength {
                    *existing = b;
                }
            }
            None => merged.push(b),
        }
    }
    merged
}

/// Split overlong segments between existing boundaries.
fn insert_length_boundaries(
    words: &[String],
    merged: &mut Vec<PhraseBoundary>,
    last: usize,
) {
    let mut cut_points: Vec<usize> = merged.iter().map(|b| b.word_index).collect();
    cut_points.sort_unstable();

    let mut segments: Vec<(usize, usize)> = Vec::new();
    let mut seg_start = 0usize;
    for &cut in &cut_points {
        if cut >= seg_start {
            segments.push((seg_start, cut));
            seg_start = cut + 1;
        }
    }
    if seg_start <= last {
        segments.push((seg_start, last));
    }

    for (start, end) in segments {
        let estimate: usize = words[start..=end].iter().map(|w| estimate_syllables(w)).sum();
        if estimate <= MAX_SEGMENT_SYLLABLES {
            continue;
        }
        let mut running = 0usize;
        for (offset, word) in words[start..=end].iter().enumerate() {
            running += estimate_syllables(word);
            let i = start + offset;
            let words_remaining = end - i;
            if running >= SPLIT_AT_SYLLABLES && words_remaining >= 2 {
                merged.push(PhraseBoundary {
                    word_index: i,
                    strength: BoundaryStrength::Weak,
                    kind: BoundaryKind::Length,
                });
                running = 0;
            }
        }
    }
}

/// Estimate the syllable count of a word by counting vowel groups.
///
/// A trailing silent `e` is discounted; every word counts at least one.
pub fn estimate_syllables(word: &str) -> usize {
    let lower = word.to_lowercase();
    let chars: Vec<char> = lower.chars().filter(|c| c.is_alphabetic()).collect();
    if chars.is_empty() {
        return 1;
    }

    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
    let mut groups = 0usize;
    let mut in_group = false;
    for &c in &chars {
        if is_vowel(c) {
            if !in_group {
                groups += 1;
                in_group = true;
            }
        } else {
            in_group = false;
        }
    }

    // Silent final e: "stone" is one syllable, but keep "the" at one
    if groups > 1 && chars.last() == Some(&'e') && chars.len() >= 2 && !is_vowel(chars[chars.len() - 2])
    {
        groups -= 1;
    }

    groups.max(1)
}

/// Total syllable estimate for a whole line.
pub fn estimate_line_syllables(line: &str) -> usize {
    tokenize_words(line)
        .iter()
        .map(|w| estimate_syllables(w))
        .sum()
}

/// Whether a line reads on into the next without a breath (enjambment).
///
/// Terminal punctuation ends the phrase; a lowercase continuation or a
/// dangling function word carries it over.
pub fn continues_to_next(line: &str, next_line: &str) -> bool {
    let trimmed = line.trim_end();
    if trimmed
        .chars()
        .last()
        .is_some_and(|c| matches!(c, '.' | '!' | '?' | ';'))
    {
        return false;
    }
    if next_line
        .trim_start()
        .chars()
        .next()
        .is_some_and(|c| c.is_lowercase())
    {
        return true;
    }
    let words = tokenize_words(line);
    if let Some(last) = words.last() {
        let lw = last.to_lowercase();
        return PREPOSITIONS.contains(lw.as_str())
            || COORDINATING.contains(lw.as_str())
            || ARTICLES_DETERMINERS.contains(lw.as_str());
    }
    false
}
