//! Verse/chorus structure detection.
//!
//! Builds a pairwise stanza-similarity matrix from text and meter,
//! detects refrains, chains highly similar stanzas into chorus groups,
//! and emits the structure pattern string ("AABA").
//!
//! Chorus grouping is pairwise chaining: any pair over threshold joins a
//! group that already holds either stanza, with no all-pairs
//! verification inside the group. The pattern output for existing poems
//! depends on this, so it stays.

use serde::{Deserialize, Serialize};

use crate::analysis::distance::{edit_similarity, jaccard_words};
use crate::analysis::meter::dominant_meter;

/// Minimum overall similarity for two stanzas to share a chorus group.
const CHORUS_THRESHOLD: f64 = 0.85;

/// Near-match threshold for refrain variants.
const REFRAIN_NEAR_MATCH: f64 = 0.95;

/// Stanzas less similar than this to everything else may be bridges.
const BRIDGE_MAX_SIMILARITY: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    Verse,
    Chorus,
    Bridge,
    Refrain,
    Intro,
    Outro,
}

/// A structural grouping of stanzas by musical role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Section {
    pub section_type: SectionType,
    /// Stanza indices belonging to this section, ascending
    pub stanza_indices: Vec<usize>,
    pub label: String,
    /// Classification confidence in [0, 1]
    pub confidence: f64,
    /// For repeated sections, the stanza this one repeats
    pub repeat_of: Option<usize>,
}

/// A line recurring across stanzas.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Refrain {
    /// Representative text (first occurrence, original casing)
    pub text: String,
    /// (stanza index, line index) of every occurrence
    pub occurrences: Vec<(usize, usize)>,
}

/// One entry of the sparse pairwise similarity matrix.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StanzaSimilarity {
    pub a: usize,
    pub b: usize,
    pub text: f64,
    pub meter: f64,
    pub overall: f64,
}

/// Full structural analysis of a poem.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StructureAnalysis {
    pub sections: Vec<Section>,
    pub refrains: Vec<Refrain>,
    pub similarities: Vec<StanzaSimilarity>,
    pub has_verse_chorus_structure: bool,
    /// One letter per stanza ("AABA")
    pub structure_pattern: String,
    pub summary: String,
}

impl StructureAnalysis {
    /// The explicit empty result for a poem with no stanzas.
    pub fn empty() -> Self {
        StructureAnalysis {
            sections: Vec::new(),
            refrains: Vec::new(),
            similarities: Vec::new(),
            has_verse_chorus_structure: false,
            structure_pattern: String::new(),
            summary: "empty poem".to_string(),
        }
    }
}

/// Lowercase, strip punctuation, collapse whitespace.
fn normalize_line(line: &str) -> String {
    line.chars()
        .map(|c| if c.is_alphanumeric() || c == '\'' { c.to_ascii_lowercase() } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Similarity of two lines on normalized text.
pub fn line_similarity(a: &str, b: &str) -> f64 {
    let na = normalize_line(a);
    let nb = normalize_line(b);
    if na.is_empty() || nb.is_empty() {
        return 0.0;
    }
    if na == nb {
        return 1.0;
    }
    0.6 * edit_similarity(&na, &nb) + 0.4 * jaccard_words(&na, &nb)
}

/// Text similarity of two stanzas: mean per-line similarity over the
/// shorter stanza, scaled by the length ratio.
fn stanza_text_similarity(a: &[String], b: &[String]) -> f64 {
    let min_len = a.len().min(b.len());
    let max_len = a.len().max(b.len());
    if min_len == 0 {
        return 0.0;
    }
    let mean: f64 = (0..min_len)
        .map(|i| line_similarity(&a[i], &b[i]))
        .sum::<f64>()
        / min_len as f64;
    mean * (0.7 + 0.3 * min_len as f64 / max_len as f64)
}

/// Meter similarity of two stanzas from their per-line stress patterns.
fn stanza_meter_similarity(a: &[String], b: &[String]) -> f64 {
    let min_len = a.len().min(b.len());
    if min_len == 0 {
        return 0.0;
    }
    let mean: f64 = (0..min_len)
        .map(|i| edit_similarity(&a[i], &b[i]))
        .sum::<f64>()
        / min_len as f64;

    let da = dominant_meter(a);
    let db = dominant_meter(b);
    let bonus = if da.meter != "irregular" && da.meter == db.meter {
        0.1
    } else {
        0.0
    };
    (mean + bonus).min(1.0)
}

/// Analyze a poem's stanza structure.
///
/// `stanzas` holds the raw line text; `stress_patterns` the per-line
/// stress strings in the same shape (pass empty inner vectors when
/// prosody is unavailable).
pub fn analyze_structure(
    stanzas: &[Vec<String>],
    stress_patterns: &[Vec<String>],
) -> StructureAnalysis {
    let n = stanzas.len();
    if n == 0 {
        return StructureAnalysis::empty();
    }

    let similarities = similarity_matrix(stanzas, stress_patterns);
    let refrains = detect_refrains(stanzas);
    let sections = classify_sections(stanzas, &similarities, &refrains);
    let structure_pattern = pattern_string(&sections, n);
    let has_verse_chorus_structure = sections
        .iter()
        .any(|s| s.section_type == SectionType::Chorus)
        && sections.iter().any(|s| s.section_type == SectionType::Verse);
    let summary = summarize(&sections, &refrains, &structure_pattern, n);

    StructureAnalysis {
        sections,
        refrains,
        similarities,
        has_verse_chorus_structure,
        structure_pattern,
        summary,
    }
}

fn similarity_matrix(
    stanzas: &[Vec<String>],
    stress_patterns: &[Vec<String>],
) -> Vec<StanzaSimilarity> {
    let empty: Vec<String> = Vec::new();
    let patterns_of = |i: usize| stress_patterns.get(i).unwrap_or(&empty);

    let mut out = Vec::new();
    for a in 0..stanzas.len() {
        for b in (a + 1)..stanzas.len() {
            let text = stanza_text_similarity(&stanzas[a], &stanzas[b]);
            let meter = stanza_meter_similarity(patterns_of(a), patterns_of(b));
            out.push(StanzaSimilarity {
                a,
                b,
                text,
                meter,
                overall: 0.7 * text + 0.3 * meter,
            });
        }
    }
    out
}

/// Lines repeated (or near-repeated) across at least two stanzas.
fn detect_refrains(stanzas: &[Vec<String>]) -> Vec<Refrain> {
    // Exact-match groups on normalized text
    let mut groups: Vec<(String, String, Vec<(usize, usize)>)> = Vec::new();
    for (si, stanza) in stanzas.iter().enumerate() {
        for (li, line) in stanza.iter().enumerate() {
            let norm = normalize_line(line);
            if norm.chars().count() < 3 {
                continue;
            }
            match groups.iter_mut().find(|(n, _, _)| *n == norm) {
                Some((_, _, occurrences)) => occurrences.push((si, li)),
                None => groups.push((norm, line.clone(), vec![(si, li)])),
            }
        }
    }

    // Near-match pass: attach unmatched lines to an existing group
    let grouped: Vec<(usize, usize)> = groups
        .iter()
        .filter(|(_, _, occ)| occ.len() >= 2)
        .flat_map(|(_, _, occ)| occ.iter().copied())
        .collect();
    for (si, stanza) in stanzas.iter().enumerate() {
        for (li, line) in stanza.iter().enumerate() {
            if grouped.contains(&(si, li)) {
                continue;
            }
            if let Some((_, _, occurrences)) = groups
                .iter_mut()
                .filter(|(_, _, occ)| occ.len() >= 2 && !occ.contains(&(si, li)))
                .find(|(_, repr, _)| line_similarity(repr, line) >= REFRAIN_NEAR_MATCH)
            {
                occurrences.push((si, li));
            }
        }
    }

    groups
        .into_iter()
        .filter(|(_, _, occurrences)| {
            if occurrences.len() < 2 {
                return false;
            }
            let first_stanza = occurrences[0].0;
            occurrences.iter().any(|(s, _)| *s != first_stanza)
        })
        .map(|(_, text, mut occurrences)| {
            occurrences.sort_unstable();
            Refrain { text, occurrences }
        })
        .collect()
}

/// Chain similar stanza pairs into chorus groups, then classify the rest.
fn classify_sections(
    stanzas: &[Vec<String>],
    similarities: &[StanzaSimilarity],
    refrains: &[Refrain],
) -> Vec<Section> {
    let n = stanzas.len();

    // Pairwise chaining: a qualifying pair joins any group holding either
    // member; otherwise it opens a new group.
    let mut groups: Vec<(Vec<usize>, f64, usize)> = Vec::new(); // (members, score sum, pairs)
    for sim in similarities.iter().filter(|s| s.overall >= CHORUS_THRESHOLD) {
        match groups
            .iter_mut()
            .find(|(members, _, _)| members.contains(&sim.a) || members.contains(&sim.b))
        {
            Some((members, score_sum, pairs)) => {
                if !members.contains(&sim.a) {
                    members.push(sim.a);
                }
                if !members.contains(&sim.b) {
                    members.push(sim.b);
                }
                *score_sum += sim.overall;
                *pairs += 1;
            }
            None => groups.push((vec![sim.a, sim.b], sim.overall, 1)),
        }
    }

    let mut assigned = vec![false; n];
    let mut chorus_sections: Vec<Section> = Vec::new();
    for (mut members, score_sum, pairs) in groups {
        members.sort_unstable();
        members.dedup();
        if members.len() < 2 {
            continue;
        }
        for &m in &members {
            assigned[m] = true;
        }
        let first = members[0];
        chorus_sections.push(Section {
            section_type: SectionType::Chorus,
            confidence: score_sum / pairs as f64,
            repeat_of: (members.len() > 1).then_some(first),
            stanza_indices: members,
            label: String::new(),
        });
    }

    // Refrain-heavy stanzas become singleton choruses
    for si in 0..n {
        if assigned[si] || stanzas[si].len() < 2 {
            continue;
        }
        let matched = stanzas[si]
            .iter()
            .enumerate()
            .filter(|(li, _)| {
                refrains
                    .iter()
                    .any(|r| r.occurrences.contains(&(si, *li)))
            })
            .count();
        let fraction = matched as f64 / stanzas[si].len() as f64;
        if fraction > 0.5 {
            assigned[si] = true;
            chorus_sections.push(Section {
                section_type: SectionType::Chorus,
                stanza_indices: vec![si],
                label: String::new(),
                confidence: fraction,
                repeat_of: None,
            });
        }
    }

    // Dissimilar stanzas in the middle stretch become bridges
    let mut bridge_sections: Vec<Section> = Vec::new();
    if n > 2 {
        for si in 0..n {
            if assigned[si] {
                continue;
            }
            let others: Vec<f64> = similarities
                .iter()
                .filter(|s| s.a == si || s.b == si)
                .map(|s| s.overall)
                .collect();
            if others.is_empty() {
                continue;
            }
            let avg = others.iter().sum::<f64>() / others.len() as f64;
            let position = si as f64 / (n - 1) as f64;
            if avg < BRIDGE_MAX_SIMILARITY && (0.4..=0.8).contains(&position) {
                assigned[si] = true;
                bridge_sections.push(Section {
                    section_type: SectionType::Bridge,
                    stanza_indices: vec![si],
                    label: String::new(),
                    confidence: 1.0 - avg,
                    repeat_of: None,
                });
            }
        }
    }

    // Everything else is a verse
    let mut verse_sections: Vec<Section> = Vec::new();
    for si in 0..n {
        if !assigned[si] {
            verse_sections.push(Section {
                section_type: SectionType::Verse,
                stanza_indices: vec![si],
                label: String::new(),
                confidence: 1.0,
                repeat_of: None,
            });
        }
    }

    // Order sections by first stanza, then label sequentially by type
    let mut sections: Vec<Section> = chorus_sections
        .into_iter()
        .chain(bridge_sections)
        .chain(verse_sections)
        .collect();
    sections.sort_by_key(|s| s.stanza_indices[0]);

    let mut verse_no = 0usize;
    let mut chorus_no = 0usize;
    let mut bridge_no = 0usize;
    for section in sections.iter_mut() {
        section.label = match section.section_type {
            SectionType::Verse => {
                verse_no += 1;
                format!("Verse {verse_no}")
            }
            SectionType::Chorus => {
                chorus_no += 1;
                if chorus_no == 1 {
                    "Chorus".to_string()
                } else {
                    format!("Chorus {chorus_no}")
                }
            }
            SectionType::Bridge => {
                bridge_no += 1;
                format!("Bridge {bridge_no}")
            }
            SectionType::Refrain => "Refrain".to_string(),
            SectionType::Intro => "Intro".to_string(),
            SectionType::Outro => "Outro".to_string(),
        };
    }
    sections
}

/// One ascending letter per first-seen section identity; every chorus
/// shares the first chorus's letter.
fn pattern_string(sections: &[Section], n: usize) -> String {
    let mut letters = vec![' '; n];
    let mut next_letter = b'A';
    let mut chorus_letter: Option<char> = None;

    // Walk stanzas in order; assign the owning section's letter
    let mut section_letters: Vec<Option<char>> = vec![None; sections.len()];
    for stanza in 0..n {
        let owner = sections
            .iter()
            .position(|s| s.stanza_indices.contains(&stanza));
        let Some(owner) = owner else { continue };

        let letter = if sections[owner].section_type == SectionType::Chorus {
            *chorus_letter.get_or_insert_with(|| {
                let l = next_letter as char;
                next_letter += 1;
                l
            })
        } else if let Some(l) = section_letters[owner] {
            l
        } else {
            let l = next_letter as char;
            next_letter += 1;
            section_letters[owner] = Some(l);
            l
        };
        if sections[owner].section_type == SectionType::Chorus {
            section_letters[owner] = Some(letter);
        }
        letters[stanza] = letter;
    }
    letters.into_iter().collect()
}

fn summarize(sections: &[Section], refrains: &[Refrain], pattern: &str, n: usize) -> String {
    let choruses = sections
        .iter()
        .filter(|s| s.section_type == SectionType::Chorus)
        .count();
    let bridges = sections
        .iter()
        .filter(|s| s.section_type == SectionType::Bridge)
        .count();
    let mut parts = vec![format!(
        "{n} stanza{} ({pattern})",
        if n == 1 { "" } else { "s" }
    )];
    if choruses > 0 {
        parts.push(format!("{choruses} chorus section{}", if choruses == 1 { "" } else { "s" }));
    }
    if bridges > 0 {
        parts.push(format!("{bridges} bridge{}", if bridges == 1 { "" } else { "s" }));
    }
    if !refrains.is_empty() {
        parts.push(format!(
            "{} refrain{}",
            refrains.len(),
            if refrains.len() == 1 { "" } else { "s" }
        ));
    }
    parts.join(", ")
}
