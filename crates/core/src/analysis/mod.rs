//! Linguistic analysis: syllables, meter, phrasing, singability,
//! stanza structure.

pub mod distance;
pub mod meter;
pub mod phrase;
pub mod singability;
pub mod structure;
pub mod syllables;

use serde::{Deserialize, Serialize};

use crate::lexicon::PhoneticLexicon;
use crate::text::preprocess::preprocess_poem;
use crate::text::tokenize::tokenize_words;
use crate::types::{PreprocessedPoem, SyllabifiedWord};
use phrase::PhraseBoundary;
use singability::SingabilityScore;
use structure::{analyze_structure, StructureAnalysis};

/// One line with its full per-line analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalyzedLine {
    pub text: String,
    pub words: Vec<SyllabifiedWord>,
    /// Per-syllable stress string ('0'/'1'/'2')
    pub stress_pattern: String,
    pub syllable_count: usize,
    pub singability: SingabilityScore,
    /// Breathing points inside the line
    pub boundaries: Vec<PhraseBoundary>,
}

/// Complete analysis of a poem, ready for melody generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PoemAnalysis {
    pub poem: PreprocessedPoem,
    /// Analyzed lines grouped by stanza, mirroring `poem.stanzas`
    pub stanzas: Vec<Vec<AnalyzedLine>>,
    pub structure: StructureAnalysis,
}

impl PoemAnalysis {
    /// All analyzed lines in poem order.
    pub fn lines(&self) -> impl Iterator<Item = &AnalyzedLine> {
        self.stanzas.iter().flatten()
    }

    pub fn line_count(&self) -> usize {
        self.stanzas.iter().map(|s| s.len()).sum()
    }
}

/// Analyze a single line of text.
pub fn analyze_line(line: &str, lexicon: &dyn PhoneticLexicon) -> AnalyzedLine {
    let words: Vec<SyllabifiedWord> = tokenize_words(line)
        .iter()
        .map(|w| syllables::syllabify_word(w, lexicon))
        .collect();
    let stress_pattern = syllables::stress_pattern(&words);
    let syllable_count = words.iter().map(|w| w.syllable_count()).sum();
    let singability = singability::score_line(&words);
    let boundaries = phrase::detect_boundaries(line);
    AnalyzedLine {
        text: line.to_string(),
        words,
        stress_pattern,
        syllable_count,
        singability,
        boundaries,
    }
}

/// Run the whole analysis pipeline over raw poem text.
pub fn analyze_poem(text: &str, lexicon: &dyn PhoneticLexicon) -> PoemAnalysis {
    let poem = preprocess_poem(text);

    let stanzas: Vec<Vec<AnalyzedLine>> = poem
        .stanzas
        .iter()
        .map(|stanza| stanza.iter().map(|line| analyze_line(line, lexicon)).collect())
        .collect();

    let stress_patterns: Vec<Vec<String>> = stanzas
        .iter()
        .map(|stanza| stanza.iter().map(|l| l.stress_pattern.clone()).collect())
        .collect();
    let structure = analyze_structure(&poem.stanzas, &stress_patterns);

    log::debug!(
        "analyzed poem: {} stanzas, {} lines, pattern {:?}",
        poem.stanza_count,
        poem.line_count,
        structure.structure_pattern
    );

    PoemAnalysis {
        poem,
        stanzas,
        structure,
    }
}
