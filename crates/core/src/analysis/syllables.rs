//! Word syllabification through the phonetic lexicon.
//!
//! Splits a word's phoneme sequence at vowel nuclei: each vowel starts a
//! syllable; a single intervocalic consonant becomes the next onset, a
//! cluster leaves its first consonant behind as a coda. Word-final
//! consonants close the last syllable.

use crate::lexicon::{self, PhoneticLexicon};
use crate::types::{Syllable, SyllabifiedWord};

/// Syllabify one word. An unknown word degrades to zero syllables.
pub fn syllabify_word(word: &str, lexicon: &dyn PhoneticLexicon) -> SyllabifiedWord {
    let phonemes = lexicon.lookup_word(word).unwrap_or_default();
    SyllabifiedWord {
        word: word.to_string(),
        syllables: syllabify_phonemes(&phonemes),
    }
}

/// Group a phoneme sequence into syllables.
pub fn syllabify_phonemes(phonemes: &[String]) -> Vec<Syllable> {
    let vowel_positions: Vec<usize> = phonemes
        .iter()
        .enumerate()
        .filter(|(_, p)| lexicon::is_vowel(p))
        .map(|(i, _)| i)
        .collect();

    if vowel_positions.is_empty() {
        if phonemes.is_empty() {
            return Vec::new();
        }
        // All-consonant input: one closed syllable, no nucleus
        return vec![make_syllable(phonemes, None)];
    }

    let mut syllables = Vec::new();
    let mut start = 0usize;

    for (vi, &vpos) in vowel_positions.iter().enumerate() {
        let end = if vi + 1 == vowel_positions.len() {
            phonemes.len()
        } else {
            let next_vpos = vowel_positions[vi + 1];
            let gap = next_vpos - vpos - 1;
            if gap <= 1 {
                // Single consonant (or none) goes to the next onset
                vpos + 1
            } else {
                // First consonant of the cluster closes this syllable
                vpos + 2
            }
        };
        syllables.push(make_syllable(&phonemes[start..end], Some(vpos - start)));
        start = end;
    }

    syllables
}

fn make_syllable(phonemes: &[String], vowel_offset: Option<usize>) -> Syllable {
    let stress = vowel_offset
        .and_then(|i| lexicon::stress_of(&phonemes[i]))
        .unwrap_or(0);
    let vowel = vowel_offset.map(|i| lexicon::strip_stress(&phonemes[i]).to_string());
    let stripped: Vec<String> = phonemes
        .iter()
        .map(|p| lexicon::strip_stress(p).to_string())
        .collect();
    let is_open = stripped
        .last()
        .is_some_and(|p| lexicon::is_vowel(p));
    Syllable {
        phonemes: stripped,
        stress,
        vowel,
        is_open,
    }
}

/// Per-syllable stress string ('0'/'1'/'2') for a sequence of words.
pub fn stress_pattern(words: &[SyllabifiedWord]) -> String {
    words
        .iter()
        .flat_map(|w| w.syllables.iter())
        .map(|s| char::from(b'0' + s.stress.min(2)))
        .collect()
}
