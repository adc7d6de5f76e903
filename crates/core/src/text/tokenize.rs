//! Word and punctuation tokenization for a single line.

use lazy_static::lazy_static;
use std::collections::HashSet;

use crate::types::{PunctuationMark, TokenizedLine};

lazy_static! {
    /// Common contractions kept whole (compared lowercase).
    static ref CONTRACTIONS: HashSet<&'static str> = {
        [
            "ain't", "aren't", "can't", "couldn't", "didn't", "doesn't",
            "don't", "hadn't", "hasn't", "haven't", "he'd", "he'll", "he's",
            "i'd", "i'll", "i'm", "i've", "isn't", "it'd", "it'll", "it's",
            "let's", "mustn't", "o'er", "shan't", "she'd", "she'll", "she's",
            "shouldn't", "that's", "there's", "they'd", "they'll", "they're",
            "they've", "'tis", "'twas", "wasn't", "we'd", "we'll", "we're",
            "we've", "weren't", "what's", "where's", "who's", "won't",
            "wouldn't", "you'd", "you'll", "you're", "you've",
        ]
        .into_iter()
        .collect()
    };
}

/// Punctuation characters the extractor reports.
const PUNCTUATION_CHARS: &[char] = &[
    '.', ',', '!', '?', ';', ':', '"', '(', ')', '\u{2014}', '\u{2013}', '-',
];

/// Split a line into word tokens.
///
/// Contractions (dictionary entries plus any interior `letters'letters`
/// pattern) and hyphenated compounds stay single tokens. Other boundary
/// punctuation is stripped, except a trailing apostrophe after vowel+`n`
/// (dropped-g forms like "singin'").
pub fn tokenize_words(line: &str) -> Vec<String> {
    line.split_whitespace()
        .filter_map(clean_token)
        .collect()
}

fn clean_token(raw: &str) -> Option<String> {
    // Dictionary contractions keep their apostrophes, including leading
    // ones ('tis), once non-apostrophe boundary punctuation is gone.
    let apostrophes_kept: String = {
        let chars: Vec<char> = raw.chars().collect();
        let start = chars
            .iter()
            .position(|&c| c.is_alphanumeric() || c == '\'')
            .unwrap_or(chars.len());
        let end = chars
            .iter()
            .rposition(|&c| c.is_alphanumeric() || c == '\'')
            .map_or(0, |i| i + 1);
        if start < end {
            chars[start..end].iter().collect()
        } else {
            String::new()
        }
    };
    if CONTRACTIONS.contains(apostrophes_kept.to_lowercase().as_str()) {
        return Some(apostrophes_kept);
    }

    let chars: Vec<char> = raw.chars().collect();
    let start = chars.iter().position(|&c| c.is_alphanumeric())?;
    let mut end = chars.iter().rposition(|&c| c.is_alphanumeric())? + 1;

    // Dropped-g forms: keep a trailing apostrophe after vowel + n
    if end < chars.len() && chars[end] == '\'' && end >= 2 {
        let last = chars[end - 1].to_ascii_lowercase();
        let prev = chars[end - 2].to_ascii_lowercase();
        if last == 'n' && matches!(prev, 'a' | 'e' | 'i' | 'o' | 'u') {
            end += 1;
        }
    }

    // Interior apostrophes (letters'letters) and hyphens survive because
    // only the boundaries were trimmed.
    let token: String = chars[start..end].iter().collect();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Extract every punctuation mark with its absolute character offset.
///
/// Marks come back in left-to-right order; each dot of a multi-dot
/// ellipsis is reported as its own period.
pub fn extract_punctuation(line: &str) -> Vec<PunctuationMark> {
    line.chars()
        .enumerate()
        .filter(|(_, c)| PUNCTUATION_CHARS.contains(c))
        .map(|(position, ch)| PunctuationMark { ch, position })
        .collect()
}

/// Tokenize a full line into words and punctuation.
pub fn tokenize_line(line: &str) -> TokenizedLine {
    TokenizedLine {
        words: tokenize_words(line),
        punctuation: extract_punctuation(line),
    }
}
