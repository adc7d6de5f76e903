//! Phonetic lexicon boundary: word → phoneme lookup.
//!
//! The pipeline consumes pronunciations through the `PhoneticLexicon`
//! trait so callers can plug in a full dictionary. The default
//! implementation combines a small embedded word list with a rule-based
//! letter-to-phoneme fallback, so analysis runs out of the box.
//! A missing word degrades to an empty phoneme list, never an error.

use std::collections::HashMap;
use std::sync::OnceLock;

/// The embedded mini-lexicon.
///
/// Format: one word per line, "WORD PH1 PH2 PH3 ..."
/// Lines starting with ";;;" are comments.
const LEXICON_DATA: &str = include_str!("lexicon_data.txt");

static EMBEDDED: OnceLock<HashMap<String, Vec<String>>> = OnceLock::new();

fn embedded_dict() -> &'static HashMap<String, Vec<String>> {
    EMBEDDED.get_or_init(|| {
        let mut dict = HashMap::new();
        for line in LEXICON_DATA.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(";;;") {
                continue;
            }
            let mut parts = line.split_whitespace();
            let word = match parts.next() {
                Some(w) => w.to_uppercase(),
                None => continue,
            };
            let phonemes: Vec<String> = parts.map(|s| s.to_string()).collect();
            if !phonemes.is_empty() {
                dict.insert(word, phonemes);
            }
        }
        dict
    })
}

/// Pronunciation source for the analysis stages.
pub trait PhoneticLexicon {
    /// ARPABET phonemes (with stress digits on vowels) for a word, or
    /// `None` when the word is unknown.
    fn lookup_word(&self, word: &str) -> Option<Vec<String>>;

    fn is_vowel(&self, phoneme: &str) -> bool {
        is_vowel(phoneme)
    }

    fn is_consonant(&self, phoneme: &str) -> bool {
        !phoneme.is_empty() && !is_vowel(phoneme)
    }
}

/// Default lexicon: embedded word list plus rule-based fallback.
///
/// `lookup_word` never returns `None` for a word containing at least one
/// letter; out-of-vocabulary words go through `approximate_phonemes`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleLexicon;

impl PhoneticLexicon for RuleLexicon {
    fn lookup_word(&self, word: &str) -> Option<Vec<String>> {
        let key = word
            .trim_matches(|c: char| !c.is_alphabetic() && c != '\'')
            .to_uppercase();
        if key.is_empty() {
            return None;
        }
        if let Some(phonemes) = embedded_dict().get(&key) {
            return Some(phonemes.clone());
        }
        let approx = approximate_phonemes(&key);
        if approx.is_empty() {
            None
        } else {
            Some(approx)
        }
    }
}

/// Check if a phoneme is a vowel (with or without a stress digit).
pub fn is_vowel(phoneme: &str) -> bool {
    let base = strip_stress(phoneme);
    matches!(
        base,
        "AA" | "AE" | "AH" | "AO" | "AW" | "AY" | "EH" | "ER" | "EY" | "IH" | "IY" | "OW"
            | "OY" | "UH" | "UW"
    )
}

/// Strip stress digits from an ARPABET phoneme.
pub fn strip_stress(phoneme: &str) -> &str {
    phoneme.trim_end_matches(|c: char| c.is_ascii_digit())
}

/// Extract the stress digit from a phoneme, if present.
pub fn stress_of(phoneme: &str) -> Option<u8> {
    phoneme
        .as_bytes()
        .last()
        .filter(|b| b.is_ascii_digit())
        .map(|b| b - b'0')
}

/// Rule-based letter-to-phoneme approximation for out-of-vocabulary words.
///
/// Digraphs first, then single letters; the first vowel gets primary
/// stress, later vowels are unstressed. Best-effort only.
fn approximate_phonemes(word: &str) -> Vec<String> {
    let word = word.to_lowercase();
    let chars: Vec<char> = word.chars().collect();
    let mut phonemes: Vec<String> = Vec::new();
    let mut stressed = false;
    let mut i = 0;

    fn push_vowel(phonemes: &mut Vec<String>, stressed: &mut bool, base: &str) {
        let digit = if *stressed { "0" } else { "1" };
        *stressed = true;
        phonemes.push(format!("{base}{digit}"));
    }

    while i < chars.len() {
        if i + 1 < chars.len() {
            let digraph: String = chars[i..i + 2].iter().collect();
            let matched = match digraph.as_str() {
                "th" => Some("TH"),
                "sh" => Some("SH"),
                "ch" => Some("CH"),
                "ng" => Some("NG"),
                "ph" => Some("F"),
                "wh" => Some("W"),
                "ck" => Some("K"),
                "qu" => Some("K"),
                _ => None,
            };
            if let Some(p) = matched {
                phonemes.push(p.to_string());
                if digraph == "qu" {
                    phonemes.push("W".to_string());
                }
                i += 2;
                continue;
            }
            let vowel_digraph = match digraph.as_str() {
                "ee" | "ea" => Some("IY"),
                "oo" => Some("UW"),
                "ou" | "ow" => Some("AW"),
                "ai" | "ay" => Some("EY"),
                "oi" | "oy" => Some("OY"),
                _ => None,
            };
            if let Some(v) = vowel_digraph {
                push_vowel(&mut phonemes, &mut stressed, v);
                i += 2;
                continue;
            }
        }

        match chars[i] {
            'a' => push_vowel(&mut phonemes, &mut stressed, "AE"),
            'e' => {
                // Silent final e
                if i == chars.len() - 1 && !phonemes.is_empty() {
                } else {
                    push_vowel(&mut phonemes, &mut stressed, "EH");
                }
            }
            'i' => push_vowel(&mut phonemes, &mut stressed, "IH"),
            'o' => push_vowel(&mut phonemes, &mut stressed, "AA"),
            'u' => push_vowel(&mut phonemes, &mut stressed, "AH"),
            'y' => {
                if phonemes.is_empty() {
                    phonemes.push("Y".to_string());
                } else {
                    push_vowel(&mut phonemes, &mut stressed, "IY");
                }
            }
            'b' => phonemes.push("B".to_string()),
            'c' => {
                if i + 1 < chars.len() && matches!(chars[i + 1], 'e' | 'i' | 'y') {
                    phonemes.push("S".to_string());
                } else {
                    phonemes.push("K".to_string());
                }
            }
            'd' => phonemes.push("D".to_string()),
            'f' => phonemes.push("F".to_string()),
            'g' => phonemes.push("G".to_string()),
            'h' => phonemes.push("HH".to_string()),
            'j' => phonemes.push("JH".to_string()),
            'k' => phonemes.push("K".to_string()),
            'l' => phonemes.push("L".to_string()),
            'm' => phonemes.push("M".to_string()),
            'n' => phonemes.push("N".to_string()),
            'p' => phonemes.push("P".to_string()),
            'r' => phonemes.push("R".to_string()),
            's' => phonemes.push("S".to_string()),
            't' => phonemes.push("T".to_string()),
            'v' => phonemes.push("V".to_string()),
            'w' => phonemes.push("W".to_string()),
            'x' => {
                phonemes.push("K".to_string());
                phonemes.push("S".to_string());
            }
            'z' => phonemes.push("Z".to_string()),
            _ => {}
        }
        i += 1;
    }

    phonemes
}
