use serde::{Deserialize, Serialize};

/// A poem after normalization and stanza splitting.
///
/// `stanzas` holds the non-blank lines grouped by blank-line separators.
/// Built once from raw text; every later stage reads from it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreprocessedPoem {
    /// Raw input text, untouched
    pub original: String,
    /// Lines grouped into stanzas
    pub stanzas: Vec<Vec<String>>,
    /// Total non-blank lines across all stanzas
    pub line_count: usize,
    pub stanza_count: usize,
}

/// A punctuation mark with its absolute character offset in the line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PunctuationMark {
    pub ch: char,
    pub position: usize,
}

/// Words and punctuation extracted from one line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenizedLine {
    pub words: Vec<String>,
    pub punctuation: Vec<PunctuationMark>,
}

/// One syllable of a word.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Syllable {
    /// Phoneme codes with stress digits stripped
    pub phonemes: Vec<String>,
    /// 0 unstressed, 1 primary, 2 secondary
    pub stress: u8,
    /// Nucleus vowel phoneme, if the lexicon found one
    pub vowel: Option<String>,
    /// True iff the syllable ends in a vowel phoneme
    pub is_open: bool,
}

/// A word split into syllables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyllabifiedWord {
    pub word: String,
    pub syllables: Vec<Syllable>,
}

impl SyllabifiedWord {
    pub fn syllable_count(&self) -> usize {
        self.syllables.len()
    }
}

/// A single melody note or rest.
///
/// `pitch` is a letter A-G, or 'z' for a rest. `octave` is relative to the
/// middle octave (0 renders as an uppercase ABC letter, 1 as lowercase).
/// `duration` is a positive multiple of the default note length.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    pub pitch: char,
    pub octave: i32,
    pub duration: f64,
}

impl Note {
    pub fn new(pitch: char, octave: i32, duration: f64) -> Self {
        Note {
            pitch,
            octave,
            duration,
        }
    }

    /// A rest of the given duration.
    pub fn rest(duration: f64) -> Self {
        Note {
            pitch: 'z',
            octave: 0,
            duration,
        }
    }

    pub fn is_rest(&self) -> bool {
        self.pitch == 'z' || self.pitch == 'Z'
    }
}

/// Musical parameters for a generated melody.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MelodyParams {
    pub title: String,
    /// One of "4/4", "3/4", "6/8", "2/4"
    pub time_signature: String,
    /// One of "1/8", "1/4", "1/16"
    pub default_note_length: String,
    /// Beats per minute
    pub tempo: u32,
    /// One of "C", "G", "D", "F", "Am", "Em", "Dm"
    pub key: String,
}

impl MelodyParams {
    /// Measure capacity in eighth-note units, if the signature is supported.
    pub fn measure_eighths(&self) -> Option<u32> {
        measure_eighths(&self.time_signature)
    }
}

/// Eighth-note units that fill one measure of the given time signature.
pub fn measure_eighths(time_signature: &str) -> Option<u32> {
    match time_signature {
        "4/4" => Some(8),
        "3/4" => Some(6),
        "6/8" => Some(6),
        "2/4" => Some(4),
        _ => None,
    }
}

/// A complete melody: parameters, notes grouped into measures, and a
/// syllable lyric aligned index-for-index with the measures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Melody {
    pub params: MelodyParams,
    pub measures: Vec<Vec<Note>>,
    /// One row per measure; each note gets its syllable, rests get ""
    pub lyrics: Vec<Vec<String>>,
}

impl Melody {
    /// All notes in playback order, ignoring measure grouping.
    pub fn flat_notes(&self) -> Vec<&Note> {
        self.measures.iter().flatten().collect()
    }

    pub fn note_count(&self) -> usize {
        self.measures.iter().map(|m| m.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_rest() {
        let r = Note::rest(2.0);
        assert!(r.is_rest());
        assert_eq!(r.pitch, 'z');
        assert!((r.duration - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_measure_eighths() {
        assert_eq!(measure_eighths("4/4"), Some(8));
        assert_eq!(measure_eighths("3/4"), Some(6));
        assert_eq!(measure_eighths("6/8"), Some(6));
        assert_eq!(measure_eighths("2/4"), Some(4));
        assert_eq!(measure_eighths("7/8"), None);
    }

    #[test]
    fn test_melody_flat_notes() {
        let melody = Melody {
            params: MelodyParams {
                title: "t".into(),
                time_signature: "4/4".into(),
                default_note_length: "1/8".into(),
                tempo: 100,
                key: "C".into(),
            },
            measures: vec![
                vec![Note::new('C', 0, 2.0), Note::new('D', 0, 2.0)],
                vec![Note::new('E', 0, 4.0)],
            ],
            lyrics: vec![vec!["la".into(), "la".into()], vec!["la".into()]],
        };
        assert_eq!(melody.note_count(), 3);
        assert_eq!(melody.flat_notes().len(), 3);
    }

    #[test]
    fn test_melody_serde_roundtrip() {
        let melody = Melody {
            params: MelodyParams {
                title: "Roundtrip".into(),
                time_signature: "3/4".into(),
                default_note_length: "1/8".into(),
                tempo: 90,
                key: "Am".into(),
            },
            measures: vec![vec![Note::rest(6.0)]],
            lyrics: vec![vec![String::new()]],
        };
        let json = serde_json::to_string(&melody).unwrap();
        let back: Melody = serde_json::from_str(&json).unwrap();
        assert_eq!(melody, back);
    }
}
