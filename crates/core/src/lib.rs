//! versicle-core: deterministic poem-to-melody synthesis.
//!
//! The pipeline reads free-form poem text, analyzes its linguistic
//! structure (syllables, stress, meter, phrase boundaries, singability,
//! verse/chorus form), and derives a monophonic melody aligned to it:
//! rhythm from stress, pitch contour per line, cadences at phrase and
//! stanza boundaries, notes packed into measures. Output is a typed
//! `Melody` plus ABC notation text and MIDI bytes.
//!
//! Everything is pure and synchronous: each stage returns new immutable
//! values, and all randomness flows from one seeded generator per
//! invocation, so the same poem and seed always reproduce the same
//! melody byte for byte.

pub mod analysis;
pub mod lexicon;
pub mod melody;
pub mod notation;
pub mod rng;
pub mod text;
pub mod types;

pub use analysis::{analyze_line, analyze_poem, AnalyzedLine, PoemAnalysis};
pub use lexicon::{PhoneticLexicon, RuleLexicon};
pub use melody::{
    adjust_melody_params, apply_style, apply_variation, generate_melody, regenerate_melody,
    validate_melody, GenerateOptions, MoodSuggestions, ParamOverrides, StylePreset,
};
pub use notation::{melody_to_abc, melody_to_midi, NotationError};
pub use text::{preprocess_poem, tokenize_words};
pub use types::{Melody, MelodyParams, Note, PreprocessedPoem};
