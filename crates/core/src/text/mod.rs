//! Text intake: normalization, stanza splitting, tokenization.

pub mod preprocess;
pub mod tokenize;

pub use preprocess::{normalize_text, preprocess_poem};
pub use tokenize::{extract_punctuation, tokenize_words};
