//! Poem normalization and stanza/line splitting.
//!
//! Normalization is conservative: it regularizes whitespace without
//! touching word content, so reconstructing the text from the stanza
//! list and re-preprocessing is stable.

use crate::types::PreprocessedPoem;

/// Normalize line endings and whitespace.
///
/// CRLF/CR become LF, tabs become spaces, runs of interior spaces
/// collapse to one (a single leading space per line survives), trailing
/// per-line whitespace and leading/trailing blank lines are trimmed.
/// Interior blank lines are preserved as stanza separators.
pub fn normalize_text(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n").replace('\t', " ");

    let mut lines: Vec<String> = unified.split('\n').map(normalize_line).collect();

    while lines.first().is_some_and(|l| l.is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    lines.join("\n")
}

fn normalize_line(line: &str) -> String {
    let keep_leading = line.starts_with(' ') && !line.trim().is_empty();
    let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
    if keep_leading {
        format!(" {collapsed}")
    } else {
        collapsed
    }
}

/// Split normalized text into stanzas of consecutive non-blank lines.
///
/// One or more blank lines (including whitespace-only lines in the raw
/// input) terminate the current stanza; stanzas that accumulated zero
/// lines are discarded, so runs of blank lines never produce empties.
pub fn preprocess_poem(text: &str) -> PreprocessedPoem {
    let normalized = normalize_text(text);

    let mut stanzas: Vec<Vec<String>> = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for line in normalized.split('\n') {
        if line.is_empty() {
            if !current.is_empty() {
                stanzas.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line.to_string());
        }
    }
    if !current.is_empty() {
        stanzas.push(current);
    }

    // Empty input yields zero stanzas, not one empty stanza
    if normalized.is_empty() {
        stanzas.clear();
    }

    let line_count = stanzas.iter().map(|s| s.len()).sum();
    PreprocessedPoem {
        original: text.to_string(),
        stanza_count: stanzas.len(),
        line_count,
        stanzas,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roses_scenario() {
        let poem = preprocess_poem("Roses are red\nViolets are blue");
        assert_eq!(poem.stanza_count, 1);
        assert_eq!(poem.line_count, 2);
        assert_eq!(
            poem.stanzas,
            vec![vec![
                "Roses are red".to_string(),
                "Violets are blue".to_string()
            ]]
        );
    }

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!(normalize_text("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_normalize_tabs_and_runs() {
        assert_eq!(normalize_text("a\t\tb   c"), "a b c");
    }

    #[test]
    fn test_normalize_keeps_single_leading_space() {
        assert_eq!(normalize_text("  indented line"), " indented line");
        assert_eq!(normalize_text("plain line"), "plain line");
    }

    #[test]
    fn test_normalize_trims_trailing_whitespace() {
        assert_eq!(normalize_text("line one   \nline two\t"), "line one\nline two");
    }

    #[test]
    fn test_normalize_trims_outer_blank_lines() {
        assert_eq!(normalize_text("\n\n  \nfirst\nsecond\n\n"), "first\nsecond");
    }

    #[test]
    fn test_stanza_split_on_blank_lines() {
        let poem = preprocess_poem("one\ntwo\n\nthree\nfour");
        assert_eq!(poem.stanza_count, 2);
        assert_eq!(poem.line_count, 4);
        assert_eq!(poem.stanzas[1], vec!["three", "four"]);
    }

    #[test]
    fn test_whitespace_only_lines_separate_stanzas() {
        let poem = preprocess_poem("one\n   \ntwo");
        assert_eq!(poem.stanza_count, 2);
    }

    #[test]
    fn test_multiple_blank_lines_no_empty_stanzas() {
        let poem = preprocess_poem("\n\none\n\n\n\ntwo\n\n");
        assert_eq!(poem.stanza_count, 2);
        assert!(poem.stanzas.iter().all(|s| !s.is_empty()));
    }

    #[test]
    fn test_empty_input() {
        let poem = preprocess_poem("");
        assert_eq!(poem.stanza_count, 0);
        assert_eq!(poem.line_count, 0);
        assert!(poem.stanzas.is_empty());

        let poem = preprocess_poem("  \n\n  ");
        assert_eq!(poem.stanza_count, 0);
    }

    #[test]
    fn test_line_count_invariant() {
        let poem = preprocess_poem("a\nb\n\nc\n\nd\ne\nf");
        let total: usize = poem.stanzas.iter().map(|s| s.len()).sum();
        assert_eq!(poem.line_count, total);
    }

    #[test]
    fn test_roundtrip_idempotent() {
        let first = preprocess_poem("  One  two \r\n three\n\n\nFour\tfive\n");
        let rebuilt = first
            .stanzas
            .iter()
            .map(|s| s.join("\n"))
            .collect::<Vec<_>>()
            .join("\n\n");
        let second = preprocess_poem(&rebuilt);
        assert_eq!(first.stanza_count, second.stanza_count);
        assert_eq!(first.line_count, second.line_count);
        assert_eq!(first.stanzas, second.stanzas);
    }
}
