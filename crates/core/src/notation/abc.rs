//! ABC notation encoding.
//!
//! The header field order and music-line syntax are a compatibility
//! contract with the external rendering engine: X, T, M, L, Q, K, then
//! one bar-delimited music line, then the lyric line. Do not reorder.

use thiserror::Error;

use crate::melody::cadence::SUPPORTED_KEYS;
use crate::types::{measure_eighths, Melody};

/// Default note lengths the header accepts.
pub const SUPPORTED_NOTE_LENGTHS: [&str; 3] = ["1/8", "1/4", "1/16"];

/// Fatal encoding errors. These are constructional invariants: a melody
/// that trips one was never valid, and no partial output is returned.
#[derive(Debug, Error, PartialEq)]
pub enum NotationError {
    #[error("tempo must be positive")]
    InvalidTempo,
    #[error("note duration must be positive, got {0}")]
    InvalidDuration(f64),
    #[error("duration {0} cannot be expressed against the default note length")]
    UnrepresentableDuration(f64),
    #[error("invalid pitch letter {0:?}")]
    InvalidPitch(char),
    #[error("unsupported time signature {0:?}")]
    UnsupportedTimeSignature(String),
    #[error("unsupported key {0:?}")]
    UnsupportedKey(String),
    #[error("unsupported default note length {0:?}")]
    UnsupportedNoteLength(String),
    #[error("midi write failed: {0}")]
    MidiWrite(String),
}

/// Encode a pitch letter and relative octave as an ABC pitch.
///
/// Octave 0 is the uppercase letter, octave 1 lowercase; higher octaves
/// add apostrophes, lower octaves add commas. Rests encode as `z`.
pub fn pitch_to_abc(pitch: char, octave: i32) -> Result<String, NotationError> {
    if pitch == 'z' || pitch == 'Z' {
        return Ok("z".to_string());
    }
    let upper = pitch.to_ascii_uppercase();
    if !('A'..='G').contains(&upper) {
        return Err(NotationError::InvalidPitch(pitch));
    }

    let encoded = match octave {
        0 => upper.to_string(),
        1 => upper.to_ascii_lowercase().to_string(),
        o if o >= 2 => {
            let mut s = upper.to_ascii_lowercase().to_string();
            s.extend(std::iter::repeat('\'').take((o - 1) as usize));
            s
        }
        -1 => format!("{upper},"),
        o => {
            let mut s = upper.to_string();
            s.extend(std::iter::repeat(',').take((o.unsigned_abs() - 1) as usize));
            s
        }
    };
    Ok(encoded)
}

/// Encode a duration (in default-note-length units) as an ABC suffix.
///
/// A unit duration has no suffix; integer multiples are bare digits;
/// fractions reduce via GCD, with unit numerators abbreviated (`/2`).
pub fn duration_to_abc(duration: f64, default_note_length: &str) -> Result<String, NotationError> {
    if duration <= 0.0 {
        return Err(NotationError::InvalidDuration(duration));
    }
    if !SUPPORTED_NOTE_LENGTHS.contains(&default_note_length) {
        return Err(NotationError::UnsupportedNoteLength(
            default_note_length.to_string(),
        ));
    }

    let (num, den) = to_fraction(duration)
        .ok_or(NotationError::UnrepresentableDuration(duration))?;

    Ok(match (num, den) {
        (1, 1) => String::new(),
        (n, 1) => n.to_string(),
        (1, d) => format!("/{d}"),
        (n, d) => format!("{n}/{d}"),
    })
}

/// Reduce a positive duration to a small fraction.
fn to_fraction(duration: f64) -> Option<(u64, u64)> {
    for den in [1u64, 2, 4, 8, 16, 32, 64] {
        let scaled = duration * den as f64;
        if (scaled - scaled.round()).abs() < 1e-6 && scaled.round() >= 1.0 {
            let num = scaled.round() as u64;
            let g = gcd(num, den);
            return Some((num / g, den / g));
        }
    }
    None
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// Serialize a melody into the full ABC text.
pub fn melody_to_abc(melody: &Melody) -> Result<String, NotationError> {
    let params = &melody.params;
    if params.tempo == 0 {
        return Err(NotationError::InvalidTempo);
    }
    if measure_eighths(&params.time_signature).is_none() {
        return Err(NotationError::UnsupportedTimeSignature(
            params.time_signature.clone(),
        ));
    }
    if !SUPPORTED_KEYS.contains(&params.key.as_str()) {
        return Err(NotationError::UnsupportedKey(params.key.clone()));
    }
    if !SUPPORTED_NOTE_LENGTHS.contains(&params.default_note_length.as_str()) {
        return Err(NotationError::UnsupportedNoteLength(
            params.default_note_length.clone(),
        ));
    }

    let mut out = String::new();
    out.push_str("X:1\n");
    out.push_str(&format!("T:{}\n", params.title));
    out.push_str(&format!("M:{}\n", params.time_signature));
    out.push_str(&format!("L:{}\n", params.default_note_length));
    out.push_str(&format!("Q:1/4={}\n", params.tempo));
    out.push_str(&format!("K:{}\n", params.key));

    let mut bars: Vec<String> = Vec::new();
    for measure in &melody.measures {
        let mut bar = String::new();
        for note in measure {
            bar.push_str(&pitch_to_abc(note.pitch, note.octave)?);
            bar.push_str(&duration_to_abc(
                note.duration,
                &params.default_note_length,
            )?);
        }
        bars.push(bar);
    }
    out.push('|');
    out.push_str(&bars.join("|"));
    out.push_str("|]\n");

    if melody.lyrics.iter().flatten().any(|s| !s.is_empty()) {
        let rows: Vec<String> = melody.lyrics.iter().map(|row| row.join(" ")).collect();
        out.push_str(&format!("w: {}\n", rows.join("|")));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MelodyParams, Note};

    #[test]
    fn test_pitch_octaves() {
        assert_eq!(pitch_to_abc('C', 0).unwrap(), "C");
        assert_eq!(pitch_to_abc('C', 1).unwrap(), "c");
        assert_eq!(pitch_to_abc('C', 2).unwrap(), "c'");
        assert_eq!(pitch_to_abc('C', 3).unwrap(), "c''");
        assert_eq!(pitch_to_abc('C', -1).unwrap(), "C,");
        assert_eq!(pitch_to_abc('C', -3).unwrap(), "C,,");
    }

    #[test]
    fn test_pitch_rest() {
        assert_eq!(pitch_to_abc('z', 0).unwrap(), "z");
        assert_eq!(pitch_to_abc('Z', 5).unwrap(), "z");
    }

    #[test]
    fn test_pitch_invalid() {
        assert_eq!(pitch_to_abc('H', 0), Err(NotationError::InvalidPitch('H')));
    }

    #[test]
    fn test_duration_suffixes() {
        assert_eq!(duration_to_abc(1.0, "1/8").unwrap(), "");
        assert_eq!(duration_to_abc(2.0, "1/8").unwrap(), "2");
        assert_eq!(duration_to_abc(4.0, "1/8").unwrap(), "4");
        assert_eq!(duration_to_abc(0.5, "1/8").unwrap(), "/2");
        assert_eq!(duration_to_abc(0.25, "1/8").unwrap(), "/4");
        assert_eq!(duration_to_abc(1.5, "1/8").unwrap(), "3/2");
        assert_eq!(duration_to_abc(2.5, "1/8").unwrap(), "5/2");
    }

    #[test]
    fn test_duration_invalid() {
        assert_eq!(
            duration_to_abc(0.0, "1/8"),
            Err(NotationError::InvalidDuration(0.0))
        );
        assert!(duration_to_abc(-1.0, "1/8").is_err());
        assert_eq!(
            duration_to_abc(1.0, "1/3"),
            Err(NotationError::UnsupportedNoteLength("1/3".to_string()))
        );
    }

    fn sample_melody() -> Melody {
        Melody {
            params: MelodyParams {
                title: "Sample".into(),
                time_signature: "4/4".into(),
                default_note_length: "1/8".into(),
                tempo: 100,
                key: "C".into(),
            },
            measures: vec![
                vec![Note::new('C', 0, 2.0), Note::new('D', 0, 2.0), Note::new('E', 0, 4.0)],
                vec![Note::new('G', 0, 4.0), Note::rest(4.0)],
            ],
            lyrics: vec![
                vec!["ro-".into(), "ses".into(), "are".into()],
                vec!["red".into(), String::new()],
            ],
        }
    }

    #[test]
    fn test_header_order() {
        let abc = melody_to_abc(&sample_melody()).unwrap();
        let lines: Vec<&str> = abc.lines().collect();
        assert_eq!(lines[0], "X:1");
        assert_eq!(lines[1], "T:Sample");
        assert_eq!(lines[2], "M:4/4");
        assert_eq!(lines[3], "L:1/8");
        assert_eq!(lines[4], "Q:1/4=100");
        assert_eq!(lines[5], "K:C");
    }

    #[test]
    fn test_music_line() {
        let abc = melody_to_abc(&sample_melody()).unwrap();
        let music = abc.lines().nth(6).unwrap();
        assert_eq!(music, "|C2D2E4|G4z4|]");
    }

    #[test]
    fn test_lyric_line() {
        let abc = melody_to_abc(&sample_melody()).unwrap();
        let lyric = abc.lines().nth(7).unwrap();
        assert_eq!(lyric, "w: ro- ses are|red ");
    }

    #[test]
    fn test_no_lyric_line_when_empty() {
        let mut melody = sample_melody();
        for row in melody.lyrics.iter_mut() {
            for slot in row.iter_mut() {
                slot.clear();
            }
        }
        let abc = melody_to_abc(&melody).unwrap();
        assert!(!abc.contains("w:"));
    }

    #[test]
    fn test_invalid_params_fail() {
        let mut melody = sample_melody();
        melody.params.tempo = 0;
        assert_eq!(melody_to_abc(&melody), Err(NotationError::InvalidTempo));

        let mut melody = sample_melody();
        melody.params.time_signature = "5/4".into();
        assert!(matches!(
            melody_to_abc(&melody),
            Err(NotationError::UnsupportedTimeSignature(_))
        ));

        let mut melody = sample_melody();
        melody.params.key = "B#".into();
        assert!(matches!(
            melody_to_abc(&melody),
            Err(NotationError::UnsupportedKey(_))
        ));
    }

    #[test]
    fn test_invalid_note_fails_whole_encoding() {
        let mut melody = sample_melody();
        melody.measures[0][0].pitch = 'Q';
        assert!(matches!(
            melody_to_abc(&melody),
            Err(NotationError::InvalidPitch('Q'))
        ));
    }
}
