//! Melody variations: ornament, simplify, invert, transpose.
//!
//! Every variation is a pure transform — clone, modify, return — and
//! rests always pass through untouched. An unrecognized variation name
//! falls back to an identity clone so callers can compose freely.

use crate::melody::generate::pack_measures;
use crate::melody::pitch::{
    diatonic_index, from_diatonic_index, from_semitone_value, semitone_value, shape_seed,
};
use crate::rng::SeededRng;
use crate::types::{Melody, Note};

/// Grace-note duration in eighth units.
const GRACE_DURATION: f64 = 0.5;

/// Passing-tone duration in eighth units.
const PASSING_DURATION: f64 = 1.0;

/// Diatonic gap at which a leap earns a passing tone.
const PASSING_GAP: i32 = 3;

/// Apply a variation by name; unknown names return an identity clone.
pub fn apply_variation(melody: &Melody, name: &str) -> Melody {
    match name.to_lowercase().as_str() {
        "ornament" => ornament(melody, 0.4),
        "simplify" => simplify(melody),
        "invert" => invert(melody, None),
        "transpose" => transpose(melody, 0),
        other => {
            log::warn!("unknown variation {other:?}, returning melody unchanged");
            melody.clone()
        }
    }
}

/// Decorate a melody with neighbor grace notes and passing tones.
///
/// Grace notes land before roughly half of the probability-gated notes;
/// passing tones fill leaps of three or more scale degrees. Both borrow
/// their duration from the following main note, so the total length is
/// preserved.
pub fn ornament(melody: &Melody, probability: f64) -> Melody {
    let mut rng = SeededRng::new(shape_seed(melody));
    let notes: Vec<Note> = melody.measures.iter().flatten().cloned().collect();
    let lyrics: Vec<String> = melody.lyrics.iter().flatten().cloned().collect();

    let mut out_notes: Vec<Note> = Vec::new();
    let mut out_lyrics: Vec<String> = Vec::new();
    let mut prev_pitched: Option<i32> = None;

    for (mut note, lyric) in notes.into_iter().zip(lyrics.into_iter()) {
        if let Some(current) = diatonic_index(&note) {
            // Passing tone across a leap, borrowed from this note
            if let Some(prev) = prev_pitched {
                let gap = current - prev;
                if gap.abs() >= PASSING_GAP && note.duration - PASSING_DURATION >= GRACE_DURATION
                {
                    let mid = prev + gap / 2;
                    let (pitch, octave) = from_diatonic_index(mid);
                    out_notes.push(Note::new(pitch, octave, PASSING_DURATION));
                    out_lyrics.push(String::new());
                    note.duration -= PASSING_DURATION;
                }
            }

            // Neighbor grace note, gated then coin-flipped
            if rng.chance(probability * 0.5) && note.duration - GRACE_DURATION >= GRACE_DURATION
            {
                let direction = if rng.chance(0.5) { 1 } else { -1 };
                let (pitch, octave) = from_diatonic_index(current + direction);
                out_notes.push(Note::new(pitch, octave, GRACE_DURATION));
                out_lyrics.push(String::new());
                note.duration -= GRACE_DURATION;
            }

            prev_pitched = Some(current);
        }
        out_notes.push(note);
        out_lyrics.push(lyric);
    }

    repack(melody, out_notes, out_lyrics)
}

/// Strip a melody down: fold sub-unit notes into their predecessor,
/// merge repeated pitches, and hold every surviving note at least a
/// quarter's worth.
pub fn simplify(melody: &Melody) -> Melody {
    let notes: Vec<Note> = melody.measures.iter().flatten().cloned().collect();
    let lyrics: Vec<String> = melody.lyrics.iter().flatten().cloned().collect();

    let mut out_notes: Vec<Note> = Vec::new();
    let mut out_lyrics: Vec<String> = Vec::new();

    for (note, lyric) in notes.into_iter().zip(lyrics.into_iter()) {
        if note.is_rest() {
            out_notes.push(note);
            out_lyrics.push(lyric);
            continue;
        }

        let prev_pitched = out_notes.last().map(|n| !n.is_rest()).unwrap_or(false);
        if prev_pitched {
            let prev = out_notes.last_mut().expect("non-empty");
            // Fold short notes into the predecessor
            if note.duration < 1.0 {
                prev.duration += note.duration;
                continue;
            }
            // Merge repeated pitches
            if prev.pitch == note.pitch && prev.octave == note.octave {
                prev.duration += note.duration;
                continue;
            }
        }
        out_notes.push(note);
        out_lyrics.push(lyric);
    }

    for note in out_notes.iter_mut() {
        if !note.is_rest() {
            note.duration = note.duration.max(2.0);
        }
    }

    repack(melody, out_notes, out_lyrics)
}

/// Reflect every pitched note around a pivot.
///
/// The pivot is the caller's (pitch, octave), or the midpoint of the
/// melody's own range when absent. Durations, rests, and measure
/// grouping are preserved.
pub fn invert(melody: &Melody, pivot: Option<(char, i32)>) -> Melody {
    let pivot_doubled: Option<i32> = match pivot {
        Some((pitch, octave)) => semitone_value(&Note::new(pitch, octave, 1.0)).map(|v| 2 * v),
        None => {
            let values: Vec<i32> = melody
                .measures
                .iter()
                .flatten()
                .filter_map(semitone_value)
                .collect();
            match (values.iter().min(), values.iter().max()) {
                (Some(&min), Some(&max)) => Some(min + max),
                _ => None,
            }
        }
    };
    let Some(pivot_doubled) = pivot_doubled else {
        return melody.clone();
    };

    let mut inverted = melody.clone();
    for note in inverted.measures.iter_mut().flatten() {
        if let Some(value) = semitone_value(note) {
            let (pitch, octave) = from_semitone_value(pivot_doubled - value);
            note.pitch = pitch;
            note.octave = octave;
        }
    }
    inverted
}

/// Shift every pitched note by a signed number of semitones.
///
/// Shift zero is an identity clone; any other shift annotates the title.
pub fn transpose(melody: &Melody, semitones: i32) -> Melody {
    if semitones == 0 {
        return melody.clone();
    }

    let mut transposed = melody.clone();
    for note in transposed.measures.iter_mut().flatten() {
        if let Some(value) = semitone_value(note) {
            let (pitch, octave) = from_semitone_value(value + semitones);
            note.pitch = pitch;
            note.octave = octave;
        }
    }
    transposed.params.title = format!(
        "{} (transposed {semitones:+} semitones)",
        transposed.params.title
    );
    transposed
}

fn repack(melody: &Melody, notes: Vec<Note>, lyrics: Vec<String>) -> Melody {
    let capacity = melody.params.measure_eighths().unwrap_or(8) as f64;
    let (measures, lyric_rows) = pack_measures(notes, lyrics, capacity);
    Melody {
        params: melody.params.clone(),
        measures,
        lyrics: lyric_rows,
    }
}
