//! Standard MIDI file export.
//!
//! Symbolic output only: one melody track plus tempo, eighth units
//! mapped onto a fixed tick grid. Rests advance time without events.

use midly::{
    num::{u15, u24, u28, u4, u7},
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind,
};

use crate::melody::pitch::semitone_value;
use crate::notation::abc::NotationError;
use crate::types::{measure_eighths, Melody};

/// Ticks per quarter note.
const TICKS_PER_QUARTER: u16 = 480;

/// Ticks per eighth-unit of duration.
const TICKS_PER_EIGHTH: f64 = TICKS_PER_QUARTER as f64 / 2.0;

/// MIDI note number of the melody's middle octave C.
const MIDDLE_C: i32 = 60;

/// Serialize a melody to Standard MIDI File bytes.
pub fn melody_to_midi(melody: &Melody) -> Result<Vec<u8>, NotationError> {
    if melody.params.tempo == 0 {
        return Err(NotationError::InvalidTempo);
    }
    if measure_eighths(&melody.params.time_signature).is_none() {
        return Err(NotationError::UnsupportedTimeSignature(
            melody.params.time_signature.clone(),
        ));
    }

    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));

    let mut track: Vec<TrackEvent> = Vec::new();
    // u24 caps the tempo meta at ~3.6 BPM; slower clamps rather than panics
    let tempo_microseconds = (60_000_000 / melody.params.tempo).min(0x00ff_ffff);
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo_microseconds))),
    });

    let channel = u4::new(0);
    let mut pending_rest_ticks: u32 = 0;

    for note in melody.measures.iter().flatten() {
        if note.duration <= 0.0 {
            return Err(NotationError::InvalidDuration(note.duration));
        }
        let ticks = (note.duration * TICKS_PER_EIGHTH).round() as u32;

        match semitone_value(note) {
            None if note.is_rest() => {
                pending_rest_ticks += ticks;
            }
            None => return Err(NotationError::InvalidPitch(note.pitch)),
            Some(value) => {
                let key = u7::new((MIDDLE_C + value).clamp(0, 127) as u8);
                track.push(TrackEvent {
                    delta: u28::new(pending_rest_ticks),
                    kind: TrackEventKind::Midi {
                        channel,
                        message: MidiMessage::NoteOn {
                            key,
                            vel: u7::new(80),
                        },
                    },
                });
                track.push(TrackEvent {
                    delta: u28::new(ticks),
                    kind: TrackEventKind::Midi {
                        channel,
                        message: MidiMessage::NoteOff {
                            key,
                            vel: u7::new(0),
                        },
                    },
                });
                pending_rest_ticks = 0;
            }
        }
    }

    track.push(TrackEvent {
        delta: u28::new(pending_rest_ticks),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    smf.tracks.push(track);

    let mut buf = Vec::new();
    smf.write(&mut buf)
        .map_err(|e| NotationError::MidiWrite(e.to_string()))?;
    Ok(buf)
}
