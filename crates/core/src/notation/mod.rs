//! Output encodings: ABC notation text and Standard MIDI files.

pub mod abc;
pub mod midi;

pub use abc::{duration_to_abc, melody_to_abc, pitch_to_abc, NotationError};
pub use midi::melody_to_midi;
