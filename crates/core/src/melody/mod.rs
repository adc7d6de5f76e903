//! Melody synthesis: parameters, rhythm, contour, cadences, the
//! orchestrator, and the post-processing style/variation transforms.

pub mod cadence;
pub mod contour;
pub mod generate;
pub mod params;
pub mod pitch;
pub mod rhythm;
pub mod style;
pub mod validate;
pub mod variation;

pub use cadence::{generate_cadence, validate_cadence, CadenceType};
pub use generate::{adjust_melody_params, generate_melody, regenerate_melody, GenerateOptions};
pub use params::{MoodSuggestions, ParamOverrides};
pub use style::{apply_style, StylePreset};
pub use validate::validate_melody;
pub use variation::{apply_variation, invert, ornament, simplify, transpose};
