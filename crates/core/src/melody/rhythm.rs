//! Stress-to-rhythm mapping.
//!
//! Each syllable gets a duration in eighth-note units from its stress
//! level, then the whole line is rescaled so its total fills complete
//! measures, with every value rounded back onto the note-length grid.

use crate::rng::SeededRng;

/// Durations a note may take after rounding, in eighth units.
pub const ALLOWED_DURATIONS: [f64; 5] = [0.5, 1.0, 2.0, 3.0, 4.0];

/// Chance a primary-stressed syllable stretches to three units.
const LONG_STRESS_CHANCE: f64 = 0.3;

/// Chance an unstressed syllable shrinks to a half unit.
const SHORT_UNSTRESSED_CHANCE: f64 = 0.25;

/// Map each stress character to a duration draw.
pub fn durations_for_stress(stress_pattern: &str, rng: &mut SeededRng) -> Vec<f64> {
    stress_pattern
        .chars()
        .map(|c| match c {
            '1' => {
                if rng.chance(LONG_STRESS_CHANCE) {
                    3.0
                } else {
                    2.0
                }
            }
            '2' => 2.0,
            _ => {
                if rng.chance(SHORT_UNSTRESSED_CHANCE) {
                    0.5
                } else {
                    1.0
                }
            }
        })
        .collect()
}

/// Round a value to the nearest allowed duration.
fn round_to_grid(value: f64) -> f64 {
    *ALLOWED_DURATIONS
        .iter()
        .min_by(|a, b| {
            (*a - value)
                .abs()
                .partial_cmp(&(*b - value).abs())
                .expect("durations are finite")
        })
        .expect("grid is non-empty")
}

/// Rescale line durations so the total is a whole number of measures.
///
/// The target is the next full measure above the raw total; each scaled
/// value then rounds back onto the grid, so the rounded total can sit
/// slightly off the exact multiple. The measure packer absorbs that.
pub fn fit_to_measures(durations: &[f64], measure_units: u32) -> Vec<f64> {
    let total: f64 = durations.iter().sum();
    if durations.is_empty() || total <= 0.0 {
        return durations.to_vec();
    }
    let measure = measure_units as f64;
    let target = (total / measure).ceil().max(1.0) * measure;
    let factor = target / total;
    durations.iter().map(|d| round_to_grid(d * factor)).collect()
}

/// Full rhythm pass for one line.
pub fn line_rhythm(
    stress_pattern: &str,
    measure_units: u32,
    rng: &mut SeededRng,
) -> Vec<f64> {
    let raw = durations_for_stress(stress_pattern, rng);
    fit_to_measures(&raw, measure_units)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stress_levels() {
        let mut rng = SeededRng::new(42);
        let durations = durations_for_stress("012", &mut rng);
        assert_eq!(durations.len(), 3);
        // Secondary stress is always two units
        assert!((durations[2] - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_durations_deterministic() {
        let mut a = SeededRng::new(7);
        let mut b = SeededRng::new(7);
        assert_eq!(
            durations_for_stress("0101100101", &mut a),
            durations_for_stress("0101100101", &mut b)
        );
    }

    #[test]
    fn test_primary_stress_longer_than_unstressed() {
        let mut rng = SeededRng::new(1);
        let durations = durations_for_stress("01", &mut rng);
        assert!(durations[1] >= 2.0);
        assert!(durations[0] <= 1.0);
    }

    #[test]
    fn test_round_to_grid() {
        assert!((round_to_grid(0.4) - 0.5).abs() < f64::EPSILON);
        assert!((round_to_grid(1.3) - 1.0).abs() < f64::EPSILON);
        assert!((round_to_grid(2.6) - 3.0).abs() < f64::EPSILON);
        assert!((round_to_grid(9.0) - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fit_scales_up_to_full_measure() {
        // Total 5 in 4/4 (8 units) scales toward 8
        let fitted = fit_to_measures(&[1.0, 2.0, 2.0], 8);
        let total: f64 = fitted.iter().sum();
        // 1.6, 3.2, 3.2 → 2, 3, 3 on the grid
        assert_eq!(fitted, vec![2.0, 3.0, 3.0]);
        assert!((total - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fit_exact_multiple_unchanged() {
        let fitted = fit_to_measures(&[2.0, 2.0, 2.0, 2.0], 8);
        assert_eq!(fitted, vec![2.0, 2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_fit_empty() {
        assert!(fit_to_measures(&[], 8).is_empty());
    }

    #[test]
    fn test_all_on_grid() {
        let mut rng = SeededRng::new(99);
        let fitted = line_rhythm("0101010101", 6, &mut rng);
        for d in fitted {
            assert!(ALLOWED_DURATIONS.iter().any(|a| (a - d).abs() < f64::EPSILON));
        }
    }
}
