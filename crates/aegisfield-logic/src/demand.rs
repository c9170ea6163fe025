//! Power draw curve - answers the shared power distributor's "how much
//! input do you require right now" query.
//!
//! The caller is responsible for the non-functional case (a dead generator
//! draws nothing) and for refreshing the cached generation capacity before
//! asking; this module is the pure curve.

use crate::config::GeneratorConfig;
use crate::constants::power::{BASELINE_DRAW, FIELD_DRAW_FRACTION, SIEGE_DRAW_FRACTION};

/// Instantaneous draw in power units for a working generator.
///
/// - Zero field power outside siege costs the baseline draw alone.
/// - Siege claims nearly all available generation capacity.
/// - Otherwise the draw interpolates between the baseline and a fixed
///   fraction of available capacity, scaled by the slider ratio.
///
/// The interpolated branch keeps the doubled baseline term; the shipped
/// draw curve is tuned around it.
pub fn required_input(
    siege_active: bool,
    field_power: f32,
    max_available_power: f32,
    config: &GeneratorConfig,
) -> f32 {
    if field_power == 0.0 && !siege_active {
        return BASELINE_DRAW;
    }

    if siege_active {
        return siege_draw(max_available_power);
    }

    let base_usage = BASELINE_DRAW;
    let power_percentage = field_draw_cap(max_available_power);
    let ratio = field_power / config.max_field_power;

    base_usage + ((base_usage + (power_percentage - base_usage)) * ratio)
}

/// Draw while siege is engaged.
pub fn siege_draw(max_available_power: f32) -> f32 {
    max_available_power * SIEGE_DRAW_FRACTION
}

/// Upper end of the interpolated draw range.
pub fn field_draw_cap(max_available_power: f32) -> f32 {
    max_available_power * FIELD_DRAW_FRACTION
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GeneratorConfig {
        GeneratorConfig::default()
    }

    #[test]
    fn test_zero_field_power_draws_baseline() {
        assert_eq!(required_input(false, 0.0, 500.0, &config()), BASELINE_DRAW);
        // Available capacity is irrelevant at zero field power.
        assert_eq!(required_input(false, 0.0, 0.0, &config()), BASELINE_DRAW);
    }

    #[test]
    fn test_siege_claims_ninety_percent() {
        assert!((required_input(true, 0.0, 200.0, &config()) - 180.0).abs() < 1e-3);
        assert!((required_input(true, 15.0, 1000.0, &config()) - 900.0).abs() < 1e-3);
    }

    #[test]
    fn test_full_field_power_draw() {
        // ratio = 1, so draw = base + (base + (0.3 * max - base))
        // max = 200: 50 + (50 + (60 - 50)) = 110
        assert!((required_input(false, 30.0, 200.0, &config()) - 110.0).abs() < 1e-4);
    }

    #[test]
    fn test_half_field_power_draw() {
        // max = 200: cap = 60, ratio = 0.5, draw = 50 + 60 * 0.5 = 80
        assert!((required_input(false, 15.0, 200.0, &config()) - 80.0).abs() < 1e-4);
    }

    #[test]
    fn test_low_capacity_draw_sample() {
        // max = 100: cap = 30, fp = 10, ratio = 1/3,
        // draw = 50 + (50 + (30 - 50)) / 3 = 60
        assert!((required_input(false, 10.0, 100.0, &config()) - 60.0).abs() < 1e-4);
    }

    #[test]
    fn test_draw_matches_literal_formula() {
        let cfg = config();
        for &(fp, max) in &[(1.0f32, 75.0f32), (7.0, 320.0), (29.0, 42.5)] {
            let expected =
                BASELINE_DRAW + ((BASELINE_DRAW + (max * 0.3 - BASELINE_DRAW)) * (fp / cfg.max_field_power));
            assert_eq!(required_input(false, fp, max, &cfg), expected);
        }
    }
}
