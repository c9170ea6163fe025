//! Field power → grid damage modifier mapping.
//!
//! The modifier is a multiplicative damage scale applied to the whole
//! structure; the publisher in the core crate de-duplicates writes of the
//! values computed here.

use crate::config::GeneratorConfig;

/// Round to two decimal places - the published precision of the modifier.
pub fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

/// Normalize a slider input: whole percentages only, clamped to the
/// configured range.
pub fn clamp_field_power(value: f32, config: &GeneratorConfig) -> f32 {
    value
        .floor()
        .clamp(config.min_field_power, config.max_field_power)
}

/// Map field power linearly onto the configured modifier range, rounded
/// to two decimals and clamped.
pub fn grid_modifier(field_power: f32, config: &GeneratorConfig) -> f32 {
    let span = config.max_field_power - config.min_field_power;
    let ratio = (field_power - config.min_field_power) / span;
    let raw = config.min_grid_modifier + ratio * (config.max_grid_modifier - config.min_grid_modifier);

    round2(raw).clamp(config.min_grid_modifier, config.max_grid_modifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GeneratorConfig {
        GeneratorConfig {
            min_field_power: 0.0,
            max_field_power: 30.0,
            min_grid_modifier: 0.25,
            max_grid_modifier: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_endpoints_map_to_modifier_bounds() {
        let cfg = config();
        assert_eq!(grid_modifier(0.0, &cfg), 0.25);
        assert_eq!(grid_modifier(30.0, &cfg), 1.0);
    }

    #[test]
    fn test_modifier_stays_in_bounds() {
        let cfg = config();
        let mut fp = cfg.min_field_power;
        while fp <= cfg.max_field_power {
            let m = grid_modifier(fp, &cfg);
            assert!(m >= cfg.min_grid_modifier && m <= cfg.max_grid_modifier, "fp={}", fp);
            fp += 1.0;
        }
    }

    #[test]
    fn test_modifier_monotonic_in_field_power() {
        let cfg = config();
        let mut previous = grid_modifier(cfg.min_field_power, &cfg);
        let mut fp = cfg.min_field_power + 1.0;
        while fp <= cfg.max_field_power {
            let m = grid_modifier(fp, &cfg);
            assert!(m >= previous, "not monotonic at fp={}", fp);
            previous = m;
            fp += 1.0;
        }
    }

    #[test]
    fn test_modifier_rounded_to_two_decimals() {
        let cfg = config();
        // 7/30 of the 0.75 span is 0.175 over 0.25 → 0.425, rounds to 0.43
        assert_eq!(grid_modifier(7.0, &cfg), 0.43);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(0.424_999), 0.42);
        assert_eq!(round2(0.425_001), 0.43);
        assert_eq!(round2(1.0), 1.0);
    }

    #[test]
    fn test_clamp_field_power_floors_and_clamps() {
        let cfg = config();
        assert_eq!(clamp_field_power(12.7, &cfg), 12.0);
        assert_eq!(clamp_field_power(-3.0, &cfg), 0.0);
        assert_eq!(clamp_field_power(99.0, &cfg), 30.0);
    }

    #[test]
    fn test_offset_field_power_range() {
        let cfg = GeneratorConfig {
            min_field_power: 10.0,
            max_field_power: 20.0,
            min_grid_modifier: 0.5,
            max_grid_modifier: 0.9,
            ..Default::default()
        };
        assert_eq!(grid_modifier(10.0, &cfg), 0.5);
        assert_eq!(grid_modifier(15.0, &cfg), 0.7);
        assert_eq!(grid_modifier(20.0, &cfg), 0.9);
    }
}
