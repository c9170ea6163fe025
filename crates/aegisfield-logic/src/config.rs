//! Generator tuning values - loaded once per session and treated as
//! read-only by the control loop. Cached copies are re-read from the
//! shared handle whenever siege defaults need restoring.

use serde::{Deserialize, Serialize};

/// Operator-tunable bounds for one generator model.
///
/// Field power is the user-facing percentage slider; the grid modifier is
/// the damage-scaling value derived from it (lower = more protected).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Lowest selectable field power percentage.
    pub min_field_power: f32,
    /// Highest selectable field power percentage.
    pub max_field_power: f32,
    /// Grid modifier published at minimum field power.
    pub min_grid_modifier: f32,
    /// Grid modifier published at maximum field power.
    pub max_grid_modifier: f32,
    /// Whether siege mode is available on this generator model.
    pub siege_enabled: bool,
    /// Generation capacity the structure must exceed to enter siege.
    pub siege_min_power_req: f32,
    /// Length of an engaged siege, in simulation ticks.
    pub siege_duration_ticks: i32,
    /// Cooldown after siege ends, in simulation ticks.
    pub siege_cooldown_ticks: i32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_field_power: 0.0,
            max_field_power: 30.0,
            min_grid_modifier: 0.25,
            max_grid_modifier: 1.0,
            siege_enabled: true,
            siege_min_power_req: 150.0,
            siege_duration_ticks: 3600,
            siege_cooldown_ticks: 1800,
        }
    }
}

impl GeneratorConfig {
    /// Check the invariants the rest of the system assumes.
    ///
    /// The modifier mapping divides by the field power span, so the span
    /// must be strictly positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_field_power < self.max_field_power) {
            return Err(ConfigError::FieldPowerRange {
                min: self.min_field_power,
                max: self.max_field_power,
            });
        }
        if !(self.min_grid_modifier <= self.max_grid_modifier) {
            return Err(ConfigError::GridModifierRange {
                min: self.min_grid_modifier,
                max: self.max_grid_modifier,
            });
        }
        if self.siege_duration_ticks <= 0 {
            return Err(ConfigError::NonPositiveTimer("siege_duration_ticks"));
        }
        if self.siege_cooldown_ticks <= 0 {
            return Err(ConfigError::NonPositiveTimer("siege_cooldown_ticks"));
        }
        Ok(())
    }
}

/// Errors from [`GeneratorConfig::validate`].
#[derive(Debug)]
pub enum ConfigError {
    FieldPowerRange { min: f32, max: f32 },
    GridModifierRange { min: f32, max: f32 },
    NonPositiveTimer(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FieldPowerRange { min, max } => {
                write!(f, "field power range invalid: min {} must be below max {}", min, max)
            }
            ConfigError::GridModifierRange { min, max } => {
                write!(f, "grid modifier range invalid: min {} exceeds max {}", min, max)
            }
            ConfigError::NonPositiveTimer(name) => {
                write!(f, "{} must be positive", name)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
