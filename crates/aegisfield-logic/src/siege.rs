//! Siege phase type and the guard decisions that drive it.
//!
//! The stateful driver lives in the core crate; everything here is a pure
//! decision over plain inputs so the guard table can be tested exhaustively.

use serde::{Deserialize, Serialize};

use crate::config::GeneratorConfig;
use crate::constants::siege::{DISPLAY_TICKS_PER_SECOND, OVERRIDE_POWER_FLOOR};

/// Lifecycle phase of siege mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiegePhase {
    /// Not engaged; activation requests are evaluated here.
    Idle,
    /// Engaged: auxiliaries down, countdown running.
    Active,
    /// Just disengaged; cooldown starts on the next control cycle.
    CooldownPending,
    /// Cooldown counting down at control-cycle cadence.
    Cooldown,
}

impl SiegePhase {
    pub fn is_active(self) -> bool {
        matches!(self, SiegePhase::Active)
    }

    /// True while the cooldown lockout applies to the toggle.
    pub fn in_cooldown(self) -> bool {
        matches!(self, SiegePhase::CooldownPending | SiegePhase::Cooldown)
    }
}

/// Why an activation attempt was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationBlock {
    /// Generation capacity at or below the configured threshold.
    InsufficientPower,
    /// The generator block itself is disabled or destroyed.
    GeneratorOffline,
}

/// Entry guard for `Idle → Active`. Power is checked before the working
/// state so an underpowered structure reports the actionable problem.
pub fn evaluate_activation(
    working: bool,
    max_available_power: f32,
    config: &GeneratorConfig,
) -> Result<(), ActivationBlock> {
    if max_available_power <= config.siege_min_power_req {
        return Err(ActivationBlock::InsufficientPower);
    }
    if !working {
        return Err(ActivationBlock::GeneratorOffline);
    }
    Ok(())
}

/// Why a toggle attempt was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleBlock {
    /// Siege is requested or running; it cannot be disengaged early.
    EngagedLock,
    /// Cooldown lockout, with the remaining wait for display.
    CoolingDown { seconds_remaining: i32 },
}

/// Guard for the user-facing siege toggle.
pub fn evaluate_toggle(
    siege_requested: bool,
    phase: SiegePhase,
    cooldown_ticks_remaining: i32,
) -> Result<(), ToggleBlock> {
    if siege_requested {
        return Err(ToggleBlock::EngagedLock);
    }
    if phase.in_cooldown() {
        return Err(ToggleBlock::CoolingDown {
            seconds_remaining: cooldown_seconds(cooldown_ticks_remaining),
        });
    }
    Ok(())
}

/// Why an engaged siege must disengage this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disengage {
    /// Countdown ran out - the normal exit.
    Expired,
    /// The generator went non-functional mid-siege.
    GeneratorOffline,
    /// Generation capacity dropped to or below the threshold mid-siege.
    InsufficientPower,
}

/// Sustain guard, evaluated each cycle while `Active`.
pub fn evaluate_sustain(
    working: bool,
    max_available_power: f32,
    ticks_remaining: i32,
    config: &GeneratorConfig,
) -> Option<Disengage> {
    if !working {
        return Some(Disengage::GeneratorOffline);
    }
    if max_available_power <= config.siege_min_power_req {
        return Some(Disengage::InsufficientPower);
    }
    if ticks_remaining <= 0 {
        return Some(Disengage::Expired);
    }
    None
}

/// Whether the steep damage-modifier override engages on siege entry.
pub fn override_engages(max_available_power: f32) -> bool {
    max_available_power > OVERRIDE_POWER_FLOOR
}

/// Countdown seconds shown to observers for a given siege length.
pub fn visible_seconds(duration_ticks: i32) -> i32 {
    duration_ticks / DISPLAY_TICKS_PER_SECOND
}

/// Remaining cooldown reported by the toggle, in seconds.
pub fn cooldown_seconds(ticks_remaining: i32) -> i32 {
    ticks_remaining / 60
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GeneratorConfig {
        GeneratorConfig {
            siege_min_power_req: 100.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_activation_requires_power_margin() {
        let cfg = config();
        assert_eq!(
            evaluate_activation(true, 100.0, &cfg),
            Err(ActivationBlock::InsufficientPower)
        );
        assert_eq!(
            evaluate_activation(true, 50.0, &cfg),
            Err(ActivationBlock::InsufficientPower)
        );
        assert_eq!(evaluate_activation(true, 100.1, &cfg), Ok(()));
    }

    #[test]
    fn test_activation_requires_working_generator() {
        let cfg = config();
        assert_eq!(
            evaluate_activation(false, 200.0, &cfg),
            Err(ActivationBlock::GeneratorOffline)
        );
    }

    #[test]
    fn test_insufficient_power_reported_before_offline() {
        let cfg = config();
        assert_eq!(
            evaluate_activation(false, 50.0, &cfg),
            Err(ActivationBlock::InsufficientPower)
        );
    }

    #[test]
    fn test_toggle_locked_while_requested() {
        assert_eq!(
            evaluate_toggle(true, SiegePhase::Active, 0),
            Err(ToggleBlock::EngagedLock)
        );
        assert_eq!(
            evaluate_toggle(true, SiegePhase::Idle, 0),
            Err(ToggleBlock::EngagedLock)
        );
    }

    #[test]
    fn test_toggle_locked_during_cooldown() {
        assert_eq!(
            evaluate_toggle(false, SiegePhase::Cooldown, 600),
            Err(ToggleBlock::CoolingDown { seconds_remaining: 10 })
        );
        assert_eq!(
            evaluate_toggle(false, SiegePhase::CooldownPending, 1800),
            Err(ToggleBlock::CoolingDown { seconds_remaining: 30 })
        );
    }

    #[test]
    fn test_toggle_allowed_when_idle() {
        assert_eq!(evaluate_toggle(false, SiegePhase::Idle, 0), Ok(()));
    }

    #[test]
    fn test_sustain_priorities() {
        let cfg = config();
        // Offline outranks power loss, which outranks expiry.
        assert_eq!(
            evaluate_sustain(false, 50.0, 0, &cfg),
            Some(Disengage::GeneratorOffline)
        );
        assert_eq!(
            evaluate_sustain(true, 50.0, 0, &cfg),
            Some(Disengage::InsufficientPower)
        );
        assert_eq!(
            evaluate_sustain(true, 200.0, 0, &cfg),
            Some(Disengage::Expired)
        );
        assert_eq!(evaluate_sustain(true, 200.0, 1, &cfg), None);
    }

    #[test]
    fn test_override_floor() {
        assert!(!override_engages(150.0));
        assert!(override_engages(150.1));
    }

    #[test]
    fn test_display_math() {
        assert_eq!(visible_seconds(3600), 60);
        assert_eq!(visible_seconds(600), 10);
        assert_eq!(cooldown_seconds(1795), 29);
    }
}
