//! Siege mode driver - walks the phase machine each cycle.
//!
//! Entry and sustain decisions come from `aegisfield_logic::siege`; this
//! module applies their consequences to the device and the structure:
//! auxiliary shutdown, the anchoring velocity inversion, countdown notices,
//! and the cooldown handoff.

use aegisfield_logic::constants::modifier::DISABLED;
use aegisfield_logic::constants::siege::{DISPLAY_TICKS_PER_SECOND, OVERRIDE_MODIFIER};
use aegisfield_logic::siege::{self, ActivationBlock, Disengage, SiegePhase};

use crate::components::Vec3;
use crate::device::FieldGenerator;
use crate::notify::{NoticeLane, Severity};
use crate::structure::Structure;

impl FieldGenerator {
    /// One siege evaluation, run every cycle while siege is configured on.
    pub(crate) fn siege_step(&mut self, structure: &mut Structure) {
        match self.state.siege_phase {
            SiegePhase::Idle => self.siege_idle_step(structure),
            SiegePhase::Active => self.siege_active_step(structure),
            // Cooldown runs on the control-cycle cadence.
            SiegePhase::CooldownPending | SiegePhase::Cooldown => {}
        }
    }

    fn siege_idle_step(&mut self, structure: &mut Structure) {
        if !self.state.siege_requested {
            return;
        }

        match siege::evaluate_activation(
            self.is_working(structure),
            self.state.max_available_power,
            &self.cfg,
        ) {
            Ok(()) => self.enter_siege(structure),
            Err(ActivationBlock::InsufficientPower) => {
                self.status(NoticeLane::Countdown, "Insufficient power", Severity::Alert);
                self.commit_siege_flag(false);
            }
            Err(ActivationBlock::GeneratorOffline) => {
                self.status(NoticeLane::Countdown, "Generator offline", Severity::Alert);
                self.commit_siege_flag(false);
            }
        }
    }

    fn enter_siege(&mut self, structure: &mut Structure) {
        self.state.siege_phase = SiegePhase::Active;
        if siege::override_engages(self.state.max_available_power) {
            structure.set_damage_modifier(OVERRIDE_MODIFIER);
            self.state.reference_modifier = OVERRIDE_MODIFIER;
            self.state.modifier_override = true;
        }
    }

    fn siege_active_step(&mut self, structure: &mut Structure) {
        if let Some(reason) = siege::evaluate_sustain(
            self.is_working(structure),
            self.state.max_available_power,
            self.state.siege_ticks_remaining,
            &self.cfg,
        ) {
            self.exit_siege(structure, reason);
            return;
        }

        // Re-applied every cycle so blocks switched back on mid-siege are
        // suppressed again.
        structure.shutdown_auxiliaries();

        if structure.velocity != Vec3::ZERO {
            structure.velocity = -structure.velocity;
        }

        self.state.siege_ticks_remaining -= 1;
        self.state.display_tick_accumulator -= 1;
        if self.state.display_tick_accumulator <= 0 {
            self.state.display_tick_accumulator = DISPLAY_TICKS_PER_SECOND;
            self.state.visible_seconds_remaining -= 1;
            let text = format!("Siege mode: {} seconds", self.state.visible_seconds_remaining);
            self.broadcast_notice(NoticeLane::Countdown, text, Severity::Info);
        }
    }

    fn exit_siege(&mut self, structure: &mut Structure, reason: Disengage) {
        // Restore config-derived defaults, then hand the structure back.
        self.reload_config();
        structure.set_damage_modifier(DISABLED);
        self.state.reference_modifier = DISABLED;
        structure.reboot_auxiliaries();

        let text = match reason {
            Disengage::Expired => "Siege mode disengaged",
            Disengage::GeneratorOffline => "Generator inoperative! Siege mode disengaged",
            Disengage::InsufficientPower => "Insufficient power! Siege mode disengaged",
        };
        self.broadcast_notice(NoticeLane::Countdown, text, Severity::Alert);

        self.commit_siege_flag(false);
        self.state.modifier_override = false;
        self.state.siege_phase = SiegePhase::CooldownPending;
    }
}
