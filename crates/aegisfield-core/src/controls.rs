//! User-facing control surface: siege toggle, field power slider, step
//! actions, and the enabler predicates the UI binds to.
//!
//! On the host, control calls commit directly after guard checks; on an
//! observer they become bus requests, so the authority split is visible
//! right here.

use aegisfield_logic::modifier;
use aegisfield_logic::siege::{self, SiegePhase, ToggleBlock};

use crate::context::Authority;
use crate::device::FieldGenerator;
use crate::notify::{NoticeLane, Severity};
use crate::structure::Structure;
use crate::sync::SyncMessage;

impl FieldGenerator {
    // ── Getters the UI binds to ─────────────────────────────────────────

    pub fn field_power(&self) -> f32 {
        self.state.field_power
    }

    pub fn grid_modifier(&self) -> f32 {
        self.state.grid_modifier
    }

    pub fn siege_requested(&self) -> bool {
        self.state.siege_requested
    }

    pub fn siege_phase(&self) -> SiegePhase {
        self.state.siege_phase
    }

    // ── Slider ──────────────────────────────────────────────────────────

    /// Slider setter: whole percentages, clamped to the configured range.
    pub fn set_field_power(&mut self, value: f32) {
        let clamped = modifier::clamp_field_power(value, &self.cfg);
        if clamped != self.state.field_power {
            self.state.field_power = clamped;
            self.arm_sync();
        }
    }

    /// Toolbar action: +1%.
    pub fn increase_field_power(&mut self, structure: &Structure) {
        self.step_field_power(1.0, structure);
    }

    /// Toolbar action: -1%.
    pub fn decrease_field_power(&mut self, structure: &Structure) {
        self.step_field_power(-1.0, structure);
    }

    fn step_field_power(&mut self, delta: f32, structure: &Structure) {
        if self.state.siege_requested || self.state.siege_phase.is_active() {
            self.status(
                NoticeLane::FieldPower,
                "Field power is locked during siege mode",
                Severity::Alert,
            );
            return;
        }
        if !self.is_working(structure) {
            self.status(NoticeLane::FieldPower, "Generator offline", Severity::Alert);
            return;
        }
        self.set_field_power(self.state.field_power + delta);
    }

    // ── Siege toggle ────────────────────────────────────────────────────

    /// Toggle entry point. Observers forward a request over the bus; the
    /// host applies the guards and commits.
    pub fn request_siege(&mut self, requested: bool) {
        match self.ctx.authority {
            Authority::Observer => {
                self.ctx.send(SyncMessage::SiegeRequest {
                    device: self.id(),
                    requested,
                });
            }
            Authority::Host => self.commit_siege_request(requested),
        }
    }

    /// Host-side guard-and-commit path, also used for bus requests.
    pub(crate) fn commit_siege_request(&mut self, requested: bool) {
        if !self.cfg.siege_enabled {
            return;
        }

        match siege::evaluate_toggle(
            self.state.siege_requested,
            self.state.siege_phase,
            self.state.cooldown_ticks_remaining,
        ) {
            Err(ToggleBlock::EngagedLock) => {
                self.status(
                    NoticeLane::FieldPower,
                    "Siege mode cannot be disengaged early",
                    Severity::Alert,
                );
            }
            Err(ToggleBlock::CoolingDown { seconds_remaining }) => {
                self.status(
                    NoticeLane::Countdown,
                    format!("Siege mode on cooldown: {} seconds", seconds_remaining),
                    Severity::Alert,
                );
            }
            Ok(()) => {
                if requested {
                    self.commit_siege_flag(true);
                }
            }
        }
    }

    /// Commit a new value for the replicated flag and broadcast it.
    pub(crate) fn commit_siege_flag(&mut self, value: bool) {
        if self.state.siege_requested == value {
            return;
        }
        self.state.siege_requested = value;
        self.ctx.send(SyncMessage::SiegeState {
            device: self.id(),
            requested: value,
        });
    }

    // ── Enabler predicates ──────────────────────────────────────────────

    /// Whether this generator model has siege mode at all.
    pub fn siege_available(&self) -> bool {
        self.cfg.siege_enabled
    }

    /// Whether the slider and step actions accept input.
    pub fn field_power_editable(&self) -> bool {
        !self.state.siege_requested && !self.state.siege_phase.is_active()
    }

    /// Whether the siege toggle accepts input.
    pub fn siege_toggle_editable(&self) -> bool {
        !self.state.siege_requested
            && !self.state.siege_phase.is_active()
            && !self.state.siege_phase.in_cooldown()
    }
}
