//! Modifier publisher - maps field power to the grid damage modifier and
//! writes it to the structure only when it changes.
//!
//! While siege is active the steep override owns the value and the
//! publisher stays out of the way.

use aegisfield_logic::constants::modifier::DISABLED;
use aegisfield_logic::modifier;

use crate::device::FieldGenerator;
use crate::notify::{NoticeLane, Severity};
use crate::structure::Structure;

impl FieldGenerator {
    /// Per-cycle publication step.
    pub(crate) fn publish_modifier(&mut self, structure: &mut Structure) {
        if self.state.siege_phase.is_active() {
            return;
        }

        if !self.is_working(structure) {
            // A dead generator projects no field: zero the slider and
            // publish the neutral modifier unconditionally.
            if self.state.field_power > 0.0 {
                self.state.field_power = 0.0;
                self.state.grid_modifier = DISABLED;
                self.arm_sync();
                structure.set_damage_modifier(DISABLED);
                self.state.reference_modifier = DISABLED;
            }
            return;
        }

        if self.state.max_available_power <= self.cfg.siege_min_power_req {
            // Not enough generation to project a field. Edge-triggered so
            // the notice lane is not flooded while underpowered.
            if self.state.grid_modifier != DISABLED {
                self.status(NoticeLane::FieldPower, "Insufficient power", Severity::Alert);
                self.state.grid_modifier = DISABLED;
                self.arm_sync();
            }
            return;
        }

        let new_modifier = modifier::grid_modifier(self.state.field_power, &self.cfg);
        if new_modifier != self.state.grid_modifier {
            self.state.grid_modifier = new_modifier;
            self.arm_sync();
        }

        if new_modifier == self.state.reference_modifier {
            return;
        }

        structure.set_damage_modifier(new_modifier);
        self.state.reference_modifier = new_modifier;
        self.status(
            NoticeLane::FieldPower,
            format!("Integrity field power: {}%", self.state.field_power as i32),
            Severity::Info,
        );
    }
}
