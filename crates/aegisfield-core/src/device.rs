//! The field generator device - state, lifecycle, and power demand.
//!
//! One `FieldGenerator` owns the authoritative state for one generator
//! block. The control loop drives it through a fixed phase order each
//! cycle; everything here completes within the callback that invoked it.

use hecs::Entity;
use serde::{Deserialize, Serialize};

use aegisfield_logic::config::GeneratorConfig;
use aegisfield_logic::constants::cadence::CONTROL_CYCLE_STEP;
use aegisfield_logic::constants::power::BASELINE_DRAW;
use aegisfield_logic::constants::siege::DISPLAY_TICKS_PER_SECOND;
use aegisfield_logic::{demand, modifier, siege};

use crate::context::{DeviceContext, DeviceId};
use crate::notify::{Notice, NoticeLane, Severity};
use crate::persistence::{
    decode_settings, encode_settings, SavedSettings, SettingsStore, StorageError,
};
use crate::structure::Structure;
use crate::sync::SyncMessage;

/// Mutable device state. The authoritative copy lives on the host;
/// observers hold [`crate::sync::ReplicaView`] projections instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorState {
    /// User-set percentage, whole-valued, clamped to the configured range.
    pub field_power: f32,
    /// Derived damage modifier, rounded to 2 decimals.
    pub grid_modifier: f32,
    /// Replicated request flag; the host commits phase changes.
    pub siege_requested: bool,
    pub siege_phase: siege::SiegePhase,
    pub siege_ticks_remaining: i32,
    pub cooldown_ticks_remaining: i32,
    /// Sub-counter pacing the once-per-second countdown notices.
    pub display_tick_accumulator: i32,
    pub visible_seconds_remaining: i32,
    /// Cached sum of producer outputs; recomputed, never persisted.
    pub max_available_power: f32,
    /// Last modifier actually written to the structure - dedup guard.
    pub reference_modifier: f32,
    /// Control cycles until the next settings flush; 0 = nothing pending.
    pub pending_sync_ticks: i32,
    /// Rated draw recorded for UI display on the last demand query.
    pub required_input_display: f32,
    /// The steep siege override currently owns the damage modifier.
    pub modifier_override: bool,
}

impl GeneratorState {
    fn new() -> Self {
        Self {
            field_power: 0.0,
            grid_modifier: 0.0,
            siege_requested: false,
            siege_phase: siege::SiegePhase::Idle,
            siege_ticks_remaining: 0,
            cooldown_ticks_remaining: 0,
            display_tick_accumulator: 0,
            visible_seconds_remaining: 0,
            max_available_power: 0.0,
            reference_modifier: 0.0,
            pending_sync_ticks: 0,
            required_input_display: 0.0,
            modifier_override: false,
        }
    }
}

/// One integrity-field generator attached to a structure.
pub struct FieldGenerator {
    id: DeviceId,
    block: Entity,
    pub(crate) ctx: DeviceContext,
    /// Session config cache; re-read via [`Self::reload_config`].
    pub(crate) cfg: GeneratorConfig,
    pub(crate) state: GeneratorState,
    initialized: bool,
}

impl FieldGenerator {
    pub fn new(id: DeviceId, block: Entity, ctx: DeviceContext) -> Self {
        let cfg = (*ctx.config).clone();
        Self {
            id,
            block,
            ctx,
            cfg,
            state: GeneratorState::new(),
            initialized: false,
        }
    }

    pub fn id(&self) -> DeviceId {
        self.id
    }

    pub fn block(&self) -> Entity {
        self.block
    }

    pub fn state(&self) -> &GeneratorState {
        &self.state
    }

    pub fn initialized(&self) -> bool {
        self.initialized
    }

    /// Re-read the shared config and restore siege counters to their
    /// configured defaults. Called at init, on every siege exit, and when
    /// a cooldown expires, so config drift resolves itself.
    pub fn reload_config(&mut self) {
        self.cfg = (*self.ctx.config).clone();
        self.state.siege_ticks_remaining = self.cfg.siege_duration_ticks;
        self.state.cooldown_ticks_remaining = self.cfg.siege_cooldown_ticks;
        self.state.display_tick_accumulator = DISPLAY_TICKS_PER_SECOND;
        self.state.visible_seconds_remaining = siege::visible_seconds(self.cfg.siege_duration_ticks);
    }

    /// Whether the generator block itself is intact and switched on.
    pub fn is_working(&self, structure: &Structure) -> bool {
        structure.block_working(self.block)
    }

    pub(crate) fn refresh_power_ledger(&mut self, structure: &Structure) {
        let total = structure.generation_capacity();
        if self.state.max_available_power != total {
            self.state.max_available_power = total;
        }
    }

    /// One-time setup: config, defaults, persisted settings, initial save.
    pub fn on_first_update(&mut self, store: &mut dyn SettingsStore) -> Result<(), StorageError> {
        self.reload_config();

        self.state.field_power = modifier::clamp_field_power(self.cfg.min_field_power, &self.cfg);
        self.state.grid_modifier = self.cfg.min_grid_modifier;
        self.state.siege_requested = false;

        if let Some(saved) = self.load_settings(store) {
            self.state.field_power = saved.field_power;
            self.state.grid_modifier = saved.grid_modifier;
        }

        self.initialized = true;
        self.save_settings(store)
    }

    /// Per-cycle phases: ledger refresh, siege evaluation, publication.
    pub fn update_cycle(&mut self, structure: &mut Structure) {
        if !self.initialized {
            return;
        }
        self.refresh_power_ledger(structure);
        if self.cfg.siege_enabled {
            self.siege_step(structure);
        }
        self.publish_modifier(structure);
    }

    /// Control-cycle bookkeeping: settings flush and cooldown countdown.
    pub fn update_control_cycle(
        &mut self,
        store: &mut dyn SettingsStore,
    ) -> Result<(), StorageError> {
        if !self.initialized {
            return Ok(());
        }
        let flushed = self.sync_tick(store);
        self.cooldown_tick();
        flushed
    }

    /// Answer the power distributor's demand query for this cycle.
    ///
    /// Refreshes the cached generation capacity as a side effect on the
    /// branches that depend on it, and records the rated draw for display.
    pub fn required_input(&mut self, structure: &Structure) -> f32 {
        if !self.is_working(structure) {
            return 0.0;
        }

        if self.state.siege_phase.is_active() {
            self.refresh_power_ledger(structure);
            let draw = demand::siege_draw(self.state.max_available_power);
            self.state.required_input_display = draw;
            return draw;
        }

        if self.state.field_power == 0.0 {
            return BASELINE_DRAW;
        }

        self.refresh_power_ledger(structure);
        self.state.required_input_display = demand::field_draw_cap(self.state.max_available_power);
        demand::required_input(
            false,
            self.state.field_power,
            self.state.max_available_power,
            &self.cfg,
        )
    }

    /// Teardown on removal: cancel any running siege, neutralize the
    /// modifier, and make one last persistence attempt.
    pub fn close(
        &mut self,
        structure: &mut Structure,
        store: &mut dyn SettingsStore,
    ) -> Result<(), StorageError> {
        if self.state.siege_phase.is_active() {
            self.ctx.notify(Notice::broadcast(
                self.id,
                NoticeLane::Countdown,
                "Generator removed! Siege mode disengaged",
                Severity::Alert,
            ));
            structure.reboot_auxiliaries();
        }
        structure.set_damage_modifier(aegisfield_logic::constants::modifier::DISABLED);
        self.save_settings(store)
    }

    /// Host-save hook: persist current settings outside the throttle.
    pub fn flush(&self, store: &mut dyn SettingsStore) -> Result<(), StorageError> {
        self.save_settings(store)
    }

    /// Host-side entry point for bus traffic addressed to this device.
    pub fn handle_message(&mut self, message: &SyncMessage) {
        match message {
            SyncMessage::SiegeRequest { device, requested } if *device == self.id => {
                self.commit_siege_request(*requested);
            }
            _ => {}
        }
    }

    // ── Settings persistence ────────────────────────────────────────────

    pub(crate) fn load_settings(&self, store: &dyn SettingsStore) -> Option<SavedSettings> {
        let bytes = store.read(self.id)?;
        match decode_settings(&bytes) {
            Ok(settings) => Some(settings),
            Err(e) => {
                log::warn!("{}: discarding saved settings: {}", self.id, e);
                None
            }
        }
    }

    pub(crate) fn save_settings(&self, store: &mut dyn SettingsStore) -> Result<(), StorageError> {
        let settings = SavedSettings::new(self.state.field_power, self.state.grid_modifier);
        store.write(self.id, encode_settings(&settings)?)
    }

    /// Arm the flush countdown unless one is already pending, so rapid
    /// successive edits coalesce into a single write and broadcast.
    pub(crate) fn arm_sync(&mut self) {
        if self.state.pending_sync_ticks == 0 {
            self.state.pending_sync_ticks = aegisfield_logic::constants::cadence::SETTINGS_FLUSH_CYCLES;
        }
    }

    fn sync_tick(&mut self, store: &mut dyn SettingsStore) -> Result<(), StorageError> {
        if self.state.pending_sync_ticks <= 0 {
            return Ok(());
        }
        self.state.pending_sync_ticks -= 1;
        if self.state.pending_sync_ticks > 0 {
            return Ok(());
        }

        let settings = SavedSettings::new(self.state.field_power, self.state.grid_modifier);
        self.ctx.send(SyncMessage::Settings {
            device: self.id,
            settings: settings.clone(),
        });
        store.write(self.id, encode_settings(&settings)?)
    }

    fn cooldown_tick(&mut self) {
        match self.state.siege_phase {
            siege::SiegePhase::CooldownPending => {
                self.state.siege_phase = siege::SiegePhase::Cooldown;
            }
            siege::SiegePhase::Cooldown => {
                if self.state.cooldown_ticks_remaining > 0 {
                    self.state.cooldown_ticks_remaining -= CONTROL_CYCLE_STEP;
                } else {
                    self.reload_config();
                    self.state.siege_phase = siege::SiegePhase::Idle;
                }
            }
            _ => {}
        }
    }

    // ── Notices ─────────────────────────────────────────────────────────

    pub(crate) fn status(&self, lane: NoticeLane, text: impl Into<String>, severity: Severity) {
        self.ctx.notify(Notice::status(self.id, lane, text, severity));
    }

    pub(crate) fn broadcast_notice(
        &self,
        lane: NoticeLane,
        text: impl Into<String>,
        severity: Severity,
    ) {
        self.ctx.notify(Notice::broadcast(self.id, lane, text, severity));
    }
}
