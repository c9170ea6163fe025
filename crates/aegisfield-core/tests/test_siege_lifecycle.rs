//! Integration tests for the full generator lifecycle.
//!
//! Exercises: activation guards → siege countdown → forced/normal
//! disengage → cooldown → settings persistence and replication, all
//! through the deterministic control loop with no host simulation.

use std::sync::mpsc::channel;
use std::sync::Arc;

use aegisfield_core::prelude::*;
use aegisfield_core::persistence::MemoryStore;
use aegisfield_core::sync::ReplicaView;
use aegisfield_logic::config::GeneratorConfig;
use aegisfield_logic::siege::SiegePhase;

// ── Helpers ────────────────────────────────────────────────────────────

fn test_config() -> GeneratorConfig {
    GeneratorConfig {
        min_field_power: 0.0,
        max_field_power: 30.0,
        min_grid_modifier: 0.25,
        max_grid_modifier: 1.0,
        siege_enabled: true,
        siege_min_power_req: 100.0,
        siege_duration_ticks: 600,
        siege_cooldown_ticks: 300,
    }
}

/// Reactor (200), cockpit, refinery, welder - enough margin for siege.
fn powered_structure() -> Structure {
    let mut structure = Structure::new("Test Rig");
    structure.add_block(BlockSpec::reactor("Reactor", 200.0));
    structure.add_block(BlockSpec::cockpit("Cockpit"));
    structure.add_block(BlockSpec::new("Refinery"));
    structure.add_block(BlockSpec::new("Welder"));
    structure
}

struct Rig {
    sim: ControlLoop,
    gen: DeviceId,
    reactor: hecs::Entity,
    refinery: hecs::Entity,
}

/// Control loop with one settled generator (first step already run).
fn rig() -> Rig {
    rig_with(test_config(), 200.0)
}

fn rig_with(config: GeneratorConfig, reactor_output: f32) -> Rig {
    let mut structure = Structure::new("Test Rig");
    let reactor = structure.add_block(BlockSpec::reactor("Reactor", reactor_output));
    structure.add_block(BlockSpec::cockpit("Cockpit"));
    let refinery = structure.add_block(BlockSpec::new("Refinery"));
    structure.add_block(BlockSpec::new("Welder"));

    let mut sim = ControlLoop::new(structure, config).expect("config invalid");
    let gen = sim.add_generator(BlockSpec::field_generator("Field Generator"));
    sim.step();
    sim.drain_notices();
    Rig {
        sim,
        gen,
        reactor,
        refinery,
    }
}

fn count_notices(notices: &[Notice], text: &str) -> usize {
    notices.iter().filter(|n| n.text == text).count()
}

// ── Lifecycle ──────────────────────────────────────────────────────────

#[test]
fn siege_activates_within_one_cycle() {
    let mut r = rig();
    r.sim.device_mut(r.gen).unwrap().request_siege(true);
    r.sim.step();
    assert_eq!(r.sim.device(r.gen).unwrap().siege_phase(), SiegePhase::Active);
}

#[test]
fn siege_runs_exactly_its_configured_duration() {
    let mut r = rig();
    r.sim.device_mut(r.gen).unwrap().request_siege(true);
    r.sim.step(); // Idle → Active

    // 600 countdown cycles.
    r.sim.run(600);
    let device = r.sim.device(r.gen).unwrap();
    assert_eq!(device.siege_phase(), SiegePhase::Active);
    assert_eq!(device.state().siege_ticks_remaining, 0);

    // The next evaluation disengages.
    r.sim.step();
    let device = r.sim.device(r.gen).unwrap();
    assert_eq!(device.siege_phase(), SiegePhase::CooldownPending);
    assert!(!device.siege_requested());
}

#[test]
fn cooldown_expires_back_to_idle() {
    let mut r = rig();
    r.sim.device_mut(r.gen).unwrap().request_siege(true);
    r.sim.run(602);
    assert!(r.sim.device(r.gen).unwrap().siege_phase().in_cooldown());

    // 300 cooldown ticks at 10 per control cycle, plus the pending and
    // clearing control cycles: 330 cycles is more than enough.
    r.sim.run(330);
    let device = r.sim.device(r.gen).unwrap();
    assert_eq!(device.siege_phase(), SiegePhase::Idle);
    assert!(!device.siege_requested());
    assert!(device.siege_toggle_editable());
}

#[test]
fn countdown_notices_track_visible_seconds() {
    let mut r = rig();
    r.sim.device_mut(r.gen).unwrap().request_siege(true);
    r.sim.step();

    // 600 ticks at 60 per displayed second → first notice after 60 cycles.
    r.sim.run(60);
    let notices = r.sim.drain_notices();
    assert_eq!(count_notices(&notices, "Siege mode: 9 seconds"), 1);

    r.sim.run(540);
    let notices = r.sim.drain_notices();
    assert_eq!(count_notices(&notices, "Siege mode: 0 seconds"), 1);
}

// ── Guards ─────────────────────────────────────────────────────────────

#[test]
fn activation_rejected_without_power_margin() {
    // 80 units of generation against a 100 unit threshold.
    let mut r = rig_with(test_config(), 80.0);
    r.sim.device_mut(r.gen).unwrap().request_siege(true);
    r.sim.step();

    let device = r.sim.device(r.gen).unwrap();
    assert_eq!(device.siege_phase(), SiegePhase::Idle);
    assert!(!device.siege_requested());

    let notices = r.sim.drain_notices();
    let rejections: Vec<_> = notices
        .iter()
        .filter(|n| n.lane == NoticeLane::Countdown && n.text == "Insufficient power")
        .collect();
    assert_eq!(rejections.len(), 1);
}

#[test]
fn activation_rejected_while_generator_disabled() {
    let mut r = rig();
    let block = r.sim.device(r.gen).unwrap().block();
    r.sim.structure_mut().set_block_enabled(block, false);

    r.sim.device_mut(r.gen).unwrap().request_siege(true);
    r.sim.step();

    let device = r.sim.device(r.gen).unwrap();
    assert_eq!(device.siege_phase(), SiegePhase::Idle);
    assert!(!device.siege_requested());
}

#[test]
fn toggle_rejected_during_cooldown_with_remaining_seconds() {
    let mut r = rig();
    r.sim.device_mut(r.gen).unwrap().request_siege(true);
    r.sim.run(610);
    assert!(r.sim.device(r.gen).unwrap().siege_phase().in_cooldown());
    r.sim.drain_notices();

    r.sim.device_mut(r.gen).unwrap().request_siege(true);
    let device = r.sim.device(r.gen).unwrap();
    assert!(!device.siege_requested());

    let notices = r.sim.drain_notices();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].text.starts_with("Siege mode on cooldown:"));
}

#[test]
fn toggle_locked_while_engaged() {
    let mut r = rig();
    r.sim.device_mut(r.gen).unwrap().request_siege(true);
    r.sim.step();
    r.sim.drain_notices();

    // Neither a second activation nor a cancel attempt goes through.
    r.sim.device_mut(r.gen).unwrap().request_siege(false);
    let notices = r.sim.drain_notices();
    assert_eq!(count_notices(&notices, "Siege mode cannot be disengaged early"), 1);
    assert!(r.sim.device(r.gen).unwrap().siege_requested());
}

// ── Forced disengage ───────────────────────────────────────────────────

#[test]
fn siege_disengages_when_generator_destroyed() {
    let mut r = rig();
    r.sim.device_mut(r.gen).unwrap().request_siege(true);
    r.sim.run(50);
    assert!(!r.sim.structure().block_enabled(r.refinery));
    r.sim.drain_notices();

    let block = r.sim.device(r.gen).unwrap().block();
    r.sim.structure_mut().set_block_integrity(block, 0.0);
    r.sim.step();

    let device = r.sim.device(r.gen).unwrap();
    assert_eq!(device.siege_phase(), SiegePhase::CooldownPending);
    assert!(!device.siege_requested());
    assert!(r.sim.structure().block_enabled(r.refinery));

    let notices = r.sim.drain_notices();
    assert_eq!(
        count_notices(&notices, "Generator inoperative! Siege mode disengaged"),
        1
    );
}

#[test]
fn siege_disengages_when_power_collapses() {
    let mut r = rig();
    r.sim.device_mut(r.gen).unwrap().request_siege(true);
    r.sim.run(50);
    r.sim.drain_notices();

    // Knock out the reactor: generation drops below the threshold mid-siege.
    r.sim.structure_mut().set_block_integrity(r.reactor, 0.0);
    r.sim.step();

    let device = r.sim.device(r.gen).unwrap();
    assert_eq!(device.siege_phase(), SiegePhase::CooldownPending);
    assert!(!device.siege_requested());

    let notices = r.sim.drain_notices();
    assert_eq!(
        count_notices(&notices, "Insufficient power! Siege mode disengaged"),
        1
    );
}

// ── Auxiliary shutdown ─────────────────────────────────────────────────

#[test]
fn auxiliaries_held_down_while_engaged_and_restored_after() {
    let mut r = rig();
    r.sim.device_mut(r.gen).unwrap().request_siege(true);
    r.sim.run(10);
    assert!(!r.sim.structure().block_enabled(r.refinery));

    // Switching a block back on mid-siege does not stick.
    r.sim.structure_mut().set_block_enabled(r.refinery, true);
    r.sim.step();
    assert!(!r.sim.structure().block_enabled(r.refinery));

    r.sim.run(600);
    assert!(r.sim.structure().block_enabled(r.refinery));
}

#[test]
fn siege_anchors_the_structure() {
    let mut r = rig();
    r.sim.structure_mut().velocity = Vec3::new(5.0, 0.0, 0.0);
    r.sim.device_mut(r.gen).unwrap().request_siege(true);
    r.sim.step(); // activation
    r.sim.step(); // first active cycle inverts
    assert_eq!(r.sim.structure().velocity, Vec3::new(-5.0, 0.0, 0.0));
}

// ── Modifier publication ───────────────────────────────────────────────

#[test]
fn modifier_writes_are_deduplicated() {
    let mut r = rig();
    let baseline = r.sim.structure().modifier_writes();

    r.sim.run(100);
    assert_eq!(r.sim.structure().modifier_writes(), baseline);

    r.sim.device_mut(r.gen).unwrap().set_field_power(10.0);
    r.sim.run(100);
    assert_eq!(r.sim.structure().modifier_writes(), baseline + 1);
}

#[test]
fn siege_override_engages_above_power_floor() {
    let mut r = rig();
    r.sim.device_mut(r.gen).unwrap().request_siege(true);
    r.sim.step();

    assert!(r.sim.device(r.gen).unwrap().state().modifier_override);
    assert_eq!(r.sim.structure().damage_modifier(), 0.1);

    // Normal publication resumes after the siege ends.
    r.sim.run(601);
    assert_eq!(r.sim.device(r.gen).unwrap().siege_phase(), SiegePhase::CooldownPending);
    r.sim.step();
    let expected = r.sim.device(r.gen).unwrap().grid_modifier();
    assert_eq!(r.sim.structure().damage_modifier(), expected);
}

#[test]
fn dead_generator_publishes_neutral_modifier() {
    let mut r = rig();
    r.sim.device_mut(r.gen).unwrap().set_field_power(20.0);
    r.sim.step();
    assert!(r.sim.structure().damage_modifier() < 1.0);

    let block = r.sim.device(r.gen).unwrap().block();
    r.sim.structure_mut().set_block_enabled(block, false);
    r.sim.step();

    let device = r.sim.device(r.gen).unwrap();
    assert_eq!(device.field_power(), 0.0);
    assert_eq!(device.grid_modifier(), 1.0);
    assert_eq!(r.sim.structure().damage_modifier(), 1.0);
}

// ── Persistence & replication ──────────────────────────────────────────

#[test]
fn settings_roundtrip_through_the_store() {
    let config = Arc::new(test_config());
    let mut structure = powered_structure();
    let block = structure.add_block(BlockSpec::field_generator("Field Generator"));
    let mut store = MemoryStore::new();

    let (bus, _bus_rx) = channel();
    let (notices, _notice_rx) = channel();
    let ctx = DeviceContext {
        authority: Authority::Host,
        config: Arc::clone(&config),
        bus,
        notices,
    };

    let mut device = FieldGenerator::new(DeviceId(1), block, ctx.clone());
    device.on_first_update(&mut store).expect("init save failed");
    device.set_field_power(12.0);
    device.update_cycle(&mut structure);
    for _ in 0..6 {
        device.update_control_cycle(&mut store).expect("flush failed");
    }

    let saved_power = device.field_power();
    let saved_modifier = device.grid_modifier();
    assert_eq!(saved_power, 12.0);

    let mut restored = FieldGenerator::new(DeviceId(1), block, ctx);
    restored.on_first_update(&mut store).expect("restore failed");
    assert_eq!(restored.field_power(), saved_power);
    assert_eq!(restored.grid_modifier(), saved_modifier);
}

#[test]
fn settings_broadcast_reaches_the_replica() {
    let mut r = rig();
    r.sim.device_mut(r.gen).unwrap().set_field_power(12.0);
    // Flush fires 6 control cycles (60 sim cycles) after the edit.
    r.sim.run(70);

    let replica = r.sim.replica(r.gen).unwrap();
    assert_eq!(replica.field_power, 12.0);
    assert_eq!(replica.grid_modifier, r.sim.device(r.gen).unwrap().grid_modifier());
}

#[test]
fn observer_request_is_guarded_by_the_host() {
    // 80 units of generation: the observer's request must bounce.
    let mut r = rig_with(test_config(), 80.0);
    let remote = r.sim.remote_handle();
    ReplicaView::new(r.gen).request_siege(&remote, true);

    r.sim.run(2);
    let device = r.sim.device(r.gen).unwrap();
    assert_eq!(device.siege_phase(), SiegePhase::Idle);
    assert!(!device.siege_requested());
    assert!(!r.sim.replica(r.gen).unwrap().siege_requested);
}

// ── Removal ────────────────────────────────────────────────────────────

#[test]
fn removal_cancels_running_siege() {
    let mut r = rig();
    r.sim.device_mut(r.gen).unwrap().request_siege(true);
    r.sim.run(20);
    assert!(!r.sim.structure().block_enabled(r.refinery));
    r.sim.drain_notices();

    assert!(r.sim.remove_generator(r.gen));
    assert!(r.sim.structure().block_enabled(r.refinery));
    assert_eq!(r.sim.structure().damage_modifier(), 1.0);

    let notices = r.sim.drain_notices();
    assert_eq!(
        count_notices(&notices, "Generator removed! Siege mode disengaged"),
        1
    );
}
