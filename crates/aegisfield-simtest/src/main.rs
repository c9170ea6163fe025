//! Aegisfield Headless Simulation Harness
//!
//! Validates the generator's decision logic and full lifecycle without a
//! host simulation. Runs entirely in-process - no rendering, no storage
//! backend, no networking.
//!
//! Usage:
//!   cargo run -p aegisfield-simtest
//!   cargo run -p aegisfield-simtest -- --verbose

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use aegisfield_core::persistence::{decode_settings, encode_settings, SavedSettings};
use aegisfield_core::prelude::*;
use aegisfield_core::sync::ReplicaView;
use aegisfield_logic::config::GeneratorConfig;
use aegisfield_logic::constants::power::BASELINE_DRAW;
use aegisfield_logic::siege::SiegePhase;
use aegisfield_logic::{demand, modifier, siege};

// ── Session config (same JSON a host deployment ships) ─────────────────
const CONFIG_JSON: &str = include_str!("../../../data/generator_config.json");

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Aegisfield Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Session config validation
    results.extend(validate_config(verbose));

    // 2. Demand curve sweep
    results.extend(validate_demand_curve(verbose));

    // 3. Modifier mapping sweep
    results.extend(validate_modifier_mapping(verbose));

    // 4. Guard decision table
    results.extend(validate_guards(verbose));

    // 5. Full siege lifecycle through the control loop
    results.extend(validate_siege_lifecycle(verbose));

    // 6. Settings persistence round-trip
    results.extend(validate_persistence(verbose));

    // 7. Observer request / host commit flow
    results.extend(validate_replication(verbose));

    // 8. Randomized structure sweeps
    results.extend(validate_random_structures(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn session_config() -> GeneratorConfig {
    serde_json::from_str(CONFIG_JSON).expect("bundled config must parse")
}

// ── 1. Session config ───────────────────────────────────────────────────

fn validate_config(_verbose: bool) -> Vec<TestResult> {
    println!("--- Session Config ---");
    let mut results = Vec::new();

    let config: GeneratorConfig = match serde_json::from_str(CONFIG_JSON) {
        Ok(c) => c,
        Err(e) => {
            results.push(TestResult {
                name: "config_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return results;
        }
    };

    results.push(TestResult {
        name: "config_parse".into(),
        passed: true,
        detail: format!(
            "field power {}..{}, modifier {}..{}",
            config.min_field_power,
            config.max_field_power,
            config.min_grid_modifier,
            config.max_grid_modifier
        ),
    });

    let validation = config.validate();
    results.push(TestResult {
        name: "config_invariants".into(),
        passed: validation.is_ok(),
        detail: match validation {
            Ok(()) => "all invariants hold".into(),
            Err(e) => format!("{}", e),
        },
    });

    results.push(TestResult {
        name: "config_siege_tuning".into(),
        passed: config.siege_enabled && config.siege_min_power_req > 0.0,
        detail: format!(
            "siege enabled, threshold {}, duration {} ticks, cooldown {} ticks",
            config.siege_min_power_req, config.siege_duration_ticks, config.siege_cooldown_ticks
        ),
    });

    results
}

// ── 2. Demand curve ─────────────────────────────────────────────────────

fn validate_demand_curve(verbose: bool) -> Vec<TestResult> {
    println!("--- Demand Curve ---");
    let mut results = Vec::new();
    let config = session_config();

    // Boundary: zero field power costs the baseline alone.
    let idle = demand::required_input(false, 0.0, 400.0, &config);
    results.push(TestResult {
        name: "demand_idle_baseline".into(),
        passed: idle == BASELINE_DRAW,
        detail: format!("zero field power draws {}", idle),
    });

    // Boundary: full slider reaches base + (base + (cap - base)).
    let full = demand::required_input(false, config.max_field_power, 400.0, &config);
    let expected_full = BASELINE_DRAW + (BASELINE_DRAW + (400.0 * 0.3 - BASELINE_DRAW));
    results.push(TestResult {
        name: "demand_full_slider".into(),
        passed: (full - expected_full).abs() < 1e-3,
        detail: format!("full slider draws {} (expected {})", full, expected_full),
    });

    // Siege claims 90% of capacity regardless of slider.
    let siege_draw = demand::required_input(true, 3.0, 400.0, &config);
    results.push(TestResult {
        name: "demand_siege_fraction".into(),
        passed: (siege_draw - 360.0).abs() < 1e-3,
        detail: format!("siege draws {} of 400", siege_draw),
    });

    // Monotonic in field power for fixed capacity.
    let mut monotonic = true;
    let mut previous = f32::MIN;
    let mut fp = config.min_field_power;
    while fp <= config.max_field_power {
        let draw = demand::required_input(false, fp, 400.0, &config);
        if draw < previous {
            monotonic = false;
            if verbose {
                println!("  draw decreased at field power {}", fp);
            }
        }
        previous = draw;
        fp += 1.0;
    }
    results.push(TestResult {
        name: "demand_monotonic".into(),
        passed: monotonic,
        detail: "draw non-decreasing across the slider range".into(),
    });

    results
}

// ── 3. Modifier mapping ─────────────────────────────────────────────────

fn validate_modifier_mapping(_verbose: bool) -> Vec<TestResult> {
    println!("--- Modifier Mapping ---");
    let mut results = Vec::new();
    let config = session_config();

    let mut in_bounds = true;
    let mut monotonic = true;
    let mut previous = f32::MIN;
    let mut fp = config.min_field_power;
    while fp <= config.max_field_power {
        let m = modifier::grid_modifier(fp, &config);
        if m < config.min_grid_modifier || m > config.max_grid_modifier {
            in_bounds = false;
        }
        if m < previous {
            monotonic = false;
        }
        previous = m;
        fp += 1.0;
    }

    results.push(TestResult {
        name: "modifier_bounds".into(),
        passed: in_bounds,
        detail: format!(
            "all values within {}..{}",
            config.min_grid_modifier, config.max_grid_modifier
        ),
    });
    results.push(TestResult {
        name: "modifier_monotonic".into(),
        passed: monotonic,
        detail: "modifier non-decreasing in field power".into(),
    });

    let endpoints = modifier::grid_modifier(config.min_field_power, &config)
        == config.min_grid_modifier
        && modifier::grid_modifier(config.max_field_power, &config) == config.max_grid_modifier;
    results.push(TestResult {
        name: "modifier_endpoints".into(),
        passed: endpoints,
        detail: "slider endpoints map to modifier bounds".into(),
    });

    results
}

// ── 4. Guard table ──────────────────────────────────────────────────────

fn validate_guards(_verbose: bool) -> Vec<TestResult> {
    println!("--- Guard Table ---");
    let mut results = Vec::new();
    let config = session_config();

    let underpowered = siege::evaluate_activation(true, config.siege_min_power_req, &config);
    let offline = siege::evaluate_activation(false, config.siege_min_power_req + 50.0, &config);
    let clear = siege::evaluate_activation(true, config.siege_min_power_req + 50.0, &config);
    results.push(TestResult {
        name: "guard_activation".into(),
        passed: underpowered.is_err() && offline.is_err() && clear.is_ok(),
        detail: "entry guard rejects underpowered and offline, admits the rest".into(),
    });

    let locked = siege::evaluate_toggle(true, SiegePhase::Active, 0).is_err();
    let cooling = siege::evaluate_toggle(false, SiegePhase::Cooldown, 600).is_err();
    let open = siege::evaluate_toggle(false, SiegePhase::Idle, 0).is_ok();
    results.push(TestResult {
        name: "guard_toggle".into(),
        passed: locked && cooling && open,
        detail: "toggle guard honors engage lock and cooldown".into(),
    });

    let sustain_ok = siege::evaluate_sustain(true, config.siege_min_power_req + 50.0, 100, &config);
    let sustain_expired = siege::evaluate_sustain(true, config.siege_min_power_req + 50.0, 0, &config);
    results.push(TestResult {
        name: "guard_sustain".into(),
        passed: sustain_ok.is_none() && sustain_expired == Some(siege::Disengage::Expired),
        detail: "sustain guard continues until expiry".into(),
    });

    results
}

// ── 5. Lifecycle ────────────────────────────────────────────────────────

fn validate_siege_lifecycle(verbose: bool) -> Vec<TestResult> {
    println!("--- Siege Lifecycle ---");
    let mut results = Vec::new();

    let config = GeneratorConfig {
        siege_min_power_req: 100.0,
        siege_duration_ticks: 600,
        siege_cooldown_ticks: 300,
        ..session_config()
    };

    let mut structure = Structure::new("Harness Rig");
    structure.add_block(BlockSpec::reactor("Reactor", 200.0));
    structure.add_block(BlockSpec::cockpit("Cockpit"));
    structure.add_block(BlockSpec::new("Refinery"));

    let mut sim = match ControlLoop::new(structure, config) {
        Ok(sim) => sim,
        Err(e) => {
            results.push(TestResult {
                name: "lifecycle_setup".into(),
                passed: false,
                detail: format!("config rejected: {}", e),
            });
            return results;
        }
    };
    let gen = sim.add_generator(BlockSpec::field_generator("Field Generator"));
    sim.step();

    sim.device_mut(gen).expect("device").request_siege(true);
    sim.step();
    let activated = sim.device(gen).expect("device").siege_phase() == SiegePhase::Active;
    results.push(TestResult {
        name: "lifecycle_activation".into(),
        passed: activated,
        detail: "siege engaged within one cycle of the request".into(),
    });

    let override_applied = sim.structure().damage_modifier() == 0.1;
    results.push(TestResult {
        name: "lifecycle_override".into(),
        passed: override_applied,
        detail: format!(
            "damage modifier {} after entry",
            sim.structure().damage_modifier()
        ),
    });

    sim.run(600);
    let held = sim.device(gen).expect("device").siege_phase() == SiegePhase::Active
        && sim.device(gen).expect("device").state().siege_ticks_remaining == 0;
    results.push(TestResult {
        name: "lifecycle_duration".into(),
        passed: held,
        detail: "countdown reached zero after exactly 600 cycles".into(),
    });

    sim.step();
    let cooled = sim.device(gen).expect("device").siege_phase() == SiegePhase::CooldownPending
        && !sim.device(gen).expect("device").siege_requested();
    results.push(TestResult {
        name: "lifecycle_disengage".into(),
        passed: cooled,
        detail: "siege disengaged into cooldown with the request cleared".into(),
    });

    sim.run(340);
    let idle = sim.device(gen).expect("device").siege_phase() == SiegePhase::Idle;
    results.push(TestResult {
        name: "lifecycle_cooldown".into(),
        passed: idle,
        detail: "cooldown expired back to idle".into(),
    });

    if verbose {
        for notice in sim.drain_notices() {
            println!("  notice: [{:?}] {}", notice.severity, notice.text);
        }
    }

    results
}

// ── 6. Persistence ──────────────────────────────────────────────────────

fn validate_persistence(_verbose: bool) -> Vec<TestResult> {
    println!("--- Persistence ---");
    let mut results = Vec::new();

    let settings = SavedSettings::new(17.0, 0.68);
    let roundtrip = encode_settings(&settings)
        .ok()
        .and_then(|bytes| decode_settings(&bytes).ok());
    results.push(TestResult {
        name: "persistence_roundtrip".into(),
        passed: roundtrip.as_ref() == Some(&settings),
        detail: "encode/decode reproduces identical settings".into(),
    });

    let garbage = decode_settings(&[0x01, 0xfe, 0x42]);
    results.push(TestResult {
        name: "persistence_garbage_rejected".into(),
        passed: garbage.is_err(),
        detail: "corrupt slot degrades to no-saved-settings".into(),
    });

    results
}

// ── 7. Replication ──────────────────────────────────────────────────────

fn validate_replication(_verbose: bool) -> Vec<TestResult> {
    println!("--- Replication ---");
    let mut results = Vec::new();

    let mut structure = Structure::new("Replication Rig");
    structure.add_block(BlockSpec::reactor("Reactor", 400.0));

    let config = GeneratorConfig {
        siege_min_power_req: 100.0,
        ..session_config()
    };
    let mut sim = ControlLoop::new(structure, config).expect("config");
    let gen = sim.add_generator(BlockSpec::field_generator("Field Generator"));
    sim.step();

    // Observer files a request; the host commits and broadcasts.
    let remote = sim.remote_handle();
    ReplicaView::new(gen).request_siege(&remote, true);
    sim.run(2);

    let committed = sim.device(gen).expect("device").siege_requested();
    let projected = sim.replica(gen).expect("replica").siege_requested;
    results.push(TestResult {
        name: "replication_request_commit".into(),
        passed: committed && projected,
        detail: "observer request committed by host and projected back".into(),
    });

    // Settings edits replicate on the throttled schedule.
    sim.device_mut(gen).expect("device").set_field_power(9.0);
    sim.run(70);
    let replica = sim.replica(gen).expect("replica");
    results.push(TestResult {
        name: "replication_settings_flush".into(),
        passed: replica.field_power == 9.0,
        detail: format!("replica sees field power {}", replica.field_power),
    });

    results
}

// ── 8. Randomized structures ────────────────────────────────────────────

fn validate_random_structures(verbose: bool) -> Vec<TestResult> {
    println!("--- Randomized Structures ---");
    let mut results = Vec::new();
    let config = session_config();
    let mut rng = StdRng::seed_from_u64(42);

    let mut ledger_ok = true;
    let mut modifier_ok = true;

    for round in 0..20 {
        let mut structure = Structure::new(format!("Rig {}", round));
        let mut expected_capacity = 0.0f32;
        for i in 0..rng.gen_range(1..6) {
            let output = rng.gen_range(20.0..400.0);
            expected_capacity += output;
            structure.add_block(BlockSpec::reactor(format!("Reactor {}", i), output));
        }
        for i in 0..rng.gen_range(0..8) {
            structure.add_block(BlockSpec::new(format!("Auxiliary {}", i)));
        }

        let capacity = structure.generation_capacity();
        if (capacity - expected_capacity).abs() > 1e-2 {
            ledger_ok = false;
            if verbose {
                println!(
                    "  round {}: ledger {} != expected {}",
                    round, capacity, expected_capacity
                );
            }
        }

        let mut sim = ControlLoop::new(structure, config.clone()).expect("config");
        let gen = sim.add_generator(BlockSpec::field_generator("Field Generator"));
        sim.step();

        // Hammer the slider; the published modifier must stay in bounds.
        for _ in 0..30 {
            let target = rng.gen_range(-10.0..50.0);
            sim.device_mut(gen).expect("device").set_field_power(target);
            sim.step();
            let m = sim.device(gen).expect("device").grid_modifier();
            let disabled = m == 1.0;
            if !disabled && (m < config.min_grid_modifier || m > config.max_grid_modifier) {
                modifier_ok = false;
            }
        }
    }

    results.push(TestResult {
        name: "random_ledger_totals".into(),
        passed: ledger_ok,
        detail: "generation capacity matches the spawned producer sum".into(),
    });
    results.push(TestResult {
        name: "random_modifier_bounds".into(),
        passed: modifier_ok,
        detail: "published modifier stays in bounds under random edits".into(),
    });

    results
}
