/**
 * File: tests/determinism.rs
 *
 * Purpose: Multi-run determinism harness - identical inputs must produce
 * bit-identical snapshots at every tick, proven by hash-sequence equality
 */
use orbis_fab::{
    Budgets, FabConfig, FabCore, FabMode, HysteresisConfig, Metrics, ZNode, ZSlice,
};

/// Deterministic per-tick slice generator: scores derive from the tick
/// index alone.
fn slice_for_tick(tick: u64) -> ZSlice {
    let nodes = (0..48)
        .map(|i| {
            let score = ((i as u64 * 29 + tick * 13) % 100) as f64 / 100.0;
            ZNode::scored(format!("n{:02}", i), score)
        })
        .collect();
    ZSlice::new("zs-1", "zv1", nodes)
}

fn metrics_for_tick(tick: u64) -> Metrics {
    Metrics::new(
        ((tick * 7) % 10) as f64 / 10.0,
        0.9,
        ((tick % 3) as f64) / 100.0,
    )
}

/// Run `num_ticks` full ticks and collect the snapshot hash per tick.
fn simulate(session_id: &str, num_ticks: u64, config: FabConfig) -> Vec<[u8; 32]> {
    let mut core = FabCore::new(Some(session_id.to_string()), config);
    let mut hashes = Vec::new();

    for tick in 1..=num_ticks {
        core.init_tick(core.mode(), Budgets::default())
            .expect("init_tick");
        core.fill(&slice_for_tick(tick)).expect("fill");
        let snapshot = core.mix().expect("mix");
        hashes.push(snapshot.state_hash());
        core.step(&metrics_for_tick(tick)).expect("step");
    }

    hashes
}

#[test]
fn test_determinism_fixed_seed() {
    // Three independent runs over 100 ticks must agree hash-for-hash.
    let hashes1 = simulate("sid-1", 100, FabConfig::default());
    let hashes2 = simulate("sid-1", 100, FabConfig::default());
    let hashes3 = simulate("sid-1", 100, FabConfig::default());

    assert_eq!(hashes1, hashes2, "run 1 and 2 diverged");
    assert_eq!(hashes2, hashes3, "run 2 and 3 diverged");
}

#[test]
fn test_determinism_under_hysteresis() {
    let config = || {
        FabConfig::with_hysteresis(HysteresisConfig {
            dwell_time: 2,
            rate_limit_ticks: 4,
            min_stream_for_upgrade: 8,
        })
    };

    let hashes1 = simulate("sid-1", 100, config());
    let hashes2 = simulate("sid-1", 100, config());
    assert_eq!(hashes1, hashes2, "hysteresis runs diverged");
}

#[test]
fn test_snapshots_not_stuck() {
    // Scores vary per tick, so consecutive snapshot hashes must change.
    let hashes = simulate("sid-1", 10, FabConfig::default());
    for pair in hashes.windows(2) {
        assert_ne!(pair[0], pair[1], "snapshot hash frozen across ticks");
    }
}

#[test]
fn test_full_snapshot_sequences_identical() {
    // Beyond hashes: whole serialized snapshots must match field by field.
    let run = || {
        let mut core = FabCore::new(Some("sid-9".to_string()), FabConfig::default());
        let mut snapshots = Vec::new();
        for tick in 1..=20 {
            core.init_tick(core.mode(), Budgets::default()).expect("init");
            core.fill(&slice_for_tick(tick)).expect("fill");
            snapshots.push(
                serde_json::to_string(&core.mix().expect("mix")).expect("encode"),
            );
            core.step(&metrics_for_tick(tick)).expect("step");
        }
        snapshots
    };

    assert_eq!(run(), run());
}

#[test]
fn test_slice_input_order_does_not_leak() {
    // The same candidate set in reversed input order must produce the
    // same windows: ordering is (-score, id), never input position.
    let run = |reverse: bool| {
        let mut z = slice_for_tick(1);
        if reverse {
            z.nodes.reverse();
        }
        let mut core = FabCore::new(Some("sid-1".to_string()), FabConfig::default());
        core.init_tick(FabMode::Fab0, Budgets::default()).expect("init");
        core.fill(&z).expect("fill");
        core.mix().expect("mix").state_hash()
    };

    assert_eq!(run(false), run(true));
}
