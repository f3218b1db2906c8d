/**
 * File: tests/scenarios.rs
 *
 * Purpose: End-to-end tick scenarios for the FAB core - envelope
 * hysteresis, tiny-sample guard, mode promotion and degradation,
 * cross-budget determinism, and diversity-biased selection
 */
use orbis_fab::{
    Budgets, FabConfig, FabCore, FabMode, HysteresisConfig, Metrics, Precision, ZNode, ZSlice,
};

fn budgets(nodes: u32) -> Budgets {
    Budgets {
        nodes,
        ..Budgets::default()
    }
}

fn calm() -> Metrics {
    Metrics::new(0.1, 0.9, 0.0)
}

/// 32 nodes with scores spread uniformly across [0.85, 0.95].
fn high_score_slice() -> ZSlice {
    let nodes = (0..32)
        .map(|i| ZNode::scored(format!("n{:02}", i), 0.85 + i as f64 * (0.10 / 31.0)))
        .collect();
    ZSlice::new("zs-1", "zv1", nodes)
}

#[test]
fn test_s1_upgrade_under_hysteresis() {
    let config = FabConfig::with_hysteresis(HysteresisConfig {
        dwell_time: 3,
        rate_limit_ticks: 5,
        min_stream_for_upgrade: 8,
    });
    let mut core = FabCore::new(Some("sid-1".to_string()), config);
    let z = high_score_slice();

    for tick in 1..=10u64 {
        core.init_tick(core.mode(), budgets(32)).expect("init");
        core.fill(&z).expect("fill");
        let snap = core.mix().expect("mix");

        if tick <= 3 {
            assert_eq!(
                snap.stream_precision,
                Precision::Cold,
                "tick {}: still dwelling",
                tick
            );
        } else {
            assert_eq!(
                snap.stream_precision,
                Precision::Hot,
                "tick {}: dwell satisfied",
                tick
            );
        }
        core.step(&calm()).expect("step");
    }

    let snap = core.mix().expect("mix");
    assert_eq!(snap.diagnostics.counters.envelope_changes, 1);
    assert_eq!(snap.diagnostics.derived.changes_per_1k, 100.0);
}

#[test]
fn test_s2_tiny_sample_guard() {
    let four_nodes = ZSlice::new(
        "zs-1",
        "zv1",
        (0..4)
            .map(|i| ZNode::scored(format!("n{}", i), 0.9))
            .collect(),
    );

    // Hysteresis mode: a 3-node stream can never justify an upgrade.
    let config = FabConfig::with_hysteresis(HysteresisConfig::default());
    let mut core = FabCore::new(Some("sid-1".to_string()), config);
    for _ in 0..10 {
        core.init_tick(core.mode(), budgets(4)).expect("init");
        core.fill(&four_nodes).expect("fill");
        assert_eq!(core.mix().expect("mix").stream_precision, Precision::Cold);
        core.step(&calm()).expect("step");
    }

    // Legacy mode: the same input goes hot on the first fill.
    let mut core = FabCore::new(Some("sid-1".to_string()), FabConfig::default());
    core.init_tick(FabMode::Fab0, budgets(4)).expect("init");
    core.fill(&four_nodes).expect("fill");
    assert_eq!(core.mix().expect("mix").stream_precision, Precision::Hot);
}

#[test]
fn test_s3_happy_path_promotion() {
    let mut core = FabCore::new(Some("sid-1".to_string()), FabConfig::default());

    let expected = [
        (FabMode::Fab1, 0u32),
        (FabMode::Fab1, 1),
        (FabMode::Fab1, 2),
        (FabMode::Fab2, 0),
        (FabMode::Fab2, 1),
    ];
    for (tick, (mode, stable)) in expected.iter().enumerate() {
        core.init_tick(core.mode(), budgets(32)).expect("init");
        let out = core.step(&calm()).expect("step");
        assert_eq!(out.mode, *mode, "tick {}", tick + 1);
        assert_eq!(out.stable_ticks, *stable, "tick {}", tick + 1);
    }
}

#[test]
fn test_s4_degradation_resets_stability() {
    let mut core = FabCore::new(Some("sid-1".to_string()), FabConfig::default());

    // Climb to FAB2, then hold until stability reaches 10.
    core.init_tick(FabMode::Fab0, budgets(32)).expect("init");
    loop {
        let out = core.step(&calm()).expect("step");
        if out.mode == FabMode::Fab2 && out.stable_ticks == 10 {
            break;
        }
    }
    let transitions_before = core.mix().expect("mix").diagnostics.counters.mode_transitions;

    let out = core.step(&Metrics::new(0.8, 0.9, 0.0)).expect("step");
    assert_eq!(out.mode, FabMode::Fab1);
    assert_eq!(out.stable_ticks, 0);

    let snap = core.mix().expect("mix");
    assert_eq!(
        snap.diagnostics.counters.mode_transitions,
        transitions_before + 1
    );
}

#[test]
fn test_s5_determinism_across_budgets() {
    let nodes: Vec<ZNode> = (0..100)
        .map(|i| ZNode::scored(format!("n{:03}", i), (i as f64 * 37.0 % 100.0) / 100.0))
        .collect();
    let z = ZSlice::new("zs-1", "zv1", nodes);

    for nodes_budget in [8u32, 16, 32, 64] {
        let run = |z: &ZSlice| {
            let mut core = FabCore::new(Some("sid-1".to_string()), FabConfig::default());
            core.init_tick(FabMode::Fab0, budgets(nodes_budget))
                .expect("init");
            core.fill(z).expect("fill");
            let ids: Vec<String> = core.stream().ids().map(|s| s.to_string()).collect();
            let diversity = core
                .mix()
                .expect("mix")
                .diagnostics
                .derived
                .selected_diversity;
            (ids, diversity)
        };

        let (ids1, div1) = run(&z);
        let (ids2, div2) = run(&z);
        assert_eq!(ids1, ids2, "stream ids diverged at budget {}", nodes_budget);
        assert_eq!(
            div1.to_bits(),
            div2.to_bits(),
            "diversity diverged at budget {}",
            nodes_budget
        );
    }
}

#[test]
fn test_s6_diversity_for_mixed_clusters() {
    // Two score clusters; the low cluster spans seven mutually orthogonal
    // directions, so diversity keeps pulling picks across the boundary.
    let mut nodes = Vec::new();
    for i in 0..20 {
        let mut vec = vec![0.0; 8];
        vec[0] = 1.0;
        nodes.push(ZNode::with_vec(format!("a{:02}", i), 0.9, vec));
    }
    for i in 0..20usize {
        let mut vec = vec![0.0; 8];
        vec[1 + i % 7] = 1.0;
        nodes.push(ZNode::with_vec(format!("b{:02}", i), 0.7, vec));
    }
    let z = ZSlice::new("zs-1", "zv1", nodes);

    let mut core = FabCore::new(Some("sid-1".to_string()), FabConfig::default());
    core.init_tick(FabMode::Fab0, budgets(16)).expect("init");
    core.fill(&z).expect("fill");

    let high = core.stream().ids().filter(|id| id.starts_with('a')).count();
    let low = core.stream().ids().filter(|id| id.starts_with('b')).count();
    assert!(high >= 3, "high cluster underrepresented: {}", high);
    assert!(low >= 3, "low cluster underrepresented: {}", low);

    let snap = core.mix().expect("mix");
    assert!(
        snap.diagnostics.derived.selected_diversity > 0.001,
        "diversity {} too low",
        snap.diagnostics.derived.selected_diversity
    );
    assert!(snap.diagnostics.counters.rebalance_events >= 1);
    assert!(snap.diagnostics.derived.mmr_nodes_penalized > 0);
}
