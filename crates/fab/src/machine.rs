/**
 * File: crates/fab/src/machine.rs
 *
 * Purpose: FAB0/FAB1/FAB2 operational mode machine
 *
 * Invariants enforced:
 * - stable_ticks is reset to zero on every transition, up or down
 * - FAB0 -> FAB1 requires self-presence; FAB1 -> FAB2 additionally
 *   requires stability_required consecutive qualifying ticks
 * - Wall-clock time never gates a transition; hold_ms is advisory only
 */
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::{FabMode, Metrics};

/// Result of one state-machine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub mode: FabMode,
    pub stable_ticks: u32,
}

/// The three-state operational mode machine.
///
/// Stability is counted increment-first: a tick spent in FAB1 or FAB2
/// contributes to `stable_ticks` before transitions are evaluated, so a
/// promotion that requires N stable ticks fires on the (N+1)-th step
/// after entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeMachine {
    mode: FabMode,
    stable_ticks: u32,
    hold_ms: u64,
    stability_required: u32,
    hard_reset_enabled: bool,
}

impl ModeMachine {
    pub fn new(
        mode: FabMode,
        hold_ms: u64,
        stability_required: u32,
        hard_reset_enabled: bool,
    ) -> Self {
        Self {
            mode,
            stable_ticks: 0,
            hold_ms,
            stability_required,
            hard_reset_enabled,
        }
    }

    pub fn mode(&self) -> FabMode {
        self.mode
    }

    pub fn stable_ticks(&self) -> u32 {
        self.stable_ticks
    }

    /// Advisory minimum retention per mode for wall-clock observers.
    pub fn hold_ms(&self) -> u64 {
        self.hold_ms
    }

    /// Caller-driven mode override (tick initialization). A forced change
    /// restarts the stability count.
    pub fn force_mode(&mut self, mode: FabMode) {
        if mode != self.mode {
            info!("Mode forced: {} -> {}", self.mode, mode);
            self.mode = mode;
            self.stable_ticks = 0;
        }
    }

    /// Evaluate one tick of metrics. Returns the outcome and whether a
    /// transition fired.
    pub fn step(&mut self, metrics: &Metrics) -> (StepOutcome, bool) {
        let m = metrics.clamped();
        let prev = self.mode;

        if matches!(self.mode, FabMode::Fab1 | FabMode::Fab2) {
            self.stable_ticks += 1;
        }

        match self.mode {
            FabMode::Fab0 => {
                if m.self_presence >= 0.8 && m.stress < 0.7 && m.error_rate <= 0.05 {
                    self.mode = FabMode::Fab1;
                    self.stable_ticks = 0;
                }
            }
            FabMode::Fab1 => {
                if self.hard_reset_enabled && m.stress > 0.9 {
                    self.mode = FabMode::Fab0;
                    self.stable_ticks = 0;
                } else if self.stable_ticks >= self.stability_required
                    && m.stress < 0.5
                    && m.error_rate <= 0.05
                {
                    self.mode = FabMode::Fab2;
                    self.stable_ticks = 0;
                }
            }
            FabMode::Fab2 => {
                if m.stress > 0.7 || m.error_rate > 0.05 {
                    self.mode = FabMode::Fab1;
                    self.stable_ticks = 0;
                }
            }
        }

        let changed = self.mode != prev;
        if changed {
            info!(
                "Mode transition: {} -> {} (stress={:.2}, presence={:.2}, errors={:.3})",
                prev, self.mode, m.stress, m.self_presence, m.error_rate
            );
        }

        (
            StepOutcome {
                mode: self.mode,
                stable_ticks: self.stable_ticks,
            },
            changed,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine(mode: FabMode) -> ModeMachine {
        ModeMachine::new(mode, 1500, 3, true)
    }

    fn calm() -> Metrics {
        Metrics::new(0.1, 0.9, 0.0)
    }

    #[test]
    fn test_happy_path_promotion() {
        let mut m = machine(FabMode::Fab0);

        let (o, changed) = m.step(&calm());
        assert!(changed);
        assert_eq!(o.mode, FabMode::Fab1);
        assert_eq!(o.stable_ticks, 0);

        let (o, _) = m.step(&calm());
        assert_eq!((o.mode, o.stable_ticks), (FabMode::Fab1, 1));
        let (o, _) = m.step(&calm());
        assert_eq!((o.mode, o.stable_ticks), (FabMode::Fab1, 2));

        let (o, changed) = m.step(&calm());
        assert!(changed, "fourth step promotes");
        assert_eq!((o.mode, o.stable_ticks), (FabMode::Fab2, 0));

        let (o, _) = m.step(&calm());
        assert_eq!((o.mode, o.stable_ticks), (FabMode::Fab2, 1));
    }

    #[test]
    fn test_fab0_requires_self_presence() {
        let mut m = machine(FabMode::Fab0);
        let (o, changed) = m.step(&Metrics::new(0.1, 0.79, 0.0));
        assert!(!changed);
        assert_eq!(o.mode, FabMode::Fab0);

        let (o, _) = m.step(&Metrics::new(0.1, 0.8, 0.0));
        assert_eq!(o.mode, FabMode::Fab1);
    }

    #[test]
    fn test_fab0_blocked_by_stress_or_errors() {
        let mut m = machine(FabMode::Fab0);
        let (o, _) = m.step(&Metrics::new(0.7, 0.9, 0.0));
        assert_eq!(o.mode, FabMode::Fab0, "stress at 0.7 blocks entry");

        let (o, _) = m.step(&Metrics::new(0.1, 0.9, 0.06));
        assert_eq!(o.mode, FabMode::Fab0, "errors above 0.05 block entry");
    }

    #[test]
    fn test_degradation_resets_stability() {
        let mut m = machine(FabMode::Fab2);
        for _ in 0..10 {
            m.step(&calm());
        }
        assert_eq!(m.stable_ticks(), 10);

        let (o, changed) = m.step(&Metrics::new(0.8, 0.9, 0.0));
        assert!(changed);
        assert_eq!((o.mode, o.stable_ticks), (FabMode::Fab1, 0));
    }

    #[test]
    fn test_fab2_degrades_on_errors() {
        let mut m = machine(FabMode::Fab2);
        let (o, _) = m.step(&Metrics::new(0.1, 0.9, 0.06));
        assert_eq!(o.mode, FabMode::Fab1);
    }

    #[test]
    fn test_hard_reset_floor() {
        let mut m = machine(FabMode::Fab1);
        let (o, _) = m.step(&Metrics::new(0.95, 0.9, 0.0));
        assert_eq!(o.mode, FabMode::Fab0, "extreme stress resets to FAB0");

        // With the gate off, FAB1 is the floor.
        let mut m = ModeMachine::new(FabMode::Fab1, 1500, 3, false);
        let (o, _) = m.step(&Metrics::new(0.95, 0.9, 0.0));
        assert_eq!(o.mode, FabMode::Fab1);
    }

    #[test]
    fn test_promotion_blocked_by_stress_band() {
        let mut m = machine(FabMode::Fab1);
        // Stress in [0.5, 0.7): stays in FAB1 forever, stability grows.
        for _ in 0..6 {
            m.step(&Metrics::new(0.6, 0.9, 0.0));
        }
        assert_eq!(m.mode(), FabMode::Fab1);
        assert_eq!(m.stable_ticks(), 6);
    }

    #[test]
    fn test_out_of_range_metrics_are_clamped() {
        let mut m = machine(FabMode::Fab0);
        // Presence above 1.0 clamps to 1.0 and qualifies.
        let (o, _) = m.step(&Metrics::new(-3.0, 7.5, -0.5));
        assert_eq!(o.mode, FabMode::Fab1);
    }

    #[test]
    fn test_force_mode_resets_stability() {
        let mut m = machine(FabMode::Fab1);
        m.step(&calm());
        assert_eq!(m.stable_ticks(), 1);

        m.force_mode(FabMode::Fab2);
        assert_eq!(m.stable_ticks(), 0);

        m.force_mode(FabMode::Fab2);
        assert_eq!(m.stable_ticks(), 0, "no-op force keeps the count");
    }
}
