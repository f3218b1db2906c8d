/**
 * File: crates/fab/src/core.rs
 *
 * Purpose: FAB core orchestrator - the init_tick / fill / mix / step
 * pipeline that owns the windows, the envelope controller, and the mode
 * machine
 *
 * Invariants enforced:
 * - Budgets captured by init_tick are immutable until the next init_tick
 * - |global| + |stream| <= budgets.nodes; no id lives in both windows
 * - global precision is cold for the lifetime of the core
 * - Failed validation leaves every piece of state untouched
 * - Wall clock never enters state evolution; the per-fill RNG is seeded
 *   from (z.seed, session_seed, tick) alone
 */
use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use orbis_rng::{combine, generate_session_id, session_seed, FillRng};
use orbis_zspace::{
    select_topk_for_global, select_topk_for_stream, validate, Budgets, MmrStats, ZNode, ZSlice,
};

use crate::backpressure::{classify, Backpressure};
use crate::config::{EnvelopeMode, FabConfig};
use crate::diagnostics::{derive, Counters, Diagnostics, Gauges, Snapshot};
use crate::error::FabError;
use crate::hysteresis::EnvelopeController;
use crate::machine::{ModeMachine, StepOutcome};
use crate::precision::Precision;
use crate::types::{FabMode, Metrics};
use crate::window::{Window, WindowName, GLOBAL_CAP_MAX, STREAM_CAP_MAX};

/// One FAB core instance. Owned by exactly one logical caller; a tick is
/// the linear sequence `init_tick -> fill -> mix -> step`.
#[derive(Debug, Clone)]
pub struct FabCore {
    session_id: String,
    session_seed: u64,
    config: FabConfig,
    machine: ModeMachine,
    envelope: EnvelopeController,
    global: Window,
    stream: Window,
    counters: Counters,
    last_mmr: MmrStats,
    backpressure: Backpressure,
    /// Tick index, advanced by each init_tick; 0 means never initialized.
    tick: u64,
    /// Budgets fixed for the current tick.
    budgets: Option<Budgets>,
    prior_mode: FabMode,
}

impl FabCore {
    /// Construct a core for one session. A missing `session_id` draws one
    /// random id; everything downstream of construction is seed-derived.
    pub fn new(session_id: Option<String>, config: FabConfig) -> Self {
        let session_id = session_id.unwrap_or_else(generate_session_id);
        let session_seed = session_seed(&session_id);
        debug!("FabCore constructed: session={}", session_id);

        Self {
            machine: ModeMachine::new(
                FabMode::Fab0,
                config.hold_ms,
                config.stability_required,
                config.hard_reset_enabled,
            ),
            envelope: EnvelopeController::new(config.hysteresis, Precision::Cold),
            global: Window::new(
                WindowName::Global,
                0,
                Precision::Cold,
                config.reserve_self_slot,
            ),
            stream: Window::new(
                WindowName::Stream,
                0,
                Precision::Cold,
                config.reserve_self_slot,
            ),
            counters: Counters::default(),
            last_mmr: MmrStats::default(),
            backpressure: Backpressure::Ok,
            tick: 0,
            budgets: None,
            prior_mode: FabMode::Fab0,
            session_id,
            session_seed,
            config,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn mode(&self) -> FabMode {
        self.machine.mode()
    }

    pub fn stable_ticks(&self) -> u32 {
        self.machine.stable_ticks()
    }

    pub fn hold_ms(&self) -> u64 {
        self.machine.hold_ms()
    }

    /// Token-load band observed by the last fill.
    pub fn backpressure(&self) -> Backpressure {
        self.backpressure
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn stream(&self) -> &Window {
        &self.stream
    }

    pub fn global(&self) -> &Window {
        &self.global
    }

    /// Mode held before the current tick's `init_tick`.
    pub fn prior_mode(&self) -> FabMode {
        self.prior_mode
    }

    /// Switch the envelope driver between ticks. The committed precision
    /// carries over unchanged.
    pub fn set_envelope_mode(&mut self, mode: EnvelopeMode) {
        self.config.envelope_mode = mode;
    }

    /// Open a tick: fix budgets, compute window caps, record the prior
    /// mode for transition detection.
    pub fn init_tick(&mut self, mode: FabMode, budgets: Budgets) -> Result<(), FabError> {
        if !budgets.is_valid() {
            return Err(FabError::InvalidBudget);
        }

        self.tick += 1;
        self.prior_mode = self.machine.mode();
        self.machine.force_mode(mode);

        let nodes = budgets.nodes as usize;
        let stream_cap = nodes.min(STREAM_CAP_MAX);
        let global_cap = (nodes - stream_cap).min(GLOBAL_CAP_MAX);
        self.stream.cap_nodes = stream_cap;
        self.global.cap_nodes = global_cap;
        self.budgets = Some(budgets);

        debug!(
            "Tick {} opened: mode={}, stream_cap={}, global_cap={}",
            self.tick,
            self.machine.mode(),
            stream_cap,
            global_cap
        );
        Ok(())
    }

    /// Distribute a validated slice across the windows and update the
    /// stream envelope. Atomic: a rejected slice changes nothing.
    pub fn fill(&mut self, z: &ZSlice) -> Result<(), FabError> {
        let budgets = self.budgets.ok_or(FabError::NotInitialized("fill"))?;
        validate(z)?;

        self.backpressure = classify(budgets.tokens, &self.config.backpressure);
        match self.backpressure {
            Backpressure::Reject => warn!(
                "Token load {} in reject band at tick {}",
                budgets.tokens, self.tick
            ),
            Backpressure::Slow => debug!(
                "Token load {} in slow band at tick {}",
                budgets.tokens, self.tick
            ),
            Backpressure::Ok => {}
        }

        let mut rng = FillRng::new(combine(&z.seed, self.session_seed, self.tick));

        let stream_sel =
            select_topk_for_stream(z, self.stream.effective_cap(), self.config.mmr_lambda, &mut rng);
        let exclude: BTreeSet<String> = stream_sel.ids.iter().cloned().collect();
        let global_sel = select_topk_for_global(
            z,
            self.global.effective_cap(),
            &exclude,
            self.config.mmr_lambda,
            &mut rng,
        );

        let by_id: BTreeMap<&str, &ZNode> = z.nodes.iter().map(|n| (n.id.as_str(), n)).collect();
        self.stream.replace_nodes(materialize(&stream_sel.ids, &by_id));
        self.global.replace_nodes(materialize(&global_sel.ids, &by_id));

        for stats in [&stream_sel.mmr, &global_sel.mmr].into_iter().flatten() {
            self.counters.rebalance_events += 1;
            self.last_mmr = *stats;
        }

        let avg = self.stream.avg_score();
        let previous = self.stream.precision;
        self.stream.precision = match self.config.envelope_mode {
            EnvelopeMode::Legacy => self.envelope.assign_direct(avg),
            EnvelopeMode::Hysteresis => {
                self.envelope.observe(avg, self.stream.len(), self.tick)
            }
        };
        if self.stream.precision != previous {
            self.counters.envelope_changes += 1;
        }

        self.counters.fills += 1;
        debug!(
            "Fill at tick {}: stream={} (avg {:.3}, {}), global={}",
            self.tick,
            self.stream.len(),
            avg,
            self.stream.precision,
            self.global.len()
        );

        self.verify_invariants(&budgets)
    }

    /// Emit the immutable per-tick snapshot.
    pub fn mix(&mut self) -> Result<Snapshot, FabError> {
        if self.budgets.is_none() {
            return Err(FabError::NotInitialized("mix"));
        }
        self.counters.mixes += 1;

        let derived = derive(
            &self.counters,
            self.stream.score_variance(),
            &self.last_mmr,
        );
        Ok(Snapshot {
            mode: self.machine.mode(),
            global_size: self.global.len(),
            stream_size: self.stream.len(),
            global_precision: self.global.precision,
            stream_precision: self.stream.precision,
            stable_ticks: self.machine.stable_ticks(),
            diagnostics: Diagnostics {
                counters: self.counters,
                gauges: Gauges {
                    mode: self.machine.mode(),
                    global_precision: self.global.precision,
                    stream_precision: self.stream.precision,
                    stable_ticks: self.machine.stable_ticks(),
                    stream_size: self.stream.len(),
                    global_size: self.global.len(),
                },
                derived,
            },
        })
    }

    /// Close the tick: evaluate mode transitions against the metrics.
    pub fn step(&mut self, metrics: &Metrics) -> Result<StepOutcome, FabError> {
        if self.budgets.is_none() {
            return Err(FabError::NotInitialized("step"));
        }

        let (outcome, changed) = self.machine.step(metrics);
        if changed {
            self.counters.mode_transitions += 1;
        }
        self.counters.ticks += 1;
        Ok(outcome)
    }

    fn verify_invariants(&self, budgets: &Budgets) -> Result<(), FabError> {
        let violation = if self.global.len() + self.stream.len() > budgets.nodes as usize {
            Some("window occupancy exceeds node budget")
        } else if self.stream.len() > STREAM_CAP_MAX {
            Some("stream window exceeds hard cap")
        } else if self.global.len() > GLOBAL_CAP_MAX {
            Some("global window exceeds hard cap")
        } else if self.windows_overlap() {
            Some("node id present in both windows")
        } else if self.global.precision != Precision::Cold {
            Some("global precision left cold")
        } else {
            None
        };

        match violation {
            Some(which) => {
                tracing::error!("Invariant violated after fill: {}", which);
                Err(FabError::InternalInvariantViolated(which))
            }
            None => Ok(()),
        }
    }

    fn windows_overlap(&self) -> bool {
        let stream_ids: BTreeSet<&str> = self.stream.ids().collect();
        self.global.ids().any(|id| stream_ids.contains(id))
    }
}

fn materialize(ids: &[String], by_id: &BTreeMap<&str, &ZNode>) -> Vec<ZNode> {
    ids.iter()
        .filter_map(|id| by_id.get(id.as_str()).map(|n| (*n).clone()))
        .collect()
}
