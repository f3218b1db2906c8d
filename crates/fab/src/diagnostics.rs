use serde::{Deserialize, Serialize};

use orbis_zspace::MmrStats;

use crate::precision::Precision;
use crate::types::FabMode;

/// Monotonic event counters. Plain integers; the core is single-threaded
/// per instance so no atomics are involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Counters {
    pub ticks: u64,
    pub fills: u64,
    pub mixes: u64,
    pub envelope_changes: u64,
    pub mode_transitions: u64,
    pub rebalance_events: u64,
}

/// Point-in-time gauges, captured at snapshot time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gauges {
    pub mode: FabMode,
    pub global_precision: Precision,
    pub stream_precision: Precision,
    pub stable_ticks: u32,
    pub stream_size: usize,
    pub global_size: usize,
}

/// Values computed at snapshot time from counters and window contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Derived {
    pub changes_per_1k: f64,
    pub selected_diversity: f64,
    pub mmr_nodes_penalized: usize,
    pub mmr_avg_penalty: f64,
    pub mmr_max_similarity: f64,
}

/// The full diagnostics surface of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub counters: Counters,
    pub gauges: Gauges,
    pub derived: Derived,
}

/// Immutable per-tick snapshot returned by `mix()`.
///
/// The serialized field names and tag values are a stable contract;
/// external observers and any persistence layer consume this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub mode: FabMode,
    pub global_size: usize,
    pub stream_size: usize,
    pub global_precision: Precision,
    pub stream_precision: Precision,
    pub stable_ticks: u32,
    pub diagnostics: Diagnostics,
}

impl Snapshot {
    /// Blake3 digest of the canonical JSON encoding.
    ///
    /// Hash equality across runs is the proof of determinism; harnesses
    /// compare these instead of whole snapshots.
    pub fn state_hash(&self) -> [u8; 32] {
        let canonical =
            serde_json::to_vec(self).expect("snapshot serialization is infallible");
        *blake3::hash(&canonical).as_bytes()
    }

    /// Hex form of `state_hash` for logs and test diagnostics.
    pub fn state_hash_hex(&self) -> String {
        hex::encode(self.state_hash())
    }
}

/// Derived-metric computation shared by `mix()` and tests.
pub fn derive(counters: &Counters, selected_diversity: f64, mmr: &MmrStats) -> Derived {
    Derived {
        changes_per_1k: counters.envelope_changes as f64 * 1000.0 / counters.ticks.max(1) as f64,
        selected_diversity,
        mmr_nodes_penalized: mmr.nodes_penalized,
        mmr_avg_penalty: mmr.avg_penalty,
        mmr_max_similarity: mmr.max_similarity,
    }
}
