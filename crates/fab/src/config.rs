use serde::{Deserialize, Serialize};

use crate::backpressure::BackpressureThresholds;

/// How the stream envelope precision is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeMode {
    /// Direct score-to-precision assignment every fill
    #[default]
    Legacy,
    /// Dwell + rate-limited transitions with the tiny-sample guard
    Hysteresis,
}

/// Hysteresis controller tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HysteresisConfig {
    /// Consecutive confirming fills required before a target commits
    pub dwell_time: u32,
    /// Minimum ticks between two committed changes
    pub rate_limit_ticks: u64,
    /// Stream occupancy below which upgrades are blocked
    pub min_stream_for_upgrade: usize,
}

impl Default for HysteresisConfig {
    fn default() -> Self {
        Self {
            dwell_time: 3,
            rate_limit_ticks: 1000,
            min_stream_for_upgrade: 8,
        }
    }
}

/// Full core configuration. All policy values are injected here; nothing
/// is tuned at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FabConfig {
    /// Envelope driver, `legacy` by default
    pub envelope_mode: EnvelopeMode,
    /// Hysteresis tuning, used only in `hysteresis` mode
    pub hysteresis: HysteresisConfig,
    /// Advisory minimum wall-clock retention per mode, for observers
    pub hold_ms: u64,
    /// Token-load band thresholds
    pub backpressure: BackpressureThresholds,
    /// MMR relevance/diversity trade-off
    pub mmr_lambda: f64,
    /// Consecutive stable ticks required for FAB1 -> FAB2
    pub stability_required: u32,
    /// Enable the FAB1 -> FAB0 hard reset on extreme stress
    pub hard_reset_enabled: bool,
    /// Keep one window slot free for an externally placed [SELF] token
    pub reserve_self_slot: bool,
}

impl Default for FabConfig {
    fn default() -> Self {
        Self {
            envelope_mode: EnvelopeMode::Legacy,
            hysteresis: HysteresisConfig::default(),
            hold_ms: 1500,
            backpressure: BackpressureThresholds::default(),
            mmr_lambda: orbis_zspace::DEFAULT_LAMBDA,
            stability_required: 3,
            hard_reset_enabled: true,
            reserve_self_slot: true,
        }
    }
}

impl FabConfig {
    /// Default configuration with hysteresis-driven envelope transitions.
    pub fn with_hysteresis(hysteresis: HysteresisConfig) -> Self {
        Self {
            envelope_mode: EnvelopeMode::Hysteresis,
            hysteresis,
            ..Self::default()
        }
    }
}
