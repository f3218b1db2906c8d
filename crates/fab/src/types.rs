use serde::{Deserialize, Serialize};
use std::fmt;

/// Operational mode ladder: FAB0 baseline, FAB1 presence, FAB2 engaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FabMode {
    #[serde(rename = "FAB0")]
    Fab0,
    #[serde(rename = "FAB1")]
    Fab1,
    #[serde(rename = "FAB2")]
    Fab2,
}

impl FabMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FabMode::Fab0 => "FAB0",
            FabMode::Fab1 => "FAB1",
            FabMode::Fab2 => "FAB2",
        }
    }
}

impl fmt::Display for FabMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-tick health metrics driving mode transitions.
///
/// All three fields are expected in [0, 1]; `clamped` saturates anything
/// else (including non-finite values) before the state machine sees it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// System stress level
    pub stress: f64,
    /// Degree of self-token presence
    pub self_presence: f64,
    /// Observed error rate
    pub error_rate: f64,
}

impl Metrics {
    pub fn new(stress: f64, self_presence: f64, error_rate: f64) -> Self {
        Self {
            stress,
            self_presence,
            error_rate,
        }
    }

    /// Saturate every field into [0, 1]; non-finite values collapse to 0.
    pub fn clamped(&self) -> Self {
        fn unit(v: f64) -> f64 {
            if v.is_finite() {
                v.clamp(0.0, 1.0)
            } else {
                0.0
            }
        }
        Self {
            stress: unit(self.stress),
            self_presence: unit(self.self_presence),
            error_rate: unit(self.error_rate),
        }
    }
}
