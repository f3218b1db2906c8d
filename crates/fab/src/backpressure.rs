use serde::{Deserialize, Serialize};

/// Instantaneous token-load classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backpressure {
    Ok,
    Slow,
    Reject,
}

/// Injectable band thresholds. Bands are half-open:
/// `[0, ok)` is ok, `[ok, reject)` is slow, `[reject, inf)` is reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackpressureThresholds {
    pub ok: u32,
    pub reject: u32,
}

impl Default for BackpressureThresholds {
    fn default() -> Self {
        Self {
            ok: 2000,
            reject: 5000,
        }
    }
}

/// Classify a token load against the configured bands.
pub fn classify(tokens: u32, thresholds: &BackpressureThresholds) -> Backpressure {
    if tokens >= thresholds.reject {
        Backpressure::Reject
    } else if tokens >= thresholds.ok {
        Backpressure::Slow
    } else {
        Backpressure::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_edges() {
        let t = BackpressureThresholds::default();
        assert_eq!(classify(0, &t), Backpressure::Ok);
        assert_eq!(classify(1999, &t), Backpressure::Ok);
        assert_eq!(classify(2000, &t), Backpressure::Slow);
        assert_eq!(classify(4999, &t), Backpressure::Slow);
        assert_eq!(classify(5000, &t), Backpressure::Reject);
        assert_eq!(classify(u32::MAX, &t), Backpressure::Reject);
    }

    #[test]
    fn test_injected_thresholds() {
        let t = BackpressureThresholds { ok: 10, reject: 20 };
        assert_eq!(classify(9, &t), Backpressure::Ok);
        assert_eq!(classify(10, &t), Backpressure::Slow);
        assert_eq!(classify(20, &t), Backpressure::Reject);
    }
}
