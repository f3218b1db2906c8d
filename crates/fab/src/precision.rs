use serde::{Deserialize, Serialize};
use std::fmt;

/// Level returned for any precision tag outside the ladder.
///
/// Compares lower than every known level, so an unknown tag can never
/// satisfy an upgrade comparison.
pub const UNKNOWN_LEVEL: i32 = -1;

/// The totally ordered precision ladder: cold < warm-low < warm-high < hot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Precision {
    #[serde(rename = "cold")]
    Cold,
    #[serde(rename = "warm-low")]
    WarmLow,
    #[serde(rename = "warm-high")]
    WarmHigh,
    #[serde(rename = "hot")]
    Hot,
}

impl Precision {
    /// Integer rank on the ladder, 0 through 3.
    pub fn level(self) -> i32 {
        match self {
            Precision::Cold => 0,
            Precision::WarmLow => 1,
            Precision::WarmHigh => 2,
            Precision::Hot => 3,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Precision::Cold => "cold",
            Precision::WarmLow => "warm-low",
            Precision::WarmHigh => "warm-high",
            Precision::Hot => "hot",
        }
    }

    /// Parse one of the four canonical tags; anything else is unknown.
    pub fn from_tag(tag: &str) -> Option<Precision> {
        match tag {
            "cold" => Some(Precision::Cold),
            "warm-low" => Some(Precision::WarmLow),
            "warm-high" => Some(Precision::WarmHigh),
            "hot" => Some(Precision::Hot),
            _ => None,
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Level of an arbitrary tag string; `UNKNOWN_LEVEL` for anything
/// outside the ladder.
pub fn tag_level(tag: &str) -> i32 {
    Precision::from_tag(tag).map_or(UNKNOWN_LEVEL, Precision::level)
}

/// Map an average stream score to a precision level.
///
/// Bands are monotone non-decreasing in the score.
pub fn assign(avg_score: f64) -> Precision {
    if avg_score >= 0.80 {
        Precision::Hot
    } else if avg_score >= 0.60 {
        Precision::WarmHigh
    } else if avg_score >= 0.40 {
        Precision::WarmLow
    } else {
        Precision::Cold
    }
}
