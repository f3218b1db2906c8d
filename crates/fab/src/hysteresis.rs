/**
 * File: crates/fab/src/hysteresis.rs
 *
 * Purpose: Anti-oscillation controller for the stream envelope precision
 *
 * Invariants enforced:
 * - An upgrade never commits while the stream holds fewer nodes than
 *   min_stream_for_upgrade; downgrades are never blocked by the guard
 * - No two committed changes land closer than rate_limit_ticks apart
 * - A target must be re-proposed dwell_time consecutive evaluations
 *   before it commits
 * - current is always one of the four ladder values, never an unknown tag
 */
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::HysteresisConfig;
use crate::precision::{assign, Precision};

/// Dwell + rate-limited precision controller for one envelope layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeController {
    config: HysteresisConfig,
    current: Precision,
    target: Precision,
    dwell_remaining: u32,
    /// Tick of the last committed change; `None` until the first one, so
    /// the rate limiter cannot block the initial transition.
    last_change_tick: Option<u64>,
}

impl EnvelopeController {
    pub fn new(config: HysteresisConfig, initial: Precision) -> Self {
        Self {
            current: initial,
            target: initial,
            dwell_remaining: config.dwell_time,
            last_change_tick: None,
            config,
        }
    }

    /// Committed precision as of the last evaluation.
    pub fn current(&self) -> Precision {
        self.current
    }

    /// Pending target (equals `current` when nothing is in flight).
    pub fn target(&self) -> Precision {
        self.target
    }

    /// One hysteresis evaluation for a fill cycle.
    ///
    /// Ordering is fixed: propose from the score, apply the tiny-sample
    /// guard, then the rate limiter (which freezes all bookkeeping while
    /// active), then dwell tracking and commit. Returns the committed
    /// precision for this tick.
    pub fn observe(&mut self, avg_score: f64, stream_len: usize, tick: u64) -> Precision {
        let mut proposed = assign(avg_score);

        // Tiny-sample guard: a thin stream cannot justify an upgrade.
        if stream_len < self.config.min_stream_for_upgrade
            && proposed.level() > self.current.level()
        {
            debug!(
                "Upgrade to {} blocked: stream {} below min {}",
                proposed, stream_len, self.config.min_stream_for_upgrade
            );
            proposed = self.current;
        }

        // Rate limit: hold everything while a recent change is cooling off.
        if let Some(last) = self.last_change_tick {
            if tick.saturating_sub(last) < self.config.rate_limit_ticks {
                return self.current;
            }
        }

        if proposed == self.target {
            if self.dwell_remaining > 0 {
                self.dwell_remaining -= 1;
            }
            if self.dwell_remaining == 0 {
                let committed = self.target;
                self.dwell_remaining = self.config.dwell_time;
                if committed != self.current {
                    info!(
                        "Envelope precision committed: {} -> {} at tick {}",
                        self.current, committed, tick
                    );
                    self.current = committed;
                    self.last_change_tick = Some(tick);
                }
            }
        } else {
            debug!(
                "Envelope retarget: {} -> {} (dwell {})",
                self.target, proposed, self.config.dwell_time
            );
            self.target = proposed;
            self.dwell_remaining = self.config.dwell_time;
        }

        self.current
    }

    /// Legacy-mode assignment: bypass dwell, guard, and rate limit.
    ///
    /// Keeps `current`/`target` in sync so a later switch back to
    /// hysteresis mode resumes from the assigned value without
    /// corruption.
    pub fn assign_direct(&mut self, avg_score: f64) -> Precision {
        let proposed = assign(avg_score);
        if proposed != self.current {
            info!(
                "Envelope precision assigned directly: {} -> {}",
                self.current, proposed
            );
        }
        self.current = proposed;
        self.target = proposed;
        self.dwell_remaining = self.config.dwell_time;
        self.current
    }
}
