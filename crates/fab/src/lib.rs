//! FAB core - deterministic per-tick context scheduling
//!
//! This crate implements the Fractal Associative Bus core: a bounded pool
//! of context nodes allocated between a Global and a Stream window each
//! tick, a hysteresis-gated precision envelope on the stream, and the
//! FAB0/FAB1/FAB2 operational mode machine.
//!
//! # Features
//!
//! - Fixed-budget window allocation with deterministic top-k selection
//! - Anti-oscillation precision control (dwell, rate limit, tiny-sample
//!   guard) with a legacy direct-assignment mode
//! - Metrics-driven mode ladder with degradation and stability tracking
//! - A stable diagnostics snapshot surface for external observers
//!
//! # Usage
//!
//! ```rust
//! use orbis_fab::{Budgets, FabConfig, FabCore, FabMode, Metrics, ZNode, ZSlice};
//!
//! let mut core = FabCore::new(Some("sid-1".to_string()), FabConfig::default());
//! let z = ZSlice::new("zs-1", "zv1", vec![ZNode::scored("n1", 0.9)]);
//!
//! core.init_tick(FabMode::Fab0, Budgets::default()).unwrap();
//! core.fill(&z).unwrap();
//! let snapshot = core.mix().unwrap();
//! let outcome = core.step(&Metrics::new(0.1, 0.9, 0.0)).unwrap();
//! assert_eq!(snapshot.stream_size, 1);
//! assert_eq!(outcome.mode, FabMode::Fab1);
//! ```
//!
//! One tick is the linear sequence `init_tick -> fill -> mix -> step`.
//! The core performs no I/O and holds no shared state; independent
//! instances may run on independent threads.

/// Error taxonomy
pub mod error;

/// Core data model: modes and metrics
pub mod types;

/// Precision ladder and score bands
pub mod precision;

/// Token-load classification
pub mod backpressure;

/// Injected configuration
pub mod config;

/// Envelope hysteresis controller
pub mod hysteresis;

/// Bounded window containers
pub mod window;

/// Operational mode machine
pub mod machine;

/// Counters, gauges, and the snapshot surface
pub mod diagnostics;

/// The orchestrator
pub mod core;

/// Re-export commonly used types
pub use crate::core::FabCore;
pub use backpressure::{classify, Backpressure, BackpressureThresholds};
pub use config::{EnvelopeMode, FabConfig, HysteresisConfig};
pub use diagnostics::{Counters, Derived, Diagnostics, Gauges, Snapshot};
pub use error::FabError;
pub use hysteresis::EnvelopeController;
pub use machine::{ModeMachine, StepOutcome};
pub use precision::{assign, tag_level, Precision, UNKNOWN_LEVEL};
pub use types::{FabMode, Metrics};
pub use window::{Window, WindowName, GLOBAL_CAP_MAX, STREAM_CAP_MAX};

/// Re-export the slice data model consumed by `fill`
pub use orbis_zspace::{Budgets, MmrStats, ZEdge, ZNode, ZSlice};
