//! Deterministic seed derivation and tie-break RNG for the FAB core
//!
//! This crate provides the seed plumbing that makes every fill cycle
//! reproducible: a cached per-session seed, a pure seed combiner over
//! `(z_seed, session_seed, tick)`, and a per-fill ChaCha20 stream used
//! exclusively for tie-breaking.
//!
//! # Features
//!
//! - Blake3-based seed derivation, stable across versions and platforms
//! - ChaCha20 tie-break streams, one instance per fill call
//! - Session id generation with a single entropy draw at construction
//!
//! # Usage
//!
//! ```rust
//! use orbis_rng::{combine, session_seed, FillRng};
//!
//! let session = session_seed("sid-1");
//! let mut rng = FillRng::new(combine("zs-1", session, 7));
//! let pick = rng.pick(3);
//! assert!(pick < 3);
//! ```

/// Seed derivation and combination
pub mod seed;

/// Per-fill tie-break stream
pub mod fill;

/// Re-export commonly used items
pub use fill::FillRng;
pub use seed::{combine, generate_session_id, session_seed};
