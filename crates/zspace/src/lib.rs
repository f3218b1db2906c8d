//! Z-Space adapter for the FAB core
//!
//! This crate owns the candidate-slice data model and the two stateless
//! operations the core consumes each tick: slice validation and
//! deterministic top-k selection with an optional diversity rebalance.
//!
//! # Features
//!
//! - Serde-derived `ZNode`/`ZEdge`/`ZSlice` value types
//! - Fail-closed slice validation with a typed rejection reason
//! - Deterministic `(-score, id)` ordering; ids break score ties
//! - MMR rebalancing over `(vector, score)` pairs when candidates exceed k
//!
//! # Usage
//!
//! ```rust
//! use orbis_zspace::{validate, select_topk_for_stream, ZNode, ZSlice};
//! use orbis_rng::FillRng;
//!
//! let slice = ZSlice::new("zs-1", "zv1", vec![ZNode::scored("n1", 0.9)]);
//! validate(&slice).unwrap();
//! let mut rng = FillRng::new(7);
//! let picked = select_topk_for_stream(&slice, 1, 0.5, &mut rng);
//! assert_eq!(picked.ids, vec!["n1".to_string()]);
//! ```

/// Slice data model
pub mod slice;

/// Slice validation rules
pub mod validate;

/// Diversity-biased subset selection
pub mod mmr;

/// Deterministic top-k selection
pub mod select;

/// Re-export commonly used types
pub use mmr::{rebalance, MmrItem, MmrStats, DEFAULT_LAMBDA};
pub use select::{select_topk_for_global, select_topk_for_stream, Selection};
pub use slice::{Budgets, ZEdge, ZNode, ZSlice};
pub use validate::{validate, SliceViolation};
