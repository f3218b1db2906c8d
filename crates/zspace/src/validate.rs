use std::collections::BTreeSet;

use thiserror::Error;
use tracing::debug;

use crate::slice::ZSlice;

/// Reasons a candidate slice is rejected before it can reach a window.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SliceViolation {
    #[error("slice seed is empty")]
    MissingSeed,
    #[error("slice zv tag is empty")]
    MissingVersion,
    #[error("slice quotas admit no nodes")]
    EmptyQuota,
    #[error("duplicate node id: {0}")]
    DuplicateNodeId(String),
    #[error("node {id} score {score} outside [0, 1]")]
    ScoreOutOfRange { id: String, score: String },
    #[error("node {id} vector dimensionality {got}, slice uses {expected}")]
    MixedVectorDims { id: String, got: usize, expected: usize },
    #[error("edge references unknown node id: {0}")]
    UnknownEdgeEndpoint(String),
    #[error("edge {src}->{dst} weight {weight} outside [0, 1]")]
    EdgeWeightOutOfRange {
        src: String,
        dst: String,
        weight: String,
    },
}

/// Validate a slice against the Z-Space schema rules.
///
/// Checks are fail-closed and ordered so the first structural problem wins:
/// required fields, quota usability, node id uniqueness, score ranges,
/// uniform vector dimensionality, then edge endpoint and weight validity.
/// An empty node list is valid and yields empty windows downstream.
pub fn validate(z: &ZSlice) -> Result<(), SliceViolation> {
    if z.seed.is_empty() {
        return Err(SliceViolation::MissingSeed);
    }
    if z.zv.is_empty() {
        return Err(SliceViolation::MissingVersion);
    }
    if !z.quotas.is_valid() {
        return Err(SliceViolation::EmptyQuota);
    }

    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut vec_dims: Option<usize> = None;

    for node in &z.nodes {
        if !seen.insert(node.id.as_str()) {
            return Err(SliceViolation::DuplicateNodeId(node.id.clone()));
        }
        if !node.score.is_finite() || node.score < 0.0 || node.score > 1.0 {
            return Err(SliceViolation::ScoreOutOfRange {
                id: node.id.clone(),
                score: format!("{}", node.score),
            });
        }
        if let Some(vec) = &node.vec {
            match vec_dims {
                None => vec_dims = Some(vec.len()),
                Some(expected) if expected != vec.len() => {
                    return Err(SliceViolation::MixedVectorDims {
                        id: node.id.clone(),
                        got: vec.len(),
                        expected,
                    });
                }
                Some(_) => {}
            }
        }
    }

    for edge in &z.edges {
        if !seen.contains(edge.src.as_str()) {
            return Err(SliceViolation::UnknownEdgeEndpoint(edge.src.clone()));
        }
        if !seen.contains(edge.dst.as_str()) {
            return Err(SliceViolation::UnknownEdgeEndpoint(edge.dst.clone()));
        }
        if !edge.weight.is_finite() || edge.weight < 0.0 || edge.weight > 1.0 {
            return Err(SliceViolation::EdgeWeightOutOfRange {
                src: edge.src.clone(),
                dst: edge.dst.clone(),
                weight: format!("{}", edge.weight),
            });
        }
    }

    debug!(
        "Slice validated: seed={}, zv={}, nodes={}, edges={}",
        z.seed,
        z.zv,
        z.nodes.len(),
        z.edges.len()
    );
    Ok(())
}
