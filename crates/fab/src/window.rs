use serde::{Deserialize, Serialize};

use orbis_zspace::ZNode;

use crate::precision::Precision;

/// Hard cap on the stream window, regardless of budget.
pub const STREAM_CAP_MAX: usize = 128;

/// Hard cap on the global window, regardless of budget.
pub const GLOBAL_CAP_MAX: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowName {
    Global,
    Stream,
}

/// A bounded, ordered node container.
///
/// Contents are owned deep copies of slice nodes, replaced wholesale by
/// each fill. When `self_slot_reserved` is set the core stops one short
/// of `cap_nodes`, leaving room for an externally placed [SELF] token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub name: WindowName,
    pub nodes: Vec<ZNode>,
    pub cap_nodes: usize,
    pub precision: Precision,
    pub self_slot_reserved: bool,
}

impl Window {
    pub fn new(
        name: WindowName,
        cap_nodes: usize,
        precision: Precision,
        self_slot_reserved: bool,
    ) -> Self {
        Self {
            name,
            nodes: Vec::new(),
            cap_nodes,
            precision,
            self_slot_reserved,
        }
    }

    /// Slots the core itself may fill.
    pub fn effective_cap(&self) -> usize {
        if self.self_slot_reserved {
            self.cap_nodes.saturating_sub(1)
        } else {
            self.cap_nodes
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.id.as_str())
    }

    /// Replace contents in selection order. Truncates at the effective
    /// cap; the selector should already respect it.
    pub fn replace_nodes(&mut self, mut nodes: Vec<ZNode>) {
        nodes.truncate(self.effective_cap());
        self.nodes = nodes;
    }

    /// Mean score of the contained nodes, 0.0 when empty.
    ///
    /// Summation runs in window order so the result is bit-stable.
    pub fn avg_score(&self) -> f64 {
        if self.nodes.is_empty() {
            return 0.0;
        }
        let mut sum = 0.0;
        for node in &self.nodes {
            sum += node.score;
        }
        sum / self.nodes.len() as f64
    }

    /// Population variance of the contained scores, 0.0 for one node or
    /// fewer.
    pub fn score_variance(&self) -> f64 {
        if self.nodes.len() <= 1 {
            return 0.0;
        }
        let mean = self.avg_score();
        let mut sum_sq = 0.0;
        for node in &self.nodes {
            let d = node.score - mean;
            sum_sq += d * d;
        }
        sum_sq / self.nodes.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(cap: usize, reserved: bool) -> Window {
        Window::new(WindowName::Stream, cap, Precision::Cold, reserved)
    }

    fn nodes(scores: &[f64]) -> Vec<ZNode> {
        scores
            .iter()
            .enumerate()
            .map(|(i, s)| ZNode::scored(format!("n{}", i), *s))
            .collect()
    }

    #[test]
    fn test_self_slot_reduces_effective_cap() {
        assert_eq!(stream(16, true).effective_cap(), 15);
        assert_eq!(stream(16, false).effective_cap(), 16);
        assert_eq!(stream(0, true).effective_cap(), 0);
    }

    #[test]
    fn test_replace_truncates_at_effective_cap() {
        let mut w = stream(4, true);
        w.replace_nodes(nodes(&[0.9, 0.8, 0.7, 0.6, 0.5]));
        assert_eq!(w.len(), 3);
    }

    #[test]
    fn test_avg_score() {
        let mut w = stream(8, false);
        assert_eq!(w.avg_score(), 0.0, "empty window averages to zero");

        w.replace_nodes(nodes(&[0.2, 0.4, 0.6]));
        assert!((w.avg_score() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_variance_degenerate_cases() {
        let mut w = stream(8, false);
        assert_eq!(w.score_variance(), 0.0);

        w.replace_nodes(nodes(&[0.9]));
        assert_eq!(w.score_variance(), 0.0, "single node has no spread");

        w.replace_nodes(nodes(&[0.5, 0.5, 0.5]));
        assert_eq!(w.score_variance(), 0.0, "identical scores have no spread");
    }

    #[test]
    fn test_variance_mixed_scores() {
        let mut w = stream(8, false);
        w.replace_nodes(nodes(&[0.9, 0.7]));
        // mean 0.8, deviations +-0.1
        assert!((w.score_variance() - 0.01).abs() < 1e-12);
    }
}
