use serde::{Deserialize, Serialize};
use tracing::debug;

use orbis_rng::FillRng;

/// Default relevance/diversity trade-off.
pub const DEFAULT_LAMBDA: f64 = 0.5;

/// One rebalance input: an optional embedding plus a relevance score.
#[derive(Debug, Clone, Copy)]
pub struct MmrItem<'a> {
    /// Embedding, when the node carries one
    pub vec: Option<&'a [f64]>,
    /// Relevance score in [0, 1]
    pub score: f64,
}

impl<'a> MmrItem<'a> {
    /// Scalar stand-in used on the 1-D path: `vec[0]` when present,
    /// otherwise the score itself.
    fn scalar(&self) -> f64 {
        match self.vec {
            Some(v) if !v.is_empty() => v[0],
            _ => self.score,
        }
    }
}

/// Stats emitted per rebalance call, carried into the next snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MmrStats {
    /// Selected items that paid a non-zero diversity penalty
    pub nodes_penalized: usize,
    /// Mean penalty across all selected picks (first pick pays zero)
    pub avg_penalty: f64,
    /// Maximum pairwise similarity within the selected subset
    pub max_similarity: f64,
}

/// Pairwise similarity between two items.
///
/// Cosine when both sides carry vectors of dimension >= 2; the 1-D path
/// degenerates to closeness-of-score. Both paths land in [0, 1] so the
/// penalty term can never boost an objective.
pub fn similarity(a: &MmrItem<'_>, b: &MmrItem<'_>) -> f64 {
    if let (Some(va), Some(vb)) = (a.vec, b.vec) {
        if va.len() >= 2 && va.len() == vb.len() {
            return cosine(va, vb);
        }
    }
    let closeness = 1.0 - (a.scalar() - b.scalar()).abs();
    closeness.max(0.0)
}

fn cosine(a: &[f64], b: &[f64]) -> f64 {
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for i in 0..a.len() {
        dot += a[i] * b[i];
        norm_a += a[i] * a[i];
        norm_b += b[i] * b[i];
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    (dot / denom).clamp(0.0, 1.0)
}

/// Greedy MMR selection of `k` items.
///
/// `candidates` must already be ordered best-first (the shim sorts by
/// `(-score, id)`); the seed pick is index 0. Each further round picks the
/// candidate maximising `lambda * score - (1 - lambda) * max_sim` against
/// the selected set. Exact objective ties consume one tie-break draw; with
/// distinct objectives the RNG is never consulted.
///
/// Returns the selected input-index permutation and the penalty stats.
pub fn rebalance(
    candidates: &[MmrItem<'_>],
    k: usize,
    lambda: f64,
    rng: &mut FillRng,
) -> (Vec<usize>, MmrStats) {
    if candidates.is_empty() || k == 0 {
        return (Vec::new(), MmrStats::default());
    }

    let mut taken = vec![false; candidates.len()];
    let mut selected: Vec<usize> = Vec::with_capacity(k.min(candidates.len()));
    let mut penalties: Vec<f64> = Vec::with_capacity(k.min(candidates.len()));

    selected.push(0);
    taken[0] = true;
    penalties.push(0.0);

    while selected.len() < k && selected.len() < candidates.len() {
        let mut best_obj = f64::NEG_INFINITY;
        // (candidate index, its max similarity against the selected set)
        let mut tied: Vec<(usize, f64)> = Vec::new();

        for (idx, item) in candidates.iter().enumerate() {
            if taken[idx] {
                continue;
            }
            let mut max_sim = 0.0_f64;
            for &sel in &selected {
                let sim = similarity(item, &candidates[sel]);
                if sim > max_sim {
                    max_sim = sim;
                }
            }
            let obj = lambda * item.score - (1.0 - lambda) * max_sim;
            if obj > best_obj {
                best_obj = obj;
                tied.clear();
                tied.push((idx, max_sim));
            } else if obj == best_obj {
                tied.push((idx, max_sim));
            }
        }

        let (choice, max_sim) = tied[rng.pick(tied.len())];
        taken[choice] = true;
        selected.push(choice);
        penalties.push((1.0 - lambda) * max_sim);
    }

    let nodes_penalized = penalties.iter().filter(|p| **p > 0.0).count();
    let avg_penalty = penalties.iter().sum::<f64>() / penalties.len() as f64;

    let mut max_similarity = 0.0_f64;
    for i in 0..selected.len() {
        for j in (i + 1)..selected.len() {
            let sim = similarity(&candidates[selected[i]], &candidates[selected[j]]);
            if sim > max_similarity {
                max_similarity = sim;
            }
        }
    }

    debug!(
        "MMR rebalance: candidates={}, k={}, selected={}, penalized={}",
        candidates.len(),
        k,
        selected.len(),
        nodes_penalized
    );

    (
        selected,
        MmrStats {
            nodes_penalized,
            avg_penalty,
            max_similarity,
        },
    )
}
