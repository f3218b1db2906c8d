use std::collections::BTreeSet;

use tracing::debug;

use orbis_rng::FillRng;

use crate::mmr::{rebalance, MmrItem, MmrStats};
use crate::slice::{ZNode, ZSlice};

/// Outcome of a top-k selection: ids in selection order, plus the
/// rebalancer stats when MMR ran.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Selected node ids, best-first (MMR order when the rebalancer ran)
    pub ids: Vec<String>,
    /// Present iff the rebalancer was invoked for this selection
    pub mmr: Option<MmrStats>,
}

/// Order candidates by `(-score, id)`.
///
/// Descending score; the id tie-break is lexicographic and total, so the
/// ordering never depends on input permutation.
fn sorted_candidates<'a>(nodes: impl Iterator<Item = &'a ZNode>) -> Vec<&'a ZNode> {
    let mut candidates: Vec<&ZNode> = nodes.collect();
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
    candidates
}

fn select_topk(candidates: Vec<&ZNode>, k: usize, lambda: f64, rng: &mut FillRng) -> Selection {
    if candidates.len() > k && k > 1 {
        let items: Vec<MmrItem<'_>> = candidates
            .iter()
            .map(|n| MmrItem {
                vec: n.vec.as_deref(),
                score: n.score,
            })
            .collect();
        let (picked, stats) = rebalance(&items, k, lambda, rng);
        Selection {
            ids: picked.iter().map(|&i| candidates[i].id.clone()).collect(),
            mmr: Some(stats),
        }
    } else {
        Selection {
            ids: candidates
                .iter()
                .take(k)
                .map(|n| n.id.clone())
                .collect(),
            mmr: None,
        }
    }
}

/// Select up to `k` node ids for the stream window.
///
/// Sorts by `(-score, id)` and applies MMR when the candidate set exceeds
/// `k` and `k > 1`. With `k >= |nodes|` all candidates are returned.
pub fn select_topk_for_stream(z: &ZSlice, k: usize, lambda: f64, rng: &mut FillRng) -> Selection {
    let candidates = sorted_candidates(z.nodes.iter());
    let selection = select_topk(candidates, k, lambda, rng);
    debug!(
        "Stream selection: k={}, candidates={}, picked={}, mmr={}",
        k,
        z.nodes.len(),
        selection.ids.len(),
        selection.mmr.is_some()
    );
    selection
}

/// Select up to `k` node ids for the global window, excluding ids already
/// placed in the stream.
pub fn select_topk_for_global(
    z: &ZSlice,
    k: usize,
    exclude: &BTreeSet<String>,
    lambda: f64,
    rng: &mut FillRng,
) -> Selection {
    let candidates = sorted_candidates(z.nodes.iter().filter(|n| !exclude.contains(&n.id)));
    let selection = select_topk(candidates, k, lambda, rng);
    debug!(
        "Global selection: k={}, excluded={}, picked={}",
        k,
        exclude.len(),
        selection.ids.len()
    );
    selection
}
