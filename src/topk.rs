use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::config::Ranking;
use crate::geo::haversine_km;
use crate::models::{Coordinate, ResultItem, ScoredCandidate};

#[derive(Clone, Copy)]
struct HeapItem {
    metric: f64,
    idx: usize,
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.metric == other.metric
    }
}
impl Eq for HeapItem {}

impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.metric.partial_cmp(&other.metric).unwrap_or(Ordering::Equal)
    }
}

/// The per-candidate ranking metric: `power_per_cost` when cost-ranking is
/// requested and a land price is available, otherwise RPS (spec.md §4.10).
fn ranking_metric(c: &ScoredCandidate, rank_by_cost: bool) -> f64 {
    if rank_by_cost {
        if let Some(ppc) = c.power_per_cost {
            return ppc;
        }
    }
    c.rps
}

/// Selects the top `k` spatially-spread candidates from `candidates`,
/// relative to `center`, per spec.md §4.10: a bounded max-heap of size
/// `M = max(heap_floor, k)` narrows the field to O(n log M), then a greedy
/// minimum-spacing pass over the heap contents (sorted descending by
/// metric, deterministic tie-break) produces the final ranked output.
///
/// # Arguments
///
/// * 'candidates' - scored candidates, any order
/// * 'k' - number of results requested
/// * 'center' - request center, used for the distance tie-break
/// * 'rank_by_cost' - whether to rank by energy-per-dollar instead of RPS
/// * 'ranking' - configured heap floor and minimum spacing
pub fn select_top_k(candidates: &[ScoredCandidate], k: usize, center: Coordinate, rank_by_cost: bool, ranking: &Ranking) -> Vec<ResultItem> {
    if candidates.is_empty() || k == 0 {
        return Vec::new();
    }

    let m = ranking.heap_floor.max(k);

    let mut heap: BinaryHeap<Reverse<HeapItem>> = BinaryHeap::with_capacity(m + 1);
    for (idx, c) in candidates.iter().enumerate() {
        let metric = ranking_metric(c, rank_by_cost);
        heap.push(Reverse(HeapItem { metric, idx }));
        if heap.len() > m {
            heap.pop();
        }
    }

    let mut shortlist: Vec<&ScoredCandidate> = heap.into_iter().map(|Reverse(item)| &candidates[item.idx]).collect();

    shortlist.sort_by(|a, b| {
        let metric_a = ranking_metric(a, rank_by_cost);
        let metric_b = ranking_metric(b, rank_by_cost);

        metric_b
            .partial_cmp(&metric_a)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.rps.partial_cmp(&a.rps).unwrap_or(Ordering::Equal))
            .then_with(|| {
                let da = haversine_km(center, a.candidate.loc);
                let db = haversine_km(center, b.candidate.loc);
                da.partial_cmp(&db).unwrap_or(Ordering::Equal)
            })
            .then_with(|| a.candidate.loc.lat.partial_cmp(&b.candidate.loc.lat).unwrap_or(Ordering::Equal))
            .then_with(|| a.candidate.loc.lng.partial_cmp(&b.candidate.loc.lng).unwrap_or(Ordering::Equal))
    });

    let mut selected: Vec<&ScoredCandidate> = Vec::with_capacity(k);
    for candidate in shortlist {
        if selected.len() >= k {
            break;
        }
        let too_close = selected.iter().any(|s| haversine_km(s.candidate.loc, candidate.candidate.loc) * 1000.0 < ranking.min_spacing_m);
        if too_close {
            continue;
        }
        selected.push(candidate);
    }

    selected
        .into_iter()
        .enumerate()
        .map(|(i, c)| ResultItem {
            rank: i + 1,
            lat: c.candidate.loc.lat,
            lng: c.candidate.loc.lng,
            score: ranking_metric(c, rank_by_cost),
            kwh_per_day: c.kwh_per_day,
            land_price_usd_per_m2: c.land_price.as_ref().map(|p| p.price_usd_per_m2),
            power_per_cost: c.power_per_cost,
        })
        .collect()
}
