//! Minimum-weight perfect matching on an even vertex set.
//!
//! Small sets are solved exactly with a bitmask dynamic program. Larger sets
//! use a greedy matching refined by pairwise exchanges until no exchange
//! shortens it.

/// Improvement below which an exchange is not taken.
const IMPROVEMENT_EPS: f64 = 1e-9;

/// Upper bound on exchange passes for the heuristic matcher.
const MAX_EXCHANGE_PASSES: usize = 64;

/// Hard cap on the exact solver; its table holds 2^n entries.
const EXACT_SIZE_CAP: usize = 24;

/// Pair up `vertices` minimizing the summed `weight`.
///
/// `vertices` must have even length; a trailing vertex of an odd-length set
/// is left unmatched. Sets of up to `exact_limit` vertices are matched
/// optimally. Returned pairs hold the caller's vertex ids.
pub fn min_weight_perfect_matching<F>(
    vertices: &[usize],
    weight: F,
    exact_limit: usize,
) -> Vec<(usize, usize)>
where
    F: Fn(usize, usize) -> f64,
{
    let count = vertices.len() - vertices.len() % 2;
    if count == 0 {
        return Vec::new();
    }
    if count != vertices.len() {
        tracing::warn!(
            "Matching received {} vertices; vertex {} left unmatched",
            vertices.len(),
            vertices[count]
        );
    }

    let vertices = &vertices[..count];
    let local_weight = |i: usize, j: usize| weight(vertices[i], vertices[j]);

    let local = if count <= exact_limit.min(EXACT_SIZE_CAP) {
        exact_matching(count, &local_weight)
    } else {
        let mut pairs = greedy_matching(count, &local_weight);
        improve_by_exchange(&mut pairs, &local_weight);
        pairs
    };

    local
        .into_iter()
        .map(|(i, j)| (vertices[i], vertices[j]))
        .collect()
}

/// Total weight of `pairs` (local indices).
fn matching_cost<W: Fn(usize, usize) -> f64>(pairs: &[(usize, usize)], weight: &W) -> f64 {
    pairs.iter().map(|&(i, j)| weight(i, j)).sum()
}

fn exact_matching<W: Fn(usize, usize) -> f64>(count: usize, weight: &W) -> Vec<(usize, usize)> {
    // At most EXACT_SIZE_CAP vertices, so the table is small.
    let weights: Vec<Vec<f64>> = (0..count)
        .map(|i| (0..count).map(|j| weight(i, j)).collect())
        .collect();
    let full = (1usize << count) - 1;
    let mut cost = vec![f64::INFINITY; full + 1];
    let mut choice = vec![(0usize, 0usize); full + 1];
    cost[0] = 0.0;

    for mask in 0..full {
        if !cost[mask].is_finite() {
            continue;
        }
        // Always match the lowest unmatched vertex next; every matching is
        // reached exactly once this way.
        let i = mask.trailing_ones() as usize;
        for j in (i + 1)..count {
            if mask & (1 << j) != 0 {
                continue;
            }
            let next = mask | (1 << i) | (1 << j);
            let candidate = cost[mask] + weights[i][j];
            if candidate < cost[next] {
                cost[next] = candidate;
                choice[next] = (i, j);
            }
        }
    }

    let mut pairs = Vec::with_capacity(count / 2);
    let mut mask = full;
    while mask != 0 {
        let (i, j) = choice[mask];
        pairs.push((i, j));
        mask &= !((1 << i) | (1 << j));
    }
    pairs.reverse();
    pairs
}

/// Nearest unmatched partner of `i`; ties go to the lowest index.
fn nearest_unmatched<W: Fn(usize, usize) -> f64>(
    i: usize,
    matched: &[bool],
    weight: &W,
) -> Option<(usize, f64)> {
    let mut nearest: Option<(usize, f64)> = None;
    for j in 0..matched.len() {
        if j == i || matched[j] {
            continue;
        }
        let w = weight(i, j);
        if nearest.map_or(true, |(_, best)| w < best) {
            nearest = Some((j, w));
        }
    }
    nearest
}

/// Repeatedly match the cheapest remaining pair.
///
/// Each vertex caches its nearest unmatched partner, so memory stays linear;
/// a cache entry is refreshed only when its partner gets matched.
fn greedy_matching<W: Fn(usize, usize) -> f64>(count: usize, weight: &W) -> Vec<(usize, usize)> {
    let mut matched = vec![false; count];
    let mut nearest: Vec<Option<(usize, f64)>> = (0..count)
        .map(|i| nearest_unmatched(i, &matched, weight))
        .collect();
    let mut pairs = Vec::with_capacity(count / 2);

    while pairs.len() < count / 2 {
        let mut cheapest: Option<(usize, usize, f64)> = None;
        for i in 0..count {
            if matched[i] {
                continue;
            }
            if let Some((j, w)) = nearest[i] {
                if cheapest.map_or(true, |(_, _, best)| w < best) {
                    cheapest = Some((i, j, w));
                }
            }
        }
        let Some((i, j, _)) = cheapest else {
            break;
        };
        matched[i] = true;
        matched[j] = true;
        pairs.push((i.min(j), i.max(j)));

        for k in 0..count {
            if matched[k] {
                continue;
            }
            if matches!(nearest[k], Some((partner, _)) if partner == i || partner == j) {
                nearest[k] = nearest_unmatched(k, &matched, weight);
            }
        }
    }
    pairs
}

/// Re-pair two matched pairs whenever swapping partners lowers the total.
fn improve_by_exchange<W: Fn(usize, usize) -> f64>(pairs: &mut [(usize, usize)], weight: &W) {
    for _ in 0..MAX_EXCHANGE_PASSES {
        let mut improved = false;
        for p in 0..pairs.len() {
            for q in (p + 1)..pairs.len() {
                let (a, b) = pairs[p];
                let (c, d) = pairs[q];
                let current = weight(a, b) + weight(c, d);
                let crossed = weight(a, c) + weight(b, d);
                let swapped = weight(a, d) + weight(b, c);
                if crossed < current - IMPROVEMENT_EPS && crossed <= swapped {
                    pairs[p] = (a, c);
                    pairs[q] = (b, d);
                    improved = true;
                } else if swapped < current - IMPROVEMENT_EPS {
                    pairs[p] = (a, d);
                    pairs[q] = (b, c);
                    improved = true;
                }
            }
        }
        if !improved {
            return;
        }
    }
    tracing::debug!(
        "Matching exchange stopped after {} passes at cost {:.3}",
        MAX_EXCHANGE_PASSES,
        matching_cost(pairs, weight)
    );
}
