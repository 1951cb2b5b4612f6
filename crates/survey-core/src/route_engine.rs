//! Route ordering for capture waypoints.
//!
//! Every strategy solves the open-path variant of metric TSP on planar
//! Euclidean distances: the route starts at the start point, visits every
//! waypoint exactly once and does not return. Node 0 is always the start;
//! node `i + 1` is waypoint `i`.

use crate::christofides::christofides_path;
use crate::error::{PlanError, PlanResult};
use crate::models::{Algorithm, PlanarPoint};
use crate::rules::PlannerRules;
use serde::{Deserialize, Serialize};
use std::iter;
use std::thread::ScopedJoinHandle;

/// Improvement below which two route lengths count as equal.
const LENGTH_EPS_M: f64 = 1e-9;

/// Ordered visitation sequence beginning at the start point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Start point followed by every waypoint in flight order
    pub points: Vec<PlanarPoint>,
    /// Input waypoint indices in flight order (start excluded)
    pub visit_order: Vec<usize>,
    pub length_m: f64,
}

impl Route {
    fn start_only(start: PlanarPoint) -> Self {
        Self {
            points: vec![start],
            visit_order: Vec::new(),
            length_m: 0.0,
        }
    }
}

/// Symmetric distances over {start} ∪ waypoints, node 0 being the start.
pub(crate) trait Distances {
    fn len(&self) -> usize;

    fn get(&self, i: usize, j: usize) -> f64;

    fn path_length(&self, order: &[usize]) -> f64 {
        order.windows(2).map(|w| self.get(w[0], w[1])).sum()
    }
}

/// Distances computed from the node coordinates on every lookup.
///
/// Memory stays linear in the node count, so the polynomial strategies can
/// order surveys of any size.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NodeDistances<'a> {
    nodes: &'a [PlanarPoint],
}

impl<'a> NodeDistances<'a> {
    pub(crate) fn new(nodes: &'a [PlanarPoint]) -> Self {
        Self { nodes }
    }
}

impl Distances for NodeDistances<'_> {
    fn len(&self) -> usize {
        self.nodes.len()
    }

    fn get(&self, i: usize, j: usize) -> f64 {
        self.nodes[i].distance_to(&self.nodes[j])
    }
}

/// Dense distance matrix, only built for the bounded BruteForce search.
#[derive(Debug, Clone)]
pub(crate) struct DistanceMatrix {
    size: usize,
    data: Vec<f64>,
}

impl DistanceMatrix {
    pub(crate) fn new(nodes: &[PlanarPoint]) -> Self {
        let size = nodes.len();
        let mut data = vec![0.0; size * size];
        for i in 0..size {
            for j in (i + 1)..size {
                let d = nodes[i].distance_to(&nodes[j]);
                data[i * size + j] = d;
                data[j * size + i] = d;
            }
        }
        Self { size, data }
    }
}

impl Distances for DistanceMatrix {
    fn len(&self) -> usize {
        self.size
    }

    fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.size + j]
    }
}

/// Order `waypoints` into a route from `start` with the chosen algorithm.
///
/// BruteForce requests above `rules.brute_force_limit` waypoints fail with
/// `ComplexityLimitExceeded` before any search work.
pub fn plan(
    start: PlanarPoint,
    waypoints: &[PlanarPoint],
    algorithm: Algorithm,
    rules: &PlannerRules,
) -> PlanResult<Route> {
    if algorithm == Algorithm::BruteForce && waypoints.len() > rules.brute_force_limit {
        return Err(PlanError::ComplexityLimitExceeded {
            requested: waypoints.len(),
            limit: rules.brute_force_limit,
        });
    }
    if !start.x.is_finite() || !start.y.is_finite() {
        return Err(PlanError::InvalidParameters(
            "start point is not finite".to_string(),
        ));
    }
    if let Some(index) = waypoints
        .iter()
        .position(|w| w.distance_to(&start) <= rules.coincidence_tolerance_m)
    {
        return Err(PlanError::InvalidParameters(format!(
            "start point coincides with waypoint {}",
            index
        )));
    }

    if waypoints.is_empty() {
        return Ok(Route::start_only(start));
    }

    let nodes: Vec<PlanarPoint> = iter::once(start).chain(waypoints.iter().copied()).collect();
    let distances = NodeDistances::new(&nodes);

    let order = match algorithm {
        Algorithm::NearestNeighbor => nearest_neighbor(&distances),
        Algorithm::ChristofidesAlgorithm => christofides_path(&distances, rules.exact_matching_limit),
        Algorithm::BruteForce => brute_force(&DistanceMatrix::new(&nodes)),
    };
    debug_assert!(is_start_anchored_permutation(&order, nodes.len()));

    let length_m = distances.path_length(&order);
    tracing::debug!(
        "{} ordered {} waypoints, route length {:.1} m",
        algorithm,
        waypoints.len(),
        length_m
    );

    Ok(Route {
        points: order.iter().map(|&node| nodes[node]).collect(),
        visit_order: order[1..].iter().map(|&node| node - 1).collect(),
        length_m,
    })
}

/// Greedy construction from the start; ties go to the lowest node index.
pub(crate) fn nearest_neighbor<D: Distances>(distances: &D) -> Vec<usize> {
    let n = distances.len();
    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);
    let mut current = 0;
    visited[0] = true;
    order.push(0);

    while order.len() < n {
        let mut nearest: Option<(usize, f64)> = None;
        for candidate in 1..n {
            if visited[candidate] {
                continue;
            }
            let d = distances.get(current, candidate);
            if nearest.map_or(true, |(_, best)| d < best) {
                nearest = Some((candidate, d));
            }
        }
        let Some((next, _)) = nearest else {
            break;
        };
        visited[next] = true;
        order.push(next);
        current = next;
    }

    order
}

/// Exact shortest open path with the start fixed first.
///
/// Depth-first permutation search with branch-and-bound pruning, seeded with
/// the nearest-neighbor length. Each choice of first waypoint is searched on
/// its own scoped thread; results are merged in branch order, so the output
/// does not depend on thread scheduling.
pub(crate) fn brute_force(matrix: &DistanceMatrix) -> Vec<usize> {
    let n = matrix.len();
    let seed = nearest_neighbor(matrix);
    let seed_len = matrix.path_length(&seed);
    if n <= 2 {
        return seed;
    }

    let branches: Vec<Option<(f64, Vec<usize>)>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (1..n)
            .map(|first| {
                scope.spawn(move || {
                    let mut search = BranchSearch::new(matrix, seed_len);
                    search.run(first);
                    search.best
                })
            })
            .collect();
        handles
            .into_iter()
            .map(join_branch)
            .collect()
    });

    let mut best_len = seed_len;
    let mut best = seed;
    for (length, order) in branches.into_iter().flatten() {
        if length < best_len - LENGTH_EPS_M {
            best_len = length;
            best = order;
        }
    }
    best
}

/// Join a branch worker, re-raising its panic on the caller's thread.
fn join_branch<T>(handle: ScopedJoinHandle<'_, T>) -> T {
    match handle.join() {
        Ok(result) => result,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

struct BranchSearch<'a> {
    matrix: &'a DistanceMatrix,
    bound: f64,
    best: Option<(f64, Vec<usize>)>,
    path: Vec<usize>,
    visited: Vec<bool>,
}

impl<'a> BranchSearch<'a> {
    fn new(matrix: &'a DistanceMatrix, bound: f64) -> Self {
        let n = matrix.len();
        Self {
            matrix,
            bound,
            best: None,
            path: Vec::with_capacity(n),
            visited: vec![false; n],
        }
    }

    fn run(&mut self, first: usize) {
        self.visited[0] = true;
        self.visited[first] = true;
        self.path.push(0);
        self.path.push(first);
        let length = self.matrix.get(0, first);
        if length < self.bound {
            self.descend(length);
        }
    }

    fn descend(&mut self, length: f64) {
        let n = self.matrix.len();
        if self.path.len() == n {
            if length < self.bound - LENGTH_EPS_M {
                self.bound = length;
                self.best = Some((length, self.path.clone()));
            }
            return;
        }

        let last = self.path[self.path.len() - 1];
        for next in 1..n {
            if self.visited[next] {
                continue;
            }
            let extended = length + self.matrix.get(last, next);
            if extended >= self.bound {
                continue;
            }
            self.visited[next] = true;
            self.path.push(next);
            self.descend(extended);
            self.path.pop();
            self.visited[next] = false;
        }
    }
}

/// True when `order` starts at node 0 and lists each of `n` nodes exactly once.
pub(crate) fn is_start_anchored_permutation(order: &[usize], n: usize) -> bool {
    if order.len() != n || order.first() != Some(&0) {
        return false;
    }
    let mut seen = vec![false; n];
    for &node in order {
        if node >= n || seen[node] {
            return false;
        }
        seen[node] = true;
    }
    true
}
