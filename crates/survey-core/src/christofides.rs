//! Christofides-style ordering for the open-path route.
//!
//! Builds a minimum spanning tree, matches its odd-degree vertices, walks an
//! Eulerian circuit of the combined multigraph and shortcuts repeated
//! vertices into a Hamiltonian cycle. The cycle is then opened at the start
//! by dropping the longer of its two edges incident to node 0.
//!
//! The 1.5 approximation ratio holds for the closed tour when the matching
//! is exact. It does not carry over to the opened path, and above the exact
//! matching limit the matching itself is heuristic.

use crate::matching::min_weight_perfect_matching;
use crate::route_engine::Distances;

/// Order every node of `distances` into an open path starting at node 0.
pub(crate) fn christofides_path<D: Distances>(distances: &D, exact_matching_limit: usize) -> Vec<usize> {
    let n = distances.len();
    if n <= 2 {
        return (0..n).collect();
    }

    let tree = minimum_spanning_tree(distances);

    let mut degree = vec![0usize; n];
    for &(a, b) in &tree {
        degree[a] += 1;
        degree[b] += 1;
    }
    let odd: Vec<usize> = (0..n).filter(|&v| degree[v] % 2 == 1).collect();
    let matching = min_weight_perfect_matching(&odd, |a, b| distances.get(a, b), exact_matching_limit);

    let mut edges = tree;
    edges.extend(matching);
    let circuit = euler_circuit(n, &edges, 0);
    let cycle = shortcut(&circuit, n);
    open_cycle(distances, cycle)
}

/// Prim's algorithm from node 0 over the complete graph; ties go to the lowest index.
fn minimum_spanning_tree<D: Distances>(distances: &D) -> Vec<(usize, usize)> {
    let n = distances.len();
    let mut in_tree = vec![false; n];
    let mut best = vec![f64::INFINITY; n];
    let mut parent = vec![0usize; n];
    let mut edges = Vec::with_capacity(n.saturating_sub(1));

    best[0] = 0.0;
    for _ in 0..n {
        let mut next: Option<usize> = None;
        for v in 0..n {
            if in_tree[v] {
                continue;
            }
            if next.map_or(true, |u| best[v] < best[u]) {
                next = Some(v);
            }
        }
        let Some(u) = next else {
            break;
        };
        in_tree[u] = true;
        if u != 0 {
            edges.push((parent[u], u));
        }
        for v in 0..n {
            if in_tree[v] {
                continue;
            }
            let d = distances.get(u, v);
            if d < best[v] {
                best[v] = d;
                parent[v] = u;
            }
        }
    }
    edges
}

/// Hierholzer's algorithm on a multigraph given as an edge list.
///
/// Adjacency lists are ordered by (neighbor, edge id) so the circuit only
/// depends on the input.
fn euler_circuit(n: usize, edges: &[(usize, usize)], start: usize) -> Vec<usize> {
    let mut adjacency: Vec<Vec<(usize, usize)>> = vec![Vec::new(); n];
    for (id, &(a, b)) in edges.iter().enumerate() {
        adjacency[a].push((b, id));
        adjacency[b].push((a, id));
    }
    for list in &mut adjacency {
        list.sort_unstable();
    }

    let mut used = vec![false; edges.len()];
    let mut cursor = vec![0usize; n];
    let mut stack = vec![start];
    let mut circuit = Vec::with_capacity(edges.len() + 1);

    while let Some(&v) = stack.last() {
        let list = &adjacency[v];
        while cursor[v] < list.len() && used[list[cursor[v]].1] {
            cursor[v] += 1;
        }
        if let Some(&(u, id)) = list.get(cursor[v]) {
            used[id] = true;
            stack.push(u);
        } else {
            circuit.push(v);
            stack.pop();
        }
    }
    circuit.reverse();
    circuit
}

/// Keep the first visit of each node. Nodes the circuit never reached are
/// appended in index order so the result is always a full permutation.
fn shortcut(circuit: &[usize], n: usize) -> Vec<usize> {
    let mut seen = vec![false; n];
    let mut cycle = Vec::with_capacity(n);
    for &v in circuit {
        if !seen[v] {
            seen[v] = true;
            cycle.push(v);
        }
    }
    if cycle.len() < n {
        tracing::warn!(
            "Euler circuit covered {} of {} nodes; appending the rest",
            cycle.len(),
            n
        );
        cycle.extend((0..n).filter(|&v| !seen[v]));
    }
    cycle
}

/// Turn the Hamiltonian cycle `[0, a1, .., ak]` into an open path from 0,
/// dropping whichever edge at node 0 is longer.
fn open_cycle<D: Distances>(distances: &D, cycle: Vec<usize>) -> Vec<usize> {
    let (Some(&first), Some(&last)) = (cycle.get(1), cycle.last()) else {
        return cycle;
    };
    if distances.get(last, 0) >= distances.get(0, first) {
        return cycle;
    }
    let mut reversed = Vec::with_capacity(cycle.len());
    reversed.push(0);
    reversed.extend(cycle[1..].iter().rev());
    reversed
}
