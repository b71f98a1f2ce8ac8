use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::projector::{AbstractGraph, GraphEdge};

/// Longest-path rank per node index.
///
/// Nodes are visited in topological order, ties broken by declaration order.
/// When a cycle blocks progress the earliest-declared remaining node is taken
/// as the next source, so its incoming edges become back edges and do not
/// push it right.
pub(super) fn compute_ranks(graph: &AbstractGraph) -> Vec<usize> {
    let count = graph.nodes.len();
    let index: HashMap<&str, usize> = graph
        .nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| (node.id.as_str(), idx))
        .collect();

    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); count];
    let mut indeg: Vec<usize> = vec![0; count];
    for (from, to) in edge_indices(&graph.edges, &index) {
        adj[from].push(to);
        indeg[to] += 1;
    }

    let mut ready: BinaryHeap<Reverse<usize>> = BinaryHeap::new();
    for (idx, deg) in indeg.iter().enumerate() {
        if *deg == 0 {
            ready.push(Reverse(idx));
        }
    }

    let mut order = Vec::with_capacity(count);
    let mut processed = vec![false; count];
    loop {
        while let Some(Reverse(idx)) = ready.pop() {
            if processed[idx] {
                continue;
            }
            processed[idx] = true;
            order.push(idx);
            for &next in &adj[idx] {
                if processed[next] {
                    continue;
                }
                indeg[next] = indeg[next].saturating_sub(1);
                if indeg[next] == 0 {
                    ready.push(Reverse(next));
                }
            }
        }

        if order.len() >= count {
            break;
        }
        // Cycle: promote the earliest remaining node.
        match processed.iter().position(|done| !done) {
            Some(idx) => ready.push(Reverse(idx)),
            None => break,
        }
    }

    let mut position = vec![0usize; count];
    for (pos, idx) in order.iter().enumerate() {
        position[*idx] = pos;
    }

    let mut ranks = vec![0usize; count];
    for &node in &order {
        let rank = ranks[node];
        for &next in &adj[node] {
            if position[next] <= position[node] {
                continue;
            }
            ranks[next] = ranks[next].max(rank + 1);
        }
    }
    ranks
}

/// Groups node indices by rank, each bucket in declaration order.
pub(super) fn rank_buckets(ranks: &[usize]) -> Vec<Vec<usize>> {
    let max_rank = ranks.iter().copied().max().unwrap_or(0);
    let len = if ranks.is_empty() { 0 } else { max_rank + 1 };
    let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); len];
    for (idx, rank) in ranks.iter().enumerate() {
        buckets[*rank].push(idx);
    }
    buckets
}

/// Reorders nodes inside each rank by the median position of their
/// neighbours, sweeping left-to-right then right-to-left `passes` times.
pub(super) fn order_rank_nodes(
    rank_nodes: &mut [Vec<usize>],
    graph: &AbstractGraph,
    passes: usize,
) {
    if rank_nodes.len() <= 1 {
        return;
    }
    let index: HashMap<&str, usize> = graph
        .nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| (node.id.as_str(), idx))
        .collect();
    let count = graph.nodes.len();
    let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); count];
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); count];
    for (from, to) in edge_indices(&graph.edges, &index) {
        outgoing[from].push(to);
        incoming[to].push(from);
    }

    let mut positions = vec![0usize; count];
    let update_positions = |rank_nodes: &[Vec<usize>], positions: &mut [usize]| {
        for bucket in rank_nodes {
            for (pos, node) in bucket.iter().enumerate() {
                positions[*node] = pos;
            }
        }
    };
    update_positions(rank_nodes, &mut positions);

    let sort_bucket = |bucket: &mut Vec<usize>, neighbors: &[Vec<usize>], positions: &[usize]| {
        let current: HashMap<usize, usize> = bucket
            .iter()
            .enumerate()
            .map(|(pos, node)| (*node, pos))
            .collect();
        bucket.sort_by(|a, b| {
            let a_score = median_position(*a, neighbors, positions, current[a]);
            let b_score = median_position(*b, neighbors, positions, current[b]);
            match a_score.partial_cmp(&b_score) {
                Some(std::cmp::Ordering::Equal) | None => {
                    current[a].cmp(&current[b]).then_with(|| a.cmp(b))
                }
                Some(ordering) => ordering,
            }
        });
    };

    for _ in 0..passes.max(1) {
        for rank in 1..rank_nodes.len() {
            if rank_nodes[rank].len() <= 1 {
                continue;
            }
            sort_bucket(&mut rank_nodes[rank], &incoming, &positions);
            update_positions(rank_nodes, &mut positions);
        }
        for rank in (0..rank_nodes.len() - 1).rev() {
            if rank_nodes[rank].len() <= 1 {
                continue;
            }
            sort_bucket(&mut rank_nodes[rank], &outgoing, &positions);
            update_positions(rank_nodes, &mut positions);
        }
    }
}

fn median_position(
    node: usize,
    neighbors: &[Vec<usize>],
    positions: &[usize],
    current: usize,
) -> f32 {
    let mut values: Vec<f32> = neighbors[node]
        .iter()
        .filter(|other| **other != node)
        .map(|other| positions[*other] as f32)
        .collect();
    if values.is_empty() {
        return current as f32;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) * 0.5
    }
}

fn edge_indices(edges: &[GraphEdge], index: &HashMap<&str, usize>) -> Vec<(usize, usize)> {
    let mut seen: HashSet<(usize, usize)> = HashSet::new();
    edges
        .iter()
        .filter_map(|edge| {
            let from = *index.get(edge.source.as_str())?;
            let to = *index.get(edge.target.as_str())?;
            // Self links never influence ranks or ordering.
            if from == to || !seen.insert((from, to)) {
                return None;
            }
            Some((from, to))
        })
        .collect()
}
