//! Shared datasets and independent reference implementations

#![allow(dead_code)]

use graphkern::{Edge, GraphStore};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeSet, VecDeque};

/// Zachary's karate club, 0-indexed (34 vertices, 78 edges, 45 triangles)
pub const KARATE: [(u32, u32); 78] = [
    (0, 1), (0, 2), (0, 3), (0, 4), (0, 5), (0, 6), (0, 7), (0, 8), (0, 10), (0, 11), (0, 12), (0, 13),
    (0, 17), (0, 19), (0, 21), (0, 31), (1, 2), (1, 3), (1, 7), (1, 13), (1, 17), (1, 19), (1, 21), (1, 30),
    (2, 3), (2, 7), (2, 8), (2, 9), (2, 13), (2, 27), (2, 28), (2, 32), (3, 7), (3, 12), (3, 13), (4, 6),
    (4, 10), (5, 6), (5, 10), (5, 16), (6, 16), (8, 30), (8, 32), (8, 33), (9, 33), (13, 33), (14, 32),
    (14, 33), (15, 32), (15, 33), (18, 32), (18, 33), (19, 33), (20, 32), (20, 33), (22, 32), (22, 33),
    (23, 25), (23, 27), (23, 29), (23, 32), (23, 33), (24, 25), (24, 27), (24, 31), (25, 31), (26, 29),
    (26, 33), (27, 33), (28, 31), (28, 33), (29, 32), (29, 33), (30, 32), (30, 33), (31, 32), (31, 33),
    (32, 33),
];

pub struct Dataset {
    pub name: &'static str,
    pub vertex_count: usize,
    pub edges: Vec<Edge>,
}

impl Dataset {
    pub fn graph(&self) -> GraphStore {
        GraphStore::from_edge_list_with_vertex_count(self.vertex_count, &self.edges, false).unwrap()
    }

    pub fn directed_graph(&self) -> GraphStore {
        GraphStore::from_edge_list_with_vertex_count(self.vertex_count, &self.edges, true).unwrap()
    }
}

pub fn karate() -> Dataset {
    Dataset {
        name: "karate",
        vertex_count: 34,
        edges: KARATE.iter().map(|&(u, v)| Edge::new(u, v)).collect(),
    }
}

pub fn karate_weighted() -> Dataset {
    Dataset {
        name: "karate-weighted",
        vertex_count: 34,
        edges: KARATE
            .iter()
            .map(|&(u, v)| Edge::weighted(u, v, ((u + v) % 5 + 1) as f64))
            .collect(),
    }
}

/// `groups` dense blocks with sparse links between them, seeded
pub fn planted_partition(groups: u32, size: u32, p_in: f64, p_out: f64, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = groups * size;
    let mut edges = Vec::new();
    for u in 0..n {
        for v in (u + 1)..n {
            let p = if u / size == v / size { p_in } else { p_out };
            if rng.gen::<f64>() < p {
                edges.push(Edge::new(u, v));
            }
        }
    }
    Dataset { name: "planted-partition", vertex_count: n as usize, edges }
}

/// `groups` cliques of `size` vertices joined in a ring by single edges
pub fn ring_of_cliques(groups: u32, size: u32) -> Dataset {
    let mut edges = Vec::new();
    for g in 0..groups {
        let base = g * size;
        for i in 0..size {
            for j in (i + 1)..size {
                edges.push(Edge::new(base + i, base + j));
            }
        }
        edges.push(Edge::new(base + size - 1, ((g + 1) % groups) * size));
    }
    Dataset { name: "ring-of-cliques", vertex_count: (groups * size) as usize, edges }
}

pub fn datasets() -> Vec<Dataset> {
    vec![karate(), planted_partition(8, 12, 0.6, 0.02, 17), ring_of_cliques(8, 6)]
}

/// Out-neighbor lists built straight from an edge list
pub fn adjacency(vertex_count: usize, edges: &[Edge], directed: bool) -> Vec<Vec<u32>> {
    let mut adj = vec![Vec::new(); vertex_count];
    for e in edges {
        adj[e.src as usize].push(e.dst);
        if !directed && e.src != e.dst {
            adj[e.dst as usize].push(e.src);
        }
    }
    adj
}

/// Sequential queue-based BFS; `None` for unreached vertices
pub fn reference_bfs(adj: &[Vec<u32>], source: u32) -> Vec<Option<u32>> {
    let mut dist = vec![None; adj.len()];
    let mut queue = VecDeque::new();
    dist[source as usize] = Some(0);
    queue.push_back(source);
    while let Some(u) = queue.pop_front() {
        let du = dist[u as usize].unwrap_or(0);
        for &v in &adj[u as usize] {
            if dist[v as usize].is_none() {
                dist[v as usize] = Some(du + 1);
                queue.push_back(v);
            }
        }
    }
    dist
}

/// Triangles by checking every vertex triple of the simple undirected view
pub fn reference_triangles(vertex_count: usize, edges: &[Edge]) -> u64 {
    let mut matrix = vec![vec![false; vertex_count]; vertex_count];
    for e in edges {
        if e.src != e.dst {
            matrix[e.src as usize][e.dst as usize] = true;
            matrix[e.dst as usize][e.src as usize] = true;
        }
    }
    let mut count = 0;
    for i in 0..vertex_count {
        for j in (i + 1)..vertex_count {
            if !matrix[i][j] {
                continue;
            }
            for k in (j + 1)..vertex_count {
                if matrix[i][k] && matrix[j][k] {
                    count += 1;
                }
            }
        }
    }
    count
}

/// Overlap coefficient from neighbor sets
pub fn reference_overlap(adj: &[Vec<u32>], a: u32, b: u32) -> f64 {
    let na: BTreeSet<u32> = adj[a as usize].iter().copied().collect();
    let nb: BTreeSet<u32> = adj[b as usize].iter().copied().collect();
    if nb.is_empty() {
        return f64::NAN;
    }
    if na.is_empty() {
        return 0.0;
    }
    na.intersection(&nb).count() as f64 / na.len().min(nb.len()) as f64
}

/// Uniform random cluster ids in `[0, k)`
pub fn random_assignment(vertex_count: usize, k: usize, seed: u64) -> Vec<u32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..vertex_count).map(|_| rng.gen_range(0..k as u32)).collect()
}
