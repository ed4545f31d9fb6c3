mod common;

use common::*;
use graphkern::algo::{
    bfs, bfs_with_predecessors, count_triangles, edge_cut_score, filter_unreachable, overlap, spectral_balanced_cut,
    sssp, subgraph, triangle_count,
};
use graphkern::memory::{strategy_for, MemoryConfig};
use graphkern::{Edge, GraphError, GraphStore, Kernel, KernelConfig, SpectralConfig, UNREACHED};

#[test]
fn test_bfs_matches_reference() {
    for dataset in datasets() {
        for directed in [false, true] {
            let graph = if directed { dataset.directed_graph() } else { dataset.graph() };
            let adj = adjacency(dataset.vertex_count, &dataset.edges, directed);
            for source in [0u32, 5, (dataset.vertex_count - 1) as u32] {
                let table = bfs(&graph, source).unwrap();
                let expected = reference_bfs(&adj, source);
                for v in 0..dataset.vertex_count {
                    assert_eq!(
                        table.distance[v],
                        expected[v].unwrap_or(UNREACHED),
                        "{} directed={} source={} vertex={}",
                        dataset.name,
                        directed,
                        source,
                        v
                    );
                }
            }
        }
    }
}

#[test]
fn test_bfs_predecessors_form_shortest_path_tree() {
    let dataset = karate();
    let graph = dataset.graph();
    let table = bfs_with_predecessors(&graph, 16).unwrap();
    for v in 0..34u32 {
        match table.predecessor_of(v) {
            Some(p) => {
                assert!(graph.neighbors(p).contains(&v));
                assert_eq!(table.distance_of(p).unwrap() + 1, table.distance_of(v).unwrap());
            }
            None => assert_eq!(v, 16),
        }
    }
}

#[test]
fn test_bfs_invalid_source() {
    let graph = karate().graph();
    assert_eq!(
        bfs(&graph, 34).unwrap_err(),
        GraphError::InvalidVertex { vertex: 34, vertex_count: 34 }
    );
}

#[test]
fn test_filter_unreachable() {
    // 0 -> 1 -> 2, 3 -> 4, 5 isolated
    let edges = [Edge::new(0, 1), Edge::new(1, 2), Edge::new(3, 4)];
    let graph = GraphStore::from_edge_list_with_vertex_count(6, &edges, true).unwrap();

    let table = bfs_with_predecessors(&graph, 0).unwrap();
    let filtered = filter_unreachable(&table);
    assert_eq!(filtered.vertex, vec![0, 1, 2]);
    assert_eq!(filtered.distance, vec![0, 1, 2]);
    assert_eq!(filtered.len(), table.reachable_count());
    assert_eq!(filtered.predecessor, Some(vec![None, Some(0), Some(1)]));

    let weighted = sssp(&graph, 3).unwrap();
    let filtered = filter_unreachable(&weighted);
    assert_eq!(filtered.vertex, vec![3, 4]);
    assert_eq!(filtered.distance, vec![0.0, 1.0]);
}

#[test]
fn test_filter_unreachable_keeps_everything_when_connected() {
    let graph = karate().graph();
    let table = bfs(&graph, 0).unwrap();
    assert_eq!(filter_unreachable(&table), table);
}

#[test]
fn test_sssp_on_unit_weights_equals_bfs() {
    for dataset in datasets() {
        let graph = dataset.graph();
        let hops = bfs(&graph, 0).unwrap();
        let weighted = sssp(&graph, 0).unwrap();
        for v in 0..dataset.vertex_count {
            if hops.distance[v] == UNREACHED {
                assert_eq!(weighted.distance[v], f64::MAX);
            } else {
                assert_eq!(weighted.distance[v], hops.distance[v] as f64, "{} vertex {}", dataset.name, v);
            }
        }
    }
}

#[test]
fn test_overlap_matches_reference() {
    for dataset in datasets() {
        let graph = dataset.graph();
        let adj = adjacency(dataset.vertex_count, &dataset.edges, false);
        let pairs = graph.two_hop_pairs();
        assert!(!pairs.is_empty());

        let scores = overlap(&graph, &pairs).unwrap();
        assert_eq!(scores.len(), pairs.len());
        for (&(a, b), &score) in pairs.iter().zip(&scores) {
            let expected = reference_overlap(&adj, a, b);
            assert!((score - expected).abs() < 1e-6, "{} pair ({}, {})", dataset.name, a, b);
        }
    }
}

#[test]
fn test_overlap_nan_iff_second_vertex_isolated() {
    let mut edges = karate().edges;
    edges.push(Edge::new(1, 1));
    let graph = GraphStore::from_edge_list_with_vertex_count(36, &edges, false).unwrap();
    let pairs = [(0, 35), (35, 0), (34, 35), (0, 1), (1, 1)];
    let scores = overlap(&graph, &pairs).unwrap();
    assert!(scores[0].is_nan());
    assert_eq!(scores[1], 0.0);
    assert!(scores[2].is_nan());
    assert!(!scores[3].is_nan());
    assert!(!scores[4].is_nan());
}

#[test]
fn test_triangles_match_reference() {
    let karate = karate();
    assert_eq!(triangle_count(&karate.graph()), 45);

    for dataset in datasets().into_iter().chain([karate_weighted()]) {
        let expected = reference_triangles(dataset.vertex_count, &dataset.edges);
        assert_eq!(triangle_count(&dataset.graph()), expected, "{}", dataset.name);
        assert_eq!(triangle_count(&dataset.directed_graph()), expected, "{} directed", dataset.name);
        assert_eq!(count_triangles(&dataset.graph()).participation_sum(), 3 * expected);
    }
}

#[test]
fn test_triangles_weighted_parity() {
    assert_eq!(triangle_count(&karate_weighted().graph()), triangle_count(&karate().graph()));
}

#[test]
fn test_subgraph_matches_reference() {
    let dataset = karate();
    let graph = dataset.graph();
    let members = [0u32, 1, 17];
    let sub = subgraph(&graph, &members).unwrap();

    let mut expected: Vec<(u32, u32)> = dataset
        .edges
        .iter()
        .filter(|e| members.contains(&e.src) && members.contains(&e.dst))
        .flat_map(|e| [(e.src, e.dst), (e.dst, e.src)])
        .collect();
    expected.sort_unstable();

    let mut actual: Vec<(u32, u32)> = sub.edges().map(|e| (e.src, e.dst)).collect();
    actual.sort_unstable();
    assert_eq!(actual, expected);
    assert_eq!(actual.len(), 6);
    assert_eq!(sub.vertex_count(), 34);
    assert_eq!(triangle_count(&sub), 1);
}

#[test]
fn test_subgraph_preserves_weights() {
    let graph = karate_weighted().graph();
    let sub = subgraph(&graph, &[0, 1, 17]).unwrap();
    assert!(sub.is_weighted());
    for e in sub.edges() {
        let (u, v) = (e.src.min(e.dst), e.src.max(e.dst));
        assert_eq!(e.weight.value(), ((u + v) % 5 + 1) as f64);
    }
}

#[test]
fn test_spectral_beats_random_assignment() {
    let karate_graph = karate().graph();
    let csr = karate_graph.csr();
    let karate_from_csr =
        GraphStore::from_csr(csr.offsets().to_vec(), csr.indices().to_vec(), csr.weights().clone(), false).unwrap();

    let mut graphs: Vec<(&str, GraphStore)> = datasets().iter().map(|d| (d.name, d.graph())).collect();
    graphs.push(("karate-weighted", karate_weighted().graph()));
    graphs.push(("karate-csr", karate_from_csr));

    for (name, graph) in &graphs {
        let n = graph.vertex_count();
        for k in [2usize, 4, 8] {
            for seed in 0..3u64 {
                let config = SpectralConfig { seed, ..SpectralConfig::default() };
                let result =
                    graphkern::algo::spectral_balanced_cut_with_config(graph, k, k, &config).unwrap();
                let assignment = result.assignment.as_slice();
                assert_eq!(assignment.len(), n);
                assert!(assignment.iter().all(|&c| (c as usize) < k));

                let spectral = edge_cut_score(graph, k, assignment).unwrap();
                let random = edge_cut_score(graph, k, &random_assignment(n, k, 1000 + seed)).unwrap();
                assert!(
                    spectral < random,
                    "{} k={} seed={}: spectral {} vs random {}",
                    name,
                    k,
                    seed,
                    spectral,
                    random
                );
            }
        }
    }
}

#[test]
fn test_spectral_iteration_cap_flags_result() {
    let graph = karate().graph();
    let config = SpectralConfig {
        max_eigen_iterations: 1,
        eigen_tolerance: 1e-15,
        ..SpectralConfig::default()
    };
    let result = graphkern::algo::spectral_balanced_cut_with_config(&graph, 4, 4, &config).unwrap();
    assert!(!result.converged());
    assert_eq!(result.eigen_iterations, 1);
    assert_eq!(result.warnings[0].stage, graphkern::SolverStage::Eigensolver);
}

#[test]
fn test_spectral_parameter_errors() {
    let graph = karate().graph();
    for (k, nev) in [(0, 2), (4, 3), (35, 40), (2, 34)] {
        assert!(
            matches!(spectral_balanced_cut(&graph, k, nev), Err(GraphError::InvalidArgument(_))),
            "k={} nev={}",
            k,
            nev
        );
    }
}

#[test]
fn test_allocator_modes_do_not_change_results() {
    let dataset = planted_partition(4, 10, 0.7, 0.05, 3);
    let mut modes = MemoryConfig::sweep(2 << 27);
    modes.push(MemoryConfig::pooled(1 << 10));

    let mut baseline = None;
    for memory in modes {
        for threads in [Some(1), Some(4)] {
            let mut config = KernelConfig::default();
            config.memory = memory.clone();
            config.parallel.threads = threads;
            config.parallel.frontier_parallel_threshold = 1;
            let kernel = Kernel::with_strategy(config, strategy_for(&memory)).unwrap();

            let graph = kernel
                .build_graph(graphkern::GraphInput::EdgeList(dataset.edges.clone()), false, false)
                .unwrap();
            let distances = kernel.bfs_with_predecessors(&graph, 0).unwrap();
            let triangles = kernel.triangle_count(&graph).unwrap();
            let pairs = graph.two_hop_pairs();
            let scores: Vec<u64> = kernel.overlap(&graph, &pairs).unwrap().iter().map(|s| s.to_bits()).collect();
            let clusters = kernel.spectral_balanced_cut(&graph, 4, 4).unwrap().assignment;
            let sub = kernel.subgraph(&graph, &[0, 1, 2, 3, 4]).unwrap();

            let outcome = (graph.clone(), distances, triangles, scores, clusters, sub);
            match &baseline {
                None => baseline = Some(outcome),
                Some(expected) => assert!(*expected == outcome, "mode {:?} threads {:?}", memory, threads),
            }
            assert_eq!(kernel.strategy().stats().in_use, 0);
        }
    }
}
