use anyhow::Context;
use graphkern::{memory, Edge, GraphInput, Kernel, KernelConfig};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => KernelConfig::from_file(&path).with_context(|| format!("loading config from {}", path))?,
        None => KernelConfig::default(),
    };

    println!("graphkern v{}", graphkern::version());
    println!("==========================================");

    memory::initialize(config.memory.clone());
    let kernel = Kernel::from_global(config)?;

    // Four 5-cliques joined in a ring
    let mut edges = Vec::new();
    for group in 0..4u32 {
        let base = group * 5;
        for i in 0..5 {
            for j in (i + 1)..5 {
                edges.push(Edge::new(base + i, base + j));
            }
        }
        edges.push(Edge::new(base + 4, ((group + 1) % 4) * 5));
    }
    let graph = kernel.build_graph(GraphInput::EdgeList(edges), false, false)?;
    println!("Graph: {} vertices, {} stored edges", graph.vertex_count(), graph.edge_count());

    let distances = kernel.bfs(&graph, 0)?;
    let farthest = distances.distance.iter().copied().filter(|&d| d != graphkern::UNREACHED).max();
    println!("BFS from 0: eccentricity {:?}", farthest);

    println!("Triangles: {}", kernel.triangle_count(&graph)?);

    let pairs = graph.two_hop_pairs();
    let scores = kernel.overlap(&graph, &pairs)?;
    let mean = defined_mean(&scores);
    println!("Overlap: {} two-hop pairs, mean {:.4}", pairs.len(), mean);

    let clustering = kernel.spectral_balanced_cut(&graph, 4, 4)?;
    let score = kernel.edge_cut_score(&graph, 4, clustering.assignment.as_slice())?;
    println!(
        "Spectral cut: sizes {:?}, edge cut score {:.4}, converged {}",
        clustering.assignment.sizes(),
        score,
        clustering.converged()
    );

    let sub = kernel.subgraph(&graph, &[0, 1, 2])?;
    println!("Subgraph on {{0, 1, 2}}: {} stored edges", sub.edge_count());

    let stats = kernel.strategy().stats();
    println!("Memory: peak {} bytes over {} reservations", stats.peak, stats.reservations);

    memory::finalize();
    Ok(())
}

/// Mean over the defined (non-NaN) scores; NaN when none are defined
fn defined_mean(scores: &[f64]) -> f64 {
    let (sum, count) = scores
        .iter()
        .filter(|s| !s.is_nan())
        .fold((0.0f64, 0usize), |(sum, count), s| (sum + *s, count + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}
