mod common;

use common::karate;
use graphkern::{memory, GraphInput, Kernel, KernelConfig, KernelError, MemoryConfig};

// The process-wide strategy is shared state, so the whole lifecycle runs in
// one test.
#[test]
fn test_global_strategy_lifecycle() {
    memory::finalize();
    assert!(!memory::is_initialized());
    assert!(matches!(
        Kernel::from_global(KernelConfig::default()),
        Err(KernelError::NotInitialized)
    ));

    let mut previous = None;
    for mode in MemoryConfig::sweep(2 << 27) {
        memory::initialize(mode.clone());
        assert!(memory::is_initialized());
        assert_eq!(memory::current().map(|s| s.config()), Some(mode.clone()));

        let kernel = Kernel::from_global(KernelConfig::default()).unwrap();
        let graph = kernel
            .build_graph(GraphInput::EdgeList(karate().edges), false, false)
            .unwrap();
        let outcome = (kernel.bfs(&graph, 0).unwrap(), kernel.triangle_count(&graph).unwrap());
        if let Some(expected) = &previous {
            assert_eq!(expected, &outcome, "mode {:?}", mode);
        }
        previous = Some(outcome);

        let stats = kernel.strategy().stats();
        assert_eq!(stats.in_use, 0);
        assert!(stats.peak > 0);
        assert_eq!(stats.reservations, 3);
        if mode.pool {
            assert_eq!(stats.pool_size, 2 << 27);
        }
    }

    memory::finalize();
    assert!(!memory::is_initialized());
}
