use resonance::dimacs::parse_graph;
use resonance::{
    Context, Graph, GraphColoringSolver, HamiltonianPathSolver, SolverConfig, VertexCoverSolver,
};

fn load(bytes: &[u8]) -> Graph {
    let _ = env_logger::builder().is_test(true).try_init();
    parse_graph(bytes).expect("parsing failed")
}

fn context() -> Context {
    let mut config = SolverConfig::new(50_000, 0.0);
    config.stall_patience = 50_000;
    Context::new(config)
}

#[test]
fn petersen() {
    let graph = load(include_bytes!("graphs/petersen.col"));
    assert_eq!(graph.vertex_count(), 10);
    assert_eq!(graph.edge_count(), 15);

    let mut ctx = context();

    let cover = VertexCoverSolver::new(&mut ctx).solve(&graph, 6);
    assert!(cover.has_cover);
    assert_eq!(cover.cost, 6);

    let path = HamiltonianPathSolver::new(&mut ctx).solve(&graph);
    assert!(path.has_path);
    assert_eq!(path.length, 9);
    assert!(path.path.windows(2).all(|pair| graph.has_edge(pair[0], pair[1])));

    let coloring = GraphColoringSolver::new(&mut ctx).solve(&graph, 3);
    assert!(coloring.has_coloring);

    let coloring = GraphColoringSolver::new(&mut ctx).solve(&graph, 2);
    assert!(!coloring.has_coloring);

    assert_eq!(ctx.solve_count(), 4);
    assert!(ctx.dispose().is_empty());
}

#[test]
fn grid() {
    let graph = load(include_bytes!("graphs/grid_3x3.col"));
    let mut ctx = context();

    let coloring = GraphColoringSolver::new(&mut ctx).solve(&graph, 2);
    assert!(coloring.has_coloring);
    assert_eq!(coloring.colors_used, 2);

    let cover = VertexCoverSolver::new(&mut ctx).solve(&graph, 4);
    assert!(cover.has_cover);
    assert_eq!(cover.cover.len(), 4);

    let path = HamiltonianPathSolver::new(&mut ctx).solve(&graph);
    assert!(path.has_path);
    assert_eq!(path.order.len(), 9);
}
