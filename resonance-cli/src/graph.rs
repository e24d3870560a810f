use anyhow::Error;
use clap::{value_t, App, Arg, ArgMatches, SubCommand};
use log::info;

use resonance::dimacs::parse_graph;
use resonance::{Context, Graph, GraphColoringSolver, HamiltonianPathSolver, VertexCoverSolver};

use super::{open_input, EXIT_FOUND, EXIT_UNKNOWN};

pub fn cover_args(input: Arg<'static, 'static>) -> App<'static, 'static> {
    SubCommand::with_name("cover")
        .about("Search for a vertex cover of a DIMACS edge format graph")
        .arg(input)
        .arg_from_usage("<size> --size=<N> 'Number of vertices in the cover'")
}

pub fn path_args(input: Arg<'static, 'static>) -> App<'static, 'static> {
    SubCommand::with_name("path")
        .about("Search for a Hamiltonian path of a DIMACS edge format graph")
        .arg(input)
}

pub fn color_args(input: Arg<'static, 'static>) -> App<'static, 'static> {
    SubCommand::with_name("color")
        .about("Search for a proper coloring of a DIMACS edge format graph")
        .arg(input)
        .arg_from_usage("<colors> --colors=<K> 'Number of available colors'")
}

fn load_graph(matches: &ArgMatches) -> Result<Graph, Error> {
    let graph = parse_graph(open_input(matches)?)?;
    info!(
        "Parsed graph with {} vertices and {} edges",
        graph.vertex_count(),
        graph.edge_count()
    );
    Ok(graph)
}

/// Prints the status line and a value line of 1-based numbers.
fn print_solution(found: bool, values: impl IntoIterator<Item = usize>) -> i32 {
    if found {
        println!("s FOUND");
    } else {
        println!("s UNKNOWN");
    }
    print!("v");
    for value in values {
        print!(" {}", value + 1);
    }
    println!();

    if found {
        EXIT_FOUND
    } else {
        EXIT_UNKNOWN
    }
}

pub fn cover_main(ctx: &mut Context, matches: &ArgMatches) -> Result<i32, Error> {
    let size = value_t!(matches, "size", usize)?;
    let graph = load_graph(matches)?;

    let result = VertexCoverSolver::new(ctx).solve(&graph, size);
    info!(
        "Cover of cost {} leaves {} edges uncovered",
        result.cost, result.uncovered_edges
    );

    Ok(print_solution(result.has_cover, result.cover))
}

pub fn path_main(ctx: &mut Context, matches: &ArgMatches) -> Result<i32, Error> {
    let graph = load_graph(matches)?;

    let result = HamiltonianPathSolver::new(ctx).solve(&graph);
    info!("Longest path has length {}", result.length);

    Ok(print_solution(result.has_path, result.path))
}

pub fn color_main(ctx: &mut Context, matches: &ArgMatches) -> Result<i32, Error> {
    let colors = value_t!(matches, "colors", usize)?;
    let graph = load_graph(matches)?;

    let result = GraphColoringSolver::new(ctx).solve(&graph, colors);
    info!(
        "Coloring uses {} colors with {} conflicts",
        result.colors_used, result.conflicts
    );

    Ok(print_solution(result.has_coloring, result.coloring))
}
