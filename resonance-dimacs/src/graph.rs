//! DIMACS edge format for undirected graphs.
//!
//! ```text
//! c comment
//! p edge <vertices> <edges>
//! e <u> <v>
//! ```
//!
//! Vertices are 1-based in the file and 0-based in [`Graph`].
use std::io::{self, BufRead};

use anyhow::Error;
use thiserror::Error;

use resonance_formula::Graph;

use crate::MAX_VAR_COUNT;

/// Largest vertex count accepted in a `p edge` header.
pub const MAX_VERTEX_COUNT: usize = MAX_VAR_COUNT;

/// Possible errors while parsing a DIMACS edge format graph.
#[derive(Debug, Error)]
pub enum GraphParserError {
    #[error("line {}: Invalid header syntax: {}", line, header)]
    InvalidHeader { line: usize, header: String },
    #[error("line {}: Vertex count {} exceeds {}", line, vertices, MAX_VERTEX_COUNT)]
    TooManyVertices { line: usize, vertices: usize },
    #[error("line {}: Duplicate header", line)]
    DuplicateHeader { line: usize },
    #[error("line {}: Invalid edge: {}", line, edge)]
    InvalidEdge { line: usize, edge: String },
    #[error("line {}: Vertex {} is outside of 1..={}", line, vertex, vertex_count)]
    VertexOutOfRange {
        line: usize,
        vertex: usize,
        vertex_count: usize,
    },
    #[error("line {}: Unexpected line: {}", line, content)]
    UnexpectedLine { line: usize, content: String },
    #[error("Input is missing the 'p edge' header")]
    MissingHeader,
    #[error(
        "Graph has {} edges while the header specifies {} edges",
        edge_count,
        header_edge_count
    )]
    EdgeCount {
        edge_count: usize,
        header_edge_count: usize,
    },
}

fn parse_pair(mut values: std::str::SplitWhitespace) -> Option<(usize, usize)> {
    let a = values.next()?.parse().ok()?;
    let b = values.next()?.parse().ok()?;
    if values.next().is_some() {
        return None;
    }
    Some((a, b))
}

/// Parse a graph in DIMACS edge format.
///
/// The edge count of the header counts `e` lines, so duplicated edges still count towards it.
pub fn parse_graph(input: impl io::Read) -> Result<Graph, Error> {
    let reader = io::BufReader::new(input);

    let mut graph: Option<Graph> = None;
    let mut header_edge_count = 0;
    let mut edge_lines = 0;

    for (line_index, line) in reader.lines().enumerate() {
        let line_number = line_index + 1;
        let line = line?;
        let trimmed = line.trim();

        let mut values = trimmed.split_whitespace();
        match values.next() {
            None | Some("c") => continue,
            Some(word) if word.starts_with('c') => continue,
            Some("p") => {
                if graph.is_some() {
                    return Err(GraphParserError::DuplicateHeader { line: line_number }.into());
                }
                let invalid = || GraphParserError::InvalidHeader {
                    line: line_number,
                    header: trimmed.to_owned(),
                };
                match values.next() {
                    Some("edge") | Some("col") => (),
                    _ => return Err(invalid().into()),
                }
                let (vertices, edges) = parse_pair(values).ok_or_else(invalid)?;
                if vertices > MAX_VERTEX_COUNT {
                    return Err(GraphParserError::TooManyVertices {
                        line: line_number,
                        vertices,
                    }
                    .into());
                }
                graph = Some(Graph::new(vertices));
                header_edge_count = edges;
            }
            Some("e") => {
                let graph = graph.as_mut().ok_or(GraphParserError::MissingHeader)?;
                let (a, b) = parse_pair(values).ok_or_else(|| GraphParserError::InvalidEdge {
                    line: line_number,
                    edge: trimmed.to_owned(),
                })?;
                let vertex_count = graph.vertex_count();
                for &vertex in [a, b].iter() {
                    if vertex == 0 || vertex > vertex_count {
                        return Err(GraphParserError::VertexOutOfRange {
                            line: line_number,
                            vertex,
                            vertex_count,
                        }
                        .into());
                    }
                }
                graph.add_edge(a - 1, b - 1);
                edge_lines += 1;
            }
            Some(_) => {
                return Err(GraphParserError::UnexpectedLine {
                    line: line_number,
                    content: trimmed.to_owned(),
                }
                .into())
            }
        }
    }

    let graph = graph.ok_or(GraphParserError::MissingHeader)?;

    if edge_lines != header_edge_count {
        return Err(GraphParserError::EdgeCount {
            edge_count: edge_lines,
            header_edge_count,
        }
        .into());
    }

    Ok(graph)
}

/// Write a graph in DIMACS edge format.
pub fn write_graph(target: &mut impl io::Write, graph: &Graph) -> io::Result<()> {
    writeln!(target, "p edge {} {}", graph.vertex_count(), graph.edge_count())?;
    for &(a, b) in graph.edges() {
        target.write_all(b"e ")?;
        itoa::write(&mut *target, a + 1)?;
        target.write_all(b" ")?;
        itoa::write(&mut *target, b + 1)?;
        target.write_all(b"\n")?;
    }
    Ok(())
}
