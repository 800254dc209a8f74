//! RPQ CLI entry point: `rpq path_to_graph path_to_regex path_to_query`.

use std::fs;
use std::process::ExitCode;

use anyhow::{Context, Result};

use pathmatrix::automaton::{build_from_regex, Dialect};
use pathmatrix::io;
use pathmatrix::rpq::solve_rpq;

fn run() -> Result<()> {
    env_logger::init();
    let mut args = std::env::args().skip(1);
    let path_to_graph = args.next().context("missing argument: path_to_graph")?;
    let path_to_regex = args.next().context("missing argument: path_to_regex")?;
    let path_to_query = args.next().context("missing argument: path_to_query")?;

    let graph_text = fs::read_to_string(&path_to_graph).with_context(|| format!("reading {path_to_graph}"))?;
    let regex_text = fs::read_to_string(&path_to_regex).with_context(|| format!("reading {path_to_regex}"))?;
    let query_text = fs::read_to_string(&path_to_query).with_context(|| format!("reading {path_to_query}"))?;

    let graph = io::read_graph(&graph_text)?;
    let constraint = build_from_regex(regex_text.trim(), Dialect::Simplified)?;
    let query = io::read_query(&query_text)?;

    let pairs = solve_rpq(&graph, &constraint, &query);
    let mut sorted: Vec<(usize, usize)> = pairs.into_iter().collect();
    sorted.sort_unstable();

    println!("Reachable pairs of indices:");
    for (start, end) in sorted {
        println!("{start} ~~> {end}");
    }

    let intersection = pathmatrix::kronecker::product(&constraint, &graph);
    println!("Counter of edge types in resulting automaton:");
    println!("{:?}", intersection.edges_counter());

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
