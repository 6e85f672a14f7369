//! Shared entry point used by every binary front-end.

use anyhow::Result;
use clap::Parser;

use crate::analyzer::run_batch;
use crate::cli::Cli;
use crate::config::{Config, RunConfig};
use crate::export::write_graphs;
use crate::graph::load_program_graph;
use crate::output::reports::{print_json, print_report};

/// Runs the verifier with the given arguments using stdout as the writer.
///
/// # Errors
///
/// Returns an error if loading the program graph, running the batch, or
/// writing output fails.
pub fn run_with_args(args: Vec<String>) -> Result<i32> {
    run_with_args_to(args, &mut std::io::stdout())
}

/// Run lockwise with the given arguments, writing output to the specified
/// writer.
///
/// This is the testable version of `run_with_args` that allows output
/// capture. The returned exit code is 1 when any deadlock or unpaired
/// event was found, 0 otherwise.
///
/// # Errors
///
/// Returns an error if loading the program graph, running the batch, or
/// writing output fails.
pub fn run_with_args_to<W: std::io::Write>(args: Vec<String>, writer: &mut W) -> Result<i32> {
    let mut program_args = vec!["lockwise".to_owned()];
    program_args.extend(args);
    let cli = match Cli::try_parse_from(program_args) {
        Ok(c) => c,
        Err(e) => match e.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                write!(writer, "{e}")?;
                writer.flush()?;
                return Ok(0);
            }
            _ => {
                eprint!("{e}");
                return Ok(1);
            }
        },
    };

    let config = Config::load_from_path(&cli.graph);
    let run_config = resolve_run_config(&cli, &config);

    let graph = load_program_graph(&cli.graph)?;
    let batch = run_batch(&graph, &run_config, cli.export_graphs.is_some())?;

    if let Some(path) = &cli.export_graphs {
        write_graphs(path, &batch.graphs)?;
    }

    if cli.json {
        print_json(writer, &batch.report)?;
    } else {
        print_report(writer, &batch.report)?;
    }

    let counts = &batch.report.aggregate;
    Ok(i32::from(counts.deadlock + counts.unpaired > 0))
}

/// Command-line flags override the file configuration field by field.
fn resolve_run_config(cli: &Cli, config: &Config) -> RunConfig {
    let mut run = config.lockwise.resolve();
    if !cli.acquire_functions.is_empty() {
        run.acquire_functions = cli.acquire_functions.clone();
    }
    if !cli.release_functions.is_empty() {
        run.release_functions = cli.release_functions.clone();
    }
    if !cli.multi_state_functions.is_empty() {
        run.multi_state_functions = cli.multi_state_functions.clone();
    }
    if cli.signature_query.is_some() {
        run.signature_query = cli.signature_query.clone();
    }
    if let Some(limit) = cli.mpg_node_limit {
        run.mpg_node_limit = limit;
    }
    if cli.no_feasibility {
        run.feasibility_enabled = false;
    }
    if !cli.excluded_functions.is_empty() {
        run.excluded_functions = cli.excluded_functions.clone();
    }
    if cli.feasibility_cache.is_some() {
        run.feasibility_cache = cli.feasibility_cache.clone();
    }
    run
}
