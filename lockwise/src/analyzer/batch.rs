use crate::classify::BatchReport;
use crate::config::RunConfig;
use crate::errors::RunError;
use crate::export::SignatureGraphs;
use crate::feasibility::FeasibilityCache;
use crate::graph::ProgramGraph;
use crate::output::progress::verification_bar;

use super::signature::{discover_signatures, verify_signature};

/// Result of verifying every discovered signature.
pub struct BatchRun {
    /// Aggregated reports.
    pub report: BatchReport,
    /// Export bundles of completed signatures, when requested.
    pub graphs: Vec<SignatureGraphs>,
}

/// Verifies every signature of the program, one at a time.
///
/// Per-signature failures are recorded as skips and never abort the batch;
/// only configuration and cache I/O problems do.
pub fn run_batch(
    graph: &ProgramGraph,
    config: &RunConfig,
    export_graphs: bool,
) -> Result<BatchRun, RunError> {
    let signatures = discover_signatures(graph, config)?;
    let cg = graph.call_graph();

    let mut cache = match &config.feasibility_cache {
        Some(path) if config.feasibility_enabled => Some(FeasibilityCache::load(path)?),
        _ => None,
    };

    let bar = verification_bar(signatures.len() as u64);
    let mut report = BatchReport::default();
    let mut graphs = Vec::new();
    for sites in &signatures {
        bar.set_message(sites.name.clone());
        match verify_signature(graph, &cg, sites, config, &mut cache, export_graphs) {
            Ok(outcome) => {
                if let Some(bundle) = outcome.graphs {
                    graphs.push(bundle);
                }
                report.record(outcome.report);
            }
            Err(reason) => report.record_skip(sites.name.clone(), &reason),
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    if let (Some(c), Some(path)) = (&cache, &config.feasibility_cache) {
        c.save(path)?;
    }

    Ok(BatchRun { report, graphs })
}
