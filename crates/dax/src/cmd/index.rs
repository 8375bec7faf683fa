//! Index command - label every trace event with its execution point

use dax_engine::{AnalysisConfig, ExecutionIndexer};
use eyre::Result;
use tracing::info;

use super::{call_string, outcome_string, record};
use crate::samples::Sample;

/// Record `sample`, index the trace and print it with statistics
pub fn index_sample(
    sample: &Sample,
    args: &[String],
    max_events: usize,
    config: &AnalysisConfig,
) -> Result<()> {
    let args = sample.parse_args(args);
    info!("Indexing {}", call_string(sample, &args));

    let (result, trace) = record(sample, &args, &config.recorder);
    let mut indexer = ExecutionIndexer::new();
    let indexed = indexer.index_trace(&trace);

    println!("{} = {}", call_string(sample, &args), outcome_string(&result));
    println!("Total execution points: {}", indexed.len());
    print!("{}", indexed.render(max_events));

    let stats = indexer.statistics();
    println!("\nExecution Statistics:");
    println!("  total_points: {}", stats.total_points);
    println!("  unique_contexts: {}", stats.unique_contexts);
    println!("  unique_statements: {}", stats.unique_statements);
    println!("  max_instance: {}", stats.max_instance);
    println!("  context_depth: {}", stats.context_depth);
    Ok(())
}
