//! Demo command - walk through every analysis on the sample catalog

use dax_common::types::StepKind;
use dax_engine::{AnalysisConfig, DynamicSlicer, ExecutionIndexer};
use eyre::Result;

use super::{call_string, lookup, outcome_string, print_header, record};

/// Run the tracing, slicing, indexing and localization demos in sequence
pub fn run_demo(config: &AnalysisConfig) -> Result<()> {
    let loop_sum = lookup("loop_sum")?;

    print_header("DEMO 1: TRACING");
    let args = loop_sum.parse_args(&["5".to_string()]);
    let (result, trace) = record(loop_sum, &args, &config.recorder);
    println!("{} = {}", call_string(loop_sum, &args), outcome_string(&result));
    print!("{}", trace.render(25));

    println!("\nVariable 'result' history:");
    let history = trace.history("result");
    for (location, value) in history.iter().take(10) {
        println!("  line {}: result = {value}", location.line);
    }
    if history.len() > 10 {
        println!("  ... ({} more)", history.len() - 10);
    }

    print_header("DEMO 2: DYNAMIC SLICING");
    let target = trace
        .iter()
        .rev()
        .find(|event| event.kind == StepKind::Line && event.locals.contains_key("result"))
        .map(|event| event.location.clone());
    match target {
        Some(target) => {
            let slicer = DynamicSlicer::with_config(config.slicer.clone());
            let slice = slicer.compute_slice(&trace, &target, "result");
            print!("{}", slice.render(Some(loop_sum.listing)));
        }
        None => println!("'result' never appears in the trace"),
    }

    print_header("DEMO 3: EXECUTION INDEXING");
    let args = loop_sum.parse_args(&["3".to_string()]);
    let (_, trace) = record(loop_sum, &args, &config.recorder);
    let mut indexer = ExecutionIndexer::new();
    let indexed = indexer.index_trace(&trace);
    print!("{}", indexed.render(20));
    let stats = indexer.statistics();
    println!(
        "\n{} points, {} statements, {} contexts, max instance {}",
        stats.total_points, stats.unique_statements, stats.unique_contexts, stats.max_instance
    );

    print_header("DEMO 4: FAULT LOCALIZATION");
    super::localize_sample(lookup("buggy_max")?, config.localizer.parallel, None, config)
}
