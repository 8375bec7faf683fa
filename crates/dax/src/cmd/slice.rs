//! Slice command - backward dynamic slice of a sample run

use dax_common::types::Location;
use dax_engine::{AnalysisConfig, DynamicSlicer};
use eyre::Result;
use tracing::info;

use super::{call_string, outcome_string, record};
use crate::samples::Sample;

/// Record `sample` and slice its trace for `var` at `line`
pub fn slice_sample(
    sample: &Sample,
    args: &[String],
    line: u32,
    var: &str,
    config: &AnalysisConfig,
) -> Result<()> {
    let args = sample.parse_args(args);
    info!("Slicing {} for '{var}' at line {line}", call_string(sample, &args));

    let (result, trace) = record(sample, &args, &config.recorder);
    let slicer = DynamicSlicer::with_config(config.slicer.clone());
    let slice = slicer.compute_slice(&trace, &Location::new(sample.name, line), var);

    println!("{} = {}", call_string(sample, &args), outcome_string(&result));
    print!("{}", slice.render(Some(sample.listing)));
    Ok(())
}
