//! Command modules for the DAX CLI

pub mod demo;
pub mod index;
pub mod list;
pub mod localize;
pub mod slice;
pub mod trace;

pub use demo::run_demo;
pub use index::index_sample;
pub use list::list_samples;
pub use localize::localize_sample;
pub use slice::slice_sample;
pub use trace::{trace_sample, TraceOptions};

use std::panic::{self, AssertUnwindSafe};

use dax_common::types::{Trace, Value};
use dax_engine::{Recorder, RecorderConfig, TargetError};
use eyre::{eyre, Result};
use tracing::warn;

use crate::samples::{self, Sample};

/// Find a sample by name
pub fn lookup(name: &str) -> Result<&'static Sample> {
    samples::find(name).ok_or_else(|| {
        eyre!("unknown sample '{name}' (available: {})", samples::names().join(", "))
    })
}

/// Run `sample` once under a fresh recorder
pub fn record(
    sample: &Sample,
    args: &[Value],
    config: &RecorderConfig,
) -> (Result<Value, TargetError>, Trace) {
    let mut recorder = Recorder::with_config(config.clone());
    let result = panic::catch_unwind(AssertUnwindSafe(|| recorder.run(&sample.program, args)))
        .unwrap_or_else(|payload| {
            let err = TargetError::from_panic(payload);
            warn!(sample = sample.name, error = %err, "sample panicked");
            Err(err)
        });
    (result, recorder.into_trace())
}

/// Format a call like `name(1, 2, 3)`
pub fn call_string(sample: &Sample, args: &[Value]) -> String {
    let args = args.iter().map(ToString::to_string).collect::<Vec<_>>();
    format!("{}({})", sample.name, args.join(", "))
}

/// Format a target's outcome
pub fn outcome_string(result: &Result<Value, TargetError>) -> String {
    match result {
        Ok(value) => value.to_string(),
        Err(err) => format!("raised {err}"),
    }
}

/// Print a section banner
pub fn print_header(title: &str) {
    let rule = "=".repeat(80);
    println!("\n{rule}\n  {title}\n{rule}\n");
}
