// DAX - Dynamic Analysis eXplorer
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Trace command - record a sample and print or export its trace

use std::{fs, path::PathBuf};

use dax_engine::AnalysisConfig;
use eyre::{Result, WrapErr};
use tracing::info;

use super::{call_string, outcome_string, record};
use crate::samples::Sample;

/// Output options of the trace command
#[derive(Debug, Clone, Default)]
pub struct TraceOptions {
    /// Maximum number of events to print
    pub max_events: usize,
    /// Print JSON instead of the text listing
    pub json: bool,
    /// Write the JSON trace to this file
    pub output: Option<PathBuf>,
}

/// Record `sample` with `args` and report its trace
pub fn trace_sample(
    sample: &Sample,
    args: &[String],
    options: &TraceOptions,
    config: &AnalysisConfig,
) -> Result<()> {
    let args = sample.parse_args(args);
    info!("Tracing {}", call_string(sample, &args));

    let (result, trace) = record(sample, &args, &config.recorder);

    if let Some(path) = &options.output {
        let json = serde_json::to_string_pretty(&trace)?;
        fs::write(path, json)
            .wrap_err_with(|| format!("failed to write trace to {}", path.display()))?;
        println!("Wrote {} events to {}", trace.len(), path.display());
        return Ok(());
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(&trace)?);
        return Ok(());
    }

    println!("{} = {}", call_string(sample, &args), outcome_string(&result));
    print!("{}", trace.render(options.max_events));

    println!("\nExecuted statements:");
    for location in trace.executed_statements() {
        let text = sample.source_line(location.line).unwrap_or_default();
        println!("  {:3}  {}", location.line, text.trim());
    }
    Ok(())
}
