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

//! Localize command - spectrum-based fault localization over a sample's test table

use dax_engine::{AnalysisConfig, FaultLocalizer};
use eyre::{bail, Result};
use tracing::info;

use crate::samples::Sample;

/// Run the test table of `sample` and print the suspiciousness ranking
pub fn localize_sample(
    sample: &Sample,
    parallel: bool,
    top: Option<usize>,
    config: &AnalysisConfig,
) -> Result<()> {
    let cases = sample.test_cases();
    if cases.is_empty() {
        bail!("sample '{}' has no test table", sample.name);
    }

    let localizer_config =
        config.localizer.clone().with_parallel(parallel || config.localizer.parallel);
    let top_n = top.unwrap_or(localizer_config.top_n);

    let mut localizer = FaultLocalizer::with_config(localizer_config)
        .with_recorder_config(config.recorder.clone());
    for (name, inputs, expected) in cases {
        localizer.add_test(name, inputs, expected);
    }

    info!("Running {} tests against {}", localizer.tests().len(), sample.name);
    localizer.run_with_config(&sample.program);

    print!("{}", localizer.render_report(top_n));
    if let Some(statement) = localizer.most_suspicious_statement() {
        let text = sample.source_line(statement.line).unwrap_or_default();
        println!("Most suspicious line {}: {}", statement.line, text.trim());
    }
    Ok(())
}
