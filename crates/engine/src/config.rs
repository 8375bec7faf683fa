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

//! Analysis configuration.
//!
//! Every section has defaults, so a TOML file only needs the keys it changes:
//!
//! ```toml
//! [recorder]
//! ignored_units = ["vendor"]
//!
//! [slicer]
//! reserved_prefix = "__"
//!
//! [localizer]
//! parallel = true
//! top_n = 5
//! ```

use std::{fs, path::Path};

use dax_common::types::RESERVED_PREFIX;
use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};

use crate::recorder::RECORDER_UNIT;

/// Configuration of the trace recorder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Steps whose unit contains any of these substrings are not recorded. The recorder's own
    /// unit is skipped even when this list leaves it out.
    pub ignored_units: Vec<String>,
    /// Skip synthetic units, i.e. those whose name starts with `<`
    pub skip_synthetic_units: bool,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self { ignored_units: vec![RECORDER_UNIT.to_string()], skip_synthetic_units: true }
    }
}

impl RecorderConfig {
    /// Add a unit to ignore
    pub fn with_ignored_unit(mut self, unit: impl Into<String>) -> Self {
        self.ignored_units.push(unit.into());
        self
    }

    /// Enable or disable skipping of synthetic units
    pub fn with_skip_synthetic_units(mut self, skip: bool) -> Self {
        self.skip_synthetic_units = skip;
        self
    }

    /// Whether a step in `unit` should be recorded
    pub fn should_record(&self, unit: &str) -> bool {
        if unit.contains(RECORDER_UNIT) || (self.skip_synthetic_units && unit.starts_with('<')) {
            return false;
        }
        !self.ignored_units.iter().any(|ignored| unit.contains(ignored.as_str()))
    }
}

/// Configuration of the dynamic slicer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlicerConfig {
    /// Variables with this prefix never become data dependencies
    pub reserved_prefix: String,
}

impl Default for SlicerConfig {
    fn default() -> Self {
        Self { reserved_prefix: RESERVED_PREFIX.to_string() }
    }
}

impl SlicerConfig {
    /// Set the reserved name prefix
    pub fn with_reserved_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.reserved_prefix = prefix.into();
        self
    }
}

/// Configuration of the fault localizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalizerConfig {
    /// Run test cases on the rayon thread pool
    pub parallel: bool,
    /// Number of ranked statements shown in reports
    pub top_n: usize,
}

impl Default for LocalizerConfig {
    fn default() -> Self {
        Self { parallel: false, top_n: 10 }
    }
}

impl LocalizerConfig {
    /// Enable or disable parallel test execution
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the number of statements shown in reports
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }
}

/// Configuration for all analyses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Recorder settings
    pub recorder: RecorderConfig,
    /// Slicer settings
    pub slicer: SlicerConfig,
    /// Localizer settings
    pub localizer: LocalizerConfig,
}

impl AnalysisConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).wrap_err("invalid analysis configuration")
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&text)
    }

    /// Set the recorder section
    pub fn with_recorder(mut self, recorder: RecorderConfig) -> Self {
        self.recorder = recorder;
        self
    }

    /// Set the slicer section
    pub fn with_slicer(mut self, slicer: SlicerConfig) -> Self {
        self.slicer = slicer;
        self
    }

    /// Set the localizer section
    pub fn with_localizer(mut self, localizer: LocalizerConfig) -> Self {
        self.localizer = localizer;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.recorder.ignored_units, vec![RECORDER_UNIT.to_string()]);
        assert!(config.recorder.skip_synthetic_units);
        assert_eq!(config.slicer.reserved_prefix, "__");
        assert!(!config.localizer.parallel);
        assert_eq!(config.localizer.top_n, 10);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AnalysisConfig::from_toml_str("[localizer]\nparallel = true\n").unwrap();
        assert!(config.localizer.parallel);
        assert_eq!(config.localizer.top_n, 10);
        assert_eq!(config.slicer, SlicerConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(AnalysisConfig::from_toml_str("[localizer]\nparallel = \"yes\"\n").is_err());
    }

    #[test]
    fn test_should_record() {
        let config = RecorderConfig::default().with_ignored_unit("vendor");
        assert!(config.should_record("samples"));
        assert!(!config.should_record("<string>"));
        assert!(!config.should_record("third_party::vendor::lib"));
        assert!(!config.should_record(RECORDER_UNIT));
        assert!(config.with_skip_synthetic_units(false).should_record("<string>"));
    }

    #[test]
    fn test_replaced_ignore_list_still_skips_recorder() {
        let config = AnalysisConfig::from_toml_str("[recorder]\nignored_units = [\"vendor\"]\n")
            .unwrap()
            .recorder;
        assert_eq!(config.ignored_units, vec!["vendor".to_string()]);
        assert!(!config.should_record(RECORDER_UNIT));
        assert!(!config.should_record("vendor"));
        assert!(config.should_record("samples"));

        let empty = RecorderConfig { ignored_units: Vec::new(), skip_synthetic_units: false };
        assert!(!empty.should_record(RECORDER_UNIT));
    }
}
