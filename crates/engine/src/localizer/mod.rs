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

//! Spectrum-based fault localization.
//!
//! The localizer runs a target over a suite of test cases, recording which statements each
//! test executed. Statements executed mostly by failing tests are ranked as suspicious.

mod formula;
pub use formula::*;

use std::{
    collections::BTreeSet,
    fmt::{self, Write as _},
    panic::{self, AssertUnwindSafe},
};

use dax_common::types::{Location, Value};
use itertools::Itertools;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{LocalizerConfig, Recorder, RecorderConfig, Target, TargetError};

/// What a test run produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ActualOutput {
    /// The target returned a value
    Returned(Value),
    /// The target raised an error or panicked
    Raised(TargetError),
}

impl fmt::Display for ActualOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Returned(value) => write!(f, "{value}"),
            Self::Raised(err) => write!(f, "raised {err}"),
        }
    }
}

/// A test case and, once run, its outcome.
#[derive(Debug, Clone)]
pub struct TestCase {
    /// Test name
    pub name: String,
    /// Positional arguments passed to the target
    pub inputs: Vec<Value>,
    /// Expected return value
    pub expected: Value,
    /// What the target produced, `None` until run
    pub actual: Option<ActualOutput>,
    /// Whether the target returned the expected value
    pub passed: bool,
    /// Statements executed by this test
    pub covered: BTreeSet<Location>,
}

impl TestCase {
    /// Create a pending test case
    pub fn new(name: impl Into<String>, inputs: Vec<Value>, expected: Value) -> Self {
        Self {
            name: name.into(),
            inputs,
            expected,
            actual: None,
            passed: false,
            covered: BTreeSet::new(),
        }
    }

    /// Whether the test has not been run yet
    pub fn is_pending(&self) -> bool {
        self.actual.is_none()
    }

    /// Whether the test ran and failed
    pub fn failed(&self) -> bool {
        !self.is_pending() && !self.passed
    }

    fn execute<T>(&mut self, recorder: &mut Recorder, target: &T)
    where
        T: Target + ?Sized,
    {
        let inputs = &self.inputs;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| recorder.run(target, inputs)));

        let actual = match outcome {
            Ok(Ok(value)) => ActualOutput::Returned(value),
            Ok(Err(err)) => ActualOutput::Raised(err),
            Err(payload) => {
                let err = TargetError::from_panic(payload);
                warn!(test = %self.name, error = %err, "target panicked");
                ActualOutput::Raised(err)
            }
        };

        self.covered = recorder.executed_statements().into_iter().collect();
        self.passed = matches!(&actual, ActualOutput::Returned(value) if *value == self.expected);
        debug!(
            test = %self.name,
            passed = self.passed,
            covered = self.covered.len(),
            actual = %actual,
            "test case finished"
        );
        self.actual = Some(actual);
    }
}

/// Suspiciousness of one statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspiciousnessScore {
    /// The statement
    pub statement: Location,
    /// Tarantula score in `[0, 1]`
    pub tarantula: f64,
    /// Ochiai score in `[0, 1]`
    pub ochiai: f64,
    /// Failing tests that covered the statement
    pub failed_count: usize,
    /// Passing tests that covered the statement
    pub passed_count: usize,
}

/// Suite totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizationSummary {
    /// Registered tests
    pub total: usize,
    /// Tests that ran and passed
    pub passed: usize,
    /// Tests that ran and failed
    pub failed: usize,
    /// Tests not run yet
    pub pending: usize,
    /// Distinct statements covered by any test
    pub statements_covered: usize,
}

/// Ranks statements by how strongly their execution correlates with failing tests.
#[derive(Debug, Clone, Default)]
pub struct FaultLocalizer {
    config: LocalizerConfig,
    recorder_config: RecorderConfig,
    tests: Vec<TestCase>,
}

impl FaultLocalizer {
    /// Create a localizer with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a localizer with the given configuration
    pub fn with_config(config: LocalizerConfig) -> Self {
        Self { config, ..Default::default() }
    }

    /// Use `config` for the recorders that run each test
    pub fn with_recorder_config(mut self, config: RecorderConfig) -> Self {
        self.recorder_config = config;
        self
    }

    /// Register a test case
    pub fn add_test(&mut self, name: impl Into<String>, inputs: Vec<Value>, expected: Value) {
        self.tests.push(TestCase::new(name, inputs, expected));
    }

    /// Registered test cases, in registration order
    pub fn tests(&self) -> &[TestCase] {
        &self.tests
    }

    /// The localizer's configuration
    pub fn config(&self) -> &LocalizerConfig {
        &self.config
    }

    /// Run every test against `target`, one after another.
    ///
    /// Each test gets a fresh recording session. A test whose target raises or panics fails
    /// and the batch continues.
    pub fn run<T>(&mut self, target: &T)
    where
        T: Target + ?Sized,
    {
        let mut recorder = Recorder::with_config(self.recorder_config.clone());
        for case in &mut self.tests {
            case.execute(&mut recorder, target);
        }
        self.log_summary();
    }

    /// Run every test against `target` on the rayon pool. Each test owns its recorder.
    pub fn run_parallel<T>(&mut self, target: &T)
    where
        T: Target + Sync + ?Sized,
    {
        let recorder_config = &self.recorder_config;
        self.tests.par_iter_mut().for_each(|case| {
            let mut recorder = Recorder::with_config(recorder_config.clone());
            case.execute(&mut recorder, target);
        });
        self.log_summary();
    }

    /// Run every test, in parallel when the configuration asks for it
    pub fn run_with_config<T>(&mut self, target: &T)
    where
        T: Target + Sync + ?Sized,
    {
        if self.config.parallel {
            self.run_parallel(target);
        } else {
            self.run(target);
        }
    }

    fn log_summary(&self) {
        let summary = self.summary();
        info!(
            total = summary.total,
            passed = summary.passed,
            failed = summary.failed,
            statements = summary.statements_covered,
            "test suite finished"
        );
    }

    /// Score every covered statement, most suspicious first.
    ///
    /// Empty when no test failed. Ties keep ascending statement order.
    pub fn compute_suspiciousness(&self) -> Vec<SuspiciousnessScore> {
        let failing = self.tests.iter().filter(|t| t.failed()).collect_vec();
        let passing = self.tests.iter().filter(|t| t.passed).collect_vec();
        if failing.is_empty() {
            return Vec::new();
        }

        let statements: BTreeSet<&Location> =
            self.tests.iter().flat_map(|t| t.covered.iter()).collect();

        let mut scores = statements
            .into_iter()
            .map(|statement| {
                let failed_count = failing.iter().filter(|t| t.covered.contains(statement)).count();
                let passed_count = passing.iter().filter(|t| t.covered.contains(statement)).count();
                SuspiciousnessScore {
                    statement: statement.clone(),
                    tarantula: tarantula(failed_count, failing.len(), passed_count, passing.len()),
                    ochiai: ochiai(failed_count, failing.len(), passed_count),
                    failed_count,
                    passed_count,
                }
            })
            .collect_vec();

        scores.sort_by(|a, b| b.tarantula.total_cmp(&a.tarantula));
        scores
    }

    /// The top-ranked statement, if any test failed
    pub fn most_suspicious_statement(&self) -> Option<Location> {
        self.compute_suspiciousness().into_iter().next().map(|score| score.statement)
    }

    /// Coverage spectrum per test, in registration order
    pub fn spectra(&self) -> Vec<(&str, &BTreeSet<Location>)> {
        self.tests.iter().map(|t| (t.name.as_str(), &t.covered)).collect()
    }

    /// Suite totals
    pub fn summary(&self) -> LocalizationSummary {
        let statements: BTreeSet<&Location> =
            self.tests.iter().flat_map(|t| t.covered.iter()).collect();
        LocalizationSummary {
            total: self.tests.len(),
            passed: self.tests.iter().filter(|t| t.passed).count(),
            failed: self.tests.iter().filter(|t| t.failed()).count(),
            pending: self.tests.iter().filter(|t| t.is_pending()).count(),
            statements_covered: statements.len(),
        }
    }

    /// Render test results and the `top_n` most suspicious statements.
    pub fn render_report(&self, top_n: usize) -> String {
        let mut out = String::new();
        let rule = "=".repeat(80);
        let summary = self.summary();

        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "FAULT LOCALIZATION REPORT");
        let _ = writeln!(out, "{rule}");

        let _ = writeln!(
            out,
            "\nTests: {} total, {} passed, {} failed",
            summary.total, summary.passed, summary.failed
        );
        for case in &self.tests {
            let mark = if case.passed { '✓' } else { '✗' };
            let inputs = case.inputs.iter().join(", ");
            let actual = case.actual.as_ref().map_or_else(|| "-".to_string(), ToString::to_string);
            let _ = writeln!(
                out,
                "  {mark} {}: inputs=({inputs}) expected={} actual={actual}",
                case.name, case.expected
            );
        }

        let scores = self.compute_suspiciousness();
        if scores.is_empty() {
            let _ = writeln!(out, "\nNo failing tests; nothing to localize.");
        } else {
            let _ = writeln!(out, "\nSuspiciousness Ranking (Tarantula):");
            let _ = writeln!(
                out,
                "  {:<4} {:<32} {:>9} {:>9} {:>6} {:>6}",
                "Rank", "Statement", "Tarantula", "Ochiai", "Failed", "Passed"
            );
            for (rank, score) in scores.iter().take(top_n).enumerate() {
                let _ = writeln!(
                    out,
                    "  {:<4} {:<32} {:>9.3} {:>9.3} {:>6} {:>6}",
                    rank + 1,
                    score.statement.to_string(),
                    score.tarantula,
                    score.ochiai,
                    score.failed_count,
                    score.passed_count
                );
            }
            if let Some(top) = scores.first() {
                let _ = writeln!(out, "\nMost suspicious: {}", top.statement);
            }
        }

        let _ = writeln!(out, "\n{rule}");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Frame, StepHook};
    use dax_common::locals;

    const UNIT: &str = "tests::localizer";

    /// `abs` that forgets to negate: line 3 is the fault.
    fn bad_abs(hook: &mut dyn StepHook, args: &[Value]) -> Result<Value, TargetError> {
        let x = crate::int_arg(args, 0)?;
        let mut frame = Frame::enter(hook, UNIT, "bad_abs", 1, locals! { x });
        let mut r = x;
        frame.line(2, locals! { x, r });
        if x < 0 {
            r = x;
            frame.line(3, locals! { x, r });
        }
        frame.ret(4, locals! { x, r });
        Ok(Value::Int(r))
    }

    fn panicking(_hook: &mut dyn StepHook, args: &[Value]) -> Result<Value, TargetError> {
        if args.is_empty() {
            panic!("no input");
        }
        Ok(Value::Int(0))
    }

    fn abs_suite() -> FaultLocalizer {
        let mut localizer = FaultLocalizer::new();
        localizer.add_test("positive", vec![Value::Int(4)], Value::Int(4));
        localizer.add_test("negative", vec![Value::Int(-2)], Value::Int(2));
        localizer
    }

    #[test]
    fn test_pending_until_run() {
        let localizer = abs_suite();
        assert!(localizer.tests().iter().all(TestCase::is_pending));
        assert!(localizer.compute_suspiciousness().is_empty());
        assert_eq!(localizer.summary().pending, 2);
    }

    #[test]
    fn test_faulty_line_ranks_first() {
        let mut localizer = abs_suite();
        localizer.run(&bad_abs);

        let scores = localizer.compute_suspiciousness();
        assert_eq!(scores[0].statement, Location::new(UNIT, 3));
        assert_eq!(scores[0].tarantula, 1.0);
        assert_eq!(scores[0].ochiai, 1.0);

        // always covered: one failing, one passing
        let line2 = scores.iter().find(|s| s.statement.line == 2).unwrap();
        assert!((line2.tarantula - 0.5).abs() < 1e-9);
        assert_eq!((line2.failed_count, line2.passed_count), (1, 1));
        assert_eq!(localizer.most_suspicious_statement(), Some(Location::new(UNIT, 3)));
    }

    #[test]
    fn test_ties_keep_statement_order() {
        let mut localizer = abs_suite();
        localizer.run(&bad_abs);
        let lines = localizer.compute_suspiciousness().iter().map(|s| s.statement.line).collect_vec();
        assert_eq!(lines, vec![3, 2, 4]);
    }

    #[test]
    fn test_no_failures_no_scores() {
        let mut localizer = FaultLocalizer::new();
        localizer.add_test("positive", vec![Value::Int(4)], Value::Int(4));
        localizer.run(&bad_abs);
        assert!(localizer.compute_suspiciousness().is_empty());
        assert_eq!(localizer.most_suspicious_statement(), None);
        assert!(localizer.render_report(5).contains("nothing to localize"));
    }

    #[test]
    fn test_raised_and_panicking_targets_fail() {
        let mut localizer = FaultLocalizer::new();
        localizer.add_test("missing", vec![], Value::Int(0));
        localizer.add_test("given", vec![Value::Int(1)], Value::Int(0));
        localizer.run(&panicking);

        let tests = localizer.tests();
        assert!(tests[0].failed());
        assert_eq!(
            tests[0].actual,
            Some(ActualOutput::Raised(TargetError::Panicked("no input".into())))
        );
        assert!(tests[1].passed);

        let mut localizer = FaultLocalizer::new();
        localizer.add_test("bad arg", vec![Value::Text("x".into())], Value::Int(0));
        localizer.run(&bad_abs);
        assert!(matches!(
            localizer.tests()[0].actual,
            Some(ActualOutput::Raised(TargetError::Argument { index: 0, .. }))
        ));
        assert!(localizer.tests()[0].covered.is_empty());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut sequential = abs_suite();
        sequential.run(&bad_abs);

        let mut parallel = FaultLocalizer::with_config(LocalizerConfig::default().with_parallel(true));
        parallel.add_test("positive", vec![Value::Int(4)], Value::Int(4));
        parallel.add_test("negative", vec![Value::Int(-2)], Value::Int(2));
        parallel.run_with_config(&bad_abs);

        assert_eq!(sequential.compute_suspiciousness(), parallel.compute_suspiciousness());
        assert_eq!(sequential.spectra(), parallel.spectra());
    }

    #[test]
    fn test_report() {
        let mut localizer = abs_suite();
        localizer.run(&bad_abs);
        let report = localizer.render_report(2);
        assert!(report.contains("FAULT LOCALIZATION REPORT"));
        assert!(report.contains("Tests: 2 total, 1 passed, 1 failed"));
        assert!(report.contains("✗ negative: inputs=(-2) expected=2 actual=-2"));
        assert!(report.contains("Most suspicious: tests::localizer:3"));
        assert!(!report.contains("tests::localizer:4 "));
    }
}
