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

//! Dynamic slicing over recorded traces.
//!
//! A slice answers "which executed statements could have influenced `var` at `statement`?".
//! The slicer walks the trace backwards from the last event at `statement` that holds `var`,
//! following inferred writes (data dependence) and inferred reads at plain statements
//! (control dependence).
//!
//! # Precision
//!
//! Both dependence kinds inherit the imprecision of access inference: a variable that merely
//! kept its value is a read. The control rule is coarser still. Any statement reading a
//! variable of interest is taken to gate every relevant statement textually after it, which
//! can link unrelated branches that share a variable name.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::Write as _,
};

use dax_common::types::{Location, StepEvent};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::SlicerConfig;

/// Whether the slice target was found in the trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SliceStatus {
    /// The target variable was observed at the target statement
    Found,
    /// The target variable was never observed at the target statement
    TargetNotFound,
}

/// Result of a slicing query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceResult {
    /// Statement the query was made at
    pub target_statement: Location,
    /// Variable the query was made for
    pub target_variable: String,
    /// Whether the target was found
    pub status: SliceStatus,
    /// Statements in the slice
    pub relevant_statements: BTreeSet<Location>,
    /// For each writing statement, the variables it read
    pub data_dependencies: BTreeMap<Location, BTreeSet<String>>,
    /// For each statement, the statements gating it
    pub control_dependencies: BTreeMap<Location, BTreeSet<Location>>,
}

impl SliceResult {
    fn not_found(target_statement: Location, target_variable: String) -> Self {
        Self {
            target_statement,
            target_variable,
            status: SliceStatus::TargetNotFound,
            relevant_statements: BTreeSet::new(),
            data_dependencies: BTreeMap::new(),
            control_dependencies: BTreeMap::new(),
        }
    }

    /// Whether the target was found in the trace
    pub fn is_found(&self) -> bool {
        self.status == SliceStatus::Found
    }

    /// Whether `statement` is part of the slice
    pub fn contains(&self, statement: &Location) -> bool {
        self.relevant_statements.contains(statement)
    }

    /// Line numbers of the relevant statements in the target's unit, ascending
    pub fn relevant_lines(&self) -> Vec<u32> {
        self.relevant_statements
            .iter()
            .filter(|loc| loc.unit == self.target_statement.unit)
            .map(|loc| loc.line)
            .collect()
    }

    /// Render the slice. With `source`, the listing of the target's unit is printed with
    /// relevant lines marked.
    pub fn render(&self, source: Option<&str>) -> String {
        let mut out = String::new();
        let rule = "=".repeat(80);

        let _ = writeln!(out, "{rule}");
        let _ = writeln!(
            out,
            "DYNAMIC SLICE: {} @ {}",
            self.target_variable, self.target_statement
        );
        let _ = writeln!(out, "{rule}");

        if !self.is_found() {
            let _ = writeln!(
                out,
                "\n'{}' was never observed at {}",
                self.target_variable, self.target_statement
            );
        }

        let relevant = self.relevant_statements.iter().map(ToString::to_string);
        let _ = writeln!(out, "\nRelevant Statements: [{}]", relevant.collect::<Vec<_>>().join(", "));

        if !self.data_dependencies.is_empty() {
            let _ = writeln!(out, "\nData Dependencies:");
            for (statement, vars) in &self.data_dependencies {
                let vars = vars.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
                let _ = writeln!(out, "  {statement} depends on variables: {{{vars}}}");
            }
        }

        if !self.control_dependencies.is_empty() {
            let _ = writeln!(out, "\nControl Dependencies:");
            for (statement, gates) in &self.control_dependencies {
                let gates = gates.iter().map(|g| g.line.to_string()).collect::<Vec<_>>();
                let _ = writeln!(out, "  {statement} controlled by lines: {{{}}}", gates.join(", "));
            }
        }

        if let Some(source) = source {
            let lines = self.relevant_lines();
            let _ = writeln!(out, "\nSliced Code:");
            for (i, text) in source.lines().enumerate() {
                let number = i as u32 + 1;
                let mark = if lines.contains(&number) { '✓' } else { ' ' };
                let _ = writeln!(out, "  {number:3} {mark} {text}");
            }
        }

        let _ = writeln!(out, "\n{rule}");
        out
    }
}

/// Computes backward dynamic slices.
#[derive(Debug, Clone, Default)]
pub struct DynamicSlicer {
    config: SlicerConfig,
}

impl DynamicSlicer {
    /// Create a slicer with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a slicer with the given configuration
    pub fn with_config(config: SlicerConfig) -> Self {
        Self { config }
    }

    /// Slice `trace` for `variable` at `statement`.
    ///
    /// When `variable` was never observed at `statement` the result is empty and its status
    /// is [`SliceStatus::TargetNotFound`].
    pub fn compute_slice(
        &self,
        trace: &[StepEvent],
        statement: &Location,
        variable: &str,
    ) -> SliceResult {
        let Some(target) = trace
            .iter()
            .rposition(|e| &e.location == statement && e.locals.contains_key(variable))
        else {
            warn!(%statement, variable, "slice target not found in trace");
            return SliceResult::not_found(statement.clone(), variable.to_string());
        };

        let mut state = SliceState::new(variable);
        for event in trace[..=target].iter().rev() {
            state.visit(event, &self.config.reserved_prefix);
        }

        debug!(
            %statement,
            variable,
            relevant = state.relevant.len(),
            "computed dynamic slice"
        );

        SliceResult {
            target_statement: statement.clone(),
            target_variable: variable.to_string(),
            status: SliceStatus::Found,
            relevant_statements: state.relevant,
            data_dependencies: state.data_deps,
            control_dependencies: state.control_deps,
        }
    }
}

/// Working state of one backward traversal
struct SliceState {
    interest: BTreeSet<String>,
    relevant: BTreeSet<Location>,
    data_deps: BTreeMap<Location, BTreeSet<String>>,
    control_deps: BTreeMap<Location, BTreeSet<Location>>,
}

impl SliceState {
    fn new(variable: &str) -> Self {
        Self {
            interest: BTreeSet::from([variable.to_string()]),
            relevant: BTreeSet::new(),
            data_deps: BTreeMap::new(),
            control_deps: BTreeMap::new(),
        }
    }

    fn visit(&mut self, event: &StepEvent, reserved_prefix: &str) {
        let location = &event.location;

        // Data dependence: this step wrote something we care about.
        for written in event.written() {
            if !self.interest.contains(written) {
                continue;
            }
            self.relevant.insert(location.clone());

            let used: BTreeSet<String> = event
                .locals
                .keys()
                .filter(|name| name.as_str() != written && !name.starts_with(reserved_prefix))
                .filter(|name| event.reads(name))
                .cloned()
                .collect();

            self.interest.extend(used.iter().cloned());
            self.data_deps.entry(location.clone()).or_default().extend(used);
        }

        // Control dependence: a plain statement read something we care about.
        if event.kind.is_statement() && event.read().any(|name| self.interest.contains(name)) {
            self.relevant.insert(location.clone());
            for later in self.relevant.iter().filter(|r| r.follows(location)) {
                self.control_deps.entry(later.clone()).or_default().insert(location.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dax_common::types::{infer_accesses, Locals, StepKind, Value};

    /// Build a trace the way the recorder would, from (kind, line, scope) triples.
    fn trace(steps: &[(StepKind, u32, &[(&str, i64)])]) -> Vec<StepEvent> {
        let mut previous = Locals::new();
        steps
            .iter()
            .map(|(kind, line, scope)| {
                let locals: Locals =
                    scope.iter().map(|(k, v)| (k.to_string(), Value::Int(*v))).collect();
                let accesses = infer_accesses(&previous, &locals);
                previous = locals.clone();
                StepEvent {
                    kind: *kind,
                    location: Location::new("u", *line),
                    function: "f".into(),
                    locals,
                    accesses,
                }
            })
            .collect()
    }

    fn loc(line: u32) -> Location {
        Location::new("u", line)
    }

    #[test]
    fn test_not_found_is_empty() {
        let t = trace(&[(StepKind::Line, 1, &[("x", 1)])]);
        let result = DynamicSlicer::new().compute_slice(&t, &loc(1), "y");
        assert_eq!(result.status, SliceStatus::TargetNotFound);
        assert!(result.relevant_statements.is_empty());
        assert!(result.data_dependencies.is_empty());
        assert!(result.render(None).contains("never observed"));
    }

    #[test]
    fn test_uses_last_matching_event() {
        let t = trace(&[
            (StepKind::Line, 1, &[("x", 1)]),
            (StepKind::Line, 2, &[("x", 1), ("y", 5)]),
            (StepKind::Line, 2, &[("x", 2), ("y", 5)]),
        ]);
        let result = DynamicSlicer::new().compute_slice(&t, &loc(2), "x");
        assert!(result.is_found());
        // The last line-2 event rewrote x, reading y; the earlier one defined y from x.
        assert!(result.data_dependencies[&loc(2)].contains("y"));
        assert_eq!(result.relevant_lines(), vec![1, 2]);
    }

    #[test]
    fn test_events_after_target_are_ignored() {
        let t = trace(&[
            (StepKind::Line, 1, &[("x", 1)]),
            (StepKind::Line, 2, &[("x", 1), ("z", 0)]),
            (StepKind::Line, 3, &[("x", 9), ("z", 0)]),
        ]);
        let result = DynamicSlicer::new().compute_slice(&t, &loc(1), "x");
        assert_eq!(result.relevant_lines(), vec![1]);
    }

    #[test]
    fn test_reserved_names_are_not_dependencies() {
        let t = trace(&[
            (StepKind::Line, 1, &[("__env", 1)]),
            (StepKind::Line, 2, &[("__env", 1), ("a", 3)]),
        ]);
        let result = DynamicSlicer::new().compute_slice(&t, &loc(2), "a");
        assert!(result.data_dependencies[&loc(2)].is_empty());

        let custom = DynamicSlicer::with_config(SlicerConfig::default().with_reserved_prefix("_x"));
        let result = custom.compute_slice(&t, &loc(2), "a");
        assert_eq!(result.data_dependencies[&loc(2)], BTreeSet::from(["__env".to_string()]));
    }

    #[test]
    fn test_control_edges_point_from_later_to_earlier() {
        // 1: n = 3; 2: if n > 0 (reads n); 3: r = 1 (reads n)
        let t = trace(&[
            (StepKind::Call, 1, &[("n", 3)]),
            (StepKind::Line, 2, &[("n", 3)]),
            (StepKind::Line, 3, &[("n", 3), ("r", 1)]),
        ]);
        let result = DynamicSlicer::new().compute_slice(&t, &loc(3), "r");
        assert_eq!(result.relevant_lines(), vec![1, 2, 3]);
        assert_eq!(result.control_dependencies[&loc(3)], BTreeSet::from([loc(2)]));
        assert!(!result.control_dependencies.contains_key(&loc(2)));
    }

    #[test]
    fn test_render_marks_relevant_lines() {
        let t = trace(&[
            (StepKind::Line, 1, &[("a", 1)]),
            (StepKind::Line, 2, &[("a", 1), ("b", 2)]),
        ]);
        let result = DynamicSlicer::new().compute_slice(&t, &loc(2), "b");
        let text = result.render(Some("let a = 1;\nlet b = a + 1;\nlet c = 0;"));
        assert!(text.contains("DYNAMIC SLICE: b @ u:2"));
        assert!(text.contains("    1 ✓ let a = 1;"));
        assert!(text.contains("    2 ✓ let b = a + 1;"));
        assert!(text.contains("    3   let c = 0;"));
    }
}
