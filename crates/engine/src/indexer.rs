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

//! Execution indexing.
//!
//! Every execution of a statement is named by an [`ExecutionPoint`]: the calling context
//! (stack of function names), the statement, and how many times that statement has run in
//! exactly that context. The third and fifth iteration of a loop body, or the same line at
//! recursion depth 1 and depth 2, therefore get different names.

use std::{
    collections::{HashMap, HashSet},
    fmt::{self, Write as _},
};

use dax_common::types::{Location, StepEvent, StepKind, Trace};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A unique coordinate of one statement execution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutionPoint {
    /// Calling context, outermost function first
    pub context: Vec<String>,
    /// The executed statement
    pub statement: Location,
    /// 1-based occurrence count of `statement` within `context`
    pub instance: u32,
}

impl fmt::Display for ExecutionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let context =
            if self.context.is_empty() { "main".to_string() } else { self.context.join("->") };
        write!(f, "<{context}, L{}, #{}>", self.statement.line, self.instance)
    }
}

/// Summary of an indexing session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndexStatistics {
    /// Number of recorded points
    pub total_points: usize,
    /// Number of distinct calling contexts
    pub unique_contexts: usize,
    /// Number of distinct statements
    pub unique_statements: usize,
    /// Largest instance number handed out
    pub max_instance: u32,
    /// Current depth of the context stack
    pub context_depth: usize,
}

/// Assigns execution points.
#[derive(Debug, Default, Clone)]
pub struct ExecutionIndexer {
    context: Vec<String>,
    counters: HashMap<(Vec<String>, Location), u32>,
    history: Vec<ExecutionPoint>,
}

impl ExecutionIndexer {
    /// Create an empty indexer
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `name` onto the calling context.
    pub fn enter_function(&mut self, name: impl Into<String>) {
        self.context.push(name.into());
    }

    /// Pop the innermost function. Popping an empty context is a no-op.
    pub fn exit_function(&mut self) {
        self.context.pop();
    }

    /// The current calling context
    pub fn current_context(&self) -> &[String] {
        &self.context
    }

    /// Record one execution of `statement` in the current context.
    pub fn record_point(&mut self, statement: Location) -> ExecutionPoint {
        let context = self.context.clone();
        let counter = self.counters.entry((context.clone(), statement.clone())).or_insert(0);
        *counter += 1;

        let point = ExecutionPoint { context, statement, instance: *counter };
        self.history.push(point.clone());
        point
    }

    /// Forget all contexts, counters and recorded points.
    pub fn reset(&mut self) {
        self.context.clear();
        self.counters.clear();
        self.history.clear();
    }

    /// All points recorded since the last reset, in order
    pub fn history(&self) -> &[ExecutionPoint] {
        &self.history
    }

    /// The point recorded at `index`
    pub fn point_at(&self, index: usize) -> Option<&ExecutionPoint> {
        self.history.get(index)
    }

    /// Indices of every recorded point equal to `target`
    pub fn find_matching(&self, target: &ExecutionPoint) -> Vec<usize> {
        self.history
            .iter()
            .enumerate()
            .filter(|(_, point)| *point == target)
            .map(|(index, _)| index)
            .collect()
    }

    /// Statistics over the recorded points
    pub fn statistics(&self) -> IndexStatistics {
        let contexts: HashSet<&[String]> =
            self.history.iter().map(|p| p.context.as_slice()).collect();
        let statements: HashSet<&Location> = self.history.iter().map(|p| &p.statement).collect();

        IndexStatistics {
            total_points: self.history.len(),
            unique_contexts: contexts.len(),
            unique_statements: statements.len(),
            max_instance: self.history.iter().map(|p| p.instance).max().unwrap_or(0),
            context_depth: self.context.len(),
        }
    }

    /// Index every event of `trace`, starting from a clean state.
    ///
    /// Call steps enter their function before being recorded and return steps leave it
    /// before being recorded, so a return is named in its caller's context.
    pub fn index_trace(&mut self, trace: &Trace) -> IndexedTrace {
        self.reset();

        let entries = trace
            .iter()
            .map(|event| {
                match event.kind {
                    StepKind::Call => self.enter_function(event.function.as_str()),
                    StepKind::Return => self.exit_function(),
                    StepKind::Line | StepKind::Exception => {}
                }
                let point = self.record_point(event.location.clone());
                (event.clone(), point)
            })
            .collect::<Vec<_>>();

        debug!(points = entries.len(), "indexed trace");
        IndexedTrace { entries }
    }
}

/// A trace whose events are paired with their execution points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexedTrace {
    entries: Vec<(StepEvent, ExecutionPoint)>,
}

impl IndexedTrace {
    /// Number of indexed events
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the trace has no events
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(event, point)` pairs in trace order
    pub fn iter(&self) -> impl Iterator<Item = &(StepEvent, ExecutionPoint)> + '_ {
        self.entries.iter()
    }

    /// The execution points in trace order
    pub fn points(&self) -> impl Iterator<Item = &ExecutionPoint> + '_ {
        self.entries.iter().map(|(_, point)| point)
    }

    /// Position of the event named by `point`
    pub fn position(&self, point: &ExecutionPoint) -> Option<usize> {
        self.entries.iter().position(|(_, p)| p == point)
    }

    /// Drop the points and get the plain trace back
    pub fn into_events(self) -> Trace {
        self.entries.into_iter().map(|(event, _)| event).collect()
    }

    /// Render at most `max_events` entries as a readable listing
    pub fn render(&self, max_events: usize) -> String {
        let mut out = String::new();
        let rule = "=".repeat(80);

        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "INDEXED EXECUTION TRACE");
        let _ = writeln!(out, "{rule}");

        for (i, (event, point)) in self.entries.iter().take(max_events).enumerate() {
            let _ = writeln!(out, "\n[{i:3}] {point}");
            let _ = writeln!(out, "      Event: {} at {}", event.kind, event.location);
            let _ = writeln!(out, "      Function: {}", event.function);
        }

        if self.entries.len() > max_events {
            let _ = writeln!(out, "\n... ({} more events)", self.entries.len() - max_events);
        }

        let _ = writeln!(out, "\n{rule}");
        out
    }
}

impl<'a> IntoIterator for &'a IndexedTrace {
    type Item = &'a (StepEvent, ExecutionPoint);
    type IntoIter = std::slice::Iter<'a, (StepEvent, ExecutionPoint)>;
    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
