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

use std::{
    fmt::Write as _,
    ops::{Deref, DerefMut},
};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::{Location, StepEvent, StepKind, Value};

/// Prefix of names that belong to the runtime rather than the observed program.
pub const RESERVED_PREFIX: &str = "__";

/// Trace representation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trace {
    inner: Vec<StepEvent>,
}

impl Deref for Trace {
    type Target = Vec<StepEvent>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for Trace {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl From<Vec<StepEvent>> for Trace {
    fn from(inner: Vec<StepEvent>) -> Self {
        Self { inner }
    }
}

impl FromIterator<StepEvent> for Trace {
    fn from_iter<I: IntoIterator<Item = StepEvent>>(iter: I) -> Self {
        Self { inner: iter.into_iter().collect() }
    }
}

impl Trace {
    /// Convert trace to serde_json::Value for serialization
    pub fn to_json_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Create a new empty trace
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step event to this trace
    pub fn push(&mut self, event: StepEvent) {
        self.inner.push(event);
    }

    /// Get the number of step events
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if the trace is empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Distinct statement locations executed, in first-visit order.
    ///
    /// Only [`StepKind::Line`] events count as executed statements.
    pub fn executed_statements(&self) -> Vec<Location> {
        self.inner
            .iter()
            .filter(|event| event.kind.is_statement())
            .map(|event| event.location.clone())
            .unique()
            .collect()
    }

    /// Every `(location, value)` observed for `name`, in event order.
    pub fn history(&self, name: &str) -> Vec<(Location, Value)> {
        self.inner
            .iter()
            .filter_map(|event| {
                event.locals.get(name).map(|value| (event.location.clone(), value.clone()))
            })
            .collect()
    }

    /// Render at most `max_events` events as a readable listing.
    pub fn render(&self, max_events: usize) -> String {
        let mut out = String::new();
        let rule = "=".repeat(80);

        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "EXECUTION TRACE");
        let _ = writeln!(out, "{rule}");

        for (i, event) in self.inner.iter().take(max_events).enumerate() {
            let _ = writeln!(
                out,
                "\n[Event {}] {} at {}",
                i + 1,
                event.kind.to_string().to_uppercase(),
                event.location
            );
            let _ = writeln!(out, "  Function: {}", event.function);

            let visible = event
                .locals
                .iter()
                .filter(|(name, _)| !name.starts_with(RESERVED_PREFIX))
                .collect::<Vec<_>>();
            if !visible.is_empty() {
                let _ = writeln!(out, "  Locals:");
                for (name, value) in visible {
                    let _ = writeln!(out, "    {name} = {value}");
                }
            }

            if !event.accesses.is_empty() {
                let _ = writeln!(out, "  Accesses: {}", event.accesses.iter().join(", "));
            }
        }

        if self.inner.len() > max_events {
            let _ = writeln!(out, "\n... ({} more events)", self.inner.len() - max_events);
        }

        let _ = writeln!(out, "\n{rule}");
        let _ = writeln!(out, "Total Events: {}", self.inner.len());
        let _ = writeln!(out, "{rule}");
        out
    }
}

// IntoIterator for owned Trace (moves out its contents)
impl IntoIterator for Trace {
    type Item = StepEvent;
    type IntoIter = std::vec::IntoIter<StepEvent>;
    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

// IntoIterator for &Trace (shared iteration)
impl<'a> IntoIterator for &'a Trace {
    type Item = &'a StepEvent;
    type IntoIter = std::slice::Iter<'a, StepEvent>;
    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}
