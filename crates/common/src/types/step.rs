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

//! Step events: the unit of a recorded execution trace.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use super::Value;

/// Named local variables captured at one step, ordered by name.
pub type Locals = BTreeMap<String, Value>;

/// Kind of an observed step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// A function was entered; its parameters are bound
    Call,
    /// A statement finished executing
    Line,
    /// A function returned
    Return,
    /// A function raised an error
    Exception,
}

impl StepKind {
    /// Whether this is a plain statement step rather than a call boundary.
    pub fn is_statement(self) -> bool {
        matches!(self, Self::Line)
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Call => "call",
            Self::Line => "line",
            Self::Return => "return",
            Self::Exception => "exception",
        };
        f.write_str(s)
    }
}

/// A statement location: the source unit it lives in and its line number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    /// Identifier of the source unit (file or module)
    pub unit: String,
    /// Statement line number within the unit
    pub line: u32,
}

impl Location {
    /// Create a new location
    pub fn new(unit: impl Into<String>, line: u32) -> Self {
        Self { unit: unit.into(), line }
    }

    /// Whether `self` comes textually after `other` in the same unit.
    pub fn follows(&self, other: &Self) -> bool {
        self.unit == other.unit && self.line > other.line
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.unit, self.line)
    }
}

/// An inferred variable access.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "access", content = "name", rename_all = "snake_case")]
pub enum Access {
    /// The variable was present before and kept its value
    Read(String),
    /// The variable appeared or changed value
    Write(String),
}

impl Access {
    /// Name of the accessed variable
    pub fn name(&self) -> &str {
        match self {
            Self::Read(name) | Self::Write(name) => name,
        }
    }

    /// Whether this is a write
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Write(_))
    }

    /// Whether this is a read
    pub fn is_read(&self) -> bool {
        matches!(self, Self::Read(_))
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(name) => write!(f, "read:{name}"),
            Self::Write(name) => write!(f, "write:{name}"),
        }
    }
}

/// Infer accesses by diffing two consecutive scope snapshots.
///
/// Names that are new or whose value changed are writes, listed first in `current` order.
/// Names present in both snapshots with an equal value are reads, in `previous` order.
/// An unchanged variable is tagged as read whether or not the statement touched it.
pub fn infer_accesses(previous: &Locals, current: &Locals) -> Vec<Access> {
    let writes = current
        .iter()
        .filter(|(name, value)| previous.get(*name) != Some(*value))
        .map(|(name, _)| Access::Write(name.clone()));

    let reads = previous
        .iter()
        .filter(|(name, value)| current.get(*name) == Some(*value))
        .map(|(name, _)| Access::Read(name.clone()));

    writes.chain(reads).collect()
}

/// One observed moment of execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepEvent {
    /// What kind of step this is
    pub kind: StepKind,
    /// Where it happened
    pub location: Location,
    /// Name of the enclosing function
    pub function: String,
    /// Snapshot of the local scope
    pub locals: Locals,
    /// Accesses inferred against the previous recorded step
    pub accesses: Vec<Access>,
}

impl StepEvent {
    /// Names written at this step
    pub fn written(&self) -> impl Iterator<Item = &str> + '_ {
        self.accesses.iter().filter(|a| a.is_write()).map(Access::name)
    }

    /// Names read at this step
    pub fn read(&self) -> impl Iterator<Item = &str> + '_ {
        self.accesses.iter().filter(|a| a.is_read()).map(Access::name)
    }

    /// Whether `name` is tagged as read at this step
    pub fn reads(&self, name: &str) -> bool {
        self.accesses.iter().any(|a| a.is_read() && a.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locals(pairs: &[(&str, i64)]) -> Locals {
        pairs.iter().map(|(k, v)| (k.to_string(), Value::Int(*v))).collect()
    }

    #[test]
    fn test_first_step_writes_everything() {
        let accesses = infer_accesses(&Locals::new(), &locals(&[("x", 1), ("y", 2)]));
        assert_eq!(accesses, vec![Access::Write("x".into()), Access::Write("y".into())]);
    }

    #[test]
    fn test_changed_and_new_names_are_writes() {
        let prev = locals(&[("a", 1), ("x", 3)]);
        let cur = locals(&[("a", 2), ("b", 0), ("x", 3)]);
        let accesses = infer_accesses(&prev, &cur);
        assert_eq!(
            accesses,
            vec![
                Access::Write("a".into()),
                Access::Write("b".into()),
                Access::Read("x".into()),
            ]
        );
    }

    #[test]
    fn test_dropped_names_are_neither_read_nor_written() {
        let prev = locals(&[("tmp", 1)]);
        let accesses = infer_accesses(&prev, &Locals::new());
        assert!(accesses.is_empty());
    }

    #[test]
    fn test_location_follows_only_within_unit() {
        let a = Location::new("m", 3);
        assert!(Location::new("m", 5).follows(&a));
        assert!(!Location::new("m", 3).follows(&a));
        assert!(!Location::new("other", 9).follows(&a));
    }
}
