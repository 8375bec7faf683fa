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

//! Trace recorder.
//!
//! The recorder observes a running [`Target`] step by step and produces a [`Trace`].
//! Observation happens inside a [`Session`]: a guard that holds the recorder mutably for
//! as long as steps may arrive and detaches when dropped, whichever way the target exits.
//!
//! # Recording rules
//!
//! - Steps from ignored units (see [`RecorderConfig`]) are dropped.
//! - Every recorded step gets its accesses inferred against the previous recorded step's
//!   scope. The first step of a session writes everything in scope.
//! - The partial trace survives a target that fails or panics.

mod hook;
pub use hook::*;

use dax_common::types::{infer_accesses, Locals, Location, StepEvent, StepKind, Trace, Value};
use tracing::{debug, warn};

use crate::{RecorderConfig, TargetError};

/// Unit name of the recorder's own implementation; steps reported from it are never recorded.
pub const RECORDER_UNIT: &str = module_path!();

/// Records execution traces of instrumented targets.
#[derive(Debug, Default)]
pub struct Recorder {
    config: RecorderConfig,
    trace: Trace,
    previous: Locals,
}

impl Recorder {
    /// Create a recorder with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a recorder with the given configuration
    pub fn with_config(config: RecorderConfig) -> Self {
        Self { config, ..Default::default() }
    }

    /// Start a session, discarding any previously recorded trace.
    ///
    /// The returned guard is the step hook. The session ends when the guard is dropped.
    pub fn begin_session(&mut self) -> Session<'_> {
        self.trace = Trace::new();
        self.previous.clear();
        debug!("recording session started");
        Session { recorder: self }
    }

    /// Run `target` with `args` inside a fresh session.
    ///
    /// The session is always closed before this returns, including when the target fails
    /// (its error is returned as-is) or panics (the panic continues after teardown).
    pub fn run<T>(&mut self, target: &T, args: &[Value]) -> Result<Value, TargetError>
    where
        T: Target + ?Sized,
    {
        let mut session = self.begin_session();
        let result = target.invoke(&mut session, args);
        session.end();

        if let Err(err) = &result {
            warn!(events = self.trace.len(), error = %err, "traced target raised");
        }
        result
    }

    /// The trace of the last session
    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// Take ownership of the last session's trace, leaving an empty one behind
    pub fn take_trace(&mut self) -> Trace {
        self.previous.clear();
        std::mem::take(&mut self.trace)
    }

    /// Consume the recorder and return the last session's trace
    pub fn into_trace(self) -> Trace {
        self.trace
    }

    /// Distinct statement locations executed in the last session, in first-visit order
    pub fn executed_statements(&self) -> Vec<Location> {
        self.trace.executed_statements()
    }

    /// Every `(location, value)` observed for `name` in the last session
    pub fn history(&self, name: &str) -> Vec<(Location, Value)> {
        self.trace.history(name)
    }

    /// The recorder's configuration
    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    fn record(&mut self, kind: StepKind, location: Location, function: &str, locals: Locals) {
        if !self.config.should_record(&location.unit) {
            return;
        }

        let accesses = infer_accesses(&self.previous, &locals);
        self.previous.clone_from(&locals);
        self.trace.push(StepEvent {
            kind,
            location,
            function: function.to_string(),
            locals,
            accesses,
        });
    }
}

/// An active recording session.
///
/// Only one session per recorder can exist at a time: the session borrows the recorder
/// mutably until it is dropped.
#[derive(Debug)]
pub struct Session<'r> {
    recorder: &'r mut Recorder,
}

impl Session<'_> {
    /// End the session explicitly. Dropping the session has the same effect.
    pub fn end(self) {}

    /// Number of steps recorded so far
    pub fn len(&self) -> usize {
        self.recorder.trace.len()
    }

    /// Whether no step has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.recorder.trace.is_empty()
    }
}

impl StepHook for Session<'_> {
    fn on_step(&mut self, kind: StepKind, location: Location, function: &str, locals: Locals) {
        self.recorder.record(kind, location, function, locals);
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        debug!(events = self.recorder.trace.len(), "recording session ended");
    }
}
