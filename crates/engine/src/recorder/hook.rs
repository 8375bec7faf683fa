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

//! Step hook interface between instrumented code and the recorder.
//!
//! Instrumented code reports each step it takes to a [`StepHook`]. The recorder's
//! [`Session`](super::Session) is one implementation; [`NoopHook`] runs the same code untraced.
//! [`Frame`] keeps the bookkeeping for one function activation so instrumented bodies only
//! state line numbers and the bindings in scope.

use dax_common::types::{Locals, Location, StepKind, Value};

use crate::TargetError;

/// Callback invoked by instrumented code at every observed step.
///
/// `locals` is already a copy of the scope; implementors may keep it.
pub trait StepHook {
    /// Observe one step
    fn on_step(&mut self, kind: StepKind, location: Location, function: &str, locals: Locals);
}

/// Hook that discards every step.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHook;

impl StepHook for NoopHook {
    fn on_step(&mut self, _kind: StepKind, _location: Location, _function: &str, _locals: Locals) {}
}

/// A computation that can be observed.
///
/// Any `Fn(&mut dyn StepHook, &[Value]) -> Result<Value, TargetError>` is a target.
pub trait Target {
    /// Run the computation with positional `args`, reporting steps to `hook`
    fn invoke(&self, hook: &mut dyn StepHook, args: &[Value]) -> Result<Value, TargetError>;
}

impl<F> Target for F
where
    F: Fn(&mut dyn StepHook, &[Value]) -> Result<Value, TargetError>,
{
    fn invoke(&self, hook: &mut dyn StepHook, args: &[Value]) -> Result<Value, TargetError> {
        self(hook, args)
    }
}

/// One activation of an instrumented function.
///
/// Statement steps are reported after the statement has taken effect, so the captured scope
/// already holds the values the statement wrote.
///
/// A frame dropped without [`ret`](Frame::ret) or [`raise`](Frame::raise), e.g. when the body
/// propagates a callee's error with `?` or unwinds from a panic, reports an exception step
/// and a return step at the last reported line, so every call step has a matching return.
pub struct Frame<'h> {
    hook: &'h mut dyn StepHook,
    unit: String,
    function: String,
    last_line: u32,
    last_locals: Locals,
    closed: bool,
}

impl std::fmt::Debug for Frame<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame").field("unit", &self.unit).field("function", &self.function).finish()
    }
}

impl<'h> Frame<'h> {
    /// Enter `function`, reporting a call step with the bound parameters.
    pub fn enter(
        hook: &'h mut dyn StepHook,
        unit: impl Into<String>,
        function: impl Into<String>,
        line: u32,
        params: Locals,
    ) -> Self {
        let mut frame = Self {
            hook,
            unit: unit.into(),
            function: function.into(),
            last_line: line,
            last_locals: Locals::new(),
            closed: false,
        };
        frame.emit(StepKind::Call, line, params);
        frame
    }

    /// Report that the statement at `line` executed.
    pub fn line(&mut self, line: u32, locals: Locals) {
        self.emit(StepKind::Line, line, locals);
    }

    /// Report the return statement at `line` and leave the function.
    pub fn ret(mut self, line: u32, locals: Locals) {
        self.emit(StepKind::Line, line, locals.clone());
        self.emit(StepKind::Return, line, locals);
        self.closed = true;
    }

    /// Report that the statement at `line` raised `error` and leave the function.
    ///
    /// Returns `error` so the body can propagate it: `return Err(frame.raise(..))`.
    pub fn raise(mut self, line: u32, locals: Locals, error: TargetError) -> TargetError {
        self.emit(StepKind::Line, line, locals.clone());
        self.emit(StepKind::Exception, line, locals.clone());
        self.emit(StepKind::Return, line, locals);
        self.closed = true;
        error
    }

    /// The hook, for passing on to nested calls.
    pub fn hook(&mut self) -> &mut dyn StepHook {
        &mut *self.hook
    }

    /// Name of the function this frame belongs to
    pub fn function(&self) -> &str {
        &self.function
    }

    fn emit(&mut self, kind: StepKind, line: u32, locals: Locals) {
        self.last_line = line;
        self.last_locals.clone_from(&locals);
        let location = Location::new(self.unit.as_str(), line);
        self.hook.on_step(kind, location, &self.function, locals);
    }
}

impl Drop for Frame<'_> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let (line, locals) = (self.last_line, std::mem::take(&mut self.last_locals));
        self.emit(StepKind::Exception, line, locals.clone());
        self.emit(StepKind::Return, line, locals);
    }
}

/// Fetch positional argument `index` as a signed integer.
pub fn int_arg(args: &[Value], index: usize) -> Result<i64, TargetError> {
    args.get(index).and_then(Value::as_i64).ok_or_else(|| TargetError::argument(index, "int"))
}

/// Fetch positional argument `index` as a float, widening integers.
pub fn float_arg(args: &[Value], index: usize) -> Result<f64, TargetError> {
    args.get(index).and_then(Value::as_f64).ok_or_else(|| TargetError::argument(index, "float"))
}
