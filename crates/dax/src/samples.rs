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

//! Sample catalog
//!
//! Small instrumented programs used as analysis targets. Every sample carries the listing it
//! was instrumented from: the line numbers reported to the hook are the listing's line numbers,
//! and the listing's unit is the sample's name.

use std::str::FromStr;

use dax_common::{locals, types::Value};
use dax_engine::{float_arg, int_arg, Frame, StepHook, TargetError};

/// Signature shared by all instrumented samples
pub type Program = fn(&mut dyn StepHook, &[Value]) -> Result<Value, TargetError>;

/// One row of a sample's test table
#[derive(Debug, Clone, Copy)]
pub struct SampleTest {
    /// Argument literals
    pub inputs: &'static [&'static str],
    /// Expected return value literal
    pub expected: &'static str,
}

/// A catalog entry
#[derive(Debug, Clone, Copy)]
pub struct Sample {
    /// Name, also the unit of every reported location
    pub name: &'static str,
    /// One-line summary
    pub description: &'static str,
    /// Parameter names, in order
    pub params: &'static [&'static str],
    /// Source listing whose line numbers match the instrumentation
    pub listing: &'static str,
    /// The instrumented program
    pub program: Program,
    /// Arguments used when none are given on the command line
    pub default_args: &'static [&'static str],
    /// Test table for fault localization; empty when not meaningful
    pub tests: &'static [SampleTest],
}

impl Sample {
    /// Parse argument literals, falling back to the sample's defaults when `args` is empty
    pub fn parse_args(&self, args: &[String]) -> Vec<Value> {
        if args.is_empty() {
            self.default_args.iter().map(|s| parse_literal(s)).collect()
        } else {
            args.iter().map(|s| parse_literal(s)).collect()
        }
    }

    /// The listing's text of `line`, if it exists
    pub fn source_line(&self, line: u32) -> Option<&'static str> {
        let index = usize::try_from(line).ok()?.checked_sub(1)?;
        self.listing.lines().nth(index)
    }

    /// The test table as `(name, inputs, expected)`
    pub fn test_cases(&self) -> Vec<(String, Vec<Value>, Value)> {
        self.tests
            .iter()
            .enumerate()
            .map(|(i, test)| {
                let inputs = test.inputs.iter().map(|s| parse_literal(s)).collect();
                (format!("test_{}", i + 1), inputs, parse_literal(test.expected))
            })
            .collect()
    }
}

fn parse_literal(s: &str) -> Value {
    match Value::from_str(s) {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

/// Look a sample up by name
pub fn find(name: &str) -> Option<&'static Sample> {
    CATALOG.iter().find(|sample| sample.name == name)
}

/// Names of all samples
pub fn names() -> Vec<&'static str> {
    CATALOG.iter().map(|sample| sample.name).collect()
}

const MAX_TESTS: &[SampleTest] = &[
    SampleTest { inputs: &["1", "2", "3"], expected: "3" },
    SampleTest { inputs: &["5", "3", "1"], expected: "5" },
    SampleTest { inputs: &["2", "8", "4"], expected: "8" },
    SampleTest { inputs: &["1", "1", "5"], expected: "5" },
    SampleTest { inputs: &["3", "3", "3"], expected: "3" },
    SampleTest { inputs: &["10", "5", "7"], expected: "10" },
    SampleTest { inputs: &["-1", "-5", "-3"], expected: "-1" },
];

/// Every available sample
pub const CATALOG: &[Sample] = &[
    Sample {
        name: "buggy_max",
        description: "maximum of three numbers; assigns the wrong variable on line 7",
        params: &["a", "b", "c"],
        listing: "\
fn buggy_max(a: i64, b: i64, c: i64) -> i64 {
    let mut max_val = a;
    if b > max_val {
        max_val = b;
    }
    if c > max_val {
        max_val = b; // should be c
    }
    max_val
}",
        program: buggy_max,
        default_args: &["1", "2", "3"],
        tests: MAX_TESTS,
    },
    Sample {
        name: "correct_max",
        description: "maximum of three numbers",
        params: &["a", "b", "c"],
        listing: "\
fn correct_max(a: i64, b: i64, c: i64) -> i64 {
    let mut max_val = a;
    if b > max_val {
        max_val = b;
    }
    if c > max_val {
        max_val = c;
    }
    max_val
}",
        program: correct_max,
        default_args: &["1", "2", "3"],
        tests: MAX_TESTS,
    },
    Sample {
        name: "loop_sum",
        description: "sum of 0..n",
        params: &["n"],
        listing: "\
fn loop_sum(n: i64) -> i64 {
    let mut result = 0;
    for i in 0..n {
        result += i;
    }
    result
}",
        program: loop_sum,
        default_args: &["5"],
        tests: &[
            SampleTest { inputs: &["0"], expected: "0" },
            SampleTest { inputs: &["3"], expected: "3" },
            SampleTest { inputs: &["5"], expected: "10" },
        ],
    },
    Sample {
        name: "factorial_buggy",
        description: "factorial; returns 0 instead of 1 for n = 0",
        params: &["n"],
        listing: "\
fn factorial_buggy(n: i64) -> i64 {
    if n <= 0 {
        return 0; // should be 1
    }
    let mut result = 1;
    for i in 1..=n {
        result *= i;
    }
    result
}",
        program: factorial_buggy,
        default_args: &["5"],
        tests: &[
            SampleTest { inputs: &["0"], expected: "1" },
            SampleTest { inputs: &["1"], expected: "1" },
            SampleTest { inputs: &["5"], expected: "120" },
            SampleTest { inputs: &["3"], expected: "6" },
            SampleTest { inputs: &["4"], expected: "24" },
        ],
    },
    Sample {
        name: "is_prime_buggy",
        description: "primality test; claims 1 is prime",
        params: &["n"],
        listing: "\
fn is_prime_buggy(n: i64) -> bool {
    if n <= 1 {
        return true; // should be false
    }
    let mut i = 2;
    while i * i <= n {
        if n % i == 0 {
            return false;
        }
        i += 1;
    }
    true
}",
        program: is_prime_buggy,
        default_args: &["9"],
        tests: &[
            SampleTest { inputs: &["1"], expected: "false" },
            SampleTest { inputs: &["2"], expected: "true" },
            SampleTest { inputs: &["3"], expected: "true" },
            SampleTest { inputs: &["4"], expected: "false" },
            SampleTest { inputs: &["5"], expected: "true" },
            SampleTest { inputs: &["9"], expected: "false" },
            SampleTest { inputs: &["11"], expected: "true" },
        ],
    },
    Sample {
        name: "fibonacci_buggy",
        description: "recursive Fibonacci; wrong base case for n = 1",
        params: &["n"],
        listing: "\
fn fibonacci_buggy(n: i64) -> i64 {
    if n <= 0 {
        return 0;
    }
    if n == 1 {
        return 0; // should be 1
    }
    fibonacci_buggy(n - 1) + fibonacci_buggy(n - 2)
}",
        program: fibonacci_buggy,
        default_args: &["4"],
        tests: &[
            SampleTest { inputs: &["0"], expected: "0" },
            SampleTest { inputs: &["1"], expected: "1" },
            SampleTest { inputs: &["2"], expected: "1" },
            SampleTest { inputs: &["4"], expected: "3" },
        ],
    },
    Sample {
        name: "divide",
        description: "division without a zero check",
        params: &["a", "b"],
        listing: "\
fn divide(a: f64, b: f64) -> f64 {
    let quotient = a / b; // raises on a zero divisor
    quotient
}",
        program: divide,
        default_args: &["7", "2"],
        tests: &[
            SampleTest { inputs: &["6", "3"], expected: "2" },
            SampleTest { inputs: &["5", "2"], expected: "2.5" },
            SampleTest { inputs: &["1", "0"], expected: "inf" },
        ],
    },
    Sample {
        name: "dataflow",
        description: "straight-line data flow for slicing",
        params: &["x", "y"],
        listing: "\
fn dataflow(x: i64, y: i64) -> i64 {
    let a = x + 1;
    let b = y * 2;
    let c = a + b;
    let d = c * 2;
    d
}",
        program: dataflow,
        default_args: &["5", "10"],
        tests: &[],
    },
];

fn overflow() -> TargetError {
    TargetError::raised("OverflowError", "integer overflow")
}

fn returned_int(value: &Value) -> Result<i64, TargetError> {
    value.as_i64().ok_or_else(|| {
        TargetError::raised("TypeError", format!("expected int, got {}", value.type_name()))
    })
}

fn buggy_max(hook: &mut dyn StepHook, args: &[Value]) -> Result<Value, TargetError> {
    let (a, b, c) = (int_arg(args, 0)?, int_arg(args, 1)?, int_arg(args, 2)?);
    let mut frame = Frame::enter(hook, "buggy_max", "buggy_max", 1, locals! { a, b, c });

    let mut max_val = a;
    frame.line(2, locals! { a, b, c, max_val });
    frame.line(3, locals! { a, b, c, max_val });
    if b > max_val {
        max_val = b;
        frame.line(4, locals! { a, b, c, max_val });
    }
    frame.line(6, locals! { a, b, c, max_val });
    if c > max_val {
        max_val = b;
        frame.line(7, locals! { a, b, c, max_val });
    }
    frame.ret(9, locals! { a, b, c, max_val });
    Ok(Value::Int(max_val))
}

fn correct_max(hook: &mut dyn StepHook, args: &[Value]) -> Result<Value, TargetError> {
    let (a, b, c) = (int_arg(args, 0)?, int_arg(args, 1)?, int_arg(args, 2)?);
    let mut frame = Frame::enter(hook, "correct_max", "correct_max", 1, locals! { a, b, c });

    let mut max_val = a;
    frame.line(2, locals! { a, b, c, max_val });
    frame.line(3, locals! { a, b, c, max_val });
    if b > max_val {
        max_val = b;
        frame.line(4, locals! { a, b, c, max_val });
    }
    frame.line(6, locals! { a, b, c, max_val });
    if c > max_val {
        max_val = c;
        frame.line(7, locals! { a, b, c, max_val });
    }
    frame.ret(9, locals! { a, b, c, max_val });
    Ok(Value::Int(max_val))
}

fn loop_sum(hook: &mut dyn StepHook, args: &[Value]) -> Result<Value, TargetError> {
    let n = int_arg(args, 0)?;
    let mut frame = Frame::enter(hook, "loop_sum", "loop_sum", 1, locals! { n });

    let mut result = 0i64;
    frame.line(2, locals! { n, result });
    for i in 0..n {
        frame.line(3, locals! { n, result, i });
        result += i;
        frame.line(4, locals! { n, result, i });
    }
    frame.ret(6, locals! { n, result });
    Ok(Value::Int(result))
}

fn factorial_buggy(hook: &mut dyn StepHook, args: &[Value]) -> Result<Value, TargetError> {
    let n = int_arg(args, 0)?;
    let mut frame = Frame::enter(hook, "factorial_buggy", "factorial_buggy", 1, locals! { n });

    frame.line(2, locals! { n });
    if n <= 0 {
        frame.ret(3, locals! { n });
        return Ok(Value::Int(0));
    }
    let mut result = 1i64;
    frame.line(5, locals! { n, result });
    for i in 1..=n {
        frame.line(6, locals! { n, result, i });
        result = result.saturating_mul(i);
        frame.line(7, locals! { n, result, i });
    }
    frame.ret(9, locals! { n, result });
    Ok(Value::Int(result))
}

fn is_prime_buggy(hook: &mut dyn StepHook, args: &[Value]) -> Result<Value, TargetError> {
    let n = int_arg(args, 0)?;
    let mut frame = Frame::enter(hook, "is_prime_buggy", "is_prime_buggy", 1, locals! { n });

    frame.line(2, locals! { n });
    if n <= 1 {
        frame.ret(3, locals! { n });
        return Ok(Value::Bool(true));
    }
    let mut i = 2i64;
    frame.line(5, locals! { n, i });
    loop {
        frame.line(6, locals! { n, i });
        if i.saturating_mul(i) > n {
            break;
        }
        frame.line(7, locals! { n, i });
        if n % i == 0 {
            frame.ret(8, locals! { n, i });
            return Ok(Value::Bool(false));
        }
        i += 1;
        frame.line(10, locals! { n, i });
    }
    frame.ret(12, locals! { n, i });
    Ok(Value::Bool(true))
}

fn fibonacci_buggy(hook: &mut dyn StepHook, args: &[Value]) -> Result<Value, TargetError> {
    let n = int_arg(args, 0)?;
    let mut frame = Frame::enter(hook, "fibonacci_buggy", "fibonacci_buggy", 1, locals! { n });

    frame.line(2, locals! { n });
    if n <= 0 {
        frame.ret(3, locals! { n });
        return Ok(Value::Int(0));
    }
    frame.line(5, locals! { n });
    if n == 1 {
        frame.ret(6, locals! { n });
        return Ok(Value::Int(0));
    }
    let first = returned_int(&fibonacci_buggy(frame.hook(), &[Value::Int(n - 1)])?)?;
    let second = returned_int(&fibonacci_buggy(frame.hook(), &[Value::Int(n - 2)])?)?;
    frame.ret(8, locals! { n });
    Ok(Value::Int(first + second))
}

fn divide(hook: &mut dyn StepHook, args: &[Value]) -> Result<Value, TargetError> {
    let (a, b) = (float_arg(args, 0)?, float_arg(args, 1)?);
    let mut frame = Frame::enter(hook, "divide", "divide", 1, locals! { a, b });

    if b == 0.0 {
        let err = TargetError::raised("ZeroDivisionError", "float division by zero");
        return Err(frame.raise(2, locals! { a, b }, err));
    }
    let quotient = a / b;
    frame.line(2, locals! { a, b, quotient });
    frame.ret(3, locals! { a, b, quotient });
    Ok(Value::Float(quotient))
}

fn dataflow(hook: &mut dyn StepHook, args: &[Value]) -> Result<Value, TargetError> {
    let (x, y) = (int_arg(args, 0)?, int_arg(args, 1)?);
    let mut frame = Frame::enter(hook, "dataflow", "dataflow", 1, locals! { x, y });

    let Some(a) = x.checked_add(1) else {
        return Err(frame.raise(2, locals! { x, y }, overflow()));
    };
    frame.line(2, locals! { x, y, a });
    let Some(b) = y.checked_mul(2) else {
        return Err(frame.raise(3, locals! { x, y, a }, overflow()));
    };
    frame.line(3, locals! { x, y, a, b });
    let Some(c) = a.checked_add(b) else {
        return Err(frame.raise(4, locals! { x, y, a, b }, overflow()));
    };
    frame.line(4, locals! { x, y, a, b, c });
    let Some(d) = c.checked_mul(2) else {
        return Err(frame.raise(5, locals! { x, y, a, b, c }, overflow()));
    };
    frame.line(5, locals! { x, y, a, b, c, d });
    frame.ret(6, locals! { x, y, a, b, c, d });
    Ok(Value::Int(d))
}
