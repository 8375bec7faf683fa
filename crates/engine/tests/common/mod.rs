//! Instrumented functions shared by the integration tests.
#![allow(dead_code)]

use dax_common::{locals, types::Value};
use dax_engine::{int_arg, Frame, StepHook, TargetError};

pub const UNIT: &str = "tests::programs";

/// ```text
/// 1 def buggy_max(a, b, c):
/// 2     max_val = a
/// 3     if b > max_val:
/// 4         max_val = b
/// 5     if c > max_val:
/// 6         max_val = b   # should be c
/// 7     return max_val
/// ```
pub fn buggy_max(hook: &mut dyn StepHook, args: &[Value]) -> Result<Value, TargetError> {
    let (a, b, c) = (int_arg(args, 0)?, int_arg(args, 1)?, int_arg(args, 2)?);
    let mut frame = Frame::enter(hook, UNIT, "buggy_max", 1, locals! { a, b, c });

    let mut max_val = a;
    frame.line(2, locals! { a, b, c, max_val });
    frame.line(3, locals! { a, b, c, max_val });
    if b > max_val {
        max_val = b;
        frame.line(4, locals! { a, b, c, max_val });
    }
    frame.line(5, locals! { a, b, c, max_val });
    if c > max_val {
        max_val = b;
        frame.line(6, locals! { a, b, c, max_val });
    }
    frame.ret(7, locals! { a, b, c, max_val });
    Ok(Value::Int(max_val))
}

/// ```text
/// 1 def dataflow(x, y):
/// 2     a = x + 1
/// 3     b = y * 2
/// 4     c = a + b
/// 5     d = c * 2
/// 6     return d
/// ```
pub fn dataflow(hook: &mut dyn StepHook, args: &[Value]) -> Result<Value, TargetError> {
    let (x, y) = (int_arg(args, 0)?, int_arg(args, 1)?);
    let mut frame = Frame::enter(hook, UNIT, "dataflow", 1, locals! { x, y });

    let a = x + 1;
    frame.line(2, locals! { x, y, a });
    let b = y * 2;
    frame.line(3, locals! { x, y, a, b });
    let c = a + b;
    frame.line(4, locals! { x, y, a, b, c });
    let d = c * 2;
    frame.line(5, locals! { x, y, a, b, c, d });
    frame.ret(6, locals! { x, y, a, b, c, d });
    Ok(Value::Int(d))
}

/// ```text
/// 1 def factorial(n):
/// 2     if n <= 1:
/// 3         return 1
/// 4     return n * factorial(n - 1)
/// ```
pub fn factorial(hook: &mut dyn StepHook, args: &[Value]) -> Result<Value, TargetError> {
    let n = int_arg(args, 0)?;
    let mut frame = Frame::enter(hook, UNIT, "factorial", 1, locals! { n });

    frame.line(2, locals! { n });
    if n <= 1 {
        frame.ret(3, locals! { n });
        return Ok(Value::Int(1));
    }
    let rest = factorial(frame.hook(), &[Value::Int(n - 1)])?;
    let result = n * int_arg(&[rest], 0)?;
    frame.ret(4, locals! { n });
    Ok(Value::Int(result))
}

/// ```text
/// 1 def divide(a, b):
/// 2     if b == 0:
/// 3         raise ZeroDivisionError("division by zero")
/// 4     return a / b
/// ```
pub fn divide(hook: &mut dyn StepHook, args: &[Value]) -> Result<Value, TargetError> {
    let (a, b) = (int_arg(args, 0)?, int_arg(args, 1)?);
    let mut frame = Frame::enter(hook, UNIT, "divide", 1, locals! { a, b });

    frame.line(2, locals! { a, b });
    if b == 0 {
        let err = TargetError::raised("ZeroDivisionError", "division by zero");
        return Err(frame.raise(3, locals! { a, b }, err));
    }
    frame.ret(4, locals! { a, b });
    Ok(Value::Float(a as f64 / b as f64))
}

/// ```text
/// 1 def average(total, count):
/// 2     share = divide(total, count)
/// 3     return share
/// ```
pub fn average(hook: &mut dyn StepHook, args: &[Value]) -> Result<Value, TargetError> {
    let (total, count) = (int_arg(args, 0)?, int_arg(args, 1)?);
    let mut frame = Frame::enter(hook, UNIT, "average", 1, locals! { total, count });

    let share = divide(frame.hook(), args)?;
    frame.line(2, locals! { total, count, share });
    frame.ret(3, locals! { total, count, share });
    Ok(share)
}
