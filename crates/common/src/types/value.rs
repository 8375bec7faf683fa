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

//! Captured variable values.
//!
//! A [`Value`] is an owned copy of a local variable taken at the moment a step is observed.
//! Later mutation of the observed program never reaches a recorded value.

use std::{convert::Infallible, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// A value snapshot captured from an observed program.
///
/// The variant set is closed on purpose: it covers everything the analyses compare, and
/// anything else is kept as its textual rendering in [`Value::Opaque`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Signed integer
    Int(i64),
    /// Unsigned integer
    UInt(u64),
    /// Floating point number
    Float(f64),
    /// Boolean
    Bool(bool),
    /// Text
    Text(String),
    /// Textual fallback for values without a direct representation
    Opaque(String),
}

impl Value {
    /// Capture any debuggable value through its `Debug` rendering.
    pub fn opaque(value: &impl fmt::Debug) -> Self {
        Self::Opaque(format!("{value:?}"))
    }

    /// Returns the value as a signed integer, if it is an integer that fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::UInt(n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }

    /// Returns the value as an unsigned integer, if it is a non-negative integer.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Int(n) => u64::try_from(*n).ok(),
            Self::UInt(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the value as a float, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::UInt(n) => Some(*n as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the boolean payload.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the text payload of a [`Value::Text`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::UInt(_) => "uint",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Text(_) => "text",
            Self::Opaque(_) => "opaque",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::UInt(a), Self::UInt(b)) => a == b,
            (Self::Int(a), Self::UInt(b)) | (Self::UInt(b), Self::Int(a)) => {
                i128::from(*a) == i128::from(*b)
            }
            // Bit equality keeps a NaN snapshot equal to itself.
            (Self::Float(a), Self::Float(b)) => a == b || a.to_bits() == b.to_bits(),
            (Self::Float(f), Self::Int(n)) | (Self::Int(n), Self::Float(f)) => *f == *n as f64,
            (Self::Float(f), Self::UInt(n)) | (Self::UInt(n), Self::Float(f)) => *f == *n as f64,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Opaque(a), Self::Opaque(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::UInt(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Text(s) => write!(f, "\"{}\"", s.replace('"', "\\\"")),
            Self::Opaque(s) => f.write_str(s),
        }
    }
}

impl FromStr for Value {
    type Err = Infallible;

    /// Parses a command-line literal. Anything that is not a number or a boolean is text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(n) = s.parse::<i64>() {
            return Ok(Self::Int(n));
        }
        if let Ok(n) = s.parse::<u64>() {
            return Ok(Self::UInt(n));
        }
        if let Ok(x) = s.parse::<f64>() {
            return Ok(Self::Float(x));
        }
        match s {
            "true" => Ok(Self::Bool(true)),
            "false" => Ok(Self::Bool(false)),
            _ => Ok(Self::Text(s.to_string())),
        }
    }
}

/// Conversion of an observed binding into a [`Value`] snapshot.
///
/// Implementations copy; they never hold on to the original.
pub trait Capture {
    /// Take a snapshot of `self`.
    fn capture(&self) -> Value;
}

macro_rules! capture_as {
    ($variant:ident($target:ty): $($ty:ty),+) => {
        $(
            impl Capture for $ty {
                fn capture(&self) -> Value {
                    Value::$variant(*self as $target)
                }
            }

            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::$variant(value as $target)
                }
            }
        )+
    };
}

capture_as!(Int(i64): i8, i16, i32, i64, isize);
capture_as!(UInt(u64): u8, u16, u32, u64, usize);
capture_as!(Float(f64): f32, f64);

impl Capture for bool {
    fn capture(&self) -> Value {
        Value::Bool(*self)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl Capture for char {
    fn capture(&self) -> Value {
        Value::Text(self.to_string())
    }
}

impl Capture for str {
    fn capture(&self) -> Value {
        Value::Text(self.to_string())
    }
}

impl Capture for String {
    fn capture(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl Capture for Value {
    fn capture(&self) -> Value {
        self.clone()
    }
}

impl<T: Capture + ?Sized> Capture for &T {
    fn capture(&self) -> Value {
        (**self).capture()
    }
}

impl<T: Capture> Capture for Option<T> {
    fn capture(&self) -> Value {
        match self {
            Some(inner) => inner.capture(),
            None => Value::Opaque("None".to_string()),
        }
    }
}

impl<T: fmt::Debug> Capture for [T] {
    fn capture(&self) -> Value {
        Value::opaque(&self)
    }
}

impl<T: fmt::Debug> Capture for Vec<T> {
    fn capture(&self) -> Value {
        Value::opaque(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_equality_across_variants() {
        assert_eq!(Value::Int(3), Value::UInt(3));
        assert_eq!(Value::Int(1), Value::Float(1.0));
        assert_ne!(Value::Int(-1), Value::UInt(u64::MAX));
        assert_ne!(Value::Int(1), Value::Bool(true));
    }

    #[test]
    fn test_nan_snapshot_equals_itself() {
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
    }

    #[test]
    fn test_text_and_opaque_are_distinct() {
        assert_ne!(Value::Text("x".into()), Value::Opaque("x".into()));
    }

    #[test]
    fn test_parse_literals() {
        assert_eq!("42".parse::<Value>().unwrap(), Value::Int(42));
        assert_eq!("-7".parse::<Value>().unwrap(), Value::Int(-7));
        assert!(matches!("2.5".parse::<Value>().unwrap(), Value::Float(x) if x == 2.5));
        assert_eq!("true".parse::<Value>().unwrap(), Value::Bool(true));
        assert_eq!("abc".parse::<Value>().unwrap(), Value::Text("abc".into()));
    }

    #[test]
    fn test_capture_falls_back_to_debug_text() {
        let v = vec![1, 2, 3];
        assert_eq!(v.capture(), Value::Opaque("[1, 2, 3]".into()));
        assert_eq!(Option::<i32>::None.capture(), Value::Opaque("None".into()));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Float(1.0).to_string(), "1.0");
        assert_eq!(Value::Text("hi".into()).to_string(), "\"hi\"");
        assert_eq!(Value::Int(-4).to_string(), "-4");
    }
}
