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

//! Errors raised by observed targets.

use std::any::Any;

use thiserror::Error;

/// Error raised by a traced target.
///
/// The recorder hands it back to its caller untouched once the session has been torn down;
/// the fault localizer records it as the failing test's actual output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    /// The target signalled an error of its own
    #[error("{kind}: {message}")]
    Raised {
        /// Error category, e.g. `ZeroDivisionError`
        kind: String,
        /// Human-readable description
        message: String,
    },

    /// A positional argument was missing or had the wrong type
    #[error("argument {index}: expected {expected}")]
    Argument {
        /// Zero-based argument position
        index: usize,
        /// Description of the expected value
        expected: String,
    },

    /// The target panicked
    #[error("panicked: {0}")]
    Panicked(String),
}

impl TargetError {
    /// Create a [`TargetError::Raised`]
    pub fn raised(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Raised { kind: kind.into(), message: message.into() }
    }

    /// Create a [`TargetError::Argument`]
    pub fn argument(index: usize, expected: impl Into<String>) -> Self {
        Self::Argument { index, expected: expected.into() }
    }

    /// Build a [`TargetError::Panicked`] from a panic payload.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self::Panicked(message)
    }
}
