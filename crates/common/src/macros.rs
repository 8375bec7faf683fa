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

//! Scope capture macros for instrumented code.
//!
//! # Usage in Code
//!
//! ```ignore
//! use dax_common::locals;
//!
//! let a = 1;
//! let b = "two";
//! // Captures `a`, `b` and a computed binding named `sum`.
//! let scope = locals!(a, b, sum = a + 1);
//! ```

/// Build a [`Locals`](crate::types::Locals) snapshot from named bindings.
///
/// Each entry is either a variable name, captured under that name, or `name = expr`.
/// Values are copied through [`Capture`](crate::types::Capture).
#[macro_export]
macro_rules! locals {
    ($($name:ident $(= $value:expr)?),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut locals = $crate::types::Locals::new();
        $( $crate::__capture_local!(locals, $name $(, $value)?); )*
        locals
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __capture_local {
    ($locals:ident, $name:ident) => {
        $locals.insert(
            ::std::string::String::from(stringify!($name)),
            $crate::types::Capture::capture(&$name),
        );
    };
    ($locals:ident, $name:ident, $value:expr) => {
        $locals.insert(
            ::std::string::String::from(stringify!($name)),
            $crate::types::Capture::capture(&$value),
        );
    };
}
