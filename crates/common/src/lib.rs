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

// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
// SPDX-License-Identifier: AGPL-3.0
//! DAX Common - Shared functionality for DAX components
//!
//! This crate provides the data model shared by the engine and the command-line
//! driver: captured values, step events and traces, plus logging setup.

/// Common types used throughout DAX including values, step events and traces
pub mod types;

/// Logging setup and utilities for consistent logging across DAX components
pub mod logging;

/// Scope capture macros for instrumented code
pub mod macros;

pub use logging::*;
pub use types::*;
