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

//! DAX Engine - trace recording and dynamic analyses
//!
//! The engine observes instrumented computations and analyses what it saw:
//!
//! - [`Recorder`] captures a [`Trace`](dax_common::types::Trace) of step events from a
//!   [`Target`], with inferred variable accesses.
//! - [`ExecutionIndexer`] gives each event a calling-context-aware execution point.
//! - [`DynamicSlicer`] computes backward dynamic slices over a trace.
//! - [`FaultLocalizer`] ranks statements by Tarantula and Ochiai suspiciousness.

pub mod config;
pub use config::*;

pub mod error;
pub use error::*;

pub mod indexer;
pub use indexer::*;

pub mod localizer;
pub use localizer::*;

pub mod recorder;
pub use recorder::*;

pub mod slicer;
pub use slicer::*;
