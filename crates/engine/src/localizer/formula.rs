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

//! Spectrum-based suspiciousness formulas.
//!
//! Both formulas take the coverage counts of a single statement: how many failing tests
//! covered it (`f`), how many passing tests covered it (`p`) and the suite totals `F` and `P`.

/// Tarantula: `(f/F) / ((f/F) + (p/P))`.
///
/// A suite without passing tests contributes `p/P = 0`. Returns 0 when there are no failing
/// tests or the statement was covered by none.
pub fn tarantula(
    failed_covering: usize,
    total_failed: usize,
    passed_covering: usize,
    total_passed: usize,
) -> f64 {
    if total_failed == 0 {
        return 0.0;
    }
    let fail_ratio = failed_covering as f64 / total_failed as f64;
    let pass_ratio =
        if total_passed == 0 { 0.0 } else { passed_covering as f64 / total_passed as f64 };

    let denominator = fail_ratio + pass_ratio;
    if denominator == 0.0 {
        0.0
    } else {
        fail_ratio / denominator
    }
}

/// Ochiai: `f / sqrt(F * (f + p))`, or 0 when `f` or the denominator is 0.
pub fn ochiai(failed_covering: usize, total_failed: usize, passed_covering: usize) -> f64 {
    if failed_covering == 0 {
        return 0.0;
    }
    let denominator = (total_failed as f64 * (failed_covering + passed_covering) as f64).sqrt();
    if denominator == 0.0 {
        0.0
    } else {
        failed_covering as f64 / denominator
    }
}
