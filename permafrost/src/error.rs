// Permafrost: Local Search Metaheuristics for Combinatorial Optimization
// Copyright (C) 2021  Tibor Schneider
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! Module containing all error types
//!
//! Note that an empty neighborhood is *not* an error. Neighborhood explorers signal it by
//! returning `None` from `first_move` or `random_move`, and the selectors, composers and runners
//! consume that signal directly.

use thiserror::Error;

/// Main error type
#[derive(Debug, Error)]
pub enum Error {
    /// A runner or solver needs a configuration parameter which was never given a value.
    #[error("Parameter {parameter} of {owner} was not set!")]
    ParameterNotSet {
        /// Name of the runner or solver that misses the parameter
        owner: String,
        /// Name of the missing parameter
        parameter: &'static str,
    },
    /// A configuration parameter has a value outside of its legal range.
    #[error("Parameter {parameter} has an incorrect value: {reason}")]
    IncorrectParameterValue {
        /// Name of the offending parameter
        parameter: &'static str,
        /// Why the value is not legal
        reason: String,
    },
    /// A named helper was looked up during setup, but it does not exist.
    #[error("Object not found: {0}")]
    ObjectNotFound(String),
    /// An internal invariant was breached. This always indicates a bug.
    #[error("Logic error: {0}")]
    Logic(String),
}
