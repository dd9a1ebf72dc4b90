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

//! # Solvers
//!
//! A solver composes one or more runners (and possibly a kicker) into a full search. The
//! following solvers exist:
//!
//! - **[`SimpleLocalSearch`]**: run one runner to convergence and return its best state.
//!
//! - **[`TokenRingSolver`]**: run the attached runners round robin, each starting from the state
//!   the previous one ended on. The search halts once a full cycle over all runners produces no
//!   improvement (for a configurable number of rounds).
//!
//! - **[`VariableNeighborhoodDescent`]**: drive a kicker with increasing step length `1..=K`:
//!   apply the first improving kick at the current step, reset the step to 1 on improvement,
//!   increase it otherwise, and halt when the step exceeds `K` or the lower bound is reached.
//!
//! - **[`IteratedLocalSearch`]**: alternate runs of a runner with perturbations generated by a
//!   kicker (random, best, or repeated first-improving, see [`KickStrategy`]), halting after a
//!   configurable number of rounds without improvement.
//!
//! - **[`ComparativeSolver`]**: run several independently seeded runners in parallel threads
//!   over the shared read-only input and keep the best outcome.

use crate::cost::{CostStructure, CostValue};

mod simple;
pub use simple::SimpleLocalSearch;

mod token_ring;
pub use token_ring::TokenRingSolver;

mod vnd;
pub use vnd::VariableNeighborhoodDescent;

mod iterated;
pub use iterated::{IteratedLocalSearch, KickStrategy};

mod comparative;
pub use comparative::ComparativeSolver;

/// The result of a solver execution.
#[derive(Clone, Debug)]
pub struct SolverOutcome<S, CF: CostValue> {
    /// The best state found during the search.
    pub best_state: S,
    /// The cost of the best state.
    pub best_cost: CostStructure<CF>,
    /// The number of rounds (runner executions or applied kicks) the solver performed.
    pub rounds: u64,
}
