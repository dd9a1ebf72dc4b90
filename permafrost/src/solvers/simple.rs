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

//! # Simple local search

use std::sync::Arc;

use log::info;

use crate::cost::CostValue;
use crate::rng::Prng;
use crate::runners::Runnable;
use crate::state::StateManager;
use crate::{Error, Stopper};

use super::SolverOutcome;

/// The simplest solver: run a single runner to convergence and return its best state.
pub struct SimpleLocalSearch<I, S, SM, CF: CostValue> {
    sm: Arc<SM>,
    runner: Box<dyn Runnable<I, S, CF>>,
    rng: Prng,
}

impl<I, S, SM, CF> SimpleLocalSearch<I, S, SM, CF>
where
    S: Clone,
    SM: StateManager<I, S, CF>,
    CF: CostValue,
{
    /// Create the solver from a state manager and the runner to drive.
    pub fn new(sm: Arc<SM>, runner: Box<dyn Runnable<I, S, CF>>) -> Self {
        Self { sm, runner, rng: Prng::new() }
    }

    /// Replace the random source used to draw the initial state.
    pub fn with_rng(mut self, rng: Prng) -> Self {
        self.rng = rng;
        self
    }

    /// Solve from a fresh random initial state.
    pub fn solve(&mut self, input: &I, stop: Stopper) -> Result<SolverOutcome<S, CF>, Error> {
        let init = self.sm.random_state(input, &mut self.rng);
        self.solve_from(input, init, stop)
    }

    /// Solve starting from the given state.
    pub fn solve_from(
        &mut self,
        input: &I,
        init: S,
        stop: Stopper,
    ) -> Result<SolverOutcome<S, CF>, Error> {
        let outcome = self.runner.run_from(input, init, stop)?;
        info!(
            "Solver: runner {} finished with best cost {}",
            self.runner.name(),
            outcome.best_cost
        );
        Ok(SolverOutcome {
            best_state: outcome.best_state,
            best_cost: outcome.best_cost,
            rounds: 1,
        })
    }
}
