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

//! # Token-ring solver

use std::sync::Arc;

use log::debug;

use crate::cost::CostValue;
use crate::rng::Prng;
use crate::runners::Runnable;
use crate::state::StateManager;
use crate::{Error, Stopper};

use super::SolverOutcome;

/// Round-robin composition of runners: each runner starts from the state the previous one ended
/// on, and the search halts once a configurable number of full cycles produces no improvement
/// of the overall best state.
pub struct TokenRingSolver<I, S, SM, CF: CostValue> {
    sm: Arc<SM>,
    runners: Vec<Box<dyn Runnable<I, S, CF>>>,
    max_idle_rounds: u64,
    rng: Prng,
}

impl<I, S, SM, CF> TokenRingSolver<I, S, SM, CF>
where
    S: Clone,
    SM: StateManager<I, S, CF>,
    CF: CostValue,
{
    /// Create a token-ring solver without any runner attached.
    pub fn new(sm: Arc<SM>) -> Self {
        Self { sm, runners: Vec::new(), max_idle_rounds: 10, rng: Prng::new() }
    }

    /// Attach the next runner of the ring.
    pub fn add_runner(mut self, runner: Box<dyn Runnable<I, S, CF>>) -> Self {
        self.runners.push(runner);
        self
    }

    /// The number of consecutive full cycles without improvement after which the search halts.
    pub fn with_max_idle_rounds(mut self, max_idle_rounds: u64) -> Self {
        self.max_idle_rounds = max_idle_rounds;
        self
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
        if self.runners.is_empty() {
            return Err(Error::ObjectNotFound(
                "no runner attached to the token-ring solver".to_string(),
            ));
        }
        let mut best_cost = self.sm.cost_function(input, &init);
        let mut best_state = init.clone();
        let mut chain = init;
        let mut idle_rounds = 0;
        let mut rounds = 0;

        'search: while idle_rounds < self.max_idle_rounds && !stop.is_stop() {
            let mut improvement_found = false;
            for runner in self.runners.iter_mut() {
                let outcome = runner.run_from(input, chain.clone(), stop.clone())?;
                debug!(
                    "Token ring: runner {} finished with cost {} (best so far {})",
                    runner.name(),
                    outcome.best_cost,
                    best_cost
                );
                if outcome.best_cost.improves(&best_cost) {
                    best_cost = outcome.best_cost.clone();
                    best_state = outcome.best_state.clone();
                    improvement_found = true;
                }
                chain = outcome.best_state;
                if self.sm.lower_bound_reached(&best_cost) {
                    rounds += 1;
                    break 'search;
                }
            }
            rounds += 1;
            if self.runners.len() == 1 {
                // a single runner converges in one pass
                break;
            }
            if improvement_found {
                idle_rounds = 0;
            } else {
                idle_rounds += 1;
            }
        }

        Ok(SolverOutcome { best_state, best_cost, rounds })
    }
}
