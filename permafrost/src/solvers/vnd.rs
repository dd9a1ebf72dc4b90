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

//! # Variable-neighborhood descent

use std::sync::Arc;

use log::debug;

use crate::kickers::Kicker;
use crate::neighborhoods::NeighborhoodExplorer;
use crate::rng::Prng;
use crate::state::StateManager;
use crate::{Error, Stopper};

use super::SolverOutcome;

/// Variable-neighborhood descent over a kicker: apply the first improving kick of the current
/// step length, reset the step to 1 on improvement, increase it otherwise; halt when the step
/// exceeds the maximum or the lower bound is reached.
pub struct VariableNeighborhoodDescent<I, S, SM, NE>
where
    S: Clone,
    NE: NeighborhoodExplorer<I, S>,
{
    sm: Arc<SM>,
    kicker: Kicker<I, S, NE>,
    max_step: usize,
    rng: Prng,
}

impl<I, S, SM, NE> VariableNeighborhoodDescent<I, S, SM, NE>
where
    S: Clone,
    SM: StateManager<I, S, NE::CF>,
    NE: NeighborhoodExplorer<I, S>,
{
    /// Create the solver from a state manager, the kicker to drive and the maximum step length.
    pub fn new(sm: Arc<SM>, kicker: Kicker<I, S, NE>, max_step: usize) -> Self {
        Self { sm, kicker, max_step, rng: Prng::new() }
    }

    /// Replace the random source used to draw the initial state.
    pub fn with_rng(mut self, rng: Prng) -> Self {
        self.rng = rng;
        self
    }

    /// Solve from a fresh random initial state.
    pub fn solve(
        &mut self,
        input: &I,
        stop: Stopper,
    ) -> Result<SolverOutcome<S, NE::CF>, Error> {
        let init = self.sm.random_state(input, &mut self.rng);
        self.solve_from(input, init, stop)
    }

    /// Solve starting from the given state.
    pub fn solve_from(
        &mut self,
        input: &I,
        init: S,
        stop: Stopper,
    ) -> Result<SolverOutcome<S, NE::CF>, Error> {
        let mut state = init;
        let mut cost = self.sm.cost_function(input, &state);
        let mut step = 1;
        let mut rounds = 0;

        while step <= self.max_step && !self.sm.lower_bound_reached(&cost) && !stop.is_stop() {
            match self.kicker.select_first_improving(input, step, &state) {
                Some((kick, kick_cost)) => {
                    self.kicker.make_kick(&mut state, &kick);
                    cost += &kick_cost;
                    rounds += 1;
                    debug!("VND: performed kick of length {} with cost {}", step, kick_cost);
                    step = 1;
                }
                None => {
                    debug!("VND: no improving kick of length {}", step);
                    step += 1;
                }
            }
        }

        Ok(SolverOutcome { best_state: state, best_cost: cost, rounds })
    }
}
