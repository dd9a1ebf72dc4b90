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

//! # Late-acceptance hill climbing

use crate::cost::{CostStructure, CostValue};
use crate::neighborhoods::{EvaluatedMove, NeighborhoodExplorer};
use crate::state::StateManager;
use crate::Error;

use super::{HillClimbing, Iteration, Metaheuristic, RunState};

/// The late-acceptance hill-climbing strategy: like hill climbing, but a worsening move is also
/// accepted if it does not worsen the cost recorded `steps` iterations ago. The history is a
/// cyclic buffer, initialized with the initial state cost, into which the best cost is written
/// back after each iteration.
#[derive(Debug)]
pub struct LateAcceptanceHillClimbing<CF: CostValue> {
    climbing: HillClimbing,
    steps: usize,
    history: Vec<CostStructure<CF>>,
}

impl<CF: CostValue> LateAcceptanceHillClimbing<CF> {
    /// Create the strategy with its parameters unset (`steps` defaults to 10).
    pub fn new() -> Self {
        Self { climbing: HillClimbing::new(), steps: 10, history: Vec::new() }
    }

    /// The length of the cost history (the acceptance delay).
    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    /// The number of idle iterations after which the run stops. Required.
    pub fn with_max_idle_iterations(mut self, max_idle_iterations: u64) -> Self {
        self.climbing = self.climbing.with_max_idle_iterations(max_idle_iterations);
        self
    }

    /// The number of random neighbors drawn at each iteration.
    pub fn with_samples(mut self, samples: u64) -> Self {
        self.climbing = self.climbing.with_samples(samples);
        self
    }
}

impl<CF: CostValue> Default for LateAcceptanceHillClimbing<CF> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, S, SM, NE> Metaheuristic<I, S, SM, NE> for LateAcceptanceHillClimbing<NE::CF>
where
    S: Clone,
    SM: StateManager<I, S, NE::CF>,
    NE: NeighborhoodExplorer<I, S>,
{
    fn name(&self) -> &'static str {
        "late acceptance hill climbing"
    }

    fn initialize(&mut self, ctx: &mut Iteration<I, S, SM, NE>) -> Result<(), Error> {
        self.climbing.validate("late acceptance hill climbing")?;
        if self.steps == 0 {
            return Err(Error::IncorrectParameterValue {
                parameter: "steps",
                reason: "the history must hold at least one step".to_string(),
            });
        }
        // the history starts out filled with the initial state cost
        self.history = vec![ctx.run.current_cost.clone(); self.steps];
        Ok(())
    }

    fn select_move(
        &mut self,
        ctx: &mut Iteration<I, S, SM, NE>,
    ) -> Option<EvaluatedMove<NE::Move, NE::CF>> {
        let slot = (ctx.run.iteration as usize) % self.steps;
        let prev_step_delta = self.history[slot].clone() - ctx.run.current_cost.clone();
        let samples = self.climbing.samples_or_default();
        let mut explored = 0;
        let selected = ctx.ne.random_first(
            ctx.input,
            &ctx.run.current_state,
            samples,
            &mut explored,
            ctx.weights,
            ctx.rng,
            |_, cost, _| cost.total <= <NE::CF>::ZERO || *cost <= prev_step_delta,
        );
        ctx.run.evaluations += explored;
        selected
    }

    fn stop_criterion(&self, run: &RunState<S, NE::CF>) -> bool {
        <HillClimbing as Metaheuristic<I, S, SM, NE>>::stop_criterion(&self.climbing, run)
    }

    fn complete_iteration(&mut self, ctx: &mut Iteration<I, S, SM, NE>) {
        let slot = (ctx.run.iteration as usize) % self.steps;
        self.history[slot] = ctx.run.best_cost.clone();
    }
}
