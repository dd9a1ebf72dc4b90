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

//! # Hill climbing

use crate::cost::CostValue;
use crate::neighborhoods::{EvaluatedMove, NeighborhoodExplorer};
use crate::state::StateManager;
use crate::Error;

use super::{Iteration, Metaheuristic, RunState};

/// The hill-climbing strategy: draw random neighbors and perform any move that improves or
/// leaves the cost unchanged. The run stops after `max_idle_iterations` iterations without a
/// strict improvement of the best state.
#[derive(Debug)]
pub struct HillClimbing {
    max_idle_iterations: Option<u64>,
    samples: u64,
}

impl HillClimbing {
    /// Create the strategy with its parameters unset (`samples` defaults to 10).
    pub fn new() -> Self {
        Self { max_idle_iterations: None, samples: 10 }
    }

    /// The number of idle iterations after which the run stops. Required.
    pub fn with_max_idle_iterations(mut self, max_idle_iterations: u64) -> Self {
        self.max_idle_iterations = Some(max_idle_iterations);
        self
    }

    /// The number of random neighbors drawn at each iteration.
    pub fn with_samples(mut self, samples: u64) -> Self {
        self.samples = samples;
        self
    }

    pub(crate) fn samples_or_default(&self) -> u64 {
        self.samples
    }

    pub(crate) fn validate(&self, owner: &'static str) -> Result<(u64, u64), Error> {
        let max_idle = self.max_idle_iterations.ok_or_else(|| Error::ParameterNotSet {
            owner: owner.to_string(),
            parameter: "max_idle_iterations",
        })?;
        if self.samples == 0 {
            return Err(Error::IncorrectParameterValue {
                parameter: "samples",
                reason: "at least one neighbor must be drawn per iteration".to_string(),
            });
        }
        Ok((max_idle, self.samples))
    }
}

impl Default for HillClimbing {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, S, SM, NE> Metaheuristic<I, S, SM, NE> for HillClimbing
where
    S: Clone,
    SM: StateManager<I, S, NE::CF>,
    NE: NeighborhoodExplorer<I, S>,
{
    fn name(&self) -> &'static str {
        "hill climbing"
    }

    fn initialize(&mut self, _ctx: &mut Iteration<I, S, SM, NE>) -> Result<(), Error> {
        self.validate("hill climbing").map(|_| ())
    }

    fn select_move(
        &mut self,
        ctx: &mut Iteration<I, S, SM, NE>,
    ) -> Option<EvaluatedMove<NE::Move, NE::CF>> {
        let mut explored = 0;
        let selected = ctx.ne.random_first(
            ctx.input,
            &ctx.run.current_state,
            self.samples,
            &mut explored,
            ctx.weights,
            ctx.rng,
            |_, cost, _| cost.total <= <NE::CF>::ZERO,
        );
        ctx.run.evaluations += explored;
        selected
    }

    fn stop_criterion(&self, run: &RunState<S, NE::CF>) -> bool {
        self.max_idle_iterations.map_or(false, |max| run.idle_iterations() >= max)
    }
}
