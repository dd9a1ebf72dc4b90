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

//! # Great deluge

use crate::cost::CostValue;
use crate::neighborhoods::{EvaluatedMove, NeighborhoodExplorer};
use crate::state::StateManager;
use crate::Error;

use super::{Iteration, Metaheuristic, RunState};

/// Number of random candidates drawn at each iteration.
const SAMPLES: u64 = 10;

/// The great-deluge strategy: candidate moves are drawn at random; a move is accepted if it
/// improves the cost or if the resulting cost stays below the current water level. The level
/// starts at `initial_level` times the initial cost and is multiplied by `level_rate` every
/// `neighbors_sampled` iterations. The run stops once the level drops below `min_level` times
/// the best cost.
#[derive(Debug)]
pub struct GreatDeluge {
    initial_level: Option<f64>,
    min_level: Option<f64>,
    level_rate: Option<f64>,
    neighbors_sampled: Option<u64>,
    // the current water level
    level: f64,
}

impl GreatDeluge {
    /// Create the strategy with its parameters unset.
    pub fn new() -> Self {
        Self {
            initial_level: None,
            min_level: None,
            level_rate: None,
            neighbors_sampled: None,
            level: 0.0,
        }
    }

    /// The initial water level, as a multiple of the initial state cost. Required.
    pub fn with_initial_level(mut self, initial_level: f64) -> Self {
        self.initial_level = Some(initial_level);
        self
    }

    /// The minimum water level, as a multiple of the best state cost. Required.
    pub fn with_min_level(mut self, min_level: f64) -> Self {
        self.min_level = Some(min_level);
        self
    }

    /// The multiplicative level decrease rate, strictly between 0 and 1. Required.
    pub fn with_level_rate(mut self, level_rate: f64) -> Self {
        self.level_rate = Some(level_rate);
        self
    }

    /// The number of iterations between two level decreases. Required.
    pub fn with_neighbors_sampled(mut self, neighbors_sampled: u64) -> Self {
        self.neighbors_sampled = Some(neighbors_sampled);
        self
    }

    /// The current water level.
    pub fn level(&self) -> f64 {
        self.level
    }

    fn required(&self, owner: &'static str) -> Result<(f64, f64, f64, u64), Error> {
        let initial_level = self.initial_level.ok_or_else(|| Error::ParameterNotSet {
            owner: owner.to_string(),
            parameter: "initial_level",
        })?;
        let min_level = self.min_level.ok_or_else(|| Error::ParameterNotSet {
            owner: owner.to_string(),
            parameter: "min_level",
        })?;
        let level_rate = self.level_rate.ok_or_else(|| Error::ParameterNotSet {
            owner: owner.to_string(),
            parameter: "level_rate",
        })?;
        let neighbors_sampled = self.neighbors_sampled.ok_or_else(|| Error::ParameterNotSet {
            owner: owner.to_string(),
            parameter: "neighbors_sampled",
        })?;
        Ok((initial_level, min_level, level_rate, neighbors_sampled))
    }
}

impl Default for GreatDeluge {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, S, SM, NE> Metaheuristic<I, S, SM, NE> for GreatDeluge
where
    S: Clone,
    SM: StateManager<I, S, NE::CF>,
    NE: NeighborhoodExplorer<I, S>,
{
    fn name(&self) -> &'static str {
        "great deluge"
    }

    fn initialize(&mut self, ctx: &mut Iteration<I, S, SM, NE>) -> Result<(), Error> {
        let (initial_level, _, level_rate, neighbors_sampled) = self.required("great deluge")?;
        if !(0.0..1.0).contains(&level_rate) || level_rate == 0.0 {
            return Err(Error::IncorrectParameterValue {
                parameter: "level_rate",
                reason: "should be a value in the open interval (0, 1)".to_string(),
            });
        }
        if neighbors_sampled == 0 {
            return Err(Error::IncorrectParameterValue {
                parameter: "neighbors_sampled",
                reason: "the level must be updated after a positive number of iterations"
                    .to_string(),
            });
        }
        self.level = initial_level * ctx.run.current_cost.total.to_f64();
        Ok(())
    }

    fn select_move(
        &mut self,
        ctx: &mut Iteration<I, S, SM, NE>,
    ) -> Option<EvaluatedMove<NE::Move, NE::CF>> {
        let current = ctx.run.current_cost.total.to_f64();
        let level = self.level;
        let mut explored = 0;
        let selected = ctx.ne.random_first(
            ctx.input,
            &ctx.run.current_state,
            SAMPLES,
            &mut explored,
            ctx.weights,
            ctx.rng,
            |_, cost, _| cost.total < <NE::CF>::ZERO || cost.total.to_f64() <= level - current,
        );
        ctx.run.evaluations += explored;
        selected
    }

    fn stop_criterion(&self, run: &RunState<S, NE::CF>) -> bool {
        match self.min_level {
            Some(min_level) => self.level < min_level * run.best_cost.total.to_f64(),
            None => false,
        }
    }

    fn complete_iteration(&mut self, ctx: &mut Iteration<I, S, SM, NE>) {
        if let Some(neighbors_sampled) = self.neighbors_sampled {
            if ctx.run.iteration % neighbors_sampled == 0 {
                self.level *= self.level_rate.unwrap_or(1.0);
            }
        }
    }
}
