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

//! # Simulated annealing

use log::debug;

use crate::cost::CostValue;
use crate::neighborhoods::{EvaluatedMove, NeighborhoodExplorer};
use crate::state::StateManager;
use crate::Error;

use super::{Iteration, Metaheuristic, RunState};

/// Number of random deltas sampled when computing the start temperature.
const START_TEMPERATURE_SAMPLES: usize = 100;

/// The simulated-annealing strategy: candidate moves are drawn at random; improving moves are
/// always accepted, worsening ones with probability decreasing in the cost increase and in the
/// elapsed search time. The temperature is multiplied by `cooling_rate` whenever
/// `max_neighbors_sampled` candidates have been drawn or `max_neighbors_accepted` moves have
/// been accepted at the current temperature, whichever happens first.
///
/// Instead of providing `start_temperature`, the runner can be asked to compute it as the
/// variance of the deltas of a sample of random moves from the initial state.
#[derive(Debug)]
pub struct SimulatedAnnealing {
    compute_start_temperature: bool,
    start_temperature: Option<f64>,
    cooling_rate: Option<f64>,
    max_neighbors_sampled: Option<u64>,
    max_neighbors_accepted: Option<u64>,
    // state of the annealing schedule
    temperature: f64,
    neighbors_sampled: u64,
    neighbors_accepted: u64,
}

impl SimulatedAnnealing {
    /// Create the strategy with its parameters unset.
    pub fn new() -> Self {
        Self {
            compute_start_temperature: false,
            start_temperature: None,
            cooling_rate: None,
            max_neighbors_sampled: None,
            max_neighbors_accepted: None,
            temperature: 0.0,
            neighbors_sampled: 0,
            neighbors_accepted: 0,
        }
    }

    /// Compute the start temperature by sampling random move deltas instead of taking it from
    /// `start_temperature`.
    pub fn with_computed_start_temperature(mut self) -> Self {
        self.compute_start_temperature = true;
        self
    }

    /// The starting temperature. Required unless the start temperature is computed.
    pub fn with_start_temperature(mut self, start_temperature: f64) -> Self {
        self.start_temperature = Some(start_temperature);
        self
    }

    /// The multiplicative cooling rate, strictly between 0 and 1. Required.
    pub fn with_cooling_rate(mut self, cooling_rate: f64) -> Self {
        self.cooling_rate = Some(cooling_rate);
        self
    }

    /// The maximum number of candidates drawn at each temperature. Required.
    pub fn with_max_neighbors_sampled(mut self, max_neighbors_sampled: u64) -> Self {
        self.max_neighbors_sampled = Some(max_neighbors_sampled);
        self
    }

    /// The maximum number of moves accepted at each temperature. Defaults to
    /// `max_neighbors_sampled`.
    pub fn with_max_neighbors_accepted(mut self, max_neighbors_accepted: u64) -> Self {
        self.max_neighbors_accepted = Some(max_neighbors_accepted);
        self
    }

    /// The current temperature.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }
}

impl Default for SimulatedAnnealing {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, S, SM, NE> Metaheuristic<I, S, SM, NE> for SimulatedAnnealing
where
    S: Clone,
    SM: StateManager<I, S, NE::CF>,
    NE: NeighborhoodExplorer<I, S>,
{
    fn name(&self) -> &'static str {
        "simulated annealing"
    }

    fn initialize(&mut self, ctx: &mut Iteration<I, S, SM, NE>) -> Result<(), Error> {
        let cooling_rate = self.cooling_rate.ok_or_else(|| Error::ParameterNotSet {
            owner: "simulated annealing".to_string(),
            parameter: "cooling_rate",
        })?;
        if cooling_rate <= 0.0 || cooling_rate >= 1.0 {
            return Err(Error::IncorrectParameterValue {
                parameter: "cooling_rate",
                reason: "should be a value in the open interval (0, 1)".to_string(),
            });
        }
        let max_sampled = self.max_neighbors_sampled.ok_or_else(|| Error::ParameterNotSet {
            owner: "simulated annealing".to_string(),
            parameter: "max_neighbors_sampled",
        })?;
        if max_sampled == 0 {
            return Err(Error::IncorrectParameterValue {
                parameter: "max_neighbors_sampled",
                reason: "at least one neighbor must be sampled per temperature".to_string(),
            });
        }
        if self.max_neighbors_accepted.is_none() {
            self.max_neighbors_accepted = Some(max_sampled);
        }

        if self.compute_start_temperature {
            // sample the variance of random move deltas around the initial state
            let mut totals = Vec::with_capacity(START_TEMPERATURE_SAMPLES);
            for _ in 0..START_TEMPERATURE_SAMPLES {
                if let Some(mv) = ctx.ne.random_move(ctx.input, &ctx.run.current_state, ctx.rng) {
                    let cost = ctx.ne.delta_cost_function_components(
                        ctx.input,
                        &ctx.run.current_state,
                        &mv,
                        ctx.weights,
                    );
                    totals.push(cost.total.to_f64());
                }
            }
            if totals.is_empty() {
                return Err(Error::IncorrectParameterValue {
                    parameter: "compute_start_temperature",
                    reason: "cannot sample move deltas in an empty neighborhood".to_string(),
                });
            }
            let mean = totals.iter().sum::<f64>() / totals.len() as f64;
            let variance =
                totals.iter().map(|t| (t - mean) * (t - mean)).sum::<f64>() / totals.len() as f64;
            self.temperature = variance;
            debug!("simulated annealing: computed start temperature {}", self.temperature);
        } else {
            let start = self.start_temperature.ok_or_else(|| Error::ParameterNotSet {
                owner: "simulated annealing".to_string(),
                parameter: "start_temperature",
            })?;
            if start <= 0.0 {
                return Err(Error::IncorrectParameterValue {
                    parameter: "start_temperature",
                    reason: "should be greater than zero".to_string(),
                });
            }
            self.temperature = start;
        }

        self.neighbors_sampled = 0;
        self.neighbors_accepted = 0;
        Ok(())
    }

    fn select_move(
        &mut self,
        ctx: &mut Iteration<I, S, SM, NE>,
    ) -> Option<EvaluatedMove<NE::Move, NE::CF>> {
        let remaining =
            self.max_neighbors_sampled.unwrap_or(0).saturating_sub(self.neighbors_sampled);
        let temperature = self.temperature;
        let mut explored = 0;
        let selected = ctx.ne.random_first(
            ctx.input,
            &ctx.run.current_state,
            remaining,
            &mut explored,
            ctx.weights,
            ctx.rng,
            |_, cost, rng| {
                let r = rng.uniform_real(0.0, 1.0).max(1e-16);
                cost.total <= <NE::CF>::ZERO || cost.total.to_f64() < -temperature * r.ln()
            },
        );
        self.neighbors_sampled += explored;
        ctx.run.evaluations += explored;
        selected
    }

    fn stop_criterion(&self, _run: &RunState<S, NE::CF>) -> bool {
        // the run length is bounded by the runner's iteration cap
        false
    }

    fn complete_move(
        &mut self,
        _ctx: &mut Iteration<I, S, SM, NE>,
        _accepted: &EvaluatedMove<NE::Move, NE::CF>,
    ) {
        self.neighbors_accepted += 1;
    }

    fn complete_iteration(&mut self, _ctx: &mut Iteration<I, S, SM, NE>) {
        let max_sampled = self.max_neighbors_sampled.unwrap_or(u64::MAX);
        let max_accepted = self.max_neighbors_accepted.unwrap_or(u64::MAX);
        if self.neighbors_sampled >= max_sampled || self.neighbors_accepted >= max_accepted {
            self.temperature *= self.cooling_rate.unwrap_or(1.0);
            self.neighbors_sampled = 0;
            self.neighbors_accepted = 0;
        }
    }
}
