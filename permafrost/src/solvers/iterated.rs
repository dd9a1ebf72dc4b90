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

//! # Iterated local search

use std::sync::Arc;

use log::debug;

use crate::cost::CostValue;
use crate::kickers::Kicker;
use crate::neighborhoods::NeighborhoodExplorer;
use crate::rng::Prng;
use crate::runners::Runnable;
use crate::state::StateManager;
use crate::{Error, Stopper};

use super::SolverOutcome;

/// How the kicker perturbs the state between two runner executions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KickStrategy {
    /// No perturbation: restart the runner on its own result.
    NoKicker,
    /// Diversification: apply a random kick unconditionally.
    Diversifier,
    /// Intensification: apply the best kick if it improves the current state.
    Intensifier,
    /// Repeated intensification: apply first-improving kicks until none exists.
    IntensifierRun,
}

/// Iterated local search: run a runner to convergence, perturb its result with a kicker, and
/// repeat until a configurable number of rounds yields no improvement of the overall best
/// state (or the round cap is reached).
pub struct IteratedLocalSearch<I, S, SM, NE>
where
    S: Clone,
    NE: NeighborhoodExplorer<I, S>,
{
    sm: Arc<SM>,
    runner: Box<dyn Runnable<I, S, NE::CF>>,
    kicker: Kicker<I, S, NE>,
    kick_strategy: KickStrategy,
    kick_length: usize,
    max_idle_rounds: u64,
    max_rounds: u64,
    rng: Prng,
}

impl<I, S, SM, NE> IteratedLocalSearch<I, S, SM, NE>
where
    S: Clone,
    SM: StateManager<I, S, NE::CF>,
    NE: NeighborhoodExplorer<I, S>,
{
    /// Create the solver from a state manager, the runner to iterate and the kicker used for
    /// perturbation. The kick strategy defaults to [`KickStrategy::Diversifier`] with kicks of
    /// length 1.
    pub fn new(
        sm: Arc<SM>,
        runner: Box<dyn Runnable<I, S, NE::CF>>,
        kicker: Kicker<I, S, NE>,
    ) -> Self {
        Self {
            sm,
            runner,
            kicker,
            kick_strategy: KickStrategy::Diversifier,
            kick_length: 1,
            max_idle_rounds: 1,
            max_rounds: 100,
            rng: Prng::new(),
        }
    }

    /// Select the perturbation strategy.
    pub fn with_kick_strategy(mut self, kick_strategy: KickStrategy) -> Self {
        self.kick_strategy = kick_strategy;
        self
    }

    /// The length of the kicks used for perturbation.
    pub fn with_kick_length(mut self, kick_length: usize) -> Self {
        self.kick_length = kick_length;
        self
    }

    /// The number of consecutive rounds without improvement after which the search halts.
    pub fn with_max_idle_rounds(mut self, max_idle_rounds: u64) -> Self {
        self.max_idle_rounds = max_idle_rounds;
        self
    }

    /// The total number of rounds after which the search halts.
    pub fn with_max_rounds(mut self, max_rounds: u64) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Replace the random source used for initial states and random kicks.
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
        let mut best_cost = self.sm.cost_function(input, &init);
        let mut best_state = init.clone();
        let mut state = init;
        let mut idle_rounds = 0u64;
        let mut rounds = 0u64;

        loop {
            let outcome = self.runner.run_from(input, state.clone(), stop.clone())?;
            rounds += 1;
            if outcome.best_cost.improves(&best_cost) {
                best_cost = outcome.best_cost.clone();
                best_state = outcome.best_state.clone();
                idle_rounds = 0;
            } else {
                idle_rounds += 1;
            }
            state = outcome.best_state;

            if idle_rounds >= self.max_idle_rounds
                || rounds >= self.max_rounds
                || self.sm.lower_bound_reached(&best_cost)
                || stop.is_stop()
            {
                break;
            }

            match self.kick_strategy {
                KickStrategy::NoKicker => {}
                KickStrategy::Diversifier => {
                    if let Some((kick, kick_cost)) =
                        self.kicker.select_random(input, self.kick_length, &state, &mut self.rng)
                    {
                        self.kicker.make_kick(&mut state, &kick);
                        debug!("ILS: diversification kick with cost {}", kick_cost);
                        if kick_cost.total < <NE::CF>::ZERO {
                            idle_rounds = 0;
                        }
                    }
                }
                KickStrategy::Intensifier => {
                    if let Some((kick, kick_cost)) =
                        self.kicker.select_best(input, self.kick_length, &state, &mut self.rng)
                    {
                        if kick_cost.total < <NE::CF>::ZERO {
                            self.kicker.make_kick(&mut state, &kick);
                            debug!("ILS: intensification kick with cost {}", kick_cost);
                            idle_rounds = 0;
                        }
                    }
                }
                KickStrategy::IntensifierRun => {
                    while let Some((kick, kick_cost)) =
                        self.kicker.select_first_improving(input, self.kick_length, &state)
                    {
                        self.kicker.make_kick(&mut state, &kick);
                        debug!("ILS: intensification kick with cost {}", kick_cost);
                        idle_rounds = 0;
                        if stop.is_stop() {
                            break;
                        }
                    }
                }
            }
        }

        Ok(SolverOutcome { best_state, best_cost, rounds })
    }
}
