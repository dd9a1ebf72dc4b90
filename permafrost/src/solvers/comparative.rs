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

//! # Comparative solver

use std::sync::Arc;
use std::thread;

use log::{info, warn};

use crate::cost::CostValue;
use crate::rng::Prng;
use crate::runners::{RunOutcome, Runnable};
use crate::state::StateManager;
use crate::{Error, Stopper};

use super::SolverOutcome;

/// Run several runners in parallel threads, each from its own random initial state, over the
/// shared read-only input, and keep the best outcome. A runner that reaches the lower bound
/// stops all the others through the shared [`Stopper`].
pub struct ComparativeSolver<I, S, SM, CF: CostValue> {
    sm: Arc<SM>,
    runners: Vec<Box<dyn Runnable<I, S, CF>>>,
    rng: Prng,
}

impl<I, S, SM, CF> ComparativeSolver<I, S, SM, CF>
where
    I: Sync,
    S: Clone + Send,
    SM: StateManager<I, S, CF>,
    CF: CostValue,
{
    /// Create a comparative solver without any runner attached.
    pub fn new(sm: Arc<SM>) -> Self {
        Self { sm, runners: Vec::new(), rng: Prng::new() }
    }

    /// Attach another runner to compare.
    pub fn add_runner(mut self, runner: Box<dyn Runnable<I, S, CF>>) -> Self {
        self.runners.push(runner);
        self
    }

    /// Replace the random source used to draw the initial states.
    pub fn with_rng(mut self, rng: Prng) -> Self {
        self.rng = rng;
        self
    }

    /// Run all attached runners in parallel and return the best outcome.
    pub fn solve(&mut self, input: &I, stop: Stopper) -> Result<SolverOutcome<S, CF>, Error> {
        if self.runners.is_empty() {
            return Err(Error::ObjectNotFound(
                "no runner attached to the comparative solver".to_string(),
            ));
        }

        // draw one independent initial state per runner
        let inits: Vec<S> = (0..self.runners.len())
            .map(|_| self.sm.random_state(input, &mut self.rng))
            .collect();

        let sm = &self.sm;
        let runners = &mut self.runners;
        let results: Vec<Result<RunOutcome<S, CF>, Error>> = thread::scope(|scope| {
            let handles: Vec<_> = runners
                .iter_mut()
                .zip(inits)
                .map(|(runner, init)| {
                    let stop = stop.clone();
                    let sm = Arc::clone(sm);
                    scope.spawn(move || {
                        let result = runner.run_from(input, init, stop.clone());
                        if let Ok(outcome) = &result {
                            if sm.lower_bound_reached(&outcome.best_cost) {
                                stop.send_stop();
                            }
                        }
                        result
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(result) => result,
                    Err(_) => Err(Error::Logic("a runner thread panicked".to_string())),
                })
                .collect()
        });

        let rounds = self.runners.len() as u64;
        let mut best: Option<SolverOutcome<S, CF>> = None;
        let mut last_error = None;
        for (runner, result) in self.runners.iter().zip(results) {
            match result {
                Ok(outcome) => {
                    info!(
                        "Comparative: runner {} finished with cost {}",
                        runner.name(),
                        outcome.best_cost
                    );
                    let better = match &best {
                        Some(incumbent) => outcome.best_cost.improves(&incumbent.best_cost),
                        None => true,
                    };
                    if better {
                        best = Some(SolverOutcome {
                            best_state: outcome.best_state,
                            best_cost: outcome.best_cost,
                            rounds,
                        });
                    }
                }
                Err(e) => {
                    warn!("Comparative: runner {} failed: {}", runner.name(), e);
                    last_error = Some(e);
                }
            }
        }

        match (best, last_error) {
            (Some(outcome), _) => Ok(outcome),
            (None, Some(e)) => Err(e),
            (None, None) => unreachable!(),
        }
    }
}
