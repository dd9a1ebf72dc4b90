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

//! # Runners
//!
//! A runner drives a single local-search strategy over one neighborhood: the shared iteration
//! loop selects a move, applies it, updates the best state and performs the strategy-specific
//! bookkeeping, until a termination predicate fires. The [`Runner`] owns the loop and the
//! current/best states; the strategy itself is a [`Metaheuristic`], which contributes the move
//! selection rule, the stop criterion and the per-iteration hooks.
//!
//! ## Strategies
//!
//! - **[`FirstDescent`]**: scan the neighborhood in enumeration order and take the first
//!   strictly improving move. Stops when no improving move exists.
//!
//! - **[`SteepestDescent`]**: take the best strictly improving move of the whole neighborhood.
//!   Leads straight to the nearest local minimum of the starting state.
//!
//! - **[`HillClimbing`]**: draw random moves and accept any that does not worsen the cost.
//!   Stops after a configurable number of iterations without improvement.
//!
//! - **[`LateAcceptanceHillClimbing`]**: hill climbing that defers the acceptance comparison to
//!   the cost a configurable number of steps in the past, keeping a cyclic history of costs.
//!
//! - **[`SimulatedAnnealing`]**: random sampling with probabilistic acceptance of worsening
//!   moves, with exponentially decreasing probability controlled by a temperature that cools at
//!   a configurable rate. The start temperature can be computed by sampling the variance of
//!   random move deltas.
//!
//! - **[`GreatDeluge`]**: random sampling with acceptance below a water level that decreases
//!   geometrically over the iterations.
//!
//! - **[`TabuSearch`]**: take the best move of the neighborhood, even a worsening one, while
//!   forbidding the inverses of recently accepted moves for a randomized number of iterations
//!   (the tenure). A move that would beat the best state overrides the prohibition (aspiration).

use std::marker::PhantomData;
use std::sync::Arc;

use log::{debug, info, trace};

use crate::cost::{CostStructure, CostValue};
use crate::neighborhoods::{EvaluatedMove, NeighborhoodExplorer};
use crate::rng::Prng;
use crate::state::StateManager;
use crate::{Error, Stopper};

mod first_descent;
pub use first_descent::FirstDescent;

mod steepest_descent;
pub use steepest_descent::SteepestDescent;

mod hill_climbing;
pub use hill_climbing::HillClimbing;

mod late_acceptance;
pub use late_acceptance::LateAcceptanceHillClimbing;

mod simulated_annealing;
pub use simulated_annealing::SimulatedAnnealing;

mod great_deluge;
pub use great_deluge::GreatDeluge;

mod tabu_search;
pub use tabu_search::TabuSearch;

/// The phases a runner goes through during one execution. Only the transition out of `Idle` is
/// triggered externally (by [`Runner::go`]); all other transitions are internal and
/// deterministic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No run in progress.
    Idle,
    /// The run is being set up: parameters validated, initial cost computed.
    Initializing,
    /// The iteration loop is executing.
    Looping,
    /// The run is shutting down.
    Terminating,
}

/// The bookkeeping of one run: current and best states with their costs, and the iteration
/// counters.
#[derive(Clone, Debug)]
pub struct RunState<S, CF: CostValue> {
    /// The state the search currently sits on.
    pub current_state: S,
    /// The best state found so far.
    pub best_state: S,
    /// The cost of the current state.
    pub current_cost: CostStructure<CF>,
    /// The cost of the best state.
    pub best_cost: CostStructure<CF>,
    /// The number of iterations performed so far.
    pub iteration: u64,
    /// The iteration at which the best state was found.
    pub iteration_of_best: u64,
    /// The number of move evaluations performed so far.
    pub evaluations: u64,
}

impl<S, CF: CostValue> RunState<S, CF> {
    /// The number of iterations elapsed since the last strict improvement.
    pub fn idle_iterations(&self) -> u64 {
        self.iteration - self.iteration_of_best
    }
}

/// Everything a [`Metaheuristic`] hook may touch during one iteration.
pub struct Iteration<'a, I, S, SM, NE>
where
    S: Clone,
    NE: NeighborhoodExplorer<I, S>,
{
    /// The (read-only) problem instance.
    pub input: &'a I,
    /// The attached state manager.
    pub sm: &'a SM,
    /// The attached neighborhood explorer.
    pub ne: &'a NE,
    /// The run bookkeeping.
    pub run: &'a mut RunState<S, NE::CF>,
    /// The runner-scoped random source.
    pub rng: &'a mut Prng,
    /// Optional per-component weights handed to the selectors.
    pub weights: &'a [f64],
}

/// The strategy-specific part of a runner.
///
/// `initialize` validates the configuration parameters and resets the internal strategy state;
/// `select_move` encodes the move selection rule; `stop_criterion` the strategy's termination
/// test. `complete_move` runs after a move has been accepted and applied, `complete_iteration`
/// at the very end of every accepted iteration.
pub trait Metaheuristic<I, S, SM, NE>: Send
where
    S: Clone,
    SM: StateManager<I, S, NE::CF>,
    NE: NeighborhoodExplorer<I, S>,
{
    /// A short name identifying the strategy in logs.
    fn name(&self) -> &'static str;

    /// Validate the parameters and reset the strategy state for a new run.
    fn initialize(&mut self, ctx: &mut Iteration<I, S, SM, NE>) -> Result<(), Error>;

    /// Select the move for this iteration, or `None` if no acceptable move was found.
    fn select_move(
        &mut self,
        ctx: &mut Iteration<I, S, SM, NE>,
    ) -> Option<EvaluatedMove<NE::Move, NE::CF>>;

    /// The strategy-specific termination test, checked at the top of every iteration.
    fn stop_criterion(&self, run: &RunState<S, NE::CF>) -> bool;

    /// Hook running after the selected move has been applied and the best state updated.
    fn complete_move(
        &mut self,
        _ctx: &mut Iteration<I, S, SM, NE>,
        _accepted: &EvaluatedMove<NE::Move, NE::CF>,
    ) {
    }

    /// Hook running at the end of every accepted iteration.
    fn complete_iteration(&mut self, _ctx: &mut Iteration<I, S, SM, NE>) {}
}

/// The result of one runner execution.
#[derive(Clone, Debug)]
pub struct RunOutcome<S, CF: CostValue> {
    /// The best state found during the run.
    pub best_state: S,
    /// The cost of the best state.
    pub best_cost: CostStructure<CF>,
    /// The cost of the state the run terminated on.
    pub current_cost: CostStructure<CF>,
    /// The number of iterations performed.
    pub iterations: u64,
    /// The iteration at which the best state was found.
    pub iteration_of_best: u64,
    /// The number of move evaluations performed.
    pub evaluations: u64,
}

/// Type-erased interface of a runner, used by the solvers to compose runners over different
/// neighborhoods of the same problem.
pub trait Runnable<I, S, CF: CostValue>: Send {
    /// The name of the runner.
    fn name(&self) -> &str;

    /// The modality of the attached neighborhood.
    fn modality(&self) -> usize;

    /// Perform a full run starting from the given state.
    fn run_from(&mut self, input: &I, init: S, stop: Stopper) -> Result<RunOutcome<S, CF>, Error>;
}

/// A local-search runner: the shared iteration loop of all strategies.
///
/// A runner owns its current and best states for the duration of a run, references the shared
/// state manager and neighborhood explorer, and enforces at most one concurrent execution over
/// its own state. The loop is single threaded and cooperative: a monotone [`Stopper`] predicate
/// is checked once per iteration.
pub struct Runner<I, S, SM, NE, P> {
    name: String,
    sm: Arc<SM>,
    ne: Arc<NE>,
    policy: P,
    rng: Prng,
    weights: Vec<f64>,
    max_iterations: Option<u64>,
    max_evaluations: Option<u64>,
    phase: Phase,
    _marker: PhantomData<fn(&I, &S)>,
}

impl<I, S, SM, NE, P> Runner<I, S, SM, NE, P>
where
    S: Clone,
    SM: StateManager<I, S, NE::CF>,
    NE: NeighborhoodExplorer<I, S>,
    P: Metaheuristic<I, S, SM, NE>,
{
    /// Create a runner from a state manager, a neighborhood explorer and a strategy.
    pub fn new(name: impl Into<String>, sm: Arc<SM>, ne: Arc<NE>, policy: P) -> Self {
        Self {
            name: name.into(),
            sm,
            ne,
            policy,
            rng: Prng::new(),
            weights: Vec::new(),
            max_iterations: None,
            max_evaluations: None,
            phase: Phase::Idle,
            _marker: PhantomData,
        }
    }

    /// Replace the random source, e.g. with a seeded one for reproducible runs.
    pub fn with_rng(mut self, rng: Prng) -> Self {
        self.rng = rng;
        self
    }

    /// Bound the total number of iterations of one run.
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// Bound the total number of move evaluations of one run.
    pub fn with_max_evaluations(mut self, max_evaluations: u64) -> Self {
        self.max_evaluations = Some(max_evaluations);
        self
    }

    /// Install per-component weights handed to the selectors (adaptive weighting).
    pub fn set_weights(&mut self, weights: Vec<f64>) {
        self.weights = weights;
    }

    /// The name of this runner.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The phase the runner is currently in.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Read access to the strategy, e.g. to inspect its state after a run.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Mutable access to the strategy, e.g. to configure its parameters.
    pub fn policy_mut(&mut self) -> &mut P {
        &mut self.policy
    }

    /// Perform a full run from a fresh random initial state.
    pub fn go(&mut self, input: &I, stop: Stopper) -> Result<RunOutcome<S, NE::CF>, Error> {
        let init = self.sm.random_state(input, &mut self.rng);
        self.go_from(input, init, stop)
    }

    /// Perform a full run starting from the given state.
    pub fn go_from(
        &mut self,
        input: &I,
        init: S,
        stop: Stopper,
    ) -> Result<RunOutcome<S, NE::CF>, Error> {
        if self.phase != Phase::Idle {
            return Err(Error::Logic(format!(
                "runner {} is already executing (phase {:?})",
                self.name, self.phase
            )));
        }
        self.phase = Phase::Initializing;

        let cost = self.sm.cost_function(input, &init);
        let mut run = RunState {
            current_state: init.clone(),
            best_state: init,
            current_cost: cost.clone(),
            best_cost: cost,
            iteration: 0,
            iteration_of_best: 0,
            evaluations: 0,
        };

        {
            let mut ctx = Iteration {
                input,
                sm: &*self.sm,
                ne: &*self.ne,
                run: &mut run,
                rng: &mut self.rng,
                weights: &self.weights,
            };
            if let Err(e) = self.policy.initialize(&mut ctx) {
                self.phase = Phase::Idle;
                return Err(e);
            }
        }
        info!(
            "Runner {} ({}): run initialized, initial cost {}",
            self.name,
            self.policy.name(),
            run.current_cost
        );

        self.phase = Phase::Looping;
        loop {
            if self.max_iterations.map_or(false, |max| run.iteration >= max) {
                debug!("Runner {}: maximum number of iterations reached", self.name);
                break;
            }
            if self.max_evaluations.map_or(false, |max| run.evaluations >= max) {
                debug!("Runner {}: maximum number of evaluations reached", self.name);
                break;
            }
            if self.policy.stop_criterion(&run) {
                debug!("Runner {}: stop criterion fired", self.name);
                break;
            }
            if self.sm.lower_bound_reached(&run.current_cost) {
                debug!("Runner {}: lower bound reached", self.name);
                break;
            }
            if stop.is_stop() {
                debug!("Runner {}: interrupted", self.name);
                break;
            }

            run.iteration += 1;
            let selected = {
                let mut ctx = Iteration {
                    input,
                    sm: &*self.sm,
                    ne: &*self.ne,
                    run: &mut run,
                    rng: &mut self.rng,
                    weights: &self.weights,
                };
                self.policy.select_move(&mut ctx)
            };
            let accepted = match selected {
                Some(em) => em,
                // no acceptable move: the search terminates gracefully
                None => break,
            };

            self.ne.make_move(input, &mut run.current_state, &accepted.mv);
            run.current_cost += &accepted.cost;
            trace!(
                "Runner {}: iteration {}, move cost {}, current cost {}",
                self.name,
                run.iteration,
                accepted.cost,
                run.current_cost
            );

            if run.current_cost.improves(&run.best_cost) {
                run.best_state = run.current_state.clone();
                run.best_cost = run.current_cost.clone();
                run.iteration_of_best = run.iteration;
                info!(
                    "Runner {}: new best cost {} at iteration {}",
                    self.name, run.best_cost, run.iteration
                );
            }

            {
                let mut ctx = Iteration {
                    input,
                    sm: &*self.sm,
                    ne: &*self.ne,
                    run: &mut run,
                    rng: &mut self.rng,
                    weights: &self.weights,
                };
                self.policy.complete_move(&mut ctx, &accepted);
                self.policy.complete_iteration(&mut ctx);
            }
        }

        self.phase = Phase::Terminating;
        info!(
            "Runner {}: run terminated after {} iterations, best cost {}",
            self.name, run.iteration, run.best_cost
        );
        self.phase = Phase::Idle;

        Ok(RunOutcome {
            best_state: run.best_state,
            best_cost: run.best_cost,
            current_cost: run.current_cost,
            iterations: run.iteration,
            iteration_of_best: run.iteration_of_best,
            evaluations: run.evaluations,
        })
    }
}

impl<I, S, SM, NE, P> Runnable<I, S, NE::CF> for Runner<I, S, SM, NE, P>
where
    S: Clone,
    SM: StateManager<I, S, NE::CF>,
    NE: NeighborhoodExplorer<I, S>,
    P: Metaheuristic<I, S, SM, NE>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn modality(&self) -> usize {
        self.ne.modality()
    }

    fn run_from(&mut self, input: &I, init: S, stop: Stopper) -> Result<RunOutcome<S, NE::CF>, Error> {
        self.go_from(input, init, stop)
    }
}
