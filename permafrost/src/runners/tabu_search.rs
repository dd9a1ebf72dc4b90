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

//! # Tabu search

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use itertools::Itertools;
use log::debug;

use crate::neighborhoods::{EvaluatedMove, Move, NeighborhoodExplorer};
use crate::state::StateManager;
use crate::Error;

use super::{Iteration, Metaheuristic, RunState};

/// An entry of the tabu list: an accepted move, prohibited (through its inverses) until the
/// iteration stored as its tenure.
#[derive(Clone, Debug)]
pub(crate) struct TabuEntry<M> {
    pub(crate) mv: M,
    pub(crate) tenure: u64,
}

// the heap orders entries by tenure only, earliest expiry on top
impl<M> PartialEq for TabuEntry<M> {
    fn eq(&self, other: &Self) -> bool {
        self.tenure == other.tenure
    }
}

impl<M> Eq for TabuEntry<M> {}

impl<M> PartialOrd for TabuEntry<M> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<M> Ord for TabuEntry<M> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.tenure.cmp(&self.tenure)
    }
}

/// The tabu-search strategy: at each step, perform the best move of the whole neighborhood, even
/// a worsening one. To prevent cycling, the inverses of recently accepted moves are prohibited:
/// each accepted move stays in the tabu list for a number of iterations drawn uniformly from
/// `[min_tenure, max_tenure]`. A prohibited move is still accepted if it would improve on the
/// best state found so far (aspiration by objective).
///
/// The inverse relation defaults to move equality and can be replaced with
/// [`with_inverse`](TabuSearch::with_inverse).
pub struct TabuSearch<M> {
    max_idle_iterations: Option<u64>,
    min_tenure: Option<u64>,
    max_tenure: Option<u64>,
    inverse: Box<dyn Fn(&M, &M) -> bool + Send + Sync>,
    pub(crate) tabu_list: BinaryHeap<TabuEntry<M>>,
}

impl<M: Move> TabuSearch<M> {
    /// Create the strategy with its parameters unset. The inverse relation defaults to move
    /// equality.
    pub fn new() -> Self {
        Self {
            max_idle_iterations: None,
            min_tenure: None,
            max_tenure: None,
            inverse: Box::new(|lhs: &M, rhs: &M| lhs == rhs),
            tabu_list: BinaryHeap::new(),
        }
    }

    /// The number of idle iterations after which the run stops. Required.
    pub fn with_max_idle_iterations(mut self, max_idle_iterations: u64) -> Self {
        self.max_idle_iterations = Some(max_idle_iterations);
        self
    }

    /// The tenure range; each accepted move is prohibited for a number of iterations drawn
    /// uniformly from `[min_tenure, max_tenure]`. Required, with `min_tenure <= max_tenure`.
    pub fn with_tenure(mut self, min_tenure: u64, max_tenure: u64) -> Self {
        self.min_tenure = Some(min_tenure);
        self.max_tenure = Some(max_tenure);
        self
    }

    /// Replace the inverse relation used to match candidate moves against the tabu list.
    pub fn with_inverse<F>(mut self, inverse: F) -> Self
    where
        F: Fn(&M, &M) -> bool + Send + Sync + 'static,
    {
        self.inverse = Box::new(inverse);
        self
    }

    /// The number of entries currently held in the tabu list.
    pub fn tabu_list_len(&self) -> usize {
        self.tabu_list.len()
    }
}

impl<M: Move> Default for TabuSearch<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, S, SM, NE, M> Metaheuristic<I, S, SM, NE> for TabuSearch<M>
where
    S: Clone,
    SM: StateManager<I, S, NE::CF>,
    NE: NeighborhoodExplorer<I, S, Move = M>,
    M: Move,
{
    fn name(&self) -> &'static str {
        "tabu search"
    }

    fn initialize(&mut self, _ctx: &mut Iteration<I, S, SM, NE>) -> Result<(), Error> {
        if self.max_idle_iterations.is_none() {
            return Err(Error::ParameterNotSet {
                owner: "tabu search".to_string(),
                parameter: "max_idle_iterations",
            });
        }
        let (min_tenure, max_tenure) = match (self.min_tenure, self.max_tenure) {
            (Some(min), Some(max)) => (min, max),
            _ => {
                return Err(Error::ParameterNotSet {
                    owner: "tabu search".to_string(),
                    parameter: "min_tenure",
                })
            }
        };
        if min_tenure > max_tenure {
            return Err(Error::IncorrectParameterValue {
                parameter: "min_tenure",
                reason: format!("min_tenure {} exceeds max_tenure {}", min_tenure, max_tenure),
            });
        }
        self.tabu_list.clear();
        Ok(())
    }

    fn select_move(
        &mut self,
        ctx: &mut Iteration<I, S, SM, NE>,
    ) -> Option<EvaluatedMove<M, NE::CF>> {
        // aspiration by objective, fixed at the start of the scan
        let aspiration = ctx.run.best_cost.total - ctx.run.current_cost.total;
        let tabu_list = &self.tabu_list;
        let inverse = &self.inverse;
        let mut explored = 0;
        let selected = ctx.ne.select_best(
            ctx.input,
            &ctx.run.current_state,
            &mut explored,
            ctx.weights,
            ctx.rng,
            |mv, cost, _| {
                !tabu_list
                    .iter()
                    .any(|entry| (inverse)(&entry.mv, mv) && cost.total >= aspiration)
            },
        );
        ctx.run.evaluations += explored;
        selected
    }

    fn stop_criterion(&self, run: &RunState<S, NE::CF>) -> bool {
        self.max_idle_iterations.map_or(false, |max| run.idle_iterations() >= max)
    }

    fn complete_move(
        &mut self,
        ctx: &mut Iteration<I, S, SM, NE>,
        accepted: &EvaluatedMove<M, NE::CF>,
    ) {
        // drop the entries that are no longer prohibited
        while let Some(entry) = self.tabu_list.peek() {
            if entry.tenure < ctx.run.iteration {
                self.tabu_list.pop();
            } else {
                break;
            }
        }
        let min_tenure = self.min_tenure.unwrap_or(0);
        let max_tenure = self.max_tenure.unwrap_or(min_tenure);
        let tenure = ctx.run.iteration + ctx.rng.uniform_int(min_tenure, max_tenure);
        self.tabu_list.push(TabuEntry { mv: accepted.mv.clone(), tenure });
        debug!(
            "tabu list at iteration {}: {{{}}}",
            ctx.run.iteration,
            self.tabu_list
                .iter()
                .map(|entry| format!("{:?}({})", entry.mv, entry.tenure))
                .join(", ")
        );
    }
}
