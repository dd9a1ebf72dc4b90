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

//! # First descent

use crate::cost::CostValue;
use crate::neighborhoods::{EvaluatedMove, NeighborhoodExplorer};
use crate::state::StateManager;
use crate::Error;

use super::{Iteration, Metaheuristic, RunState};

/// The first-descent strategy: at each step, scan the neighborhood in enumeration order and
/// perform the first strictly improving move. The run stops as soon as no improving move exists,
/// which leaves the search in a local minimum.
#[derive(Clone, Debug, Default)]
pub struct FirstDescent;

impl FirstDescent {
    /// Create the strategy. First descent has no parameters.
    pub fn new() -> Self {
        Self
    }
}

impl<I, S, SM, NE> Metaheuristic<I, S, SM, NE> for FirstDescent
where
    S: Clone,
    SM: StateManager<I, S, NE::CF>,
    NE: NeighborhoodExplorer<I, S>,
{
    fn name(&self) -> &'static str {
        "first descent"
    }

    fn initialize(&mut self, _ctx: &mut Iteration<I, S, SM, NE>) -> Result<(), Error> {
        Ok(())
    }

    fn select_move(
        &mut self,
        ctx: &mut Iteration<I, S, SM, NE>,
    ) -> Option<EvaluatedMove<NE::Move, NE::CF>> {
        let mut explored = 0;
        let selected = ctx.ne.select_first(
            ctx.input,
            &ctx.run.current_state,
            &mut explored,
            ctx.weights,
            ctx.rng,
            |_, cost, _| cost.total < <NE::CF>::ZERO,
        );
        ctx.run.evaluations += explored;
        selected
    }

    fn stop_criterion(&self, _run: &RunState<S, NE::CF>) -> bool {
        // the loop ends by itself once no improving move is found
        false
    }
}
