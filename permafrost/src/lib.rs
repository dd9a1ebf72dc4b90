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

#![deny(missing_docs)]

//! # Permafrost: Local Search Metaheuristics for Combinatorial Optimization
//!
//! This is a library for building local-search solvers for combinatorial optimization problems.
//!
//! ## Problem Statement
//! Given
//! - a search space of *states* with a cost function split into hard constraint violations and a
//!   soft objective,
//! - a set of *moves* turning one state into a neighboring one, with incrementally computable
//!   cost variations,
//!
//! walk the search space towards states of minimum cost, under one of several acceptance
//! strategies, without any guarantee of global optimality.
//!
//! ## Structure
//!
//! This library is structured in the following way:
//!
//! - **[`Cost`](cost)**: the hierarchical cost representation: total, weighted, hard and soft
//!   aggregates, plus the unaggregated per-component values.
//!
//! - **[`Components`](components)**: the client-supplied cost components and their incremental
//!   deltas, together with the registry resolving which deltas are implemented and which fall
//!   back to simulating the move.
//!
//! - **[`State`](state)**: the state manager, responsible for initial states, full cost
//!   evaluation and the lower-bound test.
//!
//! - **[`Neighborhoods`](neighborhoods)**: the neighborhood explorer interface (random, first
//!   and next move generation, move application) with the four selection algorithms, and the
//!   multi-modal composition of several neighborhoods by set union or Cartesian product.
//!
//! - **[`Kickers`](kickers)**: generators of fixed-length sequences of related moves, used as
//!   perturbations for diversification and intensification.
//!
//! - **[`Runners`](runners)**: the iteration loop shared by all strategies, and the concrete
//!   strategies: first/steepest descent, hill climbing, late-acceptance hill climbing,
//!   simulated annealing, great deluge and tabu search.
//!
//! - **[`Solvers`](solvers)**: compositions of runners and kickers: simple local search,
//!   token ring, variable-neighborhood descent, iterated local search and parallel comparison.
//!
//! ## Usage
//!
//! To use this library, define your state, move and input types, implement a
//! [`StateManager`](state::StateManager) with the cost components of your problem and a
//! [`NeighborhoodExplorer`](neighborhoods::NeighborhoodExplorer) with its delta components, pick
//! a runner, and let it go:
//!
//! ```
//! use std::sync::Arc;
//! use permafrost::components::{CostComponent, DeltaCostComponent, DeltaRegistry};
//! use permafrost::neighborhoods::NeighborhoodExplorer;
//! use permafrost::rng::Prng;
//! use permafrost::runners::{Runner, SteepestDescent};
//! use permafrost::state::StateManager;
//! use permafrost::{Error, Stopper};
//!
//! // minimize the number of ones in a fixed-length bit vector
//! struct Input {
//!     len: usize,
//! }
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Bits(Vec<bool>);
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Flip(usize);
//!
//! struct Ones;
//!
//! impl CostComponent<Input, Bits, i64> for Ones {
//!     fn compute_cost(&self, _input: &Input, st: &Bits) -> i64 {
//!         st.0.iter().filter(|b| **b).count() as i64
//!     }
//!     fn weight(&self) -> i64 {
//!         1
//!     }
//!     fn is_hard(&self) -> bool {
//!         false
//!     }
//!     fn name(&self) -> &str {
//!         "ones"
//!     }
//! }
//!
//! struct FlipDelta;
//!
//! impl DeltaCostComponent<Input, Bits, Flip, i64> for FlipDelta {
//!     fn delta_cost(&self, _input: &Input, st: &Bits, mv: &Flip) -> i64 {
//!         if st.0[mv.0] {
//!             -1
//!         } else {
//!             1
//!         }
//!     }
//! }
//!
//! struct Manager {
//!     components: Vec<Arc<dyn CostComponent<Input, Bits, i64>>>,
//! }
//!
//! impl StateManager<Input, Bits, i64> for Manager {
//!     fn random_state(&self, input: &Input, rng: &mut Prng) -> Bits {
//!         Bits((0..input.len).map(|_| rng.uniform_int(0u8, 1) == 1).collect())
//!     }
//!     fn cost_components(&self) -> &[Arc<dyn CostComponent<Input, Bits, i64>>] {
//!         &self.components
//!     }
//! }
//!
//! struct FlipExplorer {
//!     deltas: DeltaRegistry<Input, Bits, Flip, i64>,
//! }
//!
//! impl NeighborhoodExplorer<Input, Bits> for FlipExplorer {
//!     type CF = i64;
//!     type Move = Flip;
//!
//!     fn deltas(&self) -> &DeltaRegistry<Input, Bits, Flip, i64> {
//!         &self.deltas
//!     }
//!     fn random_move(&self, input: &Input, _st: &Bits, rng: &mut Prng) -> Option<Flip> {
//!         Some(Flip(rng.uniform_int(0, input.len - 1)))
//!     }
//!     fn first_move(&self, _input: &Input, _st: &Bits) -> Option<Flip> {
//!         Some(Flip(0))
//!     }
//!     fn next_move(&self, input: &Input, _st: &Bits, mv: &mut Flip) -> bool {
//!         if mv.0 + 1 < input.len {
//!             mv.0 += 1;
//!             true
//!         } else {
//!             false
//!         }
//!     }
//!     fn make_move(&self, _input: &Input, st: &mut Bits, mv: &Flip) {
//!         st.0[mv.0] = !st.0[mv.0];
//!     }
//! }
//!
//! fn main() -> Result<(), Error> {
//!     let input = Input { len: 16 };
//!     let ones: Arc<dyn CostComponent<Input, Bits, i64>> = Arc::new(Ones);
//!     let sm = Arc::new(Manager { components: vec![ones.clone()] });
//!     let mut deltas = DeltaRegistry::new(&*sm);
//!     deltas.add_delta(&*sm, ones, Box::new(FlipDelta))?;
//!     let ne = Arc::new(FlipExplorer { deltas });
//!
//!     let mut runner = Runner::new("steepest", sm, ne, SteepestDescent::new());
//!     let outcome = runner.go(&input, Stopper::new())?;
//!     assert_eq!(outcome.best_cost.total, 0);
//!     Ok(())
//! }
//! ```

pub mod components;
pub mod cost;
pub mod kickers;
pub mod neighborhoods;
pub mod rng;
pub mod runners;
pub mod solvers;
pub mod state;

mod error;
pub use error::Error;

// test modules
mod test;

use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

/// Stopper, to check when to stop, or to send the stop command.
///
/// All runners check the stopper once per iteration and terminate gracefully when it fires. A
/// stopper can also carry a deadline, so that a solver can enforce a wall-clock budget on every
/// runner it drives.
#[derive(Clone, Debug)]
pub struct Stopper {
    flag: Arc<RwLock<bool>>,
    deadline: Option<Instant>,
}

impl Default for Stopper {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopper {
    /// Create a new stopper without a deadline.
    pub fn new() -> Self {
        Self { flag: Arc::new(RwLock::new(false)), deadline: None }
    }

    /// Create a new stopper that fires by itself once the given budget has elapsed.
    pub fn with_time_budget(budget: Duration) -> Self {
        Self { flag: Arc::new(RwLock::new(false)), deadline: Some(Instant::now() + budget) }
    }

    /// Send the stop command. This function will block until the write lock can be acquired.
    pub fn send_stop(&self) {
        if let Ok(mut flag) = self.flag.write() {
            *flag = true;
        }
    }

    /// Checks if the stop flag is set or the deadline has passed. This function will block until
    /// the read lock can be acquired.
    pub fn is_stop(&self) -> bool {
        if self.deadline.map_or(false, |deadline| Instant::now() >= deadline) {
            return true;
        }
        self.flag.read().map(|flag| *flag).unwrap_or(true)
    }

    /// Checks if the stop flag is set, without blocking. Returns `None` if the read lock cannot
    /// be acquired right now.
    pub fn try_is_stop(&self) -> Option<bool> {
        if self.deadline.map_or(false, |deadline| Instant::now() >= deadline) {
            return Some(true);
        }
        self.flag.try_read().map(|flag| *flag).ok()
    }
}
