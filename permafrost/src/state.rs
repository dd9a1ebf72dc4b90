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

//! # State manager
//!
//! The state manager is responsible for all operations on states which are independent of any
//! neighborhood definition: generating initial states, evaluating the full cost function by
//! calling the registered cost components, and deciding whether the lower bound of the cost
//! function has been reached.
//!
//! The hard weight, multiplying the violations in the aggregated total, is a property of the
//! state manager (default 1000), so that independent solvers with different weightings can
//! coexist in one process.

use std::sync::Arc;

use crate::components::CostComponent;
use crate::cost::{CostStructure, CostValue};
use crate::rng::Prng;

/// Client interface for all state operations independent of a neighborhood.
///
/// Only [`random_state`](StateManager::random_state) and
/// [`cost_components`](StateManager::cost_components) have to be provided; everything else has a
/// sensible default built on top of them.
pub trait StateManager<I, S: Clone, CF: CostValue>: Send + Sync {
    /// Generate a (uniformly distributed) random state.
    fn random_state(&self, input: &I, rng: &mut Prng) -> S;

    /// The registered cost components, in registration order. The ordering fixes the indices of
    /// the per-component entries in every [`CostStructure`] produced by the framework.
    fn cost_components(&self) -> &[Arc<dyn CostComponent<I, S, CF>>];

    /// Generate a greedy state. The parameters `alpha` and `k` control the randomization of the
    /// greedy construction (the restricted candidate list of GRASP); implementations without a
    /// greedy heuristic can ignore them. Defaults to a random state.
    fn greedy_state(&self, input: &I, _alpha: f64, _k: usize, rng: &mut Prng) -> S {
        self.random_state(input, rng)
    }

    /// Draw `samples` random states and return the best one, together with its cost.
    fn sample_state(&self, input: &I, samples: usize, rng: &mut Prng) -> (S, CostStructure<CF>) {
        let mut best = self.random_state(input, rng);
        let mut best_cost = self.cost_function(input, &best);
        for _ in 1..samples {
            let st = self.random_state(input, rng);
            let cost = self.cost_function(input, &st);
            if cost.improves(&best_cost) {
                best = st;
                best_cost = cost;
            }
        }
        (best, best_cost)
    }

    /// Evaluate the full cost function on a state by calling all registered cost components.
    fn cost_function(&self, input: &I, st: &S) -> CostStructure<CF> {
        let ccs = self.cost_components();
        let mut components = Vec::with_capacity(ccs.len());
        let mut hard = CF::ZERO;
        let mut soft = CF::ZERO;
        for cc in ccs {
            let c = cc.cost(input, st);
            if cc.is_hard() {
                hard += c;
            } else {
                soft += c;
            }
            components.push(c);
        }
        let total = self.hard_weight() * hard + soft;
        CostStructure::new(total, total.to_f64(), hard, soft, components)
    }

    /// Evaluate the violations (the weighted sum of the hard components) on a state.
    fn violations(&self, input: &I, st: &S) -> CF {
        self.cost_components()
            .iter()
            .filter(|cc| cc.is_hard())
            .fold(CF::ZERO, |acc, cc| acc + cc.cost(input, st))
    }

    /// Evaluate the objective (the weighted sum of the soft components) on a state.
    fn objective(&self, input: &I, st: &S) -> CF {
        self.cost_components()
            .iter()
            .filter(|cc| cc.is_soft())
            .fold(CF::ZERO, |acc, cc| acc + cc.cost(input, st))
    }

    /// Whether the lower bound of the cost function has been reached. The default checks whether
    /// the total is zero.
    fn lower_bound_reached(&self, cost: &CostStructure<CF>) -> bool {
        cost.total == CF::ZERO
    }

    /// The weight multiplying the violations in the aggregated total.
    fn hard_weight(&self) -> CF {
        CF::from_i64(1000)
    }

    /// Distance between two states (e.g. a Hamming distance), used for diagnostics only.
    fn state_distance(&self, _st1: &S, _st2: &S) -> u32 {
        0
    }

    /// The registration index of a cost component, identified by object identity.
    fn component_index(&self, component: &Arc<dyn CostComponent<I, S, CF>>) -> Option<usize> {
        self.cost_components().iter().position(|cc| Arc::ptr_eq(cc, component))
    }
}
