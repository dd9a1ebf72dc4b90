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

//! # Cartesian-product neighborhood
//!
//! The `ProductExplorer` composes base neighborhoods into their Cartesian product: a compound
//! move exercises *all* components, one after the other, and every adjacent pair of component
//! moves must be related according to a client-supplied predicate (every pair is related by
//! default).
//!
//! Enumeration maintains a chain of intermediate states, one per level: level `i` generates its
//! moves in the state produced by applying the moves of levels `0..i`. When a level runs out of
//! related moves, the enumeration backtracks to the previous level, advances there, and rebuilds
//! the downstream states. Random generation samples each level and detects the cyclic exhaustion
//! of a level by remembering the first sampled move, wrapping around the ordered enumeration
//! until it comes back to it.

use std::sync::Arc;

use crate::components::DeltaRegistry;
use crate::cost::{CostStructure, CostValue};
use crate::neighborhoods::{Move, NeighborhoodExplorer};
use crate::rng::Prng;
use crate::state::StateManager;

use super::{CompoundMove, ErasedExplorer, InjectFn, ProjectFn, SlotAdapter};

/// Relatedness predicate over adjacent component moves.
pub(crate) type Related<M> = Box<dyn Fn(&M, &M) -> bool + Send + Sync>;

/// The Cartesian product of several base neighborhoods over the same state type, restricted to
/// chains of pairwise related moves.
pub struct ProductExplorer<I, S: Clone, M, CF: CostValue> {
    slots: Vec<Box<dyn ErasedExplorer<I, S, M, CF>>>,
    related: Related<M>,
    registry: DeltaRegistry<I, S, CompoundMove<M>, CF>,
}

impl<I, S, M, CF> ProductExplorer<I, S, M, CF>
where
    I: 'static,
    S: Clone + 'static,
    M: Move + 'static,
    CF: CostValue,
{
    /// Create a product explorer without any component, capturing the cost layout of the given
    /// state manager. Every pair of moves is considered related until
    /// [`with_related`](ProductExplorer::with_related) installs a predicate.
    pub fn new<SM>(sm: &SM) -> Self
    where
        SM: StateManager<I, S, CF> + ?Sized,
    {
        Self {
            slots: Vec::new(),
            related: Box::new(|_, _| true),
            registry: DeltaRegistry::new(sm),
        }
    }

    /// Register a base explorer as the next level of the product.
    pub fn add<NE>(
        mut self,
        ne: Arc<NE>,
        inject: InjectFn<NE::Move, M>,
        project: ProjectFn<NE::Move, M>,
    ) -> Self
    where
        NE: NeighborhoodExplorer<I, S, CF = CF> + 'static,
    {
        self.slots.push(Box::new(SlotAdapter::new(ne, inject, project)));
        self
    }

    /// Install the relatedness predicate checked between every pair of adjacent levels.
    pub fn with_related<F>(mut self, related: F) -> Self
    where
        F: Fn(&M, &M) -> bool + Send + Sync + 'static,
    {
        self.related = Box::new(related);
        self
    }

    /// The number of registered levels.
    pub fn components(&self) -> usize {
        self.slots.len()
    }

    /// Whether the moves at `level` and `level - 1` are related. Missing moves are treated as
    /// related so that a breached invariant cannot hang the enumeration.
    fn related_at(&self, moves: &[Option<M>], level: usize) -> bool {
        match (moves[level - 1].as_ref(), moves[level].as_ref()) {
            (Some(prev), Some(cur)) => (self.related)(prev, cur),
            _ => true,
        }
    }

    /// Advance the move at `level` in the enumeration order, without wrapping around.
    fn advance(&self, input: &I, st: &S, moves: &mut [Option<M>], level: usize) -> bool {
        match moves[level].as_mut() {
            Some(m) => self.slots[level].next_move(input, st, m),
            None => false,
        }
    }

    /// Advance the move at `level`, wrapping around to the first move when the enumeration is
    /// exhausted. Returns `false` when the wrap-around comes back to the first sampled move,
    /// i.e. the level is cyclically exhausted.
    fn advance_cyclic(
        &self,
        input: &I,
        st: &S,
        moves: &mut [Option<M>],
        initial: &[Option<M>],
        level: usize,
    ) -> bool {
        {
            let m = match moves[level].as_mut() {
                Some(m) => m,
                None => return false,
            };
            if !self.slots[level].next_move(input, st, m) {
                match self.slots[level].first_move(input, st) {
                    Some(first) => *m = first,
                    None => return false,
                }
            }
        }
        moves[level] != initial[level]
    }

    /// Rebuild the pre-state of level `level + 1` from the pre-state and move of `level`.
    fn push_state(&self, input: &I, states: &mut [S], moves: &[Option<M>], level: usize) {
        let mut next = states[level].clone();
        if let Some(m) = moves[level].as_ref() {
            let _ = self.slots[level].make_move(input, &mut next, m);
        }
        states[level + 1] = next;
    }

    /// Depth-first completion of a partial chain of moves, with backtracking. `states[i]` must
    /// hold the pre-state of every level up to and including the starting one. Returns `false`
    /// when no consistent chain exists.
    fn complete_chain(
        &self,
        input: &I,
        states: &mut [S],
        moves: &mut [Option<M>],
        start_level: isize,
        start_backtracking: bool,
    ) -> bool {
        let n = self.slots.len();
        let mut cur = start_level;
        let mut backtracking = start_backtracking;
        'outer: loop {
            if cur < 0 {
                return false;
            }
            let c = cur as usize;
            if c >= n {
                return true;
            }
            if !backtracking {
                match self.slots[c].first_move(input, &states[c]) {
                    Some(m) => moves[c] = Some(m),
                    None => {
                        backtracking = true;
                        cur -= 1;
                        continue;
                    }
                }
            } else if !self.advance(input, &states[c], moves, c) {
                backtracking = true;
                cur -= 1;
                continue;
            }
            // skip moves unrelated to the previous level
            while c > 0 && !self.related_at(moves, c) {
                if !self.advance(input, &states[c], moves, c) {
                    backtracking = true;
                    cur -= 1;
                    continue 'outer;
                }
            }
            backtracking = false;
            if c + 1 < n {
                self.push_state(input, states, moves, c);
            }
            cur += 1;
        }
    }
}

impl<I, S, M, CF> NeighborhoodExplorer<I, S> for ProductExplorer<I, S, M, CF>
where
    I: 'static,
    S: Clone + 'static,
    M: Move + 'static,
    CF: CostValue,
{
    type CF = CF;
    type Move = CompoundMove<M>;

    fn deltas(&self) -> &DeltaRegistry<I, S, CompoundMove<M>, CF> {
        &self.registry
    }

    fn random_move(&self, input: &I, st: &S, rng: &mut Prng) -> Option<CompoundMove<M>> {
        let n = self.slots.len();
        if n == 0 {
            return None;
        }
        let mut moves: Vec<Option<M>> = vec![None; n];
        let mut initial: Vec<Option<M>> = vec![None; n];
        let mut states: Vec<S> = vec![st.clone(); n];
        let mut cur: isize = 0;
        let mut backtracking = false;
        'outer: loop {
            if cur < 0 {
                return None;
            }
            let c = cur as usize;
            if c >= n {
                break;
            }
            if !backtracking {
                match self.slots[c].random_move(input, &states[c], rng) {
                    Some(m) => {
                        if initial[c].is_none() {
                            initial[c] = Some(m.clone());
                        }
                        moves[c] = Some(m);
                    }
                    None => {
                        backtracking = true;
                        cur -= 1;
                        continue;
                    }
                }
            } else if !self.advance_cyclic(input, &states[c], &mut moves, &initial, c) {
                backtracking = true;
                cur -= 1;
                continue;
            }
            while c > 0 && !self.related_at(&moves, c) {
                if !self.advance_cyclic(input, &states[c], &mut moves, &initial, c) {
                    backtracking = true;
                    cur -= 1;
                    continue 'outer;
                }
            }
            backtracking = false;
            if c + 1 < n {
                self.push_state(input, &mut states, &moves, c);
            }
            cur += 1;
        }
        CompoundMove::from_active(moves)
    }

    fn first_move(&self, input: &I, st: &S) -> Option<CompoundMove<M>> {
        let n = self.slots.len();
        if n == 0 {
            return None;
        }
        let mut moves: Vec<Option<M>> = vec![None; n];
        let mut states: Vec<S> = vec![st.clone(); n];
        if self.complete_chain(input, &mut states, &mut moves, 0, false) {
            CompoundMove::from_active(moves)
        } else {
            None
        }
    }

    fn next_move(&self, input: &I, st: &S, mv: &mut CompoundMove<M>) -> bool {
        let n = self.slots.len();
        if mv.components.len() != n || n == 0 {
            return false;
        }
        let mut moves: Vec<Option<M>> =
            mv.components.iter().map(|am| am.mv.clone()).collect();
        if moves.iter().any(|m| m.is_none()) {
            return false;
        }
        // rebuild the chain of pre-states from the current compound move
        let mut states: Vec<S> = vec![st.clone(); n];
        for i in 0..n - 1 {
            self.push_state(input, &mut states, &moves, i);
        }
        if self.complete_chain(input, &mut states, &mut moves, (n - 1) as isize, true) {
            match CompoundMove::from_active(moves) {
                Some(compound) => {
                    *mv = compound;
                    true
                }
                None => false,
            }
        } else {
            false
        }
    }

    fn make_move(&self, input: &I, st: &mut S, mv: &CompoundMove<M>) {
        for (i, am) in mv.components.iter().enumerate() {
            if let Some(m) = am.mv.as_ref() {
                let _ = self.slots[i].make_move(input, st, m);
            }
        }
    }

    fn modality(&self) -> usize {
        self.slots.len()
    }

    fn delta_cost_function_components(
        &self,
        input: &I,
        st: &S,
        mv: &CompoundMove<M>,
        weights: &[f64],
    ) -> CostStructure<CF> {
        let n_components = self.registry.component_count();
        if mv.components.len() != self.slots.len() {
            return CostStructure::infinity(n_components);
        }
        // sum the per-level deltas along the chain of intermediate states
        let mut total = CostStructure::zero(n_components);
        let mut chain_state = st.clone();
        for (i, am) in mv.components.iter().enumerate() {
            let m = match am.mv.as_ref() {
                Some(m) => m,
                None => return CostStructure::infinity(n_components),
            };
            match self.slots[i].delta_cost(input, &chain_state, m, weights) {
                Some(cost) => total += cost,
                None => return CostStructure::infinity(n_components),
            }
            if i + 1 < mv.components.len() {
                let _ = self.slots[i].make_move(input, &mut chain_state, m);
            }
        }
        total
    }
}
