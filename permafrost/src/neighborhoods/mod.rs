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

//! # Neighborhood exploration
//!
//! A [`NeighborhoodExplorer`] defines the neighborhood of a state: how to draw a random move,
//! how to enumerate all moves under a fixed total ordering (`first_move` followed by repeated
//! `next_move`), how to apply a move to a state, and how to evaluate the cost variation of a
//! move through the attached [`DeltaRegistry`](crate::components::DeltaRegistry).
//!
//! An empty neighborhood is signalled by returning `None` from `first_move` or `random_move`.
//! The selection algorithms consume that signal and report "no move" themselves; the multi-modal
//! composers in [`multimodal`] use it to trigger backtracking.
//!
//! ## Selection algorithms
//!
//! All runners pick their moves through one of four selectors, parameterized by an acceptance
//! predicate over the move and its evaluated cost:
//!
//! - **`select_first`**: exhaustive scan, return the first acceptable move.
//! - **`select_best`**: exhaustive scan, return the best acceptable move. Among equally good
//!   moves, one is chosen uniformly at random without materializing the tie set: the `t`-th
//!   tying move replaces the incumbent with probability `1 / (1 + t)`.
//! - **`random_first`**: draw up to `samples` random moves, return the first acceptable one.
//! - **`random_best`**: draw exactly `samples` random moves, return the best acceptable one,
//!   with the same tie-breaking rule as `select_best`.
//!
//! The acceptance predicate also receives the random source, so that probabilistic acceptance
//! criteria (e.g. simulated annealing) stay reproducible under a fixed seed.

use std::fmt;

use crate::components::{DeltaRegistry, DeltaSource};
use crate::cost::{CostStructure, CostValue};
use crate::rng::Prng;

pub mod multimodal;

/// Requirements for a move type: moves are small values, freely copied, comparable for equality.
pub trait Move: Clone + PartialEq + fmt::Debug + Send + Sync {}

impl<T: Clone + PartialEq + fmt::Debug + Send + Sync> Move for T {}

/// A move together with its evaluated delta cost.
///
/// `is_valid == false` means that the cost has not been computed (yet) for this move. When
/// `is_valid` holds, `cost` is the delta cost of the move applied to the state in which it was
/// generated.
#[derive(Clone, Debug)]
pub struct EvaluatedMove<M, CF: CostValue> {
    /// The move itself.
    pub mv: M,
    /// The delta cost of the move, meaningful only if `is_valid`.
    pub cost: CostStructure<CF>,
    /// Whether `cost` has been computed.
    pub is_valid: bool,
}

impl<M, CF: CostValue> EvaluatedMove<M, CF> {
    /// Wrap a move whose cost has been computed.
    pub fn evaluated(mv: M, cost: CostStructure<CF>) -> Self {
        Self { mv, cost, is_valid: true }
    }

    /// Wrap a move without evaluating it.
    pub fn unevaluated(mv: M) -> Self {
        Self { mv, cost: CostStructure::infinity(0), is_valid: false }
    }
}

/// Interface for the exploration of one neighborhood.
///
/// Clients implement the four move primitives and expose the attached delta registry; the
/// framework provides delta-cost composition and the four selection algorithms on top.
pub trait NeighborhoodExplorer<I, S: Clone>: Send + Sync {
    /// The codomain of the cost function.
    type CF: CostValue;

    /// The type of the moves of this neighborhood.
    type Move: Move;

    /// The delta cost components attached to this explorer.
    fn deltas(&self) -> &DeltaRegistry<I, S, Self::Move, Self::CF>;

    /// Generate a uniformly distributed random move in the neighborhood of `st`, or `None` if
    /// the neighborhood is empty.
    fn random_move(&self, input: &I, st: &S, rng: &mut Prng) -> Option<Self::Move>;

    /// Generate the first move under the fixed total ordering of the neighborhood of `st`, or
    /// `None` if the neighborhood is empty.
    fn first_move(&self, input: &I, st: &S) -> Option<Self::Move>;

    /// Advance `mv` to the move that follows it in the ordering of the neighborhood of `st`.
    /// Returns `false` if `mv` was the last move.
    fn next_move(&self, input: &I, st: &S, mv: &mut Self::Move) -> bool;

    /// Apply `mv` to `st` in place.
    fn make_move(&self, input: &I, st: &mut S, mv: &Self::Move);

    /// Whether a move in the neighborhood is legal. The default accepts every move.
    fn feasible_move(&self, _input: &I, _st: &S, _mv: &Self::Move) -> bool {
        true
    }

    /// The number of different kinds of moves handled by this explorer. Base explorers have
    /// modality 1; multi-modal compositions report the size of their composition.
    fn modality(&self) -> usize {
        1
    }

    /// Compute the variation of the cost function obtained by applying `mv` to `st`, as an
    /// unaggregated vector of per-component deltas plus the maintained aggregates.
    ///
    /// Implemented deltas are evaluated first. If at least one registered component has no
    /// implemented delta, the move is simulated exactly once on a scratch state and all implicit
    /// entries are charged the weighted cost difference.
    ///
    /// When `weights` is non-empty, it holds one multiplier per registered cost component and the
    /// `weighted` aggregate is the correspondingly reweighted total; otherwise `weighted` equals
    /// the total.
    fn delta_cost_function_components(
        &self,
        input: &I,
        st: &S,
        mv: &Self::Move,
        weights: &[f64],
    ) -> CostStructure<Self::CF> {
        let reg = self.deltas();
        let hard_weight = reg.hard_weight();
        let mut components = vec![<Self::CF>::ZERO; reg.component_count()];
        let mut hard = <Self::CF>::ZERO;
        let mut soft = <Self::CF>::ZERO;
        let mut weighted = 0.0;

        for entry in reg.entries() {
            if let DeltaSource::Implemented(delta) = &entry.source {
                let d = entry.component.weight() * delta.delta_cost(input, st, mv);
                components[entry.index] = d;
                if entry.component.is_hard() {
                    hard += d;
                    if !weights.is_empty() {
                        weighted += hard_weight.to_f64() * weights[entry.index] * d.to_f64();
                    }
                } else {
                    soft += d;
                    if !weights.is_empty() {
                        weighted += weights[entry.index] * d.to_f64();
                    }
                }
            }
        }

        // a single simulated move serves all entries without an implemented delta
        if reg.has_implicit() {
            let mut new_st = st.clone();
            self.make_move(input, &mut new_st, mv);
            for entry in reg.entries() {
                if let DeltaSource::Implicit = entry.source {
                    let cc = &entry.component;
                    let d = cc.weight()
                        * (cc.compute_cost(input, &new_st) - cc.compute_cost(input, st));
                    components[entry.index] = d;
                    if cc.is_hard() {
                        hard += d;
                        if !weights.is_empty() {
                            weighted += hard_weight.to_f64() * weights[entry.index] * d.to_f64();
                        }
                    } else {
                        soft += d;
                        if !weights.is_empty() {
                            weighted += weights[entry.index] * d.to_f64();
                        }
                    }
                }
            }
        }

        let total = hard_weight * hard + soft;
        if weights.is_empty() {
            weighted = total.to_f64();
        }
        CostStructure::new(total, weighted, hard, soft, components)
    }

    /// Select the first move in the exhaustive neighborhood exploration matching the acceptance
    /// criterion, or `None` if no move is acceptable. `explored` counts the evaluated moves.
    fn select_first<F>(
        &self,
        input: &I,
        st: &S,
        explored: &mut u64,
        weights: &[f64],
        rng: &mut Prng,
        mut accept: F,
    ) -> Option<EvaluatedMove<Self::Move, Self::CF>>
    where
        F: FnMut(&Self::Move, &CostStructure<Self::CF>, &mut Prng) -> bool,
    {
        *explored = 0;
        let mut mv = self.first_move(input, st)?;
        loop {
            let cost = self.delta_cost_function_components(input, st, &mv, weights);
            *explored += 1;
            if accept(&mv, &cost, rng) {
                return Some(EvaluatedMove::evaluated(mv, cost));
            }
            if !self.next_move(input, st, &mut mv) {
                return None;
            }
        }
    }

    /// Select the best move in the exhaustive neighborhood exploration matching the acceptance
    /// criterion, breaking ties uniformly at random, or `None` if no move is acceptable.
    /// `explored` counts the evaluated moves.
    fn select_best<F>(
        &self,
        input: &I,
        st: &S,
        explored: &mut u64,
        weights: &[f64],
        rng: &mut Prng,
        mut accept: F,
    ) -> Option<EvaluatedMove<Self::Move, Self::CF>>
    where
        F: FnMut(&Self::Move, &CostStructure<Self::CF>, &mut Prng) -> bool,
    {
        *explored = 0;
        let mut number_of_bests: u32 = 0;
        let mut best: Option<EvaluatedMove<Self::Move, Self::CF>> = None;
        let mut mv = self.first_move(input, st)?;
        loop {
            let cost = self.delta_cost_function_components(input, st, &mv, weights);
            *explored += 1;
            if accept(&mv, &cost, rng) {
                match &best {
                    None => {
                        best = Some(EvaluatedMove::evaluated(mv.clone(), cost));
                        number_of_bests = 1;
                    }
                    Some(incumbent) if cost < incumbent.cost => {
                        best = Some(EvaluatedMove::evaluated(mv.clone(), cost));
                        number_of_bests = 1;
                    }
                    Some(incumbent) if cost == incumbent.cost => {
                        // replace with probability 1 / (1 + number_of_bests)
                        if rng.uniform_int(0, number_of_bests) == 0 {
                            best = Some(EvaluatedMove::evaluated(mv.clone(), cost));
                        }
                        number_of_bests += 1;
                    }
                    Some(_) => {}
                }
            }
            if !self.next_move(input, st, &mut mv) {
                break;
            }
        }
        best
    }

    /// Draw up to `samples` random moves and return the first one matching the acceptance
    /// criterion, or `None` if no drawn move is acceptable (or the neighborhood is empty).
    fn random_first<F>(
        &self,
        input: &I,
        st: &S,
        samples: u64,
        explored: &mut u64,
        weights: &[f64],
        rng: &mut Prng,
        mut accept: F,
    ) -> Option<EvaluatedMove<Self::Move, Self::CF>>
    where
        F: FnMut(&Self::Move, &CostStructure<Self::CF>, &mut Prng) -> bool,
    {
        *explored = 0;
        while *explored < samples {
            let mv = self.random_move(input, st, rng)?;
            let cost = self.delta_cost_function_components(input, st, &mv, weights);
            *explored += 1;
            if accept(&mv, &cost, rng) {
                return Some(EvaluatedMove::evaluated(mv, cost));
            }
        }
        None
    }

    /// Draw exactly `samples` random moves and return the best one matching the acceptance
    /// criterion, breaking ties uniformly at random, or `None` if no drawn move is acceptable.
    fn random_best<F>(
        &self,
        input: &I,
        st: &S,
        samples: u64,
        explored: &mut u64,
        weights: &[f64],
        rng: &mut Prng,
        mut accept: F,
    ) -> Option<EvaluatedMove<Self::Move, Self::CF>>
    where
        F: FnMut(&Self::Move, &CostStructure<Self::CF>, &mut Prng) -> bool,
    {
        *explored = 0;
        let mut number_of_bests: u32 = 0;
        let mut best: Option<EvaluatedMove<Self::Move, Self::CF>> = None;
        while *explored < samples {
            let mv = self.random_move(input, st, rng)?;
            let cost = self.delta_cost_function_components(input, st, &mv, weights);
            *explored += 1;
            if accept(&mv, &cost, rng) {
                match &best {
                    None => {
                        best = Some(EvaluatedMove::evaluated(mv, cost));
                        number_of_bests = 1;
                    }
                    Some(incumbent) if cost < incumbent.cost => {
                        best = Some(EvaluatedMove::evaluated(mv, cost));
                        number_of_bests = 1;
                    }
                    Some(incumbent) if cost == incumbent.cost => {
                        if rng.uniform_int(0, number_of_bests) == 0 {
                            best = Some(EvaluatedMove::evaluated(mv, cost));
                        }
                        number_of_bests += 1;
                    }
                    Some(_) => {}
                }
            }
        }
        best
    }
}
