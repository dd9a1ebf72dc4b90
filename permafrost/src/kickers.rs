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

//! # Kickers
//!
//! A kicker generates sequences of a fixed length of related moves (*kicks*) from a single base
//! neighborhood, used as perturbations for diversification and intensification. The enumeration
//! of kicks is depth first with backtracking, like the Cartesian-product neighborhood, but over
//! one neighborhood applied repeatedly: the move at position `i` is generated in the
//! intermediate state produced by the moves at positions `0..i`, and must be related to its
//! predecessor according to the kicker's predicate.
//!
//! A [`Kick`] stores, for every position, the chosen move and the intermediate state produced by
//! applying it, so that applying a kick is a single state assignment and the per-position delta
//! costs can be filled in lazily. The kicker never mutates the caller's start state.

use std::marker::PhantomData;
use std::sync::Arc;

use log::trace;

use crate::cost::{CostStructure, CostValue};
use crate::neighborhoods::{EvaluatedMove, NeighborhoodExplorer};
use crate::rng::Prng;

/// One position of a kick: the move chosen there, with its lazily evaluated delta cost, and the
/// intermediate state produced by applying it.
#[derive(Clone, Debug)]
pub struct KickPosition<S, M, CF: CostValue> {
    /// The move of this position. Its cost refers to the state the position starts from and is
    /// only meaningful once `is_valid` holds.
    pub mv: EvaluatedMove<M, CF>,
    /// The state after applying this position's move.
    pub state: S,
}

/// A sequence of related moves together with the chain of intermediate states they produce.
#[derive(Clone, Debug)]
pub struct Kick<S, M, CF: CostValue> {
    positions: Vec<KickPosition<S, M, CF>>,
}

impl<S, M, CF: CostValue> Kick<S, M, CF> {
    /// The length of the kick.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the kick contains no move.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// The positions of the kick, in application order.
    pub fn positions(&self) -> &[KickPosition<S, M, CF>] {
        &self.positions
    }

    /// The state reached after applying the whole kick.
    pub fn final_state(&self) -> Option<&S> {
        self.positions.last().map(|p| &p.state)
    }
}

/// Generator of fixed-length sequences of related moves over a single base neighborhood.
pub struct Kicker<I, S, NE>
where
    S: Clone,
    NE: NeighborhoodExplorer<I, S>,
{
    ne: Arc<NE>,
    related: Box<dyn Fn(&NE::Move, &NE::Move) -> bool + Send + Sync>,
    _marker: PhantomData<fn(&I, &S)>,
}

impl<I, S, NE> Kicker<I, S, NE>
where
    S: Clone,
    NE: NeighborhoodExplorer<I, S>,
{
    /// Create a kicker over the given neighborhood, with every pair of moves related.
    pub fn new(ne: Arc<NE>) -> Self {
        Self { ne, related: Box::new(|_, _| true), _marker: PhantomData }
    }

    /// Install the relatedness predicate checked between adjacent positions of every kick.
    pub fn with_related<F>(mut self, related: F) -> Self
    where
        F: Fn(&NE::Move, &NE::Move) -> bool + Send + Sync + 'static,
    {
        self.related = Box::new(related);
        self
    }

    /// The modality of the underlying neighborhood (not the kick length).
    pub fn modality(&self) -> usize {
        self.ne.modality()
    }

    fn related_pair(&self, moves: &[Option<NE::Move>], level: usize) -> bool {
        match (moves[level - 1].as_ref(), moves[level].as_ref()) {
            (Some(prev), Some(cur)) => (self.related)(prev, cur),
            _ => true,
        }
    }

    /// Advance the move at `level`, wrapping around to the first move of the neighborhood.
    /// Returns `false` when the wrap-around reaches the first sampled move again.
    fn advance_cyclic(
        &self,
        input: &I,
        pre: &S,
        moves: &mut [Option<NE::Move>],
        initial: &[Option<NE::Move>],
        level: usize,
    ) -> bool {
        {
            let m = match moves[level].as_mut() {
                Some(m) => m,
                None => return false,
            };
            if !self.ne.next_move(input, pre, m) {
                match self.ne.first_move(input, pre) {
                    Some(first) => *m = first,
                    None => return false,
                }
            }
        }
        moves[level] != initial[level]
    }

    /// Depth-first completion of a partial kick with backtracking. `moves` and `states` hold one
    /// entry per position; `states[i]` is the post-move state of position `i` and must be valid
    /// for every position below the starting level. Returns the lowest level that was
    /// regenerated, or `None` when the enumeration is exhausted.
    fn build(
        &self,
        input: &I,
        start: &S,
        moves: &mut [Option<NE::Move>],
        states: &mut [S],
        start_level: isize,
        start_backtracking: bool,
    ) -> Option<usize> {
        let length = moves.len();
        let mut cur = start_level;
        let mut backtracking = start_backtracking;
        let mut lowest = length.saturating_sub(1);
        let mut __dbg_iters: u64 = 0;
        'outer: loop {
            __dbg_iters += 1;
            if __dbg_iters % 1000000 == 0 {
                eprintln!("DBG build iter={} cur={} backtracking={}", __dbg_iters, cur, backtracking);
            }
            if __dbg_iters > 5000000 {
                panic!("DBG build stuck cur={} backtracking={}", cur, backtracking);
            }
            if cur < 0 {
                return None;
            }
            let c = cur as usize;
            if c >= length {
                return Some(lowest);
            }
            lowest = lowest.min(c);
            // the state this position starts from
            let mut pre = if c > 0 { states[c - 1].clone() } else { start.clone() };
            if !backtracking {
                match self.ne.first_move(input, &pre) {
                    Some(m) => moves[c] = Some(m),
                    None => {
                        backtracking = true;
                        cur -= 1;
                        continue;
                    }
                }
            } else {
                let advanced = match moves[c].as_mut() {
                    Some(m) => self.ne.next_move(input, &pre, m),
                    None => false,
                };
                if !advanced {
                    backtracking = true;
                    cur -= 1;
                    continue;
                }
            }
            let mut __dbg_inner: u64 = 0;
            while c > 0 && !self.related_pair(moves, c) {
                __dbg_inner += 1;
                if __dbg_inner > 1000 {
                    panic!("DBG inner while stuck at c={} cur={}", c, cur);
                }
                let advanced = match moves[c].as_mut() {
                    Some(m) => self.ne.next_move(input, &pre, m),
                    None => false,
                };
                if !advanced {
                    backtracking = true;
                    cur -= 1;
                    continue 'outer;
                }
            }
            backtracking = false;
            if let Some(m) = moves[c].as_ref() {
                self.ne.make_move(input, &mut pre, m);
            }
            states[c] = pre;
            cur += 1;
        }
    }

    fn assemble(
        moves: Vec<Option<NE::Move>>,
        states: Vec<S>,
    ) -> Option<Kick<S, NE::Move, NE::CF>> {
        let positions = moves
            .into_iter()
            .zip(states.into_iter())
            .map(|(m, state)| m.map(|mv| KickPosition { mv: EvaluatedMove::unevaluated(mv), state }))
            .collect::<Option<Vec<_>>>()?;
        Some(Kick { positions })
    }

    /// Generate the first kick of the given length under the enumeration ordering, or `None` if
    /// no consistent chain of related moves exists.
    pub fn first_kick(
        &self,
        input: &I,
        length: usize,
        st: &S,
    ) -> Option<Kick<S, NE::Move, NE::CF>> {
        if length == 0 {
            return None;
        }
        let mut moves: Vec<Option<NE::Move>> = vec![None; length];
        let mut states: Vec<S> = vec![st.clone(); length];
        self.build(input, st, &mut moves, &mut states, 0, false)?;
        Self::assemble(moves, states)
    }

    /// Advance `kick` to the next kick in the enumeration ordering. Returns `false` (leaving the
    /// kick untouched) when `kick` was the last one.
    pub fn next_kick(&self, input: &I, st: &S, kick: &mut Kick<S, NE::Move, NE::CF>) -> bool {
        let length = kick.len();
        if length == 0 {
            return false;
        }
        let mut moves: Vec<Option<NE::Move>> =
            kick.positions.iter().map(|p| Some(p.mv.mv.clone())).collect();
        let mut states: Vec<S> = kick.positions.iter().map(|p| p.state.clone()).collect();
        match self.build(input, st, &mut moves, &mut states, (length - 1) as isize, true) {
            Some(lowest) => {
                for (i, (m, state)) in moves.into_iter().zip(states.into_iter()).enumerate() {
                    if i < lowest {
                        continue;
                    }
                    let mv = match m {
                        Some(mv) => mv,
                        None => return false,
                    };
                    // positions from the lowest regenerated level on need a fresh evaluation
                    kick.positions[i] = KickPosition { mv: EvaluatedMove::unevaluated(mv), state };
                }
                true
            }
            None => false,
        }
    }

    /// Generate a random kick of the given length, or `None` if no consistent chain of related
    /// moves exists. Cyclic exhaustion of a position is detected by remembering the first move
    /// sampled there, so that sampling cannot loop forever on an empty related subset.
    pub fn sample_kick(
        &self,
        input: &I,
        length: usize,
        st: &S,
        rng: &mut Prng,
    ) -> Option<Kick<S, NE::Move, NE::CF>> {
        if length == 0 {
            return None;
        }
        let mut moves: Vec<Option<NE::Move>> = vec![None; length];
        let mut initial: Vec<Option<NE::Move>> = vec![None; length];
        let mut states: Vec<S> = vec![st.clone(); length];
        let mut cur: isize = 0;
        let mut backtracking = false;
        let mut __dbg_iters2: u64 = 0;
        'outer: loop {
            __dbg_iters2 += 1;
            if __dbg_iters2 % 1000000 == 0 {
                eprintln!("DBG sample_kick iter={} cur={} backtracking={}", __dbg_iters2, cur, backtracking);
            }
            if __dbg_iters2 > 5000000 {
                panic!("DBG sample_kick stuck cur={} backtracking={}", cur, backtracking);
            }
            if cur < 0 {
                return None;
            }
            let c = cur as usize;
            if c >= length {
                break;
            }
            let mut pre = if c > 0 { states[c - 1].clone() } else { st.clone() };
            if !backtracking {
                match self.ne.random_move(input, &pre, rng) {
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
            } else if !self.advance_cyclic(input, &pre, &mut moves, &initial, c) {
                backtracking = true;
                cur -= 1;
                continue;
            }
            while c > 0 && !self.related_pair(&moves, c) {
                if !self.advance_cyclic(input, &pre, &mut moves, &initial, c) {
                    backtracking = true;
                    cur -= 1;
                    continue 'outer;
                }
            }
            backtracking = false;
            if let Some(m) = moves[c].as_ref() {
                self.ne.make_move(input, &mut pre, m);
            }
            states[c] = pre;
            cur += 1;
        }
        Self::assemble(moves, states)
    }

    /// Fill in the missing per-position delta costs of a kick and return the total cost of
    /// applying it to `st`. Every position's delta is evaluated against the state the position
    /// starts from.
    pub fn evaluate(
        &self,
        input: &I,
        st: &S,
        kick: &mut Kick<S, NE::Move, NE::CF>,
        weights: &[f64],
    ) -> CostStructure<NE::CF> {
        let mut total = CostStructure::zero(self.ne.deltas().component_count());
        for i in 0..kick.positions.len() {
            let (before, rest) = kick.positions.split_at_mut(i);
            let position = &mut rest[0];
            let pre = if i == 0 { st } else { &before[i - 1].state };
            if !position.mv.is_valid {
                position.mv.cost =
                    self.ne.delta_cost_function_components(input, pre, &position.mv.mv, weights);
                position.mv.is_valid = true;
            }
            total += &position.mv.cost;
        }
        total
    }

    /// Enumerate all kicks of the given length and return the first one with a strictly negative
    /// total cost, or `None` if no improving kick exists.
    pub fn select_first_improving(
        &self,
        input: &I,
        length: usize,
        st: &S,
    ) -> Option<(Kick<S, NE::Move, NE::CF>, CostStructure<NE::CF>)> {
        let mut kick = self.first_kick(input, length, st)?;
        let mut explored = 0u64;
        loop {
            let cost = self.evaluate(input, st, &mut kick, &[]);
            explored += 1;
            if cost.total < <NE::CF>::ZERO {
                trace!("improving kick of cost {} after {} kicks", cost, explored);
                return Some((kick, cost));
            }
            if !self.next_kick(input, st, &mut kick) {
                return None;
            }
        }
    }

    /// Enumerate all kicks of the given length and return the best one, breaking ties uniformly
    /// at random, or `None` if no kick exists.
    pub fn select_best(
        &self,
        input: &I,
        length: usize,
        st: &S,
        rng: &mut Prng,
    ) -> Option<(Kick<S, NE::Move, NE::CF>, CostStructure<NE::CF>)> {
        let mut kick = self.first_kick(input, length, st)?;
        let mut best: Option<(Kick<S, NE::Move, NE::CF>, CostStructure<NE::CF>)> = None;
        let mut number_of_bests: u32 = 0;
        loop {
            let cost = self.evaluate(input, st, &mut kick, &[]);
            match &best {
                None => {
                    best = Some((kick.clone(), cost));
                    number_of_bests = 1;
                }
                Some((_, incumbent)) if cost < *incumbent => {
                    best = Some((kick.clone(), cost));
                    number_of_bests = 1;
                }
                Some((_, incumbent)) if cost == *incumbent => {
                    if rng.uniform_int(0, number_of_bests) == 0 {
                        best = Some((kick.clone(), cost));
                    }
                    number_of_bests += 1;
                }
                Some(_) => {}
            }
            if !self.next_kick(input, st, &mut kick) {
                break;
            }
        }
        best
    }

    /// Generate a single random kick and return it with its total cost.
    pub fn select_random(
        &self,
        input: &I,
        length: usize,
        st: &S,
        rng: &mut Prng,
    ) -> Option<(Kick<S, NE::Move, NE::CF>, CostStructure<NE::CF>)> {
        let mut kick = self.sample_kick(input, length, st, rng)?;
        let cost = self.evaluate(input, st, &mut kick, &[]);
        Some((kick, cost))
    }

    /// Apply a kick: the state becomes the last intermediate state stored in the kick.
    pub fn make_kick(&self, st: &mut S, kick: &Kick<S, NE::Move, NE::CF>) {
        if let Some(last) = kick.final_state() {
            *st = last.clone();
        }
    }
}
