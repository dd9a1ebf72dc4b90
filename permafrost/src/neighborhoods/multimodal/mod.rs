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

//! # Multi-modal neighborhoods
//!
//! This module composes several base neighborhoods over the same state type into a single
//! compound one. Two compositions exist:
//!
//! - **[`UnionExplorer`]**: the set union of the base neighborhoods. A compound move has exactly
//!   one *active* component; random selection picks the component with configurable bias,
//!   enumeration walks the components in order, skipping empty ones.
//!
//! - **[`ProductExplorer`]**: the Cartesian product of the base neighborhoods. A compound move
//!   has *all* components active, and every adjacent pair of component moves must satisfy a
//!   client-supplied relatedness predicate. Enumeration is depth first with backtracking over a
//!   chain of intermediate states, and the compound delta is the sum of the per-level deltas,
//!   each evaluated against the state the level actually starts from.
//!
//! Since the base neighborhoods have different move types, the client defines a sum type `M`
//! covering all of them and registers each base explorer together with an injection
//! (`fn(BaseMove) -> M`, typically the enum variant constructor) and a projection
//! (`fn(&M) -> Option<&BaseMove>`, typically a one-arm match). The composers dispatch on the
//! component position, so a compound move is a vector of [`ActiveMove`] values, one per base.
//!
//! Both composers implement [`NeighborhoodExplorer`], so selection algorithms, runners and
//! kickers work on them transparently.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::cost::{CostStructure, CostValue};
use crate::rng::Prng;

use super::{Move, NeighborhoodExplorer};

mod union;
pub use union::UnionExplorer;

mod product;
pub use product::ProductExplorer;

/// Signature of the injection from a base move into the compound sum type.
pub type InjectFn<B, M> = fn(B) -> M;

/// Signature of the projection from the compound sum type back onto a base move.
pub type ProjectFn<B, M> = for<'a> fn(&'a M) -> Option<&'a B>;

/// A component move of a compound move, together with the flag telling whether the component is
/// exercising a move right now.
///
/// Inactive components may carry a stale move left over from the enumeration; only active
/// components take part in application and cost evaluation.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveMove<M> {
    /// The component move, if one has been generated for this component.
    pub mv: Option<M>,
    /// Whether this component is exercising a move.
    pub active: bool,
}

impl<M> ActiveMove<M> {
    /// An inactive component without a move.
    pub fn inactive() -> Self {
        Self { mv: None, active: false }
    }

    /// An active component exercising the given move.
    pub fn active(mv: M) -> Self {
        Self { mv: Some(mv), active: true }
    }
}

/// A move of a multi-modal neighborhood: one [`ActiveMove`] per base component.
#[derive(Clone, Debug, PartialEq)]
pub struct CompoundMove<M> {
    /// The per-component moves, indexed by component registration order.
    pub components: Vec<ActiveMove<M>>,
}

impl<M> CompoundMove<M> {
    /// A compound move with `n` inactive components.
    pub(crate) fn inactive(n: usize) -> Self {
        Self { components: (0..n).map(|_| ActiveMove::inactive()).collect() }
    }

    /// Build a compound move with every component active. Returns `None` if any component move
    /// is missing.
    pub(crate) fn from_active(moves: Vec<Option<M>>) -> Option<Self> {
        let components = moves
            .into_iter()
            .map(|m| m.map(ActiveMove::active))
            .collect::<Option<Vec<_>>>()?;
        Some(Self { components })
    }

    /// The index of the first active component.
    pub fn active_index(&self) -> Option<usize> {
        self.components.iter().position(|am| am.active)
    }

    /// The number of active components.
    pub fn active_count(&self) -> usize {
        self.components.iter().filter(|am| am.active).count()
    }

    /// The move of component `index`, if one has been generated.
    pub fn component(&self, index: usize) -> Option<&M> {
        self.components.get(index).and_then(|am| am.mv.as_ref())
    }
}

/// Object-safe capability set of one base neighborhood, with its move type erased behind the
/// compound sum type.
pub(crate) trait ErasedExplorer<I, S, M, CF: CostValue>: Send + Sync {
    fn random_move(&self, input: &I, st: &S, rng: &mut Prng) -> Option<M>;
    fn first_move(&self, input: &I, st: &S) -> Option<M>;
    fn next_move(&self, input: &I, st: &S, mv: &mut M) -> bool;
    /// Returns `false` if the move does not belong to this component.
    fn make_move(&self, input: &I, st: &mut S, mv: &M) -> bool;
    /// Returns `None` if the move does not belong to this component.
    fn delta_cost(&self, input: &I, st: &S, mv: &M, weights: &[f64])
        -> Option<CostStructure<CF>>;
    fn modality(&self) -> usize;
}

/// Adapter from a concrete base explorer to the erased capability set.
pub(crate) struct SlotAdapter<I, S, NE, M>
where
    S: Clone,
    NE: NeighborhoodExplorer<I, S>,
{
    ne: Arc<NE>,
    inject: InjectFn<NE::Move, M>,
    project: ProjectFn<NE::Move, M>,
    _marker: PhantomData<fn(&I, &S)>,
}

impl<I, S, NE, M> SlotAdapter<I, S, NE, M>
where
    S: Clone,
    NE: NeighborhoodExplorer<I, S>,
{
    pub(crate) fn new(
        ne: Arc<NE>,
        inject: InjectFn<NE::Move, M>,
        project: ProjectFn<NE::Move, M>,
    ) -> Self {
        Self { ne, inject, project, _marker: PhantomData }
    }
}

impl<I, S, NE, M> ErasedExplorer<I, S, M, NE::CF> for SlotAdapter<I, S, NE, M>
where
    S: Clone,
    NE: NeighborhoodExplorer<I, S>,
    M: Move,
{
    fn random_move(&self, input: &I, st: &S, rng: &mut Prng) -> Option<M> {
        self.ne.random_move(input, st, rng).map(self.inject)
    }

    fn first_move(&self, input: &I, st: &S) -> Option<M> {
        self.ne.first_move(input, st).map(self.inject)
    }

    fn next_move(&self, input: &I, st: &S, mv: &mut M) -> bool {
        let mut base = match (self.project)(mv) {
            Some(b) => b.clone(),
            None => return false,
        };
        if self.ne.next_move(input, st, &mut base) {
            *mv = (self.inject)(base);
            true
        } else {
            false
        }
    }

    fn make_move(&self, input: &I, st: &mut S, mv: &M) -> bool {
        match (self.project)(mv) {
            Some(base) => {
                self.ne.make_move(input, st, base);
                true
            }
            None => false,
        }
    }

    fn delta_cost(
        &self,
        input: &I,
        st: &S,
        mv: &M,
        weights: &[f64],
    ) -> Option<CostStructure<NE::CF>> {
        (self.project)(mv)
            .map(|base| self.ne.delta_cost_function_components(input, st, base, weights))
    }

    fn modality(&self) -> usize {
        self.ne.modality()
    }
}
