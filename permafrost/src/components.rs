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

//! # Cost components and their deltas
//!
//! The cost function is a sum of client-supplied [`CostComponent`]s, each either *hard*
//! (constraint violations) or *soft* (objective), each carrying a weight. Components are
//! registered once at the state manager, which fixes their index in the per-component vector of
//! every [`CostStructure`](crate::cost::CostStructure).
//!
//! For the incremental evaluation of moves, every neighborhood explorer carries a
//! [`DeltaRegistry`]: one entry per cost component, resolved at registration time into either an
//! *implemented* delta (a client [`DeltaCostComponent`] computing the variation directly) or an
//! *implicit* one (the framework simulates the move on a scratch state and takes the cost
//! difference). The registry batches at most one simulated move per evaluation, no matter how
//! many implicit entries participate.

use std::sync::Arc;

use crate::cost::CostValue;
use crate::state::StateManager;
use crate::Error;

/// A single component of the cost function, either hard or soft.
///
/// Clients implement `compute_cost` as a full evaluation of the component on a state. The
/// weighted value used in all aggregations is `weight() * compute_cost()`.
pub trait CostComponent<I, S, CF: CostValue>: Send + Sync {
    /// Full evaluation of this component on a state (unweighted).
    fn compute_cost(&self, input: &I, st: &S) -> CF;

    /// The weight of this component.
    fn weight(&self) -> CF;

    /// Whether this component counts as hard (violations) or soft (objective).
    fn is_hard(&self) -> bool;

    /// A symbolic name, used in logs and lookups.
    fn name(&self) -> &str;

    /// Weighted evaluation of this component on a state.
    fn cost(&self, input: &I, st: &S) -> CF {
        self.weight() * self.compute_cost(input, st)
    }

    /// Whether this component counts as soft.
    fn is_soft(&self) -> bool {
        !self.is_hard()
    }

    /// Render the violations of this component on a state, for diagnostics. The default
    /// implementation reports nothing.
    fn describe_violations(&self, _input: &I, _st: &S) -> Option<String> {
        None
    }
}

/// The variation of a single cost component caused by a move, computed incrementally.
///
/// The value returned by `delta_cost` is unweighted; the registry applies the weight of the
/// companion cost component.
pub trait DeltaCostComponent<I, S, M, CF: CostValue>: Send + Sync {
    /// Compute the variation of the companion component when applying `mv` to `st`, without
    /// simulating the move.
    fn delta_cost(&self, input: &I, st: &S, mv: &M) -> CF;
}

/// How the delta of a registered component is obtained.
pub enum DeltaSource<I, S, M, CF: CostValue> {
    /// An incremental delta implemented by the client.
    Implemented(Box<dyn DeltaCostComponent<I, S, M, CF>>),
    /// No incremental delta: simulate the move on a scratch state and take the weighted cost
    /// difference.
    Implicit,
}

/// A cost component attached to a neighborhood explorer, together with its resolved index and
/// its delta source.
pub struct RegisteredDelta<I, S, M, CF: CostValue> {
    pub(crate) component: Arc<dyn CostComponent<I, S, CF>>,
    pub(crate) index: usize,
    pub(crate) source: DeltaSource<I, S, M, CF>,
}

impl<I, S, M, CF: CostValue> RegisteredDelta<I, S, M, CF> {
    /// The companion cost component.
    pub fn component(&self) -> &Arc<dyn CostComponent<I, S, CF>> {
        &self.component
    }

    /// The index of the companion component in the state manager registration order.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether the delta of this entry is implemented incrementally.
    pub fn is_implemented(&self) -> bool {
        matches!(self.source, DeltaSource::Implemented(_))
    }
}

/// The set of delta cost components attached to one neighborhood explorer.
///
/// Built against a state manager, from which it captures the hard weight and the number of
/// registered cost components. Registering a component that the state manager does not know
/// fails with [`Error::ObjectNotFound`].
pub struct DeltaRegistry<I, S, M, CF: CostValue> {
    entries: Vec<RegisteredDelta<I, S, M, CF>>,
    hard_weight: CF,
    component_count: usize,
    implicit: bool,
}

impl<I, S: Clone, M, CF: CostValue> DeltaRegistry<I, S, M, CF> {
    /// Create an empty registry for an explorer, capturing the cost layout of the given state
    /// manager.
    pub fn new<SM>(sm: &SM) -> Self
    where
        SM: StateManager<I, S, CF> + ?Sized,
    {
        Self {
            entries: Vec::new(),
            hard_weight: sm.hard_weight(),
            component_count: sm.cost_components().len(),
            implicit: false,
        }
    }

    /// Attach an implemented delta for the given cost component.
    pub fn add_delta<SM>(
        &mut self,
        sm: &SM,
        component: Arc<dyn CostComponent<I, S, CF>>,
        delta: Box<dyn DeltaCostComponent<I, S, M, CF>>,
    ) -> Result<(), Error>
    where
        SM: StateManager<I, S, CF> + ?Sized,
    {
        let index = self.resolve(sm, &component)?;
        self.entries.push(RegisteredDelta {
            component,
            index,
            source: DeltaSource::Implemented(delta),
        });
        Ok(())
    }

    /// Attach a cost component without an implemented delta. Its variation will be computed by
    /// simulating the move once and taking the weighted cost difference. In general this is an
    /// inefficient way to evaluate a move and should be avoided where possible.
    pub fn add_implicit<SM>(
        &mut self,
        sm: &SM,
        component: Arc<dyn CostComponent<I, S, CF>>,
    ) -> Result<(), Error>
    where
        SM: StateManager<I, S, CF> + ?Sized,
    {
        let index = self.resolve(sm, &component)?;
        self.entries.push(RegisteredDelta { component, index, source: DeltaSource::Implicit });
        self.implicit = true;
        Ok(())
    }

    fn resolve<SM>(
        &self,
        sm: &SM,
        component: &Arc<dyn CostComponent<I, S, CF>>,
    ) -> Result<usize, Error>
    where
        SM: StateManager<I, S, CF> + ?Sized,
    {
        sm.component_index(component).ok_or_else(|| {
            Error::ObjectNotFound(format!(
                "cost component {} is not registered at the state manager",
                component.name()
            ))
        })
    }

    /// The registered entries, in attachment order.
    pub fn entries(&self) -> &[RegisteredDelta<I, S, M, CF>] {
        &self.entries
    }

    /// The hard weight captured from the state manager.
    pub fn hard_weight(&self) -> CF {
        self.hard_weight
    }

    /// The number of cost components registered at the state manager.
    pub fn component_count(&self) -> usize {
        self.component_count
    }

    /// Whether at least one entry has no implemented delta.
    pub fn has_implicit(&self) -> bool {
        self.implicit
    }

    /// The number of attached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry is attached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
