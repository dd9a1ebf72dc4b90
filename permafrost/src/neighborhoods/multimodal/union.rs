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

//! # Set-union neighborhood
//!
//! The `UnionExplorer` composes base neighborhoods into their set union: every compound move
//! exercises exactly one base component. Random move generation first selects the component,
//! with probability proportional to a configurable bias vector (uniform by default, the biases
//! are not assumed to sum up to one), and then delegates to it. Enumeration walks the components
//! in registration order and falls through to the next component when the current one is
//! exhausted, skipping empty ones.

use std::sync::Arc;

use crate::components::DeltaRegistry;
use crate::cost::{CostStructure, CostValue};
use crate::neighborhoods::{Move, NeighborhoodExplorer};
use crate::rng::Prng;
use crate::state::StateManager;
use crate::Error;

use super::{ActiveMove, CompoundMove, ErasedExplorer, InjectFn, ProjectFn, SlotAdapter};

/// The set union of several base neighborhoods over the same state type.
///
/// Base explorers are registered with [`add`](UnionExplorer::add), together with the injection
/// and projection between their move type and the compound sum type `M`.
pub struct UnionExplorer<I, S: Clone, M, CF: CostValue> {
    slots: Vec<Box<dyn ErasedExplorer<I, S, M, CF>>>,
    bias: Vec<f64>,
    registry: DeltaRegistry<I, S, CompoundMove<M>, CF>,
}

impl<I, S, M, CF> UnionExplorer<I, S, M, CF>
where
    I: 'static,
    S: Clone + 'static,
    M: Move + 'static,
    CF: CostValue,
{
    /// Create a union explorer without any component, capturing the cost layout of the given
    /// state manager.
    pub fn new<SM>(sm: &SM) -> Self
    where
        SM: StateManager<I, S, CF> + ?Sized,
    {
        Self { slots: Vec::new(), bias: Vec::new(), registry: DeltaRegistry::new(sm) }
    }

    /// Register a base explorer as the next component of the union.
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
        self.bias.push(1.0);
        self
    }

    /// Replace the uniform component bias used by random move generation. The biases do not need
    /// to sum up to one, but there must be one strictly positive entry per component.
    pub fn with_bias(mut self, bias: Vec<f64>) -> Result<Self, Error> {
        if bias.len() != self.slots.len() {
            return Err(Error::IncorrectParameterValue {
                parameter: "bias",
                reason: format!(
                    "expected one entry per component ({}), got {}",
                    self.slots.len(),
                    bias.len()
                ),
            });
        }
        if bias.iter().any(|b| *b < 0.0) || bias.iter().sum::<f64>() <= 0.0 {
            return Err(Error::IncorrectParameterValue {
                parameter: "bias",
                reason: "biases must be non-negative with a positive sum".to_string(),
            });
        }
        self.bias = bias;
        Ok(self)
    }

    /// The number of registered components.
    pub fn components(&self) -> usize {
        self.slots.len()
    }
}

impl<I, S, M, CF> NeighborhoodExplorer<I, S> for UnionExplorer<I, S, M, CF>
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
        if self.slots.is_empty() {
            return None;
        }
        // select a component with probability proportional to its bias
        let total: f64 = self.bias.iter().sum();
        let mut pick = rng.uniform_real(0.0, total);
        let mut selected = 0;
        while selected + 1 < self.slots.len() && pick > self.bias[selected] {
            pick -= self.bias[selected];
            selected += 1;
        }
        let mv = self.slots[selected].random_move(input, st, rng)?;
        let mut compound = CompoundMove::inactive(self.slots.len());
        compound.components[selected] = ActiveMove::active(mv);
        Some(compound)
    }

    fn first_move(&self, input: &I, st: &S) -> Option<CompoundMove<M>> {
        for (i, slot) in self.slots.iter().enumerate() {
            if let Some(mv) = slot.first_move(input, st) {
                let mut compound = CompoundMove::inactive(self.slots.len());
                compound.components[i] = ActiveMove::active(mv);
                return Some(compound);
            }
        }
        None
    }

    fn next_move(&self, input: &I, st: &S, mv: &mut CompoundMove<M>) -> bool {
        let k = match mv.active_index() {
            Some(k) => k,
            None => return false,
        };
        let advanced = match mv.components[k].mv.as_mut() {
            Some(m) => self.slots[k].next_move(input, st, m),
            None => false,
        };
        if advanced {
            return true;
        }
        // the active component is exhausted, fall through to the next non-empty one
        for j in k + 1..self.slots.len() {
            if let Some(first) = self.slots[j].first_move(input, st) {
                mv.components[k].active = false;
                mv.components[j] = ActiveMove::active(first);
                return true;
            }
        }
        false
    }

    fn make_move(&self, input: &I, st: &mut S, mv: &CompoundMove<M>) {
        if let Some(k) = mv.active_index() {
            if let Some(m) = mv.components[k].mv.as_ref() {
                let _ = self.slots[k].make_move(input, st, m);
            }
        }
    }

    fn modality(&self) -> usize {
        self.slots.iter().map(|slot| slot.modality()).sum()
    }

    fn delta_cost_function_components(
        &self,
        input: &I,
        st: &S,
        mv: &CompoundMove<M>,
        weights: &[f64],
    ) -> CostStructure<CF> {
        let n = self.registry.component_count();
        let k = match mv.active_index() {
            Some(k) => k,
            None => return CostStructure::infinity(n),
        };
        mv.components[k]
            .mv
            .as_ref()
            .and_then(|m| self.slots[k].delta_cost(input, st, m, weights))
            .unwrap_or_else(|| CostStructure::infinity(n))
    }
}
