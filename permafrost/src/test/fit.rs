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

//! The sequence-fitting toy problem shared by the test suite.
//!
//! States are sequences `x` of `len` integers in `0..domain`; the (soft) objective is
//! `sum((x[i] - i)^2)`, minimized by the identity profile. The main neighborhood reassigns one
//! position to a different value; two single-step neighborhoods (increment and decrement one
//! position) serve the multi-modal tests.

use std::sync::Arc;

use lazy_static::lazy_static;

use crate::components::{CostComponent, DeltaCostComponent, DeltaRegistry};
use crate::neighborhoods::NeighborhoodExplorer;
use crate::rng::Prng;
use crate::state::StateManager;

lazy_static! {
    /// The instance used by most tests: four positions over the domain `0..10`.
    pub static ref INPUT: FitInput = FitInput { len: 4, domain: 10 };
}

/// Problem instance: sequence length and value domain.
pub struct FitInput {
    pub len: usize,
    pub domain: i64,
}

/// A state: one value per position.
#[derive(Clone, Debug, PartialEq)]
pub struct Profile(pub Vec<i64>);

/// Reassign one position to a different value.
#[derive(Clone, Debug, PartialEq)]
pub struct Assign {
    pub pos: usize,
    pub value: i64,
}

/// Increment one position by one.
#[derive(Clone, Debug, PartialEq)]
pub struct Inc(pub usize);

/// Decrement one position by one.
#[derive(Clone, Debug, PartialEq)]
pub struct Dec(pub usize);

/// Sum type over the single-step moves, for the multi-modal tests.
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    Up(Inc),
    Down(Dec),
}

pub fn step_up(step: &Step) -> Option<&Inc> {
    match step {
        Step::Up(mv) => Some(mv),
        _ => None,
    }
}

pub fn step_down(step: &Step) -> Option<&Dec> {
    match step {
        Step::Down(mv) => Some(mv),
        _ => None,
    }
}

/// The squared distance to the identity profile, directly.
pub fn squared_error(st: &Profile) -> i64 {
    st.0.iter().enumerate().map(|(i, x)| (x - i as i64) * (x - i as i64)).sum()
}

/// Soft cost component: `sum((x[i] - i)^2)`.
pub struct SquaredError;

impl CostComponent<FitInput, Profile, i64> for SquaredError {
    fn compute_cost(&self, _input: &FitInput, st: &Profile) -> i64 {
        squared_error(st)
    }

    fn weight(&self) -> i64 {
        1
    }

    fn is_hard(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "squared error"
    }
}

struct AssignSquaredErrorDelta;

impl DeltaCostComponent<FitInput, Profile, Assign, i64> for AssignSquaredErrorDelta {
    fn delta_cost(&self, _input: &FitInput, st: &Profile, mv: &Assign) -> i64 {
        let target = mv.pos as i64;
        let old = st.0[mv.pos];
        (mv.value - target) * (mv.value - target) - (old - target) * (old - target)
    }
}

/// Hard cost component: the first position must hold a zero.
pub struct PinFirst;

impl CostComponent<FitInput, Profile, i64> for PinFirst {
    fn compute_cost(&self, _input: &FitInput, st: &Profile) -> i64 {
        (st.0[0] != 0) as i64
    }

    fn weight(&self) -> i64 {
        1
    }

    fn is_hard(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "pin first"
    }
}

struct AssignPinFirstDelta;

impl DeltaCostComponent<FitInput, Profile, Assign, i64> for AssignPinFirstDelta {
    fn delta_cost(&self, _input: &FitInput, st: &Profile, mv: &Assign) -> i64 {
        if mv.pos != 0 {
            return 0;
        }
        (mv.value != 0) as i64 - (st.0[0] != 0) as i64
    }
}

/// State manager of the toy problem.
pub struct FitManager {
    components: Vec<Arc<dyn CostComponent<FitInput, Profile, i64>>>,
}

impl FitManager {
    /// A manager with the squared-error objective only.
    pub fn soft_only() -> Self {
        Self { components: vec![Arc::new(SquaredError)] }
    }

    /// A manager with the squared-error objective and the pin-first constraint.
    pub fn with_hard() -> Self {
        Self { components: vec![Arc::new(SquaredError), Arc::new(PinFirst)] }
    }

    /// Look up a registered component by name.
    pub fn component(&self, name: &str) -> Option<Arc<dyn CostComponent<FitInput, Profile, i64>>> {
        self.components.iter().find(|cc| cc.name() == name).cloned()
    }
}

impl StateManager<FitInput, Profile, i64> for FitManager {
    fn random_state(&self, input: &FitInput, rng: &mut Prng) -> Profile {
        Profile((0..input.len).map(|_| rng.uniform_int(0, input.domain - 1)).collect())
    }

    fn cost_components(&self) -> &[Arc<dyn CostComponent<FitInput, Profile, i64>>] {
        &self.components
    }
}

/// The one-position reassignment neighborhood, ordered by position and then by value.
pub struct AssignExplorer {
    deltas: DeltaRegistry<FitInput, Profile, Assign, i64>,
}

impl AssignExplorer {
    /// An explorer with implemented deltas for every component of the manager.
    pub fn new(sm: &FitManager) -> Self {
        let mut deltas = DeltaRegistry::new(sm);
        if let Some(cc) = sm.component("squared error") {
            deltas.add_delta(sm, cc, Box::new(AssignSquaredErrorDelta)).unwrap();
        }
        if let Some(cc) = sm.component("pin first") {
            deltas.add_delta(sm, cc, Box::new(AssignPinFirstDelta)).unwrap();
        }
        Self { deltas }
    }

    /// An explorer computing every delta by simulating the move.
    pub fn implicit(sm: &FitManager) -> Self {
        let mut deltas = DeltaRegistry::new(sm);
        for cc in sm.cost_components() {
            deltas.add_implicit(sm, cc.clone()).unwrap();
        }
        Self { deltas }
    }
}

impl NeighborhoodExplorer<FitInput, Profile> for AssignExplorer {
    type CF = i64;
    type Move = Assign;

    fn deltas(&self) -> &DeltaRegistry<FitInput, Profile, Assign, i64> {
        &self.deltas
    }

    fn random_move(&self, input: &FitInput, st: &Profile, rng: &mut Prng) -> Option<Assign> {
        if input.domain < 2 || input.len == 0 {
            return None;
        }
        let pos = rng.uniform_int(0, input.len - 1);
        let mut value = rng.uniform_int(0, input.domain - 2);
        if value >= st.0[pos] {
            value += 1;
        }
        Some(Assign { pos, value })
    }

    fn first_move(&self, input: &FitInput, st: &Profile) -> Option<Assign> {
        if input.domain < 2 || input.len == 0 {
            return None;
        }
        let value = if st.0[0] == 0 { 1 } else { 0 };
        Some(Assign { pos: 0, value })
    }

    fn next_move(&self, input: &FitInput, st: &Profile, mv: &mut Assign) -> bool {
        let mut pos = mv.pos;
        let mut value = mv.value + 1;
        loop {
            if value == st.0[pos] {
                value += 1;
            }
            if value >= input.domain {
                pos += 1;
                if pos >= input.len {
                    return false;
                }
                value = if st.0[pos] == 0 { 1 } else { 0 };
                continue;
            }
            mv.pos = pos;
            mv.value = value;
            return true;
        }
    }

    fn make_move(&self, _input: &FitInput, st: &mut Profile, mv: &Assign) {
        st.0[mv.pos] = mv.value;
    }
}

struct IncSquaredErrorDelta;

impl DeltaCostComponent<FitInput, Profile, Inc, i64> for IncSquaredErrorDelta {
    fn delta_cost(&self, _input: &FitInput, st: &Profile, mv: &Inc) -> i64 {
        2 * (st.0[mv.0] - mv.0 as i64) + 1
    }
}

/// The increment-one-position neighborhood.
pub struct IncExplorer {
    deltas: DeltaRegistry<FitInput, Profile, Inc, i64>,
}

impl IncExplorer {
    pub fn new(sm: &FitManager) -> Self {
        let mut deltas = DeltaRegistry::new(sm);
        if let Some(cc) = sm.component("squared error") {
            deltas.add_delta(sm, cc, Box::new(IncSquaredErrorDelta)).unwrap();
        }
        Self { deltas }
    }
}

impl NeighborhoodExplorer<FitInput, Profile> for IncExplorer {
    type CF = i64;
    type Move = Inc;

    fn deltas(&self) -> &DeltaRegistry<FitInput, Profile, Inc, i64> {
        &self.deltas
    }

    fn random_move(&self, input: &FitInput, st: &Profile, rng: &mut Prng) -> Option<Inc> {
        let valid: Vec<usize> =
            (0..input.len).filter(|p| st.0[*p] + 1 < input.domain).collect();
        if valid.is_empty() {
            return None;
        }
        Some(Inc(valid[rng.uniform_int(0, valid.len() - 1)]))
    }

    fn first_move(&self, input: &FitInput, st: &Profile) -> Option<Inc> {
        (0..input.len).find(|p| st.0[*p] + 1 < input.domain).map(Inc)
    }

    fn next_move(&self, input: &FitInput, st: &Profile, mv: &mut Inc) -> bool {
        match (mv.0 + 1..input.len).find(|p| st.0[*p] + 1 < input.domain) {
            Some(pos) => {
                mv.0 = pos;
                true
            }
            None => false,
        }
    }

    fn make_move(&self, _input: &FitInput, st: &mut Profile, mv: &Inc) {
        st.0[mv.0] += 1;
    }
}

struct DecSquaredErrorDelta;

impl DeltaCostComponent<FitInput, Profile, Dec, i64> for DecSquaredErrorDelta {
    fn delta_cost(&self, _input: &FitInput, st: &Profile, mv: &Dec) -> i64 {
        -2 * (st.0[mv.0] - mv.0 as i64) + 1
    }
}

/// The decrement-one-position neighborhood.
pub struct DecExplorer {
    deltas: DeltaRegistry<FitInput, Profile, Dec, i64>,
}

impl DecExplorer {
    pub fn new(sm: &FitManager) -> Self {
        let mut deltas = DeltaRegistry::new(sm);
        if let Some(cc) = sm.component("squared error") {
            deltas.add_delta(sm, cc, Box::new(DecSquaredErrorDelta)).unwrap();
        }
        Self { deltas }
    }
}

impl NeighborhoodExplorer<FitInput, Profile> for DecExplorer {
    type CF = i64;
    type Move = Dec;

    fn deltas(&self) -> &DeltaRegistry<FitInput, Profile, Dec, i64> {
        &self.deltas
    }

    fn random_move(&self, input: &FitInput, st: &Profile, rng: &mut Prng) -> Option<Dec> {
        let valid: Vec<usize> = (0..input.len).filter(|p| st.0[*p] > 0).collect();
        if valid.is_empty() {
            return None;
        }
        Some(Dec(valid[rng.uniform_int(0, valid.len() - 1)]))
    }

    fn first_move(&self, input: &FitInput, st: &Profile) -> Option<Dec> {
        (0..input.len).find(|p| st.0[*p] > 0).map(Dec)
    }

    fn next_move(&self, input: &FitInput, st: &Profile, mv: &mut Dec) -> bool {
        match (mv.0 + 1..input.len).find(|p| st.0[*p] > 0) {
            Some(pos) => {
                mv.0 = pos;
                true
            }
            None => false,
        }
    }

    fn make_move(&self, _input: &FitInput, st: &mut Profile, mv: &Dec) {
        st.0[mv.0] -= 1;
    }
}
