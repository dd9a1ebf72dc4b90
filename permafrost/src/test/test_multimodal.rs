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

use std::sync::Arc;

use super::fit::*;
use crate::neighborhoods::multimodal::{CompoundMove, ProductExplorer, UnionExplorer};
use crate::neighborhoods::NeighborhoodExplorer;
use crate::rng::Prng;
use crate::runners::{Runner, SteepestDescent};
use crate::Stopper;

fn union(sm: &Arc<FitManager>) -> UnionExplorer<FitInput, Profile, Step, i64> {
    UnionExplorer::new(&**sm)
        .add(Arc::new(IncExplorer::new(sm)), Step::Up, step_up)
        .add(Arc::new(DecExplorer::new(sm)), Step::Down, step_down)
}

fn product(sm: &Arc<FitManager>) -> ProductExplorer<FitInput, Profile, Step, i64> {
    ProductExplorer::new(&**sm)
        .add(Arc::new(IncExplorer::new(sm)), Step::Up, step_up)
        .add(Arc::new(DecExplorer::new(sm)), Step::Down, step_down)
}

fn enumerate<NE>(ne: &NE, st: &Profile) -> Vec<CompoundMove<Step>>
where
    NE: NeighborhoodExplorer<FitInput, Profile, Move = CompoundMove<Step>>,
{
    let mut moves = Vec::new();
    if let Some(mut mv) = ne.first_move(&INPUT, st) {
        loop {
            moves.push(mv.clone());
            if !ne.next_move(&INPUT, st, &mut mv) {
                break;
            }
        }
    }
    moves
}

fn position(step: &Step) -> usize {
    match step {
        Step::Up(mv) => mv.0,
        Step::Down(mv) => mv.0,
    }
}

#[test]
fn test_union_enumeration_has_one_active_component() {
    let sm = Arc::new(FitManager::soft_only());
    let ne = union(&sm);
    let st = Profile(vec![5, 5, 5, 5]);

    let moves = enumerate(&ne, &st);
    // four increments followed by four decrements
    assert_eq!(moves.len(), 8);
    for (i, mv) in moves.iter().enumerate() {
        assert_eq!(mv.active_count(), 1);
        let active = mv.active_index().unwrap();
        assert_eq!(active, if i < 4 { 0 } else { 1 });
    }
}

#[test]
fn test_union_skips_empty_components() {
    let sm = Arc::new(FitManager::soft_only());
    let ne = union(&sm);
    // no position can be incremented, so the first compound move comes from the second slot
    let st = Profile(vec![9, 9, 9, 9]);

    let first = ne.first_move(&INPUT, &st).unwrap();
    assert_eq!(first.active_index(), Some(1));
    assert_eq!(enumerate(&ne, &st).len(), 4);
}

#[test]
fn test_union_delta_and_make_delegate_to_active() {
    let sm = Arc::new(FitManager::soft_only());
    let ne = union(&sm);
    let st = Profile(vec![5, 5, 5, 5]);

    for mv in enumerate(&ne, &st) {
        let delta = ne.delta_cost_function_components(&INPUT, &st, &mv, &[]);
        let mut applied = st.clone();
        ne.make_move(&INPUT, &mut applied, &mv);
        let expected = squared_error(&applied) - squared_error(&st);
        assert_eq!(delta.total, expected);
    }
}

#[test]
fn test_union_random_respects_bias() {
    let sm = Arc::new(FitManager::soft_only());
    let ne = union(&sm).with_bias(vec![1.0, 0.0]).unwrap();
    let st = Profile(vec![5, 5, 5, 5]);
    let mut rng = Prng::seeded(41);

    for _ in 0..20 {
        let mv = ne.random_move(&INPUT, &st, &mut rng).unwrap();
        assert_eq!(mv.active_index(), Some(0));
    }
}

#[test]
fn test_union_modality_is_the_sum() {
    let sm = Arc::new(FitManager::soft_only());
    assert_eq!(union(&sm).modality(), 2);
}

#[test]
fn test_union_drives_a_runner() {
    let sm = Arc::new(FitManager::soft_only());
    let ne = Arc::new(union(&sm));
    let mut runner = Runner::new("sd-union", sm.clone(), ne, SteepestDescent::new())
        .with_rng(Prng::seeded(19))
        .with_max_iterations(100);

    let outcome =
        runner.go_from(&INPUT, Profile(vec![9, 9, 9, 9]), Stopper::new()).unwrap();
    assert_eq!(outcome.best_state, Profile(vec![0, 1, 2, 3]));
    assert_eq!(outcome.best_cost.total, 0);
}

#[test]
fn test_product_enumerates_related_pairs() {
    let sm = Arc::new(FitManager::soft_only());
    let ne = product(&sm).with_related(|a: &Step, b: &Step| position(a) != position(b));
    let st = Profile(vec![5, 5, 5, 5]);

    let moves = enumerate(&ne, &st);
    // four increments times three decrements at a different position
    assert_eq!(moves.len(), 12);
    for mv in &moves {
        assert_eq!(mv.active_count(), 2);
        let up = mv.component(0).unwrap();
        let down = mv.component(1).unwrap();
        assert!(matches!(up, Step::Up(_)));
        assert!(matches!(down, Step::Down(_)));
        assert_ne!(position(up), position(down));
    }
    // no compound move is visited twice
    for (i, a) in moves.iter().enumerate() {
        for b in moves.iter().skip(i + 1) {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn test_product_delta_chains_intermediate_states() {
    let sm = Arc::new(FitManager::soft_only());
    let ne = product(&sm).with_related(|a: &Step, b: &Step| position(a) != position(b));
    let st = Profile(vec![5, 5, 5, 5]);

    for mv in enumerate(&ne, &st) {
        let delta = ne.delta_cost_function_components(&INPUT, &st, &mv, &[]);
        let mut applied = st.clone();
        ne.make_move(&INPUT, &mut applied, &mv);
        assert_eq!(delta.total, squared_error(&applied) - squared_error(&st));
    }
}

#[test]
fn test_product_random_move_is_related_and_all_active() {
    let sm = Arc::new(FitManager::soft_only());
    let ne = product(&sm).with_related(|a: &Step, b: &Step| position(a) != position(b));
    let st = Profile(vec![5, 5, 5, 5]);
    let mut rng = Prng::seeded(29);

    for _ in 0..20 {
        let mv = ne.random_move(&INPUT, &st, &mut rng).unwrap();
        assert_eq!(mv.active_count(), 2);
        let up = mv.component(0).unwrap();
        let down = mv.component(1).unwrap();
        assert_ne!(position(up), position(down));
    }
}

#[test]
fn test_product_with_unsatisfiable_relatedness_is_empty() {
    let sm = Arc::new(FitManager::soft_only());
    let ne = product(&sm).with_related(|_: &Step, _: &Step| false);
    let st = Profile(vec![5, 5, 5, 5]);
    let mut rng = Prng::seeded(37);

    assert!(ne.first_move(&INPUT, &st).is_none());
    assert!(ne.random_move(&INPUT, &st, &mut rng).is_none());
}

#[test]
fn test_product_modality_is_the_tuple_size() {
    let sm = Arc::new(FitManager::soft_only());
    assert_eq!(product(&sm).modality(), 2);
}
