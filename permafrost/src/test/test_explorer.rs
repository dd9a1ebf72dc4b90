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

use assert_approx_eq::assert_approx_eq;

use super::fit::*;
use crate::neighborhoods::NeighborhoodExplorer;
use crate::rng::Prng;
use crate::state::StateManager;

fn enumerate(ne: &AssignExplorer, input: &FitInput, st: &Profile) -> Vec<Assign> {
    let mut moves = Vec::new();
    if let Some(mut mv) = ne.first_move(input, st) {
        loop {
            moves.push(mv.clone());
            if !ne.next_move(input, st, &mut mv) {
                break;
            }
        }
    }
    moves
}

#[test]
fn test_enumeration_completeness() {
    let sm = FitManager::soft_only();
    let ne = AssignExplorer::new(&sm);
    let st = Profile(vec![3, 1, 4, 1]);
    let moves = enumerate(&ne, &INPUT, &st);

    // one move per position and per value different from the current one
    assert_eq!(moves.len(), 4 * 9);
    for mv in &moves {
        assert!(mv.pos < INPUT.len);
        assert!((0..INPUT.domain).contains(&mv.value));
        assert_ne!(mv.value, st.0[mv.pos]);
    }
    // no move is visited twice
    for (i, a) in moves.iter().enumerate() {
        for b in moves.iter().skip(i + 1) {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn test_empty_neighborhood() {
    let input = FitInput { len: 3, domain: 1 };
    let sm = FitManager::soft_only();
    let ne = AssignExplorer::new(&sm);
    let st = Profile(vec![0, 0, 0]);
    let mut rng = Prng::seeded(3);

    assert!(ne.first_move(&input, &st).is_none());
    assert!(ne.random_move(&input, &st, &mut rng).is_none());
    let mut explored = 0;
    assert!(ne
        .select_first(&input, &st, &mut explored, &[], &mut rng, |_, _, _| true)
        .is_none());
    assert!(ne
        .select_best(&input, &st, &mut explored, &[], &mut rng, |_, _, _| true)
        .is_none());
    assert!(ne
        .random_first(&input, &st, 10, &mut explored, &[], &mut rng, |_, _, _| true)
        .is_none());
}

#[test]
fn test_delta_consistency_implemented() {
    let sm = FitManager::with_hard();
    let ne = AssignExplorer::new(&sm);
    for st in [Profile(vec![3, 1, 4, 1]), Profile(vec![0, 0, 0, 0]), Profile(vec![9, 9, 9, 9])] {
        let base_cost = sm.cost_function(&INPUT, &st);
        for mv in enumerate(&ne, &INPUT, &st) {
            let delta = ne.delta_cost_function_components(&INPUT, &st, &mv, &[]);
            let mut applied = st.clone();
            ne.make_move(&INPUT, &mut applied, &mv);
            let applied_cost = sm.cost_function(&INPUT, &applied);
            assert_eq!(delta.total, applied_cost.total - base_cost.total);
            assert_eq!(delta.hard, applied_cost.hard - base_cost.hard);
            assert_eq!(delta.soft, applied_cost.soft - base_cost.soft);
        }
    }
}

#[test]
fn test_implicit_deltas_match_implemented() {
    let sm = FitManager::with_hard();
    let implemented = AssignExplorer::new(&sm);
    let implicit = AssignExplorer::implicit(&sm);
    assert!(!implemented.deltas().has_implicit());
    assert!(implicit.deltas().has_implicit());

    let st = Profile(vec![5, 0, 7, 2]);
    for mv in enumerate(&implemented, &INPUT, &st) {
        let a = implemented.delta_cost_function_components(&INPUT, &st, &mv, &[]);
        let b = implicit.delta_cost_function_components(&INPUT, &st, &mv, &[]);
        assert_eq!(a.total, b.total);
        assert_eq!(a.hard, b.hard);
        assert_eq!(a.soft, b.soft);
        assert_eq!(a.components, b.components);
    }
}

#[test]
fn test_aggregate_coherence() {
    let sm = FitManager::with_hard();
    let ne = AssignExplorer::new(&sm);
    let st = Profile(vec![5, 0, 0, 0]);

    let cost = sm.cost_function(&INPUT, &st);
    assert_eq!(cost.total, 1000 * cost.hard + cost.soft);
    assert_eq!(cost.hard, cost.components[1]);
    assert_eq!(cost.soft, cost.components[0]);

    for mv in enumerate(&ne, &INPUT, &st) {
        let delta = ne.delta_cost_function_components(&INPUT, &st, &mv, &[]);
        assert_eq!(delta.total, 1000 * delta.hard + delta.soft);
        assert_eq!(delta.hard, delta.components[1]);
        assert_eq!(delta.soft, delta.components[0]);
    }
}

#[test]
fn test_select_first_returns_first_improving() {
    let sm = FitManager::soft_only();
    let ne = AssignExplorer::new(&sm);
    let st = Profile(vec![9, 9, 9, 9]);
    let mut rng = Prng::seeded(0);
    let mut explored = 0;

    let selected = ne
        .select_first(&INPUT, &st, &mut explored, &[], &mut rng, |_, cost, _| cost.total < 0)
        .expect("an improving move exists");
    // the enumeration starts at position 0 with value 0, which improves already
    assert_eq!(selected.mv, Assign { pos: 0, value: 0 });
    assert_eq!(selected.cost.total, -81);
    assert_eq!(explored, 1);
}

#[test]
fn test_select_best_picks_unique_best() {
    let sm = FitManager::soft_only();
    let ne = AssignExplorer::new(&sm);
    let st = Profile(vec![0, 0, 0, 0]);
    let mut rng = Prng::seeded(17);
    let mut explored = 0;

    let selected = ne
        .select_best(&INPUT, &st, &mut explored, &[], &mut rng, |_, cost, _| cost.total < 0)
        .expect("an improving move exists");
    // setting the last position to its target value is the unique best move
    assert_eq!(selected.mv, Assign { pos: 3, value: 3 });
    assert_eq!(selected.cost.total, -9);
    assert_eq!(explored, 36);
}

#[test]
fn test_select_best_is_deterministic_under_seed() {
    let sm = FitManager::soft_only();
    let ne = AssignExplorer::new(&sm);
    let st = Profile(vec![2, 2, 2, 2]);

    let mut explored = 0;
    let mut rng_a = Prng::seeded(99);
    let a = ne.select_best(&INPUT, &st, &mut explored, &[], &mut rng_a, |_, _, _| true);
    let mut rng_b = Prng::seeded(99);
    let b = ne.select_best(&INPUT, &st, &mut explored, &[], &mut rng_b, |_, _, _| true);

    let a = a.expect("neighborhood is not empty");
    let b = b.expect("neighborhood is not empty");
    assert_eq!(a.mv, b.mv);
    assert_eq!(a.cost.total, b.cost.total);
}

#[test]
fn test_random_first_respects_acceptor() {
    let sm = FitManager::soft_only();
    let ne = AssignExplorer::new(&sm);
    let st = Profile(vec![0, 0, 0, 0]);
    let mut rng = Prng::seeded(5);
    let mut explored = 0;

    let selected =
        ne.random_first(&INPUT, &st, 200, &mut explored, &[], &mut rng, |_, cost, _| {
            cost.total <= 0
        });
    let selected = selected.expect("an acceptable move is sampled within 200 draws");
    assert!(selected.cost.total <= 0);
    assert!(explored >= 1 && explored <= 200);
}

#[test]
fn test_random_best_finds_an_improving_move() {
    let sm = FitManager::soft_only();
    let ne = AssignExplorer::new(&sm);
    let st = Profile(vec![0, 0, 0, 0]);
    let mut rng = Prng::seeded(5);
    let mut explored = 0;

    let selected = ne.random_best(&INPUT, &st, 100, &mut explored, &[], &mut rng, |_, _, _| true);
    let selected = selected.expect("neighborhood is not empty");
    assert_eq!(explored, 100);
    // 9 of the 36 moves improve; 100 seeded draws surely hit one
    assert!(selected.cost.total < 0);
}

#[test]
fn test_weighted_delta() {
    let sm = FitManager::with_hard();
    let ne = AssignExplorer::new(&sm);
    let st = Profile(vec![5, 0, 0, 0]);
    // double the objective, ignore the constraint
    let weights = [2.0, 0.0];

    let mv = Assign { pos: 0, value: 0 };
    let delta = ne.delta_cost_function_components(&INPUT, &st, &mv, &weights);
    // soft delta is -25, hard delta is -1
    assert_eq!(delta.soft, -25);
    assert_eq!(delta.hard, -1);
    assert_approx_eq!(delta.weighted, -50.0);
}

#[test]
fn test_state_manager_helpers() {
    let sm = FitManager::with_hard();
    let st = Profile(vec![5, 0, 0, 0]);

    // violations and objective split the cost function along the hard flag
    assert_eq!(sm.violations(&INPUT, &st), 1);
    assert_eq!(sm.objective(&INPUT, &st), squared_error(&st));
    assert!(!sm.lower_bound_reached(&sm.cost_function(&INPUT, &st)));
    assert!(sm.lower_bound_reached(&sm.cost_function(&INPUT, &Profile(vec![0, 1, 2, 3]))));

    // sampling many states never returns something worse than a single draw
    let mut rng_single = Prng::seeded(7);
    let single = sm.random_state(&INPUT, &mut rng_single);
    let single_cost = sm.cost_function(&INPUT, &single);
    let mut rng_sampled = Prng::seeded(7);
    let (_, sampled_cost) = sm.sample_state(&INPUT, 50, &mut rng_sampled);
    assert!(sampled_cost.improves(&single_cost) || sampled_cost.total == single_cost.total);
}

#[test]
fn test_feasible_move_defaults_to_true() {
    let sm = FitManager::soft_only();
    let ne = AssignExplorer::new(&sm);
    let st = Profile(vec![1, 1, 1, 1]);
    assert!(ne.feasible_move(&INPUT, &st, &Assign { pos: 0, value: 3 }));
    assert_eq!(ne.modality(), 1);
}
