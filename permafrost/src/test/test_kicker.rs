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
use crate::kickers::{Kick, Kicker};
use crate::rng::Prng;

fn small_input() -> FitInput {
    FitInput { len: 2, domain: 3 }
}

fn kicker(sm: &FitManager) -> Kicker<FitInput, Profile, AssignExplorer> {
    Kicker::new(Arc::new(AssignExplorer::new(sm)))
}

fn collect_kicks(
    kicker: &Kicker<FitInput, Profile, AssignExplorer>,
    input: &FitInput,
    length: usize,
    st: &Profile,
) -> Vec<Kick<Profile, Assign, i64>> {
    let mut kicks = Vec::new();
    if let Some(mut kick) = kicker.first_kick(input, length, st) {
        loop {
            kicks.push(kick.clone());
            if !kicker.next_kick(input, st, &mut kick) {
                break;
            }
        }
    }
    kicks
}

#[test]
fn test_kick_enumeration_is_complete() {
    let input = small_input();
    let sm = FitManager::soft_only();
    let kicker = kicker(&sm);
    let st = Profile(vec![0, 0]);

    // 4 moves per state, so 16 unrestricted kicks of length 2
    let kicks = collect_kicks(&kicker, &input, 2, &st);
    assert_eq!(kicks.len(), 16);

    // each kick stores the intermediate state produced at every position
    for kick in &kicks {
        let mut expected = st.clone();
        for position in kick.positions() {
            expected.0[position.mv.mv.pos] = position.mv.mv.value;
            assert_eq!(position.state, expected);
        }
    }
}

#[test]
fn test_kick_enumeration_respects_relatedness() {
    let input = small_input();
    let sm = FitManager::soft_only();
    let kicker = kicker(&sm).with_related(|a: &Assign, b: &Assign| a.pos != b.pos);
    let st = Profile(vec![0, 0]);

    // 4 first moves times the 2 moves of the other position
    let kicks = collect_kicks(&kicker, &input, 2, &st);
    assert_eq!(kicks.len(), 8);
    for kick in &kicks {
        assert_ne!(kick.positions()[0].mv.mv.pos, kick.positions()[1].mv.mv.pos);
    }
}

#[test]
fn test_evaluate_fills_costs_lazily_and_consistently() {
    let sm = FitManager::soft_only();
    let kicker = kicker(&sm);
    let st = Profile(vec![9, 9, 9, 9]);

    let mut kick = kicker.first_kick(&INPUT, 3, &st).unwrap();
    assert!(kick.positions().iter().all(|p| !p.mv.is_valid));

    let total = kicker.evaluate(&INPUT, &st, &mut kick, &[]);
    assert!(kick.positions().iter().all(|p| p.mv.is_valid));

    // the summed per-position deltas equal the full cost difference
    let final_state = kick.final_state().unwrap();
    assert_eq!(total.total, squared_error(final_state) - squared_error(&st));
}

#[test]
fn test_no_improving_kick_from_the_optimum() {
    let sm = FitManager::soft_only();
    let kicker = kicker(&sm);
    let optimum = Profile(vec![0, 1, 2, 3]);
    let input = FitInput { len: 4, domain: 4 };

    assert!(kicker.select_first_improving(&input, 2, &optimum).is_none());
}

#[test]
fn test_first_improving_kick_applies_to_the_last_state() {
    let sm = Arc::new(FitManager::soft_only());
    let kicker = kicker(&sm);
    let st = Profile(vec![9, 9, 9, 9]);

    let (kick, cost) = kicker
        .select_first_improving(&INPUT, 3, &st)
        .expect("improving kicks exist far from the optimum");
    assert!(cost.total < 0);
    assert_eq!(kick.len(), 3);

    // applying the kick replays its moves onto the start state
    let mut current = st.clone();
    kicker.make_kick(&mut current, &kick);
    let mut replayed = st.clone();
    for position in kick.positions() {
        replayed.0[position.mv.mv.pos] = position.mv.mv.value;
    }
    assert_eq!(current, replayed);
    assert_eq!(squared_error(&current), squared_error(&st) + cost.total);
    // the caller's start state is never touched by the kicker
    assert_eq!(st, Profile(vec![9, 9, 9, 9]));
}

#[test]
fn test_select_best_kick_of_length_one_is_the_best_move() {
    let sm = FitManager::soft_only();
    let kicker = kicker(&sm);
    let st = Profile(vec![9, 9, 9, 9]);
    let mut rng = Prng::seeded(43);

    let (kick, cost) = kicker.select_best(&INPUT, 1, &st, &mut rng).unwrap();
    // assigning 0 at position 0 sheds 81, the largest possible gain
    assert_eq!(cost.total, -81);
    assert_eq!(kick.positions()[0].mv.mv, Assign { pos: 0, value: 0 });
}

#[test]
fn test_sample_kick_is_consistent() {
    let sm = FitManager::soft_only();
    let kicker = kicker(&sm).with_related(|a: &Assign, b: &Assign| a.pos != b.pos);
    let st = Profile(vec![5, 5, 5, 5]);
    let mut rng = Prng::seeded(47);

    for _ in 0..10 {
        let mut kick = kicker.sample_kick(&INPUT, 2, &st, &mut rng).unwrap();
        assert_ne!(kick.positions()[0].mv.mv.pos, kick.positions()[1].mv.mv.pos);
        let total = kicker.evaluate(&INPUT, &st, &mut kick, &[]);
        let final_state = kick.final_state().unwrap();
        assert_eq!(total.total, squared_error(final_state) - squared_error(&st));
    }
}

#[test]
fn test_select_random_kick() {
    let sm = FitManager::soft_only();
    let kicker = kicker(&sm);
    let st = Profile(vec![3, 3, 3, 3]);
    let mut rng = Prng::seeded(53);

    let (kick, cost) = kicker.select_random(&INPUT, 2, &st, &mut rng).unwrap();
    let final_state = kick.final_state().unwrap();
    assert_eq!(cost.total, squared_error(final_state) - squared_error(&st));
}

#[test]
fn test_kicker_with_unsatisfiable_relatedness() {
    let input = small_input();
    let sm = FitManager::soft_only();
    let kicker = kicker(&sm).with_related(|_: &Assign, _: &Assign| false);
    let st = Profile(vec![0, 0]);
    let mut rng = Prng::seeded(59);

    assert!(kicker.first_kick(&input, 2, &st).is_none());
    assert!(kicker.sample_kick(&input, 2, &st, &mut rng).is_none());
    // kicks of length one have no adjacent pair to relate
    assert!(kicker.first_kick(&input, 1, &st).is_some());
}
