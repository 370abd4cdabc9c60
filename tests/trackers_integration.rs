//! Tracker integration tests: distance cache, road candidates, strengths

use hinterland_ai::core::types::{Coords, FlagId, GameTime, PlayerId, TeamId, WarehouseId};
use hinterland_ai::trackers::flag_distances::UNREACHABLE;
use hinterland_ai::trackers::{FlagCandidates, FlagWarehouseDistances, PlayersStrengths};

const SECOND: GameTime = 1_000;
const MINUTE: GameTime = 60 * SECOND;

#[test]
fn test_distance_cache_full_lifecycle() {
    let mut cache = FlagWarehouseDistances::new();
    let flag = FlagId(1);
    let warehouse = WarehouseId(1);

    // Fresh measurement accepted
    assert!(cache.set_distance(flag, 40, warehouse, 0));
    assert_eq!(cache.get_distance(flag, SECOND), 40);

    // Worse measurement inside the soft window rejected
    assert!(!cache.set_distance(flag, 45, warehouse, 20 * SECOND));
    assert_eq!(cache.get_distance(flag, 20 * SECOND), 40);

    // Better measurement accepted any time
    assert!(cache.set_distance(flag, 35, warehouse, 30 * SECOND));

    // After the soft expiry, worse measurements win too (the road layout
    // may genuinely have degraded)
    assert!(cache.set_distance(flag, 60, warehouse, 30 * SECOND + 61 * SECOND));

    // Unrefreshed entries eventually answer with the sentinel
    assert_eq!(
        cache.get_distance(flag, 30 * SECOND + 61 * SECOND + 3 * MINUTE),
        UNREACHABLE
    );
}

#[test]
fn test_road_prohibition_window() {
    let mut cache = FlagWarehouseDistances::new();
    let flag = FlagId(3);
    cache.set_distance(flag, 10, WarehouseId(1), 0);
    cache.set_road_built(flag, 0);
    // Prohibited for the next 60 simulated seconds, free afterwards
    assert!(cache.is_road_prohibited(flag, 0));
    assert!(cache.is_road_prohibited(flag, 59 * SECOND));
    assert!(!cache.is_road_prohibited(flag, 60 * SECOND));
}

#[test]
fn test_cleanup_removes_each_stale_entry_once() {
    let mut cache = FlagWarehouseDistances::new();
    for id in 0..5 {
        cache.set_distance(FlagId(id), 10 + id, WarehouseId(1), 0);
    }
    let late = 30 * MINUTE;
    let mut removals = 0;
    while cache.remove_old_flag(late) {
        removals += 1;
    }
    assert_eq!(removals, 5);
    assert!(!cache.remove_old_flag(late));
    assert_eq!(cache.count(), 0);
}

#[test]
fn test_candidates_winner_requires_feasible_road() {
    let mut candidates = FlagCandidates::new(10);
    candidates.add(FlagId(1), Coords::new(2, 0), false, 8, 2);
    candidates.add(FlagId(2), Coords::new(4, 0), false, 8, 4);
    candidates.set_road_distance(FlagId(1), 9);
    candidates.set_road_distance(FlagId(2), 9);
    // Neither candidate probed successfully: no winner at any threshold
    assert!(candidates.get_winner(i32::MIN).is_none());

    candidates.set_road_possible(FlagId(2), 3);
    let winner = candidates.get_winner(i32::MIN).expect("winner");
    assert_eq!(winner.flag, FlagId(2));
}

#[test]
fn test_candidates_spec_scenario_shorter_road_wins() {
    // Both flags: start distance 10, current road distance 5.
    // A's feasible road is 4, B's is 2 - B scores higher.
    let mut candidates = FlagCandidates::new(10);
    candidates.add(FlagId(1), Coords::new(1, 0), false, 10, 3);
    candidates.add(FlagId(2), Coords::new(2, 0), false, 10, 3);
    candidates.set_road_distance(FlagId(1), 5);
    candidates.set_road_distance(FlagId(2), 5);
    candidates.set_road_possible(FlagId(1), 4);
    candidates.set_road_possible(FlagId(2), 2);

    let a = candidates.iter().find(|c| c.flag == FlagId(1)).unwrap();
    let b = candidates.iter().find(|c| c.flag == FlagId(2)).unwrap();
    assert_eq!(a.score(10), (10 - 10) + (5 - 2 * 4));
    assert_eq!(b.score(10), (10 - 10) + (5 - 2 * 2));
    assert!(b.score(10) > a.score(10));

    let winner = candidates.get_winner(i32::MIN).expect("winner");
    assert_eq!(winner.flag, FlagId(2));
}

#[test]
fn test_candidates_score_formula_with_economy_bonus() {
    let mut candidates = FlagCandidates::new(25);
    candidates.add(FlagId(5), Coords::new(3, 3), true, 11, 4);
    candidates.set_road_distance(FlagId(5), 18);
    candidates.set_road_possible(FlagId(5), 6);
    let candidate = candidates.iter().next().unwrap();
    // different_economy*2000 + (start - cand) + (road - 2*possible)
    assert_eq!(candidate.score(25), 2000 + (25 - 11) + (18 - 12));
}

#[test]
fn test_strength_history_and_gating() {
    let me = PlayerId(1);
    let foe = PlayerId(2);
    let friend = PlayerId(3);
    let mut strengths = PlayersStrengths::new();

    strengths.add(me, TeamId(1), 200, 80, 0, 0);
    strengths.add(friend, TeamId(1), 100, 50, 1, 0);
    strengths.add(foe, TeamId::NONE, 220, 90, 2, 0);
    strengths.recalculate_team_power();

    // me: 200 + (300-200)/3 = 233; foe: 220. 233*100 < 220*115 -> not enough
    assert!(!strengths.strong_enough(me));

    // A power spike 16 minutes later rotates history and flips the gate
    strengths.add(me, TeamId(1), 400, 95, 0, 16 * MINUTE);
    strengths.add(friend, TeamId(1), 100, 50, 1, 16 * MINUTE);
    strengths.add(foe, TeamId::NONE, 220, 90, 2, 16 * MINUTE);
    strengths.recalculate_team_power();
    assert!(strengths.strong_enough(me));
    assert_eq!(strengths.old_player_power(me), 200);
    assert_eq!(strengths.old_player_land(me), 80);

    // Land starvation compares against non-teammates only
    assert_eq!(strengths.best_enemy_land(me), 90);
}
