//! Road network improvement
//!
//! For one origin flag per pass: collect the flags reachable by air within
//! the search radius as candidates, probe current road distances and the
//! feasibility of a new road, and build the winning shortcut if its score
//! clears the genome threshold. Dead-end flags without buildings get their
//! last road removed.

use tracing::{debug, warn};

use crate::core::types::{FlagId, GameTime, PlayerId};
use crate::decision::slots::MN_ROAD_SCORE_THRESHOLD;
use crate::dna::ManagementData;
use crate::game::commands::{Command, CommandSink};
use crate::game::view::{GameView, RoadCheck};
use crate::trackers::flag_distances::UNREACHABLE;
use crate::trackers::{FlagCandidates, FlagWarehouseDistances};

/// Air-distance radius for candidate collection
const CANDIDATE_RADIUS: u16 = 15;
/// Expensive feasibility probes per pass
const MAX_PROBES: usize = 8;

/// Pick the origin flag for this pass, round-robin over the player's flags
///
/// `counter` is engine state advanced once per pass; host flag order is
/// stable, so the rotation is reproducible.
pub fn pick_origin_flag(view: &dyn GameView, me: PlayerId, counter: u32) -> Option<FlagId> {
    let flags = view.own_flags(me);
    if flags.is_empty() {
        return None;
    }
    Some(flags[counter as usize % flags.len()])
}

/// One road-improvement pass; returns true when a command was issued
pub fn improve_roads(
    dists: &mut FlagWarehouseDistances,
    dna: &ManagementData,
    view: &dyn GameView,
    sink: &mut dyn CommandSink,
    me: PlayerId,
    origin: FlagId,
    now: GameTime,
) -> bool {
    let Some(origin_coords) = view.flag_position(origin) else {
        warn!(flag = origin.0, "origin flag vanished before road pass");
        return false;
    };

    // Dead-end cleanup: a one-road flag without a building serves nothing
    if view.flag_road_count(origin) == Some(1) && !view.flag_has_building(origin) {
        debug!(flag = origin.0, "removing dead-end road");
        sink.submit(Command::DestroyRoad { flag: origin });
        return true;
    }

    if dists.is_road_prohibited(origin, now) {
        return false;
    }

    // Refresh the origin's warehouse distance while we are here
    if let Some((distance, warehouse)) = view.warehouse_distance(origin) {
        dists.set_distance(origin, distance, warehouse, now);
    }
    let start_dist = dists.get_distance(origin, now);
    if start_dist == UNREACHABLE {
        // Origin economy has no warehouse yet; a shortcut helps nothing
        return false;
    }

    let mut candidates = FlagCandidates::new(start_dist);
    for (flag, coords) in view.flags_in_radius(origin_coords, CANDIDATE_RADIUS) {
        if flag == origin {
            continue;
        }
        let different_economy = !view.same_economy(origin, flag);
        let dist_to_warehouse = dists.get_distance(flag, now);
        candidates.add(
            flag,
            coords,
            different_economy,
            dist_to_warehouse,
            origin_coords.air_distance(&coords),
        );
    }
    if candidates.count() == 0 {
        return false;
    }

    // Probe the nearest few candidates; feasibility checks walk the map
    candidates.sort_by_air_distance();
    let probe_flags: Vec<(FlagId, crate::core::types::Coords)> = candidates
        .iter()
        .take(MAX_PROBES)
        .map(|c| (c.flag, c.coords))
        .collect();
    for (flag, coords) in probe_flags {
        if let Some(distance) = view.road_distance(origin, flag) {
            candidates.set_road_distance(flag, distance);
        }
        if let Some(length) =
            view.possible_road_length(origin_coords, coords, RoadCheck::Normal)
        {
            candidates.set_road_possible(flag, length);
        }
    }

    let threshold = i32::from(dna.military_number(MN_ROAD_SCORE_THRESHOLD)).abs();
    let Some(winner) = candidates.get_winner(threshold) else {
        return false;
    };

    debug!(
        from = origin.0,
        to = winner.flag.0,
        score = winner.score(start_dist),
        "building shortcut road"
    );
    sink.submit(Command::BuildRoad {
        from: origin,
        to: winner.flag,
    });
    dists.set_road_built(origin, now);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AiConfig;
    use crate::core::types::{Coords, WarehouseId};
    use crate::game::commands::CommandLog;
    use crate::game::view::stub::StubView;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const ME: PlayerId = PlayerId(1);

    fn genome() -> ManagementData {
        let mut rng = StdRng::seed_from_u64(8);
        let mut dna = ManagementData::new(ME, &AiConfig::default());
        dna.new_dna_for_persistent(&mut rng);
        dna
    }

    fn view_with_two_flags() -> StubView {
        let mut view = StubView::default();
        view.flags.insert(FlagId(1), Coords::new(0, 0));
        view.flags.insert(FlagId(2), Coords::new(5, 0));
        view.own_flag_list = vec![FlagId(1), FlagId(2)];
        view.road_counts.insert(FlagId(1), 2);
        view.warehouse_dists.insert(FlagId(1), (20, WarehouseId(1)));
        view.warehouse_dists.insert(FlagId(2), (4, WarehouseId(1)));
        view.road_dists.insert((FlagId(1), FlagId(2)), 30);
        view.possible_roads
            .insert((Coords::new(0, 0), Coords::new(5, 0)), 6);
        view
    }

    #[test]
    fn test_round_robin_origin() {
        let view = view_with_two_flags();
        assert_eq!(pick_origin_flag(&view, ME, 0), Some(FlagId(1)));
        assert_eq!(pick_origin_flag(&view, ME, 1), Some(FlagId(2)));
        assert_eq!(pick_origin_flag(&view, ME, 2), Some(FlagId(1)));
    }

    #[test]
    fn test_vanished_origin_skips() {
        let view = StubView::default();
        let mut dists = FlagWarehouseDistances::new();
        let dna = genome();
        let mut log = CommandLog::new();
        assert!(!improve_roads(
            &mut dists,
            &dna,
            &view,
            &mut log,
            ME,
            FlagId(9),
            0
        ));
        assert!(log.commands.is_empty());
    }

    #[test]
    fn test_dead_end_road_removed() {
        let mut view = view_with_two_flags();
        view.road_counts.insert(FlagId(1), 1);
        let mut dists = FlagWarehouseDistances::new();
        let dna = genome();
        let mut log = CommandLog::new();
        assert!(improve_roads(
            &mut dists,
            &dna,
            &view,
            &mut log,
            ME,
            FlagId(1),
            0
        ));
        assert_eq!(log.commands[0], Command::DestroyRoad { flag: FlagId(1) });
    }

    #[test]
    fn test_shortcut_built_and_cooldown_set() {
        let view = view_with_two_flags();
        let mut dists = FlagWarehouseDistances::new();
        // Candidate's warehouse distance must be cached for the score
        dists.set_distance(FlagId(2), 4, WarehouseId(1), 0);
        let dna = genome();
        let mut log = CommandLog::new();
        // Score: (20-4) + (30 - 2*6) = 34, clears any threshold <= 33
        let threshold = i32::from(dna.military_number(MN_ROAD_SCORE_THRESHOLD)).abs();
        let built = improve_roads(&mut dists, &dna, &view, &mut log, ME, FlagId(1), 0);
        if threshold <= 34 {
            assert!(built);
            assert_eq!(
                log.commands[0],
                Command::BuildRoad {
                    from: FlagId(1),
                    to: FlagId(2)
                }
            );
            assert!(dists.is_road_prohibited(FlagId(1), 0));
        } else {
            assert!(!built);
        }
    }

    #[test]
    fn test_prohibited_origin_skips() {
        let view = view_with_two_flags();
        let mut dists = FlagWarehouseDistances::new();
        dists.set_road_built(FlagId(1), 0);
        let dna = genome();
        let mut log = CommandLog::new();
        assert!(!improve_roads(
            &mut dists,
            &dna,
            &view,
            &mut log,
            ME,
            FlagId(1),
            0
        ));
    }
}
