//! Naval decisions: expeditions and the per-ship state machine
//!
//! Each ship is either ferrying (`Transport`) or somewhere in the expedition
//! cycle (scouting, waiting for a command, port space found). Expeditions
//! are bounded in duration; blowing the bound cancels the expedition and
//! halves the search radius for future attempts - thoroughness is traded
//! for speed as the game drags on.

use tracing::{debug, warn};

use crate::core::config::DifficultyProfile;
use crate::core::types::{BuildingId, Direction, GameTime, PlayerId, ShipId, SECOND};
use crate::decision::signals::{flip, SignalBank};
use crate::decision::slots::{F_EXPEDITION, MN_EXPEDITION_URGE};
use crate::dna::ManagementData;
use crate::game::commands::{Command, CommandSink};
use crate::game::coordinator::CoordinatorHandle;
use crate::game::view::GameView;
use crate::trackers::observers::{ConstructionData, NavalData, ShipState};

/// A waiting expedition gets a new scouting direction after this long
const WAITING_PATIENCE: GameTime = 30 * SECOND;
/// The search radius never shrinks below this
const MIN_SEARCH_RADIUS: u16 = 10;

/// Direction with the most open water ahead; ties break in `Direction::ALL`
/// order for reproducibility.
fn best_scout_direction(view: &dyn GameView, coords: crate::core::types::Coords) -> Direction {
    let mut best = Direction::ALL[0];
    let mut best_openness = 0u32;
    for direction in Direction::ALL {
        let openness = view.water_openness(coords, direction);
        if openness > best_openness {
            best = direction;
            best_openness = openness;
        }
    }
    best
}

/// One pass over ports and ships
#[allow(clippy::too_many_arguments)]
pub fn check_ships(
    naval: &mut NavalData,
    construction: &ConstructionData,
    dna: &ManagementData,
    profile: &DifficultyProfile,
    coordinator: &CoordinatorHandle,
    view: &dyn GameView,
    sink: &mut dyn CommandSink,
    _me: PlayerId,
    now: GameTime,
) {
    if !coordinator.borrow_mut().map_allows_seafaring(view, now) {
        return;
    }

    // Port accounting should reconcile with the warehouse observers; a
    // mismatch is logged and life goes on.
    let ports_seen = construction
        .warehouses
        .values()
        .filter(|w| w.is_port)
        .count() as u32;
    if ports_seen != naval.ports {
        warn!(
            counted = ports_seen,
            tracked = naval.ports,
            "port count mismatch, adopting observer count"
        );
        naval.ports = ports_seen;
    }

    maybe_start_expedition(naval, construction, dna, sink, now);

    let mut ship_ids: Vec<ShipId> = naval.ships.keys().copied().collect();
    ship_ids.sort_by_key(|id| id.0);

    for id in ship_ids {
        let Some(state) = naval.ships.get(&id).map(|s| s.state) else {
            continue;
        };
        match state {
            ShipState::Transport => {}
            ShipState::ExpeditionScouting => {
                handle_scouting(naval, profile, view, sink, id, now);
            }
            ShipState::ExpeditionWaiting => {
                handle_waiting(naval, view, sink, id, now);
            }
            ShipState::ExpeditionPortspaceFound => {
                debug!(ship = id.0, "port space found, founding port");
                sink.submit(Command::ExpeditionConstructPort { ship: id });
            }
        }
    }
}

/// Start a new expedition when the genome says so and none is under way
fn maybe_start_expedition(
    naval: &mut NavalData,
    construction: &ConstructionData,
    dna: &ManagementData,
    sink: &mut dyn CommandSink,
    now: GameTime,
) {
    if naval.ports == 0 || naval.ships.is_empty() || naval.expedition_underway() {
        return;
    }

    let mut bank = SignalBank::new();
    bank.set(0, dna.military_number(MN_EXPEDITION_URGE) / 10);
    bank.set(1, flip(naval.expeditions_cancelled > 0, -5));
    bank.set(2, flip(naval.ships.len() > 1, 4));
    bank.set(3, flip(construction.basic_economy_established, 5));

    if bank.masked_sum(&[dna.f_neuron(F_EXPEDITION)]) <= 0 {
        return;
    }

    let mut port_ids: Vec<BuildingId> = construction
        .warehouses
        .values()
        .filter(|w| w.is_port)
        .map(|w| w.id)
        .collect();
    port_ids.sort_by_key(|id| id.0);
    let Some(port) = port_ids.first() else {
        return;
    };

    debug!(port = port.0, time = now, "starting naval expedition");
    sink.submit(Command::StartExpedition { port: *port });
}

fn handle_scouting(
    naval: &mut NavalData,
    profile: &DifficultyProfile,
    view: &dyn GameView,
    sink: &mut dyn CommandSink,
    id: ShipId,
    now: GameTime,
) {
    let Some(ship) = naval.ships.get_mut(&id) else {
        return;
    };

    let Some(start) = ship.expedition_start else {
        warn!(ship = id.0, "scouting ship without expedition start time");
        return;
    };
    if now.saturating_sub(start) > profile.expedition_max_duration {
        debug!(ship = id.0, "expedition over time budget, cancelling");
        sink.submit(Command::CancelExpedition { ship: id });
        naval.expeditions_cancelled += 1;
        naval.expedition_search_radius =
            (naval.expedition_search_radius / 2).max(MIN_SEARCH_RADIUS);
        return;
    }

    let Some(position) = view.ship_position(id) else {
        // Raced with the simulation; try again next pass
        warn!(ship = id.0, "ship position unavailable, skipping");
        return;
    };

    if ship.note_position(position) && !ship.escape_mode {
        // Going in circles: redirect toward the most open water
        ship.escape_mode = true;
        let direction = best_scout_direction(view, position);
        debug!(ship = id.0, ?direction, "revisit detected, escaping");
        sink.submit(Command::ExpeditionScout {
            ship: id,
            direction,
        });
    }
}

fn handle_waiting(
    naval: &mut NavalData,
    view: &dyn GameView,
    sink: &mut dyn CommandSink,
    id: ShipId,
    now: GameTime,
) {
    let Some(ship) = naval.ships.get_mut(&id) else {
        return;
    };
    let waited = ship
        .waiting_since
        .map(|t| now.saturating_sub(t))
        .unwrap_or(0);
    if waited < WAITING_PATIENCE {
        return;
    }
    let Some(position) = view.ship_position(id) else {
        warn!(ship = id.0, "waiting ship position unavailable, skipping");
        return;
    };
    let direction = best_scout_direction(view, position);
    debug!(ship = id.0, ?direction, "waiting expedition, sending scout order");
    sink.submit(Command::ExpeditionScout {
        ship: id,
        direction,
    });
    ship.waiting_since = Some(now);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{AiConfig, DifficultyLevel};
    use crate::core::types::Coords;
    use crate::game::commands::CommandLog;
    use crate::game::coordinator::GameCoordinator;
    use crate::game::view::stub::StubView;
    use crate::trackers::observers::ShipObserver;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const ME: PlayerId = PlayerId(1);

    fn genome() -> ManagementData {
        let mut rng = StdRng::seed_from_u64(30);
        let mut dna = ManagementData::new(ME, &AiConfig::default());
        dna.new_dna_for_persistent(&mut rng);
        dna
    }

    fn scouting_ship(id: u32, start: GameTime) -> ShipObserver {
        let mut ship = ShipObserver::new(ShipId(id));
        ship.state = ShipState::ExpeditionScouting;
        ship.expedition_start = Some(start);
        ship
    }

    #[test]
    fn test_landlocked_map_skips_everything() {
        let mut naval = NavalData::default();
        naval.ships.insert(ShipId(1), scouting_ship(1, 0));
        let construction = ConstructionData::default();
        let dna = genome();
        let profile = DifficultyLevel::Normal.profile();
        let coordinator = GameCoordinator::new_handle();
        let view = StubView::default(); // seafaring = false
        let mut log = CommandLog::new();
        check_ships(
            &mut naval,
            &construction,
            &dna,
            &profile,
            &coordinator,
            &view,
            &mut log,
            ME,
            0,
        );
        assert!(log.commands.is_empty());
    }

    #[test]
    fn test_overlong_expedition_cancelled_and_radius_halved() {
        let mut naval = NavalData::default();
        naval.ships.insert(ShipId(1), scouting_ship(1, 0));
        let radius_before = naval.expedition_search_radius;
        let construction = ConstructionData::default();
        let dna = genome();
        let profile = DifficultyLevel::Normal.profile();
        let coordinator = GameCoordinator::new_handle();
        let mut view = StubView::default();
        view.seafaring = true;
        let mut log = CommandLog::new();
        check_ships(
            &mut naval,
            &construction,
            &dna,
            &profile,
            &coordinator,
            &view,
            &mut log,
            ME,
            profile.expedition_max_duration + 1,
        );
        assert_eq!(
            log.commands[0],
            Command::CancelExpedition { ship: ShipId(1) }
        );
        assert_eq!(naval.expeditions_cancelled, 1);
        assert_eq!(naval.expedition_search_radius, radius_before / 2);
    }

    #[test]
    fn test_radius_never_below_floor() {
        let mut naval = NavalData::default();
        naval.expedition_search_radius = MIN_SEARCH_RADIUS + 1;
        naval.ships.insert(ShipId(1), scouting_ship(1, 0));
        let construction = ConstructionData::default();
        let dna = genome();
        let profile = DifficultyLevel::Normal.profile();
        let coordinator = GameCoordinator::new_handle();
        let mut view = StubView::default();
        view.seafaring = true;
        let mut log = CommandLog::new();
        check_ships(
            &mut naval,
            &construction,
            &dna,
            &profile,
            &coordinator,
            &view,
            &mut log,
            ME,
            profile.expedition_max_duration + 1,
        );
        assert_eq!(naval.expedition_search_radius, MIN_SEARCH_RADIUS);
    }

    #[test]
    fn test_revisit_triggers_escape_scout() {
        let mut naval = NavalData::default();
        let mut ship = scouting_ship(1, 0);
        // Trail already contains the position the view will report
        ship.note_position(Coords::new(3, 3));
        naval.ships.insert(ShipId(1), ship);
        let construction = ConstructionData::default();
        let dna = genome();
        let profile = DifficultyLevel::Normal.profile();
        let coordinator = GameCoordinator::new_handle();
        let mut view = StubView::default();
        view.seafaring = true;
        view.ship_positions.insert(ShipId(1), Coords::new(3, 3));
        view.openness.insert(Direction::West, 50);
        let mut log = CommandLog::new();
        check_ships(
            &mut naval,
            &construction,
            &dna,
            &profile,
            &coordinator,
            &view,
            &mut log,
            ME,
            SECOND,
        );
        assert_eq!(
            log.commands[0],
            Command::ExpeditionScout {
                ship: ShipId(1),
                direction: Direction::West
            }
        );
        assert!(naval.ships.get(&ShipId(1)).unwrap().escape_mode);
    }

    #[test]
    fn test_portspace_found_founds_port() {
        let mut naval = NavalData::default();
        let mut ship = ShipObserver::new(ShipId(2));
        ship.state = ShipState::ExpeditionPortspaceFound;
        naval.ships.insert(ShipId(2), ship);
        let construction = ConstructionData::default();
        let dna = genome();
        let profile = DifficultyLevel::Normal.profile();
        let coordinator = GameCoordinator::new_handle();
        let mut view = StubView::default();
        view.seafaring = true;
        let mut log = CommandLog::new();
        check_ships(
            &mut naval,
            &construction,
            &dna,
            &profile,
            &coordinator,
            &view,
            &mut log,
            ME,
            SECOND,
        );
        assert_eq!(
            log.commands[0],
            Command::ExpeditionConstructPort { ship: ShipId(2) }
        );
    }
}
