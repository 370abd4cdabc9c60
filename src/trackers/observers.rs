//! Per-site and per-ship bookkeeping records
//!
//! Observers avoid re-deriving facts every tick: one record per owned site,
//! enemy site or ship, created on gain/first observation and destroyed on
//! loss. They are plain data grouped into per-concern aggregates so each
//! decision routine only borrows the state it actually reads.

use std::collections::VecDeque;

use ahash::AHashMap;

use crate::core::types::{BuildingId, BuildingTypeId, Coords, FlagId, GameTime, PlayerId, ShipId};
use crate::game::buildings::BuildingDescr;

/// Recent ship positions kept for revisit detection
const SHIP_TRAIL_LEN: usize = 20;

/// Per-type construction counters
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildingCounts {
    pub built: u32,
    pub under_construction: u32,
    pub unoccupied: u32,
}

impl BuildingCounts {
    pub fn total(&self) -> u32 {
        self.built + self.under_construction
    }
}

/// One owned military site
#[derive(Debug, Clone)]
pub struct MilitarySiteObserver {
    pub id: BuildingId,
    pub coords: Coords,
    pub flag: FlagId,
    pub built_time: GameTime,
    /// Last capacity change; sizing decisions rate-limit on this
    pub last_change: GameTime,
    pub capacity: u32,
}

/// One owned production site
#[derive(Debug, Clone)]
pub struct ProductionSiteObserver {
    pub id: BuildingId,
    pub type_id: BuildingTypeId,
    pub coords: Coords,
    pub flag: FlagId,
    pub built_time: GameTime,
    /// Set when the site first reported resource exhaustion
    pub no_resources_since: Option<GameTime>,
    /// Last known productivity percentage
    pub stats_pct: u8,
    pub is_mine: bool,
    /// Last upgrade/priority adjustment; upkeep rate-limits on this
    pub last_tweak: Option<GameTime>,
}

/// One owned warehouse (head or port)
#[derive(Debug, Clone)]
pub struct WarehouseObserver {
    pub id: BuildingId,
    pub coords: Coords,
    pub flag: FlagId,
    pub built_time: GameTime,
    pub is_port: bool,
}

/// One owned training site
#[derive(Debug, Clone)]
pub struct TrainingSiteObserver {
    pub id: BuildingId,
    pub type_id: BuildingTypeId,
    pub coords: Coords,
    pub built_time: GameTime,
    pub capacity: u32,
    pub stationed: u32,
    pub last_fill_request: Option<GameTime>,
}

/// One observed enemy site
#[derive(Debug, Clone)]
pub struct EnemySiteObserver {
    pub building: BuildingId,
    pub flag: FlagId,
    pub coords: Coords,
    pub owner: PlayerId,
    pub is_warehouse: bool,
    pub last_time_seen: GameTime,
    pub last_time_attacked: Option<GameTime>,
    pub last_tested: Option<GameTime>,
    /// Attack attractiveness from the last scoring pass
    pub score: i32,
}

/// Naval state machine of one ship
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShipState {
    Transport,
    ExpeditionScouting,
    ExpeditionWaiting,
    ExpeditionPortspaceFound,
}

/// One owned ship
#[derive(Debug, Clone)]
pub struct ShipObserver {
    pub id: ShipId,
    pub state: ShipState,
    pub expedition_start: Option<GameTime>,
    pub waiting_since: Option<GameTime>,
    /// Port space reported by the host, while in the found state
    pub portspace: Option<Coords>,
    /// Revisit detection kicked in; next scouting command escapes
    pub escape_mode: bool,
    trail: VecDeque<Coords>,
}

impl ShipObserver {
    pub fn new(id: ShipId) -> Self {
        Self {
            id,
            state: ShipState::Transport,
            expedition_start: None,
            waiting_since: None,
            portspace: None,
            escape_mode: false,
            trail: VecDeque::with_capacity(SHIP_TRAIL_LEN),
        }
    }

    /// Record the current position; true when the ship has been here during
    /// the recent trail - the expedition is going in circles.
    pub fn note_position(&mut self, coords: Coords) -> bool {
        let revisit = self.trail.contains(&coords);
        if self.trail.len() == SHIP_TRAIL_LEN {
            self.trail.pop_front();
        }
        self.trail.push_back(coords);
        revisit
    }

    /// Forget the trail, e.g. when an expedition starts or ends
    pub fn clear_trail(&mut self) {
        self.trail.clear();
        self.escape_mode = false;
    }
}

/// Construction-related engine state
#[derive(Debug, Default)]
pub struct ConstructionData {
    /// Host building catalog, fixed at game start
    pub building_types: Vec<BuildingDescr>,
    pub counts: AHashMap<BuildingTypeId, BuildingCounts>,
    pub productionsites: AHashMap<BuildingId, ProductionSiteObserver>,
    pub warehouses: AHashMap<BuildingId, WarehouseObserver>,
    /// Set once the basic-economy bootstrap set is complete; never unset
    pub basic_economy_established: bool,
}

impl ConstructionData {
    pub fn counts_for(&self, type_id: BuildingTypeId) -> BuildingCounts {
        self.counts.get(&type_id).copied().unwrap_or_default()
    }

    /// Basic-economy types still missing entirely
    pub fn missing_basic_types(&self) -> Vec<BuildingTypeId> {
        self.building_types
            .iter()
            .filter(|d| d.basic_economy && self.counts_for(d.type_id).total() == 0)
            .map(|d| d.type_id)
            .collect()
    }
}

/// Military-related engine state
#[derive(Debug, Default)]
pub struct MilitaryData {
    pub militarysites: AHashMap<BuildingId, MilitarySiteObserver>,
    pub enemy_sites: AHashMap<BuildingId, EnemySiteObserver>,
    pub soldiers_stationed: u32,
    pub soldiers_total: u32,
    pub last_attack_time: Option<GameTime>,
    /// Soldiers sent into attacks, cumulative; review input
    pub attackers_sent: u32,
}

impl MilitaryData {
    /// More garrison slots than soldiers to fill them?
    pub fn soldier_shortage(&self) -> bool {
        let demand: u32 = self.militarysites.values().map(|m| m.capacity).sum();
        self.soldiers_total < demand
    }

    pub fn attacked_recently(&self, now: GameTime, window: GameTime) -> bool {
        self.last_attack_time
            .is_some_and(|t| now.saturating_sub(t) <= window)
    }
}

/// Naval-related engine state
#[derive(Debug)]
pub struct NavalData {
    pub ships: AHashMap<ShipId, ShipObserver>,
    pub ports: u32,
    pub expeditions_started: u32,
    pub expeditions_cancelled: u32,
    /// Shrinks after every cancelled expedition
    pub expedition_search_radius: u16,
}

impl Default for NavalData {
    fn default() -> Self {
        Self {
            ships: AHashMap::new(),
            ports: 0,
            expeditions_started: 0,
            expeditions_cancelled: 0,
            expedition_search_radius: 40,
        }
    }
}

impl NavalData {
    /// Any ship currently on expedition?
    pub fn expedition_underway(&self) -> bool {
        self.ships.values().any(|s| {
            matches!(
                s.state,
                ShipState::ExpeditionScouting
                    | ShipState::ExpeditionWaiting
                    | ShipState::ExpeditionPortspaceFound
            )
        })
    }
}

/// Training-related engine state
#[derive(Debug, Default)]
pub struct TrainingData {
    pub trainingsites: AHashMap<BuildingId, TrainingSiteObserver>,
    /// Soldiers trained to completion, cumulative; review input
    pub trained_soldiers: u32,
}
