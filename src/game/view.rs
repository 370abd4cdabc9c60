//! Read-only view of the host simulation
//!
//! The engine's filtered window into map, economy and player state. Every
//! query answers from the *current* simulated tick; the engine caches what it
//! needs and re-derives the rest on later ticks. Implementations must be
//! deterministic functions of simulation state - no wall clock, no ambient
//! randomness.

use crate::core::types::{
    BuildingId, Coords, Direction, FlagId, GameTime, PlayerId, ResourceId, ShipId, TeamId,
    WarehouseId,
};
use crate::game::buildings::BuildingSize;

/// Step-acceptance predicate for road feasibility queries
///
/// A closed set rather than a closure so the trait stays object-safe and the
/// host can map each variant onto its own pathfinder checkers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoadCheck {
    /// Normal road rules on own territory
    Normal,
    /// Also accept steps through unowned land (border expansion roads)
    AllowUnowned,
}

/// Aggregated terrain/military facts around one coordinate
///
/// Computed by the host in one bounded area scan; the engine copies the
/// counters into its field caches. Keeping this a plain aggregate means one
/// query instead of a dozen per-field round trips.
#[derive(Debug, Clone, Copy, Default)]
pub struct AreaSummary {
    pub unowned_land: u16,
    pub unowned_mine_spots: u16,
    pub trees: u16,
    pub rocks: u16,
    pub water: u16,
    pub fish: u16,
    pub critters: u16,
    /// Any enemy building within the scanned area
    pub enemy_nearby: bool,
    /// Enemy-reachable by land (not cut off by water/cliffs)
    pub enemy_accessible: bool,
    pub enemy_power: u16,
    pub own_military_capacity: u16,
    pub own_military_stationed: u16,
    pub own_military_presence: u16,
    pub producers: u16,
    pub consumers: u16,
    pub space_consumers: u16,
    pub near_border: bool,
    /// Largest building plot the coordinate currently supports
    pub buildcap: BuildingSize,
}

/// Read-only query surface of the host simulation
pub trait GameView {
    /// Current simulated time
    fn time(&self) -> GameTime;

    /// All player slots currently in the game
    fn players(&self) -> Vec<PlayerId>;

    fn player_team(&self, player: PlayerId) -> TeamId;

    /// Owned-field count, the land statistic
    fn player_land(&self, player: PlayerId) -> u32;

    /// Military power statistic (host-defined soldier valuation)
    fn player_power(&self, player: PlayerId) -> u32;

    fn player_casualties(&self, player: PlayerId) -> u32;

    /// Whether `player` currently owns the coordinate
    fn owns_field(&self, player: PlayerId, coords: Coords) -> bool;

    /// Whether the coordinate is visible to `player` (fog of war)
    fn is_visible(&self, player: PlayerId, coords: Coords) -> bool;

    /// Bounded area scan around `coords`; `radius` in map steps
    fn area_summary(&self, player: PlayerId, coords: Coords, radius: u16) -> AreaSummary;

    /// Coordinates the player could currently build on, in stable host order
    fn own_buildable_fields(&self, player: PlayerId) -> Vec<Coords>;

    /// Mineable coordinates the player owns, with the resource underneath
    fn own_mineable_fields(&self, player: PlayerId) -> Vec<(Coords, ResourceId)>;

    /// Remaining resource amount under the coordinate (mines)
    fn mine_resource_amount(&self, coords: Coords) -> u8;

    /// Flags owned by the player, in stable host order
    fn own_flags(&self, player: PlayerId) -> Vec<FlagId>;

    fn flag_position(&self, flag: FlagId) -> Option<Coords>;

    /// Number of roads attached to the flag
    fn flag_road_count(&self, flag: FlagId) -> Option<u8>;

    /// Whether a building sits at the flag
    fn flag_has_building(&self, flag: FlagId) -> bool;

    /// Both flags in the same ware economy (connected by roads)?
    fn same_economy(&self, a: FlagId, b: FlagId) -> bool;

    /// Current walking distance over existing roads, if connected
    fn road_distance(&self, from: FlagId, to: FlagId) -> Option<u32>;

    /// Shortest distance from the flag to any warehouse over existing roads
    fn warehouse_distance(&self, flag: FlagId) -> Option<(u32, WarehouseId)>;

    /// Flags within air distance of `coords`, own and foreign
    fn flags_in_radius(&self, coords: Coords, radius: u16) -> Vec<(FlagId, Coords)>;

    /// Length of a feasible new road between the coordinates, bounded search
    fn possible_road_length(&self, from: Coords, to: Coords, check: RoadCheck) -> Option<u32>;

    /// Productivity percentage of an own production site, if it still exists
    fn site_productivity(&self, building: BuildingId) -> Option<u8>;

    /// Garrison currently defending the enemy site, if it still exists
    fn site_defenders(&self, building: BuildingId) -> Option<u32>;

    fn site_owner(&self, building: BuildingId) -> Option<PlayerId>;

    /// Soldiers the player could send against the flag right now
    fn available_attack_soldiers(&self, player: PlayerId, flag: FlagId) -> u32;

    /// Current soldier totals: (stationed in sites, total including reserve)
    fn soldier_status(&self, player: PlayerId) -> (u32, u32);

    fn ship_position(&self, ship: ShipId) -> Option<Coords>;

    /// How much open water lies in `direction` from `coords` (scan-bounded)
    fn water_openness(&self, coords: Coords, direction: Direction) -> u32;

    /// Whether the map has enough water for seafaring at all
    fn map_allows_seafaring(&self) -> bool;
}
