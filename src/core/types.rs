//! Core type definitions used throughout the engine
//!
//! All ids are allocated by the host simulation; the engine never invents
//! them. Time is always *simulated* game time - wall-clock time must not
//! participate in any decision, or lockstep multiplayer desyncs.

use serde::{Deserialize, Serialize};

/// Simulated game time in milliseconds since game start
pub type GameTime = u32;

/// One simulated second
pub const SECOND: GameTime = 1_000;
/// One simulated minute
pub const MINUTE: GameTime = 60 * SECOND;
/// One simulated hour
pub const HOUR: GameTime = 60 * MINUTE;

/// Unique identifier for a player slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

/// Team membership; `TeamId(0)` means "no team"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TeamId(pub u8);

impl TeamId {
    pub const NONE: TeamId = TeamId(0);

    /// True when two ids denote actual shared team membership
    pub fn same_team(self, other: TeamId) -> bool {
        self != TeamId::NONE && self == other
    }
}

/// Unique identifier for a road flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlagId(pub u32);

/// Unique identifier for a building instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildingId(pub u32);

/// Unique identifier for a warehouse (a building that stores wares)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WarehouseId(pub u32);

/// Unique identifier for a ship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShipId(pub u32);

/// Static building type, indexing the host's building catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildingTypeId(pub u16);

/// Ware type, indexing the host's ware catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WareId(pub u16);

/// Mineable resource type, indexing the host's resource catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId(pub u8);

/// Map coordinate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coords {
    pub x: i16,
    pub y: i16,
}

impl Coords {
    pub fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    /// Straight-line distance ignoring terrain, in map steps
    pub fn air_distance(&self, other: &Coords) -> u32 {
        let dx = (self.x as i32 - other.x as i32).unsigned_abs();
        let dy = (self.y as i32 - other.y as i32).unsigned_abs();
        dx.max(dy) + dx.min(dy) / 2
    }
}

/// Walking direction on the map grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    NorthEast,
    East,
    SouthEast,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];
}
