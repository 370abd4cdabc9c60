//! Player commands issued to the host simulation
//!
//! Commands are asynchronous requests: the host's command queue serializes
//! and applies them deterministically, and the engine observes the effects
//! only on later ticks. Nothing here mutates simulation state directly.

use serde::{Deserialize, Serialize};

use crate::core::types::{
    BuildingId, BuildingTypeId, Coords, Direction, FlagId, ShipId, WareId,
};

/// Ship role, set by refit commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShipRole {
    Transport,
    Warship,
}

/// One asynchronous player command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    BuildBuilding {
        coords: Coords,
        building_type: BuildingTypeId,
    },
    DismantleBuilding {
        building: BuildingId,
    },
    UpgradeBuilding {
        building: BuildingId,
        to: BuildingTypeId,
    },
    BuildRoad {
        from: FlagId,
        to: FlagId,
    },
    DestroyRoad {
        flag: FlagId,
    },
    SetSoldierCapacity {
        building: BuildingId,
        capacity: u32,
    },
    SetWarePriority {
        building: BuildingId,
        ware: WareId,
        priority: i8,
    },
    SetWareTargetQuantity {
        ware: WareId,
        amount: u32,
    },
    StartExpedition {
        port: BuildingId,
    },
    CancelExpedition {
        ship: ShipId,
    },
    ExpeditionScout {
        ship: ShipId,
        direction: Direction,
    },
    ExpeditionConstructPort {
        ship: ShipId,
    },
    Attack {
        flag: FlagId,
        soldiers: u32,
    },
    RefitShip {
        ship: ShipId,
        role: ShipRole,
    },
}

/// Receiving end of the host's command queue
pub trait CommandSink {
    fn submit(&mut self, command: Command);
}

/// Recording sink for tests and dry runs
#[derive(Debug, Default)]
pub struct CommandLog {
    pub commands: Vec<Command>,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count_matching(&self, predicate: impl Fn(&Command) -> bool) -> usize {
        self.commands.iter().filter(|c| predicate(c)).count()
    }
}

impl CommandSink for CommandLog {
    fn submit(&mut self, command: Command) {
        self.commands.push(command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_log_records_in_order() {
        let mut log = CommandLog::new();
        log.submit(Command::DestroyRoad { flag: FlagId(1) });
        log.submit(Command::Attack {
            flag: FlagId(2),
            soldiers: 5,
        });
        assert_eq!(log.commands.len(), 2);
        assert_eq!(log.commands[0], Command::DestroyRoad { flag: FlagId(1) });
    }

    #[test]
    fn test_count_matching() {
        let mut log = CommandLog::new();
        log.submit(Command::DestroyRoad { flag: FlagId(1) });
        log.submit(Command::DestroyRoad { flag: FlagId(2) });
        log.submit(Command::CancelExpedition { ship: ShipId(1) });
        let destroys = log.count_matching(|c| matches!(c, Command::DestroyRoad { .. }));
        assert_eq!(destroys, 2);
    }
}
