//! Static building metadata consumed from the host catalog
//!
//! The host hands the engine one [`BuildingDescr`] per constructible type at
//! game start. The engine never interprets tribe data itself.

use serde::{Deserialize, Serialize};

use crate::core::types::{BuildingTypeId, GameTime, ResourceId, WareId};

/// Coarse role of a building type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingCategory {
    Production,
    Military,
    Warehouse,
    Training,
    Mine,
    Port,
}

/// Footprint size of a building plot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuildingSize {
    #[default]
    None,
    Small,
    Medium,
    Big,
    Mine,
    Port,
}

/// One entry of the host's building catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingDescr {
    pub type_id: BuildingTypeId,
    pub category: BuildingCategory,
    pub size: BuildingSize,
    /// Part of the basic-economy bootstrap set
    pub basic_economy: bool,
    /// Resource a mine extracts; `None` for surface buildings
    pub mined_resource: Option<ResourceId>,
    /// Garrison capacity for military sites, trainee slots for trainingsites
    pub max_soldiers: u32,
    /// Enhanced variant this building can be upgraded into
    pub upgrade_to: Option<BuildingTypeId>,
    /// Input wares of a production site, most important first
    pub inputs: Vec<WareId>,
    /// Host-dictated earliest construction time (tutorial/scenario gating)
    pub prohibited_till: GameTime,
}

impl BuildingDescr {
    /// True for sites the military-garrison routine manages
    pub fn is_militarysite(&self) -> bool {
        self.category == BuildingCategory::Military
    }

    /// True when the plot demands a coastline (ports)
    pub fn needs_coast(&self) -> bool {
        self.category == BuildingCategory::Port
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descr(category: BuildingCategory) -> BuildingDescr {
        BuildingDescr {
            type_id: BuildingTypeId(1),
            category,
            size: BuildingSize::Small,
            basic_economy: false,
            mined_resource: None,
            max_soldiers: 0,
            upgrade_to: None,
            inputs: Vec::new(),
            prohibited_till: 0,
        }
    }

    #[test]
    fn test_category_helpers() {
        assert!(descr(BuildingCategory::Military).is_militarysite());
        assert!(!descr(BuildingCategory::Production).is_militarysite());
        assert!(descr(BuildingCategory::Port).needs_coast());
    }

    #[test]
    fn test_size_ordering() {
        assert!(BuildingSize::Small < BuildingSize::Medium);
        assert!(BuildingSize::Medium < BuildingSize::Big);
    }
}
