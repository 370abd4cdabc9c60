//! Buildable-field snapshots
//!
//! One snapshot per coordinate the player could build on, holding the
//! counters the construction and military routines score against.

use ahash::{AHashMap, AHashSet};

use crate::core::types::{Coords, GameTime, PlayerId, SECOND};
use crate::game::buildings::BuildingSize;
use crate::game::view::GameView;

/// Snapshot lifetime before a refresh is required
const FIELD_EXPIRY: GameTime = 15 * SECOND;
/// Area-scan radius around the coordinate, in map steps
const SCAN_RADIUS: u16 = 6;
/// Snapshots refreshed per scheduler pass; bounds one tick's work
const REFRESH_BATCH: usize = 25;

/// Cached terrain-suitability facts around one coordinate
#[derive(Debug, Clone, Default)]
pub struct BuildableField {
    pub coords: Coords,
    pub expires: GameTime,
    /// Preferred spots get a scoring bonus (e.g. near a just-lost site)
    pub preferred: bool,
    pub enemy_nearby: bool,
    pub enemy_accessible: bool,
    pub enemy_power: u16,
    pub unowned_land_nearby: u16,
    pub unowned_mine_spots: u16,
    pub near_border: bool,
    pub trees_nearby: u16,
    pub rocks_nearby: u16,
    pub water_nearby: u16,
    pub fish_nearby: u16,
    pub critters_nearby: u16,
    pub military_capacity: u16,
    pub military_stationed: u16,
    pub military_presence: u16,
    pub producers_nearby: u16,
    pub consumers_nearby: u16,
    pub space_consumers_nearby: u16,
    pub buildcap: BuildingSize,
}

impl BuildableField {
    pub fn new(coords: Coords) -> Self {
        Self {
            coords,
            ..Self::default()
        }
    }

    pub fn is_expired(&self, now: GameTime) -> bool {
        self.expires <= now
    }

    /// Refill all counters from one bounded area scan
    pub fn update(&mut self, view: &dyn GameView, player: PlayerId, now: GameTime) {
        let summary = view.area_summary(player, self.coords, SCAN_RADIUS);
        self.enemy_nearby = summary.enemy_nearby;
        self.enemy_accessible = summary.enemy_accessible;
        self.enemy_power = summary.enemy_power;
        self.unowned_land_nearby = summary.unowned_land;
        self.unowned_mine_spots = summary.unowned_mine_spots;
        self.near_border = summary.near_border;
        self.trees_nearby = summary.trees;
        self.rocks_nearby = summary.rocks;
        self.water_nearby = summary.water;
        self.fish_nearby = summary.fish;
        self.critters_nearby = summary.critters;
        self.military_capacity = summary.own_military_capacity;
        self.military_stationed = summary.own_military_stationed;
        self.military_presence = summary.own_military_presence;
        self.producers_nearby = summary.producers;
        self.consumers_nearby = summary.consumers;
        self.space_consumers_nearby = summary.space_consumers;
        self.buildcap = summary.buildcap;
        self.expires = now + FIELD_EXPIRY;
    }
}

/// The player's buildable set
#[derive(Debug, Default)]
pub struct BuildableFieldsCache {
    fields: AHashMap<Coords, BuildableField>,
}

impl BuildableFieldsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a coordinate that entered the buildable set
    pub fn insert(&mut self, coords: Coords) {
        self.fields
            .entry(coords)
            .or_insert_with(|| BuildableField::new(coords));
    }

    /// Drop a coordinate that left the buildable set
    pub fn remove(&mut self, coords: Coords) {
        self.fields.remove(&coords);
    }

    /// Reconcile the tracked set with the host's current buildable list
    pub fn sync(&mut self, coords: &[Coords]) {
        let current: AHashSet<Coords> = coords.iter().copied().collect();
        self.fields.retain(|c, _| current.contains(c));
        for &c in coords {
            self.insert(c);
        }
    }

    pub fn get(&self, coords: Coords) -> Option<&BuildableField> {
        self.fields.get(&coords)
    }

    /// Refresh up to one batch of expired snapshots
    ///
    /// Returns the number refreshed. Bounded by count, not wall clock, and
    /// processed in coordinate order - map iteration order is not
    /// reproducible across processes, which lockstep forbids.
    pub fn refresh_expired(
        &mut self,
        view: &dyn GameView,
        player: PlayerId,
        now: GameTime,
    ) -> usize {
        let mut expired: Vec<Coords> = self
            .fields
            .values()
            .filter(|f| f.is_expired(now))
            .map(|f| f.coords)
            .collect();
        expired.sort_by_key(|c| (c.y, c.x));
        expired.truncate(REFRESH_BATCH);
        for coords in &expired {
            if let Some(field) = self.fields.get_mut(coords) {
                field.update(view, player, now);
            }
        }
        expired.len()
    }

    /// Fresh (non-expired) snapshots in coordinate order, for the scoring
    /// routines
    pub fn fresh_sorted(&self, now: GameTime) -> Vec<&BuildableField> {
        let mut fresh: Vec<&BuildableField> = self
            .fields
            .values()
            .filter(|f| !f.is_expired(now))
            .collect();
        fresh.sort_by_key(|f| (f.coords.y, f.coords.x));
        fresh
    }

    pub fn count(&self) -> usize {
        self.fields.len()
    }
}
