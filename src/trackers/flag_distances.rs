//! Cached flag-to-warehouse distances with two-stage expiry
//!
//! Measuring the road distance from a flag to the nearest warehouse is
//! expensive, so results are cached per flag. Before the *soft* expiry a new
//! measurement only replaces the cached one when it is strictly shorter, or
//! equal with a later expiry - this extends validity without oscillation.
//! After the soft expiry any fresh measurement wins. After the *hard* expiry
//! queries report the unreachable sentinel until a refresh arrives.
//!
//! A separate short cooldown after building a road at a flag suppresses
//! immediate further construction from the same flag, so parallel redundant
//! roads cannot form before the cache catches up.

use ahash::AHashMap;

use crate::core::types::{FlagId, GameTime, WarehouseId, MINUTE, SECOND};

/// Sentinel distance for unknown/expired entries
pub const UNREACHABLE: u32 = 1000;
/// Hard expiry: entries older than this answer with the sentinel
const EXPIRY: GameTime = 2 * MINUTE;
/// Soft expiry: after this, any fresh measurement is accepted
const SOFT_EXPIRY: GameTime = MINUTE;
/// Cooldown after a road was built at the flag
const ROAD_COOLDOWN: GameTime = 60 * SECOND;
/// Entries unrefreshed this long past expiry get purged
const OLD_FLAG_AGE: GameTime = 5 * MINUTE;

#[derive(Debug, Clone)]
struct FlagInfo {
    distance: u32,
    nearest: WarehouseId,
    expiry: GameTime,
    soft_expiry: GameTime,
    road_prohibited_till: GameTime,
}

/// Per-flag cache of the shortest known distance to a warehouse
#[derive(Debug, Default)]
pub struct FlagWarehouseDistances {
    flags: AHashMap<FlagId, FlagInfo>,
}

impl FlagWarehouseDistances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a fresh measurement; returns whether the cache changed
    pub fn set_distance(
        &mut self,
        flag: FlagId,
        distance: u32,
        nearest: WarehouseId,
        now: GameTime,
    ) -> bool {
        match self.flags.get_mut(&flag) {
            None => {
                self.flags.insert(
                    flag,
                    FlagInfo {
                        distance,
                        nearest,
                        expiry: now + EXPIRY,
                        soft_expiry: now + SOFT_EXPIRY,
                        road_prohibited_till: 0,
                    },
                );
                true
            }
            Some(info) => {
                let accept = if now > info.soft_expiry {
                    true
                } else {
                    distance < info.distance
                        || (distance == info.distance && now + EXPIRY > info.expiry)
                };
                if accept {
                    info.distance = distance;
                    info.nearest = nearest;
                    info.expiry = now + EXPIRY;
                    info.soft_expiry = now + SOFT_EXPIRY;
                }
                accept
            }
        }
    }

    /// Cached distance, or the unreachable sentinel when absent or past the
    /// hard expiry
    pub fn get_distance(&self, flag: FlagId, now: GameTime) -> u32 {
        match self.flags.get(&flag) {
            Some(info) if info.expiry >= now => info.distance,
            _ => UNREACHABLE,
        }
    }

    /// Warehouse the cached distance points at, if the entry is fresh
    pub fn nearest_warehouse(&self, flag: FlagId, now: GameTime) -> Option<WarehouseId> {
        self.flags
            .get(&flag)
            .filter(|info| info.expiry >= now)
            .map(|info| info.nearest)
    }

    /// Note that a road was just built at this flag
    pub fn set_road_built(&mut self, flag: FlagId, now: GameTime) {
        let info = self.flags.entry(flag).or_insert(FlagInfo {
            distance: UNREACHABLE,
            nearest: WarehouseId(0),
            expiry: 0,
            soft_expiry: 0,
            road_prohibited_till: 0,
        });
        info.road_prohibited_till = now + ROAD_COOLDOWN;
    }

    /// Still inside the road-built cooldown?
    pub fn is_road_prohibited(&self, flag: FlagId, now: GameTime) -> bool {
        self.flags
            .get(&flag)
            .is_some_and(|info| now < info.road_prohibited_till)
    }

    /// Remove one entry unrefreshed for longer than the old-flag threshold
    ///
    /// Returns true when an entry was removed; callers loop until false.
    pub fn remove_old_flag(&mut self, now: GameTime) -> bool {
        let stale = self
            .flags
            .iter()
            .find(|(_, info)| info.expiry + OLD_FLAG_AGE < now)
            .map(|(flag, _)| *flag);
        match stale {
            Some(flag) => {
                self.flags.remove(&flag);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, flag: FlagId) -> bool {
        self.flags.contains_key(&flag)
    }

    pub fn count(&self) -> usize {
        self.flags.len()
    }
}
