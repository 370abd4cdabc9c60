//! Mineable-field snapshots
//!
//! Mountain/resource spots get their own, smaller snapshot: the only facts
//! mine placement cares about are the resource under the field and how many
//! same-resource spots sit around it.

use ahash::{AHashMap, AHashSet};

use crate::core::types::{Coords, GameTime, PlayerId, ResourceId, SECOND};
use crate::game::view::GameView;

/// Snapshot lifetime; mines change far slower than surface fields
const FIELD_EXPIRY: GameTime = 45 * SECOND;
/// Snapshots refreshed per scheduler pass
const REFRESH_BATCH: usize = 15;

/// Cached facts about one mineable coordinate
#[derive(Debug, Clone)]
pub struct MineableField {
    pub coords: Coords,
    pub expires: GameTime,
    pub resource: ResourceId,
    /// Remaining amount under this field
    pub amount: u8,
    pub preferred: bool,
}

impl MineableField {
    pub fn new(coords: Coords, resource: ResourceId) -> Self {
        Self {
            coords,
            expires: 0,
            resource,
            amount: 0,
            preferred: false,
        }
    }

    pub fn is_expired(&self, now: GameTime) -> bool {
        self.expires <= now
    }

    pub fn update(&mut self, view: &dyn GameView, _player: PlayerId, now: GameTime) {
        self.amount = view.mine_resource_amount(self.coords);
        self.expires = now + FIELD_EXPIRY;
    }
}

/// The player's mineable set
#[derive(Debug, Default)]
pub struct MineableFieldsCache {
    fields: AHashMap<Coords, MineableField>,
}

impl MineableFieldsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, coords: Coords, resource: ResourceId) {
        self.fields
            .entry(coords)
            .or_insert_with(|| MineableField::new(coords, resource));
    }

    pub fn remove(&mut self, coords: Coords) {
        self.fields.remove(&coords);
    }

    /// Reconcile the tracked set with the host's current mineable list
    pub fn sync(&mut self, spots: &[(Coords, ResourceId)]) {
        let current: AHashSet<Coords> = spots.iter().map(|(c, _)| *c).collect();
        self.fields.retain(|c, _| current.contains(c));
        for &(c, resource) in spots {
            self.insert(c, resource);
        }
    }

    pub fn get(&self, coords: Coords) -> Option<&MineableField> {
        self.fields.get(&coords)
    }

    /// Refresh up to one batch of expired snapshots, in coordinate order
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

    /// Fresh spots still holding the wanted resource, in coordinate order
    pub fn fresh_with_resource(&self, resource: ResourceId, now: GameTime) -> Vec<&MineableField> {
        let mut fresh: Vec<&MineableField> = self
            .fields
            .values()
            .filter(|f| !f.is_expired(now) && f.resource == resource && f.amount > 0)
            .collect();
        fresh.sort_by_key(|f| (f.coords.y, f.coords.x));
        fresh
    }

    pub fn count(&self) -> usize {
        self.fields.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_expiry() {
        let mut cache = MineableFieldsCache::new();
        cache.insert(Coords::new(1, 1), ResourceId(0));
        let field = cache.get(Coords::new(1, 1)).unwrap();
        // New snapshots start expired and get filled by the refresh pass
        assert!(field.is_expired(0));
    }

    #[test]
    fn test_remove() {
        let mut cache = MineableFieldsCache::new();
        cache.insert(Coords::new(1, 1), ResourceId(0));
        cache.remove(Coords::new(1, 1));
        assert_eq!(cache.count(), 0);
    }
}
