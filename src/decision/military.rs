//! Military-site garrison sizing and useless-site dismantlement
//!
//! Each pass walks the owned military sites in id order, re-derives the
//! local situation from a bounded area scan, and either adjusts the soldier
//! capacity or dismantles a site that defends nothing anymore.

use tracing::{debug, warn};

use crate::core::types::{BuildingId, GameTime, PlayerId, MINUTE};
use crate::decision::signals::{flip, SignalBank};
use crate::decision::slots::{
    F_MILITARY, MN_GARRISON_BASE, MN_GARRISON_ENEMY_BOOST, MN_SOLDIER_SHORTAGE, N_MILITARY_GAP,
};
use crate::dna::ManagementData;
use crate::game::commands::{Command, CommandSink};
use crate::game::view::GameView;
use crate::trackers::observers::MilitaryData;

/// Capacity changes per site are rate-limited to this interval
const CHANGE_COOLDOWN: GameTime = 2 * MINUTE;
/// Scan radius around a site when re-deriving its situation
const SITE_SCAN_RADIUS: u16 = 8;
/// A site this young is never dismantled
const DISMANTLE_GRACE: GameTime = 10 * MINUTE;

/// One pass over all owned military sites
pub fn check_militarysites(
    military: &mut MilitaryData,
    dna: &ManagementData,
    view: &dyn GameView,
    sink: &mut dyn CommandSink,
    me: PlayerId,
    now: GameTime,
) {
    if military.militarysites.is_empty() {
        return;
    }

    let mut site_ids: Vec<BuildingId> = military.militarysites.keys().copied().collect();
    site_ids.sort_by_key(|id| id.0);

    let soldier_shortage = military.soldier_shortage();

    for id in site_ids {
        let Some(site) = military.militarysites.get(&id) else {
            continue;
        };
        if now.saturating_sub(site.last_change) < CHANGE_COOLDOWN {
            continue;
        }
        let coords = site.coords;
        let capacity = site.capacity;
        let built_time = site.built_time;

        if view.site_owner(id).is_none() {
            // Lost between event delivery and this pass
            warn!(site = id.0, "military site vanished, dropping observer");
            military.militarysites.remove(&id);
            continue;
        }

        let summary = view.area_summary(me, coords, SITE_SCAN_RADIUS);

        let mut bank = SignalBank::new();
        bank.set(0, flip(summary.enemy_nearby, dna.military_number(MN_GARRISON_ENEMY_BOOST) / 10));
        bank.set(
            1,
            flip(soldier_shortage, dna.military_number(MN_SOLDIER_SHORTAGE) / 10),
        );
        bank.set(2, flip(summary.near_border, 6));
        bank.set(3, flip(summary.unowned_land > 0, 4));
        // Local oversupply of garrison slots argues for fewer soldiers here
        let gap = i32::from(summary.own_military_capacity)
            - i32::from(summary.own_military_stationed);
        bank.set(4, dna.neuron(N_MILITARY_GAP).result_safe(gap + 10, false) as i16);

        let sum = bank.masked_sum(&[dna.f_neuron(F_MILITARY)]);
        let base = i32::from(dna.military_number(MN_GARRISON_BASE)).unsigned_abs() / 20;

        let interior =
            !summary.enemy_nearby && !summary.near_border && summary.unowned_land == 0;

        if interior && now.saturating_sub(built_time) > DISMANTLE_GRACE && sum < 0 {
            debug!(site = id.0, "dismantling useless military site");
            sink.submit(Command::DismantleBuilding { building: id });
            military.militarysites.remove(&id);
            continue;
        }

        let target = if sum > 0 {
            // Contested: garrison up
            base + 2 + (sum / 20).min(4) as u32
        } else {
            // Quiet: keep a skeleton crew
            (base / 2).max(1)
        };

        if target != capacity {
            debug!(site = id.0, capacity, target, "adjusting garrison");
            sink.submit(Command::SetSoldierCapacity {
                building: id,
                capacity: target,
            });
            if let Some(site) = military.militarysites.get_mut(&id) {
                site.capacity = target;
                site.last_change = now;
            }
        }
    }
}
