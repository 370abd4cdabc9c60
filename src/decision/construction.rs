//! Construction necessity and site placement
//!
//! Two stages each pass: decide per building type whether another instance
//! is needed at all (signal bank through the construction masks), then score
//! the fresh buildable fields for the allowed types and submit at most one
//! construction command.

use tracing::debug;

use crate::core::types::{GameTime, PlayerId, MINUTE};
use crate::decision::signals::{flip, SignalBank};
use crate::decision::slots::{
    F_CONSTRUCTION_A, F_CONSTRUCTION_B, MN_CONSTRUCTION_THRESHOLD, MN_EXPANSION_URGE,
    MN_LAND_STARVED, MN_MINE_URGE, MN_SOLDIER_SHORTAGE, MN_UNDER_ATTACK, MN_UPGRADE_URGE,
    N_MINE_AMOUNT, N_PRODUCER_BALANCE, N_ROCKS, N_TREES, N_UNOWNED_LAND, N_WATER,
};
use crate::dna::ManagementData;
use crate::game::buildings::{BuildingCategory, BuildingDescr, BuildingSize};
use crate::game::commands::{Command, CommandSink};
use crate::game::view::GameView;
use crate::scan::buildable::BuildableField;
use crate::scan::{BuildableFieldsCache, MineableFieldsCache};
use crate::trackers::observers::{ConstructionData, MilitaryData};
use crate::trackers::{BlockedFields, PlayersStrengths};

/// A just-used field stays blocked this long
const BUILD_BLOCK: GameTime = 2 * MINUTE;
/// Recent-attack window entering the necessity bank
const ATTACK_WINDOW: GameTime = 10 * MINUTE;
/// An exhausted mine gets this long to recover before dismantlement
const MINE_GRACE: GameTime = 3 * MINUTE;
/// Upkeep actions per production site are rate-limited to this interval
const TWEAK_COOLDOWN: GameTime = 5 * MINUTE;
/// A site younger than this is never upgraded
const UPGRADE_AGE: GameTime = 20 * MINUTE;

/// Outcome of the per-type necessity check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildingNecessity {
    /// Bypass field scoring thresholds; basic economy gaps land here
    Needed,
    Allowed,
    Forbidden,
}

/// Decide whether another instance of this building type is wanted
pub fn check_building_necessity(
    dna: &ManagementData,
    descr: &BuildingDescr,
    construction: &ConstructionData,
    military: &MilitaryData,
    strengths: &PlayersStrengths,
    me: PlayerId,
    now: GameTime,
) -> BuildingNecessity {
    if now < descr.prohibited_till {
        return BuildingNecessity::Forbidden;
    }

    // Basic-economy bootstrap: missing foundational types skip scoring
    if !construction.basic_economy_established
        && descr.basic_economy
        && construction.counts_for(descr.type_id).total() == 0
    {
        return BuildingNecessity::Needed;
    }

    let counts = construction.counts_for(descr.type_id);
    let land_starved = strengths.player_land(me) < strengths.best_enemy_land(me);

    let mut bank = SignalBank::new();
    bank.set(0, flip(land_starved, dna.military_number(MN_LAND_STARVED) / 10));
    bank.set(
        1,
        flip(
            military.soldier_shortage(),
            dna.military_number(MN_SOLDIER_SHORTAGE) / 10,
        ),
    );
    bank.set(
        2,
        flip(
            military.attacked_recently(now, ATTACK_WINDOW),
            dna.military_number(MN_UNDER_ATTACK) / 10,
        ),
    );
    bank.set(
        3,
        flip(
            !construction.basic_economy_established,
            dna.military_number(MN_EXPANSION_URGE) / 10,
        ),
    );
    // Overextension: unoccupied sites of this type push against more
    bank.set(4, -(counts.unoccupied.min(8) as i16 * 4));
    bank.set(5, -(counts.under_construction.min(8) as i16 * 3));
    if descr.category == BuildingCategory::Mine {
        bank.set(6, dna.military_number(MN_MINE_URGE) / 10);
    }

    let masks = [
        dna.f_neuron(F_CONSTRUCTION_A),
        dna.f_neuron(F_CONSTRUCTION_B),
    ];
    let sum = bank.masked_sum(&masks);
    let threshold = i32::from(dna.military_number(MN_CONSTRUCTION_THRESHOLD));

    if sum > threshold.abs() {
        BuildingNecessity::Needed
    } else if sum + threshold.abs() >= 0 {
        BuildingNecessity::Allowed
    } else {
        BuildingNecessity::Forbidden
    }
}

/// Score one surface field for one building type
fn field_score(dna: &ManagementData, descr: &BuildingDescr, field: &BuildableField) -> i32 {
    let mut score = 0i32;
    match descr.category {
        BuildingCategory::Military => {
            score += dna
                .neuron(N_UNOWNED_LAND)
                .result_safe(i32::from(field.unowned_land_nearby) / 4, false);
            // Gap between capacity and presence: room for another garrison
            let gap = i32::from(field.military_capacity)
                - i32::from(field.military_presence);
            score -= gap.max(0) * 8;
            if field.enemy_nearby {
                score += i32::from(field.enemy_power);
            }
            if field.near_border {
                score += 10;
            }
        }
        BuildingCategory::Production => {
            score += dna
                .neuron(N_TREES)
                .result_safe(i32::from(field.trees_nearby) / 2, false);
            score += dna
                .neuron(N_ROCKS)
                .result_safe(i32::from(field.rocks_nearby) / 2, false);
            score += dna
                .neuron(N_WATER)
                .result_safe(i32::from(field.water_nearby) / 4, false);
            let balance =
                i32::from(field.producers_nearby) - i32::from(field.consumers_nearby);
            score += dna.neuron(N_PRODUCER_BALANCE).result_safe(balance + 10, false);
            score -= i32::from(field.space_consumers_nearby) * 2;
            if field.enemy_nearby {
                score -= 30;
            }
        }
        BuildingCategory::Warehouse => {
            score += i32::from(field.producers_nearby) * 3;
            score -= i32::from(field.military_presence);
            if field.enemy_nearby {
                score -= 50;
            }
        }
        BuildingCategory::Training => {
            score -= i32::from(field.enemy_power);
            score += i32::from(field.military_presence) * 2;
        }
        BuildingCategory::Port => {
            score += i32::from(field.water_nearby) * 2;
            score += i32::from(field.fish_nearby);
        }
        // Mines are placed from the mineable cache, not surface fields
        BuildingCategory::Mine => {}
    }
    if field.preferred {
        score += 25;
    }
    score
}

/// Does the field's plot fit the building?
fn size_fits(descr: &BuildingDescr, field: &BuildableField) -> bool {
    match descr.size {
        BuildingSize::None => false,
        BuildingSize::Mine => false,
        BuildingSize::Port => field.buildcap == BuildingSize::Port,
        size => {
            field.buildcap != BuildingSize::Mine
                && field.buildcap != BuildingSize::Port
                && field.buildcap >= size
        }
    }
}

/// One construction pass: submit at most one build command
///
/// Returns true when a command was issued. Empty buildable sets are normal
/// and skip silently.
#[allow(clippy::too_many_arguments)]
pub fn construct_building(
    construction: &ConstructionData,
    military: &MilitaryData,
    strengths: &PlayersStrengths,
    buildable: &BuildableFieldsCache,
    mineable: &MineableFieldsCache,
    blocked: &mut BlockedFields,
    dna: &ManagementData,
    view: &dyn GameView,
    sink: &mut dyn CommandSink,
    me: PlayerId,
    now: GameTime,
) -> bool {
    let fields = buildable.fresh_sorted(now);

    let mut best: Option<(i32, crate::core::types::Coords, &BuildingDescr)> = None;

    for descr in &construction.building_types {
        let necessity =
            check_building_necessity(dna, descr, construction, military, strengths, me, now);
        if necessity == BuildingNecessity::Forbidden {
            continue;
        }
        let bonus = if necessity == BuildingNecessity::Needed {
            1000
        } else {
            0
        };

        if descr.category == BuildingCategory::Mine {
            let Some(resource) = descr.mined_resource else {
                continue;
            };
            for spot in mineable.fresh_with_resource(resource, now) {
                if blocked.is_blocked(spot.coords, now) {
                    continue;
                }
                let score = bonus
                    + dna
                        .neuron(N_MINE_AMOUNT)
                        .result_safe(i32::from(spot.amount) / 2, true);
                if best.as_ref().map_or(true, |(b, _, _)| score > *b) {
                    best = Some((score, spot.coords, descr));
                }
            }
            continue;
        }

        for field in &fields {
            if blocked.is_blocked(field.coords, now) || !size_fits(descr, field) {
                continue;
            }
            let score = bonus + field_score(dna, descr, field);
            if best.as_ref().map_or(true, |(b, _, _)| score > *b) {
                best = Some((score, field.coords, descr));
            }
        }
    }

    let threshold = i32::from(dna.military_number(MN_CONSTRUCTION_THRESHOLD)).abs();
    match best {
        Some((score, coords, descr)) if score > threshold => {
            if !view.owns_field(me, coords) {
                // The field left our territory since the last scan
                tracing::warn!(?coords, "buildable field no longer owned, skipping");
                return false;
            }
            debug!(
                building_type = descr.type_id.0,
                score,
                ?coords,
                "submitting construction"
            );
            sink.submit(Command::BuildBuilding {
                coords,
                building_type: descr.type_id,
            });
            blocked.add(coords, now + BUILD_BLOCK);
            true
        }
        _ => false,
    }
}

/// Production-site upkeep: dismantle dry mines, upgrade mature sites,
/// boost the inputs of struggling ones
pub fn check_productionsites(
    construction: &mut ConstructionData,
    dna: &ManagementData,
    view: &dyn GameView,
    sink: &mut dyn CommandSink,
    now: GameTime,
) {
    if construction.productionsites.is_empty() {
        return;
    }

    let mut site_ids: Vec<crate::core::types::BuildingId> =
        construction.productionsites.keys().copied().collect();
    site_ids.sort_by_key(|id| id.0);

    let upgrade_urge = i32::from(dna.military_number(MN_UPGRADE_URGE));

    for id in site_ids {
        let Some(site) = construction.productionsites.get(&id) else {
            continue;
        };
        let type_id = site.type_id;
        let coords = site.coords;
        let is_mine = site.is_mine;
        let built_time = site.built_time;
        let no_resources_since = site.no_resources_since;
        let last_tweak = site.last_tweak;

        let Some(stats_pct) = view.site_productivity(id) else {
            // Lost between event delivery and this pass
            tracing::warn!(site = id.0, "production site vanished, dropping observer");
            construction.productionsites.remove(&id);
            continue;
        };
        if let Some(site) = construction.productionsites.get_mut(&id) {
            site.stats_pct = stats_pct;
        }

        // Dry mines get a grace period, then go
        if is_mine {
            if view.mine_resource_amount(coords) == 0 {
                match no_resources_since {
                    None => {
                        if let Some(site) = construction.productionsites.get_mut(&id) {
                            site.no_resources_since = Some(now);
                        }
                    }
                    Some(since) if now.saturating_sub(since) > MINE_GRACE => {
                        debug!(site = id.0, "dismantling exhausted mine");
                        sink.submit(Command::DismantleBuilding { building: id });
                        construction.productionsites.remove(&id);
                        continue;
                    }
                    Some(_) => {}
                }
            } else if let Some(site) = construction.productionsites.get_mut(&id) {
                site.no_resources_since = None;
            }
        }

        if last_tweak.is_some_and(|t| now.saturating_sub(t) < TWEAK_COOLDOWN) {
            continue;
        }

        let descr = construction
            .building_types
            .iter()
            .find(|d| d.type_id == type_id);
        let Some(descr) = descr else {
            continue;
        };

        // A mature, busy site is upgrade material when the genome agrees
        if let Some(upgrade_to) = descr.upgrade_to {
            if now.saturating_sub(built_time) > UPGRADE_AGE
                && i32::from(stats_pct) + upgrade_urge / 4 > 90
            {
                debug!(site = id.0, to = upgrade_to.0, "upgrading production site");
                sink.submit(Command::UpgradeBuilding {
                    building: id,
                    to: upgrade_to,
                });
                if let Some(site) = construction.productionsites.get_mut(&id) {
                    site.last_tweak = Some(now);
                }
                continue;
            }
        }

        // A starving site gets its primary input prioritized
        if stats_pct < 10 && now.saturating_sub(built_time) > TWEAK_COOLDOWN {
            if let Some(&ware) = descr.inputs.first() {
                debug!(site = id.0, ware = ware.0, "boosting input priority");
                sink.submit(Command::SetWarePriority {
                    building: id,
                    ware,
                    priority: 2,
                });
                if let Some(site) = construction.productionsites.get_mut(&id) {
                    site.last_tweak = Some(now);
                }
            }
        }
    }
}
