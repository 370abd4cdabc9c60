//! Enemy-site attack scoring and target selection
//!
//! Walks the observed enemy sites in id order, refreshes each score from the
//! signal bank and the defender-count neuron, then attacks the best target
//! whose score clears the genome threshold. Being outgunned or freshly
//! repelled enters the bank as a penalty, never as a hard block - sustained
//! pressure can still override caution.

use tracing::{debug, warn};

use crate::core::config::DifficultyProfile;
use crate::core::types::{BuildingId, GameTime, PlayerId, MINUTE};
use crate::decision::signals::{flip, SignalBank};
use crate::decision::slots::{
    F_ATTACK_A, F_ATTACK_B, MN_ATTACK_COOLDOWN_PENALTY, MN_ATTACK_MARGIN, MN_ATTACK_THRESHOLD,
    MN_LAND_STARVED, MN_SOLDIER_SHORTAGE, MN_WAREHOUSE_BONUS, N_DEFENDERS_PENALTY,
};
use crate::dna::ManagementData;
use crate::game::commands::{Command, CommandSink};
use crate::game::view::GameView;
use crate::trackers::observers::MilitaryData;
use crate::trackers::PlayersStrengths;

/// Sites unseen longer than this are not considered (nor yet purged)
const SEEN_CUTOFF: GameTime = 5 * MINUTE;
/// Window for the "attacked this site recently" penalty
const REATTACK_WINDOW: GameTime = 5 * MINUTE;
/// Window for the global "we attacked recently" signal
const GLOBAL_ATTACK_WINDOW: GameTime = 3 * MINUTE;

/// One pass over the observed enemy sites; submits at most one attack
pub fn check_enemy_sites(
    military: &mut MilitaryData,
    strengths: &PlayersStrengths,
    dna: &ManagementData,
    profile: &DifficultyProfile,
    view: &dyn GameView,
    sink: &mut dyn CommandSink,
    me: PlayerId,
    now: GameTime,
) {
    if military.enemy_sites.is_empty() {
        return;
    }

    let mut site_ids: Vec<BuildingId> = military.enemy_sites.keys().copied().collect();
    site_ids.sort_by_key(|id| id.0);

    let strong_enough = strengths.strong_enough(me);
    let land_starved = strengths.player_land(me) < strengths.best_enemy_land(me);
    let soldier_shortage = military.soldier_shortage();
    let attacked_recently = military.attacked_recently(now, GLOBAL_ATTACK_WINDOW);

    let mut best: Option<(i32, BuildingId)> = None;

    for id in site_ids {
        let Some(site) = military.enemy_sites.get(&id) else {
            continue;
        };
        if now.saturating_sub(site.last_time_seen) > SEEN_CUTOFF {
            continue;
        }

        let Some(defenders) = view.site_defenders(id) else {
            // The site fell or was dismantled since we last saw it
            warn!(site = id.0, "enemy site reference stale, dropping observer");
            military.enemy_sites.remove(&id);
            continue;
        };

        let recently_repelled = site
            .last_time_attacked
            .is_some_and(|t| now.saturating_sub(t) <= REATTACK_WINDOW);

        let mut bank = SignalBank::new();
        bank.set(0, flip(strong_enough, dna.military_number(MN_ATTACK_MARGIN) / 10));
        bank.set(1, flip(land_starved, dna.military_number(MN_LAND_STARVED) / 10));
        bank.set(
            2,
            flip(soldier_shortage, -(dna.military_number(MN_SOLDIER_SHORTAGE) / 10)),
        );
        bank.set(3, flip(attacked_recently, -6));
        bank.set(
            4,
            flip(
                recently_repelled,
                -(dna.military_number(MN_ATTACK_COOLDOWN_PENALTY).abs() / 10),
            ),
        );
        bank.set(
            5,
            flip(site.is_warehouse, dna.military_number(MN_WAREHOUSE_BONUS) / 10),
        );

        let masks = [dna.f_neuron(F_ATTACK_A), dna.f_neuron(F_ATTACK_B)];
        let mut score = bank.masked_sum(&masks);
        // Heavily garrisoned targets lose attractiveness along the curve
        score -= dna
            .neuron(N_DEFENDERS_PENALTY)
            .result_safe(defenders as i32 * 2, true);

        if let Some(site) = military.enemy_sites.get_mut(&id) {
            site.score = score;
            site.last_tested = Some(now);
        }

        if best.map_or(true, |(b, _)| score > b) {
            best = Some((score, id));
        }
    }

    let threshold = i32::from(dna.military_number(MN_ATTACK_THRESHOLD)).abs()
        + profile.attack_reluctance;

    let Some((score, target)) = best else {
        return;
    };
    if score <= threshold {
        return;
    }

    let Some(site) = military.enemy_sites.get_mut(&target) else {
        return;
    };
    let soldiers = view.available_attack_soldiers(me, site.flag);
    if soldiers == 0 {
        debug!(site = target.0, "attack target chosen but no soldiers free");
        return;
    }

    debug!(site = target.0, score, soldiers, "launching attack");
    sink.submit(Command::Attack {
        flag: site.flag,
        soldiers,
    });
    site.last_time_attacked = Some(now);
    military.last_attack_time = Some(now);
    military.attackers_sent += soldiers;
}
