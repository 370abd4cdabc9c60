//! Per-opponent power and land history
//!
//! Entries appear lazily on first observation of a player and rotate
//! 15-minute and 60-minute snapshots of power and land. The attack routine
//! gates on [`PlayersStrengths::strong_enough`], which boosts a player's
//! effective power by one third of the teammates' surplus.

use ahash::AHashMap;

use crate::core::types::{GameTime, PlayerId, TeamId, MINUTE};

/// How recently a player must have been seen to count as "seen lately"
const SEEN_WINDOW: GameTime = 2 * MINUTE;
/// Safety margin, in percent, demanded on top of the strongest enemy
const POWER_MARGIN_PERCENT: u32 = 15;

/// One opponent's recorded history
#[derive(Debug, Clone, Default)]
pub struct PlayerStat {
    pub team: TeamId,
    pub power: u32,
    /// Power roughly 15 minutes ago
    pub old_power: u32,
    /// Power roughly 60 minutes ago
    pub old60_power: u32,
    pub land: u32,
    /// Land roughly 15 minutes ago
    pub old_land: u32,
    /// Land roughly 60 minutes ago
    pub old60_land: u32,
    pub casualties: u32,
    pub last_time_seen: Option<GameTime>,
    last_rotation_15: GameTime,
    last_rotation_60: GameTime,
}

/// Power/land snapshot history for every known player
#[derive(Debug, Default)]
pub struct PlayersStrengths {
    stats: AHashMap<PlayerId, PlayerStat>,
    team_powers: AHashMap<TeamId, u32>,
}

impl PlayersStrengths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record or overwrite the current snapshot for a player
    ///
    /// The 15- and 60-minute-old values rotate on their own cadence: after
    /// 15 minutes the current value moves into the 15-minute slot, after 60
    /// minutes the 15-minute value moves into the 60-minute slot. The land
    /// fields rotate exactly like the power fields.
    pub fn add(
        &mut self,
        player: PlayerId,
        team: TeamId,
        power: u32,
        land: u32,
        casualties: u32,
        now: GameTime,
    ) {
        let entry = self.stats.entry(player).or_default();
        entry.team = team;
        if now.saturating_sub(entry.last_rotation_15) >= 15 * MINUTE {
            entry.old_power = entry.power;
            entry.old_land = entry.land;
            entry.last_rotation_15 = now;
        }
        if now.saturating_sub(entry.last_rotation_60) >= 60 * MINUTE {
            entry.old60_power = entry.old_power;
            entry.old60_land = entry.old_land;
            entry.last_rotation_60 = now;
        }
        entry.power = power;
        entry.land = land;
        entry.casualties = casualties;
    }

    /// Drop entries for players no longer in the game
    pub fn retain_players(&mut self, alive: &[PlayerId]) {
        self.stats.retain(|player, _| alive.contains(player));
    }

    pub fn get(&self, player: PlayerId) -> Option<&PlayerStat> {
        self.stats.get(&player)
    }

    pub fn player_power(&self, player: PlayerId) -> u32 {
        self.stats.get(&player).map_or(0, |s| s.power)
    }

    pub fn old_player_power(&self, player: PlayerId) -> u32 {
        self.stats.get(&player).map_or(0, |s| s.old_power)
    }

    pub fn old60_player_power(&self, player: PlayerId) -> u32 {
        self.stats.get(&player).map_or(0, |s| s.old60_power)
    }

    pub fn player_land(&self, player: PlayerId) -> u32 {
        self.stats.get(&player).map_or(0, |s| s.land)
    }

    pub fn old_player_land(&self, player: PlayerId) -> u32 {
        self.stats.get(&player).map_or(0, |s| s.old_land)
    }

    pub fn old60_player_land(&self, player: PlayerId) -> u32 {
        self.stats.get(&player).map_or(0, |s| s.old60_land)
    }

    /// Re-sum team power over all known members
    pub fn recalculate_team_power(&mut self) {
        self.team_powers.clear();
        for stat in self.stats.values() {
            if stat.team != TeamId::NONE {
                *self.team_powers.entry(stat.team).or_insert(0) += stat.power;
            }
        }
    }

    pub fn team_power(&self, team: TeamId) -> u32 {
        self.team_powers.get(&team).copied().unwrap_or(0)
    }

    /// Own power plus one third of the teammates' surplus
    pub fn modified_player_power(&self, player: PlayerId) -> u32 {
        let Some(stat) = self.stats.get(&player) else {
            return 0;
        };
        let team_surplus = self.team_power(stat.team).saturating_sub(stat.power);
        stat.power + team_surplus / 3
    }

    pub fn set_last_time_seen(&mut self, player: PlayerId, now: GameTime) {
        if let Some(stat) = self.stats.get_mut(&player) {
            stat.last_time_seen = Some(now);
        }
    }

    /// Seen within the fixed recency window?
    pub fn player_seen_lately(&self, player: PlayerId, now: GameTime) -> bool {
        self.stats
            .get(&player)
            .and_then(|s| s.last_time_seen)
            .is_some_and(|seen| now.saturating_sub(seen) <= SEEN_WINDOW)
    }

    /// Any non-teammate seen within the recency window?
    pub fn any_enemy_seen_lately(&self, me: PlayerId, now: GameTime) -> bool {
        let my_team = self.stats.get(&me).map_or(TeamId::NONE, |s| s.team);
        self.stats
            .iter()
            .filter(|(player, stat)| **player != me && !stat.team.same_team(my_team))
            .any(|(player, _)| self.player_seen_lately(*player, now))
    }

    /// Land of the best-off non-teammate, for land-starvation predicates
    pub fn best_enemy_land(&self, me: PlayerId) -> u32 {
        let my_team = self.stats.get(&me).map_or(TeamId::NONE, |s| s.team);
        self.stats
            .iter()
            .filter(|(player, stat)| **player != me && !stat.team.same_team(my_team))
            .map(|(_, stat)| stat.land)
            .max()
            .unwrap_or(0)
    }

    /// Does our team-boosted power clear the strongest non-teammate's
    /// team-boosted power by the fixed safety margin?
    pub fn strong_enough(&self, me: PlayerId) -> bool {
        let my_team = self.stats.get(&me).map_or(TeamId::NONE, |s| s.team);
        let my_power = self.modified_player_power(me);
        let strongest_enemy = self
            .stats
            .iter()
            .filter(|(player, stat)| **player != me && !stat.team.same_team(my_team))
            .map(|(player, _)| self.modified_player_power(*player))
            .max()
            .unwrap_or(0);
        my_power * 100 >= strongest_enemy * (100 + POWER_MARGIN_PERCENT)
    }

    pub fn count(&self) -> usize {
        self.stats.len()
    }
}
