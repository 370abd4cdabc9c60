//! The engine facade: one [`AiPlayer`] per computer-controlled slot
//!
//! The host calls [`AiPlayer::think`] once per tick. Each call drains the
//! event inbox, runs the single most overdue scheduled task, and re-queues
//! it. All randomness flows through one host-seeded `ChaCha8Rng`; all timing
//! through the view's simulated clock. Two engines built from the same seed
//! and fed the same view produce byte-identical command streams.

use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::core::config::{AiConfig, DifficultyProfile};
use crate::core::types::{BuildingId, GameTime, PlayerId, MINUTE};
use crate::decision::{attack, construction, military, naval, roads, training};
use crate::dna::{ManagementData, PersistentDna, ReviewStats};
use crate::game::buildings::{BuildingCategory, BuildingDescr};
use crate::game::commands::CommandSink;
use crate::game::coordinator::CoordinatorHandle;
use crate::game::events::{EventInbox, GameEvent, ShipReport};
use crate::game::view::GameView;
use crate::scan::{BuildableFieldsCache, MineableFieldsCache};
use crate::sched::{TaskId, TaskPool};
use crate::trackers::observers::{
    ConstructionData, MilitaryData, MilitarySiteObserver, NavalData, ProductionSiteObserver,
    ShipObserver, ShipState, TrainingData, TrainingSiteObserver, WarehouseObserver,
    EnemySiteObserver,
};
use crate::trackers::{BlockedFields, FlagWarehouseDistances, PlayersStrengths};

/// Enemy sites unseen this long are purged by the cleanup task
const ENEMY_SITE_PURGE: GameTime = 10 * MINUTE;
/// Spread between the initial task offsets of different players
const PLAYER_STAGGER: GameTime = 700;

/// One autonomous computer player
pub struct AiPlayer {
    player_id: PlayerId,
    config: AiConfig,
    profile: DifficultyProfile,
    rng: ChaCha8Rng,
    dna: ManagementData,
    tasks: TaskPool,
    inbox: EventInbox,
    coordinator: CoordinatorHandle,
    strengths: PlayersStrengths,
    flag_dists: FlagWarehouseDistances,
    blocked: BlockedFields,
    buildable: BuildableFieldsCache,
    mineable: MineableFieldsCache,
    construction: ConstructionData,
    military: MilitaryData,
    naval: NavalData,
    training: TrainingData,
    road_counter: u32,
}

impl AiPlayer {
    /// Create a fresh player with a genesis genome
    ///
    /// `seed` must come from the simulation's synchronized RNG so every
    /// lockstep participant derives the same genome.
    pub fn new(
        player_id: PlayerId,
        config: AiConfig,
        seed: u64,
        coordinator: CoordinatorHandle,
        building_types: Vec<BuildingDescr>,
    ) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut dna = ManagementData::new(player_id, &config);
        dna.new_dna_for_persistent(&mut rng);
        Self::assemble(player_id, config, rng, dna, coordinator, building_types)
    }

    /// Restore a player from a loaded save record
    pub fn from_persistent(
        player_id: PlayerId,
        config: AiConfig,
        seed: u64,
        coordinator: CoordinatorHandle,
        building_types: Vec<BuildingDescr>,
        pd: PersistentDna,
    ) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(seed);
        let dna = ManagementData::from_persistent(player_id, &config, pd);
        Self::assemble(player_id, config, rng, dna, coordinator, building_types)
    }

    fn assemble(
        player_id: PlayerId,
        config: AiConfig,
        rng: ChaCha8Rng,
        dna: ManagementData,
        coordinator: CoordinatorHandle,
        building_types: Vec<BuildingDescr>,
    ) -> Self {
        let profile = config.difficulty.profile();
        let offset = GameTime::from(player_id.0) * PLAYER_STAGGER;
        let construction = ConstructionData {
            building_types,
            ..ConstructionData::default()
        };
        Self {
            player_id,
            config,
            profile,
            rng,
            dna,
            tasks: TaskPool::new(offset),
            inbox: EventInbox::new(),
            coordinator,
            strengths: PlayersStrengths::new(),
            flag_dists: FlagWarehouseDistances::new(),
            blocked: BlockedFields::new(),
            buildable: BuildableFieldsCache::new(),
            mineable: MineableFieldsCache::new(),
            construction,
            military: MilitaryData::default(),
            naval: NavalData::default(),
            training: TrainingData::default(),
            road_counter: 0,
        }
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    /// The genome record to embed in the save game
    pub fn persistent_dna(&self) -> &PersistentDna {
        self.dna.persistent()
    }

    pub fn tasks(&self) -> &TaskPool {
        &self.tasks
    }

    /// Host-side notification entry point
    pub fn push_event(&mut self, event: GameEvent) {
        self.inbox.push(event);
    }

    /// One engine tick: drain events, run the most overdue task
    pub fn think(&mut self, view: &dyn GameView, sink: &mut dyn CommandSink) {
        let now = view.time();
        self.drain_events(now);

        let Some(task) = self.tasks.next_due(now) else {
            return;
        };
        let started = Instant::now();
        self.dispatch(task, view, sink, now);
        let micros = started.elapsed().as_micros() as u64;
        self.tasks.record_exec(task, micros);
        self.tasks.reschedule(task);
    }

    fn dispatch(
        &mut self,
        task: TaskId,
        view: &dyn GameView,
        sink: &mut dyn CommandSink,
        now: GameTime,
    ) {
        match task {
            TaskId::BuildableFieldsRefresh => {
                self.buildable.sync(&view.own_buildable_fields(self.player_id));
                self.buildable.refresh_expired(view, self.player_id, now);
            }
            TaskId::MineableFieldsRefresh => {
                self.mineable.sync(&view.own_mineable_fields(self.player_id));
                self.mineable.refresh_expired(view, self.player_id, now);
            }
            TaskId::ConstructionCheck => {
                construction::construct_building(
                    &self.construction,
                    &self.military,
                    &self.strengths,
                    &self.buildable,
                    &self.mineable,
                    &mut self.blocked,
                    &self.dna,
                    view,
                    sink,
                    self.player_id,
                    now,
                );
            }
            TaskId::ProductionSitesCheck => {
                construction::check_productionsites(
                    &mut self.construction,
                    &self.dna,
                    view,
                    sink,
                    now,
                );
            }
            TaskId::RoadImprovement => {
                if let Some(origin) = roads::pick_origin_flag(view, self.player_id, self.road_counter)
                {
                    self.road_counter = self.road_counter.wrapping_add(1);
                    roads::improve_roads(
                        &mut self.flag_dists,
                        &self.dna,
                        view,
                        sink,
                        self.player_id,
                        origin,
                        now,
                    );
                }
            }
            TaskId::WarehouseDistancesRefresh => {
                for flag in view.own_flags(self.player_id) {
                    if let Some((distance, warehouse)) = view.warehouse_distance(flag) {
                        self.flag_dists.set_distance(flag, distance, warehouse, now);
                    }
                }
                while self.flag_dists.remove_old_flag(now) {}
            }
            TaskId::MilitarySitesCheck => {
                military::check_militarysites(
                    &mut self.military,
                    &self.dna,
                    view,
                    sink,
                    self.player_id,
                    now,
                );
            }
            TaskId::EnemySitesCheck => {
                attack::check_enemy_sites(
                    &mut self.military,
                    &self.strengths,
                    &self.dna,
                    &self.profile,
                    view,
                    sink,
                    self.player_id,
                    now,
                );
            }
            TaskId::TrainingSitesCheck => {
                training::check_trainingsites(
                    &mut self.training,
                    &self.military,
                    &self.dna,
                    sink,
                    now,
                );
            }
            TaskId::ShipsCheck => {
                naval::check_ships(
                    &mut self.naval,
                    &self.construction,
                    &self.dna,
                    &self.profile,
                    &self.coordinator,
                    view,
                    sink,
                    self.player_id,
                    now,
                );
            }
            TaskId::StrengthRefresh => self.refresh_strengths(view, now),
            TaskId::GenomeMutation => {
                if self.config.training_mode {
                    self.dna.mutate(now, &mut self.rng);
                }
            }
            TaskId::CacheCleanup => self.cleanup_caches(now),
        }
    }

    fn refresh_strengths(&mut self, view: &dyn GameView, now: GameTime) {
        let players = view.players();
        for player in &players {
            self.strengths.add(
                *player,
                view.player_team(*player),
                view.player_power(*player),
                view.player_land(*player),
                view.player_casualties(*player),
                now,
            );
        }
        self.strengths.retain_players(&players);
        self.strengths.recalculate_team_power();

        let (stationed, total) = view.soldier_status(self.player_id);
        self.military.soldiers_stationed = stationed;
        self.military.soldiers_total = total;

        // Enemy sites currently inside our vision refresh the per-player
        // "seen lately" stamps.
        let mut site_ids: Vec<BuildingId> = self.military.enemy_sites.keys().copied().collect();
        site_ids.sort_by_key(|id| id.0);
        for id in site_ids {
            let Some(site) = self.military.enemy_sites.get_mut(&id) else {
                continue;
            };
            if view.is_visible(self.player_id, site.coords) {
                site.last_time_seen = now;
                self.strengths.set_last_time_seen(site.owner, now);
            }
        }
    }

    fn cleanup_caches(&mut self, now: GameTime) {
        self.blocked.remove_stale(now);
        self.military
            .enemy_sites
            .retain(|_, site| now.saturating_sub(site.last_time_seen) <= ENEMY_SITE_PURGE);
    }

    fn descr_for(&self, type_id: crate::core::types::BuildingTypeId) -> Option<&BuildingDescr> {
        self.construction
            .building_types
            .iter()
            .find(|d| d.type_id == type_id)
    }

    fn drain_events(&mut self, now: GameTime) {
        for event in self.inbox.drain() {
            match event {
                GameEvent::BuildingGained {
                    building,
                    building_type,
                    category,
                    coords,
                    flag,
                    finished,
                } => {
                    let counts = self.construction.counts.entry(building_type).or_default();
                    if finished {
                        counts.built += 1;
                        counts.under_construction = counts.under_construction.saturating_sub(1);
                    } else {
                        counts.under_construction += 1;
                        continue;
                    }
                    let max_soldiers = self
                        .descr_for(building_type)
                        .map_or(0, |d| d.max_soldiers);
                    match category {
                        BuildingCategory::Military => {
                            self.military.militarysites.insert(
                                building,
                                MilitarySiteObserver {
                                    id: building,
                                    coords,
                                    flag,
                                    built_time: now,
                                    last_change: now,
                                    capacity: max_soldiers,
                                },
                            );
                        }
                        BuildingCategory::Production | BuildingCategory::Mine => {
                            self.construction.productionsites.insert(
                                building,
                                ProductionSiteObserver {
                                    id: building,
                                    type_id: building_type,
                                    coords,
                                    flag,
                                    built_time: now,
                                    no_resources_since: None,
                                    stats_pct: 0,
                                    is_mine: category == BuildingCategory::Mine,
                                    last_tweak: None,
                                },
                            );
                        }
                        BuildingCategory::Warehouse | BuildingCategory::Port => {
                            let is_port = category == BuildingCategory::Port;
                            self.construction.warehouses.insert(
                                building,
                                WarehouseObserver {
                                    id: building,
                                    coords,
                                    flag,
                                    built_time: now,
                                    is_port,
                                },
                            );
                            if is_port {
                                self.naval.ports += 1;
                            }
                        }
                        BuildingCategory::Training => {
                            self.training.trainingsites.insert(
                                building,
                                TrainingSiteObserver {
                                    id: building,
                                    type_id: building_type,
                                    coords,
                                    built_time: now,
                                    capacity: max_soldiers,
                                    stationed: 0,
                                    last_fill_request: None,
                                },
                            );
                        }
                    }
                    if !self.construction.basic_economy_established
                        && self.construction.missing_basic_types().is_empty()
                    {
                        debug!(player = self.player_id.0, "basic economy established");
                        self.construction.basic_economy_established = true;
                    }
                }
                GameEvent::BuildingLost {
                    building,
                    building_type,
                    category,
                } => {
                    let counts = self.construction.counts.entry(building_type).or_default();
                    counts.built = counts.built.saturating_sub(1);
                    match category {
                        BuildingCategory::Military => {
                            self.military.militarysites.remove(&building);
                        }
                        BuildingCategory::Production | BuildingCategory::Mine => {
                            self.construction.productionsites.remove(&building);
                        }
                        BuildingCategory::Warehouse | BuildingCategory::Port => {
                            if let Some(warehouse) =
                                self.construction.warehouses.remove(&building)
                            {
                                if warehouse.is_port {
                                    self.naval.ports = self.naval.ports.saturating_sub(1);
                                }
                            }
                        }
                        BuildingCategory::Training => {
                            self.training.trainingsites.remove(&building);
                        }
                    }
                }
                GameEvent::ShipGained { ship } => {
                    self.naval.ships.insert(ship, ShipObserver::new(ship));
                }
                GameEvent::ShipLost { ship } => {
                    self.naval.ships.remove(&ship);
                }
                GameEvent::ShipStateChanged { ship, report } => {
                    let Some(observer) = self.naval.ships.get_mut(&ship) else {
                        tracing::warn!(ship = ship.0, "state change for unknown ship");
                        continue;
                    };
                    match report {
                        ShipReport::Transport => {
                            observer.state = ShipState::Transport;
                            observer.expedition_start = None;
                            observer.waiting_since = None;
                            observer.portspace = None;
                            observer.clear_trail();
                        }
                        ShipReport::ExpeditionScouting => {
                            if observer.state == ShipState::Transport {
                                observer.expedition_start = Some(now);
                                observer.clear_trail();
                                self.naval.expeditions_started += 1;
                            }
                            observer.state = ShipState::ExpeditionScouting;
                            observer.waiting_since = None;
                        }
                        ShipReport::ExpeditionWaiting => {
                            observer.state = ShipState::ExpeditionWaiting;
                            observer.waiting_since = Some(now);
                        }
                        ShipReport::ExpeditionPortspaceFound(coords) => {
                            observer.state = ShipState::ExpeditionPortspaceFound;
                            observer.portspace = Some(coords);
                        }
                    }
                }
                GameEvent::EnemySiteSeen {
                    building,
                    flag,
                    coords,
                    owner,
                    is_warehouse,
                } => {
                    self.military
                        .enemy_sites
                        .entry(building)
                        .and_modify(|site| {
                            site.last_time_seen = now;
                            site.is_warehouse = is_warehouse;
                        })
                        .or_insert(EnemySiteObserver {
                            building,
                            flag,
                            coords,
                            owner,
                            is_warehouse,
                            last_time_seen: now,
                            last_time_attacked: None,
                            last_tested: None,
                            score: 0,
                        });
                }
                GameEvent::EnemySiteVanished { building } => {
                    self.military.enemy_sites.remove(&building);
                }
                GameEvent::SoldierTrained { .. } => {
                    self.training.trained_soldiers += 1;
                }
            }
        }
    }

    /// End-of-session fitness review; training harnesses only
    pub fn review(&mut self, view: &dyn GameView) -> f32 {
        let now = view.time();
        let stats = ReviewStats {
            land: view.player_land(self.player_id),
            old_land: self.strengths.old_player_land(self.player_id),
            attackers: self.military.attackers_sent,
            trained_soldiers: self.training.trained_soldiers,
            productive_mines: self
                .construction
                .productionsites
                .values()
                .filter(|p| p.is_mine && p.stats_pct > 0)
                .count() as u32,
            ships: self.naval.ships.len() as u32,
            ports: self.naval.ports,
        };
        self.dna.review(now, &stats)
    }
}
