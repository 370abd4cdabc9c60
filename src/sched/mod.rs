//! Cooperative task scheduler
//!
//! A fixed pool of recurring tasks created at engine startup and never
//! removed. Exactly one task body runs per engine tick: the highest-priority
//! task among those whose due time has passed. Rescheduling advances the due
//! time by the task's own interval rather than from "now", so load spikes do
//! not accumulate drift - an overloaded task catches up over the following
//! ticks instead.
//!
//! Execution-time statistics are wall-clock and feed diagnostics only; every
//! control decision derives from simulated time.

use derive_more::Display;

use crate::core::types::{GameTime, MINUTE, SECOND};

/// Identifies one recurring unit of AI work
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskId {
    #[display(fmt = "buildable_fields_refresh")]
    BuildableFieldsRefresh,
    #[display(fmt = "mineable_fields_refresh")]
    MineableFieldsRefresh,
    #[display(fmt = "construction_check")]
    ConstructionCheck,
    #[display(fmt = "road_improvement")]
    RoadImprovement,
    #[display(fmt = "production_sites_check")]
    ProductionSitesCheck,
    #[display(fmt = "warehouse_distances_refresh")]
    WarehouseDistancesRefresh,
    #[display(fmt = "military_sites_check")]
    MilitarySitesCheck,
    #[display(fmt = "enemy_sites_check")]
    EnemySitesCheck,
    #[display(fmt = "training_sites_check")]
    TrainingSitesCheck,
    #[display(fmt = "ships_check")]
    ShipsCheck,
    #[display(fmt = "strength_refresh")]
    StrengthRefresh,
    #[display(fmt = "genome_mutation")]
    GenomeMutation,
    #[display(fmt = "cache_cleanup")]
    CacheCleanup,
}

/// One recurring unit of AI work
#[derive(Debug, Clone)]
pub struct SchedulerTask {
    pub id: TaskId,
    /// Next time this task is allowed to run (simulated)
    pub due: GameTime,
    /// Re-run cadence (simulated)
    pub interval: GameTime,
    /// Higher wins among overdue tasks
    pub priority: u8,
    pub call_count: u32,
    pub total_exec_us: u64,
    pub max_exec_us: u64,
}

impl SchedulerTask {
    pub fn new(id: TaskId, first_due: GameTime, interval: GameTime, priority: u8) -> Self {
        Self {
            id,
            due: first_due,
            interval,
            priority,
            call_count: 0,
            total_exec_us: 0,
            max_exec_us: 0,
        }
    }
}

/// The fixed task pool of one engine instance
#[derive(Debug)]
pub struct TaskPool {
    tasks: Vec<SchedulerTask>,
}

impl TaskPool {
    /// Standard task catalog
    ///
    /// `offset` staggers the initial due times so several AI instances in
    /// one game do not all run their heavy passes on the same tick; derive
    /// it from the player id, never from a clock.
    pub fn new(offset: GameTime) -> Self {
        let tasks = vec![
            SchedulerTask::new(TaskId::BuildableFieldsRefresh, offset + SECOND, 4 * SECOND, 9),
            SchedulerTask::new(TaskId::MineableFieldsRefresh, offset + 2 * SECOND, 15 * SECOND, 5),
            SchedulerTask::new(TaskId::ConstructionCheck, offset + 5 * SECOND, 6 * SECOND, 8),
            SchedulerTask::new(TaskId::RoadImprovement, offset + 15 * SECOND, 10 * SECOND, 6),
            SchedulerTask::new(TaskId::ProductionSitesCheck, offset + 40 * SECOND, 30 * SECOND, 4),
            SchedulerTask::new(
                TaskId::WarehouseDistancesRefresh,
                offset + 10 * SECOND,
                30 * SECOND,
                5,
            ),
            SchedulerTask::new(TaskId::MilitarySitesCheck, offset + 20 * SECOND, 20 * SECOND, 5),
            SchedulerTask::new(TaskId::EnemySitesCheck, offset + MINUTE, 45 * SECOND, 7),
            SchedulerTask::new(TaskId::TrainingSitesCheck, offset + 90 * SECOND, MINUTE, 4),
            SchedulerTask::new(TaskId::ShipsCheck, offset + 30 * SECOND, 25 * SECOND, 4),
            SchedulerTask::new(TaskId::StrengthRefresh, offset, 10 * SECOND, 10),
            SchedulerTask::new(TaskId::GenomeMutation, offset + 10 * MINUTE, 15 * MINUTE, 2),
            SchedulerTask::new(TaskId::CacheCleanup, offset + 2 * MINUTE, 2 * MINUTE, 1),
        ];
        Self { tasks }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: TaskId) -> Option<&SchedulerTask> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Pick the task to run now: overdue, highest priority, earliest due
    /// time as tie-break.
    pub fn next_due(&self, now: GameTime) -> Option<TaskId> {
        self.tasks
            .iter()
            .filter(|t| t.due <= now)
            .max_by(|a, b| a.priority.cmp(&b.priority).then(b.due.cmp(&a.due)))
            .map(|t| t.id)
    }

    /// Advance the task's due time by its fixed interval
    pub fn reschedule(&mut self, id: TaskId) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            task.due += task.interval;
        }
    }

    /// Record wall-clock execution time; diagnostics only
    pub fn record_exec(&mut self, id: TaskId, micros: u64) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            task.call_count += 1;
            task.total_exec_us += micros;
            task.max_exec_us = task.max_exec_us.max(micros);
        }
    }
}
