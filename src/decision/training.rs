//! Training-site staffing
//!
//! Decides per training site whether to fill its trainee slots or let them
//! drain. Training eats wares, so quiet stretches with full garrisons favor
//! draining; shortages and recent fighting favor filling.

use tracing::debug;

use crate::core::types::{BuildingId, GameTime, MINUTE};
use crate::decision::signals::{flip, SignalBank};
use crate::decision::slots::{F_TRAINING, MN_TRAINING_THRESHOLD, MN_TRAINING_URGE};
use crate::dna::ManagementData;
use crate::game::commands::{Command, CommandSink};
use crate::trackers::observers::{MilitaryData, TrainingData};

/// Fill decisions per site are rate-limited to this interval
const FILL_COOLDOWN: GameTime = 3 * MINUTE;
/// Window for the "fighting recently" signal
const FIGHT_WINDOW: GameTime = 10 * MINUTE;

/// One pass over all owned training sites
pub fn check_trainingsites(
    training: &mut TrainingData,
    military: &MilitaryData,
    dna: &ManagementData,
    sink: &mut dyn CommandSink,
    now: GameTime,
) {
    if training.trainingsites.is_empty() {
        return;
    }

    let mut site_ids: Vec<BuildingId> = training.trainingsites.keys().copied().collect();
    site_ids.sort_by_key(|id| id.0);

    let soldier_shortage = military.soldier_shortage();
    let fighting = military.attacked_recently(now, FIGHT_WINDOW);

    for id in site_ids {
        let Some(site) = training.trainingsites.get(&id) else {
            continue;
        };
        if site
            .last_fill_request
            .is_some_and(|t| now.saturating_sub(t) < FILL_COOLDOWN)
        {
            continue;
        }

        let mut bank = SignalBank::new();
        bank.set(0, flip(fighting, dna.military_number(MN_TRAINING_URGE) / 10));
        // A shortage means every soldier in training is missing at the front
        bank.set(1, flip(soldier_shortage, -8));
        bank.set(2, flip(site.stationed < site.capacity, 4));
        bank.set(3, flip(military.attackers_sent > 0, 3));

        let sum = bank.masked_sum(&[dna.f_neuron(F_TRAINING)]);
        let threshold = i32::from(dna.military_number(MN_TRAINING_THRESHOLD)).abs() / 4;

        let target = if sum > threshold {
            site.capacity
        } else if sum < -threshold {
            0
        } else {
            continue;
        };

        if target != site.stationed {
            debug!(site = id.0, target, "adjusting training-site fill");
            sink.submit(Command::SetSoldierCapacity {
                building: id,
                capacity: target,
            });
            if let Some(site) = training.trainingsites.get_mut(&id) {
                site.last_fill_request = Some(now);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AiConfig;
    use crate::core::types::{Coords, PlayerId};
    use crate::core::types::BuildingTypeId;
    use crate::game::commands::CommandLog;
    use crate::trackers::observers::TrainingSiteObserver;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn genome() -> ManagementData {
        let mut rng = StdRng::seed_from_u64(21);
        let mut dna = ManagementData::new(PlayerId(1), &AiConfig::default());
        dna.new_dna_for_persistent(&mut rng);
        dna
    }

    fn site(id: u32) -> TrainingSiteObserver {
        TrainingSiteObserver {
            id: BuildingId(id),
            type_id: BuildingTypeId(7),
            coords: Coords::new(1, 1),
            built_time: 0,
            capacity: 8,
            stationed: 3,
            last_fill_request: None,
        }
    }

    #[test]
    fn test_empty_sites_silent() {
        let mut training = TrainingData::default();
        let military = MilitaryData::default();
        let dna = genome();
        let mut log = CommandLog::new();
        check_trainingsites(&mut training, &military, &dna, &mut log, 0);
        assert!(log.commands.is_empty());
    }

    #[test]
    fn test_fill_cooldown_respected() {
        let mut training = TrainingData::default();
        let mut observer = site(1);
        observer.last_fill_request = Some(0);
        training.trainingsites.insert(BuildingId(1), observer);
        let military = MilitaryData::default();
        let dna = genome();
        let mut log = CommandLog::new();
        check_trainingsites(&mut training, &military, &dna, &mut log, MINUTE);
        assert!(log.commands.is_empty());
    }

    #[test]
    fn test_fill_request_stamps_time() {
        let mut training = TrainingData::default();
        training.trainingsites.insert(BuildingId(1), site(1));
        let military = MilitaryData::default();
        let dna = genome();
        let mut log = CommandLog::new();
        check_trainingsites(&mut training, &military, &dna, &mut log, 10 * MINUTE);
        let observer = training.trainingsites.get(&BuildingId(1)).unwrap();
        // Either the decision was neutral (no command, no stamp) or a
        // command was issued and stamped - never a stamp without a command.
        assert_eq!(
            observer.last_fill_request.is_some(),
            !log.commands.is_empty()
        );
    }
}
