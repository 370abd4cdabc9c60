//! Genome container: persistent record, live pools, crossover and mutation
//!
//! [`ManagementData`] owns the live pools the decision routines read, and
//! mirrors them into [`PersistentDna`], the fixed-layout record the host
//! stores inside the player's save game. The two must agree at all times;
//! [`ManagementData::test_consistency`] treats any divergence as a
//! programming error, not a recoverable condition.

use ordered_float::OrderedFloat;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::{AiConfig, DifficultyLevel};
use crate::core::types::{GameTime, PlayerId};
use crate::dna::neuron::{FNeuron, Neuron, CURVE_COUNT};
use crate::dna::parents::PARENTS;
use crate::dna::{FNEURON_POOL_SIZE, MILITARY_NUMBERS_SIZE, NEURON_POOL_SIZE, PARENT_COUNT};

/// Genome slot holding the mutation-rate scalar; never mutated itself
const MUTATION_RATE_SLOT: usize = 0;
/// Size of the pre-selected "preferred" slot set per mutation pass
const PREFERRED_SET_SIZE: usize = 4;
/// Preferred slots mutate with probability 1/PREFERRED_DENOMINATOR
const PREFERRED_DENOMINATOR: u32 = 5;
/// Probability denominator floor after difficulty scaling
const MIN_DENOMINATOR: u32 = 8;
/// On a neuron mutation hit, 1-in-N swaps the curve instead of the weight
const CURVE_SWAP_DENOMINATOR: u32 = 4;
/// F-neuron bits flip far more rarely than scalar slots shift
const FNEURON_BIT_FACTOR: u32 = 5;
/// Largest single non-aggressive shift
const MAX_SHIFT: i32 = 10;

/// Fixed-layout genome record stored in the player's save game
///
/// Sizes are compile-time constants; [`PersistentDna::check_sizes`] verifies
/// them at load and any mismatch is fatal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistentDna {
    pub initialized: bool,
    pub military_numbers: Vec<i16>,
    pub neuron_weights: Vec<i8>,
    pub neuron_curves: Vec<u8>,
    pub f_neurons: Vec<u32>,
    /// Index of the primary crossover parent, for training diagnostics
    pub primary_parent: u8,
    pub review_count: u32,
    pub last_score: f32,
}

impl PersistentDna {
    /// Fatal size cross-check between record and pool constants
    pub fn check_sizes(&self) {
        assert!(self.initialized, "persistent genome never initialized");
        assert_eq!(
            self.military_numbers.len(),
            MILITARY_NUMBERS_SIZE,
            "military-number pool size mismatch"
        );
        assert_eq!(
            self.neuron_weights.len(),
            NEURON_POOL_SIZE,
            "neuron weight pool size mismatch"
        );
        assert_eq!(
            self.neuron_curves.len(),
            NEURON_POOL_SIZE,
            "neuron curve pool size mismatch"
        );
        assert_eq!(
            self.f_neurons.len(),
            FNEURON_POOL_SIZE,
            "f-neuron pool size mismatch"
        );
    }
}

/// Outcome signals fed into [`ManagementData::review`]
///
/// Collected by the engine for offline fitness evaluation of training
/// sessions; the score never drives in-game behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReviewStats {
    pub land: u32,
    pub old_land: u32,
    pub attackers: u32,
    pub trained_soldiers: u32,
    pub productive_mines: u32,
    pub ships: u32,
    pub ports: u32,
}

/// The full genome of one computer player
pub struct ManagementData {
    player_id: PlayerId,
    difficulty: DifficultyLevel,
    training_mode: bool,
    wildcard_chance: u32,
    pd: PersistentDna,
    military_numbers: Vec<i16>,
    neuron_pool: Vec<Neuron>,
    f_neuron_pool: Vec<FNeuron>,
    best_score: OrderedFloat<f32>,
    last_mutate_time: GameTime,
}

impl ManagementData {
    /// Create an empty genome; call [`Self::new_dna_for_persistent`] or load
    /// an existing record via [`Self::from_persistent`] before use.
    pub fn new(player_id: PlayerId, config: &AiConfig) -> Self {
        Self {
            player_id,
            difficulty: config.difficulty,
            training_mode: config.training_mode,
            wildcard_chance: config.wildcard_chance,
            pd: PersistentDna::default(),
            military_numbers: Vec::new(),
            neuron_pool: Vec::new(),
            f_neuron_pool: Vec::new(),
            best_score: OrderedFloat(f32::MIN),
            last_mutate_time: 0,
        }
    }

    /// Rebuild a genome from a loaded save record
    pub fn from_persistent(player_id: PlayerId, config: &AiConfig, pd: PersistentDna) -> Self {
        pd.check_sizes();
        let mut data = Self::new(player_id, config);
        data.pd = pd;
        data.copy_persistent_to_live();
        data
    }

    /// The record the host embeds in the save game
    pub fn persistent(&self) -> &PersistentDna {
        &self.pd
    }

    pub fn last_mutate_time(&self) -> GameTime {
        self.last_mutate_time
    }

    pub fn best_score(&self) -> f32 {
        self.best_score.into_inner()
    }

    /// Initialize the persistent genome by two-parent crossover
    ///
    /// Picks two distinct parents from the embedded pool; every slot copies
    /// from the primary parent with overwhelming probability, otherwise from
    /// the secondary.
    pub fn new_dna_for_persistent<R: Rng>(&mut self, rng: &mut R) {
        let primary = rng.gen_range(0..PARENT_COUNT);
        let mut secondary = rng.gen_range(0..PARENT_COUNT);
        while secondary == primary {
            secondary = rng.gen_range(0..PARENT_COUNT);
        }
        let (a, b) = (PARENTS[primary], PARENTS[secondary]);

        self.pd.military_numbers = (0..MILITARY_NUMBERS_SIZE)
            .map(|i| {
                if rng.gen_ratio(9, 10) {
                    a.military_numbers[i]
                } else {
                    b.military_numbers[i]
                }
            })
            .collect();
        self.pd.neuron_weights = (0..NEURON_POOL_SIZE)
            .map(|i| {
                if rng.gen_ratio(9, 10) {
                    a.neuron_weights[i]
                } else {
                    b.neuron_weights[i]
                }
            })
            .collect();
        self.pd.neuron_curves = (0..NEURON_POOL_SIZE)
            .map(|i| {
                if rng.gen_ratio(9, 10) {
                    a.neuron_curves[i]
                } else {
                    b.neuron_curves[i]
                }
            })
            .collect();
        self.pd.f_neurons = (0..FNEURON_POOL_SIZE)
            .map(|i| if rng.gen_ratio(9, 10) { a.f_neurons[i] } else { b.f_neurons[i] })
            .collect();
        self.pd.primary_parent = primary as u8;
        self.pd.initialized = true;
        self.pd.review_count = 0;
        self.pd.last_score = 0.0;

        tracing::debug!(
            player = self.player_id.0,
            primary,
            secondary,
            "genome initialized by crossover"
        );
        self.copy_persistent_to_live();
    }

    /// Rebuild the live pools from the persistent record
    pub fn copy_persistent_to_live(&mut self) {
        self.pd.check_sizes();
        self.military_numbers = self.pd.military_numbers.clone();
        self.neuron_pool = self
            .pd
            .neuron_weights
            .iter()
            .zip(self.pd.neuron_curves.iter())
            .enumerate()
            .map(|(id, (&weight, &curve))| Neuron::new(weight, curve, id as u16))
            .collect();
        self.f_neuron_pool = self
            .pd
            .f_neurons
            .iter()
            .enumerate()
            .map(|(id, &bits)| FNeuron::new(bits, id as u16))
            .collect();
        self.test_consistency(true);
    }

    /// Scalar genome slot
    pub fn military_number(&self, index: usize) -> i16 {
        assert!(index < MILITARY_NUMBERS_SIZE, "military number index out of range");
        self.military_numbers[index]
    }

    pub fn neuron(&self, index: usize) -> &Neuron {
        assert!(index < NEURON_POOL_SIZE, "neuron index out of range");
        &self.neuron_pool[index]
    }

    pub fn f_neuron(&self, index: usize) -> &FNeuron {
        assert!(index < FNEURON_POOL_SIZE, "f-neuron index out of range");
        &self.f_neuron_pool[index]
    }

    /// Probabilistic per-slot mutation gate
    fn do_mutate<R: Rng>(preferred: bool, denominator: u32, rng: &mut R) -> bool {
        if preferred {
            rng.gen_ratio(1, PREFERRED_DENOMINATOR)
        } else {
            rng.gen_ratio(1, denominator.max(1))
        }
    }

    /// Compute a mutated scalar value in [-100, 100]
    ///
    /// Non-aggressive shifts are bounded and clamp at zero instead of
    /// crossing it; aggressive mutation redraws the value outright and may
    /// flip the sign.
    pub(crate) fn mutate_scalar<R: Rng>(old: i32, aggressive: bool, rng: &mut R) -> i32 {
        if aggressive {
            return rng.gen_range(-100..=100);
        }
        let delta = rng.gen_range(1..=MAX_SHIFT);
        let shifted = if rng.gen_bool(0.5) { old + delta } else { old - delta };
        let clamped = shifted.clamp(-100, 100);
        if old > 0 {
            clamped.max(0)
        } else if old < 0 {
            clamped.min(0)
        } else {
            clamped
        }
    }

    /// One mutation pass over the persistent genome
    ///
    /// Intensity scales inversely with difficulty; training sessions may
    /// additionally draw a "wildcard" pass that mutates much harder to keep
    /// a population diverse. Preferred slots (a small random set per pass)
    /// mutate aggressively.
    pub fn mutate<R: Rng>(&mut self, now: GameTime, rng: &mut R) {
        self.pd.check_sizes();
        let profile = self.difficulty.profile();

        let base = 30 + u32::from(self.pd.military_numbers[MUTATION_RATE_SLOT].unsigned_abs()) * 2;
        let mut denominator = (base / profile.mutation_boost).max(MIN_DENOMINATOR);
        let wildcard = self.training_mode && rng.gen_ratio(1, self.wildcard_chance);
        if wildcard {
            denominator = (denominator / 3).max(4);
        }

        let preferred_numbers = Self::pick_preferred(MILITARY_NUMBERS_SIZE, rng);
        let preferred_neurons = Self::pick_preferred(NEURON_POOL_SIZE, rng);

        let mut mutated = 0usize;

        for i in 0..MILITARY_NUMBERS_SIZE {
            if i == MUTATION_RATE_SLOT {
                continue;
            }
            let preferred = preferred_numbers.contains(&i);
            if Self::do_mutate(preferred, denominator, rng) {
                let old = i32::from(self.pd.military_numbers[i]);
                let new = Self::mutate_scalar(old, preferred, rng);
                if new != old {
                    self.pd.military_numbers[i] = new as i16;
                    mutated += 1;
                }
            }
        }

        for i in 0..NEURON_POOL_SIZE {
            let preferred = preferred_neurons.contains(&i);
            if Self::do_mutate(preferred, denominator, rng) {
                if rng.gen_ratio(1, CURVE_SWAP_DENOMINATOR) {
                    let old_curve = self.pd.neuron_curves[i];
                    let mut curve = rng.gen_range(0..CURVE_COUNT as u8);
                    while curve == old_curve {
                        curve = rng.gen_range(0..CURVE_COUNT as u8);
                    }
                    self.pd.neuron_curves[i] = curve;
                } else {
                    let old = i32::from(self.pd.neuron_weights[i]);
                    self.pd.neuron_weights[i] = Self::mutate_scalar(old, preferred, rng) as i8;
                }
                mutated += 1;
            }
        }

        for i in 0..FNEURON_POOL_SIZE {
            let mut f = FNeuron::new(self.pd.f_neurons[i], i as u16);
            if f.mutate(denominator * FNEURON_BIT_FACTOR, rng) {
                self.pd.f_neurons[i] = f.to_int();
                mutated += 1;
            }
        }

        self.last_mutate_time = now;
        tracing::debug!(
            player = self.player_id.0,
            mutated,
            denominator,
            wildcard,
            "genome mutation pass"
        );
        self.copy_persistent_to_live();
    }

    fn pick_preferred<R: Rng>(pool_size: usize, rng: &mut R) -> Vec<usize> {
        if rng.gen_ratio(1, 5) {
            (0..PREFERRED_SET_SIZE)
                .map(|_| rng.gen_range(0..pool_size))
                .collect()
        } else {
            Vec::new()
        }
    }

    /// Cross-check live pools against the persistent record
    ///
    /// Any mismatch is a programming error; this panics rather than limping
    /// on with a desynced genome.
    pub fn test_consistency(&self, full: bool) {
        self.pd.check_sizes();
        assert_eq!(
            self.military_numbers.len(),
            MILITARY_NUMBERS_SIZE,
            "live military-number pool size mismatch"
        );
        assert_eq!(
            self.neuron_pool.len(),
            NEURON_POOL_SIZE,
            "live neuron pool size mismatch"
        );
        assert_eq!(
            self.f_neuron_pool.len(),
            FNEURON_POOL_SIZE,
            "live f-neuron pool size mismatch"
        );
        if !full {
            return;
        }
        for i in 0..MILITARY_NUMBERS_SIZE {
            assert_eq!(
                self.military_numbers[i], self.pd.military_numbers[i],
                "military number {i} desynced from persistent record"
            );
        }
        for (i, neuron) in self.neuron_pool.iter().enumerate() {
            assert_eq!(
                neuron.weight(),
                self.pd.neuron_weights[i],
                "neuron {i} weight desynced from persistent record"
            );
            assert_eq!(
                neuron.curve(),
                self.pd.neuron_curves[i],
                "neuron {i} curve desynced from persistent record"
            );
        }
        for (i, f) in self.f_neuron_pool.iter().enumerate() {
            assert_eq!(
                f.to_int(),
                self.pd.f_neurons[i],
                "f-neuron {i} desynced from persistent record"
            );
        }
    }

    /// Compute the offline fitness score from game outcome signals
    ///
    /// Only training harnesses consume this; in-game behavior never reads
    /// the score.
    pub fn review(&mut self, now: GameTime, stats: &ReviewStats) -> f32 {
        let land_growth = stats.land.saturating_sub(stats.old_land);
        let score = stats.land as f32 * 0.3
            + land_growth as f32 * 0.5
            + stats.attackers as f32 * 0.8
            + stats.trained_soldiers as f32 * 1.5
            + stats.productive_mines as f32 * 2.0
            + stats.ships as f32 * 1.0
            + stats.ports as f32 * 3.0;
        self.pd.review_count += 1;
        self.pd.last_score = score;
        self.best_score = self.best_score.max(OrderedFloat(score));
        tracing::info!(
            player = self.player_id.0,
            time = now,
            score,
            review = self.pd.review_count,
            "genome review"
        );
        score
    }
}
