//! Tunable response curves and boolean decision tables
//!
//! A [`Neuron`] maps an integer position in `[0, 20]` to a signed output via
//! `weight * curve[position] / WEIGHT_LIMIT`. An [`FNeuron`] is a 32-bit
//! boolean table addressed either by raw bit index or by folding up to five
//! independent booleans into a 5-bit address - arbitrary boolean decision
//! tables without branching code.

use rand::Rng;

/// Positions a neuron curve is sampled at
pub const NEURON_POSITIONS: usize = 21;
/// Bound for weights and outputs
pub const WEIGHT_LIMIT: i32 = 100;
/// Number of available curve shapes
pub const CURVE_COUNT: usize = 4;
/// Bits in an f-neuron table
pub const FNEURON_BITS: u8 = 32;

/// Fixed curve shapes, each ending at `WEIGHT_LIMIT` so the output at
/// position 20 is exactly the weight.
///
/// 0: linear, 1: slow start (quadratic), 2: fast start (root-like),
/// 3: late step.
const CURVES: [[i32; NEURON_POSITIONS]; CURVE_COUNT] = [
    [
        0, 5, 10, 15, 20, 25, 30, 35, 40, 45, 50, 55, 60, 65, 70, 75, 80, 85, 90, 95, 100,
    ],
    [
        0, 0, 1, 2, 4, 6, 9, 12, 16, 20, 25, 30, 36, 42, 49, 56, 64, 72, 81, 90, 100,
    ],
    [
        0, 22, 32, 39, 45, 50, 55, 59, 63, 67, 71, 74, 77, 81, 84, 87, 89, 92, 95, 97, 100,
    ],
    [
        0, 0, 0, 0, 0, 5, 10, 20, 35, 50, 65, 80, 90, 95, 98, 99, 100, 100, 100, 100, 100,
    ],
];

/// One tunable response curve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neuron {
    weight: i8,
    curve: u8,
    id: u16,
    results: [i8; NEURON_POSITIONS],
}

impl Neuron {
    pub fn new(weight: i8, curve: u8, id: u16) -> Self {
        assert!(
            (curve as usize) < CURVE_COUNT,
            "neuron {id}: curve type {curve} out of range"
        );
        let mut neuron = Self {
            weight,
            curve,
            id,
            results: [0; NEURON_POSITIONS],
        };
        neuron.recalculate();
        neuron
    }

    /// Refill the precomputed result table; must run after every weight or
    /// curve change.
    fn recalculate(&mut self) {
        let curve = &CURVES[self.curve as usize];
        for (position, result) in self.results.iter_mut().enumerate() {
            *result = (self.weight as i32 * curve[position] / WEIGHT_LIMIT) as i8;
        }
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn weight(&self) -> i8 {
        self.weight
    }

    pub fn curve(&self) -> u8 {
        self.curve
    }

    pub fn set_weight(&mut self, weight: i8) {
        self.weight = weight;
        self.recalculate();
    }

    pub fn set_curve(&mut self, curve: u8) {
        assert!(
            (curve as usize) < CURVE_COUNT,
            "neuron {}: curve type {curve} out of range",
            self.id
        );
        self.curve = curve;
        self.recalculate();
    }

    /// Output at an in-range position
    pub fn result(&self, position: usize) -> i32 {
        assert!(position < NEURON_POSITIONS, "neuron position out of range");
        self.results[position] as i32
    }

    /// Output with the position clamped into range; `absolute` folds the
    /// sign away for magnitude-only callers.
    pub fn result_safe(&self, position: i32, absolute: bool) -> i32 {
        let clamped = position.clamp(0, NEURON_POSITIONS as i32 - 1) as usize;
        let result = self.results[clamped] as i32;
        if absolute {
            result.abs()
        } else {
            result
        }
    }
}

/// One tunable 32-bit boolean decision table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FNeuron {
    bits: u32,
    id: u16,
}

impl FNeuron {
    pub fn new(bits: u32, id: u16) -> Self {
        Self { bits, id }
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    /// Raw table value, for change detection and persistence
    pub fn to_int(&self) -> u32 {
        self.bits
    }

    /// Query one raw bit
    pub fn position(&self, bit: u8) -> bool {
        assert!(bit < FNEURON_BITS, "f-neuron bit out of range");
        self.bits & (1 << bit) != 0
    }

    /// Interpret five booleans as a 5-bit address into the table
    pub fn result(&self, inputs: [bool; 5]) -> bool {
        let mut address = 0u8;
        for (index, input) in inputs.iter().enumerate() {
            if *input {
                address |= 1 << index;
            }
        }
        self.position(address)
    }

    pub fn flip_bit(&mut self, bit: u8) {
        assert!(bit < FNEURON_BITS, "f-neuron bit out of range");
        self.bits ^= 1 << bit;
    }

    /// Flip each bit independently with probability `1/denominator`
    ///
    /// Returns true when at least one bit changed.
    pub fn mutate<R: Rng>(&mut self, denominator: u32, rng: &mut R) -> bool {
        let before = self.bits;
        for bit in 0..FNEURON_BITS {
            if rng.gen_ratio(1, denominator.max(1)) {
                self.flip_bit(bit);
            }
        }
        self.bits != before
    }
}
