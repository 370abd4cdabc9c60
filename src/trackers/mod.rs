//! Long-lived caches summarizing game state
//!
//! Every tracker is owned exclusively by its engine instance, stamped with
//! simulated time and explicitly invalidated - nothing else will invalidate
//! it for the engine.

pub mod blocked_fields;
pub mod flag_candidates;
pub mod flag_distances;
pub mod observers;
pub mod strength;

pub use blocked_fields::BlockedFields;
pub use flag_candidates::{FlagCandidate, FlagCandidates};
pub use flag_distances::FlagWarehouseDistances;
pub use strength::PlayersStrengths;
