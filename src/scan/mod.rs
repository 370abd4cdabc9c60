//! Terrain-suitability snapshots
//!
//! The engine keeps one snapshot per coordinate in its buildable/mineable
//! sets, populated by bounded area scans and expiring on a timer. Snapshots
//! are recomputed lazily when a decision routine finds them expired.

pub mod buildable;
pub mod mineable;

pub use buildable::{BuildableField, BuildableFieldsCache};
pub use mineable::{MineableField, MineableFieldsCache};
