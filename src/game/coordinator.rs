//! Per-game state shared by all computer players
//!
//! One coordinator exists per game, created at game start and torn down at
//! game end; each engine instance holds a handle. This replaces what would
//! otherwise be process-wide mutable state, which breaks as soon as two
//! games live in one process (replay verification does exactly that).

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::types::{GameTime, MINUTE};
use crate::game::view::GameView;

/// How long a seafaring verdict stays cached
const SEAFARING_RECHECK: GameTime = 5 * MINUTE;

/// Shared per-game state
#[derive(Debug, Default)]
pub struct GameCoordinator {
    seafaring_allowed: Option<bool>,
    last_seafaring_check: GameTime,
}

/// Handle each AI instance holds; the engine is single-threaded, so a plain
/// `Rc<RefCell<_>>` is the whole sharing story.
pub type CoordinatorHandle = Rc<RefCell<GameCoordinator>>;

impl GameCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_handle() -> CoordinatorHandle {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Whether the map supports seafaring, cached across all AI instances
    pub fn map_allows_seafaring(&mut self, view: &dyn GameView, now: GameTime) -> bool {
        match self.seafaring_allowed {
            Some(allowed) if now.saturating_sub(self.last_seafaring_check) < SEAFARING_RECHECK => {
                allowed
            }
            _ => {
                let allowed = view.map_allows_seafaring();
                self.seafaring_allowed = Some(allowed);
                self.last_seafaring_check = now;
                allowed
            }
        }
    }
}
