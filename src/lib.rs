//! Hinterland AI - autonomous computer player for a territorial-expansion strategy game
//!
//! The engine is an in-process subsystem driven by the host simulation: the
//! host calls [`player::AiPlayer::think`] once per tick, the engine reads game
//! state through [`game::view::GameView`] and issues asynchronous commands
//! through [`game::commands::CommandSink`]. All decisions derive from
//! simulated time and a host-seeded RNG, so lockstep replays are bit-exact.

pub mod core;
pub mod decision;
pub mod dna;
pub mod game;
pub mod player;
pub mod scan;
pub mod sched;
pub mod trackers;
