//! Interfaces between the engine and the host simulation
//!
//! The engine reads game state exclusively through [`view::GameView`] and
//! mutates it exclusively through [`commands::CommandSink`]. Host
//! notifications arrive as typed [`events::GameEvent`] values in an inbox
//! drained once per tick - there are no callbacks into the engine.

pub mod buildings;
pub mod commands;
pub mod coordinator;
pub mod events;
pub mod view;
