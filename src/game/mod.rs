//! Core game logic module for Cosmic Tracer
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! The host drives it with commands and ticks, and reads the state back to draw it.

pub mod action;
pub mod clock;
pub mod config;
pub mod engine;
pub mod entity;
pub mod state;

// Re-export commonly used types
pub use action::{Command, Direction};
pub use clock::FrameClock;
pub use config::{ConfigError, GameConfig};
pub use engine::{GameEngine, TickResult};
pub use entity::{ActiveEffects, Bonus, BonusKind, EntityKind, Hazard};
pub use state::{GameOverReason, GameState, Phase, Position, Snake};
