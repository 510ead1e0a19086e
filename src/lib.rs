//! Cosmic Tracer - a terminal snake arcade game
//!
//! This library provides:
//! - Core game logic: snake, food, bombs, bonuses and the tick loop (game module)
//! - Keyboard mapping (input module) and TUI drawing (render module)
//! - Session bookkeeping and the local best score (metrics, storage modules)
//! - The remote score/leaderboard client (service module)
//! - Host loops for playing and for printing the leaderboard (modes module)

pub mod config;
pub mod game;
pub mod input;
pub mod logging;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod service;
pub mod storage;
