use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Reasons a [`GameConfig`] cannot be played
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("grid must be at least {min}x{min} cells, got {width}x{height}")]
    GridTooSmall {
        width: usize,
        height: usize,
        min: usize,
    },

    #[error("grid must be at most {max}x{max} cells, got {width}x{height}")]
    GridTooLarge {
        width: usize,
        height: usize,
        max: usize,
    },

    #[error("initial snake length {length} does not fit a grid {width} cells wide")]
    SnakeTooLong { length: usize, width: usize },

    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),

    #[error("{name} must be a probability in [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },
}

/// Configuration for the game
///
/// Durations are kept in milliseconds so the struct reads naturally from a
/// TOML file; use the accessor methods to get [`Duration`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the game grid
    pub grid_width: usize,
    /// Height of the game grid
    pub grid_height: usize,
    /// Initial length of the snake
    pub initial_snake_length: usize,
    /// Leaving one edge re-enters at the opposite edge instead of ending the game
    pub wrap_around: bool,

    /// Tick interval under normal conditions
    pub tick_interval_ms: u64,
    /// Tick interval while a time warp is active
    pub time_warp_tick_interval_ms: u64,

    // Scoring
    /// Points for eating food
    pub food_points: u32,
    /// Flat bonus for collecting a trail-reset power-up
    pub trail_reset_points: u32,
    /// Length the snake is cut down to by a trail-reset power-up
    pub trail_reset_length: usize,

    // Hazards
    /// Whether bombs spawn at all
    pub hazards_enabled: bool,
    /// Per-tick chance to spawn a bomb
    pub bomb_spawn_chance: f64,
    /// Maximum number of bombs on the board
    pub max_bombs: usize,
    /// Time a bomb stays on the board
    pub bomb_lifetime_ms: u64,

    // Bonuses
    /// Whether bonuses spawn at all
    pub bonuses_enabled: bool,
    /// Per-tick chance to spawn each kind of bonus
    pub bonus_spawn_chance: f64,
    /// Time an uncollected bonus stays on the board
    pub bonus_lifetime_ms: u64,
    pub magnet_duration_ms: u64,
    pub score_doubler_duration_ms: u64,
    pub time_warp_duration_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 40,
            grid_height: 30,
            initial_snake_length: 3,
            wrap_around: false,
            tick_interval_ms: 100,
            time_warp_tick_interval_ms: 200,
            food_points: 10,
            trail_reset_points: 100,
            trail_reset_length: 3,
            hazards_enabled: true,
            bomb_spawn_chance: 0.005,
            max_bombs: 3,
            bomb_lifetime_ms: 8_000,
            bonuses_enabled: true,
            bonus_spawn_chance: 0.002,
            bonus_lifetime_ms: 10_000,
            magnet_duration_ms: 5_000,
            score_doubler_duration_ms: 10_000,
            time_warp_duration_ms: 5_000,
        }
    }
}

impl GameConfig {
    /// Smallest playable grid side
    pub const MIN_GRID_SIDE: usize = 5;
    /// Keeps board sizes within terminal coordinates
    pub const MAX_GRID_SIDE: usize = 1_000;

    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10, 10)
    }

    /// Classic rules: no hazards, no bonuses
    pub fn classic(width: usize, height: usize) -> Self {
        Self {
            hazards_enabled: false,
            bonuses_enabled: false,
            ..Self::new(width, height)
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn time_warp_tick_interval(&self) -> Duration {
        Duration::from_millis(self.time_warp_tick_interval_ms)
    }

    pub fn bomb_lifetime(&self) -> Duration {
        Duration::from_millis(self.bomb_lifetime_ms)
    }

    pub fn bonus_lifetime(&self) -> Duration {
        Duration::from_millis(self.bonus_lifetime_ms)
    }

    pub fn magnet_duration(&self) -> Duration {
        Duration::from_millis(self.magnet_duration_ms)
    }

    pub fn score_doubler_duration(&self) -> Duration {
        Duration::from_millis(self.score_doubler_duration_ms)
    }

    pub fn time_warp_duration(&self) -> Duration {
        Duration::from_millis(self.time_warp_duration_ms)
    }

    /// Check that the configuration describes a playable game
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_width < Self::MIN_GRID_SIDE || self.grid_height < Self::MIN_GRID_SIDE {
            return Err(ConfigError::GridTooSmall {
                width: self.grid_width,
                height: self.grid_height,
                min: Self::MIN_GRID_SIDE,
            });
        }

        if self.grid_width > Self::MAX_GRID_SIDE || self.grid_height > Self::MAX_GRID_SIDE {
            return Err(ConfigError::GridTooLarge {
                width: self.grid_width,
                height: self.grid_height,
                max: Self::MAX_GRID_SIDE,
            });
        }

        // The snake starts at the center heading right, tail trailing left
        if self.initial_snake_length == 0 || self.initial_snake_length > self.grid_width / 2 + 1 {
            return Err(ConfigError::SnakeTooLong {
                length: self.initial_snake_length,
                width: self.grid_width,
            });
        }

        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("tick_interval_ms"));
        }
        if self.time_warp_tick_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("time_warp_tick_interval_ms"));
        }

        for (name, value) in [
            ("bomb_spawn_chance", self.bomb_spawn_chance),
            ("bonus_spawn_chance", self.bonus_spawn_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { name, value });
            }
        }

        Ok(())
    }
}
