use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use super::{
    action::{Command, Direction},
    config::GameConfig,
    entity::{has_expired, Bonus, BonusKind, EntityKind, Hazard},
    state::{GameOverReason, GameState, Phase, Position, Snake},
};

/// Random picks before falling back to scanning every cell
const MAX_SPAWN_ATTEMPTS: usize = 64;

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickResult {
    /// Whether the simulation advanced at all (false unless running)
    pub advanced: bool,
    /// Whether the snake ate food this tick
    pub ate_food: bool,
    /// Points added to the score this tick
    pub points_awarded: u32,
    /// Bonus picked up this tick
    pub bonus_collected: Option<BonusKind>,
    /// Entities that appeared on the board this tick
    pub spawned: Vec<EntityKind>,
    /// Entities that timed out and left the board this tick
    pub expired: Vec<EntityKind>,
    /// Set when this tick ended the game
    pub game_over: Option<GameOverReason>,
}

impl TickResult {
    fn progressed() -> Self {
        Self {
            advanced: true,
            ..Default::default()
        }
    }

    fn ended(reason: GameOverReason) -> Self {
        Self {
            advanced: true,
            game_over: Some(reason),
            ..Default::default()
        }
    }

    pub fn terminated(&self) -> bool {
        self.game_over.is_some()
    }
}

/// The game engine that handles all game logic
pub struct GameEngine {
    config: GameConfig,
    rng: StdRng,
}

impl GameEngine {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create an engine whose spawns are reproducible
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Build a fresh game in the not-started phase
    pub fn new_game(&mut self) -> GameState {
        let center_x = (self.config.grid_width / 2) as i32;
        let center_y = (self.config.grid_height / 2) as i32;

        let snake = Snake::new(
            Position::new(center_x, center_y),
            Direction::Right,
            self.config.initial_snake_length,
        );

        let mut state = GameState::new(
            snake,
            Position::new(0, 0),
            self.config.grid_width,
            self.config.grid_height,
        );
        // A fresh grid always has room next to a short snake
        if let Some(food) = self.find_free_cell(&state) {
            state.food = food;
        }
        state
    }

    /// Interval until the next tick for the given state
    pub fn tick_interval(&self, state: &GameState) -> Duration {
        if state.is_time_warped() {
            self.config.time_warp_tick_interval()
        } else {
            self.config.tick_interval()
        }
    }

    /// Dispatch a host command. Commands that make no sense in the
    /// current phase are ignored.
    pub fn apply(&mut self, state: &mut GameState, command: Command) {
        match command {
            Command::Steer(direction) => self.steer(state, direction),
            Command::Start => self.start(state),
            Command::Toggle => self.toggle(state),
            Command::Reset => self.reset(state),
        }
    }

    /// Record a requested heading; the last request before a tick wins
    pub fn steer(&mut self, state: &mut GameState, direction: Direction) {
        if matches!(state.phase, Phase::Running | Phase::Paused) {
            state.snake.pending_direction = direction;
        }
    }

    /// Begin play from the not-started phase
    pub fn start(&mut self, state: &mut GameState) {
        if state.phase != Phase::NotStarted {
            return;
        }
        *state = self.new_game();
        state.phase = Phase::Running;
        info!(
            width = state.grid_width,
            height = state.grid_height,
            "game started"
        );
    }

    /// Pause or resume a game in progress, or restart a finished one
    pub fn toggle(&mut self, state: &mut GameState) {
        match state.phase {
            Phase::Running => {
                state.phase = Phase::Paused;
                debug!(score = state.score, "game paused");
            }
            Phase::Paused => {
                state.phase = Phase::Running;
                debug!("game resumed");
            }
            Phase::GameOver => self.restart(state),
            Phase::NotStarted => {}
        }
    }

    /// Discard the current game and return to the not-started phase
    pub fn reset(&mut self, state: &mut GameState) {
        *state = self.new_game();
    }

    /// Reset and immediately start a new game
    pub fn restart(&mut self, state: &mut GameState) {
        self.reset(state);
        self.start(state);
    }

    /// Advance the simulation by one tick
    pub fn tick(&mut self, state: &mut GameState) -> TickResult {
        if state.phase != Phase::Running {
            return TickResult::default();
        }

        state.elapsed += self.tick_interval(state);
        state.ticks += 1;

        state.snake.commit_direction();
        let mut new_head = state.snake.head().moved_in_direction(state.snake.direction);

        if !state.is_in_bounds(new_head) {
            if self.config.wrap_around {
                new_head = state.wrap(new_head);
            } else {
                return self.end_game(state, GameOverReason::Wall);
            }
        }

        let ate_food = new_head == state.food;

        if state.snake.collides_with_body(new_head, ate_food) {
            return self.end_game(state, GameOverReason::SelfCollision);
        }

        if state.bomb_at(new_head) {
            return self.end_game(state, GameOverReason::Bomb);
        }

        let mut result = TickResult::progressed();

        let collected = state
            .bonuses
            .iter()
            .position(|b| b.position == new_head)
            .map(|i| state.bonuses.remove(i).kind);
        if let Some(kind) = collected {
            result.points_awarded += self.collect_bonus(state, kind);
            result.bonus_collected = Some(kind);
        }

        if ate_food {
            let points = if state.is_effect_active(BonusKind::ScoreDoubler) {
                self.config.food_points * 2
            } else {
                self.config.food_points
            };
            result.ate_food = true;
            result.points_awarded += points;
        }

        state.snake.advance(new_head, ate_food);
        if collected == Some(BonusKind::TrailReset) {
            state.snake.truncate(self.config.trail_reset_length);
        }
        state.score += result.points_awarded;

        if ate_food {
            match self.find_free_cell(state) {
                Some(food) => state.food = food,
                None => {
                    let mut ended = self.end_game(state, GameOverReason::BoardFull);
                    ended.ate_food = true;
                    ended.points_awarded = result.points_awarded;
                    ended.bonus_collected = result.bonus_collected;
                    return ended;
                }
            }
        }

        if state.is_effect_active(BonusKind::Magnet) {
            self.pull_food(state);
        }

        self.spawn_entities(state, &mut result);
        self.expire_entities(state, &mut result);

        result
    }

    fn end_game(&self, state: &mut GameState, reason: GameOverReason) -> TickResult {
        state.phase = Phase::GameOver;
        state.game_over_reason = Some(reason);
        info!(
            score = state.score,
            ticks = state.ticks,
            reason = ?reason,
            "game over"
        );
        TickResult::ended(reason)
    }

    /// Apply a bonus effect, returning any flat points it awards
    fn collect_bonus(&mut self, state: &mut GameState, kind: BonusKind) -> u32 {
        info!(bonus = kind.name(), "bonus collected");
        let now = state.elapsed;
        match kind {
            BonusKind::TrailReset => self.config.trail_reset_points,
            BonusKind::Magnet => {
                state
                    .effects
                    .activate(kind, now, self.config.magnet_duration());
                0
            }
            BonusKind::ScoreDoubler => {
                state
                    .effects
                    .activate(kind, now, self.config.score_doubler_duration());
                0
            }
            BonusKind::TimeWarp => {
                state
                    .effects
                    .activate(kind, now, self.config.time_warp_duration());
                0
            }
        }
    }

    /// Move food one cell toward the head on each axis, never onto an
    /// occupied cell
    fn pull_food(&self, state: &mut GameState) {
        let head = state.snake.head();

        let dx = (head.x - state.food.x).signum();
        if dx != 0 {
            let candidate = state.food.moved_by(dx, 0);
            if !state.is_occupied(candidate) {
                state.food = candidate;
            }
        }

        let dy = (head.y - state.food.y).signum();
        if dy != 0 {
            let candidate = state.food.moved_by(0, dy);
            if !state.is_occupied(candidate) {
                state.food = candidate;
            }
        }
    }

    fn spawn_entities(&mut self, state: &mut GameState, result: &mut TickResult) {
        let now = state.elapsed;

        if self.config.hazards_enabled
            && state.bombs.len() < self.config.max_bombs
            && self.rng.gen_bool(self.config.bomb_spawn_chance)
        {
            if let Some(position) = self.find_free_cell(state) {
                debug!(x = position.x, y = position.y, "bomb spawned");
                state.bombs.push(Hazard {
                    position,
                    spawned_at: now,
                });
                result.spawned.push(EntityKind::Bomb);
            }
        }

        if !self.config.bonuses_enabled {
            return;
        }

        for kind in BonusKind::ALL {
            if state.has_bonus(kind) || state.is_effect_active(kind) {
                continue;
            }
            if !self.rng.gen_bool(self.config.bonus_spawn_chance) {
                continue;
            }
            if let Some(position) = self.find_free_cell(state) {
                debug!(bonus = kind.name(), x = position.x, y = position.y, "bonus spawned");
                state.bonuses.push(Bonus {
                    kind,
                    position,
                    spawned_at: now,
                });
                result.spawned.push(EntityKind::Bonus(kind));
            }
        }
    }

    fn expire_entities(&self, state: &mut GameState, result: &mut TickResult) {
        let now = state.elapsed;
        let bomb_lifetime = self.config.bomb_lifetime();
        let bonus_lifetime = self.config.bonus_lifetime();

        let before = state.bombs.len();
        state
            .bombs
            .retain(|b| !has_expired(b.spawned_at, bomb_lifetime, now));
        for _ in state.bombs.len()..before {
            result.expired.push(EntityKind::Bomb);
        }

        state.bonuses.retain(|b| {
            let expired = has_expired(b.spawned_at, bonus_lifetime, now);
            if expired {
                result.expired.push(EntityKind::Bonus(b.kind));
            }
            !expired
        });

        for kind in state.effects.expire(now) {
            debug!(effect = kind.name(), "effect ended");
        }
    }

    /// Pick a random cell holding nothing at all
    fn find_free_cell(&mut self, state: &GameState) -> Option<Position> {
        for _ in 0..MAX_SPAWN_ATTEMPTS {
            let x = self.rng.gen_range(0..state.grid_width) as i32;
            let y = self.rng.gen_range(0..state.grid_height) as i32;
            let pos = Position::new(x, y);

            if !state.is_occupied(pos) {
                return Some(pos);
            }
        }

        // Crowded board: choose among the cells that are actually free
        let free: Vec<Position> = (0..state.grid_height as i32)
            .flat_map(|y| (0..state.grid_width as i32).map(move |x| Position::new(x, y)))
            .filter(|pos| !state.is_occupied(*pos))
            .collect();

        if free.is_empty() {
            None
        } else {
            Some(free[self.rng.gen_range(0..free.len())])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_config(width: usize, height: usize) -> GameConfig {
        GameConfig::classic(width, height)
    }

    fn running_engine(config: GameConfig) -> (GameEngine, GameState) {
        let mut engine = GameEngine::with_seed(config, 7);
        let mut state = engine.new_game();
        engine.start(&mut state);
        (engine, state)
    }

    /// A running state with a hand-placed snake and food
    fn running_state(snake: Snake, food: Position, width: usize, height: usize) -> GameState {
        let mut state = GameState::new(snake, food, width, height);
        state.phase = Phase::Running;
        state
    }

    #[test]
    fn test_new_game() {
        let mut engine = GameEngine::with_seed(GameConfig::default(), 1);
        let state = engine.new_game();

        assert_eq!(state.phase, Phase::NotStarted);
        assert_eq!(state.score, 0);
        assert_eq!(state.ticks, 0);
        assert_eq!(state.snake.len(), 3);
        assert_eq!(state.snake.head(), Position::new(20, 15));
        assert!(!state.is_occupied_by_snake(state.food));
        assert!(state.bombs.is_empty());
        assert!(state.bonuses.is_empty());
    }

    #[test]
    fn test_not_started_does_not_tick() {
        let mut engine = GameEngine::with_seed(quiet_config(10, 10), 1);
        let mut state = engine.new_game();
        let before = state.clone();

        let result = engine.tick(&mut state);

        assert!(!result.advanced);
        assert_eq!(state, before);
    }

    #[test]
    fn test_basic_movement() {
        let (mut engine, mut state) = running_engine(quiet_config(10, 10));
        state.food = Position::new(0, 0);
        let initial_head = state.snake.head();

        let result = engine.tick(&mut state);

        assert!(result.advanced);
        assert!(!result.terminated());
        assert!(!result.ate_food);
        assert_eq!(state.ticks, 1);
        assert_eq!(state.elapsed, Duration::from_millis(100));
        assert_eq!(state.snake.head(), initial_head.moved_by(1, 0));
        assert_eq!(state.snake.len(), 3);
    }

    #[test]
    fn test_eat_food_ahead() {
        let mut engine = GameEngine::with_seed(quiet_config(20, 20), 3);
        let snake = Snake::new(Position::new(10, 10), Direction::Right, 3);
        let mut state = running_state(snake, Position::new(11, 10), 20, 20);

        let result = engine.tick(&mut state);

        assert!(result.ate_food);
        assert_eq!(result.points_awarded, 10);
        assert_eq!(state.score, 10);
        assert_eq!(state.snake.len(), 4);
        assert_eq!(state.snake.head(), Position::new(11, 10));
        assert!(!state.is_occupied_by_snake(state.food));
        assert_eq!(state.phase, Phase::Running);
    }

    #[test]
    fn test_doubler_doubles_food_points() {
        let mut engine = GameEngine::with_seed(quiet_config(20, 20), 3);
        let snake = Snake::new(Position::new(10, 10), Direction::Right, 3);
        let mut state = running_state(snake, Position::new(11, 10), 20, 20);
        state
            .effects
            .activate(BonusKind::ScoreDoubler, Duration::ZERO, Duration::from_secs(10));

        let result = engine.tick(&mut state);

        assert_eq!(result.points_awarded, 20);
        assert_eq!(state.score, 20);
    }

    #[test]
    fn test_left_wall_ends_game() {
        let mut engine = GameEngine::with_seed(quiet_config(10, 10), 1);
        let snake = Snake::new(Position::new(0, 5), Direction::Left, 3);
        let mut state = running_state(snake, Position::new(5, 5), 10, 10);
        state.score = 30;
        let snake_before = state.snake.clone();

        let result = engine.tick(&mut state);

        assert!(result.terminated());
        assert_eq!(result.game_over, Some(GameOverReason::Wall));
        assert_eq!(state.phase, Phase::GameOver);
        assert_eq!(state.score, 30);
        assert_eq!(state.snake.body, snake_before.body);
        assert_eq!(state.food, Position::new(5, 5));
    }

    #[test]
    fn test_wrap_mode_reenters() {
        let config = GameConfig {
            wrap_around: true,
            ..quiet_config(10, 10)
        };
        let mut engine = GameEngine::with_seed(config, 1);
        let snake = Snake::new(Position::new(0, 5), Direction::Left, 3);
        let mut state = running_state(snake, Position::new(5, 5), 10, 10);

        let result = engine.tick(&mut state);

        assert!(!result.terminated());
        assert_eq!(state.snake.head(), Position::new(9, 5));
        assert_eq!(state.snake.len(), 3);
    }

    #[test]
    fn test_self_collision() {
        let mut engine = GameEngine::with_seed(quiet_config(10, 10), 1);

        // Body: (5,5), (4,5), (3,5), (2,5), (1,5)
        let snake = Snake::new(Position::new(5, 5), Direction::Right, 5);
        let mut state = running_state(snake, Position::new(8, 8), 10, 10);

        // Right: (6,5) (5,5) (4,5) (3,5) (2,5)
        engine.tick(&mut state);
        engine.steer(&mut state, Direction::Down);
        // Down: (6,6) (6,5) (5,5) (4,5) (3,5)
        engine.tick(&mut state);
        engine.steer(&mut state, Direction::Left);
        // Left: (5,6) (6,6) (6,5) (5,5) (4,5)
        engine.tick(&mut state);
        engine.steer(&mut state, Direction::Up);
        // Up: (5,5) is mid-body
        let result = engine.tick(&mut state);

        assert_eq!(result.game_over, Some(GameOverReason::SelfCollision));
        assert!(state.is_over());
    }

    #[test]
    fn test_moving_into_vacating_tail_is_safe() {
        let mut engine = GameEngine::with_seed(quiet_config(10, 10), 1);

        // A 2x2 loop: head (5,5) heading Up, tail at (5,6) which it vacates
        let mut snake = Snake::new(Position::new(5, 5), Direction::Left, 1);
        snake.body = vec![
            Position::new(5, 5),
            Position::new(4, 5),
            Position::new(4, 6),
            Position::new(5, 6),
        ];
        snake.direction = Direction::Right;
        snake.pending_direction = Direction::Down;
        let mut state = running_state(snake, Position::new(0, 0), 10, 10);

        let result = engine.tick(&mut state);

        assert!(!result.terminated());
        assert_eq!(state.snake.head(), Position::new(5, 6));
        assert_eq!(state.snake.len(), 4);
    }

    #[test]
    fn test_prevent_180_degree_turn() {
        let (mut engine, mut state) = running_engine(quiet_config(10, 10));
        state.food = Position::new(0, 0);
        let head = state.snake.head();

        engine.steer(&mut state, Direction::Left);
        let result = engine.tick(&mut state);

        assert!(!result.terminated());
        assert_eq!(state.snake.direction, Direction::Right);
        assert_eq!(state.snake.head(), head.moved_by(1, 0));
    }

    #[test]
    fn test_last_steer_wins() {
        let (mut engine, mut state) = running_engine(quiet_config(10, 10));
        state.food = Position::new(0, 0);

        engine.steer(&mut state, Direction::Up);
        engine.steer(&mut state, Direction::Down);
        engine.tick(&mut state);

        assert_eq!(state.snake.direction, Direction::Down);
    }

    #[test]
    fn test_bomb_ends_game_before_scoring() {
        let mut engine = GameEngine::with_seed(quiet_config(10, 10), 1);
        let snake = Snake::new(Position::new(5, 5), Direction::Right, 3);
        let mut state = running_state(snake, Position::new(0, 0), 10, 10);
        state.bombs.push(Hazard {
            position: Position::new(6, 5),
            spawned_at: Duration::ZERO,
        });

        let result = engine.tick(&mut state);

        assert_eq!(result.game_over, Some(GameOverReason::Bomb));
        assert_eq!(state.score, 0);
        assert_eq!(state.snake.len(), 3);
    }

    #[test]
    fn test_trail_reset_bonus() {
        let mut engine = GameEngine::with_seed(quiet_config(20, 20), 1);
        let snake = Snake::new(Position::new(10, 10), Direction::Right, 8);
        let mut state = running_state(snake, Position::new(0, 0), 20, 20);
        state.bonuses.push(Bonus {
            kind: BonusKind::TrailReset,
            position: Position::new(11, 10),
            spawned_at: Duration::ZERO,
        });

        let result = engine.tick(&mut state);

        assert_eq!(result.bonus_collected, Some(BonusKind::TrailReset));
        assert_eq!(state.score, 100);
        assert_eq!(state.snake.len(), 3);
        assert_eq!(state.snake.head(), Position::new(11, 10));
        assert!(state.bonuses.is_empty());
    }

    #[test]
    fn test_time_warp_slows_ticks() {
        let mut engine = GameEngine::with_seed(quiet_config(20, 20), 1);
        let snake = Snake::new(Position::new(5, 10), Direction::Right, 3);
        let mut state = running_state(snake, Position::new(0, 0), 20, 20);
        state.bonuses.push(Bonus {
            kind: BonusKind::TimeWarp,
            position: Position::new(6, 10),
            spawned_at: Duration::ZERO,
        });

        assert_eq!(engine.tick_interval(&state), Duration::from_millis(100));
        engine.tick(&mut state);

        assert!(state.is_time_warped());
        assert_eq!(engine.tick_interval(&state), Duration::from_millis(200));
        assert!(state.bonuses.is_empty());
    }

    #[test]
    fn test_magnet_pulls_food_toward_head() {
        let mut engine = GameEngine::with_seed(quiet_config(20, 20), 1);
        let snake = Snake::new(Position::new(5, 10), Direction::Right, 3);
        let mut state = running_state(snake, Position::new(15, 15), 20, 20);
        state
            .effects
            .activate(BonusKind::Magnet, Duration::ZERO, Duration::from_secs(5));

        engine.tick(&mut state);

        // Head is now (6,10); food steps one cell on each axis
        assert_eq!(state.food, Position::new(14, 14));
    }

    #[test]
    fn test_magnet_never_pulls_food_onto_snake() {
        let mut engine = GameEngine::with_seed(quiet_config(20, 20), 1);
        let snake = Snake::new(Position::new(5, 10), Direction::Up, 3);
        // After the tick the head is (5,9) and the body runs down to (5,11)
        let mut state = running_state(snake, Position::new(6, 9), 20, 20);
        state
            .effects
            .activate(BonusKind::Magnet, Duration::ZERO, Duration::from_secs(5));

        engine.tick(&mut state);

        assert_eq!(state.food, Position::new(6, 9));
        assert!(!state.is_occupied_by_snake(state.food));
    }

    #[test]
    fn test_bombs_expire() {
        let mut engine = GameEngine::with_seed(quiet_config(20, 20), 1);
        let snake = Snake::new(Position::new(5, 10), Direction::Right, 3);
        let mut state = running_state(snake, Position::new(0, 0), 20, 20);
        state.bombs.push(Hazard {
            position: Position::new(15, 2),
            spawned_at: Duration::ZERO,
        });
        state.elapsed = Duration::from_millis(7_850);

        let result = engine.tick(&mut state);
        assert!(result.expired.is_empty());
        assert_eq!(state.bombs.len(), 1);

        let result = engine.tick(&mut state);
        assert_eq!(result.expired, vec![EntityKind::Bomb]);
        assert!(state.bombs.is_empty());
    }

    #[test]
    fn test_uncollected_bonus_expires() {
        let mut engine = GameEngine::with_seed(quiet_config(20, 20), 1);
        let snake = Snake::new(Position::new(5, 10), Direction::Right, 3);
        let mut state = running_state(snake, Position::new(0, 0), 20, 20);
        state.bonuses.push(Bonus {
            kind: BonusKind::Magnet,
            position: Position::new(15, 2),
            spawned_at: Duration::ZERO,
        });
        state.elapsed = Duration::from_millis(9_850);

        let result = engine.tick(&mut state);
        assert!(result.expired.is_empty());
        assert!(state.has_bonus(BonusKind::Magnet));

        let result = engine.tick(&mut state);
        assert_eq!(result.expired, vec![EntityKind::Bonus(BonusKind::Magnet)]);
        assert!(state.bonuses.is_empty());
        assert!(!state.is_effect_active(BonusKind::Magnet));
    }

    #[test]
    fn test_food_points_return_to_normal_after_doubler() {
        let mut engine = GameEngine::with_seed(quiet_config(20, 20), 3);
        let snake = Snake::new(Position::new(10, 10), Direction::Right, 3);
        let mut state = running_state(snake, Position::new(14, 10), 20, 20);
        state
            .effects
            .activate(BonusKind::ScoreDoubler, Duration::ZERO, Duration::from_millis(300));

        for _ in 0..3 {
            assert!(!engine.tick(&mut state).ate_food);
        }
        assert!(!state.is_effect_active(BonusKind::ScoreDoubler));

        let result = engine.tick(&mut state);

        assert!(result.ate_food);
        assert_eq!(result.points_awarded, 10);
        assert_eq!(state.score, 10);
    }

    #[test]
    fn test_magnet_stops_after_duration() {
        let mut engine = GameEngine::with_seed(quiet_config(20, 20), 1);
        let snake = Snake::new(Position::new(5, 10), Direction::Right, 3);
        let mut state = running_state(snake, Position::new(15, 15), 20, 20);
        state
            .effects
            .activate(BonusKind::Magnet, Duration::ZERO, Duration::from_millis(150));

        engine.tick(&mut state);
        assert_eq!(state.food, Position::new(14, 14));

        for _ in 0..3 {
            engine.tick(&mut state);
            assert_eq!(state.food, Position::new(14, 14));
        }
        assert!(!state.is_effect_active(BonusKind::Magnet));
    }

    #[test]
    fn test_spawns_respect_caps_and_occupancy() {
        let config = GameConfig {
            wrap_around: true,
            bomb_spawn_chance: 1.0,
            bonus_spawn_chance: 1.0,
            bomb_lifetime_ms: 60_000,
            bonus_lifetime_ms: 60_000,
            ..GameConfig::new(20, 20)
        };
        let (mut engine, mut state) = running_engine(config);

        for _ in 0..10 {
            // A bomb may land in the snake's path
            if engine.tick(&mut state).terminated() {
                break;
            }
        }

        assert!(state.bombs.len() <= 3);
        for kind in BonusKind::ALL {
            assert!(state.bonuses.iter().filter(|b| b.kind == kind).count() <= 1);
        }

        let mut cells: Vec<Position> = state.snake.body.clone();
        cells.push(state.food);
        cells.extend(state.bombs.iter().map(|b| b.position));
        cells.extend(state.bonuses.iter().map(|b| b.position));
        let unique: std::collections::HashSet<_> = cells.iter().collect();
        assert_eq!(unique.len(), cells.len());
    }

    #[test]
    fn test_food_never_spawns_on_snake() {
        let (mut engine, mut state) = running_engine(quiet_config(10, 10));

        for _ in 0..200 {
            let head = state.snake.head();
            let ahead = head.moved_in_direction(state.snake.direction);
            if state.is_in_bounds(ahead) && !state.is_occupied_by_snake(ahead) {
                state.food = ahead;
            }
            if engine.tick(&mut state).terminated() {
                break;
            }
            assert!(!state.is_occupied_by_snake(state.food));
        }
    }

    #[test]
    fn test_board_full_ends_game() {
        let mut engine = GameEngine::with_seed(quiet_config(5, 5), 1);
        // Serpentine covering every cell but the food at (0,4)
        let mut body = Vec::new();
        for y in (0..5).rev() {
            let xs: Vec<i32> = if y % 2 == 0 {
                (0..5).collect()
            } else {
                (0..5).rev().collect()
            };
            for x in xs {
                body.push(Position::new(x, y));
            }
        }
        // body[0] is (0,4): drop it so it becomes the food cell
        body.remove(0);
        let mut snake = Snake::new(Position::new(1, 4), Direction::Left, 1);
        snake.body = body;
        let mut state = running_state(snake, Position::new(0, 4), 5, 5);

        let result = engine.tick(&mut state);

        assert!(result.ate_food);
        assert_eq!(result.game_over, Some(GameOverReason::BoardFull));
        assert_eq!(state.snake.len(), 25);
        assert_eq!(state.score, 10);
    }

    #[test]
    fn test_pause_freezes_simulation() {
        let (mut engine, mut state) = running_engine(GameConfig::new(20, 20));
        engine.toggle(&mut state);
        assert_eq!(state.phase, Phase::Paused);
        let frozen = state.clone();

        for _ in 0..50 {
            let result = engine.tick(&mut state);
            assert!(!result.advanced);
        }
        assert_eq!(state, frozen);

        engine.toggle(&mut state);
        assert_eq!(state.phase, Phase::Running);
    }

    #[test]
    fn test_toggle_ignored_before_start() {
        let mut engine = GameEngine::with_seed(GameConfig::default(), 1);
        let mut state = engine.new_game();
        engine.toggle(&mut state);
        assert_eq!(state.phase, Phase::NotStarted);
    }

    #[test]
    fn test_reset_after_game_over() {
        let mut engine = GameEngine::with_seed(quiet_config(10, 10), 1);
        let snake = Snake::new(Position::new(0, 5), Direction::Left, 5);
        let mut state = running_state(snake, Position::new(5, 5), 10, 10);
        state.score = 40;
        engine.tick(&mut state);
        assert!(state.is_over());

        engine.apply(&mut state, Command::Reset);

        assert_eq!(state.phase, Phase::NotStarted);
        assert_eq!(state.snake.len(), 3);
        assert_eq!(state.score, 0);
        assert_eq!(state.elapsed, Duration::ZERO);
        assert_eq!(state.game_over_reason, None);
    }

    #[test]
    fn test_toggle_restarts_after_game_over() {
        let mut engine = GameEngine::with_seed(quiet_config(10, 10), 1);
        let snake = Snake::new(Position::new(0, 5), Direction::Left, 3);
        let mut state = running_state(snake, Position::new(5, 5), 10, 10);
        engine.tick(&mut state);

        engine.apply(&mut state, Command::Toggle);

        assert_eq!(state.phase, Phase::Running);
        assert_eq!(state.score, 0);
        assert_eq!(state.snake.len(), 3);
    }

    #[test]
    fn test_safe_ticks_grow_by_at_most_one() {
        let (mut engine, mut state) = running_engine(GameConfig::new(30, 30));
        let turns = [Direction::Up, Direction::Left, Direction::Down, Direction::Right];

        for i in 0..120 {
            if i % 7 == 0 {
                engine.steer(&mut state, turns[(i / 7) % turns.len()]);
            }
            let before = state.snake.len();
            let result = engine.tick(&mut state);
            if result.terminated() {
                break;
            }
            let after = state.snake.len();
            if result.bonus_collected != Some(BonusKind::TrailReset) {
                assert!(after == before || after == before + 1);
            }
            assert_eq!(state.phase, Phase::Running);
        }
    }
}
