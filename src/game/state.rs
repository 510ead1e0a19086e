use std::time::Duration;

use super::action::Direction;
use super::entity::{ActiveEffects, Bonus, BonusKind, Hazard};

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    pub body: Vec<Position>,
    /// Current direction of movement
    pub direction: Direction,
    /// Heading requested by input, committed at the start of the next tick
    pub pending_direction: Direction,
}

impl Snake {
    /// Create a new snake with given starting position and direction
    pub fn new(head: Position, direction: Direction, length: usize) -> Self {
        let mut body = vec![head];

        // Add initial body segments behind the head
        let (dx, dy) = direction.delta();
        for i in 1..length.max(1) {
            let prev = body[i - 1];
            body.push(prev.moved_by(-dx, -dy));
        }

        Self {
            body,
            direction,
            pending_direction: direction,
        }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Get the tail position (last segment)
    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    /// Commit the pending heading unless it would reverse the snake
    pub fn commit_direction(&mut self) {
        if !self.direction.is_opposite(self.pending_direction) {
            self.direction = self.pending_direction;
        }
    }

    /// Check if moving the head to `pos` would run into the body.
    ///
    /// The head is never counted. The tail only counts when it stays put,
    /// i.e. when the snake grows this move.
    pub fn collides_with_body(&self, pos: Position, growing: bool) -> bool {
        let end = if growing {
            self.body.len()
        } else {
            self.body.len() - 1
        };
        self.body[1..end.max(1)].contains(&pos)
    }

    /// Prepend a new head, dropping the tail unless growing
    pub fn advance(&mut self, new_head: Position, grow: bool) {
        self.body.insert(0, new_head);

        if !grow {
            self.body.pop();
        }
    }

    /// Cut the snake down to at most `length` segments (never below one)
    pub fn truncate(&mut self, length: usize) {
        self.body.truncate(length.max(1));
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Phase of a game session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Running,
    Paused,
    GameOver,
}

/// What ended the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    /// Snake hit a wall
    Wall,
    /// Snake hit itself
    SelfCollision,
    /// Snake hit a bomb
    Bomb,
    /// No free cell was left for food
    BoardFull,
}

impl GameOverReason {
    pub fn describe(&self) -> &'static str {
        match self {
            GameOverReason::Wall => "Crashed into the wall",
            GameOverReason::SelfCollision => "Crossed your own trail",
            GameOverReason::Bomb => "Hit a bomb",
            GameOverReason::BoardFull => "The board is full",
        }
    }
}

/// Complete game state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    pub food: Position,
    pub bombs: Vec<Hazard>,
    pub bonuses: Vec<Bonus>,
    pub effects: ActiveEffects,
    pub grid_width: usize,
    pub grid_height: usize,
    pub score: u32,
    pub ticks: u32,
    /// Simulated time played; advances only while running
    pub elapsed: Duration,
    pub phase: Phase,
    pub game_over_reason: Option<GameOverReason>,
}

impl GameState {
    /// Create a new game state, not yet started
    pub fn new(snake: Snake, food: Position, grid_width: usize, grid_height: usize) -> Self {
        Self {
            snake,
            food,
            bombs: Vec::new(),
            bonuses: Vec::new(),
            effects: ActiveEffects::default(),
            grid_width,
            grid_height,
            score: 0,
            ticks: 0,
            elapsed: Duration::ZERO,
            phase: Phase::NotStarted,
            game_over_reason: None,
        }
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0
            && pos.x < self.grid_width as i32
            && pos.y >= 0
            && pos.y < self.grid_height as i32
    }

    /// Map a position that left the grid back onto the opposite edge
    pub fn wrap(&self, pos: Position) -> Position {
        Position::new(
            pos.x.rem_euclid(self.grid_width as i32),
            pos.y.rem_euclid(self.grid_height as i32),
        )
    }

    /// Check if a position is occupied by the snake
    pub fn is_occupied_by_snake(&self, pos: Position) -> bool {
        self.snake.contains(pos)
    }

    pub fn bomb_at(&self, pos: Position) -> bool {
        self.bombs.iter().any(|b| b.position == pos)
    }

    pub fn bonus_at(&self, pos: Position) -> Option<&Bonus> {
        self.bonuses.iter().find(|b| b.position == pos)
    }

    pub fn has_bonus(&self, kind: BonusKind) -> bool {
        self.bonuses.iter().any(|b| b.kind == kind)
    }

    /// Check if anything at all sits on a cell
    pub fn is_occupied(&self, pos: Position) -> bool {
        self.food == pos
            || self.is_occupied_by_snake(pos)
            || self.bomb_at(pos)
            || self.bonus_at(pos).is_some()
    }

    pub fn is_effect_active(&self, kind: BonusKind) -> bool {
        self.effects.is_active(kind, self.elapsed)
    }

    pub fn is_time_warped(&self) -> bool {
        self.is_effect_active(BonusKind::TimeWarp)
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::GameOver
    }
}
