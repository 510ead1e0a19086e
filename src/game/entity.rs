//! Transient board entities: hazards, bonuses, and the timed effects bonuses grant.
//!
//! All timestamps are simulated time since the game started, so nothing ages
//! while the game is paused.

use std::time::Duration;

use super::state::Position;

/// Kind of collectible bonus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BonusKind {
    /// Cuts the snake back to its minimum length and awards a flat bonus
    TrailReset,
    /// Pulls food toward the head for a while
    Magnet,
    /// Doubles food points for a while
    ScoreDoubler,
    /// Slows the tick rate for a while
    TimeWarp,
}

impl BonusKind {
    pub const ALL: [BonusKind; 4] = [
        BonusKind::TrailReset,
        BonusKind::Magnet,
        BonusKind::ScoreDoubler,
        BonusKind::TimeWarp,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BonusKind::TrailReset => "Trail Reset",
            BonusKind::Magnet => "Magnet",
            BonusKind::ScoreDoubler => "Double Points",
            BonusKind::TimeWarp => "Time Warp",
        }
    }

    /// Whether collecting this bonus starts a timed effect
    pub fn is_timed(&self) -> bool {
        !matches!(self, BonusKind::TrailReset)
    }
}

/// A bomb on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hazard {
    pub position: Position,
    pub spawned_at: Duration,
}

/// An uncollected bonus on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bonus {
    pub kind: BonusKind,
    pub position: Position,
    pub spawned_at: Duration,
}

/// Whether an entity spawned at `spawned_at` has outlived `lifetime` by `now`
pub fn has_expired(spawned_at: Duration, lifetime: Duration, now: Duration) -> bool {
    now.saturating_sub(spawned_at) >= lifetime
}

/// Kinds of entity reported in tick results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Bomb,
    Bonus(BonusKind),
}

/// Timed effects currently in force, each stored as the instant it ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActiveEffects {
    magnet_until: Option<Duration>,
    score_doubler_until: Option<Duration>,
    time_warp_until: Option<Duration>,
}

impl ActiveEffects {
    fn slot(&self, kind: BonusKind) -> Option<Duration> {
        match kind {
            BonusKind::Magnet => self.magnet_until,
            BonusKind::ScoreDoubler => self.score_doubler_until,
            BonusKind::TimeWarp => self.time_warp_until,
            BonusKind::TrailReset => None,
        }
    }

    fn slot_mut(&mut self, kind: BonusKind) -> Option<&mut Option<Duration>> {
        match kind {
            BonusKind::Magnet => Some(&mut self.magnet_until),
            BonusKind::ScoreDoubler => Some(&mut self.score_doubler_until),
            BonusKind::TimeWarp => Some(&mut self.time_warp_until),
            BonusKind::TrailReset => None,
        }
    }

    /// Start (or extend) an effect lasting `duration` from `now`
    pub fn activate(&mut self, kind: BonusKind, now: Duration, duration: Duration) {
        if let Some(slot) = self.slot_mut(kind) {
            *slot = Some(now + duration);
        }
    }

    pub fn is_active(&self, kind: BonusKind, now: Duration) -> bool {
        self.slot(kind).is_some_and(|until| now < until)
    }

    /// Time left on an effect, if it is active
    pub fn remaining(&self, kind: BonusKind, now: Duration) -> Option<Duration> {
        self.slot(kind)
            .filter(|until| now < *until)
            .map(|until| until - now)
    }

    /// Clear every effect that has run out, returning the kinds cleared.
    /// Clearing an effect that is already gone is a no-op.
    pub fn expire(&mut self, now: Duration) -> Vec<BonusKind> {
        let mut expired = Vec::new();
        for kind in BonusKind::ALL {
            if let Some(slot) = self.slot_mut(kind) {
                if slot.is_some_and(|until| now >= until) {
                    *slot = None;
                    expired.push(kind);
                }
            }
        }
        expired
    }
}
