//! Fixed-timestep driver for a variable frame rate.
//!
//! The host feeds wall-clock time between frames into [`FrameClock`] and asks
//! for ticks with whatever interval the engine currently wants. Leftover time
//! carries into the next frame.

use std::time::Duration;

/// Most ticks run for a single frame before the backlog is dropped
pub const MAX_TICKS_PER_FRAME: u32 = 5;

#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    accumulator: Duration,
    ticks_this_frame: u32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the time elapsed since the previous frame
    pub fn accumulate(&mut self, delta: Duration) {
        self.accumulator += delta;
        self.ticks_this_frame = 0;
    }

    /// Consume one tick's worth of time if enough has built up.
    ///
    /// After [`MAX_TICKS_PER_FRAME`] ticks in one frame the remaining
    /// backlog is discarded, keeping only the sub-interval remainder.
    pub fn try_tick(&mut self, interval: Duration) -> bool {
        if interval.is_zero() || self.accumulator < interval {
            return false;
        }
        if self.ticks_this_frame >= MAX_TICKS_PER_FRAME {
            let rem = self.accumulator.as_nanos() % interval.as_nanos();
            self.accumulator = Duration::from_nanos(rem as u64);
            return false;
        }

        self.accumulator -= interval;
        self.ticks_this_frame += 1;
        true
    }

    /// Drop accumulated time, e.g. when resuming from pause
    pub fn reset(&mut self) {
        self.accumulator = Duration::ZERO;
        self.ticks_this_frame = 0;
    }

    #[cfg(test)]
    pub fn pending(&self) -> Duration {
        self.accumulator
    }
}
