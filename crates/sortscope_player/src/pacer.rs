//! Inter-step pacing.
//!
//! Turns a base delay and a speed multiplier into the suspension length of
//! the running loop.

use std::time::Duration;

/// Slowest accepted speed multiplier.
pub const MIN_SPEED: f64 = 0.1;
/// Fastest accepted speed multiplier.
pub const MAX_SPEED: f64 = 10.0;

/// Controls how long the running loop waits between steps.
///
/// A speed of 1.0 waits the full base delay, 2.0 waits half of it, 0.5
/// waits twice as long.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepPacer {
    base_delay: Duration,
    speed: f64,
}

impl StepPacer {
    /// Create a pacer at normal speed.
    pub fn new(base_delay: Duration) -> Self {
        Self {
            base_delay,
            speed: 1.0,
        }
    }

    /// Get the current speed multiplier.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Set the speed multiplier.
    ///
    /// Values are clamped to `[MIN_SPEED, MAX_SPEED]`. Non-finite or
    /// non-positive values are ignored. Returns the speed now in effect.
    pub fn set_speed(&mut self, speed: f64) -> f64 {
        if !speed.is_finite() || speed <= 0.0 {
            tracing::warn!(speed, "ignoring invalid speed multiplier");
            return self.speed;
        }
        self.speed = speed.clamp(MIN_SPEED, MAX_SPEED);
        self.speed
    }

    /// Delay before the next advance: `base_delay / speed`.
    pub fn delay(&self) -> Duration {
        self.base_delay.div_f64(self.speed)
    }
}

impl Default for StepPacer {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}
