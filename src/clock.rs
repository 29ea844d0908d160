// SPDX-License-Identifier: GPL-3.0-only

//! Wall-clock and frame-rate measurement

use std::cell::Cell;
use std::time::Instant;

/// Source of wall-clock milliseconds
///
/// The heartbeat LED duty cycle is a pure function of this value, so tests
/// drive it with a [`ManualClock`].
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Monotonic wall clock, milliseconds since construction
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}

/// Deterministic clock for tests and simulations
pub struct ManualClock {
    ms: Cell<u64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            ms: Cell::new(start_ms),
        }
    }

    pub fn set(&self, ms: u64) {
        self.ms.set(ms);
    }

    pub fn advance(&self, delta_ms: u64) {
        self.ms.set(self.ms.get() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.ms.get()
    }
}

/// Smoothed frames-per-second counter
///
/// Keeps an exponentially weighted average of the inter-frame interval so
/// the overlay number does not jitter frame to frame.
pub struct FpsCounter {
    last_tick: Option<Instant>,
    avg_frame_ms: f64,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self {
            last_tick: None,
            avg_frame_ms: 0.0,
        }
    }

    /// Record the start of a new frame
    pub fn tick(&mut self) {
        let now = Instant::now();
        if let Some(last) = self.last_tick {
            let dt_ms = now.duration_since(last).as_secs_f64() * 1000.0;
            self.avg_frame_ms = if self.avg_frame_ms == 0.0 {
                dt_ms
            } else {
                self.avg_frame_ms * 0.9 + dt_ms * 0.1
            };
        }
        self.last_tick = Some(now);
    }

    /// Current running average, 0.0 until two ticks have happened
    pub fn fps(&self) -> f64 {
        if self.avg_frame_ms > 0.0 {
            1000.0 / self.avg_frame_ms
        } else {
            0.0
        }
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(100);
        assert_eq!(clock.now_ms(), 100);
        clock.advance(450);
        assert_eq!(clock.now_ms(), 550);
        clock.set(0);
        assert_eq!(clock.now_ms(), 0);
    }

    #[test]
    fn test_fps_counter_starts_at_zero() {
        let mut fps = FpsCounter::new();
        assert_eq!(fps.fps(), 0.0);
        fps.tick();
        // Single tick gives no interval yet
        assert_eq!(fps.fps(), 0.0);
    }

    #[test]
    fn test_fps_counter_measures_interval() {
        let mut fps = FpsCounter::new();
        fps.tick();
        std::thread::sleep(std::time::Duration::from_millis(10));
        fps.tick();
        let value = fps.fps();
        assert!(value > 0.0);
        assert!(value < 1000.0);
    }
}
