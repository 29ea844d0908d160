// SPDX-License-Identifier: GPL-3.0-only

//! Status LED control via Linux sysfs
//!
//! Drives three discrete LEDs exposed under `/sys/class/leds/<name>` by
//! writing their `brightness` files. LED writes are cosmetic feedback:
//! failures are logged and never interrupt detection.

use crate::constants::{HEARTBEAT_ON_MS, HEARTBEAT_PERIOD_MS, SELF_TEST_BLINK, SELF_TEST_ROUNDS};
use crate::errors::LedError;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Desired state of the three LED channels for one frame
///
/// Applying the same frame twice is idempotent; the hardware lines are the
/// only state that outlives a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedFrame {
    pub red: bool,
    pub green: bool,
    pub blue: bool,
}

impl LedFrame {
    /// All channels off
    pub fn off() -> Self {
        Self::default()
    }

    /// LED state for a frame: green/red mirror the detection verdict
    /// (always exactly one of the two), blue carries the heartbeat.
    pub fn for_detection(detected: bool, now_ms: u64) -> Self {
        Self {
            red: !detected,
            green: detected,
            blue: heartbeat_on(now_ms),
        }
    }
}

/// Blue heartbeat: on during the first 50 ms of every 500 ms period,
/// regardless of detection state
pub fn heartbeat_on(now_ms: u64) -> bool {
    now_ms % HEARTBEAT_PERIOD_MS < HEARTBEAT_ON_MS
}

/// Sink for LED frames
pub trait Leds {
    /// Drive the hardware lines to match `frame`
    fn apply(&mut self, frame: &LedFrame);
}

/// A single sysfs LED
#[derive(Debug, Clone)]
struct SysfsLed {
    path: PathBuf,
    max_brightness: u32,
    name: String,
}

impl SysfsLed {
    /// Open `/sys/class/leds/<name>`, reading `max_brightness` and checking
    /// that the brightness file is writable
    fn open(leds_dir: &Path, name: &str) -> Result<Self, LedError> {
        let led_path = leds_dir.join(name);
        if !led_path.is_dir() {
            return Err(LedError::NotFound(name.to_string()));
        }

        let max_brightness_path = led_path.join("max_brightness");
        let max_brightness = std::fs::read_to_string(&max_brightness_path)
            .map_err(|e| LedError::Io(format!("{}: {}", max_brightness_path.display(), e)))?
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|v| *v > 0)
            .ok_or_else(|| LedError::Io(format!("invalid max_brightness for {}", name)))?;

        let brightness_path = led_path.join("brightness");
        std::fs::OpenOptions::new()
            .write(true)
            .open(&brightness_path)
            .map_err(|_| LedError::NotWritable(name.to_string()))?;

        info!(name, max_brightness, "Opened status LED");

        Ok(Self {
            path: led_path,
            max_brightness,
            name: name.to_string(),
        })
    }

    fn set(&self, on: bool) -> io::Result<()> {
        let value = if on { self.max_brightness } else { 0 };
        std::fs::write(self.path.join("brightness"), value.to_string())
    }
}

/// The red/green/blue status LED bank
pub struct SysfsLeds {
    red: SysfsLed,
    green: SysfsLed,
    blue: SysfsLed,
}

impl SysfsLeds {
    /// Open the three LEDs by sysfs name under `/sys/class/leds`
    pub fn open(red: &str, green: &str, blue: &str) -> Result<Self, LedError> {
        Self::open_in(Path::new("/sys/class/leds"), red, green, blue)
    }

    /// Open the LEDs under an alternate base directory (used in tests)
    pub fn open_in(leds_dir: &Path, red: &str, green: &str, blue: &str) -> Result<Self, LedError> {
        Ok(Self {
            red: SysfsLed::open(leds_dir, red)?,
            green: SysfsLed::open(leds_dir, green)?,
            blue: SysfsLed::open(leds_dir, blue)?,
        })
    }
}

impl Leds for SysfsLeds {
    fn apply(&mut self, frame: &LedFrame) {
        for (led, on) in [
            (&self.red, frame.red),
            (&self.green, frame.green),
            (&self.blue, frame.blue),
        ] {
            if let Err(e) = led.set(on) {
                warn!(led = %led.name, error = %e, "Failed to write LED brightness");
            }
        }
    }
}

/// LED sink that does nothing (headless runs, `--no-leds`)
pub struct NullLeds;

impl Leds for NullLeds {
    fn apply(&mut self, _frame: &LedFrame) {}
}

/// In-memory LED sink recording every applied frame, for tests
#[derive(Debug, Default)]
pub struct MemoryLeds {
    pub history: Vec<LedFrame>,
}

impl MemoryLeds {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently applied frame
    pub fn current(&self) -> Option<&LedFrame> {
        self.history.last()
    }
}

impl Leds for MemoryLeds {
    fn apply(&mut self, frame: &LedFrame) {
        self.history.push(*frame);
    }
}

/// Startup hardware self-test: all off, then blink red, green, blue in
/// order, three rounds. Doubles as a visual boot indicator.
pub fn self_test(leds: &mut dyn Leds, sleep: &mut dyn FnMut(Duration)) {
    leds.apply(&LedFrame::off());

    let steps = [
        LedFrame {
            red: true,
            ..LedFrame::off()
        },
        LedFrame {
            green: true,
            ..LedFrame::off()
        },
        LedFrame {
            blue: true,
            ..LedFrame::off()
        },
    ];

    for _ in 0..SELF_TEST_ROUNDS {
        for step in steps {
            leds.apply(&step);
            sleep(SELF_TEST_BLINK);
            leds.apply(&LedFrame::off());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heartbeat_duty_cycle() {
        assert!(heartbeat_on(0));
        assert!(heartbeat_on(49));
        assert!(!heartbeat_on(50));
        assert!(!heartbeat_on(499));
        // Periodic with period 500
        assert!(heartbeat_on(500));
        assert!(heartbeat_on(520));
        assert!(!heartbeat_on(600));
    }

    #[test]
    fn test_detection_leds_are_complementary() {
        for t in [0u64, 50, 499, 500, 1234] {
            let on = LedFrame::for_detection(true, t);
            assert!(on.green && !on.red);
            let off = LedFrame::for_detection(false, t);
            assert!(!off.green && off.red);
        }
    }

    #[test]
    fn test_blue_independent_of_detection() {
        assert_eq!(
            LedFrame::for_detection(true, 520).blue,
            LedFrame::for_detection(false, 520).blue
        );
        assert!(LedFrame::for_detection(true, 520).blue);
        assert!(!LedFrame::for_detection(true, 600).blue);
    }

    #[test]
    fn test_self_test_sequence() {
        let mut leds = MemoryLeds::new();
        let mut slept = Vec::new();
        self_test(&mut leds, &mut |d| slept.push(d));

        // 9 blinks of SELF_TEST_BLINK each
        assert_eq!(slept.len(), 9);
        assert!(slept.iter().all(|d| *d == SELF_TEST_BLINK));

        // Initial all-off, then (on, off) per blink
        assert_eq!(leds.history.len(), 1 + 9 * 2);
        assert_eq!(leds.history[0], LedFrame::off());

        // Blink order is red, green, blue, repeated
        let on_frames: Vec<&LedFrame> = leds.history[1..].iter().step_by(2).collect();
        for round in on_frames.chunks(3) {
            assert!(round[0].red && !round[0].green && !round[0].blue);
            assert!(round[1].green && !round[1].red && !round[1].blue);
            assert!(round[2].blue && !round[2].red && !round[2].green);
        }

        // Ends dark
        assert_eq!(*leds.history.last().unwrap(), LedFrame::off());
    }
}
