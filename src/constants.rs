// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use crate::detect::LabThreshold;
use std::time::Duration;

/// Default capture device
pub const DEFAULT_DEVICE: &str = "/dev/video0";

/// Capture resolution (QVGA keeps per-frame detection cheap)
pub const FRAME_WIDTH: u32 = 320;
/// Capture resolution height
pub const FRAME_HEIGHT: u32 = 240;

/// Sensor warm-up period after configuration. Frames captured during this
/// window are discarded while gain and white balance settle.
pub const WARM_UP: Duration = Duration::from_millis(2000);

/// Deadline for a single blocking snapshot before the capture is treated
/// as failed
pub const SNAPSHOT_TIMEOUT: Duration = Duration::from_secs(2);

/// Lab threshold for black objects: low lightness, near-neutral chroma.
///
/// - L: lightness (0-100)
/// - a: green-red axis (-128 to 127)
/// - b: blue-yellow axis (-128 to 127)
pub const BLACK_THRESHOLD: LabThreshold = LabThreshold {
    l_min: 0,
    l_max: 40,
    a_min: -10,
    a_max: 10,
    b_min: -10,
    b_max: 10,
};

/// Minimum pixel count for a region to count as a black object
pub const MIN_BLACK_AREA: u32 = 1000;

/// Blue heartbeat LED period (wall-clock)
pub const HEARTBEAT_PERIOD_MS: u64 = 500;
/// Blue heartbeat LED on-window within each period (10% duty)
pub const HEARTBEAT_ON_MS: u64 = 50;

/// LED self-test: rounds of red/green/blue blinks at startup
pub const SELF_TEST_ROUNDS: u32 = 3;
/// LED self-test: on-duration of each blink
pub const SELF_TEST_BLINK: Duration = Duration::from_millis(100);

/// Status text when a black object is present
pub const STATUS_DETECTED: &str = "Black: DETECTED";
/// Status text when no black object is present
pub const STATUS_NOT_FOUND: &str = "Black: NOT FOUND";

/// Overlay position of the centroid coordinate text
pub const COORD_TEXT_POS: (i32, i32) = (10, 10);
/// Overlay position of the blob area text
pub const AREA_TEXT_POS: (i32, i32) = (10, 30);
/// Overlay x position of the FPS text
pub const FPS_TEXT_X: i32 = 10;
/// FPS text sits this many pixels above the bottom edge
pub const FPS_TEXT_BOTTOM_MARGIN: i32 = 20;
/// Status text sits this many pixels left of the right edge
pub const STATUS_TEXT_RIGHT_MARGIN: i32 = 150;
/// Overlay y position of the status text
pub const STATUS_TEXT_Y: i32 = 10;

/// Default sysfs LED names under /sys/class/leds
pub const DEFAULT_RED_LED: &str = "red:indicator";
/// Default green LED name
pub const DEFAULT_GREEN_LED: &str = "green:indicator";
/// Default blue LED name
pub const DEFAULT_BLUE_LED: &str = "blue:indicator";
