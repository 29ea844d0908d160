// SPDX-License-Identifier: GPL-3.0-only

//! The capture -> detect -> feedback loop
//!
//! Single-threaded and synchronous: each iteration captures one frame,
//! runs the blob search, applies LED state and presents the overlay before
//! the next begins. Termination is an injected predicate plus a shared
//! stop flag; a frame-capture failure is fatal and surfaces as the loop's
//! error.

use crate::clock::{Clock, FpsCounter};
use crate::config::Config;
use crate::detect::{BlobDetector, LabThreshold, Roi};
use crate::errors::AppResult;
use crate::feedback::{self, FeedbackController, Leds};
use crate::feedback::led::LedFrame;
use crate::preview::{PreviewSink, SinkEvent};
use crate::sensor::{FrameSource, SensorConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info};

/// Settings for one detection run
#[derive(Debug, Clone)]
pub struct LoopSettings {
    /// Requested capture width
    pub width: u32,
    /// Requested capture height
    pub height: u32,
    /// Color threshold for the target objects
    pub threshold: LabThreshold,
    /// Minimum pixel count for a detection
    pub min_blob_area: u32,
    /// Sensor warm-up time
    pub warm_up: Duration,
    /// Run the LED blink self-test during startup
    pub run_self_test: bool,
}

impl LoopSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            width: config.width,
            height: config.height,
            threshold: config.threshold,
            min_blob_area: config.min_blob_area,
            warm_up: Duration::from_millis(config.warm_up_ms),
            run_self_test: true,
        }
    }
}

/// Summary of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopStats {
    /// Frames processed
    pub frames: u64,
    /// Frames on which a black object was detected
    pub detections: u64,
}

/// Run the detection loop until `keep_going` returns false, `stop` is set,
/// or the preview asks to quit.
///
/// Startup: sensor reset, format configuration, warm-up, auto gain and
/// auto white balance off, then the LED self-test. Every per-frame step is
/// stateless apart from the FPS average.
#[allow(clippy::too_many_arguments)]
pub fn run(
    sensor: &mut dyn FrameSource,
    detector: &mut dyn BlobDetector,
    leds: &mut dyn Leds,
    sink: &mut dyn PreviewSink,
    clock: &dyn Clock,
    settings: &LoopSettings,
    stop: &AtomicBool,
    mut keep_going: impl FnMut(u64) -> bool,
) -> AppResult<LoopStats> {
    settings.threshold.validate()?;

    sensor.reset()?;
    sensor.configure(&SensorConfig {
        width: settings.width,
        height: settings.height,
    })?;
    sensor.warm_up(settings.warm_up)?;
    sensor.set_auto_gain(false)?;
    sensor.set_auto_white_balance(false)?;

    if settings.run_self_test {
        feedback::led::self_test(leds, &mut |d| std::thread::sleep(d));
    }

    let width = sensor.width();
    let height = sensor.height();
    let controller = FeedbackController::new(width, height);
    let roi = Roi::full_frame(width, height);
    let thresholds = [settings.threshold];

    info!(width, height, "Starting black object detection...");

    let mut fps = FpsCounter::new();
    let mut stats = LoopStats {
        frames: 0,
        detections: 0,
    };

    while keep_going(stats.frames) && !stop.load(Ordering::SeqCst) {
        fps.tick();

        let frame = sensor.snapshot()?;
        let blobs = detector.find_blobs(
            &frame,
            &thresholds,
            roi,
            settings.min_blob_area,
            true,
        )?;

        let result = controller.frame_update(&blobs, clock.now_ms(), fps.fps());
        if result.detected {
            stats.detections += 1;
        }

        leds.apply(&result.led);
        let event = sink.present(&frame, &result.annotations)?;
        stats.frames += 1;

        if event == SinkEvent::Quit {
            debug!("Preview requested quit");
            break;
        }
    }

    // Leave the hardware dark
    leds.apply(&LedFrame::off());

    info!(
        frames = stats.frames,
        detections = stats.detections,
        "Detection loop finished"
    );
    Ok(stats)
}
