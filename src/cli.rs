// SPDX-License-Identifier: GPL-3.0-only

//! CLI command implementations
//!
//! - `run`: live detection against a V4L2 camera
//! - `simulate`: scripted scene replay without hardware
//! - `list`: enumerate capture devices

use blackspot::clock::SystemClock;
use blackspot::detect::{Blob, BlobDetector, ScriptedDetector};
use blackspot::errors::AppError;
use blackspot::feedback::{Leds, NullLeds, SysfsLeds};
use blackspot::preview::TerminalPreview;
use blackspot::runloop::{self, LoopSettings};
use blackspot::sensor::{SimulatedSensor, V4l2Sensor};
use blackspot::Config;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::warn;
use v4l::video::Capture;

fn install_ctrlc_handler() -> Result<Arc<AtomicBool>, Box<dyn std::error::Error>> {
    let stop = Arc::new(AtomicBool::new(false));
    let handler_stop = stop.clone();
    ctrlc::set_handler(move || {
        handler_stop.store(true, Ordering::SeqCst);
    })?;
    Ok(stop)
}

#[cfg(feature = "opencv")]
fn build_detector() -> Result<Box<dyn BlobDetector>, AppError> {
    Ok(Box::new(blackspot::detect::opencv::OpenCvDetector::new()))
}

#[cfg(not(feature = "opencv"))]
fn build_detector() -> Result<Box<dyn BlobDetector>, AppError> {
    Err(blackspot::errors::DetectError::NotAvailable(
        "built without the 'opencv' feature; rebuild with --features opencv \
         or use the simulate subcommand"
            .to_string(),
    )
    .into())
}

/// Run live detection against a camera
pub fn run_detection(
    device: Option<String>,
    max_frames: Option<u64>,
    no_leds: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load();
    let device = device.unwrap_or_else(|| config.device.clone());

    let mut detector = build_detector()?;
    let mut sensor = V4l2Sensor::new(device);

    let mut leds: Box<dyn Leds> = if no_leds || !config.leds_enabled {
        Box::new(NullLeds)
    } else {
        match SysfsLeds::open(&config.red_led, &config.green_led, &config.blue_led) {
            Ok(bank) => Box::new(bank),
            Err(e) => {
                warn!(error = %e, "Status LEDs unavailable, continuing without");
                Box::new(NullLeds)
            }
        }
    };

    let stop = install_ctrlc_handler()?;
    let settings = LoopSettings::from_config(&config);
    let clock = SystemClock::new();

    // Printed before the alternate screen takes over the terminal
    println!("Starting black object detection...");

    let mut sink = TerminalPreview::new()?;
    let stats = runloop::run(
        &mut sensor,
        detector.as_mut(),
        leds.as_mut(),
        &mut sink,
        &clock,
        &settings,
        &stop,
        |frames| max_frames.map_or(true, |max| frames < max),
    )?;
    drop(sink);

    println!(
        "Processed {} frames, {} with a black object",
        stats.frames, stats.detections
    );
    Ok(())
}

/// Replay a synthetic moving-square scene with a scripted detector
pub fn run_simulation(frames: u64) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let mut sensor = SimulatedSensor::moving_square(config.width, config.height);

    // The detector replays exactly what the sensor renders
    let script: Vec<Vec<Blob>> = sensor
        .script()
        .iter()
        .map(|square| square.iter().map(|sq| sq.blob()).collect())
        .collect();
    let mut detector = ScriptedDetector::new(script);

    let mut leds = NullLeds;
    let stop = install_ctrlc_handler()?;
    let clock = SystemClock::new();

    let mut settings = LoopSettings::from_config(&config);
    settings.warm_up = Duration::ZERO;
    settings.run_self_test = false;

    println!("Starting black object detection...");

    let mut sink = TerminalPreview::new()?;
    let stats = runloop::run(
        &mut sensor,
        &mut detector,
        &mut leds,
        &mut sink,
        &clock,
        &settings,
        &stop,
        |done| {
            // Pace the replay so it looks like a live feed
            if done > 0 {
                std::thread::sleep(Duration::from_millis(33));
            }
            done < frames
        },
    )?;
    drop(sink);

    println!(
        "Replayed {} frames, {} with a black object",
        stats.frames, stats.detections
    );
    Ok(())
}

/// List all V4L2 capture devices with their supported formats
pub fn list_devices() -> Result<(), Box<dyn std::error::Error>> {
    let nodes = v4l::context::enum_devices();

    if nodes.is_empty() {
        println!("No capture devices found.");
        return Ok(());
    }

    println!("Available capture devices:");
    println!();
    for node in nodes {
        let name = node.name().unwrap_or_else(|| "unknown".to_string());
        println!("  {}  {}", node.path().display(), name);

        let Ok(device) = v4l::Device::with_path(node.path()) else {
            println!("      (cannot open)");
            continue;
        };

        if let Ok(caps) = device.query_caps() {
            println!("      driver: {}, card: {}", caps.driver, caps.card);
        }
        if let Ok(formats) = device.enum_formats() {
            for format in formats {
                println!("      format: {} ({})", format.fourcc, format.description);
            }
        }
    }

    Ok(())
}
