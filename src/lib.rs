// SPDX-License-Identifier: GPL-3.0-only

//! blackspot - black object detection for camera feeds
//!
//! This library drives a camera, searches each frame for black-colored
//! regions and signals the result through a terminal preview overlay and
//! three status LEDs.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`sensor`]: Frame source abstraction (V4L2 camera, simulated sensor)
//! - [`detect`]: Blob detector abstraction and detection result types
//! - [`feedback`]: Per-frame detection feedback (the core logic) and LEDs
//! - [`preview`]: Overlay annotations and the terminal preview sink
//! - [`runloop`]: The capture -> detect -> feedback loop
//! - [`config`]: User configuration handling
//! - [`storage`]: Photo saving

pub mod clock;
pub mod config;
pub mod constants;
pub mod detect;
pub mod errors;
pub mod feedback;
pub mod preview;
pub mod runloop;
pub mod sensor;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use detect::{Blob, BlobDetector, BlobRect, LabThreshold, Roi};
pub use errors::{AppError, AppResult};
pub use feedback::{FeedbackController, FrameFeedback, LedFrame};
pub use sensor::{Frame, FrameSource};
