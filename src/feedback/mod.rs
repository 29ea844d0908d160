// SPDX-License-Identifier: GPL-3.0-only

//! Per-frame detection feedback
//!
//! The [`FeedbackController`] is the one component with decision logic: it
//! turns the frame's blob list into a detection verdict, LED states and
//! overlay annotations. The LED hardware side lives in [`led`].

pub mod controller;
pub mod led;

pub use controller::{FeedbackController, FrameFeedback, largest_blob};
pub use led::{LedFrame, Leds, MemoryLeds, NullLeds, SysfsLeds};
