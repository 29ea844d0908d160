// SPDX-License-Identifier: GPL-3.0-only

//! Frame source abstraction
//!
//! A [`FrameSource`] wraps a camera peripheral: configure it once, wait for
//! gain/white balance to settle, then pull one fully-formed frame per
//! blocking `snapshot` call. Frames are handed around as packed RGB24.

pub mod simulated;
pub mod v4l2;

pub use simulated::{SimulatedSensor, Square};
pub use v4l2::V4l2Sensor;

use crate::errors::SensorError;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Sensor configuration applied once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorConfig {
    /// Capture width in pixels
    pub width: u32,
    /// Capture height in pixels
    pub height: u32,
}

/// A single captured frame (packed RGB24)
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// RGB24 pixel data, `stride` bytes per row
    pub data: Arc<[u8]>,
    /// Row stride in bytes (may include padding)
    pub stride: u32,
    /// Timestamp when the frame was captured (for latency diagnostics)
    pub captured_at: Instant,
}

impl Frame {
    /// Build a frame from tightly packed RGB24 bytes (stride = width * 3)
    pub fn from_rgb(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data: Arc::from(data.into_boxed_slice()),
            stride: width * 3,
            captured_at: Instant::now(),
        }
    }

    /// Sample the RGB value at a pixel, clamping out-of-range coordinates
    pub fn rgb_at(&self, x: u32, y: u32) -> (u8, u8, u8) {
        let x = x.min(self.width.saturating_sub(1));
        let y = y.min(self.height.saturating_sub(1));
        let idx = (y * self.stride + x * 3) as usize;
        if idx + 2 < self.data.len() {
            (self.data[idx], self.data[idx + 1], self.data[idx + 2])
        } else {
            (0, 0, 0)
        }
    }

    /// Copy the pixel data without stride padding
    pub fn packed_rgb(&self) -> Vec<u8> {
        let width = self.width as usize;
        let height = self.height as usize;
        let stride = self.stride as usize;

        let mut result = Vec::with_capacity(width * height * 3);
        for y in 0..height {
            let row_start = y * stride;
            let row_end = row_start + width * 3;
            if row_end <= self.data.len() {
                result.extend_from_slice(&self.data[row_start..row_end]);
            }
        }
        result
    }
}

/// Contract for camera peripherals
///
/// `snapshot` blocks until one frame is available or the capture deadline
/// passes. `width`/`height` are stable once `configure` has succeeded.
pub trait FrameSource {
    /// Reset the sensor, tearing down any active capture
    fn reset(&mut self) -> Result<(), SensorError>;
    /// Apply pixel format and resolution; starts the capture pipeline
    fn configure(&mut self, config: &SensorConfig) -> Result<(), SensorError>;
    /// Discard frames for `duration` while the sensor settles
    fn warm_up(&mut self, duration: Duration) -> Result<(), SensorError>;
    /// Enable or disable automatic gain control
    fn set_auto_gain(&mut self, enabled: bool) -> Result<(), SensorError>;
    /// Enable or disable automatic white balance
    fn set_auto_white_balance(&mut self, enabled: bool) -> Result<(), SensorError>;
    /// Capture one frame, blocking until it is available
    fn snapshot(&mut self) -> Result<Frame, SensorError>;
    /// Configured frame width
    fn width(&self) -> u32;
    /// Configured frame height
    fn height(&self) -> u32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_rgb_strips_stride() {
        // 2x2 RGB frame with 2 bytes of stride padding per row
        let data: Vec<u8> = vec![
            255, 0, 0, // red pixel
            0, 255, 0, // green pixel
            0, 0, // stride padding
            0, 0, 255, // blue pixel
            255, 255, 255, // white pixel
            0, 0, // stride padding
        ];

        let frame = Frame {
            width: 2,
            height: 2,
            data: Arc::from(data.into_boxed_slice()),
            stride: 8,
            captured_at: Instant::now(),
        };

        let packed = frame.packed_rgb();
        assert_eq!(packed.len(), 12);
        assert_eq!(&packed[0..3], &[255, 0, 0]);
        assert_eq!(&packed[3..6], &[0, 255, 0]);
        assert_eq!(&packed[6..9], &[0, 0, 255]);
        assert_eq!(&packed[9..12], &[255, 255, 255]);
    }

    #[test]
    fn test_rgb_at_clamps_coordinates() {
        let frame = Frame::from_rgb(2, 1, vec![10, 20, 30, 40, 50, 60]);
        assert_eq!(frame.rgb_at(0, 0), (10, 20, 30));
        assert_eq!(frame.rgb_at(1, 0), (40, 50, 60));
        // Out of range clamps to the last pixel
        assert_eq!(frame.rgb_at(5, 5), (40, 50, 60));
    }
}
