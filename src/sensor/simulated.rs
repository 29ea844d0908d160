// SPDX-License-Identifier: GPL-3.0-only

//! Simulated frame source
//!
//! Produces synthetic frames without any hardware: a grey field with an
//! optional black square per frame, driven by a script. Used by the
//! `simulate` subcommand and by tests. The matching blob script for a
//! [`crate::detect::ScriptedDetector`] comes from the same squares.

use super::{Frame, FrameSource, SensorConfig};
use crate::detect::{Blob, BlobRect};
use crate::errors::SensorError;
use std::time::Duration;
use tracing::debug;

/// Background grey level of simulated frames
const BACKGROUND: u8 = 160;
/// Pixel value inside the simulated black square
const SQUARE: u8 = 8;

/// An axis-aligned black square within a simulated frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Square {
    pub x: i32,
    pub y: i32,
    pub size: u32,
}

impl Square {
    /// The blob a perfect detector would report for this square
    pub fn blob(&self) -> Blob {
        Blob {
            rect: BlobRect {
                x: self.x,
                y: self.y,
                width: self.size,
                height: self.size,
            },
            cx: self.x + (self.size / 2) as i32,
            cy: self.y + (self.size / 2) as i32,
            pixels: self.size * self.size,
        }
    }
}

/// Frame source that renders a scripted sequence of frames
///
/// The script is replayed cyclically; an empty script produces plain grey
/// frames forever.
pub struct SimulatedSensor {
    width: u32,
    height: u32,
    script: Vec<Option<Square>>,
    index: usize,
}

impl SimulatedSensor {
    /// Create a sensor with one script entry per frame (`None` = no object)
    pub fn new(width: u32, height: u32, script: Vec<Option<Square>>) -> Self {
        Self {
            width,
            height,
            script,
            index: 0,
        }
    }

    /// Sensor that renders a square sweeping back and forth, vanishing for a
    /// stretch of each cycle so the not-found path is exercised too
    pub fn moving_square(width: u32, height: u32) -> Self {
        let script = moving_square_script(width, height, 240);
        Self::new(width, height, script)
    }

    /// The per-frame squares, for building the matching detector script
    pub fn script(&self) -> &[Option<Square>] {
        &self.script
    }

    fn render(&self, square: Option<Square>) -> Frame {
        let mut data = vec![BACKGROUND; (self.width * self.height * 3) as usize];

        if let Some(sq) = square {
            let x0 = sq.x.max(0) as u32;
            let y0 = sq.y.max(0) as u32;
            let x1 = (sq.x + sq.size as i32).clamp(0, self.width as i32) as u32;
            let y1 = (sq.y + sq.size as i32).clamp(0, self.height as i32) as u32;

            for y in y0..y1 {
                for x in x0..x1 {
                    let idx = ((y * self.width + x) * 3) as usize;
                    data[idx] = SQUARE;
                    data[idx + 1] = SQUARE;
                    data[idx + 2] = SQUARE;
                }
            }
        }

        Frame::from_rgb(self.width, self.height, data)
    }
}

impl FrameSource for SimulatedSensor {
    fn reset(&mut self) -> Result<(), SensorError> {
        self.index = 0;
        Ok(())
    }

    fn configure(&mut self, config: &SensorConfig) -> Result<(), SensorError> {
        // The simulated sensor honors whatever resolution it was built with
        if config.width != self.width || config.height != self.height {
            debug!(
                requested_width = config.width,
                requested_height = config.height,
                width = self.width,
                height = self.height,
                "Simulated sensor keeps its own resolution"
            );
        }
        Ok(())
    }

    fn warm_up(&mut self, _duration: Duration) -> Result<(), SensorError> {
        Ok(())
    }

    fn set_auto_gain(&mut self, _enabled: bool) -> Result<(), SensorError> {
        Ok(())
    }

    fn set_auto_white_balance(&mut self, _enabled: bool) -> Result<(), SensorError> {
        Ok(())
    }

    fn snapshot(&mut self) -> Result<Frame, SensorError> {
        let square = if self.script.is_empty() {
            None
        } else {
            self.script[self.index % self.script.len()]
        };
        self.index += 1;
        Ok(self.render(square))
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

/// Build a script where a square sweeps left-to-right and back, with a gap
/// of empty frames at the end of each sweep
pub fn moving_square_script(width: u32, height: u32, frames: usize) -> Vec<Option<Square>> {
    let size = (height / 4).max(8);
    let travel = width.saturating_sub(size).max(1) as i32;
    let y = ((height - size) / 2) as i32;

    (0..frames)
        .map(|i| {
            let phase = i % 120;
            match phase {
                // Sweep right
                0..=49 => Some(Square {
                    x: phase as i32 * travel / 49,
                    y,
                    size,
                }),
                // Sweep back left
                50..=99 => Some(Square {
                    x: (99 - phase as i32) * travel / 49,
                    y,
                    size,
                }),
                // Object leaves the scene
                _ => None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_square_pixels() {
        let square = Square {
            x: 2,
            y: 2,
            size: 4,
        };
        let mut sensor = SimulatedSensor::new(16, 16, vec![Some(square)]);
        let frame = sensor.snapshot().unwrap();

        assert_eq!(frame.rgb_at(0, 0), (BACKGROUND, BACKGROUND, BACKGROUND));
        assert_eq!(frame.rgb_at(3, 3), (SQUARE, SQUARE, SQUARE));
        assert_eq!(frame.rgb_at(5, 5), (SQUARE, SQUARE, SQUARE));
        assert_eq!(frame.rgb_at(6, 6), (BACKGROUND, BACKGROUND, BACKGROUND));
    }

    #[test]
    fn test_empty_script_is_plain_grey() {
        let mut sensor = SimulatedSensor::new(8, 8, Vec::new());
        let frame = sensor.snapshot().unwrap();
        assert_eq!(frame.rgb_at(4, 4), (BACKGROUND, BACKGROUND, BACKGROUND));
    }

    #[test]
    fn test_square_blob_geometry() {
        let square = Square {
            x: 10,
            y: 20,
            size: 40,
        };
        let blob = square.blob();
        assert_eq!(blob.rect.x, 10);
        assert_eq!(blob.rect.y, 20);
        assert_eq!(blob.cx, 30);
        assert_eq!(blob.cy, 40);
        assert_eq!(blob.pixels, 1600);
    }

    #[test]
    fn test_moving_square_script_has_gaps() {
        let script = moving_square_script(320, 240, 240);
        assert_eq!(script.len(), 240);
        assert!(script.iter().any(|s| s.is_some()));
        assert!(script.iter().any(|s| s.is_none()));
        // Squares stay within the frame
        for square in script.iter().flatten() {
            assert!(square.x >= 0);
            assert!(square.x + square.size as i32 <= 320);
        }
    }
}
