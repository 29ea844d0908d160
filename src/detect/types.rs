// SPDX-License-Identifier: GPL-3.0-only

//! Detection result and threshold types

use crate::errors::DetectError;
use serde::{Deserialize, Serialize};

/// Color threshold in the CIE Lab color space
///
/// Lab separates lightness (L) from the two chrominance axes (a, b), which
/// makes a simple per-axis range robust against lighting variation. Each
/// axis carries an inclusive (min, max) pair; `validate` enforces the
/// min <= max invariant before the threshold reaches a detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabThreshold {
    /// Lightness minimum (0-100)
    pub l_min: i32,
    /// Lightness maximum (0-100)
    pub l_max: i32,
    /// Green-red axis minimum (-128 to 127)
    pub a_min: i32,
    /// Green-red axis maximum
    pub a_max: i32,
    /// Blue-yellow axis minimum (-128 to 127)
    pub b_min: i32,
    /// Blue-yellow axis maximum
    pub b_max: i32,
}

impl LabThreshold {
    /// Check the min <= max invariant on every axis
    pub fn validate(&self) -> Result<(), DetectError> {
        let axes = [
            ("L", self.l_min, self.l_max),
            ("a", self.a_min, self.a_max),
            ("b", self.b_min, self.b_max),
        ];
        for (name, min, max) in axes {
            if min > max {
                return Err(DetectError::InvalidThreshold(format!(
                    "{} axis: min {} > max {}",
                    name, min, max
                )));
            }
        }
        Ok(())
    }
}

/// Region of interest: the rectangular subregion of a frame searched for blobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roi {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Roi {
    /// ROI covering an entire frame
    pub fn full_frame(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }
}

/// Bounding rectangle of a detected blob, in frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlobRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// A connected region of pixels matching a color threshold
///
/// Produced fresh each frame by a [`super::BlobDetector`]; consumers must not
/// assume any ordering of the returned sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blob {
    /// Bounding rectangle
    pub rect: BlobRect,
    /// Centroid x coordinate
    pub cx: i32,
    /// Centroid y coordinate
    pub cy: i32,
    /// Number of matching pixels in the region
    pub pixels: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_valid() {
        let t = LabThreshold {
            l_min: 0,
            l_max: 40,
            a_min: -10,
            a_max: 10,
            b_min: -10,
            b_max: 10,
        };
        assert!(t.validate().is_ok());
    }

    #[test]
    fn test_threshold_inverted_axis_rejected() {
        let t = LabThreshold {
            l_min: 50,
            l_max: 40,
            a_min: -10,
            a_max: 10,
            b_min: -10,
            b_max: 10,
        };
        assert!(t.validate().is_err());

        let t = LabThreshold {
            l_min: 0,
            l_max: 40,
            a_min: 10,
            a_max: -10,
            b_min: -10,
            b_max: 10,
        };
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_threshold_degenerate_axis_allowed() {
        // min == max is a valid (single-value) range
        let t = LabThreshold {
            l_min: 20,
            l_max: 20,
            a_min: 0,
            a_max: 0,
            b_min: 0,
            b_max: 0,
        };
        assert!(t.validate().is_ok());
    }

    #[test]
    fn test_roi_full_frame() {
        let roi = Roi::full_frame(320, 240);
        assert_eq!(roi.x, 0);
        assert_eq!(roi.y, 0);
        assert_eq!(roi.width, 320);
        assert_eq!(roi.height, 240);
    }
}
