// SPDX-License-Identifier: GPL-3.0-only

//! Scripted blob detector
//!
//! Replays a pre-planned list of per-frame detections instead of analyzing
//! pixels. Stands in for the vendor blob finder in `simulate` mode and in
//! tests, where the frame content and the expected detections are generated
//! from the same script.

use super::{Blob, BlobDetector, LabThreshold, Roi};
use crate::errors::DetectError;
use crate::sensor::Frame;
use tracing::trace;

/// Detector that yields scripted blob lists, one per frame
///
/// The script is replayed cyclically so it can drive an open-ended run loop.
/// An empty script yields an empty blob list every frame.
pub struct ScriptedDetector {
    script: Vec<Vec<Blob>>,
    index: usize,
}

impl ScriptedDetector {
    /// Create a detector from per-frame blob lists
    pub fn new(script: Vec<Vec<Blob>>) -> Self {
        Self { script, index: 0 }
    }

    /// Detector that never reports a blob
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl BlobDetector for ScriptedDetector {
    fn find_blobs(
        &mut self,
        _frame: &Frame,
        thresholds: &[LabThreshold],
        _roi: Roi,
        min_pixels: u32,
        _merge: bool,
    ) -> Result<Vec<Blob>, DetectError> {
        for threshold in thresholds {
            threshold.validate()?;
        }

        if self.script.is_empty() {
            return Ok(Vec::new());
        }

        let frame_blobs = &self.script[self.index % self.script.len()];
        self.index += 1;

        // Honor the min_pixels part of the contract even for scripted data
        let blobs: Vec<Blob> = frame_blobs
            .iter()
            .filter(|b| b.pixels >= min_pixels)
            .copied()
            .collect();

        trace!(frame = self.index, count = blobs.len(), "Scripted detection");
        Ok(blobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::BlobRect;
    use crate::sensor::Frame;

    fn blob(pixels: u32) -> Blob {
        Blob {
            rect: BlobRect {
                x: 0,
                y: 0,
                width: 10,
                height: 10,
            },
            cx: 5,
            cy: 5,
            pixels,
        }
    }

    fn frame() -> Frame {
        Frame::from_rgb(4, 4, vec![0; 48])
    }

    fn threshold() -> LabThreshold {
        crate::constants::BLACK_THRESHOLD
    }

    #[test]
    fn test_replays_script_cyclically() {
        let mut det = ScriptedDetector::new(vec![vec![blob(2000)], vec![]]);
        let roi = Roi::full_frame(4, 4);

        let first = det
            .find_blobs(&frame(), &[threshold()], roi, 1000, true)
            .unwrap();
        assert_eq!(first.len(), 1);

        let second = det
            .find_blobs(&frame(), &[threshold()], roi, 1000, true)
            .unwrap();
        assert!(second.is_empty());

        // Wraps around
        let third = det
            .find_blobs(&frame(), &[threshold()], roi, 1000, true)
            .unwrap();
        assert_eq!(third.len(), 1);
    }

    #[test]
    fn test_filters_below_min_pixels() {
        let mut det = ScriptedDetector::new(vec![vec![blob(500), blob(1500)]]);
        let roi = Roi::full_frame(4, 4);

        let blobs = det
            .find_blobs(&frame(), &[threshold()], roi, 1000, true)
            .unwrap();
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].pixels, 1500);
    }

    #[test]
    fn test_rejects_invalid_threshold() {
        let mut det = ScriptedDetector::empty();
        let bad = LabThreshold {
            l_min: 90,
            l_max: 10,
            a_min: 0,
            a_max: 0,
            b_min: 0,
            b_max: 0,
        };
        let result = det.find_blobs(&frame(), &[bad], Roi::full_frame(4, 4), 1000, true);
        assert!(result.is_err());
    }
}
