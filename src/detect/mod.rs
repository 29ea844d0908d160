// SPDX-License-Identifier: GPL-3.0-only

//! Blob detection abstraction
//!
//! The actual connected-component search is a vendor service: either the
//! OpenCV adapter (cargo feature `opencv`) or a scripted replay used by
//! simulation and tests. This crate only defines the contract and the
//! result types.

#[cfg(feature = "opencv")]
pub mod opencv;
pub mod scripted;
pub mod types;

pub use scripted::ScriptedDetector;
pub use types::{Blob, BlobRect, LabThreshold, Roi};

use crate::errors::DetectError;
use crate::sensor::Frame;

/// A service that finds color-matching connected regions in a frame
///
/// Semantics: returns regions whose pixel count is at least `min_pixels`,
/// restricted to `roi`, merging adjacent matching regions when `merge` is
/// true. The order of the returned blobs is unspecified.
pub trait BlobDetector {
    fn find_blobs(
        &mut self,
        frame: &Frame,
        thresholds: &[LabThreshold],
        roi: Roi,
        min_pixels: u32,
        merge: bool,
    ) -> Result<Vec<Blob>, DetectError>;
}
