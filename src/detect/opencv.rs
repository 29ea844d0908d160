// SPDX-License-Identifier: GPL-3.0-only

//! OpenCV-backed blob detector
//!
//! Converts the frame to 8-bit Lab, masks each threshold with `in_range`,
//! OR-combines the masks and labels connected components. Only available
//! with the `opencv` cargo feature.

use super::types::{Blob, BlobRect, LabThreshold, Roi};
use super::BlobDetector;
use crate::errors::DetectError;
use crate::sensor::Frame;

use opencv::core::{self, Mat, Point, Rect, Scalar, Size, CV_8UC3};
use opencv::imgproc;
use opencv::prelude::*;

/// Blob detector built on OpenCV's connected component labeling
#[derive(Debug, Default)]
pub struct OpenCvDetector;

impl OpenCvDetector {
    pub fn new() -> Self {
        Self
    }
}

/// Map a Lab threshold to OpenCV's 8-bit Lab encoding
///
/// 8-bit Lab stores L as L*255/100 and shifts a/b by 128.
fn to_cv_range(t: &LabThreshold) -> (Scalar, Scalar) {
    let l = |v: i32| (v * 255 / 100).clamp(0, 255) as f64;
    let ab = |v: i32| (v + 128).clamp(0, 255) as f64;
    (
        Scalar::new(l(t.l_min), ab(t.a_min), ab(t.b_min), 0.0),
        Scalar::new(l(t.l_max), ab(t.a_max), ab(t.b_max), 0.0),
    )
}

impl BlobDetector for OpenCvDetector {
    fn find_blobs(
        &mut self,
        frame: &Frame,
        thresholds: &[LabThreshold],
        roi: Roi,
        min_pixels: u32,
        merge: bool,
    ) -> Result<Vec<Blob>, DetectError> {
        for threshold in thresholds {
            threshold.validate()?;
        }
        if thresholds.is_empty() || roi.width == 0 || roi.height == 0 {
            return Ok(Vec::new());
        }

        let backend = |e: opencv::Error| DetectError::Backend(e.to_string());

        let packed = frame.packed_rgb();
        let mut rgb =
            unsafe { Mat::new_rows_cols(frame.height as i32, frame.width as i32, CV_8UC3) }
                .map_err(backend)?;
        rgb.data_bytes_mut()
            .map_err(backend)?
            .copy_from_slice(&packed);

        let mut lab = Mat::default();
        imgproc::cvt_color(&rgb, &mut lab, imgproc::COLOR_RGB2Lab, 0).map_err(backend)?;

        let cv_roi = Rect::new(
            roi.x as i32,
            roi.y as i32,
            roi.width.min(frame.width - roi.x.min(frame.width)) as i32,
            roi.height.min(frame.height - roi.y.min(frame.height)) as i32,
        );
        let lab_roi = Mat::roi(&lab, cv_roi).map_err(backend)?;

        let mut mask = Mat::default();
        for (i, threshold) in thresholds.iter().enumerate() {
            let (lower, upper) = to_cv_range(threshold);
            let mut matched = Mat::default();
            core::in_range(&lab_roi, &lower, &upper, &mut matched).map_err(backend)?;
            if i == 0 {
                mask = matched;
            } else {
                let mut combined = Mat::default();
                core::bitwise_or(&mask, &matched, &mut combined, &core::no_array())
                    .map_err(backend)?;
                mask = combined;
            }
        }

        if merge {
            // Close small gaps so adjacent matching regions label as one
            let kernel = imgproc::get_structuring_element(
                imgproc::MORPH_RECT,
                Size::new(3, 3),
                Point::new(-1, -1),
            )
            .map_err(backend)?;
            let mut closed = Mat::default();
            imgproc::morphology_ex(
                &mask,
                &mut closed,
                imgproc::MORPH_CLOSE,
                &kernel,
                Point::new(-1, -1),
                1,
                core::BORDER_CONSTANT,
                imgproc::morphology_default_border_value().map_err(backend)?,
            )
            .map_err(backend)?;
            mask = closed;
        }

        let mut labels = Mat::default();
        let mut stats = Mat::default();
        let mut centroids = Mat::default();
        let count = imgproc::connected_components_with_stats(
            &mask,
            &mut labels,
            &mut stats,
            &mut centroids,
            8,
            core::CV_32S,
        )
        .map_err(backend)?;

        let mut blobs = Vec::new();
        // Label 0 is the background
        for label in 1..count {
            let area = *stats
                .at_2d::<i32>(label, imgproc::CC_STAT_AREA)
                .map_err(backend)?;
            if (area as u32) < min_pixels {
                continue;
            }

            let left = *stats
                .at_2d::<i32>(label, imgproc::CC_STAT_LEFT)
                .map_err(backend)?;
            let top = *stats
                .at_2d::<i32>(label, imgproc::CC_STAT_TOP)
                .map_err(backend)?;
            let width = *stats
                .at_2d::<i32>(label, imgproc::CC_STAT_WIDTH)
                .map_err(backend)?;
            let height = *stats
                .at_2d::<i32>(label, imgproc::CC_STAT_HEIGHT)
                .map_err(backend)?;
            let cx = *centroids.at_2d::<f64>(label, 0).map_err(backend)?;
            let cy = *centroids.at_2d::<f64>(label, 1).map_err(backend)?;

            // Stats are relative to the ROI; report frame coordinates
            blobs.push(Blob {
                rect: BlobRect {
                    x: left + roi.x as i32,
                    y: top + roi.y as i32,
                    width: width.max(0) as u32,
                    height: height.max(0) as u32,
                },
                cx: cx.round() as i32 + roi.x as i32,
                cy: cy.round() as i32 + roi.y as i32,
                pixels: area as u32,
            });
        }

        Ok(blobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_scaling() {
        let t = LabThreshold {
            l_min: 0,
            l_max: 40,
            a_min: -10,
            a_max: 10,
            b_min: -10,
            b_max: 10,
        };
        let (lower, upper) = to_cv_range(&t);
        assert_eq!(lower[0], 0.0);
        assert_eq!(upper[0], 102.0);
        assert_eq!(lower[1], 118.0);
        assert_eq!(upper[1], 138.0);
    }

    #[test]
    fn test_black_square_detected() {
        // Grey frame with a 40x40 black square at (100, 60)
        let width = 320u32;
        let height = 240u32;
        let mut data = vec![160u8; (width * height * 3) as usize];
        for y in 60..100u32 {
            for x in 100..140u32 {
                let idx = ((y * width + x) * 3) as usize;
                data[idx] = 0;
                data[idx + 1] = 0;
                data[idx + 2] = 0;
            }
        }
        let frame = Frame::from_rgb(width, height, data);

        let threshold = LabThreshold {
            l_min: 0,
            l_max: 40,
            a_min: -10,
            a_max: 10,
            b_min: -10,
            b_max: 10,
        };

        let mut detector = OpenCvDetector::new();
        let blobs = detector
            .find_blobs(
                &frame,
                &[threshold],
                Roi::full_frame(width, height),
                1000,
                true,
            )
            .unwrap();

        assert_eq!(blobs.len(), 1);
        let blob = &blobs[0];
        assert!(blob.pixels >= 1600);
        assert!((blob.cx - 120).abs() <= 2);
        assert!((blob.cy - 80).abs() <= 2);
    }

    #[test]
    fn test_small_region_filtered() {
        let width = 64u32;
        let height = 64u32;
        let mut data = vec![160u8; (width * height * 3) as usize];
        // 4x4 black square, well under the area floor
        for y in 10..14u32 {
            for x in 10..14u32 {
                let idx = ((y * width + x) * 3) as usize;
                data[idx] = 0;
                data[idx + 1] = 0;
                data[idx + 2] = 0;
            }
        }
        let frame = Frame::from_rgb(width, height, data);

        let threshold = LabThreshold {
            l_min: 0,
            l_max: 40,
            a_min: -10,
            a_max: 10,
            b_min: -10,
            b_max: 10,
        };

        let mut detector = OpenCvDetector::new();
        let blobs = detector
            .find_blobs(
                &frame,
                &[threshold],
                Roi::full_frame(width, height),
                1000,
                true,
            )
            .unwrap();

        assert!(blobs.is_empty());
    }
}
