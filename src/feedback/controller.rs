// SPDX-License-Identifier: GPL-3.0-only

//! The per-frame feedback controller
//!
//! Pure function of (blob list, wall-clock ms, fps): no state survives a
//! frame. Selects the dominant blob, derives the detection verdict, the LED
//! frame and the overlay annotation commands.

use super::led::LedFrame;
use crate::constants::{
    AREA_TEXT_POS, COORD_TEXT_POS, FPS_TEXT_BOTTOM_MARGIN, FPS_TEXT_X, STATUS_DETECTED,
    STATUS_NOT_FOUND, STATUS_TEXT_RIGHT_MARGIN, STATUS_TEXT_Y,
};
use crate::detect::Blob;
use crate::preview::{Annotation, Rgb};

/// Everything the rest of the loop needs from one frame's detections
#[derive(Debug, Clone)]
pub struct FrameFeedback {
    /// Black object present this frame
    pub detected: bool,
    /// LED channel states to apply
    pub led: LedFrame,
    /// Overlay drawing commands, in draw order
    pub annotations: Vec<Annotation>,
    /// The status line text (also present in `annotations`)
    pub status: &'static str,
}

/// Select the blob with the most pixels.
///
/// Tie-break: the first maximum in input order wins. Detectors give no
/// ordering guarantee, so this is explicit rather than leaning on
/// `max_by_key` (which keeps the last maximum).
pub fn largest_blob(blobs: &[Blob]) -> Option<&Blob> {
    let mut best: Option<&Blob> = None;
    for blob in blobs {
        match best {
            Some(current) if blob.pixels <= current.pixels => {}
            _ => best = Some(blob),
        }
    }
    best
}

/// Turns per-frame blob lists into detection feedback
pub struct FeedbackController {
    frame_width: u32,
    frame_height: u32,
}

impl FeedbackController {
    /// Create a controller for the configured frame dimensions
    pub fn new(frame_width: u32, frame_height: u32) -> Self {
        Self {
            frame_width,
            frame_height,
        }
    }

    /// Process one frame's detections
    pub fn frame_update(&self, blobs: &[Blob], now_ms: u64, fps: f64) -> FrameFeedback {
        let largest = largest_blob(blobs);
        let detected = largest.is_some();

        let mut annotations = Vec::with_capacity(6);

        if let Some(blob) = largest {
            annotations.push(Annotation::Rectangle {
                x: blob.rect.x,
                y: blob.rect.y,
                width: blob.rect.width,
                height: blob.rect.height,
                color: Rgb::RED,
            });
            annotations.push(Annotation::Cross {
                cx: blob.cx,
                cy: blob.cy,
                color: Rgb::GREEN,
            });
            annotations.push(Annotation::Text {
                x: COORD_TEXT_POS.0,
                y: COORD_TEXT_POS.1,
                text: format!("X: {}, Y: {}", blob.cx, blob.cy),
                color: Rgb::WHITE,
            });
            annotations.push(Annotation::Text {
                x: AREA_TEXT_POS.0,
                y: AREA_TEXT_POS.1,
                text: format!("Area: {}", blob.pixels),
                color: Rgb::WHITE,
            });
        }

        annotations.push(Annotation::Text {
            x: FPS_TEXT_X,
            y: self.frame_height as i32 - FPS_TEXT_BOTTOM_MARGIN,
            text: format!("FPS: {:.1}", fps),
            color: Rgb::WHITE,
        });

        let (status, status_color) = if detected {
            (STATUS_DETECTED, Rgb::GREEN)
        } else {
            (STATUS_NOT_FOUND, Rgb::RED)
        };
        annotations.push(Annotation::Text {
            x: self.frame_width as i32 - STATUS_TEXT_RIGHT_MARGIN,
            y: STATUS_TEXT_Y,
            text: status.to_string(),
            color: status_color,
        });

        FrameFeedback {
            detected,
            led: LedFrame::for_detection(detected, now_ms),
            annotations,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::BlobRect;

    fn blob(pixels: u32, cx: i32) -> Blob {
        Blob {
            rect: BlobRect {
                x: cx - 5,
                y: 0,
                width: 10,
                height: 10,
            },
            cx,
            cy: 5,
            pixels,
        }
    }

    #[test]
    fn test_largest_blob_picks_maximum() {
        let blobs = [blob(800, 10), blob(2000, 20), blob(1500, 30)];
        assert_eq!(largest_blob(&blobs).unwrap().pixels, 2000);
    }

    #[test]
    fn test_largest_blob_tie_break_first_wins() {
        let blobs = [blob(1000, 10), blob(1000, 20)];
        assert_eq!(largest_blob(&blobs).unwrap().cx, 10);

        // Deterministic for the reversed input too
        let reversed = [blob(1000, 20), blob(1000, 10)];
        assert_eq!(largest_blob(&reversed).unwrap().cx, 20);
    }

    #[test]
    fn test_largest_blob_empty() {
        assert!(largest_blob(&[]).is_none());
    }

    #[test]
    fn test_frame_update_annotation_layout() {
        let controller = FeedbackController::new(320, 240);
        let feedback = controller.frame_update(&[blob(1500, 50)], 0, 24.9);

        // rect, cross, coords, area, fps, status
        assert_eq!(feedback.annotations.len(), 6);

        match &feedback.annotations[4] {
            Annotation::Text { x, y, text, .. } => {
                assert_eq!(*x, 10);
                assert_eq!(*y, 220);
                assert_eq!(text, "FPS: 24.9");
            }
            other => panic!("expected FPS text, got {:?}", other),
        }

        match &feedback.annotations[5] {
            Annotation::Text { x, y, text, color } => {
                assert_eq!(*x, 170);
                assert_eq!(*y, 10);
                assert_eq!(text, STATUS_DETECTED);
                assert_eq!(*color, Rgb::GREEN);
            }
            other => panic!("expected status text, got {:?}", other),
        }
    }

    #[test]
    fn test_frame_update_empty_list() {
        let controller = FeedbackController::new(320, 240);
        let feedback = controller.frame_update(&[], 0, 0.0);

        assert!(!feedback.detected);
        assert_eq!(feedback.status, STATUS_NOT_FOUND);
        // Only FPS and status remain
        assert_eq!(feedback.annotations.len(), 2);
        assert!(!feedback
            .annotations
            .iter()
            .any(|a| matches!(a, Annotation::Rectangle { .. } | Annotation::Cross { .. })));
    }
}
