// SPDX-License-Identifier: GPL-3.0-only

//! Overlay annotations and preview sinks
//!
//! The feedback controller emits [`Annotation`] commands; a [`PreviewSink`]
//! presents them together with the frame. The terminal sink renders both
//! with ratatui; the recording sink captures them for tests.

pub mod terminal;

pub use terminal::TerminalPreview;

use crate::errors::AppResult;
use crate::sensor::Frame;

/// An RGB color for overlay drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const GREEN: Rgb = Rgb(0, 255, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
}

/// A drawing command in frame pixel coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    /// Rectangle outline
    Rectangle {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        color: Rgb,
    },
    /// Cross marker centered at a point
    Cross { cx: i32, cy: i32, color: Rgb },
    /// Text anchored at its top-left corner
    Text {
        x: i32,
        y: i32,
        text: String,
        color: Rgb,
    },
}

/// What the sink wants the run loop to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkEvent {
    Continue,
    /// The viewer asked to quit (q / Ctrl-C in the terminal preview)
    Quit,
}

/// Consumer of annotated frames
pub trait PreviewSink {
    fn present(&mut self, frame: &Frame, annotations: &[Annotation]) -> AppResult<SinkEvent>;
}

/// Sink that discards frames (headless runs)
pub struct NullSink;

impl PreviewSink for NullSink {
    fn present(&mut self, _frame: &Frame, _annotations: &[Annotation]) -> AppResult<SinkEvent> {
        Ok(SinkEvent::Continue)
    }
}

/// One presented frame captured by [`RecordingSink`]
#[derive(Debug, Clone)]
pub struct PresentedFrame {
    pub width: u32,
    pub height: u32,
    pub annotations: Vec<Annotation>,
}

/// Sink that records every presentation, for tests
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub frames: Vec<PresentedFrame>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreviewSink for RecordingSink {
    fn present(&mut self, frame: &Frame, annotations: &[Annotation]) -> AppResult<SinkEvent> {
        self.frames.push(PresentedFrame {
            width: frame.width,
            height: frame.height,
            annotations: annotations.to_vec(),
        });
        Ok(SinkEvent::Continue)
    }
}
