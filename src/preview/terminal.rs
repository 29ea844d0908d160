// SPDX-License-Identifier: GPL-3.0-only

//! Terminal preview sink
//!
//! Renders the annotated camera feed to the terminal using Unicode
//! half-block characters for improved vertical resolution. Each cell shows
//! two vertically stacked pixels: the upper half as the foreground color of
//! `▀`, the lower half as the background color.

use super::{Annotation, PreviewSink, Rgb, SinkEvent};
use crate::errors::{AppError, AppResult};
use crate::sensor::Frame;
use crate::storage;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal, backend::CrosstermBackend, buffer::Buffer, layout::Rect, style::Color, style::Style,
    widgets::Widget,
};
use std::io::{self, Stdout, stdout};
use std::time::Duration;
use tracing::error;

/// Interactive terminal viewer for the annotated feed
pub struct TerminalPreview {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    status_message: String,
    show_help: bool,
}

impl TerminalPreview {
    /// Set up the terminal (raw mode, alternate screen). Restored on drop.
    pub fn new() -> AppResult<Self> {
        enable_raw_mode().map_err(|e| AppError::Other(e.to_string()))?;
        let mut out = stdout();
        execute!(out, EnterAlternateScreen).map_err(|e| AppError::Other(e.to_string()))?;
        let backend = CrosstermBackend::new(out);
        let terminal = Terminal::new(backend).map_err(|e| AppError::Other(e.to_string()))?;

        Ok(Self {
            terminal,
            status_message: default_status(),
            show_help: false,
        })
    }

    fn handle_keys(&mut self, frame: &Frame) -> io::Result<SinkEvent> {
        if event::poll(Duration::from_millis(1))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                return Ok(SinkEvent::Quit);
            }

            match key.code {
                KeyCode::Char('q') => return Ok(SinkEvent::Quit),
                KeyCode::Char('p') => {
                    self.show_help = false;
                    match storage::save_photo(frame) {
                        Ok(path) => {
                            self.status_message = format!("Saved: {}", path.display());
                        }
                        Err(e) => {
                            error!("Failed to save photo: {}", e);
                            self.status_message = format!("Error: {}", e);
                        }
                    }
                }
                KeyCode::Char('h') => {
                    self.show_help = !self.show_help;
                    self.status_message = if self.show_help {
                        help_status()
                    } else {
                        default_status()
                    };
                }
                _ => {}
            }
        }
        Ok(SinkEvent::Continue)
    }
}

impl PreviewSink for TerminalPreview {
    fn present(&mut self, frame: &Frame, annotations: &[Annotation]) -> AppResult<SinkEvent> {
        let Self {
            terminal,
            status_message,
            ..
        } = self;

        terminal
            .draw(|f| {
                let area = f.area();

                // Reserve the bottom line for the status bar
                let camera_area = Rect {
                    x: area.x,
                    y: area.y,
                    width: area.width,
                    height: area.height.saturating_sub(1),
                };

                f.render_widget(
                    FrameWidget {
                        frame,
                        annotations,
                    },
                    camera_area,
                );

                let status_area = Rect {
                    x: area.x,
                    y: area.height.saturating_sub(1),
                    width: area.width,
                    height: 1,
                };
                f.render_widget(
                    StatusBar {
                        message: status_message,
                    },
                    status_area,
                );
            })
            .map_err(|e| AppError::Other(e.to_string()))?;

        self.handle_keys(frame)
            .map_err(|e| AppError::Other(e.to_string()))
    }
}

impl Drop for TerminalPreview {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

fn default_status() -> String {
    "'p' save photo | 'h' help | 'q' quit".to_string()
}

fn help_status() -> String {
    "p: Save current frame as JPEG | h: Toggle help | q/Ctrl+C: Quit".to_string()
}

/// Mapping between frame pixel coordinates and terminal cells
///
/// Each terminal cell covers `x_scale` pixels horizontally and `2 * y_scale`
/// pixels vertically (upper and lower half).
struct CellMap {
    area: Rect,
    frame_width: u32,
    frame_height: u32,
    x_offset: u16,
    y_offset: u16,
    display_width: u16,
    display_height: u16,
    x_scale: f64,
    y_scale: f64,
}

impl CellMap {
    fn new(area: Rect, frame_width: u32, frame_height: u32) -> Option<Self> {
        if area.width == 0 || area.height == 0 || frame_width == 0 || frame_height == 0 {
            return None;
        }

        // Fit the frame into the area maintaining aspect ratio; half-blocks
        // double the vertical resolution
        let frame_aspect = frame_width as f64 / frame_height as f64;
        let term_width = area.width as f64;
        let term_height = (area.height * 2) as f64;

        let (display_width, display_height) = if term_width / term_height > frame_aspect {
            let h = term_height;
            let w = h * frame_aspect;
            (w as u16, (h / 2.0) as u16)
        } else {
            let w = term_width;
            let h = w / frame_aspect;
            (w as u16, (h / 2.0) as u16)
        };

        if display_width == 0 || display_height == 0 {
            return None;
        }

        Some(Self {
            area,
            frame_width,
            frame_height,
            x_offset: area.x + (area.width.saturating_sub(display_width)) / 2,
            y_offset: area.y + (area.height.saturating_sub(display_height)) / 2,
            display_width,
            display_height,
            x_scale: frame_width as f64 / display_width as f64,
            y_scale: frame_height as f64 / (display_height * 2) as f64,
        })
    }

    /// Terminal cell and half (true = upper) covering a frame pixel
    fn cell_for(&self, px: i32, py: i32) -> Option<(u16, u16, bool)> {
        if px < 0 || py < 0 || px >= self.frame_width as i32 || py >= self.frame_height as i32 {
            return None;
        }

        let cx = self.x_offset + (px as f64 / self.x_scale) as u16;
        let sub_row = (py as f64 / self.y_scale) as u32;
        let cy = self.y_offset + (sub_row / 2) as u16;

        if cx >= self.area.x + self.area.width || cy >= self.area.y + self.area.height {
            return None;
        }

        Some((cx, cy, sub_row % 2 == 0))
    }
}

/// Widget rendering one annotated frame with half-block characters
struct FrameWidget<'a> {
    frame: &'a Frame,
    annotations: &'a [Annotation],
}

impl Widget for FrameWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(map) = CellMap::new(area, self.frame.width, self.frame.height) else {
            return;
        };

        for ty in 0..map.display_height {
            for tx in 0..map.display_width {
                let term_x = map.x_offset + tx;
                let term_y = map.y_offset + ty;

                if term_x >= area.x + area.width || term_y >= area.y + area.height {
                    continue;
                }

                let src_x = (tx as f64 * map.x_scale) as u32;
                let src_y_top = (ty as f64 * 2.0 * map.y_scale) as u32;
                let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * map.y_scale) as u32;

                let top = sample_color(self.frame, src_x, src_y_top);
                let bottom = sample_color(self.frame, src_x, src_y_bottom);

                if let Some(cell) = buf.cell_mut((term_x, term_y)) {
                    cell.set_char('▀');
                    cell.set_fg(top);
                    cell.set_bg(bottom);
                }
            }
        }

        for annotation in self.annotations {
            paint_annotation(&map, annotation, buf);
        }
    }
}

fn sample_color(frame: &Frame, x: u32, y: u32) -> Color {
    let (r, g, b) = frame.rgb_at(x, y);
    Color::Rgb(r, g, b)
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Paint a single annotation pixel into the half-block grid
fn paint_pixel(map: &CellMap, buf: &mut Buffer, px: i32, py: i32, color: Color) {
    let Some((cx, cy, top)) = map.cell_for(px, py) else {
        return;
    };
    if let Some(cell) = buf.cell_mut((cx, cy)) {
        if top {
            cell.set_fg(color);
        } else {
            cell.set_bg(color);
        }
    }
}

fn paint_annotation(map: &CellMap, annotation: &Annotation, buf: &mut Buffer) {
    match annotation {
        Annotation::Rectangle {
            x,
            y,
            width,
            height,
            color,
        } => {
            let color = to_color(*color);
            let (w, h) = (*width as i32, *height as i32);
            for i in 0..w {
                paint_pixel(map, buf, x + i, *y, color);
                paint_pixel(map, buf, x + i, y + h - 1, color);
            }
            for j in 0..h {
                paint_pixel(map, buf, *x, y + j, color);
                paint_pixel(map, buf, x + w - 1, y + j, color);
            }
        }
        Annotation::Cross { cx, cy, color } => {
            // Arms extend 5 pixels from the centroid
            let color = to_color(*color);
            for d in -5i32..=5 {
                paint_pixel(map, buf, cx + d, *cy, color);
                paint_pixel(map, buf, *cx, cy + d, color);
            }
        }
        Annotation::Text { x, y, text, color } => {
            let Some((cx, cy, _)) = map.cell_for(*x, *y) else {
                return;
            };
            let available = (map.area.x + map.area.width).saturating_sub(cx) as usize;
            let clipped: String = text.chars().take(available).collect();
            buf.set_string(cx, cy, clipped, Style::default().fg(to_color(*color)));
        }
    }
}

/// Status bar widget for the bottom line
struct StatusBar<'a> {
    message: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(Color::DarkGray);
            }
        }

        let text = if self.message.len() > area.width as usize {
            &self.message[..area.width as usize]
        } else {
            self.message
        };

        buf.set_string(
            area.x,
            area.y,
            text,
            Style::default().fg(Color::White).bg(Color::DarkGray),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_map_full_resolution() {
        // 4x4 frame in a 4x2 area maps 1:1 with half-blocks
        let area = Rect::new(0, 0, 4, 2);
        let map = CellMap::new(area, 4, 4).unwrap();

        assert_eq!(map.cell_for(0, 0), Some((0, 0, true)));
        assert_eq!(map.cell_for(0, 1), Some((0, 0, false)));
        assert_eq!(map.cell_for(3, 3), Some((3, 1, false)));
    }

    #[test]
    fn test_cell_map_rejects_out_of_frame() {
        let area = Rect::new(0, 0, 4, 2);
        let map = CellMap::new(area, 4, 4).unwrap();

        assert_eq!(map.cell_for(-1, 0), None);
        assert_eq!(map.cell_for(0, 4), None);
        assert_eq!(map.cell_for(4, 0), None);
    }

    #[test]
    fn test_cell_map_empty_area() {
        assert!(CellMap::new(Rect::new(0, 0, 0, 0), 320, 240).is_none());
    }
}
