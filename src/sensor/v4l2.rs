// SPDX-License-Identifier: GPL-3.0-only

//! V4L2 camera frame source
//!
//! Opens the device with the `v4l` crate, prefers packed RGB24 and falls
//! back to YUYV (converted in software), and captures through a
//! memory-mapped stream on a dedicated thread. `snapshot` blocks on the
//! latest frame from that stream.

use super::{Frame, FrameSource, SensorConfig};
use crate::constants::SNAPSHOT_TIMEOUT;
use crate::errors::SensorError;
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, SyncSender, TrySendError, sync_channel};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use v4l::buffer::Type;
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, Format, FourCC};

/// V4L2_CID_AUTOGAIN (user control class base + 18)
const V4L2_CID_AUTOGAIN: u32 = 0x0098_091a;
/// V4L2_CID_AUTO_WHITE_BALANCE (user control class base + 12)
const V4L2_CID_AUTO_WHITE_BALANCE: u32 = 0x0098_090c;
/// VIDIOC_S_CTRL ioctl number (_IOWR('V', 28, struct v4l2_control))
const VIDIOC_S_CTRL: libc::c_ulong = 0xc008_561c;

/// v4l2_control structure for VIDIOC_S_CTRL
#[repr(C)]
struct V4l2Control {
    id: u32,
    value: i32,
}

/// Wire format delivered by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureFormat {
    Rgb24,
    Yuyv,
}

/// Camera frame source backed by a V4L2 capture device
pub struct V4l2Sensor {
    path: String,
    width: u32,
    height: u32,
    rx: Option<Receiver<Frame>>,
    stop: Option<Arc<AtomicBool>>,
    handle: Option<JoinHandle<()>>,
    snapshot_timeout: Duration,
}

impl V4l2Sensor {
    /// Create a sensor for the given device path (e.g. `/dev/video0`).
    /// Nothing is opened until `configure` is called.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            width: 0,
            height: 0,
            rx: None,
            stop: None,
            handle: None,
            snapshot_timeout: SNAPSHOT_TIMEOUT,
        }
    }

    /// Override the blocking snapshot deadline
    pub fn with_snapshot_timeout(mut self, timeout: Duration) -> Self {
        self.snapshot_timeout = timeout;
        self
    }

    fn shutdown(&mut self) {
        if let Some(stop) = self.stop.take() {
            stop.store(true, Ordering::SeqCst);
        }
        self.rx = None;
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    fn set_control(&self, control_id: u32, value: i32) -> Result<(), SensorError> {
        let file = std::fs::File::open(&self.path)
            .map_err(|e| SensorError::ControlFailed(format!("{}: {}", self.path, e)))?;

        let mut control = V4l2Control {
            id: control_id,
            value,
        };
        let result = unsafe {
            libc::ioctl(
                file.as_raw_fd(),
                VIDIOC_S_CTRL as _,
                &mut control as *mut V4l2Control,
            )
        };

        if result < 0 {
            // Not all UVC cameras expose the gain/white-balance controls
            warn!(
                device = %self.path,
                control_id = format!("{:#010x}", control_id),
                "Control not supported, leaving sensor default"
            );
        }
        Ok(())
    }
}

impl FrameSource for V4l2Sensor {
    fn reset(&mut self) -> Result<(), SensorError> {
        self.shutdown();
        debug!(device = %self.path, "Sensor reset");
        Ok(())
    }

    fn configure(&mut self, config: &SensorConfig) -> Result<(), SensorError> {
        self.shutdown();

        if !Path::new(&self.path).exists() {
            return Err(SensorError::DeviceNotFound(self.path.clone()));
        }

        let dev = Device::with_path(&self.path)
            .map_err(|e| SensorError::InitializationFailed(format!("{}: {}", self.path, e)))?;

        // Prefer packed RGB24, fall back to YUYV with software conversion
        let fourcc_rgb3 = FourCC::new(b"RGB3");
        let fourcc_yuyv = FourCC::new(b"YUYV");

        let format = Format::new(config.width, config.height, fourcc_rgb3);
        let actual = match dev.set_format(&format) {
            Ok(f) if f.fourcc == fourcc_rgb3 => f,
            _ => {
                let format = Format::new(config.width, config.height, fourcc_yuyv);
                dev.set_format(&format)
                    .map_err(|e| SensorError::FormatNotSupported(e.to_string()))?
            }
        };

        let wire_format = if actual.fourcc == fourcc_rgb3 {
            CaptureFormat::Rgb24
        } else if actual.fourcc == fourcc_yuyv {
            CaptureFormat::Yuyv
        } else {
            return Err(SensorError::FormatNotSupported(format!(
                "device offers {} instead of RGB3/YUYV",
                actual.fourcc
            )));
        };

        info!(
            device = %self.path,
            width = actual.width,
            height = actual.height,
            fourcc = %actual.fourcc,
            "Sensor format configured"
        );

        self.width = actual.width;
        self.height = actual.height;

        let stop = Arc::new(AtomicBool::new(false));
        let (tx, rx) = sync_channel(1);
        let thread_stop = Arc::clone(&stop);
        let width = actual.width;
        let height = actual.height;
        let stride = actual.stride;

        let handle = std::thread::Builder::new()
            .name("v4l2-capture".into())
            .spawn(move || {
                capture_loop(dev, wire_format, width, height, stride, thread_stop, tx);
            })
            .map_err(|e| SensorError::InitializationFailed(e.to_string()))?;

        self.stop = Some(stop);
        self.rx = Some(rx);
        self.handle = Some(handle);
        Ok(())
    }

    fn warm_up(&mut self, duration: Duration) -> Result<(), SensorError> {
        let start = Instant::now();
        let mut discarded = 0u32;
        while start.elapsed() < duration {
            match self.snapshot() {
                Ok(_) => discarded += 1,
                // The first frames after streamon can be slow; keep waiting
                Err(SensorError::CaptureTimeout) => {}
                Err(e) => return Err(e),
            }
        }
        debug!(discarded, "Sensor warm-up complete");
        Ok(())
    }

    fn set_auto_gain(&mut self, enabled: bool) -> Result<(), SensorError> {
        self.set_control(V4L2_CID_AUTOGAIN, enabled as i32)
    }

    fn set_auto_white_balance(&mut self, enabled: bool) -> Result<(), SensorError> {
        self.set_control(V4L2_CID_AUTO_WHITE_BALANCE, enabled as i32)
    }

    fn snapshot(&mut self) -> Result<Frame, SensorError> {
        let rx = self
            .rx
            .as_ref()
            .ok_or_else(|| SensorError::InitializationFailed("sensor not configured".into()))?;

        match rx.recv_timeout(self.snapshot_timeout) {
            Ok(frame) => Ok(frame),
            Err(RecvTimeoutError::Timeout) => Err(SensorError::CaptureTimeout),
            Err(RecvTimeoutError::Disconnected) => Err(SensorError::Disconnected),
        }
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

impl Drop for V4l2Sensor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Memory-mapped capture loop, runs on the capture thread until stopped
fn capture_loop(
    dev: Device,
    wire_format: CaptureFormat,
    width: u32,
    height: u32,
    stride: u32,
    stop: Arc<AtomicBool>,
    tx: SyncSender<Frame>,
) {
    let mut stream = match Stream::with_buffers(&dev, Type::VideoCapture, 4) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "Failed to create capture stream");
            return;
        }
    };

    let stride = if stride > 0 {
        stride
    } else {
        match wire_format {
            CaptureFormat::Rgb24 => width * 3,
            CaptureFormat::Yuyv => width * 2,
        }
    };

    while !stop.load(Ordering::SeqCst) {
        let (buf, _meta) = match stream.next() {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "Failed to capture frame");
                continue;
            }
        };

        let rgb = match wire_format {
            CaptureFormat::Rgb24 => strip_stride(buf, width, height, stride),
            CaptureFormat::Yuyv => yuyv_to_rgb24(buf, width, height, stride),
        };

        let frame = Frame::from_rgb(width, height, rgb);

        // Keep only the latest frame; drop when the consumer is busy
        match tx.try_send(frame) {
            Ok(()) | Err(TrySendError::Full(_)) => {}
            Err(TrySendError::Disconnected(_)) => break,
        }
    }
}

/// Copy RGB24 rows without stride padding
fn strip_stride(data: &[u8], width: u32, height: u32, stride: u32) -> Vec<u8> {
    let row_bytes = (width * 3) as usize;
    let stride = stride as usize;
    let mut out = Vec::with_capacity(row_bytes * height as usize);
    for y in 0..height as usize {
        let start = y * stride;
        let end = start + row_bytes;
        if end <= data.len() {
            out.extend_from_slice(&data[start..end]);
        }
    }
    out
}

/// Convert packed YUYV 4:2:2 to RGB24
///
/// Layout: Y0 U Y1 V, four bytes per two pixels sharing chroma.
fn yuyv_to_rgb24(data: &[u8], width: u32, height: u32, stride: u32) -> Vec<u8> {
    let stride = stride as usize;
    let mut out = Vec::with_capacity((width * height * 3) as usize);

    for y in 0..height as usize {
        let row = y * stride;
        for x in 0..width as usize {
            let base = row + (x & !1) * 2;
            if base + 3 >= data.len() {
                out.extend_from_slice(&[0, 0, 0]);
                continue;
            }
            let luma = if x & 1 == 0 { data[base] } else { data[base + 2] };
            let (r, g, b) = yuv_to_rgb(luma, data[base + 1], data[base + 3]);
            out.extend_from_slice(&[r, g, b]);
        }
    }
    out
}

/// Convert YUV (BT.601) to RGB
fn yuv_to_rgb(y: u8, u: u8, v: u8) -> (u8, u8, u8) {
    let y = y as f32;
    let u = u as f32 - 128.0;
    let v = v as f32 - 128.0;

    let r = (y + 1.402 * v).clamp(0.0, 255.0) as u8;
    let g = (y - 0.344136 * u - 0.714136 * v).clamp(0.0, 255.0) as u8;
    let b = (y + 1.772 * u).clamp(0.0, 255.0) as u8;

    (r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_ioctl_number() {
        assert_eq!(VIDIOC_S_CTRL, 0xc008561c);
        assert_eq!(V4L2_CID_AUTOGAIN, 0x0098091a);
        assert_eq!(V4L2_CID_AUTO_WHITE_BALANCE, 0x0098090c);
    }

    #[test]
    fn test_yuv_to_rgb_grey_point() {
        // Neutral chroma maps luma straight through
        assert_eq!(yuv_to_rgb(0, 128, 128), (0, 0, 0));
        assert_eq!(yuv_to_rgb(255, 128, 128), (255, 255, 255));
        assert_eq!(yuv_to_rgb(128, 128, 128), (128, 128, 128));
    }

    #[test]
    fn test_yuyv_conversion_shares_chroma() {
        // One YUYV quad: two pixels with luma 50 and 200, neutral chroma
        let data = [50u8, 128, 200, 128];
        let rgb = yuyv_to_rgb24(&data, 2, 1, 4);
        assert_eq!(rgb, vec![50, 50, 50, 200, 200, 200]);
    }

    #[test]
    fn test_strip_stride() {
        // 2x2 RGB rows padded to 8 bytes
        let data = [
            1, 2, 3, 4, 5, 6, 0, 0, //
            7, 8, 9, 10, 11, 12, 0, 0,
        ];
        let rgb = strip_stride(&data, 2, 2, 8);
        assert_eq!(rgb, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
    }
}
