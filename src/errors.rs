// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the detection application

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Sensor/camera errors
    Sensor(SensorError),
    /// Blob detection errors
    Detect(DetectError),
    /// LED hardware errors
    Led(LedError),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
    /// Generic error with message
    Other(String),
}

/// Sensor-specific errors
#[derive(Debug, Clone)]
pub enum SensorError {
    /// Camera device not found
    DeviceNotFound(String),
    /// Sensor initialization failed
    InitializationFailed(String),
    /// Requested pixel format/resolution not supported
    FormatNotSupported(String),
    /// Frame capture failed
    CaptureFailed(String),
    /// No frame arrived within the snapshot deadline
    CaptureTimeout,
    /// Capture pipeline went away during operation
    Disconnected,
    /// Setting a sensor control (gain, white balance) failed
    ControlFailed(String),
}

/// Blob detection errors
#[derive(Debug, Clone)]
pub enum DetectError {
    /// A color threshold violates the min <= max invariant
    InvalidThreshold(String),
    /// No detector backend was compiled in or configured
    NotAvailable(String),
    /// The vendor detection library reported an error
    Backend(String),
}

/// LED hardware errors
#[derive(Debug, Clone)]
pub enum LedError {
    /// LED not present under /sys/class/leds
    NotFound(String),
    /// LED exists but its brightness file is not writable
    NotWritable(String),
    /// I/O error talking to the LED
    Io(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Sensor(e) => write!(f, "Sensor error: {}", e),
            AppError::Detect(e) => write!(f, "Detection error: {}", e),
            AppError::Led(e) => write!(f, "LED error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorError::DeviceNotFound(path) => write!(f, "Device not found: {}", path),
            SensorError::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            SensorError::FormatNotSupported(msg) => write!(f, "Format not supported: {}", msg),
            SensorError::CaptureFailed(msg) => write!(f, "Frame capture failed: {}", msg),
            SensorError::CaptureTimeout => write!(f, "Frame capture timed out"),
            SensorError::Disconnected => write!(f, "Capture pipeline disconnected"),
            SensorError::ControlFailed(msg) => write!(f, "Sensor control failed: {}", msg),
        }
    }
}

impl fmt::Display for DetectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectError::InvalidThreshold(msg) => write!(f, "Invalid threshold: {}", msg),
            DetectError::NotAvailable(msg) => write!(f, "Detector not available: {}", msg),
            DetectError::Backend(msg) => write!(f, "Detector backend error: {}", msg),
        }
    }
}

impl fmt::Display for LedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedError::NotFound(name) => write!(f, "LED not found: {}", name),
            LedError::NotWritable(name) => write!(f, "LED not writable: {}", name),
            LedError::Io(msg) => write!(f, "LED I/O error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for SensorError {}
impl std::error::Error for DetectError {}
impl std::error::Error for LedError {}

// Conversions from sub-errors to AppError
impl From<SensorError> for AppError {
    fn from(err: SensorError) -> Self {
        AppError::Sensor(err)
    }
}

impl From<DetectError> for AppError {
    fn from(err: DetectError) -> Self {
        AppError::Detect(err)
    }
}

impl From<LedError> for AppError {
    fn from(err: LedError) -> Self {
        AppError::Led(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}
