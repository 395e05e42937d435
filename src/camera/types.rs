//! Camera data types, session state, and the error taxonomy.

use std::fmt;
use std::time::Instant;

/// Camera resolution in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Low-bandwidth capture hint used by the first acquisition strategy.
    pub const LOW: Resolution = Resolution {
        width: 320,
        height: 240,
    };
}

/// A captured camera frame, RGB, 3 bytes per pixel.
#[derive(Debug, Clone)]
pub struct Frame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// When the frame was captured.
    pub timestamp: Instant,
}

impl Frame {
    /// True when the frame has no usable pixels. Sampler ticks drop such
    /// frames instead of classifying them.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.data.is_empty()
    }
}

/// Settings for camera capture.
#[derive(Debug, Clone)]
pub struct CameraSettings {
    /// Explicit device index; `None` lets the fallback chain pick.
    pub device_index: Option<u32>,
    /// Target FPS for the low-bandwidth request (actual may vary).
    pub fps: u32,
    /// Mirror horizontally (selfie mode).
    pub mirror: bool,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            device_index: None,
            fps: 15,
            mirror: true,
        }
    }
}

/// Lifecycle state of the camera session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No acquisition attempted yet.
    Uninitialized,
    /// Fallback chain in progress.
    Acquiring,
    /// Stream bound and producing frames.
    Ready,
    /// All acquisition strategies failed.
    Error(CameraError),
}

impl SessionState {
    pub fn is_ready(&self) -> bool {
        matches!(self, SessionState::Ready)
    }
}

/// Errors surfaced at the camera boundary.
///
/// Each variant carries the raw backend message for logging; `user_message`
/// gives the short status-line text. None of these are fatal: every one keeps
/// the retry affordance live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    /// OS denied camera access.
    PermissionDenied(String),
    /// Device exists but is held by another process.
    DeviceBusy(String),
    /// No video input device present.
    NoDevice,
    /// Device opened but the stream would not start.
    StartFailure(String),
    /// Anything the taxonomy doesn't recognize.
    Unknown(String),
}

impl CameraError {
    /// Short message for the status line.
    pub fn user_message(&self) -> &'static str {
        match self {
            CameraError::PermissionDenied(_) => {
                "Camera permission denied. Allow camera access and retry."
            }
            CameraError::DeviceBusy(_) => "Camera is in use by another application.",
            CameraError::NoDevice => "No camera found.",
            CameraError::StartFailure(_) => "Camera failed to start; it may be busy.",
            CameraError::Unknown(_) => "Unable to access camera.",
        }
    }

    /// Classify a backend failure message into the taxonomy.
    ///
    /// Backends report failures as strings, so this matches the keywords the
    /// underlying platform APIs use.
    pub fn classify(msg: &str) -> Self {
        let lower = msg.to_lowercase();
        if lower.contains("permission")
            || lower.contains("denied")
            || lower.contains("authorization")
            || lower.contains("not authorized")
        {
            CameraError::PermissionDenied(msg.to_string())
        } else if lower.contains("busy") || lower.contains("in use") || lower.contains("ebusy") {
            CameraError::DeviceBusy(msg.to_string())
        } else if lower.contains("no device")
            || lower.contains("no camera")
            || lower.contains("not found")
            || lower.contains("no such device")
        {
            CameraError::NoDevice
        } else if lower.contains("could not start")
            || lower.contains("failed to start")
            || lower.contains("start stream")
            || lower.contains("hardware")
        {
            CameraError::StartFailure(msg.to_string())
        } else {
            CameraError::Unknown(msg.to_string())
        }
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::PermissionDenied(msg) => write!(f, "camera permission denied: {}", msg),
            CameraError::DeviceBusy(msg) => write!(f, "camera busy: {}", msg),
            CameraError::NoDevice => write!(f, "no camera device found"),
            CameraError::StartFailure(msg) => write!(f, "camera stream failed to start: {}", msg),
            CameraError::Unknown(msg) => write!(f, "unable to access camera: {}", msg),
        }
    }
}

impl std::error::Error for CameraError {}
