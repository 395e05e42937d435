//! Camera capture: types, acquisition backends, and the session source.

pub mod backend;
pub mod source;
pub mod types;

pub use backend::{DeviceInfo, StreamBackend, StreamRequest, VideoStream};
pub use source::{CameraHandle, CameraSource};
pub use types::{CameraError, CameraSettings, Frame, Resolution, SessionState};

#[cfg(feature = "camera")]
pub use backend::NokhwaBackend;
