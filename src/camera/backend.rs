//! Stream acquisition backends.
//!
//! `CameraSource` never talks to a device API directly: it asks a
//! `StreamBackend` to open a stream for a given `StreamRequest`. That keeps
//! the fallback chain testable with mock backends and keeps the nokhwa
//! dependency behind the `camera` feature.

use std::fmt;

use super::types::{CameraSettings, Frame, Resolution};

/// Information about an available video input device.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub index: u32,
    pub name: String,
    pub description: String,
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.index, self.name, self.description)
    }
}

/// One acquisition attempt, in fallback order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamRequest {
    /// Modest resolution hint, front/default device.
    LowBandwidth { resolution: Resolution, fps: u32 },
    /// Any video source, no constraints.
    Unconstrained,
    /// A specific device by identity.
    Device(u32),
}

/// A bound, running video stream. Lives entirely on the capture thread
/// (camera handles are generally not `Send`).
pub trait VideoStream {
    /// Pull the next frame, converted to RGB. The error string is only
    /// logged; a failed pull is skipped, not fatal.
    fn frame(&mut self) -> Result<Frame, String>;

    /// Actual stream resolution.
    fn resolution(&self) -> Resolution;
}

/// Factory for video streams. Errors are raw backend messages; the source
/// classifies them into the `CameraError` taxonomy.
pub trait StreamBackend: Send + Sync {
    fn list_devices(&self) -> Result<Vec<DeviceInfo>, String>;

    fn open(
        &self,
        request: &StreamRequest,
        settings: &CameraSettings,
    ) -> Result<Box<dyn VideoStream>, String>;
}

/// Mirror a frame horizontally (selfie mode).
pub(crate) fn mirror_horizontal(frame: &mut Frame) {
    let width = frame.width as usize;
    let height = frame.height as usize;
    for y in 0..height {
        let row_start = y * width * 3;
        let row = &mut frame.data[row_start..row_start + width * 3];
        for x in 0..width / 2 {
            let left = x * 3;
            let right = (width - 1 - x) * 3;
            for i in 0..3 {
                row.swap(left + i, right + i);
            }
        }
    }
}

#[cfg(feature = "camera")]
pub use nokhwa_backend::NokhwaBackend;

#[cfg(feature = "camera")]
mod nokhwa_backend {
    use std::time::Instant;

    use nokhwa::pixel_format::RgbFormat;
    use nokhwa::utils::{
        ApiBackend, CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType,
    };
    use nokhwa::{query, Camera};

    use super::*;

    /// nokhwa-backed stream acquisition.
    pub struct NokhwaBackend;

    impl StreamBackend for NokhwaBackend {
        fn list_devices(&self) -> Result<Vec<DeviceInfo>, String> {
            let devices = query(ApiBackend::Auto).map_err(|e| e.to_string())?;
            Ok(devices
                .into_iter()
                .map(|d| DeviceInfo {
                    index: d.index().as_index().unwrap_or(0),
                    name: d.human_name(),
                    description: d.description().to_string(),
                })
                .collect())
        }

        fn open(
            &self,
            request: &StreamRequest,
            settings: &CameraSettings,
        ) -> Result<Box<dyn VideoStream>, String> {
            let default_index = settings.device_index.unwrap_or(0);
            let (index, requested) = match request {
                StreamRequest::LowBandwidth { resolution, fps } => (
                    CameraIndex::Index(default_index),
                    RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
                        CameraFormat::new(
                            nokhwa::utils::Resolution::new(resolution.width, resolution.height),
                            FrameFormat::MJPEG,
                            *fps,
                        ),
                    )),
                ),
                StreamRequest::Unconstrained => (
                    CameraIndex::Index(default_index),
                    RequestedFormat::new::<RgbFormat>(
                        RequestedFormatType::AbsoluteHighestResolution,
                    ),
                ),
                StreamRequest::Device(i) => (
                    CameraIndex::Index(*i),
                    RequestedFormat::new::<RgbFormat>(
                        RequestedFormatType::AbsoluteHighestResolution,
                    ),
                ),
            };

            let mut camera = Camera::new(index, requested).map_err(|e| e.to_string())?;
            camera.open_stream().map_err(|e| e.to_string())?;

            Ok(Box::new(NokhwaStream {
                camera,
                mirror: settings.mirror,
            }))
        }
    }

    struct NokhwaStream {
        camera: Camera,
        mirror: bool,
    }

    impl VideoStream for NokhwaStream {
        fn frame(&mut self) -> Result<Frame, String> {
            let buffer = self.camera.frame().map_err(|e| e.to_string())?;
            let decoded = buffer
                .decode_image::<RgbFormat>()
                .map_err(|e| e.to_string())?;
            let resolution = buffer.resolution();
            let mut frame = Frame {
                data: decoded.into_raw(),
                width: resolution.width(),
                height: resolution.height(),
                timestamp: Instant::now(),
            };
            if self.mirror {
                mirror_horizontal(&mut frame);
            }
            Ok(frame)
        }

        fn resolution(&self) -> Resolution {
            let res = self.camera.resolution();
            Resolution {
                width: res.width(),
                height: res.height(),
            }
        }
    }

    impl Drop for NokhwaStream {
        fn drop(&mut self) {
            let _ = self.camera.stop_stream();
        }
    }
}
