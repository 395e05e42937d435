//! Fixed-interval gesture sampling.
//!
//! Every tick takes the newest camera frame and asks the classifier for a
//! label. The interval is a ceiling, not a schedule: a tick that arrives
//! while a classification is still in flight is dropped, so at most one
//! request exists at any time and a slow network can never queue work.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use tokio::time::MissedTickBehavior;

use crate::camera::{CameraHandle, Frame};
use crate::classifier::GestureClient;
use crate::gesture::GestureState;

/// Default sampling interval.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(800);

/// JPEG quality for classifier uploads.
const JPEG_QUALITY: u8 = 70;

pub struct GestureSampler {
    camera: CameraHandle,
    client: Arc<GestureClient>,
    gesture: GestureState,
    interval: Duration,
    busy: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
}

impl GestureSampler {
    pub fn new(
        camera: CameraHandle,
        client: Arc<GestureClient>,
        gesture: GestureState,
        interval: Duration,
    ) -> Self {
        Self {
            camera,
            client,
            gesture,
            interval,
            busy: Arc::new(AtomicBool::new(false)),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag the run loop to stop after the current tick.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Decide whether this tick starts a cycle. On acceptance the busy slot
    /// is taken and the frame to classify is returned; the caller must end
    /// the cycle with `finish_cycle`.
    fn try_begin_cycle(&self) -> Option<Frame> {
        if !self.camera.is_ready() {
            return None;
        }
        if self.busy.swap(true, Ordering::SeqCst) {
            debug!("classification still in flight, skipping tick");
            return None;
        }
        let frame = self.camera.latest_frame().filter(|f| !f.is_empty());
        if frame.is_none() {
            // Nothing usable yet; release the slot for the next tick.
            self.busy.store(false, Ordering::SeqCst);
        }
        frame
    }

    fn finish_cycle(busy: &AtomicBool, gesture: &GestureState, label: crate::gesture::GestureLabel) {
        gesture.publish_camera(label);
        busy.store(false, Ordering::SeqCst);
    }

    /// Run the sampling loop until shut down.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            if self.shutdown.load(Ordering::SeqCst) {
                break;
            }

            let frame = match self.try_begin_cycle() {
                Some(frame) => frame,
                None => continue,
            };

            let jpeg = match encode_jpeg(&frame) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("frame encode failed: {}", e);
                    Self::finish_cycle(&self.busy, &self.gesture, crate::gesture::GestureLabel::None);
                    continue;
                }
            };

            let client = Arc::clone(&self.client);
            let busy = Arc::clone(&self.busy);
            let gesture = self.gesture.clone();
            tokio::spawn(async move {
                let label = client.classify(&jpeg).await;
                Self::finish_cycle(&busy, &gesture, label);
            });
        }
    }
}

/// Encode an RGB frame as JPEG at native resolution.
fn encode_jpeg(frame: &Frame) -> Result<Vec<u8>, image::ImageError> {
    let mut out = Vec::new();
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    encoder.encode(
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgb8,
    )?;
    Ok(out)
}
