//! Camera session lifecycle and the capture thread.
//!
//! `CameraSource` walks an ordered list of acquisition strategies until one
//! produces a live stream, then keeps the most recent frame in a shared
//! buffer. The stream itself lives on a dedicated thread because camera
//! handles are not `Send`; everything else observes the session through
//! `SessionState` and the frame buffer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use log::{debug, info, warn};

use super::backend::{StreamBackend, StreamRequest, VideoStream};
use super::types::{CameraError, CameraSettings, Frame, Resolution, SessionState};

/// Read-only view of the camera session for the sampler.
#[derive(Clone)]
pub struct CameraHandle {
    state: Arc<Mutex<SessionState>>,
    frame: Arc<Mutex<Option<Frame>>>,
}

impl CameraHandle {
    pub fn state(&self) -> SessionState {
        match self.state.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => SessionState::Uninitialized,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state().is_ready()
    }

    /// Clone of the most recent frame, if the stream has produced one.
    pub fn latest_frame(&self) -> Option<Frame> {
        self.frame.lock().ok().and_then(|guard| guard.clone())
    }
}

/// Owns the capture thread and the session state machine.
pub struct CameraSource {
    backend: Arc<dyn StreamBackend>,
    settings: CameraSettings,
    state: Arc<Mutex<SessionState>>,
    frame: Arc<Mutex<Option<Frame>>>,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl CameraSource {
    pub fn new(backend: Arc<dyn StreamBackend>, settings: CameraSettings) -> Self {
        Self {
            backend,
            settings,
            state: Arc::new(Mutex::new(SessionState::Uninitialized)),
            frame: Arc::new(Mutex::new(None)),
            stop: Arc::new(AtomicBool::new(false)),
            thread: None,
        }
    }

    /// Begin acquisition. Tears down any live stream first, so this doubles
    /// as the retry path. Returns immediately; progress is visible through
    /// `state()`.
    pub fn start(&mut self) {
        self.stop();

        set_state(&self.state, SessionState::Acquiring);
        self.stop.store(false, Ordering::SeqCst);

        let backend = Arc::clone(&self.backend);
        let settings = self.settings.clone();
        let state = Arc::clone(&self.state);
        let frame = Arc::clone(&self.frame);
        let stop = Arc::clone(&self.stop);

        self.thread = Some(std::thread::spawn(move || {
            run_capture(backend, settings, state, frame, stop);
        }));
    }

    /// Retry acquisition from `Ready` or `Error`.
    pub fn retry(&mut self) {
        info!("retrying camera acquisition");
        self.start();
    }

    /// Stop the capture thread, clear the frame buffer, and reset state so
    /// nothing downstream can observe a stale frame.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
        if let Ok(mut guard) = self.frame.lock() {
            *guard = None;
        }
        set_state(&self.state, SessionState::Uninitialized);
    }

    pub fn state(&self) -> SessionState {
        match self.state.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => SessionState::Uninitialized,
        }
    }

    /// Lightweight handle for the sampler task.
    pub fn handle(&self) -> CameraHandle {
        CameraHandle {
            state: Arc::clone(&self.state),
            frame: Arc::clone(&self.frame),
        }
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        self.stop();
    }
}

fn set_state(state: &Mutex<SessionState>, next: SessionState) {
    if let Ok(mut guard) = state.lock() {
        *guard = next;
    }
}

/// Walk the acquisition strategies in order: a low-bandwidth request, an
/// unconstrained request, then the first enumerated device by identity.
/// Enumeration only happens once both generic requests have failed, so a
/// healthy first strategy never touches the device list. First bound stream
/// wins; on total failure the last error message is returned.
fn acquire_stream(
    backend: &dyn StreamBackend,
    settings: &CameraSettings,
    stop: &AtomicBool,
) -> Result<Option<Box<dyn VideoStream>>, String> {
    let generic = [
        StreamRequest::LowBandwidth {
            resolution: Resolution::LOW,
            fps: settings.fps,
        },
        StreamRequest::Unconstrained,
    ];
    let mut last_err = String::from("no camera found");

    for request in &generic {
        if stop.load(Ordering::SeqCst) {
            return Ok(None);
        }
        match backend.open(request, settings) {
            Ok(s) => {
                let res = s.resolution();
                info!(
                    "camera stream bound via {:?} at {}x{}",
                    request, res.width, res.height
                );
                return Ok(Some(s));
            }
            Err(e) => {
                warn!("camera strategy {:?} failed: {}", request, e);
                last_err = e;
            }
        }
    }

    // Both generic requests failed; fall back to an explicit device.
    let device = match backend.list_devices() {
        Ok(devices) => devices.first().map(|d| d.index),
        Err(e) => {
            debug!("device enumeration failed: {}", e);
            None
        }
    };
    if let Some(index) = device {
        if stop.load(Ordering::SeqCst) {
            return Ok(None);
        }
        let request = StreamRequest::Device(index);
        match backend.open(&request, settings) {
            Ok(s) => {
                let res = s.resolution();
                info!(
                    "camera stream bound via {:?} at {}x{}",
                    request, res.width, res.height
                );
                return Ok(Some(s));
            }
            Err(e) => {
                warn!("camera strategy {:?} failed: {}", request, e);
                last_err = e;
            }
        }
    }

    Err(last_err)
}

fn run_capture(
    backend: Arc<dyn StreamBackend>,
    settings: CameraSettings,
    state: Arc<Mutex<SessionState>>,
    frame: Arc<Mutex<Option<Frame>>>,
    stop: Arc<AtomicBool>,
) {
    let mut stream = match acquire_stream(backend.as_ref(), &settings, &stop) {
        Ok(Some(s)) => s,
        // Stopped mid-acquisition; nothing to report.
        Ok(None) => return,
        Err(last_err) => {
            let err = CameraError::classify(&last_err);
            warn!("all camera strategies failed: {}", err);
            set_state(&state, SessionState::Error(err));
            return;
        }
    };

    set_state(&state, SessionState::Ready);

    while !stop.load(Ordering::SeqCst) {
        match stream.frame() {
            Ok(f) => {
                if let Ok(mut guard) = frame.lock() {
                    *guard = Some(f);
                }
            }
            Err(e) => {
                // A dropped frame is not fatal; back off briefly and retry.
                debug!("frame pull failed: {}", e);
                std::thread::sleep(Duration::from_millis(50));
            }
        }
    }
}
