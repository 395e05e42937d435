//! Gesture labels and the shared gesture state.
//!
//! Two writers feed the state: the sampler publishes the camera label, the
//! event loop flips the override flag. Readers combine them on every read,
//! so a held override always wins and releasing it reverts to whatever the
//! camera last said.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

/// A classified hand gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureLabel {
    Fist,
    Open,
    /// No hand visible, classification failed, or nothing sampled yet.
    #[default]
    None,
}

impl GestureLabel {
    /// Parse a label word, case-insensitively. Anything unrecognized is
    /// `None`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "FIST" => GestureLabel::Fist,
            "OPEN" => GestureLabel::Open,
            _ => GestureLabel::None,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            GestureLabel::Fist => 0,
            GestureLabel::Open => 1,
            GestureLabel::None => 2,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => GestureLabel::Fist,
            1 => GestureLabel::Open,
            _ => GestureLabel::None,
        }
    }
}

impl fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GestureLabel::Fist => write!(f, "fist"),
            GestureLabel::Open => write!(f, "open"),
            GestureLabel::None => write!(f, "none"),
        }
    }
}

/// Shared gesture cells. Cloning yields another handle to the same state.
#[derive(Clone)]
pub struct GestureState {
    camera_label: Arc<AtomicU8>,
    override_held: Arc<AtomicBool>,
}

impl GestureState {
    pub fn new() -> Self {
        Self {
            camera_label: Arc::new(AtomicU8::new(GestureLabel::None.as_u8())),
            override_held: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Publish the latest camera classification. Called by the sampler only.
    pub fn publish_camera(&self, label: GestureLabel) {
        self.camera_label.store(label.as_u8(), Ordering::SeqCst);
    }

    /// The last published camera label.
    pub fn camera_label(&self) -> GestureLabel {
        GestureLabel::from_u8(self.camera_label.load(Ordering::SeqCst))
    }

    /// Set or clear the manual override. Called by the event loop only.
    pub fn set_override(&self, held: bool) {
        self.override_held.store(held, Ordering::SeqCst);
    }

    pub fn override_held(&self) -> bool {
        self.override_held.load(Ordering::SeqCst)
    }

    /// The gesture that drives the engine: the override while held,
    /// otherwise the camera label. Recomputed on every read.
    pub fn authoritative(&self) -> GestureLabel {
        if self.override_held() {
            GestureLabel::Fist
        } else {
            self.camera_label()
        }
    }
}

impl Default for GestureState {
    fn default() -> Self {
        Self::new()
    }
}
