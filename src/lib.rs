//! handbloom: a gesture-driven particle field for the terminal.
//!
//! A camera samples frames on a fixed interval and asks a vision model
//! whether the hand in view is open or a fist; the answer (or a held
//! override key) picks between an ambient drift mode and a rose-curve
//! flower formation anchored at the mouse pointer.

pub mod camera;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod event_loop;
pub mod gesture;
pub mod input;
pub mod render;
pub mod sampler;
