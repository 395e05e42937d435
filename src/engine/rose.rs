//! Rose-curve targets for the flower formation.
//!
//! Pure functions so formation geometry is testable without an engine. Each
//! particle gets an angle from its index, spread over four full turns so the
//! five-petal curve (r = cos 5θ has period 2π) is traced multiple times and
//! petals fill in evenly.

use std::f32::consts::TAU;

/// Angle for particle `index` of `total`, spanning four turns.
pub fn target_angle(index: usize, total: usize) -> f32 {
    if total == 0 {
        return 0.0;
    }
    index as f32 / total as f32 * 4.0 * TAU
}

/// Point on the 5-petal rose for particle `index`, centered on the pointer.
pub fn rose_target(index: usize, total: usize, scale: f32, pointer: (f32, f32)) -> (f32, f32) {
    let theta = target_angle(index, total);
    let r = scale * (5.0 * theta).cos();
    (
        pointer.0 + r * theta.cos(),
        pointer.1 + r * theta.sin(),
    )
}
