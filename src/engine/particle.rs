//! A single particle.

use rand::Rng;

#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Seed position, fixed at creation. Part of the particle's identity
    /// even though neither current mode steers back to it.
    pub base_x: f32,
    pub base_y: f32,
    /// Draw radius in pixels.
    pub size: f32,
}

impl Particle {
    /// Seed a particle at a uniform random position with a small drift.
    pub fn random<R: Rng>(rng: &mut R, width: f32, height: f32) -> Self {
        let x = rng.gen_range(0.0..width);
        let y = rng.gen_range(0.0..height);
        Self {
            x,
            y,
            vx: rng.gen_range(-0.5..0.5),
            vy: rng.gen_range(-0.5..0.5),
            base_x: x,
            base_y: y,
            size: rng.gen_range(0.5..1.5),
        }
    }
}
