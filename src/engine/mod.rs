//! Particle field simulation.
//!
//! One engine owns the whole population. Each step reads the authoritative
//! gesture and the pointer as plain values and advances every particle under
//! one of two behaviors: ambient drift (open hand) or convergence onto a
//! rose-curve flower anchored at the pointer (fist). Mode switches take
//! effect immediately on the next step; particle identity never changes.

pub mod particle;
pub mod rose;

use rand::Rng;

use crate::gesture::GestureLabel;
use crate::render::{hsl_to_rgb, Rgb, Surface};

pub use particle::Particle;

/// Default population size.
pub const DEFAULT_PARTICLE_COUNT: usize = 1200;

/// Per-axis random acceleration bound in drift mode.
const DRIFT_NOISE: f32 = 0.05;

/// Per-component velocity clamp in drift mode.
const MAX_DRIFT_SPEED: f32 = 2.0;

/// Pointer repulsion radius in pixels.
const REPULSION_RADIUS: f32 = 100.0;

/// Repulsion impulse gain: impulse = (radius - distance) * gain.
const REPULSION_GAIN: f32 = 0.02;

/// Fraction of the remaining distance to the flower target covered per step.
const FLOWER_EASING: f32 = 0.05;

/// Flower radius as a fraction of the smaller surface dimension.
const ROSE_SCALE: f32 = 0.35;

/// Base hues for the two modes, in degrees.
const DRIFT_HUE: f32 = 180.0;
const FLOWER_HUE: f32 = 320.0;

/// Wrap a coordinate into `[0, limit)`. `rem_euclid` alone can round up to
/// exactly `limit` for tiny negative inputs, so the bound is re-checked.
fn wrap(value: f32, limit: f32) -> f32 {
    let wrapped = value.rem_euclid(limit);
    if wrapped >= limit {
        0.0
    } else {
        wrapped
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Drift,
    Flower,
}

pub struct ParticleEngine {
    particles: Vec<Particle>,
    width: f32,
    height: f32,
    count: usize,
    mode: Mode,
    time: f32,
}

impl ParticleEngine {
    pub fn new(count: usize) -> Self {
        Self {
            particles: Vec::new(),
            width: 0.0,
            height: 0.0,
            count,
            mode: Mode::Drift,
            time: 0.0,
        }
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Current particle positions.
    pub fn positions(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.particles.iter().map(|p| (p.x, p.y))
    }

    /// Adopt new surface dimensions. The population is kept as-is; drift
    /// wrapping or flower convergence recaptures anything out of bounds.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    /// Advance the simulation one frame.
    pub fn step(&mut self, gesture: GestureLabel, pointer: (f32, f32)) {
        if self.width <= 0.0 || self.height <= 0.0 {
            return;
        }
        self.ensure_population();
        self.time += 1.0;
        self.mode = if gesture == GestureLabel::Fist {
            Mode::Flower
        } else {
            Mode::Drift
        };
        match self.mode {
            Mode::Drift => self.step_drift(pointer),
            Mode::Flower => self.step_flower(pointer),
        }
    }

    /// Seed the population once, on the first step with a usable surface.
    fn ensure_population(&mut self) {
        if !self.particles.is_empty() {
            return;
        }
        let mut rng = rand::thread_rng();
        self.particles = (0..self.count)
            .map(|_| Particle::random(&mut rng, self.width, self.height))
            .collect();
    }

    fn step_drift(&mut self, pointer: (f32, f32)) {
        let mut rng = rand::thread_rng();
        for p in &mut self.particles {
            p.vx = (p.vx + rng.gen_range(-DRIFT_NOISE..=DRIFT_NOISE))
                .clamp(-MAX_DRIFT_SPEED, MAX_DRIFT_SPEED);
            p.vy = (p.vy + rng.gen_range(-DRIFT_NOISE..=DRIFT_NOISE))
                .clamp(-MAX_DRIFT_SPEED, MAX_DRIFT_SPEED);

            let dx = p.x - pointer.0;
            let dy = p.y - pointer.1;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist > f32::EPSILON && dist < REPULSION_RADIUS {
                let impulse = (REPULSION_RADIUS - dist) * REPULSION_GAIN;
                p.vx += dx / dist * impulse;
                p.vy += dy / dist * impulse;
            }

            p.x = wrap(p.x + p.vx, self.width);
            p.y = wrap(p.y + p.vy, self.height);
        }
    }

    fn step_flower(&mut self, pointer: (f32, f32)) {
        let scale = ROSE_SCALE * self.width.min(self.height);
        let total = self.particles.len();
        for (i, p) in self.particles.iter_mut().enumerate() {
            let (tx, ty) = rose::rose_target(i, total, scale, pointer);
            p.vx = FLOWER_EASING * (tx - p.x);
            p.vy = FLOWER_EASING * (ty - p.y);
            p.x += p.vx;
            p.y += p.vy;
        }
    }

    fn color(&self, index: usize) -> Rgb {
        match self.mode {
            Mode::Drift => {
                let hue = DRIFT_HUE + 30.0 * (self.time * 0.02 + index as f32 * 0.37).sin();
                hsl_to_rgb(hue, 0.8, 0.6)
            }
            Mode::Flower => {
                let hue = FLOWER_HUE + 20.0 * (self.time * 0.03 + index as f32 * 0.5).sin();
                hsl_to_rgb(hue, 0.85, 0.65)
            }
        }
    }

    /// Draw the population. Flower mode adds a glow halo per particle.
    pub fn render(&self, surface: &mut dyn Surface) {
        if self.width <= 0.0 || self.height <= 0.0 {
            return;
        }
        let glow = self.mode == Mode::Flower;
        for (i, p) in self.particles.iter().enumerate() {
            surface.plot(p.x, p.y, p.size, self.color(i), glow);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingSurface {
        width: f32,
        height: f32,
        plots: usize,
        glows: usize,
    }

    impl Surface for CountingSurface {
        fn width(&self) -> f32 {
            self.width
        }
        fn height(&self) -> f32 {
            self.height
        }
        fn clear(&mut self) {}
        fn plot(&mut self, _x: f32, _y: f32, _radius: f32, _color: Rgb, glow: bool) {
            self.plots += 1;
            if glow {
                self.glows += 1;
            }
        }
    }

    fn stepped_engine(steps: usize, gesture: GestureLabel) -> ParticleEngine {
        let mut engine = ParticleEngine::new(200);
        engine.resize(160.0, 90.0);
        for _ in 0..steps {
            engine.step(gesture, (80.0, 45.0));
        }
        engine
    }

    #[test]
    fn test_population_seeded_once() {
        let engine = stepped_engine(10, GestureLabel::Open);
        assert_eq!(engine.particle_count(), 200);
    }

    #[test]
    fn test_zero_area_is_noop() {
        let mut engine = ParticleEngine::new(200);
        engine.step(GestureLabel::Open, (0.0, 0.0));
        assert_eq!(engine.particle_count(), 0);

        let mut surface = CountingSurface {
            width: 0.0,
            height: 0.0,
            plots: 0,
            glows: 0,
        };
        engine.render(&mut surface);
        assert_eq!(surface.plots, 0);
    }

    #[test]
    fn test_wrap_stays_below_limit() {
        assert_eq!(wrap(0.0, 160.0), 0.0);
        assert_eq!(wrap(159.5, 160.0), 159.5);
        assert_eq!(wrap(160.0, 160.0), 0.0);
        assert_eq!(wrap(-0.5, 160.0), 159.5);
        // rem_euclid rounds a tiny negative input up to the limit itself;
        // the wrap must still land inside [0, limit).
        let wrapped = wrap(-1e-9, 160.0);
        assert!((0.0..160.0).contains(&wrapped), "wrapped to {}", wrapped);
        let wrapped = wrap(-f32::EPSILON * 0.25, 90.0);
        assert!((0.0..90.0).contains(&wrapped), "wrapped to {}", wrapped);
    }

    #[test]
    fn test_drift_stays_in_bounds() {
        let engine = stepped_engine(100, GestureLabel::Open);
        for p in &engine.particles {
            assert!(p.x >= 0.0 && p.x < 160.0, "x out of bounds: {}", p.x);
            assert!(p.y >= 0.0 && p.y < 90.0, "y out of bounds: {}", p.y);
        }
    }

    #[test]
    fn test_drift_velocity_clamped() {
        let engine = stepped_engine(500, GestureLabel::Open);
        for p in &engine.particles {
            // Repulsion can add a bounded impulse on top of the clamp.
            let ceiling = MAX_DRIFT_SPEED + REPULSION_RADIUS * REPULSION_GAIN;
            assert!(p.vx.abs() <= ceiling);
            assert!(p.vy.abs() <= ceiling);
        }
    }

    #[test]
    fn test_flower_converges_at_fixed_ratio() {
        let mut engine = stepped_engine(1, GestureLabel::Open);
        let pointer = (80.0, 45.0);
        engine.step(GestureLabel::Fist, pointer);

        let scale = ROSE_SCALE * 90.0;
        let total = engine.particles.len();
        let distance = |engine: &ParticleEngine| -> f32 {
            engine
                .particles
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    let (tx, ty) = rose::rose_target(i, total, scale, pointer);
                    ((p.x - tx).powi(2) + (p.y - ty).powi(2)).sqrt()
                })
                .sum()
        };

        let before = distance(&engine);
        engine.step(GestureLabel::Fist, pointer);
        let after = distance(&engine);
        assert!(before > 0.0);
        let ratio = after / before;
        assert!((ratio - (1.0 - FLOWER_EASING)).abs() < 1e-3, "ratio {}", ratio);
    }

    #[test]
    fn test_mode_flapping_keeps_population() {
        let mut engine = stepped_engine(1, GestureLabel::Open);
        for i in 0..50 {
            let gesture = if i % 2 == 0 {
                GestureLabel::Fist
            } else {
                GestureLabel::Open
            };
            engine.step(gesture, (80.0, 45.0));
        }
        assert_eq!(engine.particle_count(), 200);
        for p in &engine.particles {
            assert!(p.x.is_finite() && p.y.is_finite());
        }
    }

    #[test]
    fn test_resize_preserves_population() {
        let mut engine = stepped_engine(5, GestureLabel::Open);
        let before: Vec<(f32, f32)> = engine.particles.iter().map(|p| (p.x, p.y)).collect();
        engine.resize(320.0, 180.0);
        let after: Vec<(f32, f32)> = engine.particles.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(before, after);
        assert_eq!(engine.particle_count(), 200);
    }

    #[test]
    fn test_none_label_drifts() {
        // An unclassified gesture behaves like an open hand, with no glow.
        let engine = stepped_engine(3, GestureLabel::None);
        let mut surface = CountingSurface {
            width: 160.0,
            height: 90.0,
            plots: 0,
            glows: 0,
        };
        engine.render(&mut surface);
        assert_eq!(surface.plots, 200);
        assert_eq!(surface.glows, 0);
    }

    #[test]
    fn test_flower_renders_glow() {
        let engine = stepped_engine(3, GestureLabel::Fist);
        let mut surface = CountingSurface {
            width: 160.0,
            height: 90.0,
            plots: 0,
            glows: 0,
        };
        engine.render(&mut surface);
        assert_eq!(surface.glows, 200);
    }
}
