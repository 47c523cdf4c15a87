//! Ball Sandbox - a frame-stepped 2D particle playground
//!
//! Core modules:
//! - `sim`: Deterministic simulation (motion, boundaries, mixing, vacuum/spit)
//! - `settings`: Session tunables loaded from JSON
//! - `error`: Crate error type
//!
//! Rendering, windowing and input polling are the caller's business: feed an
//! [`sim::InputState`] into [`sim::World::step`] once per frame, then read
//! `balls()`/`inventory()` back for drawing.

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{Result, SandboxError};
pub use settings::SandboxSettings;
pub use sim::{
    Ball, BallId, BoundaryMode, Color, InputState, Rect, SpitRequest, World, WorldConfig,
    WorldEvent, WorldEvents, create_default_world, vivid_color_mix,
};

use glam::Vec2;

/// Simulation constants
pub mod consts {
    /// Distances at or below this are treated as zero (pointer overlap, zero direction)
    pub const EPSILON: f32 = 1e-6;

    /// Suction falloff never drops below this fraction of full strength
    pub const SUCTION_MIN_FALLOFF: f32 = 0.05;

    /// Random spawn velocity range per axis (pixels/s)
    pub const SPAWN_SPEED: f32 = 60.0;
    /// Default radius range for random spawns
    pub const SPAWN_RADIUS_RANGE: (f32, f32) = (8.0, 16.0);

    /// Spit jitter: position offset is ±this fraction of the ball radius
    pub const SPIT_POSITION_JITTER: f32 = 0.25;
    /// Spit jitter: velocity noise per axis (pixels/s)
    pub const SPIT_VELOCITY_NOISE: f32 = 10.0;
    /// Launch speed when a request does not specify one
    pub const SPIT_DEFAULT_SPEED: f32 = 200.0;

    /// Suction radius used when the caller does not supply one
    pub const DEFAULT_SUCTION_RADIUS: f32 = 80.0;
}

/// Unit vector along `dir`, or +X when `dir` is (near) zero
#[inline]
pub fn normalize_or_default(dir: Vec2) -> Vec2 {
    let len = dir.length();
    if len <= consts::EPSILON {
        Vec2::X
    } else {
        dir / len
    }
}

/// Uniform sample in `[a, b)`; tolerates `a > b` and `a == b` without panicking
#[inline]
pub fn uniform<R: rand::Rng + ?Sized>(rng: &mut R, a: f32, b: f32) -> f32 {
    a + (b - a) * rng.random::<f32>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_normalize_zero_defaults_to_x() {
        assert_eq!(normalize_or_default(Vec2::ZERO), Vec2::X);
        assert_eq!(normalize_or_default(Vec2::new(1e-9, 0.0)), Vec2::X);
    }

    #[test]
    fn test_normalize_regular() {
        let n = normalize_or_default(Vec2::new(0.0, -3.0));
        assert!((n - Vec2::new(0.0, -1.0)).length() < 1e-6);
    }

    #[test]
    fn test_uniform_bounds() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..1000 {
            let v = uniform(&mut rng, -60.0, 60.0);
            assert!((-60.0..=60.0).contains(&v));
        }
        // Degenerate and reversed ranges
        assert_eq!(uniform(&mut rng, 5.0, 5.0), 5.0);
        let r = uniform(&mut rng, 10.0, 2.0);
        assert!((2.0..=10.0).contains(&r));
    }
}
