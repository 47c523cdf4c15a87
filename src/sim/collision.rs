//! Contact tests and world-edge resolution
//!
//! Balls never push each other apart: contact only matters for color mixing.
//! The world edges are the only thing that changes a ball's trajectory.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle, `(x, y)` is the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Half-open containment: `[x, x+w) × [y, y+h)`
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        self.x <= p.x && p.x < self.x + self.w && self.y <= p.y && p.y < self.y + self.h
    }
}

/// True if two circles overlap or touch (boundary inclusive)
#[inline]
pub fn circles_touch(p1: Vec2, r1: f32, p2: Vec2, r2: f32) -> bool {
    let rr = r1 + r2;
    p1.distance_squared(p2) <= rr * rr
}

/// Wrap one axis: fully past an edge by more than `r` reappears on the other side
#[inline]
fn wrap_axis(p: f32, r: f32, extent: f32) -> f32 {
    if p < -r {
        extent + r
    } else if p > extent + r {
        -r
    } else {
        p
    }
}

/// Torus-style wrap with the ball radius as margin, per axis
pub fn wrap_position(pos: Vec2, radius: f32, size: Vec2) -> Vec2 {
    Vec2::new(
        wrap_axis(pos.x, radius, size.x),
        wrap_axis(pos.y, radius, size.y),
    )
}

/// Reflect off the walls, but only while still moving into them
///
/// Returns the corrected position and velocity. A ball resting against a wall
/// (or already moving away) is left alone so its velocity doesn't flip every frame.
pub fn bounce(pos: Vec2, vel: Vec2, radius: f32, size: Vec2) -> (Vec2, Vec2) {
    let (mut p, mut v) = (pos, vel);

    if p.x - radius < 0.0 && v.x < 0.0 {
        p.x = radius;
        v.x = -v.x;
    }
    if p.x + radius > size.x && v.x > 0.0 {
        p.x = size.x - radius;
        v.x = -v.x;
    }
    if p.y - radius < 0.0 && v.y < 0.0 {
        p.y = radius;
        v.y = -v.y;
    }
    if p.y + radius > size.y && v.y > 0.0 {
        p.y = size.y - radius;
        v.y = -v.y;
    }

    (p, v)
}

/// Clamp the center into `[r, extent - r]` per axis
pub fn clamp_position(pos: Vec2, radius: f32, size: Vec2) -> Vec2 {
    Vec2::new(
        pos.x.max(radius).min(size.x - radius),
        pos.y.max(radius).min(size.y - radius),
    )
}
