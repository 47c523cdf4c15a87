//! Per-frame simulation step
//!
//! One `step` runs a fixed pipeline over the active balls:
//! spit → suction → integrate → boundaries → deletion zone → color mixing → capture.
//! Each stage sees the output of the one before it; reordering changes behavior.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{bounce, circles_touch, clamp_position, wrap_position};
use super::color::{Color, vivid_color_mix};
use super::event::{WorldEvent, WorldEvents};
use super::state::World;
use crate::consts::*;
use crate::normalize_or_default;
use crate::settings::BoundaryMode;

/// Request to launch balls out of the inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpitRequest {
    /// Balls to release; 0 is treated as 1, capped by inventory size
    pub count: u32,
    /// Where they appear; `None` means the world center
    pub position: Option<Vec2>,
    /// Launch direction, need not be normalized; zero means +X
    pub direction: Vec2,
    /// Launch speed (pixels/s)
    pub speed: f32,
}

impl Default for SpitRequest {
    fn default() -> Self {
        Self {
            count: 1,
            position: None,
            direction: Vec2::X,
            speed: SPIT_DEFAULT_SPEED,
        }
    }
}

impl SpitRequest {
    pub fn new(count: u32, position: Vec2, direction: Vec2, speed: f32) -> Self {
        Self {
            count,
            position: Some(position),
            direction,
            speed,
        }
    }
}

/// Control signal for a single step, supplied by the event loop
#[derive(Debug, Clone, PartialEq)]
pub struct InputState {
    /// Pointer position, if the pointer is over the world
    pub pointer: Option<Vec2>,
    /// Vacuum button held
    pub sucking_enabled: bool,
    /// Reach of the vacuum around the pointer
    pub suction_radius: f32,
    /// Spit requests, processed in order and drained by `step`
    pub spit_requests: Vec<SpitRequest>,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            pointer: None,
            sucking_enabled: false,
            suction_radius: DEFAULT_SUCTION_RADIUS,
            spit_requests: Vec::new(),
        }
    }
}

impl InputState {
    /// Pointer to use for vacuum stages, if the vacuum is active
    #[inline]
    fn vacuum(&self) -> Option<Vec2> {
        if self.sucking_enabled { self.pointer } else { None }
    }
}

impl World {
    /// Advance the world by `dt` seconds
    ///
    /// `dt == 0` is fine: spit requests are still handled, nothing moves.
    /// Drains `inputs.spit_requests` so a reused input can't spit twice.
    pub fn step(&mut self, dt: f32, inputs: &mut InputState) -> WorldEvents {
        let mut events = WorldEvents::new();

        // Spit first so launched balls move this frame
        for req in inputs.spit_requests.drain(..) {
            self.spit(&req, &mut events);
        }

        if let Some(pointer) = inputs.vacuum() {
            self.apply_suction(pointer, inputs.suction_radius, dt);
        }

        self.integrate(dt);
        self.resolve_boundaries();
        self.apply_deletion_zone(&mut events);
        self.mix_colors(&mut events);

        if let Some(pointer) = inputs.vacuum() {
            self.capture(pointer, &mut events);
        }

        if !events.is_empty() {
            log::debug!(
                "step: {} events, {} active, {} in inventory",
                events.len(),
                self.balls.len(),
                self.inventory.len()
            );
        }
        events
    }

    /// Step with no pointer and no requests
    pub fn advance(&mut self, dt: f32) -> WorldEvents {
        self.step(dt, &mut InputState::default())
    }

    fn spit(&mut self, req: &SpitRequest, events: &mut WorldEvents) {
        let count = req.count.max(1) as usize;
        let dir = normalize_or_default(req.direction);
        let n = count.min(self.inventory.len());
        let origin = req.position.unwrap_or_else(|| self.config.size() * 0.5);

        for _ in 0..n {
            let Some(mut ball) = self.inventory.pop_front() else {
                break;
            };
            // Jitter so a batch doesn't land exactly on top of itself
            let jitter = 2.0 * SPIT_POSITION_JITTER * ball.radius();
            let jx = (self.rng.random::<f32>() - 0.5) * jitter;
            let jy = (self.rng.random::<f32>() - 0.5) * jitter;
            let nx = (self.rng.random::<f32>() - 0.5) * 2.0 * SPIT_VELOCITY_NOISE;
            let ny = (self.rng.random::<f32>() - 0.5) * 2.0 * SPIT_VELOCITY_NOISE;

            ball.position = origin + Vec2::new(jx, jy);
            ball.velocity = dir * req.speed + Vec2::new(nx, ny);
            events.emit(WorldEvent::Spat {
                ball_id: ball.id(),
                position: ball.position,
                velocity: ball.velocity,
            });
            self.balls.push(ball);
        }
    }

    fn apply_suction(&mut self, pointer: Vec2, radius: f32, dt: f32) {
        let strength = self.config.suction_strength;
        for ball in self.balls.iter_mut() {
            let delta = pointer - ball.position;
            let dist = delta.length();
            if dist <= EPSILON || dist > radius {
                continue;
            }
            // Stronger toward the pointer, never below the floor
            let falloff = (1.0 - dist / radius).max(SUCTION_MIN_FALLOFF);
            let accel = delta / dist * strength * falloff;
            ball.velocity += accel * dt;
        }
    }

    fn integrate(&mut self, dt: f32) {
        let gravity = self.config.gravity;
        let damping = self.config.linear_damping;
        let max_speed = self.config.max_speed;

        for ball in self.balls.iter_mut() {
            let mut vel = ball.velocity + gravity * dt;
            if damping > 0.0 {
                vel *= (1.0 - damping * dt).max(0.0);
            }
            if max_speed > 0.0 {
                let speed = vel.length();
                if speed > max_speed {
                    vel *= max_speed / speed.max(EPSILON);
                }
            }
            ball.velocity = vel;
            ball.position += vel * dt;
        }
    }

    fn resolve_boundaries(&mut self) {
        let size = self.config.size();
        match self.config.boundary {
            BoundaryMode::Wrap => {
                for ball in self.balls.iter_mut() {
                    ball.position = wrap_position(ball.position, ball.radius(), size);
                }
            }
            BoundaryMode::Bounce => {
                for ball in self.balls.iter_mut() {
                    let (p, v) = bounce(ball.position, ball.velocity, ball.radius(), size);
                    ball.position = p;
                    ball.velocity = v;
                }
            }
            BoundaryMode::Clamp => {
                for ball in self.balls.iter_mut() {
                    ball.position = clamp_position(ball.position, ball.radius(), size);
                }
            }
        }
    }

    fn apply_deletion_zone(&mut self, events: &mut WorldEvents) {
        let Some(zone) = self.deletion_zone else {
            return;
        };
        for ball in self.balls.drain_where(|b| zone.contains(b.position)) {
            events.emit(WorldEvent::Deleted { ball_id: ball.id() });
        }
    }

    /// Average colors of every touching pair
    ///
    /// "Before" colors always come from the snapshot taken at the start of the
    /// stage, so a ball touching several others mixes with their original colors
    /// rather than with values already mixed this frame. Stored colors are still
    /// written pair by pair; the last pair a ball appears in wins.
    fn mix_colors(&mut self, events: &mut WorldEvents) {
        let balls = self.balls.as_mut_slice();
        let n = balls.len();
        if n <= 1 {
            return;
        }
        let snapshot: Vec<Color> = balls.iter().map(|b| b.color).collect();

        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = (&balls[i], &balls[j]);
                if !circles_touch(a.position, a.radius(), b.position, b.radius()) {
                    continue;
                }
                let (before_a, before_b) = (snapshot[i], snapshot[j]);
                let mixed = vivid_color_mix(before_a, before_b);
                let ids = (a.id(), b.id());
                balls[i].color = mixed;
                balls[j].color = mixed;
                events.emit(WorldEvent::Mixed {
                    ball_ids: ids,
                    colors_before: (before_a, before_b),
                    color_after: mixed,
                });
            }
        }
    }

    fn capture(&mut self, pointer: Vec2, events: &mut WorldEvents) {
        let reach = self.config.capture_distance;
        for ball in self.balls.drain_where(|b| b.position.distance(pointer) <= reach) {
            events.emit(WorldEvent::Sucked { ball_id: ball.id() });
            self.inventory.push_back(ball);
        }
    }
}
