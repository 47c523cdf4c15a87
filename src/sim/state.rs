//! World state and entity bookkeeping
//!
//! A ball lives in exactly one of two places: the active store (simulated and
//! drawn) or the inventory (captured, waiting to be spat back out).

use std::collections::{HashMap, VecDeque};

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::color::Color;
use crate::consts::SPAWN_SPEED;
use crate::error::{Result, SandboxError};
use crate::settings::WorldConfig;
use crate::uniform;

/// Ball identifier; positive, never reused within a world
pub type BallId = u32;

/// A ball entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    id: BallId,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Fixed at creation, always > 0
    radius: f32,
    pub color: Color,
    /// Reserved; no force reads it yet
    mass: f32,
}

impl Ball {
    #[inline]
    pub fn id(&self) -> BallId {
        self.id
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

/// Active balls in insertion order, indexed by id
#[derive(Debug, Clone, Default)]
pub struct BallStore {
    balls: Vec<Ball>,
    index: HashMap<BallId, usize>,
}

impl BallStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.balls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balls.is_empty()
    }

    pub fn contains(&self, id: BallId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: BallId) -> Option<&Ball> {
        self.index.get(&id).map(|&slot| &self.balls[slot])
    }

    pub fn as_slice(&self) -> &[Ball] {
        &self.balls
    }

    /// Mutable view for in-place stage updates; ids are not writable through it
    pub fn as_mut_slice(&mut self) -> &mut [Ball] {
        &mut self.balls
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Ball> {
        self.balls.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Ball> {
        self.balls.iter_mut()
    }

    /// Append a ball; the caller guarantees its id is not already stored
    pub fn push(&mut self, ball: Ball) {
        debug_assert!(!self.contains(ball.id), "duplicate ball id {}", ball.id);
        self.index.insert(ball.id, self.balls.len());
        self.balls.push(ball);
    }

    /// Remove by id, keeping the order of the remaining balls
    pub fn remove(&mut self, id: BallId) -> Option<Ball> {
        let slot = self.index.remove(&id)?;
        let ball = self.balls.remove(slot);
        self.reindex_from(slot);
        Some(ball)
    }

    /// Remove every ball matching `pred`, returned in store order
    pub fn drain_where<F>(&mut self, mut pred: F) -> Vec<Ball>
    where
        F: FnMut(&Ball) -> bool,
    {
        let Some(first) = self.balls.iter().position(|b| pred(b)) else {
            return Vec::new();
        };
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.balls.len());
        for (slot, ball) in self.balls.drain(..).enumerate() {
            if slot == first || (slot > first && pred(&ball)) {
                removed.push(ball);
            } else {
                kept.push(ball);
            }
        }
        self.balls = kept;
        for ball in &removed {
            self.index.remove(&ball.id);
        }
        self.reindex_from(first);
        removed
    }

    fn reindex_from(&mut self, start: usize) {
        for (slot, ball) in self.balls.iter().enumerate().skip(start) {
            self.index.insert(ball.id, slot);
        }
    }
}

fn validate_shape(radius: f32, mass: f32) -> Result<()> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(SandboxError::InvalidParam(format!(
            "radius must be finite and > 0, got {radius}"
        )));
    }
    if !mass.is_finite() || mass <= 0.0 {
        return Err(SandboxError::InvalidParam(format!(
            "mass must be finite and > 0, got {mass}"
        )));
    }
    Ok(())
}

/// The sandbox: active balls, inventory, deletion zone and a seeded RNG
///
/// `step` takes `&mut self`, so overlapping steps on one world cannot be expressed.
#[derive(Debug, Clone)]
pub struct World {
    pub(super) config: WorldConfig,
    pub(super) rng: Pcg32,
    seed: u64,
    next_id: BallId,
    pub(super) deletion_zone: Option<Rect>,
    pub(super) balls: BallStore,
    pub(super) inventory: VecDeque<Ball>,
}

impl World {
    /// Create an empty world; `None` draws a fresh seed
    pub fn new(config: WorldConfig, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        log::info!(
            "World {}x{} ({}), seed {}",
            config.width,
            config.height,
            config.boundary.as_str(),
            seed
        );
        Self {
            config,
            rng: Pcg32::seed_from_u64(seed),
            seed,
            next_id: 1,
            deletion_zone: None,
            balls: BallStore::new(),
            inventory: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Seed the RNG was built from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Active balls in draw order
    pub fn balls(&self) -> &[Ball] {
        self.balls.as_slice()
    }

    /// Captured balls, oldest first
    pub fn inventory(&self) -> &VecDeque<Ball> {
        &self.inventory
    }

    pub fn ball(&self, id: BallId) -> Option<&Ball> {
        self.balls.get(id)
    }

    /// True if `id` is live, active or in inventory
    pub fn contains_id(&self, id: BallId) -> bool {
        self.balls.contains(id) || self.inventory.iter().any(|b| b.id == id)
    }

    pub fn deletion_zone(&self) -> Option<Rect> {
        self.deletion_zone
    }

    /// Define or clear the deletion zone
    pub fn set_deletion_zone(&mut self, zone: Option<Rect>) {
        self.deletion_zone = zone;
    }

    /// Allocate a new ball ID; fails once the id space is used up
    fn next_ball_id(&mut self) -> Result<BallId> {
        let id = self.next_id;
        self.next_id = id
            .checked_add(1)
            .ok_or_else(|| SandboxError::InvalidParam("ball ids exhausted".into()))?;
        Ok(id)
    }

    /// Add a ball with a fresh id; color is clamped by construction
    pub fn add_ball(
        &mut self,
        position: Vec2,
        radius: f32,
        color: Color,
        velocity: Vec2,
        mass: f32,
    ) -> Result<Ball> {
        validate_shape(radius, mass)?;
        let id = self.next_ball_id()?;
        Ok(self.insert(id, position, radius, color, velocity, mass))
    }

    /// Add a ball under a caller-chosen id
    ///
    /// The id counter skips past `id` so later fresh ids stay unique.
    pub fn add_ball_with_id(
        &mut self,
        id: BallId,
        position: Vec2,
        radius: f32,
        color: Color,
        velocity: Vec2,
        mass: f32,
    ) -> Result<Ball> {
        validate_shape(radius, mass)?;
        // MAX is kept out so the counter can always move past an explicit id
        if id == 0 || id == BallId::MAX {
            return Err(SandboxError::InvalidParam(format!(
                "ball id must be in 1..{}, got {id}",
                BallId::MAX
            )));
        }
        if self.contains_id(id) {
            return Err(SandboxError::DuplicateId(id));
        }
        self.next_id = self.next_id.max(id + 1);
        Ok(self.insert(id, position, radius, color, velocity, mass))
    }

    fn insert(
        &mut self,
        id: BallId,
        position: Vec2,
        radius: f32,
        color: Color,
        velocity: Vec2,
        mass: f32,
    ) -> Ball {
        let ball = Ball {
            id,
            position,
            velocity,
            radius,
            color,
            mass,
        };
        self.balls.push(ball.clone());
        ball
    }

    /// Remove an active ball; `None` if it isn't active
    pub fn remove_ball_by_id(&mut self, id: BallId) -> Option<Ball> {
        self.balls.remove(id)
    }

    /// Spawn a random ball that fits fully inside the world
    pub fn add_random_ball(&mut self, radius_range: (f32, f32)) -> Result<Ball> {
        let (w, h) = (self.config.width, self.config.height);
        let rng = &mut self.rng;
        let r = uniform(rng, radius_range.0, radius_range.1);
        let x = uniform(rng, r, w - r);
        let y = uniform(rng, r, h - r);
        let vx = uniform(rng, -SPAWN_SPEED, SPAWN_SPEED);
        let vy = uniform(rng, -SPAWN_SPEED, SPAWN_SPEED);
        let color = Color::new(rng.random(), rng.random(), rng.random());
        self.add_ball(Vec2::new(x, y), r, color, Vec2::new(vx, vy), 1.0)
    }
}

/// World with the sandbox's usual feel: wrapping edges, light damping, no gravity
pub fn create_default_world(width: f32, height: f32, seed: Option<u64>) -> World {
    let config = WorldConfig {
        linear_damping: 0.05,
        ..WorldConfig::new(width, height)
    };
    World::new(config, seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::BoundaryMode;

    fn world() -> World {
        World::new(WorldConfig::new(200.0, 100.0), Some(42))
    }

    fn add(world: &mut World, x: f32, y: f32) -> Ball {
        world
            .add_ball(Vec2::new(x, y), 5.0, Color::WHITE, Vec2::ZERO, 1.0)
            .unwrap()
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut w = world();
        let a = add(&mut w, 10.0, 10.0);
        let b = add(&mut w, 20.0, 20.0);
        assert_eq!((a.id(), b.id()), (1, 2));
        w.remove_ball_by_id(b.id());
        let c = add(&mut w, 30.0, 30.0);
        assert_eq!(c.id(), 3);
    }

    #[test]
    fn test_add_ball_clamps_color() {
        let mut w = world();
        let b = w
            .add_ball(Vec2::ZERO, 3.0, Color::new(2.0, -1.0, 0.5), Vec2::ZERO, 1.0)
            .unwrap();
        assert_eq!(b.color.to_array(), [1.0, 0.0, 0.5]);
        assert_eq!(w.balls()[0].color, b.color);
    }

    #[test]
    fn test_add_ball_rejects_bad_shape() {
        let mut w = world();
        let err = w
            .add_ball(Vec2::ZERO, -1.0, Color::WHITE, Vec2::ZERO, 1.0)
            .unwrap_err();
        assert!(err.to_string().contains("radius"));
        let err = w
            .add_ball(Vec2::ZERO, 1.0, Color::WHITE, Vec2::ZERO, 0.0)
            .unwrap_err();
        assert!(err.to_string().contains("mass"));
        assert!(w.balls().is_empty());
        // No id was burned on failure
        assert_eq!(add(&mut w, 1.0, 1.0).id(), 1);
    }

    #[test]
    fn test_remove_missing_is_none() {
        let mut w = world();
        add(&mut w, 10.0, 10.0);
        assert!(w.remove_ball_by_id(99).is_none());
        assert_eq!(w.balls().len(), 1);
    }

    #[test]
    fn test_remove_keeps_order_and_index() {
        let mut w = world();
        for i in 0..5 {
            add(&mut w, i as f32 * 10.0, 0.0);
        }
        let removed = w.remove_ball_by_id(2).unwrap();
        assert_eq!(removed.id(), 2);
        let ids: Vec<_> = w.balls().iter().map(Ball::id).collect();
        assert_eq!(ids, vec![1, 3, 4, 5]);
        assert_eq!(w.ball(4).unwrap().position.x, 30.0);
        assert!(w.ball(2).is_none());
    }

    #[test]
    fn test_explicit_ids() {
        let mut w = world();
        let b = w
            .add_ball_with_id(10, Vec2::ZERO, 2.0, Color::BLACK, Vec2::ZERO, 1.0)
            .unwrap();
        assert_eq!(b.id(), 10);
        let dup = w.add_ball_with_id(10, Vec2::ZERO, 2.0, Color::BLACK, Vec2::ZERO, 1.0);
        assert!(matches!(dup, Err(SandboxError::DuplicateId(10))));
        let zero = w.add_ball_with_id(0, Vec2::ZERO, 2.0, Color::BLACK, Vec2::ZERO, 1.0);
        assert!(matches!(zero, Err(SandboxError::InvalidParam(_))));
        // Fresh ids continue past the explicit one
        assert_eq!(add(&mut w, 0.0, 0.0).id(), 11);
    }

    #[test]
    fn test_explicit_id_near_max_never_repeats() {
        let mut w = world();
        let max = w.add_ball_with_id(BallId::MAX, Vec2::ZERO, 2.0, Color::BLACK, Vec2::ZERO, 1.0);
        assert!(matches!(max, Err(SandboxError::InvalidParam(_))));

        let last = w
            .add_ball_with_id(BallId::MAX - 1, Vec2::ZERO, 2.0, Color::BLACK, Vec2::ZERO, 1.0)
            .unwrap();
        assert_eq!(last.id(), BallId::MAX - 1);
        // Counter sits at MAX: no fresh id left, and no duplicate handed out
        let err = w
            .add_ball(Vec2::ZERO, 2.0, Color::BLACK, Vec2::ZERO, 1.0)
            .unwrap_err();
        assert!(err.to_string().contains("exhausted"));
        assert_eq!(w.balls().len(), 1);
    }

    #[test]
    fn test_random_ball_fits_world() {
        let mut w = world();
        for _ in 0..200 {
            let b = w.add_random_ball((8.0, 16.0)).unwrap();
            assert!((8.0..=16.0).contains(&b.radius()));
            assert!(b.position.x >= b.radius() && b.position.x <= 200.0 - b.radius());
            assert!(b.position.y >= b.radius() && b.position.y <= 100.0 - b.radius());
            assert!(b.velocity.x.abs() <= SPAWN_SPEED && b.velocity.y.abs() <= SPAWN_SPEED);
        }
    }

    #[test]
    fn test_random_balls_are_seeded() {
        let mut a = world();
        let mut b = world();
        for _ in 0..10 {
            assert_eq!(
                a.add_random_ball((4.0, 9.0)).unwrap(),
                b.add_random_ball((4.0, 9.0)).unwrap()
            );
        }
        assert_eq!(a.seed(), 42);
    }

    #[test]
    fn test_store_drain_where() {
        let mut store = BallStore::new();
        let mut w = world();
        for i in 0..6 {
            store.push(add(&mut w, i as f32, 0.0));
        }
        let removed = store.drain_where(|b| b.id() % 2 == 0);
        let removed_ids: Vec<_> = removed.iter().map(Ball::id).collect();
        assert_eq!(removed_ids, vec![2, 4, 6]);
        let kept: Vec<_> = store.iter().map(Ball::id).collect();
        assert_eq!(kept, vec![1, 3, 5]);
        assert_eq!(store.get(5).unwrap().position.x, 4.0);
        assert!(!store.contains(4));

        assert!(store.drain_where(|_| false).is_empty());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_default_world() {
        let w = create_default_world(640.0, 480.0, Some(1337));
        assert_eq!(w.config().boundary, BoundaryMode::Wrap);
        assert_eq!(w.config().linear_damping, 0.05);
        assert_eq!(w.config().gravity, Vec2::ZERO);
        assert!(w.balls().is_empty() && w.inventory().is_empty());
    }
}
