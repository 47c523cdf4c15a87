//! World configuration and session settings
//!
//! Both are plain serde structs so a session can be tuned from a JSON file.
//! Missing fields fall back to defaults.

use std::convert::Infallible;
use std::path::Path;
use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_SUCTION_RADIUS, SPAWN_RADIUS_RANGE};
use crate::error::Result;
use crate::sim::Rect;

/// What happens when a ball reaches the world edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum BoundaryMode {
    /// Leave one side, come back on the other
    #[default]
    Wrap,
    /// Reflect velocity off the walls
    Bounce,
    /// Pin the center inside the walls; the fallback for unknown modes
    Clamp,
}

impl BoundaryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoundaryMode::Wrap => "wrap",
            BoundaryMode::Bounce => "bounce",
            BoundaryMode::Clamp => "clamp",
        }
    }

    /// Lenient parse: anything that isn't wrap/bounce clamps
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "wrap" => BoundaryMode::Wrap,
            "bounce" => BoundaryMode::Bounce,
            _ => BoundaryMode::Clamp,
        }
    }
}

impl FromStr for BoundaryMode {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<String> for BoundaryMode {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

/// Simulation tunables, fixed for the lifetime of a world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// World bounds (pixels)
    pub width: f32,
    pub height: f32,
    pub boundary: BoundaryMode,
    /// Velocity damping per second (0 = none)
    pub linear_damping: f32,
    /// Constant acceleration (pixels/s²)
    pub gravity: Vec2,
    /// Peak vacuum acceleration at the pointer (pixels/s²)
    pub suction_strength: f32,
    /// Balls this close to an active vacuum are captured
    pub capture_distance: f32,
    /// Speed cap (pixels/s); 0 disables
    pub max_speed: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 600.0,
            boundary: BoundaryMode::Wrap,
            linear_damping: 0.0,
            gravity: Vec2::ZERO,
            suction_strength: 10.0,
            capture_distance: 12.0,
            max_speed: 0.0,
        }
    }
}

impl WorldConfig {
    /// Default tunables for a world of the given size
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// World bounds as a vector
    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Tunables for a sandbox session: the world plus how it is seeded and driven
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxSettings {
    pub world: WorldConfig,
    /// RNG seed for reproducible sessions
    pub seed: u64,

    // === Population ===
    /// Random balls spawned at startup
    pub initial_ball_count: usize,
    /// Radius range for random spawns
    pub radius_range: (f32, f32),

    // === Vacuum / spit ===
    pub suction_radius: f32,
    /// Balls released per spit gesture
    pub spit_count: u32,
    pub spit_speed: f32,

    // === Deletion zone ===
    pub deletion_zone: Option<Rect>,

    // === Session ===
    /// Frames per second of the fixed-step loop
    pub frame_rate: u32,
    /// Frames the headless session runs for
    pub frames: u32,
}

impl Default for SandboxSettings {
    fn default() -> Self {
        let world = WorldConfig {
            linear_damping: 0.05,
            ..WorldConfig::default()
        };
        // Bottom-right corner
        let deletion_zone = Rect::new(world.width - 140.0, world.height - 120.0, 120.0, 100.0);
        Self {
            world,
            seed: 1337,
            initial_ball_count: 60,
            radius_range: SPAWN_RADIUS_RANGE,
            suction_radius: 100.0,
            spit_count: 3,
            spit_speed: 320.0,
            deletion_zone: Some(deletion_zone),
            frame_rate: 120,
            frames: 600,
        }
    }
}

impl SandboxSettings {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from a JSON file, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let json = std::fs::read_to_string(path)?;
                let settings = Self::from_json(&json)?;
                log::info!("Loaded settings from {}", path.display());
                Ok(settings)
            }
            None => {
                log::info!("Using default settings");
                Ok(Self::default())
            }
        }
    }

    /// Fixed timestep (seconds)
    pub fn dt(&self) -> f32 {
        1.0 / self.frame_rate.max(1) as f32
    }

    /// Suction radius, falling back to the built-in default when unset
    pub fn effective_suction_radius(&self) -> f32 {
        if self.suction_radius > 0.0 {
            self.suction_radius
        } else {
            DEFAULT_SUCTION_RADIUS
        }
    }
}
