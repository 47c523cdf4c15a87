//! Deterministic simulation module
//!
//! All sandbox logic lives here. This module must stay pure and deterministic:
//! - Caller-supplied `dt`, no clocks
//! - Seeded RNG only
//! - Stable iteration order (insertion order of the active store)
//! - No rendering or platform dependencies

pub mod collision;
pub mod color;
pub mod event;
pub mod state;
pub mod tick;

pub use collision::{Rect, circles_touch};
pub use color::{Color, hsl_to_rgb, rgb_to_hsl, vivid_color_mix};
pub use event::{EventKind, WorldEvent, WorldEvents};
pub use state::{Ball, BallId, BallStore, World, create_default_world};
pub use tick::{InputState, SpitRequest};

pub use crate::settings::{BoundaryMode, WorldConfig};
