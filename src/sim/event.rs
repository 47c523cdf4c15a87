//! Per-step event log
//!
//! Events are advisory: the caller can drive sounds or particle effects off
//! them, but nothing in the simulation reads them back.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::color::Color;
use super::state::BallId;

/// Something that happened to a ball during a step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorldEvent {
    /// Ball removed permanently by the deletion zone
    Deleted { ball_id: BallId },
    /// Two touching balls adopted their averaged color
    Mixed {
        ball_ids: (BallId, BallId),
        colors_before: (Color, Color),
        color_after: Color,
    },
    /// Ball captured by the vacuum into the inventory
    Sucked { ball_id: BallId },
    /// Inventory ball reinjected into the world
    Spat {
        ball_id: BallId,
        position: Vec2,
        velocity: Vec2,
    },
}

/// Discriminant-only view of [`WorldEvent`], handy for counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Deleted,
    Mixed,
    Sucked,
    Spat,
}

impl WorldEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            WorldEvent::Deleted { .. } => EventKind::Deleted,
            WorldEvent::Mixed { .. } => EventKind::Mixed,
            WorldEvent::Sucked { .. } => EventKind::Sucked,
            WorldEvent::Spat { .. } => EventKind::Spat,
        }
    }
}

/// Ordered events emitted by one `step`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldEvents {
    pub events: Vec<WorldEvent>,
}

impl WorldEvents {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn emit(&mut self, event: WorldEvent) {
        self.events.push(event);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WorldEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of events of one kind
    pub fn count(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }

    pub fn into_vec(self) -> Vec<WorldEvent> {
        self.events
    }
}

impl IntoIterator for WorldEvents {
    type Item = WorldEvent;
    type IntoIter = std::vec::IntoIter<WorldEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

impl<'a> IntoIterator for &'a WorldEvents {
    type Item = &'a WorldEvent;
    type IntoIter = std::slice::Iter<'a, WorldEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_preserves_order() {
        let mut events = WorldEvents::new();
        events.emit(WorldEvent::Sucked { ball_id: 3 });
        events.emit(WorldEvent::Deleted { ball_id: 1 });
        events.emit(WorldEvent::Sucked { ball_id: 2 });

        assert_eq!(events.len(), 3);
        assert_eq!(events.count(EventKind::Sucked), 2);
        assert_eq!(events.count(EventKind::Mixed), 0);
        let kinds: Vec<_> = events.iter().map(WorldEvent::kind).collect();
        assert_eq!(
            kinds,
            vec![EventKind::Sucked, EventKind::Deleted, EventKind::Sucked]
        );
    }

    #[test]
    fn test_serialized_with_type_tag() {
        let json = serde_json::to_value(WorldEvent::Deleted { ball_id: 9 }).unwrap();
        assert_eq!(json["type"], "deleted");
        assert_eq!(json["ball_id"], 9);

        let spat = WorldEvent::Spat {
            ball_id: 4,
            position: Vec2::new(1.0, 2.0),
            velocity: Vec2::new(3.0, 4.0),
        };
        let json = serde_json::to_value(&spat).unwrap();
        assert_eq!(json["type"], "spat");
        let back: WorldEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, spat);
    }
}
