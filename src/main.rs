//! Ball Sandbox entry point
//!
//! Headless session: builds a world from settings and drives it with a
//! scripted pointer (vacuum sweep, then drag-release spits), logging the HUD
//! instead of drawing it. Pass a settings JSON path as the first argument.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;

use glam::Vec2;

use ball_sandbox::sim::{EventKind, InputState, SpitRequest, World};
use ball_sandbox::{Result, SandboxSettings};

/// What the scripted pointer does on a frame of the spit phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gesture {
    Press,
    Release,
    Hold,
}

/// Drag gestures last half a second but never less than two frames,
/// so every press is followed by its own release
fn gesture_at(frame: u32, frame_rate: u32) -> Gesture {
    let period = (frame_rate / 2).max(2);
    match frame % period {
        0 => Gesture::Press,
        f if f == period - 1 => Gesture::Release,
        _ => Gesture::Hold,
    }
}

/// Session holding the world and the per-frame input
struct Session {
    world: World,
    input: InputState,
    settings: SandboxSettings,
    frame: u32,
    /// Where the current spit drag started
    drag_start: Option<Vec2>,
    tally: HashMap<EventKind, usize>,
}

impl Session {
    fn new(settings: SandboxSettings) -> Result<Self> {
        let mut world = World::new(settings.world.clone(), Some(settings.seed));
        world.set_deletion_zone(settings.deletion_zone);
        for _ in 0..settings.initial_ball_count {
            world.add_random_ball(settings.radius_range)?;
        }
        let input = InputState {
            suction_radius: settings.effective_suction_radius(),
            ..Default::default()
        };
        Ok(Self {
            world,
            input,
            settings,
            frame: 0,
            drag_start: None,
            tally: HashMap::new(),
        })
    }

    /// Scripted pointer: a slow figure-eight over the world
    fn pointer_at(&self, frame: u32) -> Vec2 {
        let size = self.world.config().size();
        let t = frame as f32 / self.settings.frame_rate.max(1) as f32;
        let center = size * 0.5;
        center
            + Vec2::new(
                (t * 0.7).sin() * size.x * 0.35,
                (t * 1.4).sin() * size.y * 0.3,
            )
    }

    fn record(&mut self, events: ball_sandbox::WorldEvents) {
        for event in &events {
            *self.tally.entry(event.kind()).or_default() += 1;
        }
    }

    /// Release the drag: spit toward the drag direction, processed right away
    fn release_spit(&mut self, release: Vec2) {
        let start = self.drag_start.take().unwrap_or(release);
        let mut spit = InputState {
            pointer: Some(release),
            suction_radius: self.input.suction_radius,
            spit_requests: vec![SpitRequest::new(
                self.settings.spit_count,
                release,
                release - start,
                self.settings.spit_speed,
            )],
            ..Default::default()
        };
        let events = self.world.step(0.0, &mut spit);
        log::info!(
            "Spit {} balls at ({:.0}, {:.0})",
            events.count(EventKind::Spat),
            release.x,
            release.y
        );
        self.record(events);
    }

    fn run_frame(&mut self, dt: f32) {
        let total = self.settings.frames.max(1);
        let pointer = self.pointer_at(self.frame);

        // First 40%: vacuum held. Then a spit gesture every half second.
        let vacuum_phase = self.frame < total * 2 / 5;
        if !vacuum_phase {
            match gesture_at(self.frame, self.settings.frame_rate) {
                Gesture::Press => self.drag_start = Some(pointer),
                Gesture::Release => self.release_spit(pointer),
                Gesture::Hold => {}
            }
        }

        self.input.pointer = Some(pointer);
        self.input.sucking_enabled = vacuum_phase;
        let events = self.world.step(dt, &mut self.input);
        self.record(events);

        if self.frame % self.settings.frame_rate.max(1) == 0 {
            log::info!(
                "Inventory: {} | active: {} | frame {}",
                self.world.inventory().len(),
                self.world.balls().len(),
                self.frame
            );
        }
        self.frame += 1;
    }

    fn summary(&self) {
        let count = |kind: EventKind| self.tally.get(&kind).copied().unwrap_or(0);
        log::info!(
            "Session done after {} frames: mixed={} sucked={} spat={} deleted={}",
            self.frame,
            count(EventKind::Mixed),
            count(EventKind::Sucked),
            count(EventKind::Spat),
            count(EventKind::Deleted)
        );
        log::info!(
            "Final: {} active, {} in inventory",
            self.world.balls().len(),
            self.world.inventory().len()
        );
    }
}

fn run() -> Result<()> {
    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let settings = SandboxSettings::load(path.as_deref())?;
    let dt = settings.dt();
    let frames = settings.frames;

    let mut session = Session::new(settings)?;
    log::info!(
        "Ball Sandbox starting: {} balls, {} frames",
        session.world.balls().len(),
        frames
    );
    for _ in 0..frames {
        session.run_frame(dt);
    }
    session.summary();
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_frame_rate_still_releases() {
        for rate in [0, 1, 2, 3] {
            let gestures: Vec<_> = (0..6).map(|f| gesture_at(f, rate)).collect();
            assert_eq!(gestures[0], Gesture::Press, "rate {rate}");
            assert_eq!(gestures[1], Gesture::Release, "rate {rate}");
            assert_eq!(gestures.iter().filter(|g| **g == Gesture::Release).count(), 3);
        }
    }

    #[test]
    fn test_gesture_spans_half_second() {
        let releases: Vec<u32> = (0..120)
            .filter(|&f| gesture_at(f, 60) == Gesture::Release)
            .collect();
        assert_eq!(releases, vec![29, 59, 89, 119]);
        assert_eq!(gesture_at(30, 60), Gesture::Press);
        assert_eq!(gesture_at(10, 60), Gesture::Hold);
    }

    #[test]
    fn test_session_spits_at_one_fps() {
        let settings = SandboxSettings {
            frame_rate: 1,
            frames: 10,
            initial_ball_count: 0,
            deletion_zone: None,
            ..Default::default()
        };
        let mut session = Session::new(settings).unwrap();
        // The pointer starts at the center, so frame 0 captures this ball
        let center = session.world.config().size() * 0.5;
        session
            .world
            .add_ball(center, 5.0, ball_sandbox::Color::WHITE, Vec2::ZERO, 1.0)
            .unwrap();
        for _ in 0..10 {
            session.run_frame(0.0);
        }
        assert_eq!(session.tally.get(&EventKind::Sucked), Some(&1));
        assert!(session.tally.get(&EventKind::Spat).copied().unwrap_or(0) > 0);
    }
}
