//! Text backend that presents scenes as periodic HUD reports.

use std::time::Duration;

use anyhow::Result as AnyResult;
use tracing::{debug, info};
use waveguard_core::{Event, Point, MIN_TOWER_SEPARATION};
use waveguard_rendering::{
    FrameControl, FrameInput, PlacementPreview, Presentation, RenderingBackend, Scene,
    TowerInteractionFeedback,
};
use waveguard_simulation::Simulation;
use waveguard_world::query;

/// Distance from a tower centre within which a click selects it.
const SELECTION_RADIUS: f32 = MIN_TOWER_SEPARATION / 2.0;

/// Backend that runs frames back to back without a window.
#[derive(Clone, Copy, Debug)]
pub(crate) struct HeadlessBackend {
    frame: Duration,
    max_frames: u64,
    report_every: u64,
    fast: bool,
}

impl HeadlessBackend {
    /// Creates a backend presenting `frames_per_second` frames for at most `seconds`.
    pub(crate) fn new(frames_per_second: u32, seconds: u64, fast: bool) -> Self {
        let frames_per_second = frames_per_second.max(1);
        Self {
            frame: Duration::from_secs(1) / frames_per_second,
            max_frames: seconds.saturating_mul(u64::from(frames_per_second)),
            report_every: u64::from(frames_per_second) * 10,
            fast,
        }
    }
}

impl RenderingBackend for HeadlessBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameControl,
    {
        let Presentation {
            window_title,
            mut scene,
            ..
        } = presentation;
        println!("== {window_title} ==");

        for frame in 0..self.max_frames {
            let input = FrameInput {
                speed_toggle: self.fast && frame == 0,
                ..FrameInput::default()
            };
            let control = update_scene(self.frame, input, &mut scene);

            if control == FrameControl::Exit || (frame + 1) % self.report_every == 0 {
                for line in scene.hud_lines() {
                    println!("{line}");
                }
            }
            if control == FrameControl::Exit {
                break;
            }
        }

        Ok(())
    }
}

/// Advances the simulation by one presented frame and refreshes the scene.
pub(crate) fn drive_frame(
    simulation: &mut Simulation,
    dt: Duration,
    input: FrameInput,
    scene: &mut Scene,
) -> FrameControl {
    if input.pause_toggle {
        simulation.toggle_pause();
    }
    if input.speed_toggle {
        let speed = simulation.hud().speed.toggled();
        simulation.set_game_speed(speed);
    }
    apply_tower_input(simulation, &input, scene);

    for event in simulation.advance(dt) {
        match event {
            Event::WaveStarted { wave } => debug!(wave, "wave started"),
            Event::EnemyEscaped { enemy, damage } => {
                debug!(enemy = enemy.get(), damage, "enemy escaped");
            }
            Event::MatchEnded { outcome, .. } => info!(?outcome, "match concluded"),
            _ => {}
        }
    }

    scene.populate(
        simulation.hud(),
        &simulation.enemies(),
        &simulation.towers(),
        &simulation.projectiles(),
    );

    if simulation.outcome().is_some() {
        FrameControl::Exit
    } else {
        FrameControl::Continue
    }
}

/// Routes placement, selection and upgrade clicks to the simulation.
///
/// Clicks outside the playfield are ignored. Rejections replace the scene
/// feedback and a successful placement clears it.
fn apply_tower_input(simulation: &mut Simulation, input: &FrameInput, scene: &mut Scene) {
    scene.preview = input
        .armed_tower
        .zip(input.cursor_world_space)
        .map(|(kind, cursor)| PlacementPreview {
            kind,
            position: scene.playfield.clamp_world_position(cursor),
            range: kind.stats().range,
        });

    let click = input
        .cursor_world_space
        .filter(|cursor| input.confirm_action && scene.playfield.contains(*cursor));
    if let Some(cursor) = click {
        let position = Point::new(cursor.x, cursor.y);
        match input.armed_tower {
            Some(kind) => match simulation.place_tower(kind, position) {
                Ok(_) => scene.feedback = None,
                Err(reason) => {
                    scene.feedback = Some(TowerInteractionFeedback::PlacementRejected {
                        kind,
                        position: cursor,
                        reason,
                    });
                }
            },
            None => {
                let hit = simulation
                    .towers()
                    .iter()
                    .find(|tower| tower.position.distance(position) <= SELECTION_RADIUS)
                    .map(|tower| tower.id);
                simulation.select_tower(hit);
            }
        }
    }

    if input.upgrade_action {
        if let Some(tower) = query::selected_tower(simulation.world()) {
            if let Err(reason) = simulation.upgrade_tower(tower) {
                scene.feedback = Some(TowerInteractionFeedback::UpgradeRejected { tower, reason });
            }
        }
    }
}
