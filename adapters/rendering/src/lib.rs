#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Waveguard adapters.
//!
//! Backends draw a [`Scene`]; adapters refresh it from world views once per
//! frame through [`Scene::populate`]. Nothing in this crate draws.

use anyhow::Result as AnyResult;
use glam::Vec2;
use std::{error::Error, fmt, time::Duration};
use waveguard_core::{
    Ability, EnemyId, EnemyView, HudSnapshot, MatchOutcome, PlacementError, Point,
    ProjectileView, Rgb, TowerId, TowerKind, TowerView, UnlockError, UpgradeError,
};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Self::from_rgb_u8(rgb.red(), rgb.green(), rgb.blue())
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

fn to_vec2(point: Point) -> Vec2 {
    Vec2::new(point.x(), point.y())
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Whether the adapter detected a pause toggle on this frame.
    pub pause_toggle: bool,
    /// Whether the adapter detected a game speed toggle on this frame.
    pub speed_toggle: bool,
    /// Cursor position expressed in world units; may lie off the playfield.
    pub cursor_world_space: Option<Vec2>,
    /// Tower kind armed for placement, if any.
    pub armed_tower: Option<TowerKind>,
    /// Whether the adapter detected a placement or selection click on this frame.
    pub confirm_action: bool,
    /// Whether the adapter detected an upgrade request for the selected tower.
    pub upgrade_action: bool,
}

/// Control returned by the per-frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    /// Keep presenting frames.
    Continue,
    /// Stop the backend after this frame.
    Exit,
}

/// Static playfield drawn beneath every inhabitant.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayfieldPresentation {
    /// Width of the playfield in world units.
    pub width: f32,
    /// Height of the playfield in world units.
    pub height: f32,
    /// Waypoints of the enemy path.
    pub path: Vec<Vec2>,
    /// Stroke width of the enemy path.
    pub path_width: f32,
    /// Color of the enemy path.
    pub path_color: Color,
}

impl PlayfieldPresentation {
    /// Default stroke width of the enemy path.
    pub const DEFAULT_PATH_WIDTH: f32 = 30.0;

    /// Creates a new playfield descriptor.
    ///
    /// Returns an error when either dimension is not a positive finite number.
    pub fn new(
        width: f32,
        height: f32,
        path: &[Point],
        path_color: Color,
    ) -> std::result::Result<Self, RenderingError> {
        let valid = |value: f32| value.is_finite() && value > 0.0;
        if !valid(width) || !valid(height) {
            return Err(RenderingError::InvalidPlayfield { width, height });
        }

        Ok(Self {
            width,
            height,
            path: path.iter().copied().map(to_vec2).collect(),
            path_width: Self::DEFAULT_PATH_WIDTH,
            path_color,
        })
    }

    /// Clamps a world-space position to the playfield bounds.
    #[must_use]
    pub fn clamp_world_position(&self, position: Vec2) -> Vec2 {
        Vec2::new(
            position.x.clamp(0.0, self.width),
            position.y.clamp(0.0, self.height),
        )
    }

    /// Whether `position` lies on the playfield, edges included.
    #[must_use]
    pub fn contains(&self, position: Vec2) -> bool {
        (0.0..=self.width).contains(&position.x) && (0.0..=self.height).contains(&position.y)
    }
}

/// Enemy rendered as a filled circle with a health bar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyPresentation {
    /// Identifier allocated to the enemy by the world.
    pub id: EnemyId,
    /// Center of the enemy.
    pub position: Vec2,
    /// Radius of the enemy body.
    pub radius: f32,
    /// Fill color of the enemy body.
    pub color: Color,
    /// Remaining health as a fraction of maximum health.
    pub health_fraction: f32,
    /// Whether the enemy carries the strongest-enemy marker.
    pub strongest: bool,
    /// Whether the enemy is slowed.
    pub slowed: bool,
    /// Whether the enemy is burning or poisoned.
    pub damaged_over_time: bool,
}

/// Tower rendered as a rotated barrel over a base.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerPresentation {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of the tower.
    pub kind: TowerKind,
    /// Center of the tower.
    pub position: Vec2,
    /// Targeting radius, drawn for the selected tower.
    pub range: f32,
    /// Barrel angle in radians.
    pub angle: f32,
    /// Upgrade level.
    pub level: u32,
    /// Whether the tower is selected.
    pub selected: bool,
}

/// Projectile rendered as a small dot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectilePresentation {
    /// Current position of the projectile.
    pub position: Vec2,
    /// Color keyed by the carried ability.
    pub color: Color,
}

/// Line from a beam tower to an enemy inside its open window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeamLine {
    /// Tower emitting the beam.
    pub tower: TowerId,
    /// Enemy being drained.
    pub enemy: EnemyId,
    /// Start of the beam.
    pub from: Vec2,
    /// End of the beam.
    pub to: Vec2,
}

/// Placement preview following the cursor while a tower is armed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementPreview {
    /// Kind of tower proposed for placement.
    pub kind: TowerKind,
    /// Proposed center of the tower.
    pub position: Vec2,
    /// Range circle of the proposed tower.
    pub range: f32,
}

/// Feedback surfaced to adapters about the most recent tower interaction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TowerInteractionFeedback {
    /// Reports that a placement request was rejected by the world.
    PlacementRejected {
        /// Kind of tower requested for placement.
        kind: TowerKind,
        /// Position provided in the placement request.
        position: Vec2,
        /// Reason the placement failed.
        reason: PlacementError,
    },
    /// Reports that an upgrade request was rejected by the world.
    UpgradeRejected {
        /// Tower named in the request.
        tower: TowerId,
        /// Reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Reports that an unlock request was rejected by the world.
    UnlockRejected {
        /// Kind named in the request.
        kind: TowerKind,
        /// Reason the unlock failed.
        reason: UnlockError,
    },
}

impl fmt::Display for TowerInteractionFeedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlacementRejected { kind, reason, .. } => {
                write!(f, "cannot place {}: {reason}", kind.label())
            }
            Self::UpgradeRejected { tower, reason } => {
                write!(f, "cannot upgrade tower {}: {reason}", tower.get())
            }
            Self::UnlockRejected { kind, reason } => {
                write!(f, "cannot unlock {}: {reason}", kind.label())
            }
        }
    }
}

/// Scene description combining the playfield and its inhabitants.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Static playfield.
    pub playfield: PlayfieldPresentation,
    /// Living enemies.
    pub enemies: Vec<EnemyPresentation>,
    /// Placed towers.
    pub towers: Vec<TowerPresentation>,
    /// Projectiles in flight.
    pub projectiles: Vec<ProjectilePresentation>,
    /// Open beams.
    pub beams: Vec<BeamLine>,
    /// Heads-up display values of the latest frame.
    pub hud: Option<HudSnapshot>,
    /// Placement preview for the armed tower.
    pub preview: Option<PlacementPreview>,
    /// Feedback about the last tower interaction.
    pub feedback: Option<TowerInteractionFeedback>,
}

impl Scene {
    /// Creates an empty scene over the provided playfield.
    #[must_use]
    pub fn new(playfield: PlayfieldPresentation) -> Self {
        Self {
            playfield,
            enemies: Vec::new(),
            towers: Vec::new(),
            projectiles: Vec::new(),
            beams: Vec::new(),
            hud: None,
            preview: None,
            feedback: None,
        }
    }

    /// Rebuilds every dynamic layer from the latest world views.
    ///
    /// The preview and feedback layers are owned by the adapter and kept.
    pub fn populate(
        &mut self,
        hud: HudSnapshot,
        enemies: &EnemyView,
        towers: &TowerView,
        projectiles: &ProjectileView,
    ) {
        self.hud = Some(hud);

        self.enemies.clear();
        self.enemies
            .extend(enemies.iter().map(|enemy| EnemyPresentation {
                id: enemy.id,
                position: to_vec2(enemy.position),
                radius: enemy.radius,
                color: enemy.color.into(),
                health_fraction: enemy.health_fraction(),
                strongest: enemy.strongest,
                slowed: enemy.slowed,
                damaged_over_time: enemy.burning || enemy.poisoned,
            }));

        self.towers.clear();
        self.towers
            .extend(towers.iter().map(|tower| TowerPresentation {
                id: tower.id,
                kind: tower.kind,
                position: to_vec2(tower.position),
                range: tower.range,
                angle: tower.angle,
                level: tower.level,
                selected: tower.selected,
            }));

        self.projectiles.clear();
        self.projectiles
            .extend(projectiles.iter().map(|projectile| ProjectilePresentation {
                position: to_vec2(projectile.position),
                color: projectile_color(projectile.ability),
            }));

        self.beams.clear();
        for tower in towers.iter().filter(|tower| tower.beam_active) {
            self.beams.extend(
                enemies
                    .iter()
                    .filter(|enemy| tower.position.distance(enemy.position) <= tower.range)
                    .map(|enemy| BeamLine {
                        tower: tower.id,
                        enemy: enemy.id,
                        from: to_vec2(tower.position),
                        to: to_vec2(enemy.position),
                    }),
            );
        }
    }

    /// Text lines summarizing the heads-up display.
    #[must_use]
    pub fn hud_lines(&self) -> Vec<String> {
        let Some(hud) = self.hud else {
            return Vec::new();
        };

        let mut lines = vec![
            format!("wave {}  score {}  money {}", hud.wave, hud.score, hud.money),
            format!(
                "health {:.1}  speed x{}{}",
                hud.player_health,
                hud.speed.factor(),
                if hud.paused { "  [paused]" } else { "" }
            ),
        ];
        match hud.outcome {
            Some(MatchOutcome::Won) => lines.push("victory".to_owned()),
            Some(MatchOutcome::Lost) => lines.push("defeat".to_owned()),
            None => {}
        }
        if let Some(feedback) = self.feedback {
            lines.push(feedback.to_string());
        }
        lines
    }
}

fn projectile_color(ability: Ability) -> Color {
    match ability {
        Ability::Slow => Color::from_rgb_u8(120, 200, 255),
        Ability::Burn => Color::from_rgb_u8(255, 140, 0),
        Ability::PoisonCloud => Color::from_rgb_u8(80, 200, 60),
        Ability::ChainLightning => Color::from_rgb_u8(200, 200, 255),
        Ability::Pull => Color::from_rgb_u8(160, 80, 220),
        Ability::Splash | Ability::AreaBlast => Color::from_rgb_u8(90, 90, 90),
        _ => Color::from_rgb_u8(30, 30, 30),
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Waveguard scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until the callback asks to exit.
    ///
    /// The provided `update_scene` closure receives the real frame delta and
    /// per-frame input captured by the adapter, and refreshes the scene before
    /// it is presented.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameControl;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Playfield dimensions must be positive.
    InvalidPlayfield {
        /// Provided width.
        width: f32,
        /// Provided height.
        height: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPlayfield { width, height } => {
                write!(
                    f,
                    "playfield dimensions must be positive (received {width}x{height})"
                )
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use waveguard_core::{
        EnemyKind, EnemySnapshot, GameSpeed, ProjectileId, ProjectileSnapshot, TowerSnapshot,
    };

    fn playfield() -> PlayfieldPresentation {
        PlayfieldPresentation::new(
            800.0,
            600.0,
            &[Point::new(0.0, 300.0), Point::new(800.0, 300.0)],
            Color::from_rgb_u8(200, 180, 120),
        )
        .expect("valid playfield")
    }

    fn enemy(id: u32, x: f32) -> EnemySnapshot {
        let spec = EnemyKind::Grunt.spec();
        EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Grunt,
            position: Point::new(x, 300.0),
            path_index: 1,
            health: 25.0,
            max_health: 100.0,
            speed: spec.speed,
            radius: spec.radius,
            color: spec.color,
            slowed: false,
            burning: true,
            poisoned: false,
            strongest: id == 0,
        }
    }

    fn beam_tower(beam_active: bool) -> TowerSnapshot {
        TowerSnapshot {
            id: TowerId::new(3),
            kind: TowerKind::Laser,
            position: Point::new(100.0, 300.0),
            level: 1,
            damage: 20.0,
            range: 120.0,
            fire_interval: Duration::from_secs(10),
            angle: 0.0,
            selected: true,
            beam_active,
        }
    }

    fn hud() -> HudSnapshot {
        HudSnapshot {
            score: 40,
            money: 125,
            player_health: 17.5,
            wave: 4,
            speed: GameSpeed::Double,
            paused: true,
            outcome: None,
        }
    }

    #[test]
    fn playfield_rejects_non_positive_dimensions() {
        let error = PlayfieldPresentation::new(0.0, 600.0, &[], Color::from_rgb_u8(0, 0, 0))
            .expect_err("zero width must be rejected");

        assert!(matches!(error, RenderingError::InvalidPlayfield { .. }));
    }

    #[test]
    fn clamp_world_position_limits_coordinates_to_playfield() {
        let playfield = playfield();

        assert_eq!(
            playfield.clamp_world_position(Vec2::new(-10.0, 900.0)),
            Vec2::new(0.0, 600.0)
        );
        assert!(playfield.contains(Vec2::new(800.0, 600.0)));
        assert!(!playfield.contains(Vec2::new(800.5, 10.0)));
    }

    #[test]
    fn populate_mirrors_views_and_draws_open_beams() {
        let mut scene = Scene::new(playfield());
        let enemies = EnemyView::from_snapshots(vec![enemy(0, 150.0), enemy(1, 400.0)]);
        let towers = TowerView::from_snapshots(vec![beam_tower(true)]);
        let projectiles = ProjectileView::from_snapshots(vec![ProjectileSnapshot {
            id: ProjectileId::new(0),
            tower: TowerId::new(3),
            target: EnemyId::new(1),
            position: Point::new(300.0, 300.0),
            ability: Ability::Burn,
        }]);

        scene.populate(hud(), &enemies, &towers, &projectiles);

        assert_eq!(scene.enemies.len(), 2);
        assert_eq!(scene.enemies[0].health_fraction, 0.25);
        assert!(scene.enemies[0].strongest);
        assert!(scene.enemies[1].damaged_over_time);
        assert_eq!(scene.towers[0].position, Vec2::new(100.0, 300.0));
        assert_eq!(
            scene.projectiles[0].color,
            Color::from_rgb_u8(255, 140, 0)
        );
        assert_eq!(
            scene.beams,
            vec![BeamLine {
                tower: TowerId::new(3),
                enemy: EnemyId::new(0),
                from: Vec2::new(100.0, 300.0),
                to: Vec2::new(150.0, 300.0),
            }]
        );
    }

    #[test]
    fn populate_replaces_previous_frame() {
        let mut scene = Scene::new(playfield());
        let enemies = EnemyView::from_snapshots(vec![enemy(0, 150.0)]);
        let towers = TowerView::from_snapshots(vec![beam_tower(false)]);
        let projectiles = ProjectileView::from_snapshots(Vec::new());

        scene.populate(hud(), &enemies, &towers, &projectiles);
        scene.populate(
            hud(),
            &EnemyView::from_snapshots(Vec::new()),
            &towers,
            &projectiles,
        );

        assert!(scene.enemies.is_empty());
        assert!(scene.beams.is_empty());
        assert_eq!(scene.towers.len(), 1);
    }

    #[test]
    fn hud_lines_report_state_and_feedback() {
        let mut scene = Scene::new(playfield());
        assert!(scene.hud_lines().is_empty());

        scene.hud = Some(hud());
        scene.feedback = Some(TowerInteractionFeedback::PlacementRejected {
            kind: TowerKind::Cannon,
            position: Vec2::new(10.0, 10.0),
            reason: PlacementError::InsufficientFunds,
        });

        let lines = scene.hud_lines();
        assert_eq!(lines[0], "wave 4  score 40  money 125");
        assert_eq!(lines[1], "health 17.5  speed x2  [paused]");
        assert!(lines[2].starts_with("cannot place cannon"));
    }
}
