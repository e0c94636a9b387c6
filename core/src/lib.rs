#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Waveguard engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then reports [`Event`] values that
//! systems react to deterministically. Systems read immutable views, never the
//! world itself, and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod catalog;
pub mod maps;

pub use catalog::{Ability, EnemyKind, EnemyTypeSpec, TargetingPolicy, TowerKind, TowerStats};
pub use maps::{Difficulty, DifficultyProfile, MapDefinition, MapId, MatchSetup};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Waveguard.";

/// Minimum distance in world units that must separate two towers.
pub const MIN_TOWER_SEPARATION: f32 = 40.0;

/// Score credited for every enemy killed.
pub const KILL_SCORE: u64 = 10;

/// Money credited for every enemy killed.
pub const KILL_MONEY: u64 = 5;

/// Divisor applied to the final score to compute the end-of-match payout.
pub const PAYOUT_SCORE_DIVISOR: u64 = 10;

/// Player health at the start of every match.
pub const STARTING_PLAYER_HEALTH: f32 = 20.0;

/// Location expressed in continuous world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point from world-space coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate of the point.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate of the point.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Euclidean distance between two points.
    #[must_use]
    pub fn distance(self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Heading in radians from this point toward `other`.
    #[must_use]
    pub fn angle_to(self, other: Point) -> f32 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// Moves toward `target` by at most `step` units.
    ///
    /// Returns `target` itself when it lies within `step`, so callers never
    /// overshoot the destination.
    #[must_use]
    pub fn step_toward(self, target: Point, step: f32) -> Point {
        let distance = self.distance(target);
        if distance <= step || distance <= f32::EPSILON {
            return target;
        }

        let scale = step / distance;
        Point::new(
            self.x + (target.x - self.x) * scale,
            self.y + (target.y - self.y) * scale,
        )
    }
}

/// Unique identifier assigned to an enemy.
///
/// Identifiers are allocated monotonically, so ordering by identifier matches
/// spawn order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the projectile identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Opaque RGB appearance used by renderers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    red: u8,
    green: u8,
    blue: u8,
}

impl Rgb {
    /// Creates a new color from byte RGB components.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Simulation speed multiplier selected by the player.
///
/// The multiplier scales per-tick deltas; it never changes the tick rate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameSpeed {
    /// Real-time speed.
    #[default]
    Normal,
    /// Every per-tick delta is doubled.
    Double,
}

impl GameSpeed {
    /// Integer multiplier applied to timers and distances.
    #[must_use]
    pub const fn factor(self) -> u32 {
        match self {
            Self::Normal => 1,
            Self::Double => 2,
        }
    }

    /// Multiplier expressed as a float for distance and damage scaling.
    #[must_use]
    pub fn scale(self) -> f32 {
        self.factor() as f32
    }

    /// Returns the other speed setting.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Normal => Self::Double,
            Self::Double => Self::Normal,
        }
    }

    /// Divides a base interval by the multiplier.
    #[must_use]
    pub fn shorten(self, interval: Duration) -> Duration {
        interval / self.factor()
    }
}

/// Coarse phase of the match used by systems to decide whether to act.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MatchPhase {
    /// The simulation advances every tick.
    Running,
    /// The player paused the simulation; no simulated time elapses.
    Paused,
    /// The match reached a terminal state; no further mutation happens.
    Concluded,
}

/// Terminal result of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchOutcome {
    /// Every wave of the map was cleared.
    Won,
    /// Player health dropped to zero.
    Lost,
}

/// Timed status effect applied to an enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StatusEffect {
    /// Halves the enemy's movement speed while active. Re-application refreshes the timer.
    Slow {
        /// Simulated time the effect stays active.
        duration: Duration,
    },
    /// Deals damage over time. Does not stack with an active burn.
    Burn {
        /// Simulated time the effect stays active.
        duration: Duration,
        /// Damage dealt per simulated second.
        damage_per_second: f32,
    },
    /// Deals damage over time. Does not stack with an active poison.
    Poison {
        /// Simulated time the effect stays active.
        duration: Duration,
        /// Damage dealt per simulated second.
        damage_per_second: f32,
    },
}

impl StatusEffect {
    /// Slow applied by frost projectiles.
    pub const SLOW: Self = Self::Slow {
        duration: Duration::from_millis(2_000),
    };

    /// Burn applied by flame projectiles.
    pub const BURN: Self = Self::Burn {
        duration: Duration::from_millis(3_000),
        damage_per_second: 10.0,
    };

    /// Poison applied by venom projectiles.
    pub const POISON: Self = Self::Poison {
        duration: Duration::from_millis(4_000),
        damage_per_second: 5.0,
    };
}

/// Describes a projectile arriving at its target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Impact {
    /// Projectile that arrived.
    pub projectile: ProjectileId,
    /// Tower that fired the projectile.
    pub tower: TowerId,
    /// Enemy the projectile was homing on.
    pub target: EnemyId,
    /// Ability carried by the projectile.
    pub ability: Ability,
    /// Base damage carried by the projectile.
    pub damage: f32,
    /// World position where the projectile landed.
    pub point: Point,
    /// Position captured when the projectile was fired.
    pub origin: Point,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Unscaled duration of one simulation tick.
        dt: Duration,
    },
    /// Pauses or resumes the simulation.
    SetPaused {
        /// Whether simulated time should stop advancing.
        paused: bool,
    },
    /// Changes the speed multiplier applied to every per-tick delta.
    SetGameSpeed {
        /// Speed that should become active.
        speed: GameSpeed,
    },
    /// Requests placement of a tower at the provided position.
    PlaceTower {
        /// Type of tower to construct.
        kind: TowerKind,
        /// World-space position of the tower centre.
        position: Point,
    },
    /// Requests an upgrade of an existing tower.
    UpgradeTower {
        /// Identifier of the tower to upgrade.
        tower: TowerId,
    },
    /// Marks a tower as selected, or clears the selection.
    SelectTower {
        /// Tower to select, or `None` to clear the selection.
        tower: Option<TowerId>,
    },
    /// Spends money to make a tower kind available for placement.
    UnlockTower {
        /// Tower kind to unlock.
        kind: TowerKind,
    },
    /// Requests that a tower fire at the provided enemy.
    FireProjectile {
        /// Tower that should fire.
        tower: TowerId,
        /// Enemy targeted by the shot.
        target: EnemyId,
    },
    /// Opens a beam tower's activation window.
    ActivateBeam {
        /// Beam tower to activate.
        tower: TowerId,
    },
    /// Applies one tick of beam damage to the provided enemies.
    DrainBeam {
        /// Beam tower draining health.
        tower: TowerId,
        /// Enemies inside the beam's range.
        targets: Vec<EnemyId>,
    },
    /// Launches pull projectiles from a pull tower toward the provided enemies.
    EmitPull {
        /// Pull tower emitting projectiles.
        tower: TowerId,
        /// Enemies inside the tower's range.
        targets: Vec<EnemyId>,
    },
    /// Moves every projectile toward its target and resolves arrivals.
    AdvanceProjectiles,
    /// Subtracts health from an enemy.
    DamageEnemy {
        /// Enemy receiving the damage.
        enemy: EnemyId,
        /// Amount of health removed.
        amount: f32,
    },
    /// Applies a status effect to an enemy.
    ApplyStatus {
        /// Enemy receiving the effect.
        enemy: EnemyId,
        /// Effect to apply.
        effect: StatusEffect,
    },
    /// Moves an enemy toward a point without changing its path progress.
    DisplaceEnemy {
        /// Enemy being displaced.
        enemy: EnemyId,
        /// Point the enemy is dragged toward.
        toward: Point,
        /// Maximum displacement in world units.
        distance: f32,
    },
    /// Ticks enemy status effects and moves enemies along the path.
    AdvanceEnemies,
    /// Records that a new wave began.
    StartWave {
        /// One-based number of the wave.
        wave: u32,
    },
    /// Spawns an enemy at the start of the path.
    SpawnEnemy {
        /// Template the enemy is created from.
        kind: EnemyKind,
        /// Starting and maximum health after wave scaling.
        health: f32,
    },
    /// Credits money to the player.
    AwardMoney {
        /// Amount credited.
        amount: u64,
    },
    /// Flags the living enemy with the highest health.
    MarkStrongestEnemy,
    /// Ends the match with a victory.
    DeclareVictory,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Unscaled duration of the tick.
        dt: Duration,
        /// Simulated time after the tick.
        now: Duration,
    },
    /// Announces that the simulation was paused or resumed.
    PauseChanged {
        /// Whether the simulation is now paused.
        paused: bool,
    },
    /// Announces a new speed multiplier.
    GameSpeedChanged {
        /// Speed that became active.
        speed: GameSpeed,
    },
    /// Confirms that a tower was placed into the world.
    TowerPlaced {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Type of tower that was placed.
        kind: TowerKind,
        /// World-space position of the tower.
        position: Point,
        /// Money spent on the placement.
        cost: u64,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Type of tower requested for placement.
        kind: TowerKind,
        /// Position provided in the placement request.
        position: Point,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms a tower upgrade.
    TowerUpgraded {
        /// Upgraded tower.
        tower: TowerId,
        /// Level reached after the upgrade.
        level: u32,
        /// Money spent on the upgrade.
        cost: u64,
    },
    /// Reports that an upgrade request was rejected.
    TowerUpgradeRejected {
        /// Tower named in the request.
        tower: TowerId,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Announces the current tower selection.
    TowerSelected {
        /// Selected tower, if any.
        tower: Option<TowerId>,
    },
    /// Confirms that a tower kind became available.
    TowerUnlocked {
        /// Kind that was unlocked.
        kind: TowerKind,
        /// Money spent on the unlock.
        cost: u64,
    },
    /// Reports that an unlock request was rejected.
    TowerUnlockRejected {
        /// Kind named in the request.
        kind: TowerKind,
        /// Specific reason the unlock failed.
        reason: UnlockError,
    },
    /// Confirms that a projectile left a tower.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Tower that fired.
        tower: TowerId,
        /// Enemy the projectile homes on.
        target: EnemyId,
    },
    /// Reports a projectile dropped because its target disappeared.
    ProjectileExpired {
        /// Projectile that was dropped.
        projectile: ProjectileId,
    },
    /// Reports a projectile arriving at its target after base damage was applied.
    ProjectileImpacted {
        /// Impact details consumed by ability resolution.
        impact: Impact,
    },
    /// Announces that a beam tower started an activation window.
    BeamActivated {
        /// Beam tower that activated.
        tower: TowerId,
        /// Simulated time at which the window closes.
        active_until: Duration,
    },
    /// Confirms that an enemy entered the path.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Template the enemy was created from.
        kind: EnemyKind,
        /// Starting health after scaling.
        health: f32,
    },
    /// Reports health removed from an enemy that survived or died.
    EnemyDamaged {
        /// Damaged enemy.
        enemy: EnemyId,
        /// Health removed.
        amount: f32,
        /// Health remaining after the damage.
        remaining: f32,
    },
    /// Reports an enemy killed and removed from the active set.
    EnemyKilled {
        /// Killed enemy.
        enemy: EnemyId,
        /// Score credited for the kill.
        score: u64,
        /// Money credited for the kill.
        money: u64,
    },
    /// Reports an enemy that reached the end of the path.
    EnemyEscaped {
        /// Escaped enemy.
        enemy: EnemyId,
        /// Player health removed by the escape.
        damage: f32,
    },
    /// Confirms a status effect took hold.
    StatusApplied {
        /// Affected enemy.
        enemy: EnemyId,
        /// Effect that was applied.
        effect: StatusEffect,
    },
    /// Reports a non-stacking effect ignored because it was already active.
    StatusResisted {
        /// Enemy that resisted the effect.
        enemy: EnemyId,
        /// Effect that was ignored.
        effect: StatusEffect,
    },
    /// Reports an enemy dragged toward a point.
    EnemyDisplaced {
        /// Displaced enemy.
        enemy: EnemyId,
        /// Position after displacement.
        to: Point,
    },
    /// Reports the enemy flagged as the strongest.
    StrongestEnemyMarked {
        /// Strongest living enemy, if any are alive.
        enemy: Option<EnemyId>,
    },
    /// Announces the start of a wave.
    WaveStarted {
        /// One-based number of the wave.
        wave: u32,
    },
    /// Confirms money credited to the player outside of kills.
    MoneyAwarded {
        /// Amount credited.
        amount: u64,
    },
    /// Announces the terminal transition of the match. Emitted exactly once.
    MatchEnded {
        /// Result of the match.
        outcome: MatchOutcome,
        /// Final score.
        score: u64,
        /// Money credited as the end-of-match payout.
        payout: u64,
    },
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The match already ended.
    #[error("the match is over")]
    MatchOver,
    /// The tower kind has not been unlocked.
    #[error("tower is locked")]
    Locked,
    /// The player cannot afford the tower.
    #[error("not enough money")]
    InsufficientFunds,
    /// Another tower stands closer than the minimum separation.
    #[error("too close to another tower")]
    TooClose,
    /// The position lies outside the map.
    #[error("position is outside the map")]
    OutOfBounds,
}

/// Reasons a tower upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum UpgradeError {
    /// The match already ended.
    #[error("the match is over")]
    MatchOver,
    /// No tower with the provided identifier exists.
    #[error("no such tower")]
    MissingTower,
    /// The player cannot afford the upgrade.
    #[error("not enough money")]
    InsufficientFunds,
}

/// Reasons a tower unlock request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum UnlockError {
    /// The kind is already available.
    #[error("tower is already unlocked")]
    AlreadyUnlocked,
    /// The player cannot afford the unlock.
    #[error("not enough money")]
    InsufficientFunds,
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Template the enemy was created from.
    pub kind: EnemyKind,
    /// Current world-space position.
    pub position: Point,
    /// Index of the path point the enemy is walking toward.
    pub path_index: usize,
    /// Current health.
    pub health: f32,
    /// Health at spawn.
    pub max_health: f32,
    /// Base movement per tick in world units.
    pub speed: f32,
    /// Collision and display radius.
    pub radius: f32,
    /// Appearance assigned to the enemy.
    pub color: Rgb,
    /// Whether a slow effect is active.
    pub slowed: bool,
    /// Whether a burn effect is active.
    pub burning: bool,
    /// Whether a poison effect is active.
    pub poisoned: bool,
    /// Whether the enemy carries the strongest-enemy marker.
    pub strongest: bool,
}

impl EnemySnapshot {
    /// Remaining health as a fraction of maximum health, clamped to `0.0..=1.0`.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.max_health).clamp(0.0, 1.0)
    }
}

/// Read-only snapshot describing all living enemies.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    ///
    /// Snapshots are ordered by identifier, which matches spawn order.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a living enemy by identifier.
    #[must_use]
    pub fn get(&self, id: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of living enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no enemies are alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// World-space position of the tower.
    pub position: Point,
    /// Upgrade level, starting at one.
    pub level: u32,
    /// Damage per shot, or per second for beams.
    pub damage: f32,
    /// Targeting radius in world units.
    pub range: f32,
    /// Base interval between shots before speed scaling.
    pub fire_interval: Duration,
    /// Facing angle in radians.
    pub angle: f32,
    /// Whether the tower is selected in the UI.
    pub selected: bool,
    /// Whether a beam window is currently open.
    pub beam_active: bool,
}

/// Read-only snapshot describing all towers placed within the map.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a tower by identifier.
    #[must_use]
    pub fn get(&self, id: TowerId) -> Option<&TowerSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Readiness of a single tower to act on the current tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerCooldownSnapshot {
    /// Tower described by the snapshot.
    pub tower: TowerId,
    /// Ability of the tower.
    pub ability: Ability,
    /// Remaining time before the tower may fire or activate again.
    pub ready_in: Duration,
    /// Whether a beam window is currently open.
    pub beam_active: bool,
}

/// Read-only snapshot describing the cooldown state of every tower.
#[derive(Clone, Debug, Default)]
pub struct TowerCooldownView {
    snapshots: Vec<TowerCooldownSnapshot>,
}

impl TowerCooldownView {
    /// Creates a new cooldown view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerCooldownSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.tower);
        Self { snapshots }
    }

    /// Iterator over the captured cooldowns in tower order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerCooldownSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerCooldownSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier of the projectile.
    pub id: ProjectileId,
    /// Tower that fired the projectile.
    pub tower: TowerId,
    /// Enemy the projectile homes on.
    pub target: EnemyId,
    /// Current world-space position.
    pub position: Point,
    /// Ability carried by the projectile.
    pub ability: Ability,
}

/// Read-only snapshot describing all projectiles in flight.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured projectiles in firing order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Number of projectiles in flight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no projectiles are in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Target assignment computed for a single tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Tower that acquired the target.
    pub tower: TowerId,
    /// Enemy selected as the target.
    pub enemy: EnemyId,
    /// Tower position used for the range test.
    pub tower_position: Point,
    /// Enemy position at the time of the range test.
    pub enemy_position: Point,
}

/// Inputs the wave director needs from the world on every tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveStatus {
    /// Current simulated time.
    pub now: Duration,
    /// Active speed multiplier.
    pub speed: GameSpeed,
    /// Phase of the match.
    pub phase: MatchPhase,
    /// Number of living enemies.
    pub active_enemies: usize,
}

/// Figures shown on the heads-up display.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HudSnapshot {
    /// Accumulated score.
    pub score: u64,
    /// Money available for placement and upgrades.
    pub money: u64,
    /// Remaining player health.
    pub player_health: f32,
    /// Number of the most recent wave.
    pub wave: u32,
    /// Active speed multiplier.
    pub speed: GameSpeed,
    /// Whether the simulation is paused.
    pub paused: bool,
    /// Result of the match, once it ended.
    pub outcome: Option<MatchOutcome>,
}

#[cfg(test)]
mod tests {
    use super::{GameSpeed, MatchSetup, PlacementError, Point, TowerKind};
    use crate::{Difficulty, MapId};
    use serde::{de::DeserializeOwned, Serialize};
    use std::time::Duration;

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn distance_matches_pythagoras() {
        let origin = Point::new(0.0, 0.0);
        let destination = Point::new(3.0, 4.0);
        assert!((origin.distance(destination) - 5.0).abs() < 1e-6);
        assert!((destination.distance(origin) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn step_toward_never_overshoots() {
        let start = Point::new(0.0, 0.0);
        let target = Point::new(10.0, 0.0);

        let partial = start.step_toward(target, 4.0);
        assert!((partial.x() - 4.0).abs() < 1e-6);
        assert!(partial.y().abs() < 1e-6);

        assert_eq!(start.step_toward(target, 25.0), target);
    }

    #[test]
    fn game_speed_shortens_intervals() {
        let interval = Duration::from_millis(1_000);
        assert_eq!(GameSpeed::Normal.shorten(interval), interval);
        assert_eq!(
            GameSpeed::Double.shorten(interval),
            Duration::from_millis(500)
        );
        assert_eq!(GameSpeed::Normal.toggled(), GameSpeed::Double);
    }

    #[test]
    fn placement_error_round_trips_through_bincode() {
        assert_round_trip(&PlacementError::TooClose);
    }

    #[test]
    fn match_setup_round_trips_through_bincode() {
        assert_round_trip(&MatchSetup::new(MapId::Canyon, Difficulty::Hard));
        assert_round_trip(&TowerKind::Tesla);
    }
}
