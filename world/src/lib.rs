#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Waveguard.

mod enemies;
mod projectiles;
mod towers;

use std::{collections::BTreeSet, time::Duration};

use waveguard_core::{
    Ability, Command, EnemyId, EnemyKind, Event, GameSpeed, MapDefinition, MatchOutcome,
    MatchSetup, PlacementError, Point, ProjectileId, TowerId, TowerKind, UnlockError,
    UpgradeError, KILL_MONEY, KILL_SCORE, MIN_TOWER_SEPARATION, PAYOUT_SCORE_DIVISOR,
    STARTING_PLAYER_HEALTH, WELCOME_BANNER,
};

use enemies::Enemy;
use projectiles::{Flight, Payload, Projectile};
use towers::TowerRegistry;

/// Number of simulation ticks per simulated second unless configured otherwise.
pub const DEFAULT_TICKS_PER_SECOND: u32 = 60;

/// Money available at the start of a match unless configured otherwise.
pub const DEFAULT_STARTING_MONEY: u64 = 100;

/// Parameters used to create a match.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldSettings {
    /// Map and difficulty of the match.
    pub setup: MatchSetup,
    /// Number of ticks that make up one simulated second.
    pub ticks_per_second: u32,
    /// Money available when the match starts.
    pub starting_money: u64,
    /// Player health when the match starts.
    pub player_health: f32,
    /// Tower kinds available for placement, or `None` when every kind is available.
    pub unlocked: Option<BTreeSet<TowerKind>>,
}

impl WorldSettings {
    /// Creates settings with default economy and timing for the provided setup.
    #[must_use]
    pub fn new(setup: MatchSetup) -> Self {
        Self {
            setup,
            ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            starting_money: DEFAULT_STARTING_MONEY,
            player_health: STARTING_PLAYER_HEALTH,
            unlocked: None,
        }
    }
}

/// Represents the authoritative Waveguard match state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    setup: MatchSetup,
    map: MapDefinition,
    ticks_per_second: u32,
    tick: Duration,
    now: Duration,
    speed: GameSpeed,
    paused: bool,
    outcome: Option<MatchOutcome>,
    score: u64,
    money: u64,
    player_health: f32,
    wave: u32,
    enemies: Vec<Enemy>,
    next_enemy_id: u32,
    towers: TowerRegistry,
    projectiles: Vec<Projectile>,
    next_projectile_id: u32,
    unlocked: BTreeSet<TowerKind>,
    selected: Option<TowerId>,
    strongest: Option<EnemyId>,
}

/// Length of one tick, rounded up to a whole nanosecond.
///
/// `n` ticks always cover at least `n / ticks_per_second` seconds, so intervals
/// that are a whole number of ticks elapse on exactly that tick.
fn tick_length(ticks_per_second: u32) -> Duration {
    const NANOS_PER_SECOND: u64 = 1_000_000_000;
    Duration::from_nanos(NANOS_PER_SECOND.div_ceil(u64::from(ticks_per_second)))
}

impl World {
    /// Creates a new match ready for simulation.
    #[must_use]
    pub fn new(settings: WorldSettings) -> Self {
        let ticks_per_second = settings.ticks_per_second.max(1);
        let mut unlocked = settings
            .unlocked
            .unwrap_or_else(|| TowerKind::ALL.into_iter().collect());
        unlocked.extend(
            TowerKind::ALL
                .into_iter()
                .filter(|kind| kind.stats().unlock_cost == 0),
        );

        Self {
            banner: WELCOME_BANNER,
            setup: settings.setup,
            map: settings.setup.map.definition(),
            ticks_per_second,
            tick: tick_length(ticks_per_second),
            now: Duration::ZERO,
            speed: GameSpeed::Normal,
            paused: false,
            outcome: None,
            score: 0,
            money: settings.starting_money,
            player_health: settings.player_health,
            wave: 1,
            enemies: Vec::new(),
            next_enemy_id: 0,
            towers: TowerRegistry::new(),
            projectiles: Vec::new(),
            next_projectile_id: 0,
            unlocked,
            selected: None,
            strongest: None,
        }
    }

    fn is_running(&self) -> bool {
        self.outcome.is_none() && !self.paused
    }

    fn is_concluded(&self) -> bool {
        self.outcome.is_some()
    }

    fn enemy_index(&self, id: EnemyId) -> Option<usize> {
        find_enemy_index(&self.enemies, id)
    }

    fn allocate_projectile_id(&mut self) -> ProjectileId {
        let id = ProjectileId::new(self.next_projectile_id);
        self.next_projectile_id = self.next_projectile_id.saturating_add(1);
        id
    }

    /// Applies damage to a living enemy and credits the kill exactly once.
    fn damage_enemy(&mut self, id: EnemyId, amount: f32, out_events: &mut Vec<Event>) -> bool {
        if amount.is_nan() || amount <= 0.0 {
            return false;
        }
        let Some(index) = self.enemy_index(id) else {
            return false;
        };

        let enemy = &mut self.enemies[index];
        let lethal = enemy.take_damage(amount);
        out_events.push(Event::EnemyDamaged {
            enemy: id,
            amount,
            remaining: enemy.health,
        });

        if lethal {
            let _ = self.enemies.remove(index);
            if self.strongest == Some(id) {
                self.strongest = None;
            }
            self.score = self.score.saturating_add(KILL_SCORE);
            self.money = self.money.saturating_add(KILL_MONEY);
            out_events.push(Event::EnemyKilled {
                enemy: id,
                score: KILL_SCORE,
                money: KILL_MONEY,
            });
        }

        lethal
    }

    fn launch(
        &mut self,
        tower: TowerId,
        target: EnemyId,
        payload: Payload,
        out_events: &mut Vec<Event>,
    ) {
        let id = self.allocate_projectile_id();
        self.projectiles
            .push(Projectile::launch(id, tower, target, payload));
        out_events.push(Event::ProjectileFired {
            projectile: id,
            tower,
            target,
        });
    }

    fn conclude(&mut self, outcome: MatchOutcome, out_events: &mut Vec<Event>) {
        if self.is_concluded() {
            return;
        }

        let payout = self.score / PAYOUT_SCORE_DIVISOR;
        self.outcome = Some(outcome);
        self.money = self.money.saturating_add(payout);
        self.projectiles.clear();
        out_events.push(Event::MatchEnded {
            outcome,
            score: self.score,
            payout,
        });
    }

    fn evaluate_end_conditions(&mut self, out_events: &mut Vec<Event>) {
        if !self.is_concluded() && self.player_health <= 0.0 {
            self.conclude(MatchOutcome::Lost, out_events);
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            if world.is_running() {
                world.now = world.now.saturating_add(dt);
                out_events.push(Event::TimeAdvanced { dt, now: world.now });
            }
        }
        Command::SetPaused { paused } => {
            if world.paused != paused {
                world.paused = paused;
                out_events.push(Event::PauseChanged { paused });
            }
        }
        Command::SetGameSpeed { speed } => {
            if world.speed != speed {
                world.speed = speed;
                out_events.push(Event::GameSpeedChanged { speed });
            }
        }
        Command::PlaceTower { kind, position } => place_tower(world, kind, position, out_events),
        Command::UpgradeTower { tower } => upgrade_tower(world, tower, out_events),
        Command::SelectTower { tower } => {
            world.selected = tower.filter(|id| world.towers.contains(*id));
            out_events.push(Event::TowerSelected {
                tower: world.selected,
            });
        }
        Command::UnlockTower { kind } => unlock_tower(world, kind, out_events),
        Command::FireProjectile { tower, target } => {
            fire_projectile(world, tower, target, out_events)
        }
        Command::ActivateBeam { tower } => {
            if world.is_running() {
                let (now, speed) = (world.now, world.speed);
                if let Some(state) = world.towers.get_mut(tower) {
                    if state.ability == Ability::Beam && state.is_ready(now, speed) {
                        let active_until = state.activate_beam(now, speed);
                        out_events.push(Event::BeamActivated {
                            tower,
                            active_until,
                        });
                    }
                }
            }
        }
        Command::DrainBeam { tower, targets } => drain_beam(world, tower, &targets, out_events),
        Command::EmitPull { tower, targets } => emit_pull(world, tower, &targets, out_events),
        Command::AdvanceProjectiles => advance_projectiles(world, out_events),
        Command::DamageEnemy { enemy, amount } => {
            if world.is_running() {
                let _ = world.damage_enemy(enemy, amount, out_events);
            }
        }
        Command::ApplyStatus { enemy, effect } => {
            if world.is_running() {
                if let Some(index) = world.enemy_index(enemy) {
                    if world.enemies[index].apply_status(effect) {
                        out_events.push(Event::StatusApplied { enemy, effect });
                    } else {
                        out_events.push(Event::StatusResisted { enemy, effect });
                    }
                }
            }
        }
        Command::DisplaceEnemy {
            enemy,
            toward,
            distance,
        } => {
            if world.is_running() {
                if let Some(index) = world.enemy_index(enemy) {
                    let to = world.enemies[index].displace_toward(toward, distance);
                    out_events.push(Event::EnemyDisplaced { enemy, to });
                }
            }
        }
        Command::AdvanceEnemies => advance_enemies(world, out_events),
        Command::StartWave { wave } => {
            if world.is_running() {
                world.wave = wave;
                out_events.push(Event::WaveStarted { wave });
            }
        }
        Command::SpawnEnemy { kind, health } => {
            if world.is_running() {
                spawn_enemy(world, kind, health, out_events);
            }
        }
        Command::AwardMoney { amount } => {
            if world.is_running() {
                world.money = world.money.saturating_add(amount);
                out_events.push(Event::MoneyAwarded { amount });
            }
        }
        Command::MarkStrongestEnemy => {
            if world.is_running() {
                world.strongest = strongest_enemy(&world.enemies);
                out_events.push(Event::StrongestEnemyMarked {
                    enemy: world.strongest,
                });
            }
        }
        Command::DeclareVictory => world.conclude(MatchOutcome::Won, out_events),
    }

    world.evaluate_end_conditions(out_events);
}

fn place_tower(world: &mut World, kind: TowerKind, position: Point, out_events: &mut Vec<Event>) {
    let cost = kind.stats().cost;
    let rejection = if world.is_concluded() {
        Some(PlacementError::MatchOver)
    } else if !world.unlocked.contains(&kind) {
        Some(PlacementError::Locked)
    } else if world.money < cost {
        Some(PlacementError::InsufficientFunds)
    } else if world.towers.crowds(position, MIN_TOWER_SEPARATION) {
        Some(PlacementError::TooClose)
    } else if !world.map.contains(position) {
        Some(PlacementError::OutOfBounds)
    } else {
        None
    };

    if let Some(reason) = rejection {
        out_events.push(Event::TowerPlacementRejected {
            kind,
            position,
            reason,
        });
        return;
    }

    world.money -= cost;
    let tower = world.towers.insert(kind, position);
    out_events.push(Event::TowerPlaced {
        tower,
        kind,
        position,
        cost,
    });
}

fn upgrade_tower(world: &mut World, tower: TowerId, out_events: &mut Vec<Event>) {
    let concluded = world.is_concluded();
    let money = world.money;
    let result = match world.towers.get_mut(tower) {
        _ if concluded => Err(UpgradeError::MatchOver),
        None => Err(UpgradeError::MissingTower),
        Some(state) if money < state.upgrade_cost() => Err(UpgradeError::InsufficientFunds),
        Some(state) => {
            let cost = state.upgrade_cost();
            state.upgrade();
            Ok((state.level, cost))
        }
    };

    match result {
        Ok((level, cost)) => {
            world.money -= cost;
            out_events.push(Event::TowerUpgraded { tower, level, cost });
        }
        Err(reason) => out_events.push(Event::TowerUpgradeRejected { tower, reason }),
    }
}

fn unlock_tower(world: &mut World, kind: TowerKind, out_events: &mut Vec<Event>) {
    let cost = kind.stats().unlock_cost;
    if world.unlocked.contains(&kind) {
        out_events.push(Event::TowerUnlockRejected {
            kind,
            reason: UnlockError::AlreadyUnlocked,
        });
        return;
    }
    if world.money < cost {
        out_events.push(Event::TowerUnlockRejected {
            kind,
            reason: UnlockError::InsufficientFunds,
        });
        return;
    }

    world.money -= cost;
    let _ = world.unlocked.insert(kind);
    out_events.push(Event::TowerUnlocked { kind, cost });
}

fn fire_projectile(
    world: &mut World,
    tower: TowerId,
    target: EnemyId,
    out_events: &mut Vec<Event>,
) {
    if !world.is_running() {
        return;
    }
    let Some(enemy_position) = world
        .enemy_index(target)
        .map(|index| world.enemies[index].position)
    else {
        return;
    };

    let (now, speed) = (world.now, world.speed);
    let Some(state) = world.towers.get_mut(tower) else {
        return;
    };
    if state.ability.activation_period().is_some()
        || !state.is_ready(now, speed)
        || !state.in_range(enemy_position)
    {
        return;
    }

    state.record_shot(now);
    state.face(enemy_position);
    let payload = Payload {
        origin: state.position,
        damage: state.damage,
        speed: state.projectile_speed,
        ability: state.ability,
    };

    for _ in 0..payload.ability.projectiles_per_shot() {
        world.launch(tower, target, payload, out_events);
    }
}

fn drain_beam(world: &mut World, tower: TowerId, targets: &[EnemyId], out_events: &mut Vec<Event>) {
    if !world.is_running() {
        return;
    }
    let now = world.now;
    let per_tick_scale = world.speed.scale() / world.ticks_per_second as f32;
    let Some(state) = world.towers.get_mut(tower) else {
        return;
    };
    if !state.beam_active(now) {
        return;
    }

    let victims: Vec<(EnemyId, Point)> = targets
        .iter()
        .filter_map(|id| find_enemy_index(&world.enemies, *id))
        .map(|index| (world.enemies[index].id, world.enemies[index].position))
        .filter(|(_, position)| state.in_range(*position))
        .collect();
    if let Some((_, first)) = victims.first() {
        state.face(*first);
    }

    let amount = state.damage * per_tick_scale;
    for (enemy, _) in victims {
        let _ = world.damage_enemy(enemy, amount, out_events);
    }
}

fn emit_pull(world: &mut World, tower: TowerId, targets: &[EnemyId], out_events: &mut Vec<Event>) {
    if !world.is_running() {
        return;
    }
    let (now, speed) = (world.now, world.speed);
    let Some(state) = world.towers.get_mut(tower) else {
        return;
    };
    if state.ability != Ability::Pull || !state.is_ready(now, speed) {
        return;
    }

    let captured: Vec<(EnemyId, Point)> = targets
        .iter()
        .filter_map(|id| find_enemy_index(&world.enemies, *id))
        .map(|index| (world.enemies[index].id, world.enemies[index].position))
        .filter(|(_, position)| state.in_range(*position))
        .collect();
    let Some((_, first)) = captured.first() else {
        return;
    };

    state.record_shot(now);
    state.face(*first);
    let payload = Payload {
        origin: state.position,
        damage: 0.0,
        speed: state.projectile_speed,
        ability: Ability::Pull,
    };

    for (enemy, _) in captured {
        world.launch(tower, enemy, payload, out_events);
    }
}

fn advance_projectiles(world: &mut World, out_events: &mut Vec<Event>) {
    if !world.is_running() {
        return;
    }

    let speed_factor = world.speed.scale();
    let in_flight = std::mem::take(&mut world.projectiles);
    let mut remaining = Vec::with_capacity(in_flight.len());

    for mut projectile in in_flight {
        let Some(target_position) = world
            .enemy_index(projectile.target)
            .map(|index| world.enemies[index].position)
        else {
            out_events.push(Event::ProjectileExpired {
                projectile: projectile.id,
            });
            continue;
        };

        match projectile.advance(target_position, speed_factor) {
            Flight::InFlight => remaining.push(projectile),
            Flight::Arrived => {
                let _ = world.damage_enemy(projectile.target, projectile.damage, out_events);
                out_events.push(Event::ProjectileImpacted {
                    impact: projectile.impact(),
                });
            }
        }
    }

    world.projectiles = remaining;
}

fn advance_enemies(world: &mut World, out_events: &mut Vec<Event>) {
    if !world.is_running() {
        return;
    }

    let speed_factor = world.speed.scale();
    let elapsed = world.tick * world.speed.factor();
    let tick_fraction = speed_factor / world.ticks_per_second as f32;
    let path = world.map.path;
    let ids: Vec<EnemyId> = world.enemies.iter().map(|enemy| enemy.id).collect();

    for id in ids {
        if world.player_health <= 0.0 {
            break;
        }
        let Some(index) = world.enemy_index(id) else {
            continue;
        };

        let owed = world.enemies[index].apply_status_tick(elapsed, tick_fraction);
        if world.damage_enemy(id, owed, out_events) {
            continue;
        }

        if world.enemies[index].advance(path, speed_factor) {
            let escaped = world.enemies.remove(index);
            let damage = escaped.radius / 10.0;
            world.player_health -= damage;
            if world.strongest == Some(id) {
                world.strongest = None;
            }
            out_events.push(Event::EnemyEscaped { enemy: id, damage });
        }
    }
}

fn spawn_enemy(world: &mut World, kind: EnemyKind, health: f32, out_events: &mut Vec<Event>) {
    let id = EnemyId::new(world.next_enemy_id);
    world.next_enemy_id = world.next_enemy_id.saturating_add(1);
    world
        .enemies
        .push(Enemy::spawn(id, kind, health, world.map.spawn_point()));
    out_events.push(Event::EnemySpawned {
        enemy: id,
        kind,
        health,
    });
}

fn find_enemy_index(enemies: &[Enemy], id: EnemyId) -> Option<usize> {
    enemies.binary_search_by_key(&id, |enemy| enemy.id).ok()
}

fn strongest_enemy(enemies: &[Enemy]) -> Option<EnemyId> {
    enemies
        .iter()
        .fold(None::<&Enemy>, |best, enemy| match best {
            Some(current) if current.health >= enemy.health => Some(current),
            _ => Some(enemy),
        })
        .map(|enemy| enemy.id)
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use waveguard_core::{
        EnemyView, GameSpeed, HudSnapshot, MapDefinition, MatchOutcome, MatchPhase, MatchSetup,
        Point, ProjectileView, TowerCooldownView, TowerId, TowerKind, TowerView, WaveStatus,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Map and difficulty the match was created with.
    #[must_use]
    pub fn setup(world: &World) -> MatchSetup {
        world.setup
    }

    /// Provides read-only access to the map definition.
    #[must_use]
    pub fn map(world: &World) -> &MapDefinition {
        &world.map
    }

    /// Path enemies follow on the current map.
    #[must_use]
    pub fn path(world: &World) -> &'static [Point] {
        world.map.path
    }

    /// Current simulated time.
    #[must_use]
    pub fn now(world: &World) -> Duration {
        world.now
    }

    /// Number of ticks that make up one simulated second.
    #[must_use]
    pub fn ticks_per_second(world: &World) -> u32 {
        world.ticks_per_second
    }

    /// Unscaled duration of one simulation tick.
    #[must_use]
    pub fn tick_duration(world: &World) -> Duration {
        world.tick
    }

    /// Active speed multiplier.
    #[must_use]
    pub fn game_speed(world: &World) -> GameSpeed {
        world.speed
    }

    /// Coarse phase of the match.
    #[must_use]
    pub fn match_phase(world: &World) -> MatchPhase {
        if world.outcome.is_some() {
            MatchPhase::Concluded
        } else if world.paused {
            MatchPhase::Paused
        } else {
            MatchPhase::Running
        }
    }

    /// Result of the match once it ended.
    #[must_use]
    pub fn outcome(world: &World) -> Option<MatchOutcome> {
        world.outcome
    }

    /// Money available for placement, upgrades, and unlocks.
    #[must_use]
    pub fn money(world: &World) -> u64 {
        world.money
    }

    /// Reports whether the tower kind may be placed.
    #[must_use]
    pub fn is_unlocked(world: &World, kind: TowerKind) -> bool {
        world.unlocked.contains(&kind)
    }

    /// Tower kinds available for placement in catalog order.
    #[must_use]
    pub fn unlocked_towers(world: &World) -> Vec<TowerKind> {
        world.unlocked.iter().copied().collect()
    }

    /// Currently selected tower, if any.
    #[must_use]
    pub fn selected_tower(world: &World) -> Option<TowerId> {
        world.selected
    }

    /// Captures a read-only view of the living enemies.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(
            world
                .enemies
                .iter()
                .map(|enemy| enemy.snapshot(world.strongest == Some(enemy.id)))
                .collect(),
        )
    }

    /// Captures a read-only view of the placed towers.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(
            world
                .towers
                .iter()
                .map(|tower| tower.snapshot(world.now, world.selected == Some(tower.id)))
                .collect(),
        )
    }

    /// Captures the readiness of every tower.
    #[must_use]
    pub fn tower_cooldowns(world: &World) -> TowerCooldownView {
        TowerCooldownView::from_snapshots(
            world
                .towers
                .iter()
                .map(|tower| tower.cooldown(world.now, world.speed))
                .collect(),
        )
    }

    /// Captures a read-only view of the projectiles in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        ProjectileView::from_snapshots(
            world
                .projectiles
                .iter()
                .map(|projectile| projectile.snapshot())
                .collect(),
        )
    }

    /// Figures shown on the heads-up display.
    #[must_use]
    pub fn hud(world: &World) -> HudSnapshot {
        HudSnapshot {
            score: world.score,
            money: world.money,
            player_health: world.player_health.max(0.0),
            wave: world.wave,
            speed: world.speed,
            paused: world.paused,
            outcome: world.outcome,
        }
    }

    /// Inputs the wave director reads on every tick.
    #[must_use]
    pub fn wave_status(world: &World) -> WaveStatus {
        WaveStatus {
            now: world.now,
            speed: world.speed,
            phase: match_phase(world),
            active_enemies: world.enemies.len(),
        }
    }
}
