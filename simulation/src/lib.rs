#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-step game loop that drives the world through every system.
//!
//! A [`Simulation`] owns the authoritative [`World`] together with the pure
//! systems and runs them in a fixed order on every [`Simulation::step`]:
//! time advances, towers acquire targets and fire, projectiles fly and
//! resolve their abilities, enemies move, and the wave director spawns. Player
//! actions are applied between steps and answer with a `Result` derived from
//! the world's events.

pub mod account;
pub mod config;
pub mod lobby;

use std::time::Duration;

use tracing::{info, warn};
use waveguard_core::{
    Command, EnemyView, Event, GameSpeed, HudSnapshot, MatchOutcome, MatchPhase, MatchSetup,
    PlacementError, Point, ProjectileView, TowerId, TowerKind, TowerTarget, TowerView,
    UnlockError, UpgradeError,
};
use waveguard_system_ability_effects::AbilityEffects;
use waveguard_system_tower_combat::TowerCombat;
use waveguard_system_tower_targeting::TowerTargeting;
use waveguard_system_wave_director::{Config as DirectorConfig, WaveDirector};
use waveguard_world::{self as world, query, World};

pub use account::{AccountRecord, AccountStore, AuthToken, InMemoryAccountStore, StoreError};
pub use config::{ConfigError, SimulationConfig, DEFAULT_SEED};
pub use lobby::{LobbyError, LobbyMessage};

/// Upper bound on steps a single [`Simulation::advance`] call may run.
pub const MAX_STEPS_PER_FRAME: u32 = 240;

/// Player-facing report of a collaborator failure the match survived.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    /// Account state could not be read; the match uses configured defaults.
    AccountUnavailable {
        /// Description of the failure.
        reason: String,
    },
    /// A write to the account store failed and was dropped.
    PersistenceFailed {
        /// Operation that failed.
        operation: &'static str,
        /// Description of the failure.
        reason: String,
    },
}

struct Account {
    store: Box<dyn AccountStore>,
    token: AuthToken,
}

/// Owns a match and advances it one fixed step at a time.
pub struct Simulation {
    world: World,
    targeting: TowerTargeting,
    combat: TowerCombat,
    effects: AbilityEffects,
    director: WaveDirector,
    account: Option<Account>,
    accumulator: Duration,
    targets: Vec<TowerTarget>,
    commands: Vec<Command>,
    events: Vec<Event>,
    notifications: Vec<Notification>,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("world", &self.world)
            .field("director", &self.director)
            .field("has_account", &self.account.is_some())
            .field("accumulator", &self.accumulator)
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Starts a match that persists nothing.
    #[must_use]
    pub fn new(setup: MatchSetup, config: &SimulationConfig) -> Self {
        Self::build(setup, config, config.world_settings(setup), None, Vec::new())
    }

    /// Starts a match whose money and unlocks come from an account.
    ///
    /// When the account cannot be read the match starts from the configured
    /// defaults and a [`Notification::AccountUnavailable`] is queued.
    #[must_use]
    pub fn with_account(
        setup: MatchSetup,
        config: &SimulationConfig,
        store: Box<dyn AccountStore>,
        token: AuthToken,
    ) -> Self {
        let mut settings = config.world_settings(setup);
        let mut notifications = Vec::new();

        let loaded = store
            .user_money(&token)
            .and_then(|money| Ok((money, store.unlocked_towers(&token)?)));
        match loaded {
            Ok((money, unlocked)) => {
                settings.starting_money = money;
                settings.unlocked = Some(unlocked);
            }
            Err(error) => {
                warn!(%error, "account unavailable, starting from defaults");
                notifications.push(Notification::AccountUnavailable {
                    reason: error.to_string(),
                });
            }
        }

        Self::build(
            setup,
            config,
            settings,
            Some(Account { store, token }),
            notifications,
        )
    }

    fn build(
        setup: MatchSetup,
        config: &SimulationConfig,
        settings: waveguard_world::WorldSettings,
        account: Option<Account>,
        notifications: Vec<Notification>,
    ) -> Self {
        info!(
            map = ?setup.map,
            difficulty = ?setup.difficulty,
            seed = config.seed,
            "match started"
        );
        Self {
            world: World::new(settings),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            effects: AbilityEffects::new(config.seed),
            director: WaveDirector::new(DirectorConfig::new(config.seed)),
            account,
            accumulator: Duration::ZERO,
            targets: Vec::new(),
            commands: Vec::new(),
            events: Vec::new(),
            notifications,
        }
    }

    /// Runs one fixed step of the pipeline and returns the events it produced.
    pub fn step(&mut self) -> &[Event] {
        self.events.clear();

        let dt = query::tick_duration(&self.world);
        world::apply(&mut self.world, Command::Tick { dt }, &mut self.events);

        self.targeting.handle(
            query::match_phase(&self.world),
            &query::tower_view(&self.world),
            &query::enemy_view(&self.world),
            &mut self.targets,
        );
        self.combat.handle(
            query::match_phase(&self.world),
            query::tower_cooldowns(&self.world),
            &self.targets,
            &mut self.commands,
        );
        self.flush_commands();

        let impacts_from = self.events.len();
        world::apply(
            &mut self.world,
            Command::AdvanceProjectiles,
            &mut self.events,
        );
        self.effects.handle(
            query::match_phase(&self.world),
            &self.events[impacts_from..],
            &query::enemy_view(&self.world),
            &mut self.commands,
        );
        self.flush_commands();

        world::apply(&mut self.world, Command::AdvanceEnemies, &mut self.events);

        let setup = query::setup(&self.world);
        self.director.handle(
            query::map(&self.world),
            setup.difficulty,
            query::wave_status(&self.world),
            &mut self.commands,
        );
        self.flush_commands();

        self.settle_match_end();
        &self.events
    }

    /// Feeds real frame time into the fixed-step accumulator.
    ///
    /// Runs as many whole steps as the accumulated time covers, capped at
    /// [`MAX_STEPS_PER_FRAME`], and returns every event they produced. Time
    /// that passes while the match is paused or over is discarded.
    pub fn advance(&mut self, frame: Duration) -> Vec<Event> {
        let mut produced = Vec::new();
        if query::match_phase(&self.world) != MatchPhase::Running {
            self.accumulator = Duration::ZERO;
            return produced;
        }

        let tick = query::tick_duration(&self.world);
        self.accumulator += frame;
        let mut steps = 0;
        while self.accumulator >= tick && steps < MAX_STEPS_PER_FRAME {
            self.accumulator -= tick;
            steps += 1;
            produced.extend_from_slice(self.step());
            if query::match_phase(&self.world) != MatchPhase::Running {
                self.accumulator = Duration::ZERO;
                break;
            }
        }
        if steps == MAX_STEPS_PER_FRAME {
            self.accumulator = Duration::ZERO;
        }
        produced
    }

    /// Applies a command outside the step pipeline, as scripted replays do.
    pub fn submit(&mut self, command: Command) -> &[Event] {
        self.events.clear();
        world::apply(&mut self.world, command, &mut self.events);
        self.settle_match_end();
        &self.events
    }

    /// Places a tower, spending its cost.
    pub fn place_tower(
        &mut self,
        kind: TowerKind,
        position: Point,
    ) -> Result<TowerId, PlacementError> {
        let events = self.submit(Command::PlaceTower { kind, position });
        events
            .iter()
            .find_map(|event| match event {
                Event::TowerPlaced { tower, .. } => Some(Ok(*tower)),
                Event::TowerPlacementRejected { reason, .. } => Some(Err(*reason)),
                _ => None,
            })
            .unwrap_or(Err(PlacementError::MatchOver))
    }

    /// Upgrades a tower one level, returning the level reached.
    pub fn upgrade_tower(&mut self, tower: TowerId) -> Result<u32, UpgradeError> {
        let events = self.submit(Command::UpgradeTower { tower });
        events
            .iter()
            .find_map(|event| match event {
                Event::TowerUpgraded { level, .. } => Some(Ok(*level)),
                Event::TowerUpgradeRejected { reason, .. } => Some(Err(*reason)),
                _ => None,
            })
            .unwrap_or(Err(UpgradeError::MissingTower))
    }

    /// Unlocks a tower kind, spending its unlock cost and recording it on the account.
    pub fn unlock_tower(&mut self, kind: TowerKind) -> Result<(), UnlockError> {
        let result = self
            .submit(Command::UnlockTower { kind })
            .iter()
            .find_map(|event| match event {
                Event::TowerUnlocked { .. } => Some(Ok(())),
                Event::TowerUnlockRejected { reason, .. } => Some(Err(*reason)),
                _ => None,
            })
            .unwrap_or(Err(UnlockError::AlreadyUnlocked));

        if result.is_ok() {
            let money = query::money(&self.world);
            self.persist("unlock_tower", |store, token| {
                store.unlock_tower(token, kind)?;
                store.set_user_money(token, money)
            });
        }
        result
    }

    /// Marks a tower as selected, or clears the selection.
    pub fn select_tower(&mut self, tower: Option<TowerId>) {
        let _ = self.submit(Command::SelectTower { tower });
    }

    /// Pauses or resumes the match.
    pub fn set_paused(&mut self, paused: bool) {
        self.accumulator = Duration::ZERO;
        let _ = self.submit(Command::SetPaused { paused });
    }

    /// Flips between paused and running.
    pub fn toggle_pause(&mut self) {
        let paused = query::match_phase(&self.world) == MatchPhase::Paused;
        self.set_paused(!paused);
    }

    /// Changes the game speed multiplier.
    pub fn set_game_speed(&mut self, speed: GameSpeed) {
        let _ = self.submit(Command::SetGameSpeed { speed });
    }

    /// Writes the current money to the account, if one is attached.
    pub fn sync_money(&mut self) {
        let money = query::money(&self.world);
        self.persist("set_user_money", |store, token| store.set_user_money(token, money));
    }

    /// Drains the failures reported since the previous call.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Account store the match persists to, if one is attached.
    #[must_use]
    pub fn account_store(&self) -> Option<&dyn AccountStore> {
        self.account.as_ref().map(|account| account.store.as_ref())
    }

    /// Wave director driving the match.
    #[must_use]
    pub fn director(&self) -> &WaveDirector {
        &self.director
    }

    /// Heads-up display values.
    #[must_use]
    pub fn hud(&self) -> HudSnapshot {
        query::hud(&self.world)
    }

    /// Living enemies.
    #[must_use]
    pub fn enemies(&self) -> EnemyView {
        query::enemy_view(&self.world)
    }

    /// Placed towers.
    #[must_use]
    pub fn towers(&self) -> TowerView {
        query::tower_view(&self.world)
    }

    /// Projectiles in flight.
    #[must_use]
    pub fn projectiles(&self) -> ProjectileView {
        query::projectile_view(&self.world)
    }

    /// Result of the match once it has ended.
    #[must_use]
    pub fn outcome(&self) -> Option<MatchOutcome> {
        query::outcome(&self.world)
    }

    fn flush_commands(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }

    fn settle_match_end(&mut self) {
        let ended = self.events.iter().find_map(|event| match event {
            Event::MatchEnded {
                outcome,
                score,
                payout,
            } => Some((*outcome, *score, *payout)),
            _ => None,
        });
        let Some((outcome, score, payout)) = ended else {
            return;
        };

        info!(?outcome, score, payout, "match ended");
        self.sync_money();
    }

    fn persist<F>(&mut self, operation: &'static str, write: F)
    where
        F: FnOnce(&mut dyn AccountStore, &AuthToken) -> Result<(), StoreError>,
    {
        let Some(account) = self.account.as_mut() else {
            return;
        };
        if let Err(error) = write(account.store.as_mut(), &account.token) {
            warn!(operation, %error, "account write dropped");
            self.notifications.push(Notification::PersistenceFailed {
                operation,
                reason: error.to_string(),
            });
        }
    }
}
