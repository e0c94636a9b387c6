#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave director responsible for launching waves and releasing spawns.
//!
//! The director is a two-state machine. While `Idle` it waits for the map to
//! clear, then launches the next wave: it announces the wave, injects a boss
//! on boss waves, queues the regular enemies on an explicit schedule keyed by
//! simulated time, pays the wave reward, and marks the strongest enemy. While
//! `Spawning` it releases queued enemies as their time comes. Because the
//! schedule is keyed by the world clock, pausing simply stops it from
//! draining and ending the match discards it.

use std::{collections::VecDeque, time::Duration};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};
use tracing::debug;
use waveguard_core::{Command, Difficulty, EnemyKind, MapDefinition, MatchPhase, WaveStatus};

/// Configuration parameters required to construct the wave director.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided match seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Coarse state of the director.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirectorState {
    /// No spawns are pending; the next wave launches once the map is clear.
    Idle,
    /// Enemies of the current wave are still queued.
    Spawning,
}

/// Regular enemy waiting for its release time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduledSpawn {
    /// Simulated time at which the enemy enters the map.
    pub fire_at: Duration,
    /// Template of the enemy.
    pub kind: EnemyKind,
    /// Health after wave scaling.
    pub health: f32,
}

/// Pure system that launches waves and drains the spawn schedule.
#[derive(Debug)]
pub struct WaveDirector {
    rng_seed: u64,
    state: DirectorState,
    last_wave: u32,
    schedule: VecDeque<ScheduledSpawn>,
    roster_workspace: Vec<EnemyKind>,
}

impl WaveDirector {
    /// Creates a new director that has not launched any wave yet.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng_seed: config.rng_seed,
            state: DirectorState::Idle,
            last_wave: 0,
            schedule: VecDeque::new(),
            roster_workspace: Vec::new(),
        }
    }

    /// Current state of the director.
    #[must_use]
    pub fn state(&self) -> DirectorState {
        self.state
    }

    /// Number of the most recently launched wave, or zero before the first.
    #[must_use]
    pub fn last_wave(&self) -> u32 {
        self.last_wave
    }

    /// Spawns still waiting in the schedule, in release order.
    pub fn pending(&self) -> impl Iterator<Item = &ScheduledSpawn> {
        self.schedule.iter()
    }

    /// Drains due spawns and launches the next wave when the map is clear.
    pub fn handle(
        &mut self,
        map: &MapDefinition,
        difficulty: Difficulty,
        status: WaveStatus,
        out: &mut Vec<Command>,
    ) {
        match status.phase {
            MatchPhase::Concluded => {
                self.schedule.clear();
                self.state = DirectorState::Idle;
                return;
            }
            MatchPhase::Paused => return,
            MatchPhase::Running => {}
        }

        let released = self.release_due(status.now, out);
        if self.state == DirectorState::Spawning && self.schedule.is_empty() {
            self.state = DirectorState::Idle;
        }

        // The active enemy count predates the spawns just released.
        if released > 0 {
            return;
        }

        if self.state != DirectorState::Idle || status.active_enemies > 0 {
            return;
        }

        if self.last_wave >= map.waves_to_win {
            out.push(Command::DeclareVictory);
            return;
        }

        self.launch(map, difficulty, status, out);
    }

    fn launch(
        &mut self,
        map: &MapDefinition,
        difficulty: Difficulty,
        status: WaveStatus,
        out: &mut Vec<Command>,
    ) {
        let wave = self.last_wave.saturating_add(1);
        self.last_wave = wave;
        out.push(Command::StartWave { wave });

        let profile = difficulty.profile();
        let size = profile.wave_size(wave);
        let boss_interval = map.boss_interval(difficulty);
        let boss = boss_interval > 0 && wave % boss_interval == 0;
        if boss {
            let spec = EnemyKind::Boss.spec();
            out.push(Command::SpawnEnemy {
                kind: EnemyKind::Boss,
                health: spec.health * map.health_scale * (1.0 + wave as f32 / 10.0),
            });
        }

        let multiplier = map.health_scale * (1.0 + profile.health_growth * (wave - 1) as f32);
        let regular = size.saturating_sub(u32::from(boss));
        let spacing = status.speed.shorten(profile.spawn_interval);

        self.roster_workspace.clear();
        self.roster_workspace.extend(
            map.roster
                .iter()
                .copied()
                .filter(|kind| kind.first_wave() <= wave),
        );

        if !self.roster_workspace.is_empty() {
            let mut rng = ChaCha8Rng::seed_from_u64(derive_wave_seed(self.rng_seed, wave));
            for index in 0..regular {
                let kind = self.roster_workspace[rng.gen_range(0..self.roster_workspace.len())];
                self.schedule.push_back(ScheduledSpawn {
                    fire_at: status.now.saturating_add(spacing * index),
                    kind,
                    health: kind.spec().health * multiplier,
                });
            }
        }

        let _ = self.release_due(status.now, out);
        self.state = DirectorState::Spawning;

        out.push(Command::AwardMoney {
            amount: map.wave_reward,
        });
        out.push(Command::MarkStrongestEnemy);

        debug!(
            wave,
            size,
            boss,
            health_multiplier = multiplier,
            queued = self.schedule.len(),
            "wave launched"
        );
    }

    fn release_due(&mut self, now: Duration, out: &mut Vec<Command>) -> usize {
        let mut released = 0;
        while let Some(spawn) = self.schedule.front() {
            if spawn.fire_at > now {
                break;
            }
            out.push(Command::SpawnEnemy {
                kind: spawn.kind,
                health: spawn.health,
            });
            let _ = self.schedule.pop_front();
            released += 1;
        }
        released
    }
}

fn derive_wave_seed(global_seed: u64, wave: u32) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(global_seed.to_le_bytes());
    hasher.update(wave.to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use waveguard_core::{GameSpeed, MapId};

    fn status(now_ms: u64, active_enemies: usize) -> WaveStatus {
        WaveStatus {
            now: Duration::from_millis(now_ms),
            speed: GameSpeed::Normal,
            phase: MatchPhase::Running,
            active_enemies,
        }
    }

    fn spawned(commands: &[Command]) -> Vec<(EnemyKind, f32)> {
        commands
            .iter()
            .filter_map(|command| match command {
                Command::SpawnEnemy { kind, health } => Some((*kind, *health)),
                _ => None,
            })
            .collect()
    }

    /// Runs the director with an always-empty map until `wave` has launched.
    fn run_until_wave(
        director: &mut WaveDirector,
        map: &MapDefinition,
        difficulty: Difficulty,
        wave: u32,
    ) -> Vec<Command> {
        let mut now = 0;
        loop {
            let mut out = Vec::new();
            director.handle(map, difficulty, status(now, 0), &mut out);
            now += 1_000_000;
            if out.contains(&Command::StartWave { wave }) {
                return out;
            }
            assert!(now < 1_000_000_000, "wave {wave} never launched");
        }
    }

    #[test]
    fn first_wave_launches_on_an_empty_map() {
        let map = MapId::Meadow.definition();
        let mut director = WaveDirector::new(Config::new(1));
        let mut out = Vec::new();

        director.handle(&map, Difficulty::Normal, status(0, 0), &mut out);

        assert_eq!(out[0], Command::StartWave { wave: 1 });
        assert_eq!(
            spawned(&out),
            vec![(EnemyKind::Grunt, 100.0)],
            "only the first regular spawn is due"
        );
        assert_eq!(
            &out[out.len() - 2..],
            &[
                Command::AwardMoney { amount: 25 },
                Command::MarkStrongestEnemy
            ]
        );
        assert_eq!(director.state(), DirectorState::Spawning);
        assert_eq!(director.pending().count(), 7);
    }

    #[test]
    fn schedule_releases_at_fixed_intervals() {
        let map = MapId::Meadow.definition();
        let mut director = WaveDirector::new(Config::new(1));
        let mut out = Vec::new();
        director.handle(&map, Difficulty::Normal, status(0, 0), &mut out);

        let release_times: Vec<Duration> = director.pending().map(|spawn| spawn.fire_at).collect();
        assert_eq!(release_times[0], Duration::from_millis(800));
        assert_eq!(release_times[6], Duration::from_millis(5_600));

        out.clear();
        director.handle(&map, Difficulty::Normal, status(799, 1), &mut out);
        assert!(out.is_empty());

        director.handle(&map, Difficulty::Normal, status(1_600, 1), &mut out);
        assert_eq!(spawned(&out).len(), 2);
    }

    #[test]
    fn releasing_spawns_defers_the_launch_check() {
        let map = MapId::Meadow.definition();
        let mut director = WaveDirector::new(Config::new(1));
        let mut out = Vec::new();
        director.handle(&map, Difficulty::Easy, status(0, 0), &mut out);

        out.clear();
        director.handle(&map, Difficulty::Easy, status(10_000, 0), &mut out);
        assert_eq!(spawned(&out).len(), 4);
        assert!(!out.iter().any(|command| matches!(command, Command::StartWave { .. })));
        assert_eq!(director.state(), DirectorState::Idle);
    }

    #[test]
    fn double_speed_halves_spawn_spacing() {
        let map = MapId::Meadow.definition();
        let mut director = WaveDirector::new(Config::new(1));
        let mut out = Vec::new();
        let mut fast = status(0, 0);
        fast.speed = GameSpeed::Double;

        director.handle(&map, Difficulty::Easy, fast, &mut out);

        let first = director.pending().next().map(|spawn| spawn.fire_at);
        assert_eq!(first, Some(Duration::from_millis(500)));
    }

    #[test]
    fn paused_director_holds_its_schedule() {
        let map = MapId::Meadow.definition();
        let mut director = WaveDirector::new(Config::new(1));
        let mut out = Vec::new();
        director.handle(&map, Difficulty::Normal, status(0, 0), &mut out);
        out.clear();

        let mut paused = status(60_000, 0);
        paused.phase = MatchPhase::Paused;
        director.handle(&map, Difficulty::Normal, paused, &mut out);

        assert!(out.is_empty());
        assert_eq!(director.pending().count(), 7);
    }

    #[test]
    fn concluded_match_discards_pending_spawns() {
        let map = MapId::Meadow.definition();
        let mut director = WaveDirector::new(Config::new(1));
        let mut out = Vec::new();
        director.handle(&map, Difficulty::Normal, status(0, 0), &mut out);
        out.clear();

        let mut concluded = status(60_000, 0);
        concluded.phase = MatchPhase::Concluded;
        director.handle(&map, Difficulty::Normal, concluded, &mut out);

        assert!(out.is_empty());
        assert_eq!(director.pending().count(), 0);
        assert_eq!(director.state(), DirectorState::Idle);
    }

    #[test]
    fn boss_wave_doubles_boss_health_on_wave_ten() {
        let map = MapId::Meadow.definition();
        let mut director = WaveDirector::new(Config::new(5));

        let out = run_until_wave(&mut director, &map, Difficulty::Hard, 10);

        let bosses: Vec<f32> = spawned(&out)
            .into_iter()
            .filter(|(kind, _)| *kind == EnemyKind::Boss)
            .map(|(_, health)| health)
            .collect();
        assert_eq!(bosses, vec![2_000.0]);
        assert_eq!(
            out[1],
            Command::SpawnEnemy {
                kind: EnemyKind::Boss,
                health: 2_000.0
            }
        );
        assert_eq!(director.pending().count(), 78);
    }

    #[test]
    fn non_boss_waves_spawn_no_boss() {
        let map = MapId::Meadow.definition();
        let mut director = WaveDirector::new(Config::new(5));

        let out = run_until_wave(&mut director, &map, Difficulty::Hard, 9);

        assert!(spawned(&out)
            .iter()
            .all(|(kind, _)| *kind != EnemyKind::Boss));
    }

    #[test]
    fn citadel_bosses_every_third_wave() {
        let map = MapId::Citadel.definition();
        let mut director = WaveDirector::new(Config::new(5));

        let out = run_until_wave(&mut director, &map, Difficulty::Easy, 3);

        let boss = spawned(&out)
            .into_iter()
            .find(|(kind, _)| *kind == EnemyKind::Boss)
            .map(|(_, health)| health);
        let expected = 1_000.0 * 2.0 * (1.0 + 3.0 / 10.0);
        assert!(boss.map_or(false, |health| (health - expected).abs() < 1e-3));
    }

    #[test]
    fn early_waves_only_field_grunts() {
        let map = MapId::Meadow.definition();
        let mut director = WaveDirector::new(Config::new(11));

        let _ = run_until_wave(&mut director, &map, Difficulty::Normal, 2);

        assert!(director
            .pending()
            .all(|spawn| spawn.kind == EnemyKind::Grunt));
        let expected = 100.0 * (1.0 + 0.15);
        assert!(director
            .pending()
            .all(|spawn| (spawn.health - expected).abs() < 1e-3));
    }

    #[test]
    fn victory_follows_the_final_wave() {
        let map = MapId::Meadow.definition();
        let mut director = WaveDirector::new(Config::new(3));
        let mut now = 0;
        let mut launched = 0;

        loop {
            let mut out = Vec::new();
            director.handle(&map, Difficulty::Easy, status(now, 0), &mut out);
            now += 1_000_000;
            launched += out
                .iter()
                .filter(|command| matches!(command, Command::StartWave { .. }))
                .count();
            if out.contains(&Command::DeclareVictory) {
                break;
            }
            assert!(now < 1_000_000_000);
        }

        assert_eq!(launched, 30);
        assert_eq!(director.last_wave(), 30);
    }

    #[test]
    fn identical_seeds_produce_identical_waves() {
        let map = MapId::Volcano.definition();
        let mut first = WaveDirector::new(Config::new(42));
        let mut second = WaveDirector::new(Config::new(42));

        let _ = run_until_wave(&mut first, &map, Difficulty::Hard, 8);
        let _ = run_until_wave(&mut second, &map, Difficulty::Hard, 8);

        let first_kinds: Vec<EnemyKind> = first.pending().map(|spawn| spawn.kind).collect();
        let second_kinds: Vec<EnemyKind> = second.pending().map(|spawn| spawn.kind).collect();
        assert_eq!(first_kinds, second_kinds);
    }
}
