//! Map layouts and difficulty tiers.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{EnemyKind, Point};

/// Width of every map in world units.
pub const MAP_WIDTH: f32 = 800.0;
/// Height of every map in world units.
pub const MAP_HEIGHT: f32 = 600.0;

const REGULAR_ROSTER: &[EnemyKind] = &[EnemyKind::Grunt, EnemyKind::Runner, EnemyKind::Brute];

const MEADOW_PATH: &[Point] = &[
    Point::new(0.0, 300.0),
    Point::new(200.0, 300.0),
    Point::new(200.0, 120.0),
    Point::new(520.0, 120.0),
    Point::new(520.0, 460.0),
    Point::new(800.0, 460.0),
];

const CANYON_PATH: &[Point] = &[
    Point::new(0.0, 80.0),
    Point::new(680.0, 80.0),
    Point::new(680.0, 260.0),
    Point::new(120.0, 260.0),
    Point::new(120.0, 440.0),
    Point::new(800.0, 440.0),
];

const VOLCANO_PATH: &[Point] = &[
    Point::new(400.0, 0.0),
    Point::new(400.0, 160.0),
    Point::new(120.0, 160.0),
    Point::new(120.0, 480.0),
    Point::new(680.0, 480.0),
    Point::new(680.0, 300.0),
    Point::new(800.0, 300.0),
];

const CITADEL_PATH: &[Point] = &[
    Point::new(0.0, 560.0),
    Point::new(700.0, 560.0),
    Point::new(700.0, 60.0),
    Point::new(100.0, 60.0),
    Point::new(100.0, 420.0),
    Point::new(560.0, 420.0),
    Point::new(560.0, 220.0),
    Point::new(800.0, 220.0),
];

/// Identifies one of the playable maps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapId {
    /// Gentle opening map.
    #[default]
    Meadow,
    /// Long switchbacks.
    Canyon,
    /// Tough enemies with a central entrance.
    Volcano,
    /// Endgame map with frequent bosses.
    Citadel,
}

impl MapId {
    /// Every map in unlock order.
    pub const ALL: [MapId; 4] = [MapId::Meadow, MapId::Canyon, MapId::Volcano, MapId::Citadel];

    /// Static definition of the map.
    #[must_use]
    pub const fn definition(self) -> MapDefinition {
        match self {
            Self::Meadow => MapDefinition {
                path: MEADOW_PATH,
                wave_reward: 25,
                health_scale: 1.0,
                waves_to_win: 30,
                fixed_boss_interval: None,
                roster: REGULAR_ROSTER,
            },
            Self::Canyon => MapDefinition {
                path: CANYON_PATH,
                wave_reward: 35,
                health_scale: 1.25,
                waves_to_win: 40,
                fixed_boss_interval: None,
                roster: REGULAR_ROSTER,
            },
            Self::Volcano => MapDefinition {
                path: VOLCANO_PATH,
                wave_reward: 50,
                health_scale: 1.5,
                waves_to_win: 50,
                fixed_boss_interval: None,
                roster: REGULAR_ROSTER,
            },
            Self::Citadel => MapDefinition {
                path: CITADEL_PATH,
                wave_reward: 75,
                health_scale: 2.0,
                waves_to_win: 60,
                fixed_boss_interval: Some(3),
                roster: REGULAR_ROSTER,
            },
        }
    }
}

/// Static description of a map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapDefinition {
    /// Path enemies walk from first to last point.
    pub path: &'static [Point],
    /// Money paid whenever a wave launches.
    pub wave_reward: u64,
    /// Health multiplier applied to every enemy on the map.
    pub health_scale: f32,
    /// Number of waves that must be cleared to win.
    pub waves_to_win: u32,
    /// Boss interval overriding the difficulty's interval.
    pub fixed_boss_interval: Option<u32>,
    /// Enemy kinds that appear among regular spawns.
    pub roster: &'static [EnemyKind],
}

impl MapDefinition {
    /// Reports whether the point lies within the map bounds.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        (0.0..=MAP_WIDTH).contains(&point.x()) && (0.0..=MAP_HEIGHT).contains(&point.y())
    }

    /// Boss interval in effect for the provided difficulty.
    #[must_use]
    pub fn boss_interval(&self, difficulty: Difficulty) -> u32 {
        self.fixed_boss_interval
            .unwrap_or_else(|| difficulty.profile().boss_interval)
    }

    /// Point where enemies enter the map.
    #[must_use]
    pub fn spawn_point(&self) -> Point {
        self.path.first().copied().unwrap_or_default()
    }
}

/// Difficulty tier selected in the lobby.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Small waves and rare bosses.
    Easy,
    /// Default tier.
    #[default]
    Normal,
    /// Large waves and frequent bosses.
    Hard,
}

/// Wave-shaping parameters of a difficulty tier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DifficultyProfile {
    /// Enemies per wave number.
    pub base_wave_size: u32,
    /// Upper bound on the size of any wave.
    pub max_wave_size: u32,
    /// Health growth added per wave after the first.
    pub health_growth: f32,
    /// Every n-th wave carries a boss.
    pub boss_interval: u32,
    /// Delay between consecutive regular spawns before speed scaling.
    pub spawn_interval: Duration,
}

impl Difficulty {
    /// Wave-shaping parameters of the tier.
    #[must_use]
    pub const fn profile(self) -> DifficultyProfile {
        match self {
            Self::Easy => DifficultyProfile {
                base_wave_size: 5,
                max_wave_size: 40,
                health_growth: 0.10,
                boss_interval: 10,
                spawn_interval: Duration::from_millis(1_000),
            },
            Self::Normal => DifficultyProfile {
                base_wave_size: 8,
                max_wave_size: 60,
                health_growth: 0.15,
                boss_interval: 7,
                spawn_interval: Duration::from_millis(800),
            },
            Self::Hard => DifficultyProfile {
                base_wave_size: 10,
                max_wave_size: 80,
                health_growth: 0.20,
                boss_interval: 5,
                spawn_interval: Duration::from_millis(600),
            },
        }
    }
}

impl DifficultyProfile {
    /// Number of enemies, boss included, released on `wave`.
    #[must_use]
    pub fn wave_size(&self, wave: u32) -> u32 {
        self.base_wave_size
            .saturating_mul(wave)
            .min(self.max_wave_size)
    }
}

/// Map and difficulty selected for a match, as broadcast by the lobby.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchSetup {
    /// Map to play on.
    pub map: MapId,
    /// Difficulty tier of the match.
    pub difficulty: Difficulty,
}

impl MatchSetup {
    /// Creates a new match setup.
    #[must_use]
    pub const fn new(map: MapId, difficulty: Difficulty) -> Self {
        Self { map, difficulty }
    }
}
