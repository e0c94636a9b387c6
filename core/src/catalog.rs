//! Static tower and enemy catalogs.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Rgb;

/// Secondary effect carried by a tower's projectiles or activation windows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ability {
    /// Plain damage without a secondary effect.
    None,
    /// Two projectiles leave the tower per shot.
    MultiShot,
    /// Bystanders near the impact take half damage.
    Splash,
    /// Occasionally lands a second full hit.
    CriticalHit,
    /// Halves the target's movement speed for a while.
    Slow,
    /// Bystanders in a wide radius take three quarters of the damage.
    AreaBlast,
    /// Sets the target on fire.
    Burn,
    /// Prefers the strongest enemy in range.
    HomingMissile,
    /// Poisons the target.
    PoisonCloud,
    /// Arcs to nearby enemies after the impact.
    ChainLightning,
    /// Periodically drags every enemy in range toward the tower.
    Pull,
    /// Periodically drains every enemy in range continuously.
    Beam,
}

/// How a tower picks what to shoot at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetingPolicy {
    /// First enemy in spawn order within range.
    FirstInRange,
    /// Enemy with the highest current health within range.
    Strongest,
    /// Every enemy within range.
    AllInRange,
}

/// Radius in world units of the splash effect.
pub const SPLASH_RADIUS: f32 = 50.0;
/// Fraction of the base damage dealt by splash.
pub const SPLASH_FACTOR: f32 = 0.5;
/// Radius in world units of the area blast effect.
pub const AREA_BLAST_RADIUS: f32 = 75.0;
/// Fraction of the base damage dealt by an area blast.
pub const AREA_BLAST_FACTOR: f32 = 0.75;
/// Probability of a critical hit landing.
pub const CRITICAL_HIT_CHANCE: f64 = 0.2;
/// Number of additional enemies a chain lightning arcs to.
pub const CHAIN_JUMPS: usize = 2;
/// Maximum arc distance between consecutive chain lightning hits.
pub const CHAIN_RADIUS: f32 = 100.0;
/// Fraction of the base damage dealt by each arc.
pub const CHAIN_FACTOR: f32 = 0.5;
/// Distance an enemy is dragged toward a pull tower.
pub const PULL_DISTANCE: f32 = 50.0;
/// Length of a beam's active window before speed scaling.
pub const BEAM_ACTIVE_WINDOW: Duration = Duration::from_millis(5_000);
/// Period between beam activations before speed scaling.
pub const BEAM_PERIOD: Duration = Duration::from_millis(10_000);
/// Period between pull activations before speed scaling.
pub const PULL_PERIOD: Duration = Duration::from_millis(5_000);

impl Ability {
    /// Targeting policy implied by the ability.
    #[must_use]
    pub const fn targeting(self) -> TargetingPolicy {
        match self {
            Self::HomingMissile => TargetingPolicy::Strongest,
            Self::Beam | Self::Pull => TargetingPolicy::AllInRange,
            _ => TargetingPolicy::FirstInRange,
        }
    }

    /// Number of projectiles launched per shot.
    #[must_use]
    pub const fn projectiles_per_shot(self) -> usize {
        match self {
            Self::MultiShot => 2,
            _ => 1,
        }
    }

    /// Fixed activation period for abilities gated on windows instead of shots.
    #[must_use]
    pub const fn activation_period(self) -> Option<Duration> {
        match self {
            Self::Beam => Some(BEAM_PERIOD),
            Self::Pull => Some(PULL_PERIOD),
            _ => None,
        }
    }
}

/// Base statistics shared by every tower of a kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerStats {
    /// Damage per shot, or per second for beams.
    pub damage: f32,
    /// Targeting radius in world units.
    pub range: f32,
    /// Interval between shots before speed scaling.
    pub fire_interval: Duration,
    /// Money required to place the tower.
    pub cost: u64,
    /// Money required to make the kind available.
    pub unlock_cost: u64,
    /// Projectile travel per tick in world units.
    pub projectile_speed: f32,
    /// Ability attached to the kind.
    pub ability: Ability,
}

/// Kinds of towers that can be placed within the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerKind {
    /// Plain single-shot tower available from the start.
    Basic,
    /// Fires two projectiles per shot.
    Twin,
    /// Heavy shells with splash damage.
    Cannon,
    /// Long range with critical hits.
    Sniper,
    /// Slows its targets.
    Frost,
    /// Slow shells with a wide blast.
    Mortar,
    /// Sets its targets on fire.
    Flame,
    /// Seeks out the strongest enemy.
    Missile,
    /// Poisons its targets.
    Venom,
    /// Lightning that arcs between enemies.
    Tesla,
    /// Drags enemies back along the path.
    Gravity,
    /// Continuous beam over a periodic window.
    Laser,
}

impl TowerKind {
    /// Every tower kind in catalog order.
    pub const ALL: [TowerKind; 12] = [
        TowerKind::Basic,
        TowerKind::Twin,
        TowerKind::Cannon,
        TowerKind::Sniper,
        TowerKind::Frost,
        TowerKind::Mortar,
        TowerKind::Flame,
        TowerKind::Missile,
        TowerKind::Venom,
        TowerKind::Tesla,
        TowerKind::Gravity,
        TowerKind::Laser,
    ];

    /// Catalog statistics of the kind.
    #[must_use]
    pub const fn stats(self) -> TowerStats {
        let (damage, range, interval_ms, cost, unlock_cost, projectile_speed, ability) = match self
        {
            Self::Basic => (10.0, 100.0, 1_000, 50, 0, 6.0, Ability::None),
            Self::Twin => (8.0, 100.0, 1_000, 75, 150, 6.0, Ability::MultiShot),
            Self::Cannon => (20.0, 90.0, 1_500, 100, 250, 5.0, Ability::Splash),
            Self::Sniper => (40.0, 200.0, 2_000, 120, 300, 10.0, Ability::CriticalHit),
            Self::Frost => (5.0, 100.0, 1_000, 80, 200, 6.0, Ability::Slow),
            Self::Mortar => (25.0, 120.0, 2_500, 150, 400, 4.0, Ability::AreaBlast),
            Self::Flame => (5.0, 80.0, 800, 90, 250, 6.0, Ability::Burn),
            Self::Missile => (30.0, 150.0, 1_800, 140, 450, 4.0, Ability::HomingMissile),
            Self::Venom => (5.0, 100.0, 1_200, 90, 300, 6.0, Ability::PoisonCloud),
            Self::Tesla => (15.0, 110.0, 1_400, 130, 500, 8.0, Ability::ChainLightning),
            Self::Gravity => (0.0, 100.0, 5_000, 110, 400, 5.0, Ability::Pull),
            Self::Laser => (20.0, 120.0, 10_000, 200, 600, 0.0, Ability::Beam),
        };

        TowerStats {
            damage,
            range,
            fire_interval: Duration::from_millis(interval_ms),
            cost,
            unlock_cost,
            projectile_speed,
            ability,
        }
    }

    /// Ability attached to the kind.
    #[must_use]
    pub const fn ability(self) -> Ability {
        self.stats().ability
    }

    /// Money required to upgrade a tower of this kind from `level`.
    #[must_use]
    pub const fn upgrade_cost(self, level: u32) -> u64 {
        self.stats().cost * level as u64 / 2
    }

    /// Lowercase label used by configuration files and logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Twin => "twin",
            Self::Cannon => "cannon",
            Self::Sniper => "sniper",
            Self::Frost => "frost",
            Self::Mortar => "mortar",
            Self::Flame => "flame",
            Self::Missile => "missile",
            Self::Venom => "venom",
            Self::Tesla => "tesla",
            Self::Gravity => "gravity",
            Self::Laser => "laser",
        }
    }
}

/// Template an enemy is created from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyTypeSpec {
    /// Base health before wave scaling.
    pub health: f32,
    /// Movement per tick in world units.
    pub speed: f32,
    /// Collision and display radius.
    pub radius: f32,
    /// Display color.
    pub color: Rgb,
}

/// Kinds of enemies that walk the path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    /// Baseline enemy.
    Grunt,
    /// Fast and fragile.
    Runner,
    /// Slow and sturdy.
    Brute,
    /// Injected on boss waves.
    Boss,
}

impl EnemyKind {
    /// Template of the kind.
    #[must_use]
    pub const fn spec(self) -> EnemyTypeSpec {
        match self {
            Self::Grunt => EnemyTypeSpec {
                health: 100.0,
                speed: 1.0,
                radius: 10.0,
                color: Rgb::new(220, 40, 40),
            },
            Self::Runner => EnemyTypeSpec {
                health: 60.0,
                speed: 2.0,
                radius: 8.0,
                color: Rgb::new(240, 220, 40),
            },
            Self::Brute => EnemyTypeSpec {
                health: 250.0,
                speed: 0.6,
                radius: 14.0,
                color: Rgb::new(140, 60, 200),
            },
            Self::Boss => EnemyTypeSpec {
                health: 1_000.0,
                speed: 0.5,
                radius: 20.0,
                color: Rgb::new(120, 0, 0),
            },
        }
    }

    /// First wave on which the kind may appear among regular spawns.
    #[must_use]
    pub const fn first_wave(self) -> u32 {
        match self {
            Self::Grunt => 1,
            Self::Runner => 3,
            Self::Brute => 6,
            Self::Boss => u32::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Ability, EnemyKind, TargetingPolicy, TowerKind};
    use std::time::Duration;

    #[test]
    fn every_ability_is_covered_once() {
        let mut abilities: Vec<Ability> = TowerKind::ALL.iter().map(|kind| kind.ability()).collect();
        abilities.sort();
        abilities.dedup();
        assert_eq!(abilities.len(), TowerKind::ALL.len());
    }

    #[test]
    fn only_basic_is_free_to_unlock() {
        for kind in TowerKind::ALL {
            let free = kind.stats().unlock_cost == 0;
            assert_eq!(free, kind == TowerKind::Basic, "{kind:?}");
        }
    }

    #[test]
    fn upgrade_cost_scales_with_level() {
        assert_eq!(TowerKind::Basic.upgrade_cost(1), 25);
        assert_eq!(TowerKind::Basic.upgrade_cost(2), 50);
        assert_eq!(TowerKind::Laser.upgrade_cost(3), 300);
    }

    #[test]
    fn targeting_follows_ability() {
        assert_eq!(
            TowerKind::Missile.ability().targeting(),
            TargetingPolicy::Strongest
        );
        assert_eq!(
            TowerKind::Laser.ability().targeting(),
            TargetingPolicy::AllInRange
        );
        assert_eq!(
            TowerKind::Cannon.ability().targeting(),
            TargetingPolicy::FirstInRange
        );
        assert_eq!(Ability::MultiShot.projectiles_per_shot(), 2);
        assert_eq!(
            Ability::Pull.activation_period(),
            Some(Duration::from_millis(5_000))
        );
    }

    #[test]
    fn boss_never_joins_regular_rosters() {
        assert!(EnemyKind::Boss.first_wave() > 1_000);
        assert!(EnemyKind::Boss.spec().radius > EnemyKind::Grunt.spec().radius);
    }
}
