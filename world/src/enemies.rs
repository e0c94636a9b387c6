//! Enemy state owned by the world.

use std::time::Duration;

use waveguard_core::{EnemyId, EnemyKind, EnemySnapshot, Point, Rgb, StatusEffect};

const SLOW_FACTOR: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq)]
struct DamageOverTime {
    remaining: Duration,
    damage_per_second: f32,
}

impl DamageOverTime {
    /// Accumulates this tick's damage and counts the timer down.
    fn tick(slot: &mut Option<Self>, elapsed: Duration, tick_fraction: f32) -> f32 {
        let Some(effect) = slot.as_mut() else {
            return 0.0;
        };

        let damage = effect.damage_per_second * tick_fraction;
        effect.remaining = effect.remaining.saturating_sub(elapsed);
        if effect.remaining.is_zero() {
            *slot = None;
        }
        damage
    }
}

/// Enemy walking the map path.
#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) kind: EnemyKind,
    pub(crate) position: Point,
    pub(crate) path_index: usize,
    pub(crate) health: f32,
    pub(crate) max_health: f32,
    pub(crate) speed: f32,
    pub(crate) radius: f32,
    pub(crate) color: Rgb,
    slow: Option<Duration>,
    burn: Option<DamageOverTime>,
    poison: Option<DamageOverTime>,
}

impl Enemy {
    /// Creates an enemy at the start of the path heading for the second point.
    pub(crate) fn spawn(id: EnemyId, kind: EnemyKind, health: f32, at: Point) -> Self {
        let spec = kind.spec();
        Self {
            id,
            kind,
            position: at,
            path_index: 1,
            health,
            max_health: health,
            speed: spec.speed,
            radius: spec.radius,
            color: spec.color,
            slow: None,
            burn: None,
            poison: None,
        }
    }

    pub(crate) fn is_slowed(&self) -> bool {
        self.slow.is_some()
    }

    /// Movement per tick after the slow effect, before speed scaling.
    pub(crate) fn effective_speed(&self) -> f32 {
        if self.is_slowed() {
            self.speed * SLOW_FACTOR
        } else {
            self.speed
        }
    }

    /// Moves the enemy along `path` and reports whether it walked off the end.
    ///
    /// A waypoint closer than this tick's travel distance is snapped to
    /// without carrying the remainder over to the next segment.
    pub(crate) fn advance(&mut self, path: &[Point], speed_factor: f32) -> bool {
        let Some(waypoint) = path.get(self.path_index).copied() else {
            return true;
        };

        let step = self.effective_speed() * speed_factor;
        if self.position.distance(waypoint) < step {
            self.position = waypoint;
            self.path_index += 1;
        } else {
            self.position = self.position.step_toward(waypoint, step);
        }

        self.path_index >= path.len()
    }

    /// Counts status timers down by `elapsed` and returns the damage owed this tick.
    ///
    /// `tick_fraction` is the share of a second one tick represents after speed
    /// scaling. Damage is returned rather than applied so the caller can credit
    /// kills.
    pub(crate) fn apply_status_tick(&mut self, elapsed: Duration, tick_fraction: f32) -> f32 {
        if let Some(remaining) = self.slow.as_mut() {
            *remaining = remaining.saturating_sub(elapsed);
            if remaining.is_zero() {
                self.slow = None;
            }
        }

        DamageOverTime::tick(&mut self.burn, elapsed, tick_fraction)
            + DamageOverTime::tick(&mut self.poison, elapsed, tick_fraction)
    }

    /// Subtracts health and reports whether the hit was lethal.
    pub(crate) fn take_damage(&mut self, amount: f32) -> bool {
        self.health -= amount;
        self.health <= 0.0
    }

    /// Applies a status effect, returning `false` when a non-stacking effect is resisted.
    pub(crate) fn apply_status(&mut self, effect: StatusEffect) -> bool {
        match effect {
            StatusEffect::Slow { duration } => {
                self.slow = Some(duration);
                true
            }
            StatusEffect::Burn {
                duration,
                damage_per_second,
            } => Self::start_damage_over_time(&mut self.burn, duration, damage_per_second),
            StatusEffect::Poison {
                duration,
                damage_per_second,
            } => Self::start_damage_over_time(&mut self.poison, duration, damage_per_second),
        }
    }

    fn start_damage_over_time(
        slot: &mut Option<DamageOverTime>,
        duration: Duration,
        damage_per_second: f32,
    ) -> bool {
        if slot.is_some() {
            return false;
        }
        *slot = Some(DamageOverTime {
            remaining: duration,
            damage_per_second,
        });
        true
    }

    /// Drags the enemy toward `toward` without passing it. Path progress is kept.
    pub(crate) fn displace_toward(&mut self, toward: Point, distance: f32) -> Point {
        self.position = self.position.step_toward(toward, distance);
        self.position
    }

    pub(crate) fn snapshot(&self, strongest: bool) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            path_index: self.path_index,
            health: self.health,
            max_health: self.max_health,
            speed: self.speed,
            radius: self.radius,
            color: self.color,
            slowed: self.is_slowed(),
            burning: self.burn.is_some(),
            poisoned: self.poison.is_some(),
            strongest,
        }
    }

    #[cfg(test)]
    pub(crate) fn burn_remaining(&self) -> Option<Duration> {
        self.burn.map(|burn| burn.remaining)
    }
}
