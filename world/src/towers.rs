//! Authoritative tower state management utilities.

use std::{collections::BTreeMap, time::Duration};

use waveguard_core::{
    catalog::BEAM_ACTIVE_WINDOW, Ability, GameSpeed, Point, TowerCooldownSnapshot, TowerId,
    TowerKind, TowerSnapshot,
};

const UPGRADE_DAMAGE: f32 = 5.0;
const UPGRADE_RANGE: f32 = 10.0;
const UPGRADE_INTERVAL_STEP: Duration = Duration::from_millis(200);
const MIN_FIRE_INTERVAL: Duration = Duration::from_millis(500);

/// Snapshot of a tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Kind of tower that was constructed.
    pub(crate) kind: TowerKind,
    /// Centre of the tower in world units.
    pub(crate) position: Point,
    pub(crate) level: u32,
    pub(crate) damage: f32,
    pub(crate) range: f32,
    pub(crate) fire_interval: Duration,
    pub(crate) projectile_speed: f32,
    pub(crate) ability: Ability,
    pub(crate) angle: f32,
    /// Simulated time of the last shot or activation; `None` until the first one.
    last_shot: Option<Duration>,
    beam_until: Duration,
}

impl TowerState {
    fn new(id: TowerId, kind: TowerKind, position: Point) -> Self {
        let stats = kind.stats();
        Self {
            id,
            kind,
            position,
            level: 1,
            damage: stats.damage,
            range: stats.range,
            fire_interval: stats.fire_interval,
            projectile_speed: stats.projectile_speed,
            ability: stats.ability,
            angle: 0.0,
            last_shot: None,
            beam_until: Duration::ZERO,
        }
    }

    /// Interval gating shots, or activations for window-based abilities.
    fn gate_interval(&self) -> Duration {
        self.ability
            .activation_period()
            .unwrap_or(self.fire_interval)
    }

    /// Remaining simulated time before the tower may act again.
    pub(crate) fn ready_in(&self, now: Duration, speed: GameSpeed) -> Duration {
        match self.last_shot {
            None => Duration::ZERO,
            Some(last_shot) => last_shot
                .saturating_add(speed.shorten(self.gate_interval()))
                .saturating_sub(now),
        }
    }

    pub(crate) fn is_ready(&self, now: Duration, speed: GameSpeed) -> bool {
        self.ready_in(now, speed).is_zero()
    }

    pub(crate) fn in_range(&self, point: Point) -> bool {
        self.position.distance(point) <= self.range
    }

    pub(crate) fn record_shot(&mut self, now: Duration) {
        self.last_shot = Some(self.last_shot.map_or(now, |last| last.max(now)));
    }

    pub(crate) fn face(&mut self, target: Point) {
        self.angle = self.position.angle_to(target);
    }

    /// Opens the beam window and returns the time it closes.
    pub(crate) fn activate_beam(&mut self, now: Duration, speed: GameSpeed) -> Duration {
        self.record_shot(now);
        self.beam_until = now.saturating_add(speed.shorten(BEAM_ACTIVE_WINDOW));
        self.beam_until
    }

    pub(crate) fn beam_active(&self, now: Duration) -> bool {
        self.ability == Ability::Beam && now < self.beam_until
    }

    pub(crate) fn upgrade(&mut self) {
        self.level += 1;
        self.damage += UPGRADE_DAMAGE;
        self.range += UPGRADE_RANGE;
        self.fire_interval = self
            .fire_interval
            .saturating_sub(UPGRADE_INTERVAL_STEP)
            .max(MIN_FIRE_INTERVAL);
    }

    pub(crate) fn upgrade_cost(&self) -> u64 {
        self.kind.upgrade_cost(self.level)
    }

    pub(crate) fn snapshot(&self, now: Duration, selected: bool) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            level: self.level,
            damage: self.damage,
            range: self.range,
            fire_interval: self.fire_interval,
            angle: self.angle,
            selected,
            beam_active: self.beam_active(now),
        }
    }

    pub(crate) fn cooldown(&self, now: Duration, speed: GameSpeed) -> TowerCooldownSnapshot {
        TowerCooldownSnapshot {
            tower: self.id,
            ability: self.ability,
            ready_in: self.ready_in(now, speed),
            beam_active: self.beam_active(now),
        }
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Stores a freshly placed tower and returns its identifier.
    pub(crate) fn insert(&mut self, kind: TowerKind, position: Point) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().saturating_add(1));
        let _ = self
            .entries
            .insert(id, TowerState::new(id, kind, position));
        id
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn contains(&self, id: TowerId) -> bool {
        self.entries.contains_key(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }

    /// Reports whether any tower stands strictly closer than `separation`.
    pub(crate) fn crowds(&self, position: Point, separation: f32) -> bool {
        self.entries
            .values()
            .any(|tower| tower.position.distance(position) < separation)
    }
}
