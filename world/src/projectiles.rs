//! Homing projectiles in flight.

use waveguard_core::{
    Ability, EnemyId, Impact, Point, ProjectileId, ProjectileSnapshot, TowerId,
};

/// Outcome of moving a projectile for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Flight {
    InFlight,
    Arrived,
}

/// What a tower loads into each projectile it launches.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Payload {
    pub(crate) origin: Point,
    pub(crate) damage: f32,
    pub(crate) speed: f32,
    pub(crate) ability: Ability,
}

#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) tower: TowerId,
    pub(crate) target: EnemyId,
    pub(crate) position: Point,
    pub(crate) damage: f32,
    pub(crate) speed: f32,
    pub(crate) ability: Ability,
    /// Tower position captured at launch; pull impacts drag toward it.
    pub(crate) origin: Point,
}

impl Projectile {
    pub(crate) fn launch(id: ProjectileId, tower: TowerId, target: EnemyId, payload: Payload) -> Self {
        Self {
            id,
            tower,
            target,
            position: payload.origin,
            damage: payload.damage,
            speed: payload.speed,
            ability: payload.ability,
            origin: payload.origin,
        }
    }

    /// Re-aims at the target's current position and moves one tick.
    ///
    /// Arrival means the target lies within this tick's travel distance.
    pub(crate) fn advance(&mut self, target: Point, speed_factor: f32) -> Flight {
        let step = self.speed * speed_factor;
        if self.position.distance(target) <= step {
            self.position = target;
            Flight::Arrived
        } else {
            self.position = self.position.step_toward(target, step);
            Flight::InFlight
        }
    }

    pub(crate) fn impact(&self) -> Impact {
        Impact {
            projectile: self.id,
            tower: self.tower,
            target: self.target,
            ability: self.ability,
            damage: self.damage,
            point: self.position,
            origin: self.origin,
        }
    }

    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            tower: self.tower,
            target: self.target,
            position: self.position,
            ability: self.ability,
        }
    }
}
