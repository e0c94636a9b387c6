#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.
//!
//! Most towers lock onto the first enemy in range in spawn order. Homing
//! towers prefer the enemy with the highest health, and window-based towers
//! (beam and pull) receive one assignment per enemy in range.

use waveguard_core::{
    EnemyId, EnemyView, MatchPhase, Point, TargetingPolicy, TowerTarget, TowerView,
};

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    enemy_workspace: Vec<EnemyCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes tower targets for the provided world snapshot.
    ///
    /// The output buffer is cleared before populating it with the latest
    /// assignments.
    pub fn handle(
        &mut self,
        phase: MatchPhase,
        towers: &TowerView,
        enemies: &EnemyView,
        out: &mut Vec<TowerTarget>,
    ) {
        out.clear();

        if phase != MatchPhase::Running {
            return;
        }

        if towers.iter().next().is_none() || enemies.is_empty() {
            return;
        }

        self.prepare_enemy_workspace(enemies);

        for tower in towers.iter() {
            let mut in_range = self
                .enemy_workspace
                .iter()
                .filter(|candidate| tower.position.distance(candidate.position) <= tower.range);

            let assign = |candidate: &EnemyCandidate| TowerTarget {
                tower: tower.id,
                enemy: candidate.id,
                tower_position: tower.position,
                enemy_position: candidate.position,
            };

            match tower.kind.ability().targeting() {
                TargetingPolicy::FirstInRange => {
                    if let Some(candidate) = in_range.next() {
                        out.push(assign(candidate));
                    }
                }
                TargetingPolicy::Strongest => {
                    let mut best: Option<&EnemyCandidate> = None;
                    for candidate in in_range {
                        match best {
                            Some(existing) if existing.health >= candidate.health => {}
                            _ => best = Some(candidate),
                        }
                    }
                    if let Some(candidate) = best {
                        out.push(assign(candidate));
                    }
                }
                TargetingPolicy::AllInRange => out.extend(in_range.map(assign)),
            }
        }
    }

    fn prepare_enemy_workspace(&mut self, enemies: &EnemyView) {
        self.enemy_workspace.clear();
        self.enemy_workspace.reserve(enemies.len());

        for snapshot in enemies.iter() {
            self.enemy_workspace.push(EnemyCandidate {
                id: snapshot.id,
                position: snapshot.position,
                health: snapshot.health,
            });
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EnemyCandidate {
    id: EnemyId,
    position: Point,
    health: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use waveguard_core::{EnemyKind, EnemySnapshot, Rgb, TowerId, TowerKind, TowerSnapshot};

    #[test]
    fn paused_phase_clears_targets() {
        let mut system = TowerTargeting::new();
        let towers = TowerView::from_snapshots(vec![tower(0, TowerKind::Basic, 0.0, 0.0)]);
        let enemies = EnemyView::from_snapshots(vec![enemy(0, 10.0, 0.0, 100.0)]);
        let mut out = vec![TowerTarget {
            tower: TowerId::new(9),
            enemy: EnemyId::new(9),
            tower_position: Point::default(),
            enemy_position: Point::default(),
        }];

        system.handle(MatchPhase::Paused, &towers, &enemies, &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn first_in_range_follows_spawn_order() {
        let mut system = TowerTargeting::new();
        let towers = TowerView::from_snapshots(vec![tower(0, TowerKind::Basic, 0.0, 0.0)]);
        let enemies = EnemyView::from_snapshots(vec![
            enemy(4, 10.0, 0.0, 100.0),
            enemy(2, 90.0, 0.0, 100.0),
            enemy(1, 150.0, 0.0, 100.0),
        ]);
        let mut out = Vec::new();

        system.handle(MatchPhase::Running, &towers, &enemies, &mut out);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].enemy, EnemyId::new(2));
    }

    #[test]
    fn range_test_is_inclusive() {
        let mut system = TowerTargeting::new();
        let towers = TowerView::from_snapshots(vec![tower(0, TowerKind::Basic, 0.0, 0.0)]);
        let enemies = EnemyView::from_snapshots(vec![
            enemy(0, 100.5, 0.0, 100.0),
            enemy(1, 0.0, 100.0, 100.0),
        ]);
        let mut out = Vec::new();

        system.handle(MatchPhase::Running, &towers, &enemies, &mut out);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].enemy, EnemyId::new(1));
    }

    #[test]
    fn homing_prefers_strongest_with_first_on_ties() {
        let mut system = TowerTargeting::new();
        let towers = TowerView::from_snapshots(vec![tower(0, TowerKind::Missile, 0.0, 0.0)]);
        let enemies = EnemyView::from_snapshots(vec![
            enemy(0, 10.0, 0.0, 50.0),
            enemy(1, 20.0, 0.0, 300.0),
            enemy(2, 30.0, 0.0, 300.0),
            enemy(3, 400.0, 0.0, 900.0),
        ]);
        let mut out = Vec::new();

        system.handle(MatchPhase::Running, &towers, &enemies, &mut out);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].enemy, EnemyId::new(1));
    }

    #[test]
    fn window_towers_receive_every_enemy_in_range() {
        let mut system = TowerTargeting::new();
        let towers = TowerView::from_snapshots(vec![
            tower(0, TowerKind::Laser, 0.0, 0.0),
            tower(1, TowerKind::Basic, 0.0, 0.0),
        ]);
        let enemies = EnemyView::from_snapshots(vec![
            enemy(0, 10.0, 0.0, 50.0),
            enemy(1, 20.0, 0.0, 50.0),
            enemy(2, 500.0, 0.0, 50.0),
        ]);
        let mut out = Vec::new();

        system.handle(MatchPhase::Running, &towers, &enemies, &mut out);

        let assigned: Vec<(TowerId, EnemyId)> =
            out.iter().map(|target| (target.tower, target.enemy)).collect();
        assert_eq!(
            assigned,
            vec![
                (TowerId::new(0), EnemyId::new(0)),
                (TowerId::new(0), EnemyId::new(1)),
                (TowerId::new(1), EnemyId::new(0)),
            ]
        );
    }

    fn tower(id: u32, kind: TowerKind, x: f32, y: f32) -> TowerSnapshot {
        let stats = kind.stats();
        TowerSnapshot {
            id: TowerId::new(id),
            kind,
            position: Point::new(x, y),
            level: 1,
            damage: stats.damage,
            range: stats.range,
            fire_interval: Duration::from_millis(1_000),
            angle: 0.0,
            selected: false,
            beam_active: false,
        }
    }

    fn enemy(id: u32, x: f32, y: f32, health: f32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Grunt,
            position: Point::new(x, y),
            path_index: 1,
            health,
            max_health: health,
            speed: 1.0,
            radius: 10.0,
            color: Rgb::new(0, 0, 0),
            slowed: false,
            burning: false,
            poisoned: false,
            strongest: false,
        }
    }
}
