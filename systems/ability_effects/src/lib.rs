#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that resolves projectile impacts into ability commands.
//!
//! Every [`Ability`] maps to an [`EffectHandler`] through [`effect_handler`].
//! Handlers read the impact and the living enemies and append the state
//! changes they want as commands; the world re-validates every command, so a
//! handler may freely name an enemy that died earlier in the same batch.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use waveguard_core::{
    catalog::{
        AREA_BLAST_FACTOR, AREA_BLAST_RADIUS, CHAIN_FACTOR, CHAIN_JUMPS, CHAIN_RADIUS,
        CRITICAL_HIT_CHANCE, PULL_DISTANCE, SPLASH_FACTOR, SPLASH_RADIUS,
    },
    Ability, Command, EnemyId, EnemyView, Event, Impact, MatchPhase, StatusEffect,
};

/// Read-only state and randomness available to an effect handler.
#[derive(Debug)]
pub struct EffectContext<'a> {
    /// Living enemies captured after projectiles advanced.
    pub enemies: &'a EnemyView,
    /// Deterministic random source shared by all handlers.
    pub rng: &'a mut ChaCha8Rng,
}

/// Resolves one impact into zero or more commands.
pub type EffectHandler = fn(&Impact, &mut EffectContext<'_>, &mut Vec<Command>);

/// Looks up the handler responsible for the provided ability.
#[must_use]
pub fn effect_handler(ability: Ability) -> EffectHandler {
    match ability {
        Ability::None | Ability::MultiShot | Ability::HomingMissile | Ability::Beam => no_effect,
        Ability::Splash => splash,
        Ability::CriticalHit => critical_hit,
        Ability::Slow => slow,
        Ability::AreaBlast => area_blast,
        Ability::Burn => burn,
        Ability::PoisonCloud => poison_cloud,
        Ability::ChainLightning => chain_lightning,
        Ability::Pull => pull,
    }
}

/// Ability resolution system holding the deterministic random stream.
#[derive(Debug)]
pub struct AbilityEffects {
    rng: ChaCha8Rng,
}

impl AbilityEffects {
    /// Creates a new system whose random stream derives from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Dispatches every `Event::ProjectileImpacted` to its ability handler.
    pub fn handle(
        &mut self,
        phase: MatchPhase,
        events: &[Event],
        enemies: &EnemyView,
        out: &mut Vec<Command>,
    ) {
        if phase != MatchPhase::Running {
            return;
        }

        let mut context = EffectContext {
            enemies,
            rng: &mut self.rng,
        };
        for event in events {
            if let Event::ProjectileImpacted { impact } = event {
                effect_handler(impact.ability)(impact, &mut context, out);
            }
        }
    }
}

fn no_effect(_: &Impact, _: &mut EffectContext<'_>, _: &mut Vec<Command>) {}

fn splash(impact: &Impact, context: &mut EffectContext<'_>, out: &mut Vec<Command>) {
    damage_bystanders(impact, context.enemies, SPLASH_RADIUS, SPLASH_FACTOR, out);
}

fn area_blast(impact: &Impact, context: &mut EffectContext<'_>, out: &mut Vec<Command>) {
    damage_bystanders(
        impact,
        context.enemies,
        AREA_BLAST_RADIUS,
        AREA_BLAST_FACTOR,
        out,
    );
}

/// The primary target already took full damage on arrival, so only others are hit.
fn damage_bystanders(
    impact: &Impact,
    enemies: &EnemyView,
    radius: f32,
    factor: f32,
    out: &mut Vec<Command>,
) {
    let amount = impact.damage * factor;
    for enemy in enemies.iter() {
        if enemy.id != impact.target && enemy.position.distance(impact.point) <= radius {
            out.push(Command::DamageEnemy {
                enemy: enemy.id,
                amount,
            });
        }
    }
}

fn critical_hit(impact: &Impact, context: &mut EffectContext<'_>, out: &mut Vec<Command>) {
    if context.rng.gen_bool(CRITICAL_HIT_CHANCE) {
        out.push(Command::DamageEnemy {
            enemy: impact.target,
            amount: impact.damage,
        });
    }
}

fn slow(impact: &Impact, _: &mut EffectContext<'_>, out: &mut Vec<Command>) {
    out.push(Command::ApplyStatus {
        enemy: impact.target,
        effect: StatusEffect::SLOW,
    });
}

fn burn(impact: &Impact, _: &mut EffectContext<'_>, out: &mut Vec<Command>) {
    out.push(Command::ApplyStatus {
        enemy: impact.target,
        effect: StatusEffect::BURN,
    });
}

fn poison_cloud(impact: &Impact, _: &mut EffectContext<'_>, out: &mut Vec<Command>) {
    out.push(Command::ApplyStatus {
        enemy: impact.target,
        effect: StatusEffect::POISON,
    });
}

fn chain_lightning(impact: &Impact, context: &mut EffectContext<'_>, out: &mut Vec<Command>) {
    let amount = impact.damage * CHAIN_FACTOR;
    let mut struck: Vec<EnemyId> = vec![impact.target];
    let mut from = impact.point;

    for _ in 0..CHAIN_JUMPS {
        let mut nearest = None;
        for enemy in context.enemies.iter() {
            if struck.contains(&enemy.id) {
                continue;
            }
            let distance = from.distance(enemy.position);
            if distance > CHAIN_RADIUS {
                continue;
            }
            match nearest {
                Some((_, _, best)) if best <= distance => {}
                _ => nearest = Some((enemy.id, enemy.position, distance)),
            }
        }

        let Some((enemy, position, _)) = nearest else {
            break;
        };
        out.push(Command::DamageEnemy { enemy, amount });
        struck.push(enemy);
        from = position;
    }
}

fn pull(impact: &Impact, _: &mut EffectContext<'_>, out: &mut Vec<Command>) {
    out.push(Command::DisplaceEnemy {
        enemy: impact.target,
        toward: impact.origin,
        distance: PULL_DISTANCE,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use waveguard_core::{EnemyKind, EnemySnapshot, Point, ProjectileId, Rgb, TowerId};

    fn enemy(id: u32, x: f32, y: f32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Grunt,
            position: Point::new(x, y),
            path_index: 1,
            health: 100.0,
            max_health: 100.0,
            speed: 1.0,
            radius: 10.0,
            color: Rgb::new(0, 0, 0),
            slowed: false,
            burning: false,
            poisoned: false,
            strongest: false,
        }
    }

    fn impact(ability: Ability, target: u32, damage: f32) -> Impact {
        Impact {
            projectile: ProjectileId::new(0),
            tower: TowerId::new(0),
            target: EnemyId::new(target),
            ability,
            damage,
            point: Point::new(0.0, 0.0),
            origin: Point::new(-200.0, 0.0),
        }
    }

    fn resolve(ability: Ability, enemies: &EnemyView, seed: u64) -> Vec<Command> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut context = EffectContext {
            enemies,
            rng: &mut rng,
        };
        let mut out = Vec::new();
        effect_handler(ability)(&impact(ability, 0, 20.0), &mut context, &mut out);
        out
    }

    fn damaged(commands: &[Command]) -> Vec<(u32, f32)> {
        commands
            .iter()
            .filter_map(|command| match command {
                Command::DamageEnemy { enemy, amount } => Some((enemy.get(), *amount)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn plain_abilities_add_nothing() {
        let enemies = EnemyView::from_snapshots(vec![enemy(0, 0.0, 0.0), enemy(1, 5.0, 0.0)]);
        for ability in [
            Ability::None,
            Ability::MultiShot,
            Ability::HomingMissile,
            Ability::Beam,
        ] {
            assert!(resolve(ability, &enemies, 1).is_empty(), "{ability:?}");
        }
    }

    #[test]
    fn splash_hits_bystanders_within_radius() {
        let enemies = EnemyView::from_snapshots(vec![
            enemy(0, 0.0, 0.0),
            enemy(1, 50.0, 0.0),
            enemy(2, 0.0, 51.0),
        ]);

        let commands = resolve(Ability::Splash, &enemies, 1);

        assert_eq!(damaged(&commands), vec![(1, 10.0)]);
    }

    #[test]
    fn area_blast_uses_wider_radius_and_factor() {
        let enemies = EnemyView::from_snapshots(vec![
            enemy(0, 0.0, 0.0),
            enemy(1, 60.0, 0.0),
            enemy(2, 0.0, 75.0),
            enemy(3, 0.0, 76.0),
        ]);

        let commands = resolve(Ability::AreaBlast, &enemies, 1);

        assert_eq!(damaged(&commands), vec![(1, 15.0), (2, 15.0)]);
    }

    #[test]
    fn chain_jumps_to_nearest_unstruck_enemies() {
        let enemies = EnemyView::from_snapshots(vec![
            enemy(0, 0.0, 0.0),
            enemy(1, 90.0, 0.0),
            enemy(2, 30.0, 0.0),
            enemy(3, 150.0, 0.0),
            enemy(4, 400.0, 0.0),
        ]);

        let commands = resolve(Ability::ChainLightning, &enemies, 1);

        assert_eq!(damaged(&commands), vec![(2, 10.0), (1, 10.0)]);
    }

    #[test]
    fn chain_stops_when_nothing_is_close() {
        let enemies = EnemyView::from_snapshots(vec![enemy(0, 0.0, 0.0), enemy(1, 101.0, 0.0)]);
        assert!(resolve(Ability::ChainLightning, &enemies, 1).is_empty());
    }

    #[test]
    fn status_abilities_target_the_primary_enemy() {
        let enemies = EnemyView::from_snapshots(vec![enemy(0, 0.0, 0.0)]);
        for (ability, effect) in [
            (Ability::Slow, StatusEffect::SLOW),
            (Ability::Burn, StatusEffect::BURN),
            (Ability::PoisonCloud, StatusEffect::POISON),
        ] {
            assert_eq!(
                resolve(ability, &enemies, 1),
                vec![Command::ApplyStatus {
                    enemy: EnemyId::new(0),
                    effect,
                }]
            );
        }
    }

    #[test]
    fn pull_drags_toward_the_launch_origin() {
        let enemies = EnemyView::from_snapshots(vec![enemy(0, 0.0, 0.0)]);
        assert_eq!(
            resolve(Ability::Pull, &enemies, 1),
            vec![Command::DisplaceEnemy {
                enemy: EnemyId::new(0),
                toward: Point::new(-200.0, 0.0),
                distance: PULL_DISTANCE,
            }]
        );
    }

    #[test]
    fn critical_hits_land_roughly_one_in_five() {
        let enemies = EnemyView::from_snapshots(vec![enemy(0, 0.0, 0.0)]);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut context = EffectContext {
            enemies: &enemies,
            rng: &mut rng,
        };
        let mut out = Vec::new();
        let hit = impact(Ability::CriticalHit, 0, 40.0);
        for _ in 0..1_000 {
            critical_hit(&hit, &mut context, &mut out);
        }

        assert!((120..=280).contains(&out.len()), "got {}", out.len());
        assert!(out.iter().all(|command| *command
            == Command::DamageEnemy {
                enemy: EnemyId::new(0),
                amount: 40.0,
            }));
    }

    #[test]
    fn handle_is_deterministic_for_a_seed() {
        let enemies = EnemyView::from_snapshots(vec![enemy(0, 0.0, 0.0)]);
        let events: Vec<Event> = (0..50)
            .map(|_| Event::ProjectileImpacted {
                impact: impact(Ability::CriticalHit, 0, 40.0),
            })
            .collect();

        let mut first = Vec::new();
        let mut second = Vec::new();
        AbilityEffects::new(99).handle(MatchPhase::Running, &events, &enemies, &mut first);
        AbilityEffects::new(99).handle(MatchPhase::Running, &events, &enemies, &mut second);
        assert_eq!(first, second);

        let mut paused = Vec::new();
        AbilityEffects::new(99).handle(MatchPhase::Paused, &events, &enemies, &mut paused);
        assert!(paused.is_empty());
    }
}
