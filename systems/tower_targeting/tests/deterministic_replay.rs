use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use waveguard_core::{Command, EnemyKind, MatchSetup, Point, TowerKind, TowerTarget};
use waveguard_system_tower_targeting::TowerTargeting;
use waveguard_world::{self as world, query, World, WorldSettings};

#[test]
fn deterministic_replay_tracks_spawn_order_and_pause() {
    let script = scripted_commands();
    let script_len = script.len();
    let first = replay(script.clone());
    let second = replay(script);

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert_eq!(first.assignments.len(), script_len);

    let after_spawns = &first.assignments[3];
    assert_eq!(after_spawns.len(), 2, "both towers must acquire a target");
    assert!(
        after_spawns.iter().all(|(_, enemy)| *enemy == 0),
        "first spawned enemy wins ties"
    );

    let paused = &first.assignments[4];
    assert!(paused.is_empty(), "paused matches must clear targets");

    let resumed = &first.assignments[5];
    assert_eq!(resumed, after_spawns);
}

fn replay(commands: Vec<Command>) -> ReplayOutcome {
    let mut world = World::new(WorldSettings {
        starting_money: 1_000,
        ..WorldSettings::new(MatchSetup::default())
    });
    let mut targeting = TowerTargeting::new();
    let mut current_targets: Vec<TowerTarget> = Vec::new();
    let mut assignments = Vec::new();
    let mut events = Vec::new();

    for command in commands {
        let mut generated = Vec::new();
        world::apply(&mut world, command, &mut generated);
        events.extend(generated.into_iter().map(|event| format!("{event:?}")));

        targeting.handle(
            query::match_phase(&world),
            &query::tower_view(&world),
            &query::enemy_view(&world),
            &mut current_targets,
        );

        assignments.push(
            current_targets
                .iter()
                .map(|target| (target.tower.get(), target.enemy.get()))
                .collect(),
        );
    }

    ReplayOutcome {
        events,
        assignments,
    }
}

fn scripted_commands() -> Vec<Command> {
    vec![
        Command::PlaceTower {
            kind: TowerKind::Basic,
            position: Point::new(40.0, 250.0),
        },
        Command::PlaceTower {
            kind: TowerKind::Missile,
            position: Point::new(40.0, 350.0),
        },
        Command::SpawnEnemy {
            kind: EnemyKind::Grunt,
            health: 100.0,
        },
        Command::SpawnEnemy {
            kind: EnemyKind::Grunt,
            health: 100.0,
        },
        Command::SetPaused { paused: true },
        Command::SetPaused { paused: false },
        Command::Tick {
            dt: Duration::from_millis(16),
        },
    ]
}

#[derive(Debug, PartialEq)]
struct ReplayOutcome {
    events: Vec<String>,
    assignments: Vec<Vec<(u32, u32)>>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.events.hash(&mut hasher);
        self.assignments.hash(&mut hasher);
        hasher.finish()
    }
}
