#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits firing commands from targeting data.

use waveguard_core::{
    Ability, Command, EnemyId, MatchPhase, TowerCooldownView, TowerId, TowerTarget,
};

/// Tower combat system that queues firing commands for ready towers.
#[derive(Debug, Default)]
pub struct TowerCombat {
    scratch: Vec<Command>,
    victims: Vec<EnemyId>,
}

impl TowerCombat {
    /// Creates a new tower combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits firing commands for towers ready to act.
    ///
    /// Projectile towers emit `Command::FireProjectile` for their assigned
    /// target. Beam towers open a new window with `Command::ActivateBeam` when
    /// ready, then drain every assigned enemy while the window is open. Pull
    /// towers emit a single `Command::EmitPull` covering every assigned enemy.
    pub fn handle(
        &mut self,
        phase: MatchPhase,
        tower_cooldowns: TowerCooldownView,
        tower_targets: &[TowerTarget],
        out: &mut Vec<Command>,
    ) {
        if phase != MatchPhase::Running {
            return;
        }

        let cooldowns = tower_cooldowns.into_vec();
        if cooldowns.is_empty() {
            return;
        }

        self.scratch.clear();

        for snapshot in &cooldowns {
            let ready = snapshot.ready_in.is_zero();
            match snapshot.ability {
                Ability::Beam => {
                    if ready {
                        self.scratch.push(Command::ActivateBeam {
                            tower: snapshot.tower,
                        });
                    }
                    if (ready || snapshot.beam_active)
                        && self.collect_victims(snapshot.tower, tower_targets)
                    {
                        self.scratch.push(Command::DrainBeam {
                            tower: snapshot.tower,
                            targets: self.victims.clone(),
                        });
                    }
                }
                Ability::Pull => {
                    if ready && self.collect_victims(snapshot.tower, tower_targets) {
                        self.scratch.push(Command::EmitPull {
                            tower: snapshot.tower,
                            targets: self.victims.clone(),
                        });
                    }
                }
                _ => {
                    if !ready {
                        continue;
                    }
                    if let Some(target) = tower_targets
                        .iter()
                        .find(|target| target.tower == snapshot.tower)
                    {
                        self.scratch.push(Command::FireProjectile {
                            tower: snapshot.tower,
                            target: target.enemy,
                        });
                    }
                }
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }

    /// Gathers every enemy assigned to `tower`, reporting whether any were found.
    fn collect_victims(&mut self, tower: TowerId, tower_targets: &[TowerTarget]) -> bool {
        self.victims.clear();
        self.victims.extend(
            tower_targets
                .iter()
                .filter(|target| target.tower == tower)
                .map(|target| target.enemy),
        );
        !self.victims.is_empty()
    }
}
