#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits projectile firing commands for ready towers.

use std::time::Duration;

use tower_defense_core::{Command, EnemyId, EnemyView, TowerView};

/// Tower combat system that queues firing commands for ready towers.
#[derive(Debug, Default)]
pub struct TowerCombat {
    scratch: Vec<Command>,
}

impl TowerCombat {
    /// Creates a new tower combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::FireProjectile` entries for towers ready to fire at `now`.
    ///
    /// Each ready tower engages the first enemy within range in the view's
    /// iteration order and fires at most once per call.
    pub fn handle(
        &mut self,
        now: Duration,
        towers: &TowerView,
        enemies: &EnemyView,
        out: &mut Vec<Command>,
    ) {
        if towers.is_empty() || enemies.is_empty() {
            return;
        }

        self.scratch.clear();

        for tower in towers.iter() {
            if !tower.is_ready(now) {
                continue;
            }

            let target: Option<EnemyId> = enemies
                .iter()
                .find(|enemy| tower.in_range(enemy.position))
                .map(|enemy| enemy.id);

            if let Some(target) = target {
                self.scratch.push(Command::FireProjectile {
                    tower: tower.id,
                    target,
                });
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}
