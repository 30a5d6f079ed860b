#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Tower Defense.
//!
//! The world owns every tower, enemy and projectile together with the
//! economy counters. It mutates exclusively through [`apply`] and reports
//! what happened through [`Event`] values; read access goes through the
//! [`query`] module.

mod economy;
mod enemies;
mod projectiles;
mod towers;

use std::time::Duration;

use log::{debug, info};
use tower_defense_core::{
    CellCoord, Command, EnemyId, Event, GameStatus, Health, Path, PlacementError, Rules, RulesError,
    TowerId, WELCOME_BANNER,
};

use crate::{
    economy::Economy,
    enemies::{Advance, Enemy, EnemyRegistry},
    projectiles::{HitResult, ProjectileRegistry},
    towers::{TowerRegistry, TowerState},
};

/// Represents the authoritative Tower Defense world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    rules: Rules,
    path: Path,
    enemies: EnemyRegistry,
    towers: TowerRegistry,
    projectiles: ProjectileRegistry,
    economy: Economy,
    status: GameStatus,
    clock: Duration,
}

impl World {
    /// Creates a world using the default rules and path.
    #[must_use]
    pub fn new() -> Self {
        Self::from_parts(Rules::default(), Path::default())
    }

    /// Creates a world using custom rules and path.
    pub fn with_rules(rules: Rules, path: Path) -> Result<Self, RulesError> {
        rules.validate()?;
        Ok(Self::from_parts(rules, path))
    }

    fn from_parts(rules: Rules, path: Path) -> Self {
        let economy = Economy::new(rules.starting_money, rules.leak_limit);
        Self {
            banner: WELCOME_BANNER,
            rules,
            path,
            enemies: EnemyRegistry::new(),
            towers: TowerRegistry::new(),
            projectiles: ProjectileRegistry::new(),
            economy,
            status: GameStatus::Running,
            clock: Duration::ZERO,
        }
    }

    fn advance_clock(&mut self, now: Duration, out_events: &mut Vec<Event>) {
        let dt = now.saturating_sub(self.clock);
        self.clock = self.clock.max(now);
        out_events.push(Event::TimeAdvanced {
            now: self.clock,
            dt,
        });
    }

    fn spawn_enemy(&mut self, out_events: &mut Vec<Event>) {
        if self.status == GameStatus::Over {
            debug!("spawn ignored: run is over");
            return;
        }

        let enemy = Enemy::spawn(
            &self.path,
            Health::new(self.rules.enemy_health),
            self.rules.enemy_speed,
        );
        let position = enemy.position();
        let id = self.enemies.insert(enemy);
        out_events.push(Event::EnemySpawned {
            enemy: id,
            position,
        });
    }

    fn place_tower(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        let anchor = cell.anchor(self.rules.grid_size, self.rules.tower_anchor_offset);
        let rejection = if !self.economy.can_afford(self.rules.tower_cost) {
            Some(PlacementError::InsufficientFunds {
                required: self.rules.tower_cost,
                available: self.economy.money(),
            })
        } else if self.towers.occupies(anchor) {
            Some(PlacementError::Occupied)
        } else {
            None
        };

        if let Some(reason) = rejection {
            debug!("placement at {cell:?} rejected: {reason}");
            out_events.push(Event::TowerPlacementRejected { cell, reason });
            return;
        }

        self.economy.debit(self.rules.tower_cost);
        let tower = self.towers.insert(TowerState {
            cell,
            position: anchor,
            range: self.rules.tower_range,
            cooldown: self.rules.tower_cooldown,
            last_fired_at: self.clock,
        });
        debug!("tower {} placed at {cell:?}", tower.get());
        out_events.push(Event::TowerPlaced {
            tower,
            cell,
            position: anchor,
        });
    }

    fn fire_projectile(&mut self, tower: TowerId, target: EnemyId, out_events: &mut Vec<Event>) {
        if self.enemies.get(target).is_none() {
            debug!("tower {} cannot fire at a missing enemy", tower.get());
            return;
        }

        let now = self.clock;
        let speed = self.rules.projectile_speed;
        let Some(state) = self.towers.get_mut(tower) else {
            return;
        };
        if !state.is_ready(now) {
            return;
        }

        state.last_fired_at = now;
        let projectile = self.projectiles.fire(state.position, speed, target);
        out_events.push(Event::ProjectileFired {
            projectile,
            tower,
            target,
        });
    }

    fn advance_projectiles(&mut self, out_events: &mut Vec<Event>) {
        let hit_radius = self.rules.hit_radius();
        let damage = self.rules.projectile_damage;
        let mut spent = Vec::new();

        for projectile in self.projectiles.iter_mut() {
            let Some(enemy) = self.enemies.get_mut(projectile.target()) else {
                debug!("projectile {} lost its target", projectile.id().get());
                spent.push(projectile.id());
                out_events.push(Event::ProjectileDiscarded {
                    projectile: projectile.id(),
                    target: projectile.target(),
                });
                continue;
            };

            if projectile.advance(enemy.position(), hit_radius) == HitResult::Hit {
                enemy.apply_damage(damage);
                spent.push(projectile.id());
                out_events.push(Event::ProjectileHit {
                    projectile: projectile.id(),
                    enemy: projectile.target(),
                    remaining: enemy.health(),
                });
            }
        }

        self.projectiles.remove_all(&spent);
    }

    fn advance_enemies(&mut self, out_events: &mut Vec<Event>) {
        if self.status == GameStatus::Over {
            return;
        }
        if self.economy.leak_limit_reached() {
            self.end_run(out_events);
            return;
        }

        let mut removed = Vec::new();
        for index in 0..self.enemies.len() {
            let Some(id) = self.enemies.id_at(index) else {
                break;
            };
            let Some(enemy) = self.enemies.get_mut(id) else {
                continue;
            };

            let advance = enemy.advance(&self.path);
            let depleted = enemy.health().is_depleted();

            if advance == Advance::ReachedEnd {
                removed.push(id);
                let leaked_count = self.economy.record_leak();
                out_events.push(Event::EnemyLeaked {
                    enemy: id,
                    leaked_count,
                });
                if self.economy.leak_limit_reached() {
                    self.end_run(out_events);
                    break;
                }
            } else if depleted {
                removed.push(id);
                self.economy.record_kill(self.rules.enemy_reward);
                out_events.push(Event::EnemyKilled {
                    enemy: id,
                    reward: self.rules.enemy_reward,
                });
            }
        }

        self.enemies.remove_all(&removed);
    }

    fn end_run(&mut self, out_events: &mut Vec<Event>) {
        self.status = GameStatus::Over;
        let leaked_count = self.economy.leaked_count();
        info!("game over after {leaked_count} leaked enemies");
        out_events.push(Event::GameOver { leaked_count });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { now } => world.advance_clock(now, out_events),
        Command::SpawnEnemy => world.spawn_enemy(out_events),
        Command::PlaceTower { cell } => world.place_tower(cell, out_events),
        Command::FireProjectile { tower, target } => {
            world.fire_projectile(tower, target, out_events);
        }
        Command::AdvanceProjectiles => world.advance_projectiles(out_events),
        Command::AdvanceEnemies => world.advance_enemies(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use tower_defense_core::{
        CellCoord, EconomySnapshot, EnemyView, GameStatus, Path, ProjectileView, Rules, TowerId,
        TowerView,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Rules the world was created with.
    #[must_use]
    pub fn rules(world: &World) -> &Rules {
        &world.rules
    }

    /// Route enemies walk along.
    #[must_use]
    pub fn path(world: &World) -> &Path {
        &world.path
    }

    /// Latest timestamp the world clock advanced to.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Current lifecycle state of the run.
    #[must_use]
    pub fn status(world: &World) -> GameStatus {
        world.status
    }

    /// Reports whether the run has ended.
    #[must_use]
    pub fn is_over(world: &World) -> bool {
        world.status == GameStatus::Over
    }

    /// Captures money, kills and leaks.
    #[must_use]
    pub fn economy(world: &World) -> EconomySnapshot {
        world.economy.snapshot()
    }

    /// Captures a read-only view of the enemies in spawn order.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.snapshots())
    }

    /// Captures a read-only view of the placed towers.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.snapshots())
    }

    /// Captures a read-only view of the projectiles in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        ProjectileView::from_snapshots(world.projectiles.snapshots())
    }

    /// Returns the tower hosted by `cell`, if any.
    #[must_use]
    pub fn tower_at(world: &World, cell: CellCoord) -> Option<TowerId> {
        world.towers.tower_at(cell)
    }

    /// Reports whether the tower exists and its cooldown elapsed.
    #[must_use]
    pub fn tower_ready(world: &World, tower: TowerId) -> bool {
        world
            .towers
            .get(tower)
            .map_or(false, |state| state.is_ready(world.clock))
    }
}
