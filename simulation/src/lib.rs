#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame-level orchestration of the Tower Defense world.
//!
//! [`Simulation`] is the seam between adapters and the authoritative
//! [`World`]. Adapters forward one [`Simulation::tick`] per frame together
//! with spawn timer expirations and placement requests, then read snapshots
//! to build their scene and drain the recorded events to trigger cues.
//!
//! Every tick applies its phases in a fixed order: the clock advances, ready
//! towers fire, projectiles move and collide, and finally enemies walk and
//! the end condition is evaluated.

use std::time::Duration;

use log::debug;
use tower_defense_core::{
    CellCoord, Command, EconomySnapshot, EnemyId, EnemyView, Event, GameStatus, Path,
    PlacementError, ProjectileView, Rules, RulesError, TowerId, TowerView,
};
use tower_defense_system_tower_combat::TowerCombat;
use tower_defense_world::{self as world, query, World};

/// Owns the world together with the systems that drive it every frame.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    tower_combat: TowerCombat,
    commands: Vec<Command>,
    events: Vec<Event>,
}

impl Simulation {
    /// Creates a simulation running the default rules on the default path.
    #[must_use]
    pub fn new() -> Self {
        Self::from_world(World::new())
    }

    /// Creates a simulation with custom rules and path.
    pub fn with_rules(rules: Rules, path: Path) -> Result<Self, RulesError> {
        World::with_rules(rules, path).map(Self::from_world)
    }

    fn from_world(world: World) -> Self {
        Self {
            world,
            tower_combat: TowerCombat::new(),
            commands: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Advances the simulation to `now`, running every phase once.
    ///
    /// Timestamps earlier than the current clock leave the clock untouched;
    /// the remaining phases still run.
    pub fn tick(&mut self, now: Duration) {
        self.apply(Command::Tick { now });

        let towers = query::tower_view(&self.world);
        let enemies = query::enemy_view(&self.world);
        self.tower_combat.handle(
            query::clock(&self.world),
            &towers,
            &enemies,
            &mut self.commands,
        );
        for command in std::mem::take(&mut self.commands) {
            self.apply(command);
        }

        self.apply(Command::AdvanceProjectiles);
        self.apply(Command::AdvanceEnemies);
    }

    fn apply(&mut self, command: Command) {
        world::apply(&mut self.world, command, &mut self.events);
    }

    /// Spawns an enemy at the start of the path.
    ///
    /// Returns `None` once the run is over.
    pub fn spawn_timer_fired(&mut self) -> Option<EnemyId> {
        let start = self.events.len();
        self.apply(Command::SpawnEnemy);

        self.events[start..].iter().find_map(|event| match event {
            Event::EnemySpawned { enemy, .. } => Some(*enemy),
            _ => None,
        })
    }

    /// Attempts to build a tower on `cell`.
    pub fn request_placement(&mut self, cell: CellCoord) -> Result<TowerId, PlacementError> {
        let start = self.events.len();
        self.apply(Command::PlaceTower { cell });

        let outcome = self.events[start..].iter().find_map(|event| match event {
            Event::TowerPlaced { tower, .. } => Some(Ok(*tower)),
            Event::TowerPlacementRejected { reason, .. } => Some(Err(*reason)),
            _ => None,
        });

        outcome.unwrap_or_else(|| {
            debug!("placement at {cell:?} produced no outcome");
            Err(PlacementError::InsufficientFunds {
                required: query::rules(&self.world).tower_cost,
                available: query::economy(&self.world).money,
            })
        })
    }

    /// Enemies in spawn order.
    #[must_use]
    pub fn enemies(&self) -> EnemyView {
        query::enemy_view(&self.world)
    }

    /// Placed towers ordered by identifier.
    #[must_use]
    pub fn towers(&self) -> TowerView {
        query::tower_view(&self.world)
    }

    /// Projectiles currently in flight.
    #[must_use]
    pub fn projectiles(&self) -> ProjectileView {
        query::projectile_view(&self.world)
    }

    /// Money, kills and leaks.
    #[must_use]
    pub fn economy(&self) -> EconomySnapshot {
        query::economy(&self.world)
    }

    /// Route enemies walk along.
    #[must_use]
    pub fn path(&self) -> &Path {
        query::path(&self.world)
    }

    /// Rules the run was created with.
    #[must_use]
    pub fn rules(&self) -> &Rules {
        query::rules(&self.world)
    }

    /// Lifecycle state of the run.
    #[must_use]
    pub fn status(&self) -> GameStatus {
        query::status(&self.world)
    }

    /// Reports whether the leak limit ended the run.
    #[must_use]
    pub fn is_over(&self) -> bool {
        query::is_over(&self.world)
    }

    /// Latest timestamp the simulation advanced to.
    #[must_use]
    pub fn clock(&self) -> Duration {
        query::clock(&self.world)
    }

    /// Read-only access to the underlying world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Events recorded since the last drain, oldest first.
    #[must_use]
    pub fn pending_events(&self) -> &[Event] {
        &self.events
    }

    /// Takes every event recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}
