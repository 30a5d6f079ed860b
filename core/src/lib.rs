#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tower Defense engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values that systems and
//! presentation layers react to. Systems consume event streams, query
//! immutable snapshots, and respond exclusively with new command batches.

mod rules;

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use rules::{Path, Rules, RulesError, DEFAULT_PATH};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Tower Defense.";

slotmap::new_key_type! {
    /// Generational handle addressing an enemy stored in the world.
    ///
    /// Handles of removed enemies never resolve again, even after the
    /// underlying slot is reused.
    pub struct EnemyId;
}

/// Lifecycle of a simulation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// Enemies advance and the run can still be lost.
    Running,
    /// The leak limit was reached; enemies no longer move.
    Over,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock to the provided timestamp.
    Tick {
        /// Time elapsed since the simulation started.
        now: Duration,
    },
    /// Requests that a new enemy enter the path at its first waypoint.
    SpawnEnemy,
    /// Requests placement of a tower inside the provided grid cell.
    PlaceTower {
        /// Grid cell that should host the tower.
        cell: CellCoord,
    },
    /// Requests that a tower fire a projectile at an enemy.
    FireProjectile {
        /// Identifier of the tower firing the shot.
        tower: TowerId,
        /// Enemy the projectile should home in on.
        target: EnemyId,
    },
    /// Moves every projectile toward its target and resolves impacts.
    AdvanceProjectiles,
    /// Moves every enemy along the path and books kills and leaks.
    AdvanceEnemies,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Timestamp the clock advanced to.
        now: Duration,
        /// Duration elapsed since the previous tick.
        dt: Duration,
    },
    /// Confirms that an enemy entered the path.
    EnemySpawned {
        /// Handle assigned to the new enemy.
        enemy: EnemyId,
        /// World-space position the enemy spawned at.
        position: Vec2,
    },
    /// Confirms that a tower was placed into the world.
    TowerPlaced {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Grid cell hosting the tower.
        cell: CellCoord,
        /// World-space anchor the tower sits at.
        position: Vec2,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Cell provided in the placement request.
        cell: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower launched a projectile.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Tower that fired the shot.
        tower: TowerId,
        /// Enemy the projectile is homing in on.
        target: EnemyId,
    },
    /// Reports that a projectile struck its target.
    ProjectileHit {
        /// Projectile that was consumed by the impact.
        projectile: ProjectileId,
        /// Enemy that received the damage.
        enemy: EnemyId,
        /// Health the enemy has left after the impact.
        remaining: Health,
    },
    /// Reports that a projectile was dropped because its target vanished.
    ProjectileDiscarded {
        /// Projectile that was removed without effect.
        projectile: ProjectileId,
        /// Handle of the enemy that no longer exists.
        target: EnemyId,
    },
    /// Reports that an enemy reached the end of the path.
    EnemyLeaked {
        /// Enemy that escaped.
        enemy: EnemyId,
        /// Total number of leaked enemies after this one.
        leaked_count: u32,
    },
    /// Reports that an enemy ran out of health and was removed.
    EnemyKilled {
        /// Enemy that was destroyed.
        enemy: EnemyId,
        /// Money credited for the kill.
        reward: u32,
    },
    /// Announces that the leak limit was reached and the run ended.
    GameOver {
        /// Number of enemies that leaked during the run.
        leaked_count: u32,
    },
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the projectile identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single placement grid cell expressed as column and row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Returns the cell containing the provided world-space point.
    ///
    /// Points left of or above the grid origin, and non-finite points,
    /// belong to no cell.
    #[must_use]
    pub fn containing(point: Vec2, grid_size: f32) -> Option<Self> {
        if !grid_size.is_finite() || grid_size <= 0.0 {
            return None;
        }
        if !point.is_finite() || point.x < 0.0 || point.y < 0.0 {
            return None;
        }

        let column = (point.x / grid_size).floor();
        let row = (point.y / grid_size).floor();
        if column > u32::MAX as f32 || row > u32::MAX as f32 {
            return None;
        }

        Some(Self::new(column as u32, row as u32))
    }

    /// World-space point a tower placed in this cell is anchored at.
    #[must_use]
    pub fn anchor(self, grid_size: f32, offset: f32) -> Vec2 {
        Vec2::new(
            self.column as f32 * grid_size + offset,
            self.row as f32 * grid_size + offset,
        )
    }
}

/// Hit points carried by an enemy. May drop below zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Health(i32);

impl Health {
    /// Creates a new health value.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Retrieves the raw hit point count.
    #[must_use]
    pub const fn get(&self) -> i32 {
        self.0
    }

    /// Reports whether the health has run out.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.0 <= 0
    }

    /// Returns the health left after taking `amount` damage.
    #[must_use]
    pub const fn damaged(self, amount: i32) -> Self {
        Self(self.0.saturating_sub(amount))
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Handle addressing the enemy.
    pub id: EnemyId,
    /// World-space position of the enemy.
    pub position: Vec2,
    /// Health left.
    pub health: Health,
    /// Index of the waypoint the enemy is walking toward.
    pub path_index: usize,
}

/// Read-only snapshot describing all enemies, in registry iteration order.
///
/// Iteration order equals spawn order and drives tower target selection.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view, preserving the order of `snapshots`.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<EnemySnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of enemies captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Grid cell hosting the tower.
    pub cell: CellCoord,
    /// World-space anchor the tower fires from.
    pub position: Vec2,
    /// Maximum distance at which the tower engages enemies.
    pub range: f32,
    /// Minimum time between consecutive shots.
    pub cooldown: Duration,
    /// Timestamp of the last shot, or of placement if the tower never fired.
    pub last_fired_at: Duration,
}

impl TowerSnapshot {
    /// Reports whether the cooldown window has elapsed at `now`.
    #[must_use]
    pub fn is_ready(&self, now: Duration) -> bool {
        now.saturating_sub(self.last_fired_at) >= self.cooldown
    }

    /// Reports whether `point` lies within the tower's range.
    #[must_use]
    pub fn in_range(&self, point: Vec2) -> bool {
        self.position.distance(point) <= self.range
    }
}

/// Read-only snapshot describing all towers placed in the world.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Number of towers captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no towers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single projectile used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier allocated to the projectile.
    pub id: ProjectileId,
    /// World-space position of the projectile.
    pub position: Vec2,
    /// Enemy the projectile is homing in on.
    pub target: EnemyId,
}

/// Read-only snapshot describing all projectiles in flight.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured projectile snapshots in firing order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Number of projectiles captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no projectiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
        self.snapshots
    }
}

/// Counters describing the player's economy and losses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EconomySnapshot {
    /// Money available for tower placement.
    pub money: u32,
    /// Number of enemies destroyed by towers.
    pub kill_count: u32,
    /// Number of enemies that reached the end of the path.
    pub leaked_count: u32,
    /// Number of leaks that ends the run.
    pub leak_limit: u32,
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The player cannot afford another tower.
    #[error("insufficient funds: tower costs {required}, {available} available")]
    InsufficientFunds {
        /// Cost of a tower.
        required: u32,
        /// Money available at request time.
        available: u32,
    },
    /// A tower already occupies the requested cell.
    #[error("cell is already occupied by a tower")]
    Occupied,
}
