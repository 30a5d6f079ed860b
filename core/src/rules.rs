//! Tuning constants and the enemy route shared by every simulation run.

use std::time::Duration;

use glam::Vec2;
use thiserror::Error;

/// Route followed by enemies in the default layout, in world units.
pub const DEFAULT_PATH: [Vec2; 5] = [
    Vec2::new(0.0, 275.0),
    Vec2::new(425.0, 275.0),
    Vec2::new(425.0, 125.0),
    Vec2::new(625.0, 125.0),
    Vec2::new(625.0, 625.0),
];

/// Errors reported when rules or paths fail validation.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum RulesError {
    /// A path needs a start and an end.
    #[error("path requires at least two waypoints, got {count}")]
    PathTooShort {
        /// Number of waypoints provided.
        count: usize,
    },
    /// A waypoint contained a NaN or infinite coordinate.
    #[error("waypoint {index} is not finite")]
    NonFiniteWaypoint {
        /// Position of the offending waypoint.
        index: usize,
    },
    /// A scalar that must be strictly positive was not.
    #[error("{field} must be positive")]
    NotPositive {
        /// Name of the rejected field.
        field: &'static str,
    },
    /// Projectiles this fast step past the enemy hit box and never land.
    #[error("projectile_speed {speed} must be below enemy_size {enemy_size}")]
    ProjectileOvershoots {
        /// Rejected projectile speed.
        speed: f32,
        /// Edge length of the enemy hit box.
        enemy_size: f32,
    },
}

/// Immutable ordered sequence of waypoints enemies walk along.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    waypoints: Vec<Vec2>,
}

impl Path {
    /// Creates a path from at least two finite waypoints.
    pub fn new(waypoints: Vec<Vec2>) -> Result<Self, RulesError> {
        if waypoints.len() < 2 {
            return Err(RulesError::PathTooShort {
                count: waypoints.len(),
            });
        }

        if let Some(index) = waypoints.iter().position(|point| !point.is_finite()) {
            return Err(RulesError::NonFiniteWaypoint { index });
        }

        Ok(Self { waypoints })
    }

    /// Waypoints in walking order.
    #[must_use]
    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    /// Waypoint at `index`, if the path has one.
    #[must_use]
    pub fn waypoint(&self, index: usize) -> Option<Vec2> {
        self.waypoints.get(index).copied()
    }

    /// First waypoint, where enemies spawn.
    #[must_use]
    pub fn start(&self) -> Vec2 {
        self.waypoints[0]
    }

    /// Number of waypoints. Always at least two.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Paths are never empty; provided for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Default for Path {
    fn default() -> Self {
        Self {
            waypoints: DEFAULT_PATH.to_vec(),
        }
    }
}

/// Gameplay constants governing economy, combat and movement.
///
/// Speeds are expressed in world units per tick; the simulation advances
/// entities by one step per frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Rules {
    /// Money available when the run starts.
    pub starting_money: u32,
    /// Price debited for each tower.
    pub tower_cost: u32,
    /// Money credited for each kill.
    pub enemy_reward: u32,
    /// Number of leaked enemies that ends the run.
    pub leak_limit: u32,
    /// Hit points of a freshly spawned enemy.
    pub enemy_health: i32,
    /// Distance an enemy walks per tick.
    pub enemy_speed: f32,
    /// Edge length of an enemy's square hit box.
    pub enemy_size: f32,
    /// Engagement radius of a tower.
    pub tower_range: f32,
    /// Minimum time between two shots of the same tower.
    pub tower_cooldown: Duration,
    /// Distance a projectile travels per tick.
    pub projectile_speed: f32,
    /// Damage dealt by a single projectile.
    pub projectile_damage: i32,
    /// Edge length of a placement grid cell.
    pub grid_size: f32,
    /// Offset from a cell's upper-left corner to the tower anchor.
    pub tower_anchor_offset: f32,
    /// Time between two enemy spawns.
    pub spawn_interval: Duration,
}

impl Default for Rules {
    fn default() -> Self {
        let grid_size = 50.0;
        Self {
            starting_money: 100,
            tower_cost: 20,
            enemy_reward: 10,
            leak_limit: 10,
            enemy_health: 100,
            enemy_speed: 1.0,
            enemy_size: 20.0,
            tower_range: 100.0,
            tower_cooldown: Duration::from_millis(1000),
            projectile_speed: 3.0,
            projectile_damage: 10,
            grid_size,
            tower_anchor_offset: grid_size / 5.0,
            spawn_interval: Duration::from_millis(5000),
        }
    }
}

impl Rules {
    /// Checks that every rate, size and interval is usable by the simulation.
    pub fn validate(&self) -> Result<(), RulesError> {
        let positive_scalars = [
            ("enemy_speed", self.enemy_speed),
            ("enemy_size", self.enemy_size),
            ("tower_range", self.tower_range),
            ("projectile_speed", self.projectile_speed),
            ("grid_size", self.grid_size),
        ];
        for (field, value) in positive_scalars {
            if !value.is_finite() || value <= 0.0 {
                return Err(RulesError::NotPositive { field });
            }
        }

        if self.projectile_speed >= self.enemy_size {
            return Err(RulesError::ProjectileOvershoots {
                speed: self.projectile_speed,
                enemy_size: self.enemy_size,
            });
        }

        if self.tower_cooldown.is_zero() {
            return Err(RulesError::NotPositive {
                field: "tower_cooldown",
            });
        }
        if self.spawn_interval.is_zero() {
            return Err(RulesError::NotPositive {
                field: "spawn_interval",
            });
        }
        if self.enemy_health <= 0 {
            return Err(RulesError::NotPositive {
                field: "enemy_health",
            });
        }
        if self.projectile_damage <= 0 {
            return Err(RulesError::NotPositive {
                field: "projectile_damage",
            });
        }

        Ok(())
    }

    /// Distance below which a projectile counts as touching an enemy.
    #[must_use]
    pub fn hit_radius(&self) -> f32 {
        self.enemy_size / 2.0
    }
}
