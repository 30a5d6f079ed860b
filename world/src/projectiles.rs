//! Projectiles homing in on enemies.

use glam::Vec2;
use tower_defense_core::{EnemyId, ProjectileId, ProjectileSnapshot};

/// Outcome of moving a projectile by one step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum HitResult {
    /// Still travelling toward the target.
    Flying,
    /// Close enough to the target to deal damage.
    Hit,
}

#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    id: ProjectileId,
    position: Vec2,
    speed: f32,
    target: EnemyId,
}

impl Projectile {
    pub(crate) fn id(&self) -> ProjectileId {
        self.id
    }

    pub(crate) fn target(&self) -> EnemyId {
        self.target
    }

    /// Steers toward `target_position` and reports whether the shot landed.
    ///
    /// The distance is measured before moving, so a projectile that starts
    /// inside the hit radius lands immediately.
    pub(crate) fn advance(&mut self, target_position: Vec2, hit_radius: f32) -> HitResult {
        let offset = target_position - self.position;
        let distance = offset.length();
        if distance < hit_radius {
            return HitResult::Hit;
        }

        self.position += offset / distance * self.speed;
        HitResult::Flying
    }
}

#[derive(Debug)]
pub(crate) struct ProjectileRegistry {
    entries: Vec<Projectile>,
    next_projectile_id: ProjectileId,
}

impl ProjectileRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_projectile_id: ProjectileId::new(0),
        }
    }

    pub(crate) fn fire(&mut self, position: Vec2, speed: f32, target: EnemyId) -> ProjectileId {
        let id = self.next_projectile_id;
        self.next_projectile_id = ProjectileId::new(id.get().saturating_add(1));
        self.entries.push(Projectile {
            id,
            position,
            speed,
            target,
        });
        id
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Projectile> {
        self.entries.iter_mut()
    }

    /// Drops every listed projectile in one compacting pass.
    pub(crate) fn remove_all(&mut self, ids: &[ProjectileId]) {
        if ids.is_empty() {
            return;
        }
        self.entries.retain(|projectile| !ids.contains(&projectile.id));
    }

    pub(crate) fn snapshots(&self) -> Vec<ProjectileSnapshot> {
        self.entries
            .iter()
            .map(|projectile| ProjectileSnapshot {
                id: projectile.id,
                position: projectile.position,
                target: projectile.target,
            })
            .collect()
    }
}
