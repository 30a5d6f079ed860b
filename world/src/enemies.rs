//! Enemy state and the registry that owns it.

use glam::Vec2;
use slotmap::SlotMap;
use tower_defense_core::{EnemyId, EnemySnapshot, Health, Path};

/// Outcome of moving an enemy by one step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Advance {
    /// The enemy is still walking toward a waypoint.
    InTransit,
    /// The enemy passed the last waypoint.
    ReachedEnd,
}

/// Actor walking the path toward its end.
#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    position: Vec2,
    health: Health,
    speed: f32,
    path_index: usize,
}

impl Enemy {
    /// Creates an enemy standing on the first waypoint of `path`.
    pub(crate) fn spawn(path: &Path, health: Health, speed: f32) -> Self {
        Self {
            position: path.start(),
            health,
            speed,
            path_index: 0,
        }
    }

    /// Moves the enemy one step toward `path[path_index]`.
    ///
    /// Within one step of the waypoint the enemy snaps onto it and targets
    /// the next one.
    pub(crate) fn advance(&mut self, path: &Path) -> Advance {
        let Some(target) = path.waypoint(self.path_index) else {
            return Advance::ReachedEnd;
        };

        let offset = target - self.position;
        let distance = offset.length();
        if distance <= self.speed {
            self.position = target;
            self.path_index += 1;
            if self.path_index >= path.len() {
                return Advance::ReachedEnd;
            }
            return Advance::InTransit;
        }

        self.position += offset / distance * self.speed;
        Advance::InTransit
    }

    pub(crate) fn apply_damage(&mut self, amount: i32) {
        self.health = self.health.damaged(amount);
    }

    pub(crate) fn position(&self) -> Vec2 {
        self.position
    }

    pub(crate) fn health(&self) -> Health {
        self.health
    }

    fn snapshot(&self, id: EnemyId) -> EnemySnapshot {
        EnemySnapshot {
            id,
            position: self.position,
            health: self.health,
            path_index: self.path_index,
        }
    }
}

/// Generational arena of enemies that remembers spawn order.
#[derive(Debug, Default)]
pub(crate) struct EnemyRegistry {
    slots: SlotMap<EnemyId, Enemy>,
    order: Vec<EnemyId>,
}

impl EnemyRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, enemy: Enemy) -> EnemyId {
        let id = self.slots.insert(enemy);
        self.order.push(id);
        id
    }

    pub(crate) fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.slots.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.slots.get_mut(id)
    }

    /// Handle of the enemy at `index` in spawn order.
    pub(crate) fn id_at(&self, index: usize) -> Option<EnemyId> {
        self.order.get(index).copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    /// Removes every listed enemy in one compacting pass.
    pub(crate) fn remove_all(&mut self, ids: &[EnemyId]) {
        if ids.is_empty() {
            return;
        }

        for id in ids {
            let _ = self.slots.remove(*id);
        }
        let slots = &self.slots;
        self.order.retain(|id| slots.contains_key(*id));
    }

    pub(crate) fn snapshots(&self) -> Vec<EnemySnapshot> {
        self.order
            .iter()
            .filter_map(|id| self.slots.get(*id).map(|enemy| enemy.snapshot(*id)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_path(length: f32) -> Path {
        Path::new(vec![Vec2::ZERO, Vec2::new(length, 0.0)]).expect("valid path")
    }

    #[test]
    fn enemy_on_waypoint_arrives_without_moving() {
        let path = straight_path(5.0);
        let mut enemy = Enemy::spawn(&path, Health::new(100), 1.0);

        assert_eq!(enemy.advance(&path), Advance::InTransit);
        assert_eq!(enemy.position(), Vec2::ZERO);
        assert_eq!(enemy.path_index, 1);
    }

    #[test]
    fn enemy_steps_along_normalized_direction() {
        let path = Path::new(vec![Vec2::ZERO, Vec2::new(30.0, 40.0)]).expect("valid path");
        let mut enemy = Enemy::spawn(&path, Health::new(100), 5.0);

        let _ = enemy.advance(&path);
        assert_eq!(enemy.advance(&path), Advance::InTransit);
        assert!((enemy.position() - Vec2::new(3.0, 4.0)).length() < 1e-4);
    }

    #[test]
    fn enemy_snaps_to_last_waypoint_and_reports_end() {
        let path = straight_path(2.0);
        let mut enemy = Enemy::spawn(&path, Health::new(100), 1.0);

        assert_eq!(enemy.advance(&path), Advance::InTransit);
        assert_eq!(enemy.advance(&path), Advance::InTransit);
        assert_eq!(enemy.position(), Vec2::new(1.0, 0.0));
        assert_eq!(enemy.advance(&path), Advance::ReachedEnd);
        assert_eq!(enemy.position(), Vec2::new(2.0, 0.0));
        assert_eq!(enemy.path_index, path.len());
    }

    #[test]
    fn path_index_never_decreases() {
        let path = Path::default();
        let mut enemy = Enemy::spawn(&path, Health::new(100), 1.0);
        let mut previous = enemy.path_index;

        while enemy.advance(&path) == Advance::InTransit {
            assert!(enemy.path_index >= previous);
            assert!(enemy.path_index <= path.len());
            previous = enemy.path_index;
        }
        assert_eq!(enemy.path_index, path.len());
    }

    #[test]
    fn damage_is_not_clamped() {
        let path = straight_path(2.0);
        let mut enemy = Enemy::spawn(&path, Health::new(5), 1.0);
        enemy.apply_damage(10);
        assert_eq!(enemy.health(), Health::new(-5));
    }

    #[test]
    fn registry_preserves_spawn_order_across_removals() {
        let path = straight_path(2.0);
        let mut registry = EnemyRegistry::new();
        let first = registry.insert(Enemy::spawn(&path, Health::new(1), 1.0));
        let second = registry.insert(Enemy::spawn(&path, Health::new(2), 1.0));
        let third = registry.insert(Enemy::spawn(&path, Health::new(3), 1.0));

        registry.remove_all(&[second]);
        let fourth = registry.insert(Enemy::spawn(&path, Health::new(4), 1.0));

        let order: Vec<EnemyId> = registry.snapshots().iter().map(|s| s.id).collect();
        assert_eq!(order, vec![first, third, fourth]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn removed_handles_do_not_resolve_after_slot_reuse() {
        let path = straight_path(2.0);
        let mut registry = EnemyRegistry::new();
        let stale = registry.insert(Enemy::spawn(&path, Health::new(1), 1.0));
        registry.remove_all(&[stale]);
        let fresh = registry.insert(Enemy::spawn(&path, Health::new(2), 1.0));

        assert_ne!(stale, fresh);
        assert!(registry.get(stale).is_none());
        assert!(registry.get(fresh).is_some());
    }
}
