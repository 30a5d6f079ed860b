//! Authoritative tower state management utilities.

use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use tower_defense_core::{CellCoord, TowerId, TowerSnapshot};

/// Snapshot of a tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Grid cell hosting the tower.
    pub(crate) cell: CellCoord,
    /// World-space anchor shots originate from.
    pub(crate) position: Vec2,
    /// Engagement radius.
    pub(crate) range: f32,
    /// Minimum time between shots.
    pub(crate) cooldown: Duration,
    /// Timestamp of the last shot; placement time until the first one.
    pub(crate) last_fired_at: Duration,
}

impl TowerState {
    pub(crate) fn is_ready(&self, now: Duration) -> bool {
        now.saturating_sub(self.last_fired_at) >= self.cooldown
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Stores a tower and returns the identifier allocated to it.
    pub(crate) fn insert(&mut self, state: TowerState) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(id, state);
        id
    }

    /// Reports whether a tower already sits on `anchor`.
    pub(crate) fn occupies(&self, anchor: Vec2) -> bool {
        self.entries.values().any(|tower| tower.position == anchor)
    }

    pub(crate) fn get(&self, id: TowerId) -> Option<&TowerState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn tower_at(&self, cell: CellCoord) -> Option<TowerId> {
        self.entries
            .iter()
            .find(|(_, tower)| tower.cell == cell)
            .map(|(id, _)| *id)
    }

    pub(crate) fn snapshots(&self) -> Vec<TowerSnapshot> {
        self.entries
            .iter()
            .map(|(id, tower)| TowerSnapshot {
                id: *id,
                cell: tower.cell,
                position: tower.position,
                range: tower.range,
                cooldown: tower.cooldown,
                last_fired_at: tower.last_fired_at,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tower_in(cell: CellCoord, placed_at: Duration) -> TowerState {
        TowerState {
            cell,
            position: cell.anchor(50.0, 10.0),
            range: 100.0,
            cooldown: Duration::from_millis(1000),
            last_fired_at: placed_at,
        }
    }

    #[test]
    fn registry_starts_empty_with_zero_identifier() {
        let registry = TowerRegistry::new();
        assert!(registry.entries.is_empty());
        assert_eq!(registry.next_tower_id.get(), 0);
    }

    #[test]
    fn identifiers_increase_with_each_insertion() {
        let mut registry = TowerRegistry::new();
        let first = registry.insert(tower_in(CellCoord::new(0, 0), Duration::ZERO));
        let second = registry.insert(tower_in(CellCoord::new(1, 0), Duration::ZERO));

        assert_eq!(first, TowerId::new(0));
        assert_eq!(second, TowerId::new(1));
        assert_eq!(registry.tower_at(CellCoord::new(1, 0)), Some(second));
        assert_eq!(registry.tower_at(CellCoord::new(2, 0)), None);
    }

    #[test]
    fn occupancy_is_keyed_by_anchor() {
        let mut registry = TowerRegistry::new();
        let _ = registry.insert(tower_in(CellCoord::new(3, 4), Duration::ZERO));

        assert!(registry.occupies(Vec2::new(160.0, 210.0)));
        assert!(!registry.occupies(Vec2::new(150.0, 200.0)));
    }

    #[test]
    fn tower_is_not_ready_before_cooldown_elapses() {
        let tower = tower_in(CellCoord::new(0, 0), Duration::from_millis(500));

        assert!(!tower.is_ready(Duration::from_millis(1499)));
        assert!(tower.is_ready(Duration::from_millis(1500)));
        assert!(!tower.is_ready(Duration::ZERO));
    }
}
