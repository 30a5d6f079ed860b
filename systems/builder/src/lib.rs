#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system responsible for turning pointer input into tower placement commands.

use glam::Vec2;
use tower_defense_core::{CellCoord, Command};

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BuilderInput {
    /// Indicates whether the player clicked to place a tower on this frame.
    pub confirm_action: bool,
    /// Cursor position in world units, if the cursor is over the play field.
    pub cursor_world_space: Option<Vec2>,
}

impl BuilderInput {
    /// Creates a new input descriptor with explicit field values.
    #[must_use]
    pub const fn new(confirm_action: bool, cursor_world_space: Option<Vec2>) -> Self {
        Self {
            confirm_action,
            cursor_world_space,
        }
    }
}

/// System that snaps the cursor to the placement grid and emits placement requests.
///
/// Affordability and occupancy are left to the world, which answers every
/// request with either `TowerPlaced` or `TowerPlacementRejected`.
#[derive(Clone, Copy, Debug)]
pub struct Builder {
    grid_size: f32,
}

impl Builder {
    /// Creates a builder for a grid whose cells measure `grid_size` world units.
    #[must_use]
    pub const fn new(grid_size: f32) -> Self {
        Self { grid_size }
    }

    /// Grid cell currently under the cursor.
    #[must_use]
    pub fn hovered_cell(&self, input: BuilderInput) -> Option<CellCoord> {
        input
            .cursor_world_space
            .and_then(|point| CellCoord::containing(point, self.grid_size))
    }

    /// Emits `Command::PlaceTower` when the player confirms over a grid cell.
    pub fn handle(&self, input: BuilderInput, out: &mut Vec<Command>) {
        if !input.confirm_action {
            return;
        }

        if let Some(cell) = self.hovered_cell(input) {
            out.push(Command::PlaceTower { cell });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_emits_place_command_for_hovered_cell() {
        let builder = Builder::new(50.0);
        let mut commands = Vec::new();

        builder.handle(
            BuilderInput::new(true, Some(Vec2::new(120.0, 49.0))),
            &mut commands,
        );

        assert_eq!(
            commands,
            vec![Command::PlaceTower {
                cell: CellCoord::new(2, 0),
            }],
        );
    }

    #[test]
    fn hovering_without_confirm_is_silent() {
        let builder = Builder::new(50.0);
        let mut commands = Vec::new();
        let input = BuilderInput::new(false, Some(Vec2::new(10.0, 10.0)));

        builder.handle(input, &mut commands);

        assert!(commands.is_empty());
        assert_eq!(builder.hovered_cell(input), Some(CellCoord::new(0, 0)));
    }

    #[test]
    fn confirm_without_cursor_is_ignored() {
        let builder = Builder::new(50.0);
        let mut commands = Vec::new();

        builder.handle(BuilderInput::new(true, None), &mut commands);
        builder.handle(
            BuilderInput::new(true, Some(Vec2::new(-5.0, 10.0))),
            &mut commands,
        );

        assert!(commands.is_empty());
    }
}
