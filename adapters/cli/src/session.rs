//! Frame driver shared by the windowed and headless runs.

use std::{fmt, time::Duration};

use glam::Vec2;
use log::{debug, info};
use tower_defense_core::{CellCoord, Command, EconomySnapshot, Event, GameStatus, TowerId};
use tower_defense_rendering::{
    Color, Cue, GridPresentation, PathPresentation, RenderingError, Scene,
};
use tower_defense_simulation::Simulation;
use tower_defense_system_builder::{Builder, BuilderInput};
use tower_defense_system_spawning::{Config, Spawning};

/// Play field width in grid cells.
pub(crate) const GRID_COLUMNS: u32 = 16;
/// Play field height in grid cells.
pub(crate) const GRID_ROWS: u32 = 14;

/// Owns the simulation together with the input and spawn systems feeding it.
#[derive(Debug)]
pub(crate) struct Session {
    simulation: Simulation,
    spawning: Spawning,
    builder: Builder,
    commands: Vec<Command>,
    frames: u64,
}

impl Session {
    pub(crate) fn new(simulation: Simulation) -> Self {
        let rules = simulation.rules();
        let spawning = Spawning::new(Config::new(rules.spawn_interval));
        let builder = Builder::new(rules.grid_size);

        Self {
            simulation,
            spawning,
            builder,
            commands: Vec::new(),
            frames: 0,
        }
    }

    /// Places a tower outside the frame loop.
    pub(crate) fn place(&mut self, cell: CellCoord) -> Option<TowerId> {
        let placed = self.simulation.request_placement(cell).ok();
        self.emit_cues();
        placed
    }

    /// Runs one frame: placement input, the simulation tick, then the spawn timer.
    pub(crate) fn frame(&mut self, now: Duration, input: BuilderInput) {
        self.frames = self.frames.saturating_add(1);

        self.builder.handle(input, &mut self.commands);
        for command in std::mem::take(&mut self.commands) {
            if let Command::PlaceTower { cell } = command {
                let _ = self.simulation.request_placement(cell);
            }
        }

        self.simulation.tick(now);

        self.spawning
            .handle(self.simulation.pending_events(), &mut self.commands);
        for command in std::mem::take(&mut self.commands) {
            if command == Command::SpawnEnemy {
                let _ = self.simulation.spawn_timer_fired();
            }
        }

        self.emit_cues();
    }

    fn emit_cues(&mut self) {
        for event in self.simulation.drain_events() {
            if let Some(cue) = Cue::from_event(&event) {
                debug!("cue {cue:?} ({})", cue.sound());
            }
            if let Event::GameOver { leaked_count } = event {
                let frames = self.frames;
                info!("run ended after {frames} frames with {leaked_count} leaks");
            }
        }
    }

    /// Builds the initial scene for the play field.
    pub(crate) fn scene(&self) -> Result<Scene, RenderingError> {
        let rules = self.simulation.rules();
        let grid = GridPresentation::new(
            GRID_COLUMNS,
            GRID_ROWS,
            rules.grid_size,
            Color::from_rgb_u8(128, 128, 128).with_alpha(0.5),
        )?;
        let path = PathPresentation::new(
            self.simulation.path().waypoints().to_vec(),
            40.0,
            Color::from_rgb_u8(128, 128, 128),
        );

        let mut scene = Scene::new(grid, path, self.simulation.economy());
        self.populate(&mut scene, BuilderInput::default());
        Ok(scene)
    }

    /// Refreshes the dynamic scene content from the latest snapshots.
    pub(crate) fn populate(&self, scene: &mut Scene, input: BuilderInput) {
        let towers = self.simulation.towers().into_vec();
        let enemies = self.simulation.enemies().into_vec();
        let projectiles = self.simulation.projectiles().into_vec();

        scene.refresh(&towers, &enemies, &projectiles, self.simulation.economy());
        scene.hovered_cell = self.builder.hovered_cell(input);
        scene.game_over = self.simulation.is_over();
    }

    pub(crate) fn summary(&self) -> RunSummary {
        RunSummary {
            frames: self.frames,
            elapsed: self.simulation.clock(),
            status: self.simulation.status(),
            economy: self.simulation.economy(),
            towers: self.simulation.towers().len(),
            enemies: self.simulation.enemies().len(),
        }
    }
}

/// Converts an optional cursor position into builder input.
pub(crate) fn builder_input(
    cursor_world_space: Option<Vec2>,
    confirm_action: bool,
) -> BuilderInput {
    BuilderInput::new(confirm_action, cursor_world_space)
}

/// Outcome of a run reported when the session ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct RunSummary {
    pub(crate) frames: u64,
    pub(crate) elapsed: Duration,
    pub(crate) status: GameStatus,
    pub(crate) economy: EconomySnapshot,
    pub(crate) towers: usize,
    pub(crate) enemies: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self.status {
            GameStatus::Running => "running",
            GameStatus::Over => "game over",
        };
        let EconomySnapshot {
            money,
            kill_count,
            leaked_count,
            leak_limit,
        } = self.economy;
        let (frames, towers, enemies) = (self.frames, self.towers, self.enemies);
        let seconds = self.elapsed.as_secs_f64();

        write!(f, "{status} after {frames} frames ({seconds:.1}s): ")?;
        write!(f, "killed {kill_count}, ")?;
        write!(f, "reached end {leaked_count}/{leak_limit}, ")?;
        write!(f, "money ${money}, towers {towers}, enemies on path {enemies}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(16);

    fn run_frames(session: &mut Session, frames: std::ops::RangeInclusive<u32>) {
        for frame in frames {
            session.frame(FRAME * frame, BuilderInput::default());
        }
    }

    #[test]
    fn spawn_timer_releases_one_enemy_per_interval() {
        let mut session = Session::new(Simulation::new());

        run_frames(&mut session, 1..=312);
        assert_eq!(session.summary().enemies, 0);

        run_frames(&mut session, 313..=313);
        assert_eq!(session.summary().enemies, 1);
    }

    #[test]
    fn clicks_place_towers_in_the_hovered_cell() {
        let mut session = Session::new(Simulation::new());

        session.frame(FRAME, builder_input(Some(Vec2::new(75.0, 20.0)), true));
        session.frame(FRAME * 2, builder_input(Some(Vec2::new(80.0, 30.0)), true));

        let summary = session.summary();
        assert_eq!(summary.towers, 1);
        assert_eq!(summary.economy.money, 80);
        assert_eq!(summary.frames, 2);
    }

    #[test]
    fn scene_mirrors_simulation_state() {
        let mut session = Session::new(Simulation::new());
        assert_eq!(session.place(CellCoord::new(1, 4)), Some(TowerId::new(0)));
        let mut scene = session.scene().expect("valid grid");

        let hover = builder_input(Some(Vec2::new(130.0, 260.0)), false);
        session.populate(&mut scene, hover);

        assert_eq!(scene.towers.len(), 1);
        assert_eq!(scene.towers[0].position, Vec2::new(60.0, 210.0));
        assert_eq!(scene.hovered_cell, Some(CellCoord::new(2, 5)));
        assert_eq!(scene.path.waypoints.len(), 5);
        assert_eq!(scene.hud.money, 80);
        assert!(!scene.game_over);
    }

    #[test]
    fn summary_reports_counters() {
        let mut session = Session::new(Simulation::new());
        run_frames(&mut session, 1..=10);

        let text = session.summary().to_string();
        assert!(text.starts_with("running after 10 frames"));
        assert!(text.contains("money $100"));
    }
}
