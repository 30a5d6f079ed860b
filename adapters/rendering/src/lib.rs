#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Tower Defense adapters.

use std::{error::Error, fmt, time::Duration};

use anyhow::Result as AnyResult;
use glam::Vec2;
use tower_defense_core::{
    CellCoord, EconomySnapshot, EnemySnapshot, Event, Health, ProjectileSnapshot, TowerSnapshot,
};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the same color with a different alpha channel.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self {
            red: self.red,
            green: self.green,
            blue: self.blue,
            alpha,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Cursor position expressed in world units, if it lies inside the play field.
    pub cursor_world_space: Option<Vec2>,
    /// Whether the adapter detected a placement click on this frame.
    pub confirm_action: bool,
}

/// Describes the square placement grid drawn beneath the play field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridPresentation {
    /// Number of columns contained in the grid.
    pub columns: u32,
    /// Number of rows contained in the grid.
    pub rows: u32,
    /// Side length of a single cell expressed in world units.
    pub cell_length: f32,
    /// Color used when drawing grid lines.
    pub line_color: Color,
}

impl GridPresentation {
    /// Creates a new grid descriptor.
    ///
    /// Returns an error when the grid has no area.
    pub fn new(
        columns: u32,
        rows: u32,
        cell_length: f32,
        line_color: Color,
    ) -> std::result::Result<Self, RenderingError> {
        if columns == 0 || rows == 0 {
            return Err(RenderingError::EmptyGrid { columns, rows });
        }
        if !cell_length.is_finite() || cell_length <= 0.0 {
            return Err(RenderingError::InvalidCellLength { cell_length });
        }

        Ok(Self {
            columns,
            rows,
            cell_length,
            line_color,
        })
    }

    /// Calculates the total width of the grid.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.cell_length
    }

    /// Calculates the total height of the grid.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.cell_length
    }

    /// Reports whether a world-space position lies inside the grid.
    #[must_use]
    pub fn contains(&self, position: Vec2) -> bool {
        position.x >= 0.0
            && position.y >= 0.0
            && position.x < self.width()
            && position.y < self.height()
    }

    /// Top-left corner of `cell` in world units.
    #[must_use]
    pub fn cell_origin(&self, cell: CellCoord) -> Vec2 {
        Vec2::new(
            cell.column() as f32 * self.cell_length,
            cell.row() as f32 * self.cell_length,
        )
    }
}

/// Polyline enemies walk along, drawn as a thick stroke.
#[derive(Clone, Debug, PartialEq)]
pub struct PathPresentation {
    /// Waypoints in walking order.
    pub waypoints: Vec<Vec2>,
    /// Stroke width in world units.
    pub thickness: f32,
    /// Stroke color.
    pub color: Color,
}

impl PathPresentation {
    /// Creates a new path descriptor.
    #[must_use]
    pub fn new(waypoints: Vec<Vec2>, thickness: f32, color: Color) -> Self {
        Self {
            waypoints,
            thickness,
            color,
        }
    }

    /// Consecutive waypoint pairs forming the drawn segments.
    pub fn segments(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.waypoints.windows(2).map(|pair| (pair[0], pair[1]))
    }
}

/// Square drawn for a placed tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneTower {
    /// Top-left corner of the tower sprite.
    pub position: Vec2,
    /// Radius of the tower's targeting circle.
    pub range: f32,
}

impl SceneTower {
    /// Edge length of the tower square.
    pub const SIZE: f32 = 30.0;
}

impl From<&TowerSnapshot> for SceneTower {
    fn from(snapshot: &TowerSnapshot) -> Self {
        Self {
            position: snapshot.position,
            range: snapshot.range,
        }
    }
}

/// Square drawn for an enemy together with its health label.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneEnemy {
    /// Top-left corner of the enemy sprite.
    pub position: Vec2,
    /// Health shown above the sprite.
    pub health: Health,
}

impl SceneEnemy {
    /// Edge length of the enemy square.
    pub const SIZE: f32 = 20.0;
}

impl From<&EnemySnapshot> for SceneEnemy {
    fn from(snapshot: &EnemySnapshot) -> Self {
        Self {
            position: snapshot.position,
            health: snapshot.health,
        }
    }
}

/// Small square drawn for a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneProjectile {
    /// Top-left corner of the projectile.
    pub position: Vec2,
}

impl SceneProjectile {
    /// Edge length of the projectile square.
    pub const SIZE: f32 = 5.0;
}

impl From<&ProjectileSnapshot> for SceneProjectile {
    fn from(snapshot: &ProjectileSnapshot) -> Self {
        Self {
            position: snapshot.position,
        }
    }
}

/// Scene description consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Placement grid drawn beneath everything else.
    pub grid: GridPresentation,
    /// Path enemies walk along.
    pub path: PathPresentation,
    /// Towers placed by the player.
    pub towers: Vec<SceneTower>,
    /// Enemies currently on the path.
    pub enemies: Vec<SceneEnemy>,
    /// Projectiles in flight.
    pub projectiles: Vec<SceneProjectile>,
    /// Counters shown in the heads-up display.
    pub hud: EconomySnapshot,
    /// Cell highlighted under the cursor.
    pub hovered_cell: Option<CellCoord>,
    /// Whether the game-over overlay should be drawn.
    pub game_over: bool,
}

impl Scene {
    /// Height of the heads-up display strip along the bottom edge.
    pub const HUD_HEIGHT: f32 = 50.0;

    /// Creates an empty scene over the provided grid and path.
    #[must_use]
    pub fn new(grid: GridPresentation, path: PathPresentation, hud: EconomySnapshot) -> Self {
        Self {
            grid,
            path,
            towers: Vec::new(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            hud,
            hovered_cell: None,
            game_over: false,
        }
    }

    /// Replaces the dynamic scene content with fresh snapshots.
    pub fn refresh<'a>(
        &mut self,
        towers: impl IntoIterator<Item = &'a TowerSnapshot>,
        enemies: impl IntoIterator<Item = &'a EnemySnapshot>,
        projectiles: impl IntoIterator<Item = &'a ProjectileSnapshot>,
        hud: EconomySnapshot,
    ) {
        self.towers = towers.into_iter().map(SceneTower::from).collect();
        self.enemies = enemies.into_iter().map(SceneEnemy::from).collect();
        self.projectiles = projectiles.into_iter().map(SceneProjectile::from).collect();
        self.hud = hud;
    }

    /// Lines of text shown in the heads-up display.
    #[must_use]
    pub fn hud_lines(&self) -> [String; 3] {
        [
            format!("Enemies Killed: {}", self.hud.kill_count),
            format!(
                "Enemies Reached End: {}/{}",
                self.hud.leaked_count, self.hud.leak_limit
            ),
            format!("Money: ${}", self.hud.money),
        ]
    }
}

/// Fire-and-forget presentation notification derived from simulation events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cue {
    /// An enemy entered the path.
    EnemySpawned,
    /// A tower fired a projectile.
    ShotFired,
    /// An enemy was destroyed by the towers.
    EnemyKilled,
}

impl Cue {
    /// Maps a simulation event onto the cue it should trigger, if any.
    #[must_use]
    pub fn from_event(event: &Event) -> Option<Self> {
        match event {
            Event::EnemySpawned { .. } => Some(Self::EnemySpawned),
            Event::ProjectileFired { .. } => Some(Self::ShotFired),
            Event::EnemyKilled { .. } => Some(Self::EnemyKilled),
            _ => None,
        }
    }

    /// Sound asset the cue plays when audio is available.
    #[must_use]
    pub const fn sound(&self) -> &'static str {
        match self {
            Self::EnemySpawned => "enemy_spawn.wav",
            Self::ShotFired => "gunshot.wav",
            Self::EnemyKilled => "enemy_death.wav",
        }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Tower Defense scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta,
    /// per-frame input captured by the adapter, and may mutate the scene
    /// before it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// The grid needs at least one column and one row.
    EmptyGrid {
        /// Provided column count.
        columns: u32,
        /// Provided row count.
        rows: u32,
    },
    /// Cells must have a positive, finite edge length.
    InvalidCellLength {
        /// Provided edge length that failed validation.
        cell_length: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid { columns, rows } => {
                write!(f, "grid must not be empty (received {columns}x{rows})")
            }
            Self::InvalidCellLength { cell_length } => {
                write!(f, "cell_length must be positive (received {cell_length})")
            }
        }
    }
}

impl Error for RenderingError {}
