#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Tower Defense.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature, so cues are reported through the log instead of
//! being played.
//!
//! Everything is drawn with primitive shapes in world units scaled to fit
//! the window.

use anyhow::Result;
use glam::Vec2;
use macroquad::{
    color::{BLACK, WHITE},
    input::{is_key_pressed, is_mouse_button_pressed, mouse_position, KeyCode, MouseButton},
};
use std::time::{Duration, Instant};
use tower_defense_core::CellCoord;
use tower_defense_rendering::{
    Color, FrameInput, GridPresentation, PathPresentation, Presentation, RenderingBackend, Scene,
    SceneEnemy, SceneProjectile, SceneTower,
};

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend prints frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct FpsMetrics {
    per_second: f32,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns the averages once one second has elapsed.
    fn record_frame(&mut self, frame: Duration, render: Duration) -> Option<FpsMetrics> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        self.render_accum += render;

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let metrics = FpsMetrics {
            per_second: self.frames as f32 / seconds,
            avg_render: self.render_accum / self.frames.max(1),
        };
        *self = Self::default();
        Some(metrics)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: scene.grid.width().round() as i32,
            window_height: scene.grid.height().round() as i32,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();

            loop {
                if is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q) {
                    break;
                }

                macroquad::window::clear_background(background);

                let screen_width = macroquad::window::screen_width();
                let screen_height = macroquad::window::screen_height();

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let metrics = SceneMetrics::from_grid(&scene.grid, screen_width, screen_height);
                let (cursor_x, cursor_y) = mouse_position();
                let frame_input = gather_frame_input_from_observations(
                    &scene.grid,
                    &metrics,
                    Vec2::new(cursor_x, cursor_y),
                    is_mouse_button_pressed(MouseButton::Left),
                );

                update_scene(frame_dt, frame_input, &mut scene);

                let render_start = Instant::now();
                draw_grid(&scene.grid, &metrics);
                draw_path(&scene.path, &metrics);
                draw_towers(&scene, &metrics);
                draw_projectiles(&scene.projectiles, &metrics);
                draw_enemies(&scene.enemies, &metrics);
                draw_hud(&scene, &metrics);
                if let Some(cell) = scene.hovered_cell {
                    draw_hover(&scene.grid, cell, &metrics);
                }
                if scene.game_over {
                    draw_game_over(&scene.grid, &metrics);
                }
                let render_duration = render_start.elapsed();

                if let Some(FpsMetrics {
                    per_second,
                    avg_render,
                }) = fps_counter.record_frame(frame_dt, render_duration)
                {
                    if show_fps {
                        println!(
                            "FPS: {:.2} | render: {:>6.2}ms",
                            per_second,
                            avg_render.as_secs_f64() * 1_000.0,
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Maps world units onto screen pixels, letterboxing the play field.
#[derive(Clone, Copy, Debug)]
struct SceneMetrics {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
}

impl SceneMetrics {
    fn from_grid(grid: &GridPresentation, screen_width: f32, screen_height: f32) -> Self {
        let world_width = grid.width();
        let world_height = grid.height();
        let scale = if world_width <= f32::EPSILON || world_height <= f32::EPSILON {
            1.0
        } else {
            (screen_width / world_width).min(screen_height / world_height)
        };

        Self {
            scale,
            offset_x: ((screen_width - world_width * scale) * 0.5).max(0.0),
            offset_y: ((screen_height - world_height * scale) * 0.5).max(0.0),
        }
    }

    fn to_screen(&self, world: Vec2) -> Vec2 {
        Vec2::new(
            self.offset_x + world.x * self.scale,
            self.offset_y + world.y * self.scale,
        )
    }

    fn to_world(&self, screen: Vec2) -> Vec2 {
        Vec2::new(
            (screen.x - self.offset_x) / self.scale,
            (screen.y - self.offset_y) / self.scale,
        )
    }
}

fn gather_frame_input_from_observations(
    grid: &GridPresentation,
    metrics: &SceneMetrics,
    cursor_position: Vec2,
    confirm_click: bool,
) -> FrameInput {
    if metrics.scale <= f32::EPSILON {
        return FrameInput::default();
    }

    let world_position = metrics.to_world(cursor_position);
    if !grid.contains(world_position) {
        return FrameInput::default();
    }

    FrameInput {
        cursor_world_space: Some(world_position),
        confirm_action: confirm_click,
    }
}

fn draw_grid(grid: &GridPresentation, metrics: &SceneMetrics) {
    let color = to_macroquad_color(grid.line_color);
    let top_left = metrics.to_screen(Vec2::ZERO);
    let bottom_right = metrics.to_screen(Vec2::new(grid.width(), grid.height()));

    for column in 0..=grid.columns {
        let offset = column as f32 * grid.cell_length;
        let x = metrics.to_screen(Vec2::new(offset, 0.0)).x;
        macroquad::shapes::draw_line(x, top_left.y, x, bottom_right.y, 1.0, color);
    }

    for row in 0..=grid.rows {
        let offset = row as f32 * grid.cell_length;
        let y = metrics.to_screen(Vec2::new(0.0, offset)).y;
        macroquad::shapes::draw_line(top_left.x, y, bottom_right.x, y, 1.0, color);
    }
}

fn draw_path(path: &PathPresentation, metrics: &SceneMetrics) {
    let color = to_macroquad_color(path.color);
    let thickness = path.thickness * metrics.scale;

    for (from, to) in path.segments() {
        let from = metrics.to_screen(from);
        let to = metrics.to_screen(to);
        macroquad::shapes::draw_line(from.x, from.y, to.x, to.y, thickness, color);
    }

    for waypoint in &path.waypoints {
        let joint = metrics.to_screen(*waypoint);
        macroquad::shapes::draw_circle(joint.x, joint.y, thickness * 0.5, color);
    }
}

fn hovered_tower(scene: &Scene) -> Option<SceneTower> {
    let cell = scene.hovered_cell?;
    let origin = scene.grid.cell_origin(cell);
    let extent = origin + Vec2::splat(scene.grid.cell_length);

    scene.towers.iter().copied().find(|tower| {
        tower.position.x >= origin.x
            && tower.position.y >= origin.y
            && tower.position.x < extent.x
            && tower.position.y < extent.y
    })
}

fn draw_towers(scene: &Scene, metrics: &SceneMetrics) {
    let fill = to_macroquad_color(Color::from_rgb_u8(52, 96, 176));
    let outline = to_macroquad_color(Color::from_rgb_u8(52, 96, 176).lighten(0.4));
    let size = SceneTower::SIZE * metrics.scale;

    if let Some(tower) = hovered_tower(scene) {
        let half = Vec2::splat(SceneTower::SIZE * 0.5);
        let center = metrics.to_screen(tower.position + half);
        let radius = tower.range * metrics.scale;
        macroquad::shapes::draw_circle(
            center.x,
            center.y,
            radius,
            macroquad::color::Color::new(1.0, 0.0, 0.0, 0.15),
        );
        macroquad::shapes::draw_circle_lines(center.x, center.y, radius, 1.0, BLACK);
    }

    for tower in &scene.towers {
        let corner = metrics.to_screen(tower.position);
        macroquad::shapes::draw_rectangle(corner.x, corner.y, size, size, fill);
        macroquad::shapes::draw_rectangle_lines(
            corner.x,
            corner.y,
            size,
            size,
            (metrics.scale * 2.0).max(1.0),
            outline,
        );
    }
}

fn draw_enemies(enemies: &[SceneEnemy], metrics: &SceneMetrics) {
    let fill = to_macroquad_color(Color::from_rgb_u8(176, 52, 68));
    let size = SceneEnemy::SIZE * metrics.scale;
    let font_size = 12.0 * metrics.scale;

    for enemy in enemies {
        let corner = metrics.to_screen(enemy.position);
        macroquad::shapes::draw_rectangle(corner.x, corner.y, size, size, fill);

        let offset = Vec2::new(SceneEnemy::SIZE * 0.5 - 5.0, -5.0);
        let label = metrics.to_screen(enemy.position + offset);
        let _ = macroquad::text::draw_text(
            &enemy.health.get().to_string(),
            label.x,
            label.y,
            font_size,
            BLACK,
        );
    }
}

fn draw_projectiles(projectiles: &[SceneProjectile], metrics: &SceneMetrics) {
    let size = (SceneProjectile::SIZE * metrics.scale).max(1.0);

    for projectile in projectiles {
        let corner = metrics.to_screen(projectile.position);
        macroquad::shapes::draw_rectangle(corner.x, corner.y, size, size, BLACK);
    }
}

fn draw_hud(scene: &Scene, metrics: &SceneMetrics) {
    let strip_top = scene.grid.height() - Scene::HUD_HEIGHT;
    let corner = metrics.to_screen(Vec2::new(0.0, strip_top));
    macroquad::shapes::draw_rectangle(
        corner.x,
        corner.y,
        scene.grid.width() * metrics.scale,
        Scene::HUD_HEIGHT * metrics.scale,
        to_macroquad_color(Color::from_rgb_u8(0x33, 0x33, 0x33)),
    );

    let baseline = scene.grid.height() - 20.0;
    for (line, x) in scene.hud_lines().iter().zip([20.0, 220.0, 520.0]) {
        let anchor = metrics.to_screen(Vec2::new(x, baseline));
        let _ = macroquad::text::draw_text(line, anchor.x, anchor.y, 18.0 * metrics.scale, WHITE);
    }
}

fn draw_hover(grid: &GridPresentation, cell: CellCoord, metrics: &SceneMetrics) {
    let corner = metrics.to_screen(grid.cell_origin(cell));
    let size = grid.cell_length * metrics.scale;
    macroquad::shapes::draw_rectangle(
        corner.x,
        corner.y,
        size,
        size,
        macroquad::color::Color::new(0.0, 1.0, 0.0, 0.5),
    );
}

fn draw_game_over(grid: &GridPresentation, metrics: &SceneMetrics) {
    let corner = metrics.to_screen(Vec2::ZERO);
    macroquad::shapes::draw_rectangle(
        corner.x,
        corner.y,
        grid.width() * metrics.scale,
        grid.height() * metrics.scale,
        macroquad::color::Color::new(0.0, 0.0, 0.0, 0.5),
    );

    let center = Vec2::new(grid.width() * 0.5 - 70.0, grid.height() * 0.5);
    let anchor = metrics.to_screen(center);
    let font_size = 36.0 * metrics.scale;
    let _ = macroquad::text::draw_text("Game Over", anchor.x, anchor.y, font_size, WHITE);
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> GridPresentation {
        GridPresentation::new(16, 14, 50.0, Color::from_rgb_u8(128, 128, 128))
            .expect("valid grid")
    }

    #[test]
    fn vsync_toggle_selects_swap_interval() {
        let backend = MacroquadBackend::new();
        assert_eq!(backend.swap_interval, None);
        assert!(!backend.show_fps);

        let vsync = MacroquadBackend::new().with_vsync(true);
        assert_eq!(vsync.swap_interval, Some(1));
        let uncapped = MacroquadBackend::new().with_vsync(false);
        assert_eq!(uncapped.swap_interval, Some(0));
    }

    #[test]
    fn metrics_letterbox_the_play_field() {
        let metrics = SceneMetrics::from_grid(&grid(), 1600.0, 1000.0);

        assert!((metrics.scale - 1000.0 / 700.0).abs() < 1e-5);
        assert_eq!(metrics.offset_y, 0.0);
        assert!(metrics.offset_x > 0.0);

        let world = Vec2::new(125.0, 275.0);
        let round_trip = metrics.to_world(metrics.to_screen(world));
        assert!((round_trip - world).length() < 1e-3);
    }

    #[test]
    fn confirm_action_only_set_when_cursor_inside_grid() {
        let grid = grid();
        let metrics = SceneMetrics::from_grid(&grid, 800.0, 700.0);

        let inside = gather_frame_input_from_observations(
            &grid,
            &metrics,
            Vec2::new(125.0, 275.0),
            true,
        );
        assert!(inside.confirm_action);
        assert_eq!(inside.cursor_world_space, Some(Vec2::new(125.0, 275.0)));

        let outside = gather_frame_input_from_observations(
            &grid,
            &metrics,
            Vec2::new(810.0, 10.0),
            true,
        );
        assert_eq!(outside, FrameInput::default());
    }

    #[test]
    fn hovered_tower_is_found_by_cell() {
        let mut scene = Scene::new(
            grid(),
            PathPresentation::new(Vec::new(), 40.0, Color::from_rgb_u8(128, 128, 128)),
            tower_defense_core::EconomySnapshot {
                money: 0,
                kill_count: 0,
                leaked_count: 0,
                leak_limit: 10,
            },
        );
        let tower = SceneTower {
            position: Vec2::new(60.0, 110.0),
            range: 100.0,
        };
        scene.towers.push(tower);

        scene.hovered_cell = Some(CellCoord::new(1, 2));
        assert_eq!(hovered_tower(&scene), Some(tower));

        scene.hovered_cell = Some(CellCoord::new(2, 2));
        assert_eq!(hovered_tower(&scene), None);
    }

    #[test]
    fn fps_counter_reports_after_one_second() {
        let mut counter = FpsCounter::default();
        let frame = Duration::from_millis(250);
        let render = Duration::from_millis(2);

        for _ in 0..3 {
            assert!(counter.record_frame(frame, render).is_none());
        }
        let metrics = counter
            .record_frame(frame, render)
            .expect("one second elapsed");

        assert!((metrics.per_second - 4.0).abs() < 1e-5);
        assert_eq!(metrics.avg_render, Duration::from_millis(2));
        assert_eq!(counter.frames, 0);
    }
}
