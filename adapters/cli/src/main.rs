#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Tower Defense experience.

mod args;
mod session;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use tower_defense_rendering::{Color, Presentation, RenderingBackend};
use tower_defense_rendering_macroquad::MacroquadBackend;
use tower_defense_simulation::Simulation;
use tower_defense_world::query;

use crate::{
    args::{CellArg, CliArgs},
    session::{builder_input, Session},
};

/// Entry point for the Tower Defense command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let args = CliArgs::parse();

    let simulation = Simulation::new();
    info!("{}", query::welcome_banner(simulation.world()));

    let mut session = Session::new(simulation);
    for CellArg(cell) in &args.placements {
        if session.place(*cell).is_none() {
            warn!("could not place a tower at {cell:?}");
        }
    }

    if args.headless {
        run_headless(session, args.frames, Duration::from_millis(args.frame_ms));
        return Ok(());
    }

    run_windowed(session, &args)
}

fn run_headless(mut session: Session, frames: u32, frame: Duration) {
    let mut now = Duration::ZERO;
    for _ in 0..frames {
        now += frame;
        session.frame(now, builder_input(None, false));
    }

    let summary = session.summary();
    info!("headless run finished: {summary}");
    println!("{summary}");
}

fn run_windowed(mut session: Session, args: &CliArgs) -> Result<()> {
    let scene = session
        .scene()
        .context("failed to describe the play field")?;
    let presentation = Presentation::new("Tower Defense", Color::from_rgb_u8(255, 255, 255), scene);
    let backend = MacroquadBackend::new()
        .with_vsync(args.vsync())
        .with_show_fps(args.show_fps);

    let mut now = Duration::ZERO;
    backend
        .run(presentation, move |dt, input, scene| {
            now += dt;
            let input = builder_input(input.cursor_world_space, input.confirm_action);
            session.frame(now, input);
            session.populate(scene, input);
        })
        .context("rendering backend failed")
}
