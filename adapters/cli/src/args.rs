//! Command-line arguments accepted by the `tower-defense` binary.

use std::str::FromStr;

use clap::Parser;
use thiserror::Error;
use tower_defense_core::CellCoord;

/// Launches the Tower Defense game or a scripted headless run.
#[derive(Debug, Parser)]
#[command(name = "tower-defense", version, about)]
pub(crate) struct CliArgs {
    /// Runs the simulation without opening a window and prints a summary.
    #[arg(long)]
    pub(crate) headless: bool,
    /// Number of frames simulated by a headless run.
    #[arg(long, default_value_t = 3_600, value_name = "N")]
    pub(crate) frames: u32,
    /// Simulated milliseconds per headless frame.
    #[arg(
        long = "frame-ms",
        default_value_t = 16,
        value_name = "MS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub(crate) frame_ms: u64,
    /// Places a tower in the given grid cell before the run starts.
    #[arg(long = "place", value_name = "COL,ROW")]
    pub(crate) placements: Vec<CellArg>,
    /// Synchronises presentation with the display refresh rate (default).
    #[arg(long, overrides_with = "no_vsync")]
    vsync: bool,
    /// Renders frames as fast as possible.
    #[arg(long = "no-vsync", overrides_with = "vsync")]
    no_vsync: bool,
    /// Prints frame timing once per second in windowed mode.
    #[arg(long = "show-fps")]
    pub(crate) show_fps: bool,
}

impl CliArgs {
    /// Whether the windowed backend should enable vsync.
    #[must_use]
    pub(crate) fn vsync(&self) -> bool {
        self.vsync || !self.no_vsync
    }
}

/// Grid cell parsed from a `COL,ROW` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct CellArg(pub(crate) CellCoord);

/// Reasons a `COL,ROW` pair could not be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum CellArgError {
    /// The value did not contain exactly one comma.
    #[error("expected COL,ROW but received `{0}`")]
    Shape(String),
    /// One of the components was not a non-negative integer.
    #[error("`{0}` is not a valid grid index")]
    Index(String),
}

impl FromStr for CellArg {
    type Err = CellArgError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut parts = value.split(',');
        let (Some(column), Some(row), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(CellArgError::Shape(value.to_owned()));
        };

        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|_| CellArgError::Index(part.trim().to_owned()))
        };

        Ok(Self(CellCoord::new(parse(column)?, parse(row)?)))
    }
}
