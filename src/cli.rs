use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::filter::LevelFilter;

use crate::grid::GridDimension;
use crate::player::GameMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Single player, racing the clock
    #[value(name = "1p")]
    OnePlayer,
    /// Two players on one keyboard
    #[value(name = "2p")]
    TwoPlayers,
    /// Against the computer
    Ai,
}

impl From<ModeArg> for GameMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::OnePlayer => GameMode::Single,
            ModeArg::TwoPlayers => GameMode::VsPlayer,
            ModeArg::Ai => GameMode::VsAi,
        }
    }
}

/// Terminal memory card game.
#[derive(Debug, Parser)]
#[command(name = "tmemory", version, about)]
pub struct Args {
    /// Game mode preselected on the menu
    #[arg(short, long, value_enum, default_value_t = ModeArg::OnePlayer)]
    pub mode: ModeArg,

    /// Grid as ROWSxCOLS, e.g. 4x4 (even card count, sides 1-12)
    #[arg(short, long)]
    pub grid: Option<GridDimension>,

    /// RNG seed for reproducible deals and AI choices
    #[arg(long)]
    pub seed: Option<u64>,

    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "info")]
    pub log_level: LevelFilter,

    /// Where scores and the log file live (defaults to the platform data dir)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["tmemory"]).unwrap();
        assert_eq!(GameMode::from(args.mode), GameMode::Single);
        assert_eq!(args.grid, None);
        assert_eq!(args.log_level, LevelFilter::INFO);
        assert_eq!(args.seed, None);
    }

    #[test]
    fn parses_mode_grid_and_seed() {
        let args =
            Args::try_parse_from(["tmemory", "-m", "ai", "--grid", "6x6", "--seed", "7"]).unwrap();
        assert_eq!(GameMode::from(args.mode), GameMode::VsAi);
        assert_eq!(args.grid, GridDimension::new(6, 6).ok());
        assert_eq!(args.seed, Some(7));

        let args = Args::try_parse_from(["tmemory", "--mode", "2p"]).unwrap();
        assert_eq!(GameMode::from(args.mode), GameMode::VsPlayer);
    }

    #[test]
    fn rejects_unplayable_grids() {
        assert!(Args::try_parse_from(["tmemory", "-g", "3x3"]).is_err());
        assert!(Args::try_parse_from(["tmemory", "-g", "13x2"]).is_err());
        assert!(Args::try_parse_from(["tmemory", "-g", "four"]).is_err());
    }
}
