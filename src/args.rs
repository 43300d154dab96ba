use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use lira_backend::Strategy;
use lira_common::lir::MAX_ALLOCATABLE;

/// a register allocator for a small low-level IR.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
#[command(propagate_version = true)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Command,
}

impl Arguments {
    pub fn options(&self) -> &Options {
        self.command.options()
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print every method with physical registers and spill code.
    #[command(visible_alias = "a")]
    Alloc(Options),

    /// Print assembly for every method.
    Asm(Options),

    /// Allocate and verify, printing only a summary.
    #[command(visible_alias = "c")]
    Check(Options),
}

impl Command {
    pub fn options(&self) -> &Options {
        match self {
            Self::Alloc(opts) => opts,
            Self::Asm(opts) => opts,
            Self::Check(opts) => opts,
        }
    }
}

#[derive(Debug, Args)]
pub struct Options {
    /// The allocation algorithm.
    #[arg(short, long, value_enum, default_value_t = StrategyArg::Linear)]
    pub strategy: StrategyArg,

    /// How many allocatable registers to use.
    #[arg(short, long, default_value_t = MAX_ALLOCATABLE)]
    pub registers: usize,

    /// Allocate this many methods at once.
    #[arg(short, long, default_value_t = 1)]
    pub jobs: usize,

    /// Log more; may be repeated.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(required = true)]
    pub path: PathBuf,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum StrategyArg {
    Naive,
    Linear,
    Graph,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Naive => Strategy::Naive,
            StrategyArg::Linear => Strategy::Linear,
            StrategyArg::Graph => Strategy::Graph,
        }
    }
}
