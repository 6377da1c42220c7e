use std::path::PathBuf;

use clap::Subcommand;

use crate::args::*;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Execute a flow and report every node result.
    Run {
        path: PathBuf,
        #[command(flatten)]
        inputs: InputArgs,
        #[command(flatten)]
        engine: EngineArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Check a flow without running it.
    Validate {
        path: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Show execution levels and per-node inputs and outputs.
    Plan {
        path: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// List extractors with their output type and compatible operators.
    Operators {
        #[command(flatten)]
        output: OutputArgs,
    },
}
