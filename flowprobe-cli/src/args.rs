use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::output::OutputFormat;

#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Args, Clone)]
pub struct LogArgs {
    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,
}

#[derive(Debug, Args, Clone)]
pub struct InputArgs {
    /// JSON or YAML object merged over the flow's initialInputs.
    #[arg(long)]
    pub inputs: Option<PathBuf>,
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set_inputs: Vec<String>,
}

#[derive(Debug, Args, Clone)]
pub struct EngineArgs {
    /// Default request timeout in milliseconds.
    #[arg(long, default_value_t = 30000)]
    pub timeout: u64,
    #[arg(long, default_value_t = 4_194_304)]
    pub max_response_bytes: usize,
}
