use clap::Parser;

mod args;
mod cmd;
mod commands;
mod exit_codes;
mod logging;
mod output;

pub use args::*;
use commands::Command;

#[derive(Debug, Parser)]
#[command(name = "flowprobe", version, about = "Declarative API test flow runner")]
struct Cli {
    #[command(flatten)]
    logging: LogArgs,
    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    logging::init(&cli.logging);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create tokio runtime: {e}");
            std::process::exit(exit_codes::RUNTIME_ERROR);
        }
    };

    let exit_code = rt.block_on(run_command(cli.command));
    std::process::exit(exit_code);
}

async fn run_command(command: Command) -> i32 {
    match command {
        Command::Run {
            path,
            inputs,
            engine,
            output,
        } => cmd::run::run_cmd(&path, inputs, engine, output).await,
        Command::Validate { path, output } => cmd::validate::validate_cmd(&path, output),
        Command::Plan { path, output } => cmd::plan::plan_cmd(&path, output),
        Command::Operators { output } => cmd::operators::operators_cmd(output),
    }
}
