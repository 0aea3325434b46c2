// Generator Expression CLI
// Evaluate, preprocess, split and check $<...> expressions from the command line

mod commands;
mod output;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use tracing_subscriber::EnvFilter;

use commands::{check, eval, preprocess, split};

#[derive(Parser, Debug)]
#[command(name = "genex")]
#[command(about = "Evaluate generator expressions against a build model")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate an expression for a configuration and target
    Eval(eval::EvalArgs),
    /// Resolve BUILD_INTERFACE / INSTALL_INTERFACE without a build context
    Preprocess(preprocess::PreprocessArgs),
    /// Split a ;-separated list without breaking expressions apart
    Split(split::SplitArgs),
    /// Evaluate every target property of a model for every configuration
    Check(check::CheckArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("GENEX_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Eval(args) => eval::execute(args),
        Commands::Preprocess(args) => preprocess::execute(args),
        Commands::Split(args) => split::execute(args),
        Commands::Check(args) => check::execute(args).await,
    }
}
