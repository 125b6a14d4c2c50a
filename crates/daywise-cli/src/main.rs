use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "daywise", version, about = "Daywise agenda and productivity CLI")]
struct Cli {
    /// Use this config file instead of ~/.config/daywise/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive agenda session (commands are read from stdin)
    Session,
    /// Predict tomorrow's productivity (0-100)
    Predict(commands::predict::PredictArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let path = cli.config.as_deref();

    match cli.command {
        Commands::Session => commands::session::run(commands::config::load(path)?),
        Commands::Predict(args) => commands::predict::run(args, &commands::config::load(path)?),
        Commands::Config { action } => commands::config::run(action, path),
    }
}

/// Log to stderr so stdout stays machine-readable. RUST_LOG overrides the
/// default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
