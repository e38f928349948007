use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "sipwell", version, about = "Sipwell water reminder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the reminder coordinator
    Run,
    /// Settings management
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Log a drink
    Log {
        /// Amount to log; defaults to the configured intake step
        amount: Option<u32>,
    },
    /// Show today's progress
    Today,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run => commands::run::run().await,
        Commands::Settings { action } => commands::settings::run(action),
        Commands::Log { amount } => commands::log::run(amount),
        Commands::Today => commands::today::run(),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
