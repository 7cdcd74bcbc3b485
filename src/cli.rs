use clap::{Parser, Subcommand};

use crate::commands;
use crate::constants::DEFAULT_PORT;

#[derive(Parser)]
#[command(name = "sunchandi")]
#[command(about = "Nepal gold & silver retail price tracker", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Refresh prices once and print the latest retail quotes
    Pull,
    /// Start the API server with the background refresh worker
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
    /// Show what is currently cached, without touching the network
    Status,
}

pub async fn run() {
    // Initialize tracing once for every subcommand
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Pull => {
            commands::pull::run().await;
        }
        Commands::Serve { port } => {
            commands::serve::run(port).await;
        }
        Commands::Status => {
            commands::status::run().await;
        }
    }
}
