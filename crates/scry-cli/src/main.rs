//! Scry CLI - Terminal mirror client
//!
//! Connects to a state server and mirrors whatever UI it describes.

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;

/// Scry - a terminal mirror for server-driven UIs
///
/// The server owns all application state; scry renders the latest snapshot
/// it was sent and reports your input back.
#[derive(Parser)]
#[command(name = "scry")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to a state server and render its UI
    Connect {
        /// WebSocket endpoint
        #[arg(short, long, default_value = "ws://localhost:1337")]
        endpoint: String,

        /// Session identifier (random per run if omitted)
        #[arg(short, long)]
        session: Option<String>,

        /// Quiescence window for slider emissions, in milliseconds
        #[arg(long, default_value = "500")]
        quiescence_ms: u64,

        /// Reconnect after a drop, with this many seconds between attempts
        #[arg(long)]
        reconnect_secs: Option<u64>,

        /// Give up after this many consecutive failed connection attempts
        #[arg(long, default_value = "5")]
        max_attempts: u32,

        /// Show the mirrored state as JSON below the widgets
        #[arg(long)]
        dump_state: bool,
    },

    /// Render a snapshot file once and exit
    Inspect {
        /// Input snapshot file (JSON)
        input: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging; stderr keeps the alternate screen clean
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_ansi(!cli.no_color)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Connect {
            endpoint,
            session,
            quiescence_ms,
            reconnect_secs,
            max_attempts,
            dump_state,
        } => {
            commands::connect::run(
                endpoint,
                session,
                quiescence_ms,
                reconnect_secs,
                max_attempts,
                dump_state,
            )
            .await?;
        }

        Commands::Inspect { input } => {
            commands::inspect::run(&input)?;
        }
    }

    Ok(())
}
