//! mbird CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "mbird")]
#[command(about = "Project tree editor and backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Console config directory (defaults to $MBIRD_CONFIG_DIR or ~/.mbird)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the backend server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,
    },
    /// List directories through a running backend
    Browse {
        /// Backend base URL (defaults to $MBIRD_BACKEND_URL)
        #[arg(long)]
        backend: Option<String>,

        /// Directory to list (defaults to the backend's starting directory)
        path: Option<String>,
    },
    /// Print the tree stored in a project directory
    Tree {
        dir: PathBuf,
    },
    /// Add a child node to a project on disk
    AddChild {
        dir: PathBuf,

        /// Id of the node to add under
        #[arg(long)]
        parent: String,

        /// Id of the new node
        #[arg(long)]
        id: String,
    },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!("mbird={}", log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::debug!("mbird v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Serve { port, host, open } => {
            commands::serve(cli.config_dir, host, port, open).await
        }
        Commands::Browse { backend, path } => commands::browse(backend, path).await,
        Commands::Tree { dir } => commands::tree(&dir),
        Commands::AddChild { dir, parent, id } => commands::add_child(&dir, &parent, &id),
        Commands::Version => {
            println!("mbird v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
