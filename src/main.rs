//! Coursemap CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "coursemap")]
#[command(about = "Course module prerequisite graph service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file path (defaults to ./coursemap.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the graph server
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Seed course data from a JSON export
        #[arg(short, long)]
        data: Option<PathBuf>,
    },
    /// Audit a JSON export for integrity violations and exit
    Check {
        /// Exported course-module rows
        file: PathBuf,
    },
    /// Fetch a course's rows from a remote coursemap API
    Pull {
        /// Base URL of the remote API
        #[arg(long)]
        url: String,

        /// Course code to fetch
        #[arg(long)]
        course: String,

        /// Write the export here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "coursemap={}",
            log_level
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Coursemap v{}", env!("CARGO_PKG_VERSION"));

    let config = config::Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { port, host, data } => {
            let host = host
                .or(config.host)
                .unwrap_or_else(|| "127.0.0.1".to_string());
            let port = port.or(config.port).unwrap_or(7890);
            let data = data.or(config.data);
            commands::serve(host, port, data).await
        }
        Commands::Check { file } => commands::check(&file),
        Commands::Pull {
            url,
            course,
            output,
        } => commands::pull(&url, &course, output).await,
        Commands::Version => {
            println!("Coursemap v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
