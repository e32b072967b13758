//! Vitrine CLI - headless host for live snippet previews.

mod colors;
mod render;
mod scope;
mod session;
mod watch;
mod watcher;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "vitrine")]
#[command(about = "Headless host for Vitrine live previews")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a snippet file once and print the result
    Render {
        #[command(flatten)]
        snippet: session::SnippetArgs,
    },

    /// Evaluate a snippet file and re-evaluate on every change
    Watch {
        #[command(flatten)]
        snippet: session::SnippetArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Render { snippet } => render::execute(&snippet).await?,
        Commands::Watch { snippet } => watch::execute(&snippet).await?,
    }

    Ok(())
}
