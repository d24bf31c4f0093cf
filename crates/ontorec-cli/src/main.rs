use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "ontorec")]
#[command(about = "ontorec - ontology-based search query recommendations", long_about = None)]
struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend follow-up searches for a query
    Recommend(commands::recommend::RecommendArgs),
    /// Build or run deferred recommendation requests
    Deferred {
        #[command(subcommand)]
        action: DeferredAction,
    },
    /// Encode, decode, store or recall recommendation memory tokens
    Memory {
        #[command(subcommand)]
        action: MemoryAction,
    },
}

#[derive(Subcommand)]
enum DeferredAction {
    /// Print the query string of a deferred request
    Build(commands::deferred::BuildArgs),
    /// Run a deferred request query string
    Run(commands::deferred::RunArgs),
}

#[derive(Subcommand)]
enum MemoryAction {
    /// Encode a memory token
    Encode(commands::memory::EncodeArgs),
    /// Decode a memory token
    Decode {
        /// Token as found in a recommendation record
        token: String,
    },
    /// Store a memory token in the session store
    Remember {
        /// Memory key of the recommendation record
        key: String,
        /// Token of the recommendation record
        token: String,
    },
    /// Read the memory token stored for a followed link
    Recall(commands::memory::RecallArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_json);

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Recommend(args) => commands::recommend::run(config, args).await?,
        Commands::Deferred { action } => match action {
            DeferredAction::Build(args) => commands::deferred::build(config, args)?,
            DeferredAction::Run(args) => commands::deferred::run(config, args).await?,
        },
        Commands::Memory { action } => match action {
            MemoryAction::Encode(args) => commands::memory::encode(args)?,
            MemoryAction::Decode { token } => commands::memory::decode(&token)?,
            MemoryAction::Remember { key, token } => {
                commands::memory::remember(config, &key, &token).await?
            }
            MemoryAction::Recall(args) => commands::memory::recall(config, args).await?,
        },
    }

    Ok(())
}
