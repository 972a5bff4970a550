//! Semu CLI
//!
//! Retrieval-augmented tax consultation from the command line.

use anyhow::Result;
use clap::Parser;
use semu_core::{Advisor, Config, GenerationRouter, HttpEmbedder, RetrievalRouter, UnmeteredGate};
use std::sync::Arc;

mod app;
mod commands;

use app::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_level.into()),
        )
        .init();

    let config = Config::load()?;

    let embedder: Arc<dyn semu_core::Embedder> = Arc::new(HttpEmbedder::new(config.embedding.clone())?);
    let retrieval = Arc::new(RetrievalRouter::from_config(&config, embedder).await?);
    let generation = Arc::new(GenerationRouter::from_config(&config.generation)?);
    let advisor = Advisor::new(retrieval.clone(), generation.clone(), Arc::new(UnmeteredGate))
        .with_top_k(config.retrieval.top_k);

    match cli.command {
        Commands::Index => commands::index::run(&retrieval).await,
        Commands::Ask(args) => commands::ask::run(args, &advisor, cli.format).await,
        Commands::Classify(args) => commands::classify::run(args, &advisor, cli.format).await,
        Commands::Status => commands::status::run(&config, &retrieval, &generation, cli.format),
    }
}
