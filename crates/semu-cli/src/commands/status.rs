//! Status command

use crate::app::OutputFormat;
use anyhow::Result;
use semu_core::{Config, GenerationRouter, RetrievalRouter};

pub fn run(
    config: &Config,
    retrieval: &RetrievalRouter,
    generation: &GenerationRouter,
    format: OutputFormat,
) -> Result<()> {
    let providers = generation.provider_names();

    match format {
        OutputFormat::Json => {
            let status = serde_json::json!({
                "data_dir": config.data_dir,
                "retrieval": {
                    "backend": retrieval.backend_info(),
                    "ready": retrieval.is_ready(),
                },
                "generation": {
                    "providers": providers,
                    "configured": generation.is_configured(),
                },
                "embedding": {
                    "model": config.embedding.model,
                    "dimensions": config.embedding.dimensions,
                },
            });
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        OutputFormat::Cli => {
            println!("Data dir:    {}", config.data_dir.display());
            println!();
            println!("Retrieval:");
            println!("  Backend:   {}", retrieval.backend_info());
            println!("  Ready:     {}", retrieval.is_ready());
            println!();
            println!("Generation:");
            if providers.is_empty() {
                println!("  Providers: (none configured)");
            } else {
                println!("  Providers: {}", providers.join(" -> "));
            }
            println!();
            println!("Embedding:");
            println!("  Model:     {}", config.embedding.model);
            println!("  Dims:      {}", config.embedding.dimensions);
        }
    }
    Ok(())
}
