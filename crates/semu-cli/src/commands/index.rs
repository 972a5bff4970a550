//! Index command

use anyhow::Result;
use semu_core::RetrievalRouter;

pub async fn run(retrieval: &RetrievalRouter) -> Result<()> {
    let count = retrieval.rebuild().await?;
    println!("Indexed {} documents", count);
    Ok(())
}
