//! Classify command

use crate::app::{ClassifyArgs, OutputFormat};
use anyhow::Result;
use semu_core::Advisor;

pub async fn run(args: ClassifyArgs, advisor: &Advisor, format: OutputFormat) -> Result<()> {
    let description = args.description.join(" ");
    if description.trim().is_empty() {
        anyhow::bail!("description must not be empty");
    }

    let classification = advisor
        .classify(&description, args.amount, args.vendor.as_deref())
        .await;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&classification)?);
        }
        OutputFormat::Cli => {
            println!(
                "{} ({})",
                classification.category_name, classification.category_code
            );
            println!(
                "경비 인정: {}",
                if classification.is_deductible {
                    "가능"
                } else {
                    "불가"
                }
            );
            println!("신뢰도: {:.0}%", classification.confidence * 100.0);
            println!("이유: {}", classification.reason);
        }
    }
    Ok(())
}
