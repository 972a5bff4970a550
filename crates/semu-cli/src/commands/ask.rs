//! Ask command

use crate::app::{AskArgs, OutputFormat};
use anyhow::Result;
use semu_core::Advisor;

pub async fn run(args: AskArgs, advisor: &Advisor, format: OutputFormat) -> Result<()> {
    let question = args.question.join(" ");
    if question.trim().is_empty() {
        anyhow::bail!("question must not be empty");
    }

    let outcome = advisor.ask("cli", &question, args.session, &args.channel).await;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        OutputFormat::Cli => {
            println!("{}", outcome.answer.answer);

            if let Some(deductible) = outcome.answer.is_deductible {
                let verdict = if deductible {
                    "경비 인정"
                } else {
                    "경비 불인정"
                };
                match outcome.category_name {
                    Some(ref name) => println!("\n판단: {} ({})", verdict, name),
                    None => println!("\n판단: {}", verdict),
                }
            }
            if let Some(confidence) = outcome.answer.confidence {
                println!("신뢰도: {:.0}%", confidence * 100.0);
            }
            if let Some(ref legal_basis) = outcome.answer.legal_basis {
                println!("법령 근거: {}", legal_basis);
            }
            if !outcome.references.is_empty() {
                println!("\n참고:");
                for reference in &outcome.references {
                    println!("  - {}", reference);
                }
            }
            println!("\nsession: {}", outcome.session_id);
        }
    }
    Ok(())
}
