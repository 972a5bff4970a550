//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "semu")]
#[command(
    author,
    version,
    about = "AI tax assistant for Korean solo proprietors"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rebuild the similarity index from the knowledge corpus
    Index,

    /// Ask a tax question
    Ask(AskArgs),

    /// Classify an expense into an account category
    Classify(ClassifyArgs),

    /// Show pipeline status
    Status,
}

#[derive(Args)]
pub struct AskArgs {
    /// The question, in natural language
    pub question: Vec<String>,

    /// Conversation session id (generated when omitted)
    #[arg(long)]
    pub session: Option<String>,

    /// Originating channel recorded with usage
    #[arg(long, default_value = "cli")]
    pub channel: String,
}

#[derive(Args)]
pub struct ClassifyArgs {
    /// Expense description
    pub description: Vec<String>,

    /// Amount in won
    #[arg(long)]
    pub amount: Option<f64>,

    /// Vendor or merchant name
    #[arg(long)]
    pub vendor: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Cli,
    Json,
}
