//! # clipper: Article Metadata Enrichment CLI
//!
//! The command-line entry point. `extract` prints the metadata recovered from a
//! single article URL; `enrich` fills the rows of a Notion database with the
//! metadata of the article each row links to.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract publication, author, date and content from one article URL
    Extract(ExtractArgs),
    /// Enrich the rows of a Notion database with article metadata
    Enrich(EnrichArgs),
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// The article URL to fetch
    pub url: String,
    /// Print the metadata and the extraction trace as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct EnrichArgs {
    /// The Notion database to enrich
    pub database_id: String,

    /// Field holding each row's article URL
    #[arg(long)]
    pub url_field: Option<String>,
    /// Field receiving the publication name
    #[arg(long)]
    pub publication_field: Option<String>,
    /// Field receiving the author(s)
    #[arg(long)]
    pub author_field: Option<String>,
    /// Field receiving the publish date
    #[arg(long)]
    pub date_field: Option<String>,
    /// Field receiving the summary
    #[arg(long)]
    pub summary_field: Option<String>,

    /// Rows fetched concurrently per batch
    #[arg(long, default_value_t = 5)]
    pub batch_size: usize,
    /// Maximum number of rows processed
    #[arg(long, default_value_t = 100)]
    pub limit: usize,
    /// Pause between batches, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub batch_delay_ms: u64,
    /// Write a one-sentence summary of the content
    #[arg(long)]
    pub summary: bool,
    /// Report failures without their underlying error messages
    #[arg(long)]
    pub silent_errors: bool,

    /// Notion integration token
    #[arg(long, env = "NOTION_TOKEN", hide_env_values = true)]
    pub notion_token: String,
    /// Notion API version
    #[arg(long, env = "NOTION_VERSION", default_value = clipper_notion::DEFAULT_NOTION_VERSION)]
    pub notion_version: String,
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Extract(args) => commands::handle_extract(&args).await,
        Commands::Enrich(args) => commands::handle_enrich(&args).await,
    }
}
