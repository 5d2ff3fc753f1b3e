//! Command handlers.

use crate::{EnrichArgs, ExtractArgs};
use anyhow::{Context, Result};
use clipper::{run_enrichment, EnrichOptions, FieldOverrides};
use clipper_html::ArticleExtractor;
use clipper_notion::NotionClient;
use std::time::Duration;
use tracing::info;

pub async fn handle_extract(args: &ExtractArgs) -> Result<()> {
    let extractor = ArticleExtractor::new()?;
    let extraction = extractor
        .extract_url(&args.url)
        .await
        .with_context(|| format!("Failed to extract metadata from {}", args.url))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&extraction)?);
    } else {
        let metadata = &extraction.metadata;
        println!("Publication: {}", metadata.publication);
        println!("Author: {}", metadata.author);
        println!("Date: {}", metadata.date);
        println!("Content: {}", metadata.content);
    }
    Ok(())
}

pub async fn handle_enrich(args: &EnrichArgs) -> Result<()> {
    let store = NotionClient::new(&args.notion_token, &args.notion_version)?;
    let extractor = ArticleExtractor::new()?;
    let options = enrich_options(args);

    info!(
        "Enriching Notion database {} (batch size {}, limit {})",
        options.collection_id, options.batch_size, options.limit
    );
    let report = run_enrichment(&store, &extractor, &options)
        .await
        .context("Enrichment aborted")?;
    println!("{report}");
    Ok(())
}

pub fn enrich_options(args: &EnrichArgs) -> EnrichOptions {
    EnrichOptions {
        collection_id: args.database_id.clone(),
        overrides: FieldOverrides {
            url: args.url_field.clone(),
            publication: args.publication_field.clone(),
            author: args.author_field.clone(),
            date: args.date_field.clone(),
            summary: args.summary_field.clone(),
        },
        batch_size: args.batch_size,
        limit: args.limit,
        generate_summary: args.summary,
        silent_errors: args.silent_errors,
        batch_delay: Duration::from_millis(args.batch_delay_ms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cli, Commands};
    use clap::Parser;

    fn parse_enrich(argv: &[&str]) -> EnrichArgs {
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Enrich(args) => args,
            other => panic!("expected enrich, got {other:?}"),
        }
    }

    #[test]
    fn test_enrich_defaults() {
        let args = parse_enrich(&["clipper", "enrich", "db-1", "--notion-token", "secret"]);
        let options = enrich_options(&args);

        assert_eq!(options.collection_id, "db-1");
        assert_eq!(options.batch_size, 5);
        assert_eq!(options.limit, 100);
        assert_eq!(options.batch_delay, Duration::from_secs(1));
        assert!(!options.generate_summary);
        assert!(!options.silent_errors);
        assert_eq!(options.overrides, FieldOverrides::default());
    }

    #[test]
    fn test_enrich_overrides() {
        let args = parse_enrich(&[
            "clipper",
            "enrich",
            "db-1",
            "--notion-token",
            "secret",
            "--url-field",
            "Link",
            "--author-field",
            "Byline",
            "--batch-size",
            "2",
            "--limit",
            "7",
            "--batch-delay-ms",
            "250",
            "--summary",
            "--silent-errors",
        ]);
        let options = enrich_options(&args);

        assert_eq!(options.overrides.url.as_deref(), Some("Link"));
        assert_eq!(options.overrides.author.as_deref(), Some("Byline"));
        assert_eq!(options.overrides.date, None);
        assert_eq!(options.batch_size, 2);
        assert_eq!(options.limit, 7);
        assert_eq!(options.batch_delay, Duration::from_millis(250));
        assert!(options.generate_summary);
        assert!(options.silent_errors);
    }

    #[test]
    fn test_extract_args() {
        let cli = Cli::try_parse_from(["clipper", "extract", "https://news.example/a", "--json"]).unwrap();
        match cli.command {
            Commands::Extract(args) => {
                assert_eq!(args.url, "https://news.example/a");
                assert!(args.json);
            }
            other => panic!("expected extract, got {other:?}"),
        }
    }
}
