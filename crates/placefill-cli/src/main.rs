mod config;
mod display;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use placefill_ai::{OpenAiClient, ResilientGenerator, TextGenerator};
use placefill_pipeline::Enricher;
use placefill_store::NotionStore;
use placefill_sync::{KakaoClient, PlacesClient};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{Cli, Settings};

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}

fn build_enricher(settings: &Settings) -> Enricher {
    let store = Arc::new(NotionStore::new(
        settings.notion_token.clone(),
        settings.database_id.clone(),
    ));
    let mut enricher = Enricher::new(settings.enrich.clone(), store);

    if let Some(key) = &settings.kakao_key {
        enricher = enricher.with_keyword_search(Arc::new(KakaoClient::new(key.clone())));
    } else {
        info!("keyword search skipped");
    }

    match &settings.places_key {
        Some(key) => {
            let client = PlacesClient::new(key.clone(), settings.search.clone());
            enricher = enricher.with_rich_search(Arc::new(client));
        }
        None => warn!("GOOGLE_PLACES_API_KEY not set; rating, map, photo and price will stay empty"),
    }

    let llm: Option<Arc<dyn TextGenerator>> = match &settings.openai_key {
        Some(key) => Some(Arc::new(OpenAiClient::new(
            key.clone(),
            settings.openai_model.clone(),
        ))),
        None => {
            warn!("OPENAI_API_KEY not set; summaries and tags use their fallbacks");
            None
        }
    };
    enricher.with_generator(ResilientGenerator::new(llm))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    info!("placefill v{}", env!("CARGO_PKG_VERSION"));

    let settings =
        Settings::resolve(cli, |name| std::env::var(name).ok()).context("invalid configuration")?;
    let enricher = build_enricher(&settings);

    let report = enricher
        .run_batch()
        .await
        .context("querying pending records")?;
    print!("{}", display::render_report(&report));
    Ok(())
}
