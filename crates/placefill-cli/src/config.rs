//! Command-line and environment configuration.
//!
//! Everything is readable from the environment. Two legacy variable names
//! are honoured as fallbacks: `NOTION_KEY` for the Notion token and
//! `KAKAO_REST_API` for the Kakao key.

use clap::builder::FalseyValueParser;
use clap::{Parser, ValueEnum};
use placefill_ai::{DEFAULT_LOCALITY, DEFAULT_MODEL};
use placefill_core::{ForceFlags, TagTrigger};
use placefill_pipeline::{DEFAULT_BIAS, EnrichConfig};
use placefill_store::DEFAULT_PAGE_SIZE;
use placefill_sync::{LocationBias, SearchOptions};
use thiserror::Error;

/// Largest page the Notion query endpoint returns.
const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing {what}: set {env} or pass {flag}")]
    Missing {
        what: &'static str,
        env: &'static str,
        flag: &'static str,
    },
    #[error("batch size must be between 1 and 100, got {0}")]
    BatchSize(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TriggerArg {
    /// Classify when any tag class is empty.
    Any,
    /// Classify only when all tag classes are empty.
    All,
}

impl From<TriggerArg> for TagTrigger {
    fn from(arg: TriggerArg) -> Self {
        match arg {
            TriggerArg::Any => TagTrigger::AnyEmpty,
            TriggerArg::All => TagTrigger::AllEmpty,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "placefill",
    version,
    about = "Fill missing place details in a Notion database"
)]
pub struct Cli {
    /// Notion integration token (falls back to NOTION_KEY)
    #[arg(long, env = "NOTION_TOKEN", hide_env_values = true)]
    pub notion_token: Option<String>,

    /// Notion database holding the place records
    #[arg(long, env = "NOTION_DATABASE_ID")]
    pub database_id: Option<String>,

    /// Kakao Local REST key (falls back to KAKAO_REST_API)
    #[arg(long, env = "KAKAO_REST_API_KEY", hide_env_values = true)]
    pub kakao_key: Option<String>,

    /// OpenAI key; without it summaries and tags use their fallbacks
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_key: Option<String>,

    #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_MODEL)]
    pub openai_model: String,

    /// Google Places key; without it rating, map, photo and price stay empty
    #[arg(long, env = "GOOGLE_PLACES_API_KEY", hide_env_values = true)]
    pub places_key: Option<String>,

    /// Do not call keyword search or write the match link
    #[arg(long, env = "SKIP_KAKAO", value_parser = FalseyValueParser::new())]
    pub skip_keyword_search: bool,

    /// Regenerate summaries even when present
    #[arg(long, env = "FORCE_SUMMARY", value_parser = FalseyValueParser::new())]
    pub force_summary: bool,

    /// Reclassify tags even when present
    #[arg(long, env = "FORCE_TAGS", value_parser = FalseyValueParser::new())]
    pub force_tags: bool,

    /// Refetch rating, map, photo and price even when present
    #[arg(long, env = "FORCE_RICH", value_parser = FalseyValueParser::new())]
    pub force_rich: bool,

    #[arg(long, value_enum, default_value_t = TriggerArg::Any)]
    pub tag_trigger: TriggerArg,

    /// Locality used in fallback summaries when a record has none
    #[arg(long, env = "PLACEFILL_LOCALITY", default_value = DEFAULT_LOCALITY)]
    pub default_locality: String,

    /// Records fetched per run
    #[arg(long, env = "PLACEFILL_BATCH_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    pub batch_size: usize,

    /// Only process records with this checkbox ticked
    #[arg(long, env = "PLACEFILL_INCLUDE_FLAG")]
    pub include_flag: Option<String>,

    #[arg(long, default_value_t = DEFAULT_BIAS.lat, allow_negative_numbers = true)]
    pub bias_lat: f64,

    #[arg(long, default_value_t = DEFAULT_BIAS.lng, allow_negative_numbers = true)]
    pub bias_lng: f64,

    /// Bias radius in metres
    #[arg(long, default_value_t = DEFAULT_BIAS.radius_m)]
    pub bias_radius: f64,

    /// Search without a location bias
    #[arg(long)]
    pub no_bias: bool,

    /// Result language for rich search
    #[arg(long, default_value = "ko")]
    pub language: String,

    /// Resolve everything but write nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Debug-level logging
    #[arg(short, long, env = "VERBOSE", value_parser = FalseyValueParser::new())]
    pub verbose: bool,
}

/// Validated settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub notion_token: String,
    pub database_id: String,
    pub kakao_key: Option<String>,
    pub openai_key: Option<String>,
    pub openai_model: String,
    pub places_key: Option<String>,
    pub search: SearchOptions,
    pub enrich: EnrichConfig,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Settings {
    /// Validate `cli`, consulting `lookup` for legacy variable names.
    pub fn resolve(
        cli: Cli,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let notion_token = non_blank(cli.notion_token)
            .or_else(|| non_blank(lookup("NOTION_KEY")))
            .ok_or(ConfigError::Missing {
                what: "Notion token",
                env: "NOTION_TOKEN",
                flag: "--notion-token",
            })?;
        let database_id = non_blank(cli.database_id).ok_or(ConfigError::Missing {
            what: "Notion database id",
            env: "NOTION_DATABASE_ID",
            flag: "--database-id",
        })?;

        let keyword_search = !cli.skip_keyword_search;
        let kakao_key = non_blank(cli.kakao_key).or_else(|| non_blank(lookup("KAKAO_REST_API")));
        if keyword_search && kakao_key.is_none() {
            return Err(ConfigError::Missing {
                what: "Kakao REST key",
                env: "KAKAO_REST_API_KEY",
                flag: "--kakao-key (or --skip-keyword-search)",
            });
        }

        if cli.batch_size == 0 || cli.batch_size > MAX_PAGE_SIZE {
            return Err(ConfigError::BatchSize(cli.batch_size));
        }

        let location_bias = (!cli.no_bias).then_some(LocationBias {
            lat: cli.bias_lat,
            lng: cli.bias_lng,
            radius_m: cli.bias_radius,
        });

        let enrich = EnrichConfig {
            force: ForceFlags {
                summary: cli.force_summary,
                tags: cli.force_tags,
                rich: cli.force_rich,
            },
            tag_trigger: cli.tag_trigger.into(),
            keyword_search,
            default_locality: cli.default_locality,
            location_bias,
            page_size: cli.batch_size,
            include_flag: non_blank(cli.include_flag),
            dry_run: cli.dry_run,
            ..EnrichConfig::default()
        };

        Ok(Self {
            notion_token,
            database_id,
            kakao_key: kakao_key.filter(|_| keyword_search),
            openai_key: non_blank(cli.openai_key),
            openai_model: cli.openai_model,
            places_key: non_blank(cli.places_key),
            search: SearchOptions {
                language: cli.language,
                ..SearchOptions::default()
            },
            enrich,
        })
    }
}
