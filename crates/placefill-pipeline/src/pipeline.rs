use std::sync::Arc;

use chrono::Utc;
use placefill_ai::{ResilientGenerator, SummaryTask, TagSet, TagTask};
use placefill_core::{
    Category, Presence, Record, RecordField, RecordUpdate, best_match, build_query, diff, fill,
    merge::{needs_rich, needs_search, needs_summary, needs_tags},
};
use placefill_store::{PendingFilter, RecordStore};
use placefill_sync::{KeywordSearch, RichSearch, share_link};
use tracing::{debug, error, info, warn};

use crate::report::{BatchReport, OutcomeStatus, RecordOutcome};
use crate::{EnrichConfig, PipelineError};

/// Result of resolving one record, before anything is written.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub resolved: Record,
    pub update: RecordUpdate,
    pub summary_fallback: bool,
    pub provider_errors: Vec<String>,
}

#[derive(Default)]
struct StageNotes {
    summary_fallback: bool,
    keyword_failed: bool,
    provider_errors: Vec<String>,
}

impl StageNotes {
    fn provider_failed(
        &mut self,
        name: &str,
        provider: &str,
        stage: &str,
        err: impl std::fmt::Display,
    ) {
        warn!(name, provider, stage, error = %err, "provider call failed; skipping its fields");
        self.provider_errors.push(provider.to_string());
    }
}

/// Drives one batch: query, resolve each record, write partial updates.
///
/// Providers are optional. A missing keyword or rich provider simply leaves
/// its fields empty; a missing generator means every generated field uses
/// its deterministic fallback.
pub struct Enricher {
    config: EnrichConfig,
    store: Arc<dyn RecordStore>,
    keyword: Option<Arc<dyn KeywordSearch>>,
    rich: Option<Arc<dyn RichSearch>>,
    generator: ResilientGenerator,
}

impl Enricher {
    pub fn new(config: EnrichConfig, store: Arc<dyn RecordStore>) -> Self {
        Self {
            config,
            store,
            keyword: None,
            rich: None,
            generator: ResilientGenerator::unavailable(),
        }
    }

    pub fn with_keyword_search(mut self, provider: Arc<dyn KeywordSearch>) -> Self {
        self.keyword = Some(provider);
        self
    }

    pub fn with_rich_search(mut self, provider: Arc<dyn RichSearch>) -> Self {
        self.rich = Some(provider);
        self
    }

    pub fn with_generator(mut self, generator: ResilientGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn config(&self) -> &EnrichConfig {
        &self.config
    }

    /// The pending-record filter for this configuration.
    ///
    /// Fields no configured provider can fill are left out so records are
    /// not picked up forever for something this run cannot resolve. Tags
    /// have an empty fallback, so they need a generator.
    pub fn pending_filter(&self) -> PendingFilter {
        let keyword_on = self.config.keyword_search && self.keyword.is_some();
        let tags_on = self.generator.is_available();
        let any_empty = RecordField::TRACKED
            .iter()
            .copied()
            .filter(|f| keyword_on || *f != RecordField::MatchUrl)
            .filter(|f| self.rich.is_some() || !RecordField::RICH.contains(f))
            .filter(|f| tags_on || !RecordField::TAGS.contains(f))
            .collect();
        PendingFilter {
            any_empty,
            include_flag: self.config.include_flag.clone(),
            page_size: self.config.page_size,
        }
    }

    /// Process pending records until `page_size` of them made progress.
    ///
    /// Records that resolve nothing new do not use up the budget, so the
    /// query is paged past them (at most `max_pages` pages). Only a failed
    /// pending query aborts the batch. Each record is its own failure
    /// boundary.
    pub async fn run_batch(&self) -> Result<BatchReport, PipelineError> {
        let started_at = Utc::now();
        let filter = self.pending_filter();
        let mut outcomes = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0;
        let mut progressed = 0;

        'pages: loop {
            let page = self.store.query_pending(&filter, cursor.as_deref()).await?;
            pages += 1;
            info!(
                page = pages,
                count = page.records.len(),
                dry_run = self.config.dry_run,
                "fetched pending records"
            );

            for record in &page.records {
                let outcome = self.process(record).await;
                if outcome.status.made_progress() {
                    progressed += 1;
                }
                outcomes.push(outcome);
                if progressed >= self.config.page_size {
                    break 'pages;
                }
            }

            match page.next_cursor {
                Some(next) if pages < self.config.max_pages => cursor = Some(next),
                Some(_) => {
                    warn!(pages, "page limit reached; remaining records wait for the next run");
                    break;
                }
                None => break,
            }
        }

        let report = BatchReport {
            started_at,
            finished_at: Utc::now(),
            outcomes,
        };
        info!(
            updated = report.updated(),
            unchanged = report.unchanged(),
            failed = report.failed(),
            "{} records processed",
            report.processed()
        );
        Ok(report)
    }

    async fn process(&self, record: &Record) -> RecordOutcome {
        let mut outcome = RecordOutcome {
            id: record.id.clone(),
            name: record.name.clone(),
            status: OutcomeStatus::Skipped,
            summary_fallback: false,
            provider_errors: Vec::new(),
        };
        if !record.has(RecordField::Name) {
            debug!(id = %record.id, "skipping record without a name");
            return outcome;
        }

        let resolution = self.resolve(record).await;
        outcome.summary_fallback = resolution.summary_fallback;
        outcome.provider_errors = resolution.provider_errors;
        let resolved = &resolution.resolved;
        let fields = resolution.update.fields();

        let status = if resolution.update.is_empty() {
            OutcomeStatus::Unchanged
        } else if self.config.dry_run {
            OutcomeStatus::Planned(fields.clone())
        } else {
            match self.store.update_partial(&record.id, &resolution.update).await {
                Ok(()) => OutcomeStatus::Updated(fields.clone()),
                Err(e) => {
                    error!(name = %record.name, id = %record.id, error = %e, "record update failed");
                    OutcomeStatus::Failed(e.to_string())
                }
            }
        };
        let failed = matches!(status, OutcomeStatus::Failed(_));
        outcome.status = status;
        if failed {
            return outcome;
        }

        info!(
            name = %record.name,
            matched = resolved.has(RecordField::MatchUrl),
            category = resolved.derived.category.as_deref().unwrap_or("-"),
            summary = resolved.has(RecordField::SummaryText),
            rich = resolved.has(RecordField::ExternalId),
            fields = ?fields.iter().map(RecordField::as_str).collect::<Vec<_>>(),
            dry_run = self.config.dry_run,
            "record resolved"
        );
        outcome
    }

    /// Run every stage against a copy of `record` and diff the result.
    ///
    /// Never fails: provider errors drop that provider's contribution and
    /// generation always yields a value.
    pub async fn resolve(&self, record: &Record) -> Resolution {
        let mut working = record.clone();
        let mut notes = StageNotes::default();

        self.search_stage(&mut working, &mut notes).await;
        self.summary_stage(&mut working, &mut notes).await;
        self.tag_stage(&mut working).await;
        self.rich_stage(&mut working, &mut notes).await;

        // No candidate anywhere still classifies the record.
        if !working.has(RecordField::Category) && !notes.keyword_failed {
            working.derived.category = Some(Category::Other.as_str().to_string());
        }

        let update = diff(record, &working);
        Resolution {
            resolved: working,
            update,
            summary_fallback: notes.summary_fallback,
            provider_errors: notes.provider_errors,
        }
    }

    async fn search_stage(&self, working: &mut Record, notes: &mut StageNotes) {
        if !needs_search(working, self.config.keyword_search) {
            return;
        }
        let Some(provider) = self.keyword.as_ref().filter(|_| self.config.keyword_search) else {
            return;
        };

        let query = build_query(&working.name, working.locality());
        let places = match provider.search(&query, None).await {
            Ok(places) => places,
            Err(e) => {
                notes.keyword_failed = true;
                notes.provider_failed(&working.name, "keyword", "search", e);
                return;
            }
        };

        let Some(best) = best_match(places, &working.name, working.locality()) else {
            debug!(query = %query, "no keyword candidates");
            return;
        };
        debug!(query = %query, candidate = %best.candidate.name, score = best.match_score, "keyword match");

        let place = best.candidate;
        let d = &mut working.derived;
        d.match_url = fill(d.match_url.take(), place.place_url, false);
        d.category = fill(
            d.category.take(),
            Some(place.category.as_str().to_string()),
            false,
        );
    }

    async fn summary_stage(&self, working: &mut Record, notes: &mut StageNotes) {
        if !needs_summary(working, &self.config.force) {
            return;
        }
        let generation = {
            let task = SummaryTask::new(working).with_default_locality(&self.config.default_locality);
            self.generator.run(&task).await
        };
        notes.summary_fallback = generation.is_fallback();
        // A template never replaces a summary that is already there.
        let force = self.config.force.summary && !generation.is_fallback();
        let d = &mut working.derived;
        d.summary_text = fill(d.summary_text.take(), Some(generation.into_value()), force);
    }

    async fn tag_stage(&self, working: &mut Record) {
        if !needs_tags(working, &self.config.force, self.config.tag_trigger) {
            return;
        }
        let generation = {
            let task = TagTask::new(working, &self.config.vocab);
            self.generator.run(&task).await
        };
        let force = self.config.force.tags && !generation.is_fallback();
        let TagSet {
            mood,
            service,
            party_size,
        } = generation.into_value();
        working.mood = fill(std::mem::take(&mut working.mood), mood, force);
        working.service = fill(std::mem::take(&mut working.service), service, force);
        working.party_size = fill(std::mem::take(&mut working.party_size), party_size, force);
    }

    async fn rich_stage(&self, working: &mut Record, notes: &mut StageNotes) {
        // A stored place id is enough to build the map link.
        if let Some(id) = working.derived.external_id.as_deref()
            && working.derived.map_url.is_absent()
            && !id.trim().is_empty()
        {
            working.derived.map_url = Some(share_link(id.trim()));
        }

        let force = self.config.force.rich;
        if !needs_rich(working, &self.config.force) {
            return;
        }
        let Some(provider) = &self.rich else {
            return;
        };

        let query = build_query(&working.name, working.locality());
        let places = match provider.search(&query, self.config.location_bias).await {
            Ok(places) => places,
            Err(e) => {
                notes.provider_failed(&working.name, "rich", "search", e);
                return;
            }
        };
        let Some(best) = best_match(places, &working.name, working.locality()) else {
            debug!(query = %query, "no rich candidates");
            return;
        };
        debug!(query = %query, candidate = %best.candidate.name, score = best.match_score, "rich match");

        let place = best.candidate;
        {
            let d = &mut working.derived;
            d.rating_score = fill(d.rating_score.take(), place.rating, force);
            d.external_id = fill(d.external_id.take(), Some(place.id), force);
            d.map_url = fill(d.map_url.take(), place.map_url, force);
            d.price_cap = fill(d.price_cap.take(), place.price_cap, force);
        }

        if !working.has(RecordField::Category)
            && let Some(category) = place.primary_type.as_deref().and_then(Category::from_primary_type)
        {
            working.derived.category = Some(category.as_str().to_string());
        }

        let Some(photo) = place.photo else {
            return;
        };
        let d = &mut working.derived;
        let mut image_resolved = false;
        if force || d.image_url.is_absent() {
            match provider.photo_url(&photo.name).await {
                Ok(url) => {
                    image_resolved = url.is_present();
                    d.image_url = fill(d.image_url.take(), url, force);
                }
                Err(e) => notes.provider_failed(&working.name, "rich", "photo", e),
            }
        }
        // Attribution belongs to the photo just resolved, not to an existing image.
        if image_resolved {
            d.attribution_text = fill(d.attribution_text.take(), Some(photo.attribution), force);
        }
    }
}
