use placefill_ai::DEFAULT_LOCALITY;
use placefill_core::{ForceFlags, TagTrigger, Vocabularies};
use placefill_store::DEFAULT_PAGE_SIZE;
use placefill_sync::LocationBias;

/// Default search bias centre (Yongsan-gu, Seoul).
pub const DEFAULT_BIAS: LocationBias = LocationBias {
    lat: 37.5326,
    lng: 126.9905,
    radius_m: 3000.0,
};

pub const DEFAULT_MAX_PAGES: usize = 10;

/// Immutable run configuration handed to the [`Enricher`](crate::Enricher).
#[derive(Debug, Clone)]
pub struct EnrichConfig {
    pub force: ForceFlags,
    pub tag_trigger: TagTrigger,
    /// Call keyword search and write the match link.
    pub keyword_search: bool,
    pub default_locality: String,
    pub location_bias: Option<LocationBias>,
    pub vocab: Vocabularies,
    /// Query page size, and the number of records with work a run stops at.
    pub page_size: usize,
    /// Upper bound on query pages read in one run.
    pub max_pages: usize,
    /// Checkbox property restricting which records are picked up.
    pub include_flag: Option<String>,
    /// Resolve everything but skip the store write.
    pub dry_run: bool,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            force: ForceFlags::default(),
            tag_trigger: TagTrigger::default(),
            keyword_search: true,
            default_locality: DEFAULT_LOCALITY.to_string(),
            location_bias: Some(DEFAULT_BIAS),
            vocab: Vocabularies::default(),
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            include_flag: None,
            dry_run: false,
        }
    }
}
