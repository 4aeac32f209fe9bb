//! Place records and the presence rules that gate enrichment.
//!
//! A record is owned by the external store. This crate only ever fills the
//! derived fields and the tag sets; it never creates or deletes records.

use serde::{Deserialize, Serialize};

/// Emptiness test shared by every field type.
///
/// A value is present iff it carries content: a string that is non-empty
/// after trimming, a non-empty list, or a finite number. Type never matters,
/// only emptiness.
pub trait Presence {
    fn is_present(&self) -> bool;

    fn is_absent(&self) -> bool {
        !self.is_present()
    }
}

impl Presence for Option<String> {
    fn is_present(&self) -> bool {
        self.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}

impl Presence for Vec<String> {
    fn is_present(&self) -> bool {
        self.iter().any(|s| !s.trim().is_empty())
    }
}

impl Presence for Option<f64> {
    fn is_present(&self) -> bool {
        self.is_some_and(f64::is_finite)
    }
}

/// Every field this system reads or writes on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    Name,
    Location,
    Mood,
    Service,
    PartySize,
    MatchUrl,
    Category,
    RatingScore,
    MapUrl,
    ExternalId,
    ImageUrl,
    AttributionText,
    PriceCap,
    SummaryText,
}

impl RecordField {
    /// Fields the enrichment pass is responsible for filling.
    pub const TRACKED: &'static [RecordField] = &[
        RecordField::MatchUrl,
        RecordField::Category,
        RecordField::SummaryText,
        RecordField::Mood,
        RecordField::Service,
        RecordField::PartySize,
        RecordField::RatingScore,
        RecordField::MapUrl,
        RecordField::ExternalId,
        RecordField::ImageUrl,
        RecordField::AttributionText,
        RecordField::PriceCap,
    ];

    /// Fields filled from the rich place provider.
    pub const RICH: &'static [RecordField] = &[
        RecordField::RatingScore,
        RecordField::MapUrl,
        RecordField::ExternalId,
        RecordField::ImageUrl,
        RecordField::AttributionText,
        RecordField::PriceCap,
    ];

    /// Fields filled by tag classification.
    pub const TAGS: &'static [RecordField] =
        &[RecordField::Mood, RecordField::Service, RecordField::PartySize];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Location => "location",
            Self::Mood => "mood",
            Self::Service => "service",
            Self::PartySize => "party_size",
            Self::MatchUrl => "match_url",
            Self::Category => "category",
            Self::RatingScore => "rating_score",
            Self::MapUrl => "map_url",
            Self::ExternalId => "external_id",
            Self::ImageUrl => "image_url",
            Self::AttributionText => "attribution_text",
            Self::PriceCap => "price_cap",
            Self::SummaryText => "summary_text",
        }
    }
}

/// Attributes filled from providers and the text generator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedFields {
    pub match_url: Option<String>,
    pub category: Option<String>,
    pub rating_score: Option<f64>,
    pub map_url: Option<String>,
    pub external_id: Option<String>,
    pub image_url: Option<String>,
    pub attribution_text: Option<String>,
    pub price_cap: Option<f64>,
    pub summary_text: Option<String>,
}

/// A place record as read from the store, keyed by `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub name: String,
    pub location: Option<String>,
    pub mood: Vec<String>,
    pub service: Vec<String>,
    pub party_size: Vec<String>,
    #[serde(flatten)]
    pub derived: DerivedFields,
}

impl Record {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Trimmed locality, or `None` when blank.
    pub fn locality(&self) -> Option<&str> {
        self.location
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Whether `field` currently holds content.
    pub fn has(&self, field: RecordField) -> bool {
        let d = &self.derived;
        match field {
            RecordField::Name => !self.name.trim().is_empty(),
            RecordField::Location => self.location.is_present(),
            RecordField::Mood => self.mood.is_present(),
            RecordField::Service => self.service.is_present(),
            RecordField::PartySize => self.party_size.is_present(),
            RecordField::MatchUrl => d.match_url.is_present(),
            RecordField::Category => d.category.is_present(),
            RecordField::RatingScore => d.rating_score.is_present(),
            RecordField::MapUrl => d.map_url.is_present(),
            RecordField::ExternalId => d.external_id.is_present(),
            RecordField::ImageUrl => d.image_url.is_present(),
            RecordField::AttributionText => d.attribution_text.is_present(),
            RecordField::PriceCap => d.price_cap.is_present(),
            RecordField::SummaryText => d.summary_text.is_present(),
        }
    }

    /// Tracked fields that are still empty.
    pub fn missing(&self) -> Vec<RecordField> {
        RecordField::TRACKED
            .iter()
            .copied()
            .filter(|f| !self.has(*f))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_strings_are_absent() {
        assert!(None::<String>.is_absent());
        assert!(Some(String::new()).is_absent());
        assert!(Some("   ".to_string()).is_absent());
        assert!(Some("x".to_string()).is_present());
    }

    #[test]
    fn lists_need_a_non_blank_entry() {
        assert!(Vec::<String>::new().is_absent());
        assert!(vec![" ".to_string()].is_absent());
        assert!(vec!["Quiet".to_string()].is_present());
    }

    #[test]
    fn zero_is_a_present_number() {
        assert!(Some(0.0).is_present());
        assert!(None::<f64>.is_absent());
        assert!(Some(f64::NAN).is_absent());
    }

    #[test]
    fn missing_lists_all_tracked_fields_for_a_bare_record() {
        let record = Record::new("p1", "Noodle House");
        assert_eq!(record.missing().len(), RecordField::TRACKED.len());
        assert!(record.has(RecordField::Name));
    }

    #[test]
    fn locality_trims_and_drops_blank() {
        assert_eq!(Record::new("1", "a").with_location("  Yongsan ").locality(), Some("Yongsan"));
        assert_eq!(Record::new("1", "a").with_location("  ").locality(), None);
    }

    #[test]
    fn derived_fields_flatten_into_record_json() {
        let mut record = Record::new("p1", "Cafe Mori");
        record.derived.category = Some("Cafe".into());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["category"], "Cafe");
        assert_eq!(json["name"], "Cafe Mori");
    }
}
