//! Tag classification against the allowed vocabularies.
//!
//! The model picks from closed lists; whatever it returns is intersected with
//! those lists again, so no foreign value can reach the store. Party size is
//! single-valued. An empty result is valid; the fallback is also empty.

use placefill_core::{Record, Vocabularies, Vocabulary, normalize_tags};
use serde_json::Value;

use crate::generator::{FallbackReason, GenerationTask};
use crate::parse::parse_structured;

/// Classified tags for one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    pub mood: Vec<String>,
    pub service: Vec<String>,
    pub party_size: Vec<String>,
}

impl TagSet {
    pub fn is_empty(&self) -> bool {
        self.mood.is_empty() && self.service.is_empty() && self.party_size.is_empty()
    }
}

/// Tag classification for one record.
pub struct TagTask<'a> {
    pub record: &'a Record,
    pub vocab: &'a Vocabularies,
}

impl<'a> TagTask<'a> {
    pub fn new(record: &'a Record, vocab: &'a Vocabularies) -> Self {
        Self { record, vocab }
    }
}

/// Strings under `key`, accepting either an array or a single string.
fn strings(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Vec<String> {
    let Some(value) = keys.iter().find_map(|k| obj.get(*k)) else {
        return Vec::new();
    };
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn quoted(vocab: &Vocabulary) -> String {
    vocab
        .values()
        .iter()
        .map(|v| format!("\"{v}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

impl GenerationTask for TagTask<'_> {
    type Output = TagSet;

    fn label(&self) -> &'static str {
        "tags"
    }

    fn prompt(&self) -> String {
        let r = self.record;
        format!(
            "Classify the place below. Choose only from the allowed values and return JSON only.\n\
             Allowed mood: [{mood}]\n\
             Allowed service: [{service}]\n\
             Allowed partySize (pick at most one): [{party}]\n\
             Leave a list empty when unsure.\n\
             Return exactly: {{\"mood\": [], \"service\": [], \"partySize\": []}}\n\
             \n\
             Name: {name}\n\
             Location: {location}\n\
             Category: {category}\n\
             Summary: {summary}",
            mood = quoted(&self.vocab.mood),
            service = quoted(&self.vocab.service),
            party = quoted(&self.vocab.party_size),
            name = r.name,
            location = r.locality().unwrap_or("-"),
            category = r.derived.category.as_deref().unwrap_or("-"),
            summary = r.derived.summary_text.as_deref().unwrap_or("-"),
        )
    }

    fn interpret(&self, raw: &str) -> Result<TagSet, FallbackReason> {
        let Some(Value::Object(obj)) = parse_structured(raw) else {
            return Err(FallbackReason::Unparseable);
        };

        let mut party_size = normalize_tags(
            &strings(&obj, &["partySize", "party_size"]),
            &self.vocab.party_size,
        );
        party_size.truncate(1);

        Ok(TagSet {
            mood: normalize_tags(&strings(&obj, &["mood"]), &self.vocab.mood),
            service: normalize_tags(&strings(&obj, &["service"]), &self.vocab.service),
            party_size,
        })
    }

    fn fallback(&self) -> TagSet {
        TagSet::default()
    }
}
