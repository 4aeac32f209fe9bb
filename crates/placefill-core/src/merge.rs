//! Field reconciliation: when to fetch, how to merge, what to write.
//!
//! Merging is additive. A present value survives unless the matching force
//! flag is set *and* the incoming value is itself present; an absent
//! incoming value never overwrites anything. The outbound update carries only
//! present values that differ from what the store already holds.

use serde::Serialize;

use crate::record::{Presence, Record, RecordField};

/// Per-feature overrides that re-fetch or regenerate present fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForceFlags {
    pub summary: bool,
    pub tags: bool,
    pub rich: bool,
}

/// When the tag classifier runs for a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TagTrigger {
    /// Any of mood, service, or party size is empty.
    #[default]
    AnyEmpty,
    /// All three are empty.
    AllEmpty,
}

/// Merge one field.
pub fn fill<T: Presence>(current: T, incoming: T, force: bool) -> T {
    if incoming.is_absent() {
        return current;
    }
    if current.is_absent() || force {
        incoming
    } else {
        current
    }
}

/// Search stage runs when the match link or the category is still empty.
pub fn needs_search(record: &Record, keyword_search: bool) -> bool {
    (keyword_search && !record.has(RecordField::MatchUrl)) || !record.has(RecordField::Category)
}

pub fn needs_summary(record: &Record, force: &ForceFlags) -> bool {
    force.summary || !record.has(RecordField::SummaryText)
}

pub fn needs_tags(record: &Record, force: &ForceFlags, trigger: TagTrigger) -> bool {
    if force.tags {
        return true;
    }
    let empty = [RecordField::Mood, RecordField::Service, RecordField::PartySize]
        .into_iter()
        .filter(|f| !record.has(*f))
        .count();
    match trigger {
        TagTrigger::AnyEmpty => empty > 0,
        TagTrigger::AllEmpty => empty == 3,
    }
}

/// Rich stage runs when any rich-provider field is still empty.
pub fn needs_rich(record: &Record, force: &ForceFlags) -> bool {
    force.rich || RecordField::RICH.iter().any(|f| !record.has(*f))
}

/// Outbound partial update. `None` slots are not written.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party_size: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribution_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_cap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_text: Option<String>,
}

impl RecordUpdate {
    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// Fields this update writes, in tracked order.
    pub fn fields(&self) -> Vec<RecordField> {
        let slots = [
            (RecordField::MatchUrl, self.match_url.is_some()),
            (RecordField::Category, self.category.is_some()),
            (RecordField::SummaryText, self.summary_text.is_some()),
            (RecordField::Mood, self.mood.is_some()),
            (RecordField::Service, self.service.is_some()),
            (RecordField::PartySize, self.party_size.is_some()),
            (RecordField::RatingScore, self.rating_score.is_some()),
            (RecordField::MapUrl, self.map_url.is_some()),
            (RecordField::ExternalId, self.external_id.is_some()),
            (RecordField::ImageUrl, self.image_url.is_some()),
            (RecordField::AttributionText, self.attribution_text.is_some()),
            (RecordField::PriceCap, self.price_cap.is_some()),
        ];
        slots
            .into_iter()
            .filter_map(|(f, set)| set.then_some(f))
            .collect()
    }

    /// Apply this update to `record` in place.
    pub fn apply_to(&self, record: &mut Record) {
        let d = &mut record.derived;
        if let Some(v) = &self.mood {
            record.mood = v.clone();
        }
        if let Some(v) = &self.service {
            record.service = v.clone();
        }
        if let Some(v) = &self.party_size {
            record.party_size = v.clone();
        }
        set(&mut d.match_url, &self.match_url);
        set(&mut d.category, &self.category);
        set(&mut d.rating_score, &self.rating_score);
        set(&mut d.map_url, &self.map_url);
        set(&mut d.external_id, &self.external_id);
        set(&mut d.image_url, &self.image_url);
        set(&mut d.attribution_text, &self.attribution_text);
        set(&mut d.price_cap, &self.price_cap);
        set(&mut d.summary_text, &self.summary_text);
    }
}

fn set<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
    if value.is_some() {
        slot.clone_from(value);
    }
}

/// Slot value when `resolved` is present and differs from `original`.
fn changed<T: Presence + PartialEq + Clone>(original: &T, resolved: &T) -> Option<T> {
    (resolved.is_present() && resolved != original).then(|| resolved.clone())
}

fn changed_opt<T>(original: &Option<T>, resolved: &Option<T>) -> Option<T>
where
    Option<T>: Presence + PartialEq + Clone,
{
    changed(original, resolved).flatten()
}

/// Build the partial update that turns `original` into `resolved`.
pub fn diff(original: &Record, resolved: &Record) -> RecordUpdate {
    let (o, r) = (&original.derived, &resolved.derived);
    RecordUpdate {
        mood: changed(&original.mood, &resolved.mood),
        service: changed(&original.service, &resolved.service),
        party_size: changed(&original.party_size, &resolved.party_size),
        match_url: changed_opt(&o.match_url, &r.match_url),
        category: changed_opt(&o.category, &r.category),
        rating_score: changed_opt(&o.rating_score, &r.rating_score),
        map_url: changed_opt(&o.map_url, &r.map_url),
        external_id: changed_opt(&o.external_id, &r.external_id),
        image_url: changed_opt(&o.image_url, &r.image_url),
        attribution_text: changed_opt(&o.attribution_text, &r.attribution_text),
        price_cap: changed_opt(&o.price_cap, &r.price_cap),
        summary_text: changed_opt(&o.summary_text, &r.summary_text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    #[test]
    fn fill_keeps_present_without_force() {
        assert_eq!(fill(s("Korean"), s("Cafe"), false), s("Korean"));
    }

    #[test]
    fn fill_takes_incoming_when_empty() {
        assert_eq!(fill(None, s("Cafe"), false), s("Cafe"));
        assert_eq!(fill(s(""), s("Cafe"), false), s("Cafe"));
    }

    #[test]
    fn fill_force_overwrites_only_with_present_value() {
        assert_eq!(fill(s("Korean"), s("Cafe"), true), s("Cafe"));
        assert_eq!(fill(s("Korean"), None, true), s("Korean"));
        assert_eq!(fill(Some(4.1), None, true), Some(4.1));
    }

    #[test]
    fn fill_lists() {
        let cur = vec!["Quiet".to_string()];
        assert_eq!(fill(cur.clone(), vec!["Cozy".to_string()], false), cur);
        assert_eq!(fill(Vec::new(), vec!["Cozy".to_string()], false), vec!["Cozy"]);
        assert_eq!(fill(cur.clone(), Vec::new(), true), cur);
    }

    #[test]
    fn search_needed_when_link_or_category_missing() {
        let mut r = Record::new("1", "a");
        assert!(needs_search(&r, true));
        r.derived.category = s("Korean");
        assert!(needs_search(&r, true));
        assert!(!needs_search(&r, false));
        r.derived.match_url = s("http://place.map.kakao.com/1");
        assert!(!needs_search(&r, true));
    }

    #[test]
    fn tag_triggers() {
        let mut r = Record::new("1", "a");
        r.mood = vec!["Cozy".into()];
        let none = ForceFlags::default();
        assert!(needs_tags(&r, &none, TagTrigger::AnyEmpty));
        assert!(!needs_tags(&r, &none, TagTrigger::AllEmpty));
        let force = ForceFlags {
            tags: true,
            ..Default::default()
        };
        r.service = vec!["Takeout".into()];
        r.party_size = vec!["Solo".into()];
        assert!(!needs_tags(&r, &none, TagTrigger::AnyEmpty));
        assert!(needs_tags(&r, &force, TagTrigger::AnyEmpty));
    }

    #[test]
    fn rich_needed_until_all_fields_present() {
        let mut r = Record::new("1", "a");
        let none = ForceFlags::default();
        assert!(needs_rich(&r, &none));
        r.derived.rating_score = Some(4.5);
        r.derived.map_url = s("m");
        r.derived.external_id = s("id");
        r.derived.image_url = s("i");
        r.derived.attribution_text = s("Photo: a");
        r.derived.price_cap = Some(30000.0);
        assert!(!needs_rich(&r, &none));
        assert!(needs_rich(&r, &ForceFlags { rich: true, ..none }));
    }

    #[test]
    fn diff_omits_unchanged_and_empty() {
        let mut original = Record::new("1", "Noodle House");
        original.derived.category = s("Korean");
        let mut resolved = original.clone();
        resolved.derived.summary_text = s("Yongsan's hidden Korean spot, Noodle House");
        resolved.derived.match_url = s("");
        resolved.mood = Vec::new();

        let update = diff(&original, &resolved);
        assert_eq!(update.fields(), vec![RecordField::SummaryText]);
        assert!(update.category.is_none());
    }

    #[test]
    fn diff_of_identical_records_is_empty() {
        let mut r = Record::new("1", "x");
        r.derived.rating_score = Some(4.0);
        r.service = vec!["Takeout".into()];
        assert!(diff(&r, &r.clone()).is_empty());
    }

    #[test]
    fn apply_then_diff_is_empty() {
        let original = Record::new("1", "x");
        let mut resolved = original.clone();
        resolved.derived.price_cap = Some(30000.0);
        resolved.party_size = vec!["Couple".into()];
        let update = diff(&original, &resolved);

        let mut stored = original.clone();
        update.apply_to(&mut stored);
        assert_eq!(stored, resolved);
        assert!(diff(&stored, &resolved).is_empty());
    }

    #[test]
    fn update_serialises_only_set_slots() {
        let update = RecordUpdate {
            category: s("Other"),
            ..Default::default()
        };
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(json, r#"{"category":"Other"}"#);
    }
}
