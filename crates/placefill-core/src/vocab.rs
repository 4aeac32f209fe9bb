//! Allowed tag vocabularies and tag normalisation.

use serde::{Deserialize, Serialize};

pub const DEFAULT_MOOD: &[&str] = &[
    "Cozy", "Quiet", "Lively", "Trendy", "Romantic", "Casual", "Retro", "Scenic",
];

pub const DEFAULT_SERVICE: &[&str] = &[
    "Takeout",
    "Delivery",
    "Reservation",
    "Parking",
    "Pet Friendly",
    "Wi-Fi",
    "Late Night",
    "Group Seating",
];

pub const DEFAULT_PARTY_SIZE: &[&str] = &["Solo", "Couple", "Small Group", "Large Group"];

/// An ordered, closed set of permitted tag values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary(Vec<String>);

impl Vocabulary {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(values.into_iter().map(Into::into).collect())
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }

    /// Canonical spelling of `tag`, matched after trimming and ignoring case.
    pub fn canonical(&self, tag: &str) -> Option<&str> {
        let tag = tag.trim();
        self.0
            .iter()
            .find(|v| v.eq_ignore_ascii_case(tag))
            .map(String::as_str)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.canonical(tag).is_some()
    }
}

/// The three classification axes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabularies {
    pub mood: Vocabulary,
    pub service: Vocabulary,
    pub party_size: Vocabulary,
}

impl Default for Vocabularies {
    fn default() -> Self {
        Self {
            mood: Vocabulary::new(DEFAULT_MOOD.iter().copied()),
            service: Vocabulary::new(DEFAULT_SERVICE.iter().copied()),
            party_size: Vocabulary::new(DEFAULT_PARTY_SIZE.iter().copied()),
        }
    }
}

/// Intersect free-form tags with `vocab`.
///
/// Unknown values are dropped, duplicates collapse to their first occurrence,
/// and accepted values take the vocabulary's spelling.
pub fn normalize_tags<S: AsRef<str>>(tags: &[S], vocab: &Vocabulary) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        if let Some(canon) = vocab.canonical(tag.as_ref())
            && !out.iter().any(|t| t == canon)
        {
            out.push(canon.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_foreign_values() {
        let vocab = Vocabularies::default();
        let tags = normalize_tags(&["Cozy", "Spooky", "Quiet"], &vocab.mood);
        assert_eq!(tags, vec!["Cozy", "Quiet"]);
    }

    #[test]
    fn dedupes_in_first_seen_order() {
        let vocab = Vocabularies::default();
        let tags = normalize_tags(&["Quiet", "cozy", "QUIET", "Cozy"], &vocab.mood);
        assert_eq!(tags, vec!["Quiet", "Cozy"]);
    }

    #[test]
    fn output_is_subset_of_vocabulary() {
        let vocab = Vocabularies::default();
        let input = ["Takeout", " delivery ", "Valet", "", "Wi-Fi", "wifi"];
        let tags = normalize_tags(&input, &vocab.service);
        assert!(tags.iter().all(|t| vocab.service.values().contains(t)));
        assert_eq!(tags, vec!["Takeout", "Delivery", "Wi-Fi"]);
    }

    #[test]
    fn empty_input_is_empty_output() {
        let vocab = Vocabularies::default();
        assert!(normalize_tags::<&str>(&[], &vocab.party_size).is_empty());
    }

    #[test]
    fn custom_vocabulary() {
        let vocab = Vocabulary::new(["조용한", "활기찬"]);
        assert_eq!(normalize_tags(&["활기찬", "Cozy"], &vocab), vec!["활기찬"]);
    }
}
