//! One-line place summaries.
//!
//! Generated summaries are sanitised, capped at [`MAX_SUMMARY_CHARS`], and
//! rejected when they are empty, too short, or a "no information" non-answer.
//! The fallback is a fixed template built from the locality, category, and
//! name.

use once_cell::sync::Lazy;
use placefill_core::{Category, Record};
use regex::Regex;
use serde_json::Value;

use crate::generator::{FallbackReason, GenerationTask};
use crate::parse::{parse_structured, strip_fences};

/// Locality used by the fallback template when the record has none.
pub const DEFAULT_LOCALITY: &str = "Yongsan";

/// Minimum non-whitespace characters for a usable summary.
pub const MIN_SUMMARY_CHARS: usize = 6;

/// Summaries are cut to this many characters.
pub const MAX_SUMMARY_CHARS: usize = 60;

const MARKUP: &[char] = &['#', '*', '_', '[', ']', '`', '~', '<', '>'];

static NON_ANSWER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(정보\s*(없음|부족)|데이터\s*없음|찾을\s*수\s*없음|no\s*(info|information|data)\b|not\s*enough|insufficient\s*(info|information|data)|(cannot|can't|could\s*not)\s*find)",
    )
    .unwrap()
});

/// Strip markup punctuation, cap the length, and trim.
pub fn sanitize(text: &str) -> String {
    let stripped: String = text.trim().chars().filter(|c| !MARKUP.contains(c)).collect();
    stripped
        .chars()
        .take(MAX_SUMMARY_CHARS)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Whether a summary is too short or a non-answer.
pub fn is_weak(text: &str) -> bool {
    let t = text.trim();
    if t.is_empty() {
        return true;
    }
    let visible = t.chars().filter(|c| !c.is_whitespace()).count();
    visible < MIN_SUMMARY_CHARS || NON_ANSWER.is_match(t)
}

/// Deterministic summary: `"<locality>'s hidden <category> spot, <name>"`.
///
/// The category is left out when absent or `Other`.
pub fn fallback_summary(
    name: &str,
    locality: Option<&str>,
    category: Option<&str>,
    default_locality: &str,
) -> String {
    let loc = locality
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(default_locality);
    let name = match name.trim() {
        "" => "Unnamed",
        n => n,
    };
    let label = category
        .map(str::trim)
        .filter(|c| !c.is_empty() && *c != Category::Other.as_str())
        .map(|c| format!("{c} "))
        .unwrap_or_default();
    format!("{loc}'s hidden {label}spot, {name}")
}

/// Summary generation for one record.
pub struct SummaryTask<'a> {
    pub record: &'a Record,
    pub default_locality: &'a str,
}

impl<'a> SummaryTask<'a> {
    pub fn new(record: &'a Record) -> Self {
        Self {
            record,
            default_locality: DEFAULT_LOCALITY,
        }
    }

    pub fn with_default_locality(mut self, locality: &'a str) -> Self {
        self.default_locality = locality;
        self
    }
}

fn join_or_dash(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}

impl GenerationTask for SummaryTask<'_> {
    type Output = String;

    fn label(&self) -> &'static str {
        "summary"
    }

    fn prompt(&self) -> String {
        let r = self.record;
        format!(
            "Write a one-sentence summary of the place below and return it as JSON only.\n\
             Rules:\n\
             - No exaggeration; plain and short (under {max} characters)\n\
             - No emoji, special characters, or hashtags\n\
             - Friendly, conversational tone\n\
             - Return only pure JSON in exactly this shape: {{\"summary\": \"<sentence>\"}}\n\
             \n\
             Name: {name}\n\
             Location: {location}\n\
             Category: {category}\n\
             Mood: {mood}\n\
             Service: {service}",
            max = MAX_SUMMARY_CHARS,
            name = r.name,
            location = r.locality().unwrap_or("-"),
            category = r.derived.category.as_deref().unwrap_or("-"),
            mood = join_or_dash(&r.mood),
            service = join_or_dash(&r.service),
        )
    }

    fn interpret(&self, raw: &str) -> Result<String, FallbackReason> {
        let text = match parse_structured(raw) {
            Some(Value::Object(obj)) => obj
                .get("summary")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            Some(Value::String(s)) => s,
            // Not JSON-shaped: treat the whole reply as the summary.
            _ => strip_fences(raw).to_string(),
        };

        let clean = sanitize(&text);
        if is_weak(&clean) {
            return Err(FallbackReason::Weak);
        }
        Ok(clean)
    }

    fn fallback(&self) -> String {
        let r = self.record;
        fallback_summary(
            &r.name,
            r.locality(),
            r.derived.category.as_deref(),
            self.default_locality,
        )
    }
}
