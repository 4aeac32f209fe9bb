//! Ordered parse chain for generated output.
//!
//! Models are asked for bare JSON but often wrap it in code fences or prose.
//! Each attempt returns an optional value; the first success wins.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::trace;

static FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*\s*(.*?)\s*```\s*$").unwrap());

static OBJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

type Attempt = fn(&str) -> Option<Value>;

/// Parse attempts in order.
pub const PARSE_CHAIN: &[(&str, Attempt)] = &[
    ("strict", strict),
    ("fenced", fenced),
    ("extracted", extracted),
];

/// Run the chain; `None` when no attempt produced JSON.
pub fn parse_structured(raw: &str) -> Option<Value> {
    PARSE_CHAIN.iter().find_map(|(stage, attempt)| {
        let value = attempt(raw)?;
        trace!(stage, "parsed generated output");
        Some(value)
    })
}

/// Remove a surrounding Markdown code fence, if any.
pub fn strip_fences(raw: &str) -> &str {
    match FENCE.captures(raw).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => raw.trim().trim_matches('`').trim(),
    }
}

fn strict(raw: &str) -> Option<Value> {
    serde_json::from_str(raw.trim()).ok()
}

fn fenced(raw: &str) -> Option<Value> {
    let inner = strip_fences(raw);
    if inner == raw.trim() {
        return None;
    }
    serde_json::from_str(inner).ok()
}

fn extracted(raw: &str) -> Option<Value> {
    let m = OBJECT.find(raw)?;
    serde_json::from_str(m.as_str()).ok()
}
