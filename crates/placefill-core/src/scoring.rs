//! Candidate scoring and ranking.
//!
//! Weights are fixed and additive:
//!
//! | signal                                          | weight              |
//! |-------------------------------------------------|---------------------|
//! | display name contains target name (any case)    | 3                   |
//! | locality is a substring of the address text     | 2                   |
//! | candidate exposes a phone number                | 0.5                 |
//! | candidate exposes a rating                      | `min(2, rating/2)`  |

pub const NAME_WEIGHT: f64 = 3.0;
pub const LOCALITY_WEIGHT: f64 = 2.0;
pub const PHONE_WEIGHT: f64 = 0.5;
pub const MAX_RATING_BONUS: f64 = 2.0;

/// What the scorer needs from a candidate.
pub trait Scorable {
    fn display_name(&self) -> &str;
    fn address_text(&self) -> &str;
    fn has_phone(&self) -> bool;

    fn rating(&self) -> Option<f64> {
        None
    }
}

/// A candidate paired with its match score.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<C> {
    pub candidate: C,
    pub match_score: f64,
}

/// Score one candidate against a target name and optional locality.
pub fn score<C: Scorable + ?Sized>(candidate: &C, name: &str, locality: Option<&str>) -> f64 {
    let mut s = 0.0;

    let target = name.to_lowercase();
    if candidate.display_name().to_lowercase().contains(&target) {
        s += NAME_WEIGHT;
    }

    if let Some(loc) = locality.filter(|l| !l.is_empty())
        && candidate.address_text().contains(loc)
    {
        s += LOCALITY_WEIGHT;
    }

    if candidate.has_phone() {
        s += PHONE_WEIGHT;
    }

    if let Some(rating) = candidate.rating() {
        s += (rating / 2.0).min(MAX_RATING_BONUS);
    }

    s
}

/// Score every candidate and sort by descending score.
///
/// The sort is stable: on equal scores the provider's original order wins.
pub fn rank<C: Scorable>(candidates: Vec<C>, name: &str, locality: Option<&str>) -> Vec<Ranked<C>> {
    let mut ranked: Vec<Ranked<C>> = candidates
        .into_iter()
        .map(|candidate| {
            let match_score = score(&candidate, name, locality);
            Ranked {
                candidate,
                match_score,
            }
        })
        .collect();
    ranked.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));
    ranked
}

/// Highest-ranked candidate, if any.
pub fn best_match<C: Scorable>(
    candidates: Vec<C>,
    name: &str,
    locality: Option<&str>,
) -> Option<Ranked<C>> {
    rank(candidates, name, locality).into_iter().next()
}

/// Search query: name and locality joined by a single space.
pub fn build_query(name: &str, locality: Option<&str>) -> String {
    [Some(name.trim()), locality.map(str::trim)]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
