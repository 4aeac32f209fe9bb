//! Normalised search candidates, one type per provider family.
//!
//! Adapters map provider payloads into these types at the boundary; scoring
//! and merging never see provider-specific shapes.

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::scoring::Scorable;

/// A keyword-search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordPlace {
    pub external_id: String,
    pub name: String,
    /// Road address and lot address joined by a space.
    pub address: String,
    pub has_phone: bool,
    pub category: Category,
    pub place_url: Option<String>,
}

/// First photo of a rich-search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoRef {
    /// Provider resource name used to fetch the media.
    pub name: String,
    pub attribution: String,
}

/// A rich-search hit carrying rating, price, and photo metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichPlace {
    pub id: String,
    pub name: String,
    pub address: String,
    pub has_phone: bool,
    pub rating: Option<f64>,
    pub price_cap: Option<f64>,
    pub primary_type: Option<String>,
    pub photo: Option<PhotoRef>,
    /// Direct map link, or a share link built from `id`. Unset when both are missing.
    pub map_url: Option<String>,
}

impl Scorable for KeywordPlace {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn address_text(&self) -> &str {
        &self.address
    }

    fn has_phone(&self) -> bool {
        self.has_phone
    }
}

impl Scorable for RichPlace {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn address_text(&self) -> &str {
        &self.address
    }

    fn has_phone(&self) -> bool {
        self.has_phone
    }

    fn rating(&self) -> Option<f64> {
        self.rating
    }
}

/// Upper bound of a price range: the larger of the bounds that are present.
pub fn price_cap(start: Option<f64>, end: Option<f64>) -> Option<f64> {
    match (start, end) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (Some(a), None) | (None, Some(a)) => Some(a),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_cap_is_max_of_range() {
        assert_eq!(price_cap(Some(10000.0), Some(30000.0)), Some(30000.0));
        assert_eq!(price_cap(Some(30000.0), Some(10000.0)), Some(30000.0));
    }

    #[test]
    fn price_cap_equal_bounds() {
        assert_eq!(price_cap(Some(20000.0), Some(20000.0)), Some(20000.0));
    }

    #[test]
    fn price_cap_single_bound() {
        assert_eq!(price_cap(Some(15000.0), None), Some(15000.0));
        assert_eq!(price_cap(None, Some(8000.0)), Some(8000.0));
        assert_eq!(price_cap(None, None), None);
    }
}
