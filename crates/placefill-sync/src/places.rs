//! Google Places (New) text search and photo media lookup.

use async_trait::async_trait;
use placefill_core::{PhotoRef, RichPlace, price_cap};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::{LocationBias, PlaceSearch, ProviderError, RichSearch, check_status};

const PLACES_API: &str = "https://places.googleapis.com/v1";

const FIELD_MASK: &str = "places.id,places.displayName,places.formattedAddress,\
places.nationalPhoneNumber,places.rating,places.priceRange,places.primaryType,\
places.photos,places.googleMapsUri";

/// Attribution used when the first photo names no author.
pub const DEFAULT_ATTRIBUTION: &str = "Photo: Google Maps";

/// Width requested from the photo media endpoint.
pub const PHOTO_MAX_WIDTH: u32 = 800;

/// Share link for a place id, used when the provider returns no map URL.
pub fn share_link(place_id: &str) -> String {
    format!("https://www.google.com/maps/place/?q=place_id:{place_id}")
}

/// Request options shared by every text search.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub language: String,
    pub max_results: u32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            language: "ko".into(),
            max_results: 5,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    #[serde(default)]
    places: Vec<Place>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Place {
    id: String,
    display_name: Option<LocalizedText>,
    formatted_address: Option<String>,
    national_phone_number: Option<String>,
    rating: Option<f64>,
    price_range: Option<PriceRange>,
    primary_type: Option<String>,
    photos: Vec<Photo>,
    google_maps_uri: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LocalizedText {
    text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PriceRange {
    start_price: Option<Money>,
    end_price: Option<Money>,
}

/// `units` is an int64 and arrives as a JSON string.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Money {
    units: Option<serde_json::Value>,
}

impl Money {
    fn units(&self) -> Option<f64> {
        match self.units.as_ref()? {
            serde_json::Value::String(s) => s.trim().parse().ok(),
            serde_json::Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Photo {
    name: String,
    author_attributions: Vec<AuthorAttribution>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AuthorAttribution {
    display_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PhotoMedia {
    photo_uri: Option<String>,
}

impl From<Place> for RichPlace {
    fn from(p: Place) -> Self {
        let price_cap = p.price_range.as_ref().and_then(|r| {
            price_cap(
                r.start_price.as_ref().and_then(Money::units),
                r.end_price.as_ref().and_then(Money::units),
            )
        });

        let photo = p.photos.into_iter().next().map(|photo| {
            let author = photo
                .author_attributions
                .first()
                .map(|a| a.display_name.trim())
                .filter(|n| !n.is_empty());
            PhotoRef {
                attribution: author
                    .map(|a| format!("Photo: {a}"))
                    .unwrap_or_else(|| DEFAULT_ATTRIBUTION.to_string()),
                name: photo.name,
            }
        });

        let map_url = p
            .google_maps_uri
            .filter(|u| !u.trim().is_empty())
            .or_else(|| {
                let id = p.id.trim();
                (!id.is_empty()).then(|| share_link(id))
            });

        RichPlace {
            name: p.display_name.map(|t| t.text).unwrap_or_default(),
            address: p.formatted_address.unwrap_or_default(),
            has_phone: p
                .national_phone_number
                .is_some_and(|n| !n.trim().is_empty()),
            rating: p.rating,
            price_cap,
            primary_type: p.primary_type.filter(|t| !t.is_empty()),
            photo,
            map_url,
            id: p.id,
        }
    }
}

/// Text search client authorised with an API key.
pub struct PlacesClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    options: SearchOptions,
}

impl PlacesClient {
    pub fn new(api_key: String, options: SearchOptions) -> Self {
        Self::with_base_url(PLACES_API.to_string(), api_key, options)
    }

    pub fn with_base_url(base_url: String, api_key: String, options: SearchOptions) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            options,
        }
    }

    fn request_body(&self, query: &str, bias: Option<LocationBias>) -> serde_json::Value {
        let mut body = json!({
            "textQuery": query,
            "languageCode": self.options.language,
            "pageSize": self.options.max_results,
        });
        if let Some(b) = bias {
            body["locationBias"] = json!({
                "circle": {
                    "center": { "latitude": b.lat, "longitude": b.lng },
                    "radius": b.radius_m,
                }
            });
        }
        body
    }
}

#[async_trait]
impl PlaceSearch for PlacesClient {
    type Candidate = RichPlace;

    async fn search(
        &self,
        query: &str,
        bias: Option<LocationBias>,
    ) -> Result<Vec<RichPlace>, ProviderError> {
        let url = format!("{}/places:searchText", self.base_url);
        debug!(query, "places text search");
        let resp = self
            .client
            .post(&url)
            .header("X-Goog-Api-Key", &self.api_key)
            .header("X-Goog-FieldMask", FIELD_MASK)
            .json(&self.request_body(query, bias))
            .send()
            .await?;
        let resp = check_status("places", resp).await?;
        let places = parse_text_search(&resp.text().await?)?;
        info!(query, count = places.len(), "places results");
        Ok(places)
    }
}

#[async_trait]
impl RichSearch for PlacesClient {
    async fn photo_url(&self, photo: &str) -> Result<Option<String>, ProviderError> {
        let url = format!("{}/{}/media", self.base_url, photo);
        let resp = self
            .client
            .get(&url)
            .header("X-Goog-Api-Key", &self.api_key)
            .query(&[
                ("maxWidthPx", PHOTO_MAX_WIDTH.to_string()),
                ("skipHttpRedirect", "true".to_string()),
            ])
            .send()
            .await?;
        let resp = check_status("places", resp).await?;
        let media: PhotoMedia = serde_json::from_str(&resp.text().await?)?;
        Ok(media.photo_uri.filter(|u| !u.is_empty()))
    }
}

fn parse_text_search(body: &str) -> Result<Vec<RichPlace>, ProviderError> {
    let parsed: TextSearchResponse = serde_json::from_str(body)?;
    Ok(parsed.places.into_iter().map(RichPlace::from).collect())
}
