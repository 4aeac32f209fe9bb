//! Place search providers: Kakao Local keyword search and Google Places
//! text search.
//!
//! Adapters issue one HTTP request per call and map provider payloads into
//! the normalised candidate types from `placefill-core`.

pub mod kakao;
pub mod places;

pub use kakao::KakaoClient;
pub use places::{PlacesClient, SearchOptions, share_link};

use async_trait::async_trait;
use placefill_core::{KeywordPlace, RichPlace};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{provider} returned {status}: {body}")]
    Server {
        provider: &'static str,
        status: u16,
        body: String,
    },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Circular search bias.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationBias {
    pub lat: f64,
    pub lng: f64,
    pub radius_m: f64,
}

/// A place search capability.
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    type Candidate: Send;

    /// Search by free text. An empty list is a normal outcome.
    async fn search(
        &self,
        query: &str,
        bias: Option<LocationBias>,
    ) -> Result<Vec<Self::Candidate>, ProviderError>;
}

/// Keyword search (phone, address, category path).
pub trait KeywordSearch: PlaceSearch<Candidate = KeywordPlace> {}

impl<T: PlaceSearch<Candidate = KeywordPlace>> KeywordSearch for T {}

/// Rich search, which can also resolve photo references to image URLs.
#[async_trait]
pub trait RichSearch: PlaceSearch<Candidate = RichPlace> {
    /// Resolve a photo resource name to a servable image URL.
    async fn photo_url(&self, photo: &str) -> Result<Option<String>, ProviderError>;
}

/// Error for a non-success response.
pub(crate) fn server_error(provider: &'static str, status: u16, body: String) -> ProviderError {
    let body = match body.trim() {
        "" => "no body".to_string(),
        _ => body,
    };
    ProviderError::Server {
        provider,
        status,
        body,
    }
}

pub(crate) async fn check_status(
    provider: &'static str,
    resp: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(server_error(provider, status.as_u16(), body));
    }
    Ok(resp)
}
