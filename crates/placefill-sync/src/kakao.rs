//! Kakao Local keyword search.

use async_trait::async_trait;
use placefill_core::{Category, KeywordPlace};
use serde::Deserialize;
use tracing::{debug, info};

use crate::{LocationBias, PlaceSearch, ProviderError, check_status};

const KAKAO_API: &str = "https://dapi.kakao.com";
/// Results requested per query.
pub const RESULT_SIZE: u32 = 5;

#[derive(Debug, Deserialize)]
struct KeywordResponse {
    #[serde(default)]
    documents: Vec<Document>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Document {
    id: String,
    place_name: String,
    road_address_name: String,
    address_name: String,
    phone: String,
    category_name: String,
    category_group_code: String,
    place_url: String,
}

impl From<Document> for KeywordPlace {
    fn from(d: Document) -> Self {
        let category = Category::from_keyword_category(&d.category_name, &d.category_group_code);
        KeywordPlace {
            external_id: d.id,
            address: format!("{} {}", d.road_address_name, d.address_name),
            has_phone: !d.phone.trim().is_empty(),
            category,
            place_url: Some(d.place_url).filter(|u| !u.is_empty()),
            name: d.place_name,
        }
    }
}

/// Keyword search client authorised with a REST API key.
pub struct KakaoClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl KakaoClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(KAKAO_API.to_string(), api_key)
    }

    pub fn with_base_url(base_url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl PlaceSearch for KakaoClient {
    type Candidate = KeywordPlace;

    async fn search(
        &self,
        query: &str,
        bias: Option<LocationBias>,
    ) -> Result<Vec<KeywordPlace>, ProviderError> {
        let url = format!("{}/v2/local/search/keyword.json", self.base_url);
        let mut params = vec![
            ("query", query.to_string()),
            ("size", RESULT_SIZE.to_string()),
        ];
        if let Some(b) = bias {
            params.push(("x", b.lng.to_string()));
            params.push(("y", b.lat.to_string()));
            params.push(("radius", (b.radius_m.round() as u32).min(20_000).to_string()));
        }

        debug!(query, "kakao keyword search");
        let resp = self
            .client
            .get(&url)
            .header("Authorization", format!("KakaoAK {}", self.api_key))
            .query(&params)
            .send()
            .await?;
        let resp = check_status("kakao", resp).await?;
        let places = parse_keyword_response(&resp.text().await?)?;
        info!(query, count = places.len(), "kakao results");
        Ok(places)
    }
}

fn parse_keyword_response(body: &str) -> Result<Vec<KeywordPlace>, ProviderError> {
    let parsed: KeywordResponse = serde_json::from_str(body)?;
    Ok(parsed.documents.into_iter().map(KeywordPlace::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "documents": [
            {
                "id": "26338954",
                "place_name": "리버사이드 키친 용산점",
                "category_name": "음식점 > 양식 > 이탈리안",
                "category_group_code": "FD6",
                "phone": "02-123-4567",
                "address_name": "서울 용산구 한강로2가 1-1",
                "road_address_name": "서울 용산구 한강대로 1",
                "place_url": "http://place.map.kakao.com/26338954",
                "x": "126.97",
                "y": "37.53"
            },
            {
                "id": "11",
                "place_name": "카페 모리",
                "category_name": "음식점 > 카페",
                "category_group_code": "CE7",
                "phone": "",
                "address_name": "서울 용산구",
                "road_address_name": "",
                "place_url": ""
            }
        ],
        "meta": { "total_count": 2 }
    }"#;

    #[test]
    fn maps_documents_to_candidates() {
        let places = parse_keyword_response(SAMPLE).unwrap();
        assert_eq!(places.len(), 2);

        let first = &places[0];
        assert_eq!(first.external_id, "26338954");
        assert_eq!(first.category, Category::Western);
        assert!(first.has_phone);
        assert!(first.address.contains("한강대로"));
        assert!(first.address.contains("한강로2가"));
        assert_eq!(
            first.place_url.as_deref(),
            Some("http://place.map.kakao.com/26338954")
        );

        let second = &places[1];
        assert_eq!(second.category, Category::Cafe);
        assert!(!second.has_phone);
        assert_eq!(second.place_url, None);
    }

    #[test]
    fn missing_documents_is_empty() {
        assert!(parse_keyword_response(r#"{"meta":{}}"#).unwrap().is_empty());
    }

    #[test]
    fn malformed_body_is_json_error() {
        let err = parse_keyword_response("<html>").unwrap_err();
        assert!(matches!(err, ProviderError::Json(_)));
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = KakaoClient::with_base_url("http://localhost:8080/".into(), "k".into());
        assert_eq!(client.base_url, "http://localhost:8080");
    }
}
