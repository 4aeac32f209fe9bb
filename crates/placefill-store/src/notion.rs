//! Notion database backend.
//!
//! Each record is a database page. Fields map to page properties by name
//! ([`PropertyNames`]); each field has a fixed Notion property type.

use async_trait::async_trait;
use placefill_core::{Record, RecordField, RecordUpdate};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use crate::{PendingFilter, PendingPage, RecordStore, StoreError};

const NOTION_API: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PropertyKind {
    Title,
    RichText,
    Select,
    MultiSelect,
    Url,
    Number,
}

impl PropertyKind {
    fn of(field: RecordField) -> Self {
        match field {
            RecordField::Name => Self::Title,
            RecordField::Location
            | RecordField::ExternalId
            | RecordField::AttributionText
            | RecordField::SummaryText => Self::RichText,
            RecordField::Category => Self::Select,
            RecordField::Mood | RecordField::Service | RecordField::PartySize => Self::MultiSelect,
            RecordField::MatchUrl | RecordField::MapUrl | RecordField::ImageUrl => Self::Url,
            RecordField::RatingScore | RecordField::PriceCap => Self::Number,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::RichText => "rich_text",
            Self::Select => "select",
            Self::MultiSelect => "multi_select",
            Self::Url => "url",
            Self::Number => "number",
        }
    }
}

/// Database property name for every record field.
#[derive(Debug, Clone)]
pub struct PropertyNames {
    pub name: String,
    pub location: String,
    pub mood: String,
    pub service: String,
    pub party_size: String,
    pub match_url: String,
    pub category: String,
    pub rating_score: String,
    pub map_url: String,
    pub external_id: String,
    pub image_url: String,
    pub attribution_text: String,
    pub price_cap: String,
    pub summary_text: String,
}

impl Default for PropertyNames {
    fn default() -> Self {
        Self {
            name: "Name".into(),
            location: "Location".into(),
            mood: "Mood".into(),
            service: "Service".into(),
            party_size: "PartySize".into(),
            match_url: "Kakao".into(),
            category: "Status".into(),
            rating_score: "Rating".into(),
            map_url: "GoogleMap".into(),
            external_id: "PlaceId".into(),
            image_url: "Image".into(),
            attribution_text: "Attribution".into(),
            price_cap: "PriceCap".into(),
            summary_text: "Summary".into(),
        }
    }
}

impl PropertyNames {
    pub fn get(&self, field: RecordField) -> &str {
        match field {
            RecordField::Name => &self.name,
            RecordField::Location => &self.location,
            RecordField::Mood => &self.mood,
            RecordField::Service => &self.service,
            RecordField::PartySize => &self.party_size,
            RecordField::MatchUrl => &self.match_url,
            RecordField::Category => &self.category,
            RecordField::RatingScore => &self.rating_score,
            RecordField::MapUrl => &self.map_url,
            RecordField::ExternalId => &self.external_id,
            RecordField::ImageUrl => &self.image_url,
            RecordField::AttributionText => &self.attribution_text,
            RecordField::PriceCap => &self.price_cap,
            RecordField::SummaryText => &self.summary_text,
        }
    }
}

#[derive(Deserialize)]
struct QueryResponse {
    results: Vec<Page>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Deserialize)]
struct Page {
    id: String,
    properties: Map<String, Value>,
}

/// Record store over a Notion database.
pub struct NotionStore {
    client: reqwest::Client,
    base_url: String,
    token: String,
    database_id: String,
    names: PropertyNames,
}

impl NotionStore {
    pub fn new(token: String, database_id: String) -> Self {
        Self::with_base_url(NOTION_API.to_string(), token, database_id)
    }

    /// Point at a different API root (no trailing slash needed).
    pub fn with_base_url(base_url: String, token: String, database_id: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            database_id,
            names: PropertyNames::default(),
        }
    }

    pub fn with_property_names(mut self, names: PropertyNames) -> Self {
        self.names = names;
        self
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, StoreError> {
        let resp = req
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp)
    }
}

#[async_trait]
impl RecordStore for NotionStore {
    async fn query_pending(
        &self,
        filter: &PendingFilter,
        cursor: Option<&str>,
    ) -> Result<PendingPage, StoreError> {
        let url = format!("{}/databases/{}/query", self.base_url, self.database_id);
        let body = query_body(filter, &self.names, cursor);

        info!(database = %self.database_id, cursor, "querying pending records");
        let resp = self.send(self.client.post(&url).json(&body)).await?;
        let parsed: QueryResponse = resp.json().await?;

        let page = decode_results(parsed, &self.names);
        info!(
            count = page.records.len(),
            more = page.next_cursor.is_some(),
            "fetched pending records"
        );
        Ok(page)
    }

    async fn update_partial(&self, id: &str, update: &RecordUpdate) -> Result<(), StoreError> {
        let properties = encode_update(update, &self.names);
        if properties.is_empty() {
            return Ok(());
        }
        let url = format!("{}/pages/{}", self.base_url, id);
        debug!(page = %id, fields = properties.len(), "updating page");
        self.send(
            self.client
                .patch(&url)
                .json(&json!({ "properties": properties })),
        )
        .await?;
        Ok(())
    }
}

// ── Filter ──

fn build_filter(filter: &PendingFilter, names: &PropertyNames) -> Value {
    let empties: Vec<Value> = filter
        .any_empty
        .iter()
        .map(|&field| {
            let kind = PropertyKind::of(field).as_str();
            json!({ "property": names.get(field), kind: { "is_empty": true } })
        })
        .collect();

    let mut clauses = vec![
        json!({ "property": names.name, "title": { "is_not_empty": true } }),
        json!({ "or": empties }),
    ];
    if let Some(flag) = &filter.include_flag {
        clauses.push(json!({ "property": flag, "checkbox": { "equals": true } }));
    }
    json!({ "and": clauses })
}

fn query_body(filter: &PendingFilter, names: &PropertyNames, cursor: Option<&str>) -> Value {
    let mut body = json!({
        "filter": build_filter(filter, names),
        "page_size": filter.page_size,
    });
    if let Some(cursor) = cursor {
        body["start_cursor"] = json!(cursor);
    }
    body
}

// ── Decoding ──

/// Decode every page that can be decoded. A bad page is logged and dropped
/// so it cannot sink the rest of the batch.
fn decode_results(resp: QueryResponse, names: &PropertyNames) -> PendingPage {
    let mut records = Vec::with_capacity(resp.results.len());
    for page in resp.results {
        let id = page.id.clone();
        match decode_page(page, names) {
            Ok(record) => records.push(record),
            Err(e) => warn!(page = %id, error = %e, "skipping undecodable page"),
        }
    }
    PendingPage {
        records,
        next_cursor: resp.next_cursor.filter(|_| resp.has_more),
    }
}

fn plain_text(items: Option<&Value>) -> String {
    items
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|t| t.get("plain_text").and_then(Value::as_str))
                .collect::<String>()
        })
        .unwrap_or_default()
}

fn read_text(props: &Map<String, Value>, key: &str) -> Option<String> {
    let p = props.get(key)?;
    let text = match p.get("type")?.as_str()? {
        "title" => plain_text(p.get("title")),
        "rich_text" => plain_text(p.get("rich_text")),
        "select" => p
            .pointer("/select/name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        "url" => p.get("url").and_then(Value::as_str)?.to_string(),
        _ => return None,
    };
    (!text.trim().is_empty()).then_some(text)
}

fn read_list(props: &Map<String, Value>, key: &str) -> Vec<String> {
    props
        .get(key)
        .and_then(|p| p.get("multi_select"))
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|x| x.get("name").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn read_number(props: &Map<String, Value>, key: &str) -> Option<f64> {
    props.get(key)?.get("number")?.as_f64()
}

fn decode_page(page: Page, names: &PropertyNames) -> Result<Record, StoreError> {
    let props = &page.properties;
    let name = read_text(props, &names.name).ok_or_else(|| StoreError::Decode {
        id: page.id.clone(),
        reason: format!("missing title property {:?}", names.name),
    })?;

    let mut record = Record::new(page.id.clone(), name);
    record.location = read_text(props, &names.location);
    record.mood = read_list(props, &names.mood);
    record.service = read_list(props, &names.service);
    record.party_size = read_list(props, &names.party_size);

    let d = &mut record.derived;
    d.match_url = read_text(props, &names.match_url);
    d.category = read_text(props, &names.category);
    d.rating_score = read_number(props, &names.rating_score);
    d.map_url = read_text(props, &names.map_url);
    d.external_id = read_text(props, &names.external_id);
    d.image_url = read_text(props, &names.image_url);
    d.attribution_text = read_text(props, &names.attribution_text);
    d.price_cap = read_number(props, &names.price_cap);
    d.summary_text = read_text(props, &names.summary_text);
    Ok(record)
}

// ── Encoding ──

fn encode_text(kind: PropertyKind, value: &str) -> Value {
    match kind {
        PropertyKind::Title => json!({ "title": [{ "text": { "content": value } }] }),
        PropertyKind::Select => json!({ "select": { "name": value } }),
        PropertyKind::Url => json!({ "url": value }),
        _ => json!({ "rich_text": [{ "text": { "content": value } }] }),
    }
}

fn encode_update(update: &RecordUpdate, names: &PropertyNames) -> Map<String, Value> {
    let mut props = Map::new();
    let mut put = |field: RecordField, value: Value| {
        props.insert(names.get(field).to_string(), value);
    };

    for (field, value) in [
        (RecordField::MatchUrl, &update.match_url),
        (RecordField::Category, &update.category),
        (RecordField::MapUrl, &update.map_url),
        (RecordField::ExternalId, &update.external_id),
        (RecordField::ImageUrl, &update.image_url),
        (RecordField::AttributionText, &update.attribution_text),
        (RecordField::SummaryText, &update.summary_text),
    ] {
        if let Some(v) = value {
            put(field, encode_text(PropertyKind::of(field), v));
        }
    }

    for (field, value) in [
        (RecordField::RatingScore, update.rating_score),
        (RecordField::PriceCap, update.price_cap),
    ] {
        if let Some(n) = value {
            put(field, json!({ "number": n }));
        }
    }

    for (field, value) in [
        (RecordField::Mood, &update.mood),
        (RecordField::Service, &update.service),
        (RecordField::PartySize, &update.party_size),
    ] {
        if let Some(tags) = value {
            let options: Vec<Value> = tags.iter().map(|t| json!({ "name": t })).collect();
            put(field, json!({ "multi_select": options }));
        }
    }

    props
}
