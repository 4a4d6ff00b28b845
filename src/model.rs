use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Fixed page size for launch queries.
pub const PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub api_url: String,
    pub page_size: u32,
    pub debounce: Duration,
    pub request_timeout: Option<Duration>,
    pub user_agent: String,
}

/// One launch as returned by the query endpoint. Only the fields the client reads are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchRecord {
    pub id: String,
    pub name: String,
    pub date_local: String,
    #[serde(default)]
    pub upcoming: bool,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub links: Option<Links>,
}

impl LaunchRecord {
    pub fn patch_url(&self) -> Option<&str> {
        self.links
            .as_ref()
            .and_then(|l| l.patch.as_ref())
            .and_then(|p| p.small.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Links {
    #[serde(default)]
    pub article: Option<String>,
    #[serde(default)]
    pub webcast: Option<String>,
    #[serde(default)]
    pub patch: Option<Patch>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    #[serde(default)]
    pub small: Option<String>,
}

/// Request body for `POST /v4/launches/query`.
#[derive(Debug, Clone, Serialize)]
pub struct LaunchQuery {
    pub query: NameFilter,
    pub options: PageOptions,
}

#[derive(Debug, Clone, Serialize)]
pub struct NameFilter {
    pub name: RegexMatch,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegexMatch {
    #[serde(rename = "$regex")]
    pub regex: String,
    #[serde(rename = "$options")]
    pub options: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PageOptions {
    pub limit: u32,
    pub offset: u32,
}

impl LaunchQuery {
    /// Case-insensitive name match; the search text is passed through verbatim.
    pub fn new(search: &str, limit: u32, offset: u32) -> Self {
        Self {
            query: NameFilter {
                name: RegexMatch {
                    regex: search.to_string(),
                    options: "i".into(),
                },
            },
            options: PageOptions { limit, offset },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LaunchPage {
    #[serde(default)]
    pub docs: Vec<LaunchRecord>,
}

/// Read-only view of the feed pushed to presentation layers after every state change.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub generation: u64,
    pub search_text: String,
    pub page: u32,
    pub has_more: bool,
    pub loading: bool,
    pub records: Arc<Vec<LaunchRecord>>,
}

impl Default for FeedSnapshot {
    fn default() -> Self {
        Self {
            generation: 0,
            search_text: String::new(),
            page: 1,
            has_more: true,
            loading: false,
            records: Arc::new(Vec::new()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchStatus {
    Pending,
    Loaded { bytes: usize },
    Failed,
}

#[derive(Debug, Clone)]
pub enum FeedEvent {
    Snapshot(FeedSnapshot),
    Patch { id: String, status: PatchStatus },
    Info(InfoEvent),
}

/// Structured info events emitted by the orchestrator and consumed by UI/CLI layers.
#[derive(Debug, Clone)]
pub enum InfoEvent {
    QueryCommitted { search: String },
    FetchFailed { page: u32, message: String },
}

impl InfoEvent {
    /// Render a human-readable message for UI/CLI layers.
    pub fn to_message(&self) -> String {
        match self {
            InfoEvent::QueryCommitted { search } if search.is_empty() => {
                "Showing all launches".to_string()
            }
            InfoEvent::QueryCommitted { search } => format!("Searching for \"{}\"", search),
            InfoEvent::FetchFailed { page, message } => {
                format!("Fetch failed (page {}): {}", page, message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_body_matches_api_shape() {
        let q = LaunchQuery::new("Star", 10, 20);
        let v = serde_json::to_value(&q).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "query": { "name": { "$regex": "Star", "$options": "i" } },
                "options": { "limit": 10, "offset": 20 }
            })
        );
    }

    #[test]
    fn record_tolerates_nulls_and_unknown_fields() {
        let raw = r#"{
            "id": "5eb87cd9ffd86e000604b32a",
            "name": "FalconSat",
            "date_local": "2006-03-25T10:30:00+12:00",
            "upcoming": false,
            "success": null,
            "details": null,
            "flight_number": 1,
            "links": { "patch": { "small": null, "large": null }, "article": null, "webcast": "https://youtu.be/x" }
        }"#;
        let rec: LaunchRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(rec.success, None);
        assert_eq!(rec.patch_url(), None);
        assert_eq!(
            rec.links.as_ref().and_then(|l| l.webcast.as_deref()),
            Some("https://youtu.be/x")
        );
    }

    #[test]
    fn page_without_docs_is_empty() {
        let page: LaunchPage = serde_json::from_str(r#"{"totalDocs":0}"#).unwrap();
        assert!(page.docs.is_empty());
    }

    #[test]
    fn info_messages() {
        let m = InfoEvent::QueryCommitted {
            search: String::new(),
        };
        assert_eq!(m.to_message(), "Showing all launches");
        let m = InfoEvent::FetchFailed {
            page: 2,
            message: "boom".into(),
        };
        assert_eq!(m.to_message(), "Fetch failed (page 2): boom");
    }
}
