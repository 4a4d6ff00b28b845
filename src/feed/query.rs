use super::page_offset;
use crate::error::FetchError;
use crate::model::{FeedSnapshot, LaunchRecord, PAGE_SIZE};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One issued page request, tagged with the query generation it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub page: u32,
    pub search: String,
}

impl FetchTicket {
    pub fn offset(&self) -> u32 {
        page_offset(self.page, PAGE_SIZE)
    }
}

/// What applying a response did to the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Replaced { count: usize },
    Appended { count: usize },
    /// Empty page: no more fetches until the search text changes.
    Exhausted,
    /// Response belonged to a superseded query and was dropped.
    Stale,
    Failed { message: String },
}

/// Search text, page counter and accumulated records for the current query.
#[derive(Debug)]
pub struct QueryController {
    search_text: String,
    page: u32,
    has_more: bool,
    records: Vec<LaunchRecord>,
    // Applied pages of this generation, keyed by page number; `records` is their
    // concatenation in page order.
    pages: BTreeMap<u32, Vec<LaunchRecord>>,
    generation: u64,
    // Highest page already requested in this generation.
    requested_through: u32,
    in_flight: usize,
}

impl QueryController {
    pub fn new(search_text: impl Into<String>) -> Self {
        Self {
            search_text: search_text.into(),
            page: 1,
            has_more: true,
            records: Vec::new(),
            pages: BTreeMap::new(),
            generation: 0,
            requested_through: 0,
            in_flight: 0,
        }
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn records(&self) -> &[LaunchRecord] {
        &self.records
    }

    pub fn loading(&self) -> bool {
        self.in_flight > 0
    }

    /// Start a new query lifetime: clears records and rewinds pagination.
    pub fn commit_search(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
        self.generation += 1;
        self.records.clear();
        self.pages.clear();
        self.page = 1;
        self.has_more = true;
        self.requested_through = 0;
        info!(search = %self.search_text, generation = self.generation, "search committed");
    }

    /// The user scrolled to the bottom. Advances even when exhausted; `next_fetch` decides.
    pub fn advance_page(&mut self) -> u32 {
        self.page = self.page.saturating_add(1);
        self.page
    }

    /// Request for the current page, unless the query is exhausted or the page was
    /// already requested in this generation.
    pub fn next_fetch(&mut self) -> Option<FetchTicket> {
        if !self.has_more || self.page <= self.requested_through {
            return None;
        }
        self.requested_through = self.page;
        self.in_flight += 1;
        Some(FetchTicket {
            generation: self.generation,
            page: self.page,
            search: self.search_text.clone(),
        })
    }

    pub fn apply(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Vec<LaunchRecord>, FetchError>,
    ) -> FetchOutcome {
        self.in_flight = self.in_flight.saturating_sub(1);

        if ticket.generation != self.generation {
            debug!(
                stale = ticket.generation,
                current = self.generation,
                page = ticket.page,
                "dropping response for superseded query"
            );
            return FetchOutcome::Stale;
        }

        match result {
            Err(e) => {
                warn!(page = ticket.page, search = %ticket.search, error = %e, "error fetching launches");
                FetchOutcome::Failed {
                    message: e.to_string(),
                }
            }
            Ok(docs) if docs.is_empty() => {
                self.has_more = false;
                FetchOutcome::Exhausted
            }
            Ok(docs) => {
                let count = docs.len();
                let in_order = self
                    .pages
                    .last_key_value()
                    .map_or(true, |(&last, _)| last < ticket.page);
                if in_order {
                    self.records.extend(docs.iter().cloned());
                    self.pages.insert(ticket.page, docs);
                } else {
                    // An earlier page landed after a later one: slot it in by page number.
                    debug!(page = ticket.page, "page arrived out of order");
                    self.pages.insert(ticket.page, docs);
                    self.rebuild_records();
                }
                if ticket.page == 1 {
                    FetchOutcome::Replaced { count }
                } else {
                    FetchOutcome::Appended { count }
                }
            }
        }
    }

    fn rebuild_records(&mut self) {
        self.records = self.pages.values().flatten().cloned().collect();
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            generation: self.generation,
            search_text: self.search_text.clone(),
            page: self.page,
            has_more: self.has_more,
            loading: self.loading(),
            records: Arc::new(self.records.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str) -> LaunchRecord {
        LaunchRecord {
            id: id.into(),
            name: format!("Launch {id}"),
            date_local: "2020-01-01T00:00:00Z".into(),
            upcoming: false,
            success: Some(true),
            details: None,
            links: None,
        }
    }

    fn page_of(prefix: &str, n: usize) -> Vec<LaunchRecord> {
        (0..n).map(|i| rec(&format!("{prefix}{i}"))).collect()
    }

    fn transport_error() -> FetchError {
        FetchError::status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "oops")
    }

    #[test]
    fn first_fetch_is_page_one_at_offset_zero() {
        let mut q = QueryController::new("");
        let t = q.next_fetch().unwrap();
        assert_eq!(t.page, 1);
        assert_eq!(t.offset(), 0);
        assert!(q.loading());
        // Same page is never requested twice.
        assert_eq!(q.next_fetch(), None);
    }

    #[test]
    fn pages_replace_then_append() {
        let mut q = QueryController::new("Falcon");
        let t1 = q.next_fetch().unwrap();
        assert_eq!(q.apply(&t1, Ok(page_of("a", 10))), FetchOutcome::Replaced { count: 10 });

        q.advance_page();
        let t2 = q.next_fetch().unwrap();
        assert_eq!(t2.offset(), 10);
        assert_eq!(q.apply(&t2, Ok(page_of("b", 4))), FetchOutcome::Appended { count: 4 });
        assert_eq!(q.records().len(), 14);
        assert_eq!(q.records()[10].id, "b0");
        assert!(!q.loading());
    }

    #[test]
    fn search_change_resets_state() {
        let mut q = QueryController::new("");
        let t1 = q.next_fetch().unwrap();
        q.apply(&t1, Ok(page_of("a", 10)));
        q.advance_page();
        let t2 = q.next_fetch().unwrap();
        q.apply(&t2, Ok(Vec::new()));
        assert!(!q.has_more());

        q.commit_search("Star");
        assert!(q.records().is_empty());
        assert_eq!(q.page(), 1);
        assert!(q.has_more());

        let t = q.next_fetch().unwrap();
        assert_eq!(t.page, 1);
        assert_eq!(t.search, "Star");
        assert_eq!(t.generation, 1);
    }

    #[test]
    fn empty_page_terminates_query() {
        let mut q = QueryController::new("zzz");
        let t1 = q.next_fetch().unwrap();
        assert_eq!(q.apply(&t1, Ok(Vec::new())), FetchOutcome::Exhausted);
        for _ in 0..5 {
            q.advance_page();
            assert_eq!(q.next_fetch(), None);
        }
        q.commit_search("zz");
        assert!(q.next_fetch().is_some());
    }

    #[test]
    fn failure_keeps_state() {
        let mut q = QueryController::new("");
        let t1 = q.next_fetch().unwrap();
        q.apply(&t1, Ok(page_of("a", 10)));
        q.advance_page();
        let t2 = q.next_fetch().unwrap();

        let outcome = q.apply(&t2, Err(transport_error()));
        assert!(matches!(outcome, FetchOutcome::Failed { .. }));
        assert_eq!(q.records().len(), 10);
        assert!(q.has_more());
        assert!(!q.loading());
    }

    #[test]
    fn stale_generation_is_dropped() {
        let mut q = QueryController::new("a");
        let old = q.next_fetch().unwrap();
        q.commit_search("ab");
        let new = q.next_fetch().unwrap();

        assert_eq!(q.apply(&new, Ok(page_of("new", 3))), FetchOutcome::Replaced { count: 3 });
        assert!(q.loading());
        // Old response arrives late and must not overwrite the newer one.
        assert_eq!(q.apply(&old, Ok(page_of("old", 10))), FetchOutcome::Stale);
        assert_eq!(q.records().len(), 3);
        assert_eq!(q.records()[0].id, "new0");
        assert!(!q.loading());
    }

    #[test]
    fn late_first_page_lands_in_front() {
        let mut q = QueryController::new("");
        let t1 = q.next_fetch().unwrap();
        q.advance_page();
        let t2 = q.next_fetch().unwrap();

        assert_eq!(q.apply(&t2, Ok(page_of("p2-", 10))), FetchOutcome::Appended { count: 10 });
        assert_eq!(q.apply(&t1, Ok(page_of("p1-", 10))), FetchOutcome::Replaced { count: 10 });

        let ids: Vec<&str> = q.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), 20);
        assert_eq!(ids[0], "p1-0");
        assert_eq!(ids[9], "p1-9");
        assert_eq!(ids[10], "p2-0");
        assert_eq!(q.page(), 2);
        assert!(!q.loading());

        q.advance_page();
        let t3 = q.next_fetch().unwrap();
        assert_eq!(q.apply(&t3, Ok(page_of("p3-", 2))), FetchOutcome::Appended { count: 2 });
        assert_eq!(q.records()[20].id, "p3-0");
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut q = QueryController::new("x");
        let t = q.next_fetch().unwrap();
        let s = q.snapshot();
        assert!(s.loading);
        assert_eq!(s.search_text, "x");
        q.apply(&t, Ok(page_of("x", 2)));
        let s = q.snapshot();
        assert!(!s.loading);
        assert_eq!(s.records.len(), 2);
        assert_eq!(s.page, 1);
    }
}
