//! Presentation rules for launch cards, shared by the TUI and text output.

use crate::model::{LaunchRecord, Links, PatchStatus};
use std::collections::HashMap;
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub const NO_DETAILS: &str = "No additional details available.";
pub const LINK_SEPARATOR: &str = " | ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchStatus {
    Upcoming,
    Completed,
    Failed,
    Unknown,
}

impl LaunchStatus {
    /// A past launch without a `success` value is `Unknown`, not failed.
    pub fn of(record: &LaunchRecord) -> Self {
        match (record.upcoming, record.success) {
            (true, _) => Self::Upcoming,
            (false, Some(true)) => Self::Completed,
            (false, Some(false)) => Self::Failed,
            (false, None) => Self::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Upcoming => "Upcoming",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
            Self::Unknown => "Unknown",
        }
    }
}

const MS_PER_HOUR: i128 = 60 * 60 * 1000;

/// Relative phrase for a launch date: the largest whole unit among hours, days and years,
/// truncated, e.g. "3 day(s) remaining" or "1 year(s) ago".
pub fn relative_time(launch: OffsetDateTime, now: OffsetDateTime) -> String {
    let diff_ms = (launch - now).whole_milliseconds();
    let (span_ms, suffix) = if diff_ms > 0 {
        (diff_ms, "remaining")
    } else {
        (-diff_ms, "ago")
    };

    let hours = span_ms / MS_PER_HOUR;
    let days = hours / 24;
    let years = days / 365;

    if hours < 24 {
        format!("{hours} hour(s) {suffix}")
    } else if days < 365 {
        format!("{days} day(s) {suffix}")
    } else {
        format!("{years} year(s) {suffix}")
    }
}

/// `relative_time` for the raw `date_local` string. Unparseable dates yield `None`.
pub fn calculate_time(date_local: &str, now: OffsetDateTime) -> Option<String> {
    OffsetDateTime::parse(date_local, &Rfc3339)
        .ok()
        .map(|launch| relative_time(launch, now))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkItem<'a> {
    pub label: &'static str,
    pub url: &'a str,
}

/// Present links in display order: article first, then webcast.
pub fn link_items(links: Option<&Links>) -> Vec<LinkItem<'_>> {
    let Some(links) = links else {
        return Vec::new();
    };
    let mut items = Vec::new();
    if let Some(url) = links.article.as_deref().filter(|u| !u.is_empty()) {
        items.push(LinkItem {
            label: "Article",
            url,
        });
    }
    if let Some(url) = links.webcast.as_deref().filter(|u| !u.is_empty()) {
        items.push(LinkItem { label: "Video", url });
    }
    items
}

/// Link labels joined by `" | "`, or `None` when there are no links.
pub fn links_text(links: Option<&Links>) -> Option<String> {
    let items = link_items(links);
    if items.is_empty() {
        return None;
    }
    Some(
        items
            .iter()
            .map(|i| i.label)
            .collect::<Vec<_>>()
            .join(LINK_SEPARATOR),
    )
}

pub fn details_text(record: &LaunchRecord) -> &str {
    record
        .details
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or(NO_DETAILS)
}

/// Expand/collapse state: at most one card is expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandState {
    expanded: Option<String>,
}

impl ExpandState {
    pub fn expanded(&self) -> Option<&str> {
        self.expanded.as_deref()
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded() == Some(id)
    }

    /// Collapse if `id` is the expanded card, otherwise make it the only expanded card.
    /// Returns whether `id` is expanded afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.is_expanded(id) {
            self.expanded = None;
            false
        } else {
            self.expanded = Some(id.to_string());
            true
        }
    }

    /// Drop the expansion if its card is no longer in the list.
    pub fn retain_in(&mut self, records: &[LaunchRecord]) {
        if let Some(id) = self.expanded.as_deref() {
            if !records.iter().any(|r| r.id == id) {
                self.expanded = None;
            }
        }
    }

    pub fn clear(&mut self) {
        self.expanded = None;
    }
}

/// Patch image load status per record id. Never mutated in place: every update builds a
/// new map and the holder swaps it in.
#[derive(Debug, Clone, Default)]
pub struct PatchImages {
    statuses: Arc<HashMap<String, PatchStatus>>,
}

impl PatchImages {
    pub fn status(&self, id: &str) -> Option<PatchStatus> {
        self.statuses.get(id).copied()
    }

    /// The placeholder stays visible until the patch has finished loading.
    pub fn show_placeholder(&self, id: &str) -> bool {
        !matches!(self.status(id), Some(PatchStatus::Loaded { .. }))
    }

    #[must_use]
    pub fn with_status(&self, id: &str, status: PatchStatus) -> Self {
        let mut next = (*self.statuses).clone();
        next.insert(id.to_string(), status);
        Self {
            statuses: Arc::new(next),
        }
    }
}
