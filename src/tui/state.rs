use crate::cards::{ExpandState, PatchImages};
use crate::model::{FeedSnapshot, LaunchRecord, PatchStatus};

pub struct UiState {
    pub tab: usize,
    pub info: String,

    pub feed: FeedSnapshot,
    pub expand: ExpandState,
    pub patches: PatchImages,

    pub selected: usize, // Index into feed.records
    pub scroll_top: usize,
    // List viewport in rows/columns, refreshed from the terminal size every loop turn
    pub viewport_height: usize,
    pub viewport_width: u16,

    pub search_input: String,
    pub search_editing: bool,

    pub spinner_frame: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            tab: 0,
            info: String::new(),
            feed: FeedSnapshot::default(),
            expand: ExpandState::default(),
            patches: PatchImages::default(),
            selected: 0,
            scroll_top: 0,
            viewport_height: 20,
            viewport_width: 80,
            search_input: String::new(),
            search_editing: false,
            spinner_frame: 0,
        }
    }
}

impl UiState {
    /// Take a new feed snapshot. A new generation means a new query: selection, scroll,
    /// expansion and patch statuses start over.
    pub fn apply_snapshot(&mut self, snapshot: FeedSnapshot) {
        if snapshot.generation != self.feed.generation {
            self.selected = 0;
            self.scroll_top = 0;
            self.expand.clear();
            self.patches = PatchImages::default();
        }
        self.feed = snapshot;
        self.expand.retain_in(&self.feed.records);
        if self.selected >= self.feed.records.len() {
            self.selected = self.feed.records.len().saturating_sub(1);
        }
    }

    pub fn apply_patch(&mut self, id: &str, status: PatchStatus) {
        self.patches = self.patches.with_status(id, status);
    }

    pub fn selected_record(&self) -> Option<&LaunchRecord> {
        self.feed.records.get(self.selected)
    }

    pub fn select_next(&mut self) -> bool {
        if self.selected + 1 < self.feed.records.len() {
            self.selected += 1;
            true
        } else {
            false
        }
    }

    pub fn select_prev(&mut self) -> bool {
        if self.selected > 0 {
            self.selected -= 1;
            true
        } else {
            false
        }
    }

    pub fn tick_spinner(&mut self) {
        if self.feed.loading {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn rec(id: &str) -> LaunchRecord {
        LaunchRecord {
            id: id.into(),
            name: id.into(),
            date_local: "2020-01-01T00:00:00Z".into(),
            upcoming: true,
            success: None,
            details: None,
            links: None,
        }
    }

    fn snap(generation: u64, ids: &[&str]) -> FeedSnapshot {
        FeedSnapshot {
            generation,
            records: Arc::new(ids.iter().map(|i| rec(i)).collect()),
            ..Default::default()
        }
    }

    #[test]
    fn new_generation_resets_view_state() {
        let mut s = UiState::default();
        s.apply_snapshot(snap(0, &["a", "b", "c"]));
        s.selected = 2;
        s.scroll_top = 7;
        s.expand.toggle("c");
        s.apply_patch("c", PatchStatus::Loaded { bytes: 1 });

        s.apply_snapshot(snap(1, &[]));
        assert_eq!(s.selected, 0);
        assert_eq!(s.scroll_top, 0);
        assert_eq!(s.expand.expanded(), None);
        assert_eq!(s.patches.status("c"), None);
    }

    #[test]
    fn appended_page_keeps_selection_and_expansion() {
        let mut s = UiState::default();
        s.apply_snapshot(snap(0, &["a", "b"]));
        s.selected = 1;
        s.expand.toggle("b");
        s.apply_snapshot(snap(0, &["a", "b", "c", "d"]));
        assert_eq!(s.selected, 1);
        assert_eq!(s.expand.expanded(), Some("b"));
        assert!(s.select_next());
        assert!(s.select_next());
        assert!(!s.select_next());
        assert_eq!(s.selected_record().map(|r| r.id.as_str()), Some("d"));
    }
}
