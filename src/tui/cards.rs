use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use time::OffsetDateTime;

use super::state::UiState;
use crate::cards::{self, LaunchStatus};
use crate::model::{LaunchRecord, PatchStatus};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const INDENT: &str = "    ";

/// Rendered list content plus the row range of each card, used for scrolling and clicks.
pub struct ListLayout {
    pub lines: Vec<Line<'static>>,
    /// (first row, row count) per record, in record order.
    pub card_rows: Vec<(usize, usize)>,
}

impl ListLayout {
    pub fn content_height(&self) -> usize {
        self.lines.len()
    }

    /// Index of the card covering `row`, if any.
    pub fn card_at(&self, row: usize) -> Option<usize> {
        self.card_rows
            .iter()
            .position(|&(start, len)| row >= start && row < start + len)
    }

    /// First card whose top row is at or below `row`.
    pub fn first_card_from(&self, row: usize) -> Option<usize> {
        self.card_rows.iter().position(|&(start, _)| start >= row)
    }
}

fn status_color(status: LaunchStatus) -> Color {
    match status {
        LaunchStatus::Upcoming => Color::Cyan,
        LaunchStatus::Completed => Color::Green,
        LaunchStatus::Failed => Color::Red,
        LaunchStatus::Unknown => Color::Gray,
    }
}

/// Greedy word wrap; words longer than the width are split.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();
        while chars.len() > width {
            if current_len > 0 {
                out.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = chars.split_off(width);
            out.push(chars.into_iter().collect());
            chars = rest;
        }
        let word_len = chars.len();
        if word_len == 0 {
            continue;
        }
        let needed = if current_len == 0 {
            word_len
        } else {
            current_len + 1 + word_len
        };
        if needed > width {
            out.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(chars);
        current_len += word_len;
    }
    if current_len > 0 {
        out.push(current);
    }
    out
}

fn patch_line(record: &LaunchRecord, state: &UiState) -> Line<'static> {
    let label = Span::styled("Patch: ", Style::default().fg(Color::Gray));
    let Some(url) = record.patch_url() else {
        return Line::from(vec![
            Span::raw(INDENT),
            label,
            Span::styled("[SpaceX]", Style::default().fg(Color::DarkGray)),
        ]);
    };
    if state.patches.show_placeholder(&record.id) {
        let note = match state.patches.status(&record.id) {
            Some(PatchStatus::Failed) => " (unavailable)",
            _ => " (loading…)",
        };
        return Line::from(vec![
            Span::raw(INDENT),
            label,
            Span::styled("[SpaceX]", Style::default().fg(Color::DarkGray)),
            Span::styled(note, Style::default().fg(Color::DarkGray)),
        ]);
    }
    let size = match state.patches.status(&record.id) {
        Some(PatchStatus::Loaded { bytes }) => format!(" ({:.1} KiB)", bytes as f64 / 1024.0),
        _ => String::new(),
    };
    Line::from(vec![
        Span::raw(INDENT),
        label,
        Span::styled(url.to_string(), Style::default().fg(Color::Cyan)),
        Span::styled(size, Style::default().fg(Color::Gray)),
    ])
}

fn card_lines(
    record: &LaunchRecord,
    selected: bool,
    state: &UiState,
    now: OffsetDateTime,
    width: usize,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let expanded = state.expand.is_expanded(&record.id);
    let status = LaunchStatus::of(record);

    let marker = match (selected, expanded) {
        (true, true) => "▾ ",
        (true, false) => "▸ ",
        _ => "  ",
    };
    let name_style = if selected {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    lines.push(Line::from(vec![
        Span::styled(marker, Style::default().fg(Color::Yellow)),
        Span::styled(record.name.clone(), name_style),
        Span::raw("  "),
        Span::styled(
            format!("[{}]", status.label()),
            Style::default().fg(status_color(status)),
        ),
    ]));

    if expanded {
        lines.push(patch_line(record, state));

        let when = cards::calculate_time(&record.date_local, now)
            .unwrap_or_else(|| format!("date unavailable ({})", record.date_local));
        let mut spans = vec![Span::raw(INDENT), Span::raw(when)];
        let items = cards::link_items(record.links.as_ref());
        if !items.is_empty() {
            spans.push(Span::raw(cards::LINK_SEPARATOR));
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    spans.push(Span::raw(cards::LINK_SEPARATOR));
                }
                spans.push(Span::styled(
                    item.label,
                    Style::default()
                        .fg(Color::Magenta)
                        .add_modifier(Modifier::UNDERLINED),
                ));
            }
        }
        lines.push(Line::from(spans));

        let text_width = width.saturating_sub(INDENT.len()).max(10);
        for chunk in wrap_text(cards::details_text(record), text_width) {
            lines.push(Line::from(vec![Span::raw(INDENT), Span::raw(chunk)]));
        }
    }

    let button = if expanded { "[Hide]" } else { "[View]" };
    lines.push(Line::from(vec![
        Span::raw(INDENT),
        Span::styled(button, Style::default().fg(Color::Magenta)),
    ]));
    lines.push(Line::from(""));
    lines
}

/// Lay out every card followed by the loading / end-of-list footer.
pub fn build_list(state: &UiState, now: OffsetDateTime) -> ListLayout {
    let width = state.viewport_width as usize;
    let mut lines = Vec::new();
    let mut card_rows = Vec::with_capacity(state.feed.records.len());

    for (idx, record) in state.feed.records.iter().enumerate() {
        let start = lines.len();
        let selected = state.tab == 0 && idx == state.selected;
        lines.extend(card_lines(record, selected, state, now, width));
        card_rows.push((start, lines.len() - start));
    }

    let feed = &state.feed;
    if feed.loading {
        let frame = SPINNER[state.spinner_frame % SPINNER.len()];
        lines.push(Line::from(vec![
            Span::styled(frame, Style::default().fg(Color::Yellow)),
            Span::raw(" Loading launches…"),
        ]));
    } else if feed.records.is_empty() && !feed.search_text.trim().is_empty() {
        lines.push(Line::from(vec![
            Span::raw("No Flight Record Found for \""),
            Span::styled(
                feed.search_text.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("\""),
        ]));
    } else if !feed.records.is_empty() && !feed.has_more {
        lines.push(Line::from(Span::styled(
            "End of List.",
            Style::default().fg(Color::Gray),
        )));
    }

    ListLayout { lines, card_rows }
}
