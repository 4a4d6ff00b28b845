mod cards;
mod help;
mod links;
mod scroll;
mod state;

use crate::api::SpacexClient;
use crate::model::{FeedConfig, FeedEvent};
use crate::orchestrator::{self, UiCommand};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Terminal,
};
use std::{io, time::Duration, time::Instant};
use time::OffsetDateTime;
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::debug;

use cards::{build_list, ListLayout};
use help::draw_help;
use links::{copy_selected_link, open_selected_link};
use scroll::{ScrollMetrics, ScrollSubscription};
use state::UiState;

const MOUSE_SCROLL_ROWS: isize = 3;

pub async fn run(cfg: FeedConfig, initial_search: String) -> Result<()> {
    let client = SpacexClient::new(&cfg)?;
    let (event_tx, event_rx) = mpsc::unbounded_channel::<FeedEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    // TUI runs in a dedicated thread to keep all blocking terminal I/O out of the Tokio runtime.
    let ui_search = initial_search.clone();
    let ui_handle = std::thread::spawn(move || run_threaded(ui_search, event_rx, cmd_tx));

    let res =
        orchestrator::run_controller(client, &cfg, initial_search, event_tx, cmd_rx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

struct Areas {
    tabs: Rect,
    search: Rect,
    list: Rect,
    status: Rect,
}

fn split_areas(area: Rect) -> Areas {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);
    Areas {
        tabs: chunks[0],
        search: chunks[1],
        list: chunks[2],
        status: chunks[3],
    }
}

fn inner(area: Rect) -> Rect {
    Rect {
        x: area.x.saturating_add(1),
        y: area.y.saturating_add(1),
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    }
}

/// Run the TUI loop on a dedicated thread.
fn run_threaded(
    initial_search: String,
    mut event_rx: UnboundedReceiver<FeedEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let res = (|| {
        let _scroll = ScrollSubscription::acquire()?;
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend).context("create terminal")?;
        terminal.clear().ok();
        event_loop(&mut terminal, initial_search, &mut event_rx, &cmd_tx)
    })();

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    initial_search: String,
    event_rx: &mut UnboundedReceiver<FeedEvent>,
    cmd_tx: &UnboundedSender<UiCommand>,
) -> Result<()> {
    let mut state = UiState {
        search_input: initial_search,
        ..Default::default()
    };

    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    loop {
        // Drain events without blocking to keep UI responsive.
        while let Ok(ev) = event_rx.try_recv() {
            apply_event(&mut state, ev);
        }

        let areas = terminal
            .size()
            .map(|s| split_areas(Rect::new(0, 0, s.width, s.height)))
            .context("read terminal size")?;
        let list_inner = inner(areas.list);
        state.viewport_height = list_inner.height as usize;
        state.viewport_width = list_inner.width;

        if last_tick.elapsed() >= tick_rate {
            state.tick_spinner();
            terminal.draw(|f| draw(f, &areas, &state)).ok();
            last_tick = Instant::now();
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if !event::poll(Duration::from_millis(10)).unwrap_or(false) {
            continue;
        }
        match event::read() {
            Ok(Event::Key(k)) => {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key(&mut state, k, cmd_tx) == KeyFlow::Quit {
                    let _ = cmd_tx.send(UiCommand::Quit);
                    return Ok(());
                }
            }
            Ok(Event::Mouse(m)) if state.tab == 0 => match m.kind {
                MouseEventKind::ScrollDown => scroll_rows(&mut state, MOUSE_SCROLL_ROWS, cmd_tx),
                MouseEventKind::ScrollUp => scroll_rows(&mut state, -MOUSE_SCROLL_ROWS, cmd_tx),
                MouseEventKind::Down(MouseButton::Left) => {
                    click_row(&mut state, list_inner, m.column, m.row, cmd_tx)
                }
                _ => {}
            },
            _ => {}
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum KeyFlow {
    Continue,
    Quit,
}

fn handle_key(state: &mut UiState, k: KeyEvent, cmd_tx: &UnboundedSender<UiCommand>) -> KeyFlow {
    if k.modifiers.contains(KeyModifiers::CONTROL) && k.code == KeyCode::Char('c') {
        return KeyFlow::Quit;
    }

    if state.search_editing {
        match (k.modifiers, k.code) {
            (_, KeyCode::Esc) | (_, KeyCode::Enter) => state.search_editing = false,
            (_, KeyCode::Backspace) => {
                state.search_input.pop();
                let _ = cmd_tx.send(UiCommand::SearchInput(state.search_input.clone()));
            }
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => {
                state.search_input.clear();
                let _ = cmd_tx.send(UiCommand::SearchInput(String::new()));
            }
            (_, KeyCode::Char(c)) => {
                state.search_input.push(c);
                let _ = cmd_tx.send(UiCommand::SearchInput(state.search_input.clone()));
            }
            _ => {}
        }
        return KeyFlow::Continue;
    }

    match k.code {
        KeyCode::Char('q') => return KeyFlow::Quit,
        KeyCode::Char('/') => {
            state.tab = 0;
            state.search_editing = true;
        }
        KeyCode::Tab => state.tab = (state.tab + 1) % 2,
        KeyCode::Char('?') => state.tab = 1,
        _ if state.tab != 0 => {}
        KeyCode::Down | KeyCode::Char('j') => move_selection(state, 1, cmd_tx),
        KeyCode::Up | KeyCode::Char('k') => move_selection(state, -1, cmd_tx),
        KeyCode::PageDown => {
            let rows = state.viewport_height.max(1) as isize;
            scroll_rows(state, rows, cmd_tx);
        }
        KeyCode::PageUp => {
            let rows = state.viewport_height.max(1) as isize;
            scroll_rows(state, -rows, cmd_tx);
        }
        KeyCode::Home | KeyCode::Char('g') => {
            state.selected = 0;
            state.scroll_top = 0;
        }
        KeyCode::End | KeyCode::Char('G') => {
            let prev_top = state.scroll_top;
            state.selected = state.feed.records.len().saturating_sub(1);
            let layout = layout_now(state);
            state.scroll_top = metrics(state, &layout).max_scroll_top();
            on_scroll(state, &layout, prev_top, true, cmd_tx);
        }
        KeyCode::Enter | KeyCode::Char(' ') => toggle_selected(state, cmd_tx),
        KeyCode::Char('a') => open_selected_link(state, "Article"),
        KeyCode::Char('w') => open_selected_link(state, "Video"),
        KeyCode::Char('y') => copy_selected_link(state),
        _ => {}
    }
    KeyFlow::Continue
}

fn layout_now(state: &UiState) -> ListLayout {
    build_list(state, OffsetDateTime::now_utc())
}

fn metrics(state: &UiState, layout: &ListLayout) -> ScrollMetrics {
    ScrollMetrics {
        viewport_height: state.viewport_height,
        scroll_top: state.scroll_top,
        content_height: layout.content_height(),
    }
}

/// Ask for the next page when the list moved down onto its bottom edge, or a downward
/// scroll input arrived while already there. Upward moves and an empty list never page.
fn on_scroll(
    state: &mut UiState,
    layout: &ListLayout,
    prev_top: usize,
    downward: bool,
    cmd_tx: &UnboundedSender<UiCommand>,
) {
    let m = metrics(state, layout).clamp();
    state.scroll_top = m.scroll_top;
    if state.feed.records.is_empty() || !m.at_bottom() {
        return;
    }
    if m.scroll_top > prev_top || downward {
        debug!(
            scroll_top = m.scroll_top,
            content_height = m.content_height,
            "list bottom reached"
        );
        let _ = cmd_tx.send(UiCommand::ReachedBottom);
    }
}

/// Keep the selected card inside the viewport.
fn reveal_selected(state: &mut UiState, layout: &ListLayout) {
    let Some(&(start, len)) = layout.card_rows.get(state.selected) else {
        return;
    };
    let viewport = state.viewport_height.max(1);
    if start < state.scroll_top {
        state.scroll_top = start;
    } else if start + len > state.scroll_top + viewport {
        state.scroll_top = (start + len).saturating_sub(viewport).min(start);
    }
}

fn move_selection(state: &mut UiState, delta: isize, cmd_tx: &UnboundedSender<UiCommand>) {
    let prev_top = state.scroll_top;
    let moved = if delta > 0 {
        state.select_next()
    } else {
        state.select_prev()
    };
    let layout = layout_now(state);
    if moved {
        reveal_selected(state, &layout);
    } else {
        // Already on the first/last card: scroll the content itself.
        state.scroll_top = metrics(state, &layout).scrolled_by(delta).scroll_top;
    }
    // Only pushing past the last card is a scroll input in its own right.
    on_scroll(state, &layout, prev_top, !moved && delta > 0, cmd_tx);
}

fn scroll_rows(state: &mut UiState, rows: isize, cmd_tx: &UnboundedSender<UiCommand>) {
    let prev_top = state.scroll_top;
    let layout = layout_now(state);
    state.scroll_top = metrics(state, &layout).scrolled_by(rows).scroll_top;

    // Selection follows the viewport when it scrolls out of view.
    if let Some(&(start, len)) = layout.card_rows.get(state.selected) {
        let viewport_end = state.scroll_top + state.viewport_height;
        if start + len <= state.scroll_top || start >= viewport_end {
            if let Some(idx) = layout.first_card_from(state.scroll_top) {
                state.selected = idx;
            }
        }
    }
    on_scroll(state, &layout, prev_top, rows > 0, cmd_tx);
}

fn toggle_selected(state: &mut UiState, cmd_tx: &UnboundedSender<UiCommand>) {
    let Some(record) = state.selected_record().cloned() else {
        return;
    };
    let expanded = state.expand.toggle(&record.id);
    if expanded && state.patches.status(&record.id).is_none() {
        if let Some(url) = record.patch_url() {
            let _ = cmd_tx.send(UiCommand::LoadPatch {
                id: record.id.clone(),
                url: url.to_string(),
            });
        }
    }
    let layout = layout_now(state);
    reveal_selected(state, &layout);
    state.scroll_top = metrics(state, &layout).clamp().scroll_top;
}

fn click_row(
    state: &mut UiState,
    list_inner: Rect,
    column: u16,
    row: u16,
    cmd_tx: &UnboundedSender<UiCommand>,
) {
    if !list_inner.contains(ratatui::layout::Position { x: column, y: row }) {
        return;
    }
    let content_row = state.scroll_top + (row - list_inner.y) as usize;
    let layout = layout_now(state);
    if let Some(idx) = layout.card_at(content_row) {
        state.selected = idx;
        toggle_selected(state, cmd_tx);
    }
}

fn apply_event(state: &mut UiState, ev: FeedEvent) {
    match ev {
        FeedEvent::Snapshot(snapshot) => state.apply_snapshot(snapshot),
        FeedEvent::Patch { id, status } => state.apply_patch(&id, status),
        FeedEvent::Info(info) => state.info = info.to_message(),
    }
}

fn draw(f: &mut ratatui::Frame, areas: &Areas, state: &UiState) {
    let tabs = Tabs::new(vec![Line::from("Launches"), Line::from("Help")])
        .select(state.tab)
        .block(Block::default().borders(Borders::ALL).title("spacex-launches"))
        .highlight_style(Style::default().fg(Color::Yellow));
    f.render_widget(tabs, areas.tabs);

    draw_search(f, areas.search, state);

    match state.tab {
        0 => draw_launches(f, areas.list, state),
        _ => draw_help(areas.list, f),
    }

    draw_status(f, areas.status, state);
}

fn draw_search(f: &mut ratatui::Frame, area: Rect, state: &UiState) {
    let line = if state.search_input.is_empty() && !state.search_editing {
        Line::from(vec![
            Span::styled("Search...", Style::default().fg(Color::DarkGray)),
            Span::raw("  (press "),
            Span::styled("/", Style::default().fg(Color::Magenta)),
            Span::raw(")"),
        ])
    } else if state.search_editing {
        Line::from(vec![
            Span::raw(state.search_input.as_str()),
            Span::styled("█", Style::default().fg(Color::Yellow)),
        ])
    } else {
        Line::from(Span::raw(state.search_input.as_str()))
    };
    let border = if state.search_editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let p = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title("Search"),
    );
    f.render_widget(p, area);
}

fn draw_launches(f: &mut ratatui::Frame, area: Rect, state: &UiState) {
    let layout = build_list(state, OffsetDateTime::now_utc());
    let top = metrics(state, &layout).clamp().scroll_top;
    let height = state.viewport_height;

    let visible: Vec<Line> = layout.lines.into_iter().skip(top).take(height).collect();
    let title = format!(
        "Launches ({} loaded, page {})",
        state.feed.records.len(),
        state.feed.page
    );
    let p = Paragraph::new(visible).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(p, area);
}

fn draw_status(f: &mut ratatui::Frame, area: Rect, state: &UiState) {
    let mut spans = vec![Span::styled("Status: ", Style::default().fg(Color::Gray))];
    if state.info.is_empty() {
        spans.push(Span::raw("Ready"));
    } else {
        spans.push(Span::raw(state.info.as_str()));
    }
    let p = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(p, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FeedSnapshot, LaunchRecord, Links, Patch};
    use std::sync::Arc;

    fn rec(id: &str) -> LaunchRecord {
        LaunchRecord {
            id: id.into(),
            name: id.into(),
            date_local: "2020-01-01T00:00:00Z".into(),
            upcoming: false,
            success: Some(true),
            details: None,
            links: Some(Links {
                patch: Some(Patch {
                    small: Some(format!("https://img/{id}.png")),
                }),
                ..Default::default()
            }),
        }
    }

    fn state_with(n: usize, viewport: usize) -> UiState {
        let mut s = UiState {
            viewport_height: viewport,
            ..Default::default()
        };
        s.apply_snapshot(FeedSnapshot {
            records: Arc::new((0..n).map(|i| rec(&i.to_string())).collect()),
            ..Default::default()
        });
        s
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn commands(rx: &mut UnboundedReceiver<UiCommand>) -> Vec<UiCommand> {
        let mut out = Vec::new();
        while let Ok(c) = rx.try_recv() {
            out.push(c);
        }
        out
    }

    #[test]
    fn scrolling_to_bottom_requests_next_page() {
        // 10 collapsed cards = 30 rows in a 12-row viewport.
        let mut s = state_with(10, 12);
        let (tx, mut rx) = mpsc::unbounded_channel();

        handle_key(&mut s, key(KeyCode::Down), &tx);
        assert!(commands(&mut rx).is_empty());

        handle_key(&mut s, key(KeyCode::End), &tx);
        assert_eq!(s.scroll_top, 18);
        assert!(matches!(
            commands(&mut rx).as_slice(),
            [UiCommand::ReachedBottom]
        ));
    }

    #[test]
    fn non_downward_input_does_not_request_a_page() {
        let mut s = state_with(10, 12);
        let (tx, mut rx) = mpsc::unbounded_channel();

        handle_key(&mut s, key(KeyCode::End), &tx);
        assert_eq!(commands(&mut rx).len(), 1);

        // Bottom still visible, selection moves up without scrolling.
        for _ in 0..3 {
            handle_key(&mut s, key(KeyCode::Up), &tx);
        }
        assert_eq!(s.scroll_top, 18);
        handle_key(&mut s, key(KeyCode::PageUp), &tx);
        handle_key(&mut s, key(KeyCode::Home), &tx);
        assert!(commands(&mut rx).is_empty());

        // Content shorter than the viewport: moving within it is not a scroll.
        let mut short = state_with(2, 30);
        handle_key(&mut short, key(KeyCode::Home), &tx);
        handle_key(&mut short, key(KeyCode::Char('j')), &tx);
        assert!(commands(&mut rx).is_empty());
        // Pushing past the last card is.
        handle_key(&mut short, key(KeyCode::Char('j')), &tx);
        assert!(matches!(
            commands(&mut rx).as_slice(),
            [UiCommand::ReachedBottom]
        ));
    }

    #[test]
    fn empty_list_never_requests_a_page() {
        let mut s = state_with(0, 12);
        s.feed.loading = true;
        let (tx, mut rx) = mpsc::unbounded_channel();
        for code in [KeyCode::Char('j'), KeyCode::PageDown, KeyCode::End] {
            handle_key(&mut s, key(code), &tx);
        }
        assert!(commands(&mut rx).is_empty());
    }

    #[test]
    fn expanding_requests_patch_once() {
        let mut s = state_with(3, 30);
        let (tx, mut rx) = mpsc::unbounded_channel();

        handle_key(&mut s, key(KeyCode::Enter), &tx);
        assert_eq!(s.expand.expanded(), Some("0"));
        match commands(&mut rx).as_slice() {
            [UiCommand::LoadPatch { id, url }] => {
                assert_eq!(id, "0");
                assert_eq!(url, "https://img/0.png");
            }
            other => panic!("unexpected commands: {other:?}"),
        }

        s.apply_patch("0", crate::model::PatchStatus::Pending);
        handle_key(&mut s, key(KeyCode::Enter), &tx);
        assert_eq!(s.expand.expanded(), None);
        handle_key(&mut s, key(KeyCode::Enter), &tx);
        assert!(commands(&mut rx).is_empty());
    }

    #[test]
    fn expanding_another_card_collapses_the_first() {
        let mut s = state_with(3, 60);
        let (tx, _rx) = mpsc::unbounded_channel();
        handle_key(&mut s, key(KeyCode::Enter), &tx);
        handle_key(&mut s, key(KeyCode::Char('j')), &tx);
        handle_key(&mut s, key(KeyCode::Char(' ')), &tx);
        assert_eq!(s.expand.expanded(), Some("1"));
    }

    #[test]
    fn search_editing_sends_each_keystroke() {
        let mut s = state_with(0, 10);
        let (tx, mut rx) = mpsc::unbounded_channel();

        handle_key(&mut s, key(KeyCode::Char('/')), &tx);
        assert!(s.search_editing);
        for c in ['f', 'a', 'l'] {
            handle_key(&mut s, key(KeyCode::Char(c)), &tx);
        }
        handle_key(&mut s, key(KeyCode::Backspace), &tx);
        // 'q' is text while editing, not quit.
        assert_eq!(handle_key(&mut s, key(KeyCode::Char('q')), &tx), KeyFlow::Continue);
        handle_key(&mut s, key(KeyCode::Esc), &tx);

        let inputs: Vec<String> = commands(&mut rx)
            .into_iter()
            .filter_map(|c| match c {
                UiCommand::SearchInput(t) => Some(t),
                _ => None,
            })
            .collect();
        assert_eq!(inputs, vec!["f", "fa", "fal", "fa", "faq"]);
        assert!(!s.search_editing);
        assert_eq!(handle_key(&mut s, key(KeyCode::Char('q')), &tx), KeyFlow::Quit);
    }

    #[test]
    fn click_toggles_card_under_cursor() {
        let mut s = state_with(3, 20);
        let (tx, _rx) = mpsc::unbounded_channel();
        let list = Rect::new(1, 7, 78, 20);
        // Row 3 of the content is the header of card 1.
        click_row(&mut s, list, 5, 10, &tx);
        assert_eq!(s.selected, 1);
        assert_eq!(s.expand.expanded(), Some("1"));
        // Clicks outside the list are ignored.
        click_row(&mut s, list, 5, 2, &tx);
        assert_eq!(s.expand.expanded(), Some("1"));
    }

    #[test]
    fn areas_stack_vertically() {
        let a = split_areas(Rect::new(0, 0, 80, 40));
        assert_eq!(a.tabs.height, 3);
        assert_eq!(a.search.y, 3);
        assert_eq!(a.list.y, 6);
        assert_eq!(a.list.height, 31);
        assert_eq!(a.status.y, 37);
    }
}
