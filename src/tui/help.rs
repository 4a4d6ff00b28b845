use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn key_line(key: &'static str, pad: usize, action: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key, Style::default().fg(Color::Magenta)),
        Span::raw(" ".repeat(pad)),
        Span::raw(action),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("q", Style::default().fg(Color::Magenta)),
            Span::raw(" / "),
            Span::styled("Ctrl-C", Style::default().fg(Color::Magenta)),
            Span::raw("  Quit"),
        ]),
        key_line("/", 11, "Edit search (Enter/Esc to finish)"),
        key_line("tab", 9, "Switch tabs"),
        key_line("?", 11, "Show this help"),
        Line::from(""),
        Line::from("Launches tab:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("↑/↓", Style::default().fg(Color::Magenta)),
            Span::raw(" or "),
            Span::styled("j/k", Style::default().fg(Color::Magenta)),
            Span::raw("  Navigate (more launches load at the bottom)"),
        ]),
        key_line("PgUp/PgDn", 3, "Scroll a page"),
        key_line("g/G", 9, "Jump to top/bottom"),
        key_line("enter", 7, "View/Hide selected launch"),
        key_line("a", 11, "Open article in browser"),
        key_line("w", 11, "Open webcast in browser"),
        key_line("y", 11, "Copy first link to clipboard"),
        key_line("mouse", 7, "Wheel scrolls, click toggles a card"),
        Line::from(""),
        Line::from("Data:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(
                "https://github.com/r-spacex/SpaceX-API",
                Style::default().fg(Color::Cyan),
            ),
        ]),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(p, area);
}
