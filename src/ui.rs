//! Terminal user interface for the interactive portfolio editor.

use crate::app::{App, Field, Notice};
use crate::flow::FlowState;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
};

/// Colors for the UI.
pub struct UiColors {
    pub accent: Color,
    pub warning: Color,
    pub error: Color,
    pub ok: Color,
    pub header_bg: Color,
    pub selected_bg: Color,
    pub border: Color,
}

impl Default for UiColors {
    fn default() -> Self {
        Self {
            accent: Color::Cyan,
            warning: Color::Yellow,
            error: Color::Red,
            ok: Color::Green,
            header_bg: Color::DarkGray,
            selected_bg: Color::Rgb(40, 40, 60),
            border: Color::DarkGray,
        }
    }
}

/// Render the main UI.
pub fn render(frame: &mut Frame, app: &App) {
    let colors = UiColors::default();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Input form
            Constraint::Min(5),    // Holdings table
            Constraint::Length(3), // Status
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    render_form(frame, app, chunks[0], &colors);
    render_holdings_table(frame, app, chunks[1], &colors);
    render_status(frame, app, chunks[2], &colors);
    render_footer(frame, chunks[3], &colors);
}

/// Render the symbol/quantity inputs and the risk selector.
fn render_form(frame: &mut Frame, app: &App, area: Rect, colors: &UiColors) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
        ])
        .split(area);

    let input = |title: &'static str, value: &str, focused: bool| {
        let border = if focused { colors.accent } else { colors.border };
        let cursor = if focused { "_" } else { "" };
        Paragraph::new(format!("{}{}", value, cursor)).block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border)),
        )
    };

    frame.render_widget(
        input(" Symbol ", &app.form.symbol, app.focus == Field::Symbol),
        columns[0],
    );
    frame.render_widget(
        input(" Quantity ", &app.form.quantity, app.focus == Field::Quantity),
        columns[1],
    );

    let risk = Paragraph::new(Line::from(vec![
        Span::raw("◀ "),
        Span::styled(
            app.risk.to_string(),
            Style::default().fg(colors.accent).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" ▶"),
    ]))
    .block(
        Block::default()
            .title(" Risk ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors.border)),
    );
    frame.render_widget(risk, columns[2]);
}

/// Render the holdings table.
fn render_holdings_table(frame: &mut Frame, app: &App, area: Rect, colors: &UiColors) {
    let header_cells = ["#", "SYMBOL", "QUANTITY"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::White)));

    let header = Row::new(header_cells)
        .style(Style::default().bg(colors.header_bg))
        .height(1);

    let rows = app.holdings.rows().iter().enumerate().map(|(i, row)| {
        let row_style = if i == app.selected {
            Style::default().bg(colors.selected_bg)
        } else {
            Style::default()
        };

        Row::new(vec![
            Cell::from((i + 1).to_string()),
            Cell::from(truncate_string(&row.symbol, 20)),
            Cell::from(truncate_string(&row.quantity, 12)),
        ])
        .style(row_style)
    });

    let widths = [
        Constraint::Length(4),
        Constraint::Length(22),
        Constraint::Length(14),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(format!(" Holdings ({}) ", app.holdings.len()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors.border)),
        )
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = TableState::default();
    if !app.holdings.is_empty() {
        state.select(Some(app.selected));
    }

    frame.render_stateful_widget(table, area, &mut state);
}

/// Render the flow status and any pending notice.
fn render_status(frame: &mut Frame, app: &App, area: Rect, colors: &UiColors) {
    let status_color = match app.flow.state() {
        FlowState::Idle => Color::White,
        FlowState::Loading => colors.warning,
        FlowState::Rendered => colors.ok,
        FlowState::Failed => colors.error,
    };

    let mut lines = vec![Line::from(Span::styled(
        app.status(),
        Style::default().fg(status_color),
    ))];

    match &app.notice {
        Some(Notice::Warning(message)) => lines.push(Line::from(Span::styled(
            format!("⚠ {}", message),
            Style::default().fg(colors.warning),
        ))),
        Some(Notice::Info(message)) => lines.push(Line::from(message.as_str())),
        None => {}
    }

    let status = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(colors.border)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(status, area);
}

/// Render the footer with keybindings.
fn render_footer(frame: &mut Frame, area: Rect, colors: &UiColors) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));

    let footer = Line::from(vec![
        key(" Enter"),
        Span::raw(":add "),
        key("Tab"),
        Span::raw(":field "),
        key("Del"),
        Span::raw(":remove "),
        key("←/→"),
        Span::raw(":risk "),
        key("F5"),
        Span::raw(":analyze "),
        key("Esc"),
        Span::raw(":quit"),
    ]);

    let footer_widget = Paragraph::new(footer).style(Style::default().bg(colors.header_bg));

    frame.render_widget(footer_widget, area);
}

/// Truncate string to max length.
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        ".".repeat(max_len)
    } else {
        let mut end = max_len.saturating_sub(3);
        while !s.is_char_boundary(end) && end > 0 {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}
