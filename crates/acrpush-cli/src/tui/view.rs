use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

use super::app::App;
use crate::wizard::{Row, Stage};

pub fn draw(frame: &mut Frame, app: &App) {
    let prompt_height = if app.wizard().prompt().is_some() { 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(prompt_height),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    draw_header(frame, chunks[0], app);
    draw_tree(frame, body[0], app);
    draw_log(frame, body[1], app);
    if prompt_height > 0 {
        draw_input(frame, chunks[2], app);
    }
    draw_status(frame, chunks[3], app);
    draw_footer(frame, chunks[4], app);
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let wizard = app.wizard();
    let account = match wizard.account() {
        Some(a) => Span::styled(
            format!("{} | {}", a.tenant_name, a.account_name),
            Style::default().fg(Color::Green),
        ),
        None => Span::styled("not signed in", Style::default().fg(Color::DarkGray)),
    };

    let s = wizard.selection();
    let mut target = s.registry_server.clone().unwrap_or_default();
    if let Some(repo) = &s.repository {
        target.push('/');
        target.push_str(repo);
    }
    if let Some(tag) = &s.tag {
        target.push(':');
        target.push_str(tag);
    }

    let line = Line::from(vec![
        Span::styled(
            "ACR Push  ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        account,
        Span::raw("  "),
        Span::styled(target, Style::default().fg(Color::Yellow)),
    ]);
    let header = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn draw_tree(frame: &mut Frame, area: Rect, app: &App) {
    let wizard = app.wizard();
    let rows = wizard.rows();
    let busy = wizard.is_busy();

    let items: Vec<ListItem> = rows.iter().map(tree_item).collect();
    let title = if busy { "Choices (busy)" } else { "Choices" };
    let base = if busy {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    let list = List::new(items)
        .style(base)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(app.cursor_index(&rows)));
    frame.render_stateful_widget(list, area, &mut state);
}

fn tree_item(row: &Row) -> ListItem<'static> {
    let marker = match (row.has_children, row.expanded) {
        (true, true) => "▾ ",
        (true, false) => "▸ ",
        (false, _) => "  ",
    };
    ListItem::new(format!("{}{marker}{}", "  ".repeat(row.depth), row.label))
}

fn draw_log(frame: &mut Frame, area: Rect, app: &App) {
    let visible = usize::from(area.height.saturating_sub(2));
    let log = app.log();
    let lines: Vec<Line> = log[log.len().saturating_sub(visible)..]
        .iter()
        .map(|line| {
            if line.starts_with("$ ") {
                Line::styled(line.as_str(), Style::default().fg(Color::Cyan))
            } else {
                Line::raw(line.as_str())
            }
        })
        .collect();

    let pane = Paragraph::new(lines).block(Block::default().title("Output").borders(Borders::ALL));
    frame.render_widget(pane, area);
}

fn draw_input(frame: &mut Frame, area: Rect, app: &App) {
    let title = app.wizard().prompt().unwrap_or_default();
    let input = Paragraph::new(format!("{}_", app.input()))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(input, area);
}

fn draw_status(frame: &mut Frame, area: Rect, app: &App) {
    let wizard = app.wizard();
    let color = match wizard.stage() {
        Stage::Confirmed => Color::Magenta,
        _ if wizard.status().starts_with("Build failed") => Color::Red,
        _ => Color::White,
    };
    let status = Paragraph::new(wizard.status())
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, area);
}

fn draw_footer(frame: &mut Frame, area: Rect, app: &App) {
    let help = if app.wizard().prompt().is_some() {
        "Enter: submit | Backspace: delete | Esc: cancel"
    } else {
        "↑↓/jk: move | Enter: select / collapse | q/Esc: quit"
    };
    let footer = Paragraph::new(help).style(Style::default().fg(Color::Gray));
    frame.render_widget(footer, area);
}
