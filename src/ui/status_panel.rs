//! Status panel rendering
//!
//! Renders the indicator, the menu with the current selection, and the
//! notification log.

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::StatusPanel;
use crate::indicator::{IconSet, IndicatorState};

/// Terminal color of an indicator state
fn indicator_color(state: IndicatorState) -> Color {
    match state {
        IndicatorState::Blue => Color::Blue,
        IndicatorState::White => Color::White,
        IndicatorState::Red => Color::Red,
    }
}

/// Renders the status panel
///
/// `labels` are the menu entry texts in display order.
pub fn render(frame: &mut Frame, panel: &StatusPanel, labels: &[String], icons: &IconSet) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(labels.len() as u16 + 2),
            Constraint::Length(7),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let color = indicator_color(panel.indicator);
    let header = Paragraph::new(Line::from(vec![
        Span::styled("  ██  ", Style::default().fg(color)),
        Span::styled(
            "Tempo EDF",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(
                "  icône {} ({} octets)",
                panel.indicator,
                icons.icon(panel.indicator).len()
            ),
            Style::default().fg(Color::DarkGray),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color)),
    );
    frame.render_widget(header, chunks[0]);

    let items: Vec<ListItem> = labels
        .iter()
        .map(|label| ListItem::new(label.as_str()))
        .collect();
    let menu = List::new(items)
        .block(Block::default().title(" Menu ").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    let mut list_state = ListState::default();
    list_state.select(Some(panel.selected));
    frame.render_stateful_widget(menu, chunks[1], &mut list_state);

    let notifications: Vec<Line> = panel
        .notifications
        .iter()
        .map(|message| Line::from(message.as_str()))
        .collect();
    let log = Paragraph::new(notifications)
        .block(Block::default().title(" Notifications ").borders(Borders::ALL));
    frame.render_widget(log, chunks[2]);

    let help = Paragraph::new(Span::styled(
        " ↑/↓ naviguer · Entrée valider · r rafraîchir · q quitter",
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(help, chunks[3]);
}
