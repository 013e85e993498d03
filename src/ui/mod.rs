//! Terminal status panel
//!
//! Stands in for the desktop tray: shows the indicator, the menu entries and
//! the latest notifications, and turns key presses into menu selections.

mod status_panel;

pub use status_panel::render as render_status_panel;

use std::collections::VecDeque;

use crossterm::event::{KeyCode, KeyEvent};

use crate::app::MenuItem;
use crate::indicator::IndicatorState;
use crate::notify::UiEvent;

/// Number of notifications kept on screen
const MAX_NOTIFICATIONS: usize = 5;

/// View state of the status panel
#[derive(Debug, Clone)]
pub struct StatusPanel {
    /// Index of the highlighted menu entry
    pub selected: usize,
    /// Indicator last pushed by the refresh engine
    pub indicator: IndicatorState,
    /// Most recent notifications, newest last
    pub notifications: VecDeque<String>,
    /// Flag indicating the application should quit
    pub should_quit: bool,
}

impl Default for StatusPanel {
    fn default() -> Self {
        Self {
            selected: 0,
            indicator: IndicatorState::White,
            notifications: VecDeque::with_capacity(MAX_NOTIFICATIONS + 1),
            should_quit: false,
        }
    }
}

impl StatusPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies an event from the refresh engine
    pub fn apply(&mut self, event: UiEvent) {
        match event {
            UiEvent::Indicator(state) => self.indicator = state,
            UiEvent::Notification { message, .. } => {
                self.notifications.push_back(message);
                if self.notifications.len() > MAX_NOTIFICATIONS {
                    self.notifications.pop_front();
                }
            }
        }
    }

    /// Handles a key press against the current menu
    ///
    /// # Key Bindings
    /// - `Up`/`k`, `Down`/`j`: Move the selection
    /// - `Enter`: Activate the selected entry
    /// - `r`: Refresh
    /// - `q` or `Esc`: Quit
    ///
    /// Returns the activated entry, if any.
    pub fn handle_key(&mut self, key_event: KeyEvent, items: &[MenuItem]) -> Option<MenuItem> {
        match key_event.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < items.len() {
                    self.selected += 1;
                }
                None
            }
            KeyCode::Enter => items.get(self.selected).copied(),
            KeyCode::Char('r') => Some(MenuItem::Refresh),
            KeyCode::Char('q') | KeyCode::Esc => Some(MenuItem::Quit),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};

    const ITEMS: [MenuItem; 5] = [
        MenuItem::Today,
        MenuItem::Tomorrow,
        MenuItem::Tariff,
        MenuItem::Refresh,
        MenuItem::Quit,
    ];

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::empty(),
            kind: KeyEventKind::Press,
            state: KeyEventState::empty(),
        }
    }

    #[test]
    fn test_selection_is_clamped() {
        let mut panel = StatusPanel::new();

        panel.handle_key(key(KeyCode::Up), &ITEMS);
        assert_eq!(panel.selected, 0);

        for _ in 0..10 {
            panel.handle_key(key(KeyCode::Down), &ITEMS);
        }
        assert_eq!(panel.selected, ITEMS.len() - 1);
    }

    #[test]
    fn test_enter_activates_selected_entry() {
        let mut panel = StatusPanel::new();
        panel.handle_key(key(KeyCode::Char('j')), &ITEMS);
        panel.handle_key(key(KeyCode::Char('j')), &ITEMS);

        assert_eq!(
            panel.handle_key(key(KeyCode::Enter), &ITEMS),
            Some(MenuItem::Tariff)
        );
    }

    #[test]
    fn test_shortcuts() {
        let mut panel = StatusPanel::new();
        assert_eq!(
            panel.handle_key(key(KeyCode::Char('r')), &ITEMS),
            Some(MenuItem::Refresh)
        );
        assert_eq!(
            panel.handle_key(key(KeyCode::Esc), &ITEMS),
            Some(MenuItem::Quit)
        );
        assert_eq!(panel.handle_key(key(KeyCode::Char('x')), &ITEMS), None);
    }

    #[test]
    fn test_notifications_are_bounded() {
        let mut panel = StatusPanel::new();
        for i in 0..8 {
            panel.apply(UiEvent::Notification {
                title: "Tempo EDF".to_string(),
                message: format!("message {}", i),
            });
        }

        assert_eq!(panel.notifications.len(), MAX_NOTIFICATIONS);
        assert_eq!(panel.notifications[0], "message 3");
        assert_eq!(panel.notifications[4], "message 7");
    }

    #[test]
    fn test_indicator_event_updates_panel() {
        let mut panel = StatusPanel::new();
        panel.apply(UiEvent::Indicator(IndicatorState::Red));
        assert_eq!(panel.indicator, IndicatorState::Red);
    }
}
