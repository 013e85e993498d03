//! Application core for the Tempo status indicator
//!
//! `TempoApp` ties the refresh orchestrator to its collaborators: after every
//! refresh it resolves the indicator, pushes it to the display and sends a
//! notification. It also answers the menu (labels, info clicks, autostart).

use std::sync::Arc;

use tracing::error;

use crate::autostart::{Autostart, AutostartError};
use crate::data::TempoState;
use crate::indicator::{resolve_indicator, IndicatorState};
use crate::notify::{IndicatorSink, Notifier, NOTIFICATION_TITLE};
use crate::refresh::{RefreshTrigger, Refresher};

/// Entries of the status menu, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Today,
    Tomorrow,
    Tariff,
    Refresh,
    Autostart,
    Quit,
}

/// Formats a price in euros per kWh with three decimals
pub fn format_tariff(price: f64) -> String {
    format!("{:.3}€/kWh", price)
}

/// Notification text published after a refresh
pub fn refresh_message(trigger: RefreshTrigger, state: &TempoState) -> String {
    let prefix = match trigger {
        RefreshTrigger::Startup => "Couleur d'aujourd'hui",
        RefreshTrigger::Manual => "Données mises à jour",
        RefreshTrigger::Midnight => "Nouveau jour",
    };
    format!(
        "{} : {} - Tarif : {}",
        prefix,
        state.today_color,
        format_tariff(state.current_tariff)
    )
}

/// Refresh engine plus the collaborators it publishes to
pub struct TempoApp {
    refresher: Refresher,
    notifier: Arc<dyn Notifier>,
    indicator: Arc<dyn IndicatorSink>,
    autostart: Option<Box<dyn Autostart>>,
}

impl TempoApp {
    /// Creates an application without autostart support
    pub fn new(
        refresher: Refresher,
        notifier: Arc<dyn Notifier>,
        indicator: Arc<dyn IndicatorSink>,
    ) -> Self {
        Self {
            refresher,
            notifier,
            indicator,
            autostart: None,
        }
    }

    /// Enables the autostart menu entry
    pub fn with_autostart(mut self, autostart: Box<dyn Autostart>) -> Self {
        self.autostart = Some(autostart);
        self
    }

    /// Copy of the current data
    pub fn snapshot(&self) -> TempoState {
        self.refresher.snapshot()
    }

    /// Refreshes every data point, then updates the indicator and notifies
    ///
    /// The cache is bypassed for the midnight rollover. Fetch failures are
    /// published as sentinels, so this always completes.
    pub async fn refresh(&self, trigger: RefreshTrigger) -> TempoState {
        let state = self.refresher.refresh_all(trigger.fetch_mode()).await;
        self.publish(trigger, &state);
        state
    }

    /// Pushes the indicator for `state` and sends the refresh notification
    pub fn publish(&self, trigger: RefreshTrigger, state: &TempoState) -> IndicatorState {
        let indicator = resolve_indicator(state.today_color);
        self.indicator.set_indicator(indicator);
        self.notifier
            .notify(NOTIFICATION_TITLE, &refresh_message(trigger, state));
        indicator
    }

    /// Menu entries; autostart only when supported
    pub fn menu_items(&self) -> Vec<MenuItem> {
        let mut items = vec![
            MenuItem::Today,
            MenuItem::Tomorrow,
            MenuItem::Tariff,
            MenuItem::Refresh,
        ];
        if self.autostart.is_some() {
            items.push(MenuItem::Autostart);
        }
        items.push(MenuItem::Quit);
        items
    }

    /// Text of a menu entry for the given state
    pub fn menu_label(&self, item: MenuItem, state: &TempoState) -> String {
        match item {
            MenuItem::Today => format!("Aujourd'hui : {}", state.today_color),
            MenuItem::Tomorrow => format!("Demain : {}", state.tomorrow_color),
            MenuItem::Tariff => format!("Tarif actuel : {}", format_tariff(state.current_tariff)),
            MenuItem::Refresh => "Rafraîchir".to_string(),
            MenuItem::Autostart => {
                let mark = if self.autostart_enabled() == Some(true) {
                    "[x]"
                } else {
                    "[ ]"
                };
                format!("{} Démarrer avec la session", mark)
            }
            MenuItem::Quit => "Quitter".to_string(),
        }
    }

    /// Sends the notification for an information entry
    ///
    /// Returns false for entries that carry no information.
    pub fn show_info(&self, item: MenuItem) -> bool {
        let state = self.snapshot();
        let message = match item {
            MenuItem::Today => format!("Aujourd'hui : {}", state.today_color),
            MenuItem::Tomorrow => format!("Demain : {}", state.tomorrow_color),
            MenuItem::Tariff => format!(
                "Tarif actuel : {} - {}",
                format_tariff(state.current_tariff),
                state.tariff_label
            ),
            MenuItem::Refresh | MenuItem::Autostart | MenuItem::Quit => return false,
        };
        self.notifier.notify(NOTIFICATION_TITLE, &message);
        true
    }

    /// Current autostart registration, `None` when unsupported
    pub fn autostart_enabled(&self) -> Option<bool> {
        self.autostart.as_ref().map(|autostart| autostart.is_enabled())
    }

    /// Flips the autostart registration and notifies the outcome
    ///
    /// Returns the new registration state. Failures are notified and
    /// returned, never fatal.
    pub fn toggle_autostart(&self) -> Result<bool, AutostartError> {
        let autostart = self.autostart.as_ref().ok_or(AutostartError::Unsupported)?;

        let (result, enabled, success, failure) = if autostart.is_enabled() {
            (
                autostart.disable(),
                false,
                "Application supprimée du démarrage",
                "Erreur lors de la suppression du démarrage",
            )
        } else {
            (
                autostart.enable(),
                true,
                "Application ajoutée au démarrage",
                "Erreur lors de l'ajout au démarrage",
            )
        };

        match result {
            Ok(()) => {
                self.notifier.notify(NOTIFICATION_TITLE, success);
                Ok(enabled)
            }
            Err(e) => {
                error!(error = %e, "autostart toggle failed");
                self.notifier.notify(NOTIFICATION_TITLE, failure);
                Err(e)
            }
        }
    }
}
