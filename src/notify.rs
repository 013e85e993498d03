//! Outbound collaborators: notifications and the indicator display
//!
//! The refresh engine only talks to these traits. `LogNotifier` records
//! notifications in the log (headless mode); `ChannelSink` forwards both kinds
//! of event to the status panel over an unbounded channel.

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::indicator::IndicatorState;

/// Title of every notification
pub const NOTIFICATION_TITLE: &str = "Tempo EDF";

/// Receives user-facing notifications
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, message: &str);
}

/// Displays the indicator state
pub trait IndicatorSink: Send + Sync {
    fn set_indicator(&self, state: IndicatorState);
}

/// Writes notifications and indicator changes to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, message: &str) {
        info!(title, message, "notification");
    }
}

impl IndicatorSink for LogNotifier {
    fn set_indicator(&self, state: IndicatorState) {
        info!(%state, "indicator updated");
    }
}

/// Event delivered to the status panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Notification { title: String, message: String },
    Indicator(IndicatorState),
}

/// Forwards notifications and indicator updates over a channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<UiEvent>,
}

impl ChannelSink {
    /// Creates a sink and the receiver the UI drains
    pub fn new() -> (Self, mpsc::UnboundedReceiver<UiEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    fn send(&self, event: UiEvent) {
        // The receiver is gone once the UI loop has exited
        if self.sender.send(event).is_err() {
            debug!("status panel closed, dropping event");
        }
    }
}

impl Notifier for ChannelSink {
    fn notify(&self, title: &str, message: &str) {
        info!(title, message, "notification");
        self.send(UiEvent::Notification {
            title: title.to_string(),
            message: message.to_string(),
        });
    }
}

impl IndicatorSink for ChannelSink {
    fn set_indicator(&self, state: IndicatorState) {
        info!(%state, "indicator updated");
        self.send(UiEvent::Indicator(state));
    }
}
