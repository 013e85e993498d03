//! Refresh orchestration
//!
//! Runs the color and price fetches concurrently, waits for all of them, and
//! publishes the outcome into the shared `TempoState` under a single write
//! lock so readers always see a complete snapshot.
//!
//! Refresh cycles are serialized: a cycle requested while another one runs
//! waits for it (in request order) and then runs itself, usually from cache.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::Local;
use futures::future;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::data::{
    FetchError, FetchMode, TempoClient, TempoColor, TempoQuery, TempoState, TARIFF_ERROR_LABEL,
};

/// State shared between the orchestrator and its readers
pub type SharedState = Arc<RwLock<TempoState>>;

/// What caused a refresh cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    /// First refresh after launch
    Startup,
    /// User asked for fresh data
    Manual,
    /// Local midnight passed; the day colors have rolled over
    Midnight,
}

impl RefreshTrigger {
    /// Cache policy for this trigger
    ///
    /// The midnight rollover bypasses the cache: entries fetched before
    /// midnight describe the previous day.
    pub fn fetch_mode(self) -> FetchMode {
        match self {
            RefreshTrigger::Midnight => FetchMode::Bypass,
            RefreshTrigger::Startup | RefreshTrigger::Manual => FetchMode::Cached,
        }
    }
}

/// Price fields published together
#[derive(Debug, Clone, PartialEq)]
struct Tariff {
    price: f64,
    label: String,
}

/// Fetches every data point and publishes the result
#[derive(Debug)]
pub struct Refresher {
    client: TempoClient,
    state: SharedState,
    /// Held for the whole cycle so cycles never overlap
    cycle: Mutex<()>,
}

impl Refresher {
    /// Creates an orchestrator publishing into a fresh default state
    pub fn new(client: TempoClient) -> Self {
        Self::with_state(client, Arc::new(RwLock::new(TempoState::default())))
    }

    /// Creates an orchestrator publishing into an existing state
    pub fn with_state(client: TempoClient, state: SharedState) -> Self {
        Self {
            client,
            state,
            cycle: Mutex::new(()),
        }
    }

    /// Handle on the shared state
    pub fn state(&self) -> SharedState {
        Arc::clone(&self.state)
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> TempoState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Refreshes today's color, tomorrow's color and the current price
    ///
    /// Always completes, even if every fetch fails. A failed data point is
    /// published as its sentinel (`TempoColor::Error`, or a zero price labelled
    /// "Erreur") without affecting the others. Returns the published snapshot.
    pub async fn refresh_all(&self, mode: FetchMode) -> TempoState {
        let _cycle = self.cycle.lock().await;

        let ((today, tomorrow), tariff) =
            future::join(self.fetch_colors(mode), self.fetch_tariff(mode)).await;

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.today_color = today;
        state.tomorrow_color = tomorrow;
        state.current_tariff = tariff.price;
        state.tariff_label = tariff.label;
        state.last_updated = Some(Local::now());
        state.clone()
    }

    /// Fetches both day colors; they share one publish step
    async fn fetch_colors(&self, mode: FetchMode) -> (TempoColor, TempoColor) {
        let (today, tomorrow) = future::join(
            self.client.fetch_day(TempoQuery::Today, mode),
            self.client.fetch_day(TempoQuery::Tomorrow, mode),
        )
        .await;

        (
            color_or_error(TempoQuery::Today, today.map(|day| day.color())),
            color_or_error(TempoQuery::Tomorrow, tomorrow.map(|day| day.color())),
        )
    }

    async fn fetch_tariff(&self, mode: FetchMode) -> Tariff {
        match self.client.fetch_now(mode).await {
            Ok(now) => {
                info!(tariff = now.tarif_kwh, label = %now.lib_tarif, "current tariff");
                Tariff {
                    price: now.tarif_kwh,
                    label: now.lib_tarif,
                }
            }
            Err(e) => {
                log_failure(TempoQuery::CurrentPrice, &e);
                Tariff {
                    price: 0.0,
                    label: TARIFF_ERROR_LABEL.to_string(),
                }
            }
        }
    }
}

fn color_or_error(query: TempoQuery, result: Result<TempoColor, FetchError>) -> TempoColor {
    match result {
        Ok(color) => {
            info!(%query, %color, "day color");
            color
        }
        Err(e) => {
            log_failure(query, &e);
            TempoColor::Error
        }
    }
}

fn log_failure(query: TempoQuery, err: &FetchError) {
    if err.is_transient() {
        warn!(%query, error = %err, "fetch failed");
    } else {
        error!(%query, error = %err, "response could not be decoded");
    }
}
