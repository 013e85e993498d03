//! Midnight rollover scheduler
//!
//! A background task that sleeps until the next local midnight, runs the
//! rollover action, and starts over. The wait is recomputed from the wall
//! clock on every cycle, so clock or timezone changes are picked up at the
//! next cycle and no drift accumulates.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Fallback wait when the next midnight cannot be computed
const ONE_DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Time from `now` until the start of the next calendar day in `now`'s timezone
///
/// At exactly midnight this is a full day. If the next midnight does not
/// exist locally (a DST gap), the first valid instant after it is used.
pub fn until_next_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> Duration {
    let Some(next_day) = now.date_naive().succ_opt() else {
        return ONE_DAY;
    };
    let timezone = now.timezone();

    let next_midnight = (0..=2)
        .filter_map(|hour| next_day.and_hms_opt(hour, 0, 0))
        .find_map(|naive| timezone.from_local_datetime(&naive).earliest());

    match next_midnight {
        Some(next) => next
            .signed_duration_since(now.clone())
            .to_std()
            .unwrap_or(Duration::ZERO),
        None => ONE_DAY,
    }
}

/// Handle for stopping the scheduler task
pub struct SchedulerHandle {
    /// Signals the loop to exit
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Spawns the scheduler on the local wall clock
    pub fn spawn<F, Fut>(on_midnight: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::spawn_with_clock(Local::now, on_midnight)
    }

    /// Spawns the scheduler reading the time from `clock`
    pub fn spawn_with_clock<C, F, Fut>(clock: C, mut on_midnight: F) -> Self
    where
        C: Fn() -> DateTime<Local> + Send + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let task = tokio::spawn(async move {
            loop {
                let wait = until_next_midnight(&clock());
                debug!(wait_secs = wait.as_secs(), "waiting for next midnight");

                tokio::select! {
                    _ = tokio::time::sleep(wait) => {
                        info!("midnight rollover");
                        on_midnight().await;
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }
            debug!("midnight scheduler stopped");
        });

        Self { shutdown_tx, task }
    }

    /// Stops the scheduler and waits for the task to finish
    ///
    /// A rollover already in progress completes first.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        let _ = self.task.await;
    }
}
