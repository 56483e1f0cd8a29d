//! Results dashboard use case: one-off reads and a scheduled refresh feed.
//!
//! The feed's background task lives exactly as long as the `ResultsFeed` handle;
//! dropping the handle (closing the view) stops refreshing.

use crate::domain::{DomainError, HourlyCount, ResultsScope, ResultsSnapshot};
use crate::ports::ResultsPort;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Default interval between background refreshes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// What the dashboard should show right now.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshState {
    Loading,
    Ready(ResultsSnapshot),
    Failed(String),
}

/// Results service. Stateless wrapper over the results port.
pub struct ResultsService {
    results: Arc<dyn ResultsPort>,
}

impl ResultsService {
    pub fn new(results: Arc<dyn ResultsPort>) -> Self {
        Self { results }
    }

    /// Read results for `scope` once.
    pub async fn fetch(&self, scope: &ResultsScope) -> Result<ResultsSnapshot, DomainError> {
        fetch_scope(self.results.as_ref(), scope).await
    }

    pub async fn hourly(&self) -> Result<Vec<HourlyCount>, DomainError> {
        self.results.hourly_stats().await
    }

    /// Start refreshing `scope` every `interval`, beginning immediately.
    pub fn watch(&self, scope: ResultsScope, interval: Duration) -> ResultsFeed {
        let (tx, rx) = watch::channel(RefreshState::Loading);
        let trigger = Arc::new(Notify::new());
        let port = Arc::clone(&self.results);
        let wake = Arc::clone(&trigger);

        info!(scope = %scope, interval_secs = interval.as_secs(), "results refresh started");
        let task = tokio::spawn(async move {
            loop {
                let state = match fetch_scope(port.as_ref(), &scope).await {
                    Ok(snapshot) => {
                        debug!(scope = %scope, total_votes = snapshot.total_votes, "results refreshed");
                        RefreshState::Ready(snapshot)
                    }
                    Err(e) => {
                        warn!(scope = %scope, error = ?e, "results refresh failed");
                        RefreshState::Failed(e.to_string())
                    }
                };
                if tx.send(state).is_err() {
                    break;
                }
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = wake.notified() => {}
                }
            }
        });

        ResultsFeed { rx, trigger, task }
    }
}

async fn fetch_scope(
    port: &dyn ResultsPort,
    scope: &ResultsScope,
) -> Result<ResultsSnapshot, DomainError> {
    match scope {
        ResultsScope::All => port.live_results().await,
        ResultsScope::Barangay(name) => port.barangay_results(name).await,
    }
}

/// Handle to a running refresh. Dropping it cancels the refresh task.
pub struct ResultsFeed {
    rx: watch::Receiver<RefreshState>,
    trigger: Arc<Notify>,
    task: JoinHandle<()>,
}

impl ResultsFeed {
    /// Latest published state.
    pub fn current(&self) -> RefreshState {
        self.rx.borrow().clone()
    }

    /// Wait for the next published state.
    pub async fn changed(&mut self) -> Option<RefreshState> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Fetch now instead of waiting for the interval.
    pub fn refresh_now(&self) {
        self.trigger.notify_one();
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for ResultsFeed {
    fn drop(&mut self) {
        self.task.abort();
        debug!("results refresh stopped");
    }
}
