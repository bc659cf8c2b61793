//! Best-effort release of server-side scroll cursors.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::transport::{ClearScrollRequest, ScrollTransport};

/// How a cleanup attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupReport {
    /// No DELETE was sent: cleanup was disabled or no cursor was seen.
    Skipped,
    /// The cursors were released.
    Cleared { ids: usize },
    /// The DELETE failed. Already returned results are unaffected.
    Failed { ids: usize, message: String },
}

impl CleanupReport {
    /// Returns true if the cleanup call failed.
    pub fn is_failure(&self) -> bool {
        matches!(self, CleanupReport::Failed { .. })
    }
}

#[derive(Debug)]
enum Pending {
    Skipped,
    Running(JoinHandle<CleanupReport>),
    Finished(CleanupReport),
}

/// Handle to a cleanup running in the background.
///
/// Dropping the handle detaches the task; it still runs to completion as long
/// as the runtime is alive.
#[derive(Debug)]
pub struct CleanupHandle {
    pending: Pending,
}

impl CleanupHandle {
    /// A handle for a cleanup that was never started.
    pub fn skipped() -> Self {
        Self {
            pending: Pending::Skipped,
        }
    }

    /// Starts the DELETE call.
    ///
    /// Inside a tokio runtime the call is spawned and this returns at once.
    /// Without one there is nothing to spawn on, so the call is awaited here.
    pub(crate) async fn start(
        transport: Arc<dyn ScrollTransport>,
        request: ClearScrollRequest,
    ) -> Self {
        let pending = match Handle::try_current().ok() {
            Some(runtime) => Pending::Running(
                runtime.spawn(async move { clear(transport.as_ref(), request).await }),
            ),
            None => {
                debug!("No tokio runtime, clearing scroll cursors inline");
                Pending::Finished(clear(transport.as_ref(), request).await)
            }
        };
        Self { pending }
    }

    /// Returns true if a DELETE call was scheduled.
    pub fn is_scheduled(&self) -> bool {
        !matches!(self.pending, Pending::Skipped)
    }

    /// Waits for the cleanup to finish.
    pub async fn wait(self) -> CleanupReport {
        match self.pending {
            Pending::Skipped => CleanupReport::Skipped,
            Pending::Finished(report) => report,
            Pending::Running(task) => task.await.unwrap_or_else(|e| CleanupReport::Failed {
                ids: 0,
                message: format!("cleanup task failed: {}", e),
            }),
        }
    }
}

/// Sends one DELETE for every id in `request` and reports the outcome.
pub(crate) async fn clear(
    transport: &dyn ScrollTransport,
    request: ClearScrollRequest,
) -> CleanupReport {
    let ids = request.scroll_id.len();
    match transport.clear_scroll(&request).await {
        Ok(()) => {
            debug!(ids, "Cleared scroll cursors");
            CleanupReport::Cleared { ids }
        }
        Err(e) => {
            warn!(ids, error = %e, "Failed to clear scroll cursors");
            CleanupReport::Failed {
                ids,
                message: e.to_string(),
            }
        }
    }
}
