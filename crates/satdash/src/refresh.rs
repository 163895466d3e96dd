//! Manual refresh control.
//!
//! A [`RefreshControl`] asks the backend to re-ingest its catalogue and, once
//! the backend reports completion, calls the callback it was built with. The
//! control disables itself while a request is in flight; presses in that
//! window are ignored.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::api::SatelliteApi;
use crate::error::Error;
use crate::model::RefreshStatus;

/// Result of a press.
#[derive(Debug)]
pub enum RefreshOutcome {
    /// A request was already in flight.
    Ignored,
    /// The backend completed the refresh and the callback ran.
    Completed(RefreshStatus),
    /// The backend answered with another status.
    NotCompleted(RefreshStatus),
    /// The request failed.
    Failed(Error),
}

impl RefreshOutcome {
    /// Check whether the callback ran.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// Trigger for `POST /api/refresh`.
///
/// Cheap to clone; clones share the enabled flag.
#[derive(Clone)]
pub struct RefreshControl {
    api: Arc<dyn SatelliteApi>,
    on_complete: Arc<dyn Fn() + Send + Sync>,
    enabled: Arc<AtomicBool>,
}

impl fmt::Debug for RefreshControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshControl")
            .field("api", &self.api)
            .field("enabled", &self.is_enabled())
            .finish_non_exhaustive()
    }
}

/// Re-enables the control when dropped, however the request ended.
struct EnableOnDrop<'a>(&'a AtomicBool);

impl Drop for EnableOnDrop<'_> {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl RefreshControl {
    /// Create an enabled control that calls `on_complete` after each
    /// completed refresh.
    pub fn new(api: Arc<dyn SatelliteApi>, on_complete: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            api,
            on_complete: Arc::new(on_complete),
            enabled: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Check whether a press would start a request.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Press the control.
    ///
    /// Dropping the returned future before it finishes re-enables the control.
    pub async fn press(&self) -> RefreshOutcome {
        if self
            .enabled
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            info!("Refresh already in progress");
            return RefreshOutcome::Ignored;
        }
        let _enable = EnableOnDrop(&self.enabled);

        info!("Requesting backend refresh");
        match self.api.refresh().await {
            Ok(status) if status.is_completed() => {
                info!(count = ?status.count, "Backend refresh completed");
                (self.on_complete)();
                RefreshOutcome::Completed(status)
            }
            Ok(status) => {
                warn!(
                    status = %status.status,
                    message = status.message.as_deref().unwrap_or(""),
                    "Backend refresh did not complete"
                );
                RefreshOutcome::NotCompleted(status)
            }
            Err(e) => {
                error!(error = %e, "Refresh request failed");
                RefreshOutcome::Failed(e)
            }
        }
    }
}
