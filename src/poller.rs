//! Cursor poller: the time-driven loop that discovers new pending
//! suggestions and hands each to the notifier.
//!
//! The watermark is an in-memory timestamp advanced to "now" after every
//! cycle, whether the batch succeeded or not. Skipping a transiently
//! failed batch is preferred over reprocessing it indefinitely; a restart
//! rescans from "now" for the same reason.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::errors::EngineError;
use crate::notifier::SuggestionNotifier;
use crate::store::SuggestionStore;

pub struct CursorPoller {
    store: Arc<dyn SuggestionStore>,
    notifier: Arc<SuggestionNotifier>,
    period: Duration,
}

impl CursorPoller {
    pub fn new(
        store: Arc<dyn SuggestionStore>,
        notifier: Arc<SuggestionNotifier>,
        period: Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            period,
        }
    }

    /// Spawn the polling loop. Call once at startup.
    pub fn spawn(self) {
        tokio::spawn(async move {
            let mut watermark = Utc::now();
            let mut interval = tokio::time::interval(self.period);
            // A cycle still running when the next tick fires is skipped,
            // never queued; at most one cycle is in flight.
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                match tokio::time::timeout(self.period, self.run_cycle(watermark)).await {
                    Ok(Ok(0)) => {}
                    Ok(Ok(dispatched)) => {
                        info!(dispatched, "poll cycle dispatched suggestions");
                    }
                    Ok(Err(e)) => {
                        error!(error = %e, "poll cycle failed; skipping to next tick");
                    }
                    Err(_) => {
                        error!("poll cycle exceeded its period; abandoned");
                    }
                }
                // Advance whether or not the batch succeeded.
                watermark = Utc::now();
            }
        });
    }

    /// One poll cycle against a given watermark. Dispatches pending
    /// suggestions in (created_at, id) order; malformed rows are logged and
    /// skipped, transient failures end the cycle early. Returns how many
    /// were dispatched.
    pub async fn run_cycle(&self, watermark: DateTime<Utc>) -> Result<usize, EngineError> {
        let batch = self
            .store
            .list_pending_since(watermark)
            .await
            .map_err(EngineError::Store)?;

        let mut dispatched = 0;
        for suggestion in &batch {
            match self.notifier.notify(suggestion).await {
                Ok(_) => dispatched += 1,
                Err(e @ EngineError::Malformed { .. }) => {
                    // The watermark will pass this row by; an operator has
                    // to decide it through the CLI.
                    warn!(
                        suggestion_id = suggestion.id,
                        error = %e,
                        "dropping malformed suggestion from notification"
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Ok(dispatched)
    }
}
