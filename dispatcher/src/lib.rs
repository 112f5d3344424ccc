/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod chain;
pub mod ci;
pub mod events;
pub mod scheduler;
pub mod trigger;

mod tests;

pub use ci::{CiTriggerRequest, trigger_ci};
pub use events::{ExecutorEvent, handle_executor_event};
pub use trigger::{TriggerOutcome, TriggerRequest, retry_runner, trigger_stage};

use cadence_core::sentry_guard;
use cadence_core::types::ServerState;
use std::sync::Arc;
use tracing::{error, info};

/// Promotes runners left queued by a previous process.
pub async fn start_dispatcher(state: Arc<ServerState>) -> std::io::Result<()> {
    tokio::spawn(async move {
        let _guard = sentry_guard(&state.cli);

        match trigger::recover_queues(Arc::clone(&state)).await {
            Ok(started) => info!(started, "Recovered deployment queues"),
            Err(e) => error!(error = %e, "Failed to recover deployment queues"),
        }
    });

    Ok(())
}
