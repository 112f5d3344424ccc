/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use cadence_core::error::CoreResult;
use cadence_core::input::parse_cron;
use cadence_core::sentry_guard;
use cadence_core::types::ServerState;
use chrono::{DateTime, Utc};
use cron::Schedule;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::{debug, error, info, warn};

pub fn parse_schedule(expression: &str) -> std::io::Result<Schedule> {
    parse_cron(expression).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
}

/// Gap between the two ticks following `after`; used as the deadline of one run.
pub fn period(schedule: &Schedule, after: DateTime<Utc>) -> Option<Duration> {
    let mut ticks = schedule.after(&after);
    let first = ticks.next()?;
    let second = ticks.next()?;
    (second - first).to_std().ok()
}

/// Runs `body` on every tick of `schedule`, one run at a time.
///
/// The next tick is computed after the previous run finished, so ticks missed while a
/// run was in progress are skipped.
pub async fn run_on_schedule<F, Fut>(
    name: &'static str,
    state: Arc<ServerState>,
    schedule: Schedule,
    body: F,
) where
    F: Fn(Arc<ServerState>) -> Fut,
    Fut: Future<Output = CoreResult<usize>>,
{
    let _guard = sentry_guard(&state.cli);
    info!(reconciler = name, "Reconciler started");

    loop {
        let now = Utc::now();
        let Some(next) = schedule.after(&now).next() else {
            warn!(reconciler = name, "Schedule has no upcoming ticks");
            return;
        };

        time::sleep((next - now).to_std().unwrap_or_default()).await;

        let deadline = period(&schedule, next).unwrap_or(Duration::from_secs(60));
        match time::timeout(deadline, body(Arc::clone(&state))).await {
            Ok(Ok(0)) => debug!(reconciler = name, "Nothing to reconcile"),
            Ok(Ok(handled)) => info!(reconciler = name, handled, "Reconciled"),
            Ok(Err(e)) => {
                error!(reconciler = name, error = %e, "Reconciler run failed");
                sentry::capture_error(&e);
            }
            Err(_) => warn!(reconciler = name, ?deadline, "Reconciler run exceeded its period"),
        }
    }
}
