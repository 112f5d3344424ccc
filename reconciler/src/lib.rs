/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod ci_status;
pub mod ci_trigger;
pub mod deploy_status;
pub mod schedule;

mod tests;

use cadence_core::input::minutes_to_cron;
use cadence_core::types::ServerState;
use schedule::{parse_schedule, run_on_schedule};
use std::sync::Arc;

/// Spawns one task per reconciler. Invalid cron expressions fail startup.
pub async fn start_reconcilers(state: Arc<ServerState>) -> std::io::Result<()> {
    let ci_status_ticks = parse_schedule(&state.cli.ci_pipeline_status_cron_time)?;
    let deploy_status_ticks = parse_schedule(&state.cli.cd_pipeline_status_cron_time)?;
    let ci_trigger_ticks = parse_schedule(&minutes_to_cron(state.cli.ci_trigger_cron_time))?;

    tokio::spawn(run_on_schedule(
        "ci-status",
        Arc::clone(&state),
        ci_status_ticks,
        ci_status::fail_stuck_ci_workflows,
    ));

    tokio::spawn(run_on_schedule(
        "helm-status",
        Arc::clone(&state),
        deploy_status_ticks.clone(),
        deploy_status::refresh_helm_deployments,
    ));

    tokio::spawn(run_on_schedule(
        "argo-status",
        Arc::clone(&state),
        deploy_status_ticks,
        deploy_status::refresh_argo_deployments,
    ));

    tokio::spawn(run_on_schedule(
        "ci-trigger",
        state,
        ci_trigger_ticks,
        ci_trigger::trigger_polling_pipelines,
    ));

    Ok(())
}
