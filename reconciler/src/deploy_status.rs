/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Health refresh of running deployments against the Helm and Argo adapters.
//!
//! A conclusive health report finishes the runner together with its terminal timeline entry and
//! hands it to stage chaining, which releases the pipeline slot. Inconclusive reports leave
//! the runner alone until it has been running longer than `PIPELINE_DEGRADED_TIME` minutes.

use cadence_core::adapters::{ArgoHealth, ArgoStatus, ArgoSync, HelmHealth, HelmStatus};
use cadence_core::consts::SYSTEM_USER;
use cadence_core::database::{app, cd_pipeline, now, runner};
use cadence_core::error::{CoreError, CoreResult};
use cadence_core::timeline;
use cadence_core::types::*;
use chrono::Duration;
use dispatcher::chain::finish_runner;
use entity::cd_workflow_runner::RunnerStatus;
use entity::pipeline::DeploymentAppType;
use entity::pipeline_status_timeline::TimelineStatus;
use sea_orm::TransactionTrait;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Healthy,
    Degraded,
    Failed,
    Pending,
}

impl Verdict {
    fn outcome(self) -> Option<(TimelineStatus, RunnerStatus)> {
        match self {
            Verdict::Healthy => Some((TimelineStatus::Healthy, RunnerStatus::Succeeded)),
            Verdict::Degraded => Some((TimelineStatus::Degraded, RunnerStatus::Failed)),
            Verdict::Failed => Some((TimelineStatus::Failed, RunnerStatus::Failed)),
            Verdict::Pending => None,
        }
    }
}

pub fn helm_verdict(status: &HelmStatus, overdue: bool) -> Verdict {
    match status.health {
        HelmHealth::Healthy => Verdict::Healthy,
        HelmHealth::Failed | HelmHealth::Missing => Verdict::Failed,
        HelmHealth::Degraded | HelmHealth::Progressing | HelmHealth::Unknown if overdue => {
            Verdict::Degraded
        }
        _ => Verdict::Pending,
    }
}

pub fn argo_verdict(status: &ArgoStatus, overdue: bool) -> Verdict {
    match (status.health, status.sync) {
        (ArgoHealth::Healthy, ArgoSync::Synced) => Verdict::Healthy,
        (ArgoHealth::Degraded, _) => Verdict::Degraded,
        _ if overdue => Verdict::Degraded,
        _ => Verdict::Pending,
    }
}

/// Release name of a pipeline's deployment.
async fn deployment_name(state: &ServerState, pipeline: &MPipeline) -> CoreResult<String> {
    let app = app::get_app(&state.db, pipeline.app_id).await?;
    let environment = app::get_environment(&state.db, pipeline.environment_id).await?;
    Ok(format!("{}-{}", app.app_name, environment.environment_name))
}

fn overdue(state: &ServerState, runner: &MCdWorkflowRunner) -> bool {
    runner.started_on < now() - Duration::minutes(state.cli.pipeline_degraded_time)
}

/// Applies a verdict to a runner. Returns whether the runner was finished.
pub(crate) async fn conclude(
    state: &Arc<ServerState>,
    runner_id: i32,
    verdict: Verdict,
    detail: &str,
) -> CoreResult<bool> {
    let Some((timeline_status, runner_status)) = verdict.outcome() else {
        return Ok(false);
    };

    let txn = state.db.begin().await?;

    // an executor event may have finished it since the scan
    let current = runner::lock_runner(&txn, runner_id).await?;
    if current.status != RunnerStatus::Running {
        debug!(runner_id, status = ?current.status, "Runner moved on, skipping");
        return Ok(false);
    }

    let finished = match runner::transition_runner(
        &txn,
        current,
        runner_status,
        (!detail.is_empty()).then(|| detail.to_string()),
        None,
    )
    .await
    {
        Ok(finished) => finished,
        Err(CoreError::Conflict(reason)) => {
            debug!(runner_id, %reason, "Runner moved on, skipping");
            return Ok(false);
        }
        Err(e) => return Err(e),
    };

    timeline::append(&txn, runner_id, timeline_status, detail, SYSTEM_USER).await?;
    txn.commit().await?;

    info!(runner_id, status = ?finished.status, "Deployment concluded");
    finish_runner(Arc::clone(state), finished).await?;
    Ok(true)
}

async fn refresh_helm(
    state: &Arc<ServerState>,
    pipeline: &MPipeline,
    runner: &MCdWorkflowRunner,
) -> CoreResult<bool> {
    let name = deployment_name(state, pipeline).await?;
    let status = state.helm.get_status(&name, pipeline.environment_id).await?;
    let verdict = helm_verdict(&status, overdue(state, runner));

    debug!(runner_id = runner.id, release = %name, health = ?status.health, ?verdict, "Helm status");
    conclude(state, runner.id, verdict, &format!("helm release {}", name)).await
}

async fn refresh_argo(
    state: &Arc<ServerState>,
    pipeline: &MPipeline,
    runner: &MCdWorkflowRunner,
) -> CoreResult<bool> {
    let name = deployment_name(state, pipeline).await?;
    let status = state.argo.get_status(&name).await?;

    if status.sync == ArgoSync::Synced
        && !timeline::has_status(&state.db, runner.id, TimelineStatus::KubectlApplySynced).await?
    {
        timeline::append(
            &state.db,
            runner.id,
            TimelineStatus::KubectlApplySynced,
            "",
            SYSTEM_USER,
        )
        .await?;
    }

    let verdict = argo_verdict(&status, overdue(state, runner));

    debug!(runner_id = runner.id, application = %name, health = ?status.health, sync = ?status.sync, ?verdict, "Argo status");
    conclude(state, runner.id, verdict, &format!("argo application {}", name)).await
}

async fn refresh(state: Arc<ServerState>, app_type: DeploymentAppType) -> CoreResult<usize> {
    let deploys =
        cd_pipeline::get_recent_deploys(&state.db, app_type, state.cli.deployed_within_hours)
            .await?;

    let mut concluded = 0;
    for (pipeline, runner) in deploys {
        let result = match app_type {
            DeploymentAppType::Helm => refresh_helm(&state, &pipeline, &runner).await,
            DeploymentAppType::Argo => refresh_argo(&state, &pipeline, &runner).await,
        };

        match result {
            Ok(true) => concluded += 1,
            Ok(false) => {}
            Err(e) if e.is_unavailable() => {
                warn!(runner_id = runner.id, error = %e, "Deployment status unavailable");
            }
            Err(e) => error!(runner_id = runner.id, error = %e, "Failed to refresh deployment"),
        }
    }

    Ok(concluded)
}

#[instrument(skip(state))]
pub async fn refresh_helm_deployments(state: Arc<ServerState>) -> CoreResult<usize> {
    refresh(state, DeploymentAppType::Helm).await
}

#[instrument(skip(state))]
pub async fn refresh_argo_deployments(state: Arc<ServerState>) -> CoreResult<usize> {
    refresh(state, DeploymentAppType::Argo).await
}
