/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use cadence_core::consts::{CD_WORKFLOW_PREFIX, CI_WORKFLOW_PREFIX, SYSTEM_USER};
use cadence_core::database::{ci_workflow, runner};
use cadence_core::error::{CoreError, CoreResult};
use cadence_core::timeline;
use cadence_core::types::*;
use entity::cd_workflow_runner::{RunnerStatus, WorkflowType};
use entity::ci_workflow::CiWorkflowStatus;
use entity::pipeline_status_timeline::TimelineStatus;
use sea_orm::TransactionTrait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::chain::finish_runner;

/// Status report of a workload, keyed by the executor id returned on submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutorEvent {
    pub executor_id: String,
    pub status: String,
    #[serde(default)]
    pub pod_status: String,
    #[serde(default)]
    pub message: String,
}

impl ExecutorEvent {
    fn pod_status(&self) -> Option<String> {
        (!self.pod_status.is_empty()).then(|| self.pod_status.clone())
    }
}

#[instrument(skip(state, event), fields(executor_id = %event.executor_id, status = %event.status))]
pub async fn handle_executor_event(state: Arc<ServerState>, event: ExecutorEvent) -> CoreResult<()> {
    match event.executor_id.split('-').next() {
        Some(CD_WORKFLOW_PREFIX) => handle_cd_event(state, &event).await,
        Some(CI_WORKFLOW_PREFIX) => handle_ci_event(&state, &event).await,
        _ => {
            warn!("Ignoring event for unknown workload");
            Ok(())
        }
    }
}

fn runner_status(status: &str) -> Option<RunnerStatus> {
    match status {
        "Pending" => Some(RunnerStatus::Starting),
        "Running" => Some(RunnerStatus::Running),
        "Succeeded" => Some(RunnerStatus::Succeeded),
        "Failed" | "Error" => Some(RunnerStatus::Failed),
        _ => None,
    }
}

fn ci_status(status: &str) -> Option<CiWorkflowStatus> {
    match status {
        "Pending" => Some(CiWorkflowStatus::Starting),
        "Running" => Some(CiWorkflowStatus::Running),
        "Succeeded" => Some(CiWorkflowStatus::Succeeded),
        "Failed" | "Error" => Some(CiWorkflowStatus::Failed),
        _ => None,
    }
}

async fn handle_cd_event(state: Arc<ServerState>, event: &ExecutorEvent) -> CoreResult<()> {
    let Some(found) = runner::get_runner_by_name(&state.db, &event.executor_id).await? else {
        debug!("No runner for executor id");
        return Ok(());
    };

    let Some(target) = runner_status(&event.status) else {
        warn!("Unknown executor status");
        return Ok(());
    };

    if found.status == target || found.status.is_terminal() {
        debug!(current = ?found.status, "Stale status event");
        return Ok(());
    }

    let Some(path) = found.status.path_to(target) else {
        warn!(from = ?found.status, to = ?target, "No transition path for event");
        return Ok(());
    };

    let mut current = found;
    for step in path {
        let message = (step == target && !event.message.is_empty()).then(|| event.message.clone());

        current = match apply_step(&state, current, step, message, event).await {
            Ok(moved) => moved,
            Err(CoreError::Conflict(reason)) => {
                debug!(%reason, "Runner moved on, dropping event");
                return Ok(());
            }
            Err(e) => return Err(e),
        };
    }

    if current.status.is_terminal() {
        finish_runner(state, current).await?;
    }

    Ok(())
}

/// One state-machine edge and its timeline entry, committed together.
async fn apply_step(
    state: &ServerState,
    current: MCdWorkflowRunner,
    step: RunnerStatus,
    message: Option<String>,
    event: &ExecutorEvent,
) -> CoreResult<MCdWorkflowRunner> {
    let txn = state.db.begin().await?;
    let moved = runner::transition_runner(&txn, current, step, message, event.pod_status()).await?;

    match step {
        RunnerStatus::Running if moved.workflow_type == WorkflowType::Deploy => {
            timeline::append(
                &txn,
                moved.id,
                TimelineStatus::KubectlApplyStarted,
                "",
                SYSTEM_USER,
            )
            .await?;
        }
        RunnerStatus::Failed => {
            timeline::append(
                &txn,
                moved.id,
                TimelineStatus::Failed,
                &event.message,
                SYSTEM_USER,
            )
            .await?;
        }
        _ => {}
    }

    txn.commit().await?;
    Ok(moved)
}

async fn handle_ci_event(state: &ServerState, event: &ExecutorEvent) -> CoreResult<()> {
    let Some(workflow) = ci_workflow::get_ci_workflow_by_name(&state.db, &event.executor_id).await?
    else {
        debug!("No ci workflow for executor id");
        return Ok(());
    };

    let Some(status) = ci_status(&event.status) else {
        warn!("Unknown executor status");
        return Ok(());
    };

    if workflow.status == status || workflow.status.is_terminal() {
        return Ok(());
    }

    let message = (!event.message.is_empty()).then(|| event.message.clone());
    ci_workflow::update_ci_workflow_status(&state.db, workflow, status, event.pod_status(), message)
        .await?;

    Ok(())
}
