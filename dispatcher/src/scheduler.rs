/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use cadence_core::consts::{SUPERSEDED_BY_NEWER_TRIGGER, SYSTEM_USER};
use cadence_core::database::{cd_pipeline, runner};
use cadence_core::error::{CoreError, CoreResult};
use cadence_core::timeline;
use cadence_core::types::*;
use entity::cd_workflow_runner::{RunnerStatus, WorkflowType};
use entity::pipeline_status_timeline::TimelineStatus;
use sea_orm::{ConnectionTrait, TransactionTrait};
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotDecision {
    Granted,
    MustQueue,
}

/// Decides inside the caller's transaction whether a new DEPLOY runner may start.
///
/// The pipeline row stays locked until the caller commits, so two triggers for the same
/// pipeline can never both be granted.
pub async fn try_acquire<C: ConnectionTrait>(txn: &C, pipeline_id: i32) -> CoreResult<SlotDecision> {
    cd_pipeline::lock_cd_pipeline(txn, pipeline_id).await?;

    let in_flight = runner::get_runners_by_pipeline_status(
        txn,
        pipeline_id,
        WorkflowType::Deploy,
        RunnerStatus::in_flight(),
    )
    .await?;
    let queued = runner::get_oldest_queued(txn, pipeline_id).await?;

    Ok(if in_flight.is_empty() && queued.is_none() {
        SlotDecision::Granted
    } else {
        SlotDecision::MustQueue
    })
}

/// Promotes the oldest queued DEPLOY runner to `Initiated` when nothing is in flight.
#[instrument(skip(db))]
pub async fn release<C: TransactionTrait>(
    db: &C,
    pipeline_id: i32,
) -> CoreResult<Option<MCdWorkflowRunner>> {
    let txn = db.begin().await?;

    cd_pipeline::lock_cd_pipeline(&txn, pipeline_id).await?;

    let in_flight = runner::get_runners_by_pipeline_status(
        &txn,
        pipeline_id,
        WorkflowType::Deploy,
        RunnerStatus::in_flight(),
    )
    .await?;

    if !in_flight.is_empty() {
        debug!("Pipeline still busy, nothing to promote");
        return Ok(None);
    }

    let Some(next) = runner::get_oldest_queued(&txn, pipeline_id).await? else {
        return Ok(None);
    };

    let promoted = runner::transition_runner(&txn, next, RunnerStatus::Initiated, None, None).await?;

    txn.commit().await?;
    info!(runner_id = promoted.id, "Promoted queued runner");
    Ok(Some(promoted))
}

/// Aborts every queued DEPLOY runner of the pipeline older than `runner_id`.
#[instrument(skip(db))]
pub async fn abort_queued_older_than<C: TransactionTrait>(
    db: &C,
    pipeline_id: i32,
    runner_id: i32,
) -> CoreResult<Vec<MCdWorkflowRunner>> {
    let txn = db.begin().await?;

    cd_pipeline::lock_cd_pipeline(&txn, pipeline_id).await?;

    let mut aborted = Vec::new();
    for queued in runner::get_queued_older_than(&txn, pipeline_id, runner_id).await? {
        let queued = runner::transition_runner(
            &txn,
            queued,
            RunnerStatus::Aborted,
            Some(SUPERSEDED_BY_NEWER_TRIGGER.to_string()),
            None,
        )
        .await?;

        timeline::append(
            &txn,
            queued.id,
            TimelineStatus::DeploymentSuperseded,
            &format!("superseded by runner {}", runner_id),
            SYSTEM_USER,
        )
        .await?;

        aborted.push(queued);
    }

    txn.commit().await?;

    if !aborted.is_empty() {
        info!(count = aborted.len(), "Aborted superseded queued runners");
    }

    Ok(aborted)
}

/// User cancel of a runner that has not been promoted yet.
#[instrument(skip(db))]
pub async fn cancel_queued<C: TransactionTrait>(
    db: &C,
    runner_id: i32,
    user: i32,
) -> CoreResult<MCdWorkflowRunner> {
    let txn = db.begin().await?;

    let queued = runner::lock_runner(&txn, runner_id).await?;
    if queued.status != RunnerStatus::Queued {
        return Err(CoreError::Conflict(format!(
            "runner {} is not queued",
            runner_id
        )));
    }

    let cancelled = runner::transition_runner(
        &txn,
        queued,
        RunnerStatus::Aborted,
        Some(format!("cancelled by user {}", user)),
        None,
    )
    .await?;

    txn.commit().await?;
    Ok(cancelled)
}
