/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use entity::pipeline_status_timeline::TimelineStatus;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use tracing::{debug, instrument};

use super::database::{now, runner};
use super::error::CoreResult;
use super::types::*;

/// Appends a timeline row for the runner.
///
/// The runner row is locked first, so appends for one runner are serialized by the store.
/// After a terminal entry exists, non-terminal appends and repeats of an existing terminal
/// kind are dropped and `None` is returned. `status_time` never goes backwards.
#[instrument(skip(db, detail), fields(runner_id = runner_id, status = ?status))]
pub async fn append<C: TransactionTrait>(
    db: &C,
    runner_id: i32,
    status: TimelineStatus,
    detail: &str,
    user: i32,
) -> CoreResult<Option<MPipelineStatusTimeline>> {
    let txn = db.begin().await?;

    runner::lock_runner(&txn, runner_id).await?;
    let entries = list(&txn, runner_id).await?;

    if entries.iter().any(|e| e.status.is_terminal())
        && (!status.is_terminal() || entries.iter().any(|e| e.status == status))
    {
        debug!("Dropping timeline append after terminal entry");
        return Ok(None);
    }

    let at = now();
    let status_time = entries
        .iter()
        .map(|e| e.status_time)
        .max()
        .map_or(at, |last| last.max(at));

    let aentry = APipelineStatusTimeline {
        cd_workflow_runner_id: Set(runner_id),
        status: Set(status),
        status_detail: Set(detail.to_string()),
        status_time: Set(status_time),
        created_by: Set(user),
        created_on: Set(at),
        updated_by: Set(user),
        updated_on: Set(at),
        ..Default::default()
    };
    let entry = aentry.insert(&txn).await?;

    txn.commit().await?;
    Ok(Some(entry))
}

/// Entries ordered by `status_time`, ties by id.
pub async fn list<C: ConnectionTrait>(
    db: &C,
    runner_id: i32,
) -> CoreResult<Vec<MPipelineStatusTimeline>> {
    Ok(EPipelineStatusTimeline::find()
        .filter(CPipelineStatusTimeline::CdWorkflowRunnerId.eq(runner_id))
        .order_by_asc(CPipelineStatusTimeline::StatusTime)
        .order_by_asc(CPipelineStatusTimeline::Id)
        .all(db)
        .await?)
}

pub async fn has_status<C: ConnectionTrait>(
    db: &C,
    runner_id: i32,
    status: TimelineStatus,
) -> CoreResult<bool> {
    Ok(EPipelineStatusTimeline::find()
        .filter(CPipelineStatusTimeline::CdWorkflowRunnerId.eq(runner_id))
        .filter(CPipelineStatusTimeline::Status.eq(status))
        .one(db)
        .await?
        .is_some())
}

pub async fn has_terminal<C: ConnectionTrait>(db: &C, runner_id: i32) -> CoreResult<bool> {
    Ok(terminal_status(db, runner_id).await?.is_some())
}

/// The first terminal kind recorded for the runner; later terminal rows never override it.
pub async fn terminal_status<C: ConnectionTrait>(
    db: &C,
    runner_id: i32,
) -> CoreResult<Option<TimelineStatus>> {
    Ok(EPipelineStatusTimeline::find()
        .filter(CPipelineStatusTimeline::CdWorkflowRunnerId.eq(runner_id))
        .filter(CPipelineStatusTimeline::Status.is_in(TimelineStatus::terminal()))
        .order_by_asc(CPipelineStatusTimeline::StatusTime)
        .order_by_asc(CPipelineStatusTimeline::Id)
        .one(db)
        .await?
        .map(|e| e.status))
}
