/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use chrono::NaiveDateTime;
use entity::cd_workflow_runner::RunnerStatus;
use entity::ci_workflow::CiWorkflowStatus;
use sea_orm::{ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};

use crate::error::CoreResult;
use crate::types::*;

/// CD runners started in `[from, to)`, optionally restricted to one status.
pub async fn count_cd_runners_between<C: ConnectionTrait>(
    db: &C,
    from: NaiveDateTime,
    to: NaiveDateTime,
    status: Option<RunnerStatus>,
) -> CoreResult<u64> {
    let mut condition = Condition::all()
        .add(CCdWorkflowRunner::StartedOn.gte(from))
        .add(CCdWorkflowRunner::StartedOn.lt(to));

    if let Some(status) = status {
        condition = condition.add(CCdWorkflowRunner::Status.eq(status));
    }

    Ok(ECdWorkflowRunner::find().filter(condition).count(db).await?)
}

pub async fn count_ci_workflows_between<C: ConnectionTrait>(
    db: &C,
    from: NaiveDateTime,
    to: NaiveDateTime,
    status: Option<CiWorkflowStatus>,
) -> CoreResult<u64> {
    let mut condition = Condition::all()
        .add(CCiWorkflow::StartedOn.gte(from))
        .add(CCiWorkflow::StartedOn.lt(to));

    if let Some(status) = status {
        condition = condition.add(CCiWorkflow::Status.eq(status));
    }

    Ok(ECiWorkflow::find().filter(condition).count(db).await?)
}
