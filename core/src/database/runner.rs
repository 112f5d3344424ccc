/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use entity::cd_workflow::WorkflowStatus;
use entity::cd_workflow_runner::{ExecutorType, RunnerStatus, WorkflowType};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, IntoActiveModel,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, TransactionTrait,
};
use std::collections::BTreeSet;
use tracing::debug;

use super::{Audit, now};
use crate::error::{CoreError, CoreResult};
use crate::types::*;

/// Returns the CD workflow linking `pipeline_id` and `artifact_id`, creating it when absent.
pub async fn find_or_create_cd_workflow<C: ConnectionTrait>(
    db: &C,
    pipeline_id: i32,
    artifact_id: i32,
    audit: Audit,
) -> CoreResult<MCdWorkflow> {
    let existing = ECdWorkflow::find()
        .filter(
            Condition::all()
                .add(CCdWorkflow::PipelineId.eq(pipeline_id))
                .add(CCdWorkflow::CiArtifactId.eq(artifact_id)),
        )
        .order_by_desc(CCdWorkflow::Id)
        .one(db)
        .await?;

    if let Some(workflow) = existing {
        return Ok(workflow);
    }

    let aworkflow = ACdWorkflow {
        pipeline_id: Set(pipeline_id),
        ci_artifact_id: Set(artifact_id),
        workflow_status: Set(WorkflowStatus::RequestAccepted),
        created_by: Set(audit.user),
        created_on: Set(audit.at),
        updated_by: Set(audit.user),
        updated_on: Set(audit.at),
        ..Default::default()
    };

    Ok(aworkflow.insert(db).await?)
}

pub async fn get_cd_workflow<C: ConnectionTrait>(db: &C, id: i32) -> CoreResult<MCdWorkflow> {
    ECdWorkflow::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| CoreError::not_found("cd workflow", id))
}

pub async fn get_cd_workflows_by_pipeline<C: ConnectionTrait>(
    db: &C,
    pipeline_id: i32,
) -> CoreResult<Vec<MCdWorkflow>> {
    Ok(ECdWorkflow::find()
        .filter(CCdWorkflow::PipelineId.eq(pipeline_id))
        .order_by_asc(CCdWorkflow::Id)
        .all(db)
        .await?)
}

pub async fn set_cd_workflow_status<C: ConnectionTrait>(
    db: &C,
    workflow: MCdWorkflow,
    status: WorkflowStatus,
) -> CoreResult<MCdWorkflow> {
    let mut aworkflow = workflow.into_active_model();
    aworkflow.workflow_status = Set(status);
    aworkflow.updated_on = Set(now());
    Ok(aworkflow.update(db).await?)
}

#[derive(Debug, Clone)]
pub struct NewRunner {
    pub cd_workflow_id: i32,
    pub pipeline_id: i32,
    pub app_id: i32,
    pub environment_id: i32,
    pub workflow_type: WorkflowType,
    pub status: RunnerStatus,
    pub triggered_by: i32,
    pub ref_runner_id: Option<i32>,
    pub reference_id: Option<String>,
}

/// Inserts the runner and points the latest-status cache at it in one transaction.
pub async fn create_runner<C: TransactionTrait>(
    db: &C,
    new: NewRunner,
    audit: Audit,
) -> CoreResult<MCdWorkflowRunner> {
    let txn = db.begin().await?;

    let arunner = ACdWorkflowRunner {
        name: Set(String::new()),
        cd_workflow_id: Set(new.cd_workflow_id),
        workflow_type: Set(new.workflow_type),
        executor_type: Set(ExecutorType::Awf),
        status: Set(new.status),
        pod_status: Set(String::new()),
        message: Set(String::new()),
        started_on: Set(audit.at),
        finished_on: Set(None),
        triggered_by: Set(new.triggered_by),
        ref_cd_workflow_runner_id: Set(new.ref_runner_id),
        image_path_reservation_ids: Set("[]".to_string()),
        reference_id: Set(new.reference_id.clone()),
        created_by: Set(audit.user),
        created_on: Set(audit.at),
        updated_by: Set(audit.user),
        updated_on: Set(audit.at),
        ..Default::default()
    };
    let runner = arunner.insert(&txn).await?;

    upsert_cd_latest(&txn, &new, runner.id, audit).await?;

    txn.commit().await?;
    Ok(runner)
}

async fn upsert_cd_latest<C: ConnectionTrait>(
    db: &C,
    new: &NewRunner,
    runner_id: i32,
    audit: Audit,
) -> CoreResult<()> {
    let existing = ECdWorkflowStatusLatest::find()
        .filter(CCdWorkflowStatusLatest::PipelineId.eq(new.pipeline_id))
        .filter(CCdWorkflowStatusLatest::WorkflowType.eq(new.workflow_type))
        .one(db)
        .await?;

    match existing {
        Some(latest) if latest.workflow_runner_id >= runner_id => {}
        Some(latest) => {
            let mut alatest = latest.into_active_model();
            alatest.workflow_runner_id = Set(runner_id);
            alatest.updated_by = Set(audit.user);
            alatest.updated_on = Set(audit.at);
            alatest.update(db).await?;
        }
        None => {
            let alatest = ACdWorkflowStatusLatest {
                pipeline_id: Set(new.pipeline_id),
                app_id: Set(new.app_id),
                environment_id: Set(new.environment_id),
                workflow_type: Set(new.workflow_type),
                workflow_runner_id: Set(runner_id),
                created_by: Set(audit.user),
                created_on: Set(audit.at),
                updated_by: Set(audit.user),
                updated_on: Set(audit.at),
                ..Default::default()
            };
            alatest.insert(db).await?;
        }
    }

    Ok(())
}

pub async fn get_runner<C: ConnectionTrait>(db: &C, id: i32) -> CoreResult<MCdWorkflowRunner> {
    ECdWorkflowRunner::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| CoreError::not_found("cd workflow runner", id))
}

/// Reads the runner row under `SELECT ... FOR UPDATE` inside the caller's transaction.
pub async fn lock_runner<C: ConnectionTrait>(db: &C, id: i32) -> CoreResult<MCdWorkflowRunner> {
    ECdWorkflowRunner::find_by_id(id)
        .lock_exclusive()
        .one(db)
        .await?
        .ok_or_else(|| CoreError::not_found("cd workflow runner", id))
}

pub async fn get_runner_by_reference<C: ConnectionTrait>(
    db: &C,
    reference_id: &str,
) -> CoreResult<Option<MCdWorkflowRunner>> {
    Ok(ECdWorkflowRunner::find()
        .filter(CCdWorkflowRunner::ReferenceId.eq(reference_id))
        .one(db)
        .await?)
}

/// Looks a runner up by the id the executor assigned on submission.
pub async fn get_runner_by_name<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> CoreResult<Option<MCdWorkflowRunner>> {
    Ok(ECdWorkflowRunner::find()
        .filter(CCdWorkflowRunner::Name.eq(name))
        .order_by_desc(CCdWorkflowRunner::Id)
        .one(db)
        .await?)
}

pub async fn get_latest_runner<C: ConnectionTrait>(
    db: &C,
    pipeline_id: i32,
    workflow_type: WorkflowType,
) -> CoreResult<Option<MCdWorkflowRunner>> {
    let latest = ECdWorkflowStatusLatest::find()
        .filter(CCdWorkflowStatusLatest::PipelineId.eq(pipeline_id))
        .filter(CCdWorkflowStatusLatest::WorkflowType.eq(workflow_type))
        .one(db)
        .await?;

    match latest {
        Some(latest) => Ok(ECdWorkflowRunner::find_by_id(latest.workflow_runner_id)
            .one(db)
            .await?),
        None => Ok(None),
    }
}

pub async fn get_runners_by_pipeline_status<C: ConnectionTrait>(
    db: &C,
    pipeline_id: i32,
    workflow_type: WorkflowType,
    statuses: Vec<RunnerStatus>,
) -> CoreResult<Vec<MCdWorkflowRunner>> {
    Ok(ECdWorkflowRunner::find()
        .join(JoinType::InnerJoin, RCdWorkflowRunner::CdWorkflow.def())
        .filter(
            Condition::all()
                .add(CCdWorkflow::PipelineId.eq(pipeline_id))
                .add(CCdWorkflowRunner::WorkflowType.eq(workflow_type))
                .add(CCdWorkflowRunner::Status.is_in(statuses)),
        )
        .order_by_asc(CCdWorkflowRunner::Id)
        .all(db)
        .await?)
}

/// Queued DEPLOY runners of the pipeline with an id strictly below `runner_id`.
pub async fn get_queued_older_than<C: ConnectionTrait>(
    db: &C,
    pipeline_id: i32,
    runner_id: i32,
) -> CoreResult<Vec<MCdWorkflowRunner>> {
    Ok(ECdWorkflowRunner::find()
        .join(JoinType::InnerJoin, RCdWorkflowRunner::CdWorkflow.def())
        .filter(
            Condition::all()
                .add(CCdWorkflow::PipelineId.eq(pipeline_id))
                .add(CCdWorkflowRunner::WorkflowType.eq(WorkflowType::Deploy))
                .add(CCdWorkflowRunner::Status.eq(RunnerStatus::Queued))
                .add(CCdWorkflowRunner::Id.lt(runner_id)),
        )
        .order_by_asc(CCdWorkflowRunner::Id)
        .all(db)
        .await?)
}

pub async fn get_oldest_queued<C: ConnectionTrait>(
    db: &C,
    pipeline_id: i32,
) -> CoreResult<Option<MCdWorkflowRunner>> {
    Ok(ECdWorkflowRunner::find()
        .join(JoinType::InnerJoin, RCdWorkflowRunner::CdWorkflow.def())
        .filter(
            Condition::all()
                .add(CCdWorkflow::PipelineId.eq(pipeline_id))
                .add(CCdWorkflowRunner::WorkflowType.eq(WorkflowType::Deploy))
                .add(CCdWorkflowRunner::Status.eq(RunnerStatus::Queued)),
        )
        .order_by_asc(CCdWorkflowRunner::Id)
        .one(db)
        .await?)
}

/// Most recent runner of the pipeline and stage in one of `statuses` with an id below `before`.
pub async fn get_previous_runner<C: ConnectionTrait>(
    db: &C,
    pipeline_id: i32,
    workflow_type: WorkflowType,
    statuses: Vec<RunnerStatus>,
    before: i32,
) -> CoreResult<Option<MCdWorkflowRunner>> {
    Ok(ECdWorkflowRunner::find()
        .join(JoinType::InnerJoin, RCdWorkflowRunner::CdWorkflow.def())
        .filter(
            Condition::all()
                .add(CCdWorkflow::PipelineId.eq(pipeline_id))
                .add(CCdWorkflowRunner::WorkflowType.eq(workflow_type))
                .add(CCdWorkflowRunner::Status.is_in(statuses))
                .add(CCdWorkflowRunner::Id.lt(before)),
        )
        .order_by_desc(CCdWorkflowRunner::Id)
        .one(db)
        .await?)
}

/// Pipelines that hold at least one queued DEPLOY runner.
pub async fn get_pipelines_with_queued<C: ConnectionTrait>(db: &C) -> CoreResult<Vec<i32>> {
    let workflow_ids: BTreeSet<i32> = ECdWorkflowRunner::find()
        .filter(CCdWorkflowRunner::WorkflowType.eq(WorkflowType::Deploy))
        .filter(CCdWorkflowRunner::Status.eq(RunnerStatus::Queued))
        .all(db)
        .await?
        .into_iter()
        .map(|r| r.cd_workflow_id)
        .collect();

    if workflow_ids.is_empty() {
        return Ok(Vec::new());
    }

    let pipeline_ids: BTreeSet<i32> = ECdWorkflow::find()
        .filter(CCdWorkflow::Id.is_in(workflow_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|w| w.pipeline_id)
        .collect();

    Ok(pipeline_ids.into_iter().collect())
}

pub async fn get_pipeline_of_runner<C: ConnectionTrait>(
    db: &C,
    runner: &MCdWorkflowRunner,
) -> CoreResult<MPipeline> {
    let workflow = get_cd_workflow(db, runner.cd_workflow_id).await?;
    super::cd_pipeline::get_cd_pipeline(db, workflow.pipeline_id).await
}

pub async fn set_runner_name<C: ConnectionTrait>(
    db: &C,
    runner: MCdWorkflowRunner,
    name: String,
) -> CoreResult<MCdWorkflowRunner> {
    let mut arunner = runner.into_active_model();
    arunner.name = Set(name);
    arunner.updated_on = Set(now());
    Ok(arunner.update(db).await?)
}

/// Applies a single state-machine edge. Illegal edges are rejected with `Conflict`.
///
/// The update only matches while the row still holds `runner.status`. When another writer
/// moved the runner since it was read, nothing is written and `Conflict` is returned.
/// Promotion out of the queue restarts `started_on`.
pub async fn transition_runner<C: ConnectionTrait>(
    db: &C,
    runner: MCdWorkflowRunner,
    status: RunnerStatus,
    message: Option<String>,
    pod_status: Option<String>,
) -> CoreResult<MCdWorkflowRunner> {
    if !runner.status.can_transition_to(status) {
        return Err(CoreError::Conflict(format!(
            "runner {} cannot move from {:?} to {:?}",
            runner.id, runner.status, status
        )));
    }

    debug!(runner_id = runner.id, from = ?runner.status, to = ?status, "Runner transition");

    let at = now();
    let mut arunner = ACdWorkflowRunner {
        status: Set(status),
        updated_on: Set(at),
        ..Default::default()
    };

    if let Some(message) = message {
        arunner.message = Set(message);
    }

    if let Some(pod_status) = pod_status {
        arunner.pod_status = Set(pod_status);
    }

    if runner.status == RunnerStatus::Queued && status == RunnerStatus::Initiated {
        arunner.started_on = Set(at);
    }

    if status.is_terminal() {
        arunner.finished_on = Set(Some(at));
    }

    let updated = ECdWorkflowRunner::update_many()
        .set(arunner)
        .filter(CCdWorkflowRunner::Id.eq(runner.id))
        .filter(CCdWorkflowRunner::Status.eq(runner.status))
        .exec(db)
        .await?;

    if updated.rows_affected == 0 {
        return Err(CoreError::Conflict(format!(
            "runner {} is no longer {:?}",
            runner.id, runner.status
        )));
    }

    get_runner(db, runner.id).await
}
