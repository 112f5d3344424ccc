/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use chrono::NaiveDateTime;
use entity::ci_workflow::{ArtifactUploadStatus, CiWorkflowStatus};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, TransactionTrait,
};
use std::collections::BTreeMap;

use super::{Audit, now};
use crate::error::{CoreError, CoreResult};
use crate::types::*;

#[derive(Debug, Clone)]
pub struct NewCiWorkflow {
    pub ci_pipeline_id: i32,
    pub app_id: i32,
    /// Material id to resolved commit.
    pub git_triggers: BTreeMap<i32, String>,
    pub triggered_by: i32,
    pub ref_ci_workflow_id: Option<i32>,
    pub parent_ci_workflow_id: Option<i32>,
}

/// Inserts a `Starting` CI workflow and points the latest-status cache at it.
pub async fn create_ci_workflow<C: TransactionTrait>(
    db: &C,
    new: NewCiWorkflow,
    audit: Audit,
) -> CoreResult<MCiWorkflow> {
    let txn = db.begin().await?;

    let aworkflow = ACiWorkflow {
        name: Set(String::new()),
        ci_pipeline_id: Set(new.ci_pipeline_id),
        status: Set(CiWorkflowStatus::Starting),
        pod_status: Set(String::new()),
        message: Set(String::new()),
        started_on: Set(audit.at),
        finished_on: Set(None),
        git_triggers: Set(serde_json::to_string(&new.git_triggers)?),
        triggered_by: Set(new.triggered_by),
        image_path_reservation_ids: Set("[]".to_string()),
        ref_ci_workflow_id: Set(new.ref_ci_workflow_id),
        parent_ci_workflow_id: Set(new.parent_ci_workflow_id),
        is_artifact_uploaded: Set(ArtifactUploadStatus::NotUploaded),
        created_by: Set(audit.user),
        created_on: Set(audit.at),
        updated_by: Set(audit.user),
        updated_on: Set(audit.at),
        ..Default::default()
    };
    let workflow = aworkflow.insert(&txn).await?;

    upsert_ci_latest(&txn, new.ci_pipeline_id, new.app_id, workflow.id, audit).await?;

    txn.commit().await?;
    Ok(workflow)
}

async fn upsert_ci_latest<C: ConnectionTrait>(
    db: &C,
    pipeline_id: i32,
    app_id: i32,
    ci_workflow_id: i32,
    audit: Audit,
) -> CoreResult<()> {
    let existing = ECiWorkflowStatusLatest::find()
        .filter(CCiWorkflowStatusLatest::PipelineId.eq(pipeline_id))
        .one(db)
        .await?;

    match existing {
        Some(latest) if latest.ci_workflow_id >= ci_workflow_id => {}
        Some(latest) => {
            let mut alatest = latest.into_active_model();
            alatest.ci_workflow_id = Set(ci_workflow_id);
            alatest.updated_by = Set(audit.user);
            alatest.updated_on = Set(audit.at);
            alatest.update(db).await?;
        }
        None => {
            let alatest = ACiWorkflowStatusLatest {
                pipeline_id: Set(pipeline_id),
                app_id: Set(app_id),
                ci_workflow_id: Set(ci_workflow_id),
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

pub async fn get_ci_workflow<C: ConnectionTrait>(db: &C, id: i32) -> CoreResult<MCiWorkflow> {
    ECiWorkflow::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| CoreError::not_found("ci workflow", id))
}

pub async fn get_ci_workflow_by_name<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> CoreResult<Option<MCiWorkflow>> {
    Ok(ECiWorkflow::find()
        .filter(CCiWorkflow::Name.eq(name))
        .order_by_desc(CCiWorkflow::Id)
        .one(db)
        .await?)
}

pub async fn get_latest_ci_workflow<C: ConnectionTrait>(
    db: &C,
    ci_pipeline_id: i32,
) -> CoreResult<Option<MCiWorkflow>> {
    let latest = ECiWorkflowStatusLatest::find()
        .filter(CCiWorkflowStatusLatest::PipelineId.eq(ci_pipeline_id))
        .one(db)
        .await?;

    match latest {
        Some(latest) => Ok(ECiWorkflow::find_by_id(latest.ci_workflow_id).one(db).await?),
        None => Ok(None),
    }
}

/// Non-terminal CI workflows started before `before`.
pub async fn get_stuck_ci_workflows<C: ConnectionTrait>(
    db: &C,
    before: NaiveDateTime,
) -> CoreResult<Vec<MCiWorkflow>> {
    Ok(ECiWorkflow::find()
        .filter(
            Condition::all()
                .add(CCiWorkflow::Status.is_in(CiWorkflowStatus::non_terminal()))
                .add(CCiWorkflow::StartedOn.lt(before)),
        )
        .order_by_asc(CCiWorkflow::Id)
        .all(db)
        .await?)
}

pub async fn set_ci_workflow_name<C: ConnectionTrait>(
    db: &C,
    workflow: MCiWorkflow,
    name: String,
) -> CoreResult<MCiWorkflow> {
    let mut aworkflow = workflow.into_active_model();
    aworkflow.name = Set(name);
    aworkflow.updated_on = Set(now());
    Ok(aworkflow.update(db).await?)
}

/// Writes a status change; terminal statuses also stamp `finished_on`.
pub async fn update_ci_workflow_status<C: ConnectionTrait>(
    db: &C,
    workflow: MCiWorkflow,
    status: CiWorkflowStatus,
    pod_status: Option<String>,
    message: Option<String>,
) -> CoreResult<MCiWorkflow> {
    let at = now();
    let mut aworkflow = workflow.into_active_model();
    aworkflow.status = Set(status);

    if let Some(pod_status) = pod_status {
        aworkflow.pod_status = Set(pod_status);
    }

    if let Some(message) = message {
        aworkflow.message = Set(message);
    }

    if status.is_terminal() {
        aworkflow.finished_on = Set(Some(at));
    }

    aworkflow.updated_on = Set(at);
    Ok(aworkflow.update(db).await?)
}
