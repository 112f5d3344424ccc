/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use chrono::Duration;
use entity::app_workflow_mapping::ComponentKind;
use entity::cd_workflow_runner::{RunnerStatus, WorkflowType};
use entity::pipeline::{DeploymentAppType, TriggerType};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, IntoActiveModel,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, TransactionTrait,
};

use super::{Audit, now};
use crate::error::{CoreError, CoreResult};
use crate::types::*;

#[derive(Debug, Clone)]
pub struct NewCdPipeline {
    pub app_id: i32,
    pub ci_pipeline_id: i32,
    pub environment_id: i32,
    pub pipeline_name: String,
    pub trigger_type: TriggerType,
    pub pre_trigger_type: TriggerType,
    pub post_trigger_type: TriggerType,
    pub pre_stage_config: String,
    pub post_stage_config: String,
    pub run_pre_stage_in_env: bool,
    pub run_post_stage_in_env: bool,
    pub deployment_app_type: String,
}

pub async fn create_cd_pipeline<C: ConnectionTrait>(
    db: &C,
    new: NewCdPipeline,
    audit: Audit,
) -> CoreResult<MPipeline> {
    super::app::get_active_app(db, new.app_id).await?;
    super::app::get_environment(db, new.environment_id).await?;

    let existing = EPipeline::find()
        .filter(
            Condition::all()
                .add(CPipeline::AppId.eq(new.app_id))
                .add(CPipeline::PipelineName.eq(new.pipeline_name.clone()))
                .add(CPipeline::Deleted.eq(false)),
        )
        .one(db)
        .await?;

    if existing.is_some() {
        return Err(CoreError::Conflict(format!(
            "cd pipeline {} already exists in app {}",
            new.pipeline_name, new.app_id
        )));
    }

    let apipeline = APipeline {
        app_id: Set(new.app_id),
        ci_pipeline_id: Set(new.ci_pipeline_id),
        environment_id: Set(new.environment_id),
        pipeline_name: Set(new.pipeline_name),
        trigger_type: Set(new.trigger_type),
        pre_trigger_type: Set(new.pre_trigger_type),
        post_trigger_type: Set(new.post_trigger_type),
        pre_stage_config: Set(new.pre_stage_config),
        post_stage_config: Set(new.post_stage_config),
        run_pre_stage_in_env: Set(new.run_pre_stage_in_env),
        run_post_stage_in_env: Set(new.run_post_stage_in_env),
        deployment_app_type: Set(new.deployment_app_type),
        deployment_app_created: Set(false),
        deleted: Set(false),
        created_by: Set(audit.user),
        created_on: Set(audit.at),
        updated_by: Set(audit.user),
        updated_on: Set(audit.at),
        ..Default::default()
    };

    Ok(apipeline.insert(db).await?)
}

pub async fn get_cd_pipeline<C: ConnectionTrait>(db: &C, id: i32) -> CoreResult<MPipeline> {
    EPipeline::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| CoreError::not_found("cd pipeline", id))
}

pub async fn get_active_cd_pipeline<C: ConnectionTrait>(db: &C, id: i32) -> CoreResult<MPipeline> {
    match get_cd_pipeline(db, id).await? {
        pipeline if !pipeline.deleted => Ok(pipeline),
        _ => Err(CoreError::not_found("cd pipeline", id)),
    }
}

/// Reads the pipeline row under `SELECT ... FOR UPDATE` inside the caller's transaction.
pub async fn lock_cd_pipeline<C: ConnectionTrait>(db: &C, id: i32) -> CoreResult<MPipeline> {
    EPipeline::find_by_id(id)
        .lock_exclusive()
        .one(db)
        .await?
        .ok_or_else(|| CoreError::not_found("cd pipeline", id))
}

pub async fn get_cd_pipelines_by_app_env<C: ConnectionTrait>(
    db: &C,
    app_id: i32,
    environment_id: i32,
) -> CoreResult<Vec<MPipeline>> {
    Ok(EPipeline::find()
        .filter(CPipeline::AppId.eq(app_id))
        .filter(CPipeline::EnvironmentId.eq(environment_id))
        .filter(CPipeline::Deleted.eq(false))
        .order_by_asc(CPipeline::Id)
        .all(db)
        .await?)
}

pub async fn get_cd_pipelines_by_ci_pipeline<C: ConnectionTrait>(
    db: &C,
    ci_pipeline_id: i32,
) -> CoreResult<Vec<MPipeline>> {
    Ok(EPipeline::find()
        .filter(CPipeline::CiPipelineId.eq(ci_pipeline_id))
        .filter(CPipeline::Deleted.eq(false))
        .order_by_asc(CPipeline::Id)
        .all(db)
        .await?)
}

/// Non-deleted CD pipelines mapped under another CD pipeline.
pub async fn get_child_cd_pipelines<C: ConnectionTrait>(
    db: &C,
    parent_id: i32,
) -> CoreResult<Vec<MPipeline>> {
    let child_ids: Vec<i32> = super::workflow::get_cd_mappings_by_parent_cd(db, parent_id)
        .await?
        .into_iter()
        .map(|m| m.component_id)
        .collect();

    if child_ids.is_empty() {
        return Ok(Vec::new());
    }

    Ok(EPipeline::find()
        .filter(CPipeline::Id.is_in(child_ids))
        .filter(CPipeline::Deleted.eq(false))
        .order_by_asc(CPipeline::Id)
        .all(db)
        .await?)
}

/// `Running` DEPLOY runners started within the last `hours` on non-deleted
/// pipelines of the given deployment type, paired with their pipeline.
pub async fn get_recent_deploys<C: ConnectionTrait>(
    db: &C,
    app_type: DeploymentAppType,
    hours: i64,
) -> CoreResult<Vec<(MPipeline, MCdWorkflowRunner)>> {
    let since = now() - Duration::hours(hours);

    let runners = ECdWorkflowRunner::find()
        .join(JoinType::InnerJoin, RCdWorkflowRunner::CdWorkflow.def())
        .join(JoinType::InnerJoin, RCdWorkflow::Pipeline.def())
        .filter(
            Condition::all()
                .add(CCdWorkflowRunner::WorkflowType.eq(WorkflowType::Deploy))
                .add(CCdWorkflowRunner::Status.eq(RunnerStatus::Running))
                .add(CCdWorkflowRunner::StartedOn.gte(since))
                .add(CPipeline::Deleted.eq(false)),
        )
        .order_by_asc(CCdWorkflowRunner::Id)
        .all(db)
        .await?;

    let mut deploys = Vec::with_capacity(runners.len());
    for runner in runners {
        let pipeline = super::runner::get_pipeline_of_runner(db, &runner).await?;
        if pipeline.app_type() == Some(app_type) {
            deploys.push((pipeline, runner));
        }
    }

    Ok(deploys)
}

pub async fn delete_cd_pipeline<C: TransactionTrait>(
    db: &C,
    id: i32,
    audit: Audit,
) -> CoreResult<MPipeline> {
    let txn = db.begin().await?;

    let mut apipeline = get_cd_pipeline(&txn, id).await?.into_active_model();
    apipeline.deleted = Set(true);
    apipeline.updated_by = Set(audit.user);
    apipeline.updated_on = Set(audit.at);
    let pipeline = apipeline.update(&txn).await?;

    super::workflow::deactivate_mappings_for_component(&txn, ComponentKind::CdPipeline, id, audit)
        .await?;

    txn.commit().await?;
    Ok(pipeline)
}
