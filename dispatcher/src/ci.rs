/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use cadence_core::adapters::WorkflowTemplate;
use cadence_core::consts::{CI_WORKFLOW_PREFIX, TRIGGER_CANCELLED};
use cadence_core::database::ci_workflow::NewCiWorkflow;
use cadence_core::database::{Audit, ci_pipeline, ci_workflow, variable};
use cadence_core::error::CoreResult;
use cadence_core::types::*;
use cadence_core::variables::{Scope, snapshot_names};
use entity::ci_pipeline::CiPipelineType;
use entity::ci_workflow::CiWorkflowStatus;
use entity::variable_entity_mapping::EntityType;
use entity::variable_snapshot_history::HistoryReferenceType;
use sea_orm::{ActiveEnum, TransactionTrait};
use serde_json::Map;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use super::trigger::executor_name;

#[derive(Debug, Clone)]
pub struct CiTriggerRequest {
    pub ci_pipeline_id: i32,
    pub triggered_by: i32,
    pub invalidate_cache: bool,
    pub pipeline_type: CiPipelineType,
}

/// Creates a CI workflow for the pipeline's active materials and submits it.
///
/// A rejected or cancelled submission leaves the workflow `Failed` with the reason.
#[instrument(skip(state, request, cancel), fields(ci_pipeline_id = request.ci_pipeline_id))]
pub async fn trigger_ci(
    state: Arc<ServerState>,
    request: CiTriggerRequest,
    cancel: CancellationToken,
) -> CoreResult<MCiWorkflow> {
    let db = &state.db;

    let pipeline = ci_pipeline::get_active_ci_pipeline(db, request.ci_pipeline_id).await?;

    let git_triggers: BTreeMap<i32, String> = ci_pipeline::get_active_materials(db, pipeline.id)
        .await?
        .into_iter()
        .map(|m| (m.git_material_id, m.value))
        .collect();

    let names: Vec<String> =
        variable::get_entity_mappings(db, EntityType::CiStageConfig, pipeline.id)
            .await?
            .into_iter()
            .map(|m| m.variable_name)
            .collect();

    let scope = Scope {
        app_id: Some(pipeline.app_id),
        ..Default::default()
    };
    let snapshot = snapshot_names(db, state.parser.as_ref(), &names, scope, true).await?;

    let audit = Audit::by(request.triggered_by);
    let txn = db.begin().await?;

    let workflow = ci_workflow::create_ci_workflow(
        &txn,
        NewCiWorkflow {
            ci_pipeline_id: pipeline.id,
            app_id: pipeline.app_id,
            git_triggers: git_triggers.clone(),
            triggered_by: request.triggered_by,
            ref_ci_workflow_id: None,
            parent_ci_workflow_id: None,
        },
        audit,
    )
    .await?;

    variable::insert_history(
        &txn,
        HistoryReferenceType::CiWorkflow,
        workflow.id,
        &snapshot,
        audit,
    )
    .await?;

    txn.commit().await?;

    let template = WorkflowTemplate {
        name: executor_name(CI_WORKFLOW_PREFIX, workflow.id),
        workflow_id: workflow.id,
        pipeline_id: pipeline.id,
        app_id: pipeline.app_id,
        environment_id: None,
        namespace: None,
        stage: request.pipeline_type.to_value(),
        image: String::new(),
        config: String::new(),
        config_maps: Map::new(),
        secrets: Map::new(),
        run_in_env: false,
        git_triggers,
        invalidate_cache: request.invalidate_cache,
        triggered_by: request.triggered_by,
    };

    let workflow = ci_workflow::set_ci_workflow_name(db, workflow, template.name.clone()).await?;

    let submitted = tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        result = state.executor.submit(&template) => Some(result),
    };

    match submitted {
        Some(Ok(executor_id)) if executor_id != workflow.name => {
            ci_workflow::set_ci_workflow_name(db, workflow, executor_id).await
        }
        Some(Ok(_)) => {
            info!(ci_workflow_id = workflow.id, "Submitted ci workflow");
            Ok(workflow)
        }
        Some(Err(e)) => {
            warn!(ci_workflow_id = workflow.id, error = %e, "Executor rejected ci workflow");
            ci_workflow::update_ci_workflow_status(
                db,
                workflow,
                CiWorkflowStatus::Failed,
                None,
                Some(e.message()),
            )
            .await
        }
        None => {
            ci_workflow::update_ci_workflow_status(
                db,
                workflow,
                CiWorkflowStatus::Failed,
                None,
                Some(TRIGGER_CANCELLED.to_string()),
            )
            .await
        }
    }
}
