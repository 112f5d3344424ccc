/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use cadence_core::database::{cd_pipeline, runner};
use cadence_core::error::CoreResult;
use cadence_core::types::*;
use entity::cd_workflow_runner::{RunnerStatus, WorkflowType};
use entity::pipeline::TriggerType;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument};

use super::trigger::{TriggerRequest, promote_next, trigger_stage};

/// Work that follows a runner reaching a terminal status.
///
/// A finished DEPLOY frees the pipeline slot for the next queued runner. A successful
/// runner starts the next stage, or the child pipelines once the last stage is done.
#[instrument(skip(state, finished), fields(runner_id = finished.id, status = ?finished.status))]
pub async fn finish_runner(state: Arc<ServerState>, finished: MCdWorkflowRunner) -> CoreResult<()> {
    let cd_workflow = runner::get_cd_workflow(&state.db, finished.cd_workflow_id).await?;

    if finished.workflow_type == WorkflowType::Deploy {
        promote_next(state.clone(), cd_workflow.pipeline_id, CancellationToken::new()).await?;
    }

    if finished.status != RunnerStatus::Succeeded {
        return Ok(());
    }

    let pipeline = cd_pipeline::get_cd_pipeline(&state.db, cd_workflow.pipeline_id).await?;
    if pipeline.deleted {
        return Ok(());
    }

    let next = match finished.workflow_type {
        WorkflowType::Pre => {
            if pipeline.trigger_type != TriggerType::Automatic {
                debug!("Deploy stage is manual, stopping after pre stage");
                return Ok(());
            }
            Some(WorkflowType::Deploy)
        }
        WorkflowType::Deploy => (pipeline.has_post_stage()
            && pipeline.post_trigger_type == TriggerType::Automatic)
            .then_some(WorkflowType::Post),
        WorkflowType::Post => None,
    };

    match next {
        Some(stage) => {
            trigger_stage(
                state,
                TriggerRequest {
                    stage: Some(stage),
                    ..TriggerRequest::automatic(pipeline.id, cd_workflow.ci_artifact_id)
                },
                CancellationToken::new(),
            )
            .await?;
        }
        None => trigger_children(state, pipeline.id, cd_workflow.ci_artifact_id).await,
    }

    Ok(())
}

async fn trigger_children(state: Arc<ServerState>, pipeline_id: i32, artifact_id: i32) {
    let children = match cd_pipeline::get_child_cd_pipelines(&state.db, pipeline_id).await {
        Ok(children) => children,
        Err(e) => {
            error!(error = %e, pipeline_id, "Failed to load child pipelines");
            return;
        }
    };

    for child in children {
        if let Err(e) = trigger_stage(
            state.clone(),
            TriggerRequest::automatic(child.id, artifact_id),
            CancellationToken::new(),
        )
        .await
        {
            error!(error = %e, child_pipeline_id = child.id, "Failed to trigger child pipeline");
        }
    }
}
