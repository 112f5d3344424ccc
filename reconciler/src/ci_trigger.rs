/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use cadence_core::consts::SYSTEM_USER;
use cadence_core::database::plugin;
use cadence_core::error::CoreResult;
use cadence_core::types::ServerState;
use dispatcher::{CiTriggerRequest, trigger_ci};
use entity::ci_pipeline::CiPipelineType;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument};

/// Starts a CI job for every pipeline whose pre-CI stage uses the polling plugin.
#[instrument(skip(state), fields(plugin = %state.cli.plugin_name))]
pub async fn trigger_polling_pipelines(state: Arc<ServerState>) -> CoreResult<usize> {
    let pipelines =
        plugin::get_ci_pipelines_with_pre_plugin(&state.db, &state.cli.plugin_name).await?;

    let cancel = CancellationToken::new();
    let mut triggered = 0;

    for pipeline in pipelines {
        let request = CiTriggerRequest {
            ci_pipeline_id: pipeline.id,
            triggered_by: SYSTEM_USER,
            invalidate_cache: false,
            pipeline_type: CiPipelineType::CiJob,
        };

        match trigger_ci(Arc::clone(&state), request, cancel.clone()).await {
            Ok(workflow) => {
                debug!(ci_pipeline_id = pipeline.id, ci_workflow_id = workflow.id, "Triggered ci job");
                triggered += 1;
            }
            Err(e) => error!(ci_pipeline_id = pipeline.id, error = %e, "Failed to trigger ci job"),
        }
    }

    Ok(triggered)
}
