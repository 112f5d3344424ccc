/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use cadence_core::consts::STUCK;
use cadence_core::database::{ci_workflow, now};
use cadence_core::error::CoreResult;
use cadence_core::types::ServerState;
use chrono::Duration;
use entity::ci_workflow::CiWorkflowStatus;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Fails CI workflows that did not finish within `PIPELINE_FAILED_TIME` minutes.
#[instrument(skip(state))]
pub async fn fail_stuck_ci_workflows(state: Arc<ServerState>) -> CoreResult<usize> {
    let before = now() - Duration::minutes(state.cli.pipeline_failed_time);
    let stuck = ci_workflow::get_stuck_ci_workflows(&state.db, before).await?;

    let mut failed = 0;
    for workflow in stuck {
        let ci_workflow_id = workflow.id;

        match ci_workflow::update_ci_workflow_status(
            &state.db,
            workflow,
            CiWorkflowStatus::Failed,
            None,
            Some(STUCK.to_string()),
        )
        .await
        {
            Ok(_) => {
                info!(ci_workflow_id, "Marked stuck ci workflow as failed");
                failed += 1;
            }
            Err(e) => error!(ci_workflow_id, error = %e, "Failed to mark ci workflow as failed"),
        }
    }

    Ok(failed)
}
