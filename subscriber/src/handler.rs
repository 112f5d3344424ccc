/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use cadence_core::consts::{SYSTEM_USER, TOPIC_CD_WORKFLOW_STATUS, TOPIC_CI_COMPLETE};
use cadence_core::database::workflow;
use cadence_core::error::{CoreError, CoreResult};
use cadence_core::types::*;
use dispatcher::{
    ExecutorEvent, TriggerOutcome, TriggerRequest, handle_executor_event, trigger_stage,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::pubsub::Delivery;

fn default_triggered_by() -> i32 {
    SYSTEM_USER
}

/// Payload of the CI-complete topic. Exactly one of the two pipeline ids is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CiCompleteEvent {
    #[serde(default)]
    pub pipeline_id: Option<i32>,
    #[serde(default)]
    pub ci_pipeline_id: Option<i32>,
    pub ci_artifact_id: i32,
    #[serde(default)]
    pub apply_auth: bool,
    #[serde(default = "default_triggered_by")]
    pub triggered_by: i32,
}

impl CiCompleteEvent {
    pub fn decode(payload: &[u8]) -> CoreResult<Self> {
        let event: CiCompleteEvent = serde_json::from_slice(payload)?;

        match (event.pipeline_id, event.ci_pipeline_id) {
            (Some(_), None) | (None, Some(_)) => Ok(event),
            _ => Err(CoreError::PreconditionFailed(
                "exactly one of pipelineId and ciPipelineId must be set".to_string(),
            )),
        }
    }
}

async fn targets(state: &ServerState, event: &CiCompleteEvent) -> CoreResult<Vec<i32>> {
    if let Some(pipeline_id) = event.pipeline_id {
        return Ok(vec![pipeline_id]);
    }

    let Some(ci_pipeline_id) = event.ci_pipeline_id else {
        return Ok(Vec::new());
    };

    Ok(workflow::get_cd_mappings_by_parent_ci(&state.db, ci_pipeline_id)
        .await?
        .into_iter()
        .map(|m| m.component_id)
        .collect())
}

/// Triggers the entry stage of every target pipeline.
///
/// Per-target failures are logged; the first `Unavailable` one is returned after all
/// targets were tried so the message is redelivered.
#[instrument(skip(state, event, cancel), fields(artifact_id = event.ci_artifact_id))]
pub async fn handle_ci_complete(
    state: Arc<ServerState>,
    event: CiCompleteEvent,
    delivery_id: &str,
    cancel: CancellationToken,
) -> CoreResult<()> {
    let pipelines = targets(&state, &event).await?;
    if pipelines.is_empty() {
        debug!("No pipelines to trigger");
        return Ok(());
    }

    let mut unavailable = None;
    for pipeline_id in pipelines {
        let request = TriggerRequest {
            pipeline_id,
            artifact_id: event.ci_artifact_id,
            stage: None,
            triggered_by: event.triggered_by,
            apply_auth: event.apply_auth,
            reference_id: Some(format!("{}:{}", delivery_id, pipeline_id)),
        };

        match trigger_stage(Arc::clone(&state), request, cancel.clone()).await {
            Ok(TriggerOutcome::Skipped) => {
                debug!(pipeline_id, "Entry stage is not automatic");
            }
            Ok(outcome) => {
                info!(pipeline_id, outcome = ?outcome, "Triggered pipeline");
            }
            Err(e) if e.is_unavailable() => {
                warn!(pipeline_id, error = %e, "Dependency unavailable");
                unavailable.get_or_insert(e);
            }
            Err(e) => {
                error!(pipeline_id, error = %e, "Failed to trigger pipeline");
            }
        }
    }

    match unavailable {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Decodes and applies one delivery of either topic. Decode failures are returned as errors.
pub async fn handle_delivery(
    state: Arc<ServerState>,
    delivery: &Delivery,
    cancel: CancellationToken,
) -> CoreResult<()> {
    match delivery.topic.as_str() {
        TOPIC_CI_COMPLETE => {
            let event = CiCompleteEvent::decode(&delivery.payload)?;
            handle_ci_complete(state, event, &delivery.id, cancel).await
        }
        TOPIC_CD_WORKFLOW_STATUS => {
            let event: ExecutorEvent = serde_json::from_slice(&delivery.payload)?;
            handle_executor_event(state, event).await
        }
        other => Err(CoreError::PreconditionFailed(format!("unknown topic {}", other))),
    }
}
