/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use super::Audit;
use crate::error::{CoreError, CoreResult};
use crate::types::*;

#[derive(Debug, Clone, Default)]
pub struct NewArtifact {
    pub ci_workflow_id: Option<i32>,
    pub external_ci_pipeline_id: Option<i32>,
    pub image: String,
    pub image_digest: String,
    pub parent_ci_artifact: Option<i32>,
}

pub async fn create_artifact<C: ConnectionTrait>(
    db: &C,
    new: NewArtifact,
    audit: Audit,
) -> CoreResult<MCiArtifact> {
    let aartifact = ACiArtifact {
        ci_workflow_id: Set(new.ci_workflow_id),
        external_ci_pipeline_id: Set(new.external_ci_pipeline_id),
        image: Set(new.image),
        image_digest: Set(new.image_digest),
        scanned: Set(false),
        parent_ci_artifact: Set(new.parent_ci_artifact),
        created_by: Set(audit.user),
        created_on: Set(audit.at),
        updated_by: Set(audit.user),
        updated_on: Set(audit.at),
        ..Default::default()
    };

    Ok(aartifact.insert(db).await?)
}

pub async fn get_artifact<C: ConnectionTrait>(db: &C, id: i32) -> CoreResult<MCiArtifact> {
    ECiArtifact::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| CoreError::not_found("artifact", id))
}

/// CI pipeline that produced the artifact, following `parent_ci_artifact` for re-tagged images.
pub async fn get_source_ci_pipeline<C: ConnectionTrait>(
    db: &C,
    artifact: &MCiArtifact,
) -> CoreResult<Option<i32>> {
    let mut current = artifact.clone();

    // parent chains are short; the bound only guards against a cycle
    for _ in 0..8 {
        if let Some(workflow_id) = current.ci_workflow_id {
            let workflow = ECiWorkflow::find_by_id(workflow_id).one(db).await?;
            return Ok(workflow.map(|w| w.ci_pipeline_id));
        }

        match current.parent_ci_artifact {
            Some(parent_id) => current = get_artifact(db, parent_id).await?,
            None => return Ok(None),
        }
    }

    Ok(None)
}

/// Whether the artifact has a `Succeeded` DEPLOY runner on any of the given CD pipelines.
pub async fn deployed_on_any<C: ConnectionTrait>(
    db: &C,
    artifact_id: i32,
    pipeline_ids: &[i32],
) -> CoreResult<bool> {
    if pipeline_ids.is_empty() {
        return Ok(false);
    }

    let workflow_ids: Vec<i32> = ECdWorkflow::find()
        .filter(CCdWorkflow::CiArtifactId.eq(artifact_id))
        .filter(CCdWorkflow::PipelineId.is_in(pipeline_ids.to_vec()))
        .all(db)
        .await?
        .into_iter()
        .map(|w| w.id)
        .collect();

    if workflow_ids.is_empty() {
        return Ok(false);
    }

    let succeeded = ECdWorkflowRunner::find()
        .filter(CCdWorkflowRunner::CdWorkflowId.is_in(workflow_ids))
        .filter(
            CCdWorkflowRunner::WorkflowType.eq(entity::cd_workflow_runner::WorkflowType::Deploy),
        )
        .filter(
            CCdWorkflowRunner::Status.eq(entity::cd_workflow_runner::RunnerStatus::Succeeded),
        )
        .one(db)
        .await?;

    Ok(succeeded.is_some())
}
