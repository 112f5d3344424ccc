/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};

use super::Audit;
use crate::error::{CoreError, CoreResult};
use crate::types::*;

/// Unresolved templates a runner was rendered from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunnerTemplate {
    pub config_map_data: String,
    pub secret_data: String,
    pub stage_config: String,
}

impl From<MDeploymentTemplateHistory> for RunnerTemplate {
    fn from(history: MDeploymentTemplateHistory) -> Self {
        RunnerTemplate {
            config_map_data: history.config_map_data,
            secret_data: history.secret_data,
            stage_config: history.stage_config,
        }
    }
}

pub async fn insert_template<C: ConnectionTrait>(
    db: &C,
    runner_id: i32,
    template: &RunnerTemplate,
    audit: Audit,
) -> CoreResult<MDeploymentTemplateHistory> {
    let ahistory = ADeploymentTemplateHistory {
        cd_workflow_runner_id: Set(runner_id),
        config_map_data: Set(template.config_map_data.clone()),
        secret_data: Set(template.secret_data.clone()),
        stage_config: Set(template.stage_config.clone()),
        created_by: Set(audit.user),
        created_on: Set(audit.at),
        updated_by: Set(audit.user),
        updated_on: Set(audit.at),
        ..Default::default()
    };

    Ok(ahistory.insert(db).await?)
}

pub async fn get_template<C: ConnectionTrait>(db: &C, runner_id: i32) -> CoreResult<RunnerTemplate> {
    EDeploymentTemplateHistory::find()
        .filter(CDeploymentTemplateHistory::CdWorkflowRunnerId.eq(runner_id))
        .order_by_desc(CDeploymentTemplateHistory::Id)
        .one(db)
        .await?
        .map(RunnerTemplate::from)
        .ok_or_else(|| CoreError::not_found("deployment template", runner_id))
}
