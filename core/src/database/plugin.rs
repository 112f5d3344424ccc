/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use entity::pipeline_stage::StageType;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait,
};
use std::collections::BTreeSet;

use super::Audit;
use crate::error::CoreResult;
use crate::types::*;

pub async fn create_plugin<C: ConnectionTrait>(
    db: &C,
    name: String,
    audit: Audit,
) -> CoreResult<MPluginMetadata> {
    let aplugin = APluginMetadata {
        name: Set(name),
        deleted: Set(false),
        created_by: Set(audit.user),
        created_on: Set(audit.at),
        updated_by: Set(audit.user),
        updated_on: Set(audit.at),
        ..Default::default()
    };

    Ok(aplugin.insert(db).await?)
}

pub async fn create_stage<C: ConnectionTrait>(
    db: &C,
    ci_pipeline_id: i32,
    stage_type: StageType,
    audit: Audit,
) -> CoreResult<MPipelineStage> {
    let astage = APipelineStage {
        ci_pipeline_id: Set(ci_pipeline_id),
        stage_type: Set(stage_type),
        deleted: Set(false),
        created_by: Set(audit.user),
        created_on: Set(audit.at),
        updated_by: Set(audit.user),
        updated_on: Set(audit.at),
        ..Default::default()
    };

    Ok(astage.insert(db).await?)
}

pub async fn create_stage_step<C: ConnectionTrait>(
    db: &C,
    pipeline_stage_id: i32,
    name: String,
    ref_plugin_id: Option<i32>,
    audit: Audit,
) -> CoreResult<MPipelineStageStep> {
    let astep = APipelineStageStep {
        pipeline_stage_id: Set(pipeline_stage_id),
        name: Set(name),
        ref_plugin_id: Set(ref_plugin_id),
        deleted: Set(false),
        created_by: Set(audit.user),
        created_on: Set(audit.at),
        updated_by: Set(audit.user),
        updated_on: Set(audit.at),
        ..Default::default()
    };

    Ok(astep.insert(db).await?)
}

/// Active CI pipelines whose PRE_CI stage references the named plugin.
pub async fn get_ci_pipelines_with_pre_plugin<C: ConnectionTrait>(
    db: &C,
    plugin_name: &str,
) -> CoreResult<Vec<MCiPipeline>> {
    let ci_pipeline_ids: BTreeSet<i32> = EPipelineStage::find()
        .join(JoinType::InnerJoin, RPipelineStage::CiPipeline.def())
        .join(JoinType::InnerJoin, RPipelineStageStep::PipelineStage.def().rev())
        .join(JoinType::InnerJoin, RPipelineStageStep::PluginMetadata.def())
        .filter(
            Condition::all()
                .add(CPipelineStage::StageType.eq(StageType::PreCi))
                .add(CPipelineStage::Deleted.eq(false))
                .add(CPipelineStageStep::Deleted.eq(false))
                .add(CPluginMetadata::Name.eq(plugin_name))
                .add(CPluginMetadata::Deleted.eq(false))
                .add(CCiPipeline::Deleted.eq(false))
                .add(CCiPipeline::Active.eq(true)),
        )
        .all(db)
        .await?
        .into_iter()
        .map(|stage| stage.ci_pipeline_id)
        .collect();

    if ci_pipeline_ids.is_empty() {
        return Ok(Vec::new());
    }

    Ok(ECiPipeline::find()
        .filter(CCiPipeline::Id.is_in(ci_pipeline_ids))
        .order_by_asc(CCiPipeline::Id)
        .all(db)
        .await?)
}
