/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use entity::app_workflow_mapping::ComponentKind;
use entity::ci_pipeline::CiPipelineType;
use entity::ci_pipeline_material::SourceType;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, TransactionTrait,
};

use super::Audit;
use crate::error::{CoreError, CoreResult};
use crate::types::*;

#[derive(Debug, Clone)]
pub struct NewCiPipeline {
    pub app_id: i32,
    pub name: String,
    pub manual: bool,
    pub external: bool,
    pub parent_ci_pipeline: Option<i32>,
    pub ci_pipeline_type: CiPipelineType,
    pub scan_enabled: bool,
    pub auto_abort_previous_builds: bool,
}

pub async fn create_ci_pipeline<C: ConnectionTrait>(
    db: &C,
    new: NewCiPipeline,
    audit: Audit,
) -> CoreResult<MCiPipeline> {
    super::app::get_active_app(db, new.app_id).await?;

    let existing = ECiPipeline::find()
        .filter(
            Condition::all()
                .add(CCiPipeline::AppId.eq(new.app_id))
                .add(CCiPipeline::Name.eq(new.name.clone()))
                .add(CCiPipeline::Deleted.eq(false)),
        )
        .one(db)
        .await?;

    if existing.is_some() {
        return Err(CoreError::Conflict(format!(
            "ci pipeline {} already exists in app {}",
            new.name, new.app_id
        )));
    }

    let apipeline = ACiPipeline {
        app_id: Set(new.app_id),
        name: Set(new.name),
        manual: Set(new.manual),
        external: Set(new.external),
        parent_ci_pipeline: Set(new.parent_ci_pipeline),
        ci_pipeline_type: Set(new.ci_pipeline_type),
        scan_enabled: Set(new.scan_enabled),
        auto_abort_previous_builds: Set(new.auto_abort_previous_builds),
        active: Set(true),
        deleted: Set(false),
        created_by: Set(audit.user),
        created_on: Set(audit.at),
        updated_by: Set(audit.user),
        updated_on: Set(audit.at),
        ..Default::default()
    };

    Ok(apipeline.insert(db).await?)
}

pub async fn get_ci_pipeline<C: ConnectionTrait>(db: &C, id: i32) -> CoreResult<MCiPipeline> {
    ECiPipeline::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| CoreError::not_found("ci pipeline", id))
}

pub async fn get_active_ci_pipeline<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> CoreResult<MCiPipeline> {
    match get_ci_pipeline(db, id).await? {
        pipeline if pipeline.active && !pipeline.deleted => Ok(pipeline),
        _ => Err(CoreError::not_found("ci pipeline", id)),
    }
}

pub async fn get_ci_pipelines_by_app<C: ConnectionTrait>(
    db: &C,
    app_id: i32,
) -> CoreResult<Vec<MCiPipeline>> {
    Ok(ECiPipeline::find()
        .filter(CCiPipeline::AppId.eq(app_id))
        .filter(CCiPipeline::Deleted.eq(false))
        .order_by_asc(CCiPipeline::Id)
        .all(db)
        .await?)
}

/// Pipelines linked to `parent_id` through `parent_ci_pipeline`.
pub async fn get_linked_children<C: ConnectionTrait>(
    db: &C,
    parent_id: i32,
) -> CoreResult<Vec<MCiPipeline>> {
    Ok(ECiPipeline::find()
        .filter(CCiPipeline::ParentCiPipeline.eq(parent_id))
        .filter(CCiPipeline::Deleted.eq(false))
        .order_by_asc(CCiPipeline::Id)
        .all(db)
        .await?)
}

pub async fn get_children_by_type<C: ConnectionTrait>(
    db: &C,
    parent_id: i32,
    pipeline_type: CiPipelineType,
) -> CoreResult<Vec<MCiPipeline>> {
    Ok(ECiPipeline::find()
        .filter(CCiPipeline::ParentCiPipeline.eq(parent_id))
        .filter(CCiPipeline::CiPipelineType.eq(pipeline_type))
        .filter(CCiPipeline::Deleted.eq(false))
        .order_by_asc(CCiPipeline::Id)
        .all(db)
        .await?)
}

pub async fn delete_ci_pipeline<C: TransactionTrait>(
    db: &C,
    id: i32,
    audit: Audit,
) -> CoreResult<MCiPipeline> {
    let txn = db.begin().await?;

    let mut apipeline = get_ci_pipeline(&txn, id).await?.into_active_model();
    apipeline.deleted = Set(true);
    apipeline.updated_by = Set(audit.user);
    apipeline.updated_on = Set(audit.at);
    let pipeline = apipeline.update(&txn).await?;

    super::workflow::deactivate_mappings_for_component(&txn, ComponentKind::CiPipeline, id, audit)
        .await?;

    txn.commit().await?;
    Ok(pipeline)
}

#[derive(Debug, Clone)]
pub struct NewCiMaterial {
    pub ci_pipeline_id: i32,
    pub git_material_id: i32,
    pub source_type: SourceType,
    pub value: String,
}

pub async fn create_ci_material<C: ConnectionTrait>(
    db: &C,
    new: NewCiMaterial,
    audit: Audit,
) -> CoreResult<MCiPipelineMaterial> {
    get_active_ci_pipeline(db, new.ci_pipeline_id).await?;

    let amaterial = ACiPipelineMaterial {
        ci_pipeline_id: Set(new.ci_pipeline_id),
        git_material_id: Set(new.git_material_id),
        source_type: Set(new.source_type),
        value: Set(new.value),
        active: Set(true),
        created_by: Set(audit.user),
        created_on: Set(audit.at),
        updated_by: Set(audit.user),
        updated_on: Set(audit.at),
        ..Default::default()
    };

    Ok(amaterial.insert(db).await?)
}

pub async fn get_active_materials<C: ConnectionTrait>(
    db: &C,
    ci_pipeline_id: i32,
) -> CoreResult<Vec<MCiPipelineMaterial>> {
    Ok(ECiPipelineMaterial::find()
        .filter(CCiPipelineMaterial::CiPipelineId.eq(ci_pipeline_id))
        .filter(CCiPipelineMaterial::Active.eq(true))
        .order_by_asc(CCiPipelineMaterial::Id)
        .all(db)
        .await?)
}
