/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use entity::app_workflow::WorkflowDag;
use entity::app_workflow_mapping::ComponentKind;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::debug;

use super::{Audit, like_pattern};
use crate::error::{CoreError, CoreResult};
use crate::types::*;

pub async fn create_workflow<C: ConnectionTrait>(
    db: &C,
    app_id: i32,
    name: String,
    audit: Audit,
) -> CoreResult<MAppWorkflow> {
    super::app::get_active_app(db, app_id).await?;

    let existing = EAppWorkflow::find()
        .filter(
            Condition::all()
                .add(CAppWorkflow::AppId.eq(app_id))
                .add(CAppWorkflow::Name.eq(name.clone()))
                .add(CAppWorkflow::Active.eq(true)),
        )
        .one(db)
        .await?;

    if existing.is_some() {
        return Err(CoreError::Conflict(format!(
            "workflow {} already exists in app {}",
            name, app_id
        )));
    }

    let aworkflow = AAppWorkflow {
        name: Set(name),
        app_id: Set(app_id),
        workflow_dag: Set(serde_json::to_string(&WorkflowDag::default())?),
        active: Set(true),
        created_by: Set(audit.user),
        created_on: Set(audit.at),
        updated_by: Set(audit.user),
        updated_on: Set(audit.at),
        ..Default::default()
    };

    Ok(aworkflow.insert(db).await?)
}

pub async fn get_workflow<C: ConnectionTrait>(db: &C, id: i32) -> CoreResult<MAppWorkflow> {
    EAppWorkflow::find_by_id(id)
        .one(db)
        .await?
        .filter(|w| w.active)
        .ok_or_else(|| CoreError::not_found("workflow", id))
}

pub async fn get_workflows_by_app<C: ConnectionTrait>(
    db: &C,
    app_id: i32,
) -> CoreResult<Vec<MAppWorkflow>> {
    Ok(EAppWorkflow::find()
        .filter(CAppWorkflow::AppId.eq(app_id))
        .filter(CAppWorkflow::Active.eq(true))
        .order_by_asc(CAppWorkflow::Id)
        .all(db)
        .await?)
}

/// Case-insensitive substring match over active workflow names.
pub async fn search_workflows<C: ConnectionTrait>(
    db: &C,
    app_id: Option<i32>,
    term: &str,
) -> CoreResult<Vec<MAppWorkflow>> {
    let mut query = EAppWorkflow::find().filter(CAppWorkflow::Active.eq(true)).filter(
        Expr::expr(Func::lower(Expr::col(CAppWorkflow::Name)))
            .like(LikeExpr::new(like_pattern(term)).escape('\\')),
    );

    if let Some(app_id) = app_id {
        query = query.filter(CAppWorkflow::AppId.eq(app_id));
    }

    Ok(query.order_by_asc(CAppWorkflow::Id).all(db).await?)
}

/// Soft-deletes the workflow and every mapping in it in one transaction.
pub async fn delete_workflow<C: TransactionTrait>(
    db: &C,
    id: i32,
    audit: Audit,
) -> CoreResult<MAppWorkflow> {
    let txn = db.begin().await?;

    let workflow = get_workflow(&txn, id).await?;

    EAppWorkflowMapping::update_many()
        .col_expr(CAppWorkflowMapping::Active, Expr::value(false))
        .col_expr(CAppWorkflowMapping::UpdatedBy, Expr::value(audit.user))
        .col_expr(CAppWorkflowMapping::UpdatedOn, Expr::value(audit.at))
        .filter(CAppWorkflowMapping::AppWorkflowId.eq(id))
        .filter(CAppWorkflowMapping::Active.eq(true))
        .exec(&txn)
        .await?;

    let mut aworkflow = workflow.into_active_model();
    aworkflow.active = Set(false);
    aworkflow.updated_by = Set(audit.user);
    aworkflow.updated_on = Set(audit.at);
    let workflow = aworkflow.update(&txn).await?;

    txn.commit().await?;
    Ok(workflow)
}

#[derive(Debug, Clone)]
pub struct NewMapping {
    pub workflow_id: i32,
    pub component_id: i32,
    pub component_kind: ComponentKind,
    pub parent_id: Option<i32>,
    pub parent_kind: Option<ComponentKind>,
}

async fn component_is_active<C: ConnectionTrait>(
    db: &C,
    kind: ComponentKind,
    id: i32,
) -> CoreResult<bool> {
    Ok(match kind {
        ComponentKind::CiPipeline => ECiPipeline::find_by_id(id)
            .one(db)
            .await?
            .is_some_and(|p| p.active && !p.deleted),
        ComponentKind::CdPipeline => EPipeline::find_by_id(id)
            .one(db)
            .await?
            .is_some_and(|p| !p.deleted),
    })
}

/// Adds an edge to the workflow DAG and records the node in `workflow_dag`.
pub async fn create_mapping<C: TransactionTrait>(
    db: &C,
    new: NewMapping,
    audit: Audit,
) -> CoreResult<MAppWorkflowMapping> {
    let txn = db.begin().await?;

    let workflow = get_workflow(&txn, new.workflow_id).await?;

    if !component_is_active(&txn, new.component_kind, new.component_id).await? {
        return Err(CoreError::Conflict(format!(
            "component {} is missing or inactive",
            new.component_id
        )));
    }

    if new.parent_id.is_some() != new.parent_kind.is_some() {
        return Err(CoreError::Conflict(
            "parent id and parent type must be set together".to_string(),
        ));
    }

    if let (Some(parent_id), Some(parent_kind)) = (new.parent_id, new.parent_kind) {
        if !component_is_active(&txn, parent_kind, parent_id).await? {
            return Err(CoreError::Conflict(format!(
                "parent {} is missing or inactive",
                parent_id
            )));
        }
    }

    let amapping = AAppWorkflowMapping {
        app_workflow_id: Set(new.workflow_id),
        component_id: Set(new.component_id),
        component_kind: Set(new.component_kind),
        parent_id: Set(new.parent_id),
        parent_type: Set(new.parent_kind),
        active: Set(true),
        created_by: Set(audit.user),
        created_on: Set(audit.at),
        updated_by: Set(audit.user),
        updated_on: Set(audit.at),
        ..Default::default()
    };
    let mapping = amapping.insert(&txn).await?;

    let mut dag = workflow.dag()?;
    let nodes = match new.component_kind {
        ComponentKind::CiPipeline => &mut dag.ci_pipelines,
        ComponentKind::CdPipeline => &mut dag.cd_pipelines,
    };
    if !nodes.contains(&new.component_id) {
        nodes.push(new.component_id);
    }

    let mut aworkflow = workflow.into_active_model();
    aworkflow.workflow_dag = Set(serde_json::to_string(&dag)?);
    aworkflow.updated_by = Set(audit.user);
    aworkflow.updated_on = Set(audit.at);
    aworkflow.update(&txn).await?;

    txn.commit().await?;
    Ok(mapping)
}

pub async fn get_mappings_by_workflow<C: ConnectionTrait>(
    db: &C,
    workflow_id: i32,
) -> CoreResult<Vec<MAppWorkflowMapping>> {
    Ok(EAppWorkflowMapping::find()
        .filter(CAppWorkflowMapping::AppWorkflowId.eq(workflow_id))
        .filter(CAppWorkflowMapping::Active.eq(true))
        .order_by_asc(CAppWorkflowMapping::Id)
        .all(db)
        .await?)
}

pub async fn get_mappings_by_parent<C: ConnectionTrait>(
    db: &C,
    parent_kind: ComponentKind,
    parent_id: i32,
) -> CoreResult<Vec<MAppWorkflowMapping>> {
    Ok(EAppWorkflowMapping::find()
        .filter(CAppWorkflowMapping::ParentType.eq(parent_kind))
        .filter(CAppWorkflowMapping::ParentId.eq(parent_id))
        .filter(CAppWorkflowMapping::Active.eq(true))
        .order_by_asc(CAppWorkflowMapping::Id)
        .all(db)
        .await?)
}

/// CD pipelines mapped directly under a CI pipeline, used for the cascade trigger.
pub async fn get_cd_mappings_by_parent_ci<C: ConnectionTrait>(
    db: &C,
    ci_pipeline_id: i32,
) -> CoreResult<Vec<MAppWorkflowMapping>> {
    Ok(get_mappings_by_parent(db, ComponentKind::CiPipeline, ci_pipeline_id)
        .await?
        .into_iter()
        .filter(|m| m.component_kind == ComponentKind::CdPipeline)
        .collect())
}

pub async fn get_cd_mappings_by_parent_cd<C: ConnectionTrait>(
    db: &C,
    cd_pipeline_id: i32,
) -> CoreResult<Vec<MAppWorkflowMapping>> {
    Ok(get_mappings_by_parent(db, ComponentKind::CdPipeline, cd_pipeline_id)
        .await?
        .into_iter()
        .filter(|m| m.component_kind == ComponentKind::CdPipeline)
        .collect())
}

/// Parent of a CD pipeline's active mapping, if any.
pub async fn get_parent_of_cd<C: ConnectionTrait>(
    db: &C,
    cd_pipeline_id: i32,
) -> CoreResult<Option<(ComponentKind, i32)>> {
    let mapping = EAppWorkflowMapping::find()
        .filter(CAppWorkflowMapping::ComponentKind.eq(ComponentKind::CdPipeline))
        .filter(CAppWorkflowMapping::ComponentId.eq(cd_pipeline_id))
        .filter(CAppWorkflowMapping::Active.eq(true))
        .one(db)
        .await?;

    Ok(mapping.and_then(|m| m.parent_type.zip(m.parent_id)))
}

/// Deactivates every mapping where the component appears as node or parent.
pub(crate) async fn deactivate_mappings_for_component<C: ConnectionTrait>(
    db: &C,
    kind: ComponentKind,
    id: i32,
    audit: Audit,
) -> CoreResult<u64> {
    let result = EAppWorkflowMapping::update_many()
        .col_expr(CAppWorkflowMapping::Active, Expr::value(false))
        .col_expr(CAppWorkflowMapping::UpdatedBy, Expr::value(audit.user))
        .col_expr(CAppWorkflowMapping::UpdatedOn, Expr::value(audit.at))
        .filter(CAppWorkflowMapping::Active.eq(true))
        .filter(
            Condition::any()
                .add(
                    Condition::all()
                        .add(CAppWorkflowMapping::ComponentKind.eq(kind))
                        .add(CAppWorkflowMapping::ComponentId.eq(id)),
                )
                .add(
                    Condition::all()
                        .add(CAppWorkflowMapping::ParentType.eq(kind))
                        .add(CAppWorkflowMapping::ParentId.eq(id)),
                ),
        )
        .exec(db)
        .await?;

    debug!(component_id = id, rows = result.rows_affected, "Deactivated workflow mappings");
    Ok(result.rows_affected)
}

/// Sets `scan_enabled` on every CI pipeline that is a node of the given workflows.
pub async fn update_scan_enabled_by_workflows<C: TransactionTrait>(
    db: &C,
    workflow_ids: &[i32],
    scan_enabled: bool,
    audit: Audit,
) -> CoreResult<u64> {
    if workflow_ids.is_empty() {
        return Ok(0);
    }

    let txn = db.begin().await?;

    let ci_pipeline_ids: Vec<i32> = EAppWorkflowMapping::find()
        .filter(CAppWorkflowMapping::AppWorkflowId.is_in(workflow_ids.to_vec()))
        .filter(CAppWorkflowMapping::ComponentKind.eq(ComponentKind::CiPipeline))
        .filter(CAppWorkflowMapping::Active.eq(true))
        .all(&txn)
        .await?
        .into_iter()
        .map(|m| m.component_id)
        .collect();

    if ci_pipeline_ids.is_empty() {
        txn.commit().await?;
        return Ok(0);
    }

    let result = ECiPipeline::update_many()
        .col_expr(CCiPipeline::ScanEnabled, Expr::value(scan_enabled))
        .col_expr(CCiPipeline::UpdatedBy, Expr::value(audit.user))
        .col_expr(CCiPipeline::UpdatedOn, Expr::value(audit.at))
        .filter(CCiPipeline::Id.is_in(ci_pipeline_ids))
        .filter(CCiPipeline::Deleted.eq(false))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    Ok(result.rows_affected)
}
