/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use entity::variable_definition::{VariableDataType, VariableType};
use entity::variable_entity_mapping::EntityType;
use entity::variable_scope::Qualifier;
use entity::variable_snapshot_history::HistoryReferenceType;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use std::collections::BTreeMap;

use super::Audit;
use crate::error::{CoreError, CoreResult};
use crate::types::*;

#[derive(Debug, Clone)]
pub struct NewVariable {
    pub name: String,
    pub data_type: VariableDataType,
    pub var_type: VariableType,
    pub description: String,
}

pub async fn create_variable_definition<C: ConnectionTrait>(
    db: &C,
    new: NewVariable,
    audit: Audit,
) -> CoreResult<MVariableDefinition> {
    let existing = EVariableDefinition::find()
        .filter(CVariableDefinition::Name.eq(new.name.clone()))
        .filter(CVariableDefinition::Active.eq(true))
        .one(db)
        .await?;

    if existing.is_some() {
        return Err(CoreError::Conflict(format!(
            "variable {} already exists",
            new.name
        )));
    }

    let adefinition = AVariableDefinition {
        name: Set(new.name),
        data_type: Set(new.data_type),
        var_type: Set(new.var_type),
        description: Set(new.description),
        active: Set(true),
        created_by: Set(audit.user),
        created_on: Set(audit.at),
        updated_by: Set(audit.user),
        updated_on: Set(audit.at),
        ..Default::default()
    };

    Ok(adefinition.insert(db).await?)
}

#[derive(Debug, Clone)]
pub struct NewScopedValue {
    pub variable_definition_id: i32,
    pub qualifier: Qualifier,
    pub app_id: Option<i32>,
    pub env_id: Option<i32>,
    pub cluster_id: Option<i32>,
    pub value: serde_json::Value,
}

/// Adds a scope row and its value in one transaction.
pub async fn create_scoped_value<C: TransactionTrait>(
    db: &C,
    new: NewScopedValue,
    audit: Audit,
) -> CoreResult<(MVariableScope, MVariableData)> {
    let txn = db.begin().await?;

    let ascope = AVariableScope {
        variable_definition_id: Set(new.variable_definition_id),
        qualifier_id: Set(new.qualifier),
        app_id: Set(new.app_id),
        env_id: Set(new.env_id),
        cluster_id: Set(new.cluster_id),
        active: Set(true),
        created_by: Set(audit.user),
        created_on: Set(audit.at),
        updated_by: Set(audit.user),
        updated_on: Set(audit.at),
        ..Default::default()
    };
    let scope = ascope.insert(&txn).await?;

    let adata = AVariableData {
        variable_scope_id: Set(scope.id),
        data: Set(serde_json::to_string(&new.value)?),
        created_by: Set(audit.user),
        created_on: Set(audit.at),
        updated_by: Set(audit.user),
        updated_on: Set(audit.at),
        ..Default::default()
    };
    let data = adata.insert(&txn).await?;

    txn.commit().await?;
    Ok((scope, data))
}

pub async fn get_definitions_by_names<C: ConnectionTrait>(
    db: &C,
    names: &[String],
) -> CoreResult<Vec<MVariableDefinition>> {
    if names.is_empty() {
        return Ok(Vec::new());
    }

    Ok(EVariableDefinition::find()
        .filter(CVariableDefinition::Name.is_in(names.to_vec()))
        .filter(CVariableDefinition::Active.eq(true))
        .order_by_asc(CVariableDefinition::Id)
        .all(db)
        .await?)
}

/// Every active scope of the given definitions with its stored value, newest scope first.
pub async fn get_scoped_values<C: ConnectionTrait>(
    db: &C,
    definition_ids: &[i32],
) -> CoreResult<Vec<(MVariableScope, MVariableData)>> {
    if definition_ids.is_empty() {
        return Ok(Vec::new());
    }

    let scopes = EVariableScope::find()
        .filter(CVariableScope::VariableDefinitionId.is_in(definition_ids.to_vec()))
        .filter(CVariableScope::Active.eq(true))
        .order_by_desc(CVariableScope::Id)
        .all(db)
        .await?;

    if scopes.is_empty() {
        return Ok(Vec::new());
    }

    let mut data: BTreeMap<i32, MVariableData> = EVariableData::find()
        .filter(CVariableData::VariableScopeId.is_in(scopes.iter().map(|s| s.id)))
        .order_by_asc(CVariableData::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|d| (d.variable_scope_id, d))
        .collect();

    Ok(scopes
        .into_iter()
        .filter_map(|scope| data.remove(&scope.id).map(|d| (scope, d)))
        .collect())
}

pub async fn get_entity_mappings<C: ConnectionTrait>(
    db: &C,
    entity_type: EntityType,
    entity_id: i32,
) -> CoreResult<Vec<MVariableEntityMapping>> {
    Ok(EVariableEntityMapping::find()
        .filter(
            Condition::all()
                .add(CVariableEntityMapping::EntityType.eq(entity_type))
                .add(CVariableEntityMapping::EntityId.eq(entity_id))
                .add(CVariableEntityMapping::IsDeleted.eq(false)),
        )
        .order_by_asc(CVariableEntityMapping::Id)
        .all(db)
        .await?)
}

pub async fn create_entity_mappings<C: ConnectionTrait>(
    db: &C,
    entity_type: EntityType,
    entity_id: i32,
    names: &[String],
    audit: Audit,
) -> CoreResult<()> {
    if names.is_empty() {
        return Ok(());
    }

    let models = names.iter().map(|name| AVariableEntityMapping {
        variable_name: Set(name.clone()),
        entity_type: Set(entity_type),
        entity_id: Set(entity_id),
        is_deleted: Set(false),
        created_by: Set(audit.user),
        created_on: Set(audit.at),
        updated_by: Set(audit.user),
        updated_on: Set(audit.at),
        ..Default::default()
    });

    EVariableEntityMapping::insert_many(models).exec(db).await?;
    Ok(())
}

pub async fn delete_entity_mappings<C: ConnectionTrait>(
    db: &C,
    entity_type: EntityType,
    entity_id: i32,
    names: &[String],
    audit: Audit,
) -> CoreResult<u64> {
    if names.is_empty() {
        return Ok(0);
    }

    let result = EVariableEntityMapping::update_many()
        .col_expr(CVariableEntityMapping::IsDeleted, Expr::value(true))
        .col_expr(CVariableEntityMapping::UpdatedBy, Expr::value(audit.user))
        .col_expr(CVariableEntityMapping::UpdatedOn, Expr::value(audit.at))
        .filter(
            Condition::all()
                .add(CVariableEntityMapping::EntityType.eq(entity_type))
                .add(CVariableEntityMapping::EntityId.eq(entity_id))
                .add(CVariableEntityMapping::VariableName.is_in(names.to_vec()))
                .add(CVariableEntityMapping::IsDeleted.eq(false)),
        )
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Appends a snapshot row; history is never updated in place.
pub async fn insert_history<C: ConnectionTrait>(
    db: &C,
    reference_type: HistoryReferenceType,
    reference_id: i32,
    snapshot: &BTreeMap<String, String>,
    audit: Audit,
) -> CoreResult<MVariableSnapshotHistory> {
    let ahistory = AVariableSnapshotHistory {
        variable_snapshot: Set(serde_json::to_string(snapshot)?),
        history_reference_id: Set(reference_id),
        history_reference_type: Set(reference_type),
        created_by: Set(audit.user),
        created_on: Set(audit.at),
        updated_by: Set(audit.user),
        updated_on: Set(audit.at),
        ..Default::default()
    };

    Ok(ahistory.insert(db).await?)
}

/// Latest snapshot stored for the reference, if any.
pub async fn get_history<C: ConnectionTrait>(
    db: &C,
    reference_type: HistoryReferenceType,
    reference_id: i32,
) -> CoreResult<Option<BTreeMap<String, String>>> {
    let history = EVariableSnapshotHistory::find()
        .filter(CVariableSnapshotHistory::HistoryReferenceType.eq(reference_type))
        .filter(CVariableSnapshotHistory::HistoryReferenceId.eq(reference_id))
        .order_by_desc(CVariableSnapshotHistory::Id)
        .one(db)
        .await?;

    match history {
        Some(history) => Ok(Some(serde_json::from_str(&history.variable_snapshot)?)),
        None => Ok(None),
    }
}
