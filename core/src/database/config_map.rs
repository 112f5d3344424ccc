/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder,
};

use super::Audit;
use crate::error::CoreResult;
use crate::types::*;

/// Stores the app-level config-map and secret blobs, replacing any existing row.
pub async fn save_app_level<C: ConnectionTrait>(
    db: &C,
    app_id: i32,
    config_map_data: String,
    secret_data: String,
    audit: Audit,
) -> CoreResult<MConfigMapAppLevel> {
    match get_app_level(db, app_id).await? {
        Some(existing) => {
            let mut aconfig = existing.into_active_model();
            aconfig.config_map_data = Set(config_map_data);
            aconfig.secret_data = Set(secret_data);
            aconfig.updated_by = Set(audit.user);
            aconfig.updated_on = Set(audit.at);
            Ok(aconfig.update(db).await?)
        }
        None => {
            let aconfig = AConfigMapAppLevel {
                app_id: Set(app_id),
                config_map_data: Set(config_map_data),
                secret_data: Set(secret_data),
                created_by: Set(audit.user),
                created_on: Set(audit.at),
                updated_by: Set(audit.user),
                updated_on: Set(audit.at),
                ..Default::default()
            };
            Ok(aconfig.insert(db).await?)
        }
    }
}

pub async fn get_app_level<C: ConnectionTrait>(
    db: &C,
    app_id: i32,
) -> CoreResult<Option<MConfigMapAppLevel>> {
    Ok(EConfigMapAppLevel::find()
        .filter(CConfigMapAppLevel::AppId.eq(app_id))
        .order_by_desc(CConfigMapAppLevel::Id)
        .one(db)
        .await?)
}

/// Stores the environment override, replacing any non-deleted row for the same (app, env).
pub async fn save_env_level<C: ConnectionTrait>(
    db: &C,
    app_id: i32,
    environment_id: i32,
    config_map_data: String,
    secret_data: String,
    audit: Audit,
) -> CoreResult<MConfigMapEnvLevel> {
    match get_env_level(db, app_id, environment_id).await? {
        Some(existing) => {
            let mut aconfig = existing.into_active_model();
            aconfig.config_map_data = Set(config_map_data);
            aconfig.secret_data = Set(secret_data);
            aconfig.updated_by = Set(audit.user);
            aconfig.updated_on = Set(audit.at);
            Ok(aconfig.update(db).await?)
        }
        None => {
            let aconfig = AConfigMapEnvLevel {
                app_id: Set(app_id),
                environment_id: Set(environment_id),
                config_map_data: Set(config_map_data),
                secret_data: Set(secret_data),
                deleted: Set(false),
                created_by: Set(audit.user),
                created_on: Set(audit.at),
                updated_by: Set(audit.user),
                updated_on: Set(audit.at),
                ..Default::default()
            };
            Ok(aconfig.insert(db).await?)
        }
    }
}

pub async fn get_env_level<C: ConnectionTrait>(
    db: &C,
    app_id: i32,
    environment_id: i32,
) -> CoreResult<Option<MConfigMapEnvLevel>> {
    Ok(EConfigMapEnvLevel::find()
        .filter(CConfigMapEnvLevel::AppId.eq(app_id))
        .filter(CConfigMapEnvLevel::EnvironmentId.eq(environment_id))
        .filter(CConfigMapEnvLevel::Deleted.eq(false))
        .order_by_desc(CConfigMapEnvLevel::Id)
        .one(db)
        .await?)
}

pub async fn delete_env_level<C: ConnectionTrait>(
    db: &C,
    app_id: i32,
    environment_id: i32,
    audit: Audit,
) -> CoreResult<Option<MConfigMapEnvLevel>> {
    match get_env_level(db, app_id, environment_id).await? {
        Some(existing) => {
            let mut aconfig = existing.into_active_model();
            aconfig.deleted = Set(true);
            aconfig.updated_by = Set(audit.user);
            aconfig.updated_on = Set(audit.at);
            Ok(Some(aconfig.update(db).await?))
        }
        None => Ok(None),
    }
}
