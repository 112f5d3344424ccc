/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder,
};

use super::{Audit, like_pattern};
use crate::error::{CoreError, CoreResult};
use crate::types::*;

#[derive(Debug, Clone)]
pub struct NewApp {
    pub app_name: String,
    pub team_id: i32,
    pub app_store: bool,
}

pub async fn create_app<C: ConnectionTrait>(db: &C, new: NewApp, audit: Audit) -> CoreResult<MApp> {
    let existing = EApp::find()
        .filter(
            Condition::all()
                .add(CApp::AppName.eq(new.app_name.clone()))
                .add(CApp::Active.eq(true)),
        )
        .one(db)
        .await?;

    if existing.is_some() {
        return Err(CoreError::Conflict(format!(
            "app {} already exists",
            new.app_name
        )));
    }

    let aapp = AApp {
        app_name: Set(new.app_name),
        team_id: Set(new.team_id),
        app_store: Set(new.app_store),
        active: Set(true),
        created_by: Set(audit.user),
        created_on: Set(audit.at),
        updated_by: Set(audit.user),
        updated_on: Set(audit.at),
        ..Default::default()
    };

    Ok(aapp.insert(db).await?)
}

pub async fn get_app<C: ConnectionTrait>(db: &C, id: i32) -> CoreResult<MApp> {
    EApp::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| CoreError::not_found("app", id))
}

pub async fn get_active_app<C: ConnectionTrait>(db: &C, id: i32) -> CoreResult<MApp> {
    match get_app(db, id).await? {
        app if app.active => Ok(app),
        _ => Err(CoreError::not_found("app", id)),
    }
}

/// Case-insensitive substring match over active app names.
pub async fn search_apps<C: ConnectionTrait>(db: &C, term: &str) -> CoreResult<Vec<MApp>> {
    Ok(EApp::find()
        .filter(CApp::Active.eq(true))
        .filter(
            Expr::expr(Func::lower(Expr::col(CApp::AppName)))
                .like(LikeExpr::new(like_pattern(term)).escape('\\')),
        )
        .order_by_asc(CApp::AppName)
        .all(db)
        .await?)
}

pub async fn delete_app<C: ConnectionTrait>(db: &C, id: i32, audit: Audit) -> CoreResult<MApp> {
    let mut aapp = get_active_app(db, id).await?.into_active_model();
    aapp.active = Set(false);
    aapp.updated_by = Set(audit.user);
    aapp.updated_on = Set(audit.at);
    Ok(aapp.update(db).await?)
}

#[derive(Debug, Clone)]
pub struct NewEnvironment {
    pub environment_name: String,
    pub cluster_id: i32,
    pub namespace: String,
}

pub async fn create_environment<C: ConnectionTrait>(
    db: &C,
    new: NewEnvironment,
    audit: Audit,
) -> CoreResult<MEnvironment> {
    let aenvironment = AEnvironment {
        environment_name: Set(new.environment_name),
        cluster_id: Set(new.cluster_id),
        namespace: Set(new.namespace),
        active: Set(true),
        created_by: Set(audit.user),
        created_on: Set(audit.at),
        updated_by: Set(audit.user),
        updated_on: Set(audit.at),
        ..Default::default()
    };

    Ok(aenvironment.insert(db).await?)
}

pub async fn get_environment<C: ConnectionTrait>(db: &C, id: i32) -> CoreResult<MEnvironment> {
    EEnvironment::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| CoreError::not_found("environment", id))
}

#[derive(Debug, Clone)]
pub struct NewGitMaterial {
    pub app_id: i32,
    pub git_provider_id: i32,
    pub url: String,
    pub checkout_path: String,
    pub fetch_submodules: bool,
}

pub async fn create_git_material<C: ConnectionTrait>(
    db: &C,
    new: NewGitMaterial,
    audit: Audit,
) -> CoreResult<MGitMaterial> {
    get_active_app(db, new.app_id).await?;

    let amaterial = AGitMaterial {
        app_id: Set(new.app_id),
        git_provider_id: Set(new.git_provider_id),
        url: Set(new.url),
        checkout_path: Set(new.checkout_path),
        fetch_submodules: Set(new.fetch_submodules),
        active: Set(true),
        created_by: Set(audit.user),
        created_on: Set(audit.at),
        updated_by: Set(audit.user),
        updated_on: Set(audit.at),
        ..Default::default()
    };

    Ok(amaterial.insert(db).await?)
}

pub async fn get_git_materials_by_app<C: ConnectionTrait>(
    db: &C,
    app_id: i32,
) -> CoreResult<Vec<MGitMaterial>> {
    Ok(EGitMaterial::find()
        .filter(CGitMaterial::AppId.eq(app_id))
        .filter(CGitMaterial::Active.eq(true))
        .order_by_asc(CGitMaterial::Id)
        .all(db)
        .await?)
}
