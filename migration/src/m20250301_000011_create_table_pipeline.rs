/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Pipeline::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Pipeline::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Pipeline::AppId).integer().not_null())
                    .col(ColumnDef::new(Pipeline::CiPipelineId).integer().not_null())
                    .col(ColumnDef::new(Pipeline::EnvironmentId).integer().not_null())
                    .col(ColumnDef::new(Pipeline::PipelineName).string().not_null())
                    .col(ColumnDef::new(Pipeline::TriggerType).string().not_null())
                    .col(ColumnDef::new(Pipeline::PreTriggerType).string().not_null())
                    .col(ColumnDef::new(Pipeline::PostTriggerType).string().not_null())
                    .col(ColumnDef::new(Pipeline::PreStageConfig).text().not_null())
                    .col(ColumnDef::new(Pipeline::PostStageConfig).text().not_null())
                    .col(ColumnDef::new(Pipeline::RunPreStageInEnv).boolean().not_null())
                    .col(ColumnDef::new(Pipeline::RunPostStageInEnv).boolean().not_null())
                    .col(ColumnDef::new(Pipeline::DeploymentAppType).string().not_null())
                    .col(ColumnDef::new(Pipeline::DeploymentAppCreated).boolean().not_null())
                    .col(ColumnDef::new(Pipeline::Deleted).boolean().not_null())
                    .col(ColumnDef::new(Pipeline::CreatedBy).integer().not_null())
                    .col(ColumnDef::new(Pipeline::CreatedOn).date_time().not_null())
                    .col(ColumnDef::new(Pipeline::UpdatedBy).integer().not_null())
                    .col(ColumnDef::new(Pipeline::UpdatedOn).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-pipeline-app_id")
                            .from(Pipeline::Table, Pipeline::AppId)
                            .to(App::Table, App::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-pipeline-environment_id")
                            .from(Pipeline::Table, Pipeline::EnvironmentId)
                            .to(Environment::Table, Environment::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-pipeline-ci_pipeline_id")
                    .table(Pipeline::Table)
                    .col(Pipeline::CiPipelineId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Pipeline::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Pipeline {
    Table,
    Id,
    AppId,
    CiPipelineId,
    EnvironmentId,
    PipelineName,
    TriggerType,
    PreTriggerType,
    PostTriggerType,
    PreStageConfig,
    PostStageConfig,
    RunPreStageInEnv,
    RunPostStageInEnv,
    DeploymentAppType,
    DeploymentAppCreated,
    Deleted,
    CreatedBy,
    CreatedOn,
    UpdatedBy,
    UpdatedOn,
}

#[derive(DeriveIden)]
enum App {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Environment {
    Table,
    Id,
}
