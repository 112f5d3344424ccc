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
                    .table(CiPipeline::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CiPipeline::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CiPipeline::AppId).integer().not_null())
                    .col(ColumnDef::new(CiPipeline::Name).string().not_null())
                    .col(ColumnDef::new(CiPipeline::Manual).boolean().not_null())
                    .col(ColumnDef::new(CiPipeline::External).boolean().not_null())
                    .col(ColumnDef::new(CiPipeline::ParentCiPipeline).integer())
                    .col(ColumnDef::new(CiPipeline::CiPipelineType).string().not_null())
                    .col(ColumnDef::new(CiPipeline::ScanEnabled).boolean().not_null())
                    .col(ColumnDef::new(CiPipeline::AutoAbortPreviousBuilds).boolean().not_null())
                    .col(ColumnDef::new(CiPipeline::Active).boolean().not_null())
                    .col(ColumnDef::new(CiPipeline::Deleted).boolean().not_null())
                    .col(ColumnDef::new(CiPipeline::CreatedBy).integer().not_null())
                    .col(ColumnDef::new(CiPipeline::CreatedOn).date_time().not_null())
                    .col(ColumnDef::new(CiPipeline::UpdatedBy).integer().not_null())
                    .col(ColumnDef::new(CiPipeline::UpdatedOn).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-ci_pipeline-app_id")
                            .from(CiPipeline::Table, CiPipeline::AppId)
                            .to(App::Table, App::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CiPipeline::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CiPipeline {
    Table,
    Id,
    AppId,
    Name,
    Manual,
    External,
    ParentCiPipeline,
    CiPipelineType,
    ScanEnabled,
    AutoAbortPreviousBuilds,
    Active,
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
