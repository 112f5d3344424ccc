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
                    .table(CiWorkflowStatusLatest::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CiWorkflowStatusLatest::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CiWorkflowStatusLatest::PipelineId).integer().not_null())
                    .col(ColumnDef::new(CiWorkflowStatusLatest::AppId).integer().not_null())
                    .col(ColumnDef::new(CiWorkflowStatusLatest::CiWorkflowId).integer().not_null())
                    .col(ColumnDef::new(CiWorkflowStatusLatest::CreatedBy).integer().not_null())
                    .col(ColumnDef::new(CiWorkflowStatusLatest::CreatedOn).date_time().not_null())
                    .col(ColumnDef::new(CiWorkflowStatusLatest::UpdatedBy).integer().not_null())
                    .col(ColumnDef::new(CiWorkflowStatusLatest::UpdatedOn).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-ci_workflow_status_latest-pipeline_id")
                            .from(CiWorkflowStatusLatest::Table, CiWorkflowStatusLatest::PipelineId)
                            .to(CiPipeline::Table, CiPipeline::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ci_workflow_status_latest-key")
                    .table(CiWorkflowStatusLatest::Table)
                    .col(CiWorkflowStatusLatest::PipelineId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CiWorkflowStatusLatest::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CiWorkflowStatusLatest {
    Table,
    Id,
    PipelineId,
    AppId,
    CiWorkflowId,
    CreatedBy,
    CreatedOn,
    UpdatedBy,
    UpdatedOn,
}

#[derive(DeriveIden)]
enum CiPipeline {
    Table,
    Id,
}
