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
                    .table(CdWorkflowStatusLatest::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CdWorkflowStatusLatest::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CdWorkflowStatusLatest::PipelineId).integer().not_null())
                    .col(ColumnDef::new(CdWorkflowStatusLatest::AppId).integer().not_null())
                    .col(ColumnDef::new(CdWorkflowStatusLatest::EnvironmentId).integer().not_null())
                    .col(ColumnDef::new(CdWorkflowStatusLatest::WorkflowType).string().not_null())
                    .col(
                        ColumnDef::new(CdWorkflowStatusLatest::WorkflowRunnerId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CdWorkflowStatusLatest::CreatedBy).integer().not_null())
                    .col(ColumnDef::new(CdWorkflowStatusLatest::CreatedOn).date_time().not_null())
                    .col(ColumnDef::new(CdWorkflowStatusLatest::UpdatedBy).integer().not_null())
                    .col(ColumnDef::new(CdWorkflowStatusLatest::UpdatedOn).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cd_workflow_status_latest-pipeline_id")
                            .from(CdWorkflowStatusLatest::Table, CdWorkflowStatusLatest::PipelineId)
                            .to(Pipeline::Table, Pipeline::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-cd_workflow_status_latest-key")
                    .table(CdWorkflowStatusLatest::Table)
                    .col(CdWorkflowStatusLatest::PipelineId)
                    .col(CdWorkflowStatusLatest::WorkflowType)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CdWorkflowStatusLatest::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CdWorkflowStatusLatest {
    Table,
    Id,
    PipelineId,
    AppId,
    EnvironmentId,
    WorkflowType,
    WorkflowRunnerId,
    CreatedBy,
    CreatedOn,
    UpdatedBy,
    UpdatedOn,
}

#[derive(DeriveIden)]
enum Pipeline {
    Table,
    Id,
}
