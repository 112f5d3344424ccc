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
                    .table(CiWorkflow::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CiWorkflow::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CiWorkflow::Name).string().not_null())
                    .col(ColumnDef::new(CiWorkflow::CiPipelineId).integer().not_null())
                    .col(ColumnDef::new(CiWorkflow::Status).string().not_null())
                    .col(ColumnDef::new(CiWorkflow::PodStatus).string().not_null())
                    .col(ColumnDef::new(CiWorkflow::Message).text().not_null())
                    .col(ColumnDef::new(CiWorkflow::StartedOn).date_time().not_null())
                    .col(ColumnDef::new(CiWorkflow::FinishedOn).date_time())
                    .col(ColumnDef::new(CiWorkflow::GitTriggers).text().not_null())
                    .col(ColumnDef::new(CiWorkflow::TriggeredBy).integer().not_null())
                    .col(ColumnDef::new(CiWorkflow::ImagePathReservationIds).text().not_null())
                    .col(ColumnDef::new(CiWorkflow::RefCiWorkflowId).integer())
                    .col(ColumnDef::new(CiWorkflow::ParentCiWorkflowId).integer())
                    .col(ColumnDef::new(CiWorkflow::IsArtifactUploaded).string().not_null())
                    .col(ColumnDef::new(CiWorkflow::CreatedBy).integer().not_null())
                    .col(ColumnDef::new(CiWorkflow::CreatedOn).date_time().not_null())
                    .col(ColumnDef::new(CiWorkflow::UpdatedBy).integer().not_null())
                    .col(ColumnDef::new(CiWorkflow::UpdatedOn).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-ci_workflow-ci_pipeline_id")
                            .from(CiWorkflow::Table, CiWorkflow::CiPipelineId)
                            .to(CiPipeline::Table, CiPipeline::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ci_workflow-status")
                    .table(CiWorkflow::Table)
                    .col(CiWorkflow::Status)
                    .col(CiWorkflow::StartedOn)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CiWorkflow::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CiWorkflow {
    Table,
    Id,
    Name,
    CiPipelineId,
    Status,
    PodStatus,
    Message,
    StartedOn,
    FinishedOn,
    GitTriggers,
    TriggeredBy,
    ImagePathReservationIds,
    RefCiWorkflowId,
    ParentCiWorkflowId,
    IsArtifactUploaded,
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
