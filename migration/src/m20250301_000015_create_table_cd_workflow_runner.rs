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
                    .table(CdWorkflowRunner::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CdWorkflowRunner::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CdWorkflowRunner::Name).string().not_null())
                    .col(ColumnDef::new(CdWorkflowRunner::CdWorkflowId).integer().not_null())
                    .col(ColumnDef::new(CdWorkflowRunner::WorkflowType).string().not_null())
                    .col(ColumnDef::new(CdWorkflowRunner::ExecutorType).string().not_null())
                    .col(ColumnDef::new(CdWorkflowRunner::Status).string().not_null())
                    .col(ColumnDef::new(CdWorkflowRunner::PodStatus).string().not_null())
                    .col(ColumnDef::new(CdWorkflowRunner::Message).text().not_null())
                    .col(ColumnDef::new(CdWorkflowRunner::StartedOn).date_time().not_null())
                    .col(ColumnDef::new(CdWorkflowRunner::FinishedOn).date_time())
                    .col(ColumnDef::new(CdWorkflowRunner::TriggeredBy).integer().not_null())
                    .col(ColumnDef::new(CdWorkflowRunner::RefCdWorkflowRunnerId).integer())
                    .col(
                        ColumnDef::new(CdWorkflowRunner::ImagePathReservationIds)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CdWorkflowRunner::ReferenceId).string())
                    .col(ColumnDef::new(CdWorkflowRunner::CreatedBy).integer().not_null())
                    .col(ColumnDef::new(CdWorkflowRunner::CreatedOn).date_time().not_null())
                    .col(ColumnDef::new(CdWorkflowRunner::UpdatedBy).integer().not_null())
                    .col(ColumnDef::new(CdWorkflowRunner::UpdatedOn).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cd_workflow_runner-cd_workflow_id")
                            .from(CdWorkflowRunner::Table, CdWorkflowRunner::CdWorkflowId)
                            .to(CdWorkflow::Table, CdWorkflow::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-cd_workflow_runner-reference_id")
                    .table(CdWorkflowRunner::Table)
                    .col(CdWorkflowRunner::ReferenceId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-cd_workflow_runner-status")
                    .table(CdWorkflowRunner::Table)
                    .col(CdWorkflowRunner::Status)
                    .col(CdWorkflowRunner::WorkflowType)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CdWorkflowRunner::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CdWorkflowRunner {
    Table,
    Id,
    Name,
    CdWorkflowId,
    WorkflowType,
    ExecutorType,
    Status,
    PodStatus,
    Message,
    StartedOn,
    FinishedOn,
    TriggeredBy,
    RefCdWorkflowRunnerId,
    ImagePathReservationIds,
    ReferenceId,
    CreatedBy,
    CreatedOn,
    UpdatedBy,
    UpdatedOn,
}

#[derive(DeriveIden)]
enum CdWorkflow {
    Table,
    Id,
}
