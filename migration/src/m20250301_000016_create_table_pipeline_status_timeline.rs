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
                    .table(PipelineStatusTimeline::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PipelineStatusTimeline::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PipelineStatusTimeline::CdWorkflowRunnerId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PipelineStatusTimeline::Status).string().not_null())
                    .col(ColumnDef::new(PipelineStatusTimeline::StatusDetail).text().not_null())
                    .col(ColumnDef::new(PipelineStatusTimeline::StatusTime).date_time().not_null())
                    .col(ColumnDef::new(PipelineStatusTimeline::CreatedBy).integer().not_null())
                    .col(ColumnDef::new(PipelineStatusTimeline::CreatedOn).date_time().not_null())
                    .col(ColumnDef::new(PipelineStatusTimeline::UpdatedBy).integer().not_null())
                    .col(ColumnDef::new(PipelineStatusTimeline::UpdatedOn).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-pipeline_status_timeline-cd_workflow_runner_id")
                            .from(PipelineStatusTimeline::Table, PipelineStatusTimeline::CdWorkflowRunnerId)
                            .to(CdWorkflowRunner::Table, CdWorkflowRunner::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-pipeline_status_timeline-runner")
                    .table(PipelineStatusTimeline::Table)
                    .col(PipelineStatusTimeline::CdWorkflowRunnerId)
                    .col(PipelineStatusTimeline::StatusTime)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PipelineStatusTimeline::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PipelineStatusTimeline {
    Table,
    Id,
    CdWorkflowRunnerId,
    Status,
    StatusDetail,
    StatusTime,
    CreatedBy,
    CreatedOn,
    UpdatedBy,
    UpdatedOn,
}

#[derive(DeriveIden)]
enum CdWorkflowRunner {
    Table,
    Id,
}
