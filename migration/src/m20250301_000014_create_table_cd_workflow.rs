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
                    .table(CdWorkflow::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CdWorkflow::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CdWorkflow::PipelineId).integer().not_null())
                    .col(ColumnDef::new(CdWorkflow::CiArtifactId).integer().not_null())
                    .col(ColumnDef::new(CdWorkflow::WorkflowStatus).string().not_null())
                    .col(ColumnDef::new(CdWorkflow::CreatedBy).integer().not_null())
                    .col(ColumnDef::new(CdWorkflow::CreatedOn).date_time().not_null())
                    .col(ColumnDef::new(CdWorkflow::UpdatedBy).integer().not_null())
                    .col(ColumnDef::new(CdWorkflow::UpdatedOn).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cd_workflow-pipeline_id")
                            .from(CdWorkflow::Table, CdWorkflow::PipelineId)
                            .to(Pipeline::Table, Pipeline::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cd_workflow-ci_artifact_id")
                            .from(CdWorkflow::Table, CdWorkflow::CiArtifactId)
                            .to(CiArtifact::Table, CiArtifact::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-cd_workflow-pipeline_artifact")
                    .table(CdWorkflow::Table)
                    .col(CdWorkflow::PipelineId)
                    .col(CdWorkflow::CiArtifactId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CdWorkflow::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CdWorkflow {
    Table,
    Id,
    PipelineId,
    CiArtifactId,
    WorkflowStatus,
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

#[derive(DeriveIden)]
enum CiArtifact {
    Table,
    Id,
}
