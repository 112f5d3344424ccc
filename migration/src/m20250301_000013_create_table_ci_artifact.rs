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
                    .table(CiArtifact::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CiArtifact::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CiArtifact::CiWorkflowId).integer())
                    .col(ColumnDef::new(CiArtifact::ExternalCiPipelineId).integer())
                    .col(ColumnDef::new(CiArtifact::Image).string().not_null())
                    .col(ColumnDef::new(CiArtifact::ImageDigest).string().not_null())
                    .col(ColumnDef::new(CiArtifact::Scanned).boolean().not_null())
                    .col(ColumnDef::new(CiArtifact::ParentCiArtifact).integer())
                    .col(ColumnDef::new(CiArtifact::CreatedBy).integer().not_null())
                    .col(ColumnDef::new(CiArtifact::CreatedOn).date_time().not_null())
                    .col(ColumnDef::new(CiArtifact::UpdatedBy).integer().not_null())
                    .col(ColumnDef::new(CiArtifact::UpdatedOn).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-ci_artifact-ci_workflow_id")
                            .from(CiArtifact::Table, CiArtifact::CiWorkflowId)
                            .to(CiWorkflow::Table, CiWorkflow::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CiArtifact::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CiArtifact {
    Table,
    Id,
    CiWorkflowId,
    ExternalCiPipelineId,
    Image,
    ImageDigest,
    Scanned,
    ParentCiArtifact,
    CreatedBy,
    CreatedOn,
    UpdatedBy,
    UpdatedOn,
}

#[derive(DeriveIden)]
enum CiWorkflow {
    Table,
    Id,
}
