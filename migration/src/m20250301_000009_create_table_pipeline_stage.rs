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
                    .table(PipelineStage::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PipelineStage::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PipelineStage::CiPipelineId).integer().not_null())
                    .col(ColumnDef::new(PipelineStage::Type).string().not_null())
                    .col(ColumnDef::new(PipelineStage::Deleted).boolean().not_null())
                    .col(ColumnDef::new(PipelineStage::CreatedBy).integer().not_null())
                    .col(ColumnDef::new(PipelineStage::CreatedOn).date_time().not_null())
                    .col(ColumnDef::new(PipelineStage::UpdatedBy).integer().not_null())
                    .col(ColumnDef::new(PipelineStage::UpdatedOn).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-pipeline_stage-ci_pipeline_id")
                            .from(PipelineStage::Table, PipelineStage::CiPipelineId)
                            .to(CiPipeline::Table, CiPipeline::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PipelineStage::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PipelineStage {
    Table,
    Id,
    CiPipelineId,
    Type,
    Deleted,
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
