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
                    .table(PipelineStageStep::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PipelineStageStep::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PipelineStageStep::PipelineStageId).integer().not_null())
                    .col(ColumnDef::new(PipelineStageStep::Name).string().not_null())
                    .col(ColumnDef::new(PipelineStageStep::RefPluginId).integer())
                    .col(ColumnDef::new(PipelineStageStep::Deleted).boolean().not_null())
                    .col(ColumnDef::new(PipelineStageStep::CreatedBy).integer().not_null())
                    .col(ColumnDef::new(PipelineStageStep::CreatedOn).date_time().not_null())
                    .col(ColumnDef::new(PipelineStageStep::UpdatedBy).integer().not_null())
                    .col(ColumnDef::new(PipelineStageStep::UpdatedOn).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-pipeline_stage_step-pipeline_stage_id")
                            .from(PipelineStageStep::Table, PipelineStageStep::PipelineStageId)
                            .to(PipelineStage::Table, PipelineStage::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-pipeline_stage_step-ref_plugin_id")
                            .from(PipelineStageStep::Table, PipelineStageStep::RefPluginId)
                            .to(PluginMetadata::Table, PluginMetadata::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PipelineStageStep::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PipelineStageStep {
    Table,
    Id,
    PipelineStageId,
    Name,
    RefPluginId,
    Deleted,
    CreatedBy,
    CreatedOn,
    UpdatedBy,
    UpdatedOn,
}

#[derive(DeriveIden)]
enum PipelineStage {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum PluginMetadata {
    Table,
    Id,
}
