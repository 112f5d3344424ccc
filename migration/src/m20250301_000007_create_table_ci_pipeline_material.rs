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
                    .table(CiPipelineMaterial::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CiPipelineMaterial::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CiPipelineMaterial::CiPipelineId).integer().not_null())
                    .col(ColumnDef::new(CiPipelineMaterial::GitMaterialId).integer().not_null())
                    .col(ColumnDef::new(CiPipelineMaterial::Type).string().not_null())
                    .col(ColumnDef::new(CiPipelineMaterial::Value).string().not_null())
                    .col(ColumnDef::new(CiPipelineMaterial::Active).boolean().not_null())
                    .col(ColumnDef::new(CiPipelineMaterial::CreatedBy).integer().not_null())
                    .col(ColumnDef::new(CiPipelineMaterial::CreatedOn).date_time().not_null())
                    .col(ColumnDef::new(CiPipelineMaterial::UpdatedBy).integer().not_null())
                    .col(ColumnDef::new(CiPipelineMaterial::UpdatedOn).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-ci_pipeline_material-ci_pipeline_id")
                            .from(CiPipelineMaterial::Table, CiPipelineMaterial::CiPipelineId)
                            .to(CiPipeline::Table, CiPipeline::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-ci_pipeline_material-git_material_id")
                            .from(CiPipelineMaterial::Table, CiPipelineMaterial::GitMaterialId)
                            .to(GitMaterial::Table, GitMaterial::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CiPipelineMaterial::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CiPipelineMaterial {
    Table,
    Id,
    CiPipelineId,
    GitMaterialId,
    Type,
    Value,
    Active,
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

#[derive(DeriveIden)]
enum GitMaterial {
    Table,
    Id,
}
