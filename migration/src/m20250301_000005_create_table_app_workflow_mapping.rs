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
                    .table(AppWorkflowMapping::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AppWorkflowMapping::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AppWorkflowMapping::AppWorkflowId).integer().not_null())
                    .col(ColumnDef::new(AppWorkflowMapping::ComponentId).integer().not_null())
                    .col(ColumnDef::new(AppWorkflowMapping::Type).string().not_null())
                    .col(ColumnDef::new(AppWorkflowMapping::ParentId).integer())
                    .col(ColumnDef::new(AppWorkflowMapping::ParentType).string())
                    .col(ColumnDef::new(AppWorkflowMapping::Active).boolean().not_null())
                    .col(ColumnDef::new(AppWorkflowMapping::CreatedBy).integer().not_null())
                    .col(ColumnDef::new(AppWorkflowMapping::CreatedOn).date_time().not_null())
                    .col(ColumnDef::new(AppWorkflowMapping::UpdatedBy).integer().not_null())
                    .col(ColumnDef::new(AppWorkflowMapping::UpdatedOn).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-app_workflow_mapping-app_workflow_id")
                            .from(AppWorkflowMapping::Table, AppWorkflowMapping::AppWorkflowId)
                            .to(AppWorkflow::Table, AppWorkflow::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-app_workflow_mapping-parent")
                    .table(AppWorkflowMapping::Table)
                    .col(AppWorkflowMapping::ParentType)
                    .col(AppWorkflowMapping::ParentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AppWorkflowMapping::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AppWorkflowMapping {
    Table,
    Id,
    AppWorkflowId,
    ComponentId,
    Type,
    ParentId,
    ParentType,
    Active,
    CreatedBy,
    CreatedOn,
    UpdatedBy,
    UpdatedOn,
}

#[derive(DeriveIden)]
enum AppWorkflow {
    Table,
    Id,
}
