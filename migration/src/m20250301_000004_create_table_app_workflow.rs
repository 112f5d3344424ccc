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
                    .table(AppWorkflow::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AppWorkflow::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AppWorkflow::Name).string().not_null())
                    .col(ColumnDef::new(AppWorkflow::AppId).integer().not_null())
                    .col(ColumnDef::new(AppWorkflow::WorkflowDag).text().not_null())
                    .col(ColumnDef::new(AppWorkflow::Active).boolean().not_null())
                    .col(ColumnDef::new(AppWorkflow::CreatedBy).integer().not_null())
                    .col(ColumnDef::new(AppWorkflow::CreatedOn).date_time().not_null())
                    .col(ColumnDef::new(AppWorkflow::UpdatedBy).integer().not_null())
                    .col(ColumnDef::new(AppWorkflow::UpdatedOn).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-app_workflow-app_id")
                            .from(AppWorkflow::Table, AppWorkflow::AppId)
                            .to(App::Table, App::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AppWorkflow::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AppWorkflow {
    Table,
    Id,
    Name,
    AppId,
    WorkflowDag,
    Active,
    CreatedBy,
    CreatedOn,
    UpdatedBy,
    UpdatedOn,
}

#[derive(DeriveIden)]
enum App {
    Table,
    Id,
}
