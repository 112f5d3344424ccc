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
                    .table(App::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(App::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(App::AppName).string().not_null())
                    .col(ColumnDef::new(App::TeamId).integer().not_null())
                    .col(ColumnDef::new(App::AppStore).boolean().not_null())
                    .col(ColumnDef::new(App::Active).boolean().not_null())
                    .col(ColumnDef::new(App::CreatedBy).integer().not_null())
                    .col(ColumnDef::new(App::CreatedOn).date_time().not_null())
                    .col(ColumnDef::new(App::UpdatedBy).integer().not_null())
                    .col(ColumnDef::new(App::UpdatedOn).date_time().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-app-app_name")
                    .table(App::Table)
                    .col(App::AppName)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(App::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum App {
    Table,
    Id,
    AppName,
    TeamId,
    AppStore,
    Active,
    CreatedBy,
    CreatedOn,
    UpdatedBy,
    UpdatedOn,
}
