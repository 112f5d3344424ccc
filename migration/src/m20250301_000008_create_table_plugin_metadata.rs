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
                    .table(PluginMetadata::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PluginMetadata::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PluginMetadata::Name).string().not_null())
                    .col(ColumnDef::new(PluginMetadata::Deleted).boolean().not_null())
                    .col(ColumnDef::new(PluginMetadata::CreatedBy).integer().not_null())
                    .col(ColumnDef::new(PluginMetadata::CreatedOn).date_time().not_null())
                    .col(ColumnDef::new(PluginMetadata::UpdatedBy).integer().not_null())
                    .col(ColumnDef::new(PluginMetadata::UpdatedOn).date_time().not_null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PluginMetadata::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PluginMetadata {
    Table,
    Id,
    Name,
    Deleted,
    CreatedBy,
    CreatedOn,
    UpdatedBy,
    UpdatedOn,
}
