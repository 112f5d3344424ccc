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
                    .table(ConfigMapAppLevel::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ConfigMapAppLevel::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ConfigMapAppLevel::AppId).integer().not_null())
                    .col(ColumnDef::new(ConfigMapAppLevel::ConfigMapData).text().not_null())
                    .col(ColumnDef::new(ConfigMapAppLevel::SecretData).text().not_null())
                    .col(ColumnDef::new(ConfigMapAppLevel::CreatedBy).integer().not_null())
                    .col(ColumnDef::new(ConfigMapAppLevel::CreatedOn).date_time().not_null())
                    .col(ColumnDef::new(ConfigMapAppLevel::UpdatedBy).integer().not_null())
                    .col(ColumnDef::new(ConfigMapAppLevel::UpdatedOn).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-config_map_app_level-app_id")
                            .from(ConfigMapAppLevel::Table, ConfigMapAppLevel::AppId)
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
            .drop_table(Table::drop().table(ConfigMapAppLevel::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ConfigMapAppLevel {
    Table,
    Id,
    AppId,
    ConfigMapData,
    SecretData,
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
