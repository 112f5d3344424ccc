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
                    .table(ConfigMapEnvLevel::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ConfigMapEnvLevel::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ConfigMapEnvLevel::AppId).integer().not_null())
                    .col(ColumnDef::new(ConfigMapEnvLevel::EnvironmentId).integer().not_null())
                    .col(ColumnDef::new(ConfigMapEnvLevel::ConfigMapData).text().not_null())
                    .col(ColumnDef::new(ConfigMapEnvLevel::SecretData).text().not_null())
                    .col(ColumnDef::new(ConfigMapEnvLevel::Deleted).boolean().not_null())
                    .col(ColumnDef::new(ConfigMapEnvLevel::CreatedBy).integer().not_null())
                    .col(ColumnDef::new(ConfigMapEnvLevel::CreatedOn).date_time().not_null())
                    .col(ColumnDef::new(ConfigMapEnvLevel::UpdatedBy).integer().not_null())
                    .col(ColumnDef::new(ConfigMapEnvLevel::UpdatedOn).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-config_map_env_level-app_id")
                            .from(ConfigMapEnvLevel::Table, ConfigMapEnvLevel::AppId)
                            .to(App::Table, App::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-config_map_env_level-environment_id")
                            .from(ConfigMapEnvLevel::Table, ConfigMapEnvLevel::EnvironmentId)
                            .to(Environment::Table, Environment::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ConfigMapEnvLevel::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ConfigMapEnvLevel {
    Table,
    Id,
    AppId,
    EnvironmentId,
    ConfigMapData,
    SecretData,
    Deleted,
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

#[derive(DeriveIden)]
enum Environment {
    Table,
    Id,
}
