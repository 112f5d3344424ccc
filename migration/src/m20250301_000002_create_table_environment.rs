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
                    .table(Environment::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Environment::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Environment::EnvironmentName).string().not_null())
                    .col(ColumnDef::new(Environment::ClusterId).integer().not_null())
                    .col(ColumnDef::new(Environment::Namespace).string().not_null())
                    .col(ColumnDef::new(Environment::Active).boolean().not_null())
                    .col(ColumnDef::new(Environment::CreatedBy).integer().not_null())
                    .col(ColumnDef::new(Environment::CreatedOn).date_time().not_null())
                    .col(ColumnDef::new(Environment::UpdatedBy).integer().not_null())
                    .col(ColumnDef::new(Environment::UpdatedOn).date_time().not_null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Environment::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Environment {
    Table,
    Id,
    EnvironmentName,
    ClusterId,
    Namespace,
    Active,
    CreatedBy,
    CreatedOn,
    UpdatedBy,
    UpdatedOn,
}
