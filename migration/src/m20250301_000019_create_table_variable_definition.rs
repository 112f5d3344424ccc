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
                    .table(VariableDefinition::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VariableDefinition::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VariableDefinition::Name).string().not_null())
                    .col(ColumnDef::new(VariableDefinition::DataType).string().not_null())
                    .col(ColumnDef::new(VariableDefinition::VarType).string().not_null())
                    .col(ColumnDef::new(VariableDefinition::Description).text().not_null())
                    .col(ColumnDef::new(VariableDefinition::Active).boolean().not_null())
                    .col(ColumnDef::new(VariableDefinition::CreatedBy).integer().not_null())
                    .col(ColumnDef::new(VariableDefinition::CreatedOn).date_time().not_null())
                    .col(ColumnDef::new(VariableDefinition::UpdatedBy).integer().not_null())
                    .col(ColumnDef::new(VariableDefinition::UpdatedOn).date_time().not_null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VariableDefinition::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum VariableDefinition {
    Table,
    Id,
    Name,
    DataType,
    VarType,
    Description,
    Active,
    CreatedBy,
    CreatedOn,
    UpdatedBy,
    UpdatedOn,
}
