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
                    .table(VariableData::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VariableData::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VariableData::VariableScopeId).integer().not_null())
                    .col(ColumnDef::new(VariableData::Data).text().not_null())
                    .col(ColumnDef::new(VariableData::CreatedBy).integer().not_null())
                    .col(ColumnDef::new(VariableData::CreatedOn).date_time().not_null())
                    .col(ColumnDef::new(VariableData::UpdatedBy).integer().not_null())
                    .col(ColumnDef::new(VariableData::UpdatedOn).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-variable_data-variable_scope_id")
                            .from(VariableData::Table, VariableData::VariableScopeId)
                            .to(VariableScope::Table, VariableScope::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VariableData::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum VariableData {
    Table,
    Id,
    VariableScopeId,
    Data,
    CreatedBy,
    CreatedOn,
    UpdatedBy,
    UpdatedOn,
}

#[derive(DeriveIden)]
enum VariableScope {
    Table,
    Id,
}
