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
                    .table(VariableScope::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VariableScope::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VariableScope::VariableDefinitionId).integer().not_null())
                    .col(ColumnDef::new(VariableScope::QualifierId).integer().not_null())
                    .col(ColumnDef::new(VariableScope::AppId).integer())
                    .col(ColumnDef::new(VariableScope::EnvId).integer())
                    .col(ColumnDef::new(VariableScope::ClusterId).integer())
                    .col(ColumnDef::new(VariableScope::Active).boolean().not_null())
                    .col(ColumnDef::new(VariableScope::CreatedBy).integer().not_null())
                    .col(ColumnDef::new(VariableScope::CreatedOn).date_time().not_null())
                    .col(ColumnDef::new(VariableScope::UpdatedBy).integer().not_null())
                    .col(ColumnDef::new(VariableScope::UpdatedOn).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-variable_scope-variable_definition_id")
                            .from(VariableScope::Table, VariableScope::VariableDefinitionId)
                            .to(VariableDefinition::Table, VariableDefinition::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VariableScope::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum VariableScope {
    Table,
    Id,
    VariableDefinitionId,
    QualifierId,
    AppId,
    EnvId,
    ClusterId,
    Active,
    CreatedBy,
    CreatedOn,
    UpdatedBy,
    UpdatedOn,
}

#[derive(DeriveIden)]
enum VariableDefinition {
    Table,
    Id,
}
