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
                    .table(VariableEntityMapping::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VariableEntityMapping::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VariableEntityMapping::VariableName).string().not_null())
                    .col(ColumnDef::new(VariableEntityMapping::EntityType).string().not_null())
                    .col(ColumnDef::new(VariableEntityMapping::EntityId).integer().not_null())
                    .col(ColumnDef::new(VariableEntityMapping::IsDeleted).boolean().not_null())
                    .col(ColumnDef::new(VariableEntityMapping::CreatedBy).integer().not_null())
                    .col(ColumnDef::new(VariableEntityMapping::CreatedOn).date_time().not_null())
                    .col(ColumnDef::new(VariableEntityMapping::UpdatedBy).integer().not_null())
                    .col(ColumnDef::new(VariableEntityMapping::UpdatedOn).date_time().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-variable_entity_mapping-entity")
                    .table(VariableEntityMapping::Table)
                    .col(VariableEntityMapping::EntityType)
                    .col(VariableEntityMapping::EntityId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VariableEntityMapping::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum VariableEntityMapping {
    Table,
    Id,
    VariableName,
    EntityType,
    EntityId,
    IsDeleted,
    CreatedBy,
    CreatedOn,
    UpdatedBy,
    UpdatedOn,
}
