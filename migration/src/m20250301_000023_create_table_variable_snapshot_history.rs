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
                    .table(VariableSnapshotHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VariableSnapshotHistory::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(VariableSnapshotHistory::VariableSnapshot)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VariableSnapshotHistory::HistoryReferenceId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VariableSnapshotHistory::HistoryReferenceType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(VariableSnapshotHistory::CreatedBy).integer().not_null())
                    .col(ColumnDef::new(VariableSnapshotHistory::CreatedOn).date_time().not_null())
                    .col(ColumnDef::new(VariableSnapshotHistory::UpdatedBy).integer().not_null())
                    .col(ColumnDef::new(VariableSnapshotHistory::UpdatedOn).date_time().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-variable_snapshot_history-reference")
                    .table(VariableSnapshotHistory::Table)
                    .col(VariableSnapshotHistory::HistoryReferenceType)
                    .col(VariableSnapshotHistory::HistoryReferenceId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VariableSnapshotHistory::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum VariableSnapshotHistory {
    Table,
    Id,
    VariableSnapshot,
    HistoryReferenceId,
    HistoryReferenceType,
    CreatedBy,
    CreatedOn,
    UpdatedBy,
    UpdatedOn,
}
