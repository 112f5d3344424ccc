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
                    .table(GitMaterial::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GitMaterial::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GitMaterial::AppId).integer().not_null())
                    .col(ColumnDef::new(GitMaterial::GitProviderId).integer().not_null())
                    .col(ColumnDef::new(GitMaterial::Url).string().not_null())
                    .col(ColumnDef::new(GitMaterial::CheckoutPath).string().not_null())
                    .col(ColumnDef::new(GitMaterial::FetchSubmodules).boolean().not_null())
                    .col(ColumnDef::new(GitMaterial::Active).boolean().not_null())
                    .col(ColumnDef::new(GitMaterial::CreatedBy).integer().not_null())
                    .col(ColumnDef::new(GitMaterial::CreatedOn).date_time().not_null())
                    .col(ColumnDef::new(GitMaterial::UpdatedBy).integer().not_null())
                    .col(ColumnDef::new(GitMaterial::UpdatedOn).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-git_material-app_id")
                            .from(GitMaterial::Table, GitMaterial::AppId)
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
            .drop_table(Table::drop().table(GitMaterial::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum GitMaterial {
    Table,
    Id,
    AppId,
    GitProviderId,
    Url,
    CheckoutPath,
    FetchSubmodules,
    Active,
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
