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
                    .table(DeploymentTemplateHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DeploymentTemplateHistory::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DeploymentTemplateHistory::CdWorkflowRunnerId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DeploymentTemplateHistory::ConfigMapData).text().not_null())
                    .col(ColumnDef::new(DeploymentTemplateHistory::SecretData).text().not_null())
                    .col(ColumnDef::new(DeploymentTemplateHistory::StageConfig).text().not_null())
                    .col(ColumnDef::new(DeploymentTemplateHistory::CreatedBy).integer().not_null())
                    .col(ColumnDef::new(DeploymentTemplateHistory::CreatedOn).date_time().not_null())
                    .col(ColumnDef::new(DeploymentTemplateHistory::UpdatedBy).integer().not_null())
                    .col(ColumnDef::new(DeploymentTemplateHistory::UpdatedOn).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-deployment_template_history-cd_workflow_runner_id")
                            .from(DeploymentTemplateHistory::Table, DeploymentTemplateHistory::CdWorkflowRunnerId)
                            .to(CdWorkflowRunner::Table, CdWorkflowRunner::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-deployment_template_history-runner")
                    .table(DeploymentTemplateHistory::Table)
                    .col(DeploymentTemplateHistory::CdWorkflowRunnerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DeploymentTemplateHistory::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum DeploymentTemplateHistory {
    Table,
    Id,
    CdWorkflowRunnerId,
    ConfigMapData,
    SecretData,
    StageConfig,
    CreatedBy,
    CreatedOn,
    UpdatedBy,
    UpdatedOn,
}

#[derive(DeriveIden)]
enum CdWorkflowRunner {
    Table,
    Id,
}
