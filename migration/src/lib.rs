/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_table_app;
mod m20250301_000002_create_table_environment;
mod m20250301_000003_create_table_git_material;
mod m20250301_000004_create_table_app_workflow;
mod m20250301_000005_create_table_app_workflow_mapping;
mod m20250301_000006_create_table_ci_pipeline;
mod m20250301_000007_create_table_ci_pipeline_material;
mod m20250301_000008_create_table_plugin_metadata;
mod m20250301_000009_create_table_pipeline_stage;
mod m20250301_000010_create_table_pipeline_stage_step;
mod m20250301_000011_create_table_pipeline;
mod m20250301_000012_create_table_ci_workflow;
mod m20250301_000013_create_table_ci_artifact;
mod m20250301_000014_create_table_cd_workflow;
mod m20250301_000015_create_table_cd_workflow_runner;
mod m20250301_000016_create_table_pipeline_status_timeline;
mod m20250301_000017_create_table_cd_workflow_status_latest;
mod m20250301_000018_create_table_ci_workflow_status_latest;
mod m20250301_000019_create_table_variable_definition;
mod m20250301_000020_create_table_variable_scope;
mod m20250301_000021_create_table_variable_data;
mod m20250301_000022_create_table_variable_entity_mapping;
mod m20250301_000023_create_table_variable_snapshot_history;
mod m20250301_000024_create_table_config_map_app_level;
mod m20250301_000025_create_table_config_map_env_level;
mod m20250301_000026_create_table_deployment_template_history;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_table_app::Migration),
            Box::new(m20250301_000002_create_table_environment::Migration),
            Box::new(m20250301_000003_create_table_git_material::Migration),
            Box::new(m20250301_000004_create_table_app_workflow::Migration),
            Box::new(m20250301_000005_create_table_app_workflow_mapping::Migration),
            Box::new(m20250301_000006_create_table_ci_pipeline::Migration),
            Box::new(m20250301_000007_create_table_ci_pipeline_material::Migration),
            Box::new(m20250301_000008_create_table_plugin_metadata::Migration),
            Box::new(m20250301_000009_create_table_pipeline_stage::Migration),
            Box::new(m20250301_000010_create_table_pipeline_stage_step::Migration),
            Box::new(m20250301_000011_create_table_pipeline::Migration),
            Box::new(m20250301_000012_create_table_ci_workflow::Migration),
            Box::new(m20250301_000013_create_table_ci_artifact::Migration),
            Box::new(m20250301_000014_create_table_cd_workflow::Migration),
            Box::new(m20250301_000015_create_table_cd_workflow_runner::Migration),
            Box::new(m20250301_000016_create_table_pipeline_status_timeline::Migration),
            Box::new(m20250301_000017_create_table_cd_workflow_status_latest::Migration),
            Box::new(m20250301_000018_create_table_ci_workflow_status_latest::Migration),
            Box::new(m20250301_000019_create_table_variable_definition::Migration),
            Box::new(m20250301_000020_create_table_variable_scope::Migration),
            Box::new(m20250301_000021_create_table_variable_data::Migration),
            Box::new(m20250301_000022_create_table_variable_entity_mapping::Migration),
            Box::new(m20250301_000023_create_table_variable_snapshot_history::Migration),
            Box::new(m20250301_000024_create_table_config_map_app_level::Migration),
            Box::new(m20250301_000025_create_table_config_map_env_level::Migration),
            Box::new(m20250301_000026_create_table_deployment_template_history::Migration),
        ]
    }
}
