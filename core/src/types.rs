/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::adapters::{ArgoAdapter, Authorizer, Executor, HelmAdapter};
use super::input::{cron_expression, greater_than_zero};
use super::variables::TemplateParser;
use clap::Parser;
use entity::*;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

#[derive(Parser, Debug, Clone)]
#[command(name = "Cadence", display_name = "Cadence", bin_name = "cadence-server", author = "Wavelens", version, about, long_about = None)]
pub struct Cli {
    #[arg(long, env = "CADENCE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
    #[arg(long, env = "CADENCE_LOG_JSON", default_value = "false")]
    pub log_json: bool,
    #[arg(long, env = "CADENCE_DATABASE_URL")]
    pub database_url: Option<String>,
    #[arg(long, env = "CADENCE_DATABASE_URL_FILE")]
    pub database_url_file: Option<String>,
    #[arg(long, env = "CADENCE_NATS_URL")]
    pub nats_url: Option<String>,
    #[arg(long, env = "CADENCE_EXECUTOR_URL")]
    pub executor_url: Option<String>,
    #[arg(long, env = "CADENCE_HELM_URL")]
    pub helm_url: Option<String>,
    #[arg(long, env = "CADENCE_ARGO_URL")]
    pub argo_url: Option<String>,
    #[arg(long, env = "CADENCE_AUTHZ_URL")]
    pub authz_url: Option<String>,
    #[arg(long, env = "AUTO_CD_TRIGGER_ACK_WAIT_IN_SECS", value_parser = greater_than_zero::<u64>, default_value = "150")]
    pub auto_cd_trigger_ack_wait_in_secs: u64,
    #[arg(long, env = "CD_PIPELINE_STATUS_CRON_TIME", value_parser = cron_expression, default_value = "*/2 * * * *")]
    pub cd_pipeline_status_cron_time: String,
    #[arg(long, env = "PIPELINE_DEGRADED_TIME", value_parser = greater_than_zero::<i64>, default_value = "10")]
    pub pipeline_degraded_time: i64,
    #[arg(long, env = "CI_PIPELINE_STATUS_CRON_TIME", value_parser = cron_expression, default_value = "*/2 * * * *")]
    pub ci_pipeline_status_cron_time: String,
    #[arg(long, env = "PIPELINE_FAILED_TIME", value_parser = greater_than_zero::<i64>, default_value = "10")]
    pub pipeline_failed_time: i64,
    #[arg(long, env = "CI_TRIGGER_CRON_TIME", value_parser = greater_than_zero::<u32>, default_value = "2")]
    pub ci_trigger_cron_time: u32,
    #[arg(
        long,
        env = "PLUGIN_NAME",
        default_value = "Pull images from container repository"
    )]
    pub plugin_name: String,
    #[arg(long, env = "DEPLOYED_WITHIN_HOURS", value_parser = greater_than_zero::<i64>, default_value = "12")]
    pub deployed_within_hours: i64,
    #[arg(long, env = "VARIABLE_EXPRESSION_REGEX", default_value = r"@\{\{([^}]+)\}\}")]
    pub variable_expression_regex: String,
    #[arg(long, env = "CADENCE_REPORT_ERRORS", default_value = "false")]
    pub report_errors: bool,
    #[arg(long, env = "CADENCE_SENTRY_DSN")]
    pub sentry_dsn: Option<String>,
}

pub struct ServerState {
    pub db: DatabaseConnection,
    pub cli: Cli,
    pub parser: Arc<dyn TemplateParser>,
    pub executor: Arc<dyn Executor>,
    pub helm: Arc<dyn HelmAdapter>,
    pub argo: Arc<dyn ArgoAdapter>,
    pub authz: Arc<dyn Authorizer>,
}

pub type EApp = app::Entity;
pub type EAppWorkflow = app_workflow::Entity;
pub type EAppWorkflowMapping = app_workflow_mapping::Entity;
pub type ECdWorkflow = cd_workflow::Entity;
pub type ECdWorkflowRunner = cd_workflow_runner::Entity;
pub type ECdWorkflowStatusLatest = cd_workflow_status_latest::Entity;
pub type ECiArtifact = ci_artifact::Entity;
pub type ECiPipeline = ci_pipeline::Entity;
pub type ECiPipelineMaterial = ci_pipeline_material::Entity;
pub type ECiWorkflow = ci_workflow::Entity;
pub type ECiWorkflowStatusLatest = ci_workflow_status_latest::Entity;
pub type EConfigMapAppLevel = config_map_app_level::Entity;
pub type EConfigMapEnvLevel = config_map_env_level::Entity;
pub type EDeploymentTemplateHistory = deployment_template_history::Entity;
pub type EEnvironment = environment::Entity;
pub type EGitMaterial = git_material::Entity;
pub type EPipeline = pipeline::Entity;
pub type EPipelineStage = pipeline_stage::Entity;
pub type EPipelineStageStep = pipeline_stage_step::Entity;
pub type EPipelineStatusTimeline = pipeline_status_timeline::Entity;
pub type EPluginMetadata = plugin_metadata::Entity;
pub type EVariableData = variable_data::Entity;
pub type EVariableDefinition = variable_definition::Entity;
pub type EVariableEntityMapping = variable_entity_mapping::Entity;
pub type EVariableScope = variable_scope::Entity;
pub type EVariableSnapshotHistory = variable_snapshot_history::Entity;

pub type MApp = app::Model;
pub type MAppWorkflow = app_workflow::Model;
pub type MAppWorkflowMapping = app_workflow_mapping::Model;
pub type MCdWorkflow = cd_workflow::Model;
pub type MCdWorkflowRunner = cd_workflow_runner::Model;
pub type MCdWorkflowStatusLatest = cd_workflow_status_latest::Model;
pub type MCiArtifact = ci_artifact::Model;
pub type MCiPipeline = ci_pipeline::Model;
pub type MCiPipelineMaterial = ci_pipeline_material::Model;
pub type MCiWorkflow = ci_workflow::Model;
pub type MCiWorkflowStatusLatest = ci_workflow_status_latest::Model;
pub type MConfigMapAppLevel = config_map_app_level::Model;
pub type MConfigMapEnvLevel = config_map_env_level::Model;
pub type MDeploymentTemplateHistory = deployment_template_history::Model;
pub type MEnvironment = environment::Model;
pub type MGitMaterial = git_material::Model;
pub type MPipeline = pipeline::Model;
pub type MPipelineStage = pipeline_stage::Model;
pub type MPipelineStageStep = pipeline_stage_step::Model;
pub type MPipelineStatusTimeline = pipeline_status_timeline::Model;
pub type MPluginMetadata = plugin_metadata::Model;
pub type MVariableData = variable_data::Model;
pub type MVariableDefinition = variable_definition::Model;
pub type MVariableEntityMapping = variable_entity_mapping::Model;
pub type MVariableScope = variable_scope::Model;
pub type MVariableSnapshotHistory = variable_snapshot_history::Model;

pub type AApp = app::ActiveModel;
pub type AAppWorkflow = app_workflow::ActiveModel;
pub type AAppWorkflowMapping = app_workflow_mapping::ActiveModel;
pub type ACdWorkflow = cd_workflow::ActiveModel;
pub type ACdWorkflowRunner = cd_workflow_runner::ActiveModel;
pub type ACdWorkflowStatusLatest = cd_workflow_status_latest::ActiveModel;
pub type ACiArtifact = ci_artifact::ActiveModel;
pub type ACiPipeline = ci_pipeline::ActiveModel;
pub type ACiPipelineMaterial = ci_pipeline_material::ActiveModel;
pub type ACiWorkflow = ci_workflow::ActiveModel;
pub type ACiWorkflowStatusLatest = ci_workflow_status_latest::ActiveModel;
pub type AConfigMapAppLevel = config_map_app_level::ActiveModel;
pub type AConfigMapEnvLevel = config_map_env_level::ActiveModel;
pub type ADeploymentTemplateHistory = deployment_template_history::ActiveModel;
pub type AEnvironment = environment::ActiveModel;
pub type AGitMaterial = git_material::ActiveModel;
pub type APipeline = pipeline::ActiveModel;
pub type APipelineStage = pipeline_stage::ActiveModel;
pub type APipelineStageStep = pipeline_stage_step::ActiveModel;
pub type APipelineStatusTimeline = pipeline_status_timeline::ActiveModel;
pub type APluginMetadata = plugin_metadata::ActiveModel;
pub type AVariableData = variable_data::ActiveModel;
pub type AVariableDefinition = variable_definition::ActiveModel;
pub type AVariableEntityMapping = variable_entity_mapping::ActiveModel;
pub type AVariableScope = variable_scope::ActiveModel;
pub type AVariableSnapshotHistory = variable_snapshot_history::ActiveModel;

pub type CApp = app::Column;
pub type CAppWorkflow = app_workflow::Column;
pub type CAppWorkflowMapping = app_workflow_mapping::Column;
pub type CCdWorkflow = cd_workflow::Column;
pub type CCdWorkflowRunner = cd_workflow_runner::Column;
pub type CCdWorkflowStatusLatest = cd_workflow_status_latest::Column;
pub type CCiArtifact = ci_artifact::Column;
pub type CCiPipeline = ci_pipeline::Column;
pub type CCiPipelineMaterial = ci_pipeline_material::Column;
pub type CCiWorkflow = ci_workflow::Column;
pub type CCiWorkflowStatusLatest = ci_workflow_status_latest::Column;
pub type CConfigMapAppLevel = config_map_app_level::Column;
pub type CConfigMapEnvLevel = config_map_env_level::Column;
pub type CDeploymentTemplateHistory = deployment_template_history::Column;
pub type CEnvironment = environment::Column;
pub type CGitMaterial = git_material::Column;
pub type CPipeline = pipeline::Column;
pub type CPipelineStage = pipeline_stage::Column;
pub type CPipelineStageStep = pipeline_stage_step::Column;
pub type CPipelineStatusTimeline = pipeline_status_timeline::Column;
pub type CPluginMetadata = plugin_metadata::Column;
pub type CVariableData = variable_data::Column;
pub type CVariableDefinition = variable_definition::Column;
pub type CVariableEntityMapping = variable_entity_mapping::Column;
pub type CVariableScope = variable_scope::Column;
pub type CVariableSnapshotHistory = variable_snapshot_history::Column;

pub type RCdWorkflow = cd_workflow::Relation;
pub type RCdWorkflowRunner = cd_workflow_runner::Relation;
pub type RCiWorkflow = ci_workflow::Relation;
pub type RPipeline = pipeline::Relation;
pub type RPipelineStage = pipeline_stage::Relation;
pub type RPipelineStageStep = pipeline_stage_step::Relation;
pub type RVariableScope = variable_scope::Relation;
pub type RVariableData = variable_data::Relation;
