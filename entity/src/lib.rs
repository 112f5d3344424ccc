pub mod app;
pub mod app_workflow;
pub mod app_workflow_mapping;
pub mod cd_workflow;
pub mod cd_workflow_runner;
pub mod cd_workflow_status_latest;
pub mod ci_artifact;
pub mod ci_pipeline;
pub mod ci_pipeline_material;
pub mod ci_workflow;
pub mod ci_workflow_status_latest;
pub mod config_map_app_level;
pub mod config_map_env_level;
pub mod deployment_template_history;
pub mod environment;
pub mod git_material;
pub mod pipeline;
pub mod pipeline_stage;
pub mod pipeline_stage_step;
pub mod pipeline_status_timeline;
pub mod plugin_metadata;
pub mod variable_data;
pub mod variable_definition;
pub mod variable_entity_mapping;
pub mod variable_scope;
pub mod variable_snapshot_history;
