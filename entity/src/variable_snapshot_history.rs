use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, DeriveActiveEnum, EnumIter, Deserialize, Serialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryReferenceType {
    #[sea_orm(string_value = "CI_WORKFLOW")]
    CiWorkflow,
    #[sea_orm(string_value = "CD_WORKFLOW_RUNNER")]
    CdWorkflowRunner,
    #[sea_orm(string_value = "CONFIG_MAP")]
    ConfigMap,
    #[sea_orm(string_value = "SECRET")]
    Secret,
    #[sea_orm(string_value = "DEPLOYMENT_TEMPLATE")]
    DeploymentTemplate,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "variable_snapshot_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "Text")]
    pub variable_snapshot: String,
    pub history_reference_id: i32,
    pub history_reference_type: HistoryReferenceType,
    pub created_by: i32,
    pub created_on: NaiveDateTime,
    pub updated_by: i32,
    pub updated_on: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
