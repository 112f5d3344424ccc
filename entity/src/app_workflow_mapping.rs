use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, DeriveActiveEnum, EnumIter, Deserialize, Serialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum ComponentKind {
    #[sea_orm(string_value = "CI_PIPELINE")]
    #[serde(rename = "CI_PIPELINE")]
    CiPipeline,
    #[sea_orm(string_value = "CD_PIPELINE")]
    #[serde(rename = "CD_PIPELINE")]
    CdPipeline,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "app_workflow_mapping")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub app_workflow_id: i32,
    pub component_id: i32,
    #[sea_orm(column_name = "type")]
    pub component_kind: ComponentKind,
    pub parent_id: Option<i32>,
    pub parent_type: Option<ComponentKind>,
    pub active: bool,
    pub created_by: i32,
    pub created_on: NaiveDateTime,
    pub updated_by: i32,
    pub updated_on: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::app_workflow::Entity",
        from = "Column::AppWorkflowId",
        to = "super::app_workflow::Column::Id"
    )]
    AppWorkflow,
}

impl ActiveModelBehavior for ActiveModel {}
