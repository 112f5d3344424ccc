use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use chrono::NaiveDateTime;

/// Nodes of a workflow as stored in `workflow_dag`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDag {
    #[serde(default)]
    pub ci_pipelines: Vec<i32>,
    #[serde(default)]
    pub cd_pipelines: Vec<i32>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "app_workflow")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub app_id: i32,
    #[sea_orm(column_type = "Text")]
    pub workflow_dag: String,
    pub active: bool,
    pub created_by: i32,
    pub created_on: NaiveDateTime,
    pub updated_by: i32,
    pub updated_on: NaiveDateTime,
}

impl Model {
    pub fn dag(&self) -> Result<WorkflowDag, serde_json::Error> {
        if self.workflow_dag.trim().is_empty() {
            return Ok(WorkflowDag::default());
        }

        serde_json::from_str(&self.workflow_dag)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::app::Entity",
        from = "Column::AppId",
        to = "super::app::Column::Id"
    )]
    App,
}

impl ActiveModelBehavior for ActiveModel {}
