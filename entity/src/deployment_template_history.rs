use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use chrono::NaiveDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "deployment_template_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub cd_workflow_runner_id: i32,
    /// Merged config maps before variable resolution.
    #[sea_orm(column_type = "Text")]
    pub config_map_data: String,
    #[sea_orm(column_type = "Text")]
    pub secret_data: String,
    #[sea_orm(column_type = "Text")]
    pub stage_config: String,
    pub created_by: i32,
    pub created_on: NaiveDateTime,
    pub updated_by: i32,
    pub updated_on: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cd_workflow_runner::Entity",
        from = "Column::CdWorkflowRunnerId",
        to = "super::cd_workflow_runner::Column::Id"
    )]
    CdWorkflowRunner,
}

impl ActiveModelBehavior for ActiveModel {}
