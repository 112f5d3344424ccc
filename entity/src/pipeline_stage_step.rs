use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use chrono::NaiveDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "pipeline_stage_step")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub pipeline_stage_id: i32,
    pub name: String,
    pub ref_plugin_id: Option<i32>,
    pub deleted: bool,
    pub created_by: i32,
    pub created_on: NaiveDateTime,
    pub updated_by: i32,
    pub updated_on: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pipeline_stage::Entity",
        from = "Column::PipelineStageId",
        to = "super::pipeline_stage::Column::Id"
    )]
    PipelineStage,
    #[sea_orm(
        belongs_to = "super::plugin_metadata::Entity",
        from = "Column::RefPluginId",
        to = "super::plugin_metadata::Column::Id"
    )]
    PluginMetadata,
}

impl ActiveModelBehavior for ActiveModel {}
