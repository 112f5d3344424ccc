use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, DeriveActiveEnum, EnumIter, Deserialize, Serialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageType {
    #[sea_orm(string_value = "PRE_CI")]
    PreCi,
    #[sea_orm(string_value = "POST_CI")]
    PostCi,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "pipeline_stage")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub ci_pipeline_id: i32,
    #[sea_orm(column_name = "type")]
    pub stage_type: StageType,
    pub deleted: bool,
    pub created_by: i32,
    pub created_on: NaiveDateTime,
    pub updated_by: i32,
    pub updated_on: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ci_pipeline::Entity",
        from = "Column::CiPipelineId",
        to = "super::ci_pipeline::Column::Id"
    )]
    CiPipeline,
}

impl ActiveModelBehavior for ActiveModel {}
