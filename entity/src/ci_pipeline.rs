use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, DeriveActiveEnum, EnumIter, Deserialize, Serialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CiPipelineType {
    #[sea_orm(string_value = "CI_BUILD")]
    CiBuild,
    #[sea_orm(string_value = "LINKED")]
    Linked,
    #[sea_orm(string_value = "EXTERNAL")]
    External,
    #[sea_orm(string_value = "CI_JOB")]
    CiJob,
    #[sea_orm(string_value = "LINKED_CD")]
    LinkedCd,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "ci_pipeline")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub app_id: i32,
    pub name: String,
    pub manual: bool,
    pub external: bool,
    pub parent_ci_pipeline: Option<i32>,
    pub ci_pipeline_type: CiPipelineType,
    pub scan_enabled: bool,
    pub auto_abort_previous_builds: bool,
    pub active: bool,
    pub deleted: bool,
    pub created_by: i32,
    pub created_on: NaiveDateTime,
    pub updated_by: i32,
    pub updated_on: NaiveDateTime,
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
