use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, DeriveActiveEnum, EnumIter, Deserialize, Serialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceType {
    #[sea_orm(string_value = "SOURCE_TYPE_BRANCH_FIXED")]
    BranchFixed,
    #[sea_orm(string_value = "SOURCE_TYPE_BRANCH_REGEX")]
    BranchRegex,
    #[sea_orm(string_value = "SOURCE_TYPE_TAG_ANY")]
    TagAny,
    #[sea_orm(string_value = "WEBHOOK")]
    Webhook,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "ci_pipeline_material")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub ci_pipeline_id: i32,
    pub git_material_id: i32,
    #[sea_orm(column_name = "type")]
    pub source_type: SourceType,
    pub value: String,
    pub active: bool,
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
    #[sea_orm(
        belongs_to = "super::git_material::Entity",
        from = "Column::GitMaterialId",
        to = "super::git_material::Column::Id"
    )]
    GitMaterial,
}

impl ActiveModelBehavior for ActiveModel {}
