use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, DeriveActiveEnum, EnumIter, Deserialize, Serialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    #[sea_orm(string_value = "CI_STAGE_CONFIG")]
    CiStageConfig,
    #[sea_orm(string_value = "CD_PRE_STAGE_CONFIG")]
    CdPreStageConfig,
    #[sea_orm(string_value = "CD_POST_STAGE_CONFIG")]
    CdPostStageConfig,
    #[sea_orm(string_value = "CONFIG_MAP")]
    ConfigMap,
    #[sea_orm(string_value = "SECRET")]
    Secret,
    #[sea_orm(string_value = "DEPLOYMENT_TEMPLATE")]
    DeploymentTemplate,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "variable_entity_mapping")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub variable_name: String,
    pub entity_type: EntityType,
    pub entity_id: i32,
    pub is_deleted: bool,
    pub created_by: i32,
    pub created_on: NaiveDateTime,
    pub updated_by: i32,
    pub updated_on: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
