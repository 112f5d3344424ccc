use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use chrono::NaiveDateTime;

/// Lower values take precedence when several scopes match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, DeriveActiveEnum, EnumIter, Deserialize, Serialize)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum Qualifier {
    #[sea_orm(num_value = 1)]
    AppAndEnv,
    #[sea_orm(num_value = 2)]
    App,
    #[sea_orm(num_value = 3)]
    Env,
    #[sea_orm(num_value = 4)]
    Cluster,
    #[sea_orm(num_value = 5)]
    Global,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "variable_scope")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub variable_definition_id: i32,
    pub qualifier_id: Qualifier,
    pub app_id: Option<i32>,
    pub env_id: Option<i32>,
    pub cluster_id: Option<i32>,
    pub active: bool,
    pub created_by: i32,
    pub created_on: NaiveDateTime,
    pub updated_by: i32,
    pub updated_on: NaiveDateTime,
}

impl Model {
    pub fn matches(&self, app_id: Option<i32>, env_id: Option<i32>, cluster_id: Option<i32>) -> bool {
        match self.qualifier_id {
            Qualifier::AppAndEnv => {
                self.app_id.is_some()
                    && self.env_id.is_some()
                    && self.app_id == app_id
                    && self.env_id == env_id
            }
            Qualifier::App => self.app_id.is_some() && self.app_id == app_id,
            Qualifier::Env => self.env_id.is_some() && self.env_id == env_id,
            Qualifier::Cluster => self.cluster_id.is_some() && self.cluster_id == cluster_id,
            Qualifier::Global => true,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::variable_definition::Entity",
        from = "Column::VariableDefinitionId",
        to = "super::variable_definition::Column::Id"
    )]
    VariableDefinition,
}

impl ActiveModelBehavior for ActiveModel {}
