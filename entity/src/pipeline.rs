use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, DeriveActiveEnum, EnumIter, Deserialize, Serialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriggerType {
    #[sea_orm(string_value = "AUTOMATIC")]
    Automatic,
    #[sea_orm(string_value = "MANUAL")]
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentAppType {
    Helm,
    Argo,
}

impl std::str::FromStr for DeploymentAppType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "helm" => Ok(DeploymentAppType::Helm),
            "argo" | "argo_cd" => Ok(DeploymentAppType::Argo),
            _ => Err(format!("Unsupported deployment app type: {}", s)),
        }
    }
}

impl DeploymentAppType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentAppType::Helm => "helm",
            DeploymentAppType::Argo => "argo",
        }
    }
}

/// A CD pipeline. Stored in the `pipeline` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "pipeline")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub app_id: i32,
    pub ci_pipeline_id: i32,
    pub environment_id: i32,
    pub pipeline_name: String,
    pub trigger_type: TriggerType,
    pub pre_trigger_type: TriggerType,
    pub post_trigger_type: TriggerType,
    #[sea_orm(column_type = "Text")]
    pub pre_stage_config: String,
    #[sea_orm(column_type = "Text")]
    pub post_stage_config: String,
    pub run_pre_stage_in_env: bool,
    pub run_post_stage_in_env: bool,
    pub deployment_app_type: String,
    pub deployment_app_created: bool,
    pub deleted: bool,
    pub created_by: i32,
    pub created_on: NaiveDateTime,
    pub updated_by: i32,
    pub updated_on: NaiveDateTime,
}

impl Model {
    pub fn has_pre_stage(&self) -> bool {
        !self.pre_stage_config.trim().is_empty()
    }

    pub fn has_post_stage(&self) -> bool {
        !self.post_stage_config.trim().is_empty()
    }

    pub fn app_type(&self) -> Option<DeploymentAppType> {
        self.deployment_app_type.parse().ok()
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
    #[sea_orm(
        belongs_to = "super::environment::Entity",
        from = "Column::EnvironmentId",
        to = "super::environment::Column::Id"
    )]
    Environment,
}

impl ActiveModelBehavior for ActiveModel {}
