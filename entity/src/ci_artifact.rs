use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use chrono::NaiveDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "ci_artifact")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub ci_workflow_id: Option<i32>,
    pub external_ci_pipeline_id: Option<i32>,
    pub image: String,
    pub image_digest: String,
    pub scanned: bool,
    pub parent_ci_artifact: Option<i32>,
    pub created_by: i32,
    pub created_on: NaiveDateTime,
    pub updated_by: i32,
    pub updated_on: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ci_workflow::Entity",
        from = "Column::CiWorkflowId",
        to = "super::ci_workflow::Column::Id"
    )]
    CiWorkflow,
}

impl ActiveModelBehavior for ActiveModel {}
