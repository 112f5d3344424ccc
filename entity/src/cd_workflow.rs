use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, DeriveActiveEnum, EnumIter, Deserialize, Serialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStatus {
    #[sea_orm(string_value = "WF_UNKNOWN")]
    WfUnknown,
    #[sea_orm(string_value = "REQUEST_ACCEPTED")]
    RequestAccepted,
    #[sea_orm(string_value = "ENQUEUED")]
    Enqueued,
    #[sea_orm(string_value = "QUE_ERROR")]
    QueError,
    #[sea_orm(string_value = "WF_STARTED")]
    WfStarted,
    #[sea_orm(string_value = "DROPPED_STALE")]
    DroppedStale,
    #[sea_orm(string_value = "DEQUE_ERROR")]
    DequeError,
    #[sea_orm(string_value = "TRIGGER_ERROR")]
    TriggerError,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "cd_workflow")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub pipeline_id: i32,
    pub ci_artifact_id: i32,
    pub workflow_status: WorkflowStatus,
    pub created_by: i32,
    pub created_on: NaiveDateTime,
    pub updated_by: i32,
    pub updated_on: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pipeline::Entity",
        from = "Column::PipelineId",
        to = "super::pipeline::Column::Id"
    )]
    Pipeline,
    #[sea_orm(
        belongs_to = "super::ci_artifact::Entity",
        from = "Column::CiArtifactId",
        to = "super::ci_artifact::Column::Id"
    )]
    CiArtifact,
}

impl ActiveModelBehavior for ActiveModel {}
