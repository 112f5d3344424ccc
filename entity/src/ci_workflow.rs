use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, DeriveActiveEnum, EnumIter, Deserialize, Serialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum CiWorkflowStatus {
    #[sea_orm(string_value = "Starting")]
    Starting,
    #[sea_orm(string_value = "Running")]
    Running,
    #[sea_orm(string_value = "Succeeded")]
    Succeeded,
    #[sea_orm(string_value = "Failed")]
    Failed,
    #[sea_orm(string_value = "Aborted")]
    Aborted,
}

impl CiWorkflowStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CiWorkflowStatus::Succeeded | CiWorkflowStatus::Failed | CiWorkflowStatus::Aborted
        )
    }

    pub fn non_terminal() -> Vec<CiWorkflowStatus> {
        vec![CiWorkflowStatus::Starting, CiWorkflowStatus::Running]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, DeriveActiveEnum, EnumIter, Deserialize, Serialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum ArtifactUploadStatus {
    #[sea_orm(string_value = "Uploaded")]
    Uploaded,
    #[sea_orm(string_value = "NotUploaded")]
    NotUploaded,
    #[sea_orm(string_value = "NA")]
    #[serde(rename = "NA")]
    NotApplicable,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "ci_workflow")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub ci_pipeline_id: i32,
    pub status: CiWorkflowStatus,
    pub pod_status: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub started_on: NaiveDateTime,
    pub finished_on: Option<NaiveDateTime>,
    #[sea_orm(column_type = "Text")]
    pub git_triggers: String,
    pub triggered_by: i32,
    #[sea_orm(column_type = "Text")]
    pub image_path_reservation_ids: String,
    pub ref_ci_workflow_id: Option<i32>,
    pub parent_ci_workflow_id: Option<i32>,
    pub is_artifact_uploaded: ArtifactUploadStatus,
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
