use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, DeriveActiveEnum, EnumIter, Deserialize, Serialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimelineStatus {
    #[sea_orm(string_value = "DEPLOYMENT_INITIATED")]
    DeploymentInitiated,
    #[sea_orm(string_value = "GIT_COMMIT")]
    GitCommit,
    #[sea_orm(string_value = "GIT_COMMIT_FAILED")]
    GitCommitFailed,
    #[sea_orm(string_value = "KUBECTL_APPLY_STARTED")]
    KubectlApplyStarted,
    #[sea_orm(string_value = "KUBECTL_APPLY_SYNCED")]
    KubectlApplySynced,
    #[sea_orm(string_value = "HEALTHY")]
    Healthy,
    #[sea_orm(string_value = "DEGRADED")]
    Degraded,
    #[sea_orm(string_value = "FAILED")]
    Failed,
    #[sea_orm(string_value = "DEPLOYMENT_SUPERSEDED")]
    DeploymentSuperseded,
}

impl TimelineStatus {
    pub fn terminal() -> Vec<TimelineStatus> {
        vec![
            TimelineStatus::Healthy,
            TimelineStatus::Degraded,
            TimelineStatus::Failed,
            TimelineStatus::GitCommitFailed,
        ]
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TimelineStatus::Healthy
                | TimelineStatus::Degraded
                | TimelineStatus::Failed
                | TimelineStatus::GitCommitFailed
        )
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "pipeline_status_timeline")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub cd_workflow_runner_id: i32,
    pub status: TimelineStatus,
    #[sea_orm(column_type = "Text")]
    pub status_detail: String,
    pub status_time: NaiveDateTime,
    pub created_by: i32,
    pub created_on: NaiveDateTime,
    pub updated_by: i32,
    pub updated_on: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cd_workflow_runner::Entity",
        from = "Column::CdWorkflowRunnerId",
        to = "super::cd_workflow_runner::Column::Id"
    )]
    CdWorkflowRunner,
}

impl ActiveModelBehavior for ActiveModel {}
