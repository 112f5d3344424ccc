use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, DeriveActiveEnum, EnumIter, Deserialize, Serialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowType {
    #[sea_orm(string_value = "PRE")]
    Pre,
    #[sea_orm(string_value = "DEPLOY")]
    Deploy,
    #[sea_orm(string_value = "POST")]
    Post,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, DeriveActiveEnum, EnumIter, Deserialize, Serialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutorType {
    #[sea_orm(string_value = "AWF")]
    Awf,
    #[sea_orm(string_value = "SYSTEM")]
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, DeriveActiveEnum, EnumIter, Deserialize, Serialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum RunnerStatus {
    #[sea_orm(string_value = "Initiated")]
    Initiated,
    #[sea_orm(string_value = "Queued")]
    Queued,
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

impl RunnerStatus {
    pub fn in_flight() -> Vec<RunnerStatus> {
        vec![
            RunnerStatus::Initiated,
            RunnerStatus::Starting,
            RunnerStatus::Running,
        ]
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            RunnerStatus::Initiated | RunnerStatus::Starting | RunnerStatus::Running
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunnerStatus::Succeeded | RunnerStatus::Failed | RunnerStatus::Aborted
        )
    }

    /// Single-step edges of the runner state machine.
    pub fn can_transition_to(&self, next: RunnerStatus) -> bool {
        use RunnerStatus::*;

        matches!(
            (self, next),
            (Initiated, Starting)
                | (Initiated, Failed)
                | (Queued, Initiated)
                | (Queued, Aborted)
                | (Starting, Running)
                | (Starting, Failed)
                | (Running, Succeeded)
                | (Running, Failed)
        )
    }

    /// Steps from `self` to `target` through the executor-driven edges, excluding `self`.
    /// `Queued -> Initiated` belongs to the scheduler and is never part of a path.
    pub fn path_to(&self, target: RunnerStatus) -> Option<Vec<RunnerStatus>> {
        use RunnerStatus::*;

        if *self == target || *self == Queued {
            return None;
        }

        if self.can_transition_to(target) {
            return Some(vec![target]);
        }

        let forward = [Initiated, Starting, Running];
        let start = forward.iter().position(|s| s == self)?;
        let mut path = Vec::new();

        for step in forward.iter().skip(start + 1) {
            path.push(*step);
            if step.can_transition_to(target) || *step == target {
                if *step != target {
                    path.push(target);
                }
                return Some(path);
            }
        }

        None
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "cd_workflow_runner")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub cd_workflow_id: i32,
    pub workflow_type: WorkflowType,
    pub executor_type: ExecutorType,
    pub status: RunnerStatus,
    pub pod_status: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub started_on: NaiveDateTime,
    pub finished_on: Option<NaiveDateTime>,
    pub triggered_by: i32,
    pub ref_cd_workflow_runner_id: Option<i32>,
    #[sea_orm(column_type = "Text")]
    pub image_path_reservation_ids: String,
    pub reference_id: Option<String>,
    pub created_by: i32,
    pub created_on: NaiveDateTime,
    pub updated_by: i32,
    pub updated_on: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cd_workflow::Entity",
        from = "Column::CdWorkflowId",
        to = "super::cd_workflow::Column::Id"
    )]
    CdWorkflow,
}

impl ActiveModelBehavior for ActiveModel {}
