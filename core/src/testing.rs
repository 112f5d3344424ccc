/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! In-memory SQLite state and scripted adapters for integration tests.

use async_trait::async_trait;
use chrono::Duration;
use clap::Parser;
use entity::app_workflow_mapping::ComponentKind;
use entity::ci_pipeline::CiPipelineType;
use entity::pipeline::TriggerType;
use migration::Migrator;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, IntoActiveModel,
};
use sea_orm_migration::MigratorTrait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;

use super::adapters::*;
use super::database::app::{NewApp, NewEnvironment, create_app, create_environment};
use super::database::artifact::{NewArtifact, create_artifact};
use super::database::cd_pipeline::{NewCdPipeline, create_cd_pipeline};
use super::database::ci_pipeline::{NewCiPipeline, create_ci_pipeline};
use super::database::ci_workflow::{NewCiWorkflow, create_ci_workflow};
use super::database::workflow::{NewMapping, create_mapping, create_workflow};
use super::database::{Audit, now};
use super::error::{CoreError, CoreResult};
use super::types::*;
use super::variables::RegexParser;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Accepts every submission and remembers it, unless told to reject or hold.
#[derive(Default)]
pub struct RecordingExecutor {
    submitted: Mutex<Vec<WorkflowTemplate>>,
    rejection: Mutex<Option<String>>,
    held: AtomicBool,
    released: Notify,
}

impl RecordingExecutor {
    pub fn reject_with(&self, message: &str) {
        *lock(&self.rejection) = Some(message.to_string());
    }

    pub fn accept(&self) {
        *lock(&self.rejection) = None;
    }

    /// Submissions wait until `release` is called.
    pub fn hold(&self) {
        self.held.store(true, Ordering::SeqCst);
    }

    pub fn release(&self) {
        self.held.store(false, Ordering::SeqCst);
        self.released.notify_waiters();
    }

    pub fn submitted(&self) -> Vec<WorkflowTemplate> {
        lock(&self.submitted).clone()
    }
}

#[async_trait]
impl Executor for RecordingExecutor {
    async fn submit(&self, template: &WorkflowTemplate) -> CoreResult<String> {
        loop {
            let released = self.released.notified();
            if !self.held.load(Ordering::SeqCst) {
                break;
            }
            released.await;
        }

        if let Some(message) = lock(&self.rejection).clone() {
            return Err(CoreError::PreconditionFailed(message));
        }
        lock(&self.submitted).push(template.clone());
        Ok(template.name.clone())
    }
}

/// Returns the status scripted per app name; unscripted apps are `Progressing`.
#[derive(Default)]
pub struct ScriptedHelm {
    statuses: Mutex<HashMap<String, HelmHealth>>,
}

impl ScriptedHelm {
    pub fn set(&self, app_name: &str, health: HelmHealth) {
        lock(&self.statuses).insert(app_name.to_string(), health);
    }
}

#[async_trait]
impl HelmAdapter for ScriptedHelm {
    async fn get_status(&self, app_name: &str, _environment_id: i32) -> CoreResult<HelmStatus> {
        let health = lock(&self.statuses)
            .get(app_name)
            .copied()
            .unwrap_or(HelmHealth::Progressing);
        Ok(HelmStatus {
            health,
            last_revision_time: Some(now()),
        })
    }
}

#[derive(Default)]
pub struct ScriptedArgo {
    statuses: Mutex<HashMap<String, ArgoStatus>>,
}

impl ScriptedArgo {
    pub fn set(&self, app_name: &str, sync: ArgoSync, health: ArgoHealth) {
        lock(&self.statuses).insert(
            app_name.to_string(),
            ArgoStatus {
                sync,
                health,
                resources: Vec::new(),
            },
        );
    }
}

#[async_trait]
impl ArgoAdapter for ScriptedArgo {
    async fn get_status(&self, app_name: &str) -> CoreResult<ArgoStatus> {
        Ok(lock(&self.statuses)
            .get(app_name)
            .cloned()
            .unwrap_or_else(ArgoStatus::missing))
    }
}

pub struct TestState {
    pub state: Arc<ServerState>,
    pub executor: Arc<RecordingExecutor>,
    pub helm: Arc<ScriptedHelm>,
    pub argo: Arc<ScriptedArgo>,
}

#[derive(Default)]
pub struct TestStateBuilder {
    cli_args: Vec<String>,
    authz: Option<Arc<dyn Authorizer>>,
    argo: Option<Arc<dyn ArgoAdapter>>,
}

impl TestStateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extra command-line arguments, e.g. `["--pipeline-degraded-time", "5"]`.
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cli_args.extend(args.iter().map(|a| a.to_string()));
        self
    }

    pub fn authorizer(mut self, authz: Arc<dyn Authorizer>) -> Self {
        self.authz = Some(authz);
        self
    }

    /// Replaces the scripted Argo adapter, e.g. with a `MockArgoAdapter`.
    pub fn argo(mut self, argo: Arc<dyn ArgoAdapter>) -> Self {
        self.argo = Some(argo);
        self
    }

    pub async fn build(self) -> anyhow::Result<TestState> {
        let mut args = vec!["cadence-server".to_string()];
        args.extend(self.cli_args);
        let cli = Cli::try_parse_from(args)?;

        let db = memory_db().await?;
        let parser = RegexParser::new(&cli.variable_expression_regex)?;

        let executor = Arc::new(RecordingExecutor::default());
        let helm = Arc::new(ScriptedHelm::default());
        let argo = Arc::new(ScriptedArgo::default());

        let state = Arc::new(ServerState {
            db,
            cli,
            parser: Arc::new(parser),
            executor: executor.clone(),
            helm: helm.clone(),
            argo: self.argo.unwrap_or_else(|| argo.clone()),
            authz: self
                .authz
                .unwrap_or_else(|| Arc::new(Unconfigured("authz"))),
        });

        Ok(TestState {
            state,
            executor,
            helm,
            argo,
        })
    }
}

pub async fn test_state() -> anyhow::Result<TestState> {
    TestStateBuilder::new().build().await
}

/// Single-connection in-memory database with every migration applied.
pub async fn memory_db() -> anyhow::Result<DatabaseConnection> {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

#[derive(Debug, Clone)]
pub struct PipelineSeed {
    pub name: String,
    pub trigger_type: TriggerType,
    pub pre_trigger_type: TriggerType,
    pub post_trigger_type: TriggerType,
    pub pre_stage_config: String,
    pub post_stage_config: String,
    pub deployment_app_type: String,
    pub auto_abort_previous_builds: bool,
}

impl Default for PipelineSeed {
    fn default() -> Self {
        PipelineSeed {
            name: "deploy".to_string(),
            trigger_type: TriggerType::Automatic,
            pre_trigger_type: TriggerType::Automatic,
            post_trigger_type: TriggerType::Automatic,
            pre_stage_config: String::new(),
            post_stage_config: String::new(),
            deployment_app_type: "helm".to_string(),
            auto_abort_previous_builds: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Seeded {
    pub app: MApp,
    pub environment: MEnvironment,
    pub ci_pipeline: MCiPipeline,
    pub cd_pipeline: MPipeline,
    pub workflow: MAppWorkflow,
}

/// App, environment, CI pipeline and one CD pipeline under it in a workflow.
pub async fn seed_pipeline(db: &DatabaseConnection, seed: PipelineSeed) -> CoreResult<Seeded> {
    let audit = Audit::by(1);

    let app = create_app(
        db,
        NewApp {
            app_name: format!("app-{}", seed.name),
            team_id: 1,
            app_store: false,
        },
        audit,
    )
    .await?;

    let environment = create_environment(
        db,
        NewEnvironment {
            environment_name: "prod".to_string(),
            cluster_id: 1,
            namespace: "default".to_string(),
        },
        audit,
    )
    .await?;

    let ci_pipeline = create_ci_pipeline(
        db,
        NewCiPipeline {
            app_id: app.id,
            name: format!("{}-build", seed.name),
            manual: false,
            external: false,
            parent_ci_pipeline: None,
            ci_pipeline_type: CiPipelineType::CiBuild,
            scan_enabled: false,
            auto_abort_previous_builds: seed.auto_abort_previous_builds,
        },
        audit,
    )
    .await?;

    let cd_pipeline = create_cd_pipeline(
        db,
        NewCdPipeline {
            app_id: app.id,
            ci_pipeline_id: ci_pipeline.id,
            environment_id: environment.id,
            pipeline_name: seed.name.clone(),
            trigger_type: seed.trigger_type,
            pre_trigger_type: seed.pre_trigger_type,
            post_trigger_type: seed.post_trigger_type,
            pre_stage_config: seed.pre_stage_config,
            post_stage_config: seed.post_stage_config,
            run_pre_stage_in_env: false,
            run_post_stage_in_env: false,
            deployment_app_type: seed.deployment_app_type,
        },
        audit,
    )
    .await?;

    let workflow = create_workflow(db, app.id, format!("{}-wf", seed.name), audit).await?;

    create_mapping(
        db,
        NewMapping {
            workflow_id: workflow.id,
            component_id: ci_pipeline.id,
            component_kind: ComponentKind::CiPipeline,
            parent_id: None,
            parent_kind: None,
        },
        audit,
    )
    .await?;

    create_mapping(
        db,
        NewMapping {
            workflow_id: workflow.id,
            component_id: cd_pipeline.id,
            component_kind: ComponentKind::CdPipeline,
            parent_id: Some(ci_pipeline.id),
            parent_kind: Some(ComponentKind::CiPipeline),
        },
        audit,
    )
    .await?;

    Ok(Seeded {
        app,
        environment,
        ci_pipeline,
        cd_pipeline,
        workflow,
    })
}

/// A CD pipeline mapped under `parent` in the seeded workflow.
pub async fn seed_child_cd(
    db: &DatabaseConnection,
    seeded: &Seeded,
    parent: &MPipeline,
    name: &str,
) -> CoreResult<MPipeline> {
    let audit = Audit::by(1);

    let child = create_cd_pipeline(
        db,
        NewCdPipeline {
            app_id: seeded.app.id,
            ci_pipeline_id: seeded.ci_pipeline.id,
            environment_id: seeded.environment.id,
            pipeline_name: name.to_string(),
            trigger_type: TriggerType::Automatic,
            pre_trigger_type: TriggerType::Automatic,
            post_trigger_type: TriggerType::Automatic,
            pre_stage_config: String::new(),
            post_stage_config: String::new(),
            run_pre_stage_in_env: false,
            run_post_stage_in_env: false,
            deployment_app_type: "helm".to_string(),
        },
        audit,
    )
    .await?;

    create_mapping(
        db,
        NewMapping {
            workflow_id: seeded.workflow.id,
            component_id: child.id,
            component_kind: ComponentKind::CdPipeline,
            parent_id: Some(parent.id),
            parent_kind: Some(ComponentKind::CdPipeline),
        },
        audit,
    )
    .await?;

    Ok(child)
}

/// An artifact built by a CI workflow of `ci_pipeline`.
pub async fn seed_artifact(
    db: &DatabaseConnection,
    seeded: &Seeded,
    image: &str,
) -> CoreResult<MCiArtifact> {
    let audit = Audit::by(1);

    let workflow = create_ci_workflow(
        db,
        NewCiWorkflow {
            ci_pipeline_id: seeded.ci_pipeline.id,
            app_id: seeded.app.id,
            git_triggers: BTreeMap::new(),
            triggered_by: 1,
            ref_ci_workflow_id: None,
            parent_ci_workflow_id: None,
        },
        audit,
    )
    .await?;

    create_artifact(
        db,
        NewArtifact {
            ci_workflow_id: Some(workflow.id),
            image: image.to_string(),
            image_digest: format!("sha256:{}", image),
            ..Default::default()
        },
        audit,
    )
    .await
}

/// An artifact nobody in the seeded chain produced.
pub async fn seed_foreign_artifact(db: &DatabaseConnection) -> CoreResult<MCiArtifact> {
    create_artifact(
        db,
        NewArtifact {
            external_ci_pipeline_id: Some(9999),
            image: "foreign:latest".to_string(),
            image_digest: "sha256:foreign".to_string(),
            ..Default::default()
        },
        Audit::by(1),
    )
    .await
}

/// Moves a runner's `started_on` into the past.
pub async fn backdate_runner(
    db: &DatabaseConnection,
    runner: MCdWorkflowRunner,
    minutes: i64,
) -> CoreResult<MCdWorkflowRunner> {
    let started_on = now() - Duration::minutes(minutes);
    let mut arunner = runner.into_active_model();
    arunner.started_on = Set(started_on);
    Ok(arunner.update(db).await?)
}

pub async fn backdate_ci_workflow(
    db: &DatabaseConnection,
    workflow: MCiWorkflow,
    minutes: i64,
) -> CoreResult<MCiWorkflow> {
    let started_on = now() - Duration::minutes(minutes);
    let mut aworkflow = workflow.into_active_model();
    aworkflow.started_on = Set(started_on);
    Ok(aworkflow.update(db).await?)
}
