/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use cadence_core::adapters::WorkflowTemplate;
use cadence_core::config_map::{self, MergedConfig};
use cadence_core::consts::*;
use cadence_core::database::template::{self, RunnerTemplate};
use cadence_core::database::{
    Audit, app, artifact, cd_pipeline, ci_pipeline, runner, variable, workflow,
};
use cadence_core::error::{CoreError, CoreResult};
use cadence_core::timeline;
use cadence_core::types::*;
use cadence_core::variables::{
    ResolveRequest, Scope, Snapshot, TemplateType, resolve, resolve_from_history,
};
use entity::app_workflow_mapping::ComponentKind;
use entity::cd_workflow::WorkflowStatus;
use entity::cd_workflow_runner::{RunnerStatus, WorkflowType};
use entity::pipeline::TriggerType;
use entity::pipeline_status_timeline::TimelineStatus;
use entity::variable_snapshot_history::HistoryReferenceType;
use runner::NewRunner;
use sea_orm::{ActiveEnum, ConnectionTrait, TransactionTrait};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::scheduler::{self, SlotDecision};

#[derive(Debug, Clone)]
pub struct TriggerRequest {
    pub pipeline_id: i32,
    pub artifact_id: i32,
    /// `None` starts the first stage configured as automatic.
    pub stage: Option<WorkflowType>,
    pub triggered_by: i32,
    pub apply_auth: bool,
    /// Idempotency key of the caller.
    pub reference_id: Option<String>,
}

impl TriggerRequest {
    /// System-initiated trigger of the first automatic stage.
    pub fn automatic(pipeline_id: i32, artifact_id: i32) -> Self {
        TriggerRequest {
            pipeline_id,
            artifact_id,
            stage: None,
            triggered_by: SYSTEM_USER,
            apply_auth: false,
            reference_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TriggerOutcome {
    /// Submitted to the executor.
    Started(MCdWorkflowRunner),
    /// Waiting for the in-flight DEPLOY of the pipeline.
    Queued(MCdWorkflowRunner),
    /// A runner already exists for the request's reference id.
    Existing(MCdWorkflowRunner),
    /// Persisted, but submission was rejected or cancelled.
    Failed(MCdWorkflowRunner),
    /// No stage is configured to start automatically.
    Skipped,
}

impl TriggerOutcome {
    pub fn runner(&self) -> Option<&MCdWorkflowRunner> {
        match self {
            TriggerOutcome::Started(r)
            | TriggerOutcome::Queued(r)
            | TriggerOutcome::Existing(r)
            | TriggerOutcome::Failed(r) => Some(r),
            TriggerOutcome::Skipped => None,
        }
    }
}

/// The pipeline, environment and artifact a runner works on.
#[derive(Debug, Clone)]
pub(crate) struct Target {
    pub pipeline: MPipeline,
    pub environment: MEnvironment,
    pub artifact: MCiArtifact,
}

/// Stage output ready for submission.
#[derive(Debug, Clone, Default)]
pub(crate) struct Rendered {
    /// Stage config before variable resolution.
    pub template: String,
    pub config: String,
    pub snapshot: Snapshot,
    pub merged: Option<MergedConfig>,
}

#[derive(Debug, Clone)]
struct Origin {
    triggered_by: i32,
    ref_runner_id: Option<i32>,
    reference_id: Option<String>,
}

#[instrument(skip(state, request, cancel), fields(pipeline_id = request.pipeline_id, artifact_id = request.artifact_id, stage = ?request.stage))]
pub async fn trigger_stage(
    state: Arc<ServerState>,
    request: TriggerRequest,
    cancel: CancellationToken,
) -> CoreResult<TriggerOutcome> {
    let db = &state.db;

    if let Some(reference_id) = &request.reference_id {
        if let Some(existing) = runner::get_runner_by_reference(db, reference_id).await? {
            debug!(runner_id = existing.id, "Reference already triggered");
            return Ok(TriggerOutcome::Existing(existing));
        }
    }

    let pipeline = cd_pipeline::get_cd_pipeline(db, request.pipeline_id).await?;
    if pipeline.deleted {
        return Err(CoreError::NotFound(PIPELINE_DELETED.to_string()));
    }

    let artifact = artifact::get_artifact(db, request.artifact_id).await?;
    if !artifact_available(db, &pipeline, &artifact).await? {
        return Err(CoreError::PreconditionFailed(
            ARTIFACT_UNAVAILABLE.to_string(),
        ));
    }

    let stage = match request.stage.or_else(|| automatic_stage(&pipeline)) {
        Some(stage) => stage,
        None => {
            debug!("No automatic stage configured");
            return Ok(TriggerOutcome::Skipped);
        }
    };

    check_stage(&pipeline, stage)?;

    if request.apply_auth {
        authorize(&state, &pipeline, request.triggered_by).await?;
    }

    let environment = app::get_environment(db, pipeline.environment_id).await?;
    let target = Target {
        pipeline,
        environment,
        artifact,
    };

    let rendered = render_stage(&state, &target, stage).await?;

    start_runner(
        state,
        target,
        stage,
        Origin {
            triggered_by: request.triggered_by,
            ref_runner_id: None,
            reference_id: request.reference_id,
        },
        rendered,
        cancel,
    )
    .await
}

/// Starts a new runner of the same stage and artifact as a failed or aborted one.
#[instrument(skip(state, cancel))]
pub async fn retry_runner(
    state: Arc<ServerState>,
    runner_id: i32,
    triggered_by: i32,
    cancel: CancellationToken,
) -> CoreResult<TriggerOutcome> {
    let previous = runner::get_runner(&state.db, runner_id).await?;
    if !matches!(
        previous.status,
        RunnerStatus::Failed | RunnerStatus::Aborted
    ) {
        return Err(CoreError::Conflict(RUNNER_NOT_RETRYABLE.to_string()));
    }

    let target = load_target(&state.db, &previous).await?;
    if target.pipeline.deleted {
        return Err(CoreError::NotFound(PIPELINE_DELETED.to_string()));
    }

    check_stage(&target.pipeline, previous.workflow_type)?;
    let rendered = render_stage(&state, &target, previous.workflow_type).await?;

    start_runner(
        state,
        target,
        previous.workflow_type,
        Origin {
            triggered_by,
            ref_runner_id: Some(previous.id),
            reference_id: None,
        },
        rendered,
        cancel,
    )
    .await
}

/// Submits the oldest queued DEPLOY runner once the pipeline is idle.
///
/// A promoted runner that cannot be submitted is failed and the next one is tried.
#[instrument(skip(state, cancel))]
pub async fn promote_next(
    state: Arc<ServerState>,
    pipeline_id: i32,
    cancel: CancellationToken,
) -> CoreResult<Option<MCdWorkflowRunner>> {
    loop {
        if cancel.is_cancelled() {
            return Ok(None);
        }

        let Some(next) = scheduler::release(&state.db, pipeline_id).await? else {
            return Ok(None);
        };

        let target = load_target(&state.db, &next).await?;
        if target.pipeline.deleted {
            fail_runner(&state, next, PIPELINE_DELETED).await?;
            continue;
        }

        let rendered = match render_from_history(&state, &next).await {
            Ok(rendered) => rendered,
            Err(e) => {
                warn!(runner_id = next.id, error = %e, "Failed to render promoted runner");
                fail_runner(&state, next, &e.message()).await?;
                continue;
            }
        };

        if let TriggerOutcome::Started(started) =
            submit(&state, next, &target, rendered, &cancel).await?
        {
            return Ok(Some(started));
        }
    }
}

/// Promotes queued runners of every idle pipeline. Returns the number of runners started.
pub async fn recover_queues(state: Arc<ServerState>) -> CoreResult<usize> {
    let mut started = 0;

    for pipeline_id in runner::get_pipelines_with_queued(&state.db).await? {
        match promote_next(state.clone(), pipeline_id, CancellationToken::new()).await {
            Ok(Some(_)) => started += 1,
            Ok(None) => {}
            Err(e) => {
                error!(error = %e, pipeline_id, "Failed to recover queue");
            }
        }
    }

    Ok(started)
}

async fn start_runner(
    state: Arc<ServerState>,
    target: Target,
    stage: WorkflowType,
    origin: Origin,
    rendered: Rendered,
    cancel: CancellationToken,
) -> CoreResult<TriggerOutcome> {
    let created = persist_runner(&state, &target, stage, origin, &rendered).await?;

    if created.status == RunnerStatus::Queued {
        info!(runner_id = created.id, "Deployment queued");

        if auto_abort_enabled(&state.db, &target.pipeline).await? {
            scheduler::abort_queued_older_than(&state.db, target.pipeline.id, created.id)
                .await?;
        }

        return Ok(TriggerOutcome::Queued(created));
    }

    let outcome = submit(&state, created, &target, rendered, &cancel).await?;

    if matches!(outcome, TriggerOutcome::Failed(_)) && stage == WorkflowType::Deploy {
        // the caller's token may be the one that cancelled this submission
        promote_next(state, target.pipeline.id, CancellationToken::new()).await?;
    }

    Ok(outcome)
}

/// Runner, snapshots and first timeline entry in one transaction.
async fn persist_runner(
    state: &ServerState,
    target: &Target,
    stage: WorkflowType,
    origin: Origin,
    rendered: &Rendered,
) -> CoreResult<MCdWorkflowRunner> {
    let audit = Audit::by(origin.triggered_by);
    let txn = state.db.begin().await?;

    let cd_workflow =
        runner::find_or_create_cd_workflow(&txn, target.pipeline.id, target.artifact.id, audit)
            .await?;

    let status = match stage {
        WorkflowType::Deploy => match scheduler::try_acquire(&txn, target.pipeline.id).await? {
            SlotDecision::Granted => RunnerStatus::Initiated,
            SlotDecision::MustQueue => RunnerStatus::Queued,
        },
        _ => RunnerStatus::Initiated,
    };

    let created = runner::create_runner(
        &txn,
        NewRunner {
            cd_workflow_id: cd_workflow.id,
            pipeline_id: target.pipeline.id,
            app_id: target.pipeline.app_id,
            environment_id: target.pipeline.environment_id,
            workflow_type: stage,
            status,
            triggered_by: origin.triggered_by,
            ref_runner_id: origin.ref_runner_id,
            reference_id: origin.reference_id,
        },
        audit,
    )
    .await?;

    match &rendered.merged {
        Some(merged) => config_map::persist_snapshots(&txn, created.id, merged, audit).await?,
        None => {
            variable::insert_history(
                &txn,
                HistoryReferenceType::CdWorkflowRunner,
                created.id,
                &rendered.snapshot,
                audit,
            )
            .await?;
            template::insert_template(
                &txn,
                created.id,
                &RunnerTemplate {
                    stage_config: rendered.template.clone(),
                    ..Default::default()
                },
                audit,
            )
            .await?;
        }
    }

    timeline::append(
        &txn,
        created.id,
        TimelineStatus::DeploymentInitiated,
        &format!("{} triggered by user {}", stage.to_value(), origin.triggered_by),
        origin.triggered_by,
    )
    .await?;

    let workflow_status = if status == RunnerStatus::Queued {
        WorkflowStatus::Enqueued
    } else {
        WorkflowStatus::RequestAccepted
    };
    runner::set_cd_workflow_status(&txn, cd_workflow, workflow_status).await?;

    txn.commit().await?;
    Ok(created)
}

pub(crate) async fn submit(
    state: &ServerState,
    initiated: MCdWorkflowRunner,
    target: &Target,
    rendered: Rendered,
    cancel: &CancellationToken,
) -> CoreResult<TriggerOutcome> {
    let template = build_template(&initiated, target, rendered);

    // name first so status events racing the submission find the runner
    let initiated = runner::set_runner_name(&state.db, initiated, template.name.clone()).await?;

    let submitted = tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        result = state.executor.submit(&template) => Some(result),
    };

    match submitted {
        Some(Ok(executor_id)) => {
            let started = if executor_id != initiated.name {
                runner::set_runner_name(&state.db, initiated, executor_id).await?
            } else {
                initiated
            };

            let workflow = runner::get_cd_workflow(&state.db, started.cd_workflow_id).await?;
            runner::set_cd_workflow_status(&state.db, workflow, WorkflowStatus::WfStarted).await?;

            info!(runner_id = started.id, executor_id = %started.name, "Submitted runner");
            Ok(TriggerOutcome::Started(started))
        }
        Some(Err(e)) => {
            warn!(runner_id = initiated.id, error = %e, "Executor rejected runner");
            Ok(TriggerOutcome::Failed(
                fail_runner(state, initiated, &e.message()).await?,
            ))
        }
        None => {
            warn!(runner_id = initiated.id, "Trigger cancelled before submission");
            Ok(TriggerOutcome::Failed(
                fail_runner(state, initiated, TRIGGER_CANCELLED).await?,
            ))
        }
    }
}

async fn fail_runner(
    state: &ServerState,
    initiated: MCdWorkflowRunner,
    message: &str,
) -> CoreResult<MCdWorkflowRunner> {
    let txn = state.db.begin().await?;

    let failed = runner::transition_runner(
        &txn,
        initiated,
        RunnerStatus::Failed,
        Some(message.to_string()),
        None,
    )
    .await?;

    timeline::append(&txn, failed.id, TimelineStatus::Failed, message, SYSTEM_USER).await?;

    let workflow = runner::get_cd_workflow(&txn, failed.cd_workflow_id).await?;
    runner::set_cd_workflow_status(&txn, workflow, WorkflowStatus::TriggerError).await?;

    txn.commit().await?;
    Ok(failed)
}

fn build_template(
    runner: &MCdWorkflowRunner,
    target: &Target,
    rendered: Rendered,
) -> WorkflowTemplate {
    let (config_maps, secrets) = rendered
        .merged
        .map(|m| (m.config_maps, m.secrets))
        .unwrap_or_default();

    let run_in_env = match runner.workflow_type {
        WorkflowType::Pre => target.pipeline.run_pre_stage_in_env,
        WorkflowType::Post => target.pipeline.run_post_stage_in_env,
        WorkflowType::Deploy => true,
    };

    WorkflowTemplate {
        name: executor_name(CD_WORKFLOW_PREFIX, runner.id),
        workflow_id: runner.id,
        pipeline_id: target.pipeline.id,
        app_id: target.pipeline.app_id,
        environment_id: Some(target.environment.id),
        namespace: Some(target.environment.namespace.clone()),
        stage: runner.workflow_type.to_value(),
        image: target.artifact.image.clone(),
        config: rendered.config,
        config_maps,
        secrets,
        run_in_env,
        git_triggers: BTreeMap::new(),
        invalidate_cache: false,
        triggered_by: runner.triggered_by,
    }
}

/// Executor id requested for a workload: `{prefix}-{id}-{random}`.
pub(crate) fn executor_name(prefix: &str, id: i32) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", prefix, id, &suffix[..8])
}

pub(crate) async fn load_target<C: ConnectionTrait>(
    db: &C,
    runner: &MCdWorkflowRunner,
) -> CoreResult<Target> {
    let cd_workflow = runner::get_cd_workflow(db, runner.cd_workflow_id).await?;
    let pipeline = cd_pipeline::get_cd_pipeline(db, cd_workflow.pipeline_id).await?;
    let environment = app::get_environment(db, pipeline.environment_id).await?;
    let artifact = artifact::get_artifact(db, cd_workflow.ci_artifact_id).await?;

    Ok(Target {
        pipeline,
        environment,
        artifact,
    })
}

fn automatic_stage(pipeline: &MPipeline) -> Option<WorkflowType> {
    if pipeline.has_pre_stage() && pipeline.pre_trigger_type == TriggerType::Automatic {
        Some(WorkflowType::Pre)
    } else if pipeline.trigger_type == TriggerType::Automatic {
        Some(WorkflowType::Deploy)
    } else {
        None
    }
}

fn check_stage(pipeline: &MPipeline, stage: WorkflowType) -> CoreResult<()> {
    match stage {
        WorkflowType::Pre if !pipeline.has_pre_stage() => Err(CoreError::PreconditionFailed(
            PRE_DEPLOYMENT_MISSING.to_string(),
        )),
        WorkflowType::Post if !pipeline.has_post_stage() => Err(
            CoreError::PreconditionFailed(POST_DEPLOYMENT_MISSING.to_string()),
        ),
        WorkflowType::Deploy if pipeline.app_type().is_none() => Err(
            CoreError::PreconditionFailed(DEPLOYMENT_TYPE_UNSUPPORTED.to_string()),
        ),
        _ => Ok(()),
    }
}

fn stage_template(pipeline: &MPipeline, stage: WorkflowType) -> &str {
    match stage {
        WorkflowType::Pre => &pipeline.pre_stage_config,
        WorkflowType::Post => &pipeline.post_stage_config,
        WorkflowType::Deploy => "",
    }
}

async fn authorize(state: &ServerState, pipeline: &MPipeline, user: i32) -> CoreResult<()> {
    let resource = format!("app/{}/env/{}", pipeline.app_id, pipeline.environment_id);

    if state.authz.check(user, "trigger", &resource).await? {
        Ok(())
    } else {
        Err(CoreError::Unauthorized(format!(
            "user {} may not trigger {}",
            user, resource
        )))
    }
}

/// An artifact may run on a pipeline when the pipeline's CI chain built it, or when it
/// already deployed successfully on the parent CD pipeline.
async fn artifact_available<C: ConnectionTrait>(
    db: &C,
    pipeline: &MPipeline,
    artifact: &MCiArtifact,
) -> CoreResult<bool> {
    let mut chain = vec![pipeline.ci_pipeline_id];
    match ci_pipeline::get_ci_pipeline(db, pipeline.ci_pipeline_id).await {
        Ok(ci) => chain.extend(ci.parent_ci_pipeline),
        Err(CoreError::NotFound(_)) => {}
        Err(e) => return Err(e),
    }

    if let Some(source) = artifact::get_source_ci_pipeline(db, artifact).await? {
        if chain.contains(&source) {
            return Ok(true);
        }
    }

    if let Some(external) = artifact.external_ci_pipeline_id {
        if chain.contains(&external) {
            return Ok(true);
        }
    }

    match workflow::get_parent_of_cd(db, pipeline.id).await? {
        Some((ComponentKind::CdPipeline, parent_id)) => {
            artifact::deployed_on_any(db, artifact.id, &[parent_id]).await
        }
        _ => Ok(false),
    }
}

async fn auto_abort_enabled<C: ConnectionTrait>(db: &C, pipeline: &MPipeline) -> CoreResult<bool> {
    match ci_pipeline::get_ci_pipeline(db, pipeline.ci_pipeline_id).await {
        Ok(ci) => Ok(ci.auto_abort_previous_builds),
        Err(CoreError::NotFound(_)) => Ok(false),
        Err(e) => Err(e),
    }
}

async fn render_stage(
    state: &ServerState,
    target: &Target,
    stage: WorkflowType,
) -> CoreResult<Rendered> {
    let scope = Scope {
        app_id: Some(target.pipeline.app_id),
        env_id: Some(target.environment.id),
        cluster_id: Some(target.environment.cluster_id),
    };
    let parser = state.parser.as_ref();

    if stage == WorkflowType::Deploy {
        let merged = config_map::merge(
            &state.db,
            parser,
            target.pipeline.app_id,
            target.environment.id,
            scope,
        )
        .await?;

        return Ok(Rendered {
            merged: Some(merged),
            ..Default::default()
        });
    }

    let stage_config = stage_template(&target.pipeline, stage);
    let resolved = resolve(
        &state.db,
        parser,
        ResolveRequest {
            template: stage_config,
            template_type: TemplateType::String,
            scope,
            ignore_unknown: false,
        },
    )
    .await?;

    Ok(Rendered {
        template: stage_config.to_string(),
        config: resolved.template,
        snapshot: resolved.snapshot,
        merged: None,
    })
}

/// Rendering for a runner persisted earlier, from the template and snapshots stored with it.
async fn render_from_history(
    state: &ServerState,
    runner: &MCdWorkflowRunner,
) -> CoreResult<Rendered> {
    let parser = state.parser.as_ref();

    if runner.workflow_type == WorkflowType::Deploy {
        let merged = config_map::merge_from_history(&state.db, parser, runner.id).await?;

        return Ok(Rendered {
            merged: Some(merged),
            ..Default::default()
        });
    }

    let stored = template::get_template(&state.db, runner.id).await?;
    let resolved = resolve_from_history(
        &state.db,
        parser,
        &stored.stage_config,
        TemplateType::String,
        HistoryReferenceType::CdWorkflowRunner,
        runner.id,
    )
    .await?;

    Ok(Rendered {
        template: stored.stage_config,
        config: resolved.template,
        snapshot: resolved.snapshot,
        merged: None,
    })
}
