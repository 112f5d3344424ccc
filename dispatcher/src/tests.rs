/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

#[cfg(test)]
mod tests {
    use crate::ci::{CiTriggerRequest, trigger_ci};
    use crate::events::{ExecutorEvent, handle_executor_event};
    use crate::scheduler::cancel_queued;
    use crate::start_dispatcher;
    use crate::trigger::{
        TriggerOutcome, TriggerRequest, recover_queues, retry_runner, trigger_stage,
    };
    use cadence_core::adapters::MockAuthorizer;
    use cadence_core::consts::*;
    use cadence_core::database::ci_pipeline::{NewCiMaterial, create_ci_material};
    use cadence_core::database::runner::{self, NewRunner};
    use cadence_core::database::template::{RunnerTemplate, insert_template};
    use cadence_core::database::{Audit, app, cd_pipeline, config_map, now};
    use cadence_core::error::ErrorKind;
    use cadence_core::testing::*;
    use cadence_core::timeline;
    use cadence_core::types::*;
    use entity::cd_workflow_runner::{RunnerStatus, WorkflowType};
    use entity::ci_pipeline::CiPipelineType;
    use entity::ci_pipeline_material::SourceType;
    use entity::ci_workflow::CiWorkflowStatus;
    use entity::pipeline::TriggerType;
    use entity::pipeline_status_timeline::TimelineStatus;
    use serde_json::json;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    async fn setup(seed: PipelineSeed) -> (TestState, Seeded) {
        let test = test_state().await.unwrap();
        let seeded = seed_pipeline(&test.state.db, seed).await.unwrap();
        (test, seeded)
    }

    async fn trigger(test: &TestState, pipeline_id: i32, artifact_id: i32) -> TriggerOutcome {
        trigger_stage(
            test.state.clone(),
            TriggerRequest::automatic(pipeline_id, artifact_id),
            CancellationToken::new(),
        )
        .await
        .unwrap()
    }

    fn started(outcome: TriggerOutcome) -> MCdWorkflowRunner {
        match outcome {
            TriggerOutcome::Started(runner) => runner,
            other => panic!("expected a started runner, got {:?}", other),
        }
    }

    fn queued(outcome: TriggerOutcome) -> MCdWorkflowRunner {
        match outcome {
            TriggerOutcome::Queued(runner) => runner,
            other => panic!("expected a queued runner, got {:?}", other),
        }
    }

    async fn report(test: &TestState, executor_id: &str, status: &str) {
        handle_executor_event(
            test.state.clone(),
            ExecutorEvent {
                executor_id: executor_id.to_string(),
                status: status.to_string(),
                pod_status: String::new(),
                message: format!("pod {}", status.to_lowercase()),
            },
        )
        .await
        .unwrap();
    }

    async fn reload(test: &TestState, runner: &MCdWorkflowRunner) -> MCdWorkflowRunner {
        runner::get_runner(&test.state.db, runner.id).await.unwrap()
    }

    #[tokio::test]
    async fn test_automatic_trigger_starts_deploy() {
        let (test, seeded) = setup(PipelineSeed::default()).await;
        let artifact = seed_artifact(&test.state.db, &seeded, "web:1").await.unwrap();

        let runner = started(trigger(&test, seeded.cd_pipeline.id, artifact.id).await);

        assert_eq!(runner.workflow_type, WorkflowType::Deploy);
        assert_eq!(runner.status, RunnerStatus::Initiated);
        assert!(runner.name.starts_with("cd-"));
        assert!(
            timeline::has_status(&test.state.db, runner.id, TimelineStatus::DeploymentInitiated)
                .await
                .unwrap()
        );

        let submitted = test.executor.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].stage, "DEPLOY");
        assert_eq!(submitted[0].image, "web:1");
        assert_eq!(submitted[0].namespace.as_deref(), Some("default"));
    }

    #[tokio::test]
    async fn test_second_deploy_waits_and_promotes_in_order() {
        let (test, seeded) = setup(PipelineSeed::default()).await;
        let db = &test.state.db;
        let first = seed_artifact(db, &seeded, "web:7").await.unwrap();
        let second = seed_artifact(db, &seeded, "web:8").await.unwrap();
        let third = seed_artifact(db, &seeded, "web:9").await.unwrap();

        let running = started(trigger(&test, seeded.cd_pipeline.id, first.id).await);
        report(&test, &running.name, "Running").await;

        let waiting = queued(trigger(&test, seeded.cd_pipeline.id, second.id).await);
        let last = queued(trigger(&test, seeded.cd_pipeline.id, third.id).await);
        assert_eq!(test.executor.submitted().len(), 1);

        report(&test, &running.name, "Succeeded").await;

        let promoted = reload(&test, &waiting).await;
        assert_eq!(promoted.status, RunnerStatus::Initiated);
        assert!(!promoted.name.is_empty());
        assert_eq!(reload(&test, &last).await.status, RunnerStatus::Queued);
        assert_eq!(test.executor.submitted()[1].image, "web:8");

        report(&test, &promoted.name, "Failed").await;

        assert_eq!(reload(&test, &promoted).await.status, RunnerStatus::Failed);
        assert_eq!(reload(&test, &last).await.status, RunnerStatus::Initiated);
        assert_eq!(test.executor.submitted()[2].image, "web:9");
    }

    #[tokio::test]
    async fn test_manual_pre_stage_is_left_to_the_user() {
        let (test, seeded) = setup(PipelineSeed {
            pre_stage_config: "echo pre".to_string(),
            pre_trigger_type: TriggerType::Manual,
            ..Default::default()
        })
        .await;
        let artifact = seed_artifact(&test.state.db, &seeded, "web:1").await.unwrap();

        let deploy = started(trigger(&test, seeded.cd_pipeline.id, artifact.id).await);
        assert_eq!(deploy.workflow_type, WorkflowType::Deploy);

        let pre = started(
            trigger_stage(
                test.state.clone(),
                TriggerRequest {
                    stage: Some(WorkflowType::Pre),
                    triggered_by: 5,
                    ..TriggerRequest::automatic(seeded.cd_pipeline.id, artifact.id)
                },
                CancellationToken::new(),
            )
            .await
            .unwrap(),
        );

        assert_eq!(pre.workflow_type, WorkflowType::Pre);
        assert_eq!(pre.triggered_by, 5);
        assert_eq!(test.executor.submitted()[1].config, "echo pre");
    }

    #[tokio::test]
    async fn test_manual_deploy_without_pre_is_skipped() {
        let (test, seeded) = setup(PipelineSeed {
            trigger_type: TriggerType::Manual,
            ..Default::default()
        })
        .await;
        let artifact = seed_artifact(&test.state.db, &seeded, "web:1").await.unwrap();

        let outcome = trigger(&test, seeded.cd_pipeline.id, artifact.id).await;

        assert_eq!(outcome, TriggerOutcome::Skipped);
        assert!(test.executor.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_foreign_artifact_is_unavailable() {
        let (test, seeded) = setup(PipelineSeed::default()).await;
        let foreign = seed_foreign_artifact(&test.state.db).await.unwrap();

        let err = trigger_stage(
            test.state.clone(),
            TriggerRequest::automatic(seeded.cd_pipeline.id, foreign.id),
            CancellationToken::new(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
        assert_eq!(err.message(), ARTIFACT_UNAVAILABLE);
        assert!(
            runner::get_cd_workflows_by_pipeline(&test.state.db, seeded.cd_pipeline.id)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_reference_id_returns_existing_runner() {
        let (test, seeded) = setup(PipelineSeed::default()).await;
        let artifact = seed_artifact(&test.state.db, &seeded, "web:1").await.unwrap();

        let request = TriggerRequest {
            reference_id: Some("ci-complete-42".to_string()),
            ..TriggerRequest::automatic(seeded.cd_pipeline.id, artifact.id)
        };

        let first = trigger_stage(test.state.clone(), request.clone(), CancellationToken::new())
            .await
            .unwrap();
        let second = trigger_stage(test.state.clone(), request, CancellationToken::new())
            .await
            .unwrap();

        assert!(matches!(first, TriggerOutcome::Started(_)));
        match second {
            TriggerOutcome::Existing(runner) => assert_eq!(Some(runner.id), first.runner().map(|r| r.id)),
            other => panic!("expected existing runner, got {:?}", other),
        }
        assert_eq!(test.executor.submitted().len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_trigger_fails_runner_and_frees_slot() {
        let (test, seeded) = setup(PipelineSeed::default()).await;
        let db = &test.state.db;
        let first = seed_artifact(db, &seeded, "web:1").await.unwrap();
        let second = seed_artifact(db, &seeded, "web:2").await.unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = trigger_stage(
            test.state.clone(),
            TriggerRequest::automatic(seeded.cd_pipeline.id, first.id),
            cancel,
        )
        .await
        .unwrap();

        let TriggerOutcome::Failed(failed) = outcome else {
            panic!("expected a failed runner");
        };
        assert_eq!(failed.status, RunnerStatus::Failed);
        assert_eq!(failed.message, TRIGGER_CANCELLED);
        assert!(test.executor.submitted().is_empty());

        started(trigger(&test, seeded.cd_pipeline.id, second.id).await);
    }

    #[tokio::test]
    async fn test_cancelled_submission_promotes_queued_runner() {
        let (test, seeded) = setup(PipelineSeed::default()).await;
        let db = &test.state.db;
        let first = seed_artifact(db, &seeded, "web:1").await.unwrap();
        let second = seed_artifact(db, &seeded, "web:2").await.unwrap();

        test.executor.hold();
        let cancel = CancellationToken::new();
        let pending = tokio::spawn(trigger_stage(
            test.state.clone(),
            TriggerRequest::automatic(seeded.cd_pipeline.id, first.id),
            cancel.clone(),
        ));

        // wait for the first runner to reach the executor
        loop {
            let latest = runner::get_latest_runner(db, seeded.cd_pipeline.id, WorkflowType::Deploy)
                .await
                .unwrap();
            if latest.is_some_and(|r| !r.name.is_empty()) {
                break;
            }
            tokio::task::yield_now().await;
        }

        let waiting = queued(trigger(&test, seeded.cd_pipeline.id, second.id).await);

        test.executor.release();
        cancel.cancel();

        let TriggerOutcome::Failed(failed) = pending.await.unwrap().unwrap() else {
            panic!("expected the cancelled runner to fail");
        };
        assert_eq!(failed.message, TRIGGER_CANCELLED);

        let promoted = reload(&test, &waiting).await;
        assert_eq!(promoted.status, RunnerStatus::Initiated);
        let submitted = test.executor.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].image, "web:2");
    }

    #[tokio::test]
    async fn test_promoted_runner_restarts_its_clock() {
        let (test, seeded) = setup(PipelineSeed::default()).await;
        let db = &test.state.db;
        let first = seed_artifact(db, &seeded, "web:1").await.unwrap();
        let second = seed_artifact(db, &seeded, "web:2").await.unwrap();

        let running = started(trigger(&test, seeded.cd_pipeline.id, first.id).await);
        let waiting = queued(trigger(&test, seeded.cd_pipeline.id, second.id).await);
        let waiting = backdate_runner(db, waiting, 15).await.unwrap();

        report(&test, &running.name, "Succeeded").await;

        let promoted = reload(&test, &waiting).await;
        assert_eq!(promoted.status, RunnerStatus::Initiated);
        assert!(promoted.started_on > waiting.started_on);
        assert!((now() - promoted.started_on).num_minutes() < 1);
    }

    #[tokio::test]
    async fn test_promotion_renders_config_from_trigger_time() {
        let (test, seeded) = setup(PipelineSeed::default()).await;
        let db = &test.state.db;
        let first = seed_artifact(db, &seeded, "web:1").await.unwrap();
        let second = seed_artifact(db, &seeded, "web:2").await.unwrap();

        let save = |value: &str| {
            config_map::save_app_level(
                db,
                seeded.app.id,
                json!({"maps": [{"name": "cm", "type": "environment", "data": {"K": value}}]})
                    .to_string(),
                String::new(),
                Audit::by(1),
            )
        };

        save("v1").await.unwrap();
        let running = started(trigger(&test, seeded.cd_pipeline.id, first.id).await);
        let waiting = queued(trigger(&test, seeded.cd_pipeline.id, second.id).await);

        // edited while queued, referencing a variable that does not exist
        save("@{{added_later}}").await.unwrap();
        report(&test, &running.name, "Succeeded").await;

        assert_eq!(reload(&test, &waiting).await.status, RunnerStatus::Initiated);
        let submitted = test.executor.submitted();
        assert_eq!(submitted.len(), 2);
        assert_eq!(submitted[1].config_maps["cm"]["data"]["K"], json!("v1"));
    }

    #[tokio::test]
    async fn test_rejected_submission_fails_runner() {
        let (test, seeded) = setup(PipelineSeed::default()).await;
        let db = &test.state.db;
        let artifact = seed_artifact(db, &seeded, "web:1").await.unwrap();

        test.executor.reject_with("quota exceeded");
        let outcome = trigger(&test, seeded.cd_pipeline.id, artifact.id).await;

        let TriggerOutcome::Failed(failed) = outcome else {
            panic!("expected a failed runner");
        };
        assert_eq!(failed.message, "quota exceeded");
        assert_eq!(
            timeline::terminal_status(db, failed.id).await.unwrap(),
            Some(TimelineStatus::Failed)
        );

        test.executor.accept();
        started(trigger(&test, seeded.cd_pipeline.id, artifact.id).await);
    }

    #[tokio::test]
    async fn test_rejected_promotion_moves_to_next_queued() {
        let (test, seeded) = setup(PipelineSeed::default()).await;
        let db = &test.state.db;
        let a1 = seed_artifact(db, &seeded, "web:1").await.unwrap();
        let a2 = seed_artifact(db, &seeded, "web:2").await.unwrap();
        let a3 = seed_artifact(db, &seeded, "web:3").await.unwrap();

        let running = started(trigger(&test, seeded.cd_pipeline.id, a1.id).await);
        let second = queued(trigger(&test, seeded.cd_pipeline.id, a2.id).await);
        let third = queued(trigger(&test, seeded.cd_pipeline.id, a3.id).await);

        test.executor.reject_with("quota exceeded");
        report(&test, &running.name, "Error").await;

        let second = reload(&test, &second).await;
        let third = reload(&test, &third).await;
        assert_eq!(second.status, RunnerStatus::Failed);
        assert_eq!(second.message, "quota exceeded");
        assert_eq!(third.status, RunnerStatus::Failed);
    }

    #[tokio::test]
    async fn test_retry_only_accepts_finished_failures() {
        let (test, seeded) = setup(PipelineSeed::default()).await;
        let artifact = seed_artifact(&test.state.db, &seeded, "web:1").await.unwrap();

        let runner = started(trigger(&test, seeded.cd_pipeline.id, artifact.id).await);

        let err = retry_runner(test.state.clone(), runner.id, 3, CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.message(), RUNNER_NOT_RETRYABLE);

        report(&test, &runner.name, "Failed").await;

        let retried = started(
            retry_runner(test.state.clone(), runner.id, 3, CancellationToken::new())
                .await
                .unwrap(),
        );
        assert_eq!(retried.ref_cd_workflow_runner_id, Some(runner.id));
        assert_eq!(retried.cd_workflow_id, runner.cd_workflow_id);
        assert_eq!(retried.triggered_by, 3);
    }

    #[tokio::test]
    async fn test_auto_abort_supersedes_older_queued() {
        let (test, seeded) = setup(PipelineSeed {
            auto_abort_previous_builds: true,
            ..Default::default()
        })
        .await;
        let db = &test.state.db;
        let a1 = seed_artifact(db, &seeded, "web:1").await.unwrap();
        let a2 = seed_artifact(db, &seeded, "web:2").await.unwrap();
        let a3 = seed_artifact(db, &seeded, "web:3").await.unwrap();

        started(trigger(&test, seeded.cd_pipeline.id, a1.id).await);
        let older = queued(trigger(&test, seeded.cd_pipeline.id, a2.id).await);
        let newer = queued(trigger(&test, seeded.cd_pipeline.id, a3.id).await);

        let older = reload(&test, &older).await;
        assert_eq!(older.status, RunnerStatus::Aborted);
        assert_eq!(older.message, SUPERSEDED_BY_NEWER_TRIGGER);
        assert!(
            timeline::has_status(db, older.id, TimelineStatus::DeploymentSuperseded)
                .await
                .unwrap()
        );
        assert_eq!(reload(&test, &newer).await.status, RunnerStatus::Queued);
    }

    #[tokio::test]
    async fn test_cancel_queued_runner() {
        let (test, seeded) = setup(PipelineSeed::default()).await;
        let db = &test.state.db;
        let a1 = seed_artifact(db, &seeded, "web:1").await.unwrap();
        let a2 = seed_artifact(db, &seeded, "web:2").await.unwrap();

        let running = started(trigger(&test, seeded.cd_pipeline.id, a1.id).await);
        let waiting = queued(trigger(&test, seeded.cd_pipeline.id, a2.id).await);

        let cancelled = cancel_queued(db, waiting.id, 4).await.unwrap();
        assert_eq!(cancelled.status, RunnerStatus::Aborted);

        let err = cancel_queued(db, running.id, 4).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_denied_trigger_is_unauthorized() {
        let mut authz = MockAuthorizer::new();
        authz
            .expect_check()
            .times(1)
            .returning(|_, action, resource| {
                Ok(action != "trigger" || !resource.starts_with("app/"))
            });

        let test = TestStateBuilder::new()
            .authorizer(Arc::new(authz))
            .build()
            .await
            .unwrap();
        let seeded = seed_pipeline(&test.state.db, PipelineSeed::default())
            .await
            .unwrap();
        let artifact = seed_artifact(&test.state.db, &seeded, "web:1").await.unwrap();

        let err = trigger_stage(
            test.state.clone(),
            TriggerRequest {
                apply_auth: true,
                triggered_by: 9,
                ..TriggerRequest::automatic(seeded.cd_pipeline.id, artifact.id)
            },
            CancellationToken::new(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert!(test.executor.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_deleted_pipeline_is_not_found() {
        let (test, seeded) = setup(PipelineSeed::default()).await;
        let artifact = seed_artifact(&test.state.db, &seeded, "web:1").await.unwrap();
        cd_pipeline::delete_cd_pipeline(&test.state.db, seeded.cd_pipeline.id, Audit::by(1))
            .await
            .unwrap();

        let err = trigger_stage(
            test.state.clone(),
            TriggerRequest::automatic(seeded.cd_pipeline.id, artifact.id),
            CancellationToken::new(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.message(), PIPELINE_DELETED);
    }

    #[tokio::test]
    async fn test_explicit_stage_requires_configuration() {
        let (test, seeded) = setup(PipelineSeed {
            deployment_app_type: "ftp".to_string(),
            ..Default::default()
        })
        .await;
        let artifact = seed_artifact(&test.state.db, &seeded, "web:1").await.unwrap();

        for (stage, expected) in [
            (WorkflowType::Pre, PRE_DEPLOYMENT_MISSING),
            (WorkflowType::Post, POST_DEPLOYMENT_MISSING),
            (WorkflowType::Deploy, DEPLOYMENT_TYPE_UNSUPPORTED),
        ] {
            let err = trigger_stage(
                test.state.clone(),
                TriggerRequest {
                    stage: Some(stage),
                    ..TriggerRequest::automatic(seeded.cd_pipeline.id, artifact.id)
                },
                CancellationToken::new(),
            )
            .await
            .unwrap_err();

            assert_eq!(err.message(), expected);
        }
    }

    #[tokio::test]
    async fn test_successful_deploy_chains_post_stage() {
        let (test, seeded) = setup(PipelineSeed {
            post_stage_config: "echo post".to_string(),
            ..Default::default()
        })
        .await;
        let artifact = seed_artifact(&test.state.db, &seeded, "web:1").await.unwrap();

        let deploy = started(trigger(&test, seeded.cd_pipeline.id, artifact.id).await);
        report(&test, &deploy.name, "Succeeded").await;

        let post = runner::get_latest_runner(&test.state.db, seeded.cd_pipeline.id, WorkflowType::Post)
            .await
            .unwrap()
            .expect("post runner");
        assert_eq!(post.status, RunnerStatus::Initiated);
        assert_eq!(post.triggered_by, SYSTEM_USER);
        assert_eq!(test.executor.submitted()[1].config, "echo post");
    }

    #[tokio::test]
    async fn test_successful_deploy_triggers_children() {
        let (test, seeded) = setup(PipelineSeed::default()).await;
        let db = &test.state.db;
        let child = seed_child_cd(db, &seeded, &seeded.cd_pipeline, "staging")
            .await
            .unwrap();
        let artifact = seed_artifact(db, &seeded, "web:1").await.unwrap();

        let deploy = started(trigger(&test, seeded.cd_pipeline.id, artifact.id).await);
        assert!(
            runner::get_latest_runner(db, child.id, WorkflowType::Deploy)
                .await
                .unwrap()
                .is_none()
        );

        report(&test, &deploy.name, "Succeeded").await;

        let child_runner = runner::get_latest_runner(db, child.id, WorkflowType::Deploy)
            .await
            .unwrap()
            .expect("child runner");
        assert_eq!(child_runner.status, RunnerStatus::Initiated);
    }

    #[tokio::test]
    async fn test_event_walks_intermediate_states() {
        let (test, seeded) = setup(PipelineSeed::default()).await;
        let artifact = seed_artifact(&test.state.db, &seeded, "web:1").await.unwrap();
        let deploy = started(trigger(&test, seeded.cd_pipeline.id, artifact.id).await);

        handle_executor_event(
            test.state.clone(),
            ExecutorEvent {
                executor_id: deploy.name.clone(),
                status: "Succeeded".to_string(),
                pod_status: "Completed".to_string(),
                message: String::new(),
            },
        )
        .await
        .unwrap();

        let finished = reload(&test, &deploy).await;
        assert_eq!(finished.status, RunnerStatus::Succeeded);
        assert_eq!(finished.pod_status, "Completed");
        assert!(finished.finished_on.is_some());
        assert!(
            timeline::has_status(&test.state.db, deploy.id, TimelineStatus::KubectlApplyStarted)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_stale_and_unknown_events_are_ignored() {
        let (test, seeded) = setup(PipelineSeed::default()).await;
        let artifact = seed_artifact(&test.state.db, &seeded, "web:1").await.unwrap();
        let deploy = started(trigger(&test, seeded.cd_pipeline.id, artifact.id).await);

        report(&test, "cd-0-missing", "Running").await;
        report(&test, "other-1", "Running").await;
        report(&test, &deploy.name, "Exploded").await;
        assert_eq!(reload(&test, &deploy).await.status, RunnerStatus::Initiated);

        report(&test, &deploy.name, "Failed").await;
        report(&test, &deploy.name, "Running").await;
        assert_eq!(reload(&test, &deploy).await.status, RunnerStatus::Failed);
    }

    #[tokio::test]
    async fn test_recover_queues_promotes_stranded_runner() {
        let (test, seeded) = setup(PipelineSeed::default()).await;
        let db = &test.state.db;
        let artifact = seed_artifact(db, &seeded, "web:1").await.unwrap();

        let cd_workflow =
            runner::find_or_create_cd_workflow(db, seeded.cd_pipeline.id, artifact.id, Audit::by(1))
                .await
                .unwrap();
        let stranded = runner::create_runner(
            db,
            NewRunner {
                cd_workflow_id: cd_workflow.id,
                pipeline_id: seeded.cd_pipeline.id,
                app_id: seeded.app.id,
                environment_id: seeded.environment.id,
                workflow_type: WorkflowType::Deploy,
                status: RunnerStatus::Queued,
                triggered_by: 1,
                ref_runner_id: None,
                reference_id: None,
            },
            Audit::by(1),
        )
        .await
        .unwrap();
        insert_template(db, stranded.id, &RunnerTemplate::default(), Audit::by(1))
            .await
            .unwrap();

        assert_eq!(recover_queues(test.state.clone()).await.unwrap(), 1);

        let promoted = reload(&test, &stranded).await;
        assert_eq!(promoted.status, RunnerStatus::Initiated);
        assert_eq!(test.executor.submitted().len(), 1);
    }

    #[tokio::test]
    async fn test_ci_trigger_submits_workflow() {
        let (test, seeded) = setup(PipelineSeed::default()).await;
        let db = &test.state.db;
        let material = app::create_git_material(
            db,
            app::NewGitMaterial {
                app_id: seeded.app.id,
                git_provider_id: 1,
                url: "https://git.example.com/web.git".to_string(),
                checkout_path: "./".to_string(),
                fetch_submodules: false,
            },
            Audit::by(1),
        )
        .await
        .unwrap();
        create_ci_material(
            db,
            NewCiMaterial {
                ci_pipeline_id: seeded.ci_pipeline.id,
                git_material_id: material.id,
                source_type: SourceType::BranchFixed,
                value: "main".to_string(),
            },
            Audit::by(1),
        )
        .await
        .unwrap();

        let workflow = trigger_ci(
            test.state.clone(),
            CiTriggerRequest {
                ci_pipeline_id: seeded.ci_pipeline.id,
                triggered_by: SYSTEM_USER,
                invalidate_cache: true,
                pipeline_type: CiPipelineType::CiJob,
            },
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(workflow.status, CiWorkflowStatus::Starting);
        assert!(workflow.name.starts_with("ci-"));

        let submitted = test.executor.submitted();
        assert_eq!(submitted[0].stage, "CI_JOB");
        assert_eq!(submitted[0].git_triggers.get(&material.id).map(String::as_str), Some("main"));

        report(&test, &workflow.name, "Running").await;
        let running = cadence_core::database::ci_workflow::get_ci_workflow(db, workflow.id)
            .await
            .unwrap();
        assert_eq!(running.status, CiWorkflowStatus::Running);
    }

    #[tokio::test]
    async fn test_ci_trigger_rejection_fails_workflow() {
        let (test, seeded) = setup(PipelineSeed::default()).await;
        test.executor.reject_with("no capacity");

        let workflow = trigger_ci(
            test.state.clone(),
            CiTriggerRequest {
                ci_pipeline_id: seeded.ci_pipeline.id,
                triggered_by: SYSTEM_USER,
                invalidate_cache: false,
                pipeline_type: CiPipelineType::CiJob,
            },
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(workflow.status, CiWorkflowStatus::Failed);
        assert_eq!(workflow.message, "no capacity");
        assert!(workflow.finished_on.is_some());
    }

    #[tokio::test]
    async fn test_start_dispatcher() {
        let test = test_state().await.unwrap();

        tokio_test::assert_ok!(start_dispatcher(test.state.clone()).await);
    }
}
