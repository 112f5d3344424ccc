/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

#[cfg(test)]
mod tests {
    use crate::ci_status::fail_stuck_ci_workflows;
    use crate::ci_trigger::trigger_polling_pipelines;
    use crate::deploy_status::{
        Verdict, argo_verdict, conclude, helm_verdict, refresh_argo_deployments,
        refresh_helm_deployments,
    };
    use crate::schedule::{parse_schedule, period};
    use crate::start_reconcilers;
    use cadence_core::adapters::*;
    use cadence_core::consts::*;
    use cadence_core::database::ci_workflow::{self, NewCiWorkflow};
    use cadence_core::database::{Audit, plugin, runner};
    use cadence_core::testing::*;
    use cadence_core::timeline;
    use cadence_core::types::*;
    use chrono::Utc;
    use dispatcher::{
        ExecutorEvent, TriggerOutcome, TriggerRequest, handle_executor_event, trigger_stage,
    };
    use entity::cd_workflow_runner::{RunnerStatus, WorkflowType};
    use entity::ci_workflow::CiWorkflowStatus;
    use entity::pipeline_stage::StageType;
    use entity::pipeline_status_timeline::TimelineStatus;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    const RELEASE: &str = "app-deploy-prod";

    async fn start(test: &TestState, seeded: &Seeded, image: &str) -> TriggerOutcome {
        let artifact = seed_artifact(&test.state.db, seeded, image).await.unwrap();
        trigger_stage(
            test.state.clone(),
            TriggerRequest::automatic(seeded.cd_pipeline.id, artifact.id),
            CancellationToken::new(),
        )
        .await
        .unwrap()
    }

    async fn report(test: &TestState, executor_id: &str, status: &str) {
        handle_executor_event(
            test.state.clone(),
            ExecutorEvent {
                executor_id: executor_id.to_string(),
                status: status.to_string(),
                pod_status: String::new(),
                message: String::new(),
            },
        )
        .await
        .unwrap();
    }

    /// Starts a deploy, reports it running and moves its start `minutes` into the past.
    async fn running_deploy(test: &TestState, seeded: &Seeded, minutes: i64) -> MCdWorkflowRunner {
        let TriggerOutcome::Started(started) = start(test, seeded, "web:1").await else {
            panic!("expected the deploy to start");
        };

        report(test, &started.name, "Running").await;

        let running = runner::get_runner(&test.state.db, started.id).await.unwrap();
        assert_eq!(running.status, RunnerStatus::Running);
        backdate_runner(&test.state.db, running, minutes).await.unwrap()
    }

    async fn reload(test: &TestState, runner: &MCdWorkflowRunner) -> MCdWorkflowRunner {
        runner::get_runner(&test.state.db, runner.id).await.unwrap()
    }

    fn helm(health: HelmHealth) -> HelmStatus {
        HelmStatus {
            health,
            last_revision_time: None,
        }
    }

    fn argo(sync: ArgoSync, health: ArgoHealth) -> ArgoStatus {
        ArgoStatus {
            sync,
            health,
            resources: Vec::new(),
        }
    }

    #[test]
    fn test_helm_verdict() {
        assert_eq!(helm_verdict(&helm(HelmHealth::Healthy), false), Verdict::Healthy);
        assert_eq!(helm_verdict(&helm(HelmHealth::Missing), false), Verdict::Failed);
        assert_eq!(helm_verdict(&helm(HelmHealth::Failed), false), Verdict::Failed);
        assert_eq!(helm_verdict(&helm(HelmHealth::Degraded), false), Verdict::Pending);
        assert_eq!(helm_verdict(&helm(HelmHealth::Degraded), true), Verdict::Degraded);
        assert_eq!(helm_verdict(&helm(HelmHealth::Progressing), true), Verdict::Degraded);
    }

    #[test]
    fn test_argo_verdict() {
        assert_eq!(
            argo_verdict(&argo(ArgoSync::Synced, ArgoHealth::Healthy), false),
            Verdict::Healthy
        );
        assert_eq!(
            argo_verdict(&argo(ArgoSync::OutOfSync, ArgoHealth::Healthy), false),
            Verdict::Pending
        );
        assert_eq!(
            argo_verdict(&argo(ArgoSync::Synced, ArgoHealth::Degraded), false),
            Verdict::Degraded
        );
        assert_eq!(
            argo_verdict(&argo(ArgoSync::Unknown, ArgoHealth::Missing), true),
            Verdict::Degraded
        );
    }

    #[test]
    fn test_period_of_schedule() {
        let schedule = parse_schedule("*/2 * * * *").unwrap();
        assert_eq!(period(&schedule, Utc::now()), Some(Duration::from_secs(120)));
        assert!(parse_schedule("whenever").is_err());
    }

    #[tokio::test]
    async fn test_stuck_ci_workflow_is_failed() {
        let test = test_state().await.unwrap();
        let seeded = seed_pipeline(&test.state.db, PipelineSeed::default())
            .await
            .unwrap();
        let db = &test.state.db;

        let new = || NewCiWorkflow {
            ci_pipeline_id: seeded.ci_pipeline.id,
            app_id: seeded.app.id,
            git_triggers: BTreeMap::new(),
            triggered_by: 1,
            ref_ci_workflow_id: None,
            parent_ci_workflow_id: None,
        };

        let stuck = ci_workflow::create_ci_workflow(db, new(), Audit::by(1)).await.unwrap();
        let stuck = ci_workflow::update_ci_workflow_status(
            db,
            stuck,
            CiWorkflowStatus::Running,
            None,
            None,
        )
        .await
        .unwrap();
        let stuck = backdate_ci_workflow(db, stuck, 11).await.unwrap();
        let fresh = ci_workflow::create_ci_workflow(db, new(), Audit::by(1)).await.unwrap();

        assert_eq!(fail_stuck_ci_workflows(test.state.clone()).await.unwrap(), 1);

        let stuck = ci_workflow::get_ci_workflow(db, stuck.id).await.unwrap();
        assert_eq!(stuck.status, CiWorkflowStatus::Failed);
        assert_eq!(stuck.message, STUCK);
        assert!(stuck.finished_on.is_some());

        let fresh = ci_workflow::get_ci_workflow(db, fresh.id).await.unwrap();
        assert_eq!(fresh.status, CiWorkflowStatus::Starting);
    }

    #[tokio::test]
    async fn test_degraded_helm_release_fails_runner_and_frees_slot() {
        let test = test_state().await.unwrap();
        let seeded = seed_pipeline(&test.state.db, PipelineSeed::default())
            .await
            .unwrap();

        let deploy = running_deploy(&test, &seeded, 12).await;
        let TriggerOutcome::Queued(waiting) = start(&test, &seeded, "web:2").await else {
            panic!("expected the second deploy to queue");
        };
        test.helm.set(RELEASE, HelmHealth::Degraded);

        assert_eq!(refresh_helm_deployments(test.state.clone()).await.unwrap(), 1);

        assert_eq!(reload(&test, &deploy).await.status, RunnerStatus::Failed);
        assert_eq!(
            timeline::terminal_status(&test.state.db, deploy.id).await.unwrap(),
            Some(TimelineStatus::Degraded)
        );
        assert_eq!(reload(&test, &waiting).await.status, RunnerStatus::Initiated);
        assert_eq!(test.executor.submitted().len(), 2);
    }

    #[tokio::test]
    async fn test_promoted_deploy_is_timed_from_promotion() {
        let test = test_state().await.unwrap();
        let seeded = seed_pipeline(&test.state.db, PipelineSeed::default())
            .await
            .unwrap();

        let deploy = running_deploy(&test, &seeded, 0).await;
        let TriggerOutcome::Queued(waiting) = start(&test, &seeded, "web:2").await else {
            panic!("expected the second deploy to queue");
        };
        let waiting = backdate_runner(&test.state.db, waiting, 15).await.unwrap();

        report(&test, &deploy.name, "Succeeded").await;
        let promoted = reload(&test, &waiting).await;
        assert_eq!(promoted.status, RunnerStatus::Initiated);
        report(&test, &promoted.name, "Running").await;

        // unscripted releases report Progressing
        assert_eq!(refresh_helm_deployments(test.state.clone()).await.unwrap(), 0);
        assert_eq!(reload(&test, &promoted).await.status, RunnerStatus::Running);
    }

    #[tokio::test]
    async fn test_conclusion_yields_to_executor_event() {
        let test = test_state().await.unwrap();
        let seeded = seed_pipeline(
            &test.state.db,
            PipelineSeed {
                post_stage_config: "echo post".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let deploy = running_deploy(&test, &seeded, 30).await;
        report(&test, &deploy.name, "Succeeded").await;
        assert_eq!(test.executor.submitted().len(), 2);

        let concluded = conclude(&test.state, deploy.id, Verdict::Failed, "helm release gone")
            .await
            .unwrap();

        assert!(!concluded);
        assert_eq!(reload(&test, &deploy).await.status, RunnerStatus::Succeeded);
        assert!(
            !timeline::has_status(&test.state.db, deploy.id, TimelineStatus::Failed)
                .await
                .unwrap()
        );
        assert_eq!(test.executor.submitted().len(), 2);
        let post = runner::get_latest_runner(&test.state.db, seeded.cd_pipeline.id, WorkflowType::Post)
            .await
            .unwrap();
        assert!(post.is_some());
    }

    #[tokio::test]
    async fn test_degraded_helm_release_within_threshold_is_left_running() {
        let test = test_state().await.unwrap();
        let seeded = seed_pipeline(&test.state.db, PipelineSeed::default())
            .await
            .unwrap();

        let deploy = running_deploy(&test, &seeded, 2).await;
        test.helm.set(RELEASE, HelmHealth::Degraded);

        assert_eq!(refresh_helm_deployments(test.state.clone()).await.unwrap(), 0);
        assert_eq!(reload(&test, &deploy).await.status, RunnerStatus::Running);
    }

    #[tokio::test]
    async fn test_healthy_helm_release_succeeds_runner() {
        let test = test_state().await.unwrap();
        let seeded = seed_pipeline(&test.state.db, PipelineSeed::default())
            .await
            .unwrap();

        let deploy = running_deploy(&test, &seeded, 1).await;
        test.helm.set(RELEASE, HelmHealth::Healthy);

        assert_eq!(refresh_helm_deployments(test.state.clone()).await.unwrap(), 1);
        assert_eq!(reload(&test, &deploy).await.status, RunnerStatus::Succeeded);
        assert!(
            timeline::has_status(&test.state.db, deploy.id, TimelineStatus::Healthy)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_helm_refresh_ignores_argo_pipelines() {
        let test = test_state().await.unwrap();
        let seeded = seed_pipeline(
            &test.state.db,
            PipelineSeed {
                deployment_app_type: "argo".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let deploy = running_deploy(&test, &seeded, 30).await;
        test.helm.set(RELEASE, HelmHealth::Failed);

        assert_eq!(refresh_helm_deployments(test.state.clone()).await.unwrap(), 0);
        assert_eq!(reload(&test, &deploy).await.status, RunnerStatus::Running);
    }

    #[tokio::test]
    async fn test_synced_argo_application_records_sync_once() {
        let test = test_state().await.unwrap();
        let seeded = seed_pipeline(
            &test.state.db,
            PipelineSeed {
                deployment_app_type: "argo".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let deploy = running_deploy(&test, &seeded, 1).await;
        test.argo.set(RELEASE, ArgoSync::Synced, ArgoHealth::Progressing);

        for _ in 0..2 {
            assert_eq!(refresh_argo_deployments(test.state.clone()).await.unwrap(), 0);
        }

        let synced = timeline::list(&test.state.db, deploy.id)
            .await
            .unwrap()
            .into_iter()
            .filter(|e| e.status == TimelineStatus::KubectlApplySynced)
            .count();
        assert_eq!(synced, 1);
        assert_eq!(reload(&test, &deploy).await.status, RunnerStatus::Running);
    }

    #[tokio::test]
    async fn test_healthy_argo_application_succeeds_runner() {
        let mut adapter = MockArgoAdapter::new();
        adapter
            .expect_get_status()
            .times(1)
            .returning(|_| Ok(argo(ArgoSync::Synced, ArgoHealth::Healthy)));

        let test = TestStateBuilder::new()
            .argo(Arc::new(adapter))
            .build()
            .await
            .unwrap();
        let seeded = seed_pipeline(
            &test.state.db,
            PipelineSeed {
                deployment_app_type: "argo_cd".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let deploy = running_deploy(&test, &seeded, 1).await;

        assert_eq!(refresh_argo_deployments(test.state.clone()).await.unwrap(), 1);
        assert_eq!(reload(&test, &deploy).await.status, RunnerStatus::Succeeded);

        let statuses: Vec<TimelineStatus> = timeline::list(&test.state.db, deploy.id)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.status)
            .collect();
        assert!(statuses.contains(&TimelineStatus::KubectlApplySynced));
        assert_eq!(statuses.last(), Some(&TimelineStatus::Healthy));
    }

    #[tokio::test]
    async fn test_unavailable_argo_leaves_runner_running() {
        let mut adapter = MockArgoAdapter::new();
        adapter
            .expect_get_status()
            .returning(|_| Err(cadence_core::error::CoreError::Unavailable("argo".to_string())));

        let test = TestStateBuilder::new()
            .argo(Arc::new(adapter))
            .build()
            .await
            .unwrap();
        let seeded = seed_pipeline(
            &test.state.db,
            PipelineSeed {
                deployment_app_type: "argo".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let deploy = running_deploy(&test, &seeded, 60).await;

        assert_eq!(refresh_argo_deployments(test.state.clone()).await.unwrap(), 0);
        assert_eq!(reload(&test, &deploy).await.status, RunnerStatus::Running);
    }

    #[tokio::test]
    async fn test_polling_plugin_triggers_ci_job() {
        let test = test_state().await.unwrap();
        let seeded = seed_pipeline(&test.state.db, PipelineSeed::default())
            .await
            .unwrap();
        let db = &test.state.db;
        let audit = Audit::by(1);

        let poller = plugin::create_plugin(db, test.state.cli.plugin_name.clone(), audit)
            .await
            .unwrap();
        let stage = plugin::create_stage(db, seeded.ci_pipeline.id, StageType::PreCi, audit)
            .await
            .unwrap();
        plugin::create_stage_step(db, stage.id, "pull".into(), Some(poller.id), audit)
            .await
            .unwrap();

        assert_eq!(trigger_polling_pipelines(test.state.clone()).await.unwrap(), 1);

        let submitted = test.executor.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].stage, "CI_JOB");
        assert_eq!(submitted[0].pipeline_id, seeded.ci_pipeline.id);
        assert!(submitted[0].name.starts_with("ci-"));
        assert!(!submitted[0].invalidate_cache);
    }

    #[tokio::test]
    async fn test_start_reconcilers() {
        let test = test_state().await.unwrap();
        tokio_test::assert_ok!(start_reconcilers(test.state.clone()).await);
    }
}
